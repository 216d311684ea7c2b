pub mod app_config;
pub mod client;
pub mod error;
pub mod session;

pub use client::{CancelOutcome, HttpReservationService, ReservationService};
pub use error::{ClientError, ClientResult, SessionError, SessionResult};
pub use session::{BookingSession, Clock, Outcome, ReservationView, SystemClock};
