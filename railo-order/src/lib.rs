pub mod models;
pub mod selection;
pub mod builder;

pub use models::{CommittedSelection, SelectionState, SelectionStatus, SelectionSummary, ToggleOutcome};
pub use selection::{ErrorKind, SeatSelector, SelectionError};
pub use builder::{BuildError, ReservationRequestBuilder, TripSegment};
