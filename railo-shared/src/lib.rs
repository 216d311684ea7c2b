pub mod models;
pub mod pii;

pub use models::passenger::{total_seats, PassengerGroup, PassengerType};
pub use models::reservation::{
    CancelReservationRequest, ReservationDetail, ReservationRequest, ReservationResponse,
    ReservationStatus, SeatReservation, TripType,
};
pub use pii::Masked;
