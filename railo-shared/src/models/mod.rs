pub mod passenger;
pub mod reservation;
pub mod wire_time;
