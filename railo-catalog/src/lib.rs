pub mod seat_map;
pub mod fare;
pub mod inventory;

pub use seat_map::{CarLayout, CarNumber, Seat, SeatCode, SeatColumn, SeatMap, SeatMapError};
pub use fare::{implied_fare_class, CarOption, FareClass};
pub use inventory::{InMemorySeatInventory, InventoryError, SeatInventory};
