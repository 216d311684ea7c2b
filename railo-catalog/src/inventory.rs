use std::collections::HashMap;

use crate::fare::FareClass;
use crate::seat_map::{CarNumber, SeatCode, SeatMap};

/// Lookup from a car-scoped seat code to the service's global seat id.
/// The reservation backend owns this table; the booking flow only reads it.
pub trait SeatInventory: Send + Sync {
    fn resolve_seat_id(&self, car: CarNumber, code: &SeatCode) -> Option<i64>;
}

/// Seat id table held in memory (fixtures, CLI-supplied mappings)
#[derive(Debug, Clone, Default)]
pub struct InMemorySeatInventory {
    seats: HashMap<(CarNumber, SeatCode), i64>,
}

impl InMemorySeatInventory {
    pub fn new() -> Self {
        Self {
            seats: HashMap::new(),
        }
    }

    /// Number every seat of every car consecutively from `first_id`,
    /// car by car in seat-map order.
    pub fn with_sequential_ids(first_id: i64) -> Self {
        let mut inventory = Self::new();
        let mut next_id = first_id;

        for car in CarNumber::all() {
            for seat in SeatMap::generate(car, FareClass::Standing).seats {
                inventory.seats.insert((car, seat.code), next_id);
                next_id += 1;
            }
        }

        inventory
    }

    /// Register a seat id. The code must exist in the car's layout and the id
    /// must not already belong to another seat.
    pub fn insert(&mut self, car: CarNumber, code: SeatCode, seat_id: i64) -> Result<(), InventoryError> {
        if !car.layout().contains(&code) {
            return Err(InventoryError::NotInLayout {
                car: car.get(),
                code: code.to_string(),
            });
        }

        if let Some(((other_car, other_code), _)) = self
            .seats
            .iter()
            .find(|(key, id)| **id == seat_id && **key != (car, code))
        {
            return Err(InventoryError::DuplicateSeatId {
                seat_id,
                car: other_car.get(),
                code: other_code.to_string(),
            });
        }

        self.seats.insert((car, code), seat_id);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.seats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seats.is_empty()
    }
}

impl SeatInventory for InMemorySeatInventory {
    fn resolve_seat_id(&self, car: CarNumber, code: &SeatCode) -> Option<i64> {
        self.seats.get(&(car, *code)).copied()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InventoryError {
    #[error("Seat {code} does not exist in car {car}")]
    NotInLayout { car: u8, code: String },

    #[error("Seat id {seat_id} already belongs to car {car} seat {code}")]
    DuplicateSeatId { seat_id: i64, car: u8, code: String },
}
