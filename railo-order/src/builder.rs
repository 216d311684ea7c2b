use crate::models::{CommittedSelection, SelectionStatus};
use crate::selection::SeatSelector;
use railo_catalog::{CarNumber, SeatCode, SeatInventory};
use railo_shared::{ReservationRequest, TripType};
use serde::{Deserialize, Serialize};

/// Train run and stations the reservation is for
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripSegment {
    pub train_schedule_id: i64,
    pub departure_station_id: i64,
    pub arrival_station_id: i64,
}

/// Turns a committed seat selection into the reservation service's request.
pub struct ReservationRequestBuilder<'a> {
    inventory: &'a dyn SeatInventory,
}

impl<'a> ReservationRequestBuilder<'a> {
    pub fn new(inventory: &'a dyn SeatInventory) -> Self {
        Self { inventory }
    }

    /// Build from the selector, which must have been committed.
    pub fn build_from_selector(
        &self,
        selector: &SeatSelector,
        segment: &TripSegment,
    ) -> Result<ReservationRequest, BuildError> {
        match (selector.status(), selector.committed()) {
            (SelectionStatus::Committed, Some(selection)) => self.build(selection, segment),
            (status, _) => Err(BuildError::NotCommitted(status)),
        }
    }

    /// Resolve every seat in selection order. Any unknown seat fails the whole
    /// request; the traveler has to pick again.
    pub fn build(
        &self,
        selection: &CommittedSelection,
        segment: &TripSegment,
    ) -> Result<ReservationRequest, BuildError> {
        let seat_ids = selection
            .seats
            .iter()
            .map(|code| {
                self.inventory
                    .resolve_seat_id(selection.car, code)
                    .ok_or(BuildError::SeatResolution {
                        car: selection.car,
                        code: *code,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let expected = selection.max_seats();
        if seat_ids.len() != expected {
            return Err(BuildError::SeatCountMismatch {
                expected,
                actual: seat_ids.len(),
            });
        }

        Ok(ReservationRequest {
            train_schedule_id: segment.train_schedule_id,
            departure_station_id: segment.departure_station_id,
            arrival_station_id: segment.arrival_station_id,
            passengers: selection.passengers.clone(),
            seat_ids,
            trip_type: TripType::OneWay,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("Seat selection has not been committed (status {0:?})")]
    NotCommitted(SelectionStatus),

    #[error("Seat {code} in car {car} has no seat id")]
    SeatResolution { car: CarNumber, code: SeatCode },

    #[error("Request carries {actual} seats for {expected} passengers")]
    SeatCountMismatch { expected: usize, actual: usize },
}

impl BuildError {
    /// Seat lookup failures invalidate the selection; the rest are
    /// programming or flow errors.
    pub fn requires_reselection(&self) -> bool {
        matches!(self, BuildError::SeatResolution { .. })
    }
}
