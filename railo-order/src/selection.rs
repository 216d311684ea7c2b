use crate::models::{CommittedSelection, SelectionState, SelectionStatus, SelectionSummary, ToggleOutcome};
use railo_catalog::{CarNumber, FareClass, SeatCode, SeatMap};
use railo_shared::{total_seats, PassengerGroup};
use tracing::debug;

/// Seat-selection state machine of one booking session.
///
/// `Idle -> Selecting -> Committed`, with `close` returning to `Idle` from
/// anywhere. Every operation either applies fully or leaves the state as it was.
#[derive(Debug, Clone)]
pub struct SeatSelector {
    status: SelectionStatus,
    state: Option<SelectionState>,
    committed: Option<CommittedSelection>,
}

impl SeatSelector {
    pub fn new() -> Self {
        Self {
            status: SelectionStatus::Idle,
            state: None,
            committed: None,
        }
    }

    pub fn status(&self) -> SelectionStatus {
        self.status
    }

    pub fn state(&self) -> Option<&SelectionState> {
        self.state.as_ref()
    }

    pub fn committed(&self) -> Option<&CommittedSelection> {
        self.committed.as_ref()
    }

    /// Open the dialog for `fare_class`. Starts on the fare's initial car with
    /// nothing selected.
    pub fn open(&mut self, fare_class: FareClass, passengers: Vec<PassengerGroup>) -> Result<(), SelectionError> {
        if self.status == SelectionStatus::Committed {
            return Err(SelectionError::InvalidTransition {
                from: self.status,
                to: SelectionStatus::Selecting,
            });
        }
        if total_seats(&passengers) == 0 {
            return Err(SelectionError::NoPassengers);
        }

        let state = SelectionState::new(fare_class, passengers);
        debug!(
            fare_class = %fare_class,
            car = %state.car,
            max_seats = state.max_seats(),
            "Seat selection opened"
        );

        self.state = Some(state);
        self.committed = None;
        self.status = SelectionStatus::Selecting;
        Ok(())
    }

    /// Pick or drop a seat in the active car. Dropping always succeeds;
    /// picking fails once every traveler has a seat.
    pub fn toggle(&mut self, code: SeatCode) -> Result<ToggleOutcome, SelectionError> {
        let state = self.selecting_mut()?;

        if let Some(pos) = state.selected.iter().position(|s| *s == code) {
            state.selected.remove(pos);
            return Ok(ToggleOutcome::Deselected);
        }

        if !state.car.layout().contains(&code) {
            return Err(SelectionError::UnknownSeat {
                car: state.car,
                code,
            });
        }

        if state.is_full() {
            return Err(SelectionError::Capacity {
                max_seats: state.max_seats(),
            });
        }

        state.selected.push(code);
        Ok(ToggleOutcome::Selected)
    }

    /// Switch to another car. Seat codes repeat across cars, so the current
    /// selection is always dropped.
    pub fn change_car(&mut self, car: CarNumber) -> Result<(), SelectionError> {
        let state = self.selecting_mut()?;

        if !state.fare_class.allows(car) {
            return Err(SelectionError::IllegalCar {
                car,
                fare_class: state.fare_class,
            });
        }

        let dropped = state.selected.len();
        state.selected.clear();
        state.car = car;
        debug!(car = %car, dropped, "Car changed, selection cleared");
        Ok(())
    }

    pub fn can_commit(&self) -> bool {
        match (&self.status, &self.state) {
            (SelectionStatus::Selecting, Some(state)) => state.selected.len() == state.max_seats(),
            _ => false,
        }
    }

    /// Freeze the selection once every traveler has exactly one seat.
    pub fn commit(&mut self) -> Result<CommittedSelection, SelectionError> {
        let state = self.selecting_mut()?;
        let required = state.max_seats();

        if state.selected.len() != required {
            return Err(SelectionError::IncompleteSelection {
                selected: state.selected.len(),
                required,
            });
        }

        let committed = CommittedSelection {
            fare_class: state.fare_class,
            car: state.car,
            seats: state.selected.clone(),
            passengers: state.passengers.clone(),
        };

        self.committed = Some(committed.clone());
        self.status = SelectionStatus::Committed;
        debug!(car = %committed.car, seats = committed.seats.len(), "Seat selection committed");
        Ok(committed)
    }

    /// Close the dialog and discard whatever was picked.
    pub fn close(&mut self) {
        self.status = SelectionStatus::Idle;
        self.state = None;
        self.committed = None;
    }

    /// Send a committed selection back for re-picking: same fare class, car
    /// and passengers, no seats. Used when the seats could not be booked.
    pub fn reject_commit(&mut self) -> Result<(), SelectionError> {
        match (self.status, self.state.as_mut()) {
            (SelectionStatus::Committed, Some(state)) => {
                state.selected.clear();
                self.committed = None;
                self.status = SelectionStatus::Selecting;
                debug!(car = %state.car, "Committed selection rejected, reselect seats");
                Ok(())
            }
            (status, _) => Err(SelectionError::InvalidTransition {
                from: status,
                to: SelectionStatus::Selecting,
            }),
        }
    }

    /// Seat grid of the active car
    pub fn seat_map(&self) -> Option<SeatMap> {
        self.state.as_ref().map(|s| SeatMap::generate(s.car, s.fare_class))
    }

    pub fn summary(&self) -> Option<SelectionSummary> {
        let can_commit = self.can_commit();
        self.state.as_ref().map(|s| SelectionSummary {
            car: s.car,
            seats: s.selected.clone(),
            selected_count: s.selected.len(),
            max_seats: s.max_seats(),
            can_commit,
        })
    }

    fn selecting_mut(&mut self) -> Result<&mut SelectionState, SelectionError> {
        let status = self.status;
        match (status, self.state.as_mut()) {
            (SelectionStatus::Selecting, Some(state)) => Ok(state),
            _ => Err(SelectionError::NotSelecting(status)),
        }
    }
}

impl Default for SeatSelector {
    fn default() -> Self {
        Self::new()
    }
}

/// Broad class of a selection failure, used by callers to decide how to
/// surface it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Blocked up front; the triggering action should have been disabled
    Validation,
    /// Transient notice, state untouched
    Capacity,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectionError {
    #[error("Seat selection is not open (status {0:?})")]
    NotSelecting(SelectionStatus),

    #[error("Invalid selection transition from {from:?} to {to:?}")]
    InvalidTransition {
        from: SelectionStatus,
        to: SelectionStatus,
    },

    #[error("At least one passenger is required to select seats")]
    NoPassengers,

    #[error("Car {car} is not available for {fare_class} fares")]
    IllegalCar { car: CarNumber, fare_class: FareClass },

    #[error("Seat {code} does not exist in car {car}")]
    UnknownSeat { car: CarNumber, code: SeatCode },

    #[error("Selection incomplete: {selected} of {required} seats chosen")]
    IncompleteSelection { selected: usize, required: usize },

    #[error("Only {max_seats} seats can be selected")]
    Capacity { max_seats: usize },
}

impl SelectionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SelectionError::Capacity { .. } => ErrorKind::Capacity,
            _ => ErrorKind::Validation,
        }
    }
}
