use railo_catalog::{CarNumber, FareClass, SeatCode};
use railo_shared::{total_seats, PassengerGroup};
use serde::{Deserialize, Serialize};

/// Where the seat dialog is in its lifecycle
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SelectionStatus {
    /// Dialog closed, nothing selected
    Idle,
    /// Dialog open with a fare class and car
    Selecting,
    /// Selection handed over for request building
    Committed,
}

/// In-progress seat choice of one booking session
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionState {
    pub fare_class: FareClass,
    pub car: CarNumber,
    pub passengers: Vec<PassengerGroup>,
    pub(crate) selected: Vec<SeatCode>,
}

impl SelectionState {
    pub fn new(fare_class: FareClass, passengers: Vec<PassengerGroup>) -> Self {
        Self {
            fare_class,
            car: fare_class.initial_car(),
            passengers,
            selected: Vec::new(),
        }
    }

    /// Seat codes in the order they were picked
    pub fn selected(&self) -> &[SeatCode] {
        &self.selected
    }

    pub fn is_selected(&self, code: &SeatCode) -> bool {
        self.selected.contains(code)
    }

    pub fn max_seats(&self) -> usize {
        total_seats(&self.passengers)
    }

    pub fn is_full(&self) -> bool {
        self.selected.len() >= self.max_seats()
    }
}

/// Finalized selection ready for the request builder
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommittedSelection {
    pub fare_class: FareClass,
    pub car: CarNumber,
    pub seats: Vec<SeatCode>,
    pub passengers: Vec<PassengerGroup>,
}

impl CommittedSelection {
    pub fn max_seats(&self) -> usize {
        total_seats(&self.passengers)
    }
}

/// Footer data of the seat dialog: what is picked and how many remain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SelectionSummary {
    pub car: CarNumber,
    pub seats: Vec<SeatCode>,
    pub selected_count: usize,
    pub max_seats: usize,
    pub can_commit: bool,
}

impl SelectionSummary {
    pub fn seat_list(&self) -> String {
        if self.seats.is_empty() {
            "none".to_string()
        } else {
            self.seats.iter().map(|s| s.to_string()).collect::<Vec<_>>().join(", ")
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToggleOutcome {
    Selected,
    Deselected,
}
