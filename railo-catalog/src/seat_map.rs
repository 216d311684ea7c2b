use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::fare::FareClass;

pub const MIN_CAR: u8 = 1;
pub const MAX_CAR: u8 = 6;
pub const ROWS_PER_CAR: u8 = 14;

/// The one car fitted with the premium layout
pub const RESERVED_CAR: u8 = 2;

/// A carriage number, always within 1..=6
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "u8", into = "u8")]
pub struct CarNumber(u8);

impl CarNumber {
    pub const FIRST: CarNumber = CarNumber(MIN_CAR);
    pub const RESERVED: CarNumber = CarNumber(RESERVED_CAR);

    pub fn new(number: u8) -> Result<Self, SeatMapError> {
        if (MIN_CAR..=MAX_CAR).contains(&number) {
            Ok(Self(number))
        } else {
            Err(SeatMapError::InvalidCar(number))
        }
    }

    pub fn get(&self) -> u8 {
        self.0
    }

    /// Every car on the train, in order
    pub fn all() -> impl Iterator<Item = CarNumber> {
        (MIN_CAR..=MAX_CAR).map(CarNumber)
    }

    pub fn layout(&self) -> CarLayout {
        if self.0 == RESERVED_CAR {
            CarLayout::Reserved
        } else {
            CarLayout::General
        }
    }
}

impl TryFrom<u8> for CarNumber {
    type Error = SeatMapError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        CarNumber::new(value)
    }
}

impl From<CarNumber> for u8 {
    fn from(car: CarNumber) -> Self {
        car.0
    }
}

impl fmt::Display for CarNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum SeatColumn {
    A,
    B,
    C,
    D,
}

impl SeatColumn {
    pub fn as_char(&self) -> char {
        match self {
            SeatColumn::A => 'A',
            SeatColumn::B => 'B',
            SeatColumn::C => 'C',
            SeatColumn::D => 'D',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c.to_ascii_uppercase() {
            'A' => Some(SeatColumn::A),
            'B' => Some(SeatColumn::B),
            'C' => Some(SeatColumn::C),
            'D' => Some(SeatColumn::D),
            _ => None,
        }
    }
}

/// Seating arrangement of a car
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CarLayout {
    /// 2+2 seating, columns A-D
    General,
    /// 1+2 premium seating, columns A-C
    Reserved,
}

impl CarLayout {
    pub fn columns(&self) -> &'static [SeatColumn] {
        match self {
            CarLayout::General => &[SeatColumn::A, SeatColumn::B, SeatColumn::C, SeatColumn::D],
            CarLayout::Reserved => &[SeatColumn::A, SeatColumn::B, SeatColumn::C],
        }
    }

    pub fn rows(&self) -> u8 {
        ROWS_PER_CAR
    }

    pub fn capacity(&self) -> usize {
        self.columns().len() * self.rows() as usize
    }

    pub fn is_window(&self, column: SeatColumn) -> bool {
        match column {
            SeatColumn::A => true,
            SeatColumn::D => *self == CarLayout::General,
            SeatColumn::B | SeatColumn::C => false,
        }
    }

    pub fn contains(&self, code: &SeatCode) -> bool {
        (1..=self.rows()).contains(&code.row) && self.columns().contains(&code.column)
    }
}

/// Display identifier of a seat, e.g. `12C`. Only unique within one car.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct SeatCode {
    row: u8,
    column: SeatColumn,
}

impl SeatCode {
    pub fn new(row: u8, column: SeatColumn) -> Self {
        Self { row, column }
    }

    pub fn row(&self) -> u8 {
        self.row
    }

    pub fn column(&self) -> SeatColumn {
        self.column
    }
}

impl fmt::Display for SeatCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.row, self.column.as_char())
    }
}

impl FromStr for SeatCode {
    type Err = SeatMapError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let invalid = || SeatMapError::InvalidSeatCode(s.to_string());

        let mut chars = s.chars();
        let column = chars.next_back().and_then(SeatColumn::from_char).ok_or_else(invalid)?;
        let row_part = chars.as_str();
        if row_part.is_empty() || !row_part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let row: u8 = row_part.parse().map_err(|_| invalid())?;
        if row == 0 {
            return Err(invalid());
        }

        Ok(SeatCode { row, column })
    }
}

impl TryFrom<String> for SeatCode {
    type Error = SeatMapError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<SeatCode> for String {
    fn from(code: SeatCode) -> Self {
        code.to_string()
    }
}

/// One seat in a generated map. Availability is the server's business, so
/// every generated seat is selectable.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct Seat {
    pub code: SeatCode,
    pub row: u8,
    pub column: SeatColumn,
    pub is_window: bool,
}

/// Logical seat grid of one car
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SeatMap {
    pub car: CarNumber,
    pub layout: CarLayout,
    pub seats: Vec<Seat>,
}

impl SeatMap {
    /// Build the grid for `car`, row by row. The layout follows the car alone;
    /// the fare class never changes the grid of a legal car.
    pub fn generate(car: CarNumber, _fare_class: FareClass) -> Self {
        let layout = car.layout();
        let mut seats = Vec::with_capacity(layout.capacity());

        for row in 1..=layout.rows() {
            for &column in layout.columns() {
                seats.push(Seat {
                    code: SeatCode::new(row, column),
                    row,
                    column,
                    is_window: layout.is_window(column),
                });
            }
        }

        Self { car, layout, seats }
    }

    pub fn capacity(&self) -> usize {
        self.seats.len()
    }

    pub fn columns(&self) -> &'static [SeatColumn] {
        self.layout.columns()
    }

    pub fn contains(&self, code: &SeatCode) -> bool {
        self.layout.contains(code)
    }

    pub fn get(&self, code: &SeatCode) -> Option<&Seat> {
        self.seats.iter().find(|s| s.code == *code)
    }

    /// Seats of one column front to back, the order a car strip is drawn in.
    pub fn column_strip(&self, column: SeatColumn) -> impl Iterator<Item = &Seat> {
        self.seats.iter().filter(move |s| s.column == column)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SeatMapError {
    #[error("Car {0} does not exist (cars are numbered 1-6)")]
    InvalidCar(u8),

    #[error("Invalid seat code: {0:?}")]
    InvalidSeatCode(String),
}
