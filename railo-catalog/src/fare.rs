use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::seat_map::{CarLayout, CarNumber, RESERVED_CAR};

/// Fare class chosen on the train list
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FareClass {
    General,
    Reserved,
    /// Standing tickets still walk through the seat grid and may pick any car.
    /// Whether they should choose seats at all is unresolved; the flow keeps
    /// the observed behavior until the service owners decide.
    Standing,
}

impl FareClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FareClass::General => "GENERAL",
            FareClass::Reserved => "RESERVED",
            FareClass::Standing => "STANDING",
        }
    }

    /// Cars a passenger holding this fare may pick seats in.
    pub fn legal_cars(&self) -> Vec<CarNumber> {
        CarNumber::all().filter(|car| self.allows(*car)).collect()
    }

    pub fn allows(&self, car: CarNumber) -> bool {
        match self {
            FareClass::Reserved => car.get() == RESERVED_CAR,
            FareClass::General => car.get() != RESERVED_CAR,
            FareClass::Standing => true,
        }
    }

    /// Car shown when seat selection opens
    pub fn initial_car(&self) -> CarNumber {
        match self {
            FareClass::Reserved => CarNumber::RESERVED,
            FareClass::General | FareClass::Standing => CarNumber::FIRST,
        }
    }

    /// Entries of the car picker: every legal car with its seat count and the
    /// class its layout implies.
    pub fn car_options(&self) -> Vec<CarOption> {
        self.legal_cars()
            .into_iter()
            .map(|car| CarOption {
                car,
                seat_count: car.layout().capacity(),
                label: implied_fare_class(car),
            })
            .collect()
    }
}

impl fmt::Display for FareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FareClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GENERAL" => Ok(FareClass::General),
            "RESERVED" => Ok(FareClass::Reserved),
            "STANDING" => Ok(FareClass::Standing),
            other => Err(format!("unknown fare class: {}", other)),
        }
    }
}

/// Header label for a car. Depends on the car's layout only, never on the
/// fare class the traveler picked.
pub fn implied_fare_class(car: CarNumber) -> FareClass {
    match car.layout() {
        CarLayout::Reserved => FareClass::Reserved,
        CarLayout::General => FareClass::General,
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct CarOption {
    pub car: CarNumber,
    pub seat_count: usize,
    pub label: FareClass,
}

impl fmt::Display for CarOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Car {} ({} seats) {}", self.car, self.seat_count, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbers(cars: Vec<CarNumber>) -> Vec<u8> {
        cars.into_iter().map(|c| c.get()).collect()
    }

    #[test]
    fn test_legal_cars_per_fare_class() {
        assert_eq!(numbers(FareClass::Reserved.legal_cars()), vec![2]);
        assert_eq!(numbers(FareClass::General.legal_cars()), vec![1, 3, 4, 5, 6]);
        assert_eq!(numbers(FareClass::Standing.legal_cars()), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_initial_car() {
        assert_eq!(FareClass::Reserved.initial_car().get(), 2);
        assert_eq!(FareClass::General.initial_car().get(), 1);
        assert_eq!(FareClass::Standing.initial_car().get(), 1);
        for fare in [FareClass::General, FareClass::Reserved, FareClass::Standing] {
            assert!(fare.allows(fare.initial_car()));
        }
    }

    #[test]
    fn test_implied_label_ignores_chosen_fare() {
        let car2 = CarNumber::new(2).unwrap();
        let car5 = CarNumber::new(5).unwrap();
        assert_eq!(implied_fare_class(car2), FareClass::Reserved);
        assert_eq!(implied_fare_class(car5), FareClass::General);

        // A standing passenger browsing car 2 still sees the premium header.
        let option = FareClass::Standing
            .car_options()
            .into_iter()
            .find(|o| o.car == car2)
            .unwrap();
        assert_eq!(option.label, FareClass::Reserved);
        assert_eq!(option.seat_count, 42);
        assert_eq!(option.to_string(), "Car 2 (42 seats) RESERVED");
    }

    #[test]
    fn test_fare_class_parsing() {
        assert_eq!("reserved".parse::<FareClass>().unwrap(), FareClass::Reserved);
        assert!("first".parse::<FareClass>().is_err());
    }
}
