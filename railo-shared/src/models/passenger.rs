use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Passenger categories accepted by the reservation service
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PassengerType {
    Adult,
    Child,
    Infant,
    Senior,
    DisabledHeavy,
    DisabledLight,
    Veteran,
}

impl PassengerType {
    pub const ALL: [PassengerType; 7] = [
        PassengerType::Adult,
        PassengerType::Child,
        PassengerType::Infant,
        PassengerType::Senior,
        PassengerType::DisabledHeavy,
        PassengerType::DisabledLight,
        PassengerType::Veteran,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PassengerType::Adult => "ADULT",
            PassengerType::Child => "CHILD",
            PassengerType::Infant => "INFANT",
            PassengerType::Senior => "SENIOR",
            PassengerType::DisabledHeavy => "DISABLED_HEAVY",
            PassengerType::DisabledLight => "DISABLED_LIGHT",
            PassengerType::Veteran => "VETERAN",
        }
    }
}

impl fmt::Display for PassengerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PassengerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_uppercase();
        Self::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| format!("Unknown passenger type: {}", s))
    }
}

/// A number of travelers of the same type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PassengerGroup {
    pub passenger_type: PassengerType,
    pub count: u32,
}

impl PassengerGroup {
    pub fn new(passenger_type: PassengerType, count: u32) -> Self {
        Self { passenger_type, count }
    }
}

/// Number of seats a booking must hold: one per traveler across all groups.
pub fn total_seats(groups: &[PassengerGroup]) -> usize {
    groups.iter().map(|g| g.count as usize).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_seats_sums_groups() {
        let groups = vec![
            PassengerGroup::new(PassengerType::Adult, 2),
            PassengerGroup::new(PassengerType::Child, 1),
            PassengerGroup::new(PassengerType::Veteran, 0),
        ];
        assert_eq!(total_seats(&groups), 3);
        assert_eq!(total_seats(&[]), 0);
    }

    #[test]
    fn test_passenger_type_parses_wire_names() {
        assert_eq!("DISABLED_HEAVY".parse::<PassengerType>().unwrap(), PassengerType::DisabledHeavy);
        assert_eq!("senior".parse::<PassengerType>().unwrap(), PassengerType::Senior);
        assert!("PET".parse::<PassengerType>().is_err());
    }

    #[test]
    fn test_passenger_group_wire_shape() {
        let group = PassengerGroup::new(PassengerType::DisabledHeavy, 1);
        let json = serde_json::to_value(group).unwrap();
        assert_eq!(json, serde_json::json!({ "passengerType": "DISABLED_HEAVY", "count": 1 }));
    }
}
