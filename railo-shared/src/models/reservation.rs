use crate::models::passenger::{total_seats, PassengerGroup, PassengerType};
use crate::models::wire_time;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Itinerary shape. The service only accepts one-way trips.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum TripType {
    #[default]
    #[serde(rename = "OW")]
    OneWay,
}

/// Body of `POST /api/v1/booking/reservation`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    pub train_schedule_id: i64,
    pub departure_station_id: i64,
    pub arrival_station_id: i64,
    pub passengers: Vec<PassengerGroup>,
    pub seat_ids: Vec<i64>,
    pub trip_type: TripType,
}

impl ReservationRequest {
    /// One seat id per traveler.
    pub fn is_consistent(&self) -> bool {
        self.seat_ids.len() == total_seats(&self.passengers)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub reservation_id: i64,
    pub seat_reservation_ids: Vec<i64>,
}

/// Body of `DELETE /api/v1/booking/reservation`
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CancelReservationRequest {
    pub reservation_id: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetail {
    pub reservation_id: i64,
    pub reservation_code: String,
    pub train_number: String,
    pub train_name: String,
    pub departure_station_name: String,
    pub arrival_station_name: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub operation_date: String,
    #[serde(deserialize_with = "wire_time::deserialize")]
    pub expires_at: DateTime<Utc>,
    pub seats: Vec<SeatReservation>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SeatReservation {
    pub seat_reservation_id: i64,
    pub passenger_type: PassengerType,
    pub car_number: i32,
    pub car_type: String,
    pub seat_number: String,
    pub base_fare: i64,
    pub fare: i64,
}

/// Presentation state of a held reservation. Expiry never triggers a cancel.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReservationStatus {
    Active,
    Expired,
}

impl ReservationDetail {
    pub fn status_at(&self, now: DateTime<Utc>) -> ReservationStatus {
        if now > self.expires_at {
            ReservationStatus::Expired
        } else {
            ReservationStatus::Active
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.status_at(now) == ReservationStatus::Expired
    }

    /// Time left on the hold, `None` once the deadline has passed.
    pub fn time_remaining(&self, now: DateTime<Utc>) -> Option<Duration> {
        let left = self.expires_at - now;
        (left >= Duration::zero()).then_some(left)
    }

    /// Still active but due to expire inside `window`.
    pub fn expires_within(&self, now: DateTime<Utc>, window: Duration) -> bool {
        self.time_remaining(now).is_some_and(|left| left <= window)
    }

    pub fn total_fare(&self) -> i64 {
        self.seats.iter().map(|s| s.fare).sum()
    }
}
