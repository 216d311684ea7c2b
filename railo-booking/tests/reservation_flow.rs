use chrono::{Duration, TimeZone, Utc};
use railo_booking::app_config::ServiceConfig;
use railo_booking::{
    BookingSession, CancelOutcome, Clock, HttpReservationService, Outcome, SessionError,
};
use railo_catalog::{CarNumber, FareClass, InMemorySeatInventory, SeatCode};
use railo_core::StaticTokenAuth;
use railo_order::{ErrorKind, SelectionError, SelectionStatus, TripSegment};
use railo_shared::{PassengerGroup, PassengerType, ReservationStatus};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct FixedClock(chrono::DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> chrono::DateTime<Utc> {
        self.0
    }
}

fn seat(code: &str) -> SeatCode {
    code.parse().unwrap()
}

fn segment() -> TripSegment {
    TripSegment {
        train_schedule_id: 501,
        departure_station_id: 1,
        arrival_station_id: 9,
    }
}

fn http_service(server: &MockServer) -> Arc<HttpReservationService> {
    let config = ServiceConfig {
        base_url: server.uri(),
        timeout_seconds: 5,
    };
    let auth = Arc::new(StaticTokenAuth::new(Some("member-token".to_string())));
    Arc::new(HttpReservationService::new(&config, auth).unwrap())
}

fn detail_body(expires_at: &str) -> serde_json::Value {
    json!({
        "reservationId": 42,
        "reservationCode": "R20250710-0042",
        "trainNumber": "101",
        "trainName": "KTX",
        "departureStationName": "Seoul",
        "arrivalStationName": "Busan",
        "departureTime": "09:00",
        "arrivalTime": "11:40",
        "operationDate": "2025-07-10",
        "expiresAt": expires_at,
        "seats": [
            { "seatReservationId": 7, "passengerType": "ADULT", "carNumber": 1, "carType": "STANDARD", "seatNumber": "1A", "baseFare": 59800, "fare": 59800 },
            { "seatReservationId": 8, "passengerType": "ADULT", "carNumber": 1, "carType": "STANDARD", "seatNumber": "1B", "baseFare": 59800, "fare": 59800 }
        ]
    })
}

#[tokio::test]
async fn test_select_submit_and_cancel() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/booking/reservation"))
        .and(header("authorization", "Bearer member-token"))
        .and(body_json(json!({
            "trainScheduleId": 501,
            "departureStationId": 1,
            "arrivalStationId": 9,
            "passengers": [{ "passengerType": "ADULT", "count": 2 }],
            "seatIds": [1, 2],
            "tripType": "OW"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reservationId": 42,
            "seatReservationIds": [7, 8]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/booking/reservation"))
        .and(body_json(json!({ "reservationId": 42 })))
        .respond_with(ResponseTemplate::new(200))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .and(path("/api/v1/booking/reservation"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let session = BookingSession::new(
        http_service(&server),
        Arc::new(InMemorySeatInventory::with_sequential_ids(1)),
        segment(),
    );

    session
        .open_selection(FareClass::General, vec![PassengerGroup::new(PassengerType::Adult, 2)])
        .unwrap();
    session.toggle(seat("1A")).unwrap();
    session.toggle(seat("1B")).unwrap();

    // A third seat is refused and nothing changes
    let err = session.toggle(seat("2A")).unwrap_err();
    match err {
        SessionError::Selection(e) => assert_eq!(e.kind(), ErrorKind::Capacity),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.summary().unwrap().seats, vec![seat("1A"), seat("1B")]);

    session.commit().unwrap();
    let response = session.submit().await.unwrap().applied().unwrap();
    assert_eq!(response.reservation_id, 42);
    assert_eq!(session.selection_status(), SelectionStatus::Idle);

    let first = session.cancel_reservation(42).await.unwrap();
    assert_eq!(first, Outcome::Applied(CancelOutcome::Cancelled));
    let second = session.cancel_reservation(42).await.unwrap();
    assert_eq!(second, Outcome::Applied(CancelOutcome::AlreadyCancelled));
}

#[tokio::test]
async fn test_car_change_drops_selection_before_submit() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/booking/reservation"))
        .and(body_json(json!({
            "trainScheduleId": 501,
            "departureStationId": 1,
            "arrivalStationId": 9,
            "passengers": [{ "passengerType": "SENIOR", "count": 1 }],
            "seatIds": [2000],
            "tripType": "OW"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "reservationId": 43,
            "seatReservationIds": [9]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let car1 = CarNumber::new(1).unwrap();
    let car3 = CarNumber::new(3).unwrap();
    let mut inventory = InMemorySeatInventory::new();
    inventory.insert(car1, seat("1A"), 1000).unwrap();
    inventory.insert(car3, seat("1A"), 2000).unwrap();

    let session = BookingSession::new(http_service(&server), Arc::new(inventory), segment());
    session
        .open_selection(FareClass::General, vec![PassengerGroup::new(PassengerType::Senior, 1)])
        .unwrap();
    session.toggle(seat("1A")).unwrap();

    session.change_car(car3).unwrap();
    assert!(session.summary().unwrap().seats.is_empty());

    // Car 2 belongs to RESERVED fares only
    let err = session.change_car(CarNumber::RESERVED).unwrap_err();
    assert!(matches!(err, SessionError::Selection(SelectionError::IllegalCar { .. })));

    session.toggle(seat("1A")).unwrap();
    session.commit().unwrap();
    let response = session.submit().await.unwrap().applied().unwrap();
    assert_eq!(response.reservation_id, 43);
}

#[tokio::test]
async fn test_expired_hold_is_shown_without_cancelling() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/booking/reservation/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("2025-07-10T09:10:00")))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    // 09:10 KST is 00:10 UTC; one minute later the hold has lapsed
    let now = Utc.with_ymd_and_hms(2025, 7, 10, 0, 11, 0).unwrap();
    let session = BookingSession::new(
        http_service(&server),
        Arc::new(InMemorySeatInventory::new()),
        segment(),
    )
    .with_clock(Arc::new(FixedClock(now)));

    let view = session.refresh_detail(42).await.unwrap().applied().unwrap();
    assert_eq!(view.status, ReservationStatus::Expired);
    assert_eq!(view.detail.total_fare(), 119600);
    assert_eq!(view.time_remaining, None);
}

#[tokio::test]
async fn test_active_hold_reports_time_left() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v1/booking/reservation/42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body("2025-07-10T00:10:00Z")))
        .mount(&server)
        .await;

    let now = Utc.with_ymd_and_hms(2025, 7, 10, 0, 0, 0).unwrap();
    let session = BookingSession::new(
        http_service(&server),
        Arc::new(InMemorySeatInventory::new()),
        segment(),
    )
    .with_clock(Arc::new(FixedClock(now)))
    .with_hold_warning(Duration::minutes(3));

    let view = session.refresh_detail(42).await.unwrap().applied().unwrap();
    assert_eq!(view.status, ReservationStatus::Active);
    assert_eq!(view.time_remaining, Some(Duration::minutes(10)));
    assert!(!view.expiring_soon);
}

#[tokio::test]
async fn test_server_failure_keeps_committed_selection() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/booking/reservation"))
        .respond_with(ResponseTemplate::new(500).set_body_string("inventory offline"))
        .expect(1)
        .mount(&server)
        .await;

    let session = BookingSession::new(
        http_service(&server),
        Arc::new(InMemorySeatInventory::with_sequential_ids(1)),
        segment(),
    );
    session
        .open_selection(FareClass::Reserved, vec![PassengerGroup::new(PassengerType::Adult, 1)])
        .unwrap();
    session.toggle(seat("5C")).unwrap();
    session.commit().unwrap();

    let err = session.submit().await.unwrap_err();
    match err {
        SessionError::Client(e) => assert_eq!(e.status(), Some(500)),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(session.selection_status(), SelectionStatus::Committed);
    assert_eq!(session.reservation_id(), None);
}
