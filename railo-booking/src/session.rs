use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;
use railo_catalog::{CarNumber, FareClass, SeatCode, SeatInventory, SeatMap};
use railo_order::{
    CommittedSelection, ReservationRequestBuilder, SeatSelector, SelectionStatus, SelectionSummary, ToggleOutcome,
    TripSegment,
};
use railo_shared::{PassengerGroup, ReservationDetail, ReservationResponse, ReservationStatus};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::client::{CancelOutcome, ReservationService};
use crate::error::{SessionError, SessionResult};

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Result of a lifecycle call that may have outlived its session
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    Applied(T),
    /// The session was closed while the call was in flight; nothing was applied
    Discarded,
}

impl<T> Outcome<T> {
    pub fn applied(self) -> Option<T> {
        match self {
            Outcome::Applied(value) => Some(value),
            Outcome::Discarded => None,
        }
    }
}

/// Reservation detail together with its presentation state
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationView {
    pub detail: ReservationDetail,
    pub status: ReservationStatus,
    pub time_remaining: Option<Duration>,
    pub expiring_soon: bool,
}

impl ReservationView {
    pub fn at(detail: ReservationDetail, now: DateTime<Utc>, hold_warning: Duration) -> Self {
        Self {
            status: detail.status_at(now),
            time_remaining: detail.time_remaining(now),
            expiring_soon: detail.expires_within(now, hold_warning),
            detail,
        }
    }
}

#[derive(Debug)]
struct SessionState {
    selector: SeatSelector,
    reservation_id: Option<i64>,
    closed: bool,
}

/// Marks the session busy for the lifetime of one lifecycle call.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> SessionResult<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| InFlight(flag))
            .map_err(|_| SessionError::Busy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// One traveler's trip from seat picking to a held reservation.
///
/// Seat selection is applied synchronously under one lock, and the busy and
/// closed checks are made under that same lock. Lifecycle calls run one at a
/// time; while one is pending every other operation gets `Busy`.
/// `close` drops the selection at once and any call still in flight comes back
/// as `Outcome::Discarded`.
pub struct BookingSession<S: ReservationService> {
    service: Arc<S>,
    inventory: Arc<dyn SeatInventory>,
    segment: TripSegment,
    clock: Arc<dyn Clock>,
    hold_warning: Duration,
    state: Mutex<SessionState>,
    in_flight: AtomicBool,
}

impl<S: ReservationService> BookingSession<S> {
    pub fn new(service: Arc<S>, inventory: Arc<dyn SeatInventory>, segment: TripSegment) -> Self {
        Self {
            service,
            inventory,
            segment,
            clock: Arc::new(SystemClock),
            hold_warning: Duration::minutes(3),
            state: Mutex::new(SessionState {
                selector: SeatSelector::new(),
                reservation_id: None,
                closed: false,
            }),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_hold_warning(mut self, hold_warning: Duration) -> Self {
        self.hold_warning = hold_warning;
        self
    }

    pub fn segment(&self) -> &TripSegment {
        &self.segment
    }

    pub fn is_closed(&self) -> bool {
        self.state.lock().closed
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Id of the reservation created by this session, if any
    pub fn reservation_id(&self) -> Option<i64> {
        self.state.lock().reservation_id
    }

    pub fn selection_status(&self) -> SelectionStatus {
        self.state.lock().selector.status()
    }

    pub fn summary(&self) -> Option<SelectionSummary> {
        self.state.lock().selector.summary()
    }

    pub fn seat_map(&self) -> Option<SeatMap> {
        self.state.lock().selector.seat_map()
    }

    pub fn open_selection(&self, fare_class: FareClass, passengers: Vec<PassengerGroup>) -> SessionResult<()> {
        self.with_selector(|selector| selector.open(fare_class, passengers))
    }

    pub fn toggle(&self, code: SeatCode) -> SessionResult<ToggleOutcome> {
        self.with_selector(|selector| selector.toggle(code))
    }

    pub fn change_car(&self, car: CarNumber) -> SessionResult<()> {
        self.with_selector(|selector| selector.change_car(car))
    }

    pub fn commit(&self) -> SessionResult<CommittedSelection> {
        self.with_selector(|selector| selector.commit())
    }

    /// Cancel the seat dialog. The session stays usable.
    pub fn close_selection(&self) -> SessionResult<()> {
        self.with_selector(|selector| {
            selector.close();
            Ok(())
        })
    }

    /// Build the request from the committed selection and create the
    /// reservation. The selection is discarded once the server accepts it.
    /// Seats without an inventory id send the selection back for re-picking.
    pub async fn submit(&self) -> SessionResult<Outcome<ReservationResponse>> {
        let (_guard, request) = {
            let mut state = self.state.lock();
            let guard = self.begin_call(&state)?;
            let built = ReservationRequestBuilder::new(self.inventory.as_ref())
                .build_from_selector(&state.selector, &self.segment);

            match built {
                Ok(request) => (guard, request),
                Err(e) => {
                    if e.requires_reselection() {
                        tracing::warn!("Reservation not sent, seats must be picked again: {}", e);
                        state.selector.reject_commit()?;
                    }
                    return Err(e.into());
                }
            }
        };

        let result = self.service.create(&request).await;

        let mut state = self.state.lock();
        if state.closed {
            log_discarded("create", result.as_ref().err());
            return Ok(Outcome::Discarded);
        }
        let response = result?;
        state.selector.close();
        state.reservation_id = Some(response.reservation_id);
        Ok(Outcome::Applied(response))
    }

    /// Fetch the detail and judge it against the session clock. An expired
    /// hold is reported, never cancelled.
    pub async fn refresh_detail(&self, reservation_id: i64) -> SessionResult<Outcome<ReservationView>> {
        let _guard = {
            let state = self.state.lock();
            self.begin_call(&state)?
        };

        let result = self.service.fetch_detail(reservation_id).await;
        if self.is_closed() {
            log_discarded("detail", result.as_ref().err());
            return Ok(Outcome::Discarded);
        }

        let view = ReservationView::at(result?, self.clock.now(), self.hold_warning);
        if view.status == ReservationStatus::Expired {
            tracing::info!(reservation_id, expires_at = %view.detail.expires_at, "Reservation hold has expired");
        }
        Ok(Outcome::Applied(view))
    }

    pub async fn cancel_reservation(&self, reservation_id: i64) -> SessionResult<Outcome<CancelOutcome>> {
        let _guard = {
            let state = self.state.lock();
            self.begin_call(&state)?
        };

        let result = self.service.cancel(reservation_id).await;

        let mut state = self.state.lock();
        if state.closed {
            log_discarded("cancel", result.as_ref().err());
            return Ok(Outcome::Discarded);
        }
        let outcome = result?;
        if state.reservation_id == Some(reservation_id) {
            state.reservation_id = None;
        }
        Ok(Outcome::Applied(outcome))
    }

    /// Tear the session down. Does not cancel a call already in flight.
    pub fn close(&self) {
        let mut state = self.state.lock();
        if state.closed {
            return;
        }
        state.closed = true;
        state.selector.close();
        tracing::info!(in_flight = self.is_busy(), "Booking session closed");
    }

    /// Mark a lifecycle call as started. Callers hold the state lock so the
    /// closed and busy checks cannot interleave with selection edits.
    fn begin_call(&self, state: &SessionState) -> SessionResult<InFlight<'_>> {
        if state.closed {
            return Err(SessionError::Closed);
        }
        InFlight::acquire(&self.in_flight)
    }

    fn with_selector<T>(
        &self,
        f: impl FnOnce(&mut SeatSelector) -> Result<T, railo_order::SelectionError>,
    ) -> SessionResult<T> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SessionError::Closed);
        }
        if self.is_busy() {
            return Err(SessionError::Busy);
        }
        Ok(f(&mut state.selector)?)
    }
}

fn log_discarded(call: &str, error: Option<&crate::error::ClientError>) {
    match error {
        Some(e) => tracing::warn!(call, error = %e, "Session closed mid-call, discarding failed result"),
        None => tracing::info!(call, "Session closed mid-call, discarding result"),
    }
}
