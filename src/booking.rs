// Direct booking entry point: conflict pre-check, optimistic local
// insert, then authoritative persistence with rollback on failure.
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::conflict::{ConflictCheckResult, ConflictDetector};
use crate::error::ChannelResult;
use crate::model::{
    BookingSource, GuestProfile, InternalReservation, PricingBreakdown, ReservationStatus,
};
use crate::optimistic::OptimisticCoordinator;
use crate::store::{NotificationSink, Severity};

/// A booking as the front desk submits it.
#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub room_id: String,
    pub room_type_code: String,
    pub guest: GuestProfile,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub pricing: PricingBreakdown,
    pub source: BookingSource,
}

/// Result of a create attempt. A conflict is a normal business outcome,
/// not an error; callers present the alternatives to the user.
#[derive(Debug, Clone)]
pub enum BookingOutcome {
    Created(InternalReservation),
    Conflict(ConflictCheckResult),
}

/// Authoritative persistence step supplied by the caller. Receives the
/// speculative record and returns the stored one with its final id.
pub type PersistFn =
    Box<dyn Fn(InternalReservation) -> BoxFuture<'static, ChannelResult<InternalReservation>> + Send + Sync>;

/// Creates reservations with immediate local visibility. The `visible`
/// map is what calendar views read; it always reflects either the
/// pre-call state or a settled outcome, never a half-applied one.
pub struct BookingService {
    detector: Arc<ConflictDetector>,
    coordinator: OptimisticCoordinator,
    visible: DashMap<String, InternalReservation>,
    notifier: Arc<dyn NotificationSink>,
    next_temp: AtomicU64,
}

impl BookingService {
    pub fn new(detector: Arc<ConflictDetector>, notifier: Arc<dyn NotificationSink>) -> Self {
        Self {
            detector,
            coordinator: OptimisticCoordinator::new(),
            visible: DashMap::new(),
            notifier,
            next_temp: AtomicU64::new(1),
        }
    }

    /// Snapshot of the reservations currently visible to calendar views.
    pub fn visible_reservations(&self) -> Vec<InternalReservation> {
        self.visible.iter().map(|r| r.clone()).collect()
    }

    /// Create a booking. A blocking conflict short-circuits before any
    /// state is touched; persistence failure rolls the speculative record
    /// back and surfaces the error.
    pub async fn create_booking(
        &self,
        request: BookingRequest,
        persist: PersistFn,
    ) -> ChannelResult<BookingOutcome> {
        let check = self
            .detector
            .check_new_reservation(&request.room_id, request.check_in, request.check_out, None)
            .await?;

        for warning in &check.warnings {
            self.notifier
                .notify(Severity::Warning, "Availability warning", warning);
        }

        if check.has_conflict {
            warn!(
                room_id = %request.room_id,
                conflicting = check.conflicting.len(),
                "booking rejected by conflict check"
            );
            self.notifier.notify(
                Severity::Warning,
                "Room not available",
                &format!(
                    "Room {} is already booked for {}..{}; {} alternative(s) available",
                    request.room_id,
                    request.check_in,
                    request.check_out,
                    check.alternatives.len()
                ),
            );
            return Ok(BookingOutcome::Conflict(check));
        }

        let temp = self.speculative_record(&request);
        let temp_for_persist = temp.clone();
        let outcome = self
            .coordinator
            .optimistic_create(
                temp,
                |r: &InternalReservation| {
                    self.visible.insert(r.id.clone(), r.clone());
                },
                |r: &InternalReservation| {
                    self.visible.remove(&r.id);
                },
                persist(temp_for_persist),
            )
            .await;

        match outcome {
            Ok(reservation) => {
                info!(id = %reservation.id, room_id = %reservation.room_id, "booking created");
                self.notifier.notify(
                    Severity::Info,
                    "Booking created",
                    &format!(
                        "Reservation {} for {} confirmed",
                        reservation.id,
                        reservation.guest_id
                    ),
                );
                Ok(BookingOutcome::Created(reservation))
            }
            Err(error) => {
                warn!(%error, "booking persistence failed, local state rolled back");
                self.notifier.notify(
                    Severity::Error,
                    "Booking failed",
                    "The reservation could not be saved. Please retry, or contact support if the problem persists.",
                );
                Err(error)
            }
        }
    }

    fn speculative_record(&self, request: &BookingRequest) -> InternalReservation {
        let seq = self.next_temp.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        InternalReservation {
            id: format!("tmp-{seq}"),
            room_id: request.room_id.clone(),
            guest_id: request.guest.full_name(),
            room_type_code: request.room_type_code.clone(),
            check_in: request.check_in,
            check_out: request.check_out,
            adults: request.adults,
            children: request.children,
            status: ReservationStatus::Tentative,
            pricing: request.pricing.clone(),
            source: request.source,
            booking_reference: String::new(),
            created_at: now,
            modified_at: now,
        }
    }
}
