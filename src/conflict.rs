// Room/date overlap detection. A best-effort, low-latency pre-check over
// a store snapshot; the persistence layer remains the final arbiter.
use chrono::NaiveDate;
use std::sync::Arc;

use crate::error::{ChannelError, ChannelResult};
use crate::model::{InternalReservation, Room};
use crate::store::ReservationStore;

/// Outcome of a conflict check. Computed fresh on every call, never
/// persisted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConflictCheckResult {
    pub has_conflict: bool,
    pub conflicting: Vec<String>,
    pub alternatives: Vec<Room>,
    pub warnings: Vec<String>,
}

/// Two stays conflict iff their half-open intervals `[check_in, check_out)`
/// overlap; back-to-back checkout/check-in on the same day do not.
pub fn intervals_overlap(
    a_in: NaiveDate,
    a_out: NaiveDate,
    b_in: NaiveDate,
    b_out: NaiveDate,
) -> bool {
    a_in < b_out && b_in < a_out
}

pub struct ConflictDetector {
    store: Arc<dyn ReservationStore>,
}

impl ConflictDetector {
    pub fn new(store: Arc<dyn ReservationStore>) -> Self {
        Self { store }
    }

    /// Check a candidate stay against the store snapshot. `exclude` skips
    /// the reservation being modified so it does not conflict with itself.
    pub async fn check_new_reservation(
        &self,
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<&str>,
    ) -> ChannelResult<ConflictCheckResult> {
        if check_out <= check_in {
            return Err(ChannelError::Validation(format!(
                "check-out {check_out} must be after check-in {check_in}"
            )));
        }

        let existing = self.store.reservations_between(check_in, check_out).await?;
        let rooms = self.store.rooms().await?;
        Ok(Self::evaluate_snapshot(
            room_id, check_in, check_out, exclude, &rooms, &existing,
        ))
    }

    /// Pick a free room of the given type for the stay, lowest room number
    /// first. Used when ingesting pulled reservations, which carry only a
    /// room type.
    pub async fn find_free_room(
        &self,
        room_type_code: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
    ) -> ChannelResult<Option<Room>> {
        let existing = self.store.reservations_between(check_in, check_out).await?;
        let rooms = self.store.rooms().await?;

        let mut candidates: Vec<Room> = rooms
            .into_iter()
            .filter(|room| room.room_type_code == room_type_code)
            .filter(|room| room_is_free(&room.id, check_in, check_out, None, &existing))
            .collect();
        candidates.sort_by(|a, b| a.number.cmp(&b.number));
        Ok(candidates.into_iter().next())
    }

    /// Pure evaluation over an in-memory snapshot. Exposed so the hot path
    /// can be exercised directly (see the benchmark).
    pub fn evaluate_snapshot(
        room_id: &str,
        check_in: NaiveDate,
        check_out: NaiveDate,
        exclude: Option<&str>,
        rooms: &[Room],
        existing: &[InternalReservation],
    ) -> ConflictCheckResult {
        let conflicting: Vec<String> = existing
            .iter()
            .filter(|r| r.room_id == room_id)
            .filter(|r| r.status.blocks_room())
            .filter(|r| exclude != Some(r.id.as_str()))
            .filter(|r| intervals_overlap(check_in, check_out, r.check_in, r.check_out))
            .map(|r| r.id.clone())
            .collect();

        let room_type = rooms
            .iter()
            .find(|room| room.id == room_id)
            .map(|room| room.room_type_code.clone());

        let mut alternatives = Vec::new();
        let mut warnings = Vec::new();

        if let Some(room_type) = room_type {
            let mut free_same_type: Vec<Room> = rooms
                .iter()
                .filter(|room| room.room_type_code == room_type)
                .filter(|room| room.id != room_id)
                .filter(|room| room_is_free(&room.id, check_in, check_out, exclude, existing))
                .cloned()
                .collect();
            free_same_type.sort_by(|a, b| a.number.cmp(&b.number));

            let requested_is_free = conflicting.is_empty();
            let remaining = free_same_type.len() + usize::from(requested_is_free);
            if remaining <= 1 {
                warnings.push(format!(
                    "low availability: {remaining} room(s) of type {room_type} left for {check_in}..{check_out}"
                ));
            }

            if !conflicting.is_empty() {
                alternatives = free_same_type;
            }
        }

        ConflictCheckResult {
            has_conflict: !conflicting.is_empty(),
            conflicting,
            alternatives,
            warnings,
        }
    }
}

fn room_is_free(
    room_id: &str,
    check_in: NaiveDate,
    check_out: NaiveDate,
    exclude: Option<&str>,
    existing: &[InternalReservation],
) -> bool {
    !existing
        .iter()
        .filter(|r| r.room_id == room_id)
        .filter(|r| r.status.blocks_room())
        .filter(|r| exclude != Some(r.id.as_str()))
        .any(|r| intervals_overlap(check_in, check_out, r.check_in, r.check_out))
}
