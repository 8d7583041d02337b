// Collaborator seams: the persistence interface the engine consumes and
// the notification sink the UI layer provides.
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::error::{ChannelError, ChannelResult};
use crate::model::{InternalReservation, InternalReservationDraft, Room};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Sink for user-visible notifications (toasts, activity log).
pub trait NotificationSink: Send + Sync {
    fn notify(&self, severity: Severity, title: &str, message: &str);
}

/// CRUD + date-range interface over the property's reservation store. The
/// store is the true arbiter of room/date exclusivity; this engine only
/// runs a best-effort pre-check.
#[async_trait]
pub trait ReservationStore: Send + Sync {
    async fn create(&self, draft: InternalReservationDraft) -> ChannelResult<InternalReservation>;
    async fn get(&self, id: &str) -> ChannelResult<Option<InternalReservation>>;
    async fn update(&self, reservation: InternalReservation) -> ChannelResult<()>;
    async fn delete(&self, id: &str) -> ChannelResult<()>;
    /// Reservations whose stay overlaps `[start, end)`.
    async fn reservations_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ChannelResult<Vec<InternalReservation>>;
    async fn rooms(&self) -> ChannelResult<Vec<Room>>;
}

/// In-memory reservation store, used by the tests and the benchmark.
pub struct MemoryStore {
    reservations: DashMap<String, InternalReservation>,
    rooms: DashMap<String, Room>,
    next_id: AtomicU64,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            reservations: DashMap::new(),
            rooms: DashMap::new(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_rooms(rooms: Vec<Room>) -> Self {
        let store = Self::new();
        for room in rooms {
            store.rooms.insert(room.id.clone(), room);
        }
        store
    }

    pub fn insert_room(&self, room: Room) {
        self.rooms.insert(room.id.clone(), room);
    }

    pub fn reservation_count(&self) -> usize {
        self.reservations.len()
    }
}

#[async_trait]
impl ReservationStore for MemoryStore {
    async fn create(&self, draft: InternalReservationDraft) -> ChannelResult<InternalReservation> {
        let room_id = draft.room_id.clone().ok_or_else(|| {
            ChannelError::Validation("draft has no room assigned".to_string())
        })?;

        let seq = self.next_id.fetch_add(1, Ordering::SeqCst);
        let now = Utc::now();
        let reservation = InternalReservation {
            id: format!("res-{seq}"),
            room_id,
            guest_id: format!("guest-{seq}"),
            room_type_code: draft.room_type_code,
            check_in: draft.check_in,
            check_out: draft.check_out,
            adults: draft.adults,
            children: draft.children,
            status: draft.status,
            pricing: draft.pricing,
            source: draft.source,
            booking_reference: draft.booking_reference,
            created_at: now,
            modified_at: now,
        };
        self.reservations
            .insert(reservation.id.clone(), reservation.clone());
        Ok(reservation)
    }

    async fn get(&self, id: &str) -> ChannelResult<Option<InternalReservation>> {
        Ok(self.reservations.get(id).map(|r| r.clone()))
    }

    async fn update(&self, reservation: InternalReservation) -> ChannelResult<()> {
        let mut updated = reservation;
        updated.modified_at = Utc::now();
        self.reservations.insert(updated.id.clone(), updated);
        Ok(())
    }

    async fn delete(&self, id: &str) -> ChannelResult<()> {
        self.reservations.remove(id);
        Ok(())
    }

    async fn reservations_between(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> ChannelResult<Vec<InternalReservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.check_in < end && start < r.check_out)
            .map(|r| r.clone())
            .collect())
    }

    async fn rooms(&self) -> ChannelResult<Vec<Room>> {
        Ok(self.rooms.iter().map(|r| r.clone()).collect())
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use parking_lot::Mutex;

    /// Records every notification for assertion in tests.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub events: Mutex<Vec<(Severity, String, String)>>,
    }

    impl RecordingNotifier {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn titles(&self) -> Vec<String> {
            self.events
                .lock()
                .iter()
                .map(|(_, title, _)| title.clone())
                .collect()
        }

        pub fn has_severity(&self, severity: Severity) -> bool {
            self.events.lock().iter().any(|(s, _, _)| *s == severity)
        }
    }

    impl NotificationSink for RecordingNotifier {
        fn notify(&self, severity: Severity, title: &str, message: &str) {
            self.events
                .lock()
                .push((severity, title.to_string(), message.to_string()));
        }
    }
}
