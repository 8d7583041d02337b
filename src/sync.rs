// Sync orchestration: a FIFO queue of outbound pushes and inbound pulls,
// processed one at a time with exponential backoff on transient failures.
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::codec::{AvailabilityStatus, AvailabilityUpdate, MessageCodec, RateUpdate, ReservationNotif};
use crate::conflict::ConflictDetector;
use crate::error::{ChannelError, ChannelResult};
use crate::mapper::map_external_to_internal;
use crate::model::{ChannelConfig, ExternalReservation, ReservationStatus};
use crate::store::{NotificationSink, ReservationStore, Severity};
use crate::transport::ChannelTransport;

/// Retry policy for transient transport failures.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub backoff_multiplier: f64,
    pub jitter_factor: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_backoff_ms: 100,
            max_backoff_ms: 10_000,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }
}

/// Exponential backoff with jitter to avoid synchronized retries.
pub fn calculate_backoff(retry_attempt: u32, config: &RetryConfig) -> Duration {
    let base_backoff_ms = (config.initial_backoff_ms as f64
        * config.backoff_multiplier.powf(retry_attempt as f64))
    .min(config.max_backoff_ms as f64);

    let jitter = rand::random::<f64>() * config.jitter_factor * base_backoff_ms;
    let backoff_ms = base_backoff_ms * (1.0 - config.jitter_factor / 2.0) + jitter;

    Duration::from_millis(backoff_ms as u64)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncKind {
    AvailabilityPush,
    RatePush,
    ReservationPush,
    ReservationPull,
}

/// Work item payload. Pushes carry their message parameters; a pull
/// carries none, it asks the channel for everything undelivered.
#[derive(Debug, Clone)]
pub enum SyncPayload {
    Availability(AvailabilityUpdate),
    Rates(RateUpdate),
    Reservation(ReservationNotif),
    Pull,
}

impl SyncPayload {
    fn kind(&self) -> SyncKind {
        match self {
            SyncPayload::Availability(_) => SyncKind::AvailabilityPush,
            SyncPayload::Rates(_) => SyncKind::RatePush,
            SyncPayload::Reservation(_) => SyncKind::ReservationPush,
            SyncPayload::Pull => SyncKind::ReservationPull,
        }
    }
}

#[derive(Debug, Clone)]
pub struct SyncQueueEntry {
    pub id: u64,
    pub kind: SyncKind,
    payload: SyncPayload,
    pub attempts: u32,
    pub next_retry_at: Option<DateTime<Utc>>,
}

/// What the orchestrator is doing right now, for status displays.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    PushingAvailability,
    PushingRates,
    PushingReservations,
    PullingReservations,
    Confirming,
}

/// Summary of one `trigger_sync` run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncReport {
    pub processed: u64,
    pub failed: u64,
    pub reservations_ingested: u64,
}

/// Drives the synchronization cycle for one channel. Entries are handled
/// strictly in enqueue order; a failing entry is retried in place so later
/// entries never overtake it.
pub struct SyncOrchestrator {
    config: ChannelConfig,
    codec: MessageCodec,
    transport: Arc<dyn ChannelTransport>,
    store: Arc<dyn ReservationStore>,
    detector: ConflictDetector,
    notifier: Arc<dyn NotificationSink>,
    retry: RetryConfig,
    queue: Mutex<VecDeque<SyncQueueEntry>>,
    next_id: AtomicU64,
    state: Mutex<SyncState>,
}

impl SyncOrchestrator {
    pub fn new(
        config: ChannelConfig,
        transport: Arc<dyn ChannelTransport>,
        store: Arc<dyn ReservationStore>,
        notifier: Arc<dyn NotificationSink>,
        retry: RetryConfig,
    ) -> Self {
        let detector = ConflictDetector::new(Arc::clone(&store));
        Self {
            config,
            codec: MessageCodec::new(),
            transport,
            store,
            detector,
            notifier,
            retry,
            queue: Mutex::new(VecDeque::new()),
            next_id: AtomicU64::new(1),
            state: Mutex::new(SyncState::Idle),
        }
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock()
    }

    pub fn queue_len(&self) -> usize {
        self.queue.lock().len()
    }

    pub fn enqueue_availability(&self, update: AvailabilityUpdate) -> u64 {
        self.enqueue(SyncPayload::Availability(update))
    }

    pub fn enqueue_rates(&self, update: RateUpdate) -> u64 {
        self.enqueue(SyncPayload::Rates(update))
    }

    pub fn enqueue_reservation(&self, notif: ReservationNotif) -> u64 {
        self.enqueue(SyncPayload::Reservation(notif))
    }

    pub fn enqueue_pull(&self) -> u64 {
        self.enqueue(SyncPayload::Pull)
    }

    fn enqueue(&self, payload: SyncPayload) -> u64 {
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let kind = payload.kind();
        self.queue.lock().push_back(SyncQueueEntry {
            id,
            kind,
            payload,
            attempts: 0,
            next_retry_at: None,
        });
        debug!(id, ?kind, "sync task enqueued");
        id
    }

    /// Remove a queued entry that has not started processing. Returns
    /// whether anything was removed.
    pub fn cancel(&self, id: u64) -> bool {
        let mut queue = self.queue.lock();
        let before = queue.len();
        queue.retain(|entry| entry.id != id);
        queue.len() != before
    }

    /// Drain the queue front to back. Each entry is attempted up to
    /// `max_retries + 1` times with backoff between attempts; a terminal
    /// failure is reported and the cycle moves on to the next entry.
    pub async fn trigger_sync(&self) -> SyncReport {
        let mut report = SyncReport::default();

        loop {
            let entry = match self.queue.lock().pop_front() {
                Some(entry) => entry,
                None => break,
            };
            let (id, kind) = (entry.id, entry.kind);

            match self.process_with_retries(entry, &mut report).await {
                Ok(()) => report.processed += 1,
                Err(error) => {
                    report.failed += 1;
                    warn!(id, ?kind, %error, "sync task failed permanently");
                    self.notifier.notify(
                        Severity::Error,
                        "Channel sync failed",
                        &format!("{kind:?} task could not be completed: {error}"),
                    );
                }
            }
        }

        *self.state.lock() = SyncState::Idle;
        report
    }

    /// The failing queue head is retried in place, never re-queued at the
    /// back, so later entries cannot overtake it.
    async fn process_with_retries(
        &self,
        mut entry: SyncQueueEntry,
        report: &mut SyncReport,
    ) -> ChannelResult<()> {
        loop {
            entry.attempts += 1;
            match self.process_entry(&entry, report).await {
                Ok(()) => return Ok(()),
                Err(error)
                    if error.is_retryable() && entry.attempts <= self.retry.max_retries =>
                {
                    let delay = calculate_backoff(entry.attempts - 1, &self.retry);
                    entry.next_retry_at =
                        Some(Utc::now() + ChronoDuration::milliseconds(delay.as_millis() as i64));
                    debug!(
                        id = entry.id,
                        attempts = entry.attempts,
                        delay_ms = delay.as_millis() as u64,
                        %error,
                        "transient failure, backing off"
                    );
                    Self::wait_until_due(&entry).await;
                }
                Err(error) => return Err(error),
            }
        }
    }

    /// Sleep until the entry's scheduled retry time; a schedule already in
    /// the past yields immediately.
    async fn wait_until_due(entry: &SyncQueueEntry) {
        if let Some(due) = entry.next_retry_at {
            let wait = (due - Utc::now()).to_std().unwrap_or_default();
            tokio::time::sleep(wait).await;
        }
    }

    async fn process_entry(
        &self,
        entry: &SyncQueueEntry,
        report: &mut SyncReport,
    ) -> ChannelResult<()> {
        match &entry.payload {
            SyncPayload::Availability(update) => {
                *self.state.lock() = SyncState::PushingAvailability;
                let update = self.apply_availability_policy(update.clone());
                let xml = self.codec.build_availability(&self.config.hotel_code, &update)?;
                self.transport
                    .send_soap_request(&xml, "OTA_HotelAvailNotifRQ", true)
                    .await?
                    .into_result()?;
                Ok(())
            }
            SyncPayload::Rates(update) => {
                *self.state.lock() = SyncState::PushingRates;
                let update = self.apply_rate_policy(update.clone());
                let xml = self.codec.build_rates(&self.config.hotel_code, &update)?;
                self.transport
                    .send_soap_request(&xml, "OTA_HotelRateAmountNotifRQ", true)
                    .await?
                    .into_result()?;
                Ok(())
            }
            SyncPayload::Reservation(notif) => {
                *self.state.lock() = SyncState::PushingReservations;
                let xml = self
                    .codec
                    .build_reservation_push(&self.config.hotel_code, notif)?;
                self.transport
                    .send_soap_request(&xml, "OTA_HotelResNotifRQ", true)
                    .await?
                    .into_result()?;
                Ok(())
            }
            SyncPayload::Pull => self.run_pull_cycle(report).await,
        }
    }

    /// Channel-level overrides applied to every outbound availability
    /// message: a stop-sale closes the room regardless of the requested
    /// status, and the channel's stay bounds fill in unset restrictions.
    fn apply_availability_policy(&self, mut update: AvailabilityUpdate) -> AvailabilityUpdate {
        if self.config.stop_sale {
            update.status = AvailabilityStatus::Close;
        }
        if update.min_stay.is_none() && self.config.min_stay > 1 {
            update.min_stay = Some(self.config.min_stay);
        }
        if update.max_stay.is_none() && self.config.max_stay > 0 {
            update.max_stay = Some(self.config.max_stay);
        }
        update
    }

    /// Rate adjustment is a channel-specific markup or markdown applied on
    /// top of the base amounts, e.g. 0.10 for +10%.
    fn apply_rate_policy(&self, mut update: RateUpdate) -> RateUpdate {
        if self.config.rate_adjustment != 0.0 {
            let factor = 1.0 + self.config.rate_adjustment;
            for amount in &mut update.base_amounts {
                amount.amount_after_tax *= factor;
            }
        }
        update
    }

    /// The three-step pull cycle: request undelivered reservations, ingest
    /// each one locally, then acknowledge the ones that were ingested so
    /// the channel stops redelivering them.
    async fn run_pull_cycle(&self, report: &mut SyncReport) -> ChannelResult<()> {
        *self.state.lock() = SyncState::PullingReservations;

        let request = self.codec.build_pull_request(&self.config.hotel_code)?;
        let response = self
            .transport
            .send_soap_request(&request, "OTA_ReadRQ", true)
            .await?
            .into_result()?;

        // A success response with no payload means nothing was waiting
        let body = match response.body {
            Some(body) if !body.trim().is_empty() => body,
            _ => return Ok(()),
        };
        let pull = self.codec.parse_pull_response(&body)?;

        for problem in &pull.errors {
            warn!(%problem, "skipping malformed reservation block");
            self.notifier.notify(
                Severity::Warning,
                "Reservation skipped",
                &format!("A pulled reservation could not be read: {problem}"),
            );
        }

        let mut ingested: Vec<String> = Vec::new();
        for external in &pull.reservations {
            match self.ingest_reservation(external).await {
                Ok(true) => {
                    report.reservations_ingested += 1;
                    ingested.push(external.external_id.clone());
                }
                // Already known locally; acknowledge so it is not re-sent
                Ok(false) => ingested.push(external.external_id.clone()),
                Err(error) => {
                    warn!(
                        external_id = %external.external_id,
                        %error,
                        "reservation left unacknowledged for redelivery"
                    );
                    self.notifier.notify(
                        Severity::Warning,
                        "Reservation not imported",
                        &format!(
                            "Reservation {} could not be imported: {error}",
                            external.external_id
                        ),
                    );
                }
            }
        }

        if !ingested.is_empty() {
            *self.state.lock() = SyncState::Confirming;
            let confirmation = self
                .codec
                .build_confirmation(&self.config.hotel_code, &ingested)?;
            self.transport
                .send_soap_request(&confirmation, "OTA_NotifReportRQ", true)
                .await?
                .into_result()?;
            info!(count = ingested.len(), "pulled reservations acknowledged");
        }

        Ok(())
    }

    /// Commit one pulled reservation locally. Returns `Ok(true)` when a new
    /// record was written, `Ok(false)` when the reservation was already
    /// known (duplicate delivery or cancellation of an existing stay).
    async fn ingest_reservation(&self, external: &ExternalReservation) -> ChannelResult<bool> {
        let draft = map_external_to_internal(external, &self.config)?;

        let existing = self
            .store
            .reservations_between(external.check_in, external.check_out)
            .await?;
        let known = existing
            .iter()
            .find(|r| r.booking_reference == draft.booking_reference);

        if external.sync_status == "Cancel" {
            match known {
                Some(current) => {
                    let mut cancelled = current.clone();
                    cancelled.status = ReservationStatus::Cancelled;
                    self.store.update(cancelled).await?;
                    info!(
                        booking_reference = %draft.booking_reference,
                        "reservation cancelled by channel"
                    );
                    self.notifier.notify(
                        Severity::Info,
                        "Reservation cancelled",
                        &format!("{} cancelled booking {}", external.channel_code, draft.booking_reference),
                    );
                }
                None => {
                    warn!(
                        booking_reference = %draft.booking_reference,
                        "cancellation for unknown reservation, acknowledging anyway"
                    );
                }
            }
            return Ok(false);
        }

        if known.is_some() {
            debug!(
                booking_reference = %draft.booking_reference,
                "duplicate delivery ignored"
            );
            return Ok(false);
        }

        let room = self
            .detector
            .find_free_room(&draft.room_type_code, draft.check_in, draft.check_out)
            .await?
            .ok_or_else(|| {
                ChannelError::Conflict(format!(
                    "no free {} room for {}..{}",
                    draft.room_type_code, draft.check_in, draft.check_out
                ))
            })?;

        let mut assigned = draft;
        assigned.room_id = Some(room.id);
        let created = self.store.create(assigned).await?;
        info!(
            id = %created.id,
            booking_reference = %created.booking_reference,
            "reservation imported from channel"
        );
        self.notifier.notify(
            Severity::Info,
            "New reservation",
            &format!(
                "{} booking {} imported into room {}",
                external.channel_code, created.booking_reference, created.room_id
            ),
        );
        Ok(true)
    }
}


#[cfg(test)]
mod tests {
    use super::mock_transport::MockTransport;
    use super::*;
    use crate::codec::GuestAmount;
    use crate::model::Room;
    use crate::store::testing::RecordingNotifier;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    const PULL_BODY: &str = r#"<OTA_ResRetrieveRS xmlns="http://www.opentravel.org/OTA/2003/05" TimeStamp="2025-08-30T10:00:00Z" Version="1.0">
      <ReservationsList>
        <HotelReservation CreateDateTime="2025-08-29T18:00:00Z" ResStatus="Commit" PaymentStatus="Prepaid">
          <UniqueID Type="14" ID="EXT-1001"/>
          <RoomStays>
            <RoomStay>
              <RoomTypes><RoomType RoomTypeCode="DBL"/></RoomTypes>
              <RatePlans><RatePlan RatePlanCode="BAR"/></RatePlans>
              <GuestCounts>
                <GuestCount AgeQualifyingCode="10" Count="2"/>
              </GuestCounts>
              <TimeSpan Start="2025-09-10" End="2025-09-13"/>
              <Total AmountAfterTax="342.50" CurrencyCode="EUR"/>
            </RoomStay>
          </RoomStays>
          <ResGuests>
            <ResGuest>
              <Profiles>
                <ProfileInfo>
                  <Profile ID="G-501">
                    <Customer>
                      <PersonName><GivenName>Lena</GivenName><Surname>Fischer</Surname></PersonName>
                      <Email>lena@example.com</Email>
                      <Telephone PhoneNumber="+491701234567"/>
                    </Customer>
                  </Profile>
                </ProfileInfo>
              </Profiles>
            </ResGuest>
          </ResGuests>
          <ResGlobalInfo>
            <HotelReservationIDs>
              <HotelReservationID ResID_Type="14" ResID_Value="BDC-777" ResID_Source="BDC"/>
            </HotelReservationIDs>
          </ResGlobalInfo>
        </HotelReservation>
      </ReservationsList>
    </OTA_ResRetrieveRS>"#;

    const EMPTY_PULL_BODY: &str = r#"<OTA_ResRetrieveRS xmlns="http://www.opentravel.org/OTA/2003/05" TimeStamp="2025-08-30T10:00:00Z" Version="1.0">
      <ReservationsList/>
    </OTA_ResRetrieveRS>"#;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn room(id: &str, number: &str, room_type: &str) -> Room {
        Room {
            id: id.to_string(),
            number: number.to_string(),
            room_type_code: room_type.to_string(),
            max_adults: 2,
            max_children: 2,
        }
    }

    fn fast_retry() -> RetryConfig {
        RetryConfig {
            max_retries: 2,
            initial_backoff_ms: 1,
            max_backoff_ms: 4,
            backoff_multiplier: 2.0,
            jitter_factor: 0.1,
        }
    }

    fn config() -> ChannelConfig {
        ChannelConfig {
            channel_code: "BDC".to_string(),
            hotel_code: "HOTEL1".to_string(),
            endpoint: "https://channel.example.com/ota".to_string(),
            commission_rate: 0.15,
            ..Default::default()
        }
    }

    struct Harness {
        orchestrator: SyncOrchestrator,
        transport: Arc<MockTransport>,
        store: Arc<MemoryStore>,
        notifier: Arc<RecordingNotifier>,
    }

    fn harness_with(config: ChannelConfig, rooms: Vec<Room>) -> Harness {
        let transport = Arc::new(MockTransport::new());
        let store = Arc::new(MemoryStore::with_rooms(rooms));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SyncOrchestrator::new(
            config,
            Arc::clone(&transport) as Arc<dyn ChannelTransport>,
            Arc::clone(&store) as Arc<dyn ReservationStore>,
            Arc::clone(&notifier) as Arc<dyn NotificationSink>,
            fast_retry(),
        );
        Harness {
            orchestrator,
            transport,
            store,
            notifier,
        }
    }

    fn harness() -> Harness {
        harness_with(config(), vec![room("room-1", "101", "DBL")])
    }

    fn availability(room_type: &str) -> AvailabilityUpdate {
        AvailabilityUpdate {
            room_type_code: room_type.to_string(),
            rate_plan_code: "BAR".to_string(),
            start: date("2025-09-01"),
            end: date("2025-09-30"),
            available_count: 5,
            status: AvailabilityStatus::Open,
            min_stay: None,
            max_stay: None,
            closed_to_arrival: false,
            closed_to_departure: false,
        }
    }

    fn rates(amount: f64) -> RateUpdate {
        RateUpdate {
            room_type_code: "DBL".to_string(),
            rate_plan_code: "BAR".to_string(),
            start: date("2025-09-01"),
            end: date("2025-09-30"),
            currency: "EUR".to_string(),
            base_amounts: vec![GuestAmount {
                guests: 2,
                amount_after_tax: amount,
            }],
        }
    }

    #[tokio::test]
    async fn test_pull_cycle_ingests_and_confirms() {
        let h = harness();
        h.transport.push_success(Some(PULL_BODY));
        h.transport.push_success(None); // confirmation ack

        h.orchestrator.enqueue_pull();
        let report = h.orchestrator.trigger_sync().await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(report.reservations_ingested, 1);
        assert_eq!(h.store.reservation_count(), 1);

        let actions = h.transport.actions();
        assert_eq!(actions, vec!["OTA_ReadRQ", "OTA_NotifReportRQ"]);
        let requests = h.transport.requests.lock();
        assert!(requests[1].0.contains("EXT-1001"));
    }

    #[tokio::test]
    async fn test_empty_pull_sends_no_confirmation() {
        let h = harness();
        h.transport.push_success(Some(EMPTY_PULL_BODY));

        h.orchestrator.enqueue_pull();
        let report = h.orchestrator.trigger_sync().await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.reservations_ingested, 0);
        assert_eq!(h.transport.request_count(), 1);
        assert_eq!(h.store.reservation_count(), 0);
    }

    #[tokio::test]
    async fn test_no_free_room_leaves_reservation_unconfirmed() {
        // Only a single room exists and its type does not match
        let h = harness_with(config(), vec![room("room-9", "901", "SGL")]);
        h.transport.push_success(Some(PULL_BODY));

        h.orchestrator.enqueue_pull();
        let report = h.orchestrator.trigger_sync().await;

        // The pull itself succeeds, but nothing was ingested or confirmed
        assert_eq!(report.processed, 1);
        assert_eq!(report.reservations_ingested, 0);
        assert_eq!(h.transport.request_count(), 1);
        assert_eq!(h.store.reservation_count(), 0);
        assert!(h.notifier.has_severity(Severity::Warning));
    }

    #[tokio::test]
    async fn test_duplicate_delivery_is_acknowledged_once() {
        let h = harness();
        h.transport.push_success(Some(PULL_BODY));
        h.transport.push_success(None);
        h.transport.push_success(Some(PULL_BODY));
        h.transport.push_success(None);

        h.orchestrator.enqueue_pull();
        h.orchestrator.trigger_sync().await;
        h.orchestrator.enqueue_pull();
        let second = h.orchestrator.trigger_sync().await;

        // The second delivery is acknowledged but no duplicate is created
        assert_eq!(second.reservations_ingested, 0);
        assert_eq!(h.store.reservation_count(), 1);
        assert_eq!(
            h.transport.actions(),
            vec![
                "OTA_ReadRQ",
                "OTA_NotifReportRQ",
                "OTA_ReadRQ",
                "OTA_NotifReportRQ"
            ]
        );
    }

    #[tokio::test]
    async fn test_pulled_cancellation_updates_existing_reservation() {
        let h = harness();
        h.transport.push_success(Some(PULL_BODY));
        h.transport.push_success(None);
        h.orchestrator.enqueue_pull();
        h.orchestrator.trigger_sync().await;

        let cancel_body = PULL_BODY.replace("ResStatus=\"Commit\"", "ResStatus=\"Cancel\"");
        h.transport.push_success(Some(cancel_body.as_str()));
        h.transport.push_success(None);
        h.orchestrator.enqueue_pull();
        h.orchestrator.trigger_sync().await;

        assert_eq!(h.store.reservation_count(), 1);
        let all = h
            .store
            .reservations_between(date("2025-09-10"), date("2025-09-13"))
            .await
            .unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, ReservationStatus::Cancelled);
    }

    #[tokio::test]
    async fn test_transient_failure_is_retried_then_succeeds() {
        let h = harness();
        h.transport
            .push_response(Err(ChannelError::Network("connection reset".to_string())));
        h.transport.push_success(None);

        h.orchestrator.enqueue_availability(availability("DBL"));
        let report = h.orchestrator.trigger_sync().await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.failed, 0);
        assert_eq!(h.transport.request_count(), 2);
        assert!(!h.notifier.has_severity(Severity::Error));
    }

    #[tokio::test]
    async fn test_retry_waits_for_the_scheduled_backoff() {
        let transport = Arc::new(MockTransport::new());
        transport.push_response(Err(ChannelError::Network("reset".to_string())));
        transport.push_success(None);
        let store = Arc::new(MemoryStore::with_rooms(vec![room("room-1", "101", "DBL")]));
        let notifier = Arc::new(RecordingNotifier::new());
        let orchestrator = SyncOrchestrator::new(
            config(),
            Arc::clone(&transport) as Arc<dyn ChannelTransport>,
            store as Arc<dyn ReservationStore>,
            notifier as Arc<dyn NotificationSink>,
            RetryConfig {
                max_retries: 1,
                initial_backoff_ms: 40,
                max_backoff_ms: 40,
                backoff_multiplier: 2.0,
                jitter_factor: 0.0,
            },
        );

        orchestrator.enqueue_availability(availability("DBL"));
        let started = tokio::time::Instant::now();
        let report = orchestrator.trigger_sync().await;

        assert_eq!(report.processed, 1);
        assert_eq!(transport.request_count(), 2);
        // One transient failure means one full scheduled wait before retry
        assert!(started.elapsed() >= Duration::from_millis(35));
    }

    #[tokio::test]
    async fn test_retry_ceiling_makes_failure_terminal() {
        let h = harness();
        for _ in 0..3 {
            h.transport
                .push_response(Err(ChannelError::Timeout(1000)));
        }

        h.orchestrator.enqueue_availability(availability("DBL"));
        let report = h.orchestrator.trigger_sync().await;

        assert_eq!(report.failed, 1);
        // max_retries = 2 means three attempts in total
        assert_eq!(h.transport.request_count(), 3);
        assert_eq!(h.orchestrator.queue_len(), 0);
        assert!(h.notifier.has_severity(Severity::Error));
    }

    #[tokio::test]
    async fn test_validation_failure_never_reaches_transport() {
        let h = harness();
        let mut bad = availability("DBL");
        bad.end = bad.start; // empty date range

        h.orchestrator.enqueue_availability(bad);
        let report = h.orchestrator.trigger_sync().await;

        assert_eq!(report.failed, 1);
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_soap_fault_is_not_retried() {
        let h = harness();
        h.transport.push_response(Ok(crate::codec::SoapResponse {
            success: false,
            body: None,
            fault: Some(crate::codec::SoapFault {
                code: "soap:Client".to_string(),
                message: "schema violation".to_string(),
            }),
            errors: Vec::new(),
            warnings: Vec::new(),
        }));

        h.orchestrator.enqueue_availability(availability("DBL"));
        let report = h.orchestrator.trigger_sync().await;

        assert_eq!(report.failed, 1);
        assert_eq!(h.transport.request_count(), 1);
    }

    #[tokio::test]
    async fn test_entries_are_processed_in_fifo_order() {
        let h = harness();
        h.transport.push_success(None);
        h.transport.push_success(None);

        h.orchestrator.enqueue_availability(availability("AAA"));
        h.orchestrator.enqueue_availability(availability("BBB"));
        h.orchestrator.trigger_sync().await;

        let requests = h.transport.requests.lock();
        assert!(requests[0].0.contains("AAA"));
        assert!(requests[1].0.contains("BBB"));
    }

    #[tokio::test]
    async fn test_cancel_removes_pending_entry() {
        let h = harness();
        h.transport.push_success(None);

        let first = h.orchestrator.enqueue_availability(availability("AAA"));
        h.orchestrator.enqueue_availability(availability("BBB"));
        assert!(h.orchestrator.cancel(first));
        assert!(!h.orchestrator.cancel(first));

        h.orchestrator.trigger_sync().await;

        let requests = h.transport.requests.lock();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].0.contains("BBB"));
    }

    #[tokio::test]
    async fn test_stop_sale_forces_close() {
        let mut cfg = config();
        cfg.stop_sale = true;
        let h = harness_with(cfg, vec![room("room-1", "101", "DBL")]);
        h.transport.push_success(None);

        h.orchestrator.enqueue_availability(availability("DBL"));
        h.orchestrator.trigger_sync().await;

        let requests = h.transport.requests.lock();
        assert!(requests[0].0.contains("Status=\"Close\""));
        assert!(!requests[0].0.contains("Status=\"Open\""));
    }

    #[tokio::test]
    async fn test_channel_stay_bounds_fill_unset_restrictions() {
        let mut cfg = config();
        cfg.min_stay = 2;
        cfg.max_stay = 14;
        let h = harness_with(cfg, vec![room("room-1", "101", "DBL")]);
        h.transport.push_success(None);

        h.orchestrator.enqueue_availability(availability("DBL"));
        h.orchestrator.trigger_sync().await;

        let requests = h.transport.requests.lock();
        assert!(requests[0].0.contains("SetMinLOS"));
        assert!(requests[0].0.contains("SetMaxLOS"));
    }

    #[tokio::test]
    async fn test_rate_adjustment_marks_up_amounts() {
        let mut cfg = config();
        cfg.rate_adjustment = 0.10;
        let h = harness_with(cfg, vec![room("room-1", "101", "DBL")]);
        h.transport.push_success(None);

        h.orchestrator.enqueue_rates(rates(100.0));
        h.orchestrator.trigger_sync().await;

        let requests = h.transport.requests.lock();
        assert!(requests[0].0.contains("110.00"));
    }

    #[tokio::test]
    async fn test_state_returns_to_idle() {
        let h = harness();
        h.transport.push_success(Some(EMPTY_PULL_BODY));

        h.orchestrator.enqueue_pull();
        h.orchestrator.trigger_sync().await;

        assert_eq!(h.orchestrator.state(), SyncState::Idle);
    }

    #[test]
    fn test_backoff_grows_and_is_capped() {
        let config = RetryConfig::default();
        let first = calculate_backoff(0, &config);
        let capped = calculate_backoff(20, &config);

        assert!(first.as_millis() >= 90);
        assert!(first.as_millis() <= 115);
        assert!(capped.as_millis() <= 11_000);
        assert!(capped.as_millis() >= 9_000);
    }
}
