// Channel-manager synchronization engine: OTA message codec, SOAP
// transport, reservation mapping, and the sync/booking services on top.

pub mod booking;
pub mod codec;
pub mod conflict;
pub mod error;
pub mod mapper;
pub mod model;
pub mod optimistic;
pub mod ota;
pub mod store;
pub mod sync;
pub mod transport;

// Re-export key types for convenience
pub use booking::{BookingOutcome, BookingRequest, BookingService, PersistFn};
pub use codec::{
    AvailabilityStatus, AvailabilityUpdate, GuestAmount, MessageCodec, OtaErrorDetail, PullResult,
    RateUpdate, ResAction, ReservationNotif, SoapFault, SoapResponse,
};
pub use conflict::{intervals_overlap, ConflictCheckResult, ConflictDetector};
pub use error::{ChannelError, ChannelResult};
pub use mapper::{map_external_to_internal, map_internal_to_external};
pub use model::{
    BookingSource, ChannelConfig, ExternalReservation, GuestProfile, InternalReservation,
    InternalReservationDraft, PricingBreakdown, ReservationStatus, Room,
};
pub use optimistic::OptimisticCoordinator;
pub use store::{MemoryStore, NotificationSink, ReservationStore, Severity};
pub use sync::{RetryConfig, SyncKind, SyncOrchestrator, SyncReport, SyncState};
pub use transport::{ChannelTransport, SoapClient, TransportConfig};
