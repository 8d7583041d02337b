use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Lifecycle status of a reservation held by the property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    Tentative,
    Confirmed,
    CheckedIn,
    CheckedOut,
    Cancelled,
}

impl ReservationStatus {
    /// Statuses that occupy the room for conflict purposes.
    pub fn blocks_room(&self) -> bool {
        matches!(
            self,
            ReservationStatus::Tentative
                | ReservationStatus::Confirmed
                | ReservationStatus::CheckedIn
        )
    }
}

/// The property's own booking-source enumeration. External channel codes
/// are normalized onto this; unknown channels become `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingSource {
    Direct,
    BookingCom,
    Expedia,
    Agoda,
    Airbnb,
    Other,
}

impl BookingSource {
    pub fn from_channel_code(code: &str) -> Self {
        match code.to_ascii_uppercase().as_str() {
            "DIRECT" | "WEB" => BookingSource::Direct,
            "BDC" | "BOOKING" | "BOOKINGCOM" => BookingSource::BookingCom,
            "EXP" | "EXPEDIA" => BookingSource::Expedia,
            "AGD" | "AGODA" => BookingSource::Agoda,
            "ABB" | "AIRBNB" => BookingSource::Airbnb,
            _ => BookingSource::Other,
        }
    }

    pub fn channel_code(&self) -> &'static str {
        match self {
            BookingSource::Direct => "DIRECT",
            BookingSource::BookingCom => "BDC",
            BookingSource::Expedia => "EXP",
            BookingSource::Agoda => "AGD",
            BookingSource::Airbnb => "ABB",
            BookingSource::Other => "OTHER",
        }
    }
}

/// Guest contact details carried on the wire. Email and phone are optional
/// in the protocol and default to empty when missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GuestProfile {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
}

impl GuestProfile {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_string()
    }
}

/// Monetary breakdown of a reservation. Currency is carried through the
/// pipeline unchanged; rounding policy belongs to the pricing collaborator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PricingBreakdown {
    pub total: f64,
    pub commission: f64,
    pub net: f64,
    pub currency: String,
}

/// Wire-level reservation as pulled from the channel. Immutable once parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalReservation {
    pub external_id: String,
    pub external_guest_id: String,
    pub room_type_code: String,
    pub rate_plan_code: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub total_amount: f64,
    pub currency: String,
    pub channel_code: String,
    pub booking_reference: String,
    pub payment_status: String,
    pub sync_status: String,
    pub guest: GuestProfile,
}

/// Draft produced by the data mapper or the booking service. The
/// persistence layer owns id assignment and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalReservationDraft {
    pub room_id: Option<String>,
    pub room_type_code: String,
    pub guest: GuestProfile,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub status: ReservationStatus,
    pub pricing: PricingBreakdown,
    pub source: BookingSource,
    pub booking_reference: String,
}

/// The property's canonical reservation record.
#[derive(Debug, Clone, PartialEq)]
pub struct InternalReservation {
    pub id: String,
    pub room_id: String,
    pub guest_id: String,
    pub room_type_code: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
    pub children: u32,
    pub status: ReservationStatus,
    pub pricing: PricingBreakdown,
    pub source: BookingSource,
    pub booking_reference: String,
    pub created_at: DateTime<Utc>,
    pub modified_at: DateTime<Utc>,
}

/// A physical room, used when proposing alternatives for a conflicted
/// reservation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    pub number: String,
    pub room_type_code: String,
    pub max_adults: u32,
    pub max_children: u32,
}

/// Per-channel settings. Read by the sync path, mutated only through an
/// explicit configuration update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelConfig {
    pub channel_code: String,
    pub hotel_code: String,
    pub endpoint: String,
    pub token_endpoint: Option<String>,
    pub api_key: String,
    pub api_secret: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub commission_rate: f64,
    pub min_stay: u32,
    pub max_stay: u32,
    pub stop_sale: bool,
    pub rate_adjustment: f64,
    pub timeout_ms: u64,
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            channel_code: String::new(),
            hotel_code: String::new(),
            endpoint: String::new(),
            token_endpoint: None,
            api_key: String::new(),
            api_secret: String::new(),
            username: None,
            password: None,
            commission_rate: 0.0,
            min_stay: 1,
            max_stay: 30,
            stop_sale: false,
            rate_adjustment: 0.0,
            timeout_ms: 30_000,
        }
    }
}
