// Serde structures for the OTA XML message family.
// Attribute fields use the `@` rename convention of quick-xml and must
// precede element fields. Everything is string-typed on the wire; the
// codec and mapper own the conversions.
use serde::{Deserialize, Serialize};

pub const OTA_NAMESPACE: &str = "http://www.opentravel.org/OTA/2003/05";

/// Age qualifying code for adults in OTA guest counts.
pub const AGE_QUALIFYING_ADULT: &str = "10";
/// Age qualifying code for children in OTA guest counts.
pub const AGE_QUALIFYING_CHILD: &str = "8";

// ---------- OTA_HotelAvailNotifRQ ----------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "OTA_HotelAvailNotifRQ")]
pub struct OtaHotelAvailNotifRq {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "@Version")]
    pub version: String,
    pub avail_status_messages: XmlAvailStatusMessages,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlAvailStatusMessages {
    #[serde(rename = "@HotelCode")]
    pub hotel_code: String,
    #[serde(rename = "AvailStatusMessage")]
    pub messages: Vec<XmlAvailStatusMessage>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlAvailStatusMessage {
    #[serde(rename = "@BookingLimit")]
    pub booking_limit: String,
    pub status_application_control: XmlStatusApplicationControl,
    pub lengths_of_stay: XmlLengthsOfStay,
    #[serde(rename = "RestrictionStatus")]
    pub restriction_statuses: Vec<XmlRestrictionStatus>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlStatusApplicationControl {
    #[serde(rename = "@Start")]
    pub start: String,
    #[serde(rename = "@End")]
    pub end: String,
    #[serde(rename = "@InvTypeCode")]
    pub inv_type_code: String,
    #[serde(rename = "@RatePlanCode")]
    pub rate_plan_code: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlLengthsOfStay {
    #[serde(rename = "LengthOfStay")]
    pub lengths: Vec<XmlLengthOfStay>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlLengthOfStay {
    #[serde(rename = "@MinMaxMessageType")]
    pub min_max_message_type: String,
    #[serde(rename = "@Time")]
    pub time: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRestrictionStatus {
    #[serde(rename = "@Restriction")]
    pub restriction: String,
    #[serde(rename = "@Status")]
    pub status: String,
}

// ---------- OTA_HotelRateAmountNotifRQ ----------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "OTA_HotelRateAmountNotifRQ")]
pub struct OtaHotelRateAmountNotifRq {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "@Version")]
    pub version: String,
    pub rate_amount_messages: XmlRateAmountMessages,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRateAmountMessages {
    #[serde(rename = "@HotelCode")]
    pub hotel_code: String,
    #[serde(rename = "RateAmountMessage")]
    pub messages: Vec<XmlRateAmountMessage>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRateAmountMessage {
    pub status_application_control: XmlStatusApplicationControl,
    pub rates: XmlRates,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRates {
    #[serde(rename = "Rate")]
    pub rates: Vec<XmlRate>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRate {
    pub base_by_guest_amts: XmlBaseByGuestAmts,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlBaseByGuestAmts {
    #[serde(rename = "BaseByGuestAmt")]
    pub amounts: Vec<XmlBaseByGuestAmt>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlBaseByGuestAmt {
    #[serde(rename = "@NumberOfGuests")]
    pub number_of_guests: String,
    #[serde(rename = "@AmountAfterTax")]
    pub amount_after_tax: String,
    #[serde(rename = "@CurrencyCode")]
    pub currency_code: String,
}

// ---------- OTA_HotelResNotifRQ / OTA_ResRetrieveRS ----------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "OTA_HotelResNotifRQ")]
pub struct OtaHotelResNotifRq {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "@Version")]
    pub version: String,
    pub hotel_reservations: XmlHotelReservations,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "OTA_ResRetrieveRS")]
pub struct OtaResRetrieveRs {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "@Version")]
    pub version: String,
    pub reservations_list: XmlHotelReservations,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotelReservations {
    #[serde(rename = "HotelReservation")]
    pub reservations: Vec<XmlHotelReservation>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotelReservation {
    #[serde(rename = "@CreateDateTime")]
    pub create_date_time: String,
    #[serde(rename = "@ResStatus")]
    pub res_status: String,
    #[serde(rename = "@PaymentStatus")]
    pub payment_status: String,
    #[serde(rename = "UniqueID")]
    pub unique_id: XmlUniqueId,
    pub room_stays: XmlRoomStays,
    pub res_guests: XmlResGuests,
    pub res_global_info: XmlResGlobalInfo,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlUniqueId {
    #[serde(rename = "@Type")]
    pub id_type: String,
    #[serde(rename = "@ID")]
    pub id: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRoomStays {
    #[serde(rename = "RoomStay")]
    pub room_stays: Vec<XmlRoomStay>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRoomStay {
    pub room_types: XmlRoomTypes,
    pub rate_plans: XmlRatePlans,
    pub guest_counts: XmlGuestCounts,
    pub time_span: XmlTimeSpan,
    pub total: XmlTotal,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRoomTypes {
    #[serde(rename = "RoomType")]
    pub room_types: Vec<XmlRoomType>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRoomType {
    #[serde(rename = "@RoomTypeCode")]
    pub room_type_code: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRatePlans {
    #[serde(rename = "RatePlan")]
    pub rate_plans: Vec<XmlRatePlan>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlRatePlan {
    #[serde(rename = "@RatePlanCode")]
    pub rate_plan_code: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlGuestCounts {
    #[serde(rename = "GuestCount")]
    pub counts: Vec<XmlGuestCount>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlGuestCount {
    #[serde(rename = "@AgeQualifyingCode")]
    pub age_qualifying_code: String,
    #[serde(rename = "@Count")]
    pub count: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlTimeSpan {
    #[serde(rename = "@Start")]
    pub start: String,
    #[serde(rename = "@End")]
    pub end: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlTotal {
    #[serde(rename = "@AmountAfterTax")]
    pub amount_after_tax: String,
    #[serde(rename = "@CurrencyCode")]
    pub currency_code: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlResGuests {
    #[serde(rename = "ResGuest")]
    pub guests: Vec<XmlResGuest>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlResGuest {
    pub profiles: XmlProfiles,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlProfiles {
    #[serde(rename = "ProfileInfo")]
    pub profile_infos: Vec<XmlProfileInfo>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlProfileInfo {
    pub profile: XmlProfile,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlProfile {
    #[serde(rename = "@ID")]
    pub id: String,
    pub customer: XmlCustomer,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlCustomer {
    pub person_name: XmlPersonName,
    // Optional contact details default to empty when the channel omits them
    pub email: String,
    pub telephone: XmlTelephone,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlPersonName {
    pub given_name: String,
    pub surname: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlTelephone {
    #[serde(rename = "@PhoneNumber")]
    pub phone_number: String,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlResGlobalInfo {
    #[serde(rename = "HotelReservationIDs")]
    pub hotel_reservation_ids: XmlHotelReservationIds,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotelReservationIds {
    #[serde(rename = "HotelReservationID")]
    pub ids: Vec<XmlHotelReservationId>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotelReservationId {
    #[serde(rename = "@ResID_Type")]
    pub res_id_type: String,
    #[serde(rename = "@ResID_Value")]
    pub res_id_value: String,
    #[serde(rename = "@ResID_Source")]
    pub res_id_source: String,
}

// ---------- OTA_ReadRQ (reservation pull) ----------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "OTA_ReadRQ")]
pub struct OtaReadRq {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "@Version")]
    pub version: String,
    pub read_requests: XmlReadRequests,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlReadRequests {
    pub hotel_read_request: XmlHotelReadRequest,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotelReadRequest {
    #[serde(rename = "@HotelCode")]
    pub hotel_code: String,
    pub selection_criteria: XmlSelectionCriteria,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlSelectionCriteria {
    #[serde(rename = "@SelectionType")]
    pub selection_type: String,
}

// ---------- OTA_NotifReportRQ (pull confirmation) ----------

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
#[serde(rename = "OTA_NotifReportRQ")]
pub struct OtaNotifReportRq {
    #[serde(rename = "@xmlns")]
    pub xmlns: String,
    #[serde(rename = "@TimeStamp")]
    pub time_stamp: String,
    #[serde(rename = "@Version")]
    pub version: String,
    pub notif_details: XmlNotifDetails,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlNotifDetails {
    pub hotel_notif_report: XmlHotelNotifReport,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlHotelNotifReport {
    #[serde(rename = "@HotelCode")]
    pub hotel_code: String,
    pub hotel_reservations: XmlReservationAcks,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlReservationAcks {
    #[serde(rename = "HotelReservation")]
    pub reservations: Vec<XmlReservationAck>,
}

#[derive(Debug, PartialEq, Default, Deserialize, Clone, Serialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct XmlReservationAck {
    #[serde(rename = "UniqueID")]
    pub unique_id: XmlUniqueId,
}
