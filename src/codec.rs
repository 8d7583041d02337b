// OTA message codec: builds the outbound SOAP envelopes and parses the
// inbound responses for the availability, rate, and reservation flows.
use chrono::{NaiveDate, SecondsFormat, Utc};
use quick_xml::de::from_str;
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{ChannelError, ChannelResult};
use crate::model::{ExternalReservation, GuestProfile, InternalReservation};
use crate::ota::*;

pub const SOAP_ENVELOPE_NAMESPACE: &str = "http://schemas.xmlsoap.org/soap/envelope/";
pub const OTA_VERSION: &str = "1.0";

/// Open/close status of a room type on a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvailabilityStatus {
    Open,
    Close,
}

impl AvailabilityStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AvailabilityStatus::Open => "Open",
            AvailabilityStatus::Close => "Close",
        }
    }
}

/// Parameters for one availability notification.
#[derive(Debug, Clone, PartialEq)]
pub struct AvailabilityUpdate {
    pub room_type_code: String,
    pub rate_plan_code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub available_count: u32,
    pub status: AvailabilityStatus,
    pub min_stay: Option<u32>,
    pub max_stay: Option<u32>,
    pub closed_to_arrival: bool,
    pub closed_to_departure: bool,
}

/// Per-guest-count base amount for a rate notification.
#[derive(Debug, Clone, PartialEq)]
pub struct GuestAmount {
    pub guests: u32,
    pub amount_after_tax: f64,
}

/// Parameters for one rate notification.
#[derive(Debug, Clone, PartialEq)]
pub struct RateUpdate {
    pub room_type_code: String,
    pub rate_plan_code: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub currency: String,
    pub base_amounts: Vec<GuestAmount>,
}

/// ResStatus values for an outbound reservation notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResAction {
    Commit,
    Modify,
    Cancel,
}

impl ResAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResAction::Commit => "Commit",
            ResAction::Modify => "Modify",
            ResAction::Cancel => "Cancel",
        }
    }
}

/// Parameters for pushing one reservation outward.
#[derive(Debug, Clone, PartialEq)]
pub struct ReservationNotif {
    pub action: ResAction,
    pub reservation: InternalReservation,
    pub guest: GuestProfile,
    pub rate_plan_code: String,
}

/// A SOAP-level fault returned by the remote system.
#[derive(Debug, Clone, PartialEq)]
pub struct SoapFault {
    pub code: String,
    pub message: String,
}

/// A business-level error embedded in an OTA response.
#[derive(Debug, Clone, PartialEq)]
pub struct OtaErrorDetail {
    pub code: String,
    pub error_type: String,
    pub message: String,
}

/// Structured view of a SOAP response: either a payload, or a fault /
/// OTA errors block, plus any non-blocking warnings.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SoapResponse {
    pub success: bool,
    pub body: Option<String>,
    pub fault: Option<SoapFault>,
    pub errors: Vec<OtaErrorDetail>,
    pub warnings: Vec<String>,
}

impl SoapResponse {
    /// Convert a non-success response into the matching error kind.
    pub fn into_result(self) -> ChannelResult<SoapResponse> {
        if let Some(fault) = self.fault {
            return Err(ChannelError::SoapFault {
                code: fault.code,
                message: fault.message,
            });
        }
        if let Some(err) = self.errors.first() {
            return Err(ChannelError::Ota {
                code: err.code.clone(),
                message: err.message.clone(),
            });
        }
        Ok(self)
    }
}

/// Result of parsing a reservation pull response. Blocks that fail to
/// parse are reported as errors without discarding the valid ones.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PullResult {
    pub reservations: Vec<ExternalReservation>,
    pub errors: Vec<String>,
}

/// Builds and parses the OTA wire messages. Builders are pure: the same
/// input yields structurally identical output, timestamp excepted.
#[derive(Debug, Clone)]
pub struct MessageCodec {
    version: String,
}

impl Default for MessageCodec {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageCodec {
    pub fn new() -> Self {
        Self {
            version: OTA_VERSION.to_string(),
        }
    }

    fn timestamp() -> String {
        Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    fn wrap_envelope(payload: &str) -> String {
        format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <soap:Envelope xmlns:soap=\"{SOAP_ENVELOPE_NAMESPACE}\">\
             <soap:Body>{payload}</soap:Body></soap:Envelope>"
        )
    }

    fn serialize<T: serde::Serialize>(message: &T) -> ChannelResult<String> {
        let payload = quick_xml::se::to_string(message)
            .map_err(|e| ChannelError::XmlParse(format!("serialize: {e}")))?;
        Ok(Self::wrap_envelope(&payload))
    }

    /// Build an `OTA_HotelAvailNotifRQ` envelope for one room-type /
    /// rate-plan / date-range combination.
    pub fn build_availability(
        &self,
        hotel_code: &str,
        update: &AvailabilityUpdate,
    ) -> ChannelResult<String> {
        validate_stay_range(update.start, update.end)?;
        validate_code("room type code", &update.room_type_code)?;
        validate_code("rate plan code", &update.rate_plan_code)?;

        let mut lengths = Vec::new();
        if let Some(min) = update.min_stay {
            lengths.push(XmlLengthOfStay {
                min_max_message_type: "SetMinLOS".to_string(),
                time: min.to_string(),
            });
        }
        if let Some(max) = update.max_stay {
            lengths.push(XmlLengthOfStay {
                min_max_message_type: "SetMaxLOS".to_string(),
                time: max.to_string(),
            });
        }

        let mut restrictions = vec![XmlRestrictionStatus {
            restriction: "Master".to_string(),
            status: update.status.as_str().to_string(),
        }];
        if update.closed_to_arrival {
            restrictions.push(XmlRestrictionStatus {
                restriction: "Arrival".to_string(),
                status: "Close".to_string(),
            });
        }
        if update.closed_to_departure {
            restrictions.push(XmlRestrictionStatus {
                restriction: "Departure".to_string(),
                status: "Close".to_string(),
            });
        }

        let message = OtaHotelAvailNotifRq {
            xmlns: OTA_NAMESPACE.to_string(),
            time_stamp: Self::timestamp(),
            version: self.version.clone(),
            avail_status_messages: XmlAvailStatusMessages {
                hotel_code: hotel_code.to_string(),
                messages: vec![XmlAvailStatusMessage {
                    booking_limit: update.available_count.to_string(),
                    status_application_control: XmlStatusApplicationControl {
                        start: format_date(update.start),
                        end: format_date(update.end),
                        inv_type_code: update.room_type_code.clone(),
                        rate_plan_code: update.rate_plan_code.clone(),
                    },
                    lengths_of_stay: XmlLengthsOfStay { lengths },
                    restriction_statuses: restrictions,
                }],
            },
        };

        Self::serialize(&message)
    }

    /// Build an `OTA_HotelRateAmountNotifRQ` envelope.
    pub fn build_rates(&self, hotel_code: &str, update: &RateUpdate) -> ChannelResult<String> {
        validate_stay_range(update.start, update.end)?;
        validate_code("room type code", &update.room_type_code)?;
        validate_code("rate plan code", &update.rate_plan_code)?;
        validate_code("currency", &update.currency)?;
        if update.base_amounts.is_empty() {
            return Err(ChannelError::Validation(
                "rate update has no base amounts".to_string(),
            ));
        }

        let message = OtaHotelRateAmountNotifRq {
            xmlns: OTA_NAMESPACE.to_string(),
            time_stamp: Self::timestamp(),
            version: self.version.clone(),
            rate_amount_messages: XmlRateAmountMessages {
                hotel_code: hotel_code.to_string(),
                messages: vec![XmlRateAmountMessage {
                    status_application_control: XmlStatusApplicationControl {
                        start: format_date(update.start),
                        end: format_date(update.end),
                        inv_type_code: update.room_type_code.clone(),
                        rate_plan_code: update.rate_plan_code.clone(),
                    },
                    rates: XmlRates {
                        rates: vec![XmlRate {
                            base_by_guest_amts: XmlBaseByGuestAmts {
                                amounts: update
                                    .base_amounts
                                    .iter()
                                    .map(|amount| XmlBaseByGuestAmt {
                                        number_of_guests: amount.guests.to_string(),
                                        amount_after_tax: format_amount(amount.amount_after_tax),
                                        currency_code: update.currency.clone(),
                                    })
                                    .collect(),
                            },
                        }],
                    },
                }],
            },
        };

        Self::serialize(&message)
    }

    /// Build an `OTA_HotelResNotifRQ` envelope carrying one reservation
    /// create/modify/cancel.
    pub fn build_reservation_push(
        &self,
        hotel_code: &str,
        notif: &ReservationNotif,
    ) -> ChannelResult<String> {
        let res = &notif.reservation;
        validate_stay_range(res.check_in, res.check_out)?;
        validate_code("room type code", &res.room_type_code)?;
        validate_code("rate plan code", &notif.rate_plan_code)?;
        if notif.guest.full_name().is_empty() {
            return Err(ChannelError::Validation(
                "reservation push requires a guest name".to_string(),
            ));
        }

        let message = OtaHotelResNotifRq {
            xmlns: OTA_NAMESPACE.to_string(),
            time_stamp: Self::timestamp(),
            version: self.version.clone(),
            hotel_reservations: XmlHotelReservations {
                reservations: vec![XmlHotelReservation {
                    create_date_time: res.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
                    res_status: notif.action.as_str().to_string(),
                    payment_status: String::new(),
                    unique_id: XmlUniqueId {
                        id_type: "14".to_string(),
                        id: res.id.clone(),
                    },
                    room_stays: XmlRoomStays {
                        room_stays: vec![XmlRoomStay {
                            room_types: XmlRoomTypes {
                                room_types: vec![XmlRoomType {
                                    room_type_code: res.room_type_code.clone(),
                                }],
                            },
                            rate_plans: XmlRatePlans {
                                rate_plans: vec![XmlRatePlan {
                                    rate_plan_code: notif.rate_plan_code.clone(),
                                }],
                            },
                            guest_counts: XmlGuestCounts {
                                counts: guest_counts(res.adults, res.children),
                            },
                            time_span: XmlTimeSpan {
                                start: format_date(res.check_in),
                                end: format_date(res.check_out),
                            },
                            total: XmlTotal {
                                amount_after_tax: format_amount(res.pricing.total),
                                currency_code: res.pricing.currency.clone(),
                            },
                        }],
                    },
                    res_guests: XmlResGuests {
                        guests: vec![XmlResGuest {
                            profiles: XmlProfiles {
                                profile_infos: vec![XmlProfileInfo {
                                    profile: XmlProfile {
                                        id: res.guest_id.clone(),
                                        customer: XmlCustomer {
                                            person_name: XmlPersonName {
                                                given_name: notif.guest.first_name.clone(),
                                                surname: notif.guest.last_name.clone(),
                                            },
                                            email: notif.guest.email.clone(),
                                            telephone: XmlTelephone {
                                                phone_number: notif.guest.phone.clone(),
                                            },
                                        },
                                    },
                                }],
                            },
                        }],
                    },
                    res_global_info: XmlResGlobalInfo {
                        hotel_reservation_ids: XmlHotelReservationIds {
                            ids: vec![XmlHotelReservationId {
                                res_id_type: "14".to_string(),
                                res_id_value: res.booking_reference.clone(),
                                res_id_source: res.source.channel_code().to_string(),
                            }],
                        },
                    },
                }],
            },
        };

        Self::serialize(&message)
    }

    /// Build the `OTA_ReadRQ` envelope requesting all undelivered
    /// reservations for the hotel (step 1 of the pull-confirm cycle).
    pub fn build_pull_request(&self, hotel_code: &str) -> ChannelResult<String> {
        validate_code("hotel code", hotel_code)?;

        let message = OtaReadRq {
            xmlns: OTA_NAMESPACE.to_string(),
            time_stamp: Self::timestamp(),
            version: self.version.clone(),
            read_requests: XmlReadRequests {
                hotel_read_request: XmlHotelReadRequest {
                    hotel_code: hotel_code.to_string(),
                    selection_criteria: XmlSelectionCriteria {
                        selection_type: "Undelivered".to_string(),
                    },
                },
            },
        };

        Self::serialize(&message)
    }

    /// Build the `OTA_NotifReportRQ` envelope acknowledging the external
    /// reservation identifiers that were committed locally (step 3).
    pub fn build_confirmation(
        &self,
        hotel_code: &str,
        external_ids: &[String],
    ) -> ChannelResult<String> {
        validate_code("hotel code", hotel_code)?;

        let message = OtaNotifReportRq {
            xmlns: OTA_NAMESPACE.to_string(),
            time_stamp: Self::timestamp(),
            version: self.version.clone(),
            notif_details: XmlNotifDetails {
                hotel_notif_report: XmlHotelNotifReport {
                    hotel_code: hotel_code.to_string(),
                    hotel_reservations: XmlReservationAcks {
                        reservations: external_ids
                            .iter()
                            .map(|id| XmlReservationAck {
                                unique_id: XmlUniqueId {
                                    id_type: "14".to_string(),
                                    id: id.clone(),
                                },
                            })
                            .collect(),
                    },
                },
            },
        };

        Self::serialize(&message)
    }

    /// Parse a raw SOAP response into its structured form. A SOAP fault or
    /// an OTA `<Errors>` block becomes data, never a panic.
    pub fn parse_soap_response(&self, xml: &str) -> ChannelResult<SoapResponse> {
        let body = match extract_soap_body(xml)? {
            Some(body) => body,
            // Some channels answer with the bare payload, no envelope
            None => xml.to_string(),
        };

        let mut saw_fault = false;
        let mut fault_code = String::new();
        let mut fault_message = String::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        let mut reader = Reader::from_str(&body);
        reader.config_mut().trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Start(e)) | Ok(Event::Empty(e))
                    if e.local_name().as_ref() == b"Fault" =>
                {
                    saw_fault = true;
                }
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"faultcode" => {
                    fault_code = read_element_text(&mut reader, &e)?;
                }
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"faultstring" => {
                    fault_message = read_element_text(&mut reader, &e)?;
                }
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"Error" => {
                    let code = attribute_value(&e, "Code")?;
                    let error_type = attribute_value(&e, "Type")?;
                    let short_text = attribute_value(&e, "ShortText")?;
                    let text = read_element_text(&mut reader, &e)?;
                    errors.push(OtaErrorDetail {
                        code,
                        error_type,
                        message: if short_text.is_empty() { text } else { short_text },
                    });
                }
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Error" => {
                    errors.push(OtaErrorDetail {
                        code: attribute_value(&e, "Code")?,
                        error_type: attribute_value(&e, "Type")?,
                        message: attribute_value(&e, "ShortText")?,
                    });
                }
                Ok(Event::Start(e)) if e.local_name().as_ref() == b"Warning" => {
                    let short_text = attribute_value(&e, "ShortText")?;
                    let text = read_element_text(&mut reader, &e)?;
                    warnings.push(if short_text.is_empty() { text } else { short_text });
                }
                Ok(Event::Empty(e)) if e.local_name().as_ref() == b"Warning" => {
                    warnings.push(attribute_value(&e, "ShortText")?);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(ChannelError::XmlParse(e.to_string())),
                _ => {}
            }
        }

        let fault = saw_fault.then(|| SoapFault {
            code: if fault_code.is_empty() {
                "soap:Server".to_string()
            } else {
                fault_code
            },
            message: if fault_message.is_empty() {
                "SOAP fault".to_string()
            } else {
                fault_message
            },
        });

        Ok(SoapResponse {
            success: fault.is_none() && errors.is_empty(),
            body: Some(body),
            fault,
            errors,
            warnings,
        })
    }

    /// Parse an `OTA_ResRetrieveRS` (step 2 of the pull cycle). Zero
    /// reservation blocks is a valid, empty result. Individual malformed
    /// blocks are reported without dropping the rest.
    pub fn parse_pull_response(&self, xml: &str) -> ChannelResult<PullResult> {
        let body = match extract_soap_body(xml)? {
            Some(body) => body,
            None => xml.to_string(),
        };

        let response: OtaResRetrieveRs =
            from_str(&body).map_err(|e| ChannelError::XmlParse(e.to_string()))?;

        let mut result = PullResult::default();
        for block in &response.reservations_list.reservations {
            match external_reservation_from_block(block) {
                Ok(reservation) => result.reservations.push(reservation),
                Err(e) => result.errors.push(e.to_string()),
            }
        }
        Ok(result)
    }
}

fn guest_counts(adults: u32, children: u32) -> Vec<XmlGuestCount> {
    let mut counts = vec![XmlGuestCount {
        age_qualifying_code: AGE_QUALIFYING_ADULT.to_string(),
        count: adults.to_string(),
    }];
    if children > 0 {
        counts.push(XmlGuestCount {
            age_qualifying_code: AGE_QUALIFYING_CHILD.to_string(),
            count: children.to_string(),
        });
    }
    counts
}

fn external_reservation_from_block(
    block: &XmlHotelReservation,
) -> ChannelResult<ExternalReservation> {
    if block.unique_id.id.is_empty() {
        return Err(ChannelError::XmlParse(
            "reservation block missing UniqueID".to_string(),
        ));
    }
    let stay = block.room_stays.room_stays.first().ok_or_else(|| {
        ChannelError::XmlParse(format!(
            "reservation {} has no room stay",
            block.unique_id.id
        ))
    })?;

    let check_in = parse_date(&stay.time_span.start)?;
    let check_out = parse_date(&stay.time_span.end)?;

    let mut adults = 0;
    let mut children = 0;
    for count in &stay.guest_counts.counts {
        let n: u32 = count.count.parse().unwrap_or(0);
        match count.age_qualifying_code.as_str() {
            AGE_QUALIFYING_ADULT => adults += n,
            AGE_QUALIFYING_CHILD => children += n,
            _ => {}
        }
    }

    // Guest contact details are optional on the wire and default to empty
    let (external_guest_id, guest) = block
        .res_guests
        .guests
        .first()
        .and_then(|g| g.profiles.profile_infos.first())
        .map(|info| {
            let customer = &info.profile.customer;
            (
                info.profile.id.clone(),
                GuestProfile {
                    first_name: customer.person_name.given_name.clone(),
                    last_name: customer.person_name.surname.clone(),
                    email: customer.email.clone(),
                    phone: customer.telephone.phone_number.clone(),
                },
            )
        })
        .unwrap_or_default();

    let (booking_reference, channel_code) = block
        .res_global_info
        .hotel_reservation_ids
        .ids
        .first()
        .map(|id| (id.res_id_value.clone(), id.res_id_source.clone()))
        .unwrap_or_default();

    Ok(ExternalReservation {
        external_id: block.unique_id.id.clone(),
        external_guest_id,
        room_type_code: stay
            .room_types
            .room_types
            .first()
            .map(|rt| rt.room_type_code.clone())
            .unwrap_or_default(),
        rate_plan_code: stay
            .rate_plans
            .rate_plans
            .first()
            .map(|rp| rp.rate_plan_code.clone())
            .unwrap_or_default(),
        check_in,
        check_out,
        adults,
        children,
        total_amount: stay.total.amount_after_tax.parse().unwrap_or(0.0),
        currency: stay.total.currency_code.clone(),
        channel_code,
        booking_reference,
        payment_status: block.payment_status.clone(),
        sync_status: block.res_status.clone(),
        guest,
    })
}

fn extract_soap_body(xml: &str) -> ChannelResult<Option<String>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.local_name().as_ref() == b"Body" => {
                let inner = reader
                    .read_text(e.name())
                    .map_err(|e| ChannelError::XmlParse(e.to_string()))?;
                return Ok(Some(inner.into_owned()));
            }
            Ok(Event::Eof) => return Ok(None),
            Err(e) => return Err(ChannelError::XmlParse(e.to_string())),
            _ => {}
        }
    }
}

fn read_element_text(
    reader: &mut Reader<&[u8]>,
    start: &quick_xml::events::BytesStart<'_>,
) -> ChannelResult<String> {
    reader
        .read_text(start.name())
        .map(|text| text.trim().to_string())
        .map_err(|e| ChannelError::XmlParse(e.to_string()))
}

fn attribute_value(
    element: &quick_xml::events::BytesStart<'_>,
    name: &str,
) -> ChannelResult<String> {
    match element
        .try_get_attribute(name)
        .map_err(|e| ChannelError::XmlParse(e.to_string()))?
    {
        Some(attr) => attr
            .unescape_value()
            .map(|v| v.into_owned())
            .map_err(|e| ChannelError::XmlParse(e.to_string())),
        None => Ok(String::new()),
    }
}

fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

fn format_amount(amount: f64) -> String {
    format!("{amount:.2}")
}

fn parse_date(value: &str) -> ChannelResult<NaiveDate> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| ChannelError::XmlParse(format!("bad date '{value}': {e}")))
}

fn validate_stay_range(start: NaiveDate, end: NaiveDate) -> ChannelResult<()> {
    if end <= start {
        return Err(ChannelError::Validation(format!(
            "date range end {end} must be after start {start}"
        )));
    }
    Ok(())
}

fn validate_code(label: &str, value: &str) -> ChannelResult<()> {
    if value.trim().is_empty() {
        return Err(ChannelError::Validation(format!("{label} is empty")));
    }
    Ok(())
}
