use std::fmt;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::room::{Room, RoomSource};

/// Stored in place of contact and payment fields the guest did not give.
pub const NOT_PROVIDED: &str = "Not provided";

/// Longest stay the desk will quote or book.
pub const MAX_STAY_NIGHTS: u32 = 365;

#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BookingId(pub String);

impl BookingId {
    pub fn from_sequence(sequence: u32) -> Self {
        Self(format!("BK{sequence:04}"))
    }

    /// Numeric part of a `BK`-prefixed id; ids in any other shape have none.
    pub fn sequence(&self) -> Option<u32> {
        self.0.strip_prefix("BK").and_then(|digits| digits.parse().ok())
    }

    pub fn normalized(raw: &str) -> Self {
        Self(raw.trim().trim_start_matches('#').to_ascii_uppercase())
    }
}

impl fmt::Display for BookingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingChannel {
    WebChat,
    PhoneCall,
}

impl BookingChannel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::WebChat => "web_chat",
            Self::PhoneCall => "phone_call",
        }
    }
}

/// Room facts copied at booking time so later price changes never touch the booking.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RoomSnapshot {
    pub room_id: String,
    pub room_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,
    pub source: RoomSource,
    #[serde(default)]
    pub amenities: Vec<String>,
}

impl From<&Room> for RoomSnapshot {
    fn from(room: &Room) -> Self {
        Self {
            room_id: room.id.clone(),
            room_type: room.room_type.clone(),
            hotel_name: room.hotel_name.clone(),
            price_per_night: room.price_per_night,
            source: room.source,
            amenities: room.amenities.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GuestDetails {
    pub name: String,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub payment_method: Option<String>,
    pub special_requests: Option<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StayDetails {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u32,
    pub nights: u32,
}

impl StayDetails {
    /// `None` when the stay is longer than [`MAX_STAY_NIGHTS`] or runs off the calendar.
    pub fn new(check_in: NaiveDate, nights: u32, guests: u32) -> Option<Self> {
        let nights = nights.max(1);
        if nights > MAX_STAY_NIGHTS {
            return None;
        }
        let check_out = check_in.checked_add_days(Days::new(u64::from(nights)))?;
        Some(Self { check_in, check_out, guests, nights })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub booking_id: BookingId,
    pub guest_name: String,
    pub guest_phone: String,
    pub guest_email: String,
    pub payment_method: String,
    #[serde(default)]
    pub special_requests: Option<String>,
    pub room: RoomSnapshot,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub num_guests: u32,
    pub nights: u32,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_cost: Decimal,
    pub created_at: DateTime<Utc>,
    pub source: BookingChannel,
}

impl Booking {
    pub fn new(
        booking_id: BookingId,
        room: &Room,
        guest: GuestDetails,
        stay: StayDetails,
        channel: BookingChannel,
        created_at: DateTime<Utc>,
    ) -> Self {
        let snapshot = RoomSnapshot::from(room);
        let total_cost = snapshot.price_per_night * Decimal::from(stay.nights);
        let or_not_provided = |value: Option<String>| {
            value
                .filter(|value| !value.trim().is_empty())
                .unwrap_or_else(|| NOT_PROVIDED.to_owned())
        };

        Self {
            booking_id,
            guest_name: guest.name,
            guest_phone: or_not_provided(guest.phone),
            guest_email: or_not_provided(guest.email),
            payment_method: or_not_provided(guest.payment_method),
            special_requests: guest.special_requests.filter(|value| !value.trim().is_empty()),
            room: snapshot,
            check_in: stay.check_in,
            check_out: stay.check_out,
            num_guests: stay.guests,
            nights: stay.nights,
            total_cost,
            created_at,
            source: channel,
        }
    }

    pub fn is_static_room(&self) -> bool {
        self.room.source == RoomSource::Static
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::{
        Booking, BookingChannel, BookingId, GuestDetails, StayDetails, MAX_STAY_NIGHTS,
        NOT_PROVIDED,
    };
    use crate::domain::room::test_support::static_room;

    fn stay() -> StayDetails {
        StayDetails::new(NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date"), 2, 2)
            .expect("valid stay")
    }

    #[test]
    fn booking_ids_are_zero_padded_sequences() {
        assert_eq!(BookingId::from_sequence(7).0, "BK0007");
        assert_eq!(BookingId::from_sequence(12_345).0, "BK12345");
        assert_eq!(BookingId("BK0042".to_owned()).sequence(), Some(42));
        assert_eq!(BookingId("legacy-1".to_owned()).sequence(), None);
        assert_eq!(BookingId::normalized(" #bk0003 ").0, "BK0003");
    }

    #[test]
    fn stay_derives_check_out_from_nights() {
        let stay = stay();
        assert_eq!(stay.check_out, NaiveDate::from_ymd_opt(2026, 10, 17).expect("valid date"));
        assert_eq!(StayDetails::new(stay.check_in, 0, 1).map(|stay| stay.nights), Some(1));
    }

    #[test]
    fn overlong_or_out_of_calendar_stays_are_rejected() {
        let check_in = NaiveDate::from_ymd_opt(2026, 10, 15).expect("valid date");
        assert!(StayDetails::new(check_in, MAX_STAY_NIGHTS, 1).is_some());
        assert_eq!(StayDetails::new(check_in, MAX_STAY_NIGHTS + 1, 1), None);
        assert_eq!(StayDetails::new(check_in, 99_999_999, 2), None);
        assert_eq!(StayDetails::new(NaiveDate::MAX, 1, 1), None);
    }

    #[test]
    fn total_cost_is_fixed_at_creation() {
        let mut room = static_room("102", "King Guest Room", 149, 2);
        let booking = Booking::new(
            BookingId::from_sequence(1),
            &room,
            GuestDetails { name: "Jane Doe".to_owned(), ..GuestDetails::default() },
            stay(),
            BookingChannel::WebChat,
            Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).single().expect("valid timestamp"),
        );

        room.price_per_night = Decimal::new(999, 0);

        assert_eq!(booking.total_cost, Decimal::new(298, 0));
        assert_eq!(booking.room.price_per_night, Decimal::new(149, 0));
        assert_eq!(booking.guest_phone, NOT_PROVIDED);
        assert_eq!(booking.guest_email, NOT_PROVIDED);
        assert_eq!(booking.payment_method, NOT_PROVIDED);
        assert_eq!(booking.special_requests, None);
    }

    #[test]
    fn booking_round_trips_through_document_json() {
        let room = static_room("102", "King Guest Room", 149, 2);
        let booking = Booking::new(
            BookingId::from_sequence(3),
            &room,
            GuestDetails {
                name: "Jane Doe".to_owned(),
                phone: Some("555-123-4567".to_owned()),
                ..GuestDetails::default()
            },
            stay(),
            BookingChannel::PhoneCall,
            Utc::now(),
        );

        let json = serde_json::to_string(&booking).expect("serialize booking");
        assert!(json.contains("\"source\":\"phone_call\""));
        assert!(json.contains("\"booking_id\":\"BK0003\""));
        let parsed: Booking = serde_json::from_str(&json).expect("deserialize booking");
        assert_eq!(parsed.total_cost, booking.total_cost);
        assert_eq!(parsed.check_out, booking.check_out);
    }
}
