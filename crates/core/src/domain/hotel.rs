use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::domain::booking::{Booking, BookingId};
use crate::domain::room::{Room, RoomSource};
use crate::errors::DomainError;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// The persisted hotel document, rewritten wholesale on every mutation.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct HotelData {
    #[serde(default)]
    pub rooms: Vec<Room>,
    #[serde(default)]
    pub bookings: Vec<Booking>,
    #[serde(default)]
    pub amenities: BTreeMap<String, String>,
    #[serde(default)]
    pub policies: BTreeMap<String, String>,
    #[serde(default)]
    pub faqs: Vec<Faq>,
}

impl HotelData {
    pub fn available_rooms(&self) -> Vec<Room> {
        self.rooms.iter().filter(|room| room.is_bookable()).cloned().collect()
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|room| room.id == id)
    }

    pub fn booking(&self, id: &BookingId) -> Option<&Booking> {
        self.bookings.iter().find(|booking| &booking.booking_id == id)
    }

    pub fn highest_booking_sequence(&self) -> u32 {
        self.bookings.iter().filter_map(|booking| booking.booking_id.sequence()).max().unwrap_or(0)
    }

    /// Appends the booking and takes its static room off the market.
    pub fn add_booking(&mut self, booking: Booking) -> Result<(), DomainError> {
        if self.booking(&booking.booking_id).is_some() {
            return Err(DomainError::InvariantViolation(format!(
                "booking id {} is already in use",
                booking.booking_id
            )));
        }

        if booking.room.source == RoomSource::Static {
            let room_id = booking.room.room_id.clone();
            if let Some(room) = self.rooms.iter_mut().find(|room| room.id == room_id) {
                if !room.available {
                    return Err(DomainError::RoomUnavailable { room_id });
                }
                room.available = false;
            }
        }

        self.bookings.push(booking);
        Ok(())
    }

    /// Removes the booking and, for static rooms, puts the room back on the market.
    pub fn cancel_booking(&mut self, id: &BookingId) -> Option<Booking> {
        let index = self.bookings.iter().position(|booking| &booking.booking_id == id)?;
        let booking = self.bookings.remove(index);

        if booking.is_static_room() {
            if let Some(room) = self.rooms.iter_mut().find(|room| room.id == booking.room.room_id)
            {
                room.available = true;
            }
        }

        Some(booking)
    }
}
