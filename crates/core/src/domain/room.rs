use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Where a room record came from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoomSource {
    /// Fixed record in the local hotel document.
    #[default]
    Static,
    /// Live offer fetched from the inventory provider for specific dates.
    Provider,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Room {
    pub id: String,
    #[serde(rename = "type")]
    pub room_type: String,
    #[serde(default)]
    pub description: String,
    #[serde(rename = "price_per_night", alias = "price", with = "rust_decimal::serde::float")]
    pub price_per_night: Decimal,
    pub capacity: u32,
    #[serde(default)]
    pub amenities: Vec<String>,
    #[serde(default = "default_available")]
    pub available: bool,
    #[serde(default)]
    pub source: RoomSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hotel_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

fn default_available() -> bool {
    true
}

impl Room {
    /// Provider rooms were already filtered for the queried dates, so only static rooms
    /// consult the availability flag.
    pub fn is_bookable(&self) -> bool {
        match self.source {
            RoomSource::Provider => true,
            RoomSource::Static => self.available,
        }
    }

    pub fn fits(&self, guests: u32) -> bool {
        self.capacity >= guests
    }

    pub fn total_for(&self, nights: u32) -> Decimal {
        self.price_per_night * Decimal::from(nights)
    }

    pub fn matches_type(&self, keyword: &str) -> bool {
        self.room_type.to_ascii_lowercase().contains(&keyword.to_ascii_lowercase())
    }
}

/// Keeps rooms whose capacity covers `guests`, in their original order.
pub fn filter_by_capacity(rooms: &[Room], guests: u32) -> Vec<Room> {
    rooms.iter().filter(|room| room.fits(guests)).cloned().collect()
}
