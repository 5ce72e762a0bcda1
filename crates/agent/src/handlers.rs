use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{info, warn};

use frontdesk_core::domain::booking::{
    Booking, BookingChannel, BookingId, GuestDetails, StayDetails,
};
use frontdesk_core::domain::hotel::HotelData;
use frontdesk_core::domain::room::{filter_by_capacity, Room};
use frontdesk_core::inventory::{AvailabilityQuery, InventoryProvider};
use frontdesk_db::repositories::{HotelRepository, RepositoryError};

/// Most rooms shown in one chat reply.
pub const DISPLAY_LIMIT: usize = 5;

/// Guests assumed when asking the provider without a known party size.
const DEFAULT_PROVIDER_GUESTS: u32 = 2;

/// Availability and booking operations shared by the chat dialogue and the phone tools.
#[derive(Clone)]
pub struct FrontDesk {
    hotel: Arc<dyn HotelRepository>,
    inventory: Arc<dyn InventoryProvider>,
}

impl FrontDesk {
    pub fn new(hotel: Arc<dyn HotelRepository>, inventory: Arc<dyn InventoryProvider>) -> Self {
        Self { hotel, inventory }
    }

    pub fn hotel(&self) -> &Arc<dyn HotelRepository> {
        &self.hotel
    }

    pub fn inventory(&self) -> &Arc<dyn InventoryProvider> {
        &self.inventory
    }

    pub async fn snapshot(&self) -> Result<HotelData, RepositoryError> {
        self.hotel.snapshot().await
    }

    /// Live provider offers when there are any, else the static rooms that are free. With
    /// a guest count the static list is narrowed by capacity, falling back to the first
    /// few free rooms when nothing is big enough.
    pub async fn resolve_availability(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: Option<u32>,
    ) -> Result<Vec<Room>, RepositoryError> {
        if self.inventory.is_configured() {
            let query = AvailabilityQuery::new(
                check_in,
                check_out,
                guests.unwrap_or(DEFAULT_PROVIDER_GUESTS),
            );
            match self.inventory.search_rooms(&query).await {
                Ok(rooms) if !rooms.is_empty() => {
                    info!(
                        event_name = "agent.availability_provider",
                        check_in = %check_in,
                        check_out = %check_out,
                        rooms = rooms.len(),
                        "availability served from inventory provider"
                    );
                    return Ok(rooms);
                }
                Ok(_) => {
                    info!(
                        event_name = "agent.availability_provider_empty",
                        check_in = %check_in,
                        check_out = %check_out,
                        "inventory provider had no offers, using static rooms"
                    );
                }
                Err(error) => {
                    warn!(
                        event_name = "agent.availability_provider_failed",
                        error = %error,
                        "inventory provider failed, using static rooms"
                    );
                }
            }
        }

        let free = self.hotel.available_rooms().await?;
        let rooms = match guests {
            Some(guests) => {
                let fitting = filter_by_capacity(&free, guests);
                if fitting.is_empty() {
                    free.into_iter().take(DISPLAY_LIMIT).collect()
                } else {
                    fitting
                }
            }
            None => free,
        };
        Ok(rooms)
    }

    /// [`Self::resolve_availability`] trimmed to what a chat reply shows.
    pub async fn check_availability(
        &self,
        check_in: NaiveDate,
        check_out: NaiveDate,
        guests: Option<u32>,
    ) -> Result<Vec<Room>, RepositoryError> {
        let mut rooms = self.resolve_availability(check_in, check_out, guests).await?;
        rooms.truncate(DISPLAY_LIMIT);
        Ok(rooms)
    }

    pub async fn create_booking(
        &self,
        room: &Room,
        guest: GuestDetails,
        stay: StayDetails,
        channel: BookingChannel,
    ) -> Result<Booking, RepositoryError> {
        let booking = self.hotel.create_booking(room, guest, stay, channel).await?;
        info!(
            event_name = "agent.booking_created",
            booking_id = %booking.booking_id,
            room_id = %booking.room.room_id,
            channel = booking.source.as_str(),
            nights = booking.nights,
            "booking created"
        );
        Ok(booking)
    }

    /// `Ok(None)` when nothing has that id.
    pub async fn cancel_booking(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError> {
        let cancelled = self.hotel.cancel_booking(id).await?;
        match &cancelled {
            Some(booking) => info!(
                event_name = "agent.booking_cancelled",
                booking_id = %booking.booking_id,
                "booking cancelled"
            ),
            None => info!(
                event_name = "agent.booking_not_found",
                booking_id = %id,
                "cancellation for unknown booking"
            ),
        }
        Ok(cancelled)
    }

    pub async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError> {
        self.hotel.find_booking(id).await
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;

    use async_trait::async_trait;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use frontdesk_core::domain::room::{Room, RoomSource};
    use frontdesk_core::inventory::{AvailabilityQuery, InventoryError, InventoryProvider};
    use frontdesk_db::{DemoDataset, JsonHotelStore};

    use super::FrontDesk;

    /// Provider double that answers every search the same way.
    pub struct StubInventory(pub Result<Vec<Room>, InventoryError>);

    #[async_trait]
    impl InventoryProvider for StubInventory {
        fn is_configured(&self) -> bool {
            true
        }

        async fn search_rooms(
            &self,
            _query: &AvailabilityQuery,
        ) -> Result<Vec<Room>, InventoryError> {
            self.0.clone()
        }

        async fn check_connection(&self) -> Result<(), InventoryError> {
            self.0.clone().map(|_| ())
        }
    }

    pub fn demo_store() -> Arc<JsonHotelStore> {
        Arc::new(JsonHotelStore::in_memory(DemoDataset::load().expect("demo dataset parses")))
    }

    pub fn static_desk() -> FrontDesk {
        FrontDesk::new(demo_store(), Arc::new(frontdesk_core::inventory::UnconfiguredInventory))
    }

    pub fn provider_desk(rooms: Result<Vec<Room>, InventoryError>) -> FrontDesk {
        FrontDesk::new(demo_store(), Arc::new(StubInventory(rooms)))
    }

    pub fn provider_room(id: &str, room_type: &str, price: i64) -> Room {
        Room {
            id: id.to_owned(),
            room_type: room_type.to_owned(),
            description: String::new(),
            price_per_night: Decimal::new(price, 0),
            capacity: 2,
            amenities: vec!["Free WiFi".to_owned(), "KING bed".to_owned()],
            available: true,
            source: RoomSource::Provider,
            hotel_name: Some("Airport Plaza".to_owned()),
            currency: Some("USD".to_owned()),
        }
    }

    pub fn date(month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, month, day).expect("valid date")
    }
}
