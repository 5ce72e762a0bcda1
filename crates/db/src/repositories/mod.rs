use async_trait::async_trait;
use thiserror::Error;

use frontdesk_core::domain::booking::{
    Booking, BookingChannel, BookingId, GuestDetails, StayDetails,
};
use frontdesk_core::domain::hotel::HotelData;
use frontdesk_core::domain::room::Room;
use frontdesk_core::domain::session::{CallSession, ConversationSession};
use frontdesk_core::errors::{ApplicationError, DomainError};

use crate::store::StoreError;

pub mod memory;

pub use memory::{InMemoryCallSessionStore, InMemorySessionStore};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
    #[error(transparent)]
    Domain(#[from] DomainError),
}

impl From<RepositoryError> for ApplicationError {
    fn from(error: RepositoryError) -> Self {
        match error {
            RepositoryError::Domain(domain) => ApplicationError::Domain(domain),
            RepositoryError::Store(store) => ApplicationError::Persistence(store.to_string()),
        }
    }
}

/// Rooms, bookings and reference content for the hotel.
#[async_trait]
pub trait HotelRepository: Send + Sync {
    async fn snapshot(&self) -> Result<HotelData, RepositoryError>;
    async fn rooms(&self) -> Result<Vec<Room>, RepositoryError>;
    async fn available_rooms(&self) -> Result<Vec<Room>, RepositoryError>;
    async fn bookings(&self) -> Result<Vec<Booking>, RepositoryError>;
    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError>;

    /// Assigns the next booking id and persists the booking in one step.
    async fn create_booking(
        &self,
        room: &Room,
        guest: GuestDetails,
        stay: StayDetails,
        channel: BookingChannel,
    ) -> Result<Booking, RepositoryError>;

    /// `Ok(None)` when no booking has that id.
    async fn cancel_booking(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError>;
}

/// Chat dialogue state keyed by session id, subject to an idle timeout.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Expired sessions are reported as absent.
    async fn find(&self, id: &str) -> Result<Option<ConversationSession>, RepositoryError>;
    async fn save(&self, session: ConversationSession) -> Result<(), RepositoryError>;
    async fn remove(&self, id: &str) -> Result<(), RepositoryError>;
    /// Drops idle sessions and returns how many were removed.
    async fn sweep_expired(&self) -> Result<usize, RepositoryError>;
}

#[async_trait]
pub trait CallSessionRepository: Send + Sync {
    async fn find(&self, id: &str) -> Result<Option<CallSession>, RepositoryError>;
    async fn find_by_call_id(&self, call_id: &str) -> Result<Option<CallSession>, RepositoryError>;
    async fn save(&self, session: CallSession) -> Result<(), RepositoryError>;
    /// Most recent first.
    async fn list(&self) -> Result<Vec<CallSession>, RepositoryError>;
}
