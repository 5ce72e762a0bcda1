use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};

use frontdesk_core::domain::booking::{
    Booking, BookingChannel, BookingId, GuestDetails, StayDetails,
};
use frontdesk_core::domain::hotel::HotelData;
use frontdesk_core::domain::room::Room;

use crate::repositories::{HotelRepository, RepositoryError};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("could not read hotel data `{path}`: {source}")]
    Read { path: PathBuf, source: std::io::Error },
    #[error("could not parse hotel data `{path}`: {source}")]
    Parse { path: PathBuf, source: serde_json::Error },
    #[error("could not write hotel data `{path}`: {source}")]
    Write { path: PathBuf, source: std::io::Error },
    #[error("could not serialize hotel data: {0}")]
    Serialize(#[from] serde_json::Error),
}

struct StoreState {
    data: HotelData,
    next_sequence: u32,
}

impl StoreState {
    fn new(data: HotelData) -> Self {
        let next_sequence = data.highest_booking_sequence() + 1;
        Self { data, next_sequence }
    }
}

/// Hotel document kept in memory and mirrored to a JSON file.
///
/// All mutations go through one async mutex, and each one replaces the file atomically
/// (temp file plus rename) before the in-memory copy is updated.
pub struct JsonHotelStore {
    path: Option<PathBuf>,
    state: Mutex<StoreState>,
}

impl JsonHotelStore {
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        let data = read_document(&path).await?;
        info!(
            event_name = "store.opened",
            path = %path.display(),
            rooms = data.rooms.len(),
            bookings = data.bookings.len(),
            "hotel data loaded"
        );
        Ok(Self { path: Some(path), state: Mutex::new(StoreState::new(data)) })
    }

    /// Opens `path`, writing `seed` there first when the file does not exist yet.
    pub async fn open_or_seed(
        path: impl Into<PathBuf>,
        seed: impl FnOnce() -> Result<HotelData, serde_json::Error>,
    ) -> Result<Self, StoreError> {
        let path = path.into();
        let exists = tokio::fs::try_exists(&path)
            .await
            .map_err(|source| StoreError::Read { path: path.clone(), source })?;
        if !exists {
            warn!(
                event_name = "store.seeded",
                path = %path.display(),
                "hotel data file missing, writing demo data"
            );
            write_document(&path, &seed()?).await?;
        }
        Self::open(path).await
    }

    /// A store that never touches the filesystem.
    pub fn in_memory(data: HotelData) -> Self {
        Self { path: None, state: Mutex::new(StoreState::new(data)) }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    async fn persist(&self, data: &HotelData) -> Result<(), StoreError> {
        match &self.path {
            Some(path) => write_document(path, data).await,
            None => Ok(()),
        }
    }
}

#[async_trait]
impl HotelRepository for JsonHotelStore {
    async fn snapshot(&self) -> Result<HotelData, RepositoryError> {
        Ok(self.state.lock().await.data.clone())
    }

    async fn rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        Ok(self.state.lock().await.data.rooms.clone())
    }

    async fn available_rooms(&self) -> Result<Vec<Room>, RepositoryError> {
        Ok(self.state.lock().await.data.available_rooms())
    }

    async fn bookings(&self) -> Result<Vec<Booking>, RepositoryError> {
        Ok(self.state.lock().await.data.bookings.clone())
    }

    async fn find_booking(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError> {
        Ok(self.state.lock().await.data.booking(id).cloned())
    }

    async fn create_booking(
        &self,
        room: &Room,
        guest: GuestDetails,
        stay: StayDetails,
        channel: BookingChannel,
    ) -> Result<Booking, RepositoryError> {
        let mut state = self.state.lock().await;
        let booking_id = BookingId::from_sequence(state.next_sequence);
        let booking = Booking::new(booking_id, room, guest, stay, channel, Utc::now());

        let mut candidate = state.data.clone();
        candidate.add_booking(booking.clone())?;
        self.persist(&candidate).await?;

        state.data = candidate;
        state.next_sequence += 1;
        info!(
            event_name = "store.booking_created",
            booking_id = %booking.booking_id,
            room_id = %booking.room.room_id,
            channel = booking.source.as_str(),
            "booking persisted"
        );
        Ok(booking)
    }

    async fn cancel_booking(&self, id: &BookingId) -> Result<Option<Booking>, RepositoryError> {
        let mut state = self.state.lock().await;
        let mut candidate = state.data.clone();
        let Some(cancelled) = candidate.cancel_booking(id) else {
            return Ok(None);
        };

        self.persist(&candidate).await?;
        state.data = candidate;
        info!(
            event_name = "store.booking_cancelled",
            booking_id = %cancelled.booking_id,
            room_id = %cancelled.room.room_id,
            "booking removed"
        );
        Ok(Some(cancelled))
    }
}

async fn read_document(path: &Path) -> Result<HotelData, StoreError> {
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
    serde_json::from_str(&raw)
        .map_err(|source| StoreError::Parse { path: path.to_path_buf(), source })
}

async fn write_document(path: &Path, data: &HotelData) -> Result<(), StoreError> {
    let body = serde_json::to_vec_pretty(data)?;
    let temp_path = path.with_extension("json.tmp");
    let write_error = |source| StoreError::Write { path: path.to_path_buf(), source };

    if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
    }
    tokio::fs::write(&temp_path, body).await.map_err(write_error)?;
    tokio::fs::rename(&temp_path, path).await.map_err(write_error)?;
    Ok(())
}
