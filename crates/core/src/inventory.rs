use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::room::Room;

/// A live availability lookup for one stay.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AvailabilityQuery {
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub adults: u32,
}

impl AvailabilityQuery {
    pub fn new(check_in: NaiveDate, check_out: NaiveDate, adults: u32) -> Self {
        Self { check_in, check_out, adults: adults.max(1) }
    }

    pub fn nights(&self) -> u32 {
        let days = (self.check_out - self.check_in).num_days();
        u32::try_from(days).unwrap_or(0).max(1)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("inventory provider is not configured")]
    NotConfigured,
    #[error("inventory authentication failed: {0}")]
    Authentication(String),
    #[error("inventory request failed: {0}")]
    Http(String),
    #[error("inventory provider returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("inventory response could not be decoded: {0}")]
    Decode(String),
}

/// Source of live room offers for the hotel property.
#[async_trait]
pub trait InventoryProvider: Send + Sync {
    fn is_configured(&self) -> bool;

    /// Offers for the configured property; an empty list means nothing matched.
    async fn search_rooms(&self, query: &AvailabilityQuery) -> Result<Vec<Room>, InventoryError>;

    /// Confirms the credentials are accepted.
    async fn check_connection(&self) -> Result<(), InventoryError>;
}

/// Stand-in used when no inventory credentials are configured.
#[derive(Clone, Copy, Debug, Default)]
pub struct UnconfiguredInventory;

#[async_trait]
impl InventoryProvider for UnconfiguredInventory {
    fn is_configured(&self) -> bool {
        false
    }

    async fn search_rooms(&self, _query: &AvailabilityQuery) -> Result<Vec<Room>, InventoryError> {
        Err(InventoryError::NotConfigured)
    }

    async fn check_connection(&self) -> Result<(), InventoryError> {
        Err(InventoryError::NotConfigured)
    }
}
