use std::path::{Path, PathBuf};

use frontdesk_core::domain::hotel::HotelData;

use crate::store::StoreError;

const SEED_ROOM_IDS: &[&str] = &["101", "102", "103", "105", "201", "202", "301", "401"];

const SEED_AMENITY_KEYS: &[&str] = &[
    "pool",
    "fitness_center",
    "parking",
    "wifi",
    "breakfast",
    "restaurant",
    "business_center",
    "concierge",
    "airport_shuttle",
];

const SEED_POLICY_KEYS: &[&str] =
    &["check_in", "check_out", "cancellation", "pets", "smoking", "payment"];

const SEED_FAQ_COUNT: usize = 5;

/// Demo hotel content used for first start and for `frontdesk seed`.
///
/// Eight static rooms across six room types, no bookings, the amenity and
/// policy catalogues, and a handful of FAQs.
pub struct DemoDataset;

impl DemoDataset {
    pub const JSON: &str = include_str!("../../../config/fixtures/hotel_data.json");

    pub fn load() -> Result<HotelData, serde_json::Error> {
        serde_json::from_str(Self::JSON)
    }

    /// Writes the dataset to `path`. An existing file is left alone unless `force` is set.
    pub async fn write_to(path: &Path, force: bool) -> Result<SeedResult, StoreError> {
        let exists = tokio::fs::try_exists(path)
            .await
            .map_err(|source| StoreError::Read { path: path.to_path_buf(), source })?;
        if exists && !force {
            return Ok(SeedResult { path: path.to_path_buf(), written: false, rooms: 0 });
        }

        let data = Self::load()?;
        let write_error = |source| StoreError::Write { path: path.to_path_buf(), source };
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await.map_err(write_error)?;
        }
        tokio::fs::write(path, Self::JSON).await.map_err(write_error)?;

        Ok(SeedResult { path: path.to_path_buf(), written: true, rooms: data.rooms.len() })
    }

    /// Checks that `data` still carries the demo catalogue.
    pub fn verify(data: &HotelData) -> VerificationResult {
        let mut checks = Vec::new();

        for room_id in SEED_ROOM_IDS {
            checks.push((format!("room {room_id}"), data.room(room_id).is_some()));
        }
        for key in SEED_AMENITY_KEYS {
            checks.push((format!("amenity {key}"), data.amenities.contains_key(*key)));
        }
        for key in SEED_POLICY_KEYS {
            checks.push((format!("policy {key}"), data.policies.contains_key(*key)));
        }
        checks.push(("faqs".to_owned(), data.faqs.len() >= SEED_FAQ_COUNT));

        let orphaned = data.bookings.iter().filter(|booking| {
            booking.is_static_room() && data.room(&booking.room.room_id).is_none()
        });
        checks.push(("bookings reference known rooms".to_owned(), orphaned.count() == 0));

        let all_present = checks.iter().all(|(_, ok)| *ok);
        VerificationResult { all_present, checks }
    }
}

#[derive(Debug)]
pub struct SeedResult {
    pub path: PathBuf,
    pub written: bool,
    pub rooms: usize,
}

#[derive(Debug)]
pub struct VerificationResult {
    pub all_present: bool,
    pub checks: Vec<(String, bool)>,
}

impl VerificationResult {
    pub fn failed(&self) -> impl Iterator<Item = &str> {
        self.checks.iter().filter(|(_, ok)| !ok).map(|(label, _)| label.as_str())
    }
}
