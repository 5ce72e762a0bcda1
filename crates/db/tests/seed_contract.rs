use std::collections::HashSet;

use frontdesk_db::repositories::HotelRepository;
use frontdesk_db::{DemoDataset, JsonHotelStore};
use serde_json::Value;

type SeedContractTestResult<T = ()> = Result<T, String>;

fn fixture() -> SeedContractTestResult<Value> {
    serde_json::from_str(DemoDataset::JSON).map_err(|error| format!("fixture is not JSON: {error}"))
}

fn require_array<'a>(value: &'a Value, field: &'static str) -> SeedContractTestResult<&'a [Value]> {
    value
        .get(field)
        .and_then(Value::as_array)
        .map(|values| values.as_slice())
        .ok_or_else(|| format!("field '{field}' should be an array"))
}

fn require_object<'a>(
    value: &'a Value,
    field: &'static str,
) -> SeedContractTestResult<&'a serde_json::Map<String, Value>> {
    value
        .get(field)
        .and_then(Value::as_object)
        .ok_or_else(|| format!("field '{field}' should be an object"))
}

#[test]
fn fixture_rooms_are_unique_priced_and_bookable() -> SeedContractTestResult {
    let doc = fixture()?;
    let rooms = require_array(&doc, "rooms")?;

    let mut ids = HashSet::new();
    for room in rooms {
        let id = room["id"].as_str().ok_or("room id should be a string")?;
        if !ids.insert(id.to_owned()) {
            return Err(format!("duplicate room id {id}"));
        }
        let price = room["price_per_night"]
            .as_f64()
            .ok_or_else(|| format!("room {id} needs a price_per_night"))?;
        if price <= 0.0 {
            return Err(format!("room {id} has non-positive price {price}"));
        }
        let capacity = room["capacity"].as_u64().unwrap_or(0);
        if !(1..=4).contains(&capacity) {
            return Err(format!("room {id} has capacity {capacity}"));
        }
        if room["available"] != Value::Bool(true) {
            return Err(format!("room {id} should start available"));
        }
    }

    if rooms.len() != 8 {
        return Err(format!("expected 8 demo rooms, found {}", rooms.len()));
    }
    Ok(())
}

#[test]
fn fixture_has_no_bookings_and_full_catalogues() -> SeedContractTestResult {
    let doc = fixture()?;

    if !require_array(&doc, "bookings")?.is_empty() {
        return Err("demo data should start without bookings".to_owned());
    }
    let amenities = require_object(&doc, "amenities")?;
    if !amenities.contains_key("airport_shuttle") {
        return Err("airport shuttle amenity missing".to_owned());
    }
    let policies = require_object(&doc, "policies")?;
    for key in ["check_in", "check_out", "cancellation"] {
        if !policies.contains_key(key) {
            return Err(format!("policy '{key}' missing"));
        }
    }
    for faq in require_array(&doc, "faqs")? {
        if faq["question"].as_str().is_none() || faq["answer"].as_str().is_none() {
            return Err(format!("faq entry malformed: {faq}"));
        }
    }
    Ok(())
}

#[test]
fn loaded_dataset_passes_verification() -> SeedContractTestResult {
    let data = DemoDataset::load().map_err(|error| error.to_string())?;
    let verification = DemoDataset::verify(&data);

    if !verification.all_present {
        let failed: Vec<_> = verification.failed().collect();
        return Err(format!("verification failed for {}", failed.join(", ")));
    }
    Ok(())
}

#[tokio::test]
async fn written_file_round_trips_through_the_store() -> SeedContractTestResult {
    let dir = tempfile::tempdir().map_err(|error| error.to_string())?;
    let path = dir.path().join("nested/hotel_data.json");

    let first = DemoDataset::write_to(&path, false).await.map_err(|error| error.to_string())?;
    let second = DemoDataset::write_to(&path, false).await.map_err(|error| error.to_string())?;
    if !first.written || second.written {
        return Err("second write without force should be skipped".to_owned());
    }

    let store = JsonHotelStore::open(path.clone()).await.map_err(|error| error.to_string())?;
    let available = store.available_rooms().await.map_err(|error| error.to_string())?;
    if available.len() != first.rooms {
        return Err(format!("expected {} available rooms, found {}", first.rooms, available.len()));
    }
    if store.path() != Some(path.as_path()) {
        return Err("store should remember its backing file".to_owned());
    }
    Ok(())
}
