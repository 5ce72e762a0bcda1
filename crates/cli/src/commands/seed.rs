use std::path::Path;

use crate::commands::{block_on, CommandResult};
use frontdesk_core::config::{AppConfig, LoadOptions};
use frontdesk_db::repositories::HotelRepository;
use frontdesk_db::{DemoDataset, JsonHotelStore, VerificationResult};

pub fn run(force: bool) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "seed",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    seed_file(&config.store.data_file, force)
}

pub fn seed_file(path: &Path, force: bool) -> CommandResult {
    let result = block_on(async {
        let seeded = DemoDataset::write_to(path, force)
            .await
            .map_err(|error| ("seed_execution", error.to_string(), 5u8))?;

        let store = JsonHotelStore::open(path)
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;
        let data = store
            .snapshot()
            .await
            .map_err(|error| ("seed_verification", error.to_string(), 6u8))?;

        let verification = DemoDataset::verify(&data);
        if !verification.all_present {
            return Err(("seed_verification", verification_message(&verification), 6u8));
        }
        Ok((seeded.written, data.rooms.len(), data.bookings.len()))
    });

    match result {
        Ok(Ok((written, rooms, bookings))) => {
            let message = if written {
                format!("demo hotel data written to {}: {rooms} rooms", path.display())
            } else {
                format!(
                    "{} already exists ({rooms} rooms, {bookings} bookings); pass --force to \
                     overwrite",
                    path.display()
                )
            };
            CommandResult::success("seed", message)
        }
        Ok(Err((error_class, message, exit_code))) => {
            CommandResult::failure("seed", error_class, message, exit_code)
        }
        Err(error) => CommandResult::failure(
            "seed",
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        ),
    }
}

fn verification_message(verification: &VerificationResult) -> String {
    let failed_checks = verification.failed().collect::<Vec<_>>();
    if failed_checks.is_empty() {
        "Some seed data failed to load".to_string()
    } else {
        format!("Seed verification failed for checks: {}", failed_checks.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use frontdesk_db::VerificationResult;

    use super::verification_message;

    #[test]
    fn verification_error_message_targets_failed_checks() {
        let verification = VerificationResult {
            all_present: false,
            checks: vec![
                ("room 101".to_owned(), true),
                ("amenity pool".to_owned(), false),
                ("policy pets".to_owned(), false),
            ],
        };

        assert_eq!(
            verification_message(&verification),
            "Seed verification failed for checks: amenity pool, policy pets"
        );
    }

    #[test]
    fn verification_error_message_falls_back_to_generic_when_no_labels() {
        let verification = VerificationResult {
            all_present: false,
            checks: vec![("room 101".to_owned(), true)],
        };

        assert_eq!(verification_message(&verification), "Some seed data failed to load");
    }
}
