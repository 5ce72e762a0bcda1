use frontdesk_core::config::{AppConfig, LoadOptions};
use frontdesk_db::repositories::HotelRepository;
use frontdesk_db::{DemoDataset, JsonHotelStore};
use frontdesk_inventory::InventoryClient;
use serde::Serialize;

use crate::commands::{block_on, escape_json};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Pass,
    Fail,
    Skipped,
}

#[derive(Debug, Serialize)]
pub struct DoctorCheck {
    pub name: &'static str,
    pub status: CheckStatus,
    pub details: String,
}

#[derive(Debug, Serialize)]
pub struct DoctorReport {
    pub overall_status: CheckStatus,
    pub summary: String,
    pub checks: Vec<DoctorCheck>,
}

pub fn run(json_output: bool) -> String {
    let report = build_report(AppConfig::load(LoadOptions::default()));

    if json_output {
        return serde_json::to_string_pretty(&report).unwrap_or_else(|error| {
            format!(
                "{{\"overall_status\":\"fail\",\"summary\":\"doctor serialization failed\",\
                 \"error\":\"{}\"}}",
                escape_json(&error.to_string())
            )
        });
    }

    render_human(&report)
}

/// Skipped checks cover optional integrations; only failures make the report fail.
pub fn build_report<E: std::fmt::Display>(config: Result<AppConfig, E>) -> DoctorReport {
    let mut checks = Vec::new();

    match config {
        Ok(config) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Pass,
                details: "configuration loaded and validated".to_string(),
            });
            checks.push(check_hotel_data(&config));
            checks.push(check_inventory(&config));
            checks.push(configured_check(
                "voice_credentials",
                config.voice.is_configured(),
                "voice API key present",
                "voice.api_key unset, phone endpoints disabled",
            ));
            checks.push(configured_check(
                "llm_credentials",
                config.llm.is_configured(),
                "llm API key present",
                "llm.api_key unset, intent detection uses keyword rules only",
            ));
        }
        Err(error) => {
            checks.push(DoctorCheck {
                name: "config_validation",
                status: CheckStatus::Fail,
                details: error.to_string(),
            });
            let dependent =
                ["hotel_data", "inventory_connectivity", "voice_credentials", "llm_credentials"];
            for name in dependent {
                checks.push(DoctorCheck {
                    name,
                    status: CheckStatus::Skipped,
                    details: "skipped because configuration did not load".to_string(),
                });
            }
        }
    }

    let failed = checks.iter().any(|check| check.status == CheckStatus::Fail);
    let overall_status = if failed { CheckStatus::Fail } else { CheckStatus::Pass };
    let summary = if failed {
        "doctor: one or more readiness checks failed".to_string()
    } else {
        "doctor: all readiness checks passed".to_string()
    };

    DoctorReport { overall_status, summary, checks }
}

fn check_hotel_data(config: &AppConfig) -> DoctorCheck {
    let path = config.store.data_file.clone();
    if !path.exists() {
        return DoctorCheck {
            name: "hotel_data",
            status: CheckStatus::Pass,
            details: format!("`{}` missing, demo data is written on first start", path.display()),
        };
    }

    let result = block_on(async {
        let store = JsonHotelStore::open(path.clone()).await.map_err(|error| error.to_string())?;
        store.snapshot().await.map_err(|error| error.to_string())
    });

    match result {
        Ok(Ok(data)) => {
            let verification = DemoDataset::verify(&data);
            let note = if verification.all_present { "" } else { " (customized catalogue)" };
            DoctorCheck {
                name: "hotel_data",
                status: CheckStatus::Pass,
                details: format!(
                    "`{}` readable: {} rooms, {} bookings{note}",
                    path.display(),
                    data.rooms.len(),
                    data.bookings.len()
                ),
            }
        }
        Ok(Err(error)) => {
            DoctorCheck { name: "hotel_data", status: CheckStatus::Fail, details: error }
        }
        Err(error) => DoctorCheck {
            name: "hotel_data",
            status: CheckStatus::Fail,
            details: format!("failed to initialize async runtime: {error}"),
        },
    }
}

fn check_inventory(config: &AppConfig) -> DoctorCheck {
    let client = match InventoryClient::from_config(&config.inventory, &config.hotel.name) {
        Ok(client) => client,
        Err(error) => {
            return DoctorCheck {
                name: "inventory_connectivity",
                status: CheckStatus::Skipped,
                details: format!("{error}, availability uses static rooms"),
            };
        }
    };

    match block_on(client.access_token()) {
        Ok(Ok(_)) => DoctorCheck {
            name: "inventory_connectivity",
            status: CheckStatus::Pass,
            details: format!("authenticated against `{}`", config.inventory.base_url),
        },
        Ok(Err(error)) => DoctorCheck {
            name: "inventory_connectivity",
            status: CheckStatus::Fail,
            details: error.to_string(),
        },
        Err(error) => DoctorCheck {
            name: "inventory_connectivity",
            status: CheckStatus::Fail,
            details: format!("failed to initialize async runtime: {error}"),
        },
    }
}

fn configured_check(
    name: &'static str,
    configured: bool,
    present: &str,
    missing: &str,
) -> DoctorCheck {
    if configured {
        DoctorCheck { name, status: CheckStatus::Pass, details: present.to_string() }
    } else {
        DoctorCheck { name, status: CheckStatus::Skipped, details: missing.to_string() }
    }
}

fn render_human(report: &DoctorReport) -> String {
    let mut lines = Vec::new();
    lines.push(report.summary.clone());

    for check in &report.checks {
        let marker = match check.status {
            CheckStatus::Pass => "ok",
            CheckStatus::Fail => "fail",
            CheckStatus::Skipped => "skip",
        };
        lines.push(format!("- [{marker}] {}: {}", check.name, check.details));
    }

    lines.join("\n")
}
