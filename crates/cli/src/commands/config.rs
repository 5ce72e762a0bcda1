use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use frontdesk_core::config::{AppConfig, LoadOptions};
use secrecy::{ExposeSecret, SecretString};
use toml::Value;

/// One rendered configuration field.
struct Field {
    key: &'static str,
    env_key: &'static str,
    value: String,
}

impl Field {
    fn new(key: &'static str, env_key: &'static str, value: impl Into<String>) -> Self {
        Self { key, env_key, value: value.into() }
    }
}

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = detect_config_path();
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];
    for field in fields(&config) {
        let source = field_source(
            field.key,
            Some(field.env_key),
            config_file_doc.as_ref(),
            config_file_path.as_deref(),
        );
        lines.push(render_line(field.key, &field.value, source));
    }

    lines.join("\n")
}

fn fields(config: &AppConfig) -> Vec<Field> {
    let optional = |value: &Option<String>| value.clone().unwrap_or_else(|| "<unset>".to_string());

    vec![
        Field::new(
            "store.data_file",
            "FRONTDESK_STORE_DATA_FILE",
            config.store.data_file.display().to_string(),
        ),
        Field::new(
            "store.session_ttl_secs",
            "FRONTDESK_STORE_SESSION_TTL_SECS",
            config.store.session_ttl_secs.to_string(),
        ),
        Field::new(
            "store.sweep_interval_secs",
            "FRONTDESK_STORE_SWEEP_INTERVAL_SECS",
            config.store.sweep_interval_secs.to_string(),
        ),
        Field::new(
            "server.bind_address",
            "FRONTDESK_SERVER_BIND_ADDRESS",
            config.server.bind_address.clone(),
        ),
        Field::new("server.port", "FRONTDESK_SERVER_PORT", config.server.port.to_string()),
        Field::new(
            "server.static_dir",
            "FRONTDESK_SERVER_STATIC_DIR",
            config
                .server
                .static_dir
                .as_ref()
                .map(|dir| dir.display().to_string())
                .unwrap_or_else(|| "<unset>".to_string()),
        ),
        Field::new(
            "server.public_base_url",
            "FRONTDESK_SERVER_PUBLIC_BASE_URL",
            optional(&config.server.public_base_url),
        ),
        Field::new("hotel.name", "FRONTDESK_HOTEL_NAME", config.hotel.name.clone()),
        Field::new(
            "hotel.agent_name",
            "FRONTDESK_HOTEL_AGENT_NAME",
            config.hotel.agent_name.clone(),
        ),
        Field::new(
            "inventory.api_key",
            "FRONTDESK_INVENTORY_API_KEY",
            redact_secret(config.inventory.api_key.as_ref()),
        ),
        Field::new(
            "inventory.api_secret",
            "FRONTDESK_INVENTORY_API_SECRET",
            redact_secret(config.inventory.api_secret.as_ref()),
        ),
        Field::new(
            "inventory.base_url",
            "FRONTDESK_INVENTORY_BASE_URL",
            config.inventory.base_url.clone(),
        ),
        Field::new(
            "inventory.hotel_id",
            "FRONTDESK_INVENTORY_HOTEL_ID",
            config.inventory.hotel_id.clone(),
        ),
        Field::new(
            "inventory.city_code",
            "FRONTDESK_INVENTORY_CITY_CODE",
            config.inventory.city_code.clone(),
        ),
        Field::new(
            "voice.api_key",
            "FRONTDESK_VOICE_API_KEY",
            redact_secret(config.voice.api_key.as_ref()),
        ),
        Field::new(
            "voice.assistant_id",
            "FRONTDESK_VOICE_ASSISTANT_ID",
            optional(&config.voice.assistant_id),
        ),
        Field::new(
            "voice.phone_number_id",
            "FRONTDESK_VOICE_PHONE_NUMBER_ID",
            optional(&config.voice.phone_number_id),
        ),
        Field::new(
            "voice.webhook_secret",
            "FRONTDESK_VOICE_WEBHOOK_SECRET",
            redact_secret(config.voice.webhook_secret.as_ref()),
        ),
        Field::new(
            "llm.api_key",
            "FRONTDESK_LLM_API_KEY",
            redact_secret(config.llm.api_key.as_ref()),
        ),
        Field::new("llm.base_url", "FRONTDESK_LLM_BASE_URL", config.llm.base_url.clone()),
        Field::new("llm.model", "FRONTDESK_LLM_MODEL", config.llm.model.clone()),
        Field::new("logging.level", "FRONTDESK_LOGGING_LEVEL", config.logging.level.clone()),
        Field::new(
            "logging.format",
            "FRONTDESK_LOGGING_FORMAT",
            format!("{:?}", config.logging.format),
        ),
    ]
}

fn detect_config_path() -> Option<PathBuf> {
    let root = PathBuf::from("frontdesk.toml");
    if root.exists() {
        return Some(root);
    }

    let nested = PathBuf::from("config/frontdesk.toml");
    if nested.exists() {
        return Some(nested);
    }

    None
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_key: Option<&str>,
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    if let Some(env_key) = env_key {
        if env::var_os(env_key).is_some() {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

/// Keeps the last four characters of long keys so operators can tell them apart.
fn redact_secret(secret: Option<&SecretString>) -> String {
    let Some(secret) = secret else {
        return "<unset>".to_string();
    };
    let trimmed = secret.expose_secret().trim();
    if trimmed.is_empty() {
        return "<empty>".to_string();
    }

    let chars: Vec<char> = trimmed.chars().collect();
    if chars.len() <= 8 {
        return "<redacted>".to_string();
    }
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("***{tail}")
}
