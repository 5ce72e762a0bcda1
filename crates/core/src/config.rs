use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub hotel: HotelConfig,
    pub inventory: InventoryConfig,
    pub voice: VoiceConfig,
    pub llm: LlmConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct StoreConfig {
    pub data_file: PathBuf,
    pub session_ttl_secs: u64,
    pub sweep_interval_secs: u64,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
    pub graceful_shutdown_secs: u64,
    pub static_dir: Option<PathBuf>,
    pub public_base_url: Option<String>,
}

#[derive(Clone, Debug)]
pub struct HotelConfig {
    pub name: String,
    pub address: String,
    pub agent_name: String,
}

#[derive(Clone, Debug)]
pub struct InventoryConfig {
    pub api_key: Option<SecretString>,
    pub api_secret: Option<SecretString>,
    pub base_url: String,
    pub hotel_id: String,
    pub chain_code: String,
    pub city_code: String,
    pub radius: u32,
    pub timeout_secs: u64,
    pub token_timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct VoiceConfig {
    pub api_key: Option<SecretString>,
    pub public_key: Option<String>,
    pub base_url: String,
    pub assistant_id: Option<String>,
    pub phone_number_id: Option<String>,
    pub webhook_secret: Option<SecretString>,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LlmConfig {
    pub api_key: Option<SecretString>,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_file: Option<PathBuf>,
    pub port: Option<u16>,
    pub static_dir: Option<PathBuf>,
    pub log_level: Option<String>,
    pub inventory_api_key: Option<String>,
    pub inventory_api_secret: Option<String>,
    pub voice_api_key: Option<String>,
    pub voice_assistant_id: Option<String>,
    pub llm_api_key: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig {
                data_file: PathBuf::from("hotel_data.json"),
                session_ttl_secs: 1_800,
                sweep_interval_secs: 60,
            },
            server: ServerConfig {
                bind_address: "127.0.0.1".to_string(),
                port: 5000,
                graceful_shutdown_secs: 15,
                static_dir: Some(PathBuf::from("static")),
                public_base_url: None,
            },
            hotel: HotelConfig {
                name: "Hyatt House Charlotte Airport".to_string(),
                address: "4920 South Tryon Street, Charlotte, NC".to_string(),
                agent_name: "Sarah".to_string(),
            },
            inventory: InventoryConfig {
                api_key: None,
                api_secret: None,
                base_url: "https://test.api.amadeus.com/v1".to_string(),
                hotel_id: "HYCLTCHA".to_string(),
                chain_code: "HY".to_string(),
                city_code: "CLT".to_string(),
                radius: 5,
                timeout_secs: 15,
                token_timeout_secs: 10,
            },
            voice: VoiceConfig {
                api_key: None,
                public_key: None,
                base_url: "https://api.vapi.ai".to_string(),
                assistant_id: None,
                phone_number_id: None,
                webhook_secret: None,
                timeout_secs: 30,
            },
            llm: LlmConfig {
                api_key: None,
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-3.5-turbo".to_string(),
                timeout_secs: 30,
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

fn has_secret(value: Option<&SecretString>) -> bool {
    value.map(|secret| !secret.expose_secret().trim().is_empty()).unwrap_or(false)
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

impl InventoryConfig {
    /// Both halves of the client-credentials pair are present.
    pub fn is_configured(&self) -> bool {
        has_secret(self.api_key.as_ref()) && has_secret(self.api_secret.as_ref())
    }
}

impl VoiceConfig {
    pub fn is_configured(&self) -> bool {
        has_secret(self.api_key.as_ref())
    }
}

impl LlmConfig {
    pub fn is_configured(&self) -> bool {
        has_secret(self.api_key.as_ref())
    }
}

impl ServerConfig {
    pub fn base_url(&self) -> String {
        match &self.public_base_url {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("http://{}:{}", self.bind_address, self.port),
        }
    }
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("frontdesk.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(store) = patch.store {
            if let Some(data_file) = store.data_file {
                self.store.data_file = data_file;
            }
            if let Some(session_ttl_secs) = store.session_ttl_secs {
                self.store.session_ttl_secs = session_ttl_secs;
            }
            if let Some(sweep_interval_secs) = store.sweep_interval_secs {
                self.store.sweep_interval_secs = sweep_interval_secs;
            }
        }

        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
            if let Some(graceful_shutdown_secs) = server.graceful_shutdown_secs {
                self.server.graceful_shutdown_secs = graceful_shutdown_secs;
            }
            if let Some(static_dir) = server.static_dir {
                self.server.static_dir = Some(static_dir);
            }
            if let Some(public_base_url) = server.public_base_url {
                self.server.public_base_url = Some(public_base_url);
            }
        }

        if let Some(hotel) = patch.hotel {
            if let Some(name) = hotel.name {
                self.hotel.name = name;
            }
            if let Some(address) = hotel.address {
                self.hotel.address = address;
            }
            if let Some(agent_name) = hotel.agent_name {
                self.hotel.agent_name = agent_name;
            }
        }

        if let Some(inventory) = patch.inventory {
            if let Some(api_key) = inventory.api_key {
                self.inventory.api_key = Some(secret_value(api_key));
            }
            if let Some(api_secret) = inventory.api_secret {
                self.inventory.api_secret = Some(secret_value(api_secret));
            }
            if let Some(base_url) = inventory.base_url {
                self.inventory.base_url = base_url;
            }
            if let Some(hotel_id) = inventory.hotel_id {
                self.inventory.hotel_id = hotel_id;
            }
            if let Some(chain_code) = inventory.chain_code {
                self.inventory.chain_code = chain_code;
            }
            if let Some(city_code) = inventory.city_code {
                self.inventory.city_code = city_code;
            }
            if let Some(radius) = inventory.radius {
                self.inventory.radius = radius;
            }
            if let Some(timeout_secs) = inventory.timeout_secs {
                self.inventory.timeout_secs = timeout_secs;
            }
            if let Some(token_timeout_secs) = inventory.token_timeout_secs {
                self.inventory.token_timeout_secs = token_timeout_secs;
            }
        }

        if let Some(voice) = patch.voice {
            if let Some(api_key) = voice.api_key {
                self.voice.api_key = Some(secret_value(api_key));
            }
            if let Some(public_key) = voice.public_key {
                self.voice.public_key = Some(public_key);
            }
            if let Some(base_url) = voice.base_url {
                self.voice.base_url = base_url;
            }
            if let Some(assistant_id) = voice.assistant_id {
                self.voice.assistant_id = Some(assistant_id);
            }
            if let Some(phone_number_id) = voice.phone_number_id {
                self.voice.phone_number_id = Some(phone_number_id);
            }
            if let Some(webhook_secret) = voice.webhook_secret {
                self.voice.webhook_secret = Some(secret_value(webhook_secret));
            }
            if let Some(timeout_secs) = voice.timeout_secs {
                self.voice.timeout_secs = timeout_secs;
            }
        }

        if let Some(llm) = patch.llm {
            if let Some(api_key) = llm.api_key {
                self.llm.api_key = Some(secret_value(api_key));
            }
            if let Some(base_url) = llm.base_url {
                self.llm.base_url = base_url;
            }
            if let Some(model) = llm.model {
                self.llm.model = model;
            }
            if let Some(timeout_secs) = llm.timeout_secs {
                self.llm.timeout_secs = timeout_secs;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("FRONTDESK_STORE_DATA_FILE") {
            self.store.data_file = PathBuf::from(value);
        }
        if let Some(value) = read_env("FRONTDESK_STORE_SESSION_TTL_SECS") {
            self.store.session_ttl_secs = parse_u64("FRONTDESK_STORE_SESSION_TTL_SECS", &value)?;
        }
        if let Some(value) = read_env("FRONTDESK_STORE_SWEEP_INTERVAL_SECS") {
            self.store.sweep_interval_secs =
                parse_u64("FRONTDESK_STORE_SWEEP_INTERVAL_SECS", &value)?;
        }

        if let Some(value) = read_env("FRONTDESK_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("FRONTDESK_SERVER_PORT") {
            self.server.port = parse_u16("FRONTDESK_SERVER_PORT", &value)?;
        }
        if let Some(value) = read_env("FRONTDESK_SERVER_GRACEFUL_SHUTDOWN_SECS") {
            self.server.graceful_shutdown_secs =
                parse_u64("FRONTDESK_SERVER_GRACEFUL_SHUTDOWN_SECS", &value)?;
        }
        if let Some(value) = read_env("FRONTDESK_SERVER_STATIC_DIR") {
            self.server.static_dir = Some(PathBuf::from(value));
        }
        if let Some(value) = read_env("FRONTDESK_SERVER_PUBLIC_BASE_URL") {
            self.server.public_base_url = Some(value);
        }

        if let Some(value) = read_env("FRONTDESK_HOTEL_NAME") {
            self.hotel.name = value;
        }
        if let Some(value) = read_env("FRONTDESK_HOTEL_ADDRESS") {
            self.hotel.address = value;
        }
        if let Some(value) = read_env("FRONTDESK_HOTEL_AGENT_NAME") {
            self.hotel.agent_name = value;
        }

        // Vendor variable names are accepted as aliases for existing deployments.
        let inventory_key =
            read_env("FRONTDESK_INVENTORY_API_KEY").or_else(|| read_env("AMADEUS_API_KEY"));
        if let Some(value) = inventory_key {
            self.inventory.api_key = Some(secret_value(value));
        }
        let inventory_secret =
            read_env("FRONTDESK_INVENTORY_API_SECRET").or_else(|| read_env("AMADEUS_API_SECRET"));
        if let Some(value) = inventory_secret {
            self.inventory.api_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("FRONTDESK_INVENTORY_BASE_URL") {
            self.inventory.base_url = value;
        }
        if let Some(value) = read_env("FRONTDESK_INVENTORY_HOTEL_ID") {
            self.inventory.hotel_id = value;
        }
        if let Some(value) = read_env("FRONTDESK_INVENTORY_CHAIN_CODE") {
            self.inventory.chain_code = value;
        }
        if let Some(value) = read_env("FRONTDESK_INVENTORY_CITY_CODE") {
            self.inventory.city_code = value;
        }
        if let Some(value) = read_env("FRONTDESK_INVENTORY_RADIUS") {
            self.inventory.radius = parse_u32("FRONTDESK_INVENTORY_RADIUS", &value)?;
        }
        if let Some(value) = read_env("FRONTDESK_INVENTORY_TIMEOUT_SECS") {
            self.inventory.timeout_secs = parse_u64("FRONTDESK_INVENTORY_TIMEOUT_SECS", &value)?;
        }

        let voice_key = read_env("FRONTDESK_VOICE_API_KEY").or_else(|| read_env("VAPI_API_KEY"));
        if let Some(value) = voice_key {
            self.voice.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("FRONTDESK_VOICE_PUBLIC_KEY") {
            self.voice.public_key = Some(value);
        }
        if let Some(value) = read_env("FRONTDESK_VOICE_BASE_URL") {
            self.voice.base_url = value;
        }
        let assistant_id =
            read_env("FRONTDESK_VOICE_ASSISTANT_ID").or_else(|| read_env("VAPI_ASSISTANT_ID"));
        if let Some(value) = assistant_id {
            self.voice.assistant_id = Some(value);
        }
        let phone_number_id = read_env("FRONTDESK_VOICE_PHONE_NUMBER_ID")
            .or_else(|| read_env("VAPI_PHONE_NUMBER_ID"));
        if let Some(value) = phone_number_id {
            self.voice.phone_number_id = Some(value);
        }
        if let Some(value) = read_env("FRONTDESK_VOICE_WEBHOOK_SECRET") {
            self.voice.webhook_secret = Some(secret_value(value));
        }
        if let Some(value) = read_env("FRONTDESK_VOICE_TIMEOUT_SECS") {
            self.voice.timeout_secs = parse_u64("FRONTDESK_VOICE_TIMEOUT_SECS", &value)?;
        }

        let llm_key = read_env("FRONTDESK_LLM_API_KEY").or_else(|| read_env("OPENAI_API_KEY"));
        if let Some(value) = llm_key {
            self.llm.api_key = Some(secret_value(value));
        }
        if let Some(value) = read_env("FRONTDESK_LLM_BASE_URL") {
            self.llm.base_url = value;
        }
        if let Some(value) = read_env("FRONTDESK_LLM_MODEL") {
            self.llm.model = value;
        }
        if let Some(value) = read_env("FRONTDESK_LLM_TIMEOUT_SECS") {
            self.llm.timeout_secs = parse_u64("FRONTDESK_LLM_TIMEOUT_SECS", &value)?;
        }

        let log_level =
            read_env("FRONTDESK_LOGGING_LEVEL").or_else(|| read_env("FRONTDESK_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("FRONTDESK_LOGGING_FORMAT").or_else(|| read_env("FRONTDESK_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_file) = overrides.data_file {
            self.store.data_file = data_file;
        }
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(static_dir) = overrides.static_dir {
            self.server.static_dir = Some(static_dir);
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
        if let Some(api_key) = overrides.inventory_api_key {
            self.inventory.api_key = Some(secret_value(api_key));
        }
        if let Some(api_secret) = overrides.inventory_api_secret {
            self.inventory.api_secret = Some(secret_value(api_secret));
        }
        if let Some(api_key) = overrides.voice_api_key {
            self.voice.api_key = Some(secret_value(api_key));
        }
        if let Some(assistant_id) = overrides.voice_assistant_id {
            self.voice.assistant_id = Some(assistant_id);
        }
        if let Some(api_key) = overrides.llm_api_key {
            self.llm.api_key = Some(secret_value(api_key));
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_store(&self.store)?;
        validate_server(&self.server)?;
        validate_hotel(&self.hotel)?;
        validate_inventory(&self.inventory)?;
        validate_voice(&self.voice)?;
        validate_llm(&self.llm)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("frontdesk.toml"), PathBuf::from("config/frontdesk.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_store(store: &StoreConfig) -> Result<(), ConfigError> {
    if store.data_file.as_os_str().is_empty() {
        return Err(ConfigError::Validation("store.data_file must not be empty".to_string()));
    }
    if store.session_ttl_secs == 0 {
        return Err(ConfigError::Validation(
            "store.session_ttl_secs must be greater than zero".to_string(),
        ));
    }
    if store.sweep_interval_secs == 0 {
        return Err(ConfigError::Validation(
            "store.sweep_interval_secs must be greater than zero".to_string(),
        ));
    }
    Ok(())
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.port == 0 {
        return Err(ConfigError::Validation("server.port must be greater than zero".to_string()));
    }

    if server.graceful_shutdown_secs == 0 {
        return Err(ConfigError::Validation(
            "server.graceful_shutdown_secs must be greater than zero".to_string(),
        ));
    }

    if let Some(base_url) = &server.public_base_url {
        require_http_url("server.public_base_url", base_url)?;
    }

    Ok(())
}

fn validate_hotel(hotel: &HotelConfig) -> Result<(), ConfigError> {
    if hotel.name.trim().is_empty() {
        return Err(ConfigError::Validation("hotel.name must not be empty".to_string()));
    }
    if hotel.agent_name.trim().is_empty() {
        return Err(ConfigError::Validation("hotel.agent_name must not be empty".to_string()));
    }
    Ok(())
}

fn validate_inventory(inventory: &InventoryConfig) -> Result<(), ConfigError> {
    require_http_url("inventory.base_url", &inventory.base_url)?;
    require_timeout("inventory.timeout_secs", inventory.timeout_secs)?;
    require_timeout("inventory.token_timeout_secs", inventory.token_timeout_secs)?;

    // A lone key or a lone secret is a typo, not an opt-out.
    if has_secret(inventory.api_key.as_ref()) != has_secret(inventory.api_secret.as_ref()) {
        return Err(ConfigError::Validation(
            "inventory.api_key and inventory.api_secret must be set together".to_string(),
        ));
    }

    if inventory.hotel_id.trim().is_empty() {
        return Err(ConfigError::Validation("inventory.hotel_id must not be empty".to_string()));
    }

    Ok(())
}

fn validate_voice(voice: &VoiceConfig) -> Result<(), ConfigError> {
    require_http_url("voice.base_url", &voice.base_url)?;
    require_timeout("voice.timeout_secs", voice.timeout_secs)
}

fn validate_llm(llm: &LlmConfig) -> Result<(), ConfigError> {
    require_http_url("llm.base_url", &llm.base_url)?;
    require_timeout("llm.timeout_secs", llm.timeout_secs)
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn require_http_url(key: &str, value: &str) -> Result<(), ConfigError> {
    if value.starts_with("http://") || value.starts_with("https://") {
        Ok(())
    } else {
        Err(ConfigError::Validation(format!("{key} must start with http:// or https://")))
    }
}

fn require_timeout(key: &str, value: u64) -> Result<(), ConfigError> {
    if value == 0 || value > 300 {
        return Err(ConfigError::Validation(format!("{key} must be in range 1..=300")));
    }
    Ok(())
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u32(key: &str, value: &str) -> Result<u32, ConfigError> {
    value.parse::<u32>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

fn parse_u64(key: &str, value: &str) -> Result<u64, ConfigError> {
    value.parse::<u64>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    store: Option<StorePatch>,
    server: Option<ServerPatch>,
    hotel: Option<HotelPatch>,
    inventory: Option<InventoryPatch>,
    voice: Option<VoicePatch>,
    llm: Option<LlmPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    data_file: Option<PathBuf>,
    session_ttl_secs: Option<u64>,
    sweep_interval_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
    graceful_shutdown_secs: Option<u64>,
    static_dir: Option<PathBuf>,
    public_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct HotelPatch {
    name: Option<String>,
    address: Option<String>,
    agent_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct InventoryPatch {
    api_key: Option<String>,
    api_secret: Option<String>,
    base_url: Option<String>,
    hotel_id: Option<String>,
    chain_code: Option<String>,
    city_code: Option<String>,
    radius: Option<u32>,
    timeout_secs: Option<u64>,
    token_timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct VoicePatch {
    api_key: Option<String>,
    public_key: Option<String>,
    base_url: Option<String>,
    assistant_id: Option<String>,
    phone_number_id: Option<String>,
    webhook_secret: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LlmPatch {
    api_key: Option<String>,
    base_url: Option<String>,
    model: Option<String>,
    timeout_secs: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::io;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use secrecy::ExposeSecret;
    use tempfile::TempDir;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars(vars: &[&str]) {
        for var in vars {
            env::remove_var(var);
        }
    }

    fn ensure(condition: bool, message: &'static str) -> Result<(), String> {
        if condition {
            Ok(())
        } else {
            Err(message.to_string())
        }
    }

    #[test]
    fn defaults_load_without_any_credentials() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let config = AppConfig::load(LoadOptions::default())
            .map_err(|err| format!("config load failed: {err}"))?;

        ensure(!config.inventory.is_configured(), "inventory should be unconfigured")?;
        ensure(!config.voice.is_configured(), "voice should be unconfigured")?;
        ensure(!config.llm.is_configured(), "llm should be unconfigured")?;
        ensure(config.store.session_ttl_secs == 1_800, "default session ttl is 30 minutes")?;
        ensure(config.inventory.timeout_secs == 15, "default inventory timeout is 15s")?;
        ensure(config.voice.timeout_secs == 30, "default voice timeout is 30s")?;
        ensure(
            config.server.base_url() == "http://127.0.0.1:5000",
            "base url should be derived from bind address and port",
        )
    }

    #[test]
    fn file_load_supports_env_interpolation() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("TEST_INVENTORY_KEY", "key-from-env");
        env::set_var("TEST_INVENTORY_SECRET", "secret-from-env");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("frontdesk.toml");
            fs::write(
                &path,
                r#"
[inventory]
api_key = "${TEST_INVENTORY_KEY}"
api_secret = "${TEST_INVENTORY_SECRET}"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config =
                AppConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                    .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config
                    .inventory
                    .api_key
                    .as_ref()
                    .map(|key| key.expose_secret() == "key-from-env")
                    .unwrap_or(false),
                "inventory key should be loaded from environment",
            )?;
            ensure(config.inventory.is_configured(), "inventory should report configured")?;
            Ok(())
        })();

        clear_vars(&["TEST_INVENTORY_KEY", "TEST_INVENTORY_SECRET"]);
        result
    }

    #[test]
    fn logging_env_aliases_are_supported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FRONTDESK_LOG_LEVEL", "warn");
        env::set_var("FRONTDESK_LOG_FORMAT", "pretty");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;

            ensure(config.logging.level == "warn", "warning log level should be set from env var")?;
            ensure(
                matches!(config.logging.format, LogFormat::Pretty),
                "pretty logging format should be set from env var",
            )?;
            Ok(())
        })();

        clear_vars(&["FRONTDESK_LOG_LEVEL", "FRONTDESK_LOG_FORMAT"]);
        result
    }

    #[test]
    fn vendor_variable_names_are_accepted() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("VAPI_API_KEY", "vapi-key");
        env::set_var("VAPI_ASSISTANT_ID", "asst-1");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            ensure(config.voice.is_configured(), "voice key alias should configure voice")?;
            ensure(
                config.voice.assistant_id.as_deref() == Some("asst-1"),
                "assistant id alias should be read",
            )
        })();

        clear_vars(&["VAPI_API_KEY", "VAPI_ASSISTANT_ID"]);
        result
    }

    #[test]
    fn precedence_defaults_file_env_overrides() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FRONTDESK_STORE_DATA_FILE", "from-env.json");
        env::set_var("FRONTDESK_SERVER_PORT", "7001");

        let result = (|| -> Result<(), String> {
            let dir = TempDir::new().map_err(|err: io::Error| err.to_string())?;
            let path = dir.path().join("frontdesk.toml");
            fs::write(
                &path,
                r#"
[store]
data_file = "from-file.json"
session_ttl_secs = 90

[server]
port = 7000

[logging]
level = "warn"
"#,
            )
            .map_err(|err| err.to_string())?;

            let config = AppConfig::load(LoadOptions {
                config_path: Some(path),
                overrides: ConfigOverrides {
                    data_file: Some(PathBuf::from("from-override.json")),
                    log_level: Some("debug".to_string()),
                    ..ConfigOverrides::default()
                },
                ..LoadOptions::default()
            })
            .map_err(|err| format!("config load failed: {err}"))?;

            ensure(
                config.store.data_file == PathBuf::from("from-override.json"),
                "override data file should win",
            )?;
            ensure(config.logging.level == "debug", "overridden log level should be debug")?;
            ensure(config.server.port == 7001, "env port should win over file and defaults")?;
            ensure(config.store.session_ttl_secs == 90, "file ttl should win over default")?;
            Ok(())
        })();

        clear_vars(&["FRONTDESK_STORE_DATA_FILE", "FRONTDESK_SERVER_PORT"]);
        result
    }

    #[test]
    fn validation_rejects_half_configured_inventory() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        let error = match AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                inventory_api_key: Some("only-the-key".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        }) {
            Ok(_) => {
                return Err("expected validation failure but config load succeeded".to_string())
            }
            Err(error) => error,
        };
        let has_message = matches!(
            error,
            ConfigError::Validation(ref message) if message.contains("inventory.api_key")
        );
        ensure(has_message, "validation failure should mention inventory.api_key")
    }

    #[test]
    fn invalid_numeric_env_override_is_reported() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FRONTDESK_STORE_SESSION_TTL_SECS", "half-an-hour");
        let result = match AppConfig::load(LoadOptions::default()) {
            Ok(_) => Err("expected env override failure".to_string()),
            Err(ConfigError::InvalidEnvOverride { key, .. }) => {
                ensure(key == "FRONTDESK_STORE_SESSION_TTL_SECS", "error should name the key")
            }
            Err(other) => Err(format!("unexpected error: {other}")),
        };

        clear_vars(&["FRONTDESK_STORE_SESSION_TTL_SECS"]);
        result
    }

    #[test]
    fn secret_values_are_not_leaked_by_debug() -> Result<(), String> {
        let _guard = env_lock().lock().map_err(|_| "env lock is poisoned".to_string())?;

        env::set_var("FRONTDESK_VOICE_API_KEY", "voice-secret-value");
        env::set_var("FRONTDESK_LLM_API_KEY", "llm-secret-value");

        let result = (|| -> Result<(), String> {
            let config = AppConfig::load(LoadOptions::default())
                .map_err(|err| format!("config load failed: {err}"))?;
            let debug = format!("{config:?}");

            ensure(
                !debug.contains("voice-secret-value"),
                "debug output should not contain voice key",
            )?;
            ensure(!debug.contains("llm-secret-value"), "debug output should not contain llm key")?;
            ensure(
                matches!(config.logging.format, LogFormat::Compact),
                "default logging format should be compact",
            )?;
            Ok(())
        })();

        clear_vars(&["FRONTDESK_VOICE_API_KEY", "FRONTDESK_LLM_API_KEY"]);
        result
    }
}
