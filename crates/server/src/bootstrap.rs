use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use thiserror::Error;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use frontdesk_agent::{AgentRuntime, FrontDesk, LlmClient, ToolRegistry};
use frontdesk_core::audit::TracingAuditSink;
use frontdesk_core::config::AppConfig;
use frontdesk_core::inventory::{InventoryError, InventoryProvider, UnconfiguredInventory};
use frontdesk_db::repositories::{
    CallSessionRepository, HotelRepository, InMemoryCallSessionStore, InMemorySessionStore,
    SessionRepository,
};
use frontdesk_db::{DemoDataset, JsonHotelStore, StoreError};
use frontdesk_inventory::InventoryClient;
use frontdesk_voice::{AssistantProfile, VoiceClient, VoiceError};

use crate::llm::OpenAiClient;

/// Shared handles every route works through.
#[derive(Clone)]
pub struct AppState {
    pub runtime: Arc<AgentRuntime>,
    pub tools: Arc<ToolRegistry>,
    pub hotel: Arc<dyn HotelRepository>,
    pub calls: Arc<dyn CallSessionRepository>,
    pub inventory: Option<Arc<InventoryClient>>,
    pub voice: Option<Arc<VoiceClient>>,
    pub assistant: AssistantProfile,
    pub config: Arc<AppConfig>,
}

pub struct Application {
    pub config: AppConfig,
    pub state: AppState,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error("hotel store could not be opened: {0}")]
    Store(#[from] StoreError),
    #[error("inventory client could not be built: {0}")]
    Inventory(#[source] InventoryError),
    #[error("voice client could not be built: {0}")]
    Voice(#[source] VoiceError),
    #[error("llm client could not be built: {0}")]
    Llm(#[source] reqwest::Error),
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        data_file = %config.store.data_file.display(),
        "starting application bootstrap"
    );

    let store = Arc::new(
        JsonHotelStore::open_or_seed(config.store.data_file.clone(), DemoDataset::load).await?,
    );
    info!(
        event_name = "system.bootstrap.store_opened",
        data_file = %config.store.data_file.display(),
        "hotel store opened"
    );

    let inventory_client = match InventoryClient::from_config(&config.inventory, &config.hotel.name)
    {
        Ok(client) => Some(Arc::new(client)),
        Err(InventoryError::NotConfigured) => {
            warn!(
                event_name = "system.bootstrap.inventory_unconfigured",
                "inventory credentials missing, availability uses static rooms"
            );
            None
        }
        Err(error) => return Err(BootstrapError::Inventory(error)),
    };

    let voice = match VoiceClient::from_config(&config.voice) {
        Ok(client) => Some(Arc::new(client)),
        Err(VoiceError::NotConfigured(_)) => {
            warn!(
                event_name = "system.bootstrap.voice_unconfigured",
                "voice API key missing, phone endpoints are disabled"
            );
            None
        }
        Err(error) => return Err(BootstrapError::Voice(error)),
    };

    let llm = OpenAiClient::from_config(&config.llm).map_err(BootstrapError::Llm)?;
    let sessions =
        Arc::new(InMemorySessionStore::new(Duration::from_secs(config.store.session_ttl_secs)));

    let state = assemble_state(config.clone(), store, inventory_client, voice, llm, sessions);
    info!(
        event_name = "system.bootstrap.ready",
        inventory_configured = state.inventory.is_some(),
        voice_configured = state.voice.is_some(),
        llm_configured = state.runtime.llm_configured(),
        "application bootstrap complete"
    );

    Ok(Application { config, state })
}

/// Wires the agent runtime and tool registry over already-built clients and stores.
pub fn assemble_state(
    config: AppConfig,
    store: Arc<JsonHotelStore>,
    inventory: Option<Arc<InventoryClient>>,
    voice: Option<Arc<VoiceClient>>,
    llm: Option<OpenAiClient>,
    sessions: Arc<dyn SessionRepository>,
) -> AppState {
    let provider: Arc<dyn InventoryProvider> = match &inventory {
        Some(client) => client.clone(),
        None => Arc::new(UnconfiguredInventory),
    };
    let desk = FrontDesk::new(store.clone(), provider);

    let mut runtime = AgentRuntime::new(desk.clone(), sessions, config.hotel.clone())
        .with_audit_sink(Arc::new(TracingAuditSink));
    if let Some(client) = llm {
        let client: Arc<dyn LlmClient> = Arc::new(client);
        runtime = runtime.with_llm(client);
    }

    AppState {
        runtime: Arc::new(runtime),
        tools: Arc::new(ToolRegistry::for_front_desk(desk)),
        hotel: store,
        calls: Arc::new(InMemoryCallSessionStore::default()),
        inventory,
        voice,
        assistant: AssistantProfile::from(&config.hotel),
        config: Arc::new(config),
    }
}

pub fn router(state: AppState) -> Router {
    let api = Router::new()
        .merge(crate::health::router())
        .merge(crate::chat::router())
        .merge(crate::inventory::router())
        .merge(crate::voice::router());

    let static_dir = state.config.server.static_dir.clone();
    let mut app = api.with_state(state);
    if let Some(dir) = static_dir.filter(|dir| dir.is_dir()) {
        app = app.fallback_service(ServeDir::new(dir));
    }
    app.layer(TraceLayer::new_for_http())
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use frontdesk_core::config::AppConfig;
    use frontdesk_db::{DemoDataset, InMemorySessionStore, JsonHotelStore};
    use frontdesk_voice::VoiceClient;

    use super::{assemble_state, AppState};

    pub fn demo_state() -> AppState {
        state_with_voice(AppConfig::default(), None)
    }

    pub fn state_with_voice(config: AppConfig, voice: Option<VoiceClient>) -> AppState {
        let store =
            Arc::new(JsonHotelStore::in_memory(DemoDataset::load().expect("demo dataset parses")));
        let sessions = Arc::new(InMemorySessionStore::new(Duration::from_secs(1800)));
        assemble_state(config, store, None, voice.map(Arc::new), None, sessions)
    }
}
