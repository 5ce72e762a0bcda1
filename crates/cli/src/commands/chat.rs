use std::io::{self, BufRead, Write};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use frontdesk_agent::{AgentRuntime, FrontDesk};
use frontdesk_core::config::{AppConfig, LoadOptions};
use frontdesk_core::errors::ApplicationError;
use frontdesk_core::inventory::{InventoryError, InventoryProvider, UnconfiguredInventory};
use frontdesk_db::{DemoDataset, InMemorySessionStore, JsonHotelStore};
use frontdesk_inventory::InventoryClient;

use crate::commands::{block_on, CommandResult};

const EXIT_WORDS: [&str; 3] = ["exit", "quit", "bye"];

pub fn run(session: &str, message: Option<&str>) -> CommandResult {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => {
            return CommandResult::failure(
                "chat",
                "config_validation",
                format!("configuration issue: {error}"),
                2,
            );
        }
    };

    chat_with(&config, session, message)
}

pub fn chat_with(config: &AppConfig, session: &str, message: Option<&str>) -> CommandResult {
    let outcome = block_on(async {
        let runtime = build_runtime(config).await?;
        let reply = match message {
            Some(message) => {
                runtime.handle_message(session, message, false).await.map(|reply| reply.message)
            }
            None => interactive(&runtime, session).await,
        };
        reply.map_err(anyhow::Error::from)
    });

    match outcome {
        Ok(Ok(reply)) => CommandResult::success("chat", reply),
        Ok(Err(error)) => CommandResult::failure("chat", "agent", error.to_string(), 4),
        Err(error) => CommandResult::failure(
            "chat",
            "runtime_init",
            format!("failed to initialize async runtime: {error}"),
            3,
        ),
    }
}

/// Same wiring as the server, without the language model.
pub async fn build_runtime(config: &AppConfig) -> Result<AgentRuntime> {
    let store = JsonHotelStore::open_or_seed(config.store.data_file.clone(), DemoDataset::load)
        .await
        .map(Arc::new)?;
    let inventory: Arc<dyn InventoryProvider> =
        match InventoryClient::from_config(&config.inventory, &config.hotel.name) {
            Ok(client) => Arc::new(client),
            Err(InventoryError::NotConfigured) => Arc::new(UnconfiguredInventory),
            Err(error) => return Err(error.into()),
        };
    let sessions =
        Arc::new(InMemorySessionStore::new(Duration::from_secs(config.store.session_ttl_secs)));

    Ok(AgentRuntime::new(FrontDesk::new(store, inventory), sessions, config.hotel.clone()))
}

async fn interactive(runtime: &AgentRuntime, session: &str) -> Result<String, ApplicationError> {
    println!("{}", runtime.greeting());
    let stdin = io::stdin();
    let mut turns = 0usize;

    for line in stdin.lock().lines() {
        let Ok(line) = line else { break };
        let text = line.trim();
        if EXIT_WORDS.contains(&text.to_ascii_lowercase().as_str()) {
            break;
        }
        if text.is_empty() {
            continue;
        }
        let reply = runtime.handle_message(session, text, false).await?;
        turns += 1;
        println!("\n{}\n", reply.message);
        let _ = io::stdout().flush();
    }

    Ok(format!("chat session `{session}` ended after {turns} message(s)"))
}
