use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Map, Value};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};

use frontdesk_core::config::VoiceConfig;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum VoiceError {
    #[error("voice platform not configured: {0}")]
    NotConfigured(&'static str),
    #[error("voice platform request failed: {0}")]
    Http(String),
    #[error("voice platform returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("voice platform response could not be decoded: {0}")]
    Decode(String),
}

/// Parameters for a call placed to a guest.
#[derive(Clone, Debug, Default)]
pub struct OutboundCall {
    pub to_number: String,
    pub guest_name: Option<String>,
    pub purpose: String,
    pub first_message: String,
    pub metadata: Map<String, Value>,
}

pub struct VoiceClient {
    http: reqwest::Client,
    base_url: String,
    api_key: SecretString,
    public_key: Option<String>,
    assistant_id: RwLock<Option<String>>,
    phone_number_id: Option<String>,
    timeout: Duration,
}

impl std::fmt::Debug for VoiceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VoiceClient")
            .field("base_url", &self.base_url)
            .field("phone_number_id", &self.phone_number_id)
            .finish_non_exhaustive()
    }
}

impl VoiceClient {
    pub fn from_config(config: &VoiceConfig) -> Result<Self, VoiceError> {
        let Some(api_key) = config.api_key.clone().filter(|_| config.is_configured()) else {
            return Err(VoiceError::NotConfigured("set the voice API key"));
        };
        let http = reqwest::Client::builder()
            .build()
            .map_err(|error| VoiceError::Http(format!("failed to build HTTP client: {error}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_owned(),
            api_key,
            public_key: config.public_key.clone(),
            assistant_id: RwLock::new(config.assistant_id.clone()),
            phone_number_id: config.phone_number_id.clone(),
            timeout: Duration::from_secs(config.timeout_secs),
        })
    }

    /// Key handed to the browser SDK; the API key stands in when no public key is set.
    pub fn public_key(&self) -> String {
        self.public_key.clone().unwrap_or_else(|| self.api_key.expose_secret().to_owned())
    }

    pub async fn assistant_id(&self) -> Option<String> {
        self.assistant_id.read().await.clone()
    }

    /// Creates an assistant and remembers its id for later calls.
    pub async fn create_assistant(&self, definition: &Value) -> Result<String, VoiceError> {
        let response = self.post("/assistant", definition).await?;
        let assistant_id = id_or_body(&response);
        *self.assistant_id.write().await = Some(assistant_id.clone());
        info!(
            event_name = "voice.assistant_created",
            assistant_id = %assistant_id,
            "voice assistant created"
        );
        Ok(assistant_id)
    }

    pub async fn start_inbound_call(
        &self,
        phone_number: &str,
        metadata: Map<String, Value>,
    ) -> Result<String, VoiceError> {
        let Some(assistant_id) = self.assistant_id().await else {
            return Err(VoiceError::NotConfigured("need API key and assistant ID"));
        };

        let mut variables = Map::new();
        variables.insert("caller_number".to_owned(), Value::String(phone_number.to_owned()));
        variables.extend(metadata);

        let mut body = json!({
            "assistantId": assistant_id,
            "customer": {"number": phone_number},
            "assistantOverrides": {"variableValues": variables},
        });
        if let (Some(phone_number_id), Some(object)) =
            (&self.phone_number_id, body.as_object_mut())
        {
            object.insert("phoneNumberId".to_owned(), Value::String(phone_number_id.clone()));
        }

        let response = self.post("/call", &body).await?;
        Ok(id_or_body(&response))
    }

    pub async fn start_outbound_call(&self, call: OutboundCall) -> Result<String, VoiceError> {
        let (Some(assistant_id), Some(phone_number_id)) =
            (self.assistant_id().await, self.phone_number_id.clone())
        else {
            return Err(VoiceError::NotConfigured(
                "outbound calls need API key, assistant ID, and phone number ID",
            ));
        };

        let mut variables = Map::new();
        variables.insert(
            "guest_name".to_owned(),
            Value::String(call.guest_name.clone().unwrap_or_else(|| "valued guest".to_owned())),
        );
        variables.insert("purpose".to_owned(), Value::String(call.purpose.clone()));
        variables.extend(call.metadata);

        let body = json!({
            "assistantId": assistant_id,
            "phoneNumberId": phone_number_id,
            "customer": {"number": call.to_number},
            "assistantOverrides": {
                "firstMessage": call.first_message,
                "variableValues": variables,
            },
        });

        let response = self.post("/call", &body).await?;
        Ok(id_or_body(&response))
    }

    pub async fn call_status(&self, call_id: &str) -> Result<Value, VoiceError> {
        let response = self
            .http
            .get(format!("{}/call/{call_id}", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| VoiceError::Http(error.to_string()))?;
        decode(response).await
    }

    /// `Ok(false)` when the platform refused to end the call.
    pub async fn end_call(&self, call_id: &str) -> Result<bool, VoiceError> {
        let response = self
            .http
            .post(format!("{}/call/{call_id}/end", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| VoiceError::Http(error.to_string()))?;

        let ended = response.status().is_success();
        if !ended {
            warn!(
                event_name = "voice.end_call_refused",
                call_id,
                status = response.status().as_u16(),
                "call not ended"
            );
        }
        Ok(ended)
    }

    async fn post(&self, path: &str, body: &Value) -> Result<Value, VoiceError> {
        let response = self
            .http
            .post(format!("{}{path}", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(body)
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|error| VoiceError::Http(error.to_string()))?;
        decode(response).await
    }
}

async fn decode(response: reqwest::Response) -> Result<Value, VoiceError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(VoiceError::Status { status: status.as_u16(), body });
    }
    response.json().await.map_err(|error| VoiceError::Decode(error.to_string()))
}

fn id_or_body(response: &Value) -> String {
    response
        .get("id")
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| response.to_string())
}
