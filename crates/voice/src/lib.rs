//! Phone-call plumbing for the front desk.
//!
//! - `assistant`: the voice assistant's prompt, callable functions and call payloads
//! - `client`: REST client for the voice platform (assistants, calls)
//! - `webhook`: decoding of the platform's webhook envelopes

pub mod assistant;
pub mod client;
pub mod webhook;

pub use assistant::{AssistantProfile, CallPurpose};
pub use client::{OutboundCall, VoiceClient, VoiceError};
pub use webhook::{parse_webhook, WebhookEvent};
