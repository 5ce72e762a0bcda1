//! Front desk agent runtime
//!
//! This crate is the conversational half of the front desk:
//! - Classifies free text into a hotel intent (`conversation`), optionally through an LLM
//!   (`llm`) with the rule-based classifier as fallback
//! - Drives the multi-turn booking dialogue (`dialogue`) on top of the core state machine
//! - Resolves availability and creates or cancels bookings (`handlers`)
//! - Serves the phone assistant's function calls (`tools`)
//!
//! # Architecture
//!
//! 1. **Session lookup** (`runtime`) - load or create the chat session, serialize turns
//! 2. **Dialogue** (`dialogue`) - a session mid-flow consumes the message
//! 3. **Intent routing** (`conversation`) - otherwise the classifier picks a handler
//! 4. **Replies** (`replies`) - render guest-facing text
//!
//! Prices, room picks and booking ids are always decided by the handlers and the store,
//! never by the language model.

pub mod conversation;
pub mod dialogue;
pub mod handlers;
pub mod llm;
pub mod replies;
pub mod runtime;
pub mod tools;

pub use conversation::{ClassifiedIntent, Entities, Intent, IntentClassifier};
pub use handlers::{FrontDesk, DISPLAY_LIMIT};
pub use llm::{LlmClient, LlmIntentClassifier};
pub use runtime::{AgentRuntime, ChatReply};
pub use tools::{Tool, ToolRegistry};
