use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info};

use frontdesk_core::audit::AuditSink;
use frontdesk_core::config::HotelConfig;
use frontdesk_core::domain::booking::BookingId;
use frontdesk_core::domain::room::Room;
use frontdesk_core::domain::session::ConversationSession;
use frontdesk_core::errors::ApplicationError;
use frontdesk_core::flows::DialogueEvent;
use frontdesk_core::parsing::MenuOption;
use frontdesk_db::repositories::SessionRepository;

use crate::conversation::{ClassifiedIntent, Intent, IntentClassifier};
use crate::dialogue::DialogueDriver;
use crate::handlers::FrontDesk;
use crate::llm::{LlmClient, LlmIntentClassifier};
use crate::replies;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatReply {
    pub session_id: String,
    pub message: String,
}

/// Entry point for chat traffic. Loads the session, lets the dialogue consume the message
/// when a flow is in progress and otherwise routes it by menu option or intent.
pub struct AgentRuntime {
    desk: FrontDesk,
    dialogue: DialogueDriver,
    classifier: IntentClassifier,
    llm: Option<LlmIntentClassifier>,
    sessions: Arc<dyn SessionRepository>,
    hotel: HotelConfig,
    session_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl AgentRuntime {
    pub fn new(desk: FrontDesk, sessions: Arc<dyn SessionRepository>, hotel: HotelConfig) -> Self {
        Self {
            dialogue: DialogueDriver::new(desk.clone(), hotel.clone()),
            desk,
            classifier: IntentClassifier::new(),
            llm: None,
            sessions,
            hotel,
            session_locks: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_llm(mut self, client: Arc<dyn LlmClient>) -> Self {
        self.llm = Some(LlmIntentClassifier::new(client));
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.dialogue = self.dialogue.with_audit_sink(audit);
        self
    }

    pub fn desk(&self) -> &FrontDesk {
        &self.desk
    }

    pub fn hotel(&self) -> &HotelConfig {
        &self.hotel
    }

    pub fn llm_configured(&self) -> bool {
        self.llm.is_some()
    }

    pub fn greeting(&self) -> String {
        replies::greeting_menu(&self.hotel)
    }

    pub async fn handle_message(
        &self,
        session_id: &str,
        text: &str,
        use_llm: bool,
    ) -> Result<ChatReply, ApplicationError> {
        self.handle_message_at(session_id, text, use_llm, Utc::now()).await
    }

    pub async fn handle_message_at(
        &self,
        session_id: &str,
        text: &str,
        use_llm: bool,
        now: DateTime<Utc>,
    ) -> Result<ChatReply, ApplicationError> {
        let lock = self.session_lock(session_id).await;
        let _turn = lock.lock().await;

        let mut session = match self.sessions.find(session_id).await? {
            Some(session) => session,
            None => {
                debug!(event_name = "agent.session_started", session_id, "new chat session");
                ConversationSession::new(session_id, now)
            }
        };
        session.touch(now);

        let message = self.respond(&mut session, text.trim(), use_llm, now.date_naive()).await?;
        info!(
            event_name = "agent.message_handled",
            session_id,
            step = ?session.step,
            reply_len = message.len(),
            "chat message handled"
        );
        self.sessions.save(session).await?;

        Ok(ChatReply { session_id: session_id.to_owned(), message })
    }

    /// Drops idle sessions and the locks nobody is waiting on.
    pub async fn sweep_expired(&self) -> Result<usize, ApplicationError> {
        let removed = self.sessions.sweep_expired().await?;
        self.session_locks.lock().await.retain(|_, lock| Arc::strong_count(lock) > 1);
        if removed > 0 {
            debug!(event_name = "agent.sessions_swept", removed, "expired chat sessions removed");
        }
        Ok(removed)
    }

    async fn session_lock(&self, session_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.session_locks.lock().await;
        locks.entry(session_id.to_owned()).or_default().clone()
    }

    async fn respond(
        &self,
        session: &mut ConversationSession,
        text: &str,
        use_llm: bool,
        today: NaiveDate,
    ) -> Result<String, ApplicationError> {
        let parsed = self.dialogue.parser().parse(text);
        if session.step.is_mid_flow() {
            return Ok(self.dialogue.continue_flow(session, &parsed, text, today).await?);
        }

        match parsed.menu_option {
            Some(MenuOption::CheckAvailability) => {
                return Ok(self.dialogue.begin(session, DialogueEvent::AvailabilityRequested)?);
            }
            Some(MenuOption::BookReservation) => {
                return Ok(self.dialogue.begin(session, DialogueEvent::BookingRequested)?);
            }
            Some(MenuOption::CancelReservation) => return self.cancellation(None).await,
            Some(MenuOption::Amenities) => {
                return Ok(replies::amenities(&self.desk.snapshot().await?, None));
            }
            Some(MenuOption::Policies) => {
                return Ok(replies::policies(&self.desk.snapshot().await?, None));
            }
            None => {}
        }

        if parsed.has_stay_details() {
            return Ok(self.dialogue.stay_details(session, &parsed, today).await?);
        }

        let classified = match &self.llm {
            Some(llm) if use_llm => llm.classify(text).await,
            _ => self.classifier.classify(text),
        };
        self.route(session, classified, text).await
    }

    async fn route(
        &self,
        session: &mut ConversationSession,
        classified: ClassifiedIntent,
        text: &str,
    ) -> Result<String, ApplicationError> {
        let entities = classified.entities;
        debug!(
            event_name = "agent.intent_classified",
            intent = classified.intent.as_str(),
            "message routed by intent"
        );

        let reply = match classified.intent {
            Intent::Greeting => replies::greeting_reply(&self.hotel),
            Intent::CheckAvailability => {
                let free = self.desk.hotel().available_rooms().await?;
                let rooms: Vec<Room> = match entities.room_type.as_deref() {
                    Some(room_type) => {
                        free.into_iter().filter(|room| room.matches_type(room_type)).collect()
                    }
                    None => free,
                };
                replies::static_availability(&rooms)
            }
            Intent::BookRoom => self.dialogue.begin(session, DialogueEvent::BookingRequested)?,
            Intent::CancelBooking => return self.cancellation(entities.booking_id.as_deref()).await,
            Intent::Amenities => {
                replies::amenities(&self.desk.snapshot().await?, entities.amenity.as_deref())
            }
            Intent::Policies => {
                replies::policies(&self.desk.snapshot().await?, entities.policy.as_deref())
            }
            Intent::Faq => replies::faq_answer(&self.desk.snapshot().await?, text)
                .unwrap_or_else(|| replies::general_inquiry(&self.hotel, text)),
            Intent::General => replies::general_inquiry(&self.hotel, text),
        };
        Ok(reply)
    }

    /// Lists bookings when no id was given.
    async fn cancellation(&self, booking_id: Option<&str>) -> Result<String, ApplicationError> {
        let Some(raw) = booking_id else {
            return Ok(replies::booking_list(&self.desk.hotel().bookings().await?));
        };

        let id = BookingId::normalized(raw);
        Ok(match self.desk.cancel_booking(&id).await? {
            Some(booking) => replies::booking_cancelled(&booking),
            None => replies::booking_not_found(&id.to_string()),
        })
    }
}
