use std::sync::Arc;

use chrono::{Days, NaiveDate};
use thiserror::Error;
use tracing::debug;

use frontdesk_core::audit::{AuditContext, AuditSink, TracingAuditSink};
use frontdesk_core::config::HotelConfig;
use frontdesk_core::domain::booking::{BookingChannel, GuestDetails, StayDetails};
use frontdesk_core::domain::session::ConversationSession;
use frontdesk_core::errors::{ApplicationError, DomainError};
use frontdesk_core::flows::{
    BookingDialogue, DialogueContext, DialogueEvent, DialogueStep, FlowEngine, FlowTransitionError,
};
use frontdesk_core::parsing::{MessageParser, ParsedMessage, RuleBasedParser};
use frontdesk_db::repositories::RepositoryError;

use crate::handlers::FrontDesk;
use crate::replies;

#[derive(Debug, Error)]
pub enum DialogueError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Flow(#[from] FlowTransitionError),
}

impl From<DialogueError> for ApplicationError {
    fn from(error: DialogueError) -> Self {
        match error {
            DialogueError::Repository(error) => error.into(),
            DialogueError::Flow(error) => {
                ApplicationError::Domain(DomainError::FlowTransition(error))
            }
        }
    }
}

/// Runs one turn of the booking dialogue against a session. Every step change goes
/// through the flow engine, so the session step only ever moves along the transition
/// table.
pub struct DialogueDriver {
    engine: FlowEngine<BookingDialogue>,
    parser: Arc<dyn MessageParser>,
    audit: Arc<dyn AuditSink>,
    desk: FrontDesk,
    hotel: HotelConfig,
}

impl DialogueDriver {
    pub fn new(desk: FrontDesk, hotel: HotelConfig) -> Self {
        Self {
            engine: FlowEngine::default(),
            parser: Arc::new(RuleBasedParser),
            audit: Arc::new(TracingAuditSink),
            desk,
            hotel,
        }
    }

    pub fn with_parser(mut self, parser: Arc<dyn MessageParser>) -> Self {
        self.parser = parser;
        self
    }

    pub fn with_audit_sink(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    pub fn parser(&self) -> &dyn MessageParser {
        self.parser.as_ref()
    }

    /// Opens the availability check or the booking dialogue from `Idle`.
    pub fn begin(
        &self,
        session: &mut ConversationSession,
        event: DialogueEvent,
    ) -> Result<String, DialogueError> {
        self.transition(session, event)?;
        session.scratch = Default::default();
        Ok(match event {
            DialogueEvent::AvailabilityRequested => replies::availability_prompt(),
            _ => replies::booking_prompt(),
        })
    }

    /// Consumes a message for a session that is mid-flow.
    pub async fn continue_flow(
        &self,
        session: &mut ConversationSession,
        parsed: &ParsedMessage,
        text: &str,
        today: NaiveDate,
    ) -> Result<String, DialogueError> {
        match session.step {
            DialogueStep::AwaitingAvailabilityDates => {
                self.availability_dates(session, parsed, today).await
            }
            DialogueStep::AwaitingGuestsDates | DialogueStep::Idle => {
                self.stay_details(session, parsed, today).await
            }
            DialogueStep::AwaitingRoomSelection => {
                self.room_selection(session, parsed, today).await
            }
            DialogueStep::AwaitingContactDetails => {
                self.contact_details(session, text, today).await
            }
        }
    }

    async fn availability_dates(
        &self,
        session: &mut ConversationSession,
        parsed: &ParsedMessage,
        today: NaiveDate,
    ) -> Result<String, DialogueError> {
        let complete =
            parsed.dates.len() >= 2 || (parsed.dates.len() == 1 && parsed.nights.is_some());
        if !complete {
            self.transition(session, DialogueEvent::StayDetailsIncomplete)?;
            return Ok(replies::dates_reprompt());
        }

        let (check_in, nights) = stay_window(parsed, today);
        let Some(StayDetails { check_out, .. }) = StayDetails::new(check_in, nights, 1) else {
            self.transition(session, DialogueEvent::StayDetailsIncomplete)?;
            return Ok(replies::dates_reprompt());
        };
        let rooms = self.desk.check_availability(check_in, check_out, None).await?;
        if rooms.is_empty() {
            self.transition(session, DialogueEvent::NoRoomsFound)?;
            return Ok(replies::no_rooms_for_dates());
        }

        self.transition(session, DialogueEvent::StayDetailsProvided)?;
        session.scratch = Default::default();
        let first = parsed.dates.first().map(|token| token.raw.clone()).unwrap_or_default();
        let last = match parsed.dates.get(1) {
            Some(token) => token.raw.clone(),
            None => check_out.format("%b %-d").to_string(),
        };
        Ok(replies::availability_list(&rooms, &first, &last, nights, &self.hotel))
    }

    /// Guest count plus dates, from the booking step or straight from the widget.
    pub async fn stay_details(
        &self,
        session: &mut ConversationSession,
        parsed: &ParsedMessage,
        today: NaiveDate,
    ) -> Result<String, DialogueError> {
        let Some(guests) = parsed.guest_count() else {
            self.transition(session, DialogueEvent::StayDetailsIncomplete)?;
            return Ok(replies::guests_reprompt());
        };

        let (check_in, nights) = stay_window(parsed, today);
        self.offer_rooms(session, guests, check_in, nights, DialogueEvent::StayDetailsProvided)
            .await
    }

    async fn room_selection(
        &self,
        session: &mut ConversationSession,
        parsed: &ParsedMessage,
        today: NaiveDate,
    ) -> Result<String, DialogueError> {
        if parsed.is_stay_correction() {
            let guests = parsed.guests.or(session.scratch.guests).unwrap_or(1);
            let nights = parsed.nights.or(session.scratch.nights).unwrap_or(1);
            let check_in = session.scratch.check_in.unwrap_or_else(|| tomorrow(today));
            return self
                .offer_rooms(session, guests, check_in, nights, DialogueEvent::StayCorrected)
                .await;
        }

        let Some(keyword) = parsed.room_keyword.as_deref() else {
            self.transition(session, DialogueEvent::RoomSelectionUnmatched)?;
            return Ok(replies::room_selection_reprompt());
        };

        let chosen =
            session.scratch.candidates.iter().find(|room| room.matches_type(keyword)).cloned();
        let Some(room) = chosen else {
            self.transition(session, DialogueEvent::RoomSelectionUnmatched)?;
            return Ok(replies::room_no_longer_available());
        };

        self.transition(session, DialogueEvent::RoomSelected)?;
        let nights = session.scratch.nights.unwrap_or(1);
        let reply = replies::room_selected(&room, nights, &self.hotel);
        session.scratch.selected = Some(room);
        Ok(reply)
    }

    async fn contact_details(
        &self,
        session: &mut ConversationSession,
        text: &str,
        today: NaiveDate,
    ) -> Result<String, DialogueError> {
        let contact = self.parser.parse_contact(text);
        let (Some(name), Some(phone)) = (contact.name.clone(), contact.phone.clone()) else {
            self.transition(session, DialogueEvent::ContactDetailsIncomplete)?;
            return Ok(replies::contact_reprompt());
        };

        let Some(room) = session.scratch.selected.clone() else {
            self.transition(session, DialogueEvent::RoomSelectionUnmatched)?;
            return Ok(replies::room_selection_reprompt());
        };

        let scratch = &session.scratch;
        let stay = StayDetails::new(
            scratch.check_in.unwrap_or_else(|| tomorrow(today)),
            scratch.nights.unwrap_or(1),
            scratch.guests.unwrap_or(1),
        );
        let Some(stay) = stay else {
            self.transition(session, DialogueEvent::RoomSelectionUnmatched)?;
            return Ok(replies::dates_reprompt());
        };
        let guest = GuestDetails {
            name,
            phone: Some(phone),
            email: contact.email,
            payment_method: contact.payment.as_ref().map(|card| card.masked()),
            special_requests: contact.special_requests,
        };

        match self.desk.create_booking(&room, guest, stay, BookingChannel::WebChat).await {
            Ok(booking) => {
                self.transition(session, DialogueEvent::ContactDetailsProvided)?;
                session.reset();
                Ok(replies::booking_confirmation(&booking, &self.hotel))
            }
            Err(RepositoryError::Domain(DomainError::RoomUnavailable { room_id })) => {
                debug!(
                    event_name = "agent.room_taken",
                    room_id = %room_id,
                    "selected room was booked meanwhile"
                );
                self.transition(session, DialogueEvent::RoomSelectionUnmatched)?;
                session.scratch.selected = None;
                session.scratch.candidates.retain(|candidate| candidate.id != room_id);
                Ok(replies::room_no_longer_available())
            }
            Err(error) => Err(error.into()),
        }
    }

    async fn offer_rooms(
        &self,
        session: &mut ConversationSession,
        guests: u32,
        check_in: NaiveDate,
        nights: u32,
        event: DialogueEvent,
    ) -> Result<String, DialogueError> {
        let stay = StayDetails::new(check_in, nights, guests);
        let Some(StayDetails { check_out, .. }) = stay else {
            self.transition(session, DialogueEvent::StayDetailsIncomplete)?;
            return Ok(replies::dates_reprompt());
        };
        let rooms = self.desk.check_availability(check_in, check_out, Some(guests)).await?;
        if rooms.is_empty() {
            self.transition(session, DialogueEvent::NoRoomsFound)?;
            return Ok(replies::no_rooms_for_guests(guests));
        }

        self.transition(session, event)?;
        let scratch = &mut session.scratch;
        scratch.guests = Some(guests);
        scratch.nights = Some(nights);
        scratch.check_in = Some(check_in);
        scratch.check_out = Some(check_out);
        scratch.selected = None;
        let updated = event == DialogueEvent::StayCorrected;
        let reply = replies::stay_options(&rooms, guests, nights, updated, &self.hotel);
        scratch.candidates = rooms;
        Ok(reply)
    }

    fn transition(
        &self,
        session: &mut ConversationSession,
        event: DialogueEvent,
    ) -> Result<(), FlowTransitionError> {
        let context = DialogueContext::default();
        let audit = AuditContext::for_session(session.id.clone(), "agent");
        let outcome = self.engine.apply_with_audit(
            &session.step,
            &event,
            &context,
            self.audit.as_ref(),
            &audit,
        )?;
        session.step = outcome.to;
        Ok(())
    }
}

/// Check-in from the first date (tomorrow when there is none) and the night count:
/// explicit, else the span to the second date, else one.
fn stay_window(parsed: &ParsedMessage, today: NaiveDate) -> (NaiveDate, u32) {
    let check_in = parsed
        .dates
        .first()
        .and_then(|token| token.month_day.resolve(today))
        .unwrap_or_else(|| tomorrow(today));

    let span = parsed
        .dates
        .get(1)
        .and_then(|token| token.month_day.resolve(check_in))
        .map(|check_out| (check_out - check_in).num_days())
        .and_then(|days| u32::try_from(days).ok())
        .filter(|days| *days > 0);

    (check_in, parsed.nights.or(span).unwrap_or(1).max(1))
}

fn tomorrow(today: NaiveDate) -> NaiveDate {
    today + Days::new(1)
}
