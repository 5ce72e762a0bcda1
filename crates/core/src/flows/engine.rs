use thiserror::Error;

use crate::audit::{AuditCategory, AuditContext, AuditEvent, AuditOutcome, AuditSink};
use crate::flows::states::{
    DialogueAction, DialogueContext, DialogueEvent, DialogueStep, TransitionOutcome,
};

pub trait FlowDefinition {
    fn initial_step(&self) -> DialogueStep;
    fn transition(
        &self,
        current: &DialogueStep,
        event: &DialogueEvent,
        context: &DialogueContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>;
}

/// The front-desk booking and availability dialogue.
#[derive(Clone, Debug, Default)]
pub struct BookingDialogue;

impl FlowDefinition for BookingDialogue {
    fn initial_step(&self) -> DialogueStep {
        DialogueStep::Idle
    }

    fn transition(
        &self,
        current: &DialogueStep,
        event: &DialogueEvent,
        context: &DialogueContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        transition_booking_dialogue(current, event, context)
    }
}

pub struct FlowEngine<F> {
    flow: F,
}

impl<F> FlowEngine<F>
where
    F: FlowDefinition,
{
    pub fn new(flow: F) -> Self {
        Self { flow }
    }

    pub fn initial_step(&self) -> DialogueStep {
        self.flow.initial_step()
    }

    pub fn apply(
        &self,
        current: &DialogueStep,
        event: &DialogueEvent,
        context: &DialogueContext,
    ) -> Result<TransitionOutcome, FlowTransitionError> {
        self.flow.transition(current, event, context)
    }

    pub fn apply_with_audit<S>(
        &self,
        current: &DialogueStep,
        event: &DialogueEvent,
        context: &DialogueContext,
        sink: &S,
        audit: &AuditContext,
    ) -> Result<TransitionOutcome, FlowTransitionError>
    where
        S: AuditSink + ?Sized,
    {
        let result = self.apply(current, event, context);
        match &result {
            Ok(outcome) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_applied",
                        AuditCategory::Flow,
                        AuditOutcome::Success,
                    )
                    .with_metadata("from", format!("{:?}", outcome.from))
                    .with_metadata("to", format!("{:?}", outcome.to))
                    .with_metadata("event", format!("{:?}", outcome.event)),
                );
            }
            Err(error) => {
                sink.emit(
                    AuditEvent::new(
                        audit,
                        "flow.transition_rejected",
                        AuditCategory::Flow,
                        AuditOutcome::Rejected,
                    )
                    .with_metadata("error", error.to_string()),
                );
            }
        }
        result
    }
}

impl Default for FlowEngine<BookingDialogue> {
    fn default() -> Self {
        Self::new(BookingDialogue)
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FlowTransitionError {
    #[error("missing required fields before transition from {state:?}: {missing_fields:?}")]
    MissingRequiredFields { state: DialogueStep, missing_fields: Vec<String> },
    #[error("invalid transition from {state:?} using event {event:?}")]
    InvalidTransition { state: DialogueStep, event: DialogueEvent },
}

fn transition_booking_dialogue(
    current: &DialogueStep,
    event: &DialogueEvent,
    context: &DialogueContext,
) -> Result<TransitionOutcome, FlowTransitionError> {
    use DialogueAction::{
        ApologizeNoRooms, ClearScratch, CreateBooking, PresentRoomOptions,
        PromptForAvailabilityDates, PromptForContactDetails, PromptForGuestCount,
        PromptForRoomSelection, PromptForStayDetails, RouteToIntent, StoreSelectedRoom,
        StoreStayDetails,
    };
    use DialogueEvent::{
        AvailabilityRequested, BookingRequested, ContactDetailsIncomplete, ContactDetailsProvided,
        NoRoomsFound, RoomSelected, RoomSelectionUnmatched, StayCorrected, StayDetailsIncomplete,
        StayDetailsProvided, Unrecognized,
    };
    use DialogueStep::{
        AwaitingAvailabilityDates, AwaitingContactDetails, AwaitingGuestsDates,
        AwaitingRoomSelection, Idle,
    };

    let (to, actions) = match (current, event) {
        (Idle, AvailabilityRequested) => {
            (AwaitingAvailabilityDates, vec![PromptForAvailabilityDates])
        }
        (Idle, BookingRequested) => (AwaitingGuestsDates, vec![PromptForStayDetails]),
        (Idle, Unrecognized) => (Idle, vec![RouteToIntent]),
        // Widget shortcut with a stay that cannot be quoted.
        (Idle, StayDetailsIncomplete) => (AwaitingGuestsDates, vec![PromptForStayDetails]),

        (AwaitingAvailabilityDates, StayDetailsProvided) => (Idle, vec![PresentRoomOptions]),
        (AwaitingAvailabilityDates, StayDetailsIncomplete) => {
            (AwaitingAvailabilityDates, vec![PromptForAvailabilityDates])
        }
        (AwaitingAvailabilityDates, NoRoomsFound) => {
            (AwaitingAvailabilityDates, vec![ApologizeNoRooms])
        }

        // The widget shortcut reaches the same handler straight from Idle.
        (Idle, StayDetailsProvided) | (AwaitingGuestsDates, StayDetailsProvided) => {
            (AwaitingRoomSelection, vec![StoreStayDetails, PresentRoomOptions])
        }
        (AwaitingGuestsDates, StayDetailsIncomplete) => {
            (AwaitingGuestsDates, vec![PromptForGuestCount])
        }
        (Idle, NoRoomsFound) | (AwaitingGuestsDates, NoRoomsFound) => {
            (AwaitingGuestsDates, vec![ApologizeNoRooms])
        }

        (AwaitingRoomSelection, StayCorrected) => {
            (AwaitingRoomSelection, vec![StoreStayDetails, PresentRoomOptions])
        }
        (AwaitingRoomSelection, NoRoomsFound) => (AwaitingRoomSelection, vec![ApologizeNoRooms]),
        (AwaitingRoomSelection, StayDetailsIncomplete) => {
            (AwaitingRoomSelection, vec![PromptForStayDetails])
        }
        (AwaitingRoomSelection, RoomSelected) => {
            (AwaitingContactDetails, vec![StoreSelectedRoom, PromptForContactDetails])
        }
        (AwaitingRoomSelection, RoomSelectionUnmatched) => {
            (AwaitingRoomSelection, vec![PromptForRoomSelection])
        }

        (AwaitingContactDetails, ContactDetailsProvided) => {
            if !context.missing_required_fields.is_empty() {
                return Err(FlowTransitionError::MissingRequiredFields {
                    state: *current,
                    missing_fields: context.missing_required_fields.clone(),
                });
            }
            (Idle, vec![CreateBooking, ClearScratch])
        }
        (AwaitingContactDetails, ContactDetailsIncomplete) => {
            (AwaitingContactDetails, vec![PromptForContactDetails])
        }
        // The chosen static room was taken by someone else before confirmation.
        (AwaitingContactDetails, RoomSelectionUnmatched) => {
            (AwaitingRoomSelection, vec![PromptForRoomSelection])
        }

        _ => {
            return Err(FlowTransitionError::InvalidTransition { state: *current, event: *event });
        }
    };

    Ok(TransitionOutcome { from: *current, to, event: *event, actions })
}

#[cfg(test)]
mod tests {
    use crate::audit::{AuditContext, InMemoryAuditSink};
    use crate::flows::engine::{BookingDialogue, FlowDefinition, FlowEngine, FlowTransitionError};
    use crate::flows::states::{DialogueAction, DialogueContext, DialogueEvent, DialogueStep};

    #[test]
    fn menu_driven_booking_happy_path() {
        let engine = FlowEngine::new(BookingDialogue);
        let context = DialogueContext::default();
        let mut step = engine.initial_step();

        step = engine
            .apply(&step, &DialogueEvent::BookingRequested, &context)
            .expect("idle -> awaiting guests and dates")
            .to;
        assert_eq!(step, DialogueStep::AwaitingGuestsDates);

        step = engine
            .apply(&step, &DialogueEvent::StayDetailsProvided, &context)
            .expect("stay details -> room selection")
            .to;
        step = engine
            .apply(&step, &DialogueEvent::RoomSelected, &context)
            .expect("room selection -> contact details")
            .to;
        assert_eq!(step, DialogueStep::AwaitingContactDetails);

        let confirmed = engine
            .apply(&step, &DialogueEvent::ContactDetailsProvided, &context)
            .expect("contact details -> idle");
        assert_eq!(confirmed.to, DialogueStep::Idle);
        assert_eq!(
            confirmed.actions,
            vec![DialogueAction::CreateBooking, DialogueAction::ClearScratch]
        );
    }

    #[test]
    fn widget_shortcut_reaches_room_selection_from_idle() {
        let outcome = FlowEngine::default()
            .apply(
                &DialogueStep::Idle,
                &DialogueEvent::StayDetailsProvided,
                &DialogueContext::default(),
            )
            .expect("widget shortcut");

        assert_eq!(outcome.to, DialogueStep::AwaitingRoomSelection);
        assert!(outcome.actions.contains(&DialogueAction::PresentRoomOptions));
    }

    #[test]
    fn availability_side_path_returns_to_idle() {
        let engine = FlowEngine::default();
        let context = DialogueContext::default();

        let asked = engine
            .apply(&DialogueStep::Idle, &DialogueEvent::AvailabilityRequested, &context)
            .expect("idle -> awaiting availability dates");
        assert_eq!(asked.to, DialogueStep::AwaitingAvailabilityDates);

        let reprompt = engine
            .apply(&asked.to, &DialogueEvent::StayDetailsIncomplete, &context)
            .expect("incomplete dates re-prompt");
        assert_eq!(reprompt.to, DialogueStep::AwaitingAvailabilityDates);

        let listed = engine
            .apply(&asked.to, &DialogueEvent::StayDetailsProvided, &context)
            .expect("dates -> listing");
        assert_eq!(listed.to, DialogueStep::Idle);
    }

    #[test]
    fn corrections_and_mismatches_stay_in_room_selection() {
        let engine = FlowEngine::default();
        let context = DialogueContext::default();

        for event in [
            DialogueEvent::StayCorrected,
            DialogueEvent::RoomSelectionUnmatched,
            DialogueEvent::NoRoomsFound,
        ] {
            let outcome = engine
                .apply(&DialogueStep::AwaitingRoomSelection, &event, &context)
                .expect("in-place transition");
            assert_eq!(outcome.to, DialogueStep::AwaitingRoomSelection, "event: {event:?}");
        }
    }

    #[test]
    fn taken_room_sends_guest_back_to_selection() {
        let outcome = FlowEngine::default()
            .apply(
                &DialogueStep::AwaitingContactDetails,
                &DialogueEvent::RoomSelectionUnmatched,
                &DialogueContext::default(),
            )
            .expect("room taken before confirmation");

        assert_eq!(outcome.to, DialogueStep::AwaitingRoomSelection);
    }

    #[test]
    fn unquotable_stay_keeps_the_guest_in_the_booking_dialogue() {
        let engine = FlowEngine::default();
        let context = DialogueContext::default();

        let from_widget = engine
            .apply(&DialogueStep::Idle, &DialogueEvent::StayDetailsIncomplete, &context)
            .expect("widget shortcut re-asks for the stay");
        assert_eq!(from_widget.to, DialogueStep::AwaitingGuestsDates);
        assert_eq!(from_widget.actions, vec![DialogueAction::PromptForStayDetails]);

        let from_selection = engine
            .apply(
                &DialogueStep::AwaitingRoomSelection,
                &DialogueEvent::StayDetailsIncomplete,
                &context,
            )
            .expect("bad correction re-asks for the stay");
        assert_eq!(from_selection.to, DialogueStep::AwaitingRoomSelection);
    }

    #[test]
    fn invalid_transition_is_rejected() {
        let engine = FlowEngine::default();
        let error = engine
            .apply(&DialogueStep::Idle, &DialogueEvent::RoomSelected, &DialogueContext::default())
            .expect_err("idle cannot select a room");

        assert!(matches!(
            error,
            FlowTransitionError::InvalidTransition {
                state: DialogueStep::Idle,
                event: DialogueEvent::RoomSelected
            }
        ));
    }

    #[test]
    fn contact_details_without_phone_are_rejected() {
        let error = FlowEngine::default()
            .apply(
                &DialogueStep::AwaitingContactDetails,
                &DialogueEvent::ContactDetailsProvided,
                &DialogueContext::missing(&["phone"]),
            )
            .expect_err("must reject missing phone");

        assert!(matches!(error, FlowTransitionError::MissingRequiredFields { .. }));
    }

    #[test]
    fn replay_is_deterministic_for_same_event_sequence() {
        let engine = FlowEngine::default();
        let events = [
            DialogueEvent::BookingRequested,
            DialogueEvent::StayDetailsIncomplete,
            DialogueEvent::StayDetailsProvided,
            DialogueEvent::StayCorrected,
            DialogueEvent::RoomSelected,
            DialogueEvent::ContactDetailsProvided,
        ];

        let run = |engine: &FlowEngine<BookingDialogue>| {
            let mut step = engine.initial_step();
            let mut actions = Vec::new();
            for event in &events {
                let outcome = engine
                    .apply(&step, event, &DialogueContext::default())
                    .expect("deterministic run");
                actions.push(outcome.actions);
                step = outcome.to;
            }
            (step, actions)
        };

        let first = run(&engine);
        let second = run(&engine);

        assert_eq!(first, second);
        assert_eq!(first.0, DialogueStep::Idle);
        assert_eq!(BookingDialogue.initial_step(), DialogueStep::Idle);
    }

    #[test]
    fn flow_transition_emits_audit_event() {
        let engine = FlowEngine::default();
        let sink = InMemoryAuditSink::default();

        let _ = engine
            .apply_with_audit(
                &DialogueStep::Idle,
                &DialogueEvent::BookingRequested,
                &DialogueContext::default(),
                &sink,
                &AuditContext::new(Some("web-42".to_owned()), None, "req-42", "dialogue"),
            )
            .expect("transition should succeed");

        let events = sink.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].correlation_id, "req-42");
        assert_eq!(events[0].session_id.as_deref(), Some("web-42"));
        assert_eq!(events[0].event_type, "flow.transition_applied");
    }
}
