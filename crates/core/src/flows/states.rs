use serde::{Deserialize, Serialize};

/// Position of a conversation in the booking dialogue.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueStep {
    #[default]
    Idle,
    AwaitingAvailabilityDates,
    AwaitingGuestsDates,
    AwaitingRoomSelection,
    AwaitingContactDetails,
}

impl DialogueStep {
    pub fn is_mid_flow(&self) -> bool {
        !matches!(self, Self::Idle)
    }
}

/// What the latest message turned out to be, from the dialogue's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueEvent {
    AvailabilityRequested,
    BookingRequested,
    StayDetailsProvided,
    StayDetailsIncomplete,
    NoRoomsFound,
    StayCorrected,
    RoomSelected,
    RoomSelectionUnmatched,
    ContactDetailsProvided,
    ContactDetailsIncomplete,
    Unrecognized,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DialogueContext {
    pub missing_required_fields: Vec<String>,
}

impl DialogueContext {
    pub fn missing(fields: &[&str]) -> Self {
        Self { missing_required_fields: fields.iter().map(|field| (*field).to_owned()).collect() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogueAction {
    PromptForAvailabilityDates,
    PromptForStayDetails,
    PromptForGuestCount,
    StoreStayDetails,
    PresentRoomOptions,
    ApologizeNoRooms,
    PromptForRoomSelection,
    StoreSelectedRoom,
    PromptForContactDetails,
    CreateBooking,
    ClearScratch,
    RouteToIntent,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionOutcome {
    pub from: DialogueStep,
    pub to: DialogueStep,
    pub event: DialogueEvent,
    pub actions: Vec<DialogueAction>,
}
