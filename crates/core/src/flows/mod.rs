pub mod engine;
pub mod states;

pub use engine::{BookingDialogue, FlowDefinition, FlowEngine, FlowTransitionError};
pub use states::{DialogueAction, DialogueContext, DialogueEvent, DialogueStep, TransitionOutcome};
