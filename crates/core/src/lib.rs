pub mod audit;
pub mod config;
pub mod domain;
pub mod errors;
pub mod flows;
pub mod inventory;
pub mod parsing;

pub use domain::booking::{
    Booking, BookingChannel, BookingId, GuestDetails, RoomSnapshot, StayDetails,
};
pub use domain::hotel::{Faq, HotelData};
pub use domain::room::{Room, RoomSource};
pub use domain::session::{
    BookingScratch, CallDirection, CallSession, CallStatus, ConversationSession,
};
pub use errors::{ApplicationError, DomainError, InterfaceError};
pub use flows::{DialogueAction, DialogueEvent, DialogueStep};
pub use inventory::{AvailabilityQuery, InventoryError, InventoryProvider, UnconfiguredInventory};
pub use parsing::{MessageParser, ParsedMessage, RuleBasedParser};
