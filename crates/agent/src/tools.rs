//! Functions the voice assistant can call mid-call.
//!
//! Every tool takes the platform's JSON arguments and answers with a JSON object whose
//! `message` field is spoken back to the caller. Not-found and no-availability outcomes
//! are ordinary answers; only store failures surface as errors.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tracing::info;

use frontdesk_core::domain::booking::{
    BookingChannel, BookingId, GuestDetails, StayDetails, MAX_STAY_NIGHTS,
};
use frontdesk_core::domain::room::Room;
use frontdesk_core::errors::DomainError;
use frontdesk_core::parsing::{parse_calendar_date, parse_date_range};
use frontdesk_db::repositories::RepositoryError;

use crate::handlers::FrontDesk;
use crate::replies::money;

/// Room options read out for one availability question.
const SPOKEN_OPTIONS: usize = 3;

#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &'static str;
    async fn execute(&self, input: Value) -> Result<Value>;
}

#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    /// The five phone functions, all backed by `desk`.
    pub fn for_front_desk(desk: FrontDesk) -> Self {
        let mut registry = Self::default();
        registry.register(CheckRoomAvailabilityTool::new(desk.clone()));
        registry.register(CreateBookingTool::new(desk.clone()));
        registry.register(CancelBookingTool::new(desk.clone()));
        registry.register(GetBookingDetailsTool::new(desk));
        registry.register(TransferToAgentTool);
        registry
    }

    pub fn register<T>(&mut self, tool: T)
    where
        T: Tool + 'static,
    {
        self.tools.insert(tool.name().to_string(), Box::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(Box::as_ref)
    }

    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Unknown names get the platform's "not recognized" answer instead of an error.
    pub async fn execute(&self, name: &str, input: Value) -> Result<Value> {
        match self.get(name) {
            Some(tool) => tool.execute(input).await,
            None => {
                info!(event_name = "voice.function_unknown", function = name, "unknown function");
                Ok(json!({"success": false, "message": "Function not recognized"}))
            }
        }
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

pub struct CheckRoomAvailabilityTool {
    desk: FrontDesk,
}

impl CheckRoomAvailabilityTool {
    pub fn new(desk: FrontDesk) -> Self {
        Self { desk }
    }
}

#[async_trait]
impl Tool for CheckRoomAvailabilityTool {
    fn name(&self) -> &'static str {
        "check_room_availability"
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let today = Utc::now().date_naive();
        let (check_in, check_out) = requested_dates(&input, today);
        let guests = guests_arg(&input);

        let rooms = match (check_in, check_out) {
            (Some(check_in), Some(check_out)) if check_out > check_in => {
                self.desk.resolve_availability(check_in, check_out, Some(guests)).await?
            }
            _ => self.desk.hotel().available_rooms().await?,
        };
        let rooms: Vec<Room> = match text_arg(&input, "room_type") {
            Some(room_type) => {
                rooms.into_iter().filter(|room| room.matches_type(&room_type)).collect()
            }
            None => rooms,
        };

        info!(
            event_name = "voice.availability_checked",
            check_in = ?check_in,
            check_out = ?check_out,
            guests,
            rooms = rooms.len(),
            "phone availability check"
        );

        let Some(first) = rooms.first() else {
            return Ok(json!({"available": false, "message": "No rooms available for your dates"}));
        };
        let options: Vec<Value> = rooms
            .iter()
            .take(SPOKEN_OPTIONS)
            .map(|room| {
                json!({
                    "type": room.room_type,
                    "price": price(room.price_per_night),
                    "capacity": room.capacity,
                })
            })
            .collect();

        Ok(json!({
            "available": true,
            "rooms": options,
            "room_type": first.room_type,
            "price": price(first.price_per_night),
            "room_id": first.id,
            "message": format!(
                "Yes, we have several rooms available. For example, our {} is {} per night. \
                 We also have other options available.",
                first.room_type,
                money(first.price_per_night)
            ),
        }))
    }
}

/// Books a free static room by type over the phone.
pub struct CreateBookingTool {
    desk: FrontDesk,
}

impl CreateBookingTool {
    pub fn new(desk: FrontDesk) -> Self {
        Self { desk }
    }
}

#[async_trait]
impl Tool for CreateBookingTool {
    fn name(&self) -> &'static str {
        "create_booking"
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        const NO_ROOM: &str = "Sorry, no rooms of that type are currently available. \
                               Would you like to hear about other room types?";

        let free = self.desk.hotel().available_rooms().await?;
        let room = match text_arg(&input, "room_type") {
            Some(room_type) => free.into_iter().find(|room| room.matches_type(&room_type)),
            None => free.into_iter().next(),
        };
        let Some(room) = room else {
            return Ok(json!({"success": false, "message": NO_ROOM}));
        };

        let today = Utc::now().date_naive();
        let check_in = text_arg(&input, "check_in")
            .and_then(|raw| parse_calendar_date(&raw, today))
            .unwrap_or_else(|| today + Days::new(1));
        let nights = text_arg(&input, "check_out")
            .and_then(|raw| parse_calendar_date(&raw, check_in))
            .map(|check_out| (check_out - check_in).num_days())
            .and_then(|days| u32::try_from(days).ok())
            .filter(|days| *days > 0)
            .unwrap_or(1);

        let guest = GuestDetails {
            name: text_arg(&input, "guest_name").unwrap_or_else(|| "Guest".to_owned()),
            phone: text_arg(&input, "guest_phone"),
            email: text_arg(&input, "guest_email"),
            payment_method: None,
            special_requests: text_arg(&input, "special_requests"),
        };
        let Some(stay) = StayDetails::new(check_in, nights, guests_arg(&input)) else {
            return Ok(json!({
                "success": false,
                "message": format!(
                    "Sorry, I can only book stays of up to {MAX_STAY_NIGHTS} nights. \
                     Could you confirm your check-out date?"
                ),
            }));
        };

        match self.desk.create_booking(&room, guest, stay, BookingChannel::PhoneCall).await {
            Ok(booking) => Ok(json!({
                "success": true,
                "booking_id": booking.booking_id,
                "room_type": booking.room.room_type,
                "price": price(booking.room.price_per_night),
                "message": format!(
                    "Perfect! Your reservation is confirmed. Your booking number is {}",
                    booking.booking_id
                ),
            })),
            Err(RepositoryError::Domain(DomainError::RoomUnavailable { .. })) => {
                Ok(json!({"success": false, "message": NO_ROOM}))
            }
            Err(error) => Err(error.into()),
        }
    }
}

pub struct CancelBookingTool {
    desk: FrontDesk,
}

impl CancelBookingTool {
    pub fn new(desk: FrontDesk) -> Self {
        Self { desk }
    }
}

#[async_trait]
impl Tool for CancelBookingTool {
    fn name(&self) -> &'static str {
        "cancel_booking"
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let id = BookingId::normalized(&text_arg(&input, "booking_id").unwrap_or_default());
        Ok(match self.desk.cancel_booking(&id).await? {
            Some(_) => json!({
                "success": true,
                "message": format!("Your booking {id} has been successfully cancelled"),
            }),
            None => json!({
                "success": false,
                "message": format!("I could not find booking {id}"),
            }),
        })
    }
}

pub struct GetBookingDetailsTool {
    desk: FrontDesk,
}

impl GetBookingDetailsTool {
    pub fn new(desk: FrontDesk) -> Self {
        Self { desk }
    }
}

#[async_trait]
impl Tool for GetBookingDetailsTool {
    fn name(&self) -> &'static str {
        "get_booking_details"
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let id = BookingId::normalized(&text_arg(&input, "booking_id").unwrap_or_default());
        Ok(match self.desk.find_booking(&id).await? {
            Some(booking) => json!({
                "found": true,
                "message": format!(
                    "Found your booking: {} for {}",
                    booking.room.room_type, booking.guest_name
                ),
                "booking": booking,
            }),
            None => json!({"found": false, "message": "Booking not found"}),
        })
    }
}

pub struct TransferToAgentTool;

#[async_trait]
impl Tool for TransferToAgentTool {
    fn name(&self) -> &'static str {
        "transfer_to_agent"
    }

    async fn execute(&self, input: Value) -> Result<Value> {
        let reason = text_arg(&input, "reason").unwrap_or_else(|| "General assistance".to_owned());
        info!(event_name = "voice.transfer_requested", reason = %reason, "transfer requested");
        Ok(json!({
            "success": true,
            "transfer": true,
            "message": format!(
                "I understand you need help with {reason}. Let me transfer you to one of our \
                 human agents who can better assist you. Please hold for just a moment."
            ),
            "reason": reason,
        }))
    }
}

/// `check_in`/`check_out` in ISO or spoken form; a `date_range` (or `dates`) phrase only
/// when neither is given.
fn requested_dates(input: &Value, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let check_in = text_arg(input, "check_in");
    let check_out = text_arg(input, "check_out");
    if check_in.is_none() && check_out.is_none() {
        if let Some(range) = text_arg(input, "date_range").or_else(|| text_arg(input, "dates")) {
            return parse_date_range(&range, today);
        }
    }

    let check_in = check_in.and_then(|raw| parse_calendar_date(&raw, today));
    let check_out =
        check_out.and_then(|raw| parse_calendar_date(&raw, check_in.unwrap_or(today)));
    (check_in, check_out)
}

fn price(amount: Decimal) -> Value {
    amount.to_f64().map_or(Value::Null, Value::from)
}

fn text_arg(input: &Value, key: &str) -> Option<String> {
    input
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_owned)
}

/// Whole number or numeric string; one guest otherwise.
fn guests_arg(input: &Value) -> u32 {
    match input.get("guests") {
        Some(Value::Number(number)) => number.as_u64().and_then(|n| u32::try_from(n).ok()),
        Some(Value::String(text)) => text.trim().parse().ok(),
        _ => None,
    }
    .filter(|guests| *guests > 0)
    .unwrap_or(1)
}
