use serde_json::{json, Value};

use frontdesk_core::config::HotelConfig;

const PHONE_MODEL: &str = "gpt-4o-mini";
const WEB_MODEL: &str = "gpt-4";
const MAX_CALL_SECONDS: u32 = 300;

/// Who the assistant speaks as.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssistantProfile {
    pub hotel_name: String,
    pub hotel_address: String,
    pub agent_name: String,
}

impl From<&HotelConfig> for AssistantProfile {
    fn from(config: &HotelConfig) -> Self {
        Self {
            hotel_name: config.name.clone(),
            hotel_address: config.address.clone(),
            agent_name: config.agent_name.clone(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CallPurpose {
    #[default]
    BookingConfirmation,
    Reminder,
    FollowUp,
}

impl CallPurpose {
    /// Unknown purposes are treated as booking confirmations.
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "reminder" => Self::Reminder,
            "follow_up" => Self::FollowUp,
            _ => Self::BookingConfirmation,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BookingConfirmation => "booking_confirmation",
            Self::Reminder => "reminder",
            Self::FollowUp => "follow_up",
        }
    }
}

impl AssistantProfile {
    pub fn first_message(&self) -> String {
        format!(
            "Thank you for calling {}! This is {} from the front desk. May I have your name please?",
            self.hotel_name, self.agent_name
        )
    }

    pub fn outbound_first_message(&self, purpose: CallPurpose, guest_name: Option<&str>) -> String {
        let greeting = match guest_name.map(str::trim).filter(|name| !name.is_empty()) {
            Some(name) => format!("Hello {name}!"),
            None => "Hello!".to_owned(),
        };
        match purpose {
            CallPurpose::BookingConfirmation => format!(
                "{greeting} This is {} calling from {} to confirm your reservation.",
                self.agent_name, self.hotel_name
            ),
            CallPurpose::Reminder => format!(
                "{greeting} This is a friendly reminder about your upcoming stay at {}.",
                self.hotel_name
            ),
            CallPurpose::FollowUp => format!(
                "{greeting} This is {} from {}. I'm calling to follow up on your recent stay.",
                self.agent_name, self.hotel_name
            ),
        }
    }

    pub fn system_prompt(&self) -> String {
        format!(
            "You are {agent}, a front desk agent at {hotel}.\n\n\
             IDENTITY: You work at {hotel} ({address}). Never say you're an AI.\n\n\
             CONVERSATION FLOW:\n\
             1. Greet the caller and ask for their name.\n\
             2. Ask how you can help today.\n\
             3. For a room booking, ask for the check-in date, the number of nights and the guest count.\n\
             4. Call check_room_availability as soon as you have check-in (YYYY-MM-DD), check-out (YYYY-MM-DD) and guests.\n\
             5. Present the available rooms and ask which they prefer, then call create_booking.\n\n\
             RULES:\n\
             - Do not continue the booking conversation without calling check_room_availability.\n\
             - Use the caller's name only 2-3 times.\n\
             - Be friendly but concise.\n\
             - Use transfer_to_agent when the caller asks for a person or the request is complex.\n\n\
             HOTEL INFO:\n\
             - Address: {address}\n\
             - Near Charlotte Douglas International Airport\n\
             - Check-in: 3:00 PM | Check-out: 12:00 PM\n\
             - Amenities: Free WiFi, fitness center, indoor pool, free parking, airport shuttle, breakfast",
            agent = self.agent_name,
            hotel = self.hotel_name,
            address = self.hotel_address,
        )
    }

    fn web_system_prompt(&self) -> String {
        format!(
            "You are {agent}, a professional AI front desk agent for {hotel}.\n\n\
             Handle common hotel inquiries (room availability, pricing, amenities, policies) and \
             simple room bookings when you have all required information.\n\n\
             Transfer to a human with transfer_to_agent when the guest asks for a person, has a \
             complex request (groups, events, modifications), is upset, has billing issues, or \
             repeatedly does not understand. Say: \"I understand. Let me connect you with one of \
             our customer support specialists who can better assist you. Please hold for just a moment.\"\n\n\
             Use check_room_availability to check rooms and create_booking for simple bookings. \
             Confirm dates, names and room types. Never pretend you can do something you can't.\n\n\
             Hotel Info:\n\
             - {hotel}, {address}\n\
             - Check-in: 3:00 PM | Check-out: 12:00 PM\n\
             - Free 24/7 airport shuttle, parking, WiFi\n\
             - Indoor pool, 24-hour fitness center, business center",
            agent = self.agent_name,
            hotel = self.hotel_name,
            address = self.hotel_address,
        )
    }

    /// Body for creating the phone assistant on the voice platform.
    pub fn assistant_definition(&self, server_url: Option<&str>) -> Value {
        let mut definition = json!({
            "name": format!("{} Front Desk", self.hotel_name),
            "model": {
                "provider": "openai",
                "model": PHONE_MODEL,
                "messages": [{"role": "system", "content": self.system_prompt()}],
                "temperature": 0.3,
                "functions": function_definitions(),
            },
            "voice": {"provider": "azure", "voiceId": "en-US-JennyNeural", "speed": 1.0},
            "firstMessage": self.first_message(),
            "endCallMessage": format!("Thank you for calling {}! Have a wonderful day!", self.hotel_name),
            "endCallPhrases": ["goodbye", "bye", "that's all", "nothing else"],
            "clientMessages": ["function-call", "tool-calls"],
            "maxDurationSeconds": MAX_CALL_SECONDS,
            "silenceTimeoutSeconds": 2,
            "responseDelaySeconds": 0.5,
        });
        if let (Some(url), Some(object)) = (server_url, definition.as_object_mut()) {
            object.insert("serverUrl".to_owned(), Value::String(url.to_owned()));
        }
        definition
    }

    /// Assistant configuration handed to the browser voice SDK.
    pub fn web_call_config(&self, server_url: &str) -> Value {
        json!({
            "assistant": {
                "firstMessage": format!(
                    "Hello! Thank you for calling {}. I'm {}, your front desk assistant. \
                     I can help you with room bookings, amenities, and hotel information. \
                     How can I help you today?",
                    self.hotel_name, self.agent_name
                ),
                "model": {
                    "provider": "openai",
                    "model": WEB_MODEL,
                    "messages": [{"role": "system", "content": self.web_system_prompt()}],
                    "functions": function_definitions(),
                    "temperature": 0.7,
                },
                "voice": {"provider": "eleven_labs", "voiceId": "rachel"},
                "serverUrl": server_url,
                "endCallFunctionEnabled": true,
            }
        })
    }
}

/// Functions the assistant may call back through the webhook.
pub fn function_definitions() -> Value {
    json!([
        {
            "name": "check_room_availability",
            "description": "Return available room types and nightly rates for given dates and guest count.",
            "parameters": {
                "type": "object",
                "properties": {
                    "check_in": {"type": "string", "description": "Check-in date in YYYY-MM-DD format"},
                    "check_out": {"type": "string", "description": "Check-out date in YYYY-MM-DD format"},
                    "date_range": {"type": "string", "description": "Stay dates in words, e.g. 'nov 2 to nov 5'"},
                    "guests": {"type": "integer", "minimum": 1, "description": "Total number of guests"},
                    "room_type": {"type": "string", "description": "Preferred room type"}
                },
                "required": ["check_in", "check_out", "guests"]
            }
        },
        {
            "name": "create_booking",
            "description": "Create a new room reservation",
            "parameters": {
                "type": "object",
                "properties": {
                    "guest_name": {"type": "string", "description": "Full name of the guest"},
                    "guest_phone": {"type": "string", "description": "Guest's phone number"},
                    "guest_email": {"type": "string", "description": "Guest's email address"},
                    "room_type": {"type": "string", "description": "Type of room to book"},
                    "check_in": {"type": "string", "description": "Check-in date"},
                    "check_out": {"type": "string", "description": "Check-out date"},
                    "guests": {"type": "integer", "description": "Number of guests"},
                    "special_requests": {"type": "string", "description": "Any special requests or notes"}
                },
                "required": ["guest_name", "guest_phone", "room_type", "check_in", "check_out"]
            }
        },
        {
            "name": "cancel_booking",
            "description": "Cancel an existing reservation",
            "parameters": {
                "type": "object",
                "properties": {
                    "booking_id": {"type": "string", "description": "The booking confirmation number"},
                    "guest_name": {"type": "string", "description": "Guest name for verification"}
                },
                "required": ["booking_id"]
            }
        },
        {
            "name": "get_booking_details",
            "description": "Retrieve details of an existing booking",
            "parameters": {
                "type": "object",
                "properties": {
                    "booking_id": {"type": "string", "description": "The booking confirmation number"}
                },
                "required": ["booking_id"]
            }
        },
        {
            "name": "transfer_to_agent",
            "description": "Transfer call to a human agent for complex requests",
            "parameters": {
                "type": "object",
                "properties": {
                    "reason": {"type": "string", "description": "Reason for transfer"}
                },
                "required": ["reason"]
            }
        }
    ])
}
