//! Guest-facing reply text.
//!
//! Replies are Markdown-flavoured plain text; the web widget renders `**bold**` and
//! bullet characters, the CLI prints them as they are.

use rust_decimal::Decimal;

use frontdesk_core::config::HotelConfig;
use frontdesk_core::domain::booking::{Booking, NOT_PROVIDED};
use frontdesk_core::domain::hotel::HotelData;
use frontdesk_core::domain::room::{Room, RoomSource};

const RULE: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━";
const LISTED_AMENITIES: usize = 4;

pub fn greeting_menu(hotel: &HotelConfig) -> String {
    format!(
        "Welcome to {}! ✈️\n\n\
         I'm {} from the front desk. How can I help you today?\n\n\
         **1.** Check room availability\n\
         **2.** Book a reservation\n\
         **3.** Cancel a reservation\n\
         **4.** View amenities & facilities\n\
         **5.** Hotel policies & FAQ\n\n\
         **Please select a number (1-5) or type your question.**",
        hotel.name, hotel.agent_name
    )
}

pub fn greeting_reply(hotel: &HotelConfig) -> String {
    format!(
        "Hello! Welcome to {}. I'm {} from the front desk. How can I assist you today?",
        hotel.name, hotel.agent_name
    )
}

pub fn availability_prompt() -> String {
    "I'd be happy to check room availability for you! 🏨\n\n\
     **What dates would you like to check?**\n\n\
     Please provide your check-in and check-out dates.\n\n\
     For example:\n\
     • \"Oct 15 to Oct 18\"\n\
     • \"October 20 for 3 nights\"\n\
     • \"Nov 1 to Nov 5\""
        .to_owned()
}

pub fn booking_prompt() -> String {
    "I'd be happy to help you book a room! 🏨\n\n\
     To find the perfect room for you, I need a few details:\n\n\
     **1.** How many guests will be staying?\n\
     **2.** What are your check-in and check-out dates?\n\n\
     You can respond like: \"2 guests, checking in Oct 15, checking out Oct 17\"\n\n\
     Or answer one at a time!"
        .to_owned()
}

pub fn dates_reprompt() -> String {
    "Please provide your check-in and check-out dates.\n\n\
     For example: \"Oct 15 to Oct 18\" or \"October 15 for 3 nights\""
        .to_owned()
}

pub fn guests_reprompt() -> String {
    "How many guests will be staying? Please provide the number of guests.".to_owned()
}

pub fn no_rooms_for_dates() -> String {
    "I apologize, but we don't have any rooms available for those dates. \
     Would you like to check different dates?"
        .to_owned()
}

pub fn no_rooms_for_guests(guests: u32) -> String {
    format!(
        "I apologize, but we don't have rooms available for {guests} guests. \
         Would you like to see all our available rooms?"
    )
}

/// Reply to a dates-only availability check.
pub fn availability_list(
    rooms: &[Room],
    check_in: &str,
    check_out: &str,
    nights: u32,
    hotel: &HotelConfig,
) -> String {
    let mut reply = format!("**Available Rooms** for {check_in} to {check_out}:\n\n");
    for room in rooms {
        reply.push_str(&room_line(room, nights, hotel));
    }
    reply.push_str(
        "\nWould you like to book any of these rooms? \
         Reply 'book' or select option 2 to start a reservation.",
    );
    reply
}

/// Options for a known party and stay; `updated` after the guest corrected the stay.
pub fn stay_options(
    rooms: &[Room],
    guests: u32,
    nights: u32,
    updated: bool,
    hotel: &HotelConfig,
) -> String {
    let mut reply = if updated {
        format!(
            "Perfect! Updated to **{guests} guest(s)** for **{nights} night(s)**. \
             Here are your options:\n\n"
        )
    } else {
        format!(
            "Perfect! For **{guests} guest(s)** staying **{nights} night(s)**, \
             here are your options:\n\n"
        )
    };
    for room in rooms {
        reply.push_str(&room_line(room, nights, hotel));
    }
    reply.push_str(
        "Which room would you like? (Type the room type, e.g., 'Queen Guest Room' or 'King')",
    );
    reply
}

fn room_line(room: &Room, nights: u32, hotel: &HotelConfig) -> String {
    let place = match room.source {
        RoomSource::Provider => {
            format!(" at {}\n", room.hotel_name.as_deref().unwrap_or(&hotel.name))
        }
        RoomSource::Static => format!(" (Room #{})\n", room.id),
    };
    format!(
        "**{}**{place}\
         • Capacity: {} guests\n\
         • {}/night × {nights} nights = **{} total**\n\
         • Amenities: {}\n\n",
        room.room_type,
        room.capacity,
        money(room.price_per_night),
        money(room.total_for(nights)),
        room.amenities.iter().take(LISTED_AMENITIES).cloned().collect::<Vec<_>>().join(", "),
    )
}

pub fn room_selection_reprompt() -> String {
    "Please select a room type from the options above (e.g., Queen, King, Suite).".to_owned()
}

pub fn room_no_longer_available() -> String {
    "That room is no longer available. Please choose another option from above.".to_owned()
}

pub fn room_selected(room: &Room, nights: u32, hotel: &HotelConfig) -> String {
    let mut reply = "✨ **Excellent choice!**\n\n".to_owned();
    if room.source == RoomSource::Provider {
        reply.push_str(&format!(
            "**Hotel:** {}\n",
            room.hotel_name.as_deref().unwrap_or(&hotel.name)
        ));
    }
    reply.push_str(&format!("**Room:** {}\n", room.room_type));
    if room.source == RoomSource::Static {
        reply.push_str(&format!("**Room Number:** {}\n", room.id));
    }
    reply.push_str(&format!(
        "**Nightly Rate:** {}\n**Total Cost:** {} for {nights} night(s)\n\n**Room Features:**\n",
        money(room.price_per_night),
        money(room.total_for(nights)),
    ));
    for amenity in &room.amenities {
        reply.push_str(&format!("✓ {amenity}\n"));
    }
    reply.push_str(
        "\n**Next step:** Please provide your contact details:\n\
         Name, phone, email (optional), special requests (optional), Payment: NAME ****1234",
    );
    reply
}

pub fn contact_reprompt() -> String {
    "Please provide your name and phone number to continue with your reservation.".to_owned()
}

pub fn booking_confirmation(booking: &Booking, hotel: &HotelConfig) -> String {
    let provided = |value: &str| value != NOT_PROVIDED && !value.trim().is_empty();

    let mut reply = format!(
        "✅ **RESERVATION CONFIRMED!**\n\n{RULE}\n\
         **Confirmation #:** {}\n**Guest:** {}\n",
        booking.booking_id, booking.guest_name
    );
    if !booking.is_static_room() {
        reply.push_str(&format!(
            "**Hotel:** {}\n",
            booking.room.hotel_name.as_deref().unwrap_or(&hotel.name)
        ));
    }
    reply.push_str(&format!("**Room:** {}\n", booking.room.room_type));
    if booking.is_static_room() {
        reply.push_str(&format!("**Room #:** {}\n", booking.room.room_id));
    }
    reply.push_str(&format!(
        "{RULE}\n\n**Guest Information:**\n• Phone: {}\n",
        booking.guest_phone
    ));
    if provided(&booking.guest_email) {
        reply.push_str(&format!("• Email: {}\n", booking.guest_email));
    }
    if provided(&booking.payment_method) {
        let payment = match booking.payment_method.rsplit_once(" ****") {
            Some((holder, last4)) => format!("{holder} ending in {last4}"),
            None => booking.payment_method.clone(),
        };
        reply.push_str(&format!("• Payment: {payment}\n"));
    }
    if let Some(requests) = &booking.special_requests {
        reply.push_str(&format!("• Special Requests: {requests}\n"));
    }

    reply.push_str(&format!(
        "\n**Reservation Details:**\n\
         • Guests: {}\n\
         • Check-in: {}\n\
         • Check-out: {}\n\
         • Nights: {}\n\
         • Rate: {}/night\n\
         • **Total: {}**\n\n\
         **Included Amenities:**\n",
        booking.num_guests,
        booking.check_in.format("%Y-%m-%d"),
        booking.check_out.format("%Y-%m-%d"),
        booking.nights,
        money(booking.room.price_per_night),
        money(booking.total_cost),
    ));
    for amenity in &booking.room.amenities {
        reply.push_str(&format!("✓ {amenity}\n"));
    }

    reply.push_str(
        "\n**Important Information:**\n\
         • Check-in time: 3:00 PM\n\
         • Check-out time: 12:00 PM\n\
         • Free 24/7 airport shuttle to CLT\n\
         • Free parking & WiFi included\n\
         • Cancellation: Free up to 48 hours before arrival\n\n",
    );
    if provided(&booking.guest_email) {
        reply.push_str(&format!(
            "📧 A confirmation email has been sent to **{}**\n\n",
            booking.guest_email
        ));
    } else {
        reply.push_str(&format!(
            "📱 A confirmation SMS will be sent to **{}**\n\n",
            booking.guest_phone
        ));
    }
    reply.push_str(&format!(
        "Thank you for choosing {}! Anything else I can help with?",
        hotel.name
    ));
    reply
}

/// Free static rooms, optionally narrowed to a room type.
pub fn static_availability(rooms: &[Room]) -> String {
    if rooms.is_empty() {
        return "I apologize, but we don't have any rooms available matching your criteria at \
                the moment. Would you like me to check other room types?"
            .to_owned();
    }

    let mut reply = "Here are our available rooms:\n\n".to_owned();
    for room in rooms {
        reply.push_str(&format!(
            "**{}** (Room #{})\n• {}\n• Price: {}/night\n• Capacity: {} guests\n\
             • Amenities: {}\n\n",
            room.room_type,
            room.id,
            room.description,
            money(room.price_per_night),
            room.capacity,
            room.amenities.join(", "),
        ));
    }
    reply.push_str("Would you like to book any of these rooms?");
    reply
}

pub fn booking_list(bookings: &[Booking]) -> String {
    if bookings.is_empty() {
        return "There are no active bookings in the system.".to_owned();
    }

    let mut reply = "Here are the current bookings:\n\n".to_owned();
    for booking in bookings {
        reply.push_str(&format!(
            "• **{}** - {} - {}\n",
            booking.booking_id, booking.guest_name, booking.room.room_type
        ));
    }
    reply.push_str("\nPlease provide the booking ID you'd like to cancel.");
    reply
}

pub fn booking_not_found(booking_id: &str) -> String {
    format!(
        "I couldn't find a booking with ID {booking_id}. \
         Please check the booking ID and try again."
    )
}

pub fn booking_cancelled(booking: &Booking) -> String {
    format!(
        "✅ Booking {} has been successfully cancelled.\n\n\
         Guest: {}\nRoom: {}\n\n\
         As per our cancellation policy, please note that cancellations within 48 hours of \
         arrival may incur charges. Is there anything else I can help you with?",
        booking.booking_id, booking.guest_name, booking.room.room_type
    )
}

pub fn amenities(data: &HotelData, amenity: Option<&str>) -> String {
    if let Some(description) = amenity.and_then(|key| data.amenities.get(key)) {
        return description.clone();
    }

    let mut reply = "Here are our hotel amenities:\n\n".to_owned();
    for (key, description) in &data.amenities {
        reply.push_str(&format!("**{}:** {description}\n\n", display_key(key)));
    }
    reply
}

pub fn policies(data: &HotelData, policy: Option<&str>) -> String {
    if let Some((key, description)) =
        policy.and_then(|key| data.policies.get_key_value(key))
    {
        return format!("**{}:** {description}", display_key(key));
    }

    let mut reply = "Here are our hotel policies:\n\n".to_owned();
    for (key, description) in &data.policies {
        reply.push_str(&format!("**{}:** {description}\n\n", display_key(key)));
    }
    reply
}

/// Answer of the FAQ sharing the most words with `message`; at least two must overlap.
pub fn faq_answer(data: &HotelData, message: &str) -> Option<String> {
    let asked = word_set(message);
    let mut best: Option<(usize, &str)> = None;
    for faq in &data.faqs {
        let overlap = word_set(&faq.question).intersection(&asked).count();
        if overlap > best.map_or(0, |(score, _)| score) {
            best = Some((overlap, faq.answer.as_str()));
        }
    }
    best.filter(|(score, _)| *score >= 2).map(|(_, answer)| answer.to_owned())
}

pub fn general_inquiry(hotel: &HotelConfig, message: &str) -> String {
    let lower = message.to_lowercase();
    let asks = |phrases: &[&str]| phrases.iter().any(|phrase| lower.contains(phrase));

    if asks(&["who are you", "what are you", "are you ai", "are you a bot"]) {
        return format!(
            "I'm {} from the front desk here at {}. I'm here to help with reservations, \
             questions about our hotel, or anything else you need!",
            hotel.agent_name, hotel.name
        );
    }
    if asks(&["which hotel", "what hotel", "where are you located", "your location"]) {
        return format!(
            "This is {}, located at {}. We're just minutes from Charlotte Douglas \
             International Airport. How can I help you today?",
            hotel.name, hotel.address
        );
    }
    "I'm here to help! I can assist you with:\n\
     • Checking room availability at our hotel\n\
     • Booking or cancelling reservations\n\
     • Information about our amenities (pool, gym, parking, airport shuttle, etc.)\n\
     • Hotel policies (check-in/out times, cancellation, pets, etc.)\n\n\
     What would you like help with?"
        .to_owned()
}

pub fn money(amount: Decimal) -> String {
    format!("${:.2}", amount.round_dp(2))
}

/// `fitness_center` -> `Fitness Center`.
fn display_key(key: &str) -> String {
    crate::conversation::title_case(&key.replace('_', " "))
}

fn word_set(text: &str) -> std::collections::BTreeSet<String> {
    text.to_lowercase().split_whitespace().map(str::to_owned).collect()
}
