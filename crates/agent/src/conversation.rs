use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use frontdesk_core::parsing::find_date_tokens;

/// Room-type words the classifier recognises, in the order they are tried.
pub const ROOM_TYPES: [&str; 8] =
    ["queen", "king", "suite", "executive", "accessible", "standard", "deluxe", "family"];

const GREETING_WORDS: [&str; 3] = ["hello", "hi", "hey"];
const GREETING_PHRASES: [&str; 2] = ["good morning", "good afternoon"];
const AVAILABILITY_PHRASES: [&str; 5] =
    ["available", "availability", "check room", "any rooms", "do you have"];
const BOOKING_PHRASES: [&str; 3] = ["book", "reserve", "reservation"];
const CANCEL_PHRASES: [&str; 2] = ["cancel", "cancellation"];
const AMENITY_PHRASES: [&str; 13] = [
    "amenities",
    "facilities",
    "pool",
    "gym",
    "fitness",
    "parking",
    "wifi",
    "internet",
    "breakfast",
    "restaurant",
    "concierge",
    "shuttle",
    "what do you have",
];
const AMENITY_KEYS: [(&str, &str); 11] = [
    ("pool", "pool"),
    ("gym", "fitness_center"),
    ("fitness", "fitness_center"),
    ("parking", "parking"),
    ("wifi", "wifi"),
    ("internet", "wifi"),
    ("breakfast", "breakfast"),
    ("restaurant", "restaurant"),
    ("business", "business_center"),
    ("concierge", "concierge"),
    ("shuttle", "airport_shuttle"),
];
const POLICY_PHRASES: [&str; 10] = [
    "policy",
    "policies",
    "check-in",
    "checkout",
    "check in",
    "check out",
    "pet",
    "smoking",
    "payment",
    "cancellation policy",
];
const POLICY_KEYS: [(&str, &str); 9] = [
    ("check-in", "check_in"),
    ("check in", "check_in"),
    ("checkout", "check_out"),
    ("check out", "check_out"),
    ("pet", "pets"),
    ("smoking", "smoking"),
    ("payment", "payment"),
    ("pay", "payment"),
    ("cancel", "cancellation"),
];

static SELF_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:name is|i am|i'm)\s+([a-z'\s]+)").unwrap());
static BOOKING_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(?:booking|reservation|id)\b\s*#?\s*([a-z]*\d[a-z0-9]*)").unwrap()
});
static BARE_BOOKING_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(bk\d+)\b").unwrap());

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Greeting,
    CheckAvailability,
    BookRoom,
    CancelBooking,
    Amenities,
    Policies,
    Faq,
    General,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::CheckAvailability => "check_availability",
            Self::BookRoom => "book_room",
            Self::CancelBooking => "cancel_booking",
            Self::Amenities => "amenities",
            Self::Policies => "policies",
            Self::Faq => "faq",
            Self::General => "general",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "greeting" => Some(Self::Greeting),
            "check_availability" => Some(Self::CheckAvailability),
            "book_room" => Some(Self::BookRoom),
            "cancel_booking" => Some(Self::CancelBooking),
            "amenities" => Some(Self::Amenities),
            "policies" => Some(Self::Policies),
            "faq" => Some(Self::Faq),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entities {
    pub room_type: Option<String>,
    pub dates: Vec<String>,
    pub guest_name: Option<String>,
    pub booking_id: Option<String>,
    pub amenity: Option<String>,
    pub policy: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub intent: Intent,
    pub entities: Entities,
}

impl ClassifiedIntent {
    fn bare(intent: Intent) -> Self {
        Self { intent, entities: Entities::default() }
    }
}

/// Ordered keyword rules; the first rule that matches decides the intent.
#[derive(Clone, Copy, Debug, Default)]
pub struct IntentClassifier;

impl IntentClassifier {
    pub fn new() -> Self {
        Self
    }

    pub fn classify(&self, text: &str) -> ClassifiedIntent {
        let raw = text.trim();
        let lower = raw.to_lowercase();
        let words = words_of(&lower);

        if is_greeting(&lower, &words) {
            return ClassifiedIntent::bare(Intent::Greeting);
        }

        if let Some(room_type) = bare_room_type(&lower) {
            return ClassifiedIntent {
                intent: Intent::BookRoom,
                entities: Entities { room_type: Some(room_type), ..Entities::default() },
            };
        }

        if let Some(guest_name) = name_like(raw, &lower) {
            return ClassifiedIntent {
                intent: Intent::BookRoom,
                entities: Entities { guest_name: Some(guest_name), ..Entities::default() },
            };
        }

        if contains_any(&lower, &AVAILABILITY_PHRASES) {
            let dates = find_date_tokens(&lower).into_iter().map(|token| token.raw).collect();
            return ClassifiedIntent {
                intent: Intent::CheckAvailability,
                entities: Entities {
                    room_type: room_type_in(&lower),
                    dates,
                    ..Entities::default()
                },
            };
        }

        // Checked before cancellation, so "cancel my reservation" opens the booking dialogue.
        if contains_any(&lower, &BOOKING_PHRASES) {
            let guest_name = SELF_NAME_RE
                .captures(&lower)
                .map(|captures| title_case(captures[1].trim()))
                .filter(|name| !name.is_empty());
            return ClassifiedIntent {
                intent: Intent::BookRoom,
                entities: Entities {
                    room_type: room_type_in(&lower),
                    guest_name,
                    ..Entities::default()
                },
            };
        }

        if contains_any(&lower, &CANCEL_PHRASES) {
            let booking_id = BOOKING_ID_RE
                .captures(&lower)
                .or_else(|| BARE_BOOKING_ID_RE.captures(&lower))
                .map(|captures| captures[1].to_ascii_uppercase());
            return ClassifiedIntent {
                intent: Intent::CancelBooking,
                entities: Entities { booking_id, ..Entities::default() },
            };
        }

        if contains_any(&lower, &AMENITY_PHRASES) {
            return ClassifiedIntent {
                intent: Intent::Amenities,
                entities: Entities {
                    amenity: first_key(&lower, &AMENITY_KEYS),
                    ..Entities::default()
                },
            };
        }

        if contains_any(&lower, &POLICY_PHRASES) {
            return ClassifiedIntent {
                intent: Intent::Policies,
                entities: Entities {
                    policy: first_key(&lower, &POLICY_KEYS),
                    ..Entities::default()
                },
            };
        }

        if lower.contains('?') {
            return ClassifiedIntent::bare(Intent::Faq);
        }

        ClassifiedIntent::bare(Intent::General)
    }
}

fn words_of(lower: &str) -> Vec<&str> {
    lower
        .split(|character: char| !character.is_alphanumeric() && character != '\'')
        .filter(|word| !word.is_empty())
        .collect()
}

fn is_greeting(lower: &str, words: &[&str]) -> bool {
    words.iter().any(|word| GREETING_WORDS.contains(word)) || contains_any(lower, &GREETING_PHRASES)
}

/// A message that is a room type, or a short one that names one.
fn bare_room_type(lower: &str) -> Option<String> {
    if ROOM_TYPES.contains(&lower) || lower.split_whitespace().count() <= 3 {
        room_type_in(lower)
    } else {
        None
    }
}

fn room_type_in(lower: &str) -> Option<String> {
    ROOM_TYPES
        .iter()
        .find(|room_type| lower.contains(**room_type))
        .map(|room_type| (*room_type).to_owned())
}

/// Two to four alphabetic words with at least one capital, e.g. `Jane Doe`. Text that
/// already carries a keyword for a later rule is left to that rule.
fn name_like(raw: &str, lower: &str) -> Option<String> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    if !(2..=4).contains(&words.len()) {
        return None;
    }
    let alphabetic = words.iter().all(|word| {
        let letters: String = word.chars().filter(|character| *character != '\'').collect();
        !letters.is_empty() && letters.chars().all(char::is_alphabetic)
    });
    let capitalized =
        words.iter().any(|word| word.chars().next().is_some_and(char::is_uppercase));
    if !alphabetic || !capitalized || mentions_request(lower) {
        return None;
    }
    Some(title_case(raw))
}

fn mentions_request(lower: &str) -> bool {
    contains_any(lower, &AVAILABILITY_PHRASES)
        || contains_any(lower, &BOOKING_PHRASES)
        || contains_any(lower, &CANCEL_PHRASES)
        || contains_any(lower, &AMENITY_PHRASES)
        || contains_any(lower, &POLICY_PHRASES)
}

fn contains_any(lower: &str, phrases: &[&str]) -> bool {
    phrases.iter().any(|phrase| lower.contains(phrase))
}

fn first_key(lower: &str, keys: &[(&str, &str)]) -> Option<String> {
    keys.iter().find(|(keyword, _)| lower.contains(keyword)).map(|(_, key)| (*key).to_owned())
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(text: &str) -> String {
    let mut titled = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for character in text.chars() {
        if previous_is_letter {
            titled.extend(character.to_lowercase());
        } else {
            titled.extend(character.to_uppercase());
        }
        previous_is_letter = character.is_alphabetic();
    }
    titled
}

#[cfg(test)]
mod tests {
    use super::{title_case, Intent, IntentClassifier};

    #[test]
    fn rules_are_tried_in_order() {
        struct Case {
            text: &'static str,
            intent: Intent,
        }

        let cases = vec![
            Case { text: "Hello there", intent: Intent::Greeting },
            Case { text: "hey, do you have a pool?", intent: Intent::Greeting },
            Case { text: "good morning", intent: Intent::Greeting },
            Case { text: "king", intent: Intent::BookRoom },
            Case { text: "the executive one", intent: Intent::BookRoom },
            Case { text: "Jane Doe", intent: Intent::BookRoom },
            Case { text: "any rooms on oct 15?", intent: Intent::CheckAvailability },
            Case { text: "Do you have rooms", intent: Intent::CheckAvailability },
            Case { text: "I'd like to book a room for the weekend", intent: Intent::BookRoom },
            Case { text: "please cancel BK0003", intent: Intent::CancelBooking },
            Case { text: "tell me about the cancellation policy", intent: Intent::CancelBooking },
            Case { text: "is there a gym in the building", intent: Intent::Amenities },
            Case { text: "what time is checkout", intent: Intent::Policies },
            Case { text: "can I store my luggage after my stay?", intent: Intent::Faq },
            Case { text: "thanks so much for everything", intent: Intent::General },
        ];

        let classifier = IntentClassifier::new();
        for (index, case) in cases.iter().enumerate() {
            let classified = classifier.classify(case.text);
            assert_eq!(classified.intent, case.intent, "case {index}: {}", case.text);
        }
    }

    #[test]
    fn greeting_words_only_match_whole_words() {
        let classifier = IntentClassifier::new();
        assert_ne!(classifier.classify("this is about my stay").intent, Intent::Greeting);
        assert_ne!(classifier.classify("they said to ask you").intent, Intent::Greeting);
    }

    #[test]
    fn availability_carries_room_type_and_dates() {
        let classified =
            IntentClassifier::new().classify("Is a king room available oct 15 to 10/18?");

        assert_eq!(classified.intent, Intent::CheckAvailability);
        assert_eq!(classified.entities.room_type.as_deref(), Some("king"));
        assert_eq!(classified.entities.dates, vec!["oct 15", "10/18"]);
    }

    #[test]
    fn booking_extracts_self_introduced_name() {
        let classified =
            IntentClassifier::new().classify("I want to reserve a suite, my name is jane o'brien");

        assert_eq!(classified.intent, Intent::BookRoom);
        assert_eq!(classified.entities.room_type.as_deref(), Some("suite"));
        assert_eq!(classified.entities.guest_name.as_deref(), Some("Jane O'Brien"));
    }

    #[test]
    fn cancellation_id_needs_a_digit() {
        let classifier = IntentClassifier::new();

        let with_id = classifier.classify("cancel id #bk0012");
        assert_eq!(with_id.intent, Intent::CancelBooking);
        assert_eq!(with_id.entities.booking_id.as_deref(), Some("BK0012"));

        let bare = classifier.classify("cancel bk0007 please");
        assert_eq!(bare.entities.booking_id.as_deref(), Some("BK0007"));

        let without = classifier.classify("cancel for tomorrow");
        assert_eq!(without.intent, Intent::CancelBooking);
        assert_eq!(without.entities.booking_id, None);
    }

    #[test]
    fn booking_words_win_over_cancel_words() {
        let classifier = IntentClassifier::new();

        struct Case {
            text: &'static str,
            expected: Intent,
        }
        let cases = [
            Case { text: "cancel my reservation", expected: Intent::BookRoom },
            Case { text: "please cancel booking bk0001", expected: Intent::BookRoom },
            Case { text: "can I reserve a room?", expected: Intent::BookRoom },
            Case { text: "I need to cancel", expected: Intent::CancelBooking },
        ];

        for case in cases {
            assert_eq!(classifier.classify(case.text).intent, case.expected, "{}", case.text);
        }
    }

    #[test]
    fn amenity_and_policy_keys_use_first_keyword() {
        let classifier = IntentClassifier::new();

        let amenity = classifier.classify("is the internet fast");
        assert_eq!(amenity.intent, Intent::Amenities);
        assert_eq!(amenity.entities.amenity.as_deref(), Some("wifi"));

        let policy = classifier.classify("are pets allowed during check in");
        assert_eq!(policy.intent, Intent::Policies);
        assert_eq!(policy.entities.policy.as_deref(), Some("check_in"));
    }

    #[test]
    fn unknown_room_types_are_ignored() {
        let classified = IntentClassifier::new().classify("penthouse");
        assert_eq!(classified.intent, Intent::General);
        assert_eq!(classified.entities.room_type, None);
    }

    #[test]
    fn classification_is_deterministic() {
        let classifier = IntentClassifier::new();
        let first = classifier.classify("Any rooms available nov 2?");
        for _ in 0..5 {
            assert_eq!(classifier.classify("Any rooms available nov 2?"), first);
        }
    }

    #[test]
    fn title_case_capitalizes_each_run() {
        assert_eq!(title_case("mary-jane smith"), "Mary-Jane Smith");
        assert_eq!(Intent::parse(" Book_Room "), Some(Intent::BookRoom));
        assert_eq!(Intent::parse("weather"), None);
    }
}
