//! Heuristic extraction of booking details from free text.
//!
//! Everything here is regex driven and deliberately forgiving. The dialogue engine only
//! sees [`ParsedMessage`] and [`ContactDetails`], so a smarter parser can be swapped in
//! behind [`MessageParser`] without touching the state machine.

use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Room-type vocabulary recognised when a guest picks a room, in priority order.
pub const ROOM_KEYWORDS: [&str; 7] =
    ["queen", "king", "suite", "executive", "accessible", "standard", "deluxe"];

const MONTH_ALTERNATION: &str = "jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec";

static GUESTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:guest|people|person)").unwrap());
static LEADING_NUMBER_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(\d+)").unwrap());
static NIGHTS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(\d+)\s*(?:night|day)").unwrap());
static MONTH_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\b({MONTH_ALTERNATION})[a-z]*\.?\s*(\d{{1,2}})(?:st|nd|rd|th)?\b"))
        .unwrap()
});
static DAY_FIRST_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"\b(\d{{1,2}})(?:st|nd|rd|th)?\s+(?:of\s+)?({MONTH_ALTERNATION})[a-z]*\b"
    ))
    .unwrap()
});
static NUMERIC_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{1,2})[/-](\d{1,2})\b").unwrap());
static ISO_DATE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(\d{4})-(\d{2})-(\d{2})\b").unwrap());
static PHONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[+\d][\d\s\-()]{8,}").unwrap());
static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+\.\w+").unwrap());
static PAYMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)payment:\s*(.+?)\s*\*{4}(\d{4})").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

const RANGE_SEPARATORS: [&str; 5] = [" till ", " to ", " - ", " through ", " until "];

/// Numbered entries of the greeting menu.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuOption {
    CheckAvailability,
    BookReservation,
    CancelReservation,
    Amenities,
    Policies,
}

impl MenuOption {
    pub fn number(&self) -> u8 {
        match self {
            Self::CheckAvailability => 1,
            Self::BookReservation => 2,
            Self::CancelReservation => 3,
            Self::Amenities => 4,
            Self::Policies => 5,
        }
    }

    fn from_number(number: u8) -> Option<Self> {
        match number {
            1 => Some(Self::CheckAvailability),
            2 => Some(Self::BookReservation),
            3 => Some(Self::CancelReservation),
            4 => Some(Self::Amenities),
            5 => Some(Self::Policies),
            _ => None,
        }
    }

    /// Matches `N`, `N.`, `option N` and the availability shortcuts.
    pub fn detect(text: &str) -> Option<Self> {
        let normalized = text.trim().to_lowercase();
        if matches!(normalized.as_str(), "check rooms" | "check availability" | "availability") {
            return Some(Self::CheckAvailability);
        }

        let digits = normalized
            .strip_prefix("option ")
            .or_else(|| normalized.strip_suffix('.'))
            .unwrap_or(&normalized);
        if digits.len() != 1 {
            return None;
        }
        digits.parse::<u8>().ok().and_then(Self::from_number)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthDay {
    pub month: u32,
    pub day: u32,
}

impl MonthDay {
    pub fn new(month: u32, day: u32) -> Option<Self> {
        ((1..=12).contains(&month) && (1..=31).contains(&day)).then_some(Self { month, day })
    }

    /// The next occurrence on or after `today`: this year, or next year once it has passed.
    pub fn resolve(&self, today: NaiveDate) -> Option<NaiveDate> {
        let this_year = NaiveDate::from_ymd_opt(today.year(), self.month, self.day);
        match this_year {
            Some(date) if date >= today => Some(date),
            _ => NaiveDate::from_ymd_opt(today.year() + 1, self.month, self.day),
        }
    }
}

/// A date mention found in text, with the text it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateToken {
    pub raw: String,
    pub month_day: MonthDay,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParsedMessage {
    pub menu_option: Option<MenuOption>,
    /// Count from an explicit `N guests|people|person` phrase.
    pub guests: Option<u32>,
    pub leading_number: Option<u32>,
    pub nights: Option<u32>,
    pub dates: Vec<DateToken>,
    pub room_keyword: Option<String>,
}

impl ParsedMessage {
    /// Explicit guest phrase first, then a bare number opening the message.
    pub fn guest_count(&self) -> Option<u32> {
        self.guests.or(self.leading_number)
    }

    /// Shape of the booking widget's one-line submission.
    pub fn has_stay_details(&self) -> bool {
        self.guests.is_some() && !self.dates.is_empty()
    }

    pub fn is_stay_correction(&self) -> bool {
        self.guests.is_some() || self.nights.is_some()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PaymentCard {
    pub holder: String,
    pub last4: String,
}

impl PaymentCard {
    pub fn masked(&self) -> String {
        format!("{} ****{}", self.holder, self.last4)
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ContactDetails {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
    pub payment: Option<PaymentCard>,
    pub special_requests: Option<String>,
}

pub trait MessageParser: Send + Sync {
    fn parse(&self, text: &str) -> ParsedMessage;
    fn parse_contact(&self, text: &str) -> ContactDetails;
}

#[derive(Clone, Copy, Debug, Default)]
pub struct RuleBasedParser;

impl MessageParser for RuleBasedParser {
    fn parse(&self, text: &str) -> ParsedMessage {
        let lower = text.trim().to_lowercase();

        ParsedMessage {
            menu_option: MenuOption::detect(&lower),
            guests: capture_number(&GUESTS_RE, &lower),
            leading_number: capture_number(&LEADING_NUMBER_RE, &lower),
            nights: capture_number(&NIGHTS_RE, &lower),
            dates: find_date_tokens(&lower),
            room_keyword: room_keyword(&lower).map(str::to_owned),
        }
    }

    fn parse_contact(&self, text: &str) -> ContactDetails {
        let phone = PHONE_RE.find(text).map(|found| found.as_str().trim().to_owned());
        let email = EMAIL_RE.find(text).map(|found| found.as_str().to_owned());
        let payment_match = PAYMENT_RE.captures(text);
        let payment = payment_match.as_ref().map(|captures| PaymentCard {
            holder: captures[1].trim().to_owned(),
            last4: captures[2].to_owned(),
        });

        let name = match text.split_once(',') {
            Some((head, _)) => head.trim().to_owned(),
            None => match &phone {
                Some(phone) => {
                    text.split(phone.as_str()).next().unwrap_or_default().trim().to_owned()
                }
                None => text.trim().to_owned(),
            },
        };
        let name = (!name.is_empty()).then_some(name);

        let mut remainder = text.to_owned();
        if let Some(name) = &name {
            remainder = remainder.replacen(name.as_str(), "", 1);
        }
        if let Some(email) = &email {
            remainder = remainder.replace(email.as_str(), "");
        }
        if let Some(phone) = &phone {
            remainder = remainder.replace(phone.as_str(), "");
        }
        if let Some(captures) = &payment_match {
            remainder = remainder.replace(&captures[0], "");
        }
        let remainder = remainder.replace(',', "");
        let special_requests = WHITESPACE_RE.replace_all(remainder.trim(), " ").into_owned();

        ContactDetails {
            name,
            phone,
            email,
            payment,
            special_requests: (!special_requests.is_empty()).then_some(special_requests),
        }
    }
}

/// First vocabulary keyword contained in `lower`, honouring [`ROOM_KEYWORDS`] order.
pub fn room_keyword(lower: &str) -> Option<&'static str> {
    ROOM_KEYWORDS.iter().copied().find(|keyword| lower.contains(keyword))
}

/// Month/day mentions (`Oct 15`, `october 15th`, `10/15`) in order of appearance.
pub fn find_date_tokens(lower: &str) -> Vec<DateToken> {
    let mut found: Vec<(usize, DateToken)> = Vec::new();

    for captures in MONTH_FIRST_RE.captures_iter(lower) {
        let (Some(whole), Some(month), Ok(day)) =
            (captures.get(0), month_number(&captures[1]), captures[2].parse::<u32>())
        else {
            continue;
        };
        if let Some(month_day) = MonthDay::new(month, day) {
            found.push((whole.start(), DateToken { raw: whole.as_str().to_owned(), month_day }));
        }
    }

    for captures in NUMERIC_DATE_RE.captures_iter(lower) {
        let (Some(whole), Ok(month), Ok(day)) =
            (captures.get(0), captures[1].parse::<u32>(), captures[2].parse::<u32>())
        else {
            continue;
        };
        if let Some(month_day) = MonthDay::new(month, day) {
            found.push((whole.start(), DateToken { raw: whole.as_str().to_owned(), month_day }));
        }
    }

    found.sort_by_key(|(start, _)| *start);
    found.into_iter().map(|(_, token)| token).collect()
}

/// Parses `2026-11-02`, `2nd november`, `nov 2nd` or `november 2` into a date on or
/// after `today`.
pub fn parse_calendar_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let lower = text.trim().to_lowercase();
    if lower.is_empty() {
        return None;
    }

    if let Some(captures) = ISO_DATE_RE.captures(&lower) {
        let year = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let day = captures[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    if let Some(captures) = DAY_FIRST_RE.captures(&lower) {
        let day = captures[1].parse().ok()?;
        let month = month_number(&captures[2])?;
        return MonthDay::new(month, day)?.resolve(today);
    }

    find_date_tokens(&lower).first().and_then(|token| token.month_day.resolve(today))
}

/// Splits `nov 2 to nov 5` style ranges on the first known separator. A lone date yields
/// only a start.
pub fn parse_date_range(text: &str, today: NaiveDate) -> (Option<NaiveDate>, Option<NaiveDate>) {
    let lower = text.trim().to_lowercase();

    for separator in RANGE_SEPARATORS {
        if let Some((start, end)) = lower.split_once(separator) {
            if end.contains(separator) {
                continue;
            }
            return (parse_calendar_date(start, today), parse_calendar_date(end, today));
        }
    }

    (parse_calendar_date(&lower, today), None)
}

fn month_number(name: &str) -> Option<u32> {
    let prefix = name.get(..3)?;
    MONTH_ALTERNATION.split('|').position(|month| month == prefix).map(|index| index as u32 + 1)
}

fn capture_number(pattern: &Regex, text: &str) -> Option<u32> {
    pattern.captures(text).and_then(|captures| captures[1].parse().ok())
}
