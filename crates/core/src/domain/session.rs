use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::room::Room;
use crate::flows::DialogueStep;

/// Booking fields accumulated across dialogue turns.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BookingScratch {
    pub guests: Option<u32>,
    pub nights: Option<u32>,
    pub check_in: Option<NaiveDate>,
    pub check_out: Option<NaiveDate>,
    pub candidates: Vec<Room>,
    pub selected: Option<Room>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConversationSession {
    pub id: String,
    pub step: DialogueStep,
    pub scratch: BookingScratch,
    pub created_at: DateTime<Utc>,
    pub last_active_at: DateTime<Utc>,
}

impl ConversationSession {
    pub fn new(id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            step: DialogueStep::Idle,
            scratch: BookingScratch::default(),
            created_at: now,
            last_active_at: now,
        }
    }

    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_active_at = now;
    }

    pub fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        now - self.last_active_at >= ttl
    }

    pub fn reset(&mut self) {
        self.step = DialogueStep::Idle;
        self.scratch = BookingScratch::default();
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallDirection {
    Inbound,
    Outbound,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallStatus {
    Active,
    Ended,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSession {
    pub id: String,
    pub call_id: Option<String>,
    pub phone_number: String,
    pub direction: CallDirection,
    pub guest_name: Option<String>,
    pub purpose: Option<String>,
    pub status: CallStatus,
    pub started_at: DateTime<Utc>,
    pub ended_at: Option<DateTime<Utc>>,
    pub summary: Option<String>,
}

impl CallSession {
    pub fn new(
        id: impl Into<String>,
        call_id: Option<String>,
        phone_number: impl Into<String>,
        direction: CallDirection,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            call_id,
            phone_number: phone_number.into(),
            direction,
            guest_name: None,
            purpose: None,
            status: CallStatus::Active,
            started_at,
            ended_at: None,
            summary: None,
        }
    }

    pub fn with_guest(mut self, guest_name: Option<String>, purpose: Option<String>) -> Self {
        self.guest_name = guest_name;
        self.purpose = purpose;
        self
    }

    pub fn end(&mut self, ended_at: DateTime<Utc>, summary: Option<String>) {
        self.status = CallStatus::Ended;
        self.ended_at = Some(ended_at);
        if summary.is_some() {
            self.summary = summary;
        }
    }
}
