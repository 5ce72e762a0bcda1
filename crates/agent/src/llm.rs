use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;
use tracing::warn;

use crate::conversation::{ClassifiedIntent, Entities, Intent, IntentClassifier};

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Asks a language model for the intent and drops back to the keyword rules whenever the
/// model fails or answers with something unusable.
#[derive(Clone)]
pub struct LlmIntentClassifier {
    client: Arc<dyn LlmClient>,
    fallback: IntentClassifier,
}

impl LlmIntentClassifier {
    pub fn new(client: Arc<dyn LlmClient>) -> Self {
        Self { client, fallback: IntentClassifier::new() }
    }

    pub fn prompt(message: &str) -> String {
        format!(
            "Analyze this hotel guest message and extract:\n\
             1. Intent: greeting, check_availability, book_room, cancel_booking, amenities, \
             policies, faq, or general\n\
             2. Entities: guest_name, room_type, dates, booking_id, amenity, policy, etc.\n\n\
             Guest message: \"{message}\"\n\n\
             Respond in JSON format:\n\
             {{\"intent\": \"...\", \"entities\": {{...}}}}"
        )
    }

    pub async fn classify(&self, text: &str) -> ClassifiedIntent {
        match self.client.complete(&Self::prompt(text)).await {
            Ok(answer) => match parse_answer(&answer) {
                Some(classified) => classified,
                None => {
                    warn!(
                        event_name = "agent.llm_unusable_answer",
                        answer_len = answer.len(),
                        "llm answer was not an intent, using keyword rules"
                    );
                    self.fallback.classify(text)
                }
            },
            Err(error) => {
                warn!(
                    event_name = "agent.llm_failed",
                    error = %error,
                    "llm intent detection failed, using keyword rules"
                );
                self.fallback.classify(text)
            }
        }
    }
}

/// Reads `{"intent": .., "entities": {..}}`, tolerating prose or code fences around it.
fn parse_answer(answer: &str) -> Option<ClassifiedIntent> {
    let start = answer.find('{')?;
    let end = answer.rfind('}')?;
    let value: Value = serde_json::from_str(answer.get(start..=end)?).ok()?;
    let intent = value.get("intent").and_then(Value::as_str).and_then(Intent::parse)?;

    let empty = Value::Null;
    let entities = value.get("entities").unwrap_or(&empty);
    let text = |key: &str| {
        entities
            .get(key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };
    let dates = match entities.get("dates") {
        Some(Value::Array(items)) => {
            items.iter().filter_map(Value::as_str).map(str::to_owned).collect()
        }
        Some(Value::String(single)) if !single.trim().is_empty() => vec![single.clone()],
        _ => Vec::new(),
    };

    Some(ClassifiedIntent {
        intent,
        entities: Entities {
            room_type: text("room_type").map(|room_type| room_type.to_lowercase()),
            dates,
            guest_name: text("guest_name"),
            booking_id: text("booking_id").map(|id| id.to_ascii_uppercase()),
            amenity: text("amenity"),
            policy: text("policy"),
        },
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use anyhow::{anyhow, Result};
    use async_trait::async_trait;

    use super::{LlmClient, LlmIntentClassifier};
    use crate::conversation::Intent;

    struct Canned(Result<String, String>);

    #[async_trait]
    impl LlmClient for Canned {
        async fn complete(&self, prompt: &str) -> Result<String> {
            assert!(prompt.contains("Guest message:"));
            self.0.clone().map_err(|error| anyhow!(error))
        }
    }

    fn classifier(answer: Result<&str, &str>) -> LlmIntentClassifier {
        let answer = answer.map(str::to_owned).map_err(str::to_owned);
        LlmIntentClassifier::new(Arc::new(Canned(answer)))
    }

    #[tokio::test]
    async fn model_answer_is_used_when_it_names_an_intent() {
        let answer = concat!(
            "```json\n",
            r#"{"intent": "cancel_booking", "#,
            r#""entities": {"booking_id": "bk0004", "dates": "oct 3"}}"#,
            "\n```"
        );
        let classified = classifier(Ok(answer)).classify("I need to drop my stay").await;

        assert_eq!(classified.intent, Intent::CancelBooking);
        assert_eq!(classified.entities.booking_id.as_deref(), Some("BK0004"));
        assert_eq!(classified.entities.dates, vec!["oct 3"]);
    }

    #[tokio::test]
    async fn unusable_answers_fall_back_to_keyword_rules() {
        let prose =
            classifier(Ok("I think the guest wants a pool")).classify("is the pool open").await;
        assert_eq!(prose.intent, Intent::Amenities);
        assert_eq!(prose.entities.amenity.as_deref(), Some("pool"));

        let unknown =
            classifier(Ok("{\"intent\": \"weather\"}")).classify("what time is checkout").await;
        assert_eq!(unknown.intent, Intent::Policies);
    }

    #[tokio::test]
    async fn client_errors_fall_back_to_keyword_rules() {
        let classified = classifier(Err("connection reset")).classify("hello").await;
        assert_eq!(classified.intent, Intent::Greeting);
    }
}
