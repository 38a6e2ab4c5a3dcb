//! LLM-backed classification against any OpenAI-compatible chat endpoint.
//! The model is asked for one strict JSON object; anything that fails to
//! arrive, parse or validate degrades to the unknown intent so a flaky
//! upstream can never take the pipeline down with it.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::AUTHORIZATION;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use rota_core::intent::{Confidence, ExtractedIntent, Intent, WeekRef};
use rota_core::scope::ScopeMode;
use rota_core::IsoWeek;

use crate::classify::IntentClassifier;
use crate::config::LlmSettings;
use crate::resolve::{days, windows};

#[derive(Debug, Clone)]
pub struct LlmRequest {
    pub system: String,
    pub user: String,
    pub model: String,
    pub temperature: f32,
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("http error: {0}")]
    Http(String),
    #[error("response error: {0}")]
    Response(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError>;
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Deserialize)]
struct ChatMessageResponse {
    content: String,
}

/// Chat-completions client over reqwest. Auth header only when a key is
/// configured, which keeps local inference servers working out of the box.
pub struct HttpLlmClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: Option<String>,
}

impl HttpLlmClient {
    pub fn new(settings: &LlmSettings) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| LlmError::Http(e.to_string()))?;
        Ok(HttpLlmClient {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.api_key.clone(),
        })
    }
}

#[async_trait]
impl LlmClient for HttpLlmClient {
    async fn complete(&self, request: LlmRequest) -> Result<String, LlmError> {
        let body = ChatRequest {
            model: request.model,
            temperature: request.temperature,
            messages: vec![
                ChatMessage { role: "system".to_string(), content: request.system },
                ChatMessage { role: "user".to_string(), content: request.user },
            ],
        };

        let mut http_request = self.client.post(&self.endpoint).json(&body);
        if let Some(key) = &self.api_key {
            http_request = http_request.header(AUTHORIZATION, format!("Bearer {key}"));
        }

        let response = http_request
            .send()
            .await
            .map_err(|e| LlmError::Http(e.to_string()))?;
        if !response.status().is_success() {
            return Err(LlmError::Response(format!(
                "upstream returned {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Serialization(e.to_string()))?;
        parsed
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| LlmError::Response("no choices in response".to_string()))
    }
}

/// Pulls the first JSON object out of a completion that may be wrapped in
/// prose or a code fence.
pub fn extract_json(text: &str) -> Option<String> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| text[start..=end].to_string())
}

/// Fixed-response client for tests.
pub struct MockLlmClient {
    pub response: String,
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, _request: LlmRequest) -> Result<String, LlmError> {
        Ok(self.response.clone())
    }
}

/// What the model is asked to produce, one field per entity.
#[derive(Debug, Deserialize)]
struct IntentPayload {
    intent: String,
    #[serde(default)]
    confidence: Option<String>,
    #[serde(default)]
    employee: Option<String>,
    #[serde(default)]
    work_type: Option<String>,
    #[serde(default)]
    day: Option<String>,
    #[serde(default)]
    window: Option<String>,
    #[serde(default)]
    week: Option<String>,
    #[serde(default)]
    top_n: Option<u32>,
    #[serde(default)]
    scope: Option<String>,
}

pub struct LlmClassifier {
    client: Arc<dyn LlmClient>,
    settings: LlmSettings,
    system_prompt: String,
}

impl LlmClassifier {
    pub fn new(client: Arc<dyn LlmClient>, settings: LlmSettings) -> Self {
        let system_prompt = build_system_prompt();
        LlmClassifier { client, settings, system_prompt }
    }
}

#[async_trait]
impl IntentClassifier for LlmClassifier {
    async fn classify(&self, message: &str) -> ExtractedIntent {
        let request = LlmRequest {
            system: self.system_prompt.clone(),
            user: message.to_string(),
            model: self.settings.model.clone(),
            temperature: self.settings.temperature,
        };
        match self.client.complete(request).await {
            Ok(completion) => parse_completion(&completion).unwrap_or_else(|| {
                tracing::warn!("classifier returned unusable output, treating as unknown");
                ExtractedIntent::unknown()
            }),
            Err(error) => {
                tracing::warn!(error = %error, "classifier call failed, treating as unknown");
                ExtractedIntent::unknown()
            }
        }
    }
}

fn build_system_prompt() -> String {
    let intents = Intent::ALL
        .iter()
        .map(|intent| intent.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "You classify one message from a store manager about staff scheduling. \
         Messages may be English, Dutch or French.\n\
         Respond with exactly one JSON object and nothing else. Fields:\n\
         intent: one of [{intents}]\n\
         confidence: high | medium | low\n\
         employee: name text, only if the message names a person\n\
         work_type: role text, only if the message names a role\n\
         day: MON | TUE | WED | THU | FRI | SAT | SUN\n\
         window: HH:MM-HH:MM\n\
         week: this | last | next | an ISO week like 2025-W41\n\
         top_n: integer, only for ranked lists\n\
         scope: home_only | all_managed, only for scope changes\n\
         Omit every field that does not apply. Never invent entities."
    )
}

fn parse_completion(completion: &str) -> Option<ExtractedIntent> {
    let json = extract_json(completion)?;
    let payload: IntentPayload = serde_json::from_str(&json).ok()?;
    let intent = Intent::ALL
        .into_iter()
        .find(|intent| intent.as_str() == payload.intent.trim())?;

    let confidence = match payload.confidence.as_deref() {
        Some("high") => Confidence::High,
        Some("low") => Confidence::Low,
        _ => Confidence::Medium,
    };

    let mut extracted = ExtractedIntent::new(intent, confidence);
    extracted.employee_text = non_empty(payload.employee);
    extracted.work_type_text = non_empty(payload.work_type);
    extracted.day = payload.day.as_deref().and_then(days::parse_day_token);
    extracted.window = payload.window.as_deref().and_then(windows::parse_range);
    extracted.week = payload.week.as_deref().and_then(parse_week_field);
    extracted.top_n = payload.top_n.filter(|n| *n > 0);
    extracted.scope_mode = payload
        .scope
        .as_deref()
        .and_then(|tag| tag.parse::<ScopeMode>().ok());
    Some(extracted)
}

fn parse_week_field(text: &str) -> Option<WeekRef> {
    let trimmed = text.trim();
    match trimmed.to_ascii_lowercase().as_str() {
        "this" => Some(WeekRef::This),
        "last" => Some(WeekRef::Last),
        "next" => Some(WeekRef::Next),
        // Week keys use an uppercase W; models sometimes write a lowercase one.
        _ => trimmed
            .to_ascii_uppercase()
            .parse::<IsoWeek>()
            .ok()
            .map(WeekRef::Explicit),
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rota_core::Weekday;

    struct FailingClient;

    #[async_trait]
    impl LlmClient for FailingClient {
        async fn complete(&self, _request: LlmRequest) -> Result<String, LlmError> {
            Err(LlmError::Http("connection refused".to_string()))
        }
    }

    fn classifier_with(response: &str) -> LlmClassifier {
        LlmClassifier::new(
            Arc::new(MockLlmClient { response: response.to_string() }),
            LlmSettings::default(),
        )
    }

    #[tokio::test]
    async fn well_formed_completion_becomes_an_intent() {
        let classifier = classifier_with(
            r#"{"intent":"availability-on-day","confidence":"high","day":"FRI","window":"08:00-12:00"}"#,
        );
        let extracted = classifier.classify("Who is available Friday morning?").await;
        assert_eq!(extracted.intent, Intent::AvailabilityOnDay);
        assert_eq!(extracted.day, Some(Weekday::Fri));
        assert_eq!(
            extracted.window.map(|w| (w.start_minute, w.end_minute)),
            Some((480, 720))
        );
    }

    #[tokio::test]
    async fn fenced_json_is_still_parsed() {
        let classifier = classifier_with(
            "Here you go:\n```json\n{\"intent\":\"hours-top-n\",\"top_n\":3}\n```",
        );
        let extracted = classifier.classify("top 3").await;
        assert_eq!(extracted.intent, Intent::HoursTopN);
        assert_eq!(extracted.top_n, Some(3));
    }

    #[tokio::test]
    async fn unknown_intent_tag_degrades_to_unknown() {
        let classifier = classifier_with(r#"{"intent":"make-coffee"}"#);
        let extracted = classifier.classify("whatever").await;
        assert_eq!(extracted.intent, Intent::Unknown);
        assert_eq!(extracted.confidence, Confidence::Low);
    }

    #[tokio::test]
    async fn prose_without_json_degrades_to_unknown() {
        let classifier = classifier_with("I think the manager wants hours.");
        let extracted = classifier.classify("hours?").await;
        assert_eq!(extracted.intent, Intent::Unknown);
    }

    #[tokio::test]
    async fn transport_failure_degrades_to_unknown() {
        let classifier = LlmClassifier::new(Arc::new(FailingClient), LlmSettings::default());
        let extracted = classifier.classify("Who works friday?").await;
        assert_eq!(extracted.intent, Intent::Unknown);
    }

    #[test]
    fn extract_json_spans_first_to_last_brace() {
        assert_eq!(extract_json("x {\"a\":1} y"), Some("{\"a\":1}".to_string()));
        assert_eq!(extract_json("no braces"), None);
        assert_eq!(extract_json("} reversed {"), None);
    }

    #[test]
    fn explicit_week_field_parses() {
        match parse_week_field("2025-W41") {
            Some(WeekRef::Explicit(week)) => assert_eq!(week.to_string(), "2025-W41"),
            other => panic!("expected explicit week, got {other:?}"),
        }
        assert_eq!(parse_week_field("last"), Some(WeekRef::Last));
        assert_eq!(parse_week_field("someday"), None);
    }
}
