use crate::config::Config;
use crate::error::ConfigError;
use crate::models::PromptRequest;
use crate::prompts::{INPUT_KEY, USER_TEMPLATE};
use async_trait::async_trait;
use serde::{de::IgnoredAny, Deserialize};
use serde_json::{json, Value};
use thiserror::Error;
use reqwest::Client;
use std::time::Duration;
use tracing::{info, debug, error, warn};

#[derive(Debug, Error)]
pub enum GeminiError {
    #[error("HTTP error: {0}")] Http(String),
    #[error("API error (status {status}): {body}")] Api { status: u16, body: String },
}

/// Anything that can turn a prompt into raw model text.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, request: &PromptRequest) -> Result<String, GeminiError>;
}

pub struct GeminiClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    temperature: f32,
}

impl GeminiClient {
    pub fn new(config: &Config) -> Result<Self, ConfigError> {
        if config.api_key.trim().is_empty() {
            return Err(ConfigError::MissingVar(crate::config::API_KEY_VAR));
        }
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| ConfigError::HttpClient(e.to_string()))?;
        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.api_base.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            temperature: config.temperature,
        })
    }

    pub fn model(&self) -> &str { &self.model }

    /// Fills `user_template` from `values`, sends it with `system` and returns the reply text.
    pub async fn run(&self, system: &str, user_template: &str, values: &[(&str, &str)]) -> Result<String, GeminiError> {
        let user = render_template(user_template, values);
        let url = format!("{}/models/{}:generateContent?key={}", self.base_url, self.model, self.api_key);

        info!("🔗 Making request to: {}", url.replace(&self.api_key, "***"));

        let payload = json!({
            "systemInstruction": {
                "parts": [{"text": system}]
            },
            "contents": [{
                "role": "user",
                "parts": [{"text": user}]
            }],
            "generationConfig": {
                "temperature": self.temperature,
                "candidateCount": 1
            }
        });

        let response = self.client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|e| GeminiError::Http(redact(&e.to_string(), &self.api_key)))?;

        let status = response.status();
        let body = response.text().await
            .map_err(|e| GeminiError::Http(redact(&e.to_string(), &self.api_key)))?;
        info!("📥 Response status: {}", status);

        if !status.is_success() {
            error!("❌ Gemini API text generation failed with status {}: {}", status, body);
            return Err(GeminiError::Api { status: status.as_u16(), body });
        }

        let text = reply_text(&body);
        debug!("📥 Reply text ({} chars): {}", text.len(), truncate(&text, 500));
        Ok(text)
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, request: &PromptRequest) -> Result<String, GeminiError> {
        self.run(&request.system, USER_TEMPLATE, &[(INPUT_KEY, request.user.as_str())]).await
    }
}

/// Single-pass `{name}` substitution. `{{` and `}}` are literal braces,
/// unknown placeholders stay verbatim and substituted text is never rescanned.
pub fn render_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(pos) = rest.find(|c: char| c == '{' || c == '}') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with("{{") || tail.starts_with("}}") {
            out.push_str(&tail[..1]);
            rest = &tail[2..];
            continue;
        }
        if tail.starts_with('{') {
            if let Some(end) = tail.find('}') {
                let key = &tail[1..end];
                if let Some((_, value)) = values.iter().find(|(k, _)| *k == key) {
                    out.push_str(value);
                    rest = &tail[end + 1..];
                    continue;
                }
                warn!("⚠️ No value for placeholder '{{{}}}', leaving it as-is", key);
            }
        }
        out.push_str(&tail[..1]);
        rest = &tail[1..];
    }
    out.push_str(rest);
    out
}

// --- Response Parsing Helpers ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)] content: Content,
    #[serde(default)] finish_reason: Option<String>,
}

#[derive(Debug, Deserialize, Default)]
struct Content { #[serde(default)] parts: Vec<Part> }

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    Other(IgnoredAny),
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    #[serde(default)] block_reason: Option<String>,
}

/// Normalizes whatever the backend returned into plain text. Never fails.
/// A Gemini envelope without text parts yields a short notice naming the
/// block/finish reason, never the envelope itself; other unrecognized
/// shapes come back as the raw body.
pub fn reply_text(body: &str) -> String {
    let value = match serde_json::from_str::<Value>(body) {
        Ok(value) => value,
        Err(_) => return body.to_string(),
    };
    let is_envelope = value.as_object()
        .is_some_and(|map| map.contains_key("candidates") || map.contains_key("promptFeedback"));
    if is_envelope {
        return match serde_json::from_value::<GeminiResponse>(value) {
            Ok(parsed) => envelope_text(&parsed),
            Err(e) => {
                warn!("⚠️ Unreadable Gemini envelope: {}", e);
                "Model returned no text.".to_string()
            }
        };
    }
    match value {
        Value::String(s) => s,
        Value::Object(map) => match map.get("content") {
            Some(Value::String(s)) => s.clone(),
            _ => body.to_string(),
        },
        _ => body.to_string(),
    }
}

fn envelope_text(resp: &GeminiResponse) -> String {
    let texts: Vec<&str> = resp.candidates.iter()
        .flat_map(|c| c.content.parts.iter())
        .filter_map(|p| match p { Part::Text { text } => Some(text.as_str()), Part::Other(_) => None })
        .collect();
    if !texts.is_empty() {
        return texts.concat();
    }

    let reason = resp.prompt_feedback.as_ref()
        .and_then(|f| f.block_reason.as_deref())
        .map(|r| format!("blockReason: {r}"))
        .or_else(|| resp.candidates.iter()
            .find_map(|c| c.finish_reason.as_deref())
            .map(|r| format!("finishReason: {r}")));
    warn!("⚠️ Gemini reply carried no text ({})", reason.as_deref().unwrap_or("no reason given"));
    match reason {
        Some(reason) => format!("Model returned no text ({reason})."),
        None => "Model returned no text.".to_string(),
    }
}

fn redact(message: &str, secret: &str) -> String {
    if secret.is_empty() { message.to_string() } else { message.replace(secret, "***") }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StylistError;
    use crate::extract::extract_array;
    use crate::models::Preferences;
    use crate::pipeline::recommend;
    use pretty_assertions::assert_eq;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base: &str) -> Config {
        Config {
            api_key: "test-key".into(),
            api_base: base.into(),
            model: "gemini-2.5-flash".into(),
            temperature: 0.7,
            timeout_secs: 5,
            port: 0,
        }
    }

    #[test]
    fn empty_key_fails_at_construction() {
        let mut cfg = config("http://localhost");
        cfg.api_key = String::new();
        assert!(matches!(GeminiClient::new(&cfg), Err(ConfigError::MissingVar(_))));
    }

    #[test]
    fn template_substitutes_known_keys_once() {
        assert_eq!(render_template("{input}", &[("input", "a {input} b")]), "a {input} b");
        assert_eq!(render_template("x={x}, y={y}", &[("x", "1")]), "x=1, y={y}");
        assert_eq!(render_template("{{literal}} {x}", &[("x", "ok")]), "{literal} ok");
        assert_eq!(render_template("lone { and }", &[]), "lone { and }");
    }

    #[test]
    fn reply_text_reads_candidate_parts() {
        let body = r#"{"candidates":[{"content":{"parts":[{"text":"[1,"},{"text":"2]"}],"role":"model"}}]}"#;
        assert_eq!(reply_text(body), "[1,2]");
    }

    #[test]
    fn reply_text_accepts_plain_string_and_content_field() {
        assert_eq!(reply_text(r#""hello""#), "hello");
        assert_eq!(reply_text(r#"{"content": "from content"}"#), "from content");
    }

    #[test]
    fn reply_text_falls_back_to_raw_body() {
        assert_eq!(reply_text("not json at all"), "not json at all");
        assert_eq!(reply_text(r#"{"answer": [1, 2]}"#), r#"{"answer": [1, 2]}"#);
        assert_eq!(reply_text("42"), "42");
    }

    #[test]
    fn blocked_prompt_never_exposes_the_envelope() {
        let body = r#"{"promptFeedback":{"blockReason":"SAFETY","safetyRatings":[
            {"category":"HARM_CATEGORY_HARASSMENT","probability":"HIGH"},
            {"category":"HARM_CATEGORY_HATE_SPEECH","probability":"NEGLIGIBLE"}]}}"#;
        let text = reply_text(body);
        assert_eq!(text, "Model returned no text (blockReason: SAFETY).");
        assert!(matches!(extract_array(&text), Err(StylistError::NoStructuredPayload { .. })));
    }

    #[test]
    fn truncated_candidate_without_parts_is_no_payload() {
        let body = r#"{"candidates":[{"finishReason":"MAX_TOKENS","index":0}],"usageMetadata":{"promptTokenCount":512}}"#;
        let text = reply_text(body);
        assert_eq!(text, "Model returned no text (finishReason: MAX_TOKENS).");
        assert!(matches!(extract_array(&text), Err(StylistError::NoStructuredPayload { .. })));

        assert_eq!(reply_text(r#"{"candidates": []}"#), "Model returned no text.");
    }

    #[test]
    fn non_text_parts_are_skipped() {
        let body = r#"{"candidates":[{"content":{"parts":[{"inlineData":{"mimeType":"image/png","data":"AAAA"}},{"text":"[]"}]}}]}"#;
        assert_eq!(reply_text(body), "[]");
    }

    #[tokio::test]
    async fn blocked_reply_from_backend_reaches_pipeline_as_no_payload() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "promptFeedback": {"blockReason": "SAFETY", "safetyRatings": [{"category": "X", "probability": "HIGH"}]}
            })))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri())).unwrap();
        let err = recommend(&client, &Preferences::default()).await.unwrap_err();
        match err {
            StylistError::NoStructuredPayload { raw } => assert!(raw.contains("SAFETY")),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn sends_system_user_and_temperature() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(query_param("key", "test-key"))
            .and(body_partial_json(json!({
                "systemInstruction": {"parts": [{"text": "be a stylist"}]},
                "contents": [{"role": "user", "parts": [{"text": "suggest outfits"}]}],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "candidates": [{"content": {"parts": [{"text": "[]"}]}}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri())).unwrap();
        let request = PromptRequest { system: "be a stylist".into(), user: "suggest outfits".into() };
        let text = client.generate(&request).await.unwrap();
        assert_eq!(text, "[]");
    }

    #[tokio::test]
    async fn non_success_status_is_an_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
            .mount(&server)
            .await;

        let client = GeminiClient::new(&config(&server.uri())).unwrap();
        let err = client.run("sys", "{input}", &[("input", "hi")]).await.unwrap_err();
        match err {
            GeminiError::Api { status, body } => {
                assert_eq!(status, 403);
                assert_eq!(body, "API key not valid");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_http_error() {
        // Nothing listens on port 9 on the test host.
        let client = GeminiClient::new(&config("http://127.0.0.1:9")).unwrap();
        let err = client.run("sys", "{input}", &[("input", "hi")]).await.unwrap_err();
        assert!(matches!(err, GeminiError::Http(_)));
    }
}
