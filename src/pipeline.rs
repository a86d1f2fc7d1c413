use tracing::info;

use crate::error::StylistError;
use crate::extract::extract_array;
use crate::gemini::TextGenerator;
use crate::models::{OutfitRecord, Preferences};
use crate::normalize::normalize;
use crate::prompts::build_prompt;

/// One "Generate" action: prompt, a single backend call, extraction, normalization.
pub async fn recommend(generator: &dyn TextGenerator, prefs: &Preferences) -> Result<Vec<OutfitRecord>, StylistError> {
    let request = build_prompt(prefs);
    info!("🎯 Requesting outfits for {} / {} / {}", prefs.gender, prefs.country, prefs.body_shape);

    let raw = generator.generate(&request).await?;
    let elements = extract_array(&raw)?;
    let outfits = normalize(elements);

    info!("✅ {} outfits ready", outfits.len());
    Ok(outfits)
}

#[cfg(test)]
pub(crate) mod testing {
    use async_trait::async_trait;
    use std::sync::Mutex;

    use crate::gemini::{GeminiError, TextGenerator};
    use crate::models::PromptRequest;

    /// Replies with canned text and remembers the last request it saw.
    pub struct CannedGenerator {
        reply: Result<String, (u16, String)>,
        pub last_request: Mutex<Option<PromptRequest>>,
    }

    impl CannedGenerator {
        pub fn replying(text: &str) -> Self {
            Self { reply: Ok(text.to_string()), last_request: Mutex::new(None) }
        }

        pub fn failing(status: u16, body: &str) -> Self {
            Self { reply: Err((status, body.to_string())), last_request: Mutex::new(None) }
        }
    }

    #[async_trait]
    impl TextGenerator for CannedGenerator {
        async fn generate(&self, request: &PromptRequest) -> Result<String, GeminiError> {
            *self.last_request.lock().unwrap() = Some(request.clone());
            match &self.reply {
                Ok(text) => Ok(text.clone()),
                Err((status, body)) => Err(GeminiError::Api { status: *status, body: body.clone() }),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::CannedGenerator;
    use super::*;
    use crate::models::TotalPrice;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn reply_with_prose_yields_records() {
        let generator = CannedGenerator::replying(
            "Here you go:\n[{\"outfit_name\": \"Casual Friday\", \"items\": [{\"category\": \"Top\", \"name\": \"Polo\", \"price\": 25}], \"total_price\": 25}]\nEnjoy!",
        );
        let outfits = recommend(&generator, &Preferences::default()).await.unwrap();
        assert_eq!(outfits.len(), 1);
        assert_eq!(outfits[0].outfit_name, "Casual Friday");
        assert_eq!(outfits[0].total_price, TotalPrice::Amount(25.0));

        let sent = generator.last_request.lock().unwrap().clone().unwrap();
        assert!(sent.user.contains("Budget: $120"));
    }

    #[tokio::test]
    async fn refusal_is_no_structured_payload() {
        let generator = CannedGenerator::replying("Sorry, I cannot help.");
        let err = recommend(&generator, &Preferences::default()).await.unwrap_err();
        assert!(matches!(err, StylistError::NoStructuredPayload { .. }));
        assert_eq!(err.raw_reply(), Some("Sorry, I cannot help."));
    }

    #[tokio::test]
    async fn broken_array_is_malformed_payload() {
        let generator = CannedGenerator::replying(r#"[{"outfit_name": }]"#);
        let err = recommend(&generator, &Preferences::default()).await.unwrap_err();
        assert!(matches!(err, StylistError::MalformedPayload { .. }));
    }

    #[tokio::test]
    async fn backend_failure_is_transport_error() {
        let generator = CannedGenerator::failing(500, "boom");
        let err = recommend(&generator, &Preferences::default()).await.unwrap_err();
        assert!(matches!(err, StylistError::Transport(_)));
        assert_eq!(err.raw_reply(), None);
    }
}
