use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use ns_core::{Result, Translator};

/// Translation over the unauthenticated `translate_a/single` endpoint.
/// The response is a nested JSON array whose first element holds the
/// translated segments.
pub struct GoogleTranslator {
    client: Client,
    base_url: String,
}

impl GoogleTranslator {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "https://translate.googleapis.com".to_string(),
        }
    }
}

impl Default for GoogleTranslator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target_lang: &str) -> Result<String> {
        let response = self
            .client
            .get(format!("{}/translate_a/single", self.base_url))
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", target_lang),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .json::<Value>()
            .await?;

        let translated = parse_segments(&response).ok_or_else(|| {
            ns_core::Error::Translation("Unexpected translation response shape".to_string())
        })?;

        Ok(translated)
    }
}

/// Response shape: `[[["segment", "original", ...], ...], ...]`.
fn parse_segments(response: &Value) -> Option<String> {
    let segments = response.get(0)?.as_array()?;
    let mut translated = String::new();
    for segment in segments {
        if let Some(text) = segment.get(0).and_then(Value::as_str) {
            translated.push_str(text);
        }
    }
    if translated.is_empty() {
        None
    } else {
        Some(translated)
    }
}
