use std::path::Path;
use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;
use ns_core::{Result, SpeechSynthesizer};

/// Speech synthesis over the public `translate_tts` endpoint, which
/// returns MPEG audio for short text snippets.
pub struct GoogleSpeechSynthesizer {
    client: Client,
    base_url: String,
}

impl GoogleSpeechSynthesizer {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            base_url: "https://translate.google.com".to_string(),
        }
    }
}

impl Default for GoogleSpeechSynthesizer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SpeechSynthesizer for GoogleSpeechSynthesizer {
    async fn synthesize(&self, text: &str, lang: &str, output_path: &Path) -> Result<()> {
        let audio = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", lang),
                ("q", text),
            ])
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        if audio.is_empty() {
            return Err(ns_core::Error::Speech(
                "Synthesis endpoint returned no audio".to_string(),
            ));
        }

        if let Some(parent) = output_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(output_path, &audio).await?;
        debug!("Wrote {} bytes of audio to {}", audio.len(), output_path.display());
        Ok(())
    }
}
