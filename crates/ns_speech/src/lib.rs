use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use ns_core::{cache_key, SpeechSynthesizer, Translator};

pub mod translate;
pub mod tts;

pub use translate::GoogleTranslator;
pub use tts::GoogleSpeechSynthesizer;

/// Result of localizing a verdict: the translated text and, when
/// synthesis succeeded, the path of the written audio file.
#[derive(Debug, Clone)]
pub struct Localization {
    pub translated_text: String,
    pub audio_path: Option<PathBuf>,
}

/// Translates a verdict to the target language and renders it as speech.
/// Never fails: translation errors fall back to the original text and
/// synthesis errors leave the audio path absent.
pub struct Localizer {
    translator: Arc<dyn Translator>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    audio_dir: PathBuf,
    target_lang: String,
}

impl Localizer {
    pub fn new(
        translator: Arc<dyn Translator>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        audio_dir: impl Into<PathBuf>,
        target_lang: impl Into<String>,
    ) -> Self {
        Self {
            translator,
            synthesizer,
            audio_dir: audio_dir.into(),
            target_lang: target_lang.into(),
        }
    }

    /// Deterministic audio location for a company: repeated runs
    /// overwrite the same file, different companies never collide.
    pub fn audio_path_for(&self, company_name: &str) -> PathBuf {
        self.audio_dir
            .join(format!("{}_{}.mp3", cache_key(company_name), self.target_lang))
    }

    pub async fn localize(&self, final_verdict: &str, company_name: &str) -> Localization {
        let translated_text = match self
            .translator
            .translate(final_verdict, &self.target_lang)
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!("Translation failed for {}: {}", company_name, e);
                final_verdict.to_string()
            }
        };

        if translated_text.trim().is_empty() {
            return Localization {
                translated_text,
                audio_path: None,
            };
        }

        let audio_path = self.audio_path_for(company_name);
        let audio_path = match self
            .synthesizer
            .synthesize(&translated_text, &self.target_lang, &audio_path)
            .await
        {
            Ok(()) => {
                info!("🔊 Generated audio for {} at {}", company_name, audio_path.display());
                Some(audio_path)
            }
            Err(e) => {
                warn!("Speech synthesis failed for {}: {}", company_name, e);
                None
            }
        };

        Localization {
            translated_text,
            audio_path,
        }
    }
}
