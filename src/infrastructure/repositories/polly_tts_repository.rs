use super::tts_repository::{text_preview, TtsRepository};
use crate::domain::conversion::VoiceSettings;
use crate::domain::text::Script;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, LanguageCode, OutputFormat, TextType, VoiceId},
    Client as PollyClient,
};
use std::ops::RangeInclusive;
use std::sync::Arc;

/// AWS Polly has a limit of 3000 billed characters per request
const MAX_REQUEST_CHARS: usize = 3000;

/// SSML prosody rates Polly accepts, in percent
const MIN_RATE_PERCENT: u32 = 20;
const MAX_RATE_PERCENT: u32 = 200;

/// Voices that support the neural engine, based on AWS Polly documentation
const NEURAL_VOICES: &[&str] = &[
    // English
    "Joanna", "Matthew", "Ivy", "Kendra", "Kimberly", "Salli", "Joey", "Justin", "Kevin",
    // Spanish
    "Lupe", "Pedro", "Sergio", // French
    "Lea", "Remi", // German
    "Vicki", "Daniel", // Italian
    "Bianca", "Adriano", // Portuguese
    "Ines", "Camila", "Vitoria", "Thiago", // Hindi
    "Kajal", // Arabic
    "Hala", "Zayd",
];

/// AWS Polly implementation of TTS repository
pub struct PollyTtsRepository {
    polly_client: Arc<PollyClient>,
}

impl PollyTtsRepository {
    pub fn new(polly_client: Arc<PollyClient>) -> Self {
        Self { polly_client }
    }

    /// Select the Polly voice for a script; Polly voices are tied to a language
    fn get_voice_for_script(script: Script) -> &'static str {
        match script {
            Script::Latin | Script::Unknown => "Joanna",
            Script::Arabic => "Hala",
            Script::Devanagari => "Kajal",
            Script::Cyrillic => "Tatyana",
        }
    }

    /// Use the requested voice when Polly knows it, otherwise the voice for the script.
    /// Names from other providers (`nova`, `alloy`) fall back.
    fn resolve_voice(settings: &VoiceSettings) -> String {
        match settings.voice.as_deref() {
            Some(voice) if VoiceId::values().contains(&voice) => voice.to_string(),
            Some(voice) => {
                let fallback = Self::get_voice_for_script(settings.script);
                tracing::warn!(
                    requested_voice = %voice,
                    fallback_voice = fallback,
                    "Unknown Polly voice requested, using script default"
                );
                fallback.to_string()
            }
            None => Self::get_voice_for_script(settings.script).to_string(),
        }
    }

    fn engine_for_voice(voice: &str) -> Engine {
        if is_voice_neural_compatible(voice) {
            Engine::Neural
        } else {
            Engine::Standard
        }
    }
}

/// Check if a voice supports neural engine
pub fn is_voice_neural_compatible(voice: &str) -> bool {
    NEURAL_VOICES.contains(&voice)
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

/// Polly has no speed parameter; a prosody rate in SSML carries it instead
fn to_ssml(text: &str, speed: f32) -> String {
    let rate = ((speed * 100.0).round() as u32).clamp(MIN_RATE_PERCENT, MAX_RATE_PERCENT);
    format!(
        "<speak><prosody rate=\"{}%\">{}</prosody></speak>",
        rate,
        escape_xml(text)
    )
}

#[async_trait]
impl TtsRepository for PollyTtsRepository {
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();

        let voice_name = Self::resolve_voice(settings);
        let engine = Self::engine_for_voice(&voice_name);
        let voice_id = VoiceId::from(voice_name.as_str());

        let use_ssml = (settings.speed - 1.0).abs() > f32::EPSILON;
        let (payload, text_type) = if use_ssml {
            (to_ssml(text, settings.speed), TextType::Ssml)
        } else {
            (text.to_string(), TextType::Text)
        };

        // Kajal is bilingual and defaults to Indian English
        let language_code = match settings.script {
            Script::Devanagari => Some(LanguageCode::HiIn),
            _ => None,
        };

        tracing::info!(
            script = %settings.script,
            voice = %voice_name,
            engine = ?engine,
            text_type = ?text_type,
            output_format = "Mp3",
            text_length = text.chars().count(),
            text_preview = %text_preview(text),
            "Calling AWS Polly synthesize_speech"
        );

        let result = self
            .polly_client
            .synthesize_speech()
            .text(payload)
            .text_type(text_type)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .set_language_code(language_code)
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = %voice_name,
                    engine = ?engine,
                    text_length = text.chars().count(),
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {:?}", e)
            })?;

        tracing::debug!("AWS Polly synthesize_speech successful, reading audio stream");

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::debug!(
            provider = "polly",
            audio_size = audio_bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Audio stream collected successfully"
        );

        Ok(audio_bytes)
    }

    fn max_chunk_chars(&self) -> usize {
        MAX_REQUEST_CHARS
    }

    fn speed_range(&self) -> RangeInclusive<f32> {
        MIN_RATE_PERCENT as f32 / 100.0..=MAX_RATE_PERCENT as f32 / 100.0
    }

    fn provider_name(&self) -> &'static str {
        "polly"
    }
}
