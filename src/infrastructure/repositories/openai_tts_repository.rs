use super::tts_repository::{text_preview, TtsRepository};
use crate::domain::conversion::VoiceSettings;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequestArgs, SpeechModel, SpeechResponseFormat, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request
const MAX_REQUEST_CHARS: usize = 4096;

/// OpenAI TTS implementation of TTS repository
pub struct OpenAiTtsRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
    default_voice: String,
}

impl OpenAiTtsRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String, default_voice: String) -> Self {
        Self {
            client,
            model,
            default_voice,
        }
    }

    fn speech_model(&self) -> SpeechModel {
        match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        }
    }

    /// The tts-1 family ignores style instructions and rejects them
    fn supports_instructions(&self) -> bool {
        !self.model.starts_with("tts-1")
    }

    fn resolve_voice(&self, settings: &VoiceSettings) -> String {
        settings
            .voice
            .clone()
            .unwrap_or_else(|| self.default_voice.clone())
    }
}

fn parse_voice(voice: &str) -> Voice {
    match voice.to_lowercase().as_str() {
        "alloy" => Voice::Alloy,
        "echo" => Voice::Echo,
        "fable" => Voice::Fable,
        "onyx" => Voice::Onyx,
        "nova" => Voice::Nova,
        "shimmer" => Voice::Shimmer,
        _ => Voice::Alloy,
    }
}

#[async_trait]
impl TtsRepository for OpenAiTtsRepository {
    async fn synthesize(&self, text: &str, settings: &VoiceSettings) -> Result<Vec<u8>, String> {
        let start_time = std::time::Instant::now();
        let voice = self.resolve_voice(settings);

        tracing::info!(
            model = %self.model,
            voice = %voice,
            speed = settings.speed,
            script = %settings.script,
            has_instructions = settings.instructions.is_some(),
            text_length = text.chars().count(),
            text_preview = %text_preview(text),
            "Calling OpenAI TTS API"
        );

        let mut builder = CreateSpeechRequestArgs::default();
        builder
            .model(self.speech_model())
            .input(text)
            .voice(parse_voice(&voice))
            .response_format(SpeechResponseFormat::Mp3)
            .speed(settings.speed);

        if self.supports_instructions() {
            if let Some(instructions) = &settings.instructions {
                builder.instructions(instructions.clone());
            }
        }

        let request = builder
            .build()
            .map_err(|e| format!("OpenAI TTS request error: {}", e))?;

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %voice,
                text_length = text.chars().count(),
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        let audio_bytes = response.bytes.to_vec();

        tracing::debug!(
            provider = "openai",
            audio_size = audio_bytes.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "OpenAI TTS audio received successfully"
        );

        Ok(audio_bytes)
    }

    fn max_chunk_chars(&self) -> usize {
        MAX_REQUEST_CHARS
    }

    fn provider_name(&self) -> &'static str {
        "openai"
    }
}
