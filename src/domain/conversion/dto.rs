use serde::{Deserialize, Serialize};

use crate::domain::text::{Script, TextChunk};

/// Per-request overrides, every field falls back to the configured default
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConversionOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructions: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_chunk_size: Option<usize>,
}

/// Request for POST /api/convert/text and /api/convert/preview
#[derive(Debug, Serialize, Deserialize)]
pub struct TextConversionRequest {
    pub text: String,
    #[serde(flatten)]
    pub options: ConversionOptions,
}

/// Synthesis parameters shared by every chunk of one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct VoiceSettings {
    pub voice: Option<String>,
    pub instructions: Option<String>,
    pub speed: f32,
    pub script: Script,
}

#[derive(Debug, Clone)]
pub struct ConversionResult {
    pub audio_data: Vec<u8>,
    pub language: Script,
    /// Characters of optimized text sent to synthesis
    pub text_length: usize,
    pub chunk_count: usize,
    pub duration_seconds: u64,
}

/// What a conversion would send to the speech provider
#[derive(Debug, Clone, Serialize)]
pub struct ChunkPlan {
    pub language: Script,
    pub language_tag: &'static str,
    pub text_length: usize,
    pub chunks: Vec<TextChunk>,
}
