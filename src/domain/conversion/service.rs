use super::dto::{ChunkPlan, ConversionOptions, ConversionResult, VoiceSettings};
use super::error::{ConversionError, VendorHint};
use crate::domain::audio::{concat_audio, AudioChunk};
use crate::domain::text::{chunk_text, detect_script, optimize, prepare, TextChunk};
use crate::infrastructure::pdf::PdfTextExtractor;
use crate::infrastructure::repositories::TtsRepository;
use async_trait::async_trait;
use std::sync::Arc;

const CHARACTERS_PER_MINUTE: f32 = 1000.0;
const MIN_SPEED: f32 = 0.25;
const MAX_SPEED: f32 = 4.0;
const MIN_CHUNK_SIZE: usize = 100;

/// Configured fallbacks for options a request leaves out
#[derive(Debug, Clone)]
pub struct ConversionDefaults {
    pub voice: Option<String>,
    pub instructions: Option<String>,
    pub speed: f32,
    pub max_chunk_size: usize,
    /// Fewer non-whitespace characters than this counts as no readable text
    pub min_text_length: usize,
}

pub struct ConversionService {
    extractor: Arc<dyn PdfTextExtractor>,
    tts_repo: Arc<dyn TtsRepository>,
    defaults: ConversionDefaults,
}

impl ConversionService {
    pub fn new(
        extractor: Arc<dyn PdfTextExtractor>,
        tts_repo: Arc<dyn TtsRepository>,
        defaults: ConversionDefaults,
    ) -> Self {
        Self {
            extractor,
            tts_repo,
            defaults,
        }
    }

    pub fn provider_name(&self) -> &'static str {
        self.tts_repo.provider_name()
    }
}

#[async_trait]
pub trait ConversionServiceApi: Send + Sync {
    /// Convert a PDF document to a single MP3 buffer
    ///
    /// This operation:
    /// - Extracts text page by page
    /// - Normalizes, detects the dominant script, optimizes and chunks it
    /// - Synthesizes every chunk in order and concatenates the audio
    ///
    /// All or nothing: any failing chunk aborts the conversion.
    async fn convert_pdf(
        &self,
        data: &[u8],
        options: ConversionOptions,
    ) -> Result<ConversionResult, ConversionError>;

    /// Same pipeline as [`convert_pdf`](Self::convert_pdf), starting from plain text
    async fn convert_text(
        &self,
        text: &str,
        options: ConversionOptions,
    ) -> Result<ConversionResult, ConversionError>;

    /// Run the text pipeline without calling the speech provider
    fn preview_text(
        &self,
        text: &str,
        options: ConversionOptions,
    ) -> Result<ChunkPlan, ConversionError>;
}

#[async_trait]
impl ConversionServiceApi for ConversionService {
    async fn convert_pdf(
        &self,
        data: &[u8],
        options: ConversionOptions,
    ) -> Result<ConversionResult, ConversionError> {
        tracing::info!(pdf_size = data.len(), "PDF conversion request");

        let options = self.resolve_options(&options)?;

        let pages = self.extractor.extract_pages(data).await.map_err(|e| {
            tracing::warn!(error = %e, "PDF text extraction failed");
            ConversionError::Extraction(format!("{:#}", e))
        })?;

        tracing::info!(page_count = pages.len(), "PDF text extracted");

        let raw_text = pages
            .iter()
            .map(|page| page.trim())
            .filter(|page| !page.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n");

        let plan = self.build_plan(&raw_text, options.max_chunk_size)?;
        self.synthesize_plan(plan, options).await
    }

    async fn convert_text(
        &self,
        text: &str,
        options: ConversionOptions,
    ) -> Result<ConversionResult, ConversionError> {
        let options = self.resolve_options(&options)?;
        let plan = self.build_plan(text, options.max_chunk_size)?;
        self.synthesize_plan(plan, options).await
    }

    fn preview_text(
        &self,
        text: &str,
        options: ConversionOptions,
    ) -> Result<ChunkPlan, ConversionError> {
        let options = self.resolve_options(&options)?;
        self.build_plan(text, options.max_chunk_size)
    }
}

/// Request options merged with the defaults and checked against the provider
#[derive(Debug, Clone)]
struct ResolvedOptions {
    voice: Option<String>,
    instructions: Option<String>,
    speed: f32,
    max_chunk_size: usize,
}

impl ConversionService {
    fn resolve_options(
        &self,
        options: &ConversionOptions,
    ) -> Result<ResolvedOptions, ConversionError> {
        let speed = options.speed.unwrap_or(self.defaults.speed);
        let provider_speeds = self.tts_repo.speed_range();
        let min_speed = MIN_SPEED.max(*provider_speeds.start());
        let max_speed = MAX_SPEED.min(*provider_speeds.end());
        if !(min_speed..=max_speed).contains(&speed) {
            return Err(ConversionError::Invalid(format!(
                "speed must be between {} and {} for the {} provider",
                min_speed,
                max_speed,
                self.tts_repo.provider_name()
            )));
        }

        let requested = options
            .max_chunk_size
            .unwrap_or(self.defaults.max_chunk_size);
        if requested < MIN_CHUNK_SIZE {
            return Err(ConversionError::Invalid(format!(
                "max_chunk_size must be at least {}",
                MIN_CHUNK_SIZE
            )));
        }

        Ok(ResolvedOptions {
            voice: options
                .voice
                .clone()
                .filter(|v| !v.trim().is_empty())
                .or_else(|| self.defaults.voice.clone()),
            instructions: options
                .instructions
                .clone()
                .filter(|i| !i.trim().is_empty())
                .or_else(|| self.defaults.instructions.clone()),
            speed,
            // Capped by the provider request limit
            max_chunk_size: requested.min(self.tts_repo.max_chunk_chars()),
        })
    }

    fn build_plan(&self, text: &str, max_chunk_size: usize) -> Result<ChunkPlan, ConversionError> {
        // 1. Normalize
        let prepared = prepare(text);
        let readable_chars = prepared.chars().filter(|c| !c.is_whitespace()).count();
        if readable_chars < self.defaults.min_text_length {
            return Err(ConversionError::Extraction(format!(
                "found {} readable characters, at least {} required",
                readable_chars, self.defaults.min_text_length
            )));
        }

        // 2. Detect the dominant script
        let language = detect_script(&prepared);

        // 3. Rewrite for speech
        let optimized = optimize(&prepared);
        let text_length = optimized.chars().count();

        // 4. Chunk
        let chunks = chunk_text(&optimized, max_chunk_size);

        tracing::info!(
            original_length = text.chars().count(),
            prepared_length = prepared.chars().count(),
            optimized_length = text_length,
            language = %language,
            max_chunk_size,
            chunk_count = chunks.len(),
            "Text prepared for synthesis"
        );

        Ok(ChunkPlan {
            language,
            language_tag: language.language_tag(),
            text_length,
            chunks,
        })
    }

    async fn synthesize_plan(
        &self,
        plan: ChunkPlan,
        options: ResolvedOptions,
    ) -> Result<ConversionResult, ConversionError> {
        let start_time = std::time::Instant::now();

        let settings = VoiceSettings {
            voice: options.voice,
            instructions: options.instructions,
            speed: options.speed,
            script: plan.language,
        };

        let audio_data = synthesize_chunks(self.tts_repo.as_ref(), &plan.chunks, &settings).await?;

        let duration_minutes = plan.text_length as f32 / CHARACTERS_PER_MINUTE / settings.speed;
        let result = ConversionResult {
            audio_data,
            language: plan.language,
            text_length: plan.text_length,
            chunk_count: plan.chunks.len(),
            duration_seconds: (duration_minutes * 60.0).round() as u64,
        };

        tracing::info!(
            provider = self.tts_repo.provider_name(),
            language = %result.language,
            text_length = result.text_length,
            chunk_count = result.chunk_count,
            audio_size_bytes = result.audio_data.len(),
            latency_ms = start_time.elapsed().as_millis(),
            "Conversion completed"
        );

        Ok(result)
    }
}

/// Synthesize chunks one after another and merge their audio in order.
///
/// Each call is awaited before the next is issued. The first failure aborts
/// the whole run and no partial audio is returned.
pub async fn synthesize_chunks(
    tts_repo: &dyn TtsRepository,
    chunks: &[TextChunk],
    settings: &VoiceSettings,
) -> Result<Vec<u8>, ConversionError> {
    let total = chunks.len();
    let mut audio_chunks = Vec::with_capacity(total);

    for chunk in chunks {
        tracing::info!(
            chunk = chunk.page,
            total,
            chunk_length = chunk.length,
            "Synthesizing chunk"
        );

        let audio = tts_repo
            .synthesize(&chunk.text, settings)
            .await
            .map_err(|message| {
                let hint = VendorHint::from_message(&message);
                tracing::error!(
                    chunk = chunk.page,
                    total,
                    error = %message,
                    hint = ?hint,
                    "Chunk synthesis failed, aborting conversion"
                );
                ConversionError::Synthesis {
                    chunk: chunk.page,
                    total,
                    message,
                    hint,
                }
            })?;

        audio_chunks.push(AudioChunk::from(audio));
    }

    Ok(concat_audio(audio_chunks))
}
