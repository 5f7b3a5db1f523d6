use axum::{
    body::{Body, Bytes},
    extract::{
        rejection::{BytesRejection, JsonRejection, QueryRejection},
        Query, State,
    },
    http::{header, HeaderMap, HeaderValue, StatusCode},
    Json,
};
use std::sync::Arc;

use crate::{
    domain::conversion::{
        ChunkPlan, ConversionOptions, ConversionResult, ConversionService, ConversionServiceApi,
        TextConversionRequest,
    },
    error::{AppError, AppResult},
};

const PDF_MAGIC: &[u8] = b"%PDF-";

/// Extractor rejections keep their 413 when the body limit is hit; anything else is a 400
fn rejection_error(status: StatusCode, message: String) -> AppError {
    if status == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::PayloadTooLarge(message)
    } else {
        AppError::BadRequest(message)
    }
}

pub struct ConversionController {
    conversion_service: Arc<ConversionService>,
    max_text_length: usize,
}

impl ConversionController {
    pub fn new(conversion_service: Arc<ConversionService>, max_text_length: usize) -> Self {
        Self {
            conversion_service,
            max_text_length,
        }
    }

    /// POST /api/convert - Convert an uploaded PDF to speech
    pub async fn convert_pdf(
        State(controller): State<Arc<ConversionController>>,
        options: Result<Query<ConversionOptions>, QueryRejection>,
        body: Result<Bytes, BytesRejection>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let Query(options) = options.map_err(|e| rejection_error(e.status(), e.body_text()))?;
        let body = body.map_err(|e| rejection_error(e.status(), e.body_text()))?;

        if body.is_empty() {
            return Err(AppError::BadRequest("Request body is empty".to_string()));
        }

        if !body.starts_with(PDF_MAGIC) {
            return Err(AppError::BadRequest(
                "Request body is not a PDF document".to_string(),
            ));
        }

        let result = controller
            .conversion_service
            .convert_pdf(&body, options)
            .await?;

        Ok(audio_response(result))
    }

    /// POST /api/convert/text - Convert plain text to speech
    pub async fn convert_text(
        State(controller): State<Arc<ConversionController>>,
        request: Result<Json<TextConversionRequest>, JsonRejection>,
    ) -> AppResult<(StatusCode, HeaderMap, Body)> {
        let Json(request) = request.map_err(|e| rejection_error(e.status(), e.body_text()))?;
        controller.validate_text(&request.text)?;

        let result = controller
            .conversion_service
            .convert_text(&request.text, request.options)
            .await?;

        Ok(audio_response(result))
    }

    /// POST /api/convert/preview - Show how text would be chunked, without synthesis
    pub async fn preview(
        State(controller): State<Arc<ConversionController>>,
        request: Result<Json<TextConversionRequest>, JsonRejection>,
    ) -> AppResult<Json<ChunkPlan>> {
        let Json(request) = request.map_err(|e| rejection_error(e.status(), e.body_text()))?;
        controller.validate_text(&request.text)?;

        let plan = controller
            .conversion_service
            .preview_text(&request.text, request.options)?;

        Ok(Json(plan))
    }

    fn validate_text(&self, text: &str) -> AppResult<()> {
        if text.trim().is_empty() {
            return Err(AppError::BadRequest("Text cannot be empty".to_string()));
        }

        let char_count = text.chars().count();
        if char_count > self.max_text_length {
            return Err(AppError::PayloadTooLarge(format!(
                "Text must be {} characters or less, got {}",
                self.max_text_length, char_count
            )));
        }

        Ok(())
    }
}

fn audio_response(result: ConversionResult) -> (StatusCode, HeaderMap, Body) {
    let mut headers = HeaderMap::new();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("audio/mpeg"));
    headers.insert(
        "x-language-detected",
        HeaderValue::from_static(result.language.as_str()),
    );
    headers.insert("x-character-count", HeaderValue::from(result.text_length));
    headers.insert("x-chunk-count", HeaderValue::from(result.chunk_count));
    headers.insert("x-duration-seconds", HeaderValue::from(result.duration_seconds));

    (StatusCode::OK, headers, Body::from(result.audio_data))
}
