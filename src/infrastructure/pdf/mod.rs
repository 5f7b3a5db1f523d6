use anyhow::anyhow;
use async_trait::async_trait;
use std::time::Duration;

const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Source of raw page text for an uploaded document
#[async_trait]
pub trait PdfTextExtractor: Send + Sync {
    /// Extract text page by page, in document order. Pages without text
    /// come back as empty strings.
    async fn extract_pages(&self, data: &[u8]) -> anyhow::Result<Vec<String>>;
}

/// Extractor backed by the `pdf-extract` crate
#[derive(Default)]
pub struct PdfExtractAdapter;

impl PdfExtractAdapter {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl PdfTextExtractor for PdfExtractAdapter {
    #[tracing::instrument(skip(self, data), fields(pdf_size = data.len()))]
    async fn extract_pages(&self, data: &[u8]) -> anyhow::Result<Vec<String>> {
        let bytes = data.to_vec();

        // The parser is CPU bound and panics on some malformed files
        let pages = tokio::time::timeout(
            EXTRACTION_TIMEOUT,
            tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem_by_pages(&bytes)),
        )
        .await
        .map_err(|_| anyhow!("PDF extraction timed out after {}s", EXTRACTION_TIMEOUT.as_secs()))?
        .map_err(|e| anyhow!("PDF parser crashed: {e}"))?
        .map_err(|e| anyhow!("failed to parse PDF: {e}"))?;

        tracing::debug!(page_count = pages.len(), "PDF pages extracted");

        Ok(pages)
    }
}
