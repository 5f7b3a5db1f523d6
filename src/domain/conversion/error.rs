use crate::error::AppError;

/// Actionable reading of a speech provider failure, derived from its message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorHint {
    Quota,
    Billing,
    InvalidApiKey,
}

impl VendorHint {
    /// Classify a provider error message. Depends on the wording vendors
    /// currently use, so unknown messages simply yield no hint.
    pub fn from_message(message: &str) -> Option<Self> {
        let lower = message.to_lowercase();

        if lower.contains("api key")
            || lower.contains("api_key")
            || lower.contains("unrecognizedclient")
            || lower.contains("security token")
        {
            Some(VendorHint::InvalidApiKey)
        } else if lower.contains("quota")
            || lower.contains("rate limit")
            || lower.contains("rate_limit")
            || lower.contains("too many requests")
            || lower.contains("throttl")
        {
            Some(VendorHint::Quota)
        } else if lower.contains("billing") || lower.contains("payment") {
            Some(VendorHint::Billing)
        } else {
            None
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            VendorHint::Quota => "The speech provider quota or rate limit was reached, try again later",
            VendorHint::Billing => "The speech provider account has a billing problem",
            VendorHint::InvalidApiKey => "The speech provider rejected the configured API key",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConversionError {
    #[error("Could not extract readable text from the document: {0}")]
    Extraction(String),
    #[error("invalid input: {0}")]
    Invalid(String),
    #[error("speech synthesis failed on chunk {chunk} of {total}: {message}")]
    Synthesis {
        chunk: usize,
        total: usize,
        message: String,
        hint: Option<VendorHint>,
    },
}

impl From<ConversionError> for AppError {
    fn from(err: ConversionError) -> Self {
        match err {
            ConversionError::Extraction(_) => AppError::UnprocessableEntity(err.to_string()),
            ConversionError::Invalid(msg) => AppError::BadRequest(msg),
            ConversionError::Synthesis { hint, .. } => {
                let message = match hint {
                    Some(hint) => format!("{}. {}", err, hint.advice()),
                    None => err.to_string(),
                };
                match hint {
                    Some(VendorHint::Quota) => AppError::RateLimitExceeded(message),
                    Some(VendorHint::Billing) => AppError::PaymentRequired(message),
                    Some(VendorHint::InvalidApiKey) | None => AppError::ExternalService(message),
                }
            }
        }
    }
}
