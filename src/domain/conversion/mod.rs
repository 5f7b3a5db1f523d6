pub mod dto;
pub mod error;
pub mod service;

pub use dto::{
    ChunkPlan, ConversionOptions, ConversionResult, TextConversionRequest, VoiceSettings,
};
pub use error::{ConversionError, VendorHint};
pub use service::{synthesize_chunks, ConversionDefaults, ConversionService, ConversionServiceApi};
