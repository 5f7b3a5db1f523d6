use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use pdfcast_backend::controllers::conversion::ConversionController;
use pdfcast_backend::domain::conversion::{ConversionDefaults, ConversionService};
use pdfcast_backend::infrastructure::config::{Config, LogFormat, TtsProvider};
use pdfcast_backend::infrastructure::http::start_http_server;
use pdfcast_backend::infrastructure::pdf::PdfExtractAdapter;
use pdfcast_backend::infrastructure::repositories::{
    OpenAiTtsRepository, PollyTtsRepository, TtsRepository,
};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting PdfCast Backend on {}:{}",
        config.host,
        config.port
    );

    let tts_repo = create_tts_repository(&config).await?;
    tracing::info!(provider = tts_repo.provider_name(), "TTS provider initialized");

    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    let extractor = Arc::new(PdfExtractAdapter::new());

    let conversion_service = Arc::new(ConversionService::new(
        extractor,
        tts_repo,
        ConversionDefaults {
            voice: None,
            instructions: config.tts_instructions.clone(),
            speed: config.tts_speed,
            max_chunk_size: config.max_chunk_size,
            min_text_length: config.min_text_length,
        },
    ));

    let conversion_controller = Arc::new(ConversionController::new(
        conversion_service.clone(),
        config.max_text_length,
    ));

    start_http_server(config, conversion_service, conversion_controller).await?;

    Ok(())
}

async fn create_tts_repository(
    config: &Config,
) -> Result<Arc<dyn TtsRepository>, Box<dyn std::error::Error>> {
    match config.tts_provider {
        TtsProvider::OpenAi => {
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or("OPENAI_API_KEY is required when TTS_PROVIDER=openai")?;

            tracing::info!(
                model = %config.openai_tts_model,
                voice = %config.openai_tts_voice,
                "Initializing OpenAI TTS client"
            );

            let openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
            let client = Arc::new(async_openai::Client::with_config(openai_config));

            Ok(Arc::new(OpenAiTtsRepository::new(
                client,
                config.openai_tts_model.clone(),
                config.openai_tts_voice.clone(),
            )))
        }
        TtsProvider::Polly => {
            tracing::info!("Initializing AWS Polly client with region: {}", config.aws_region);

            // Check for AWS credentials in environment (for debugging)
            let has_access_key = std::env::var("AWS_ACCESS_KEY_ID").is_ok();
            let has_secret_key = std::env::var("AWS_SECRET_ACCESS_KEY").is_ok();
            if !has_access_key || !has_secret_key {
                tracing::warn!("AWS credentials not found in environment variables. Will attempt to use other credential providers (instance metadata, etc.)");
            }

            let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(config.aws_region.clone()))
                .load()
                .await;

            tracing::info!(region = ?aws_config.region(), "AWS configuration loaded");

            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Ok(Arc::new(PollyTtsRepository::new(polly_client)))
        }
    }
}

fn init_logging(config: &Config) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "pdfcast_backend=debug,tower_http=debug".into());

    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
