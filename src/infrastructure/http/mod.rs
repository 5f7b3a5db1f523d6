pub mod request_id;

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::controllers::{conversion::ConversionController, health};
use crate::domain::conversion::ConversionService;
use crate::infrastructure::config::Config;

pub use request_id::{request_id_middleware, RequestId, X_REQUEST_ID};

/// Build the application router with all routes and middleware
pub fn create_router(
    config: &Config,
    conversion_service: Arc<ConversionService>,
    conversion_controller: Arc<ConversionController>,
) -> Router {
    let conversion_routes = Router::new()
        .route("/api/convert", post(ConversionController::convert_pdf))
        .route("/api/convert/text", post(ConversionController::convert_text))
        .route("/api/convert/preview", post(ConversionController::preview))
        .with_state(conversion_controller)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes));

    let app = Router::new()
        .route("/health", get(health::health))
        .route("/health/ready", get(health::health_ready))
        .with_state(conversion_service)
        .merge(conversion_routes)
        .layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(request_id_middleware))
                .layer(TraceLayer::new_for_http()),
        );

    if config.is_development() {
        app.layer(CorsLayer::permissive())
    } else {
        app
    }
}

/// Start the HTTP server with all routes configured
pub async fn start_http_server(
    config: Arc<Config>,
    conversion_service: Arc<ConversionService>,
    conversion_controller: Arc<ConversionController>,
) -> Result<(), Box<dyn std::error::Error>> {
    let app = create_router(&config, conversion_service, conversion_controller);

    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", config.host, config.port)).await?;

    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
