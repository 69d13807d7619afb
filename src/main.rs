use axum::Router;
use axum::routing::{get, post};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

use chat_stream::AppState;
use chat_stream::handlers::{chat_handler, chat_legacy_handler, chat_sse_handler, health_check};
use chat_stream::init::app_init;

fn create_app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/chat", post(chat_handler))
        .route("/api/chat/sse", post(chat_sse_handler))
        .route("/api/chat/legacy", post(chat_legacy_handler))
        .route("/health", get(health_check))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("🚀 Starting chat stream server...");

    let (config, state) = app_init()?;
    let app = create_app_router(state);

    let addr = config.addr();
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    log::info!("");
    log::info!("🎉 Server started!");
    log::info!("📍 http://{}", addr);
    log::info!("📡 Chat ({}): http://{}/api/chat", config.stream.protocol, addr);
    log::info!("📡 SSE: http://{}/api/chat/sse", addr);
    log::info!("📜 Legacy: http://{}/api/chat/legacy", addr);
    log::info!("❤️  Health: http://{}/health", addr);
    log::info!(
        "⏱️  Pacing: token {:?}, part {:?}, legacy event {:?}",
        config.stream.pacing.token_delay,
        config.stream.pacing.part_delay,
        config.stream.pacing.legacy_event_delay
    );
    log::info!("");

    axum::serve(listener, app).await?;

    Ok(())
}
