use rosette_cloud::{AppState, Config, api, email};

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[tokio::main]
async fn main() -> Result<(), BoxError> {
    // Load .env file
    let _ = dotenvy::dotenv();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "rosette_cloud=info,tower_http=info".into()),
        )
        .init();

    let config = Config::from_env()?;

    tracing::info!("Starting rosette-cloud (env: {})", config.environment);
    if config.order_webhook_secret.is_empty() {
        tracing::warn!("ORDER_WEBHOOK_SECRET not set, webhook signature verification disabled");
    }

    // Initialize application state
    let state = AppState::new(&config).await?;

    // Notification listener runs outside the order transaction path
    email::spawn_listener(&state);

    let app = api::create_router(state);

    let addr = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("rosette-cloud HTTP listening on {addr}");

    axum::serve(listener, app).await?;

    Ok(())
}
