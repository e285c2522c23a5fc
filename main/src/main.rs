use api_router::{api_routes, api_state::ApiState};
use axum::Router;
use common::utils::config::get_config;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Set up tracing
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .try_init()
        .ok();

    // Get config; both API credentials are required here
    let config = get_config()?;

    // Build shared application state
    let api_state = ApiState::new(&config).await?;
    info!(
        embedding_backend = api_state.embedding_provider.backend_label(),
        embedding_dimension = api_state.embedding_provider.dimension(),
        "Embedding provider initialized"
    );

    // Create Axum router
    let app = Router::new()
        .merge(api_routes(&api_state))
        .with_state(api_state);

    info!("Starting server listening on 0.0.0.0:{}", config.http_port);
    let serve_address = format!("0.0.0.0:{}", config.http_port);
    let listener = tokio::net::TcpListener::bind(serve_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
