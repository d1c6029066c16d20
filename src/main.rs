use anyhow::{Context, Result};
use axum::{extract::FromRef, Router};
use reqwest::Client;
use std::{net::SocketAddr, sync::Arc};
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Settings;
use crate::marketplace_api::BackendClient;
use crate::store::{JsonFileStore, SessionContext};

// Declare modules
mod config;
mod error;
mod filters;
mod gallery;
mod marketplace_api;
mod models;
mod routes;
mod session;
mod store;
mod validate;
mod wizard;

// Shared application state
#[derive(Clone, FromRef)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub http_client: Arc<Client>,
    pub backend: Arc<BackendClient>,
    pub session: Arc<SessionContext>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file first. Ignore errors (e.g., file not found)
    dotenv::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "carmandi_rust=info,tower_http=info".into()),
        )
        .with(fmt::layer())
        .init();

    tracing::info!("Initializing CarMandi frontend server...");

    // Load configuration
    let settings = match Settings::new() {
        Ok(s) => {
            tracing::info!("Configuration loaded successfully.");
            s
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e);
        }
    };
    let shared_settings = Arc::new(settings);

    // Shared reqwest client for all backend calls
    let http_client = Arc::new(
        Client::builder()
            .user_agent(concat!("carmandi/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("Failed to build shared reqwest client")?,
    );
    tracing::info!("Shared HTTP client created.");

    let backend = Arc::new(BackendClient::new(
        http_client.clone(),
        shared_settings.backend_base_url.clone(),
    ));

    // File-backed session store: the localStorage analog for auth token,
    // profile blob, selected city and the in-progress sell draft
    let store = Arc::new(JsonFileStore::open(&shared_settings.session_store_path));
    let session = Arc::new(SessionContext::new(store));

    let app_state = AppState {
        settings: shared_settings.clone(),
        http_client,
        backend,
        session,
    };

    let router: Router = routes::create_router(app_state.clone());

    // Combine the router with static file serving
    let app = router.nest_service("/static", ServeDir::new("static"));

    // Parse the server address from settings
    let addr: SocketAddr = app_state
        .settings
        .server_address
        .parse()
        .with_context(|| {
            format!(
                "Invalid server address format in configuration ('{}')",
                shared_settings.server_address
            )
        })?;

    let listener = match TcpListener::bind(&addr).await {
        Ok(l) => {
            tracing::info!("Server listening on {}", addr);
            l
        }
        Err(e) => {
            tracing::error!("Failed to bind to address {}: {}", addr, e);
            return Err(e.into());
        }
    };

    axum::serve(listener, app.into_make_service()).await?;

    Ok(())
}
