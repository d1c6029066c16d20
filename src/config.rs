// Application configuration, loaded via the 'config' crate (file + env vars).

use anyhow::Result;
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server_address: String,
    /// Base URL of the marketplace backend that owns all business logic.
    pub backend_base_url: String,
    /// Fallback image used when a listing carries no photos at all.
    pub placeholder_image: String,
    /// Path of the JSON file backing the client-side session store.
    pub session_store_path: String,
}

impl Settings {
    pub fn new() -> Result<Self> {
        dotenv::dotenv().ok(); // Load .env file if present

        let builder = Config::builder()
            .set_default("server_address", "127.0.0.1:3000")?
            .set_default("backend_base_url", "http://127.0.0.1:8080/api/v1")?
            .set_default("placeholder_image", "/static/img/car-placeholder.png")?
            .set_default("session_store_path", "session.json")?
            // Load from a configuration file (e.g., config.toml)
            .add_source(File::with_name("config").required(false))
            // Load from environment variables (e.g., APP_BACKEND_BASE_URL)
            .add_source(Environment::with_prefix("APP"));

        let settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }
}
