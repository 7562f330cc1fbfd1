//! # Recipe App
//!
//! Headless shell: boots the backend handles, follows the auth session and
//! reports what the catalog holds.

use recipe_app::config::AppConfig;
use recipe_app::state::AppState;
use recipe_app::telemetry::{TelemetryConfig, init_telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let config = AppConfig::from_env();
    tracing::info!(backend = ?config.backend, "Starting Recipe Plus core");

    let state = AppState::new(config);
    let session = state.session.start();
    let settled = state.session.wait_until_settled().await;
    tracing::info!(
        signed_in = settled.user().is_some(),
        admin = settled.is_admin(),
        "Session settled"
    );

    let gateway = state.gateway();
    let categories = gateway.list_categories().await;
    let recipes = gateway.list_recipes(None, None).await;
    tracing::info!(
        categories = categories.len(),
        recipes = recipes.len(),
        "Catalog loaded"
    );

    session.unsubscribe();
    Ok(())
}
