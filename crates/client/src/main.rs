//! KV Library client - headless smoke driver.
//!
//! Wires the application core against the real Supabase backend, resumes or
//! establishes a session, loads the catalog, and logs what a dashboard would
//! render. A rendering layer would replace this loop; everything it calls is
//! the same [`App`] surface.
//!
//! # Configuration
//!
//! Reads `SUPABASE_URL` and `SUPABASE_ANON_KEY` from the environment (a
//! `.env` file is honored). Set `KV_EMAIL` and `KV_PASSWORD` to sign in;
//! without them the catalog is read anonymously as a guest.

#![cfg_attr(not(test), forbid(unsafe_code))]

use kv_library_client::app::{App, CollectionOrigin};
use kv_library_client::config::AppConfig;
use kv_library_client::supabase::{AuthClient, Database, StorageClient};
use kv_library_core::Email;

#[tokio::main]
async fn main() {
    // A missing .env is fine; real environments set variables directly.
    let _ = dotenvy::dotenv();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "kv_library_client=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let config = AppConfig::from_env().expect("Failed to load configuration");

    let identity = AuthClient::new(&config.supabase);
    // Data-plane clients share the auth client's session slot so their
    // requests run as the signed-in user once sign-in completes.
    let session = identity.session_handle();
    let profiles = Database::new(&config.supabase, session.clone());
    let assets = Database::new(&config.supabase, session.clone());
    let thumbnails = StorageClient::new(&config.supabase, session);
    let mut app = App::new(identity, profiles, assets, thumbnails);

    match (std::env::var("KV_EMAIL"), std::env::var("KV_PASSWORD")) {
        (Ok(email), Ok(password)) => {
            let email = Email::parse(&email).expect("KV_EMAIL is not a valid email");
            if let Err(error) = app.sign_in(&email, &password).await {
                tracing::error!(%error, "sign-in failed");
                std::process::exit(1);
            }
        }
        _ => {
            tracing::info!("no credentials configured, browsing as guest");
            if let Err(error) = app.reload_assets().await {
                tracing::warn!(%error, "catalog load failed");
            }
        }
    }

    let collection = app.collection();
    match collection.origin {
        CollectionOrigin::Live => {
            let stats = app.stats();
            tracing::info!(
                total = stats.total,
                digital_pct = stats.digital_pct,
                traditional_pct = stats.traditional_pct,
                mobile = stats.mobile_count,
                household = stats.household_count,
                "catalog loaded"
            );
        }
        CollectionOrigin::Stale => {
            tracing::warn!(count = collection.assets.len(), "catalog is stale");
        }
        CollectionOrigin::Unavailable => {
            tracing::error!("catalog unavailable");
            std::process::exit(1);
        }
    }
}
