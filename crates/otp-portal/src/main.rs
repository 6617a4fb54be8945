//! OTP Portal - Entry point.

use mail_client::{DisabledNotifier, MailClient, Notifier};
use otp_portal::{
    api::{create_router_with_rate_limit, AppState, RateLimitState},
    config::Config,
    Portal,
};
use record_store::JsonFileStore;
use session_store::SessionStore;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(1);
        }
    };

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    let registry = tracing_subscriber::registry().with(filter);
    if config.log.json {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    info!("Starting OTP Portal");

    // Initialize storage
    let records = JsonFileStore::new(config.storage.users_path(), config.storage.contacts_path());
    info!(
        users = %config.storage.users_path().display(),
        contacts = %config.storage.contacts_path().display(),
        "Using JSON file storage"
    );

    let sessions = SessionStore::new(config.session.ttl);

    // Initialize mail transport
    let notifier: Arc<dyn Notifier> = match config.mail.credentials() {
        Some(creds) => match MailClient::new(
            creds.api_url,
            creds.username,
            creds.password,
            config.mail.from.clone(),
            config.mail.timeout,
        ) {
            Ok(client) => {
                info!(from = %client.from_address(), "Mail transport configured");
                Arc::new(client)
            }
            Err(e) => {
                error!("Failed to create mail client: {}", e);
                std::process::exit(1);
            }
        },
        None => {
            warn!("MAIL__API_URL, MAIL__USERNAME or MAIL__PASSWORD not set, emails will not be sent");
            Arc::new(DisabledNotifier)
        }
    };

    // Create application state
    let portal = Portal::new(Arc::new(records), Arc::new(sessions), notifier);
    let state = AppState::new(
        portal,
        config.session.cookie_name.clone(),
        config.server.static_dir.clone(),
    );

    // Create rate limiter from config
    let rate_limit = RateLimitState::new(config.rate_limit.global_per_minute);

    let app = create_router_with_rate_limit(state, rate_limit);

    // Bind to address
    let addr = SocketAddr::new(
        config
            .server
            .listen_addr
            .parse()
            .unwrap_or([0, 0, 0, 0].into()),
        config.server.port,
    );

    info!("Listening on {}", addr);

    let listener = match TcpListener::bind(addr).await {
        Ok(l) => l,
        Err(e) => {
            error!("Failed to bind to {}: {}", addr, e);
            std::process::exit(1);
        }
    };

    // Run server
    if let Err(e) = axum::serve(listener, app).await {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}
