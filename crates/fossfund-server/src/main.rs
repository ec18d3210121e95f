//! Main entry point for the fossfund server.
//!
//! `serve` (the default) starts the HTTP server, `setup` recreates the
//! database schema.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};

use fossfund_auth::service::{oauth::OAuthService, session::SessionService};
use fossfund_common::crypto::CookieSealer;
use fossfund_persistence::{ExternalDbPersistService, PersistenceService, schema};
use fossfund_server::{
    model::{AppState, Cli, Command, Configuration},
    startup::{self, GracefulShutdown},
};

/// Time given to in-flight requests on shutdown
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(30);

#[actix_web::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let configuration = Configuration::new(&cli)?;

    let _logging_guard = startup::init_logging(&configuration.logging_config())?;

    match cli.command() {
        Command::Setup => setup(&configuration).await?,
        Command::Serve => serve(configuration).await?,
    }

    Ok(())
}

/// Drop and recreate the database schema
async fn setup(configuration: &Configuration) -> anyhow::Result<()> {
    let db = configuration.database_connection().await?;
    let shutdown_signal = startup::wait_for_shutdown_signal();

    info!("Setting up database schema");
    match startup::run_with_shutdown(schema::setup(&db), shutdown_signal.subscribe()).await {
        Some(result) => result?,
        None => {
            warn!("Database setup cancelled, nothing was changed");
            return Ok(());
        }
    }
    info!("Database schema created");

    Ok(())
}

fn session_service(configuration: &Configuration) -> anyhow::Result<SessionService> {
    match configuration.session_secret() {
        Some(secret) => SessionService::from_secret(&secret),
        None => {
            warn!(
                "app.session_secret is not set, using a random key: sessions will not survive a restart"
            );
            Ok(SessionService::new(CookieSealer::new(
                &CookieSealer::generate_key(),
            )))
        }
    }
}

async fn serve(configuration: Configuration) -> anyhow::Result<()> {
    let db = configuration.database_connection().await?;
    let persistence: Arc<dyn PersistenceService> = Arc::new(ExternalDbPersistService::new(db));
    if let Err(e) = persistence.health_check().await {
        error!("Database health check failed: {}", e);
        return Err(e);
    }

    let oauth_service = Arc::new(OAuthService::new(&configuration.oauth_config())?);
    let session_service = Arc::new(session_service(&configuration)?);

    let app_state = Arc::new(AppState::new(
        configuration,
        persistence,
        oauth_service,
        session_service,
    ));
    app_state.logo_store.ensure_dirs().await?;

    info!(
        providers = ?app_state.oauth_service.get_enabled_providers(),
        static_dir = %app_state.logo_store.static_dir().display(),
        "Application state initialised"
    );

    let shutdown_signal = startup::wait_for_shutdown_signal();
    let graceful_shutdown = GracefulShutdown::new(shutdown_signal, SHUTDOWN_TIMEOUT);

    let server = startup::main_server(app_state)?;
    let handle = server.handle();

    tokio::spawn(async move {
        graceful_shutdown.stop_on_signal(handle).await;
    });

    if let Err(e) = server.await {
        error!("HTTP server error: {}", e);
        return Err(e.into());
    }

    info!("Server stopped");
    Ok(())
}
