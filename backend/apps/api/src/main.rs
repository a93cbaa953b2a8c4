//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use api::{ApiConfig, build_router};
use auth::{AuthAppState, PgAuditSink, PgAuthRepository, ProvisionOutcome};
use content::PgContentRepository;
use sqlx::postgres::PgPoolOptions;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,auth=info,content=info,audit=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    // Database connection
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let auth_repo = PgAuthRepository::new(pool.clone());

    // Startup cleanup
    // Errors here should not prevent server startup
    if let Err(e) = auth_repo.cleanup_expired().await {
        tracing::warn!(
            error = %e,
            "Session revocation cleanup failed, continuing anyway"
        );
    }
    spawn_revocation_purge(auth_repo.clone(), config.purge_interval);

    let auth_state = AuthAppState::new(
        auth_repo,
        config.auth,
        Arc::new(PgAuditSink::new(pool.clone())),
    )?;

    if let Some(seed) = config.admin_seed {
        let outcome = auth::application::ensure_admin_exists(
            auth_state.repo.as_ref(),
            &auth_state.hasher,
            &auth_state.config,
            seed,
        )
        .await?;

        match outcome {
            ProvisionOutcome::Created(id) => {
                tracing::info!(identity_id = %id, "Administrator provisioned");
            }
            ProvisionOutcome::AlreadyExists(id) => {
                tracing::info!(identity_id = %id, "Administrator already exists");
            }
        }
    }

    let app = build_router(
        auth_state,
        Arc::new(PgContentRepository::new(pool)),
        &config.frontend_origins,
    );

    // Start server
    tracing::info!("Listening on {}", config.bind_addr);

    let listener = TcpListener::bind(config.bind_addr).await?;
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}

/// Periodically drop deny-list entries that can no longer match a live token
fn spawn_revocation_purge(repo: PgAuthRepository, every: Duration) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // The first tick completes immediately; startup already purged
        interval.tick().await;

        loop {
            interval.tick().await;
            if let Err(e) = repo.cleanup_expired().await {
                tracing::warn!(error = %e, "Periodic revocation cleanup failed");
            }
        }
    });
}
