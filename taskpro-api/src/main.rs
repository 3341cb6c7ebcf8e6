//! # TaskPro API Server
//!
//! Kanban backend: accounts with email verification, and boards made of
//! ordered columns of cards.
//!
//! ## Usage
//!
//! ```bash
//! cargo run -p taskpro-api
//! ```

use std::sync::Arc;
use taskpro_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskpro_shared::assets::{AssetStore, CloudinaryStore, DisabledAssetStore};
use taskpro_shared::db::{
    migrations::run_migrations,
    pool::{close_pool, create_pool, DatabaseConfig},
};
use taskpro_shared::mail::{LogMailer, Mailer, SmtpMailer};
use taskpro_shared::redis::{RedisClient, RedisConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "taskpro_api=debug,taskpro_shared=debug,tower_http=debug".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        "TaskPro API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env()?;

    let pool = create_pool(DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..Default::default()
    })
    .await?;
    run_migrations(&pool).await?;

    let redis = RedisClient::new(RedisConfig::new(config.redis.url.clone())).await?;

    let mailer: Arc<dyn Mailer> = match &config.smtp {
        Some(settings) => {
            tracing::info!(host = %settings.host, port = settings.port, "Using SMTP mailer");
            Arc::new(SmtpMailer::new(settings)?)
        }
        None => {
            tracing::warn!("SMTP not configured, verification links will only be logged");
            Arc::new(LogMailer)
        }
    };

    let assets: Arc<dyn AssetStore> = match &config.assets {
        Some(settings) => Arc::new(CloudinaryStore::new(settings.clone())),
        None => {
            tracing::warn!("Asset storage not configured, avatar uploads are disabled");
            Arc::new(DisabledAssetStore)
        }
    };

    let bind_address = config.bind_address();
    let state = AppState::new(pool.clone(), redis, config, mailer, assets);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address).await?;
    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    close_pool(pool).await;
    tracing::info!("Server stopped");

    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections...");
}
