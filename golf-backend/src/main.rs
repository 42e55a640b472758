use anyhow::Context;
use golf_backend::{config::Config, create_app};
use golf_db::Database;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // RUST_LOG wins; otherwise debug builds log more
    #[cfg(debug_assertions)]
    let log_level = "debug";
    #[cfg(not(debug_assertions))]
    let log_level = "info";

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level)),
        )
        .with_target(false)
        .compact()
        .init();
    tracing::info!("Starting golf course API...");

    let config = Config::from_env();
    tracing::info!(
        "Configuration: port={}, db_path={}, static_dir={}, body_limit={}KB, timeout={}s",
        config.port,
        config.database_path,
        config.static_dir,
        config.request_body_limit / 1024,
        config.request_timeout.as_secs()
    );

    let db = match Database::open(&config.database_path).await {
        Ok(db) => {
            tracing::info!("Successfully connected to the database");
            db
        }
        Err(e) => {
            tracing::error!("Could not connect to the database: {}", e);
            return Err(e).context("failed to open the document store");
        }
    };

    let app = create_app(
        db,
        &config.static_dir,
        config.request_body_limit,
        config.request_timeout,
    );
    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}
