use std::env;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use sucu_backend::{db, routes, storage, AppState, Config};

/// Time in-flight requests get to finish after a shutdown signal
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args: Vec<String> = env::args().collect();
    if args.iter().any(|arg| arg == "-help" || arg == "--help") {
        println!("Usage: sucu-backend [OPTIONS]");
        println!("Options:");
        println!("  -config <path>  Path to configuration file (default: ./etc/sucu.toml)");
        println!("  -help, --help   Print this help message");
        return Ok(());
    }

    let config_path = args
        .iter()
        .skip_while(|arg| arg.as_str() != "-config")
        .nth(1)
        .map(|s| s.to_string())
        .unwrap_or_else(|| "./etc/sucu.toml".to_string());

    // Load configuration first (before logging init)
    let config = Config::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Could not load config file: {}, using defaults", e);
        Config::default()
    });

    // Initialize logging
    // Priority: RUST_LOG env var > config file > default "info"
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log.level));

    fmt::fmt()
        .with_env_filter(env_filter)
        .with_target(true)
        .with_thread_ids(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    info!("Starting SUCU backend...");
    info!("Loading configuration from: {}", config_path);

    if config.jwt.access_token_secret.is_empty() {
        tracing::warn!("jwt.access_token_secret is empty, tokens are signed with an empty key");
    }

    let db = db::init_database(&config.database).await.map_err(|e| {
        tracing::error!("Database initialization failed: {}", e);
        anyhow::anyhow!("Database initialization failed: {}", e)
    })?;

    if let Some(bootstrap) = &config.bootstrap {
        db::bootstrap_superadmin(&db, bootstrap).await.map_err(|e| {
            tracing::error!("Bootstrap user creation failed: {}", e);
            anyhow::anyhow!("Bootstrap user creation failed: {}", e)
        })?;
    }

    let store = storage::build(&config.storage).map_err(|e| {
        tracing::error!("Object storage initialization failed: {}", e);
        anyhow::anyhow!("Object storage initialization failed: {}", e)
    })?;
    info!("Object storage ready, bucket: {}", config.storage.bucket);

    // Parse address
    let addr: SocketAddr = config.addr.parse().map_err(|e| {
        tracing::error!("Invalid address '{}': {}", config.addr, e);
        anyhow::anyhow!("Invalid address '{}': {}", config.addr, e)
    })?;

    // Create application state and router
    let state = AppState::new(config, db, store);
    let app = routes::create_router(state);

    info!("Server listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    let (signal_tx, mut signal_rx) = watch::channel(false);

    let server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = signal_rx.changed().await;
            })
            .await
    });

    shutdown_signal().await;
    info!("Shutting down, waiting up to {:?} for in-flight requests", SHUTDOWN_GRACE);
    let _ = signal_tx.send(true);

    match tokio::time::timeout(SHUTDOWN_GRACE, server).await {
        Ok(joined) => joined??,
        Err(_) => tracing::warn!("Grace period elapsed, forcing shutdown"),
    }

    info!("Server stopped");
    Ok(())
}

/// Resolves on SIGINT or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
