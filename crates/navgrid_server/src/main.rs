//! Headless API server entrypoint.

use navgrid_core::config::env_flag_enabled;
use navgrid_server::{resolve_bind_address, serve_router, AppState, Config, NavStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "navgrid=info,tower_http=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().collect();
    if args.contains(&"--help".to_string()) {
        print_help();
        return Ok(());
    }

    let config = Config::from_env();

    let store = match &config.kv_path {
        Some(path) => match NavStore::open(path) {
            Ok(store) => store,
            Err(err) => {
                // A misconfigured binding degrades the same way an absent
                // one does: default reads, failed writes.
                tracing::error!("failed to open KV store at {path}: {err}; running detached");
                NavStore::detached()
            }
        },
        None => {
            tracing::warn!("KV_PATH not set; serving defaults and rejecting writes");
            NavStore::detached()
        }
    };

    if !config.has_auth() {
        tracing::warn!(
            "no admin secret configured (AUTH_KEY/ADMIN_PASSWORD/ADMIN_TOKEN); \
             all mutating navigation/settings requests will be rejected"
        );
    }

    let allow_public = env_flag_enabled("ALLOW_PUBLIC_ACCESS");
    let bind_addr = resolve_bind_address(&config, allow_public);
    let state = AppState::new(config, store);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!("navgrid API running at http://{}", bind_addr);

    serve_router(listener, state, shutdown_signal()).await?;

    Ok(())
}

fn print_help() {
    println!("navgrid API server\n");
    println!("Usage: navgrid [OPTIONS]\n");
    println!("Options:");
    println!("  --help            Show this help message");
    println!("\nEnvironment variables:");
    println!("  KV_PATH              Key-value store directory (unset: detached mode)");
    println!("  PORT                 Server port (default: 8788)");
    println!("  BIND                 Override bind address (e.g. 0.0.0.0:8788)");
    println!("  AUTH_KEY             Admin secret accepted in the Authorization header");
    println!("  ADMIN_PASSWORD       Alternate admin secret");
    println!("  ADMIN_TOKEN          Alternate admin secret");
    println!("  RATE_LIMIT_MAX       Requests per window per client (default: 60)");
    println!("  RATE_LIMIT_WINDOW_SECS  Rate limit window (default: 60)");
    println!("  MAX_BODY_SIZE        Maximum request body in bytes (default: 1MiB)");
    println!("  ALLOW_PUBLIC_ACCESS  Permit non-loopback bind addresses");
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutting down gracefully...");
}
