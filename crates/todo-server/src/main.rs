//! Todo server binary.

use todo_db::DbPool;
use todo_server::config::{self, LogConfig};
use todo_server::{app, AppState};
use todo_store::SeedOutcome;
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let config_path = config::config_path();
    let config = config::load(&config_path).expect("invalid configuration");
    init_tracing(&config.log);
    tracing::info!(path = %config_path.display(), "configuration loaded");

    let pool = todo_store::open_store(&config.database.path, config.database.pool_settings())
        .expect("failed to open store");
    tracing::info!(path = %config.database.path, "store ready");

    if config.database.seed_sample_data {
        seed(&pool);
    }

    let listener = TcpListener::bind(config.listen)
        .await
        .expect("failed to bind listen address");
    tracing::info!(addr = %config.listen, "serving todo API");

    axum::serve(listener, app(AppState { pool: pool.clone() }))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // Last handle: dropping it closes every pooled connection.
    drop(pool);
    tracing::info!("store closed");
}

fn init_tracing(log: &LogConfig) {
    let filter = EnvFilter::try_new(&log.filter).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt().with_env_filter(filter);
    if log.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

fn seed(pool: &DbPool) {
    let conn = pool.get().expect("no connection for seeding");
    match todo_store::seed_sample_data(&conn).expect("failed to seed sample data") {
        SeedOutcome::Seeded { users, todos } => tracing::info!(users, todos, "seeded sample data"),
        SeedOutcome::Skipped { existing_users } => {
            tracing::info!(existing_users, "store already populated, not seeding")
        }
    }
}

/// Resolves on the first SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let (mut interrupt, mut terminate) =
        match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
            (Ok(interrupt), Ok(terminate)) => (interrupt, terminate),
            (Err(e), _) | (_, Err(e)) => {
                tracing::warn!(error = %e, "cannot listen for shutdown signals");
                return std::future::pending().await;
            }
        };

    let received = tokio::select! {
        _ = interrupt.recv() => "SIGINT",
        _ = terminate.recv() => "SIGTERM",
    };
    tracing::info!(signal = received, "shutting down");
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "cannot listen for Ctrl+C");
        return std::future::pending().await;
    }
    tracing::info!(signal = "ctrl-c", "shutting down");
}
