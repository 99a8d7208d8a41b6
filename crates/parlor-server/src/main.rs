use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use parlor_api::{AppState, AppStateInner, messages, participants, status};
use parlor_db::Database;
use parlor_room::{MessageStore, ParticipantRegistry, PresenceSweeper, run_sweep_loop};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "parlor=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let host = std::env::var("PARLOR_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("PARLOR_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let db_path = std::env::var("PARLOR_DB_PATH").unwrap_or_else(|_| "parlor.db".into());
    let absence_timeout_secs: u64 = std::env::var("PARLOR_ABSENCE_TIMEOUT_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(10);
    let sweep_interval_secs: u64 = std::env::var("PARLOR_SWEEP_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(5);

    // Init database
    let db = Arc::new(Database::open(&PathBuf::from(&db_path))?);

    // The engine, with its persistence handle injected
    let registry = ParticipantRegistry::new(db.clone());
    let store = MessageStore::new(db.clone());
    let sweeper = PresenceSweeper::new(db, Duration::from_secs(absence_timeout_secs));

    // Background presence sweep
    tokio::spawn(run_sweep_loop(
        sweeper,
        Duration::from_secs(sweep_interval_secs),
    ));

    let state: AppState = Arc::new(AppStateInner { registry, store });

    // Routes
    let app = Router::new()
        .route("/participants", post(participants::register))
        .route("/participants", get(participants::list))
        .route("/messages", post(messages::post_message))
        .route("/messages", get(messages::get_messages))
        .route("/messages/{id}", put(messages::edit_message))
        .route("/messages/{id}", delete(messages::delete_message))
        .route("/status", post(status::heartbeat))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Parlor server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
