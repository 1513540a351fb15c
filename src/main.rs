use popular_urls::{router, session, store::PageState, AppState, Config};
use std::net::SocketAddr;
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env();
    if config.api_key.is_empty() {
        warn!("FIREBASE_API_KEY is not set; anonymous sign-in will fail");
    }

    let state = AppState::new(&config)?;
    tokio::spawn(log_transitions(state.store.subscribe()));

    let init_state = state.clone();
    tokio::spawn(async move { session::initialize(&init_state).await });

    let app = router(state);
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
        })
        .await?;

    Ok(())
}

async fn log_transitions(mut rx: watch::Receiver<PageState>) {
    while rx.changed().await.is_ok() {
        let state = rx.borrow_and_update().clone();
        let records = state.result().map_or(0, |result| result.records.len());
        info!(phase = state.phase().as_str(), records, "page state changed");
    }
}
