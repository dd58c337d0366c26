use super::routes::create_router;
use super::state::AppState;
use crate::config::HttpConfig;
use crate::error::Result;
use std::future::Future;
use tracing::info;

/// Serve the view API until `shutdown` resolves, then release the session.
///
/// Entry point for an application that embeds the controller with its own
/// `VoiceAgent`; the bundled CLI only drives the backend endpoints.
pub async fn serve(
    state: AppState,
    config: &HttpConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> Result<()> {
    let addr = format!("{}:{}", config.bind, config.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("View API listening on http://{}", listener.local_addr()?);

    let controller = state.controller.clone();
    axum::serve(listener, create_router(state))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("View API stopped");
    controller.shutdown().await;
    Ok(())
}
