//! Graceful shutdown on Ctrl-C or SIGTERM.

use std::future::Future;

/// Resolves when the process receives Ctrl-C or, on Unix, SIGTERM.
pub async fn signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
        "Ctrl-C"
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
        "SIGTERM"
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<&'static str>();

    let received = first_of(ctrl_c, terminate).await;
    tracing::info!("{received} received, shutting down");
}

/// Name of whichever signal future resolves first.
pub(crate) async fn first_of<A, B>(a: A, b: B) -> &'static str
where
    A: Future<Output = &'static str>,
    B: Future<Output = &'static str>,
{
    tokio::select! {
        name = a => name,
        name = b => name,
    }
}
