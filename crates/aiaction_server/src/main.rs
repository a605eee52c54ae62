//! Server entry point.

use aiaction_core::{default_log_level, init_logging, Clock, Repositories, SystemClock};
use aiaction_server::config::Config;
use aiaction_server::router;
use aiaction_server::state::AppState;
use anyhow::{anyhow, Context, Result};
use clap::Parser;
use log::{error, info, warn};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// How long in-flight requests may take to finish after a shutdown signal.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::parse();

    let level = config
        .log_level
        .clone()
        .unwrap_or_else(|| default_log_level().to_string());
    init_logging(&level, config.log_dir.as_deref())
        .map_err(|err| anyhow!("failed to initialize logging: {err}"))?;

    let backend = config.backend();
    info!("event=backend_select module=server status=ok backend={backend}");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let repos = Repositories::open(&backend, clock.clone())
        .with_context(|| format!("failed to open {backend} repositories"))?;
    let state = AppState::new(
        repos,
        clock,
        config.upcoming_policy(),
        config.request_timeout(),
        backend.to_string(),
    )
    .context("failed to register page templates")?;
    let app = router(Arc::new(state));

    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("event=server_start module=server status=ok addr={addr}");

    let shutdown_token = CancellationToken::new();
    let shutdown_token_srv = shutdown_token.clone();
    let mut server = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                shutdown_token_srv.cancelled().await;
            })
            .await
    });

    tokio::select! {
        result = &mut server => {
            // Server stopped without a signal.
            result.context("server task panicked")?.context("server error")?;
            return Ok(());
        }
        signal = shutdown_signal() => {
            info!("event=shutdown module=server status=start signal={signal}");
            shutdown_token.cancel();
        }
    }

    match tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, server).await {
        Ok(Ok(Ok(()))) => info!("event=shutdown module=server status=ok"),
        Ok(Ok(Err(err))) => {
            error!("event=shutdown module=server status=error error={err}");
            return Err(err).context("error during server shutdown");
        }
        Ok(Err(err)) => {
            error!("event=shutdown module=server status=error error={err}");
            return Err(err).context("server task panicked during shutdown");
        }
        Err(_) => warn!(
            "event=shutdown module=server status=error error_code=drain_timeout timeout_secs={}",
            SHUTDOWN_DRAIN_TIMEOUT.as_secs()
        ),
    }
    Ok(())
}

/// Resolves on SIGINT, or SIGTERM on unix, and names the signal.
async fn shutdown_signal() -> &'static str {
    let interrupt = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!("event=signal_install module=server status=error signal=SIGINT error={err}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("event=signal_install module=server status=error signal=SIGTERM error={err}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = interrupt => "SIGINT",
        _ = terminate => "SIGTERM",
    }
}
