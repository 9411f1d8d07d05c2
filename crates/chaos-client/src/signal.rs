//! Interrupt handling

use chaos_core::StopSignal;
use tokio::task::JoinHandle;

/// Resolve on SIGINT or SIGTERM (Ctrl-C elsewhere)
///
/// # Errors
/// Fails if the signal handlers cannot be registered.
pub async fn wait_for_shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        tokio::select! {
            _ = sigterm.recv() => {}
            _ = sigint.recv() => {}
        }
        Ok(())
    }
    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await
    }
}

/// Trigger `stop` when the process is interrupted
///
/// If handlers cannot be registered the run continues; it can still end on
/// its request budget.
pub fn stop_on_signal(stop: StopSignal) -> JoinHandle<()> {
    tokio::spawn(async move {
        match wait_for_shutdown_signal().await {
            Ok(()) => {
                tracing::info!("Interrupt received; stopping after the current request");
                stop.trigger();
            }
            Err(e) => tracing::error!(error = %e, "Failed to register signal handlers"),
        }
    })
}
