use anyhow::Context;
use chaos_client::{cli, signal, telemetry, HttpTransport};
use chaos_core::prelude::*;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let matches = cli::command().get_matches();

    telemetry::init_tracing(cli::log_json(&matches)).context("failed to initialise tracing")?;
    let config = cli::resolve_config(&matches).context("invalid configuration")?;

    let transport = HttpTransport::new(&config.base_url, config.request_timeout())
        .context("failed to build HTTP client")?;
    tracing::info!(target_url = %transport.base_url(), "Targeting service");

    let stop = StopSignal::new();
    let listener = signal::stop_on_signal(stop.clone());

    let report = ChaosRunner::from_config(transport, &config).run(stop).await;
    listener.abort();

    println!("{}", report.generate_text());
    Ok(())
}
