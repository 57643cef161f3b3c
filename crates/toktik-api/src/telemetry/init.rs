use tracing_subscriber::{
    fmt::format::Format, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter,
};

/// Initialize tracing: `RUST_LOG`-style filter and a compact console format.
pub fn init_telemetry() -> Result<(), Box<dyn std::error::Error>> {
    let console_fmt = tracing_subscriber::fmt::layer().event_format(
        Format::default()
            .compact()
            .with_target(false)
            .without_time(),
    );
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "toktik=debug,tower_http=debug".into()),
        )
        .with(console_fmt)
        .try_init()?;

    tracing::info!("Tracing initialized");
    Ok(())
}
