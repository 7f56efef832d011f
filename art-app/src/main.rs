//! # Emoji Art
//!
//! Command-line host for the Emoji Art editor.

use art_app::{AppArgs, AppConfig};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize structured tracing with optional JSON format.
///
/// Set `RUST_LOG` to control log levels (default: warn,art_app=info).
/// Set `RUST_LOG_FORMAT=json` for JSON output.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("warn,art_app=info,art_core=info,art_image=info"));

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_writer(std::io::stderr);

    if std::env::var("RUST_LOG_FORMAT").as_deref() == Ok("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer.json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt_layer)
            .init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args = AppArgs::parse();
    let config = AppConfig::from(&args);
    tracing::debug!(
        "Data directory: {}, fetch timeout: {:?}",
        config.data_dir.display(),
        config.fetch.timeout
    );

    let summary = art_app::run(&config, &args.command).await?;
    print!("{summary}");
    Ok(())
}
