//! protowrap - generate a gRPC schema and metadata for a wrapped executable
//!
//! Reads `wrap.yml` from the wrap directory and writes `main.proto` and
//! `meta.yml` into the API directory. Both directories default to the
//! container layout (`/wrap`, `/api`) and can be set through the
//! environment.

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::prelude::*;

mod generate;

#[derive(Parser)]
#[command(
    name = "protowrap",
    version,
    about = "Generate a gRPC schema and metadata document from wrap.yml"
)]
struct Cli {
    #[command(flatten)]
    generate: generate::GenerateArgs,
}

/// Environment variable controlling the log filter.
const LOG_ENV: &str = "PROTOWRAP_LOG";

fn main() {
    init_tracing();
    let cli = Cli::parse();
    std::process::exit(generate::run(&cli.generate));
}

fn init_tracing() {
    // PROTOWRAP_LOG controls log level: "trace", "debug", "info", "warn", "error"
    // or a full tracing filter spec like "protowrap_core=trace"
    let filter = log_filter(std::env::var(LOG_ENV).ok().as_deref());

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_line_number(true)
        .with_file(true)
        .with_filter(EnvFilter::new(filter));

    if tracing_subscriber::registry()
        .with(fmt_layer)
        .try_init()
        .is_err()
    {
        eprintln!("Warning: tracing subscriber already initialized");
    }
}

/// Build the filter spec: plain levels apply to both protowrap crates.
fn log_filter(value: Option<&str>) -> String {
    match value {
        Some(level) if is_plain_level(level) => {
            let level = level.to_ascii_lowercase();
            format!("protowrap={level},protowrap_core={level}")
        }
        Some(spec) if !spec.trim().is_empty() => spec.to_string(),
        _ => "protowrap=info,protowrap_core=info".to_string(),
    }
}

fn is_plain_level(s: &str) -> bool {
    matches!(
        s.to_ascii_lowercase().as_str(),
        "trace" | "debug" | "info" | "warn" | "error"
    )
}
