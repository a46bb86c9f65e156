//! # Gradebook
//!
//! ## Usage
//!
//! ```bash
//! # Start the HTTP server
//! gradebook server --host 0.0.0.0 --port 8080
//!
//! # CLI operations
//! gradebook add-student --name "Ada Lovelace" --roll R1
//! gradebook add-grade --roll R1 --subject Math --score 92.5
//! gradebook average R1
//! gradebook export -o grades.csv
//! ```

use clap::Parser;
use gradebook::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

#[tokio::main]
async fn main() {
    let cli = cli::Cli::parse();

    // GRADEBOOK_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("GRADEBOOK_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "gradebook=debug,gradebook_core=debug,tower_http=debug"
    } else if cli.quiet {
        "gradebook=warn,tower_http=warn"
    } else {
        "gradebook=info,tower_http=debug"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    if let Err(e) = cli::execute(cli).await {
        tracing::error!(kind = e.kind(), "Error: {}", e);
        std::process::exit(1);
    }
}
