//! crossval - command-line entry point

use clap::Parser;
use crossval::cli::{run, Cli};

fn main() -> anyhow::Result<()> {
    // Logs go to stderr so `--json` output stays machine-readable
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crossval=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
