#![warn(missing_docs)]
//! glustervol diagnostic CLI

use clap::Parser;
use glustervol_adapter::cli::Cli;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let adapter = cli.build_adapter()?;
    tracing::debug!("{}", adapter.describe());

    let stdout = std::io::stdout();
    cli.run(&adapter, &mut stdout.lock())
}
