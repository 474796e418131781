mod cli;
mod commands;
mod output;

use anyhow::Result;
use cli::{Cli, Command};
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Expand { path } => commands::expand(&path, cli.output),
        Command::Normalize { variant, file } => {
            commands::normalize(variant.into(), file.as_deref(), cli.output)
        }
        Command::Flatten { variant, schema, file } => {
            commands::flatten(variant.into(), schema.into(), file.as_deref(), cli.output)
        }
        Command::Check { path } => commands::check(&path, cli.output),
    }
}
