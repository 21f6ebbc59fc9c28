mod cli;

use std::io::Write;

use clap::Parser;
use color_eyre::eyre::Result;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Command};
use tfrstate::{FindOutcome, OsFs, find, output};

fn main() -> Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    let filter = match cli.log_level.as_deref() {
        Some(level) => EnvFilter::try_new(level)?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Command::Find(args) => {
            let format = args.output_format;
            let param = args.into_param(std::env::current_dir()?);
            if let FindOutcome::Changes(changes) = find::run(&OsFs, &param)? {
                tracing::debug!(count = changes.len(), "find complete");
                stdout.write_all(output::render(&changes, format)?.as_bytes())?;
            }
        }
        Command::Version(args) => {
            stdout.write_all(cli::version_text(args.json)?.as_bytes())?;
        }
    }

    Ok(())
}
