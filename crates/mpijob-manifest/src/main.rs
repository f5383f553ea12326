//! Prints an MPIJob manifest for one benchmark run.

use std::io::{self, Write};
use std::process::ExitCode;

use anyhow::{Context, Result};
use mpijob_manifest::ManifestOptions;
use tracing_subscriber::EnvFilter;

fn run(options: &ManifestOptions) -> Result<()> {
    let manifest = mpijob_manifest::generate(options)?;
    let mut stdout = io::stdout().lock();
    stdout
        .write_all(manifest.as_bytes())
        .context("writing manifest to stdout")?;
    stdout.flush().context("flushing stdout")
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn main() -> ExitCode {
    init_tracing();

    let options = match ManifestOptions::try_parse_flags(std::env::args_os()) {
        Ok(options) => options,
        Err(err) if !err.use_stderr() => err.exit(),
        Err(err) => {
            let _ = err.print();
            return ExitCode::FAILURE;
        }
    };

    if let Err(err) = run(&options) {
        eprintln!("error: {err:#}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}
