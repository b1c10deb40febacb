//! Main entry point for the gzscan CLI application.
//!
//! Prints one report block per gzip member of the input file. Any failure
//! is fatal: the diagnostic goes to stderr and the process exits with the
//! error's status code.

use anyhow::Result;
use clap::Parser;
use std::io::{self, Write};
use std::path::Path;

use gzscan::{Cli, GzError, LocalFileReader, MemberLocator};

fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(&cli) {
        eprintln!("ERROR: {err:#}");
        std::process::exit(exit_code(&err));
    }
}

/// Scan the file named on the command line and report to stdout.
fn run(cli: &Cli) -> Result<()> {
    let reader = LocalFileReader::new(Path::new(&cli.file))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = MemberLocator::new(&reader, &cli.file).scan(&mut out);

    // Keep whatever was reported before a failure
    out.flush()?;
    result?;

    Ok(())
}

/// Status code carried by the error, `1` for anything else.
fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<GzError>()
        .map(GzError::status_code)
        .unwrap_or(1)
}
