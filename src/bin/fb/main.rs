mod cli;
mod report;

use std::fs::File;
use std::io::{self, BufWriter, IsTerminal, Write};
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use filebuddy::Command;
use tracing_subscriber::EnvFilter;

use crate::cli::Cli;
use crate::report::Renderer;

fn setup_logging(verbose: bool) {
    let level = if verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("fb: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<ExitCode> {
    let command = Command::from(cli.command);
    let builder = cli.to_builder().map_err(anyhow::Error::msg)?;
    let invocation = builder.build().context("invalid invocation")?;

    // Open the output before anything is changed on disk.
    let (out, terminal): (Box<dyn Write>, bool) = match &cli.output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("could not open output file '{}'", path.display()))?;
            (Box::new(BufWriter::new(file)), false)
        }
        None => (Box::new(io::stdout().lock()), io::stdout().is_terminal()),
    };
    let width = terminal.then(report::terminal_width);

    let report = filebuddy::run(&invocation);

    let mut renderer = Renderer::new(out, terminal, cli.verbose, width);
    renderer.render(command, &report)?;
    renderer.summary(command, &report)?;

    if report.hidden_pruned > 0 {
        eprintln!(
            "fb: {} hidden entries were skipped; pass -a to include them",
            report.hidden_pruned
        );
    }

    Ok(if report.failed() > 0 {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}
