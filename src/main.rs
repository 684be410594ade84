//! symweave CLI entry point

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use symweave::cli::{Cli, Commands};
use symweave::commands::{run_apply, run_inspect, run_key, CommandContext};
use symweave::config::SymweaveConfig;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(&cli) {
        Ok(output) => {
            print!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            e.exit_code()
        }
    }
}

fn run(cli: &Cli) -> symweave::Result<String> {
    let ctx = CommandContext::from_cli(cli.format, cli.verbose);

    match &cli.command {
        Commands::Apply(args) => run_apply(args, &ctx),
        Commands::Inspect(args) => run_inspect(args, &ctx),
        Commands::Key(args) => run_key(args, &ctx),
    }
}

/// Logs go to stderr; `RUST_LOG` wins over `--verbose` and the config file
fn init_tracing(verbose: bool) {
    let level = if verbose {
        "debug".to_string()
    } else {
        SymweaveConfig::load()
            .map(|config| config.logging.level)
            .unwrap_or_else(|_| "warn".to_string())
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("symweave={}", level)));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
