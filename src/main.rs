//! legacy-gate
//!
//! An HTTP front end that blocks legacy protocol versions.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ──────────────▶ http server ──▶ scope router ──▶ legacy gate ──┬──▶ upstream
//!                                   (host, path)     (policy, ver)   │
//!     ◀──────────────────────────────────────────────────────────────┴─── 426 Upgrade Required
//!
//!     config file ──▶ loader ──▶ validation ──▶ policy resolver ──▶ ArcSwap<Runtime>
//!                       ▲
//!                  file watcher
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use legacy_gate::config::{ConfigSource, Override};
use legacy_gate::lifecycle::startup;
use legacy_gate::routing::ScopeRouter;

#[derive(Parser)]
#[command(name = "legacy-gate")]
#[command(about = "Reject legacy HTTP protocol versions with 426 Upgrade Required", long_about = None)]
struct Cli {
    /// TOML configuration file. Reloaded automatically when it changes.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Set a global directive, e.g. `--set block_http11=on`. Repeatable.
    #[arg(short = 's', long = "set", value_name = "DIRECTIVE=VALUE")]
    overrides: Vec<Override>,

    /// Validate the configuration, print the effective policies and exit.
    #[arg(long)]
    check: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let source = ConfigSource::new(cli.config, cli.overrides);

    let config = match source.load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("legacy-gate: configuration error: {e}");
            return ExitCode::FAILURE;
        }
    };

    if cli.check {
        let router = ScopeRouter::from_config(&config);
        return match serde_json::to_string_pretty(&router.scopes()) {
            Ok(json) => {
                println!("{json}");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("legacy-gate: {e}");
                ExitCode::FAILURE
            }
        };
    }

    match startup::run(config, source).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("legacy-gate: {e}");
            ExitCode::FAILURE
        }
    }
}
