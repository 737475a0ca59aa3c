use std::process::ExitCode;

use clap::Parser;
use shutdown_watcher::frameworks::cli::{Cli, Command};
use shutdown_watcher::frameworks::config::WatcherSettings;
use shutdown_watcher::frameworks::watcher;

// Always exits successfully so a shutdown hook never blocks on us.
fn main() -> ExitCode {
    let cli = Cli::parse();
    watcher::init_runtime();

    let settings = cli.settings(WatcherSettings::from_env());
    let outcome = match cli.command {
        Command::Run => watcher::run_once(&settings),
        Command::Watch => watcher::watch(&settings),
    };
    tracing::info!(?outcome, "shutdown watcher done");

    ExitCode::SUCCESS
}
