//! cacheout CLI Application
//!
//! Runs a command once and replays its stdout from the cache until the
//! recording is older than the validity window.

use cacheout::cli::{self, EXIT_CLI, EXIT_OK, exit_code_for, render_error};
use cacheout::commands;
use cacheout::tracing::{TracingConfig, build_subscriber};
use std::io::{self, Write};

fn main() {
    // NOTE: Using eprintln! in panic hook is intentional - tracing infrastructure
    // may be corrupted during a panic, so we use the most reliable output method.
    #[allow(clippy::print_stderr)]
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {panic_info}");
        eprintln!("Internal error occurred. Run with --debug for more information.");
    }));

    let cli = cli::parse();

    let exit_code = match build_subscriber(TracingConfig::from_cli(&cli)) {
        Ok(subscriber) => tracing::subscriber::with_default(subscriber, || run(&cli)),
        Err(e) => {
            render_error(e);
            EXIT_CLI
        }
    };
    std::process::exit(exit_code);
}

/// Run the invocation and map the outcome to an exit code
fn run(cli: &cli::Cli) -> i32 {
    let mut stdout = io::stdout().lock();
    let result = commands::run(cli, &mut stdout);
    let _ = stdout.flush();
    match result {
        Ok(()) => EXIT_OK,
        Err(e) => {
            let code = exit_code_for(&e);
            if e.is_broken_pipe() {
                tracing::debug!(code, "Output closed by its reader");
            } else {
                tracing::debug!(code, "Invocation failed");
                render_error(e);
            }
            code
        }
    }
}
