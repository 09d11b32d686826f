mod cli;

use awsranges::{Client, Origin};
use clap::Parser;
use log::{error, LevelFilter};
use std::io::{self, BufRead, IsTerminal, Write};
use std::process::ExitCode;

/*-------------------------------------------------------------------------------------------------
  Main CLI Function
-------------------------------------------------------------------------------------------------*/

fn main() -> ExitCode {
    let args = cli::Args::parse();

    // Initialize logging
    let level = args.verbose.log_level_filter();
    let _ = stderrlog::new()
        .module(module_path!())
        .quiet(level == LevelFilter::Off)
        .verbosity((level as usize).saturating_sub(1))
        .init();

    // Get the AWS IP ranges
    let fetched = match Client::new().fetch() {
        Ok(fetched) => fetched,
        Err(fetch_error) => {
            error!("{fetch_error}");
            return ExitCode::FAILURE;
        }
    };

    if let Origin::Cache { .. } = fetched.origin {
        if !args.non_interactive && io::stdin().is_terminal() {
            wait_for_enter();
        }
    }

    // Run the query and print the results
    let mut stdout = io::stdout().lock();
    let written = match args.query().execute(&fetched.dataset) {
        Ok(results) => cli::output::write_results(&mut stdout, &results),
        Err(lookup_error) => cli::output::write_lookup_error(&mut stdout, &lookup_error),
    };

    match written.and_then(|_| stdout.flush()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(io_error) if io_error.kind() == io::ErrorKind::BrokenPipe => ExitCode::SUCCESS,
        Err(io_error) => {
            error!("Failed to write output: {io_error}");
            ExitCode::FAILURE
        }
    }
}

/*-------------------------------------------------------------------------------------------------
  Helper Functions
-------------------------------------------------------------------------------------------------*/

/// Pause until the operator presses enter.
fn wait_for_enter() {
    eprint!("Press enter to continue...");
    let _ = io::stderr().flush();
    let mut line = String::new();
    let _ = io::stdin().lock().read_line(&mut line);
}
