//! scancheck - Barcode Roster Checker
//!
//! Entry point for the scancheck CLI application.

use clap::Parser;
use scancheck::{
    cli::Cli,
    error::{ExitCode, StructuredError},
};

fn main() {
    // Parse command-line arguments
    let cli = Cli::parse();
    let json_errors = cli.json_errors;

    // Run the application logic
    match scancheck::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            // Interrupted scans finish normally with their own exit code
            let exit_code = ExitCode::GeneralError;

            // Report the error
            if json_errors {
                let structured = StructuredError::new(&err, exit_code);
                if let Ok(json) = serde_json::to_string_pretty(&structured) {
                    eprintln!("{json}");
                } else {
                    eprintln!("[{}] Error: {err:#}", exit_code.code_prefix());
                }
            } else {
                eprintln!("[{}] Error: {err:#}", exit_code.code_prefix());
            }

            std::process::exit(exit_code.as_i32());
        }
    }
}
