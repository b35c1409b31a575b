//! finddupe - duplicate file finder and eliminator
//!
//! Entry point for the finddupe CLI application.

use finddupe::{cli::Cli, error::ExitCode};

fn main() {
    let cli = Cli::parse();

    match finddupe::run_app(cli) {
        Ok(code) => std::process::exit(code.as_i32()),
        Err(err) => {
            let exit_code = ExitCode::Failure;
            eprintln!("[{}] Error: {}", exit_code.code_prefix(), err);
            std::process::exit(exit_code.as_i32());
        }
    }
}
