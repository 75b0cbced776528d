//! cse-manifest CLI entry point
//!
//! Parses arguments, runs the selected command and reports failures with
//! coloured, user-friendly messages.
//!
//! - `versions` - Resolve a template OVA name into component versions
//! - `render` - Render a cluster manifest or entity from settings and a site fixture

use anyhow::Result;
use clap::Parser;
use cse_manifest::cli;
use cse_manifest::core::user_friendly_error;

fn main() -> Result<()> {
    let cli = cli::Cli::parse();

    // Set up colored output for Windows
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    match cli.execute() {
        Ok(()) => Ok(()),
        Err(e) => {
            let error_ctx = user_friendly_error(e);
            error_ctx.display();
            std::process::exit(1);
        }
    }
}
