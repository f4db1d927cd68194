//! # media-tools CLI
//!
//! Command-line entry point for the archive media tools.
//!
//! ## Usage
//! ```bash
//! media-tools compress --input scans/images --quality 75
//! media-tools covers "Halloween:1978" "Raging Bull:1980"
//! ```

mod cli;

use std::process::ExitCode;

fn main() -> ExitCode {
    cli::run()
}
