//! Command-line argument parsing for the lookup table generator.
//!
//! The generator takes no options that change the tables. The only inputs
//! are where to write the listing and a help flag.

use std::env;
use std::path::PathBuf;

use x16_audio_luts::generator::DEFAULT_OUTPUT;

/// Parsed command-line arguments.
#[derive(Debug, PartialEq, Eq)]
pub struct CliArgs {
    /// Listing file to write
    pub output_path: PathBuf,
    /// Whether help was requested
    pub show_help: bool,
    /// Set when an argument was not understood
    pub invalid: bool,
}

impl Default for CliArgs {
    fn default() -> Self {
        Self {
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            show_help: false,
            invalid: false,
        }
    }
}

impl CliArgs {
    /// Parse arguments from the command line.
    pub fn parse() -> Self {
        Self::parse_from(env::args().skip(1))
    }

    /// Parse arguments from an iterator (program name already skipped).
    pub fn parse_from<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut args = Self::default();
        let mut have_output = false;

        for arg in iter {
            match arg.as_str() {
                "--help" | "-h" => {
                    args.show_help = true;
                }
                _ if arg.starts_with('-') => {
                    eprintln!("Unknown flag: {}", arg);
                    args.show_help = true;
                    args.invalid = true;
                }
                _ if have_output => {
                    eprintln!("Unexpected extra argument: {}", arg);
                    args.show_help = true;
                    args.invalid = true;
                }
                _ => {
                    args.output_path = PathBuf::from(arg);
                    have_output = true;
                }
            }
        }

        args
    }

    /// Print help text to stderr.
    pub fn print_help() {
        eprintln!(
            "Usage:\n  create-luts [output.s]\n\n\
             Writes the X16 audio lookup tables as a ca65 listing (default: {DEFAULT_OUTPUT}).\n\n\
             Flags:\n\
             \x20 -h, --help           Show this help\n\n\
             Environment:\n\
             \x20 RUST_LOG             Log filter (default: info)\n"
        );
    }
}
