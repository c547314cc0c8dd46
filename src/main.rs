//! create-luts - X16 audio lookup table generator
//!
//! Writes the pitch and note-code tables included by the KERNAL audio bank.
//! Exits non-zero on any failure; the output file is only replaced after the
//! rendered listing has been verified.

mod args;

use anyhow::{bail, Context, Result};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

use args::CliArgs;
use x16_audio_luts::generate_file;

/// Log filter from `RUST_LOG`-style directives, `info` when none are given
fn log_filter(directives: &str) -> EnvFilter {
    EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .parse_lossy(directives)
}

fn main() -> Result<()> {
    let directives = std::env::var(EnvFilter::DEFAULT_ENV).unwrap_or_default();
    tracing_subscriber::fmt()
        .with_env_filter(log_filter(&directives))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let args = CliArgs::parse();

    if args.show_help {
        CliArgs::print_help();
        if args.invalid {
            bail!("invalid arguments");
        }
        return Ok(());
    }

    let summary = generate_file(&args.output_path).with_context(|| {
        format!(
            "failed to generate lookup tables into {}",
            args.output_path.display()
        )
    })?;

    tracing::info!(
        "{} data bytes, KF tables packed from {} to {} bytes",
        summary.total_bytes,
        summary.unpacked_kf_bytes,
        summary.packed_kf_bytes
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_filter_defaults_to_info() {
        assert_eq!(log_filter("").to_string(), "info");
        assert_eq!(log_filter("").max_level_hint(), Some(LevelFilter::INFO));
    }

    #[test]
    fn test_log_filter_raises_global_level() {
        assert_eq!(log_filter("debug").max_level_hint(), Some(LevelFilter::DEBUG));
        assert_eq!(log_filter("trace").max_level_hint(), Some(LevelFilter::TRACE));
    }

    #[test]
    fn test_log_filter_target_directive() {
        let filter = log_filter("x16_audio_luts=debug");
        assert_eq!(filter.max_level_hint(), Some(LevelFilter::DEBUG));
    }
}
