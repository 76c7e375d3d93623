use std::io::Write;
use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use roster_validator::{
    ClassificationReport, Upload, UploadConfig, ValidationConfig, output, validate_upload,
};
use tracing_subscriber::EnvFilter;

use crate::server::{self, ServerConfig};

/// Default upload limit shared by both commands (10 MB).
const DEFAULT_MAX_BYTES: u64 = 10_485_760;

#[derive(Debug, Parser)]
#[command(name = "roster", version, about = "Validate student roster spreadsheets")]
pub struct Cli {
    /// Increase log verbosity (-v: info, -vv: debug). `RUST_LOG` overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Validate one .xls/.xlsx file and print the report
    Validate(ValidateArgs),
    /// Serve the upload API over HTTP
    Serve(ServeArgs),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Human,
    Json,
}

#[derive(Debug, clap::Args)]
pub struct ValidateArgs {
    /// Spreadsheet to validate
    pub file: PathBuf,

    /// Report format
    #[arg(long, value_enum, default_value_t = OutputFormat::Human)]
    pub format: OutputFormat,

    /// Exit with status 1 when any row is invalid
    #[arg(long)]
    pub fail_on_invalid: bool,

    /// Maximum file size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    pub max_file_size: u64,
}

#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    #[arg(long, default_value_t = 8000)]
    pub port: u16,

    /// Maximum upload size in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BYTES)]
    pub max_upload_bytes: u64,

    /// Allow cross-origin requests from any origin
    #[arg(long)]
    pub cors: bool,
}

/// Parse arguments and run the selected command.
///
/// Returns `Ok(false)` when validation ran but `--fail-on-invalid` found
/// invalid rows.
///
/// # Errors
///
/// Returns an error if the upload is rejected, the report cannot be written,
/// or the server fails to start.
pub async fn run() -> Result<bool> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Validate(args) => {
            let stdout = std::io::stdout();
            let report = validate_command(&args, &mut stdout.lock())?;
            print_status(&args, &report);
            Ok(!(args.fail_on_invalid && !report.is_clean()))
        }
        Commands::Serve(args) => {
            let config = ServerConfig {
                host: args.host,
                port: args.port,
                max_upload_bytes: args.max_upload_bytes,
                cors: args.cors,
                verbose: cli.verbose,
            };
            server::serve(&config).await?;
            Ok(true)
        }
    }
}

/// Validate `args.file` and write the report to `out`.
///
/// # Errors
///
/// Returns the upload rejection (unreadable file, unsupported type, schema
/// mismatch, ...) or a write failure.
pub fn validate_command(args: &ValidateArgs, out: &mut dyn Write) -> Result<ClassificationReport> {
    let mut upload_config = UploadConfig::default();
    upload_config.max_file_size = args.max_file_size;

    let upload = Upload::from_path(&args.file, upload_config.max_file_size)?;
    tracing::info!(file = %args.file.display(), bytes = upload.bytes.len(), "validating");
    let report = validate_upload(&upload, &upload_config, &ValidationConfig::default())?;

    match args.format {
        OutputFormat::Human => output::write_human(&report, out)?,
        OutputFormat::Json => output::write_json(&report, out)?,
    }
    Ok(report)
}

#[allow(clippy::print_stderr)]
fn print_status(args: &ValidateArgs, report: &ClassificationReport) {
    let summary = &report.summary;
    let name = args.file.display();
    if report.is_clean() {
        eprintln!("{} {name}: {} row(s) valid", "ok".green().bold(), summary.valid_count);
    } else {
        eprintln!(
            "{} {name}: {} of {} row(s) invalid",
            "warning".yellow().bold(),
            summary.error_count,
            summary.total_rows
        );
    }
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    // Ignore the error when a subscriber is already installed (tests).
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_validate() {
        let cli = Cli::try_parse_from(["roster", "-vv", "validate", "class5.xlsx", "--format", "json"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        let Commands::Validate(args) = cli.command else {
            panic!("expected validate");
        };
        assert_eq!(args.file, PathBuf::from("class5.xlsx"));
        assert_eq!(args.format, OutputFormat::Json);
        assert!(!args.fail_on_invalid);
        assert_eq!(args.max_file_size, DEFAULT_MAX_BYTES);
    }

    #[test]
    fn test_parse_serve_defaults() {
        let cli = Cli::try_parse_from(["roster", "serve"]).unwrap();
        let Commands::Serve(args) = cli.command else {
            panic!("expected serve");
        };
        assert_eq!(args.host, "127.0.0.1");
        assert_eq!(args.port, 8000);
        assert!(!args.cors);
    }

    #[test]
    fn test_validate_requires_file() {
        assert!(Cli::try_parse_from(["roster", "validate"]).is_err());
    }
}
