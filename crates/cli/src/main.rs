mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use stratum_lib::fingerprint::NormalizerId;
use tracing_subscriber::EnvFilter;

use crate::output::{OutputFormat, print_error};

/// stratum - variant matching and file collection fingerprinting
#[derive(Parser)]
#[command(name = "stratum")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Hash a class path
  Hash {
    /// Class path entries, in order
    paths: Vec<PathBuf>,

    /// Additional entries in platform path-list syntax, appended after PATHS
    #[arg(long, value_name = "LIST")]
    classpath: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Fingerprint a collection of files
  Fingerprint {
    /// Roots to snapshot, in order
    #[arg(required = true)]
    paths: Vec<PathBuf>,

    /// Normalization strategy
    #[arg(short, long, default_value = "classpath")]
    normalizer: NormalizerId,

    /// Glob of entries to ignore (classpath normalizers only)
    #[arg(long, value_name = "GLOB")]
    ignore: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Select the variant matching a request
  Match {
    /// Match request file (TOML)
    file: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,
  },

  /// Show the host platform and available normalizers
  Info,
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let default_level = if cli.verbose { "debug" } else { "warn" };
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match cli.command {
    Commands::Hash {
      paths,
      classpath,
      output,
    } => cmd::cmd_hash(&paths, classpath.as_deref(), output),
    Commands::Fingerprint {
      paths,
      normalizer,
      ignore,
      output,
    } => cmd::cmd_fingerprint(&paths, normalizer, &ignore, output),
    Commands::Match { file, output } => cmd::cmd_match(&file, output),
    Commands::Info => cmd::cmd_info(),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(err) => {
      print_error(&format!("{:#}", err));
      ExitCode::FAILURE
    }
  }
}
