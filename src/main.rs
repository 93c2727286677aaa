//! kpx - keyphrase extraction for Japanese text
//!
//! kpx ranks candidate phrases of a document by how close their embeddings
//! are to the embedding of the sentence or chunk they come from. Embeddings
//! are computed by a model served from Ollama.

use clap::{Parser, Subcommand};
use kpx_cli::{
    execute_command, exit_code_for_error, ChunkCommand, CliArgs, CliConfig, ExtractCommand,
    InitCommand, ValidateCommand,
};
use kpx_core::{KpxConfig, Result};
use kpx_infra::{init_logger, logger_config_from_env, LoggerConfig};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "kpx")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Embedding-based keyphrase extraction for Japanese text")]
#[command(long_about = r#"
kpx extracts keyphrases from Japanese text. Input is normalized and chunked,
chunks are split into sentences, candidate phrases are built from a
part-of-speech chunk grammar or word n-grams, and candidates are ranked by
embedding similarity to their sentence or chunk.

Settings come from a YAML or JSON file (--config) layered under KPX__
environment variables, e.g. KPX__EXTRACTION__MAX_FILTERED_PHRASES=5.
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Output format (json, yaml, pretty, compact, table)
    #[arg(short, long, default_value = "pretty", global = true)]
    format: String,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract keyphrases from files, inline text or standard input
    Extract(ExtractCommand),

    /// Preview normalization, chunking and sentence splitting
    Chunk(ChunkCommand),

    /// Write a default configuration file
    Init(InitCommand),

    /// Validate a configuration file
    Validate(ValidateCommand),

    /// Show version information
    Version,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = init_logger(logger_config(&cli)) {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }
    if let Err(e) = kpx_cli::init() {
        eprintln!("Error: {}", e);
        return ExitCode::FAILURE;
    }

    info!("Starting kpx v{}", env!("CARGO_PKG_VERSION"));

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::from(exit_code_for_error(&e))
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    let config = cli_config(&cli)?;

    match cli.command {
        Commands::Extract(mut command) => {
            command.cli = config;
            execute_command(command).await
        }
        Commands::Chunk(mut command) => {
            command.cli = config;
            execute_command(command).await
        }
        Commands::Init(mut command) => {
            command.cli = config;
            execute_command(command).await
        }
        Commands::Validate(mut command) => {
            command.cli = config;
            execute_command(command).await
        }
        Commands::Version => {
            println!("{}", kpx_core::version_info());
            println!("kpx-cli v{}", kpx_cli::VERSION);
            println!("kpx-infra v{}", kpx_infra::VERSION);
            Ok(())
        }
    }
}

fn cli_config(cli: &Cli) -> Result<CliConfig> {
    let mut config = CliConfig::default();
    config.merge_with_args(&CliArgs {
        output_format: Some(cli.format.clone()),
        log_level: cli.verbose.then(|| "debug".to_string()),
        use_colors: Some(!cli.no_color),
        config_file: cli.config.clone(),
    })?;
    Ok(config)
}

/// Logging settings: `KPX_LOG_*` variables, else the config file's
/// `logging` section; `--verbose` forces debug
fn logger_config(cli: &Cli) -> LoggerConfig {
    let from_env = std::env::var("KPX_LOG_LEVEL").is_ok();
    let mut config = match &cli.config {
        Some(path) if !from_env => KpxConfig::load(Some(path.as_path()))
            .map(|c| LoggerConfig::from(&c.logging))
            .unwrap_or_else(|_| logger_config_from_env()),
        _ => logger_config_from_env(),
    };

    if cli.verbose {
        config.level = "debug".to_string();
    }
    config
}
