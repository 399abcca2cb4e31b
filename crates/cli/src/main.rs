//! # autolinker: Command-Line Interface
//!
//! Runs the keyword extractor, the note linker and the PDF pipeline locally,
//! without the HTTP server.

mod commands;

use anyhow::Result;
use autolinker::constants::{
    DEFAULT_LLM_API_KEY, DEFAULT_LLM_BASE_URL, DEFAULT_LLM_MODEL, DEFAULT_MAX_KEYWORDS,
};
use autolinker_pdf::{marker::DEFAULT_MARKER_COMMAND, DEFAULT_ARXIV_API_URL};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    #[command(flatten)]
    llm: LlmArgs,
    #[command(subcommand)]
    command: Commands,
}

/// Settings for the OpenAI-compatible LLM endpoint.
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    #[arg(long, env = "LLM_BASE_URL", default_value = DEFAULT_LLM_BASE_URL, global = true)]
    pub llm_base_url: String,
    #[arg(long, env = "LLM_API_KEY", default_value = DEFAULT_LLM_API_KEY, global = true)]
    pub llm_api_key: String,
    #[arg(long, env = "LLM_MODEL_NAME", default_value = DEFAULT_LLM_MODEL, global = true)]
    pub llm_model_name: String,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Extract keywords from a text file and print them as JSON
    Extract(ExtractArgs),
    /// Wrap a note's keywords in [[wiki-links]]
    Link(LinkArgs),
    /// Convert a PDF into a vault note
    Convert(ConvertArgs),
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// The text or markdown file to analyze
    pub file: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_KEYWORDS)]
    pub max_keywords: usize,
}

#[derive(Args, Debug)]
pub struct LinkArgs {
    /// The markdown note to link
    pub note: PathBuf,
    #[arg(long, default_value_t = DEFAULT_MAX_KEYWORDS)]
    pub max_keywords: usize,
    /// Skip notes that already have at least this many links
    #[arg(long, default_value_t = commands::DEFAULT_IGNORE_THRESHOLD)]
    pub ignore_threshold: usize,
    /// Print the linked note instead of rewriting it
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// The PDF to convert
    pub pdf: PathBuf,
    /// The vault root the note is written into
    #[arg(long, env = "VAULT_PATH")]
    pub vault: PathBuf,
    #[arg(long, value_enum, default_value_t = ConverterArg::Text)]
    pub converter: ConverterArg,
    #[arg(long, env = "MARKER_COMMAND", default_value = DEFAULT_MARKER_COMMAND)]
    pub marker_command: String,
    #[arg(long, env = "METADATA_API_URL", default_value = DEFAULT_ARXIV_API_URL)]
    pub metadata_api_url: String,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConverterArg {
    Text,
    Marker,
}

// --- Main Application Entry ---

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // stdout carries command output, so logs go to stderr.
    let subscriber = fmt::Subscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    match &cli.command {
        Commands::Extract(args) => commands::handle_extract(&cli.llm, args).await,
        Commands::Link(args) => commands::handle_link(&cli.llm, args).await,
        Commands::Convert(args) => commands::handle_convert(args).await,
    }
}
