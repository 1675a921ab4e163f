//! CLI argument definitions

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "evquery")]
#[command(
    author,
    version,
    about = "Search your files with plain language using Everything"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output format
    #[arg(long, global = true, value_enum, default_value = "cli")]
    pub format: OutputFormat,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert a request into an Everything query without running it
    Convert(ConvertArgs),

    /// Convert a request and run it through Everything
    Search(SearchArgs),

    /// Show model and backend configuration
    Status,

    /// Manage configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ConvertArgs {
    /// Natural language request
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Stream model output and conversion steps to stderr
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args)]
pub struct SearchArgs {
    /// Natural language request
    #[arg(required = true)]
    pub query: Vec<String>,

    /// Maximum number of results
    #[arg(short = 'n')]
    pub limit: Option<usize>,

    /// Stream model output and conversion steps to stderr
    #[arg(long)]
    pub debug: bool,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Set the model API key
    SetKey {
        key: String,
        /// OpenAI-compatible endpoint base URL
        #[arg(long)]
        base_url: Option<String>,
        /// Model name
        #[arg(long)]
        model: Option<String>,
    },
    /// Print the config file location
    Path,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Cli,
    Json,
}
