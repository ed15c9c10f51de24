//! CLI parse: clap types for playlog. No behavior; definitions only.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Playlog CLI - query, scope and aggregate gameplay contexts and events
#[derive(Parser)]
#[command(name = "playlog")]
#[command(about = "Query, scope and aggregate gameplay contexts and events")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (where config/ is looked up)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (applied on top of all other sources)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Access token identifying the caller
    #[arg(long, env = "PLAYLOG_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Enable verbose logging
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,
}

/// Record collection a command operates on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Collection {
    Contexts,
    Events,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Contexts => "contexts",
            Collection::Events => "events",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List records matching a filter, scoped to the caller's groups
    List {
        collection: Collection,
        /// Filter document (JSON)
        #[arg(long)]
        query: Option<String>,
        /// Sort: "+field,-field" or a JSON object such as {"time": -1}
        #[arg(long)]
        sort: Option<String>,
        #[arg(long, default_value = "0")]
        skip: usize,
        /// Page size (0 = no limit)
        #[arg(long, default_value = "0")]
        limit: usize,
        /// Base URL for page links (default: /<collection>)
        #[arg(long)]
        url: Option<String>,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Show one record by id
    Get {
        collection: Collection,
        id: String,
    },
    /// Deferred aggregation queries
    Query {
        #[command(subcommand)]
        command: QueryCommands,
    },
    /// Seed the local store from a JSON Lines file (development only)
    ///
    /// Writes straight to the store named in the configuration and does not
    /// check the access token; anyone who can open the store can seed it.
    Load {
        collection: Collection,
        file: PathBuf,
    },
}

#[derive(Subcommand)]
pub enum QueryCommands {
    /// Validate an aggregation request and print its query id
    Submit {
        collection: Collection,
        /// Request JSON, e.g. {"type":"sum","key":"duration","query":{}}
        request: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
    /// Resolve a query id to its aggregation result
    Result {
        collection: Collection,
        query_id: String,
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}
