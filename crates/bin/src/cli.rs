//! CLI argument definitions for the channeldb binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Hierarchical channel store server and client
#[derive(Parser, Debug)]
#[command(name = "channeldb")]
#[command(about = "channeldb: path-addressed channels over an ordered key-value store")]
#[command(version)]
pub struct Cli {
    /// Print machine-readable JSON instead of human-readable output
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the channeldb server
    Serve(ServeArgs),
    /// Check health of a running channeldb server
    Health(HealthArgs),
    /// Write a JSON record at a path
    Put(PutArgs),
    /// Read the record at a path
    Get(GetArgs),
    /// Delete a path and everything below it
    Del(DelArgs),
    /// List the records below a path
    List(ListArgs),
}

/// Arguments for the serve command
#[derive(clap::Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3000, env = "CHANNELDB_PORT")]
    pub port: u16,

    /// Bind address
    #[arg(long, default_value = "0.0.0.0", env = "CHANNELDB_HOST")]
    pub host: String,

    /// Data directory; the store is persisted to channeldb.json inside it
    #[arg(short = 'D', long, env = "CHANNELDB_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Token every request must carry. Unset accepts any token.
    #[arg(long, env = "CHANNELDB_TOKEN")]
    pub token: Option<String>,
}

/// Arguments for the health command
#[derive(clap::Args, Debug)]
pub struct HealthArgs {
    /// Base URL of the server to check
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "CHANNELDB_URL")]
    pub url: String,

    /// Timeout in seconds
    #[arg(short, long, default_value_t = 5)]
    pub timeout: u64,
}

/// Connection options shared by the client commands
#[derive(clap::Args, Debug)]
pub struct ClientArgs {
    /// Base URL of the server
    #[arg(long, default_value = "http://127.0.0.1:3000", env = "CHANNELDB_URL")]
    pub url: String,

    /// Token sent with the request
    #[arg(long, env = "CHANNELDB_TOKEN")]
    pub token: Option<String>,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

#[derive(clap::Args, Debug)]
pub struct PutArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Path of the record
    pub path: String,

    /// Record data as JSON
    pub data: String,
}

#[derive(clap::Args, Debug)]
pub struct GetArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Path of the record
    pub path: String,

    /// Projection as a JSON object
    #[arg(long)]
    pub projection: Option<String>,

    /// Also list the record's children
    #[arg(long)]
    pub children: bool,
}

#[derive(clap::Args, Debug)]
pub struct DelArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Path to delete, with its subtree
    pub path: String,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    #[command(flatten)]
    pub client: ClientArgs,

    /// Path whose children are listed
    #[arg(default_value = "/")]
    pub path: String,

    /// List the whole subtree
    #[arg(long)]
    pub deep: bool,

    /// Descending key order
    #[arg(long)]
    pub reverse: bool,

    /// Include record data
    #[arg(long)]
    pub values: bool,

    /// Maximum number of rows scanned
    #[arg(short, long)]
    pub limit: Option<usize>,

    /// Only keys after this one (relative to the path)
    #[arg(long)]
    pub gt: Option<String>,

    /// Only keys before this one (relative to the path)
    #[arg(long)]
    pub lt: Option<String>,

    /// Filter as JSON: a string for text search or an object for structural matching
    #[arg(long)]
    pub filter: Option<String>,

    /// Projection as a JSON object
    #[arg(long)]
    pub projection: Option<String>,
}
