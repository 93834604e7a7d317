//! channeldb binary: serves a channel store over HTTP and talks to one.

mod backend;
mod cli;
mod commands;
mod output;

use clap::Parser;

use crate::cli::{Cli, Commands};
use crate::output::OutputFormat;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let format = if cli.json {
        OutputFormat::Json
    } else {
        OutputFormat::Human
    };

    match cli.command {
        Commands::Serve(args) => commands::serve::run(&args).await,
        Commands::Health(args) => commands::health::run(&args).await,
        Commands::Put(args) => commands::client::put(&args, format).await,
        Commands::Get(args) => commands::client::get(&args, format).await,
        Commands::Del(args) => commands::client::del(&args, format).await,
        Commands::List(args) => commands::client::list(&args, format).await,
    }
}
