//! CLI module for Lightning Lookup
//!
//! - `serve`: HTTP API with background cache maintenance and prefetching
//! - `suggest`: one-shot ranked suggestions from a dictionary file

pub mod serve;
pub mod suggest;

use clap::{Parser, Subcommand};

/// Lightning Lookup - fast dictionary lookups and search
#[derive(Debug, Parser)]
#[command(name = "lightning-lookup")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve(serve::ServeArgs),

    /// Print ranked suggestions for a query as JSON
    Suggest(suggest::SuggestArgs),
}
