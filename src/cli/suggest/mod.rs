//! Suggest command - ranked suggestions printed as JSON

use std::path::PathBuf;
use std::sync::Arc;

use clap::Args;

use crate::config::AppConfig;
use crate::domain::SearchRanker;
use crate::infrastructure::dictionary::load_dictionary;
use crate::infrastructure::logging::init_logging;

#[derive(Debug, Clone, Args)]
pub struct SuggestArgs {
    /// Text to rank suggestions for
    pub query: String,

    /// Maximum number of suggestions
    #[arg(long, default_value_t = 10)]
    pub limit: usize,

    /// Dictionary JSON file (overrides config)
    #[arg(long)]
    pub dictionary: Option<PathBuf>,
}

pub async fn run(args: SuggestArgs) -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // config is optional here; a bare invocation with --dictionary must work
    let config = AppConfig::load().unwrap_or_default();
    init_logging(&config.logging);

    let path = args.dictionary.unwrap_or(config.dictionary.path);
    let index = Arc::new(load_dictionary(&path).await?);

    let suggestions = SearchRanker::new(index).suggest(&args.query, args.limit.max(1));
    println!("{}", serde_json::to_string_pretty(&suggestions)?);

    Ok(())
}
