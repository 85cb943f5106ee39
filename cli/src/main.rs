use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use socratic_agent::StudentAssistant;
use socratic_core::{AssistantConfig, OpenAiClient};

mod app;
mod cli;
mod output;

use crate::cli::Args;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(AssistantConfig::default_config_path)
        .context("Could not determine a config path")?;
    let mut config =
        AssistantConfig::load_from_file(&config_path).context("Failed to load configuration")?;

    if let Some(sessions_file) = args.sessions_file {
        config.sessions_file = sessions_file;
    }
    if let Some(cache_dir) = args.cache_dir {
        config.cache_dir = cache_dir;
    }

    let log_level = config.log_level.as_deref().unwrap_or("info");
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let client = OpenAiClient::new(&config).map_err(|e| {
        eprintln!("{}", format!("Error initializing LLM client: {}", e).red());
        anyhow::Error::from(e)
    })?;

    println!("Preparing knowledge base...");
    let index = socratic_index::load_or_build(&args.document, &config.cache_dir, &client)
        .await
        .context("Failed to build the document index")?;
    log::info!("Knowledge base ready ({} chunks)", index.len());

    let assistant = StudentAssistant::new(
        config,
        index,
        Box::new(client.clone()),
        Box::new(client),
    );

    app::run_interactive(assistant).await
}
