//! Synthesizes multi-turn training conversations over a paper and writes
//! them out as a JSON dataset for the offline evaluation tooling.

use anyhow::{Context, Result};
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use socratic_agent::dataset::DatasetGenerator;
use socratic_core::{AssistantConfig, OpenAiClient};
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "socratic-datagen", version, about)]
struct Args {
    /// Path to the paper text to ground conversations on
    document: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Number of conversations to synthesize (capped by topic count)
    #[arg(short, long, default_value_t = 6)]
    num_conversations: usize,

    /// Output dataset file
    #[arg(short, long, default_value = "advanced_rag_dataset.json")]
    output: PathBuf,

    /// Seed for reproducible sampling
    #[arg(long)]
    seed: Option<u64>,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let config_path = args
        .config
        .clone()
        .or_else(AssistantConfig::default_config_path)
        .context("Could not determine a config path")?;
    let config =
        AssistantConfig::load_from_file(&config_path).context("Failed to load configuration")?;

    let client = OpenAiClient::new(&config)?;
    let index = socratic_index::load_or_build(&args.document, &config.cache_dir, &client)
        .await
        .context("Failed to build the document index")?;

    let mut rng = match args.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    let generator = DatasetGenerator::new(config.topics.clone(), config.retrieval_k);
    let dataset = generator
        .generate(&index, &client, &client, args.num_conversations, &mut rng)
        .await
        .context("Dataset generation failed")?;

    fs::write(&args.output, serde_json::to_string_pretty(&dataset)?)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("Generated dataset saved to {}", args.output.display());
    println!("Total conversations: {}", dataset.len());

    let mut user_initiated = 0;
    let mut assistant_initiated = 0;
    for conversation in &dataset {
        match conversation.initiator.as_str() {
            "user" => user_initiated += 1,
            _ => assistant_initiated += 1,
        }
    }
    println!("\nConversation Initiator Statistics:");
    println!("User-initiated: {}", user_initiated);
    println!("Assistant-initiated: {}", assistant_initiated);

    Ok(())
}
