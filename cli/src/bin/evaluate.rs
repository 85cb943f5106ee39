//! Scores a synthesized conversation dataset offline: rubric-based
//! explanatory depth, factual correctness against the retrieved context,
//! and grounding of the questions themselves. One LLM call per sample and
//! metric; never part of the live dialogue loop.

use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use socratic_agent::dataset::DatasetConversation;
use socratic_core::{AssistantConfig, LlmBackend, OpenAiClient};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "socratic-eval", version, about)]
struct Args {
    /// Dataset file produced by socratic-datagen
    dataset: PathBuf,

    /// Config file (defaults to the user config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Output report file
    #[arg(short, long, default_value = "eval_results.json")]
    output: PathBuf,
}

/// One (question, context, answer) triple extracted from a conversation.
#[derive(Debug, Clone)]
struct EvalSample {
    topic: String,
    question: String,
    answer: String,
    context: String,
}

#[derive(Debug, Serialize)]
struct SampleScore {
    topic: String,
    question_excerpt: String,
    depth: Option<f32>,
    correctness: Option<f32>,
    grounding: Option<f32>,
}

#[derive(Debug, Serialize)]
struct TopicSummary {
    samples: usize,
    avg_depth: Option<f32>,
    avg_correctness: Option<f32>,
    avg_grounding: Option<f32>,
}

#[derive(Debug, Serialize)]
struct Report {
    samples: Vec<SampleScore>,
    by_topic: BTreeMap<String, TopicSummary>,
}

const DEPTH_RUBRIC: &str = "You are grading the explanatory depth of a teacher's answer on a \
1-5 rubric: 1 = restates the question, 2 = surface-level facts only, 3 = explains mechanisms, \
4 = explains mechanisms and trade-offs, 5 = connects the answer to the wider context of the \
paper. Respond with a single number from 1 to 5 and nothing else.";

const CORRECTNESS_RUBRIC: &str = "Check the correctness of the response with respect to the \
retrieved context. Respond with 1 if the response is factually consistent with the context, \
0 if it is not. Respond with the number only.";

const GROUNDING_RUBRIC: &str = "Decide whether the question is grounded in the research paper: \
compare the question with the given topic and context. Respond with 1 if it is grounded, 0 if \
it is not. Respond with the number only.";

/// Pairs each student question with the teacher answer that follows it.
fn extract_samples(conversation: &DatasetConversation) -> Vec<EvalSample> {
    let messages = &conversation.messages;
    let mut samples = Vec::new();

    for window in messages.windows(2) {
        if window[0].role == "assistant" && window[1].role == "user" {
            samples.push(EvalSample {
                topic: conversation.topic.clone(),
                question: window[0].content.clone(),
                answer: window[1].content.clone(),
                context: conversation.context.clone(),
            });
        }
    }

    samples
}

/// Pulls the first number out of a model response; judges are told to
/// answer with a bare number, but stray prose is tolerated.
fn parse_score(response: &str) -> Option<f32> {
    response
        .split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .find(|token| !token.is_empty() && token.chars().any(|c| c.is_ascii_digit()))
        .and_then(|token| token.parse().ok())
}

async fn judge(backend: &dyn LlmBackend, rubric: &str, body: &str) -> Option<f32> {
    match backend.complete(&format!("{}\n\n{}", rubric, body)).await {
        Ok(response) => {
            let score = parse_score(&response);
            if score.is_none() {
                log::warn!("Judge returned an unparsable score: {:?}", response);
            }
            score
        }
        Err(e) => {
            log::warn!("Judge call failed, skipping sample: {}", e);
            None
        }
    }
}

async fn score_sample(backend: &dyn LlmBackend, sample: &EvalSample) -> SampleScore {
    let qa_body = format!(
        "Topic: {}\nContext:\n{}\n\nQuestion: {}\nResponse: {}",
        sample.topic, sample.context, sample.question, sample.answer
    );
    let question_body = format!(
        "Topic: {}\nContext:\n{}\n\nQuestion: {}",
        sample.topic, sample.context, sample.question
    );

    SampleScore {
        topic: sample.topic.clone(),
        question_excerpt: sample.question.chars().take(100).collect(),
        depth: judge(backend, DEPTH_RUBRIC, &qa_body).await,
        correctness: judge(backend, CORRECTNESS_RUBRIC, &qa_body).await,
        grounding: judge(backend, GROUNDING_RUBRIC, &question_body).await,
    }
}

fn average(values: impl Iterator<Item = Option<f32>>) -> Option<f32> {
    let scored: Vec<f32> = values.flatten().collect();
    if scored.is_empty() {
        None
    } else {
        Some(scored.iter().sum::<f32>() / scored.len() as f32)
    }
}

fn summarize(samples: &[SampleScore]) -> BTreeMap<String, TopicSummary> {
    let mut by_topic: BTreeMap<String, Vec<&SampleScore>> = BTreeMap::new();
    for sample in samples {
        by_topic.entry(sample.topic.clone()).or_default().push(sample);
    }

    by_topic
        .into_iter()
        .map(|(topic, group)| {
            let summary = TopicSummary {
                samples: group.len(),
                avg_depth: average(group.iter().map(|s| s.depth)),
                avg_correctness: average(group.iter().map(|s| s.correctness)),
                avg_grounding: average(group.iter().map(|s| s.grounding)),
            };
            (topic, summary)
        })
        .collect()
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

    let content = fs::read_to_string(&args.dataset)
        .with_context(|| format!("Failed to read {}", args.dataset.display()))?;
    let conversations: Vec<DatasetConversation> =
        serde_json::from_str(&content).context("Dataset file is not valid JSON")?;

    let mut scores = Vec::new();
    for (i, conversation) in conversations.iter().enumerate() {
        let samples = extract_samples(conversation);
        println!(
            "Processing conversation {}/{}: {} ({} turns)",
            i + 1,
            conversations.len(),
            conversation.topic,
            samples.len()
        );
        for sample in &samples {
            scores.push(score_sample(&client, sample).await);
        }
    }

    let report = Report {
        by_topic: summarize(&scores),
        samples: scores,
    };

    fs::write(&args.output, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Failed to write {}", args.output.display()))?;

    println!("\nPer-topic results:");
    for (topic, summary) in &report.by_topic {
        println!(
            "  {}: {} samples, depth {:.2?}, correctness {:.2?}, grounding {:.2?}",
            topic, summary.samples, summary.avg_depth, summary.avg_correctness, summary.avg_grounding
        );
    }
    println!("\nReport written to {}", args.output.display());

    Ok(())
}
