use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use socratic_agent::StudentAssistant;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::output::{print_banner, print_session_saved, print_student, prompt_examiner};

fn spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏")
            .template("{spinner} {msg}")
            .unwrap(),
    );
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(120));
    spinner
}

/// Persists the in-progress session if it holds any messages.
fn persist(assistant: &StudentAssistant) -> Result<()> {
    if assistant.history_len() == 0 {
        return Ok(());
    }
    let record = assistant
        .save_session()
        .context("Failed to save session")?;
    print_session_saved(&record, assistant.sessions_path());
    Ok(())
}

/// Runs the interactive examiner loop. Any disruption, including Ctrl-C or
/// end of input, still attempts to persist the in-progress session.
pub async fn run_interactive(mut assistant: StudentAssistant) -> Result<()> {
    print_banner();

    let working = spinner("Thinking of a first question...");
    let opening = assistant.initial_question().await;
    working.finish_and_clear();

    match opening {
        Ok(question) => print_student(&question),
        Err(e) => {
            let _ = persist(&assistant);
            return Err(anyhow::Error::from(e).context("Failed to generate the opening question"));
        }
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        prompt_examiner();
        std::io::stdout().flush().context("Failed to flush stdout")?;

        let line = tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                println!();
                persist(&assistant)?;
                break;
            }
            line = lines.next_line() => line.context("Failed to read input")?,
        };

        let input = match line {
            Some(line) => line.trim().to_string(),
            None => {
                // End of input behaves like quit.
                persist(&assistant)?;
                break;
            }
        };
        if input.is_empty() {
            continue;
        }

        if input.eq_ignore_ascii_case("quit") {
            persist(&assistant)?;
            break;
        }

        if input.eq_ignore_ascii_case("clear") {
            if let Some(record) = assistant.reset().context("Failed to reset session")? {
                print_session_saved(&record, assistant.sessions_path());
            }
            println!("Conversation cleared! New session started.");

            let working = spinner("Thinking of a first question...");
            let question = assistant.initial_question().await;
            working.finish_and_clear();
            match question {
                Ok(question) => print_student(&question),
                Err(e) => {
                    let _ = persist(&assistant);
                    return Err(anyhow::Error::from(e)
                        .context("Failed to generate the opening question"));
                }
            }
            continue;
        }

        let working = spinner("Processing request...");
        let reply = assistant.process_message(&input).await;
        working.finish_and_clear();

        match reply {
            Ok(message) => print_student(&message),
            Err(e) => {
                // Unrecovered failure: generic fatal message, but the
                // session is persisted before bubbling up.
                log::error!("Turn failed: {}", e);
                let _ = persist(&assistant);
                return Err(anyhow::Error::from(e).context("A fatal error interrupted the conversation"));
            }
        }
    }

    Ok(())
}
