// gate_cli/src/main.rs

use common_utils::GateConfig;
use gate_core::{ChatMessage, DecisionResult};
use orchestrator::DecisionOrchestrator;
use rustyline::{error::ReadlineError, DefaultEditor};
use tracing::debug;
use tracing_subscriber::EnvFilter;

// How many of the typed lines are kept as recent history
const HISTORY_LIMIT: usize = 10;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .init();

    println!("Memory gate CLI. Type a message to see whether it needs long-term memory.");
    println!("Commands: 'stats', 'clear', 'exit'.");

    let config = GateConfig::from_env();
    let orchestrator = DecisionOrchestrator::new(&config)?;
    let mut editor = DefaultEditor::new()?;
    let mut history: Vec<ChatMessage> = Vec::new();

    loop {
        let line = match editor.readline("> ") {
            Ok(line) => line,
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
            Err(e) => return Err(e.into()),
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if let Err(e) = editor.add_history_entry(input) {
            debug!(error = %e, "[gate_cli] Could not record line in editor history");
        }

        match input {
            "exit" => break,
            "stats" => {
                println!("{}", serde_json::to_string_pretty(&orchestrator.stats())?);
                continue;
            }
            "clear" => {
                orchestrator.clear_cache();
                println!("[CLI] Decision cache cleared.");
                continue;
            }
            _ => {}
        }

        let result = orchestrator.decide(input, None, &history).await;
        print_decision(&result);

        history.push(ChatMessage::user(input));
        if history.len() > HISTORY_LIMIT {
            history.remove(0);
        }
    }

    println!("Bye.");
    Ok(())
}

fn print_decision(result: &DecisionResult) {
    let verdict = if result.needs_memory { "USE MEMORY" } else { "SKIP MEMORY" };
    println!(
        "[{}] {} (confidence {:.2}, {} ms)",
        result.method, verdict, result.confidence, result.decision_time_ms
    );
    println!("    {}", result.reasoning);
    if !result.triggers.is_empty() {
        println!("    triggers: {}", result.triggers.join(", "));
    }
    if let Some(error) = &result.error {
        println!("    error: {}", error);
    }
}
