//! CLI surface and the interactive prompt.

use std::io::Write;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::AsyncBufReadExt;

use crate::agent_loop::{LoopRunner, TurnOutcome};
use crate::error::Result;

/// Docent conversational agent
#[derive(Parser, Debug)]
#[command(name = "docent", version, about = "Docent — conversational agent")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Interactive chat session (default)
    Chat,
    /// Run the webhook server
    Serve,
}

/// Interactive prompt: one fixed thread per process session.
pub async fn run_repl(runner: Arc<LoopRunner>) -> Result<()> {
    let thread_id = uuid::Uuid::new_v4().to_string();
    let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("User: ");
        std::io::stdout().flush()?;

        let Some(line) = lines.next_line().await? else {
            break;
        };
        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if matches!(input.to_lowercase().as_str(), "quit" | "exit" | "q") {
            println!("Goodbye!");
            break;
        }

        let mut outcome = runner.run(&thread_id, input).await?;
        loop {
            match outcome {
                TurnOutcome::Completed { text } => {
                    println!("Assistant: {text}");
                    break;
                }
                TurnOutcome::AwaitingInput { query } => {
                    println!("Human input needed: {query}");
                    print!("Human: ");
                    std::io::stdout().flush()?;
                    let Some(answer) = lines.next_line().await? else {
                        return Ok(());
                    };
                    outcome = runner.resume(&thread_id, answer.trim()).await?;
                }
            }
        }
    }

    Ok(())
}
