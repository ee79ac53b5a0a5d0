//! CLI module for Tutorly
//!
//! Provides commands:
//! - `ask`: free-form prompt
//! - `grammar`: grammar checker
//! - `ielts`: IELTS grammar feedback on an answer
//! - `toefl`: TOEFL feedback comparing an answer with the correct one
//! - `prices`: list the model price table

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tutorly_llm::{Prompt, Provider, DEFAULT_PROFILE};
use tutorly_prompts::{Level, ToeflTask};

pub mod ask;
pub mod prices;

/// Tutorly CLI
#[derive(Parser, Debug)]
#[command(name = "tutorly")]
#[command(about = "LLM-backed English tutoring with per-call cost tracking")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options shared by every command that calls a model
#[derive(Args, Debug, Clone)]
pub struct LlmArgs {
    /// LLM provider (openai or gemini); defaults to $PROVIDER, then openai
    #[arg(long)]
    pub provider: Option<String>,
    /// YAML file with named parameter profiles (embedded defaults if omitted)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Profile to load from the configuration
    #[arg(long, default_value = DEFAULT_PROFILE)]
    pub profile: String,
    /// Override the profile's model
    #[arg(long)]
    pub model: Option<String>,
    /// Override the sampling temperature
    #[arg(long)]
    pub temperature: Option<f32>,
    /// Override the completion token budget
    #[arg(long)]
    pub max_tokens: Option<u32>,
    /// Print call metadata as JSON after the answer
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Send a free-form prompt
    Ask {
        /// Prompt text
        prompt: String,
        /// System instructions
        #[arg(long)]
        instructions: Option<String>,
        #[command(flatten)]
        llm: LlmArgs,
    },
    /// Check and explain grammar (built-in sample sentence if no text)
    Grammar {
        /// Text to check
        text: Option<String>,
        #[command(flatten)]
        llm: LlmArgs,
    },
    /// IELTS grammar and sentence structure feedback
    Ielts {
        /// Student's answer
        answer: String,
        #[command(flatten)]
        llm: LlmArgs,
    },
    /// TOEFL feedback on an answer
    Toefl {
        /// User's answer
        #[arg(long)]
        answer: String,
        /// Correct answer
        #[arg(long)]
        correct: String,
        /// Task: structure, listening or reading
        #[arg(long, default_value = "structure")]
        task: ToeflTask,
        /// Level: beginner, intermediate or advance
        #[arg(long, default_value = "beginner")]
        level: Level,
        #[command(flatten)]
        llm: LlmArgs,
    },
    /// List priced models
    Prices {
        /// Only this provider
        #[arg(long)]
        provider: Option<Provider>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Run the CLI command
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Some(Commands::Ask {
            prompt,
            instructions,
            llm,
        }) => {
            let mut prompt = Prompt::new(prompt);
            if let Some(instructions) = instructions {
                prompt = prompt.with_instructions(instructions);
            }
            ask::run(&llm, prompt).await
        }
        Some(Commands::Grammar { text, llm }) => {
            ask::run(&llm, tutorly_prompts::grammar_checker_prompt(text.as_deref())).await
        }
        Some(Commands::Ielts { answer, llm }) => {
            ask::run(&llm, tutorly_prompts::ielts_tutor_prompt(&answer)).await
        }
        Some(Commands::Toefl {
            answer,
            correct,
            task,
            level,
            llm,
        }) => {
            let prompt = tutorly_prompts::toefl_tutor_prompt(&answer, &correct, task, level);
            ask::run(&llm, prompt).await
        }
        Some(Commands::Prices { provider, json }) => prices::run(provider, json),
        None => {
            let mut cmd = <Cli as clap::CommandFactory>::command();
            cmd.print_help()?;
            println!();
            Ok(())
        }
    }
}
