//! A simple program demonstrates how to use `agent-builder` as a library.
//!
//! Every line read from stdin runs one exchange against an
//! OpenAI-compatible or Gemini backend with the built-in tools.

#[macro_use]
extern crate tracing;

use std::env;
use std::io::Write as _;
use std::time::Duration;

use agent_builder::google::{GoogleAIConfigBuilder, GoogleAIProvider};
use agent_builder::openai::{OpenAIConfigBuilder, OpenAIProvider};
use agent_builder::tools::{CalculatorTool, ReadFileTool};
use agent_builder::{AgentBuilder, ExecutionParams, Message, RetryConfig};
use indicatif::{ProgressBar, ProgressStyle};
use owo_colors::OwoColorize;
use tokio::io::{self, AsyncBufReadExt};

const BAR_CHAR: &str = "▎";
const SYSTEM_PROMPT: &str = "You are a helpful assistant running in a \
    terminal. Keep your answers short.";

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let Some(builder) = agent_builder() else {
        eprintln!(
            "neither GOOGLEAI_API_KEY nor OPENAI_API_KEY environment variable is set"
        );
        return;
    };
    let agent = match builder
        .with_tool(CalculatorTool::new())
        .with_tool(ReadFileTool::new())
        .with_retry_config(
            RetryConfig::new(3)
                .with_delay(Duration::from_millis(500))
                .with_backoff_factor(2.0),
        )
        .build()
    {
        Ok(agent) => agent,
        Err(err) => {
            eprintln!("failed to build the agent: {err}");
            return;
        }
    };

    let progress_style = ProgressStyle::default_spinner()
        .tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏ ");

    for turn in 1.. {
        print!("> ");
        std::io::stdout().flush().ok();

        let Some(line) = read_line().await else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let progress_bar = ProgressBar::new_spinner();
        progress_bar.set_style(progress_style.clone());
        progress_bar.set_message("🤔 Thinking...");
        progress_bar.enable_steady_tick(Duration::from_millis(100));

        let params = ExecutionParams::with_context_id(format!("turn-{turn}"));
        let messages = vec![Message::system(SYSTEM_PROMPT), Message::user(line)];
        let result = agent.execute(messages, Some(&params)).await;
        progress_bar.finish_and_clear();

        match result {
            Ok(output) => {
                if let Some(tool) = &output.metadata.tool {
                    println!("{}🔧 used {}", BAR_CHAR.bright_yellow(), tool.bold());
                }
                println!("{}🤖 {}", BAR_CHAR.bright_cyan(), output.data.bright_white());
                if let Some(usage) = &output.usage {
                    debug!(
                        "{} tokens used ({} in, {} out)",
                        usage.total_tokens, usage.input_tokens, usage.output_tokens
                    );
                }
            }
            Err(err) => {
                println!("{}❌ {}", BAR_CHAR.bright_red(), err.red());
            }
        }
    }
}

/// Picks the backend from the environment, preferring Gemini when its key
/// is set.
fn agent_builder() -> Option<AgentBuilder> {
    if let Ok(api_key) = env::var("GOOGLEAI_API_KEY") {
        let mut config = GoogleAIConfigBuilder::with_api_key(api_key);
        if let Ok(model) = env::var("GOOGLEAI_MODEL") {
            config = config.with_model(model);
        }
        let provider = GoogleAIProvider::new(config.build());
        return Some(AgentBuilder::with_model_provider(provider));
    }

    let api_key = env::var("OPENAI_API_KEY").ok()?;
    let mut config = OpenAIConfigBuilder::with_api_key(api_key);
    if let Ok(base_url) = env::var("OPENAI_BASE_URL") {
        config = config.with_base_url(base_url);
    }
    if let Ok(model) = env::var("OPENAI_MODEL") {
        config = config.with_model(model);
    }
    let provider = OpenAIProvider::new(config.build());
    Some(AgentBuilder::with_model_provider(provider))
}

async fn read_line() -> Option<String> {
    let mut stdin = io::BufReader::new(io::stdin());
    let mut line = String::new();

    match stdin.read_line(&mut line).await {
        Ok(0) => None,
        Ok(_) => Some(line),
        Err(err) => {
            error!("error reading input: {}", err);
            None
        }
    }
}
