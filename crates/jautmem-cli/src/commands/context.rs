use anyhow::Result;
use jautmem_core::{AgentMemory, ContextRequest};

use crate::output::{OutputFormat, json::print_json};

pub fn show(
    memory: &AgentMemory,
    agent: &str,
    topic: &str,
    participants: Vec<String>,
    max_tokens: Option<i64>,
    format: OutputFormat,
) -> Result<()> {
    let request = ContextRequest::new(
        agent,
        max_tokens.unwrap_or(memory.config().default_max_tokens),
    )
    .with_topic(topic)
    .with_participants(participants);
    let window = memory.assemble_context(&request)?;

    if format.is_json() {
        return print_json(&window);
    }

    println!("{}", window.text());
    tracing::debug!(
        tokens = window.total_tokens(),
        remaining = window.remaining_budget,
        "Context budget"
    );
    Ok(())
}
