use anyhow::Result;
use jautmem_core::AgentMemory;
use serde_json::json;

use crate::output::{OutputFormat, json::print_json};

pub fn init(memory: &AgentMemory, agent: &str, format: OutputFormat) -> Result<()> {
    let seeded = memory.init_agent(agent)?;

    if format.is_json() {
        return print_json(&json!({ "agent": agent, "seeded_core_memory": seeded }));
    }

    if seeded {
        println!("Initialized {agent} with a fresh core memory");
    } else {
        println!("Initialized {agent}");
    }
    Ok(())
}

pub fn append(
    memory: &AgentMemory,
    agent: &str,
    category: &str,
    text: &str,
    format: OutputFormat,
) -> Result<()> {
    let path = memory.write_daily_log(agent, category, text)?;

    if format.is_json() {
        return print_json(&json!({ "agent": agent, "path": path }));
    }

    println!("Logged to {}", path.display());
    Ok(())
}

pub fn recent(memory: &AgentMemory, agent: &str, days: u32, format: OutputFormat) -> Result<()> {
    if format.is_json() {
        return print_json(&memory.daily_logs(agent, days)?);
    }

    let logs = memory.read_recent_logs(agent, days)?;
    if logs.is_empty() {
        println!("No log entries in the last {days} day(s)");
    } else {
        println!("{logs}");
    }
    Ok(())
}
