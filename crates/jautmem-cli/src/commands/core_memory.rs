use anyhow::Result;
use serde_json::json;

use jautmem_core::AgentMemory;

use crate::cli::CoreCommands;
use crate::output::{OutputFormat, json::print_json};

pub fn run(memory: &AgentMemory, command: CoreCommands, format: OutputFormat) -> Result<()> {
    match command {
        CoreCommands::Show { agent } => {
            let content = memory.core_memory(&agent)?;
            if format.is_json() {
                return print_json(&json!({ "agent": agent, "content": content }));
            }
            println!("{}", content.trim_end());
        }
        CoreCommands::Set { agent, text } => {
            memory.update_core_memory(&agent, &text)?;
            if format.is_json() {
                return print_json(&json!({ "agent": agent, "bytes": text.len() }));
            }
            println!("Core memory for {agent} replaced");
        }
        CoreCommands::Append {
            agent,
            section,
            text,
        } => {
            let fact = memory.append_core_memory(&agent, &section, &text)?;
            if format.is_json() {
                return print_json(&fact);
            }
            println!("Added to {section} ({})", fact.id);
        }
    }
    Ok(())
}
