use anyhow::Result;
use chrono::Utc;
use serde_json::json;

use jautmem_core::AgentMemory;

use crate::cli::SharedCommands;
use crate::output::{OutputFormat, json::print_json};

pub fn run(memory: &AgentMemory, command: SharedCommands, format: OutputFormat) -> Result<()> {
    let shared = memory.shared();
    match command {
        SharedCommands::Event { text, significance } => {
            shared.log_event(&text, &significance, Utc::now())?;
            if format.is_json() {
                return print_json(&json!({ "event": text, "significance": significance }));
            }
            println!("Event recorded");
        }
        SharedCommands::Joke { reference, context } => {
            shared.add_joke(&reference, &context, Utc::now())?;
            if format.is_json() {
                return print_json(&json!({ "reference": reference, "context": context }));
            }
            println!("Reference recorded");
        }
        SharedCommands::Show => {
            let context = shared.get_shared_context()?;
            if format.is_json() {
                return print_json(&json!({ "context": context }));
            }
            println!("{context}");
        }
    }
    Ok(())
}
