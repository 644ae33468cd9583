use anyhow::Result;
use chrono::Utc;
use jautmem_core::{AgentMemory, InteractionRecord};

use crate::cli::EntityCommands;
use crate::output::{OutputFormat, json::print_json};

pub fn run(memory: &AgentMemory, command: EntityCommands, format: OutputFormat) -> Result<()> {
    match command {
        EntityCommands::Get { agent, name } => {
            let entity = memory.get_entity(&agent, &name)?;
            if format.is_json() {
                return print_json(&entity);
            }
            match entity {
                Some(entity) if !entity.is_empty() => println!("{}", entity.content.trim_end()),
                _ => println!("{agent} knows nothing about {name} yet"),
            }
            Ok(())
        }
        EntityCommands::Update {
            agent,
            name,
            text,
            mode,
        } => {
            let entity = memory.update_entity(&agent, &name, &text, mode)?;
            if format.is_json() {
                return print_json(&entity);
            }
            println!("Updated {} ({mode})", entity.slug);
            Ok(())
        }
    }
}

pub fn interaction(
    memory: &AgentMemory,
    agent: &str,
    other: &str,
    kind: &str,
    summary: Option<String>,
    takeaways: Vec<String>,
    format: OutputFormat,
) -> Result<()> {
    let mut record = InteractionRecord::new(other, kind)
        .with_takeaways(takeaways)
        .at(Utc::now());
    if let Some(summary) = summary {
        record = record.with_summary(summary);
    }

    let entity = memory.remember_interaction(agent, &record)?;

    if format.is_json() {
        return print_json(&entity);
    }

    println!(
        "Recorded {} with {} ({} takeaway(s))",
        record.kind,
        entity.slug,
        record.takeaways.len()
    );
    Ok(())
}
