mod context;
mod core_memory;
mod entity;
mod facts;
mod logs;
mod shared;
pub mod utils;

use anyhow::Result;
use jautmem_core::AgentMemory;

use crate::cli::Commands;
use crate::output::OutputFormat;

pub fn run(memory: &AgentMemory, command: Commands, format: OutputFormat) -> Result<()> {
    match command {
        Commands::Init { agent } => logs::init(memory, &agent, format),
        Commands::Log {
            agent,
            text,
            category,
        } => logs::append(memory, &agent, &category, &text, format),
        Commands::Recent { agent, days } => logs::recent(memory, &agent, days, format),
        Commands::Retain {
            agent,
            text,
            category,
            confidence,
            entities,
            shared,
        } => facts::retain(
            memory,
            facts::RetainArgs {
                agent: &agent,
                text: &text,
                category: &category,
                confidence,
                entities: &entities,
                shared,
            },
            format,
        ),
        Commands::Recall {
            agent,
            query,
            limit,
            category,
            since_days,
            shared,
        } => {
            let mut options = jautmem_core::RecallOptions::new(
                limit.unwrap_or(memory.config().recall_limit),
            )
            .include_shared(shared || memory.config().include_shared_facts);
            if let Some(category) = category {
                options = options.with_category(category.as_str().into());
            }
            if let Some(days) = since_days {
                options = options.since_days(days);
            }
            facts::recall(memory, &agent, &query, &options, format)
        }
        Commands::Context {
            agent,
            topic,
            participants,
            max_tokens,
        } => context::show(memory, &agent, &topic, participants, max_tokens, format),
        Commands::Stats { agent } => facts::stats(memory, &agent, format),
        Commands::Entity { command } => entity::run(memory, command, format),
        Commands::Core { command } => core_memory::run(memory, command, format),
        Commands::Interaction {
            agent,
            other,
            kind,
            summary,
            takeaways,
        } => entity::interaction(memory, &agent, &other, &kind, summary, takeaways, format),
        Commands::Shared { command } => shared::run(memory, command, format),
        Commands::Reindex => facts::reindex(memory, format),
    }
}
