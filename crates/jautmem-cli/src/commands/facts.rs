use anyhow::Result;
use jautmem_core::{AgentMemory, FactCategory, RecallOptions};
use serde_json::json;

use crate::output::table::{facts_table, print_table};
use crate::output::{OutputFormat, json::print_json};

pub struct RetainArgs<'a> {
    pub agent: &'a str,
    pub text: &'a str,
    pub category: &'a str,
    pub confidence: f64,
    pub entities: &'a [String],
    pub shared: bool,
}

pub fn retain(memory: &AgentMemory, args: RetainArgs<'_>, format: OutputFormat) -> Result<()> {
    let category = FactCategory::from(args.category);
    let fact = if args.shared {
        memory.retain_shared_fact(category, args.text, args.confidence, args.entities)?
    } else {
        memory.retain_fact(args.agent, category, args.text, args.confidence, args.entities)?
    };

    if format.is_json() {
        return print_json(&fact);
    }

    println!("Retained {} [{}]", fact.id, fact.category);
    Ok(())
}

pub fn recall(
    memory: &AgentMemory,
    agent: &str,
    query: &str,
    options: &RecallOptions,
    format: OutputFormat,
) -> Result<()> {
    let results = memory.recall_with(agent, query, options)?;

    if format.is_json() {
        return print_json(&results);
    }

    if results.is_empty() {
        println!("No memories match \"{query}\"");
        return Ok(());
    }

    print_table(facts_table(
        results.iter().map(|scored| (Some(scored.score), &scored.fact)),
    ))
}

pub fn stats(memory: &AgentMemory, agent: &str, format: OutputFormat) -> Result<()> {
    let stats = memory.stats(agent)?;

    if format.is_json() {
        return print_json(&stats);
    }

    println!("Agent: {}", stats.agent);
    println!("  Facts:        {}", stats.total_facts);
    for (category, count) in &stats.facts_by_category {
        println!("    {category:<12} {count}");
    }
    println!("  This week:    {}", stats.facts_this_week);
    println!("  Daily logs:   {}", stats.daily_logs);
    println!("  Entities:     {}", stats.entities);
    println!("  Core memory:  {} bytes", stats.core_memory_bytes);
    Ok(())
}

pub fn reindex(memory: &AgentMemory, format: OutputFormat) -> Result<()> {
    let count = memory.rebuild_index()?;

    if format.is_json() {
        return print_json(&json!({ "indexed": count }));
    }

    println!("Reindexed {count} facts");
    Ok(())
}
