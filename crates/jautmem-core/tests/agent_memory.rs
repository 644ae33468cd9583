use chrono::{Duration, Utc};
use jautmem_core::memory::{CORE_MEMORY_HEADER, RECENT_ACTIVITY_HEADER, SectionKind, topic_header};
use jautmem_core::{
    AgentMemory, ContextRequest, EntityUpdateMode, FactCategory, InteractionRecord, MemoryConfig,
    RecallOptions,
};
use tempfile::{TempDir, tempdir};

fn open() -> (TempDir, AgentMemory) {
    let tmp = tempdir().unwrap();
    let memory = AgentMemory::open(tmp.path()).unwrap();
    (tmp, memory)
}

#[test]
fn coffee_stains_opinion_is_recalled_and_in_context() {
    let (_tmp, memory) = open();
    memory.init_agent("Cynix").unwrap();

    let fact = memory
        .retain_fact(
            "Cynix",
            FactCategory::Opinion,
            "Coffee stains are a metaphor for human messiness",
            0.8,
            &["coffee_stains".to_string()],
        )
        .unwrap();
    memory
        .retain_fact("Cynix", FactCategory::World, "Nova posts every morning", 1.0, &[])
        .unwrap();

    let hits = memory.recall("Cynix", "coffee stains").unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].fact.id, fact.id);

    let about = memory.recall_about_entity("Cynix", "Coffee Stains", 5).unwrap();
    assert_eq!(about.len(), 1);

    let context = memory
        .get_context_for_llm("Cynix", "coffee", &[], 2000)
        .unwrap();
    assert!(context.starts_with(CORE_MEMORY_HEADER));
    assert!(context.contains(RECENT_ACTIVITY_HEADER));
    assert!(context.contains(&topic_header("coffee")));
    assert!(context.contains("- [opinion] Coffee stains are a metaphor for human messiness ("));
}

#[test]
fn facts_survive_reopen_and_rebuild_gives_same_ranking() {
    let tmp = tempdir().unwrap();
    {
        let memory = AgentMemory::open(tmp.path()).unwrap();
        for text in [
            "coffee coffee coffee",
            "coffee once",
            "tea and coffee and more tea",
            "nothing related",
        ] {
            memory
                .retain_fact("Cynix", FactCategory::Observation, text, 1.0, &[])
                .unwrap();
        }
    }

    let memory = AgentMemory::open(tmp.path()).unwrap();
    let options = RecallOptions::new(10);
    let before: Vec<String> = memory
        .recall_with("Cynix", "coffee tea", &options)
        .unwrap()
        .into_iter()
        .map(|hit| hit.fact.id)
        .collect();
    assert_eq!(before.len(), 3);

    assert_eq!(memory.rebuild_index().unwrap(), 4);

    let after: Vec<String> = memory
        .recall_with("Cynix", "coffee tea", &options)
        .unwrap()
        .into_iter()
        .map(|hit| hit.fact.id)
        .collect();
    assert_eq!(before, after);
}

#[test]
fn concurrent_retains_for_one_agent_are_not_lost() {
    let (_tmp, memory) = open();

    std::thread::scope(|scope| {
        for worker in 0..4 {
            let memory = &memory;
            scope.spawn(move || {
                for i in 0..10 {
                    memory
                        .retain_fact(
                            "Cynix",
                            FactCategory::Observation,
                            &format!("observation {worker} {i} marker"),
                            1.0,
                            &[],
                        )
                        .unwrap();
                }
            });
        }
    });

    assert_eq!(memory.list_facts("Cynix").unwrap().len(), 40);
    let hits = memory
        .recall_with("Cynix", "marker", &RecallOptions::new(100))
        .unwrap();
    assert_eq!(hits.len(), 40);
}

#[test]
fn agents_are_isolated() {
    let (_tmp, memory) = open();
    memory
        .retain_fact("Cynix", FactCategory::World, "secret recipe", 1.0, &[])
        .unwrap();
    memory
        .update_entity("Cynix", "Nova", "owes me coffee", EntityUpdateMode::Append)
        .unwrap();

    assert!(memory.recall("Nova", "recipe").unwrap().is_empty());
    assert!(memory.get_entity("Nova", "Nova").unwrap().is_none());
    assert_eq!(memory.stats("Nova").unwrap().total_facts, 0);
}

#[test]
fn context_budget_keeps_core_and_skips_the_rest() {
    let tmp = tempdir().unwrap();
    let config = MemoryConfig {
        seed_core_memory: false,
        ..Default::default()
    };
    let memory = AgentMemory::open_with_config(tmp.path(), config).unwrap();

    let core = "Cynix is terse. ".repeat(40);
    memory.update_core_memory("Cynix", &core).unwrap();
    memory
        .write_daily_log("Cynix", "Activity", "posted about coffee")
        .unwrap();

    let window = memory
        .assemble_context(&ContextRequest::new("Cynix", 5).with_topic("coffee"))
        .unwrap();
    assert_eq!(window.sections.len(), 1);
    assert_eq!(window.sections[0].kind, SectionKind::CoreMemory);
    assert!(window.text().contains(&core));
    assert!(window.remaining_budget < 0);

    let roomy = memory
        .assemble_context(&ContextRequest::new("Cynix", 100_000).with_topic("coffee"))
        .unwrap();
    assert!(roomy.section(SectionKind::RecentActivity).is_some());
    assert!(roomy.section(SectionKind::TopicFacts).is_none());
}

#[test]
fn recent_logs_cover_only_the_window() {
    let (_tmp, memory) = open();
    let now = Utc::now();
    memory
        .write_daily_log_at("Cynix", now - Duration::days(5), "Activity", "old news")
        .unwrap();
    memory
        .write_daily_log_at("Cynix", now - Duration::days(1), "Activity", "yesterday")
        .unwrap();
    memory
        .write_daily_log_at("Cynix", now, "Activity", "today")
        .unwrap();

    let logs = memory.read_recent_logs("Cynix", 2).unwrap();
    assert!(!logs.contains("old news"));
    let yesterday = logs.find("yesterday").unwrap();
    let today = logs.find("today").unwrap();
    assert!(yesterday < today);

    assert_eq!(memory.stats("Cynix").unwrap().daily_logs, 3);
}

#[test]
fn interaction_flows_into_profile_section() {
    let (_tmp, memory) = open();
    let record = InteractionRecord::new("Nova", "mention")
        .with_summary("quoted my coffee post")
        .with_takeaways(vec!["Nova reads my posts".to_string()]);
    memory.remember_interaction("Cynix", &record).unwrap();

    let context = memory
        .get_context_for_llm("Cynix", "", &["Nova".to_string(), "Cynix".to_string()], 2000)
        .unwrap();
    assert!(context.contains("=== PROFILE: @Nova ==="));
    assert!(context.contains("[mention] quoted my coffee post"));
    assert!(context.contains("- [interaction] Nova reads my posts ("));
    assert!(!context.contains("=== PROFILE: @Cynix ==="));
}

#[test]
fn shared_context_reflects_shared_writes() {
    let (_tmp, memory) = open();
    memory.init_agent("Cynix").unwrap();
    memory
        .shared()
        .log_event("Server migration finished", "high", Utc::now())
        .unwrap();

    let shared = memory.shared().get_shared_context().unwrap();
    assert!(shared.starts_with("=== PLATFORM EVENTS ==="));
    assert!(shared.contains("Server migration finished"));
    assert!(shared.contains("=== SHARED REFERENCES ==="));
}
