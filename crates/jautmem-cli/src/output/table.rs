use anyhow::Result;
use comfy_table::{Cell, Table};
use jautmem_core::Fact;

use crate::commands::utils::{format_timestamp, preview_text};

pub fn print_table(table: Table) -> Result<()> {
    println!("{table}");
    Ok(())
}

/// One row per fact, with an optional leading score column.
pub fn facts_table<'a>(rows: impl IntoIterator<Item = (Option<f32>, &'a Fact)>) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Score", "ID", "Category", "Created", "Entities", "Content"]);

    for (score, fact) in rows {
        table.add_row(vec![
            Cell::new(score.map(|s| format!("{s:.3}")).unwrap_or_else(|| "-".to_string())),
            Cell::new(fact.id.clone()),
            Cell::new(fact.category.to_string()),
            Cell::new(format_timestamp(Some(fact.created_at))),
            Cell::new(fact.related_entities.join(", ")),
            Cell::new(preview_text(&fact.content, 60)),
        ]);
    }

    table
}
