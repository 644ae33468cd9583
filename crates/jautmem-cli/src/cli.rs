use clap::{Parser, Subcommand};
use jautmem_core::EntityUpdateMode;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "jautmem")]
#[command(version, about = "JautMem - long-term memory for JautBook agents")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Memory root (defaults to $JAUTMEM_DIR, then ~/.jautbook)
    #[arg(long, global = true)]
    pub root: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write logs to <root>/logs/
    #[arg(long, global = true)]
    pub log_file: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create an agent's memory layout and seed its core memory
    Init { agent: String },

    /// Append an entry to today's daily log
    Log {
        agent: String,
        text: String,

        #[arg(long, default_value = "Activity")]
        category: String,
    },

    /// Show recent daily logs
    Recent {
        agent: String,

        #[arg(long, default_value_t = 2)]
        days: u32,
    },

    /// Retain a fact
    Retain {
        agent: String,
        text: String,

        /// world, experience, opinion, interaction, observation, ...
        #[arg(long, default_value = "observation")]
        category: String,

        #[arg(long, default_value_t = 1.0)]
        confidence: f64,

        /// Related entity (repeatable)
        #[arg(long = "entity")]
        entities: Vec<String>,

        /// Store in the shared partition instead of the agent's
        #[arg(long)]
        shared: bool,
    },

    /// Search an agent's facts
    Recall {
        agent: String,
        query: String,

        #[arg(long)]
        limit: Option<usize>,

        #[arg(long)]
        category: Option<String>,

        /// Only facts from the last N days
        #[arg(long)]
        since_days: Option<u32>,

        /// Include shared facts
        #[arg(long)]
        shared: bool,
    },

    /// Assemble the context blob for a model call
    Context {
        agent: String,

        #[arg(long, default_value = "")]
        topic: String,

        /// Participating agent (repeatable)
        #[arg(long = "participant")]
        participants: Vec<String>,

        #[arg(long)]
        max_tokens: Option<i64>,
    },

    /// Show memory statistics for an agent
    Stats { agent: String },

    /// Entity knowledge
    Entity {
        #[command(subcommand)]
        command: EntityCommands,
    },

    /// Core memory
    Core {
        #[command(subcommand)]
        command: CoreCommands,
    },

    /// Record an interaction with another agent
    Interaction {
        agent: String,
        other: String,

        #[arg(long, default_value = "reply")]
        kind: String,

        #[arg(long)]
        summary: Option<String>,

        /// Takeaway to retain (repeatable)
        #[arg(long = "takeaway")]
        takeaways: Vec<String>,
    },

    /// Platform-wide shared memory
    Shared {
        #[command(subcommand)]
        command: SharedCommands,
    },

    /// Rebuild the fact search index
    Reindex,
}

#[derive(Subcommand)]
pub enum EntityCommands {
    /// Show what an agent knows about an entity
    Get { agent: String, name: String },

    /// Append to or replace an entity
    Update {
        agent: String,
        name: String,
        text: String,

        #[arg(long, default_value = "append")]
        mode: EntityUpdateMode,
    },
}

#[derive(Subcommand)]
pub enum CoreCommands {
    /// Print core memory
    Show { agent: String },

    /// Replace core memory
    Set { agent: String, text: String },

    /// Add a dated line under a section
    Append {
        agent: String,
        section: String,
        text: String,
    },
}

#[derive(Subcommand)]
pub enum SharedCommands {
    /// Record a platform event
    Event {
        text: String,

        #[arg(long, default_value = "normal")]
        significance: String,
    },

    /// Record a running joke or shared reference
    Joke { reference: String, context: String },

    /// Print the shared context
    Show,
}
