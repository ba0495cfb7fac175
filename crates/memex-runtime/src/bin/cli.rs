//! memex CLI — offline maintenance and inspection commands.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use colored::Colorize;
use memex_core::{Memory, MemoryKind, Storage};

#[derive(Parser)]
#[command(name = "memex")]
#[command(author = "Memex Team")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "CLI for the memex agent memory engine")]
struct Cli {
    /// Project id to operate on
    #[arg(long, default_value = "default")]
    project: String,

    /// Custom data directory
    #[arg(long)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show memory counts and closure size
    Stats,

    /// Full-text search over stored memories
    Search {
        query: String,
        #[arg(long, default_value = "10")]
        limit: usize,
    },

    /// Store a memory directly (bypasses the observer/promotion pipeline)
    Ingest {
        content: String,
        #[arg(long, default_value = "pattern")]
        kind: String,
        #[arg(long)]
        tags: Option<String>,
    },

    /// Rebuild the knowledge-graph transitive closure
    RebuildClosure,

    /// Show what would be affected by changing a file or node
    Impact { target: String },
}

fn open_storage(cli: &Cli) -> anyhow::Result<Storage> {
    Storage::new(cli.data_dir.clone()).map_err(|e| anyhow::anyhow!(e.to_string()))
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let storage = open_storage(&cli)?;

    match &cli.command {
        Commands::Stats => run_stats(&storage, &cli.project),
        Commands::Search { query, limit } => run_search(&storage, &cli.project, query, *limit),
        Commands::Ingest { content, kind, tags } => {
            run_ingest(&storage, &cli.project, content, kind, tags.as_deref())
        }
        Commands::RebuildClosure => run_rebuild_closure(&storage, &cli.project),
        Commands::Impact { target } => run_impact(&storage, &cli.project, target),
    }
}

fn run_stats(storage: &Storage, project: &str) -> anyhow::Result<()> {
    let memories = storage.list_all_memories(project)?;
    let nodes = storage.get_all_nodes(project)?;
    let edges = storage.get_all_edges(project)?;

    println!("{}", "=== memex statistics ===".cyan().bold());
    println!("{}: {}", "Memories".white().bold(), memories.len());
    println!("{}: {}", "Graph nodes".white().bold(), nodes.len());
    println!("{}: {}", "Graph edges".white().bold(), edges.len());
    Ok(())
}

fn run_search(storage: &Storage, project: &str, query: &str, limit: usize) -> anyhow::Result<()> {
    let hits = storage.search_full_text(project, query, limit)?;
    if hits.is_empty() {
        println!("{}", "no matches".yellow());
        return Ok(());
    }
    for (id, score) in hits {
        if let Some(memory) = storage.get_memory(&id)? {
            println!(
                "{} [{:.3}] {}: {}",
                memory.id.dimmed(),
                score,
                memory.kind.as_str().green(),
                truncate(&memory.content, 100)
            );
        }
    }
    Ok(())
}

fn run_ingest(
    storage: &Storage,
    project: &str,
    content: &str,
    kind: &str,
    tags: Option<&str>,
) -> anyhow::Result<()> {
    let kind = MemoryKind::parse_name(kind)
        .ok_or_else(|| anyhow::anyhow!("unknown memory kind: {kind}"))?;
    let mut memory = Memory::new(project, kind, content);
    if let Some(tags) = tags {
        memory.tags = tags.split(',').map(|t| t.trim().to_string()).collect();
    }
    storage.upsert_memory(&memory)?;
    println!("{} {}", "stored".green().bold(), memory.id);
    Ok(())
}

fn run_rebuild_closure(storage: &Storage, project: &str) -> anyhow::Result<()> {
    let count = storage.rebuild_closure(project)?;
    println!("{} {} entries", "closure rebuilt:".green().bold(), count);
    Ok(())
}

fn run_impact(storage: &Storage, project: &str, target: &str) -> anyhow::Result<()> {
    let result = storage.impact(project, target)?;
    println!("{}", "=== impact ===".cyan().bold());
    println!("{:#?}", result);
    Ok(())
}

fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max])
    }
}
