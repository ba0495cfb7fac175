//! memex-runtime — the agent-facing bridge for the memex memory engine.
//!
//! Speaks the duplex message channel described in spec §6.1 over stdio:
//! tool-call/tool-result/reasoning/step-complete observations flow in
//! fire-and-forget, and `memory_search`/`memory_record`/`memory_step_inject`
//! requests get a correlated response.

mod engine;
mod protocol;

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use memex_core::{Config, SessionType, Storage};
use tracing::{error, info, Level};
use tracing_subscriber::EnvFilter;

use crate::engine::{Engine, Session};
use crate::protocol::stdio::StdioTransport;

/// Parse command-line arguments and return the optional data directory path.
fn parse_args() -> Option<PathBuf> {
    let args: Vec<String> = std::env::args().collect();
    let mut data_dir: Option<PathBuf> = None;
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--help" | "-h" => {
                println!("memex-runtime {}", env!("CARGO_PKG_VERSION"));
                println!();
                println!("Agent memory engine bridge (stdio duplex message channel).");
                println!();
                println!("USAGE:");
                println!("    memex-runtime [OPTIONS]");
                println!();
                println!("OPTIONS:");
                println!("    -h, --help              Print help information");
                println!("    -V, --version           Print version information");
                println!("    --data-dir <PATH>       Custom data directory");
                println!();
                println!("ENVIRONMENT:");
                println!("    RUST_LOG               Log level filter (e.g., debug, info, warn, error)");
                std::process::exit(0);
            }
            "--version" | "-V" => {
                println!("memex-runtime {}", env!("CARGO_PKG_VERSION"));
                std::process::exit(0);
            }
            "--data-dir" => {
                i += 1;
                if i >= args.len() {
                    eprintln!("error: --data-dir requires a path argument");
                    std::process::exit(1);
                }
                data_dir = Some(PathBuf::from(&args[i]));
            }
            arg if arg.starts_with("--data-dir=") => {
                let path = arg.strip_prefix("--data-dir=").unwrap_or("");
                if path.is_empty() {
                    eprintln!("error: --data-dir requires a path argument");
                    std::process::exit(1);
                }
                data_dir = Some(PathBuf::from(path));
            }
            arg => {
                eprintln!("error: unknown argument '{}'", arg);
                eprintln!("Try 'memex-runtime --help' for more information.");
                std::process::exit(1);
            }
        }
        i += 1;
    }

    data_dir
}

#[tokio::main]
async fn main() {
    let data_dir = parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(Level::INFO.into()))
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    info!("memex-runtime v{} starting...", env!("CARGO_PKG_VERSION"));

    let storage = match Storage::new(data_dir) {
        Ok(s) => {
            info!("storage initialized");
            Arc::new(s)
        }
        Err(e) => {
            error!("failed to initialize storage: {e}");
            std::process::exit(1);
        }
    };

    let engine = Engine::new(storage, Config::default());

    let project_id = std::env::var("MEMEX_PROJECT_ID").unwrap_or_else(|_| "default".to_string());
    let session_id = uuid::Uuid::new_v4().to_string();
    let session_type = std::env::var("MEMEX_SESSION_TYPE")
        .ok()
        .and_then(|s| match s.as_str() {
            "pr_review" => Some(SessionType::PrReview),
            "insights" => Some(SessionType::Insights),
            "roadmap" => Some(SessionType::Roadmap),
            "terminal" => Some(SessionType::Terminal),
            "spec_creation" => Some(SessionType::SpecCreation),
            "changelog" => Some(SessionType::Changelog),
            "build" => Some(SessionType::Build),
            _ => None,
        })
        .unwrap_or(SessionType::Build);

    info!(session_id = %session_id, "session starting on stdio");

    let session = Session::new(engine, project_id, session_id, session_type);
    let transport = StdioTransport::new();

    if let Err(e) = transport.run(session).await {
        error!("transport error: {e}");
        std::process::exit(1);
    }

    info!("memex-runtime shutting down");
}
