//! stdio transport for the duplex message channel.
//!
//! Newline-delimited JSON on stdin/stdout. Malformed lines are logged and
//! skipped rather than terminating the loop — per §5, the observer side
//! must never stall the agent runtime over a single bad message.

use std::io::{self, BufRead, BufReader, Write};
use tracing::{debug, error, warn};

use super::types::Request;
use crate::engine::Session;

pub struct StdioTransport;

impl StdioTransport {
    pub fn new() -> Self {
        Self
    }

    /// Run a single session's message loop over stdio.
    pub async fn run(self, mut session: Session) -> Result<(), io::Error> {
        let stdin = io::stdin();
        let stdout = io::stdout();

        let reader = BufReader::new(stdin.lock());
        let mut stdout = stdout.lock();

        for line in reader.lines() {
            let line = match line {
                Ok(l) => l,
                Err(e) => {
                    error!("failed to read line: {e}");
                    break;
                }
            };

            if line.is_empty() {
                continue;
            }

            debug!("received {} bytes", line.len());

            let request: Request = match serde_json::from_str(&line) {
                Ok(r) => r,
                Err(e) => {
                    warn!("dropping unparsable message: {e}");
                    continue;
                }
            };

            if let Some(response) = session.handle(request).await {
                match serde_json::to_string(&response) {
                    Ok(json) => {
                        writeln!(stdout, "{json}")?;
                        stdout.flush()?;
                    }
                    Err(e) => error!("failed to serialize response: {e}"),
                }
            }
        }

        Ok(())
    }
}

impl Default for StdioTransport {
    fn default() -> Self {
        Self::new()
    }
}
