//! Serve — the stdio JSON-RPC accept loop.

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, info};

use crate::mcp::McpServer;
use crate::state::SharedState;

/// Read newline-delimited JSON-RPC from stdin and write replies to stdout
/// until EOF or ctrl-c.
pub async fn serve(state: SharedState) -> Result<(), Box<dyn std::error::Error>> {
    let server = McpServer::new(state);

    let stdin = BufReader::new(tokio::io::stdin());
    let mut stdout = tokio::io::stdout();
    let mut lines = stdin.lines();

    info!("Serving MCP over stdio");

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        let line = line.trim();
                        if line.is_empty() {
                            continue;
                        }
                        if let Some(reply) = server.handle_line(line).await {
                            stdout.write_all(reply.as_bytes()).await?;
                            stdout.write_all(b"\n").await?;
                            stdout.flush().await?;
                        }
                    }
                    None => {
                        debug!("stdin closed, shutting down");
                        break;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Received ctrl-c, shutting down");
                break;
            }
        }
    }

    Ok(())
}
