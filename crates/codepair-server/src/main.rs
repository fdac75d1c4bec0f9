//! codepair-server: WebSocket gateway for collaborative editing, remote
//! code execution, and AI autocomplete.
//!
//! Accepts WebSocket connections, binds each to a room with a declared
//! role, relays edits between room members, and fans run submissions out
//! to a Judge0-compatible execution service with one poll loop per run.

mod connection;
mod protocol;
mod room;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::AsyncWriteExt;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::accept_async;

use codepair_ai::{GeminiClient, GeminiConfig};
use codepair_judge::{JudgeClient, JudgeConfig};

use crate::connection::{handle_connection, Services};
use crate::room::RoomStore;

#[derive(Parser)]
#[command(
    name = "codepair-server",
    about = "Collaborative code editor gateway with remote execution"
)]
struct Args {
    /// Port to listen on.
    #[arg(short, long, default_value_t = 5001)]
    port: u16,

    /// Judge0-compatible base URL override.
    #[arg(long)]
    judge_url: Option<String>,

    /// Seconds between run result fetches.
    #[arg(long, default_value_t = 1)]
    poll_interval: u64,

    /// Overall cap in seconds on one run's poll loop.
    #[arg(long, default_value_t = 120)]
    poll_deadline: u64,

    /// Gemini model used for autocomplete.
    #[arg(long, default_value = "gemini-1.5-pro")]
    ai_model: String,
}

/// Fixed liveness payload, served as plain HTTP on the WebSocket port.
const HEALTH_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
content-type: application/json\r\n\
content-length: 15\r\n\
connection: close\r\n\
\r\n\
{\"status\":\"ok\"}";

#[tokio::main]
async fn main() -> codepair_common::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "codepair_server=info".into()),
        )
        .init();

    let args = Args::parse();

    let judge_key = std::env::var("JUDGE0_API_KEY").unwrap_or_default();
    if judge_key.is_empty() {
        tracing::warn!("JUDGE0_API_KEY is not set; run submissions will fail upstream");
    }
    let gemini_key = std::env::var("GOOGLE_API_KEY").unwrap_or_default();
    if gemini_key.is_empty() {
        tracing::warn!("GOOGLE_API_KEY is not set; completions will fail upstream");
    }

    let mut judge_config = JudgeConfig::new(judge_key)
        .with_poll_interval(Duration::from_secs(args.poll_interval))
        .with_poll_deadline(Duration::from_secs(args.poll_deadline));
    if let Some(url) = args.judge_url {
        judge_config = judge_config.with_base_url(url);
    }

    let services = Services {
        store: RoomStore::new(),
        judge: Arc::new(JudgeClient::new(judge_config.clone())),
        ai: Arc::new(GeminiClient::new(
            GeminiConfig::new(gemini_key).with_model(args.ai_model),
        )),
        poll_interval: judge_config.poll_interval,
        poll_deadline: judge_config.poll_deadline,
    };

    let addr = format!("0.0.0.0:{}", args.port);
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!("codepair-server listening on {}", addr);

    loop {
        match listener.accept().await {
            Ok((stream, addr)) => {
                let services = services.clone();
                tokio::spawn(async move {
                    if let Err(e) = serve_stream(stream, addr, services).await {
                        tracing::warn!(peer = %addr, error = %e, "Connection setup failed");
                    }
                });
            }
            Err(e) => {
                tracing::warn!(error = %e, "TCP accept error");
            }
        }
    }
}

/// Answer plain-HTTP liveness probes, hand everything else to the
/// WebSocket handshake.
async fn serve_stream(
    mut stream: TcpStream,
    addr: std::net::SocketAddr,
    services: Services,
) -> std::io::Result<()> {
    let mut head = [0u8; 12];
    let n = stream.peek(&mut head).await?;
    if head[..n].starts_with(b"GET /health") {
        stream.write_all(HEALTH_RESPONSE).await?;
        stream.shutdown().await?;
        return Ok(());
    }

    match accept_async(stream).await {
        Ok(ws) => handle_connection(ws, addr, services).await,
        Err(e) => {
            tracing::warn!(peer = %addr, error = %e, "WS handshake failed");
        }
    }
    Ok(())
}
