//! TCP server for the host bridge.
//!
//! One host at a time. Each connection gets a fresh engine running in its own
//! [`GameRuntime`] task; the connection is greeted with `welcome`, after which
//! host lines become commands and engine notifications stream back. A second
//! connection while a host is attached receives a `busy` error and is closed.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::core::GameConfig;
use crate::protocol::{parse_host_message, EngineMessage, ErrorCode};
use crate::runtime::{GameRuntime, HostCommand};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub max_pending_commands: usize,
    pub game: GameConfig,
    /// Fixed RNG seed for every connection; wall clock when unset
    pub seed: Option<u32>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7878,
            max_pending_commands: 16,
            game: GameConfig::default(),
            seed: None,
        }
    }
}

impl ServerConfig {
    /// Create from environment variables
    pub fn from_env() -> Self {
        use std::env;

        let defaults = Self::default();
        let host = env::var("TETROMINO_BRIDGE_HOST")
            .ok()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .unwrap_or(defaults.host);
        let port = env::var("TETROMINO_BRIDGE_PORT")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.port);
        let max_pending_commands = env::var("TETROMINO_BRIDGE_MAX_PENDING")
            .ok()
            .and_then(|s| s.trim().parse().ok())
            .unwrap_or(defaults.max_pending_commands);
        let seed = env::var("TETROMINO_SEED")
            .ok()
            .and_then(|s| s.trim().parse().ok());

        Self {
            host,
            port,
            max_pending_commands,
            game: GameConfig::from_env(),
            seed,
        }
    }

    pub fn socket_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }

    fn seed(&self) -> u32 {
        self.seed.unwrap_or_else(crate::core::seed_from_env)
    }
}

/// Accept hosts until the listener fails.
///
/// `ready_tx` receives the bound address (useful with port 0).
pub async fn run_server(
    config: ServerConfig,
    ready_tx: Option<oneshot::Sender<SocketAddr>>,
) -> Result<()> {
    config.game.validate()?;

    let addr = config.socket_addr()?;
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    let bound = listener.local_addr()?;
    info!(%bound, "host bridge listening");
    if let Some(tx) = ready_tx {
        let _ = tx.send(bound);
    }

    let attached = Arc::new(AtomicBool::new(false));
    let config = Arc::new(config);

    // Accept incoming connections
    loop {
        let (mut socket, peer) = listener.accept().await?;

        if attached.swap(true, Ordering::SeqCst) {
            warn!(%peer, "rejecting host: another host is attached");
            tokio::spawn(async move {
                let _ = write_message(
                    &mut socket,
                    &EngineMessage::error(ErrorCode::Busy, "another host is attached"),
                )
                .await;
                let _ = socket.shutdown().await;
            });
            continue;
        }

        info!(%peer, "host connected");
        let attached = Arc::clone(&attached);
        let config = Arc::clone(&config);
        tokio::spawn(async move {
            if let Err(e) = handle_host(socket, &config).await {
                warn!(%peer, error = %e, "host session failed");
            }
            attached.store(false, Ordering::SeqCst);
            info!(%peer, "host disconnected");
        });
    }
}

async fn write_message(socket: &mut TcpStream, msg: &EngineMessage) -> Result<()> {
    let mut buf = serde_json::to_vec(msg)?;
    buf.push(b'\n');
    socket.write_all(&buf).await?;
    Ok(())
}

/// Serve one host until it disconnects.
async fn handle_host(socket: TcpStream, config: &ServerConfig) -> Result<()> {
    let (reader, mut writer) = socket.into_split();
    let mut lines = BufReader::new(reader).lines();

    let (out_tx, mut out_rx) = mpsc::unbounded_channel::<EngineMessage>();
    let (cmd_tx, cmd_rx) = mpsc::channel::<HostCommand>(config.max_pending_commands.max(1));

    let runtime = GameRuntime::new(config.game.clone(), config.seed(), out_tx.clone())?;
    let board = (runtime.game().config().width, runtime.game().config().height);
    let preview = runtime.game().next_piece_size();
    let _ = out_tx.send(EngineMessage::welcome(board, preview));

    let game_task = tokio::spawn(runtime.run(cmd_rx));

    // Spawn task to write messages to the host
    let write_task = tokio::spawn(async move {
        let mut buf: Vec<u8> = Vec::with_capacity(4096);
        while let Some(msg) = out_rx.recv().await {
            buf.clear();
            if serde_json::to_writer(&mut buf, &msg).is_err() {
                continue;
            }
            buf.push(b'\n');
            if writer.write_all(&buf).await.is_err() {
                break;
            }
        }
    });

    let result = read_commands(&mut lines, &cmd_tx, &out_tx).await;

    let _ = cmd_tx.send(HostCommand::Shutdown).await;
    drop(cmd_tx);
    let _ = game_task.await;
    drop(out_tx);
    let _ = write_task.await;
    result
}

async fn read_commands<R>(
    lines: &mut tokio::io::Lines<R>,
    cmd_tx: &mpsc::Sender<HostCommand>,
    out_tx: &mpsc::UnboundedSender<EngineMessage>,
) -> Result<()>
where
    R: tokio::io::AsyncBufRead + Unpin,
{
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let command = parse_host_message(line).and_then(HostCommand::try_from);
        match command {
            Ok(command) => {
                if cmd_tx.send(command).await.is_err() {
                    break;
                }
            }
            Err(err) => {
                warn!(code = ?err.code, message = %err.message, "malformed host message");
                let _ = out_tx.send(err.into());
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.socket_addr().unwrap().port(), 7878);
        assert!(config.socket_addr().unwrap().ip().is_loopback());
    }

    #[test]
    fn test_bad_host_is_an_error() {
        let config = ServerConfig {
            host: "not an address".to_string(),
            ..ServerConfig::default()
        };
        assert!(config.socket_addr().is_err());
    }
}
