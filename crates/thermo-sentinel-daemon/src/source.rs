//! Concrete reading sources for the daemon.

use async_trait::async_trait;
use thermo_sentinel_core::{LineSource, ReadingSource};
use tokio::io::{BufReader, Stdin};
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use crate::config::SourceConfig;
use crate::error::DaemonResult;

/// Open the configured source.
pub async fn open_source(config: &SourceConfig) -> DaemonResult<Box<dyn ReadingSource>> {
    match config {
        SourceConfig::Stdin => Ok(Box::new(stdin_source())),
        SourceConfig::Tcp { listen_addr } => {
            let listener = TcpListener::bind(listen_addr).await?;
            info!("listening for readings on {}", listener.local_addr()?);
            Ok(Box::new(TcpSource::new(listener)))
        }
    }
}

pub fn stdin_source() -> LineSource<BufReader<Stdin>> {
    LineSource::new(BufReader::new(tokio::io::stdin()), "stdin")
}

/// Accepts one TCP connection at a time and reads newline-delimited
/// payloads from it. When the peer disconnects, the next connection is
/// accepted. Never exhausted.
pub struct TcpSource {
    listener: TcpListener,
    current: Option<LineSource<BufReader<TcpStream>>>,
}

impl TcpSource {
    pub fn new(listener: TcpListener) -> Self {
        Self {
            listener,
            current: None,
        }
    }
}

#[async_trait]
impl ReadingSource for TcpSource {
    async fn next_payload(&mut self) -> std::io::Result<Option<Vec<u8>>> {
        loop {
            if let Some(conn) = self.current.as_mut() {
                match conn.next_payload().await {
                    Ok(Some(payload)) => return Ok(Some(payload)),
                    Ok(None) => info!(peer = %conn.describe(), "reading publisher disconnected"),
                    Err(e) => warn!(peer = %conn.describe(), error = %e, "connection read failed"),
                }
                self.current = None;
            }

            let (stream, peer) = self.listener.accept().await?;
            info!(%peer, "reading publisher connected");
            self.current = Some(LineSource::new(BufReader::new(stream), peer.to_string()));
        }
    }

    fn describe(&self) -> String {
        match self.listener.local_addr() {
            Ok(addr) => format!("tcp://{}", addr),
            Err(_) => "tcp".to_string(),
        }
    }
}
