//! Line-oriented management listener.
//!
//! # Responsibilities
//! - Accept management connections on the configured address
//! - Read one command per line and write the reply followed by an empty line
//! - Stop accepting when shutdown is triggered
//!
//! # Design Decisions
//! - One task per connection; commands on a connection run sequentially
//! - `exit`/`quit` close the connection without a reply

use std::net::SocketAddr;
use std::sync::Arc;

use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::broadcast;

use crate::admin::commands::Management;

/// Management listener errors.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error("invalid management address '{0}'")]
    Address(String),

    #[error("failed to bind management listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("management connection error: {0}")]
    Io(#[from] std::io::Error),
}

/// Management server bound to a TCP address.
pub struct AdminServer {
    listener: TcpListener,
    management: Arc<Management>,
}

impl AdminServer {
    pub async fn bind(address: &str, management: Management) -> Result<Self, AdminError> {
        let addr: SocketAddr = address
            .parse()
            .map_err(|_| AdminError::Address(address.to_string()))?;
        let listener = TcpListener::bind(addr).await.map_err(AdminError::Bind)?;

        tracing::info!(address = %listener.local_addr()?, "management listener bound");

        Ok(Self {
            listener,
            management: Arc::new(management),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, AdminError> {
        Ok(self.listener.local_addr()?)
    }

    /// Accept connections until `shutdown` fires.
    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            tokio::select! {
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, peer)) => {
                        tracing::debug!(peer_addr = %peer, "management connection accepted");
                        let management = Arc::clone(&self.management);
                        tokio::spawn(async move {
                            if let Err(e) = serve(stream, management).await {
                                tracing::debug!(peer_addr = %peer, error = %e, "management connection closed");
                            }
                        });
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "management accept failed");
                    }
                },
                _ = shutdown.recv() => {
                    tracing::info!("management listener stopping");
                    break;
                }
            }
        }
    }
}

async fn serve(stream: TcpStream, management: Arc<Management>) -> Result<(), AdminError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines.next_line().await? {
        let command = line.trim();
        if matches!(command, "exit" | "quit") {
            break;
        }
        let mut reply = management.execute(command);
        reply.push_str("\r\n");
        writer.write_all(reply.as_bytes()).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connlimit::{ConnLimiter, ConnlimitView, IdentityKey, LimitSettings};

    async fn start() -> (SocketAddr, Arc<ConnLimiter>, broadcast::Sender<()>) {
        let limiter = Arc::new(ConnLimiter::new(LimitSettings::default()));
        let management = Management::new(ConnlimitView::new(Arc::clone(&limiter)));
        let server = AdminServer::bind("127.0.0.1:0", management).await.unwrap();
        let addr = server.local_addr().unwrap();
        let (tx, rx) = broadcast::channel(1);
        tokio::spawn(server.run(rx));
        (addr, limiter, tx)
    }

    async fn read_reply<R: AsyncBufReadExt + Unpin>(reader: &mut R) -> String {
        let mut reply = String::new();
        loop {
            let mut line = String::new();
            reader.read_line(&mut line).await.unwrap();
            if line == "\r\n" || line.is_empty() {
                return reply;
            }
            reply.push_str(&line);
        }
    }

    #[tokio::test]
    async fn test_show_and_flush_over_tcp() {
        let (addr, limiter, _tx) = start().await;
        limiter.check(IdentityKey::from_raw(0x0a00_0001)).unwrap();

        let stream = TcpStream::connect(addr).await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        writer.write_all(b"connlimit show\n").await.unwrap();
        let reply = read_reply(&mut reader).await;
        assert!(reply.contains("10.0.0.1"));

        writer.write_all(b"connlimit flush ip 10.0.0.1\n").await.unwrap();
        assert_eq!(read_reply(&mut reader).await, "");
        assert!(limiter.is_empty());

        writer.write_all(b"bogus\n").await.unwrap();
        assert!(read_reply(&mut reader).await.starts_with("unknown command\r\n"));
    }

    #[tokio::test]
    async fn test_bad_address() {
        let limiter = Arc::new(ConnLimiter::new(LimitSettings::default()));
        let management = Management::new(ConnlimitView::new(limiter));
        let err = AdminServer::bind("not-an-address", management)
            .await
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "invalid management address 'not-an-address'"
        );
    }

    #[tokio::test]
    async fn test_shutdown_stops_accepting() {
        let limiter = Arc::new(ConnLimiter::new(LimitSettings::default()));
        let management = Management::new(ConnlimitView::new(limiter));
        let server = AdminServer::bind("127.0.0.1:0", management).await.unwrap();
        let (tx, rx) = broadcast::channel(1);
        let handle = tokio::spawn(server.run(rx));

        tx.send(()).unwrap();
        tokio::time::timeout(std::time::Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();
    }
}
