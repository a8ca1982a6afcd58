//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use concentrator_core::admin::{AdminServer, Management};
use concentrator_core::clock::MockClock;
use concentrator_core::connlimit::{ConnLimiter, ConnlimitView, LimitSettings};
use concentrator_core::log::{LogTarget, MessageClone, SessionIdentity};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::TcpStream;
use tokio::sync::broadcast;

/// Limiter driven by a mock clock.
pub fn mock_limiter(settings: LimitSettings) -> (Arc<ConnLimiter>, MockClock) {
    let clock = MockClock::default();
    let limiter = Arc::new(ConnLimiter::with_clock(settings, Arc::new(clock.clone())));
    (limiter, clock)
}

/// Target that records every line it receives and keeps the clones alive
/// until [`Recorder::release_all`] is called.
#[derive(Default)]
pub struct Recorder {
    held: Mutex<Vec<MessageClone>>,
    sessions: Mutex<Vec<Option<String>>>,
}

impl Recorder {
    pub fn texts(&self) -> Vec<String> {
        self.held
            .lock()
            .unwrap()
            .iter()
            .map(|m| m.body().text())
            .collect()
    }

    pub fn sessions(&self) -> Vec<Option<String>> {
        self.sessions.lock().unwrap().clone()
    }

    pub fn release_all(&self) {
        for clone in self.held.lock().unwrap().drain(..) {
            clone.release();
        }
    }
}

impl LogTarget for Recorder {
    fn name(&self) -> &str {
        "recorder"
    }

    fn log(&self, msg: MessageClone, session: Option<&SessionIdentity>) {
        self.sessions
            .lock()
            .unwrap()
            .push(session.map(|s| s.sessionid.clone()));
        self.held.lock().unwrap().push(msg);
    }
}

/// Management listener on an ephemeral port.
pub async fn start_admin(limiter: Arc<ConnLimiter>) -> (SocketAddr, broadcast::Sender<()>) {
    let management = Management::new(ConnlimitView::new(limiter));
    let server = AdminServer::bind("127.0.0.1:0", management).await.unwrap();
    let addr = server.local_addr().unwrap();
    let (tx, rx) = broadcast::channel(1);
    tokio::spawn(server.run(rx));
    (addr, tx)
}

/// A management session speaking the line protocol.
pub struct AdminClient {
    reader: BufReader<OwnedReadHalf>,
    writer: OwnedWriteHalf,
}

impl AdminClient {
    pub async fn connect(addr: SocketAddr) -> Self {
        let (reader, writer) = TcpStream::connect(addr).await.unwrap().into_split();
        Self {
            reader: BufReader::new(reader),
            writer,
        }
    }

    /// Send one command and collect the reply up to the terminating empty line.
    pub async fn command(&mut self, line: &str) -> String {
        self.writer
            .write_all(format!("{}\n", line).as_bytes())
            .await
            .unwrap();

        let mut reply = String::new();
        loop {
            let mut line = String::new();
            if self.reader.read_line(&mut line).await.unwrap() == 0 || line == "\r\n" {
                return reply;
            }
            reply.push_str(&line);
        }
    }
}
