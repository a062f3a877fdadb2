use std::collections::HashMap;
use std::io::{BufRead, BufReader, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::Context;
use chili::{ClientMessage, ServerMessage};
use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{ConnId, Outbox, Relay};

/// Serves a [`Relay`] over TCP, one JSON message per line.
///
/// Every connection gets a reader thread, which feeds the relay, and a writer
/// thread, which drains the connection's queue of outgoing messages.
pub struct Server<R> {
    relay: Mutex<Relay<R>>,
    queues: Mutex<HashMap<ConnId, Sender<ServerMessage>>>,
    next_conn: AtomicU64,
}

impl<R: Rng + Send + 'static> Server<R> {
    pub fn new(relay: Relay<R>) -> Arc<Self> {
        Arc::new(Self {
            relay: Mutex::new(relay),
            queues: Mutex::new(HashMap::new()),
            next_conn: AtomicU64::new(1),
        })
    }

    /// Accepts connections until the listener fails.
    pub fn serve(self: Arc<Self>, listener: TcpListener) -> anyhow::Result<()> {
        info!(addr = %listener.local_addr()?, mode = ?self.relay.lock().mode(), "Listening");
        for stream in listener.incoming() {
            let stream = match stream {
                Ok(stream) => stream,
                Err(err) => {
                    warn!(%err, "Could not accept connection");
                    continue;
                }
            };
            let server = Arc::clone(&self);
            thread::spawn(move || {
                if let Err(err) = server.handle_connection(stream) {
                    debug!(%err, "Connection ended with an error");
                }
            });
        }
        Ok(())
    }

    fn handle_connection(&self, stream: TcpStream) -> anyhow::Result<()> {
        let conn = self.next_conn.fetch_add(1, Ordering::Relaxed);
        let peer = stream.peer_addr().context("Connection without peer")?;
        info!(conn, %peer, "Connected");

        let (tx, rx) = unbounded();
        self.queues.lock().insert(conn, tx);
        let writer = stream.try_clone()?;
        let writer_thread = thread::spawn(move || write_messages(writer, rx));

        let result = self.read_messages(conn, stream);

        {
            let mut relay = self.relay.lock();
            let outbox = relay.disconnect(conn);
            // Dropping the sender stops the writer thread.
            self.queues.lock().remove(&conn);
            self.deliver(outbox);
        }
        if let Ok(Err(err)) = writer_thread.join() {
            debug!(conn, %err, "Could not write to client");
        }
        info!(conn, "Disconnected");
        result
    }

    fn read_messages(&self, conn: ConnId, stream: TcpStream) -> anyhow::Result<()> {
        for line in BufReader::new(stream).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            // Deliver while holding the lock, so that messages from different
            // connections are queued in the order the relay saw them.
            let mut relay = self.relay.lock();
            let outbox = match serde_json::from_str::<ClientMessage>(&line) {
                Ok(msg) => {
                    debug!(conn, ?msg, "Received");
                    relay.handle(conn, msg)
                }
                Err(err) => vec![(
                    conn,
                    ServerMessage::Error {
                        message: format!("Malformed message: {}", err),
                    },
                )],
            };
            self.deliver(outbox);
        }
        Ok(())
    }

    fn deliver(&self, outbox: Outbox) {
        let queues = self.queues.lock();
        for (conn, msg) in outbox {
            match queues.get(&conn) {
                Some(tx) => {
                    if tx.send(msg).is_err() {
                        debug!(conn, "Writer is gone, dropping message");
                    }
                }
                None => debug!(conn, "Unknown connection, dropping message"),
            }
        }
    }
}

fn write_messages(mut stream: TcpStream, rx: Receiver<ServerMessage>) -> anyhow::Result<()> {
    for msg in rx {
        let mut line = serde_json::to_string(&msg)?;
        line.push('\n');
        stream.write_all(line.as_bytes())?;
        stream.flush()?;
    }
    Ok(())
}
