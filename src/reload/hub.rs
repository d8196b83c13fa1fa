//! Live reload client registry.
//!
//! ```text
//! acceptor thread --add_client--> ReloadHub <--broadcast-- orchestrator
//!                                     |
//!                               reader thread (drops closed clients)
//! ```

use std::io::ErrorKind;
use std::net::TcpStream;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use tungstenite::protocol::Message;
use tungstenite::{Error as WsError, WebSocket};

use super::message::ReloadMessage;

/// Receives reload signals after successful rebuilds.
///
/// Implemented by [`ReloadHub`]; tests install a recording broadcaster.
pub trait Broadcast: Send + Sync {
    fn broadcast(&self, message: &ReloadMessage);
}

/// Connected live reload clients.
///
/// Cloning shares the registry.
#[derive(Clone, Default)]
pub struct ReloadHub {
    clients: Arc<Mutex<Vec<WebSocket<TcpStream>>>>,
    closed: Arc<AtomicBool>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Complete the WebSocket handshake and register the client.
    ///
    /// The client receives a `connected` frame right away.
    pub fn add_client(&self, stream: TcpStream) {
        // Blocking during the handshake, non-blocking afterwards
        let mut ws = match tungstenite::accept(stream) {
            Ok(ws) => ws,
            Err(e) => {
                crate::log!("reload"; "handshake failed: {}", e);
                return;
            }
        };

        if let Err(e) = ws.send(Message::Text(ReloadMessage::connected().to_json().into())) {
            crate::log!("reload"; "failed to send connected message: {}", e);
            return;
        }
        let _ = ws.get_ref().set_nonblocking(true);

        let mut clients = self.clients.lock();
        clients.push(ws);
        crate::debug!("reload"; "client connected (total: {})", clients.len());
    }

    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Poll clients for close frames until [`close`](Self::close) is called.
    pub fn spawn_reader(&self) -> std::thread::JoinHandle<()> {
        let hub = self.clone();
        std::thread::spawn(move || {
            while !hub.closed.load(Ordering::Relaxed) {
                std::thread::sleep(Duration::from_millis(100));
                hub.clients.lock().retain_mut(|ws| match ws.read() {
                    Ok(Message::Close(_)) => false,
                    Ok(_) => true,
                    Err(WsError::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
                    Err(_) => false,
                });
            }
        })
    }

    /// Close every client and stop the reader thread.
    pub fn close(&self) {
        self.closed.store(true, Ordering::Relaxed);
        for mut ws in self.clients.lock().drain(..) {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
    }
}

impl Broadcast for ReloadHub {
    /// Send to every client; failed clients are dropped.
    ///
    /// Sockets are non-blocking, so a slow client only buffers the frame.
    fn broadcast(&self, message: &ReloadMessage) {
        let frame = Message::Text(message.to_json().into());
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("reload"; "no clients connected");
            return;
        }

        clients.retain_mut(|ws| match ws.send(frame.clone()) {
            Ok(()) => true,
            Err(WsError::Io(ref e)) if e.kind() == ErrorKind::WouldBlock => true,
            Err(e) => {
                crate::debug!("reload"; "client disconnected: {}", e);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients", clients.len());
    }
}
