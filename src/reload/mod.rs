//! Live reload for `sluice watch`.
//!
//! ```text
//! Orchestrator --broadcast--> ReloadHub --ws--> Browser
//! ```
//!
//! - `message` - JSON frames (`connected`, `reload`)
//! - `hub` - client registry and the [`Broadcast`] seam
//! - `server` - WebSocket acceptor with port retry

pub mod hub;
pub mod message;
pub mod server;

pub use hub::{Broadcast, ReloadHub};
pub use message::ReloadMessage;
pub use server::start_ws_server;
