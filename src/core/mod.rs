//! Core process state shared by the command entry points.

mod state;

pub use state::{is_shutdown, register_server, setup_shutdown_handler};
