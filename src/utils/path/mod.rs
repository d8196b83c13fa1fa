//! Path utilities.
//!
//! - [`fs`]: Filesystem path resolution (`normalize_path`, `resolve`)
//! - [`pattern`]: Glob helpers (`glob_base`, `matches`, `to_slash`)

pub mod fs;
pub mod pattern;

pub use fs::{normalize_path, relative_to, resolve};
pub use pattern::{glob_base, to_slash};
