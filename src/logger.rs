//! Terminal output.
//!
//! - `log!` / `debug!`: `[module] message` lines, `debug!` only with `--verbose`
//! - `report_line`: raw lines for size diffs and size tables
//! - watch status: one timestamped block per rebuild, replacing the previous
//!   block when nothing was printed in between
//!
//! ```ignore
//! log!("style"; "wrote {} files", count);
//! status_success("rebuilt style");
//! ```

use std::io::{Write, stdout};
use std::sync::LazyLock;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

use crossterm::{
    cursor, execute,
    terminal::{Clear, ClearType},
};
use owo_colors::OwoColorize;
use parking_lot::Mutex;

static VERBOSE: AtomicBool = AtomicBool::new(false);

pub fn set_verbose(v: bool) {
    VERBOSE.store(v, Ordering::SeqCst);
}

pub fn is_verbose() -> bool {
    VERBOSE.load(Ordering::SeqCst)
}

/// `log!("module"; "fmt", args)`
#[macro_export]
macro_rules! log {
    ($module:expr; $($arg:tt)*) => {{
        $crate::logger::log($module, &format!($($arg)*))
    }};
}

/// Like `log!`, printed only when `--verbose` is on.
#[macro_export]
macro_rules! debug {
    ($module:expr; $($arg:tt)*) => {{
        if $crate::logger::is_verbose() {
            $crate::logger::log($module, &format!($($arg)*))
        }
    }};
}

pub fn log(module: &str, message: &str) {
    let prefix = prefix(module);
    let mut out = stdout().lock();
    execute!(out, Clear(ClearType::UntilNewLine)).ok();
    writeln!(out, "{prefix} {message}").ok();
    out.flush().ok();
    detach_status();
}

/// Print `line` as is.
pub fn report_line(line: &str) {
    let mut out = stdout().lock();
    writeln!(out, "{line}").ok();
    out.flush().ok();
    detach_status();
}

fn prefix(module: &str) -> String {
    let tag = format!("[{module}]");
    match module.to_ascii_lowercase().as_str() {
        "serve" | "reload" => tag.bright_blue().bold().to_string(),
        "watch" => tag.bright_green().bold().to_string(),
        "error" => tag.bright_red().bold().to_string(),
        _ => tag.bright_yellow().bold().to_string(),
    }
}

// ============================================================================
// watch status
// ============================================================================

/// Outcome shown in front of a status block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure,
}

impl Outcome {
    fn symbol(self) -> String {
        match self {
            Self::Success => "✓".green().to_string(),
            Self::Failure => "✗".red().to_string(),
        }
    }
}

/// Status block state: how many lines the last block took on screen.
#[derive(Debug, Default)]
pub struct WatchStatus {
    last_lines: usize,
}

static WATCH_STATUS: LazyLock<Mutex<WatchStatus>> =
    LazyLock::new(|| Mutex::new(WatchStatus::default()));

impl WatchStatus {
    pub fn success(&mut self, message: &str) {
        self.show(Outcome::Success, message);
    }

    /// `detail` goes on the lines below `summary`, if any.
    pub fn error(&mut self, summary: &str, detail: &str) {
        self.show(Outcome::Failure, &block_text(summary, detail));
    }

    fn show(&mut self, outcome: Outcome, text: &str) {
        let mut out = stdout().lock();
        if self.last_lines > 0 {
            let lines = u16::try_from(self.last_lines).unwrap_or(u16::MAX);
            execute!(out, cursor::MoveUp(lines), Clear(ClearType::FromCursorDown)).ok();
        }

        let stamp = format!("[{}]", clock(SystemTime::now())).dimmed().to_string();
        writeln!(out, "{stamp} {} {text}", outcome.symbol()).ok();
        out.flush().ok();
        self.last_lines = line_count(text);
    }

    /// Keep the last block; the next one prints below it.
    pub fn detach(&mut self) {
        self.last_lines = 0;
    }
}

fn block_text(summary: &str, detail: &str) -> String {
    if detail.is_empty() {
        summary.to_string()
    } else {
        format!("{summary}\n{detail}")
    }
}

fn line_count(text: &str) -> usize {
    text.lines().count().max(1)
}

/// `HH:MM:SS`, UTC.
fn clock(now: SystemTime) -> String {
    let secs = now.duration_since(UNIX_EPOCH).map_or(0, |d| d.as_secs());
    format!("{:02}:{:02}:{:02}", secs / 3600 % 24, secs / 60 % 60, secs % 60)
}

fn detach_status() {
    if let Some(mut status) = WATCH_STATUS.try_lock() {
        status.detach();
    }
}

pub fn status_success(message: &str) {
    WATCH_STATUS.lock().success(message);
}

pub fn status_error(summary: &str, detail: &str) {
    WATCH_STATUS.lock().error(summary, detail);
}

pub fn status_detach() {
    WATCH_STATUS.lock().detach();
}
