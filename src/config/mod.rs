//! Project configuration management for `sluice.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── docs       # [docs]
//! │   ├── serve      # [serve]
//! │   └── style      # [style]
//! ├── error          # ConfigError
//! ├── util           # Config file discovery
//! └── mod.rs         # SluiceConfig (this file)
//! ```
//!
//! The file is optional. Without one every section takes its defaults and
//! the project root is the current directory.

mod error;
pub mod section;
mod util;

pub use error::ConfigError;
pub use section::{DocsConfig, ServeConfig, StyleConfig};
pub use util::find_config_file;

use std::{
    fs,
    net::IpAddr,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    cli::{BuildArgs, Cli, Commands},
    log,
    transform::Transpile,
    utils::path,
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing sluice.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SluiceConfig {
    /// Absolute path to the config file, empty when none was found
    #[serde(skip)]
    pub config_path: PathBuf,

    /// Project root directory - parent of config file, or the cwd
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub docs: DocsConfig,

    /// Development server settings
    #[serde(default)]
    pub serve: ServeConfig,
}

impl SluiceConfig {
    /// Load configuration for a CLI invocation.
    ///
    /// Searches upward from the cwd for the config file, then applies
    /// command-line overrides and validates the result.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let mut config = Self::load_from(&cwd, &cli.config)?;
        config.apply_command_options(&cli.command);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration by searching upward from `start`.
    ///
    /// Does not validate; callers decide when the values are final.
    pub fn load_from(start: &Path, config_name: &Path) -> Result<Self> {
        let mut config = match find_config_file(start, config_name) {
            Some(config_path) => {
                let mut config = Self::from_path(&config_path)?;
                config.config_path = path::normalize_path(&config_path);
                config
            }
            None => {
                crate::debug!("config"; "no {} found, using defaults", config_name.display());
                Self::default()
            }
        };

        let root = config
            .config_path
            .parent()
            .map_or_else(|| start.to_path_buf(), Path::to_path_buf);
        config.root = path::normalize_path(&root);
        Ok(config)
    }

    /// Parse configuration from TOML string
    pub fn from_str(content: &str) -> Result<Self> {
        let (config, ignored) = Self::parse_with_ignored(content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, Path::new("<string>"));
        }
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {field}");
        }
    }

    /// Join a path with the root directory.
    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        path::resolve(&self.root, path.as_ref())
    }

    /// Get path relative to the project root, for display
    pub fn root_relative<'a>(&self, path: &'a Path) -> &'a Path {
        path::relative_to(&self.root, path)
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    pub fn apply_command_options(&mut self, command: &Commands) {
        match command {
            Commands::Build { build_args } => self.apply_build_args(build_args),
            Commands::Watch {
                build_args,
                interface,
                port,
            } => {
                self.apply_build_args(build_args);
                self.apply_serve_options(*interface, *port);
            }
        }
    }

    fn apply_build_args(&mut self, args: &BuildArgs) {
        crate::logger::set_verbose(args.verbose);
    }

    fn apply_serve_options(&mut self, interface: Option<IpAddr>, port: Option<u16>) {
        Self::update_option(&mut self.serve.interface, interface.as_ref());
        Self::update_option(&mut self.serve.port, port.as_ref());
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate configuration, collecting every problem into one error.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut problems = Vec::new();

        for (field, glob) in [
            ("style.src", &self.style.src),
            ("style.watch", &self.style.watch),
            ("docs.src", &self.docs.src),
        ] {
            if let Err(e) = glob::Pattern::new(glob) {
                problems.push(format!("`{field}` is not a valid glob: {e}"));
            }
        }

        if self.style.suffix.is_empty() {
            problems.push("`style.suffix` must not be empty".to_string());
        }
        if self.docs.entry.is_empty() || self.docs.entry.contains('/') {
            problems.push("`docs.entry` must be a plain file name".to_string());
        }
        if let Err(e) = Transpile::new(&self.docs.js_target) {
            problems.push(format!("`docs.js_target`: {e}"));
        }
        if self.serve.port == self.serve.ws_port {
            problems.push(format!(
                "`serve.port` and `serve.ws_port` are both {}",
                self.serve.port
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(problems.join("; ")))
        }
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config from a TOML snippet.
/// Panics if there are unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> SluiceConfig {
    let (parsed, ignored) = SluiceConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================
