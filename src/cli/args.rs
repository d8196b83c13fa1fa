//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Sluice asset pipeline CLI
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file name, searched upward from the current directory
    #[arg(short = 'C', long, default_value = "sluice.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Build style sheets and docs once
    #[command(visible_alias = "b")]
    Build {
        #[command(flatten)]
        build_args: BuildArgs,
    },

    /// Build, then serve the docs with live reload and rebuild on change
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        build_args: BuildArgs,

        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,
    },
}

impl Commands {
    pub const fn build_args(&self) -> &BuildArgs {
        match self {
            Self::Build { build_args } | Self::Watch { build_args, .. } => build_args,
        }
    }
}

/// Shared arguments for Build and Watch
#[derive(clap::Args, Debug, Clone, Default)]
pub struct BuildArgs {
    /// Enable verbose output for debugging
    #[arg(short = 'V', long)]
    pub verbose: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_build_alias() {
        let cli = Cli::try_parse_from(["sluice", "b", "--verbose"]).unwrap();
        assert!(matches!(cli.command, Commands::Build { .. }));
        assert!(cli.command.build_args().verbose);
        assert_eq!(cli.config, PathBuf::from("sluice.toml"));
    }

    #[test]
    fn test_parse_watch_overrides() {
        let cli =
            Cli::try_parse_from(["sluice", "-C", "alt.toml", "w", "--port", "4000", "-i", "0.0.0.0"])
                .unwrap();
        match cli.command {
            Commands::Watch {
                port, interface, ..
            } => {
                assert_eq!(port, Some(4000));
                assert_eq!(interface, Some("0.0.0.0".parse().unwrap()));
            }
            Commands::Build { .. } => panic!("expected watch"),
        }
        assert_eq!(cli.config, PathBuf::from("alt.toml"));
    }

    #[test]
    fn test_color_is_global() {
        let cli = Cli::try_parse_from(["sluice", "build", "--color", "never"]).unwrap();
        assert_eq!(cli.color, ColorChoice::Never);
    }
}
