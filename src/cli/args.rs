//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Stage GWT-style modules for a backing compiler and front it with a dev server
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: stagehand.toml)
    #[arg(short = 'C', long, global = true, default_value = "stagehand.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'V', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Stage every module once and exit
    #[command(visible_alias = "st")]
    Stage,

    /// Stage, launch the backing server, and serve with live reload
    #[command(visible_alias = "s")]
    Serve {
        /// Network interface to bind (e.g., 127.0.0.1, 0.0.0.0)
        #[arg(short, long)]
        interface: Option<std::net::IpAddr>,

        /// Port number to listen on
        #[arg(short, long)]
        port: Option<u16>,

        /// Watch source roots and restage on change
        #[arg(short, long, action = clap::ArgAction::Set, num_args = 0..=1, default_missing_value = "true", require_equals = false)]
        watch: Option<bool>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_serve() {
        let cli = Cli::parse_from(["stagehand", "-V", "serve", "-p", "9000", "--watch", "false"]);
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("stagehand.toml"));
        let Commands::Serve {
            interface,
            port,
            watch,
        } = cli.command
        else {
            panic!("expected serve");
        };
        assert_eq!(interface, None);
        assert_eq!(port, Some(9000));
        assert_eq!(watch, Some(false));
    }

    #[test]
    fn test_parse_stage_with_config() {
        let cli = Cli::parse_from(["stagehand", "stage", "-C", "app/stagehand.toml"]);
        assert!(matches!(cli.command, Commands::Stage));
        assert_eq!(cli.config, PathBuf::from("app/stagehand.toml"));
    }

    #[test]
    fn test_verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
