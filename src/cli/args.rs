//! Command-line interface definitions.

use clap::{ColorChoice, Parser, Subcommand};
use std::path::PathBuf;

/// Rebrand pre-built web pages with self-healing content overrides
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None, arg_required_else_help = true)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,

    /// Config file path (default: whitelabel.toml, searched upward)
    #[arg(short = 'C', long, global = true, default_value = "whitelabel.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,

    /// subcommands
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Write the default whitelabel.toml
    #[command(visible_alias = "i")]
    Init {
        /// Directory to write into (default: current directory)
        #[arg(value_hint = clap::ValueHint::DirPath)]
        dir: Option<PathBuf>,

        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,

        /// Print the config to stdout instead of writing it
        #[arg(long)]
        dry: bool,
    },

    /// Rebrand a page once
    #[command(visible_alias = "a")]
    Apply {
        #[command(flatten)]
        page: PageArgs,
    },

    /// Compile the rule table and report unusable selectors
    #[command(visible_alias = "c")]
    Check {
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Replay a timed script of page events against a page
    #[command(visible_alias = "r")]
    Replay {
        #[command(flatten)]
        page: PageArgs,

        /// Event script (TOML)
        #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
        script: PathBuf,
    },

    /// Re-apply whenever the page or the config changes
    #[command(visible_alias = "w")]
    Watch {
        #[command(flatten)]
        page: PageArgs,
    },
}

/// Input page and output destination.
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// HTML page to rebrand
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_apply() {
        let cli = Cli::try_parse_from(["whitelabel", "apply", "index.html", "-o", "out.html"])
            .unwrap();
        assert_eq!(cli.config, PathBuf::from("whitelabel.toml"));
        match cli.command {
            Commands::Apply { page } => {
                assert_eq!(page.input, PathBuf::from("index.html"));
                assert_eq!(page.output, Some(PathBuf::from("out.html")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["whitelabel", "check", "--json", "-v", "-C", "brand.toml"])
            .unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, PathBuf::from("brand.toml"));
        assert!(matches!(cli.command, Commands::Check { json: true }));
    }

    #[test]
    fn test_replay_requires_script() {
        assert!(Cli::try_parse_from(["whitelabel", "replay", "index.html"]).is_err());
        let cli =
            Cli::try_parse_from(["whitelabel", "r", "index.html", "--script", "events.toml"]).unwrap();
        assert!(matches!(cli.command, Commands::Replay { .. }));
    }

    #[test]
    fn test_parse_init() {
        let cli = Cli::try_parse_from(["whitelabel", "init", "--dry"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Init {
                dir: None,
                force: false,
                dry: true
            }
        ));
    }
}
