//! CLI argument structures

use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

/// Build file lists and paths for tiered detector data
#[derive(Parser)]
#[command(name = "keyflow")]
#[command(about = "keyflow - file keys, path patterns and file lists for tiered detector data", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the files of a tier selected by a key part or a job label
    #[command(name = "filelist")]
    #[command(group(ArgGroup::new("selection").required(true).args(["keypart", "label"])))]
    Filelist {
        /// Setup file (yaml or json)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Tier to name the files for
        #[arg(short = 't', long)]
        tier: String,

        /// Pattern the input files are searched with
        #[arg(short = 's', long = "search-pattern", value_name = "PATTERN", required = true)]
        search_patterns: Vec<String>,

        /// Partial key, e.g. `-l200-p01-*-cal`
        #[arg(short = 'k', long, allow_hyphen_values = true)]
        keypart: Option<String>,

        /// Job label whose first component names the selection, e.g. `all-l200-p01`
        #[arg(short = 'l', long)]
        label: Option<String>,

        /// File with keys to leave out (json, yaml or keylist)
        #[arg(long, value_name = "FILE")]
        ignore_keys: Option<PathBuf>,
    },

    /// Parse a filename into its key
    #[command(name = "parse")]
    Parse {
        /// Filename to parse
        filename: String,

        /// Template to parse with, defaults to the key grammar
        #[arg(short = 'p', long)]
        pattern: Option<String>,

        /// Parse as a processing output including the processing step
        #[arg(long)]
        processing: bool,
    },

    /// Print the file pattern of a tier
    #[command(name = "pattern")]
    Pattern {
        /// Setup file (yaml or json)
        #[arg(short = 'c', long)]
        config: PathBuf,

        /// Tier to print the pattern for
        #[arg(short = 't', long)]
        tier: String,

        /// Keep patterns that point outside the processing cycle
        #[arg(long)]
        no_cycle_check: bool,
    },
}

impl Commands {
    /// The setup file this command reads, if any
    pub fn setup_file(&self) -> Option<PathBuf> {
        match self {
            Self::Filelist { config, .. } | Self::Pattern { config, .. } => Some(config.clone()),
            Self::Parse { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_filelist_accepts_hyphenated_keypart() {
        let cli = Cli::try_parse_from([
            "keyflow",
            "filelist",
            "-c",
            "setup.yaml",
            "-t",
            "raw",
            "-s",
            "/daq/{run}.*",
            "--keypart",
            "-l200-p01",
        ])
        .unwrap();
        match cli.command {
            Commands::Filelist { keypart, label, .. } => {
                assert_eq!(keypart.as_deref(), Some("-l200-p01"));
                assert!(label.is_none());
            }
            _ => panic!("expected filelist"),
        }
    }

    #[test]
    fn test_filelist_requires_a_selection() {
        let result = Cli::try_parse_from([
            "keyflow", "filelist", "-c", "setup.yaml", "-t", "raw", "-s", "/daq/{run}.*",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_keypart_and_label_conflict() {
        let result = Cli::try_parse_from([
            "keyflow", "filelist", "-c", "s.yaml", "-t", "raw", "-s", "p", "-k", "-l200", "-l", "all-l200",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_setup_file() {
        let cli = Cli::try_parse_from(["keyflow", "-vv", "pattern", "-c", "s.yaml", "-t", "dsp"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.command.setup_file(), Some(PathBuf::from("s.yaml")));
    }
}
