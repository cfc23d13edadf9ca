//! Command routing and execution

use crate::cli::args::Commands;
use crate::config::load_setup;
use crate::filelist::{build_filelist, expand_keys, get_filelist, load_ignore_keys};
use crate::key::{FileKey, ProcessingKey};
use crate::patterns::{key_pattern, processing_pattern, tier_pattern};
use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Execute a CLI command, writing its result to `out`
pub fn execute_command(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Filelist {
            config,
            tier,
            search_patterns,
            keypart,
            label,
            ignore_keys,
        } => run_filelist(
            &config,
            &tier,
            &search_patterns,
            keypart.as_deref(),
            label.as_deref(),
            ignore_keys.as_deref(),
            out,
        ),
        Commands::Parse {
            filename,
            pattern,
            processing,
        } => run_parse(&filename, pattern, processing, out),
        Commands::Pattern {
            config,
            tier,
            no_cycle_check,
        } => run_pattern(&config, &tier, !no_cycle_check, out),
    }
}

fn run_filelist(
    config: &Path,
    tier: &str,
    search_patterns: &[String],
    keypart: Option<&str>,
    label: Option<&str>,
    ignore_keys: Option<&Path>,
    out: &mut impl Write,
) -> Result<()> {
    let setup = load_setup(config)?;
    let files = match (keypart, label) {
        (Some(keypart), _) => {
            let ignore = load_ignore_keys(ignore_keys)?;
            let keys = expand_keys(keypart)?;
            debug!("Searching {} keys", keys.len());
            build_filelist(&setup, &keys, search_patterns, tier, &ignore)?
        }
        (None, Some(label)) => get_filelist(&setup, label, search_patterns, tier, ignore_keys)?,
        (None, None) => anyhow::bail!("either --keypart or --label is required"),
    };

    for file in files {
        writeln!(out, "{file}")?;
    }
    Ok(())
}

fn run_parse(filename: &str, pattern: Option<String>, processing: bool, out: &mut impl Write) -> Result<()> {
    let name = if processing {
        let pattern = pattern.unwrap_or_else(processing_pattern);
        ProcessingKey::from_pattern(filename, &pattern)?.name()
    } else {
        let pattern = pattern.unwrap_or_else(key_pattern);
        FileKey::from_pattern(filename, &pattern)
            .with_context(|| format!("Failed to parse {filename}"))?
            .name()
    };
    writeln!(out, "{name}")?;
    Ok(())
}

fn run_pattern(config: &Path, tier: &str, check_in_cycle: bool, out: &mut impl Write) -> Result<()> {
    let setup = load_setup(config)?;
    writeln!(out, "{}", tier_pattern(&setup, tier, check_in_cycle)?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn run(command: Commands) -> Result<String> {
        let mut out = Vec::new();
        execute_command(command, &mut out)?;
        Ok(String::from_utf8(out)?)
    }

    #[test]
    fn test_parse_command() {
        let output = run(Commands::Parse {
            filename: "/d/l200-det1-cal-run0001-230101T000000.fcio".to_string(),
            pattern: Some("{experiment}-{detector}-{measurement}-{run}-{timestamp}.fcio".to_string()),
            processing: false,
        })
        .unwrap();
        assert_eq!(output, "l200-det1-*-cal-r001-20230101T000000Z\n");
    }

    #[test]
    fn test_parse_processing_command() {
        let output = run(Commands::Parse {
            filename: "l200-det1-cal-r001-20230101T000000Z-tier_dsp".to_string(),
            pattern: None,
            processing: true,
        })
        .unwrap();
        assert_eq!(output, "l200-det1-*-cal-r001-20230101T000000Z-tier_dsp\n");
    }

    #[test]
    fn test_parse_mismatch_keeps_keyflow_error() {
        let err = run(Commands::Parse {
            filename: "nothing".to_string(),
            pattern: None,
            processing: false,
        })
        .unwrap_err();
        assert!(err.downcast_ref::<crate::error::KeyflowError>().is_some());
    }

    #[test]
    fn test_pattern_command() {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("setup.yaml");
        fs::write(&config, "paths:\n  tier: /prod/tier\n  par: /prod/par\n  plt: /prod/plt\n").unwrap();

        let output = run(Commands::Pattern {
            config,
            tier: "hit".to_string(),
            no_cycle_check: false,
        })
        .unwrap();
        assert_eq!(
            output,
            "/prod/tier/hit/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_hit.lh5\n"
        );
    }
}
