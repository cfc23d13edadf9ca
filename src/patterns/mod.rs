//! Filename patterns for every artifact of the data production
//!
//! A pattern is a plain string with `{name}` placeholders, e.g.
//! `/data/tier/raw/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_raw.lh5`.
//! The same string is used to render paths from keys and to parse keys back
//! out of paths, see [`crate::key`].
//!
//! Functions taking a `check_in_cycle` flag redirect the pattern to the
//! scratch directory when the computed path does not live inside the
//! processing cycle's own tree.

use crate::config::SetupConfig;
use crate::error::{KeyflowError, Result};
use std::path::{Path, PathBuf};
use tracing::warn;

pub const DEFAULT_DAQ_EXTENSION: &str = "fcio";
pub const DEFAULT_PAR_EXTENSION: &str = "yaml";
pub const DEFAULT_PLT_EXTENSION: &str = "pkl";

/// The filename grammar of a key
///
/// `campaign` is part of [`crate::key::FileKey`] but never part of a filename.
pub fn key_pattern() -> String {
    "{experiment}-{detector}-{measurement}-{run}-{timestamp}".to_string()
}

pub fn processing_pattern() -> String {
    key_pattern() + "-{processing_step}"
}

pub fn par_pattern() -> String {
    key_pattern()
}

fn to_pattern(path: PathBuf) -> String {
    path.to_string_lossy().into_owned()
}

fn is_in_cycle(pattern: &str, root: &Path) -> bool {
    pattern.contains(root.to_string_lossy().as_ref())
}

/// Raw DAQ files, `<tier_daq>/{detector}/c1/{measurement}/<key>.<extension>`
pub fn tier_daq_pattern(setup: &SetupConfig, extension: &str, check_in_cycle: bool) -> Result<String> {
    let pattern = to_pattern(
        setup
            .tier_path("daq")?
            .join("{detector}")
            .join("c1")
            .join("{measurement}")
            .join(format!("{}.{}", key_pattern(), extension)),
    );
    if check_in_cycle && !is_in_cycle(&pattern, setup.tier_root()) {
        warn!("DAQ pattern {} is outside the processing cycle, using scratch", pattern);
        return Ok(to_pattern(
            setup.tmp_root().join(format!("{}.{}", key_pattern(), extension)),
        ));
    }
    Ok(pattern)
}

/// Pattern of the files of one data tier
///
/// `daq` files keep the acquisition layout; `raw`, `dsp` and `hit` files are
/// `<tier_root>/{detector}/{measurement}/<key>-tier_<tier>.lh5`.
pub fn tier_pattern(setup: &SetupConfig, tier: &str, check_in_cycle: bool) -> Result<String> {
    let pattern = match tier {
        "daq" => tier_daq_pattern(setup, DEFAULT_DAQ_EXTENSION, false)?,
        "raw" | "dsp" | "hit" => to_pattern(
            setup
                .tier_path(tier)?
                .join("{detector}")
                .join("{measurement}")
                .join(format!("{}-tier_{}.lh5", key_pattern(), tier)),
        ),
        other => return Err(KeyflowError::invalid_tier(other)),
    };

    if check_in_cycle && !is_in_cycle(&pattern, setup.tier_root()) {
        warn!("Tier pattern {} is outside the processing cycle, using scratch", pattern);
        return Ok(to_pattern(
            setup
                .tmp_root()
                .join(format!("{}-tier_{}.lh5", key_pattern(), tier)),
        ));
    }
    Ok(pattern)
}

fn artifact_suffix(kind: &str, tier: &str, name: Option<&str>, extension: &str) -> String {
    match name {
        Some(name) => format!("-{kind}_{tier}_{name}.{extension}"),
        None => format!("-{kind}_{tier}.{extension}"),
    }
}

/// Parameter files, `<par_root>/{detector}/{measurement}/<key>-par_<tier>[_<name>].<ext>`
pub fn pars_pattern(
    setup: &SetupConfig,
    tier: &str,
    name: Option<&str>,
    extension: &str,
    check_in_cycle: bool,
) -> Result<String> {
    let suffix = artifact_suffix("par", tier, name, extension);
    let pattern = to_pattern(
        setup
            .par_path(tier)?
            .join("{detector}")
            .join("{measurement}")
            .join(par_pattern() + &suffix),
    );

    if check_in_cycle && !is_in_cycle(&pattern, setup.par_root()) {
        warn!("Parameter pattern {} is outside the processing cycle, using scratch", pattern);
        return Ok(to_pattern(setup.tmp_root().join(par_pattern() + &suffix)));
    }
    Ok(pattern)
}

pub fn pars_tmp_pattern(
    setup: &SetupConfig,
    tier: &str,
    name: Option<&str>,
    extension: &str,
) -> String {
    to_pattern(
        setup
            .tmp_par_path()
            .join(par_pattern() + &artifact_suffix("par", tier, name, extension)),
    )
}

/// Tuning plots, `<plt_root>/<tier>/{detector}/{measurement}/<key>-plt_<tier>[_<name>].pkl`
pub fn plts_pattern(setup: &SetupConfig, tier: &str, name: Option<&str>) -> String {
    to_pattern(
        setup
            .plt_root()
            .join(tier)
            .join("{detector}")
            .join("{measurement}")
            .join(par_pattern() + &artifact_suffix("plt", tier, name, DEFAULT_PLT_EXTENSION)),
    )
}

pub fn plts_tmp_pattern(
    setup: &SetupConfig,
    tier: &str,
    name: Option<&str>,
    extension: &str,
) -> String {
    to_pattern(
        setup
            .tmp_plt_path()
            .join(par_pattern() + &artifact_suffix("plt", tier, name, extension)),
    )
}

/// Log files of one processing step, grouped under the time of the run
pub fn log_pattern(setup: &SetupConfig, processing_step: &str, time: &str) -> String {
    to_pattern(
        setup
            .tmp_log_path()
            .join(time)
            .join(processing_step)
            .join(format!("{}-{}.log", key_pattern(), processing_step)),
    )
}

pub fn log_par_pattern(setup: &SetupConfig, processing_step: &str, time: &str) -> String {
    to_pattern(
        setup
            .tmp_log_path()
            .join(time)
            .join(processing_step)
            .join(format!("{}-{}.log", par_pattern(), processing_step)),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup() -> SetupConfig {
        SetupConfig::rooted_at("/prod")
    }

    #[test]
    fn test_key_pattern_has_no_campaign() {
        assert!(!key_pattern().contains("{campaign}"));
        assert_eq!(
            processing_pattern(),
            "{experiment}-{detector}-{measurement}-{run}-{timestamp}-{processing_step}"
        );
    }

    #[test]
    fn test_tier_pattern_lh5_tiers() {
        insta::assert_snapshot!(
            tier_pattern(&setup(), "dsp", true).unwrap(),
            @"/prod/tier/dsp/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_dsp.lh5"
        );
    }

    #[test]
    fn test_tier_pattern_daq() {
        insta::assert_snapshot!(
            tier_pattern(&setup(), "daq", true).unwrap(),
            @"/prod/tier/daq/{detector}/c1/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}.fcio"
        );
    }

    #[test]
    fn test_tier_pattern_invalid_tier() {
        let err = tier_pattern(&setup(), "evt", false).unwrap_err();
        assert!(matches!(err, KeyflowError::InvalidTier { ref tier } if tier == "evt"));
    }

    #[test]
    fn test_out_of_cycle_falls_back_to_scratch() {
        let mut setup = setup();
        setup.paths.tier_raw = Some(PathBuf::from("/elsewhere/raw"));

        assert_eq!(
            tier_pattern(&setup, "raw", true).unwrap(),
            "/prod/tmp/{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_raw.lh5"
        );
        assert_eq!(
            tier_pattern(&setup, "raw", false).unwrap(),
            "/elsewhere/raw/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_raw.lh5"
        );
    }

    #[test]
    fn test_scratch_fallback_without_tmp_uses_os_temp_dir() {
        let mut setup = setup();
        setup.paths.tmp = None;
        setup.paths.tier_dsp = Some(PathBuf::from("/elsewhere/dsp"));

        let expected = std::env::temp_dir()
            .join("{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_dsp.lh5");
        assert_eq!(
            tier_pattern(&setup, "dsp", true).unwrap(),
            expected.to_string_lossy()
        );
    }

    #[test]
    fn test_daq_pattern_with_custom_extension() {
        let mut setup = setup();
        setup.paths.tier_daq = Some(PathBuf::from("/daq"));
        assert_eq!(
            tier_daq_pattern(&setup, "{ext}", false).unwrap(),
            "/daq/{detector}/c1/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}.{ext}"
        );
        assert_eq!(
            tier_daq_pattern(&setup, "orca", true).unwrap(),
            "/prod/tmp/{experiment}-{detector}-{measurement}-{run}-{timestamp}.orca"
        );
    }

    #[test]
    fn test_pars_pattern_with_and_without_name() {
        assert_eq!(
            pars_pattern(&setup(), "hit", None, DEFAULT_PAR_EXTENSION, true).unwrap(),
            "/prod/par/hit/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-par_hit.yaml"
        );
        assert_eq!(
            pars_pattern(&setup(), "dsp", Some("pz"), "json", true).unwrap(),
            "/prod/par/dsp/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-par_dsp_pz.json"
        );
        assert!(pars_pattern(&setup(), "raw", None, "yaml", true).is_err());
    }

    #[test]
    fn test_pars_pattern_out_of_cycle() {
        let mut setup = setup();
        setup.paths.par_dsp = Some(PathBuf::from("/shared/pars"));
        assert_eq!(
            pars_pattern(&setup, "dsp", Some("eopt"), "yaml", true).unwrap(),
            "/prod/tmp/{experiment}-{detector}-{measurement}-{run}-{timestamp}-par_dsp_eopt.yaml"
        );
    }

    #[test]
    fn test_scratch_patterns() {
        assert_eq!(
            pars_tmp_pattern(&setup(), "dsp", None, "yaml"),
            "/prod/tmp/par/{experiment}-{detector}-{measurement}-{run}-{timestamp}-par_dsp.yaml"
        );
        assert_eq!(
            plts_tmp_pattern(&setup(), "hit", Some("aoe"), "pkl"),
            "/prod/tmp/plt/{experiment}-{detector}-{measurement}-{run}-{timestamp}-plt_hit_aoe.pkl"
        );
    }

    #[test]
    fn test_plts_pattern() {
        assert_eq!(
            plts_pattern(&setup(), "hit", None),
            "/prod/plt/hit/{detector}/{measurement}/{experiment}-{detector}-{measurement}-{run}-{timestamp}-plt_hit.pkl"
        );
    }

    #[test]
    fn test_log_patterns() {
        insta::assert_snapshot!(
            log_pattern(&setup(), "tier_dsp", "2024-05-01T10:00:00"),
            @"/prod/tmp/log/2024-05-01T10:00:00/tier_dsp/{experiment}-{detector}-{measurement}-{run}-{timestamp}-tier_dsp.log"
        );
        assert_eq!(
            log_par_pattern(&setup(), "par_hit", "t0"),
            "/prod/tmp/log/t0/par_hit/{experiment}-{detector}-{measurement}-{run}-{timestamp}-par_hit.log"
        );
    }
}
