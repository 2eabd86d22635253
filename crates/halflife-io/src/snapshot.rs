//! Configuration snapshot and whole-result persistence.
//!
//! A run with output identifier `base` is stored as two files:
//!
//! - `base.sim`: JSON [`ConfigSnapshot`]: format version, creation time and
//!   the full [`SimulationConfig`] including the decay chain
//! - `base.events`: the event stream, see [`crate::events`]

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use halflife_core::{SimulationConfig, SimulationResults};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::CodecError;
use crate::events::{read_events, write_events};

/// Current snapshot layout.
pub const SNAPSHOT_VERSION: u32 = 1;

pub const SIM_EXTENSION: &str = "sim";
pub const EVENTS_EXTENSION: &str = "events";

/// What gets written to `<base>.sim`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    pub format_version: u32,
    pub generated_at: DateTime<Utc>,
    pub config: SimulationConfig,
}

impl ConfigSnapshot {
    pub fn new(config: SimulationConfig) -> Self {
        Self {
            format_version: SNAPSHOT_VERSION,
            generated_at: Utc::now(),
            config,
        }
    }
}

/// Paths of the two files belonging to one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFiles {
    pub sim: PathBuf,
    pub events: PathBuf,
}

impl RunFiles {
    /// Derive both paths from a base name or from a path ending in `.sim`.
    pub fn for_base(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let stem = match base.extension() {
            Some(ext) if ext == SIM_EXTENSION => base.with_extension(""),
            _ => base.to_path_buf(),
        };
        Self {
            sim: with_suffix(&stem, SIM_EXTENSION),
            events: with_suffix(&stem, EVENTS_EXTENSION),
        }
    }
}

/// Append `.ext` without replacing an existing extension, so that a base
/// like `runs/thorium.v2` keeps its dot.
fn with_suffix(stem: &Path, ext: &str) -> PathBuf {
    let mut s = stem.as_os_str().to_os_string();
    s.push(".");
    s.push(ext);
    PathBuf::from(s)
}

pub fn write_config(config: &SimulationConfig, path: impl AsRef<Path>) -> Result<(), CodecError> {
    let file = File::create(path.as_ref())?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer_pretty(&mut writer, &ConfigSnapshot::new(config.clone()))?;
    std::io::Write::flush(&mut writer)?;
    debug!(path = %path.as_ref().display(), "wrote config snapshot");
    Ok(())
}

/// Load and validate a snapshot.
pub fn read_config(path: impl AsRef<Path>) -> Result<SimulationConfig, CodecError> {
    let reader = BufReader::new(File::open(path.as_ref())?);
    let snapshot: ConfigSnapshot = serde_json::from_reader(reader)?;
    if snapshot.format_version != SNAPSHOT_VERSION {
        return Err(CodecError::UnsupportedVersion {
            found: snapshot.format_version,
            expected: SNAPSHOT_VERSION,
        });
    }
    snapshot.config.validate()?;
    Ok(snapshot.config)
}

/// Write `<output>.sim` and `<output>.events`, where `output` is the
/// config's output identifier.
pub fn write_results(results: &SimulationResults) -> Result<RunFiles, CodecError> {
    let files = RunFiles::for_base(results.config().output());
    let writer = BufWriter::new(File::create(&files.events)?);
    write_events(writer, results.events())?;
    write_config(results.config(), &files.sim)?;
    info!(
        sim = %files.sim.display(),
        events = %files.events.display(),
        count = results.events().len(),
        "wrote simulation results"
    );
    Ok(files)
}

/// Read a run back, given its base name or its `.sim` path.
pub fn read_results(path: impl AsRef<Path>) -> Result<SimulationResults, CodecError> {
    let files = RunFiles::for_base(path);
    let config = read_config(&files.sim)?;
    let events = read_events(BufReader::new(File::open(&files.events)?))?;
    let len = config.decay_chain().len();
    if let Some(e) = events
        .iter()
        .find(|e| e.from_isotope >= len || e.to_isotope >= len)
    {
        return Err(CodecError::UnknownIsotope {
            particle: e.particle,
            isotope: e.from_isotope.max(e.to_isotope),
            len,
        });
    }
    Ok(SimulationResults::new(config, events))
}

#[cfg(test)]
mod tests {
    use super::*;
    use halflife_core::event::DecayEvent;
    use halflife_core::model::{BranchingPolicy, DecayChainBuilder, DecayMode};

    fn config(output: &str) -> SimulationConfig {
        let mut b = DecayChainBuilder::new().branching_policy(BranchingPolicy::Permissive);
        b.add_decay("A", "B", DecayMode::Alpha, 30.0, 2.0, 5.0).unwrap();
        b.add_decay("A", "C", DecayMode::Beta, 60.0, 3.0, 1.0).unwrap();
        SimulationConfig::new(b.build().unwrap(), 3, 10.0, output)
            .unwrap()
            .with_seed(99)
    }

    fn events() -> Vec<DecayEvent> {
        vec![
            DecayEvent { particle: 0, from_isotope: 0, to_isotope: 1, time: 0.1 + 0.2, energy: 5.0 },
            DecayEvent { particle: 2, from_isotope: 0, to_isotope: 2, time: 7.25, energy: 1.0 },
        ]
    }

    #[test]
    fn run_files_from_base_or_sim_path() {
        let from_base = RunFiles::for_base("out/thorium");
        assert_eq!(from_base.sim, PathBuf::from("out/thorium.sim"));
        assert_eq!(from_base.events, PathBuf::from("out/thorium.events"));
        assert_eq!(RunFiles::for_base("out/thorium.sim"), from_base);
    }

    #[test]
    fn dotted_base_keeps_its_dot() {
        let files = RunFiles::for_base("runs/thorium.v2");
        assert_eq!(files.sim, PathBuf::from("runs/thorium.v2.sim"));
    }

    #[test]
    fn results_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("run");
        let results = SimulationResults::new(config(base.to_str().unwrap()), events());

        let files = write_results(&results).unwrap();
        assert!(files.sim.exists());
        assert!(files.events.exists());

        let from_base = read_results(&base).unwrap();
        assert_eq!(from_base, results);
        let from_sim = read_results(&files.sim).unwrap();
        assert_eq!(from_sim, results);
    }

    #[test]
    fn snapshot_keeps_unbalanced_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("c.sim");
        let cfg = config("c");
        write_config(&cfg, &path).unwrap();
        assert_eq!(read_config(&path).unwrap(), cfg);
    }

    #[test]
    fn wrong_version_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("v.sim");
        let mut snapshot = ConfigSnapshot::new(config("v"));
        snapshot.format_version = 7;
        std::fs::write(&path, serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert!(matches!(
            read_config(&path),
            Err(CodecError::UnsupportedVersion { found: 7, expected: 1 })
        ));
    }

    #[test]
    fn invalid_config_in_snapshot_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.sim");
        let snapshot = ConfigSnapshot::new(config("bad"));
        let json = serde_json::to_string(&snapshot)
            .unwrap()
            .replace("\"num_particles\":3", "\"num_particles\":0");
        std::fs::write(&path, json).unwrap();
        assert!(matches!(read_config(&path), Err(CodecError::InvalidSnapshot(_))));
    }

    #[test]
    fn event_outside_chain_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("stray");
        let files = RunFiles::for_base(&base);
        write_config(&config("stray"), &files.sim).unwrap();
        std::fs::write(&files.events, "0 0 9 1.0 5\n").unwrap();
        assert!(matches!(
            read_results(&base),
            Err(CodecError::UnknownIsotope { particle: 0, isotope: 9, len: 3 })
        ));
    }

    #[test]
    fn missing_events_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("lonely");
        write_config(&config("lonely"), RunFiles::for_base(&base).sim).unwrap();
        assert!(matches!(read_results(&base), Err(CodecError::Io(_))));
    }
}
