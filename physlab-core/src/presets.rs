//! Scenario preset loader.
//!
//! Loads named scenario configurations from YAML files so demos can ship
//! tuned setups without recompiling.
//!
//! ## Directory Structure
//!
//! ```text
//! presets/
//! ├── pendulum.yaml
//! ├── free_fall.yaml
//! ├── ramp.yaml
//! └── ...
//! ```
//!
//! ## Format
//!
//! ```yaml
//! name: Pendulum
//! description: Released from 60 degrees
//! dt: 0.016666666666666666
//! time_scale: 1.0
//! parameters:
//!   scenario: pendulum
//!   length: 150.0
//!   initial_angle: -1.0471975511965976
//! ```
//!
//! Omitted parameters take their defaults, `dt` defaults to 1/60 s and
//! `time_scale` to real time.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ParameterError, PresetError, SimError};
use crate::integrator::{check_dt, Simulation};
use crate::params::ScenarioParameters;
use crate::playback::PlaybackController;
use crate::types::constants;

const EXTENSION: &str = "yaml";

/// A named, ready-to-run scenario configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Fixed step in seconds.
    #[serde(default = "default_dt")]
    pub dt: f64,
    /// Simulated seconds per wall-clock second.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
    pub parameters: ScenarioParameters,
}

fn default_dt() -> f64 {
    constants::DEFAULT_DT
}

fn default_time_scale() -> f64 {
    1.0
}

impl Preset {
    /// Check the step size, time scale and parameters.
    pub fn validate(&self) -> Result<(), SimError> {
        check_dt(self.dt)?;
        if !(self.time_scale.is_finite() && self.time_scale > 0.0) {
            return Err(ParameterError::OutOfRange {
                name: "time_scale",
                value: self.time_scale,
                expected: "a positive, finite number",
            }
            .into());
        }
        self.parameters.validate()?;
        Ok(())
    }

    pub fn simulation(&self) -> Simulation {
        Simulation::new(self.parameters, self.dt)
    }

    pub fn controller(&self) -> PlaybackController {
        PlaybackController::new(self.simulation()).with_time_scale(self.time_scale)
    }
}

/// Preset loader with configurable base directory.
pub struct PresetLoader {
    base_path: PathBuf,
}

impl PresetLoader {
    /// Create a new loader reading `<base_path>/<name>.yaml`.
    pub fn new<P: AsRef<Path>>(base_path: P) -> Self {
        Self {
            base_path: base_path.as_ref().to_path_buf(),
        }
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Load and validate a preset by name (without .yaml extension).
    ///
    /// # Example
    /// ```ignore
    /// let loader = PresetLoader::new("presets");
    /// let mut lab = loader.load("pendulum")?.controller();
    /// ```
    pub fn load(&self, name: &str) -> Result<Preset, PresetError> {
        let path = self.base_path.join(format!("{name}.{EXTENSION}"));
        if !path.exists() {
            return Err(PresetError::NotFound(name.to_string()));
        }
        let contents = fs::read_to_string(&path).map_err(|source| PresetError::Io {
            path: path.clone(),
            source,
        })?;
        let preset: Preset = serde_yaml::from_str(&contents)
            .map_err(|source| PresetError::Parse { path: path.clone(), source })?;
        preset.validate().map_err(|source| PresetError::Invalid {
            name: name.to_string(),
            source,
        })?;

        log::debug!("loaded preset {name} from {}", path.display());
        Ok(preset)
    }

    /// Names of all presets in the base directory, sorted.
    pub fn list(&self) -> Result<Vec<String>, PresetError> {
        if !self.base_path.exists() {
            return Ok(vec![]);
        }

        let io_err = |source: std::io::Error| PresetError::Io {
            path: self.base_path.clone(),
            source,
        };
        let mut names = Vec::new();
        for entry in fs::read_dir(&self.base_path).map_err(io_err)? {
            let path = entry.map_err(io_err)?.path();
            if path.extension().and_then(|e| e.to_str()) != Some(EXTENSION) {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                names.push(stem.to_string());
            }
        }
        names.sort();
        Ok(names)
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ScenarioKind;
    use std::env;

    fn get_presets_path() -> PathBuf {
        let manifest_dir = env::var("CARGO_MANIFEST_DIR").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(manifest_dir).join("..").join("presets")
    }

    fn write(dir: &Path, name: &str, contents: &str) {
        fs::write(dir.join(format!("{name}.yaml")), contents).unwrap();
    }

    #[test]
    fn test_load_shipped_pendulum() {
        let loader = PresetLoader::new(get_presets_path());
        let result = loader.load("pendulum");

        assert!(result.is_ok(), "Should load pendulum: {:?}", result.err());
        let preset = result.unwrap();
        assert_eq!(preset.parameters.kind(), ScenarioKind::Pendulum);
        assert!(preset.dt > 0.0);
    }

    #[test]
    fn test_every_shipped_preset_is_valid() {
        let loader = PresetLoader::new(get_presets_path());
        let names = loader.list().unwrap();
        assert!(names.len() >= ScenarioKind::ALL.len());

        for name in names {
            let preset = loader.load(&name);
            assert!(preset.is_ok(), "{name}: {:?}", preset.err());
        }
    }

    #[test]
    fn test_load_nonexistent_preset() {
        let loader = PresetLoader::new(get_presets_path());
        match loader.load("nonexistent_preset_xyz") {
            Err(PresetError::NotFound(name)) => assert_eq!(name, "nonexistent_preset_xyz"),
            other => panic!("Expected NotFound error, got {other:?}"),
        }
    }

    #[test]
    fn test_omitted_fields_take_defaults() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "short",
            "name: Short\nparameters:\n  scenario: circuit\n  resistance: 200.0\n",
        );

        let preset = PresetLoader::new(dir.path()).load("short").unwrap();
        assert_eq!(preset.dt, constants::DEFAULT_DT);
        assert_eq!(preset.time_scale, 1.0);
        assert_eq!(preset.description, "");
        match preset.parameters {
            ScenarioParameters::Circuit(p) => {
                assert_eq!(p.resistance, 200.0);
                assert_eq!(p.capacitance, 0.001);
            }
            other => panic!("unexpected parameters {other:?}"),
        }
    }

    #[test]
    fn test_parse_error_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "broken", "name: [unclosed\n");

        match PresetLoader::new(dir.path()).load("broken") {
            Err(PresetError::Parse { path, .. }) => assert!(path.ends_with("broken.yaml")),
            other => panic!("Expected Parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "heavy",
            "name: Heavy\nparameters:\n  scenario: spring\n  mass: -1.0\n",
        );

        match PresetLoader::new(dir.path()).load("heavy") {
            Err(PresetError::Invalid { name, source }) => {
                assert_eq!(name, "heavy");
                assert!(matches!(
                    source,
                    SimError::Parameters(ParameterError::OutOfRange { name: "mass", .. })
                ));
            }
            other => panic!("Expected Invalid error, got {other:?}"),
        }
    }

    #[test]
    fn test_list_ignores_other_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "b", "name: B\nparameters:\n  scenario: carnot\n");
        write(dir.path(), "a", "name: A\nparameters:\n  scenario: pendulum\n");
        fs::write(dir.path().join("notes.txt"), "not a preset").unwrap();

        let names = PresetLoader::new(dir.path()).list().unwrap();
        assert_eq!(names, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_list_missing_directory_is_empty() {
        let loader = PresetLoader::new("/definitely/not/a/presets/dir");
        assert!(loader.list().unwrap().is_empty());
    }

    #[test]
    fn test_controller_uses_preset_time_scale() {
        let preset = Preset {
            name: "slow".into(),
            description: String::new(),
            dt: 0.01,
            time_scale: 0.25,
            parameters: ScenarioParameters::defaults(ScenarioKind::Spring),
        };
        let ctl = preset.controller();
        assert_eq!(ctl.time_scale(), 0.25);
        assert_eq!(ctl.simulation().dt(), 0.01);
    }
}
