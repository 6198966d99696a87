// Copyright (c) 2026 Robert L. Snyder, Sierra Vista, AZ
// Licensed under the MIT License. See LICENSE file in the project root for details.

//! Configuration for the harmony engine.
//!
//! Holds the default root, scale and octave window, the chord structure
//! preference, the iteration caps for bounded searches, and the weights
//! used when a structure or mode is picked at random. Files may be YAML or
//! TOML; every field has a default.

use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

use crate::music::chord::Structure;
use crate::music::octave::OctaveRange;
use crate::music::harmonic::Harmonic;
use crate::music::note::Note;
use crate::music::scale::{NamedScale, Scale, ScaleCatalog};

/// Root configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Default root note (e.g., "C", "F#")
    #[serde(default = "default_root")]
    pub root: String,
    /// Default scale or mode name (e.g., "major", "dorian", or a custom scale's name)
    #[serde(default = "default_scale")]
    pub scale: String,
    /// Octave window notes are laid out in
    #[serde(default)]
    pub octaves: OctaveRange,
    /// Chord structure keys build their diatonic chords with
    #[serde(default)]
    pub structure: Structure,
    /// Iteration caps for bounded searches
    #[serde(default)]
    pub limits: SearchLimits,
    /// Weights for random structure and mode selection
    #[serde(default)]
    pub weights: SelectionWeights,
    /// Extra scales available by name, shadowing built-in names
    #[serde(default)]
    pub custom_scales: Vec<NamedScale>,
}

fn default_root() -> String {
    "C".to_string()
}
fn default_scale() -> String {
    "major".to_string()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            scale: default_scale(),
            octaves: OctaveRange::default(),
            structure: Structure::default(),
            limits: SearchLimits::default(),
            weights: SelectionWeights::default(),
            custom_scales: Vec::new(),
        }
    }
}

impl EngineConfig {
    /// Load a configuration file, YAML unless the extension says TOML
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config = match path.extension().and_then(|e| e.to_str()) {
            Some("toml") => Self::from_toml(&contents)?,
            _ => Self::from_yaml(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Parse a configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("Failed to parse YAML configuration")
    }

    /// Parse a configuration from TOML string
    pub fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("Failed to parse TOML configuration")
    }

    /// Serialize to YAML string
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize configuration to YAML")
    }

    /// Reject caps of zero and weights that can't be sampled
    pub fn validate(&self) -> Result<()> {
        let limits = &self.limits;
        if limits.symbol_search_cap == 0 || limits.structure_retry_cap == 0 || limits.spread_cap == 0 {
            bail!("search caps must be at least 1: {:?}", limits);
        }

        let weights = &self.weights;
        let all = [weights.full_triad, weights.power, weights.mode, weights.locrian];
        if all.iter().any(|w| !w.is_finite() || *w < 0.0) {
            bail!("selection weights must be finite and non-negative: {:?}", weights);
        }
        if weights.full_triad + weights.power <= 0.0 || weights.mode <= 0.0 {
            bail!("selection weights must leave something to choose: {:?}", weights);
        }

        let catalog = self.scale_catalog()?;
        catalog
            .formula(&self.scale)
            .with_context(|| format!("Unknown scale: {}", self.scale))?;
        Ok(())
    }

    /// Built-in scale names plus this config's custom scales
    pub fn scale_catalog(&self) -> Result<ScaleCatalog> {
        ScaleCatalog::from_named(&self.custom_scales).context("Invalid custom scale")
    }

    /// The configured scale over the configured root and octave window
    pub fn build_scale(&self) -> Result<Scale> {
        let root = Note::parse(&self.root).with_context(|| format!("Invalid root note: {}", self.root))?;
        let mut scale = self
            .scale_catalog()?
            .scale(root, &self.scale)
            .with_context(|| format!("Failed to build scale {} {}", self.root, self.scale))?;
        scale.assign_octaves(self.octaves)?;
        Ok(scale)
    }
}

/// Iteration caps for the bounded searches
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SearchLimits {
    /// Suffix-stripping rounds during chord symbol inference
    pub symbol_search_cap: usize,
    /// Sibling structures tried when a scale can't fill a structure
    pub structure_retry_cap: usize,
    /// Relocations while spreading a voicing
    pub spread_cap: usize,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            symbol_search_cap: 16,
            structure_retry_cap: 8,
            spread_cap: 64,
        }
    }
}

/// Weights for random structure and mode choices
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SelectionWeights {
    /// Full triad when a triad structure is requested
    pub full_triad: f64,
    /// Bare power chord when a triad structure is requested
    pub power: f64,
    /// Each mode other than Locrian
    pub mode: f64,
    /// Locrian, kept low so it is rarely chosen
    pub locrian: f64,
}

impl Default for SelectionWeights {
    fn default() -> Self {
        Self {
            full_triad: 0.7,
            power: 0.3,
            mode: 0.165,
            locrian: 0.01,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_values() {
        let config = EngineConfig::from_yaml("root: \"D\"\n").unwrap();
        assert_eq!(config.root, "D");
        assert_eq!(config.scale, "major");
        assert_eq!(config.octaves, OctaveRange::new(3, 1));
        assert_eq!(config.structure, Structure::Triad);
        assert_eq!(config.limits, SearchLimits::default());
        assert_eq!(config.weights.locrian, 0.01);
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
root: "Eb"
scale: "mixolydian"
octaves:
  start: 2
  count: 2
structure: seventh
limits:
  spread_cap: 10
weights:
  locrian: 0.0
custom_scales:
  - name: "hijaz"
    formula: "1P 2m 3M 4P 5P 6m 7m"
"#;

        let config = EngineConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.root, "Eb");
        assert_eq!(config.octaves, OctaveRange::new(2, 2));
        assert_eq!(config.structure, Structure::Seventh);
        assert_eq!(config.limits.spread_cap, 10);
        assert_eq!(config.limits.symbol_search_cap, 16);
        assert_eq!(config.weights.locrian, 0.0);
        assert_eq!(config.weights.mode, 0.165);
        assert_eq!(config.custom_scales.len(), 1);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_toml() {
        let source = r#"
root = "A"
scale = "minor"
structure = "ninth"

[limits]
symbol_search_cap = 4
"#;

        let config = EngineConfig::from_toml(source).unwrap();
        assert_eq!(config.root, "A");
        assert_eq!(config.structure, Structure::Ninth);
        assert_eq!(config.limits.symbol_search_cap, 4);
    }

    #[test]
    fn test_round_trip() {
        let original = EngineConfig {
            root: "G".to_string(),
            scale: "dorian".to_string(),
            structure: Structure::Sus4,
            ..Default::default()
        };

        let yaml = original.to_yaml().unwrap();
        let parsed = EngineConfig::from_yaml(&yaml).unwrap();
        assert_eq!(original, parsed);
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = EngineConfig::default();
        config.limits.spread_cap = 0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.weights.mode = -1.0;
        assert!(config.validate().is_err());

        let mut config = EngineConfig::default();
        config.weights.full_triad = 0.0;
        config.weights.power = 0.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempdir().unwrap();
        let yaml_path = dir.path().join("engine.yaml");
        fs::write(&yaml_path, "root: \"F\"\nscale: \"lydian\"\n").unwrap();
        let config = EngineConfig::load(&yaml_path).unwrap();
        assert_eq!(config.root, "F");

        let toml_path = dir.path().join("engine.toml");
        fs::write(&toml_path, "root = \"B\"\n").unwrap();
        assert_eq!(EngineConfig::load(&toml_path).unwrap().root, "B");

        let bad_path = dir.path().join("invalid.yaml");
        fs::write(&bad_path, "this is not valid yaml: [").unwrap();
        assert!(EngineConfig::load(&bad_path).is_err());

        assert!(EngineConfig::load(dir.path().join("missing.yaml")).is_err());
    }

    #[test]
    fn test_build_custom_scale() {
        let yaml = r#"
root: "D"
scale: "hijaz"
octaves:
  start: 2
  count: 2
custom_scales:
  - name: "hijaz"
    formula: "1P 2m 3M 4P 5P 6m 7m"
"#;
        let config = EngineConfig::from_yaml(yaml).unwrap();
        config.validate().unwrap();
        assert_eq!(config.scale_catalog().unwrap().len(), 1);

        let scale = config.build_scale().unwrap();
        assert_eq!(scale.len(), 14);
        assert_eq!(scale.pitches()[0], "D2");
        assert_eq!(scale.formula(), "1P 2m 3M 4P 5P 6m 7m");
    }

    #[test]
    fn test_validate_rejects_unknown_scales() {
        let config = EngineConfig {
            scale: "hijaz".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
        assert!(config.build_scale().is_err());

        let config = EngineConfig {
            custom_scales: vec![NamedScale {
                name: "bad".to_string(),
                formula: "1P 9Q".to_string(),
            }],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
