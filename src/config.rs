// src/config.rs
//
// Tunables for one analysis run, loadable from / written as JSON.

use std::fs::File;
use std::io::BufReader;
use std::ops::Range;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OvfError, Result};
use crate::rashba::{HBAR_SQ_OVER_2E_M0, PhaseFormula, RashbaParams};
use crate::surface::DEFAULT_THRESHOLD;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// m*/m0 of the 2DEG.
    pub effective_mass: f64,
    /// hbar² / (2 e m0), eV m².
    pub hbar_sq_over_2e_m0: f64,
    /// Clamp bound for the alpha surface, eV m.
    pub threshold: f64,
    pub formula: PhaseFormula,
    /// z index of the analysed plane; mid-plane when absent.
    pub z_plane: Option<usize>,
    /// Half-open y index range [start, end) for the alpha surface.
    pub y_range: [usize; 2],
    /// Physical length per grid step for plot coordinates (5 nm cells by default).
    pub step_scale: f64,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            effective_mass: 0.014,
            hbar_sq_over_2e_m0: HBAR_SQ_OVER_2E_M0,
            threshold: DEFAULT_THRESHOLD,
            formula: PhaseFormula::Product,
            z_plane: None,
            y_range: [0, 1],
            step_scale: 5.0,
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_str(s: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(s)?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn from_json_file(path: &Path) -> Result<Self> {
        let cfg: Self = serde_json::from_reader(BufReader::new(File::open(path)?))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn write_to_dir(&self, out_dir: &Path) -> Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(self.effective_mass.is_finite() && self.effective_mass > 0.0) {
            return Err(OvfError::InvalidConfig {
                field: "effective_mass",
                reason: format!("must be positive, got {}", self.effective_mass),
            });
        }
        if self.threshold.is_nan() || self.threshold <= 0.0 {
            return Err(OvfError::InvalidConfig {
                field: "threshold",
                reason: format!("must be positive, got {}", self.threshold),
            });
        }
        Ok(())
    }

    pub fn rashba_params(&self) -> RashbaParams {
        RashbaParams {
            effective_mass: self.effective_mass,
            hbar_sq_over_2e_m0: self.hbar_sq_over_2e_m0,
            formula: self.formula,
        }
    }

    pub fn y_range(&self) -> Range<usize> {
        self.y_range[0]..self.y_range[1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = AnalysisConfig::from_json_str(r#"{ "y_range": [125, 176] }"#).unwrap();
        assert_eq!(
            cfg,
            AnalysisConfig {
                y_range: [125, 176],
                ..AnalysisConfig::default()
            }
        );
        assert_eq!(cfg.y_range(), 125..176);
        assert_eq!(cfg.rashba_params(), RashbaParams::default());
    }

    #[test]
    fn formula_and_plane_parse() {
        let cfg = AnalysisConfig::from_json_str(
            r#"{ "formula": "sqrt_complement", "z_plane": 3, "effective_mass": 0.02 }"#,
        )
        .unwrap();
        assert_eq!(cfg.formula, PhaseFormula::SqrtComplement);
        assert_eq!(cfg.z_plane, Some(3));
        assert_eq!(cfg.rashba_params().effective_mass, 0.02);
    }

    #[test]
    fn unknown_formula_is_an_error() {
        assert!(matches!(
            AnalysisConfig::from_json_str(r#"{ "formula": "total" }"#),
            Err(OvfError::Config(_))
        ));
    }

    #[test]
    fn non_positive_values_rejected() {
        assert!(matches!(
            AnalysisConfig::from_json_str(r#"{ "effective_mass": 0.0 }"#),
            Err(OvfError::InvalidConfig { field: "effective_mass", .. })
        ));
        assert!(matches!(
            AnalysisConfig::from_json_str(r#"{ "threshold": -1e-10 }"#),
            Err(OvfError::InvalidConfig { field: "threshold", .. })
        ));
    }

    #[test]
    fn written_config_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = AnalysisConfig {
            y_range: [2, 9],
            z_plane: Some(0),
            ..AnalysisConfig::default()
        };
        cfg.write_to_dir(dir.path()).unwrap();
        let back = AnalysisConfig::from_json_file(&dir.path().join("config.json")).unwrap();
        assert_eq!(back, cfg);
    }
}
