// src/analysis.rs
//
// One-file pipeline: snapshot -> in-plane fields -> clamped alpha surface.
// Pure apart from the single file read; repeated runs give identical output.

use std::path::Path;

use tracing::info;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::ovf::{SnapshotMetadata, load_snapshot};
use crate::surface::{AlphaSurface, surface_alpha};

#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub metadata: SnapshotMetadata,
    pub surface: AlphaSurface,
}

pub fn analyse_file(path: &Path, config: &AnalysisConfig) -> Result<Analysis> {
    config.validate()?;
    let snapshot = load_snapshot(path)?;
    let surface = surface_alpha(
        &snapshot.field,
        config.y_range(),
        config.z_plane,
        &config.rashba_params(),
        config.threshold,
    )?;

    let saturated = surface
        .data
        .iter()
        .filter(|v| v.abs() == config.threshold)
        .count();
    info!(
        path = %path.display(),
        rows = surface.shape().0,
        cols = surface.shape().1,
        z = surface.z_index,
        saturated,
        "alpha surface computed"
    );

    Ok(Analysis {
        metadata: snapshot.metadata,
        surface,
    })
}
