// src/surface.rs
//
// Stacks clamped alpha rows over a y-range into a 2D surface (rows = y, cols = x).

use std::ops::Range;

use crate::error::{OvfError, Result};
use crate::rashba::{InPlaneFields, RashbaParams};
use crate::vector_field::VectorField3D;

pub const DEFAULT_THRESHOLD: f64 = 1e-10;

/// Sign-preserving saturation: |v| < T passes, otherwise ±T.
///
/// NaN is passed through unchanged so undefined points stay visible;
/// ±Inf saturates to ±T.
#[inline]
pub fn clamp_alpha(v: f64, threshold: f64) -> f64 {
    if v.is_nan() || v.abs() < threshold {
        v
    } else if v > 0.0 {
        threshold
    } else {
        -threshold
    }
}

/// Clamped alpha values for y in `y_range`, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct AlphaSurface {
    pub y_range: Range<usize>,
    pub z_index: usize,
    pub nx: usize,
    pub threshold: f64,
    pub data: Vec<f64>,
}

impl AlphaSurface {
    /// (rows, cols) = (number of y indices, nx).
    pub fn shape(&self) -> (usize, usize) {
        (self.y_range.len(), self.nx)
    }

    /// Row for absolute y index `j`, if inside the range.
    pub fn row(&self, j: usize) -> Option<&[f64]> {
        if !self.y_range.contains(&j) {
            return None;
        }
        let r = j - self.y_range.start;
        Some(&self.data[r * self.nx..(r + 1) * self.nx])
    }

    pub fn get(&self, j: usize, i: usize) -> Option<f64> {
        self.row(j).and_then(|row| row.get(i).copied())
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.nx)
    }

    /// x grid indices, 0..nx.
    pub fn x_axis(&self) -> Vec<usize> {
        (0..self.nx).collect()
    }

    /// y grid indices, increasing.
    pub fn y_axis(&self) -> Vec<usize> {
        self.y_range.clone().collect()
    }
}

/// Alpha surface over `y_range` at `z_index` (mid-plane if None), clamped to ±`threshold`.
pub fn surface_alpha(
    field: &VectorField3D,
    y_range: Range<usize>,
    z_index: Option<usize>,
    params: &RashbaParams,
    threshold: f64,
) -> Result<AlphaSurface> {
    if y_range.start >= y_range.end {
        return Err(OvfError::InvalidRange {
            start: y_range.start,
            end: y_range.end,
        });
    }
    let grid = &field.grid;
    let z_index = z_index.unwrap_or_else(|| grid.mid_z());
    grid.check_y(y_range.end - 1)?;
    grid.check_z(z_index)?;

    let fields = InPlaneFields::new(field);
    let mut data = Vec::with_capacity(y_range.len() * grid.nx);
    for j in y_range.clone() {
        let alpha = fields.alpha_row(j, Some(z_index), params)?;
        data.extend(alpha.values.iter().map(|&v| clamp_alpha(v, threshold)));
    }

    Ok(AlphaSurface {
        y_range,
        z_index,
        nx: grid.nx,
        threshold,
        data,
    })
}
