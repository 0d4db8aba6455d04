// src/rashba.rs
//
// Phase-gradient ("alpha") estimate of the Rashba coefficient from a stray field.
//
// For a row along x at fixed (y, z):
//   dphi/dx = -(Bx * dB/dx - B * dBx/dx) / (B * By * 2π)
//   alpha   = (hbar² / 2 e m0) / m_eff * dphi/dx        [eV m]
// Gradients are per grid index (no physical x spacing applied).
//
// Degenerate denominators (B*By == 0, or 1 - Bx²/B² < 0 for the sqrt form)
// are not guarded: the row carries ±Inf/NaN and the surface clamp bounds it.

use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{OvfError, Result};
use crate::gradient::gradient;
use crate::slice::{Slice1D, extract_row};
use crate::vector_field::{Component, ScalarField3D, VectorField3D};

/// hbar² / (2 e m0) in eV m².
pub const HBAR_SQ_OVER_2E_M0: f64 = 3.818e-11;

/// Denominator used for the phase derivative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PhaseFormula {
    /// B * By * 2π
    #[default]
    Product,
    /// 2π * B² * sqrt(1 - Bx²/B²); opposite overall sign, By sign is lost in the sqrt.
    SqrtComplement,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RashbaParams {
    /// Dimensionless effective mass m*/m0.
    pub effective_mass: f64,
    pub hbar_sq_over_2e_m0: f64,
    pub formula: PhaseFormula,
}

impl Default for RashbaParams {
    fn default() -> Self {
        Self {
            effective_mass: 0.014,
            hbar_sq_over_2e_m0: HBAR_SQ_OVER_2E_M0,
            formula: PhaseFormula::Product,
        }
    }
}

impl RashbaParams {
    #[inline]
    pub fn prefactor(&self) -> f64 {
        self.hbar_sq_over_2e_m0 / self.effective_mass
    }
}

/// Raw phase gradient per index along a row.
/// `bx` and `by` must have the length of `b`.
pub fn phase_gradient(
    bx: &[f64],
    by: &[f64],
    b: &[f64],
    formula: PhaseFormula,
) -> Result<Vec<f64>> {
    for len in [bx.len(), by.len()] {
        if len != b.len() {
            return Err(OvfError::ShapeMismatch {
                expected: b.len(),
                actual: len,
            });
        }
    }
    let grad_b = gradient(b);
    let grad_bx = gradient(bx);

    let dphi = (0..b.len())
        .map(|i| {
            let num = bx[i] * grad_b[i] - b[i] * grad_bx[i];
            match formula {
                PhaseFormula::Product => -num / (b[i] * by[i] * 2.0 * PI),
                PhaseFormula::SqrtComplement => {
                    let s = (1.0 - bx[i] * bx[i] / (b[i] * b[i])).sqrt();
                    num / (2.0 * PI * b[i] * b[i] * s)
                }
            }
        })
        .collect();
    Ok(dphi)
}

/// Alpha along a row from its Bx, By and |B| slices. Tagged with the slices' row.
pub fn alpha_from_slices(
    bx: &Slice1D,
    by: &Slice1D,
    b: &Slice1D,
    params: &RashbaParams,
) -> Result<Slice1D> {
    let k = params.prefactor();
    let values = phase_gradient(&bx.values, &by.values, &b.values, params.formula)?
        .into_iter()
        .map(|d| k * d)
        .collect();
    Ok(Slice1D {
        values,
        y_index: b.y_index,
        z_index: b.z_index,
    })
}

/// Bx, By and |B| of one snapshot, computed once and reused across rows.
#[derive(Debug, Clone)]
pub struct InPlaneFields {
    pub bx: ScalarField3D,
    pub by: ScalarField3D,
    pub b: ScalarField3D,
}

impl InPlaneFields {
    pub fn new(field: &VectorField3D) -> Self {
        Self {
            bx: field.component(Component::X),
            by: field.component(Component::Y),
            b: field.magnitude(),
        }
    }

    /// Alpha row at (y_index, z_index); z defaults to the mid-plane.
    pub fn alpha_row(
        &self,
        y_index: usize,
        z_index: Option<usize>,
        params: &RashbaParams,
    ) -> Result<Slice1D> {
        let bx = extract_row(&self.bx, y_index, z_index)?;
        let by = extract_row(&self.by, y_index, z_index)?;
        let b = extract_row(&self.b, y_index, z_index)?;
        let alpha = alpha_from_slices(&bx, &by, &b, params)?;

        let non_finite = alpha.values.iter().filter(|v| !v.is_finite()).count();
        if non_finite > 0 {
            warn!(
                y = y_index,
                z = alpha.z_index,
                count = non_finite,
                "alpha row has non-finite values (degenerate denominator)"
            );
        }
        Ok(alpha)
    }
}

pub fn alpha_row(
    field: &VectorField3D,
    y_index: usize,
    z_index: Option<usize>,
    params: &RashbaParams,
) -> Result<Slice1D> {
    InPlaneFields::new(field).alpha_row(y_index, z_index, params)
}

/// Alpha rows for several y indices, in the order given.
pub fn alpha_rows(
    field: &VectorField3D,
    y_indices: &[usize],
    z_index: Option<usize>,
    params: &RashbaParams,
) -> Result<Vec<Slice1D>> {
    let fields = InPlaneFields::new(field);
    y_indices
        .iter()
        .map(|&j| fields.alpha_row(j, z_index, params))
        .collect()
}
