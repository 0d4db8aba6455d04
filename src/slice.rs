// src/slice.rs
//
// 1D cross-sections along x through a scalar field.

use crate::error::Result;
use crate::vector_field::ScalarField3D;

/// Values along x at a fixed (y, z) row.
#[derive(Debug, Clone, PartialEq)]
pub struct Slice1D {
    pub values: Vec<f64>,
    pub y_index: usize,
    pub z_index: usize,
}

impl Slice1D {
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Physical x-coordinate of each sample, `i * step_scale`.
    ///
    /// `step_scale` is the caller's length per grid step (e.g. 5.0 for 5 nm cells,
    /// or the header's `xstepsize` for metres).
    pub fn coordinates(&self, step_scale: f64) -> Vec<f64> {
        (0..self.values.len())
            .map(|i| i as f64 * step_scale)
            .collect()
    }

    /// Physical y-offset of this row, used as a legend label.
    pub fn label(&self, step_scale: f64) -> f64 {
        self.y_index as f64 * step_scale
    }

    /// Maximum over the central third of the row, x in [n/3, 2*(n/3)).
    /// Returns None when the window is empty (n < 3). NaN samples are skipped.
    pub fn window_max(&self) -> Option<f64> {
        let third = self.values.len() / 3;
        self.values[third..2 * third]
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .reduce(f64::max)
    }
}

/// Row of `field` at (y_index, z_index); `z_index` defaults to the mid-plane.
pub fn extract_row(field: &ScalarField3D, y_index: usize, z_index: Option<usize>) -> Result<Slice1D> {
    let grid = &field.grid;
    let z_index = z_index.unwrap_or_else(|| grid.mid_z());
    grid.check_y(y_index)?;
    grid.check_z(z_index)?;

    let start = grid.idx(0, y_index, z_index);
    Ok(Slice1D {
        values: field.data[start..start + grid.nx].to_vec(),
        y_index,
        z_index,
    })
}

/// Several rows at the same z-plane, in the order given.
pub fn extract_rows(
    field: &ScalarField3D,
    y_indices: &[usize],
    z_index: Option<usize>,
) -> Result<Vec<Slice1D>> {
    y_indices
        .iter()
        .map(|&j| extract_row(field, j, z_index))
        .collect()
}

/// Central-window maximum at (y_index, z_index); see [`Slice1D::window_max`].
pub fn central_window_max(
    field: &ScalarField3D,
    y_index: usize,
    z_index: Option<usize>,
) -> Result<Option<f64>> {
    Ok(extract_row(field, y_index, z_index)?.window_max())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::OvfError;
    use crate::grid::Grid3D;

    /// value = 100*k + 10*j + i
    fn indexed_field(nx: usize, ny: usize, nz: usize) -> ScalarField3D {
        let grid = Grid3D::new(nx, ny, nz, 1.0, 1.0, 1.0);
        let mut data = vec![0.0; grid.n_cells()];
        for k in 0..nz {
            for j in 0..ny {
                for i in 0..nx {
                    data[grid.idx(i, j, k)] = (100 * k + 10 * j + i) as f64;
                }
            }
        }
        ScalarField3D { grid, data }
    }

    #[test]
    fn row_runs_along_x_at_fixed_y_and_z() {
        let f = indexed_field(4, 3, 2);
        let row = extract_row(&f, 2, Some(1)).unwrap();
        assert_eq!(row.values, vec![120.0, 121.0, 122.0, 123.0]);
        assert_eq!((row.y_index, row.z_index), (2, 1));
    }

    #[test]
    fn z_defaults_to_mid_plane() {
        let f = indexed_field(2, 2, 5);
        let row = extract_row(&f, 1, None).unwrap();
        assert_eq!(row.z_index, 2);
        assert_eq!(row.values, vec![210.0, 211.0]);
    }

    #[test]
    fn out_of_range_indices_fail() {
        let f = indexed_field(4, 3, 2);
        assert!(matches!(
            extract_row(&f, 3, None),
            Err(OvfError::IndexOutOfRange { axis: 'y', .. })
        ));
        assert!(matches!(
            extract_row(&f, 0, Some(2)),
            Err(OvfError::IndexOutOfRange { axis: 'z', .. })
        ));
        assert!(extract_rows(&f, &[0, 1, 7], None).is_err());
    }

    #[test]
    fn coordinates_and_label_use_step_scale() {
        let f = indexed_field(3, 4, 1);
        let row = extract_row(&f, 3, None).unwrap();
        assert_eq!(row.coordinates(5.0), vec![0.0, 5.0, 10.0]);
        assert_eq!(row.label(5.0), 15.0);
    }

    #[test]
    fn window_max_covers_central_third() {
        let row = Slice1D {
            values: vec![9.0, 9.0, 9.0, 1.0, 4.0, 2.0, 9.0, 9.0, 9.0],
            y_index: 0,
            z_index: 0,
        };
        assert_eq!(row.window_max(), Some(4.0));

        let short = Slice1D {
            values: vec![1.0, 2.0],
            y_index: 0,
            z_index: 0,
        };
        assert_eq!(short.window_max(), None);
    }
}
