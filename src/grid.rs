// src/grid.rs

use crate::error::{OvfError, Result};

/// Regular 3D lattice read from an OVF header.
///
/// Flat voxel indexing is x fastest, then y, then z (OVF storage order).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grid3D {
    pub nx: usize,
    pub ny: usize,
    pub nz: usize,
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Grid3D {
    /// Create a new grid with nx × ny × nz cells and spacings dx, dy, dz.
    pub fn new(nx: usize, ny: usize, nz: usize, dx: f64, dy: f64, dz: f64) -> Self {
        Self {
            nx,
            ny,
            nz,
            dx,
            dy,
            dz,
        }
    }

    /// Total number of cells.
    pub fn n_cells(&self) -> usize {
        self.nx * self.ny * self.nz
    }

    /// Convert (i, j, k) indices to a flat voxel index.
    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        debug_assert!(i < self.nx && j < self.ny && k < self.nz);
        (k * self.ny + j) * self.nx + i
    }

    /// Vertical mid-plane, floor(nz/2).
    #[inline]
    pub fn mid_z(&self) -> usize {
        self.nz / 2
    }

    pub(crate) fn check_y(&self, j: usize) -> Result<()> {
        if j >= self.ny {
            return Err(OvfError::IndexOutOfRange {
                axis: 'y',
                index: j,
                len: self.ny,
            });
        }
        Ok(())
    }

    pub(crate) fn check_z(&self, k: usize) -> Result<()> {
        if k >= self.nz {
            return Err(OvfError::IndexOutOfRange {
                axis: 'z',
                index: k,
                len: self.nz,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grid_indexing_is_x_fastest() {
        let g = Grid3D::new(4, 3, 2, 1.0, 2.0, 3.0);
        assert_eq!(g.idx(0, 0, 0), 0);
        assert_eq!(g.idx(1, 0, 0), 1);
        assert_eq!(g.idx(0, 1, 0), 4);
        assert_eq!(g.idx(0, 0, 1), 12);
        assert_eq!(g.idx(3, 2, 1), 23); // (k=1*3 + j=2)*4 + i=3
        assert_eq!(g.n_cells(), 24);
    }

    #[test]
    fn mid_plane_rounds_down() {
        assert_eq!(Grid3D::new(1, 1, 5, 1.0, 1.0, 1.0).mid_z(), 2);
        assert_eq!(Grid3D::new(1, 1, 4, 1.0, 1.0, 1.0).mid_z(), 2);
        assert_eq!(Grid3D::new(1, 1, 1, 1.0, 1.0, 1.0).mid_z(), 0);
    }

    #[test]
    fn out_of_range_rows_are_reported() {
        let g = Grid3D::new(4, 3, 2, 1.0, 1.0, 1.0);
        assert!(g.check_y(2).is_ok());
        assert!(matches!(
            g.check_y(3),
            Err(OvfError::IndexOutOfRange { axis: 'y', index: 3, len: 3 })
        ));
        assert!(matches!(
            g.check_z(2),
            Err(OvfError::IndexOutOfRange { axis: 'z', .. })
        ));
    }
}
