// src/vector_field.rs

use crate::grid::Grid3D;

/// One of the three stored vector components.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Component {
    X,
    Y,
    Z,
}

impl Component {
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::X => 0,
            Self::Y => 1,
            Self::Z => 2,
        }
    }
}

/// Scalar quantity derived from a vector field: a single component or |B|.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldQuantity {
    X,
    Y,
    Z,
    Total,
}

impl From<Component> for FieldQuantity {
    fn from(c: Component) -> Self {
        match c {
            Component::X => Self::X,
            Component::Y => Self::Y,
            Component::Z => Self::Z,
        }
    }
}

/// Snapshot vector field on a 3D grid.
/// Each voxel stores (u, v, w); `data` is indexed by `grid.idx(i, j, k)`.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorField3D {
    pub grid: Grid3D,
    pub data: Vec<[f64; 3]>,
}

impl VectorField3D {
    /// Zero field on the given grid.
    pub fn new(grid: Grid3D) -> Self {
        Self {
            grid,
            data: vec![[0.0; 3]; grid.n_cells()],
        }
    }

    /// Build from the flat token stream, three values per voxel, voxels x fastest.
    /// The caller guarantees `values.len() == grid.n_cells() * 3`.
    pub(crate) fn from_flat(grid: Grid3D, values: &[f64]) -> Self {
        debug_assert_eq!(values.len(), grid.n_cells() * 3);
        let data = values
            .chunks_exact(3)
            .map(|v| [v[0], v[1], v[2]])
            .collect();
        Self { grid, data }
    }

    #[inline]
    pub fn idx(&self, i: usize, j: usize, k: usize) -> usize {
        self.grid.idx(i, j, k)
    }

    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> [f64; 3] {
        self.data[self.idx(i, j, k)]
    }

    /// Select one stored component.
    pub fn component(&self, c: Component) -> ScalarField3D {
        let n = c.index();
        ScalarField3D {
            grid: self.grid,
            data: self.data.iter().map(|v| v[n]).collect(),
        }
    }

    /// |B| = sqrt(u² + v² + w²) per voxel. NaN/Inf propagate.
    pub fn magnitude(&self) -> ScalarField3D {
        ScalarField3D {
            grid: self.grid,
            data: self
                .data
                .iter()
                .map(|v| (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt())
                .collect(),
        }
    }

    pub fn quantity(&self, q: FieldQuantity) -> ScalarField3D {
        match q {
            FieldQuantity::X => self.component(Component::X),
            FieldQuantity::Y => self.component(Component::Y),
            FieldQuantity::Z => self.component(Component::Z),
            FieldQuantity::Total => self.magnitude(),
        }
    }
}

/// One value per voxel, same layout as `VectorField3D`.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarField3D {
    pub grid: Grid3D,
    pub data: Vec<f64>,
}

impl ScalarField3D {
    #[inline]
    pub fn get(&self, i: usize, j: usize, k: usize) -> f64 {
        self.data[self.grid.idx(i, j, k)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_field() -> VectorField3D {
        let grid = Grid3D::new(3, 2, 2, 1.0, 1.0, 1.0);
        let values: Vec<f64> = (0..grid.n_cells() * 3).map(|n| n as f64 - 17.0).collect();
        VectorField3D::from_flat(grid, &values)
    }

    #[test]
    fn magnitude_squared_matches_components() {
        let f = sample_field();
        let mag = f.magnitude();
        for (v, m) in f.data.iter().zip(&mag.data) {
            let expected = v[0] * v[0] + v[1] * v[1] + v[2] * v[2];
            assert!(
                (m * m - expected).abs() <= 1e-9 * expected.max(1.0),
                "|B|^2 = {} but u²+v²+w² = {}",
                m * m,
                expected
            );
        }
    }

    #[test]
    fn magnitude_of_zero_vector_is_exactly_zero() {
        let f = VectorField3D::new(Grid3D::new(2, 2, 1, 1.0, 1.0, 1.0));
        assert!(f.magnitude().data.iter().all(|&m| m == 0.0));
    }

    #[test]
    fn magnitude_propagates_nan() {
        let mut f = VectorField3D::new(Grid3D::new(1, 1, 1, 1.0, 1.0, 1.0));
        f.data[0] = [f64::NAN, 1.0, 0.0];
        assert!(f.magnitude().data[0].is_nan());
    }

    #[test]
    fn quantity_dispatches_to_component_or_magnitude() {
        let f = sample_field();
        assert_eq!(f.quantity(FieldQuantity::X), f.component(Component::X));
        assert_eq!(f.quantity(FieldQuantity::Y), f.component(Component::Y));
        assert_eq!(f.quantity(FieldQuantity::Z), f.component(Component::Z));
        assert_eq!(f.quantity(FieldQuantity::Total), f.magnitude());

        let v = f.component(Component::Y);
        assert_eq!(v.get(2, 1, 1), f.get(2, 1, 1)[1]);
    }
}
