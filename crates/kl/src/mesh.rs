//! One-dimensional meshes supporting the discretized decompositions.

use crate::errors::{KlError, Result};
use ndarray::{Array1, Array2};

/// A one-dimensional mesh given by strictly increasing vertices.
#[derive(Clone, Debug, PartialEq)]
pub struct Mesh {
    vertices: Array1<f64>,
}

impl Mesh {
    /// Regular mesh of `n` vertices over `[a, b]`
    pub fn interval(a: f64, b: f64, n: usize) -> Result<Mesh> {
        if n < 2 {
            return Err(KlError::InvalidArgumentError(format!(
                "a mesh needs at least 2 vertices, got {n}"
            )));
        }
        if a >= b {
            return Err(KlError::InvalidArgumentError(format!(
                "mesh bounds must be increasing, got [{a}, {b}]"
            )));
        }
        Ok(Mesh {
            vertices: Array1::linspace(a, b, n),
        })
    }

    /// Mesh from explicit vertices, which must be strictly increasing
    pub fn from_vertices(vertices: Array1<f64>) -> Result<Mesh> {
        if vertices.len() < 2 {
            return Err(KlError::InvalidArgumentError(format!(
                "a mesh needs at least 2 vertices, got {}",
                vertices.len()
            )));
        }
        if vertices.windows(2).into_iter().any(|w| w[0] >= w[1]) {
            return Err(KlError::InvalidArgumentError(
                "mesh vertices must be strictly increasing".to_string(),
            ));
        }
        Ok(Mesh { vertices })
    }

    /// The vertices, increasing
    pub fn vertices(&self) -> &Array1<f64> {
        &self.vertices
    }

    /// Number of vertices
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// A mesh always holds at least two vertices
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Lower and upper bounds of the domain
    pub fn bounds(&self) -> (f64, f64) {
        (self.vertices[0], self.vertices[self.vertices.len() - 1])
    }

    /// Trapezoid integration weights attached to the vertices
    pub fn weights(&self) -> Array1<f64> {
        let m = self.vertices.len();
        let mut w = Array1::zeros(m);
        for i in 0..m - 1 {
            let h = self.vertices[i + 1] - self.vertices[i];
            w[i] += 0.5 * h;
            w[i + 1] += 0.5 * h;
        }
        w
    }

    /// Consistent mass matrix of the piecewise linear finite elements on
    /// this mesh, tridiagonal with `h/3` diagonal and `h/6` off-diagonal
    /// contributions per element
    pub fn mass_matrix(&self) -> Array2<f64> {
        let m = self.vertices.len();
        let mut mass = Array2::zeros((m, m));
        for i in 0..m - 1 {
            let h = self.vertices[i + 1] - self.vertices[i];
            mass[[i, i]] += h / 3.;
            mass[[i + 1, i + 1]] += h / 3.;
            mass[[i, i + 1]] += h / 6.;
            mass[[i + 1, i]] += h / 6.;
        }
        mass
    }
}
