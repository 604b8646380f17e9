use core::ops::Range;
use serde::{Deserialize, Serialize};
use crate::index_space::{range2d, IndexSpace};




/// A simple rectilinear structured mesh. Cell `(i, j)` covers
/// `[x0 + i dx, x0 + (i + 1) dx) x [y0 + j dy, y0 + (j + 1) dy)`.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub area: (Range<f64>, Range<f64>),
    pub size: (i64, i64),
}

impl Mesh {
    /// The unit square with the given number of cells on each axis.
    pub fn unit_square(size: (i64, i64)) -> Self {
        Self {
            area: (0.0..1.0, 0.0..1.0),
            size,
        }
    }

    pub fn cell_spacing(&self) -> (f64, f64) {
        let d0 = (self.area.0.end - self.area.0.start) / self.size.0 as f64;
        let d1 = (self.area.1.end - self.area.1.start) / self.size.1 as f64;
        (d0, d1)
    }

    pub fn cell_center(&self, index: (i64, i64)) -> (f64, f64) {
        let (d0, d1) = self.cell_spacing();
        let x0 = self.area.0.start + d0 * (index.0 as f64 + 0.5);
        let x1 = self.area.1.start + d1 * (index.1 as f64 + 0.5);
        (x0, x1)
    }

    pub fn index_space(&self) -> IndexSpace {
        range2d(0..self.size.0, 0..self.size.1)
    }
}
