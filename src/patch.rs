use serde::{Deserialize, Serialize};
use crate::index_space::IndexSpace;




/**
 * A patch is a mapping from a rectangular subset of the cell index space to
 * scalar field values. The mapping is backed by a row-major array of data,
 * one value per index. Patches are used for owned blocks of the solution,
 * for the halo-padded views of those blocks, for residuals and face fluxes,
 * and for the pieces of data carried between blocks in a halo exchange.
 */
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Patch {
    space: IndexSpace,
    data: Vec<f64>,
}




impl Patch {




    /**
     * Generate a patch covering the given index space, with all values set
     * to zero.
     */
    pub fn zeros(space: IndexSpace) -> Self {
        let data = vec![0.0; space.len()];
        Self { space, data }
    }




    /**
     * Generate a patch covering the given index space, with values defined
     * from a closure.
     */
    pub fn from_function<F>(space: IndexSpace, f: F) -> Self
    where
        F: Fn((i64, i64)) -> f64
    {
        let data = space.iter().map(f).collect();
        Self { space, data }
    }




    pub fn index_space(&self) -> &IndexSpace {
        &self.space
    }




    /**
     * Return the value at the given index. Panics if the index is not in
     * this patch.
     */
    pub fn get(&self, index: (i64, i64)) -> f64 {
        self.validate_index(index);
        self.data[self.space.row_major_offset(index)]
    }

    pub fn get_mut(&mut self, index: (i64, i64)) -> &mut f64 {
        self.validate_index(index);
        let n = self.space.row_major_offset(index);
        &mut self.data[n]
    }




    /**
     * Set every value in the patch to the given value.
     */
    pub fn fill(&mut self, value: f64) {
        for x in &mut self.data {
            *x = value
        }
    }




    /**
     * Return a new patch holding a copy of the data in the given subset of
     * this patch.
     */
    pub fn extract(&self, space: &IndexSpace) -> Self {
        assert!(
            self.space.contains_space(space),
            "extracted region {:?} is not inside patch {:?}", space, self.space);

        Self::from_function(space.clone(), |index| self.get(index))
    }




    /**
     * Relabel the indexes of this patch by the given offset. The data is not
     * touched.
     */
    pub fn translate(self, offset: (i64, i64)) -> Self {
        Self {
            space: self.space.translate(offset),
            data: self.data,
        }
    }




    /**
     * Overwrite the values of this patch wherever it overlaps another one.
     */
    pub fn copy_from(&mut self, other: &Self) {
        if let Some(overlap) = self.space.intersect(&other.space) {
            for index in overlap.iter() {
                *self.get_mut(index) = other.get(index)
            }
        }
    }




    /**
     * Return an iterator over the (index, value) pairs in row-major order.
     */
    pub fn iter(&self) -> impl Iterator<Item = ((i64, i64), f64)> + '_ {
        self.space.iter().zip(self.data.iter().cloned())
    }




    /**
     * Return the sum of the values in the patch.
     */
    pub fn sum(&self) -> f64 {
        self.data.iter().sum()
    }




    /**
     * Return the largest absolute difference with another patch over the same
     * index space.
     */
    pub fn max_abs_difference(&self, other: &Self) -> f64 {
        assert_eq!(self.space, other.space, "patches cover different index spaces");

        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    fn validate_index(&self, index: (i64, i64)) {
        if !self.space.contains(index) {
            let (i0, j0) = self.space.start();
            let (i1, j1) = self.space.end();
            panic!("index ({} {}) out of range on patch ({}..{} {}..{})",
                index.0,
                index.1,
                i0,
                i1,
                j0,
                j1);
        }
    }
}
