use core::ops::Range;
use serde::{Deserialize, Serialize};




/**
 * Identifier for a Cartesian axis
 */
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Axis {
    I,
    J,
}




#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]


/**
 * Represents a rectangular region in a discrete index space
 */
pub struct IndexSpace {
    di: Range<i64>,
    dj: Range<i64>,
}




/**
 * Describes a rectangular index space. The index type is signed 64-bit
 * integer, so that ghost zones of a block at the domain origin can carry
 * negative indexes.
 */
impl IndexSpace {


    pub fn new(di: Range<i64>, dj: Range<i64>) -> Self {

        assert!(
            di.start <= di.end && dj.start <= dj.end,
            "index space has negative volume");

        Self { di, dj }
    }


    /**
     * Return the number of indexes on each axis.
     */
    pub fn dim(&self) -> (usize, usize) {
        ((self.di.end - self.di.start) as usize,
         (self.dj.end - self.dj.start) as usize)
    }


    /**
     * Return the number of elements in this index space.
     */
    pub fn len(&self) -> usize {
        let (l, m) = self.dim();
        l * m
    }


    /**
     * Determine whether this index space has no elements.
     */
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }


    /**
     * Return the minimum index (inclusive).
     */
    pub fn start(&self) -> (i64, i64) {
        (self.di.start, self.dj.start)
    }


    /**
     * Return the maximum index (exclusive).
     */
    pub fn end(&self) -> (i64, i64) {
        (self.di.end, self.dj.end)
    }


    /**
     * Return the range of indexes along the given axis.
     */
    pub fn range(&self, axis: Axis) -> Range<i64> {
        match axis {
            Axis::I => self.di.clone(),
            Axis::J => self.dj.clone(),
        }
    }


    /**
     * Determine whether this index space contains the given index.
     */
    pub fn contains(&self, index: (i64, i64)) -> bool {
        self.di.contains(&index.0) && self.dj.contains(&index.1)
    }


    /**
     * Determine whether another index space is a subset of this one.
     */
    pub fn contains_space(&self, other: &Self) -> bool {
        other.di.start >= self.di.start && other.di.end <= self.di.end &&
        other.dj.start >= self.dj.start && other.dj.end <= self.dj.end
    }


    /**
     * Expand this index space by the given number of elements on each axis.
     */
    pub fn extend_all(&self, delta: i64) -> Self {
        Self::new(
            self.di.start - delta .. self.di.end + delta,
            self.dj.start - delta .. self.dj.end + delta)
    }


    /**
     * Expand just the upper end of this index space on the given axis. A
     * block of `n` cells extended by one on an axis is the index space of
     * its `n + 1` faces on that axis.
     */
    pub fn extend_upper(&self, delta: i64, axis: Axis) -> Self {
        match axis {
            Axis::I => Self::new(self.di.start .. self.di.end + delta, self.dj.clone()),
            Axis::J => Self::new(self.di.clone(), self.dj.start .. self.dj.end + delta),
        }
    }


    /**
     * Shift this index space by the given offset on both axes.
     */
    pub fn translate(&self, offset: (i64, i64)) -> Self {
        Self::new(
            self.di.start + offset.0 .. self.di.end + offset.0,
            self.dj.start + offset.1 .. self.dj.end + offset.1)
    }


    /**
     * Return the overlapping part of two index spaces, if they overlap.
     */
    pub fn intersect(&self, other: &Self) -> Option<Self> {
        let i0 = self.di.start.max(other.di.start);
        let i1 = self.di.end.min(other.di.end);
        let j0 = self.dj.start.max(other.dj.start);
        let j1 = self.dj.end.min(other.dj.end);

        if i0 < i1 && j0 < j1 {
            Some(Self::new(i0..i1, j0..j1))
        } else {
            None
        }
    }


    /**
     * Return the linear offset for the given index, in a row-major memory
     * buffer aligned with the start of this index space.
     */
    pub fn row_major_offset(&self, index: (i64, i64)) -> usize {
        let i = (index.0 - self.di.start) as usize;
        let j = (index.1 - self.dj.start) as usize;
        let m = (self.dj.end - self.dj.start) as usize;
        i * m + j
    }


    /**
     * Return an iterator which traverses the index space in row-major order
     * (C-like; the final index increases fastest).
     */
    pub fn iter(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        self.di.clone().flat_map(move |i| self.dj.clone().map(move |j| (i, j)))
    }
}




/**
 * Less imposing factory function to construct an IndexSpace object.
 */
pub fn range2d(di: Range<i64>, dj: Range<i64>) -> IndexSpace {
    IndexSpace::new(di, dj)
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::{range2d, Axis};

    #[test]
    fn iteration_is_row_major() {
        let space = range2d(0..2, 5..8);
        let indexes: Vec<_> = space.iter().collect();
        assert_eq!(indexes.len(), space.len());
        assert_eq!(indexes[0], (0, 5));
        assert_eq!(indexes[1], (0, 6));
        assert_eq!(indexes[3], (1, 5));
        assert_eq!(space.row_major_offset((1, 6)), 4);
    }

    #[test]
    fn intersection_works() {
        let a = range2d(0..10, 0..10);
        let b = range2d(8..12, -3..2);
        assert_eq!(a.intersect(&b), Some(range2d(8..10, 0..2)));
        assert_eq!(a.intersect(&range2d(10..12, 0..10)), None);
    }

    #[test]
    fn extension_and_translation_work() {
        let a = range2d(0..4, 0..6);
        assert_eq!(a.extend_all(3), range2d(-3..7, -3..9));
        assert_eq!(a.extend_upper(1, Axis::I), range2d(0..5, 0..6));
        assert_eq!(a.extend_upper(1, Axis::J), range2d(0..4, 0..7));
        assert_eq!(a.translate((-4, 6)), range2d(-4..0, 6..12));
        assert!(a.extend_all(1).contains_space(&a));
        assert!(!a.contains_space(&a.extend_all(1)));
    }
}
