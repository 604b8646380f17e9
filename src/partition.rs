//! Partitioning of the periodic grid into rectangular blocks, and the plan of
//! copies that refreshes each block's halo (guard zones) from the blocks it
//! borders.
//!
//! Each block is owned by exactly one worker. Ghost cells are labeled by
//! their unwrapped index: a block touching the origin has ghost indexes like
//! `(-1, j)`, and the halo plan fills those from the periodic image of
//! whichever block owns `(nx - 1, j)`. Data only ever moves between blocks as
//! owned copies (a [`Transfer`] packs a fresh [`Patch`]); nothing aliases
//! another block's memory.

use core::ops::Range;
use log::debug;
use crate::adjacency_list::AdjacencyList;
use crate::error::Error;
use crate::index_space::{range2d, IndexSpace};
use crate::patch::Patch;

const PERIODIC_IMAGES: [i64; 3] = [-1, 0, 1];




/// One rectangular piece of a source block which lands in the halo of a
/// target block. The `region` is in the source block's own (global)
/// coordinates; adding `offset` to it gives the ghost indexes on the target.
///
#[derive(Clone, Debug, PartialEq)]
pub struct Transfer {
    pub source: usize,
    pub target: usize,
    pub region: IndexSpace,
    pub offset: (i64, i64),
}

impl Transfer {
    /// Copy the transferred region out of the source block, relabeled into
    /// the target block's ghost coordinates.
    ///
    pub fn pack(&self, source: &Patch) -> Patch {
        source.extract(&self.region).translate(self.offset)
    }
}




/// A partition of an `nx x ny` periodic lattice into a `pi x pj` layout of
/// blocks. Block sizes along an axis differ by at most one cell, with the
/// larger blocks first. Ranks are assigned in row-major order over the
/// layout.
///
pub struct Decomposition {
    size: (i64, i64),
    layout: (i64, i64),
    halo: i64,
    blocks: Vec<IndexSpace>,
    transfers: AdjacencyList<usize, Transfer>,
}

impl Decomposition {
    /// Partition a grid with an explicit block layout.
    ///
    pub fn new(size: (i64, i64), layout: (i64, i64), halo: i64) -> Result<Self, Error> {
        if size.0 < 1 || size.1 < 1 {
            return Err(Error::InvalidGridSize(size.0, size.1));
        }
        if layout.0 < 1 || layout.1 < 1 || layout.0 > size.0 || layout.1 > size.1 {
            return Err(Error::InvalidLayout { layout, size });
        }
        if halo < 0 || halo > size.0 || halo > size.1 {
            return Err(Error::HaloExceedsGrid { halo, size });
        }

        let blocks: Vec<_> = (0..layout.0)
            .flat_map(|bi| {
                (0..layout.1).map(move |bj| {
                    range2d(split(size.0, layout.0, bi), split(size.1, layout.1, bj))
                })
            })
            .collect();

        let transfers = halo_plan(size, halo, &blocks);

        debug!(
            "partitioned {} x {} grid into {} x {} blocks, {} halo transfers",
            size.0,
            size.1,
            layout.0,
            layout.1,
            transfers.len()
        );

        Ok(Self {
            size,
            layout,
            halo,
            blocks,
            transfers,
        })
    }

    /// Partition a grid among the given number of workers, picking the
    /// layout `pi x pj = num_workers` whose blocks are closest to square.
    ///
    pub fn with_workers(size: (i64, i64), num_workers: usize, halo: i64) -> Result<Self, Error> {
        let n = num_workers as i64;

        let layout = (1..=n)
            .filter(|pi| n % pi == 0)
            .map(|pi| (pi, n / pi))
            .filter(|&(pi, pj)| pi <= size.0 && pj <= size.1)
            .min_by_key(|&(pi, pj)| size.0 * pj + size.1 * pi)
            .ok_or(Error::InvalidWorkerCount(num_workers))?;

        Self::new(size, layout, halo)
    }

    pub fn layout(&self) -> (i64, i64) {
        self.layout
    }

    pub fn num_workers(&self) -> usize {
        self.blocks.len()
    }

    /// Return the index space of the whole lattice.
    ///
    pub fn global_space(&self) -> IndexSpace {
        range2d(0..self.size.0, 0..self.size.1)
    }

    /// Return the cells owned by the given rank.
    ///
    pub fn owned_extent(&self, rank: usize) -> &IndexSpace {
        &self.blocks[rank]
    }

    /// Return the cells owned by the given rank, plus its halo.
    ///
    pub fn ghosted_extent(&self, rank: usize) -> IndexSpace {
        self.blocks[rank].extend_all(self.halo)
    }

    /// Map a possibly out-of-range (ghost) index to the global cell it stands
    /// for, by periodic wraparound on both axes.
    ///
    pub fn wrap(&self, index: (i64, i64)) -> (i64, i64) {
        (index.0.rem_euclid(self.size.0), index.1.rem_euclid(self.size.1))
    }

    /// Return the rank which owns the cell a (possibly ghost) index stands
    /// for.
    ///
    pub fn owner_of(&self, index: (i64, i64)) -> usize {
        let (i, j) = self.wrap(index);
        let bi = block_containing(self.size.0, self.layout.0, i);
        let bj = block_containing(self.size.1, self.layout.1, j);
        (bi * self.layout.1 + bj) as usize
    }

    /// Return the halo pieces the given rank must send in each exchange.
    ///
    pub fn outgoing_transfers(&self, rank: usize) -> Vec<Transfer> {
        self.transfers
            .outgoing_edges(&rank)
            .map(|(_, t)| t.clone())
            .collect()
    }

    /// Return the number of halo pieces the given rank receives in each
    /// exchange.
    ///
    pub fn incoming_count(&self, rank: usize) -> usize {
        self.transfers.incoming_edges(&rank).count()
    }

    /// Build the halo-padded view of every block from the owned blocks
    /// (indexed by rank). The interior of each view is a copy of the owned
    /// block, and the halo is filled by executing the halo plan.
    ///
    pub fn exchange(&self, blocks: &[Patch]) -> Vec<Patch> {
        let mut views: Vec<_> = (0..self.num_workers())
            .map(|rank| {
                let mut view = Patch::zeros(self.ghosted_extent(rank));
                view.copy_from(&blocks[rank]);
                view
            })
            .collect();

        for (source, block) in blocks.iter().enumerate() {
            for (&target, transfer) in self.transfers.outgoing_edges(&source) {
                views[target].copy_from(&transfer.pack(block))
            }
        }
        views
    }

    /// Split a global field into owned blocks, indexed by rank.
    ///
    pub fn scatter(&self, global: &Patch) -> Vec<Patch> {
        self.blocks.iter().map(|space| global.extract(space)).collect()
    }

    /// Assemble owned blocks (in any order) into one global field.
    ///
    pub fn gather<'a, I>(&self, blocks: I) -> Patch
    where
        I: IntoIterator<Item = &'a Patch>,
    {
        let mut global = Patch::zeros(self.global_space());

        for block in blocks {
            global.copy_from(block)
        }
        global
    }
}




/// The range of the `k`-th of `p` nearly equal pieces of `0..n`.
///
fn split(n: i64, p: i64, k: i64) -> Range<i64> {
    let base = n / p;
    let rem = n % p;
    let start = k * base + k.min(rem);
    let len = base + if k < rem { 1 } else { 0 };
    start..start + len
}

/// Inverse of `split`: the piece containing index `i`.
///
fn block_containing(n: i64, p: i64, i: i64) -> i64 {
    let base = n / p;
    let rem = n % p;
    let wide = rem * (base + 1);

    if i < wide {
        i / (base + 1)
    } else {
        rem + (i - wide) / base
    }
}

/// Every periodic image of every block which overlaps the halo of another
/// block (or its own halo, across the periodic boundary) becomes one edge.
/// Images of the owned tiling tile the plane, so the pieces arriving at a
/// block never overlap each other or the block's interior. Images one
/// period away suffice because the halo is no wider than the grid.
///
fn halo_plan(size: (i64, i64), halo: i64, blocks: &[IndexSpace]) -> AdjacencyList<usize, Transfer> {
    let mut edges = AdjacencyList::new();

    for (target, owned) in blocks.iter().enumerate() {
        let ghosted = owned.extend_all(halo);

        for (source, other) in blocks.iter().enumerate() {
            for &a in &PERIODIC_IMAGES {
                for &b in &PERIODIC_IMAGES {
                    let offset = (a * size.0, b * size.1);

                    if source == target && offset == (0, 0) {
                        continue;
                    }
                    if let Some(overlap) = other.translate(offset).intersect(&ghosted) {
                        let transfer = Transfer {
                            source,
                            target,
                            region: overlap.translate((-offset.0, -offset.1)),
                            offset,
                        };
                        edges.insert(source, target, transfer)
                    }
                }
            }
        }
    }
    edges
}
