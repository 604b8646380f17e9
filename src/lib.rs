//! Weno-advect solves the linear advection equation `u_t + a . grad(u) = 0`
//! for a scalar field on the doubly-periodic unit square, with a conservative
//! finite-volume scheme: fifth-order WENO reconstruction at cell faces and
//! third-order strong-stability-preserving Runge-Kutta time stepping.
//!
//! The grid is partitioned into rectangular blocks. Each block owns its
//! cells and advances them independently, reading neighbor data only from a
//! three-cell halo which is refreshed by message passing before every
//! Runge-Kutta stage. Results do not depend on the number of blocks, or on
//! whether blocks are evaluated serially or on a thread pool.

pub mod adjacency_list;
pub mod automaton;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod flux;
pub mod index_space;
pub mod mesh;
pub mod partition;
pub mod patch;
pub mod solver;
pub mod weno;
