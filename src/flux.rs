use crate::index_space::{Axis, IndexSpace};
use crate::patch::Patch;
use crate::weno;

/// The advection velocity, constant in space and time. Both components are
/// positive, so the reconstruction is always taken from the left of a face.
pub const ADVECTION_VELOCITY: (f64, f64) = (1.0, 1.0);




/// Compute the numerical flux through every face of the `owned` block along
/// the given axis. Face `f` lies between cells `f - 1` and `f`; the returned
/// patch covers `owned` extended by one on its upper end along `axis`, so
/// both edges of the block are included. The value is the WENO5 state left
/// of the face, times the velocity component, times the width of the face.
///
/// The stencil of face `f` is `f - 3 ..= f + 1`, so `view` must hold at least
/// three ghost cells below the block and one above it on the swept axis.
///
pub fn face_fluxes(view: &Patch, owned: &IndexSpace, axis: Axis, spacing: (f64, f64)) -> Patch {
    let faces = owned.extend_upper(1, axis);
    let stencil_extent = match axis {
        Axis::I => IndexSpace::new(
            owned.start().0 - weno::STENCIL_RADIUS - 1 .. owned.end().0 + weno::STENCIL_RADIUS,
            owned.range(Axis::J)),
        Axis::J => IndexSpace::new(
            owned.range(Axis::I),
            owned.start().1 - weno::STENCIL_RADIUS - 1 .. owned.end().1 + weno::STENCIL_RADIUS),
    };

    assert!(
        view.index_space().contains_space(&stencil_extent),
        "view {:?} is too small to reconstruct the faces of {:?}", view.index_space(), owned);

    let (dx, dy) = spacing;

    match axis {
        Axis::I => Patch::from_function(faces, |(i, j)| {
            let u = |k: i64| view.get((i + k, j));
            let face = weno::weno5(u(-3), u(-2), u(-1), u(0), u(1));
            ADVECTION_VELOCITY.0 * face * dy
        }),
        Axis::J => Patch::from_function(faces, |(i, j)| {
            let u = |k: i64| view.get((i, j + k));
            let face = weno::weno5(u(-3), u(-2), u(-1), u(0), u(1));
            ADVECTION_VELOCITY.1 * face * dx
        }),
    }
}




/// Register each face flux into the cells on either side of it: the flux
/// leaves the lower cell (added to its residual) and enters the upper cell
/// (subtracted). A face on the edge of the block has only one owned
/// neighbor, and is registered into that cell alone. The block across the
/// edge reconstructs the same face from identical halo data and registers
/// the opposite contribution, so the sum over all blocks is unaffected by
/// where the block edges lie.
///
pub fn register_fluxes(fluxes: &Patch, axis: Axis, residual: &mut Patch) {
    let owned = residual.index_space().clone();
    let below = |(i, j): (i64, i64)| match axis {
        Axis::I => (i - 1, j),
        Axis::J => (i, j - 1),
    };

    for (face, flux) in fluxes.iter() {
        if owned.contains(face) {
            *residual.get_mut(face) -= flux
        }
        if owned.contains(below(face)) {
            *residual.get_mut(below(face)) += flux
        }
    }
}




/// Accumulate the net flux out of every owned cell into `residual`, which
/// must cover exactly the owned block. The residual is added to, not
/// overwritten; callers zero it at the start of each stage.
///
/// Each cell receives its contributions in the same order (low-I face,
/// high-I face, low-J face, high-J face) no matter how the grid is
/// partitioned.
///
pub fn accumulate_residual(view: &Patch, spacing: (f64, f64), residual: &mut Patch) {
    let owned = residual.index_space().clone();

    let flux_i = face_fluxes(view, &owned, Axis::I, spacing);
    register_fluxes(&flux_i, Axis::I, residual);

    let flux_j = face_fluxes(view, &owned, Axis::J, spacing);
    register_fluxes(&flux_j, Axis::J, residual);
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;
    use crate::index_space::range2d;
    use crate::mesh::Mesh;
    use crate::partition::Decomposition;
    use std::f64::consts::PI;

    fn sine_field(mesh: &Mesh) -> Patch {
        Patch::from_function(mesh.index_space(), |index| {
            let (x, y) = mesh.cell_center(index);
            f64::sin(2.0 * PI * x) * f64::sin(2.0 * PI * y) + 0.5 * f64::cos(2.0 * PI * y)
        })
    }

    fn total_residual(size: (i64, i64), num_workers: usize) -> (f64, Patch) {
        let mesh = Mesh::unit_square(size);
        let decomposition = Decomposition::with_workers(size, num_workers, 3).unwrap();
        let blocks = decomposition.scatter(&sine_field(&mesh));
        let views = decomposition.exchange(&blocks);

        let residuals: Vec<_> = views
            .iter()
            .enumerate()
            .map(|(rank, view)| {
                let mut residual = Patch::zeros(decomposition.owned_extent(rank).clone());
                accumulate_residual(view, mesh.cell_spacing(), &mut residual);
                residual
            })
            .collect();

        let total: f64 = residuals.iter().map(Patch::sum).sum();
        (total, decomposition.gather(&residuals))
    }

    #[test]
    fn residual_sums_to_zero_for_any_worker_count() {
        for &num_workers in &[1, 2, 4] {
            let (total, _) = total_residual((8, 8), num_workers);
            assert!(total.abs() < 1e-12, "{} workers: total residual {}", num_workers, total);

            let (total, _) = total_residual((12, 10), num_workers);
            assert!(total.abs() < 1e-12, "{} workers: total residual {}", num_workers, total);
        }
    }

    #[test]
    fn residual_does_not_depend_on_partitioning() {
        let (_, one) = total_residual((16, 16), 1);
        let (_, four) = total_residual((16, 16), 4);
        let (_, two) = total_residual((16, 16), 2);
        assert_eq!(one, four);
        assert_eq!(one, two);
    }

    #[test]
    fn uniform_field_has_zero_residual() {
        let view = Patch::from_function(range2d(-3..7, -3..7), |_| 2.5);
        let mut residual = Patch::zeros(range2d(0..4, 0..4));
        accumulate_residual(&view, (0.25, 0.25), &mut residual);

        for (_, r) in residual.iter() {
            assert!(r.abs() < 1e-15);
        }
    }

    #[test]
    fn edge_faces_register_into_one_cell() {
        let owned = range2d(0..2, 0..1);
        let fluxes = Patch::from_function(owned.extend_upper(1, Axis::I), |(i, _)| (i + 1) as f64);
        let mut residual = Patch::zeros(owned);
        register_fluxes(&fluxes, Axis::I, &mut residual);

        // Cell 0: -F(face 0) + F(face 1), cell 1: -F(face 1) + F(face 2)
        assert_eq!(residual.get((0, 0)), -1.0 + 2.0);
        assert_eq!(residual.get((1, 0)), -2.0 + 3.0);
    }

    #[test]
    #[should_panic]
    fn view_without_halo_is_rejected() {
        let view = Patch::zeros(range2d(0..4, 0..4));
        let mut residual = Patch::zeros(range2d(0..4, 0..4));
        accumulate_residual(&view, (0.25, 0.25), &mut residual);
    }
}
