//! Fifth-order weighted essentially non-oscillatory (WENO5) reconstruction,
//! in the form of Jiang and Shu.
//!
//! Given five consecutive cell averages centered on `u0`, the reconstruction
//! returns the value at the face immediately to the right of `u0`, as seen
//! from the left (upwind for a positive advection velocity). Three
//! third-order candidate interpolants are blended with nonlinear weights
//! that collapse onto the smoothest candidate near a discontinuity and
//! approach the optimal linear weights in smooth regions.

/// Regularization added to every smoothness indicator.
pub const EPSILON: f64 = 1e-6;

/// The optimal (linear) weights of the three candidate stencils.
pub const LINEAR_WEIGHTS: [f64; 3] = [1.0 / 10.0, 3.0 / 5.0, 3.0 / 10.0];

/// Number of cells on each side of `u0` the reconstruction reads.
pub const STENCIL_RADIUS: i64 = 2;




/// Return the three candidate face values, from the left-, center-, and
/// right-biased 3-cell stencils.
///
pub fn candidates(um2: f64, um1: f64, u0: f64, up1: f64, up2: f64) -> [f64; 3] {
    [
        (1.0 / 3.0) * um2 - (7.0 / 6.0) * um1 + (11.0 / 6.0) * u0,
        -(1.0 / 6.0) * um1 + (5.0 / 6.0) * u0 + (1.0 / 3.0) * up1,
        (1.0 / 3.0) * u0 + (5.0 / 6.0) * up1 - (1.0 / 6.0) * up2,
    ]
}




/// Return the smoothness indicator of each candidate stencil. Each is zero
/// for linear data on its stencil and grows with the square of the
/// stencil's undivided second and first differences.
///
pub fn smoothness_indicators(um2: f64, um1: f64, u0: f64, up1: f64, up2: f64) -> [f64; 3] {
    [
        (13.0 / 12.0) * (um2 - 2.0 * um1 + u0).powi(2)
            + (1.0 / 4.0) * (um2 - 4.0 * um1 + 3.0 * u0).powi(2),
        (13.0 / 12.0) * (um1 - 2.0 * u0 + up1).powi(2)
            + (1.0 / 4.0) * (um1 - up1).powi(2),
        (13.0 / 12.0) * (u0 - 2.0 * up1 + up2).powi(2)
            + (1.0 / 4.0) * (3.0 * u0 - 4.0 * up1 + up2).powi(2),
    ]
}




/// Return the normalized nonlinear weights, which sum to one.
///
pub fn nonlinear_weights(beta: [f64; 3]) -> [f64; 3] {
    let mut w = [0.0; 3];

    for (w, (gamma, beta)) in w.iter_mut().zip(LINEAR_WEIGHTS.iter().zip(beta.iter())) {
        *w = gamma / (EPSILON + beta).powi(2)
    }
    let total: f64 = w.iter().sum();

    for w in &mut w {
        *w /= total
    }
    w
}




/// Reconstruct the value at the face between `u0` and `up1`, from the left.
///
pub fn weno5(um2: f64, um1: f64, u0: f64, up1: f64, up2: f64) -> f64 {
    let u = candidates(um2, um1, u0, up1, up2);
    let w = nonlinear_weights(smoothness_indicators(um2, um1, u0, up1, up2));

    w[0] * u[0] + w[1] * u[1] + w[2] * u[2]
}




// ============================================================================
#[cfg(test)]
mod test {

    use super::*;

    #[test]
    fn constant_data_is_reproduced() {
        for &u in &[0.0, 1.0, -3.25, 1e6, 1e-9] {
            assert!((weno5(u, u, u, u, u) - u).abs() <= 1e-12 * u.abs().max(1.0));
        }
    }

    #[test]
    fn linear_data_gives_the_face_midpoint() {
        for &(a, h) in &[(0.0, 1.0), (2.0, -0.5), (-1.0, 0.125), (10.0, 3.0)] {
            let u: Vec<f64> = (-2..=2).map(|k| a + h * k as f64).collect();
            let face = weno5(u[0], u[1], u[2], u[3], u[4]);
            assert!((face - (a + 0.5 * h)).abs() < 1e-12, "{} != {}", face, a + 0.5 * h);
        }
    }

    #[test]
    fn each_candidate_is_exact_for_linear_data() {
        let c = candidates(-2.0, -1.0, 0.0, 1.0, 2.0);
        for &c in &c {
            assert!((c - 0.5).abs() < 1e-14);
        }
        let beta = smoothness_indicators(-2.0, -1.0, 0.0, 1.0, 2.0);
        assert!((beta[1] - 1.0).abs() < 1e-14);
        assert!((beta[0] - 1.0).abs() < 1e-14);
        assert!((beta[2] - 1.0).abs() < 1e-14);
    }

    #[test]
    fn weights_sum_to_one_and_approach_linear_weights_on_smooth_data() {
        let w = nonlinear_weights(smoothness_indicators(1.0, 1.0, 1.0, 1.0, 1.0));
        assert!((w.iter().sum::<f64>() - 1.0).abs() < 1e-14);

        for (w, gamma) in w.iter().zip(&LINEAR_WEIGHTS) {
            assert!((w - gamma).abs() < 1e-12);
        }
    }

    #[test]
    fn a_step_is_not_overshot() {
        let face = weno5(0.0, 0.0, 0.0, 1.0, 1.0);
        assert!(face >= 0.0 && face < 1e-6);

        let face = weno5(1.0, 1.0, 1.0, 0.0, 0.0);
        assert!(face <= 1.0 && face > 1.0 - 1e-6);
    }

    #[test]
    fn reconstruction_blends_candidates_with_the_nonlinear_weights() {
        let stencil = (0.3, -1.2, 2.5, 0.7, 4.0);
        let (a, b, c, d, e) = stencil;
        let u = candidates(a, b, c, d, e);
        let w = nonlinear_weights(smoothness_indicators(a, b, c, d, e));
        let face = weno5(a, b, c, d, e);

        assert_eq!(face, w[0] * u[0] + w[1] * u[1] + w[2] * u[2]);
        assert!(face >= u.iter().cloned().fold(f64::INFINITY, f64::min) - 1e-12);
        assert!(face <= u.iter().cloned().fold(f64::NEG_INFINITY, f64::max) + 1e-12);
    }
}
