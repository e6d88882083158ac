//! Discrete LQR gain synthesis

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use nalgebra::DMatrix;

// Internal
use super::LtvError;

// ---------------------------------------------------------------------------
// CONSTANTS
// ---------------------------------------------------------------------------

/// Convergence tolerance on the Riccati fixed-point iteration.
const DARE_TOLERANCE: f64 = 1e-10;

/// Iteration cap on the Riccati fixed-point iteration.
const DARE_MAX_ITERATIONS: usize = 10_000;

// ---------------------------------------------------------------------------
// PUBLIC FUNCTIONS
// ---------------------------------------------------------------------------

/// Discretize the continuous state-space pair (A, B) with a zero-order hold
/// over `dt_s`, via the matrix exponential of the augmented matrix
/// `[[A, B], [0, 0]] * dt`.
pub fn discretize_ab(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    dt_s: f64,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let states = a.nrows();
    let inputs = b.ncols();
    let size = states + inputs;

    let mut augmented = DMatrix::<f64>::zeros(size, size);
    augmented
        .slice_mut((0, 0), (states, states))
        .copy_from(&(a * dt_s));
    augmented
        .slice_mut((0, states), (states, inputs))
        .copy_from(&(b * dt_s));

    let phi = augmented.exp();

    let a_d = phi.slice((0, 0), (states, states)).clone_owned();
    let b_d = phi.slice((0, states), (states, inputs)).clone_owned();

    (a_d, b_d)
}

/// Solve the discrete algebraic Riccati equation for the discretized pair
/// (Ad, Bd) with cost matrices Q and R, by fixed-point iteration from
/// `X = Q`.
pub fn dare(
    a_d: &DMatrix<f64>,
    b_d: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
) -> Result<DMatrix<f64>, LtvError> {
    let mut x = q.clone();

    for _ in 0..DARE_MAX_ITERATIONS {
        let inner = (r + b_d.transpose() * &x * b_d)
            .try_inverse()
            .ok_or(LtvError::SingularCostMatrix)?;

        let x_next = a_d.transpose() * &x * a_d
            - a_d.transpose() * &x * b_d * inner * b_d.transpose() * &x * a_d
            + q;

        let delta = (&x_next - &x).norm();
        x = x_next;

        if delta < DARE_TOLERANCE {
            return Ok(x);
        }
    }

    Err(LtvError::DareNotConverged)
}

/// Compute the discrete LQR state-feedback gain for the continuous pair
/// (A, B) with Bryson-style element maxima discretized at `dt_s`:
///
/// `K = (R + Bd' S Bd)^-1 Bd' S Ad`
pub fn lqr_gain(
    a: &DMatrix<f64>,
    b: &DMatrix<f64>,
    q: &DMatrix<f64>,
    r: &DMatrix<f64>,
    dt_s: f64,
) -> Result<DMatrix<f64>, LtvError> {
    let (a_d, b_d) = discretize_ab(a, b, dt_s);
    let s = dare(&a_d, &b_d, q, r)?;

    let inner = (r + b_d.transpose() * &s * &b_d)
        .try_inverse()
        .ok_or(LtvError::SingularCostMatrix)?;

    Ok(inner * b_d.transpose() * s * a_d)
}

/// Bryson's rule cost matrix: a diagonal of `1 / max_i^2` for each element
/// maximum.
pub fn bryson_cost(maxima: &[f64]) -> DMatrix<f64> {
    let mut q = DMatrix::<f64>::zeros(maxima.len(), maxima.len());
    for (i, max) in maxima.iter().enumerate() {
        q[(i, i)] = 1.0 / (max * max);
    }
    q
}

// ---------------------------------------------------------------------------
// TESTS
// ---------------------------------------------------------------------------

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_discretize_integrator() {
        // A pure integrator x' = u discretizes to x[k+1] = x[k] + u dt
        let a = DMatrix::from_row_slice(1, 1, &[0.0]);
        let b = DMatrix::from_row_slice(1, 1, &[1.0]);

        let (a_d, b_d) = discretize_ab(&a, &b, 0.02);
        assert!((a_d[(0, 0)] - 1.0).abs() < 1e-12);
        assert!((b_d[(0, 0)] - 0.02).abs() < 1e-12);
    }

    #[test]
    fn test_discretize_first_order_lag() {
        // x' = -x has the exact solution a_d = e^(-dt)
        let a = DMatrix::from_row_slice(1, 1, &[-1.0]);
        let b = DMatrix::from_row_slice(1, 1, &[1.0]);

        let (a_d, _) = discretize_ab(&a, &b, 0.1);
        assert!((a_d[(0, 0)] - (-0.1f64).exp()).abs() < 1e-9);
    }

    #[test]
    fn test_lqr_stabilizes_double_integrator() {
        let dt_s = 0.02;
        let a = DMatrix::from_row_slice(2, 2, &[0.0, 1.0, 0.0, 0.0]);
        let b = DMatrix::from_row_slice(2, 1, &[0.0, 1.0]);
        let q = bryson_cost(&[0.1, 1.0]);
        let r = bryson_cost(&[12.0]);

        let k = lqr_gain(&a, &b, &q, &r, dt_s).unwrap();
        assert_eq!(k.nrows(), 1);
        assert_eq!(k.ncols(), 2);

        // Simulate the closed loop from an offset and check it converges
        let (a_d, b_d) = discretize_ab(&a, &b, dt_s);
        let mut x = DMatrix::from_row_slice(2, 1, &[1.0, 0.0]);
        for _ in 0..2000 {
            let u = -&k * &x;
            x = &a_d * x + &b_d * u;
        }

        assert!(x[(0, 0)].abs() < 1e-3);
        assert!(x[(1, 0)].abs() < 1e-3);
    }

    #[test]
    fn test_bryson_cost_diagonal() {
        let q = bryson_cost(&[2.0, 4.0]);
        assert!((q[(0, 0)] - 0.25).abs() < 1e-12);
        assert!((q[(1, 1)] - 0.0625).abs() < 1e-12);
        assert_eq!(q[(0, 1)], 0.0);
    }
}
