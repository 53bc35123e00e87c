//! Correlation-matrix handling and correlated return generation.
//!
//! References:
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*,
//!   correlated-path simulation via Cholesky factors.
//!
//! A correlation matrix that fails to factorize (not positive definite, or
//! carrying non-finite entries) does not abort the simulation: the generator
//! falls back to independent draws and flags the reduced fidelity, because a
//! best-effort result is preferred over aborting a risk report mid-flight.

use nalgebra::{Cholesky, DMatrix};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};

/// Synthesized default correlation matrix: unit diagonal, 0.3 off-diagonal.
///
/// Used when a caller supplies no matrix at all. The uniform 0.3 keeps the
/// matrix comfortably positive definite without requiring real data.
pub fn default_correlation_matrix(n: usize) -> DMatrix<f64> {
    DMatrix::from_fn(n, n, |i, j| if i == j { 1.0 } else { 0.3 })
}

/// Lower Cholesky factor of `corr`, or `None` when the matrix is not
/// positive definite or contains non-finite entries.
pub fn cholesky_lower(corr: &DMatrix<f64>) -> Option<DMatrix<f64>> {
    if corr.iter().any(|x| !x.is_finite()) {
        return None;
    }
    Cholesky::new(corr.clone()).map(|c| c.unpack())
}

/// Batch of jointly simulated returns plus the factorization-fallback flag.
#[derive(Debug, Clone)]
pub struct CorrelatedReturns {
    /// `n_simulations x n_assets`, row per trial.
    pub returns: Vec<Vec<f64>>,
    /// True when the correlation matrix could not be factorized and the
    /// draws are independent.
    pub independent_fallback: bool,
}

/// Generates an `n_simulations x n_assets` return matrix.
///
/// Each trial draws independent standard normals `z`, correlates them with
/// the lower Cholesky factor `L` of `corr`, and scales per asset:
/// `r_i = mu_i * horizon + sigma_i * sqrt(horizon) * (L z)_i`
/// (square-root-of-time scaling).
pub fn correlated_returns<R: Rng>(
    expected_returns: &[f64],
    volatilities: &[f64],
    corr: &DMatrix<f64>,
    horizon: f64,
    n_simulations: usize,
    rng: &mut R,
) -> CorrelatedReturns {
    let n = expected_returns.len();
    debug_assert_eq!(volatilities.len(), n);
    debug_assert_eq!(corr.nrows(), n);

    let chol = cholesky_lower(corr);
    let independent_fallback = chol.is_none();
    let sqrt_t = horizon.sqrt();

    let mut returns = Vec::with_capacity(n_simulations);
    let mut z = vec![0.0_f64; n];
    for _ in 0..n_simulations {
        for zi in &mut z {
            *zi = StandardNormal.sample(rng);
        }

        let mut row = vec![0.0_f64; n];
        for i in 0..n {
            let shock = match &chol {
                Some(l) => {
                    // Lower-triangular product: only columns 0..=i contribute.
                    let mut acc = 0.0;
                    for j in 0..=i {
                        acc += l[(i, j)] * z[j];
                    }
                    acc
                }
                None => z[i],
            };
            row[i] = expected_returns[i] * horizon + volatilities[i] * sqrt_t * shock;
        }
        returns.push(row);
    }

    CorrelatedReturns {
        returns,
        independent_fallback,
    }
}
