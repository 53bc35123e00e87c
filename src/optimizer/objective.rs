//! Quadratic risk/return objective and shared weight-vector plumbing.
//!
//! The objective is a QUBO-style quadratic form `w' Q w` over continuous
//! weights: diagonal terms carry risk-aversion-scaled variance minus expected
//! return, off-diagonal terms carry risk-aversion-scaled covariance. Lower
//! energy means a better risk-adjusted portfolio.

use nalgebra::DMatrix;
use rand::Rng;

use crate::portfolio::Portfolio;

/// Fixed risk-free rate used by every Sharpe-ratio computation.
pub const RISK_FREE_RATE: f64 = 0.02;

/// Soft constraints shared by all optimization methods.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptimizationConstraints {
    pub risk_aversion: f64,
    pub max_weight: f64,
    pub min_weight: f64,
}

impl Default for OptimizationConstraints {
    fn default() -> Self {
        Self {
            risk_aversion: 1.0,
            max_weight: 0.3,
            min_weight: 0.0,
        }
    }
}

/// Builds the `n x n` objective matrix from the portfolio.
///
/// `q[i][i] = risk_aversion * vol_i^2 - expected_return_i`,
/// `q[i][j] = risk_aversion * corr_ij * vol_i * vol_j` for `i != j`.
pub fn build_objective_matrix(portfolio: &Portfolio, risk_aversion: f64) -> DMatrix<f64> {
    let n = portfolio.len();
    let vols = portfolio.volatilities();
    let returns = portfolio.expected_returns();

    DMatrix::from_fn(n, n, |i, j| {
        if i == j {
            risk_aversion * vols[i] * vols[i] - returns[i]
        } else {
            risk_aversion * portfolio.pairwise_correlation(i, j) * vols[i] * vols[j]
        }
    })
}

/// Objective energy `w' Q w`.
pub fn energy(q: &DMatrix<f64>, weights: &[f64]) -> f64 {
    let n = weights.len();
    let mut total = 0.0;
    for i in 0..n {
        for j in 0..n {
            total += weights[i] * q[(i, j)] * weights[j];
        }
    }
    total
}

/// Draws an initial weight vector: uniform draws, L1-normalized.
pub fn random_simplex_weights<R: Rng>(n: usize, rng: &mut R) -> Vec<f64> {
    let mut weights: Vec<f64> = (0..n).map(|_| rng.random::<f64>()).collect();
    normalize(&mut weights);
    weights
}

/// L1-normalizes in place; degenerate sums fall back to uniform weights.
pub fn normalize(weights: &mut [f64]) {
    let sum: f64 = weights.iter().sum();
    if sum > 0.0 && sum.is_finite() {
        for w in weights.iter_mut() {
            *w /= sum;
        }
    } else if !weights.is_empty() {
        let uniform = 1.0 / weights.len() as f64;
        weights.fill(uniform);
    }
}

/// Clips every weight into `[min_weight, max_weight]`, then renormalizes.
///
/// The order is significant: renormalizing first would let the scaling step
/// push weights back outside the bound.
pub fn clip_and_renormalize(weights: &mut [f64], min_weight: f64, max_weight: f64) {
    for w in weights.iter_mut() {
        *w = w.clamp(min_weight, max_weight);
    }
    normalize(weights);
}

/// Scalar metrics derived from a weight vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeightMetrics {
    pub expected_return: f64,
    pub portfolio_risk: f64,
    pub sharpe_ratio: f64,
}

/// Computes expected return, simplified risk, and Sharpe ratio.
///
/// Risk here is `sqrt(sum (w_i * vol_i)^2)`, deliberately ignoring
/// cross-correlation; the full correlated measure belongs to the simulator.
pub fn weight_metrics(portfolio: &Portfolio, weights: &[f64]) -> WeightMetrics {
    let expected_return: f64 = portfolio
        .positions
        .iter()
        .zip(weights.iter())
        .map(|(p, w)| w * p.expected_return)
        .sum();
    let portfolio_risk = portfolio
        .positions
        .iter()
        .zip(weights.iter())
        .map(|(p, w)| (w * p.volatility) * (w * p.volatility))
        .sum::<f64>()
        .sqrt();
    let sharpe_ratio = if portfolio_risk == 0.0 {
        0.0
    } else {
        (expected_return - RISK_FREE_RATE) / portfolio_risk
    };

    WeightMetrics {
        expected_return,
        portfolio_risk,
        sharpe_ratio,
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::portfolio::Position;

    fn portfolio() -> Portfolio {
        Portfolio::new(vec![
            Position::new("crude_oil", 1_000.0, 0.10, 0.30),
            Position::new("gold", 800.0, 0.05, 0.15),
        ])
    }

    #[test]
    fn objective_diagonal_rewards_return_and_penalizes_variance() {
        let q = build_objective_matrix(&portfolio(), 2.0);
        assert_relative_eq!(q[(0, 0)], 2.0 * 0.09 - 0.10, epsilon = 1.0e-12);
        assert_relative_eq!(q[(1, 1)], 2.0 * 0.0225 - 0.05, epsilon = 1.0e-12);
        // Baseline correlation 0.1 feeds the off-diagonal.
        assert_relative_eq!(q[(0, 1)], 2.0 * 0.1 * 0.30 * 0.15, epsilon = 1.0e-12);
    }

    #[test]
    fn energy_is_the_quadratic_form() {
        let q = DMatrix::from_row_slice(2, 2, &[1.0, 0.5, 0.5, 2.0]);
        let e = energy(&q, &[0.5, 0.5]);
        assert_relative_eq!(e, 0.25 + 0.125 + 0.125 + 0.5, epsilon = 1.0e-12);
    }

    #[test]
    fn random_simplex_weights_sum_to_one() {
        let mut rng = StdRng::seed_from_u64(4);
        let w = random_simplex_weights(6, &mut rng);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1.0e-12);
        assert!(w.iter().all(|&x| x >= 0.0));
    }

    #[test]
    fn clip_happens_before_renormalization() {
        let mut w = vec![0.9, 0.05, 0.05];
        clip_and_renormalize(&mut w, 0.0, 0.5);
        // 0.9 clips to 0.5 first; renormalization then scales the sum 0.6.
        assert_relative_eq!(w[0], 0.5 / 0.6, epsilon = 1.0e-12);
        assert_relative_eq!(w.iter().sum::<f64>(), 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn zero_risk_portfolio_zero_guards_sharpe() {
        let p = Portfolio::new(vec![Position::new("cash", 100.0, 0.03, 0.0)]);
        let metrics = weight_metrics(&p, &[1.0]);
        assert_eq!(metrics.sharpe_ratio, 0.0);
        assert_relative_eq!(metrics.expected_return, 0.03, epsilon = 1.0e-12);
    }
}
