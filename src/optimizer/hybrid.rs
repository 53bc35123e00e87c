//! Hybrid variant: annealing to convergence, then fixed-iteration gradient
//! refinement.
//!
//! The refinement uses a simplified ascent direction
//! `expected_return_i - 2 * volatility_i * weight_i` per component; each
//! step is followed by the shared clip-then-renormalize constraint
//! discipline, so the sum-to-one invariant holds at every iteration.

use nalgebra::DMatrix;
use rand::Rng;

use super::annealing::{AnnealingOptions, anneal};
use super::objective::{OptimizationConstraints, clip_and_renormalize};
use crate::portfolio::Portfolio;

/// Hybrid schedule configuration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HybridOptions {
    pub annealing: AnnealingOptions,
    pub refinement_steps: usize,
    pub learning_rate: f64,
}

impl Default for HybridOptions {
    fn default() -> Self {
        Self {
            annealing: AnnealingOptions::default(),
            refinement_steps: 100,
            learning_rate: 0.01,
        }
    }
}

/// Runs annealing then gradient refinement, returning the refined weights.
pub fn optimize<R: Rng>(
    portfolio: &Portfolio,
    q: &DMatrix<f64>,
    constraints: &OptimizationConstraints,
    options: &HybridOptions,
    rng: &mut R,
) -> Vec<f64> {
    let mut weights = anneal(q, constraints, &options.annealing, rng);
    refine(portfolio, &mut weights, constraints, options);
    weights
}

fn refine(
    portfolio: &Portfolio,
    weights: &mut [f64],
    constraints: &OptimizationConstraints,
    options: &HybridOptions,
) {
    let returns = portfolio.expected_returns();
    let vols = portfolio.volatilities();

    for _ in 0..options.refinement_steps {
        for (i, w) in weights.iter_mut().enumerate() {
            let gradient = returns[i] - 2.0 * vols[i] * *w;
            *w += options.learning_rate * gradient;
        }
        clip_and_renormalize(weights, constraints.min_weight, constraints.max_weight);
    }
}
