//! Quantum-inspired portfolio weight search.
//!
//! Three classical metaheuristics over one quadratic risk/return objective:
//! simulated annealing with Metropolis acceptance, a genetic population
//! search, and a hybrid anneal-then-gradient refinement. None of them can
//! fail on non-convergence; a fixed iteration budget always yields the best
//! state visited.

pub mod annealing;
pub mod genetic;
pub mod hybrid;
pub mod objective;

use std::collections::BTreeMap;

use rand::Rng;

use crate::core::OptimizationMethod;
use crate::portfolio::Portfolio;

pub use annealing::{AnnealingOptions, anneal};
pub use genetic::{GeneticOptions, evolve};
pub use hybrid::{HybridOptions, optimize as hybrid_optimize};
pub use objective::{
    OptimizationConstraints, RISK_FREE_RATE, WeightMetrics, build_objective_matrix,
    clip_and_renormalize, energy, random_simplex_weights, weight_metrics,
};

/// Output of one weight search as registered in the result store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OptimizationResult {
    /// `QOPT-` prefixed, zero-padded identifier minted on registration.
    pub result_id: String,
    /// Commodity name -> weight in `[0, 1]`, summing to one.
    pub optimal_weights: BTreeMap<String, f64>,
    pub expected_return: f64,
    pub portfolio_risk: f64,
    pub sharpe_ratio: f64,
    pub optimization_method: OptimizationMethod,
}

/// Runs one search method and assembles the (unregistered) result payload.
pub fn run_method<R: Rng>(
    portfolio: &Portfolio,
    constraints: &OptimizationConstraints,
    method: OptimizationMethod,
    rng: &mut R,
) -> OptimizationResult {
    let weights = match method {
        OptimizationMethod::QuantumAnnealing => {
            let q = build_objective_matrix(portfolio, constraints.risk_aversion);
            anneal(&q, constraints, &AnnealingOptions::default(), rng)
        }
        OptimizationMethod::QuantumGenetic => {
            evolve(portfolio, constraints, &GeneticOptions::default(), rng)
        }
        OptimizationMethod::HybridQuantum => {
            let q = build_objective_matrix(portfolio, constraints.risk_aversion);
            hybrid_optimize(portfolio, &q, constraints, &HybridOptions::default(), rng)
        }
    };

    let metrics = weight_metrics(portfolio, &weights);
    let optimal_weights = portfolio
        .positions
        .iter()
        .zip(weights.iter())
        .map(|(p, &w)| (p.commodity.clone(), w))
        .collect();

    OptimizationResult {
        result_id: String::new(),
        optimal_weights,
        expected_return: metrics.expected_return,
        portfolio_risk: metrics.portfolio_risk,
        sharpe_ratio: metrics.sharpe_ratio,
        optimization_method: method,
    }
}
