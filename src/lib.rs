//! RiskForge is a commodity-portfolio risk engine combining Monte Carlo
//! tail-risk estimation (VaR, Expected Shortfall), deterministic stress
//! scenarios, and quantum-inspired weight optimization under one namespace.
//!
//! The crate splits into a shared position/portfolio data model, a
//! correlated-return Monte Carlo simulator, a multiplicative-shock stress
//! engine, three metaheuristic weight searches over a quadratic risk/return
//! objective, and a bounded in-process registry of past results.
//!
//! References used across modules:
//! - Glasserman (2004), *Monte Carlo Methods in Financial Engineering*.
//! - McNeil, Frey, Embrechts, *Quantitative Risk Management* (2005/2015).
//! - Kirkpatrick, Gelatt, Vecchi (1983) and Metropolis et al. (1953) for
//!   the annealing search.
//!
//! Numerical considerations:
//! - VaR is signed: a losing tail yields a negative `var_value`; nothing in
//!   the engine negates it for presentation.
//! - A non-positive-definite correlation matrix never aborts a simulation;
//!   the generator falls back to independent draws and flags it.
//! - Expected Shortfall uses a documented percentile-bucket approximation,
//!   not a conditional tail mean.
//! - Every stochastic entry point takes a caller-supplied `rand::Rng`, so a
//!   fixed seed reproduces a run exactly.
//!
//! # Feature Flags
//! - `parallel`: enables Rayon-powered aggregation of independent Monte
//!   Carlo trials.
//!
//! # Quick Start
//! Simulate portfolio VaR:
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use riskforge::engine::RiskEngine;
//! use riskforge::portfolio::{Portfolio, Position};
//!
//! let portfolio = Portfolio::new(vec![
//!     Position::new("crude_oil", 1_000_000.0, 0.0003, 0.022),
//!     Position::new("gold", 500_000.0, 0.0002, 0.011),
//! ]);
//!
//! let engine = RiskEngine::new();
//! let mut rng = StdRng::seed_from_u64(42);
//! let result = engine
//!     .simulate_var(&portfolio, 0.95, 10.0, 5_000, &mut rng)
//!     .unwrap();
//! assert!(result.var_value < 0.0);
//! assert!(result.result_id.starts_with("VAR-"));
//! ```
//!
//! Optimize weights with the annealing search:
//! ```rust
//! use rand::SeedableRng;
//! use rand::rngs::StdRng;
//! use riskforge::core::OptimizationMethod;
//! use riskforge::engine::RiskEngine;
//! use riskforge::optimizer::OptimizationConstraints;
//! use riskforge::portfolio::{Portfolio, Position};
//!
//! let portfolio = Portfolio::new(vec![
//!     Position::new("crude_oil", 1_000_000.0, 0.08, 0.35),
//!     Position::new("gold", 500_000.0, 0.05, 0.15),
//!     Position::new("copper", 300_000.0, 0.06, 0.22),
//!     Position::new("wheat", 200_000.0, 0.04, 0.18),
//! ]);
//!
//! let engine = RiskEngine::new();
//! let mut rng = StdRng::seed_from_u64(42);
//! let result = engine
//!     .optimize_portfolio(
//!         &portfolio,
//!         &OptimizationConstraints::default(),
//!         OptimizationMethod::QuantumAnnealing,
//!         &mut rng,
//!     )
//!     .unwrap();
//!
//! let total: f64 = result.optimal_weights.values().sum();
//! assert!((total - 1.0).abs() < 1.0e-9);
//! ```
//!
//! Run a stress batch:
//! ```rust
//! use riskforge::engine::RiskEngine;
//! use riskforge::portfolio::{Portfolio, Position};
//! use riskforge::risk::StressScenario;
//!
//! let portfolio = Portfolio::new(vec![
//!     Position::new("crude_oil", 1_000_000.0, 0.0003, 0.022),
//! ]);
//! let scenarios = vec![
//!     StressScenario::market_crash(&portfolio.commodities()),
//!     StressScenario::supply_shock(&portfolio.commodities()),
//! ];
//!
//! let engine = RiskEngine::new();
//! let report = engine.stress_test(&portfolio, &scenarios).unwrap();
//! assert_eq!(report.scenarios_tested, 2);
//! assert_eq!(report.aggregate_result.scenarios_with_losses, 1);
//! ```

pub mod core;
pub mod engine;
pub mod math;
pub mod optimizer;
pub mod portfolio;
pub mod risk;
pub mod store;

/// Common imports for ergonomic usage.
pub mod prelude {
    pub use crate::core::{OptimizationMethod, RiskError};
    pub use crate::engine::{RiskEngine, StressTestResult};
    pub use crate::optimizer::{OptimizationConstraints, OptimizationResult};
    pub use crate::portfolio::{Portfolio, Position};
    pub use crate::risk::{
        SimulationResult, StressScenario, TailRiskResult, expected_shortfall, simulate,
    };
    pub use crate::store::{ResultStore, StoredRecord, StoredResult};
}
