//! Engine façade: the call contracts a surrounding HTTP or report layer
//! depends on.
//!
//! Every operation validates its inputs before any computation starts and
//! registers its result in the bounded [`ResultStore`] only after the
//! computation has fully finished, so a failure can never leave a
//! half-written registry entry. The engine holds no other mutable state;
//! independent calls are freely parallelizable across callers.

use std::collections::BTreeMap;

use rand::Rng;

use crate::core::{OptimizationMethod, RiskError};
use crate::optimizer::{self, OptimizationConstraints, OptimizationResult};
use crate::portfolio::Portfolio;
use crate::risk::{
    self, ScenarioResult, SimulationResult, StressAggregate, StressScenario, TailRiskResult,
};
use crate::store::{ResultStore, StoredRecord, StoredResult};

/// Inclusive confidence-level contract range.
pub const CONFIDENCE_RANGE: (f64, f64) = (0.90, 0.99);
/// Inclusive time-horizon contract range, in days.
pub const HORIZON_RANGE: (f64, f64) = (1.0, 252.0);
/// Inclusive simulation-count contract range.
pub const SIMULATION_RANGE: (usize, usize) = (1_000, 100_000);

/// Stress-test batch output.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StressTestResult {
    pub scenarios_tested: usize,
    pub aggregate_result: StressAggregate,
    pub scenario_results: Vec<ScenarioResult>,
}

/// Risk simulation and optimization façade over one result registry.
pub struct RiskEngine {
    store: ResultStore,
}

impl Default for RiskEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl RiskEngine {
    pub fn new() -> Self {
        Self {
            store: ResultStore::new(),
        }
    }

    /// Builds an engine over a caller-configured registry (capacity, clock).
    pub fn with_store(store: ResultStore) -> Self {
        Self { store }
    }

    /// Read access to the registry, e.g. for retrieval by identifier.
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Retrieves a previously registered result by identifier.
    pub fn result(&self, id: &str) -> Option<StoredRecord> {
        self.store.get(id)
    }

    /// Monte Carlo VaR at `confidence_level` over `time_horizon` days.
    ///
    /// The returned `var_value` is signed: a losing tail yields a negative
    /// number. The result is registered under its `VAR-` identifier.
    pub fn simulate_var<R: Rng>(
        &self,
        portfolio: &Portfolio,
        confidence_level: f64,
        time_horizon: f64,
        num_simulations: usize,
        rng: &mut R,
    ) -> Result<SimulationResult, RiskError> {
        validate_portfolio(portfolio)?;
        validate_confidence(confidence_level)?;
        validate_horizon(time_horizon)?;
        validate_simulations(num_simulations)?;

        let run = risk::simulate(portfolio, time_horizon, num_simulations, rng);
        let var_value = risk::value_at_risk(&run, confidence_level);
        if !var_value.is_finite() {
            return Err(RiskError::ComputationFailure(
                "simulated VaR is not finite".to_string(),
            ));
        }
        let risk_breakdown = risk::risk_breakdown(portfolio, &run, confidence_level);

        let mut result = SimulationResult {
            result_id: String::new(),
            var_value,
            confidence_level,
            time_horizon,
            num_simulations,
            risk_breakdown,
            simulation_summary: run.summary,
            independent_fallback: run.independent_fallback,
        };
        result.result_id = self.store.next_simulation_id();
        self.store.insert(
            result.result_id.clone(),
            StoredResult::Simulation(result.clone()),
        );
        Ok(result)
    }

    /// Expected Shortfall companion to [`Self::simulate_var`].
    ///
    /// Runs the documented fixed-size oversampled approximation; see
    /// [`risk::expected_shortfall`] for its semantics.
    pub fn expected_shortfall<R: Rng>(
        &self,
        portfolio: &Portfolio,
        confidence_level: f64,
        time_horizon: f64,
        rng: &mut R,
    ) -> Result<TailRiskResult, RiskError> {
        validate_portfolio(portfolio)?;
        validate_confidence(confidence_level)?;
        validate_horizon(time_horizon)?;

        Ok(risk::expected_shortfall(
            portfolio,
            confidence_level,
            time_horizon,
            rng,
        ))
    }

    /// Applies every scenario and aggregates the impacts.
    pub fn stress_test(
        &self,
        portfolio: &Portfolio,
        scenarios: &[StressScenario],
    ) -> Result<StressTestResult, RiskError> {
        validate_portfolio(portfolio)?;

        let scenario_results: Vec<ScenarioResult> = scenarios
            .iter()
            .map(|scenario| risk::apply_scenario(portfolio, scenario))
            .collect();
        let aggregate_result = risk::aggregate(&scenario_results);

        Ok(StressTestResult {
            scenarios_tested: scenario_results.len(),
            aggregate_result,
            scenario_results,
        })
    }

    /// Searches for risk-adjusted-optimal weights with one method.
    ///
    /// The result is registered under its `QOPT-` identifier.
    pub fn optimize_portfolio<R: Rng>(
        &self,
        portfolio: &Portfolio,
        constraints: &OptimizationConstraints,
        method: OptimizationMethod,
        rng: &mut R,
    ) -> Result<OptimizationResult, RiskError> {
        validate_portfolio(portfolio)?;
        validate_constraints(constraints)?;

        let mut result = optimizer::run_method(portfolio, constraints, method, rng);
        if result.optimal_weights.values().any(|w| !w.is_finite()) {
            return Err(RiskError::ComputationFailure(format!(
                "{method} produced non-finite weights"
            )));
        }

        result.result_id = self.store.next_optimization_id();
        self.store.insert(
            result.result_id.clone(),
            StoredResult::Optimization(result.clone()),
        );
        Ok(result)
    }

    /// Runs all supported methods; one method's failure never aborts the
    /// others. Keys are the methods' wire names.
    pub fn compare_methods<R: Rng>(
        &self,
        portfolio: &Portfolio,
        constraints: &OptimizationConstraints,
        rng: &mut R,
    ) -> BTreeMap<String, Result<OptimizationResult, RiskError>> {
        OptimizationMethod::ALL
            .into_iter()
            .map(|method| {
                let outcome = self.optimize_portfolio(portfolio, constraints, method, rng);
                (method.as_str().to_string(), outcome)
            })
            .collect()
    }
}

fn validate_portfolio(portfolio: &Portfolio) -> Result<(), RiskError> {
    if portfolio.is_empty() {
        return Err(RiskError::InvalidInput(
            "portfolio must contain at least one position".to_string(),
        ));
    }
    for (i, position) in portfolio.positions.iter().enumerate() {
        if position.commodity.is_empty() {
            return Err(RiskError::InvalidInput(format!(
                "position {i}: commodity must not be empty"
            )));
        }
        if !position.notional_value.is_finite() {
            return Err(RiskError::InvalidInput(format!(
                "position {i} ({}): notional_value must be finite",
                position.commodity
            )));
        }
        if !position.expected_return.is_finite() {
            return Err(RiskError::InvalidInput(format!(
                "position {i} ({}): expected_return must be finite",
                position.commodity
            )));
        }
        if !position.volatility.is_finite() || position.volatility < 0.0 {
            return Err(RiskError::InvalidInput(format!(
                "position {i} ({}): volatility must be finite and >= 0",
                position.commodity
            )));
        }
    }
    Ok(())
}

fn validate_confidence(confidence_level: f64) -> Result<(), RiskError> {
    let (lo, hi) = CONFIDENCE_RANGE;
    if !confidence_level.is_finite() || confidence_level < lo || confidence_level > hi {
        return Err(RiskError::InvalidInput(format!(
            "confidence_level {confidence_level} outside [{lo}, {hi}]"
        )));
    }
    Ok(())
}

fn validate_horizon(time_horizon: f64) -> Result<(), RiskError> {
    let (lo, hi) = HORIZON_RANGE;
    if !time_horizon.is_finite() || time_horizon < lo || time_horizon > hi {
        return Err(RiskError::InvalidInput(format!(
            "time_horizon {time_horizon} outside [{lo}, {hi}] days"
        )));
    }
    Ok(())
}

fn validate_simulations(num_simulations: usize) -> Result<(), RiskError> {
    let (lo, hi) = SIMULATION_RANGE;
    if num_simulations < lo || num_simulations > hi {
        return Err(RiskError::InvalidInput(format!(
            "num_simulations {num_simulations} outside [{lo}, {hi}]"
        )));
    }
    Ok(())
}

fn validate_constraints(constraints: &OptimizationConstraints) -> Result<(), RiskError> {
    if !constraints.risk_aversion.is_finite() || constraints.risk_aversion < 0.0 {
        return Err(RiskError::InvalidInput(
            "risk_aversion must be finite and >= 0".to_string(),
        ));
    }
    if !constraints.min_weight.is_finite()
        || !constraints.max_weight.is_finite()
        || constraints.min_weight < 0.0
        || constraints.max_weight <= 0.0
        || constraints.min_weight > constraints.max_weight
    {
        return Err(RiskError::InvalidInput(format!(
            "weight bounds [{}, {}] are not a valid range",
            constraints.min_weight, constraints.max_weight
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::portfolio::Position;

    fn portfolio() -> Portfolio {
        Portfolio::new(vec![
            Position::new("crude_oil", 1_000_000.0, 0.0003, 0.022),
            Position::new("gold", 500_000.0, 0.0002, 0.011),
        ])
    }

    #[test]
    fn out_of_range_inputs_fail_fast_without_registration() {
        let engine = RiskEngine::new();
        let mut rng = StdRng::seed_from_u64(1);

        let err = engine
            .simulate_var(&portfolio(), 0.80, 10.0, 5_000, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));

        let err = engine
            .simulate_var(&portfolio(), 0.95, 500.0, 5_000, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));

        let err = engine
            .simulate_var(&portfolio(), 0.95, 10.0, 10, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));

        assert!(engine.store().is_empty());
    }

    #[test]
    fn empty_portfolio_is_rejected() {
        let engine = RiskEngine::new();
        let mut rng = StdRng::seed_from_u64(1);
        let empty = Portfolio::new(Vec::new());

        let err = engine
            .simulate_var(&empty, 0.95, 10.0, 5_000, &mut rng)
            .unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));
    }

    #[test]
    fn successful_simulation_is_registered_and_retrievable() {
        let engine = RiskEngine::new();
        let mut rng = StdRng::seed_from_u64(42);

        let result = engine
            .simulate_var(&portfolio(), 0.95, 10.0, 2_000, &mut rng)
            .unwrap();
        assert_eq!(result.result_id, "VAR-000001");

        let record = engine.result("VAR-000001").unwrap();
        match record.result {
            StoredResult::Simulation(stored) => assert_eq!(stored, result),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn optimization_is_registered_under_qopt_ids() {
        let engine = RiskEngine::new();
        let mut rng = StdRng::seed_from_u64(42);

        let result = engine
            .optimize_portfolio(
                &portfolio(),
                &OptimizationConstraints {
                    max_weight: 0.8,
                    ..OptimizationConstraints::default()
                },
                OptimizationMethod::QuantumAnnealing,
                &mut rng,
            )
            .unwrap();
        assert_eq!(result.result_id, "QOPT-000001");
        assert!(engine.result("QOPT-000001").is_some());
    }

    #[test]
    fn invalid_constraints_are_rejected() {
        let engine = RiskEngine::new();
        let mut rng = StdRng::seed_from_u64(3);
        let constraints = OptimizationConstraints {
            min_weight: 0.5,
            max_weight: 0.3,
            ..OptimizationConstraints::default()
        };

        let err = engine
            .optimize_portfolio(
                &portfolio(),
                &constraints,
                OptimizationMethod::QuantumGenetic,
                &mut rng,
            )
            .unwrap_err();
        assert!(matches!(err, RiskError::InvalidInput(_)));
    }

    #[test]
    fn compare_methods_isolates_per_method_outcomes() {
        let engine = RiskEngine::new();
        let mut rng = StdRng::seed_from_u64(42);
        let constraints = OptimizationConstraints {
            max_weight: 0.8,
            ..OptimizationConstraints::default()
        };

        let outcomes = engine.compare_methods(&portfolio(), &constraints, &mut rng);
        assert_eq!(outcomes.len(), 3);
        for method in OptimizationMethod::ALL {
            assert!(outcomes[method.as_str()].is_ok());
        }
    }
}
