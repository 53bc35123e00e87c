//! Risk measurement: Monte Carlo VaR/Expected Shortfall and deterministic
//! stress scenarios.

pub mod stress;
pub mod var;

pub use stress::{
    PositionImpact, ScenarioResult, StressAggregate, StressScenario, aggregate, apply_scenario,
};
pub use var::{
    ES_SIMULATIONS, MonteCarloRun, RiskBreakdownEntry, SimulationResult, TailRiskResult,
    expected_shortfall, risk_breakdown, simulate, value_at_risk,
};
