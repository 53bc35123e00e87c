//! Deterministic stress/scenario engine over the shared position model.
//!
//! Scenarios apply multiplicative price shocks per commodity:
//! `impact = notional_value * (multiplier - 1.0)`. Commodities absent from a
//! scenario's shock map keep multiplier 1.0 and contribute no impact. No
//! randomness is involved; results are exactly reproducible.

use std::collections::BTreeMap;

use crate::math::{mean, population_std};
use crate::portfolio::Portfolio;

/// Multiplier applied to every commodity by the canonical market crash.
const MARKET_CRASH_MULTIPLIER: f64 = 0.75;
/// Multiplier applied to every commodity by the canonical supply shock.
const SUPPLY_SHOCK_MULTIPLIER: f64 = 1.30;

/// Named scenario definition: commodity -> price multiplier.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StressScenario {
    pub name: String,
    pub market_shocks: BTreeMap<String, f64>,
}

impl StressScenario {
    pub fn new(name: impl Into<String>, market_shocks: BTreeMap<String, f64>) -> Self {
        Self {
            name: name.into(),
            market_shocks,
        }
    }

    /// Canonical broad negative shock across every given commodity.
    pub fn market_crash(commodities: &[String]) -> Self {
        Self::uniform("market crash", commodities, MARKET_CRASH_MULTIPLIER)
    }

    /// Canonical broad positive shock across every given commodity.
    pub fn supply_shock(commodities: &[String]) -> Self {
        Self::uniform("supply shock", commodities, SUPPLY_SHOCK_MULTIPLIER)
    }

    fn uniform(name: &str, commodities: &[String], multiplier: f64) -> Self {
        let market_shocks = commodities
            .iter()
            .map(|c| (c.clone(), multiplier))
            .collect();
        Self::new(name, market_shocks)
    }
}

/// Per-position impact row, positionally aligned to the portfolio.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct PositionImpact {
    pub commodity: String,
    pub shock_multiplier: f64,
    pub impact: f64,
}

/// One evaluated scenario.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ScenarioResult {
    pub scenario_name: String,
    pub total_impact: f64,
    pub position_impacts: Vec<PositionImpact>,
}

/// Aggregate over a batch of scenario results.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct StressAggregate {
    pub worst_case_impact: f64,
    pub best_case_impact: f64,
    pub average_impact: f64,
    pub impact_volatility: f64,
    pub scenarios_with_losses: usize,
}

/// Applies one scenario to the portfolio.
pub fn apply_scenario(portfolio: &Portfolio, scenario: &StressScenario) -> ScenarioResult {
    let position_impacts: Vec<PositionImpact> = portfolio
        .positions
        .iter()
        .map(|position| {
            let multiplier = scenario
                .market_shocks
                .get(&position.commodity)
                .copied()
                .unwrap_or(1.0);
            PositionImpact {
                commodity: position.commodity.clone(),
                shock_multiplier: multiplier,
                impact: position.notional_value * (multiplier - 1.0),
            }
        })
        .collect();

    let total_impact = position_impacts.iter().map(|p| p.impact).sum();
    ScenarioResult {
        scenario_name: scenario.name.clone(),
        total_impact,
        position_impacts,
    }
}

/// Aggregates total impacts across scenarios; zeroed for an empty batch.
pub fn aggregate(results: &[ScenarioResult]) -> StressAggregate {
    let impacts: Vec<f64> = results.iter().map(|r| r.total_impact).collect();
    if impacts.is_empty() {
        return StressAggregate {
            worst_case_impact: 0.0,
            best_case_impact: 0.0,
            average_impact: 0.0,
            impact_volatility: 0.0,
            scenarios_with_losses: 0,
        };
    }

    StressAggregate {
        worst_case_impact: impacts.iter().copied().fold(f64::INFINITY, f64::min),
        best_case_impact: impacts.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        average_impact: mean(&impacts),
        impact_volatility: population_std(&impacts),
        scenarios_with_losses: impacts.iter().filter(|&&x| x < 0.0).count(),
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::portfolio::Position;

    fn portfolio() -> Portfolio {
        Portfolio::new(vec![
            Position::new("crude_oil", 1_000.0, 0.0, 0.02),
            Position::new("gold", 500.0, 0.0, 0.01),
        ])
    }

    #[test]
    fn missing_commodities_default_to_no_impact() {
        let mut shocks = BTreeMap::new();
        shocks.insert("crude_oil".to_string(), 0.9);
        let result = apply_scenario(&portfolio(), &StressScenario::new("oil dip", shocks));

        assert_relative_eq!(result.total_impact, -100.0, epsilon = 1.0e-12);
        assert_relative_eq!(result.position_impacts[1].impact, 0.0, epsilon = 1.0e-12);
        assert_relative_eq!(
            result.position_impacts[1].shock_multiplier,
            1.0,
            epsilon = 1.0e-12
        );
    }

    #[test]
    fn canonical_scenarios_cover_every_commodity() {
        let p = portfolio();
        let crash = StressScenario::market_crash(&p.commodities());
        let result = apply_scenario(&p, &crash);

        assert_eq!(result.scenario_name, "market crash");
        // 1500 total notional * (0.75 - 1.0)
        assert_relative_eq!(result.total_impact, -375.0, epsilon = 1.0e-12);

        let shock = StressScenario::supply_shock(&p.commodities());
        assert!(apply_scenario(&p, &shock).total_impact > 0.0);
    }

    #[test]
    fn aggregate_matches_reference_case() {
        let results = vec![
            ScenarioResult {
                scenario_name: "down".to_string(),
                total_impact: -500.0,
                position_impacts: vec![],
            },
            ScenarioResult {
                scenario_name: "up".to_string(),
                total_impact: 300.0,
                position_impacts: vec![],
            },
        ];

        let agg = aggregate(&results);
        assert_relative_eq!(agg.worst_case_impact, -500.0, epsilon = 1.0e-12);
        assert_relative_eq!(agg.best_case_impact, 300.0, epsilon = 1.0e-12);
        assert_relative_eq!(agg.average_impact, -100.0, epsilon = 1.0e-12);
        assert_eq!(agg.scenarios_with_losses, 1);
        assert_relative_eq!(agg.impact_volatility, 400.0, epsilon = 1.0e-12);
    }

    #[test]
    fn empty_batch_aggregates_to_zero() {
        let agg = aggregate(&[]);
        assert_eq!(agg.scenarios_with_losses, 0);
        assert_eq!(agg.worst_case_impact, 0.0);
        assert_eq!(agg.best_case_impact, 0.0);
    }
}
