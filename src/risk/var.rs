//! Monte Carlo Value-at-Risk and Expected-Shortfall estimation over a
//! commodity portfolio.
//!
//! P&L is signed: losses are negative, so VaR at confidence `c` is the
//! `(1 - c) * 100` percentile of simulated total changes and is naturally
//! negative for a losing tail. Callers must not silently negate it.
//!
//! Numerical notes: all accumulation is plain double precision; no currency
//! rounding happens here. The per-asset breakdown takes the same percentile
//! per asset column, so contributions are non-additive by construction.
//!
//! References:
//! - Glasserman (2004) for Monte Carlo estimators.
//! - McNeil, Frey, Embrechts, *Quantitative Risk Management* (2005/2015).

use rand::Rng;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::math::{SummaryStatistics, correlated_returns, percentile};
use crate::portfolio::Portfolio;

/// Fixed trial count for the Expected-Shortfall rerun.
pub const ES_SIMULATIONS: usize = 10_000;

/// Raw output of one Monte Carlo run, before any result identity is minted.
#[derive(Debug, Clone)]
pub struct MonteCarloRun {
    /// `n_simulations x n_assets` simulated returns.
    pub returns: Vec<Vec<f64>>,
    /// `n_simulations x n_assets` monetary changes (`return * notional`).
    pub position_changes: Vec<Vec<f64>>,
    /// Total portfolio change per trial.
    pub total_changes: Vec<f64>,
    /// Summary over `total_changes`.
    pub summary: SummaryStatistics,
    /// True when the correlation matrix failed to factorize and the draws
    /// were independent.
    pub independent_fallback: bool,
}

/// Per-position VaR contribution, positionally aligned to the input order.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct RiskBreakdownEntry {
    pub commodity: String,
    pub var_contribution: f64,
    /// `var_contribution / total_var`, zero when `total_var == 0`.
    pub risk_share: f64,
}

/// Full simulation result as registered in the result store.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SimulationResult {
    /// `VAR-` prefixed, zero-padded identifier minted on registration.
    pub result_id: String,
    pub var_value: f64,
    pub confidence_level: f64,
    pub time_horizon: f64,
    pub num_simulations: usize,
    pub risk_breakdown: Vec<RiskBreakdownEntry>,
    pub simulation_summary: SummaryStatistics,
    /// Reduced-fidelity flag from the correlated return generator.
    pub independent_fallback: bool,
}

/// Expected-Shortfall payload.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TailRiskResult {
    pub var_value: f64,
    pub expected_shortfall: f64,
    /// `expected_shortfall - var_value`, reported so downstream consumers
    /// can sanity-check the pair.
    pub tail_risk_measure: f64,
}

/// Runs one Monte Carlo simulation over the portfolio.
///
/// `horizon` is in periods (days for the engine API); `n_simulations`
/// independent trials are drawn from `rng`. Pure apart from consuming
/// entropy; nothing is registered here.
pub fn simulate<R: Rng>(
    portfolio: &Portfolio,
    horizon: f64,
    n_simulations: usize,
    rng: &mut R,
) -> MonteCarloRun {
    let corr = portfolio.correlation_matrix();
    let batch = correlated_returns(
        &portfolio.expected_returns(),
        &portfolio.volatilities(),
        &corr,
        horizon,
        n_simulations,
        rng,
    );

    let notionals = portfolio.notionals();
    let (position_changes, total_changes) = changes_from_returns(&batch.returns, &notionals);
    let summary = SummaryStatistics::from_sample(&total_changes);

    MonteCarloRun {
        returns: batch.returns,
        position_changes,
        total_changes,
        summary,
        independent_fallback: batch.independent_fallback,
    }
}

#[cfg(not(feature = "parallel"))]
fn changes_from_returns(returns: &[Vec<f64>], notionals: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let position_changes: Vec<Vec<f64>> = returns
        .iter()
        .map(|row| trial_changes(row, notionals))
        .collect();
    let total_changes = position_changes.iter().map(|row| row.iter().sum()).collect();
    (position_changes, total_changes)
}

#[cfg(feature = "parallel")]
fn changes_from_returns(returns: &[Vec<f64>], notionals: &[f64]) -> (Vec<Vec<f64>>, Vec<f64>) {
    let position_changes: Vec<Vec<f64>> = returns
        .par_iter()
        .map(|row| trial_changes(row, notionals))
        .collect();
    let total_changes = position_changes
        .par_iter()
        .map(|row| row.iter().sum())
        .collect();
    (position_changes, total_changes)
}

#[inline]
fn trial_changes(returns_row: &[f64], notionals: &[f64]) -> Vec<f64> {
    returns_row
        .iter()
        .zip(notionals.iter())
        .map(|(r, notional)| r * notional)
        .collect()
}

/// Signed VaR: the `(1 - confidence) * 100` percentile of total changes.
pub fn value_at_risk(run: &MonteCarloRun, confidence: f64) -> f64 {
    percentile(&run.total_changes, (1.0 - confidence) * 100.0)
}

/// Per-position VaR contributions at the same tail percentile.
///
/// Shares are zero-guarded when total VaR is exactly zero. Contributions do
/// not sum to total VaR; percentile aggregation is non-additive.
pub fn risk_breakdown(
    portfolio: &Portfolio,
    run: &MonteCarloRun,
    confidence: f64,
) -> Vec<RiskBreakdownEntry> {
    let total_var = value_at_risk(run, confidence);
    let tail_pct = (1.0 - confidence) * 100.0;

    portfolio
        .positions
        .iter()
        .enumerate()
        .map(|(i, position)| {
            let column: Vec<f64> = run.position_changes.iter().map(|row| row[i]).collect();
            let var_contribution = percentile(&column, tail_pct);
            let risk_share = if total_var == 0.0 {
                0.0
            } else {
                var_contribution / total_var
            };
            RiskBreakdownEntry {
                commodity: position.commodity.clone(),
                var_contribution,
                risk_share,
            }
        })
        .collect()
}

/// Expected Shortfall via a fixed oversampled rerun.
///
/// This reruns the VaR Monte Carlo at [`ES_SIMULATIONS`] trials and reports
/// the 5th-percentile summary bucket as the tail mean. That is an
/// approximation, not a true conditional average over tail draws, so
/// `expected_shortfall >= |var_value|` does not hold by definition;
/// `tail_risk_measure` is reported alongside for sanity checks.
pub fn expected_shortfall<R: Rng>(
    portfolio: &Portfolio,
    confidence: f64,
    horizon: f64,
    rng: &mut R,
) -> TailRiskResult {
    let run = simulate(portfolio, horizon, ES_SIMULATIONS, rng);
    let var_value = value_at_risk(&run, confidence);
    let es = run.summary.percentile_5;

    TailRiskResult {
        var_value,
        expected_shortfall: es,
        tail_risk_measure: es - var_value,
    }
}
