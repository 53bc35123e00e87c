//! Portfolio and position data model shared by the simulator, the stress
//! engine, and the optimizer.
//!
//! A [`Portfolio`] is constructed fresh per request from caller-supplied data
//! and is read-only for the duration of one calculation. The number of
//! positions fixes the dimensionality of every derived matrix and vector, and
//! all per-asset outputs stay positionally aligned to the input sequence.

use std::collections::BTreeMap;

use nalgebra::DMatrix;

/// Pairwise correlation assumed by the optimizer when a pair has no entry in
/// any position-level correlation map.
pub const BASELINE_PAIRWISE_CORRELATION: f64 = 0.1;

/// One portfolio constituent.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Position {
    /// Commodity identifier, unique within a portfolio.
    pub commodity: String,
    /// Signed monetary exposure.
    pub notional_value: f64,
    /// Per-period drift.
    pub expected_return: f64,
    /// Per-period return standard deviation, non-negative.
    pub volatility: f64,
    /// Optional correlations to other positions, keyed by the other
    /// position's index rendered as a string.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlation: Option<BTreeMap<String, f64>>,
}

impl Position {
    pub fn new(
        commodity: impl Into<String>,
        notional_value: f64,
        expected_return: f64,
        volatility: f64,
    ) -> Self {
        Self {
            commodity: commodity.into(),
            notional_value,
            expected_return,
            volatility,
            correlation: None,
        }
    }

    /// Attaches a position-level correlation map (index-string keyed).
    pub fn with_correlation(mut self, correlation: BTreeMap<String, f64>) -> Self {
        self.correlation = Some(correlation);
        self
    }
}

/// Ordered sequence of positions plus optional auxiliary market data and an
/// optional full correlation matrix.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Portfolio {
    pub positions: Vec<Position>,
    /// Informational market data, not used by the math.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub market_data: BTreeMap<String, f64>,
    /// Full correlation matrix as row-index-string -> column-index-string
    /// -> coefficient. Missing off-diagonal entries are treated as zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub correlations: Option<BTreeMap<String, BTreeMap<String, f64>>>,
}

impl Portfolio {
    pub fn new(positions: Vec<Position>) -> Self {
        Self {
            positions,
            market_data: BTreeMap::new(),
            correlations: None,
        }
    }

    /// Attaches a full correlation matrix.
    pub fn with_correlations(
        mut self,
        correlations: BTreeMap<String, BTreeMap<String, f64>>,
    ) -> Self {
        self.correlations = Some(correlations);
        self
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn commodities(&self) -> Vec<String> {
        self.positions.iter().map(|p| p.commodity.clone()).collect()
    }

    pub fn expected_returns(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.expected_return).collect()
    }

    pub fn volatilities(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.volatility).collect()
    }

    pub fn notionals(&self) -> Vec<f64> {
        self.positions.iter().map(|p| p.notional_value).collect()
    }

    /// Correlation matrix used by the Monte Carlo simulator.
    ///
    /// Resolution order: the explicit `correlations` matrix if supplied
    /// (unit diagonal forced, missing off-diagonal entries zero), otherwise
    /// the synthesized default of [`crate::math::default_correlation_matrix`].
    pub fn correlation_matrix(&self) -> DMatrix<f64> {
        let n = self.len();
        match &self.correlations {
            Some(entries) => {
                let mut corr = DMatrix::identity(n, n);
                for (row_key, row) in entries {
                    let Ok(i) = row_key.parse::<usize>() else {
                        continue;
                    };
                    for (col_key, &value) in row {
                        let Ok(j) = col_key.parse::<usize>() else {
                            continue;
                        };
                        if i < n && j < n && i != j {
                            corr[(i, j)] = value;
                            corr[(j, i)] = value;
                        }
                    }
                }
                corr
            }
            None => crate::math::default_correlation_matrix(n),
        }
    }

    /// Pairwise correlation used by the optimizer's objective build.
    ///
    /// Resolution order: explicit full matrix, then either position's
    /// index-keyed map, then the 0.1 baseline.
    pub fn pairwise_correlation(&self, i: usize, j: usize) -> f64 {
        if i == j {
            return 1.0;
        }
        if let Some(entries) = &self.correlations {
            if let Some(value) = entries
                .get(&i.to_string())
                .and_then(|row| row.get(&j.to_string()))
            {
                return *value;
            }
            if let Some(value) = entries
                .get(&j.to_string())
                .and_then(|row| row.get(&i.to_string()))
            {
                return *value;
            }
        }
        let from_position = |a: usize, b: usize| {
            self.positions
                .get(a)
                .and_then(|p| p.correlation.as_ref())
                .and_then(|map| map.get(&b.to_string()))
                .copied()
        };
        from_position(i, j)
            .or_else(|| from_position(j, i))
            .unwrap_or(BASELINE_PAIRWISE_CORRELATION)
    }
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    fn two_asset_portfolio() -> Portfolio {
        Portfolio::new(vec![
            Position::new("crude_oil", 1_000_000.0, 0.0003, 0.022),
            Position::new("natural_gas", 400_000.0, 0.0002, 0.035),
        ])
    }

    #[test]
    fn default_matrix_is_used_when_no_correlations_supplied() {
        let corr = two_asset_portfolio().correlation_matrix();
        assert_relative_eq!(corr[(0, 0)], 1.0, epsilon = 1.0e-12);
        assert_relative_eq!(corr[(0, 1)], 0.3, epsilon = 1.0e-12);
    }

    #[test]
    fn explicit_matrix_is_symmetrized_with_unit_diagonal() {
        let mut row = BTreeMap::new();
        row.insert("1".to_string(), 0.65);
        let mut entries = BTreeMap::new();
        entries.insert("0".to_string(), row);

        let portfolio = two_asset_portfolio().with_correlations(entries);
        let corr = portfolio.correlation_matrix();
        assert_relative_eq!(corr[(1, 0)], 0.65, epsilon = 1.0e-12);
        assert_relative_eq!(corr[(1, 1)], 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn pairwise_correlation_falls_back_to_baseline() {
        let portfolio = two_asset_portfolio();
        assert_relative_eq!(
            portfolio.pairwise_correlation(0, 1),
            BASELINE_PAIRWISE_CORRELATION,
            epsilon = 1.0e-12
        );
        assert_relative_eq!(portfolio.pairwise_correlation(1, 1), 1.0, epsilon = 1.0e-12);
    }

    #[test]
    fn position_level_map_overrides_baseline() {
        let mut map = BTreeMap::new();
        map.insert("1".to_string(), -0.4);
        let mut portfolio = two_asset_portfolio();
        portfolio.positions[0] = portfolio.positions[0].clone().with_correlation(map);

        assert_relative_eq!(portfolio.pairwise_correlation(0, 1), -0.4, epsilon = 1.0e-12);
        assert_relative_eq!(portfolio.pairwise_correlation(1, 0), -0.4, epsilon = 1.0e-12);
    }
}
