//! Numerical building blocks: summary statistics and correlated-draw
//! generation.

pub mod correlation;
pub mod stats;

pub use correlation::{
    CorrelatedReturns, cholesky_lower, correlated_returns, default_correlation_matrix,
};
pub use stats::{SummaryStatistics, mean, percentile, population_std};
