//! Core error and shared enum types used across the engine.

use std::fmt;

/// Errors surfaced by the public engine API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RiskError {
    /// Input validation error, raised before any computation starts.
    InvalidInput(String),
    /// An optimization method name outside the supported set.
    UnsupportedMethod(String),
    /// Unexpected failure during computation, caught at the call boundary.
    ComputationFailure(String),
}

impl fmt::Display for RiskError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidInput(msg) => write!(f, "invalid input: {msg}"),
            Self::UnsupportedMethod(msg) => write!(f, "unsupported method: {msg}"),
            Self::ComputationFailure(msg) => write!(f, "computation failure: {msg}"),
        }
    }
}

impl std::error::Error for RiskError {}

/// Weight-search strategy over the quadratic risk/return objective.
///
/// All three are classical metaheuristics; the `quantum_` names are kept for
/// wire compatibility with callers that select methods by string.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationMethod {
    /// Temperature-annealed Metropolis search.
    QuantumAnnealing,
    /// Tournament-selection genetic search on Sharpe-minus-penalty fitness.
    QuantumGenetic,
    /// Annealing followed by gradient refinement.
    HybridQuantum,
}

impl OptimizationMethod {
    /// Every supported method, in the order `compare_methods` runs them.
    pub const ALL: [Self; 3] = [Self::QuantumAnnealing, Self::QuantumGenetic, Self::HybridQuantum];

    /// Wire name of the method.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuantumAnnealing => "quantum_annealing",
            Self::QuantumGenetic => "quantum_genetic",
            Self::HybridQuantum => "hybrid_quantum",
        }
    }

    /// Parses a wire name, rejecting anything outside the supported set.
    pub fn parse(name: &str) -> Result<Self, RiskError> {
        match name {
            "quantum_annealing" => Ok(Self::QuantumAnnealing),
            "quantum_genetic" => Ok(Self::QuantumGenetic),
            "hybrid_quantum" => Ok(Self::HybridQuantum),
            other => Err(RiskError::UnsupportedMethod(format!(
                "unknown optimization method `{other}`"
            ))),
        }
    }
}

impl fmt::Display for OptimizationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
