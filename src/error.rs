//! Typed errors for configuration, DIMACS I/O and the encoding helpers.
//!
//! Construction-time contradictions detected inside the search itself are
//! not errors: the solver flips to a permanent-unsat state and subsequent
//! `solve` calls return `Solution::Unsat` without doing work. Only failures
//! that prevent a solver or encoding from being built at all are reported
//! through these types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SolverError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Dimacs(#[from] DimacsError),

    #[error(transparent)]
    Encoding(#[from] EncodingError),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown solver type {0:?}")]
    UnknownType(String),

    #[error("malformed config value for key {key:?}: {reason}")]
    MalformedValue { key: String, reason: String },

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum DimacsError {
    #[error("malformed DIMACS header: {0}")]
    MalformedHeader(String),

    #[error("clause count mismatch: header declared {declared}, found {found}")]
    ClauseCountMismatch { declared: usize, found: usize },

    #[error("variable {var} exceeds declared variable count {declared}")]
    VariableOutOfRange { var: usize, declared: usize },

    #[error("malformed clause line: {0}")]
    MalformedClause(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum EncodingError {
    #[error("{gate} gate requires at least one input")]
    EmptyGateInput { gate: &'static str },

    #[error("bit-vector comparison requires equal widths, got {lhs} and {rhs}")]
    MismatchedWidth { lhs: usize, rhs: usize },

    #[error("at-most-k encoding requires k <= number of literals ({k} > {n})")]
    KOutOfRange { k: usize, n: usize },
}
