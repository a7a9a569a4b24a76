//! A CDCL Boolean satisfiability solver with a small set of constraint
//! encoding helpers built on top of it.

pub mod cnf;
pub mod dimacs;
pub mod encoding;
pub mod error;
pub mod solver;

pub use cnf::{Lit, Var};
pub use error::SolverError;
pub use solver::{Solution, Solver};
