//! Assumption-literal handling for incremental-style queries (§4.9/§4.10).

use crate::cnf::{Lit, Reason};
use crate::solver::Solver;

impl Solver {
    /// Asserts the assumption literals one decision level at a time,
    /// propagating after each. Returns `false` if an assumption contradicts
    /// the current state or unit propagation (the unsat core is recorded in
    /// `conflict_lits`).
    pub(crate) fn assert_assumptions(&mut self) -> bool {
        for i in 0..self.assumptions.len() {
            let lit = self.assumptions[i];
            match self.value(lit) {
                crate::cnf::Lbool::TRUE => continue,
                crate::cnf::Lbool::FALSE => {
                    self.conflict_lits = vec![lit];
                    return false;
                }
                _ => {
                    self.new_decision_level();
                    self.unchecked_enqueue(lit, Reason::None);
                }
            }
            if let Some(conflict) = self.propagate() {
                self.extract_conflict_core(conflict);
                return false;
            }
        }
        true
    }

    pub fn set_assumptions(&mut self, assumptions: Vec<Lit>) {
        self.assumptions = assumptions;
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::Solver;

    #[test]
    fn contradictory_assumption_is_rejected() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        s.add_clause(vec![a]);
        s.set_assumptions(vec![!a]);
        assert!(!s.assert_assumptions());
        assert_eq!(s.conflict_literals(), &[!a]);
    }

    #[test]
    fn consistent_assumptions_are_accepted() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        s.add_clause(vec![a, b]);
        s.set_assumptions(vec![!a]);
        assert!(s.assert_assumptions());
        assert!(s.value(b).is_true());
    }
}
