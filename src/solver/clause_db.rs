//! Clause allocation and lifecycle: `add_clause`, `add_learnt_clause`,
//! `reduce_cnf` (level-0 simplification) and `reduce_learnt` (the
//! learnt-clause database reduction).
//!
//! Grounded on the teacher's `clause_database.rs` for the overall lifecycle
//! shape (locked-clause protection, glue-clause protection) and on
//! `ratsat/core.rs::add_clause`/`simplify` for the exact dedup/tautology/
//! unit-size handling in §4.5.

use crate::cnf::{Clause, ClauseRef, Lit, Reason};
use crate::solver::Solver;

impl Solver {
    fn alloc_clause(&mut self, clause: Clause) -> ClauseRef {
        if let Some(id) = self.free_clause_ids.pop() {
            self.clauses[id as usize] = Some(clause);
            ClauseRef(id)
        } else {
            let id = self.clauses.len() as u32;
            self.clauses.push(Some(clause));
            ClauseRef(id)
        }
    }

    pub(crate) fn free_clause(&mut self, cref: ClauseRef) {
        self.detach_clause(cref);
        self.clauses[cref.0 as usize] = None;
        self.free_clause_ids.push(cref.0);
    }

    pub(crate) fn clause(&self, cref: ClauseRef) -> &Clause {
        self.clauses[cref.0 as usize].as_ref().unwrap()
    }

    /// Adds a permanent clause at decision level 0. Deduplicates literals,
    /// drops the clause entirely if it is a tautology or already satisfied,
    /// and handles unit/binary clauses specially per the size-based rules
    /// in §4.5. Returns `false` if this made the solver permanently unsat.
    pub fn add_clause(&mut self, lits: Vec<Lit>) -> bool {
        debug_assert_eq!(
            self.decision_level(),
            0,
            "add_clause is only valid at decision level 0"
        );
        if !self.ok {
            return false;
        }

        let mut lits = lits;
        lits.sort_unstable();
        lits.dedup();

        // Tautology check: l and !l both present (adjacent after sort since
        // l and !l differ only in their low bit and sort next to each other
        // only when l is the even member; compare pairwise instead).
        for w in 0..lits.len() {
            for k in (w + 1)..lits.len() {
                if lits[w] == !lits[k] {
                    return true; // tautology, trivially satisfied, drop it
                }
            }
        }

        lits.retain(|&l| !self.value(l).is_false());
        if lits.iter().any(|&l| self.value(l).is_true()) {
            return true;
        }

        if let Some(log) = &mut self.oplog {
            log.log_add_clause(&lits);
        }

        match lits.len() {
            0 => {
                self.ok = false;
                false
            }
            1 => {
                self.units.push(lits[0]);
                if !self.check_and_assign(lits[0]) {
                    self.ok = false;
                    return false;
                }
                if self.propagate().is_some() {
                    self.ok = false;
                    return false;
                }
                true
            }
            2 => {
                self.binaries.push((lits[0], lits[1]));
                self.attach_binary(lits[0], lits[1]);
                self.stats.num_clauses += 1;
                true
            }
            _ => {
                let cref = self.alloc_clause(Clause::new(lits, false));
                self.attach_clause(cref);
                self.constraint_refs.push(cref);
                self.stats.num_clauses += 1;
                true
            }
        }
    }

    pub fn add_clause2(&mut self, a: Lit, b: Lit) -> bool {
        self.add_clause(vec![a, b])
    }

    pub fn add_clause3(&mut self, a: Lit, b: Lit, c: Lit) -> bool {
        self.add_clause(vec![a, b, c])
    }

    /// Adds a clause derived by conflict analysis. `lits[0]` is the
    /// asserting literal (about to become true) and `lits[1]`, if present,
    /// has the highest decision level among the remaining literals. `lbd`
    /// must have been computed by the caller *before* backtracking, since
    /// it depends on the decision levels at conflict time.
    pub(crate) fn add_learnt_clause(&mut self, lits: Vec<Lit>, lbd: u32) {
        debug_assert!(!lits.is_empty());
        match lits.len() {
            1 => {
                self.unchecked_enqueue(lits[0], Reason::None);
            }
            2 => {
                self.binaries.push((lits[0], lits[1]));
                self.attach_binary(lits[0], lits[1]);
                self.unchecked_enqueue(lits[0], Reason::Binary(lits[1]));
            }
            _ => {
                let mut clause = Clause::new(lits, true);
                clause.lbd = lbd;
                let cref = self.alloc_clause(clause);
                self.attach_clause(cref);
                self.learnt_refs.push(cref);
                let asserting = self.clause(cref).lits[0];
                self.unchecked_enqueue(asserting, Reason::Clause(cref));
                self.bump_clause_activity(cref);
            }
        }
        self.stats.num_learnts += 1;
    }

    pub(crate) fn compute_lbd(&self, lits: &[Lit]) -> u32 {
        let mut levels: Vec<i32> = lits
            .iter()
            .map(|&l| self.level[l.var().idx()])
            .collect();
        levels.sort_unstable();
        levels.dedup();
        levels.len() as u32
    }

    /// Valid only at decision level 0: propagates, then removes satisfied
    /// clauses from both the constraint and learnt lists.
    pub(crate) fn reduce_cnf(&mut self) {
        debug_assert_eq!(self.decision_level(), 0);
        if !self.ok {
            return;
        }
        if self.propagate().is_some() {
            self.ok = false;
            return;
        }

        for refs in [
            std::mem::take(&mut self.constraint_refs),
            std::mem::take(&mut self.learnt_refs),
        ] {
            let is_learnt = refs
                .first()
                .map(|r| self.clause(*r).learnt)
                .unwrap_or(false);
            let mut survivors = Vec::with_capacity(refs.len());
            for cref in refs {
                let satisfied = self
                    .clause(cref)
                    .lits
                    .iter()
                    .any(|&l| self.value(l).is_true());
                if satisfied {
                    self.free_clause(cref);
                } else {
                    survivors.push(cref);
                }
            }
            if is_learnt {
                self.learnt_refs = survivors;
            } else {
                self.constraint_refs = survivors;
            }
        }
    }

    fn is_locked(&self, cref: ClauseRef) -> bool {
        let c = self.clause(cref);
        if c.is_empty() {
            return false;
        }
        let l0 = c.lits[0];
        matches!(self.reason[l0.var().idx()], Reason::Clause(r) if r == cref)
            && self.value(l0).is_true()
    }

    /// Deletes roughly the lower half of learnt clauses by activity,
    /// protecting locked clauses and low-LBD "glue" clauses (LBD <= 2).
    pub(crate) fn reduce_learnt(&mut self) {
        let mut refs = self.learnt_refs.clone();
        refs.sort_by(|&a, &b| {
            let ca = self.clause(a);
            let cb = self.clause(b);
            cb.len()
                .cmp(&ca.len())
                .then(ca.activity.partial_cmp(&cb.activity).unwrap())
        });

        let n = refs.len();
        let half = n / 2;
        let mut survivors = Vec::with_capacity(n);
        let threshold = self.cla_inc / n.max(1) as f64;

        for (i, &cref) in refs.iter().enumerate() {
            let c = self.clause(cref);
            let protect = self.is_locked(cref) || c.len() <= 2 || c.lbd <= 2;
            let delete = if protect {
                false
            } else if i < half {
                true
            } else {
                c.activity < threshold
            };
            if delete {
                self.free_clause(cref);
            } else {
                survivors.push(cref);
            }
        }
        self.learnt_refs = survivors;
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::Solver;

    #[test]
    fn unit_clause_is_asserted_immediately() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        assert!(s.add_clause(vec![a]));
        assert!(s.value(a).is_true());
    }

    #[test]
    fn empty_clause_makes_solver_unsat() {
        let mut s = Solver::with_default_config();
        assert!(!s.add_clause(vec![]));
        assert!(!s.is_ok());
    }

    #[test]
    fn tautology_is_dropped_without_contradiction() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        assert!(s.add_clause(vec![a, !a]));
        assert!(s.is_ok());
    }

    #[test]
    fn contradictory_units_make_solver_unsat() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        assert!(s.add_clause(vec![a]));
        assert!(!s.add_clause(vec![!a]));
        assert!(!s.is_ok());
    }
}
