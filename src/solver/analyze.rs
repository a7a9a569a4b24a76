//! First-UIP conflict analysis with recursive clause minimization.
//!
//! Grounded on the teacher's `clause_learning.rs` (the marked/"seen" set
//! walked backward over the trail) and on `ratsat/core.rs::analyze`/
//! `lit_redundant` for the minimization bitmap trick.

use fnv::FnvHashSet;

use crate::cnf::{Lit, Reason};
use crate::solver::watch::Conflict;
use crate::solver::Solver;

impl Solver {
    /// Returns `(backtrack_level, learnt_literals)` with `learnt_literals[0]`
    /// the asserting literal.
    pub(crate) fn analyze(&mut self, conflict: Conflict) -> (i32, Vec<Lit>) {
        let mut learnt: Vec<Lit> = Vec::new();
        let mut seen = vec![false; self.num_vars()];
        let mut pending = 0usize;
        let mut p: Option<Lit> = None;
        let mut trail_idx = self.trail.len();

        let mut reason_lits: Vec<Lit> = match conflict {
            Conflict::Binary(a, b) => vec![a, b],
            Conflict::Clause(cref) => {
                self.bump_clause_activity(cref);
                self.clause(cref).lits.clone()
            }
        };

        loop {
            for &q in &reason_lits {
                if p == Some(q) {
                    continue;
                }
                let var = q.var();
                if seen[var.idx()] {
                    continue;
                }
                let lvl = self.level[var.idx()];
                if lvl == 0 {
                    continue;
                }
                seen[var.idx()] = true;
                self.bump_var_activity(var);
                if lvl < self.decision_level() as i32 {
                    learnt.push(q);
                } else {
                    pending += 1;
                }
            }

            // Find the next marked literal on the trail, walking backwards.
            loop {
                trail_idx -= 1;
                if seen[self.trail[trail_idx].var().idx()] {
                    break;
                }
            }
            let lit = self.trail[trail_idx];
            let var = lit.var();
            seen[var.idx()] = false;
            pending -= 1;
            if pending == 0 {
                p = Some(!lit);
                break;
            }
            reason_lits = match self.reason[var.idx()] {
                Reason::None => unreachable!("pending literal must have a reason"),
                Reason::Binary(other) => vec![lit, other],
                Reason::Clause(cref) => {
                    self.bump_clause_activity(cref);
                    self.clause(cref).lits.clone()
                }
            };
            p = Some(lit);
        }

        learnt.insert(0, p.unwrap());

        self.minimize(&mut learnt, &seen);

        let backtrack_level = if learnt.len() == 1 {
            0
        } else {
            let mut max_i = 1;
            for i in 2..learnt.len() {
                if self.level[learnt[i].var().idx()] > self.level[learnt[max_i].var().idx()] {
                    max_i = i;
                }
            }
            learnt.swap(1, max_i);
            self.level[learnt[1].var().idx()]
        };

        self.decay_var_activity();
        self.decay_clause_activity();

        (backtrack_level, learnt)
    }

    /// Recursive minimization: drops a literal from `learnt` if every
    /// ancestor in its reason chain is either already marked or belongs to a
    /// decision level with no other representative in `learnt`.
    fn minimize(&self, learnt: &mut Vec<Lit>, seen: &[bool]) {
        let mut level_mask: u64 = 0;
        for &l in learnt.iter() {
            level_mask |= 1u64 << (self.level[l.var().idx()] as u64 % 64);
        }

        let mut marked = seen.to_vec();
        let mut keep = vec![true; learnt.len()];
        for i in 1..learnt.len() {
            let redundant = self.lit_redundant(learnt[i], level_mask, &mut marked);
            keep[i] = !redundant;
        }
        let mut out = Vec::with_capacity(learnt.len());
        for (i, &l) in learnt.iter().enumerate() {
            if keep[i] {
                out.push(l);
            }
        }
        *learnt = out;
    }

    fn lit_redundant(&self, lit: Lit, level_mask: u64, marked: &mut [bool]) -> bool {
        let mut stack = vec![lit];
        let mut to_unmark = Vec::new();
        let result = 'outer: loop {
            let cur = match stack.pop() {
                Some(l) => l,
                None => break true,
            };
            let reason = self.reason[cur.var().idx()];
            let ancestors: Vec<Lit> = match reason {
                Reason::None => break false,
                Reason::Binary(other) => vec![other],
                Reason::Clause(cref) => self.clause(cref).lits[1..].to_vec(),
            };
            for a in ancestors {
                let v = a.var();
                if marked[v.idx()] || self.level[v.idx()] == 0 {
                    continue;
                }
                let bit = 1u64 << (self.level[v.idx()] as u64 % 64);
                if self.reason[v.idx()].is_none() || level_mask & bit == 0 {
                    break 'outer false;
                }
                marked[v.idx()] = true;
                to_unmark.push(v);
                stack.push(a);
            }
        };
        if !result {
            for v in to_unmark {
                marked[v.idx()] = false;
            }
        }
        result
    }

    /// Best-effort unsat core from assumption literals: walks backward from
    /// a conflicting trail entry, collecting assumption literals reached
    /// through the reason chain (see §4.10).
    pub(crate) fn extract_conflict_core(&mut self, conflict: Conflict) {
        let mut seen: FnvHashSet<usize> = FnvHashSet::default();
        let mut core = Vec::new();
        let reason_lits: Vec<Lit> = match conflict {
            Conflict::Binary(a, b) => vec![a, b],
            Conflict::Clause(cref) => self.clause(cref).lits.clone(),
        };
        let mut stack: Vec<Lit> = reason_lits;
        while let Some(lit) = stack.pop() {
            let var = lit.var();
            if !seen.insert(var.idx()) {
                continue;
            }
            if self.level[var.idx()] == 0 {
                continue;
            }
            if self.assumptions.contains(&!lit) || self.assumptions.contains(&lit) {
                let assumed = if self.assumptions.contains(&lit) {
                    lit
                } else {
                    !lit
                };
                if self.reason[var.idx()].is_none() {
                    core.push(assumed);
                    continue;
                }
            }
            match self.reason[var.idx()] {
                Reason::None => {}
                Reason::Binary(other) => stack.push(other),
                Reason::Clause(cref) => stack.extend(self.clause(cref).lits.clone()),
            }
        }
        core.sort();
        core.dedup();
        self.conflict_lits = core;
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::config::Config;
    use crate::solver::Solver;

    #[test]
    fn analyze_returns_a_non_empty_learnt_clause() {
        let mut s = Solver::new(Config::default());
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let c = s.new_variable(true);
        s.add_clause(vec![a, b]);
        s.add_clause(vec![a, c]);
        s.add_clause(vec![!b, !c]);
        // A single decision at level 1 forces b and c true, which conflicts
        // with the last clause within the same propagate() call.
        s.new_decision_level();
        s.unchecked_enqueue(!a, crate::cnf::Reason::None);
        let conflict = s.propagate();
        let conflict = conflict.expect("decision should force a conflict");
        let (_lvl, learnt) = s.analyze(conflict);
        assert!(!learnt.is_empty());
    }
}
