//! Two-watched-literal propagation, grounded on the exact swap algorithm in
//! `ratsat/core.rs::propagate` (a Rust port of MiniSat).

use crate::cnf::{ClauseRef, Lbool, Lit, Reason};
use crate::solver::{Solver, Watcher};

impl Solver {
    /// Appends `lit` to the trail with the given reason. The literal must
    /// currently be unassigned.
    pub(crate) fn unchecked_enqueue(&mut self, lit: Lit, reason: Reason) {
        debug_assert!(self.value(lit).is_undef());
        self.assign[lit.var().idx()] = Lbool::from(!lit.is_negated());
        self.level[lit.var().idx()] = self.decision_level() as i32;
        self.reason[lit.var().idx()] = reason;
        self.trail.push(lit);
    }

    /// Asserts `lit` as a fact: succeeds if already true, fails if already
    /// false, otherwise assigns it with no reason (a decision-level-0 unit).
    pub(crate) fn check_and_assign(&mut self, lit: Lit) -> bool {
        match self.value(lit) {
            Lbool::TRUE => true,
            Lbool::FALSE => false,
            _ => {
                self.unchecked_enqueue(lit, Reason::None);
                true
            }
        }
    }

    fn watch_clause(&mut self, watched_lit: Lit, w: Watcher) {
        self.watchers[watched_lit.index()].push(w);
    }

    pub(crate) fn attach_clause(&mut self, cref: ClauseRef) {
        let (l0, l1) = {
            let c = self.clauses[cref.0 as usize].as_ref().unwrap();
            (c.lits[0], c.lits[1])
        };
        self.watch_clause(!l0, Watcher::Clause(cref));
        self.watch_clause(!l1, Watcher::Clause(cref));
    }

    pub(crate) fn attach_binary(&mut self, a: Lit, b: Lit) {
        self.watch_clause(!a, Watcher::Binary(b));
        self.watch_clause(!b, Watcher::Binary(a));
    }

    /// Strips `cref`'s two watcher entries before the clause is freed, so a
    /// later `propagate()` never walks into a `None` slot (or, once the id
    /// is recycled, an unrelated clause).
    pub(crate) fn detach_clause(&mut self, cref: ClauseRef) {
        let (l0, l1) = {
            let c = self.clauses[cref.0 as usize].as_ref().unwrap();
            (c.lits[0], c.lits[1])
        };
        for watched in [!l0, !l1] {
            self.watchers[watched.index()]
                .retain(|w| !matches!(w, Watcher::Clause(r) if *r == cref));
        }
    }

    /// Propagates everything implied by the trail since the last call.
    /// Returns the conflicting clause reference, or `None` on success. A
    /// conflict arising from a binary clause is surfaced by temporarily
    /// allocating nothing: the caller receives the two literals directly
    /// through `binary_conflict`.
    pub(crate) fn propagate(&mut self) -> Option<Conflict> {
        let mut conflict = None;
        while self.qhead < self.trail.len() {
            let p = self.trail[self.qhead];
            self.qhead += 1;
            self.stats.num_propagations += 1;

            let watch_list = std::mem::take(&mut self.watchers[p.index()]);
            let mut kept = Vec::with_capacity(watch_list.len());
            let mut i = 0;
            while i < watch_list.len() {
                let w = watch_list[i];
                i += 1;
                match w {
                    Watcher::Binary(other) => match self.value(other) {
                        Lbool::TRUE => kept.push(w),
                        Lbool::UNDEF => {
                            kept.push(w);
                            self.unchecked_enqueue(other, Reason::Binary(!p));
                        }
                        Lbool::FALSE => {
                            kept.push(w);
                            conflict = Some(Conflict::Binary(!p, other));
                            break;
                        }
                        _ => unreachable!(),
                    },
                    Watcher::Clause(cref) => {
                        if self.propagate_clause_watch(p, cref, &mut kept) {
                            // conflict
                            conflict = Some(Conflict::Clause(cref));
                            break;
                        }
                    }
                }
            }
            // Any watchers after index i stay on this literal's list too.
            kept.extend_from_slice(&watch_list[i..]);
            self.watchers[p.index()] = kept;

            if conflict.is_some() {
                self.qhead = self.trail.len();
                break;
            }
        }
        conflict
    }

    /// Returns true on conflict. Moves (or re-homes) the watcher as needed;
    /// `kept` accumulates watchers that stay on `p`'s list.
    fn propagate_clause_watch(&mut self, p: Lit, cref: ClauseRef, kept: &mut Vec<Watcher>) -> bool {
        let false_lit = !p;
        {
            let c = self.clauses[cref.0 as usize].as_mut().unwrap();
            if c.lits[0] == false_lit {
                c.lits.swap(0, 1);
            }
            debug_assert_eq!(c.lits[1], false_lit);
        }

        let lit0 = self.clauses[cref.0 as usize].as_ref().unwrap().lits[0];
        if self.value(lit0).is_true() {
            kept.push(Watcher::Clause(cref));
            return false;
        }

        let replacement = {
            let c = self.clauses[cref.0 as usize].as_ref().unwrap();
            let mut found = None;
            for k in 2..c.lits.len() {
                if !self.value(c.lits[k]).is_false() {
                    found = Some(k);
                    break;
                }
            }
            found
        };

        if let Some(k) = replacement {
            let c = self.clauses[cref.0 as usize].as_mut().unwrap();
            c.lits.swap(1, k);
            let new_watch = c.lits[1];
            self.watch_clause(!new_watch, Watcher::Clause(cref));
            return false;
        }

        // No replacement: lit0 is the only remaining candidate.
        kept.push(Watcher::Clause(cref));
        if self.value(lit0).is_undef() {
            self.unchecked_enqueue(lit0, Reason::Clause(cref));
            false
        } else {
            true
        }
    }
}

/// A conflict discovered during propagation: either a synthetic binary
/// clause (never materialized in the arena) or an allocated clause.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Conflict {
    Binary(Lit, Lit),
    Clause(ClauseRef),
}

#[cfg(test)]
mod tests {
    use crate::cnf::Reason;
    use crate::solver::Solver;

    #[test]
    fn unit_propagation_through_binary_clause() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        s.add_clause(vec![a, b]);
        s.unchecked_enqueue(!a, Reason::None);
        let conflict = s.propagate();
        assert!(conflict.is_none());
        assert!(s.value(b).is_true());
    }

    #[test]
    fn binary_clause_conflict_detected() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        s.add_clause(vec![a, b]);
        s.unchecked_enqueue(!a, Reason::None);
        s.propagate();
        s.unchecked_enqueue(!b, Reason::None);
        let conflict = s.propagate();
        assert!(conflict.is_some());
    }

    #[test]
    fn long_clause_propagates_last_literal() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        let c = s.new_variable(true);
        s.add_clause(vec![a, b, c]);
        s.unchecked_enqueue(!a, Reason::None);
        s.propagate();
        s.unchecked_enqueue(!b, Reason::None);
        let conflict = s.propagate();
        assert!(conflict.is_none());
        assert!(s.value(c).is_true());
    }
}
