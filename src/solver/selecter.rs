//! Decision-literal selection: pops the most active decision-eligible
//! variable from the heap, then picks its polarity.
//!
//! Policy names (`phase_cache`, watcher-count, random frequency) follow
//! `original_source/private_include/Selecter.h`; the bump/decay cadence is
//! carried from the teacher's `heuristic/vsids.rs` and `heuristic/decay.rs`.

use rand::Rng;

use crate::cnf::{Lit, Var};
use crate::solver::Solver;

impl Solver {
    /// Returns the next decision literal, or `None` if every decision-
    /// eligible variable is already assigned (the formula is satisfied).
    pub(crate) fn pick_decision_literal(&mut self) -> Option<Lit> {
        let var = loop {
            if self.config.var_freq > 0.0
                && self.rng.gen::<f64>() < self.config.var_freq
                && !self.heap.is_empty()
            {
                if let Some(v) = self.random_unassigned_decidable_var() {
                    break Some(v);
                }
            }
            match self.heap.pop_max(&self.activity) {
                None => break None,
                Some(v) if self.assign[v.idx()].is_undef() => break Some(v),
                Some(_) => continue, // stale heap entry for an already-assigned var
            }
        }?;

        let polarity = self.pick_polarity(var);
        Some(Lit::new(var, !polarity))
    }

    fn random_unassigned_decidable_var(&mut self) -> Option<Var> {
        let n = self.num_vars();
        if n == 0 {
            return None;
        }
        let start = self.rng.gen_range(0..n);
        for offset in 0..n {
            let idx = (start + offset) % n;
            let var = Var::new(idx as u32);
            if self.decidable[idx] && self.assign[idx].is_undef() {
                return Some(var);
            }
        }
        None
    }

    fn pick_polarity(&mut self, var: Var) -> bool {
        if self.config.wl_posi || self.config.wl_nega {
            let pos_watchers = self.watchers[var.pos_lit().index()].len();
            let neg_watchers = self.watchers[var.neg_lit().index()].len();
            // Prefer the polarity whose negation carries more watchers: it
            // forces more propagation if assigned.
            return if self.config.wl_posi {
                neg_watchers >= pos_watchers
            } else {
                pos_watchers >= neg_watchers
            };
        }
        if self.config.phase_cache {
            self.phase[var.idx()]
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::config::Config;
    use crate::solver::Solver;

    #[test]
    fn picks_a_literal_while_variables_remain() {
        let mut s = Solver::new(Config::default());
        s.new_variable(true);
        s.new_variable(true);
        let lit = s.pick_decision_literal();
        assert!(lit.is_some());
    }

    #[test]
    fn returns_none_once_all_assigned() {
        let mut s = Solver::new(Config::default());
        let a = s.new_variable(true);
        s.new_decision_level();
        s.unchecked_enqueue(a, crate::cnf::Reason::None);
        assert!(s.pick_decision_literal().is_none());
    }
}
