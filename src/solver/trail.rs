//! Assignment trail: decision levels, backtracking and phase saving.

use crate::cnf::Lbool;
use crate::solver::Solver;

impl Solver {
    /// Begins a new decision level; the trail's current length is recorded
    /// as the level's start marker.
    pub(crate) fn new_decision_level(&mut self) {
        self.trail_lim.push(self.trail.len());
    }

    /// Pops the trail back down to `level`, restoring previous-value phase
    /// bits and re-inserting freed variables into the heap. A no-op if
    /// already at or below `level`.
    pub(crate) fn backtrack(&mut self, level: usize) {
        if self.decision_level() <= level {
            return;
        }
        let target = self.trail_lim[level];
        for i in (target..self.trail.len()).rev() {
            let lit = self.trail[i];
            let var = lit.var();
            self.phase[var.idx()] = self.assign[var.idx()].is_true();
            self.assign[var.idx()] = Lbool::UNDEF;
            self.reason[var.idx()] = crate::cnf::Reason::None;
            self.level[var.idx()] = -1;
            self.insert_var_order(var);
        }
        self.trail.truncate(target);
        self.trail_lim.truncate(level);
        self.qhead = target;
        self.stats.num_backtracks += 1;
    }
}

#[cfg(test)]
mod tests {
    use crate::cnf::Reason;
    use crate::solver::Solver;

    #[test]
    fn backtrack_restores_undef_and_phase() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        s.new_decision_level();
        s.unchecked_enqueue(a, Reason::None);
        assert!(s.value(a).is_true());
        s.backtrack(0);
        assert!(s.value(a).is_undef());
        assert!(s.phase[a.var().idx()]);
    }
}
