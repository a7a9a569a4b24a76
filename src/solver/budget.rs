//! Conflict/propagation budgets, the thread-safe stop flag, and the
//! optional wall-clock timer (§5).

use std::sync::atomic::Ordering;
use std::time::Duration;

use crate::solver::Solver;

impl Solver {
    pub(crate) fn within_budget(&self) -> bool {
        if self.stop_flag.load(Ordering::SeqCst) {
            return false;
        }
        if self.conflict_budget >= 0 && self.stats.num_conflicts as i64 > self.conflict_budget {
            return false;
        }
        if self.propagation_budget >= 0
            && self.stats.num_propagations as i64 > self.propagation_budget
        {
            return false;
        }
        if self.config.max_conflict >= 0 && self.stats.num_conflicts as i64 > self.config.max_conflict
        {
            return false;
        }
        true
    }

    /// Spawns a detached timer thread that sets the stop flag after
    /// `time_limit`, if the timer is enabled and a nonzero limit was given.
    pub(crate) fn arm_timer(&self, time_limit: Duration) -> Option<std::thread::JoinHandle<()>> {
        if !self.timer_enabled || time_limit.is_zero() {
            return None;
        }
        let flag = self.stop_flag.clone();
        Some(std::thread::spawn(move || {
            std::thread::sleep(time_limit);
            flag.store(true, Ordering::SeqCst);
        }))
    }
}

#[cfg(test)]
mod tests {
    use crate::solver::Solver;

    #[test]
    fn stop_flag_breaks_budget() {
        let s = Solver::with_default_config();
        assert!(s.within_budget());
        s.stop();
        assert!(!s.within_budget());
    }

    #[test]
    fn conflict_budget_is_enforced() {
        let mut s = Solver::with_default_config();
        s.set_conflict_budget(0);
        s.stats.num_conflicts = 1;
        assert!(!s.within_budget());
    }
}
