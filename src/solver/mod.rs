//! The CDCL search engine: a single flat [`Solver`] struct with its
//! behaviour split across per-concern `impl` blocks in sibling modules,
//! mirroring a single-translation-unit MiniSat-style core rather than a
//! tree of mutually-referencing sub-objects.

pub mod analyze;
pub mod assumptions;
pub mod budget;
pub mod clause_db;
pub mod config;
pub mod heap;
pub mod oplog;
pub mod progress;
pub mod restarts;
pub mod selecter;
pub mod stats;
pub mod trail;
pub mod watch;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use crate::cnf::{Clause, ClauseRef, Lbool, Lit, Reason, Var};

pub use config::{Config, SolverType};
pub use progress::Progress;
pub use stats::Stats;

/// Result of a `solve` call.
#[derive(Clone, Debug)]
pub enum Solution {
    Sat(Vec<bool>),
    Unsat,
    Unknown,
}

/// Binary shortcut or clause reference watched on a literal.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Watcher {
    Binary(Lit),
    Clause(ClauseRef),
}

pub struct Solver {
    pub(crate) config: Config,

    // --- variable state, indexed by Var::idx() ---
    pub(crate) assign: Vec<Lbool>,
    pub(crate) phase: Vec<bool>,
    pub(crate) level: Vec<i32>,
    pub(crate) reason: Vec<Reason>,
    pub(crate) decidable: Vec<bool>,
    pub(crate) activity: Vec<f64>,

    // --- trail ---
    pub(crate) trail: Vec<Lit>,
    pub(crate) trail_lim: Vec<usize>,
    pub(crate) qhead: usize,

    // --- clause storage ---
    pub(crate) clauses: Vec<Option<Clause>>,
    pub(crate) free_clause_ids: Vec<u32>,
    pub(crate) constraint_refs: Vec<ClauseRef>,
    pub(crate) learnt_refs: Vec<ClauseRef>,
    pub(crate) units: Vec<Lit>,
    pub(crate) binaries: Vec<(Lit, Lit)>,
    pub(crate) watchers: Vec<Vec<Watcher>>,

    // --- activity bookkeeping ---
    pub(crate) var_inc: f64,
    pub(crate) cla_inc: f64,

    // --- variable heap ---
    pub(crate) heap: heap::VarHeap,

    // --- restart / clause-db controller ---
    pub(crate) restart_state: restarts::RestartState,
    pub(crate) learnt_limit: f64,
    pub(crate) learntsize_adjust_confl: f64,
    pub(crate) learntsize_adjust_cnt: i64,

    // --- analysis scratch space ---
    pub(crate) seen: Vec<bool>,
    pub(crate) analyze_toclear: Vec<Lit>,

    // --- assumptions / unsat core ---
    pub(crate) assumptions: Vec<Lit>,
    pub(crate) conflict_lits: Vec<Lit>,

    // --- budgets / cancellation ---
    pub(crate) conflict_budget: i64,
    pub(crate) propagation_budget: i64,
    pub(crate) stop_flag: Arc<AtomicBool>,
    pub(crate) timer_enabled: bool,

    // --- model ---
    pub(crate) model: Vec<bool>,
    pub(crate) ok: bool,

    // --- stats / logging ---
    pub(crate) stats: Stats,
    pub(crate) oplog: Option<oplog::OpLog>,
    pub(crate) msg_handler: Option<Box<dyn FnMut(&str)>>,

    pub(crate) rng: rand::rngs::StdRng,
}

impl Solver {
    pub fn new(config: Config) -> Self {
        use rand::SeedableRng;
        let mut solver = Solver {
            config,
            assign: Vec::new(),
            phase: Vec::new(),
            level: Vec::new(),
            reason: Vec::new(),
            decidable: Vec::new(),
            activity: Vec::new(),
            trail: Vec::new(),
            trail_lim: Vec::new(),
            qhead: 0,
            clauses: Vec::new(),
            free_clause_ids: Vec::new(),
            constraint_refs: Vec::new(),
            learnt_refs: Vec::new(),
            units: Vec::new(),
            binaries: Vec::new(),
            watchers: Vec::new(),
            var_inc: 1.0,
            cla_inc: 1.0,
            heap: heap::VarHeap::new(),
            restart_state: restarts::RestartState::new(),
            learnt_limit: 0.0,
            learntsize_adjust_confl: 100.0,
            learntsize_adjust_cnt: 100,
            seen: Vec::new(),
            analyze_toclear: Vec::new(),
            assumptions: Vec::new(),
            conflict_lits: Vec::new(),
            conflict_budget: -1,
            propagation_budget: -1,
            stop_flag: Arc::new(AtomicBool::new(false)),
            timer_enabled: false,
            model: Vec::new(),
            ok: true,
            stats: Stats::default(),
            oplog: None,
            msg_handler: None,
            rng: rand::rngs::StdRng::seed_from_u64(0xC0FFEE),
        };
        solver.ensure_oplog();
        solver
    }

    pub fn with_default_config() -> Self {
        Solver::new(Config::default())
    }

    pub fn num_vars(&self) -> usize {
        self.assign.len()
    }

    /// Allocates a fresh variable and returns its positive literal.
    /// Variables are numbered `0..N-1` in creation order.
    pub fn new_variable(&mut self, decidable: bool) -> Lit {
        let var = Var::new(self.assign.len() as u32);
        self.assign.push(Lbool::UNDEF);
        self.phase.push(false);
        self.level.push(-1);
        self.reason.push(Reason::None);
        self.decidable.push(decidable);
        self.activity.push(0.0);
        self.watchers.push(Vec::new());
        self.watchers.push(Vec::new());
        self.heap.ensure_capacity(var.idx() + 1);
        if decidable {
            self.heap.insert(var, &self.activity);
        }
        self.stats.num_vars += 1;
        if let Some(log) = &mut self.oplog {
            log.log_new_var(var);
        }
        var.pos_lit()
    }

    #[inline]
    pub(crate) fn value(&self, lit: Lit) -> Lbool {
        self.assign[lit.var().idx()].xor(lit.is_negated())
    }

    #[inline]
    pub(crate) fn decision_level(&self) -> usize {
        self.trail_lim.len()
    }

    pub fn is_ok(&self) -> bool {
        self.ok
    }

    pub fn stats(&self) -> &Stats {
        &self.stats
    }

    pub fn set_conflict_budget(&mut self, budget: i64) -> i64 {
        std::mem::replace(&mut self.conflict_budget, budget)
    }

    pub fn set_propagation_budget(&mut self, budget: i64) -> i64 {
        std::mem::replace(&mut self.propagation_budget, budget)
    }

    /// A thread-safe handle that, when set, causes the next safe point in
    /// `solve` to return `Solution::Unknown`.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.stop_flag.clone()
    }

    pub fn stop(&self) {
        self.stop_flag
            .store(true, std::sync::atomic::Ordering::SeqCst);
    }

    pub fn timer_on(&mut self, on: bool) {
        self.timer_enabled = on;
    }

    pub fn reg_msg_handler(&mut self, handler: impl FnMut(&str) + 'static) {
        self.msg_handler = Some(Box::new(handler));
    }

    pub(crate) fn emit_msg(&mut self, msg: &str) {
        if let Some(handler) = &mut self.msg_handler {
            handler(msg);
        }
    }

    /// Reads the model value of a literal after a `Solution::Sat` result.
    pub fn read_model(&self, lit: Lit) -> Option<bool> {
        self.model
            .get(lit.var().idx())
            .map(|&v| v != lit.is_negated())
    }

    /// The minimal (best-effort) subset of assumption literals responsible
    /// for unsatisfiability, valid after `Solution::Unsat` was returned from
    /// a `solve` call with assumptions.
    pub fn conflict_literals(&self) -> &[Lit] {
        &self.conflict_lits
    }

    /// Runs the search to completion (modulo budgets/timeout/stop), against
    /// the given assumption literals, per §4.9.
    pub fn solve(&mut self, assumptions: Vec<Lit>, time_limit: std::time::Duration) -> Solution {
        self.ensure_oplog();
        if let Some(log) = &mut self.oplog {
            log.log_solve(&assumptions);
        }
        self.stats.start_timing();
        self.stop_flag.store(false, std::sync::atomic::Ordering::SeqCst);
        let _timer = self.arm_timer(time_limit);

        let result = self.solve_inner(assumptions);

        self.stats.stop_timing();
        if let Some(log) = &mut self.oplog {
            log.log_result(&result);
        }
        result
    }

    fn solve_inner(&mut self, assumptions: Vec<Lit>) -> Solution {
        if !self.ok {
            return Solution::Unsat;
        }
        self.reduce_cnf();
        if !self.ok {
            return Solution::Unsat;
        }

        self.assumptions = assumptions;
        if !self.assert_assumptions() {
            self.backtrack(0);
            return Solution::Unsat;
        }
        let root_level = self.decision_level();
        self.controller_init();

        let mut progress = Progress::new();
        let result = loop {
            let status = self.search(root_level);
            progress.print_if_necessary(&self.stats);
            match status {
                Status::True | Status::False => break status,
                Status::Undef => {
                    if !self.within_budget() {
                        break Status::Undef;
                    }
                    self.controller_on_restart();
                    self.emit_msg("restart");
                    self.stats.num_restarts += 1;
                }
            }
        };
        Progress::close_table();

        match result {
            Status::True => {
                self.model = (0..self.num_vars())
                    .map(|i| self.assign[i].to_option().unwrap_or(false))
                    .collect();
                self.backtrack(0);
                Solution::Sat(self.model.clone())
            }
            Status::False => Solution::Unsat,
            Status::Undef => Solution::Unknown,
        }
    }

    /// One restart's worth of search: decide/propagate/analyze until SAT,
    /// UNSAT, a restart is due, or the budget runs out.
    fn search(&mut self, root_level: usize) -> Status {
        loop {
            if !self.within_budget() {
                self.backtrack(root_level);
                return Status::Undef;
            }
            let conflict = self.propagate();
            if let Some(conflict) = conflict {
                self.stats.num_conflicts += 1;
                if self.decision_level() == root_level {
                    self.extract_conflict_core(conflict);
                    return Status::False;
                }
                let (backtrack_level, learnt) = self.analyze(conflict);
                let lbd = self.compute_lbd(&learnt);
                self.backtrack((backtrack_level as usize).max(root_level));
                self.add_learnt_clause(learnt, lbd);
                self.controller_on_conflict(lbd);
                continue;
            }

            if self.restart_due() {
                self.backtrack(root_level);
                return Status::Undef;
            }
            if self.decision_level() == 0 {
                self.reduce_cnf();
                if !self.ok {
                    return Status::False;
                }
            }
            if self.learnt_clause_limit_reached() {
                self.reduce_learnt();
            }

            match self.pick_decision_literal() {
                None => return Status::True,
                Some(lit) => {
                    self.new_decision_level();
                    self.unchecked_enqueue(lit, Reason::None);
                    self.stats.num_decisions += 1;
                }
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Status {
    True,
    False,
    Undef,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_variable_numbers_in_order() {
        let mut s = Solver::with_default_config();
        let a = s.new_variable(true);
        let b = s.new_variable(true);
        assert_eq!(a.var().idx(), 0);
        assert_eq!(b.var().idx(), 1);
        assert_eq!(s.num_vars(), 2);
    }
}
