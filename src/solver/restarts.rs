//! Restart scheduling and learnt-clause-database size growth (§4.8).
//!
//! The Luby/geometric schedules are grounded on the teacher's
//! `restarts.rs`; the `glueminisat2` EMA-driven controller is grounded on
//! the teacher's `ema_policy.rs`, itself citing Biere & Fröhlich's
//! "Evaluating CDCL Restart Schemes".

use crate::solver::Solver;

const GEOMETRIC_INITIAL_CONFLICTS: f64 = 100.0;
const GEOMETRIC_GROWTH: f64 = 1.5;
const LEARNTSIZE_GROWTH: f64 = 1.1;
const LEARNTSIZE_ADJUST_START: f64 = 100.0;
const LEARNTSIZE_ADJUST_GROWTH: f64 = 1.5;

const EMA_MIN_CONFLICTS_BEFORE_RESTART: u64 = 50;
const EMA_MARGIN_RATIO_FORCING_RESTART: f64 = 1.15;
const EMA_MARGIN_RATIO_BLOCKING_RESTART: f64 = 1.4;

/// Exponential moving average with a warm-up period that uses a plain mean
/// until enough samples have accumulated, per the teacher's adaptive-alpha
/// initialization.
#[derive(Clone, Copy, Debug)]
struct Ema {
    value: f64,
    alpha: f64,
    samples: u64,
    warmup: u64,
}

impl Ema {
    fn new(alpha: f64, warmup: u64) -> Self {
        Ema {
            value: 0.0,
            alpha,
            samples: 0,
            warmup,
        }
    }

    fn update(&mut self, x: f64) {
        self.samples += 1;
        if self.samples <= self.warmup {
            self.value += (x - self.value) / self.samples as f64;
        } else {
            self.value += self.alpha * (x - self.value);
        }
    }
}

pub(crate) struct RestartState {
    pub(crate) num_restarts: u64,
    conflicts_since_restart: u64,
    conflict_limit: f64,

    lbd_short: Ema,
    lbd_long: Ema,
    trail_short: Ema,
    trail_long: Ema,
}

impl RestartState {
    pub(crate) fn new() -> Self {
        RestartState {
            num_restarts: 0,
            conflicts_since_restart: 0,
            conflict_limit: GEOMETRIC_INITIAL_CONFLICTS,
            lbd_short: Ema::new(1.0 / 50.0, 50),
            lbd_long: Ema::new(1.0 / 5000.0, 5000),
            trail_short: Ema::new(1.0 / 50.0, 50),
            trail_long: Ema::new(1.0 / 5000.0, 5000),
        }
    }
}

fn luby(restart: u64) -> u64 {
    let i = restart + 1;
    for k in 1..32 {
        if i == (1u64 << k) - 1 {
            return 1 << (k - 1);
        }
    }
    let mut k = 1;
    loop {
        if (1u64 << (k - 1)) <= i && i < (1u64 << k) - 1 {
            return luby(i - (1 << (k - 1)) + 1);
        }
        k += 1;
    }
}

impl Solver {
    pub(crate) fn controller_init(&mut self) {
        self.learnt_limit = self.constraint_refs.len() as f64 / 3.0;
        self.learntsize_adjust_confl = LEARNTSIZE_ADJUST_START;
        self.learntsize_adjust_cnt = LEARNTSIZE_ADJUST_START as i64;
        self.restart_state.conflict_limit = GEOMETRIC_INITIAL_CONFLICTS;
    }

    /// Called once per conflict, after the learnt clause has been added.
    pub(crate) fn controller_on_conflict(&mut self, lbd: u32) {
        self.restart_state.conflicts_since_restart += 1;
        self.learntsize_adjust_cnt -= 1;
        if self.learntsize_adjust_cnt == 0 {
            self.learntsize_adjust_confl *= LEARNTSIZE_ADJUST_GROWTH;
            self.learntsize_adjust_cnt = self.learntsize_adjust_confl as i64;
            self.learnt_limit *= LEARNTSIZE_GROWTH;
        }
        if self.config.solver_type.uses_ema_restart() {
            self.restart_state.lbd_short.update(lbd as f64);
            self.restart_state.lbd_long.update(lbd as f64);
            self.restart_state.trail_short.update(self.trail.len() as f64);
            self.restart_state.trail_long.update(self.trail.len() as f64);
        }
    }

    /// Whether the current restart policy requests a restart now.
    pub(crate) fn restart_due(&self) -> bool {
        if self.config.solver_type.uses_ema_restart() {
            return self.ema_restart_due();
        }
        let limit = if self.config.solver_type.uses_luby_restart() {
            100.0 * luby(self.restart_state.num_restarts) as f64
        } else {
            self.restart_state.conflict_limit
        };
        self.restart_state.conflicts_since_restart as f64 >= limit
    }

    fn ema_restart_due(&self) -> bool {
        let r = &self.restart_state;
        if r.conflicts_since_restart < EMA_MIN_CONFLICTS_BEFORE_RESTART {
            return false;
        }
        let forcing = r.lbd_short.value > EMA_MARGIN_RATIO_FORCING_RESTART * r.lbd_long.value;
        let blocking = r.trail_short.value > EMA_MARGIN_RATIO_BLOCKING_RESTART * r.trail_long.value;
        forcing && !blocking
    }

    /// Resets per-restart bookkeeping and grows the geometric conflict
    /// limit if that policy is active.
    pub(crate) fn controller_on_restart(&mut self) {
        self.restart_state.num_restarts += 1;
        self.restart_state.conflicts_since_restart = 0;
        if !self.config.solver_type.uses_luby_restart()
            && !self.config.solver_type.uses_ema_restart()
        {
            self.restart_state.conflict_limit *= GEOMETRIC_GROWTH;
        }
    }

    pub(crate) fn learnt_clause_limit_reached(&self) -> bool {
        (self.learnt_refs.len() as f64) >= (self.trail.len() as f64 + self.learnt_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::luby;

    #[test]
    fn luby_matches_known_prefix() {
        let expected = [1, 1, 2, 1, 1, 2, 4, 1, 1, 2, 1, 1, 2, 4, 8];
        for (i, &v) in expected.iter().enumerate() {
            assert_eq!(luby(i as u64), v, "mismatch at i={i}");
        }
    }
}
