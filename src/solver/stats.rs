//! Statistics snapshot, extended from the teacher's `statistics.rs` with
//! the conflict/learnt-limit fields the controller tracks.

use prettytable::{row, Table};

#[derive(Debug, Clone)]
pub struct Stats {
    pub num_vars: usize,
    pub num_clauses: usize,
    pub num_learnts: usize,
    pub num_backtracks: usize,
    pub num_conflicts: u64,
    pub num_decisions: u64,
    pub num_propagations: u64,
    pub num_restarts: u64,
    pub start_time: std::time::Instant,
    pub time: std::time::Duration,
}

impl Default for Stats {
    fn default() -> Self {
        Stats {
            num_vars: 0,
            num_clauses: 0,
            num_learnts: 0,
            num_backtracks: 0,
            num_conflicts: 0,
            num_decisions: 0,
            num_propagations: 0,
            num_restarts: 0,
            start_time: std::time::Instant::now(),
            time: std::time::Duration::ZERO,
        }
    }
}

impl Stats {
    pub fn start_timing(&mut self) {
        self.start_time = std::time::Instant::now();
    }

    pub fn stop_timing(&mut self) {
        self.time = self.start_time.elapsed();
    }

    pub fn to_table(&self) -> Table {
        let mut table = Table::new();
        table.set_format(*prettytable::format::consts::FORMAT_NO_COLSEP);
        table.set_titles(row![b -> "Solver Statistics", "Value"]);
        table.add_row(row![
            "Size",
            format!("{} clauses, {} vars", self.num_clauses, self.num_vars)
        ]);
        table.add_row(row!["Learnt clauses", self.num_learnts]);
        table.add_row(row!["Conflicts", self.num_conflicts]);
        table.add_row(row!["Decisions", self.num_decisions]);
        table.add_row(row!["Restarts", self.num_restarts]);
        table.add_row(row!["Propagations", self.num_propagations]);
        table.add_row(row![
            "Time (approx.)",
            format!("{:.3}s", self.time.as_secs_f32())
        ]);
        table
    }
}
