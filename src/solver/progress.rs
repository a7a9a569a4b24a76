//! Periodic colored progress table, adapted from the teacher's
//! `progress.rs` almost unchanged. Independent of both the `log` crate
//! facade (internal debug events) and the operations replay log in
//! `oplog.rs`.

use colored::{ColoredString, Colorize};

use crate::solver::Stats;

pub struct Progress {
    time_of_last_print: std::time::Instant,
    last_num_conflicts: u64,
    last_num_restarts: u64,
}

const PRINT_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5);

const TIME: usize = 6;
const CONFLICTS_TOTAL: usize = 15;
const CONFLICTS_DELTA: usize = 10;
const RESTARTS_TOTAL: usize = 12;
const RESTARTS_DELTA: usize = 9;
const LEARNTS_TOTAL: usize = 12;

impl Progress {
    pub fn new() -> Self {
        Self::print_header();
        Progress {
            time_of_last_print: std::time::Instant::now(),
            last_num_conflicts: 0,
            last_num_restarts: 0,
        }
    }

    pub fn print_if_necessary(&mut self, stats: &Stats) {
        if self.time_of_last_print.elapsed() > PRINT_INTERVAL {
            self.print(stats);
            self.time_of_last_print = std::time::Instant::now();
        }
    }

    fn print_header() {
        let conflicts = CONFLICTS_TOTAL + CONFLICTS_DELTA + 1;
        let restarts = RESTARTS_TOTAL + RESTARTS_DELTA + 1;
        println!(
            "c ┌─{:─<TIME$}─┬─{:─<conflicts$}─┬─{:─<restarts$}─┬─{:─<LEARNTS_TOTAL$}─┐",
            "", "", "", ""
        );
        println!(
            "c │ {:<TIME$} │ {:<conflicts$} │ {:<restarts$} │ {:<LEARNTS_TOTAL$} │",
            "Time", "Conflicts", "Restarts", "Learnts"
        );
    }

    fn print(&mut self, stats: &Stats) {
        println!(
            "c │ {:>TIME$} │ {:>CONFLICTS_TOTAL$} {:<CONFLICTS_DELTA$} │ {:>RESTARTS_TOTAL$} {:<RESTARTS_DELTA$} │ {:>LEARNTS_TOTAL$} │",
            stats.start_time.elapsed().as_secs(),
            stats.num_conflicts,
            Self::delta(self.last_num_conflicts, stats.num_conflicts),
            stats.num_restarts,
            Self::delta(self.last_num_restarts, stats.num_restarts),
            stats.num_learnts,
        );
        self.last_num_conflicts = stats.num_conflicts;
        self.last_num_restarts = stats.num_restarts;
    }

    pub fn close_table() {
        let conflicts = CONFLICTS_TOTAL + CONFLICTS_DELTA + 1;
        let restarts = RESTARTS_TOTAL + RESTARTS_DELTA + 1;
        println!(
            "c └─{:─<TIME$}─┴─{:─<conflicts$}─┴─{:─<restarts$}─┴─{:─<LEARNTS_TOTAL$}─┘",
            "", "", "", ""
        );
    }

    fn delta(old: u64, new: u64) -> ColoredString {
        let delta = new as i64 - old as i64;
        let text = if delta >= 0 {
            format!("(+{delta})")
        } else {
            format!("({delta})")
        };
        if delta > 0 {
            text.truecolor(0, 150, 0)
        } else {
            text.truecolor(120, 120, 120)
        }
    }
}

impl Default for Progress {
    fn default() -> Self {
        Progress::new()
    }
}
