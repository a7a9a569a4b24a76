//! Operations replay log: one line per `new_variable`/`add_clause`/`solve`
//! call, in the `N`/`A`/`S`/`#` format described in §4.11/§6. This is a
//! replay log, not a debugging aid — internal debugging events go through
//! the `log` crate facade instead (see `solver/progress.rs`).

use std::fs::File;
use std::io::{self, BufWriter, Write};

use crate::cnf::{Lit, Var};
use crate::solver::config::LogTarget;
use crate::solver::Solution;

pub(crate) enum Sink {
    File(BufWriter<File>),
    Stdout,
    Stderr,
}

pub(crate) struct OpLog {
    sink: Sink,
    next_var_id: u32,
}

impl OpLog {
    pub(crate) fn open(target: &LogTarget) -> io::Result<Self> {
        let sink = match target {
            LogTarget::File(path) => Sink::File(BufWriter::new(File::create(path)?)),
            LogTarget::Stdout => Sink::Stdout,
            LogTarget::Stderr => Sink::Stderr,
        };
        Ok(OpLog {
            sink,
            next_var_id: 0,
        })
    }

    fn write_line(&mut self, line: &str) {
        let _ = match &mut self.sink {
            Sink::File(w) => writeln!(w, "{line}"),
            Sink::Stdout => {
                println!("{line}");
                Ok(())
            }
            Sink::Stderr => {
                eprintln!("{line}");
                Ok(())
            }
        };
    }

    pub(crate) fn log_new_var(&mut self, _var: Var) {
        self.write_line(&format!("N # var {}", self.next_var_id));
        self.next_var_id += 1;
    }

    pub(crate) fn log_add_clause(&mut self, lits: &[Lit]) {
        let body = lits
            .iter()
            .map(|l| l.to_dimacs().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.write_line(&format!("A {body}"));
    }

    pub(crate) fn log_solve(&mut self, assumptions: &[Lit]) {
        let body = assumptions
            .iter()
            .map(|l| l.to_dimacs().to_string())
            .collect::<Vec<_>>()
            .join(" ");
        self.write_line(&format!("S {body}"));
    }

    pub(crate) fn log_result(&mut self, result: &Solution) {
        let tag = match result {
            Solution::Sat(_) => "SAT",
            Solution::Unsat => "UNSAT",
            Solution::Unknown => "ABORT",
        };
        self.write_line(&format!("# -> {tag}"));
    }
}

impl crate::solver::Solver {
    /// Activates the operations log named by the current configuration, if
    /// any. Called once from `solve` the first time logging is needed.
    pub(crate) fn ensure_oplog(&mut self) {
        if self.oplog.is_some() {
            return;
        }
        if let Some(target) = self.config.log.clone() {
            match OpLog::open(&target) {
                Ok(log) => self.oplog = Some(log),
                Err(e) => log::warn!("failed to open operations log: {e}"),
            }
        }
    }
}
