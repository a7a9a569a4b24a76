//! DIMACS CNF parsing and writing, independent of the core solver.

use flate2::read::GzDecoder;
use itertools::Itertools;
use std::io::Read;
use std::path::Path;

use crate::cnf::Lit;
use crate::error::DimacsError;
use crate::solver::Solution;

pub struct DimacsFile {
    pub num_vars: usize,
    pub clauses: Vec<Vec<Lit>>,
}

pub fn clauses_from_dimacs_file(path: &str) -> Result<DimacsFile, DimacsError> {
    let text = if path.ends_with(".gz") {
        let file = std::fs::File::open(Path::new(path))?;
        let mut decoder = GzDecoder::new(file);
        let mut buf = String::new();
        decoder.read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(path)?
    };
    clauses_from_dimacs(&text)
}

pub fn clauses_from_dimacs(input: &str) -> Result<DimacsFile, DimacsError> {
    let lines: Vec<&str> = input
        .lines()
        .filter(|l| !l.starts_with('c') && !l.starts_with('%') && !l.trim().is_empty())
        .collect();

    let header = lines
        .first()
        .ok_or_else(|| DimacsError::MalformedHeader("file was empty".to_string()))?
        .split_whitespace()
        .collect::<Vec<&str>>();

    if header.len() != 4 || header[0] != "p" || header[1] != "cnf" {
        return Err(DimacsError::MalformedHeader(format!(
            "expected 'p cnf <vars> <clauses>', got {:?}",
            lines[0]
        )));
    }
    let num_vars: usize = header[2]
        .parse()
        .map_err(|_| DimacsError::MalformedHeader(format!("bad variable count {:?}", header[2])))?;
    let num_clauses: usize = header[3]
        .parse()
        .map_err(|_| DimacsError::MalformedHeader(format!("bad clause count {:?}", header[3])))?;

    let tokens: Vec<i64> = lines[1..]
        .iter()
        .join(" ")
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i64>()
                .map_err(|_| DimacsError::MalformedClause(tok.to_string()))
        })
        .collect::<Result<_, _>>()?;

    let mut clauses: Vec<Vec<Lit>> = Vec::new();
    let mut current: Vec<Lit> = Vec::new();
    for &tok in &tokens {
        if tok == 0 {
            clauses.push(std::mem::take(&mut current));
        } else {
            let var = tok.unsigned_abs() as usize;
            if var > num_vars {
                return Err(DimacsError::VariableOutOfRange {
                    var,
                    declared: num_vars,
                });
            }
            current.push(Lit::from_dimacs(tok));
        }
    }
    if !current.is_empty() {
        return Err(DimacsError::MalformedClause(
            "final clause missing terminating 0".to_string(),
        ));
    }

    if clauses.len() != num_clauses {
        return Err(DimacsError::ClauseCountMismatch {
            declared: num_clauses,
            found: clauses.len(),
        });
    }

    for clause in clauses.iter_mut() {
        clause.sort();
        clause.dedup();
    }

    Ok(DimacsFile { num_vars, clauses })
}

pub fn solution_to_dimacs(solution: &Solution) -> String {
    match solution {
        Solution::Unsat => "s UNSATISFIABLE".to_string(),
        Solution::Unknown => "s UNKNOWN".to_string(),
        Solution::Sat(model) => {
            let mut out = String::from("s SATISFIABLE\nv ");
            for (idx, value) in model.iter().enumerate() {
                let var = idx + 1;
                out.push_str(&format!("{}{} ", if *value { "" } else { "-" }, var));
            }
            out.push_str("0");
            out
        }
    }
}

pub fn write_dimacs(num_vars: usize, clauses: &[Vec<Lit>]) -> String {
    let mut out = format!("p cnf {} {}\n", num_vars, clauses.len());
    for clause in clauses {
        for lit in clause {
            out.push_str(&format!("{} ", lit.to_dimacs()));
        }
        out.push_str("0\n");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_cnf() {
        let dimacs = clauses_from_dimacs("p cnf 2 2\n1 -2 0\n-1 2 0\n").unwrap();
        assert_eq!(dimacs.num_vars, 2);
        assert_eq!(dimacs.clauses.len(), 2);
    }

    #[test]
    fn rejects_clause_count_mismatch() {
        let err = clauses_from_dimacs("p cnf 2 3\n1 -2 0\n-1 2 0\n").unwrap_err();
        assert!(matches!(err, DimacsError::ClauseCountMismatch { .. }));
    }

    #[test]
    fn rejects_bad_header() {
        let err = clauses_from_dimacs("p wcnf 2 1\n1 0\n").unwrap_err();
        assert!(matches!(err, DimacsError::MalformedHeader(_)));
    }
}
