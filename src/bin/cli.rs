use std::time::Duration;

use clap::Parser;
use log::info;
use prettytable::{row, Table};
use walkdir::WalkDir;

use cascade_sat::dimacs::{clauses_from_dimacs_file, solution_to_dimacs};
use cascade_sat::solver::{Config, Solution, Solver};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// A single DIMACS file, or (with --batch) a directory to walk
    #[arg(index = 1)]
    file: String,

    /// Output path for the solution (ignored in --batch mode)
    #[arg(short, long, help = "Output path for solution")]
    out: Option<String>,

    /// JSON configuration object (see README / SPEC_FULL.md §6)
    #[arg(short, long)]
    config: Option<String>,

    /// Wall-clock time limit in seconds (0 = unlimited), applied per file
    #[arg(short, long, default_value_t = 0)]
    time_limit: u64,

    /// Treat `file` as a directory and solve every *.cnf/*.cnf.gz file in it
    #[arg(short, long, default_value_t = false)]
    batch: bool,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => {
            let text = std::fs::read_to_string(path).expect("failed to read config file");
            Config::from_json_str(&text).expect("invalid config JSON")
        }
        None => Config::default(),
    };

    if args.batch {
        run_batch(&args, &config);
        return;
    }

    let cnf = clauses_from_dimacs_file(&args.file).expect("failed to parse DIMACS file");
    info!("parsed {} vars, {} clauses", cnf.num_vars, cnf.clauses.len());

    let mut solver = Solver::new(config);
    for _ in 0..cnf.num_vars {
        solver.new_variable(true);
    }
    for clause in &cnf.clauses {
        solver.add_clause(clause.clone());
    }

    let solution = solver.solve(vec![], Duration::from_secs(args.time_limit));
    let output = create_output(&args, &solution, &solver);
    println!("{output}");

    if let Some(out_path) = &args.out {
        std::fs::write(out_path, solution_to_dimacs(&solution)).expect("failed to write output");
    }
}

/// Walks `args.file` as a directory, solving every `.cnf`/`.cnf.gz` file
/// found and printing a summary table. Used to run a solver configuration
/// across a benchmark suite without a surrounding shell script.
fn run_batch(args: &Args, config: &Config) {
    let mut table = Table::new();
    table.set_titles(row![b -> "File", "Result", "Conflicts", "Time (s)"]);

    for entry in WalkDir::new(&args.file)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
    {
        let path = entry.path();
        let name = path.to_string_lossy().to_string();
        if !(name.ends_with(".cnf") || name.ends_with(".cnf.gz")) {
            continue;
        }

        let cnf = match clauses_from_dimacs_file(&name) {
            Ok(cnf) => cnf,
            Err(e) => {
                table.add_row(row![name, format!("parse error: {e}"), "-", "-"]);
                continue;
            }
        };

        let mut solver = Solver::new(config.clone());
        for _ in 0..cnf.num_vars {
            solver.new_variable(true);
        }
        for clause in &cnf.clauses {
            solver.add_clause(clause.clone());
        }
        let solution = solver.solve(vec![], Duration::from_secs(args.time_limit));
        let result = match solution {
            Solution::Sat(_) => "SAT",
            Solution::Unsat => "UNSAT",
            Solution::Unknown => "UNKNOWN",
        };
        table.add_row(row![
            name,
            result,
            solver.stats().num_conflicts,
            format!("{:.3}", solver.stats().time.as_secs_f32())
        ]);
    }

    table.printstd();
}

fn create_output(args: &Args, solution: &Solution, solver: &Solver) -> String {
    let mut out = format!("c {BANNER}");
    out.push_str(&format!("\nFile\n{}\n", args.file));
    out.push_str(&format!("\n{}\n", solver.stats().to_table()));
    match solution {
        Solution::Sat(_) => out.push_str("Satisfiable\n"),
        Solution::Unsat => out.push_str("Unsatisfiable\n"),
        Solution::Unknown => out.push_str("Unknown (budget or time limit reached)\n"),
    }
    out = out.replace('\n', "\nc ");
    out.push_str(&format!("\n{}", solution_to_dimacs(solution)));
    out
}

const BANNER: &str = r#"
                                  _
   ___ __ _ ___  ___ __ _  __| | ___
  / __/ _` / __|/ __/ _` |/ _` |/ _ \
 | (_| (_| \__ \ (_| (_| | (_| |  __/
  \___\__,_|___/\___\__,_|\__,_|\___|
"#;
