use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::Verbosity;
use serde_json::json;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use tableau_lang::Compiler;
use tableau_solver::{CanonicalTableau, Cell, LpProblem, Outcome, Solver, MAX_PRECISION};

#[derive(Parser)]
#[command(name = "tableau")]
#[command(about = "Solve linear programs with the tableau simplex method", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    verbose: Verbosity,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a problem file and print the optimal vertex
    Solve {
        /// The problem file
        file: PathBuf,
        /// Fractional digits kept in reported values
        #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_PRECISION)))]
        precision: u32,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Solve a canonical table given as JSON rows
    Tableau {
        /// JSON file holding `[[c1, ..., cn, "max"], [a1, ..., an, b], ...]`
        file: PathBuf,
        #[arg(short, long, default_value_t = 8, value_parser = clap::value_parser!(u32).range(0..=i64::from(MAX_PRECISION)))]
        precision: u32,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Parse a problem file and output the AST
    Parse {
        /// The file to parse
        file: PathBuf,
        #[arg(short, long, value_enum, default_value_t = Format::Pretty)]
        format: Format,
    },
    /// Check a problem file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    Pretty,
    Json,
}

/// Malformed input or a solver failure
const EXIT_ERROR: u8 = 2;

fn main() -> ExitCode {
    let cli = Cli::parse();

    env_logger::Builder::new()
        .filter_level(cli.verbose.log_level_filter())
        .init();

    let result = match cli.command {
        Commands::Solve {
            file,
            precision,
            format,
        } => solve_file(&file, precision, format),
        Commands::Tableau {
            file,
            precision,
            format,
        } => solve_json(&file, precision, format),
        Commands::Parse { file, format } => parse_file(&file, format),
        Commands::Check { file } => check_file(&file),
    };

    match result {
        Ok(code) => code,
        Err(message) => {
            eprintln!("{message}");
            ExitCode::from(EXIT_ERROR)
        }
    }
}

fn read_source(file: &Path) -> Result<String, String> {
    std::fs::read_to_string(file).map_err(|e| format!("Error reading {}: {}", file.display(), e))
}

fn solve_file(file: &Path, precision: u32, format: Format) -> Result<ExitCode, String> {
    let problem = tableau_lang::load_file(file).map_err(|e| format!("Compile error: {e}"))?;
    log::debug!(
        "compiled {}: {} variables, {} constraints",
        file.display(),
        problem.num_variables(),
        problem.num_constraints()
    );

    let outcome = Solver::new()
        .with_precision(precision)
        .solve(&problem)
        .map_err(|e| format!("Solver error: {e}"))?;

    report(&outcome, &problem.variables, Some(&problem), format);
    Ok(exit_code(&outcome))
}

fn solve_json(file: &Path, precision: u32, format: Format) -> Result<ExitCode, String> {
    let source = read_source(file)?;
    let rows: Vec<Vec<Cell>> =
        serde_json::from_str(&source).map_err(|e| format!("Invalid JSON in {}: {}", file.display(), e))?;
    let tableau = CanonicalTableau::from_rows(rows).map_err(|e| format!("Invalid tableau: {e}"))?;

    let outcome = Solver::new()
        .with_precision(precision)
        .solve_tableau(&tableau)
        .map_err(|e| format!("Solver error: {e}"))?;

    let names: Vec<String> = (1..=tableau.num_variables()).map(|i| format!("x{i}")).collect();
    report(&outcome, &names, None, format);
    Ok(exit_code(&outcome))
}

fn parse_file(file: &Path, format: Format) -> Result<ExitCode, String> {
    let source = read_source(file)?;
    let program = tableau_lang::Parser::parse(&source).map_err(|e| format!("Parse error: {e}"))?;

    match format {
        Format::Json => {
            let text = serde_json::to_string_pretty(&program).map_err(|e| format!("Error encoding AST: {e}"))?;
            println!("{text}");
        }
        Format::Pretty => println!("{:#?}", program),
    }
    Ok(ExitCode::SUCCESS)
}

fn check_file(file: &Path) -> Result<ExitCode, String> {
    let checked = read_source(file).and_then(|source| {
        let program = tableau_lang::Parser::parse(&source).map_err(|e| e.to_string())?;
        let problem = Compiler::new().compile(&program).map_err(|e| e.to_string())?;
        Ok((program, problem))
    });

    match checked {
        Ok((program, problem)) => {
            println!("✓ {} is valid", file.display());
            println!("  objective: {}", program.objective.sense);
            println!("  {} variables", problem.num_variables());
            println!("  {} constraints", problem.num_constraints());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            eprintln!("✗ {} has errors:", file.display());
            eprintln!("  {}", e);
            Ok(ExitCode::from(EXIT_ERROR))
        }
    }
}

fn exit_code(outcome: &Outcome) -> ExitCode {
    match outcome {
        Outcome::Optimal(_) => ExitCode::SUCCESS,
        Outcome::Infeasible | Outcome::Unbounded => ExitCode::FAILURE,
    }
}

fn report(outcome: &Outcome, names: &[String], problem: Option<&LpProblem>, format: Format) {
    let tolerance = 1e-6;
    let violations = match (outcome, problem) {
        (Outcome::Optimal(solution), Some(problem)) => problem.violations(&solution.values, tolerance),
        _ => Vec::new(),
    };

    if format == Format::Json {
        let report = json!({
            "status": outcome.status(),
            "solution": outcome.solution(),
            "variables": names,
            "violations": violations,
        });
        println!("{report:#}");
        return;
    }

    println!("Status: {}", outcome.status());
    match outcome {
        Outcome::Optimal(solution) => {
            println!("Objective: {}", solution.objective_value);
            println!("Iterations: {}", solution.iterations);
            println!();
            println!("Variables:");
            for (name, value) in names.iter().zip(&solution.values) {
                println!("  {:10} {:>14}", name, value);
            }

            if let Some(problem) = problem {
                println!();
                if violations.is_empty() {
                    println!("All {} constraints satisfied.", problem.num_constraints());
                } else {
                    println!("Violated constraints:");
                    for v in &violations {
                        println!(
                            "  {:10} {} {} (actual {}, off by {})",
                            v.constraint, v.relation, v.required, v.actual, v.amount
                        );
                    }
                }
            }
        }
        Outcome::Infeasible => println!("No solution exists that satisfies all constraints."),
        Outcome::Unbounded => println!("The problem has no finite optimal solution."),
    }
}
