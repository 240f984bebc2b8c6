use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use graphlp_lang::{Compiler, FormRow, build_problem, chart_data, optimum_line, vertex_table};
use graphlp_solver::{LpProblem, Solution, SolutionStatus, Solver, TieBreak};
use tracing::{Level, info};
use tracing_subscriber::fmt::SubscriberBuilder;

#[derive(Parser)]
#[command(name = "graphlp")]
#[command(about = "Solve two-variable linear programs by the graphical method", long_about = None)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Parse a .lp2 file and output the AST
    Parse {
        /// The file to parse
        file: PathBuf,
        /// Output format
        #[arg(short, long, value_enum, default_value_t = ParseFormat::Pretty)]
        format: ParseFormat,
    },
    /// Check a .lp2 file for errors
    Check {
        /// The file to check
        file: PathBuf,
    },
    /// Solve a .lp2 file and print the vertices and the optimum
    Solve {
        /// The file containing the problem
        file: PathBuf,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Solve from raw form fields, as typed into the web form
    Form {
        /// Objective coefficient of x1 (blank or unreadable counts as 0)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        c1: String,
        /// Objective coefficient of x2 (blank or unreadable counts as 0)
        #[arg(long, default_value = "", allow_hyphen_values = true)]
        c2: String,
        /// max or min
        #[arg(short, long, default_value = "max")]
        direction: String,
        /// Constraint row as "c1,c2,relation,rhs"; incomplete rows are skipped
        #[arg(short, long = "row", allow_hyphen_values = true)]
        rows: Vec<String>,
        #[command(flatten)]
        output: OutputArgs,
    },
}

#[derive(clap::Args)]
struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value_t = SolveFormat::Table)]
    format: SolveFormat,
    /// How to pick among vertices with the same optimal value
    #[arg(long, value_enum, default_value_t = TieBreakArg::First)]
    tie_break: TieBreakArg,
    /// Keep vertices in enumeration order instead of sorting them around the region
    #[arg(long)]
    unordered: bool,
    /// Show binding constraints, slacks and alternative optima
    #[arg(short, long)]
    analysis: bool,
    /// Also print chart data (bounds, region, constraint lines) as JSON
    #[arg(long)]
    chart: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum ParseFormat {
    Pretty,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum SolveFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, ValueEnum)]
enum TieBreakArg {
    First,
    Lexicographic,
}

impl From<TieBreakArg> for TieBreak {
    fn from(arg: TieBreakArg) -> Self {
        match arg {
            TieBreakArg::First => TieBreak::FirstEncountered,
            TieBreakArg::Lexicographic => TieBreak::Lexicographic,
        }
    }
}

fn main() {
    let cli = Cli::parse();
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    SubscriberBuilder::default()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    match run(cli.command) {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when the command ran but the outcome is a failure
/// (an infeasible problem).
fn run(command: Commands) -> Result<bool> {
    match command {
        Commands::Parse { file, format } => {
            let source = read_source(&file)?;
            let program = graphlp_lang::Parser::parse(&source)
                .with_context(|| format!("Parse error in {}", file.display()))?;
            match format {
                ParseFormat::Json => println!("{}", serde_json::to_string_pretty(&program)?),
                ParseFormat::Pretty => println!("{:#?}", program),
            }
            Ok(true)
        }
        Commands::Check { file } => {
            let source = read_source(&file)?;
            let program = graphlp_lang::Parser::parse(&source)
                .with_context(|| format!("✗ {} has errors", file.display()))?;
            let problem = Compiler::new()
                .compile(&program)
                .with_context(|| format!("✗ {} has errors", file.display()))?;

            println!("✓ {} is valid", file.display());
            println!("  objective: {}", problem.objective.direction);
            println!("  {} constraints", problem.num_constraints());
            Ok(true)
        }
        Commands::Solve { file, output } => {
            info!(file = %file.display(), "solve");
            let problem = Compiler::new().compile_file(&file)?;
            solve_and_print(&problem, &output, &[])
        }
        Commands::Form {
            c1,
            c2,
            direction,
            rows,
            output,
        } => {
            let rows: Vec<FormRow> = rows.iter().map(|r| FormRow::from_csv(r)).collect();
            let form = build_problem(&c1, &c2, &direction, &rows)?;
            info!(rows = rows.len(), skipped = form.skipped_rows.len(), "form");
            solve_and_print(&form.problem, &output, &form.skipped_rows)
        }
    }
}

fn read_source(file: &Path) -> Result<String> {
    std::fs::read_to_string(file).with_context(|| format!("Error reading file {}", file.display()))
}

fn solve_and_print(problem: &LpProblem, output: &OutputArgs, skipped_rows: &[usize]) -> Result<bool> {
    let solver = Solver::new()
        .with_polygon_ordering(!output.unordered)
        .with_tie_break(output.tie_break.into());
    let solution = solver.solve(problem);

    match output.format {
        SolveFormat::Json => print_json(problem, &solution, output, skipped_rows)?,
        SolveFormat::Table => print_table(problem, &solution, output, skipped_rows)?,
    }

    Ok(solution.status == SolutionStatus::Optimal)
}

fn print_json(
    problem: &LpProblem,
    solution: &Solution,
    output: &OutputArgs,
    skipped_rows: &[usize],
) -> Result<()> {
    let mut value = serde_json::json!({
        "problem": problem,
        "solution": solution,
        "table": vertex_table(solution),
        "optimum": optimum_line(solution),
        "skipped_rows": skipped_rows,
    });
    if output.chart {
        value["chart"] = serde_json::to_value(chart_data(problem, solution))?;
    }
    println!("{}", serde_json::to_string_pretty(&value)?);
    Ok(())
}

fn print_table(
    problem: &LpProblem,
    solution: &Solution,
    output: &OutputArgs,
    skipped_rows: &[usize],
) -> Result<()> {
    println!(
        "Objective: {} {}x1 + {}x2",
        problem.objective.direction, problem.objective.c1, problem.objective.c2
    );
    for c in &problem.constraints {
        println!("  {:12} {}", c.name, c);
    }
    for row in skipped_rows {
        println!("  (row {} skipped: incomplete)", row);
    }
    println!();

    match solution.status {
        SolutionStatus::Optimal => println!("Status: OPTIMAL"),
        SolutionStatus::Infeasible => println!("Status: INFEASIBLE"),
    }
    if !solution.evaluations.is_empty() {
        println!();
        println!("  {:>6} {:>10} {:>10} {:>10}", "Vertex", "x1", "x2", "Z");
        for row in vertex_table(solution) {
            println!("  {:>6} {:>10} {:>10} {:>10}", row.label, row.x, row.y, row.z);
        }
    }
    println!();
    println!("{}", optimum_line(solution));

    if output.analysis && solution.is_feasible() {
        let analysis = &solution.analysis;
        println!();
        println!("Analysis:");
        println!();

        if !analysis.binding_constraints.is_empty() {
            println!("Binding constraints:");
            for name in &analysis.binding_constraints {
                println!("  - {}", name);
            }
            println!();
        }

        println!("Slacks:");
        for s in &analysis.slacks {
            println!("  {:12} lhs {:10.4}  rhs {:10.4}  slack {:10.4}", s.constraint, s.lhs, s.rhs, s.slack);
        }

        if !analysis.alternative_optima.is_empty() {
            println!();
            println!("Alternative optima (same Z):");
            for p in &analysis.alternative_optima {
                println!("  x1={:.2}, x2={:.2}", p.x, p.y);
            }
        }
    }

    if output.chart {
        println!();
        println!("{}", serde_json::to_string_pretty(&chart_data(problem, solution))?);
    }
    Ok(())
}
