use clap::Parser;
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tube_sort_solver::config::SolverConfig;
use tube_sort_solver::engine::Tube;
use tube_sort_solver::session::Session;
use tube_sort_solver::utils::parse_puzzle;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to the puzzle file (JSON tube records or one tube per line)
    puzzle_file: PathBuf,

    /// Solver configuration file (TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many solver iterations
    #[clap(short, long)]
    max_iterations: Option<usize>,

    /// Print the result as JSON
    #[clap(long)]
    json: bool,
}

fn read_puzzle_file(path: &PathBuf) -> Result<Vec<Tube>, String> {
    let content = fs::read_to_string(path).map_err(|e| format!("Failed to read file: {}", e))?;
    parse_puzzle(&content).map_err(|e| format!("Invalid puzzle format: {}", e))
}

fn load_config(args: &Args) -> Result<SolverConfig, String> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::load(path).map_err(|e| e.to_string())?,
        None => SolverConfig::default(),
    };
    if args.max_iterations.is_some() {
        config.max_iterations = args.max_iterations;
    }
    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

fn main() -> ExitCode {
    env_logger::init();
    let args = Args::parse();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    };
    let tubes = match read_puzzle_file(&args.puzzle_file) {
        Ok(tubes) => tubes,
        Err(e) => {
            eprintln!("Failed to read puzzle from {}: {}", args.puzzle_file.display(), e);
            return ExitCode::FAILURE;
        }
    };

    let mut session = Session::new(tubes, config);
    if !args.json {
        println!("Loaded puzzle from {}\n", args.puzzle_file.display());
        println!("Initial state:\n{}\n", session.current());
        println!("Searching for a solution...\n");
    }

    let solution = session.solve();

    if args.json {
        let output = match &solution {
            Some(solution) => serde_json::json!({ "status": "success", "solution": solution }),
            None => serde_json::json!({ "status": "failure", "message": "No solution found" }),
        };
        println!("{}", output);
        return if solution.is_some() {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        };
    }

    match solution {
        Some(solution) => {
            println!("Solution found:\n");
            println!("Moves ({}):", solution.moves.len());
            if solution.moves.is_empty() {
                println!("  No moves needed.");
            } else {
                for (i, mv) in solution.moves.iter().enumerate() {
                    println!("  Move {}: {}", i + 1, mv);
                }
            }
            println!(
                "States visited: {}, backtracks: {}\n",
                solution.states_visited, solution.backtracks
            );
            ExitCode::SUCCESS
        }
        None => {
            println!("No solution found.\n");
            ExitCode::FAILURE
        }
    }
}
