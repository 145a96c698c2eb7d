use clap::Parser;
use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use tube_sort_solver::config::SolverConfig;
use tube_sort_solver::session::Session;
use tube_sort_solver::utils::{default_puzzle, parse_puzzle};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Puzzle file to play; the built-in puzzle is used when omitted
    #[clap(short, long)]
    puzzle: Option<PathBuf>,

    /// Solver configuration file (TOML)
    #[clap(short, long)]
    config: Option<PathBuf>,
}

/// Accepts a tube name or a 1-based tube index.
fn resolve_tube(session: &Session, token: &str) -> Option<String> {
    let tubes = session.current().tubes();
    if let Some(tube) = tubes.iter().find(|tube| tube.name() == token) {
        return Some(tube.name().to_string());
    }
    token
        .parse::<usize>()
        .ok()
        .and_then(|index| index.checked_sub(1))
        .and_then(|index| tubes.get(index))
        .map(|tube| tube.name().to_string())
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => match SolverConfig::load(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{}", e);
                return;
            }
        },
        None => SolverConfig::default(),
    };
    let tubes = match &args.puzzle {
        Some(path) => {
            let parsed = fs::read_to_string(path)
                .map_err(|e| e.to_string())
                .and_then(|content| parse_puzzle(&content).map_err(|e| e.to_string()));
            match parsed {
                Ok(tubes) => tubes,
                Err(e) => {
                    eprintln!("Failed to read puzzle from {}: {}", path.display(), e);
                    return;
                }
            }
        }
        None => default_puzzle(),
    };

    let mut session = Session::new(tubes, config);
    println!("Welcome to Tube Sort!");

    loop {
        println!("---------------------");
        println!("Moves: {}", session.current().depth());
        println!("{}", session.current());

        if session.current().is_completed() {
            println!();
            println!("---------------------");
            println!("🎉 PUZZLE SOLVED! 🎉");
            println!("Total moves: {}", session.current().depth());
            for (i, mv) in session.current().moves().iter().enumerate() {
                println!("  {}. {}", i + 1, mv);
            }
            println!("---------------------");
            break;
        }

        print!("Enter your move (from to), 'h' for hints, 's' to solve, 'u' to undo, 'q' to quit: ");
        if io::stdout().flush().is_err() {
            break;
        }

        let mut input = String::new();
        match io::stdin().read_line(&mut input) {
            Ok(0) => break,
            Ok(_) => {}
            Err(_) => {
                println!("Error reading input. Please try again.");
                continue;
            }
        }

        match input.trim() {
            "q" => {
                println!("Thanks for playing!");
                break;
            }
            "u" => {
                if session.current().parent().is_none() {
                    println!("Cannot undo further (already at the starting position).");
                    continue;
                }
                let report = session.undo_move();
                println!("Move undone.");
                if report.dead_end {
                    println!("No useful moves from here either; consider undoing again.");
                }
            }
            "h" => {
                let hints = session.top_moves();
                if hints.is_empty() {
                    println!("No useful moves left. Try undoing.");
                }
                for (i, hint) in hints.iter().enumerate() {
                    let marker = if hint.completed { " (solves the puzzle)" } else { "" };
                    println!("  {}. {}  score {:.1}{}", i + 1, hint.mv, hint.score, marker);
                }
            }
            "s" => match session.solve() {
                Some(solution) => {
                    println!("Solution from here ({} moves):", solution.moves.len());
                    for (i, mv) in solution.moves.iter().enumerate() {
                        println!("  {}. {}", i + 1, mv);
                    }
                }
                None => println!("No solution found from this position."),
            },
            other => {
                let parts: Vec<&str> = other.split_whitespace().collect();
                if parts.len() != 2 {
                    println!("Invalid input format. Use 'from to', 'h', 's', 'u', or 'q'.");
                    continue;
                }
                let (Some(from), Some(to)) =
                    (resolve_tube(&session, parts[0]), resolve_tube(&session, parts[1]))
                else {
                    println!("Unknown tube. Use a tube name or its number.");
                    continue;
                };
                match session.apply_move(&from, &to) {
                    Ok(report) => {
                        println!("Move processed.");
                        if report.dead_end {
                            println!("Dead end: no useful moves remain. Undo with 'u'.");
                        }
                    }
                    Err(e) => println!("Invalid move: {}.", e),
                }
            }
        }
    }
}
