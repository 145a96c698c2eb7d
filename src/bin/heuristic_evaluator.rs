use clap::Parser;
use tube_sort_solver::config::SolverConfig;
use tube_sort_solver::engine::{DeadEnds, GameState};
use tube_sort_solver::solver::solve;
use tube_sort_solver::utils::random_puzzle;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Number of generated puzzles to solve
    #[clap(short = 'n', long, default_value_t = 20)]
    count: u64,

    /// Seed of the first puzzle; the others use consecutive seeds
    #[clap(short, long, default_value_t = 0)]
    start_seed: u64,

    /// Number of colors per puzzle
    #[clap(short, long, default_value_t = 8)]
    colors: usize,

    /// Number of empty tubes per puzzle
    #[clap(short, long, default_value_t = 2)]
    empty_tubes: usize,

    /// Solver iteration cap per puzzle
    #[clap(short, long, default_value_t = 100_000)]
    max_iterations: usize,
}

fn main() {
    env_logger::init();
    let args = Args::parse();
    let config = SolverConfig {
        max_iterations: Some(args.max_iterations.max(1)),
        ..SolverConfig::default()
    };

    println!(
        "Starting heuristic evaluation for {} puzzles ({} colors, {} empty tubes)...",
        args.count, args.colors, args.empty_tubes
    );

    let mut solved = 0u64;
    let mut total_moves = 0usize;
    let mut total_backtracks = 0usize;

    for puzzle_idx in 0..args.count {
        let seed = args.start_seed + puzzle_idx;
        let root = GameState::root(random_puzzle(args.colors, args.empty_tubes, seed));
        let mut dead_ends = DeadEnds::new();

        match solve(&root, &mut dead_ends, &config) {
            Some(solution) => {
                solved += 1;
                total_moves += solution.moves.len();
                total_backtracks += solution.backtracks;
                println!(
                    "  Puzzle {:<4} (Seed: {:<6}) solved: {:<4} moves, {:<6} backtracks",
                    puzzle_idx,
                    seed,
                    solution.moves.len(),
                    solution.backtracks
                );
            }
            None => println!(
                "  Puzzle {:<4} (Seed: {:<6}) unsolved, {} dead ends recorded",
                puzzle_idx,
                seed,
                dead_ends.len()
            ),
        }
    }

    println!("\n--- Evaluation Complete ---");
    println!("Number of puzzles evaluated: {}", args.count);
    if args.count == 0 {
        return;
    }
    println!(
        "Solved: {} ({:.1}%)",
        solved,
        solved as f64 * 100.0 / args.count as f64
    );
    if solved > 0 {
        println!(
            "Average solution length: {:.2} moves",
            total_moves as f64 / solved as f64
        );
        println!(
            "Average backtracks per solved puzzle: {:.2}",
            total_backtracks as f64 / solved as f64
        );
    }
}
