use log::{debug, info, warn};
use serde::Serialize;
use std::rc::Rc;

use crate::config::SolverConfig;
use crate::engine::{apply_move_to_tubes, is_completed, DeadEnds, Fingerprint, GameState, Move, Tube};
use crate::heuristics::top_moves;

/// Represents a solution found by the solver.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Solution {
    /// Moves to play, in order, from the state the solver started on.
    pub moves: Vec<Move>,
    /// Number of distinct steps forward the solver took, including abandoned ones.
    pub states_visited: usize,
    /// Number of times the solver stepped back to a parent state.
    pub backtracks: usize,
}

/// Lists every legal move, offering at most one empty tube as a destination.
///
/// Empty tubes are interchangeable, so only the first one is kept as a
/// candidate destination; every reachable state stays reachable.
pub fn candidate_moves(tubes: &[Tube]) -> Vec<Move> {
    let representative = tubes.iter().position(Tube::is_empty);
    let destinations: Vec<&Tube> = tubes
        .iter()
        .enumerate()
        .filter(|(i, tube)| !tube.is_empty() || Some(*i) == representative)
        .map(|(_, tube)| tube)
        .collect();

    let mut moves = Vec::new();
    for from in tubes {
        for to in &destinations {
            if Move::is_possible(from, to) {
                moves.push(Move::new(from.name(), to.name()));
            }
        }
    }
    moves
}

/// True if any ordered pair of tubes forms a legal move.
pub fn has_any_legal_move(tubes: &[Tube]) -> bool {
    tubes
        .iter()
        .any(|from| tubes.iter().any(|to| Move::is_possible(from, to)))
}

/// Counts every legal ordered pair, empty tubes included.
pub fn count_legal_moves(tubes: &[Tube]) -> usize {
    tubes
        .iter()
        .map(|from| tubes.iter().filter(|to| Move::is_possible(from, to)).count())
        .sum()
}

/// Expands the candidate moves of `tubes` with one-ply dead-end pruning.
///
/// Each candidate is played on a copy. A result with no legal move that is not
/// completed is recorded in `dead_ends` and dropped; results already known to be
/// dead ends are dropped too. Survivors are returned with their resulting tubes,
/// in candidate order.
///
/// # Panics
/// Panics if a candidate that passed `Move::is_possible` is rejected when
/// replayed on the copy, which means the enumerator and the engine disagree.
pub fn expand_moves(tubes: &[Tube], dead_ends: &mut DeadEnds) -> Vec<(Move, Vec<Tube>)> {
    let mut expanded = Vec::new();
    for mv in candidate_moves(tubes) {
        let next = apply_move_to_tubes(tubes, &mv)
            .unwrap_or_else(|err| panic!("candidate move {mv} rejected on replay: {err}"));
        let fingerprint = Fingerprint::of(&next);
        if dead_ends.contains(&fingerprint) {
            continue;
        }
        if !is_completed(&next) && !has_any_legal_move(&next) {
            debug!("move {} leads to a dead end", mv);
            dead_ends.insert(fingerprint);
            continue;
        }
        expanded.push((mv, next));
    }
    expanded
}

/// Legal moves from `tubes` that do not lead into a known or newly found dead end.
pub fn legal_moves(tubes: &[Tube], dead_ends: &mut DeadEnds) -> Vec<Move> {
    expand_moves(tubes, dead_ends)
        .into_iter()
        .map(|(mv, _)| mv)
        .collect()
}

/// Solves the puzzle greedily from `start`, backtracking one level at a time.
///
/// The solver always plays the best-ranked move from [`top_moves`]. When a state
/// has no candidate left it is recorded in `dead_ends` and the solver steps back
/// to its parent, where that child is now excluded. Running out of candidates at
/// the starting state means no solution was found.
///
/// The search runs on a detached copy of `start`, so it never steps back past
/// the position it was asked to solve. `dead_ends` is shared with the caller and
/// only grows.
///
/// This is not an exhaustive search: a puzzle solvable by another move order
/// can still come back as `None`. `config.max_iterations`, when set, bounds the
/// number of iterations; hitting it also returns `None`.
///
/// # Returns
/// `Some(Solution)` with an empty move list if `start` is already completed,
/// `Some(Solution)` with the moves to play on success, `None` otherwise.
pub fn solve(start: &GameState, dead_ends: &mut DeadEnds, config: &SolverConfig) -> Option<Solution> {
    let mut cursor = GameState::root(start.tubes().to_vec());
    let mut states_visited = 1;
    let mut backtracks = 0;
    let mut iterations = 0;

    loop {
        if cursor.is_completed() {
            info!(
                "solved in {} moves ({} states visited, {} backtracks)",
                cursor.depth(),
                states_visited,
                backtracks
            );
            return Some(Solution {
                moves: cursor.moves().to_vec(),
                states_visited,
                backtracks,
            });
        }

        if let Some(limit) = config.max_iterations {
            if iterations >= limit {
                warn!("solver stopped after {} iterations without a solution", limit);
                return None;
            }
        }
        iterations += 1;

        let best = top_moves(&cursor, dead_ends, config).into_iter().next();
        match best {
            Some(best) => {
                cursor = GameState::transition(&cursor, &best.mv)
                    .unwrap_or_else(|err| panic!("ranked move {} rejected: {err}", best.mv));
                states_visited += 1;
            }
            None => {
                dead_ends.insert(cursor.fingerprint());
                let parent = cursor.parent().map(Rc::clone);
                match parent {
                    Some(parent) => {
                        debug!("backtracking from depth {}", cursor.depth());
                        cursor = parent;
                        backtracks += 1;
                    }
                    None => {
                        info!(
                            "no solution found ({} states visited, {} dead ends known)",
                            states_visited,
                            dead_ends.len()
                        );
                        return None;
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::{random_puzzle, tubes_from_str_array};

    fn play(tubes: &[Tube], moves: &[Move]) -> Vec<Tube> {
        moves.iter().fold(tubes.to_vec(), |current, mv| {
            apply_move_to_tubes(&current, mv).unwrap()
        })
    }

    #[test]
    fn test_candidate_moves_offer_one_empty_tube() {
        let tubes =
            tubes_from_str_array(&["R R B B", "G G O O", ". . . .", ". . . ."]).unwrap();
        let moves = candidate_moves(&tubes);
        assert_eq!(
            moves,
            vec![Move::new("Tube1", "Tube3"), Move::new("Tube2", "Tube3")],
            "only the first empty tube should be a destination"
        );
    }

    #[test]
    fn test_legal_moves_prunes_dead_end_children() {
        // Pouring B B into the spare leaves three tubes with mismatched tops.
        let tubes = tubes_from_str_array(&["R R B B", "G G O O", ". . . ."]).unwrap();
        let mut dead_ends = DeadEnds::new();
        let moves = legal_moves(&tubes, &mut dead_ends);
        assert!(moves.is_empty(), "both pours end in dead ends: {:?}", moves);
        assert_eq!(dead_ends.len(), 2);

        let dead = play(&tubes, &[Move::new("Tube1", "Tube3")]);
        assert!(dead_ends.contains(&Fingerprint::of(&dead)));
    }

    #[test]
    fn test_legal_moves_skips_known_dead_ends() {
        let tubes = tubes_from_str_array(&["R R B B", "B B R R", ". . . ."]).unwrap();
        let mut dead_ends = DeadEnds::new();
        assert_eq!(legal_moves(&tubes, &mut dead_ends).len(), 2);

        let first = play(&tubes, &[Move::new("Tube1", "Tube3")]);
        dead_ends.insert(Fingerprint::of(&first));
        assert_eq!(
            legal_moves(&tubes, &mut dead_ends),
            vec![Move::new("Tube2", "Tube3")]
        );
    }

    #[test]
    fn test_legal_moves_keeps_completing_moves() {
        let tubes = tubes_from_str_array(&["R R R .", "R . . .", ". . . ."]).unwrap();
        let mut dead_ends = DeadEnds::new();
        let moves = legal_moves(&tubes, &mut dead_ends);
        assert_eq!(moves.len(), 2);
        assert!(dead_ends.is_empty());
    }

    #[test]
    fn test_count_legal_moves() {
        let tubes = tubes_from_str_array(&["R R B B", "B B R R", ". . . .", ". . . ."]).unwrap();
        // Each mixed tube can pour into either spare.
        assert_eq!(count_legal_moves(&tubes), 4);
        assert!(has_any_legal_move(&tubes));

        let stuck = tubes_from_str_array(&["R B G Y", "P O Gr LB"]).unwrap();
        assert_eq!(count_legal_moves(&stuck), 0);
        assert!(!has_any_legal_move(&stuck));
    }

    #[test]
    fn test_solve_already_solved() {
        let tubes = tubes_from_str_array(&["R R R R", "B B B B", ". . . .", ". . . ."]).unwrap();
        let root = GameState::root(tubes);
        let mut dead_ends = DeadEnds::new();
        let solution = solve(&root, &mut dead_ends, &SolverConfig::default()).unwrap();
        assert!(solution.moves.is_empty());
        assert_eq!(solution.backtracks, 0);
    }

    #[test]
    fn test_solve_simple_puzzle() {
        let tubes = tubes_from_str_array(&["R R B B", "B B R R", ". . . ."]).unwrap();
        let root = GameState::root(tubes.clone());
        let mut dead_ends = DeadEnds::new();
        let solution = solve(&root, &mut dead_ends, &SolverConfig::default()).unwrap();

        assert_eq!(
            solution.moves,
            vec![
                Move::new("Tube1", "Tube3"),
                Move::new("Tube2", "Tube1"),
                Move::new("Tube2", "Tube3"),
            ]
        );
        assert!(is_completed(&play(&tubes, &solution.moves)));
    }

    #[test]
    fn test_solve_reports_unsolvable_root() {
        let tubes = tubes_from_str_array(&["R B G Y", "P O Gr LB", "Pk Br Mh LG"]).unwrap();
        let root = GameState::root(tubes);
        let mut dead_ends = DeadEnds::new();
        assert!(solve(&root, &mut dead_ends, &SolverConfig::default()).is_none());
        assert!(dead_ends.contains(&root.fingerprint()));
    }

    #[test]
    fn test_solve_starts_from_given_state_not_history() {
        let tubes = tubes_from_str_array(&["R R B B", "B B R R", ". . . ."]).unwrap();
        let root = GameState::root(tubes);
        let played = GameState::transition(&root, &Move::new("Tube1", "Tube3")).unwrap();
        let mut dead_ends = DeadEnds::new();
        let solution = solve(&played, &mut dead_ends, &SolverConfig::default()).unwrap();
        assert_eq!(
            solution.moves,
            vec![Move::new("Tube2", "Tube1"), Move::new("Tube2", "Tube3")]
        );
    }

    #[test]
    fn test_solve_respects_iteration_limit() {
        let tubes = random_puzzle(6, 2, 7);
        let root = GameState::root(tubes);
        let config = SolverConfig {
            max_iterations: Some(1),
            ..SolverConfig::default()
        };
        let mut dead_ends = DeadEnds::new();
        assert!(solve(&root, &mut dead_ends, &config).is_none());
    }

    #[test]
    fn test_solve_is_deterministic() {
        let config = SolverConfig {
            max_iterations: Some(20_000),
            ..SolverConfig::default()
        };
        for seed in 0..5 {
            let tubes = random_puzzle(5, 2, seed);
            let root = GameState::root(tubes.clone());

            let first = solve(&root, &mut DeadEnds::new(), &config);
            let second = solve(&root, &mut DeadEnds::new(), &config);
            assert_eq!(first, second, "seed {seed} gave different outcomes");

            if let Some(solution) = first {
                assert!(
                    is_completed(&play(&tubes, &solution.moves)),
                    "seed {seed} solution does not complete the puzzle"
                );
            }
        }
    }
}
