//! Heuristic ranking of candidate moves.
//!
//! Colors are scored by how close to the top of their tubes they sit, with a
//! penalty for interleaved stacks. A candidate move is then scored by how many
//! moves the resulting state allows plus how valuable its source tube is, with a
//! penalty for spending an empty tube. These scores feed both the move hints
//! shown to a player and the greedy solver.
use log::debug;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;

use crate::config::SolverConfig;
use crate::engine::{is_completed, Color, DeadEnds, GameState, Move, Tube};
use crate::solver::{count_legal_moves, expand_moves};

/// Score deducted from both colors of a mismatched adjacent pair near the top.
pub const INTERLEAVE_PENALTY: f64 = 0.5;

/// A ranked candidate move together with the state it leads to.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ScoredMove {
    #[serde(rename = "move")]
    pub mv: Move,
    /// Tubes after playing the move.
    pub tubes: Vec<Tube>,
    /// True if the move finishes the puzzle.
    pub completed: bool,
    pub score: f64,
}

/// Value of a unit `depth` slots below the top of its tube (0 is the top slot).
pub fn position_score(depth: usize) -> f64 {
    match depth {
        0 => 4.0,
        1 => 2.0,
        2 => 1.0,
        _ => -1.0,
    }
}

/// Computes the global score of every color present in `tubes`.
///
/// Each tube is read from its physical top slot downwards, so a unit sitting low
/// in a half-empty tube counts as deep. Every unit adds [`position_score`] of its
/// depth to its color. For each adjacent pair of filled, differently colored
/// slots among the top three positions, both colors lose [`INTERLEAVE_PENALTY`].
///
/// # Arguments
/// * `tubes`: The tubes of the state being scored.
///
/// # Returns
/// A map from each present color to its summed score.
pub fn color_scores(tubes: &[Tube]) -> HashMap<Color, f64> {
    let mut scores: HashMap<Color, f64> = HashMap::new();
    for tube in tubes {
        let from_top: Vec<Option<Color>> = tube.slots().iter().rev().copied().collect();

        for (depth, slot) in from_top.iter().enumerate() {
            if let Some(color) = slot {
                *scores.entry(*color).or_insert(0.0) += position_score(depth);
            }
        }

        for pair in from_top[..3].windows(2) {
            if let (Some(upper), Some(lower)) = (pair[0], pair[1]) {
                if upper != lower {
                    *scores.entry(upper).or_insert(0.0) -= INTERLEAVE_PENALTY;
                    *scores.entry(lower).or_insert(0.0) -= INTERLEAVE_PENALTY;
                }
            }
        }
    }
    scores
}

/// Sums the global scores of the colors held by `tube`.
pub fn tube_score(tube: &Tube, scores: &HashMap<Color, f64>) -> f64 {
    tube.slots()
        .iter()
        .flatten()
        .map(|color| scores.get(color).copied().unwrap_or(0.0))
        .sum()
}

/// Scores a candidate move.
///
/// The score is the number of legal moves in the resulting state, plus the
/// pre-move score of the source tube, minus `config.empty_destination_penalty`
/// when the destination tube was empty.
///
/// # Arguments
/// * `before`: Tubes before the move.
/// * `mv`: The move being scored.
/// * `after`: Tubes after the move.
/// * `scores`: Color scores of `before`, from [`color_scores`].
/// * `config`: Supplies the empty-destination penalty.
pub fn score_move(
    before: &[Tube],
    mv: Move,
    after: Vec<Tube>,
    scores: &HashMap<Color, f64>,
    config: &SolverConfig,
) -> ScoredMove {
    let source_score = before
        .iter()
        .find(|tube| tube.name() == mv.from)
        .map_or(0.0, |tube| tube_score(tube, scores));
    let destination_was_empty = before
        .iter()
        .find(|tube| tube.name() == mv.to)
        .is_some_and(Tube::is_empty);

    let mut score = count_legal_moves(&after) as f64 + source_score;
    if destination_was_empty {
        score -= config.empty_destination_penalty;
    }

    ScoredMove {
        completed: is_completed(&after),
        mv,
        tubes: after,
        score,
    }
}

/// Orders candidates: completing moves first, then by descending score.
///
/// The sort is stable, so equal candidates keep enumeration order.
pub fn rank_moves(moves: &mut [ScoredMove]) {
    moves.sort_by(|a, b| {
        b.completed
            .cmp(&a.completed)
            .then_with(|| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal))
    });
}

/// Returns the best candidate moves from `state`, best first.
///
/// Candidates come from [`expand_moves`], so moves into known or newly found
/// dead ends are excluded (and newly found ones are recorded). At most
/// `config.max_candidates` moves are returned.
///
/// A completed state returns an empty list and records nothing. A state that is
/// not completed and has no candidate is itself recorded as a dead end.
pub fn top_moves(state: &GameState, dead_ends: &mut DeadEnds, config: &SolverConfig) -> Vec<ScoredMove> {
    if state.is_completed() {
        return Vec::new();
    }

    let tubes = state.tubes();
    let scores = color_scores(tubes);
    let mut ranked: Vec<ScoredMove> = expand_moves(tubes, dead_ends)
        .into_iter()
        .map(|(mv, after)| score_move(tubes, mv, after, &scores, config))
        .collect();

    if ranked.is_empty() {
        if dead_ends.insert(state.fingerprint()) {
            debug!("state at depth {} is a dead end", state.depth());
        }
        return ranked;
    }

    rank_moves(&mut ranked);
    ranked.truncate(config.max_candidates);
    ranked
}
