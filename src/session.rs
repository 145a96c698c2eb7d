//! Transport-independent game controller.
//!
//! A `Session` owns the current position and the dead-end memo for one puzzle.
//! Whatever serves requests (a CLI loop, an HTTP handler) keeps one `Session`
//! and calls into it; the session never reaches for global state.
use log::{debug, info};
use serde::Serialize;
use std::rc::Rc;

use crate::config::SolverConfig;
use crate::engine::{DeadEnds, GameState, Move, Tube};
use crate::error::{MoveError, SetupError};
use crate::heuristics::{top_moves, ScoredMove};
use crate::solver::{legal_moves, solve, Solution};
use crate::utils::{tubes_from_records, TubeRecord};

/// Outcome of a move accepted by [`Session::apply_move`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MoveReport {
    pub tubes: Vec<Tube>,
    pub completed: bool,
    /// Every move from the starting position, present once the puzzle is completed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub final_move_list: Option<Vec<Move>>,
    /// True when the new position has no move that avoids a dead end.
    pub dead_end: bool,
}

/// Outcome of [`Session::undo_move`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct UndoReport {
    pub tubes: Vec<Tube>,
    pub dead_end: bool,
}

/// One puzzle being played: the current state plus the shared dead-end memo.
#[derive(Debug)]
pub struct Session {
    current: Rc<GameState>,
    dead_ends: DeadEnds,
    config: SolverConfig,
}

impl Session {
    /// Starts a session from validated tubes.
    pub fn new(tubes: Vec<Tube>, config: SolverConfig) -> Self {
        Session {
            current: GameState::root(tubes),
            dead_ends: DeadEnds::new(),
            config,
        }
    }

    /// Starts a session from boundary records.
    pub fn from_records(records: &[TubeRecord], config: SolverConfig) -> Result<Self, SetupError> {
        Ok(Session::new(tubes_from_records(records)?, config))
    }

    pub fn current(&self) -> &Rc<GameState> {
        &self.current
    }

    pub fn dead_ends(&self) -> &DeadEnds {
        &self.dead_ends
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Replaces the puzzle with a new starting position and forgets all dead ends.
    ///
    /// On a validation error the session is left unchanged.
    pub fn set_initial_state(&mut self, records: &[TubeRecord]) -> Result<Vec<Tube>, SetupError> {
        let tubes = tubes_from_records(records)?;
        self.reset(tubes);
        Ok(self.current.tubes().to_vec())
    }

    /// Replaces the puzzle with already validated tubes and forgets all dead ends.
    pub fn reset(&mut self, tubes: Vec<Tube>) {
        info!("starting new puzzle with {} tubes", tubes.len());
        self.current = GameState::root(tubes);
        self.dead_ends.clear();
    }

    /// Plays the move `from -> to` on the current state.
    ///
    /// The names come from an untrusted caller, so they are resolved and the move
    /// re-validated here.
    ///
    /// # Errors
    /// `MoveError::UnknownTube` or `MoveError::IllegalMove`; the current state is
    /// not changed in either case.
    pub fn apply_move(&mut self, from: &str, to: &str) -> Result<MoveReport, MoveError> {
        let mv = Move::new(from, to);
        let next = GameState::transition(&self.current, &mv)?;
        self.current = next;

        let tubes = self.current.tubes().to_vec();
        if self.current.is_completed() {
            info!("puzzle completed after {} moves", self.current.depth());
            return Ok(MoveReport {
                tubes,
                completed: true,
                final_move_list: Some(self.current.moves().to_vec()),
                dead_end: false,
            });
        }

        let dead_end = legal_moves(self.current.tubes(), &mut self.dead_ends).is_empty();
        if dead_end {
            debug!("move {} reached a dead end", mv);
            self.dead_ends.insert(self.current.fingerprint());
        }
        Ok(MoveReport {
            tubes,
            completed: false,
            final_move_list: None,
            dead_end,
        })
    }

    /// Steps back to the previous state. Does nothing at the starting state.
    ///
    /// The restored state is probed with [`top_moves`]; if it has nothing left it
    /// is recorded as a dead end and flagged in the report.
    pub fn undo_move(&mut self) -> UndoReport {
        let Some(parent) = self.current.parent().map(Rc::clone) else {
            return UndoReport {
                tubes: self.current.tubes().to_vec(),
                dead_end: false,
            };
        };
        self.current = parent;

        let dead_end = !self.current.is_completed()
            && top_moves(&self.current, &mut self.dead_ends, &self.config).is_empty();
        if dead_end {
            debug!("state restored by undo is a dead end");
        }
        UndoReport {
            tubes: self.current.tubes().to_vec(),
            dead_end,
        }
    }

    /// Best candidate moves from the current state.
    pub fn top_moves(&mut self) -> Vec<ScoredMove> {
        top_moves(&self.current, &mut self.dead_ends, &self.config)
    }

    /// Solves from the current state without changing it.
    pub fn solve(&mut self) -> Option<Solution> {
        solve(&self.current, &mut self.dead_ends, &self.config)
    }
}
