//! # Tube Sort Solver Library
//!
//! This library provides the core game logic for the tube-sorting puzzle, where
//! stacked color units are poured between fixed-capacity tubes until every tube
//! is empty or holds a single color, plus a greedy backtracking solver.
//!
//! It is used by three binaries:
//! - `human_player`: Allows interactive play with hints via the command line.
//! - `ai_solver`: Takes a puzzle file and prints a sequence of moves that solves it.
//! - `heuristic_evaluator`: Runs the solver over generated puzzles and reports how
//!   often and how quickly it succeeds.
//!
//! ## Modules
//! - `engine`: Colors, tubes (`Tube`), moves (`Move`), immutable game states with
//!   history (`GameState`), fingerprints and the dead-end memo (`DeadEnds`).
//! - `solver`: Legal-move enumeration with one-ply dead-end pruning and the
//!   `solve` function.
//! - `heuristics`: Color and tube scoring and the ranking behind `top_moves`.
//! - `session`: The `Session` controller exposing apply/undo/hint/solve/reset.
//! - `utils`: Boundary records, text and JSON puzzle parsing, generated puzzles.
//! - `config`: `SolverConfig`, loadable from TOML.
//! - `error`: Error types.

pub mod config;
pub mod engine;
pub mod error;
pub mod heuristics;
pub mod session;
pub mod solver;
pub mod utils;
