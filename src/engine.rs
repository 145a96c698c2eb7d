//! Core game engine for the tube-sorting puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Color`: The closed palette of unit colors a slot may hold.
//! - `Tube`: A fixed-capacity stack of slots with the legality primitives
//!   (filled/empty counts, top run, emptiness, completeness).
//! - `Move`: A (source, destination) pair of tube names plus the legality rule.
//! - `GameState`: An immutable snapshot of all tubes linked to its parent state,
//!   carrying the move list accumulated from the root.
//! - `Fingerprint` and `DeadEnds`: Canonical state keys and the dead-end memo.
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::rc::Rc;

use crate::error::{MoveError, SetupError};

/// Number of slots in every tube.
pub const TUBE_CAPACITY: usize = 4;

/// Represents the color of one unit in a tube.
///
/// Serialized with the upper-case names used by the puzzle front end
/// (`"LIGHT_BLUE"`); text puzzles may also use the short codes
/// returned by [`Color::code`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Color {
    Red,
    LightGreen,
    Blue,
    LightBlue,
    Grey,
    Orange,
    Brown,
    Mehendi,
    Pink,
    Purple,
    Yellow,
    Green,
}

/// A single tube slot. `None` is an empty slot.
pub type Slot = Option<Color>;

impl Color {
    /// Every color of the palette, in declaration order.
    pub const ALL: [Color; 12] = [
        Color::Red,
        Color::LightGreen,
        Color::Blue,
        Color::LightBlue,
        Color::Grey,
        Color::Orange,
        Color::Brown,
        Color::Mehendi,
        Color::Pink,
        Color::Purple,
        Color::Yellow,
        Color::Green,
    ];

    /// Returns the full upper-case name of the color.
    pub fn name(&self) -> &'static str {
        match self {
            Color::Red => "RED",
            Color::LightGreen => "LIGHT_GREEN",
            Color::Blue => "BLUE",
            Color::LightBlue => "LIGHT_BLUE",
            Color::Grey => "GREY",
            Color::Orange => "ORANGE",
            Color::Brown => "BROWN",
            Color::Mehendi => "MEHENDI",
            Color::Pink => "PINK",
            Color::Purple => "PURPLE",
            Color::Yellow => "YELLOW",
            Color::Green => "GREEN",
        }
    }

    /// Returns the short code used in text puzzles and terminal output.
    ///
    /// # Examples
    ///
    /// ```
    /// use tube_sort_solver::engine::Color;
    /// assert_eq!(Color::LightBlue.code(), "LB");
    /// assert_eq!(Color::Grey.code(), "Gr");
    /// ```
    pub fn code(&self) -> &'static str {
        match self {
            Color::Red => "R",
            Color::LightGreen => "LG",
            Color::Blue => "B",
            Color::LightBlue => "LB",
            Color::Grey => "Gr",
            Color::Orange => "O",
            Color::Brown => "Br",
            Color::Mehendi => "Mh",
            Color::Pink => "Pk",
            Color::Purple => "P",
            Color::Yellow => "Y",
            Color::Green => "G",
        }
    }

    /// Parses a color from its full name or short code, ignoring case.
    ///
    /// Returns `None` for tokens outside the palette. Empty-slot markers are not
    /// colors; see [`parse_slot`].
    pub fn parse(token: &str) -> Option<Color> {
        let token = token.trim();
        Color::ALL.into_iter().find(|color| {
            color.name().eq_ignore_ascii_case(token) || color.code().eq_ignore_ascii_case(token)
        })
    }

    /// Returns the ANSI background color sequence for terminal output.
    fn to_ansi_color_code(&self) -> &'static str {
        match self {
            Color::Red => "48;5;196",
            Color::LightGreen => "48;5;120",
            Color::Blue => "48;5;21",
            Color::LightBlue => "48;5;117",
            Color::Grey => "48;5;246",
            Color::Orange => "48;5;208",
            Color::Brown => "48;5;94",
            Color::Mehendi => "48;5;100",
            Color::Pink => "48;5;218",
            Color::Purple => "48;5;93",
            Color::Yellow => "48;5;226",
            Color::Green => "48;5;28",
        }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parses a single slot token belonging to `tube`.
///
/// `"."`, `"_"`, `"none"` and the empty string are empty slots. Anything else must
/// name a color.
pub fn parse_slot(tube: &str, token: &str) -> Result<Slot, SetupError> {
    let token = token.trim();
    if token.is_empty() || token == "." || token == "_" || token.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    Color::parse(token)
        .map(Some)
        .ok_or_else(|| SetupError::UnknownColor {
            tube: tube.to_string(),
            token: token.to_string(),
        })
}

/// A fixed-capacity tube, slots ordered bottom-to-top.
///
/// Fill is always bottom-contiguous: no empty slot lies below a filled one.
/// The constructors enforce this, and the only mutations (`take_top_run` and
/// `push_run`) preserve it.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Tube {
    name: String,
    #[serde(rename = "colors")]
    slots: [Slot; TUBE_CAPACITY],
}

impl Tube {
    /// Creates a tube from exactly `TUBE_CAPACITY` slots.
    ///
    /// # Errors
    /// Returns `SetupError::GapInTube` if an empty slot sits below a filled slot.
    ///
    /// # Examples
    /// ```
    /// use tube_sort_solver::engine::{Color, Tube};
    /// let tube = Tube::new("Tube1", [Some(Color::Red), Some(Color::Blue), None, None]).unwrap();
    /// assert_eq!(tube.top_run(), Some((Color::Blue, 1)));
    /// assert!(Tube::new("Bad", [None, Some(Color::Red), None, None]).is_err());
    /// ```
    pub fn new(name: impl Into<String>, slots: [Slot; TUBE_CAPACITY]) -> Result<Self, SetupError> {
        let name = name.into();
        if let Some(first_gap) = slots.iter().position(Option::is_none) {
            if slots[first_gap..].iter().any(Option::is_some) {
                return Err(SetupError::GapInTube {
                    tube: name,
                    slot: first_gap,
                });
            }
        }
        Ok(Tube { name, slots })
    }

    /// Creates a tube from a slice, checking the slot count first.
    pub fn from_slots(name: impl Into<String>, slots: &[Slot]) -> Result<Self, SetupError> {
        let name = name.into();
        let fixed: [Slot; TUBE_CAPACITY] =
            slots.try_into().map_err(|_| SetupError::WrongSlotCount {
                tube: name.clone(),
                found: slots.len(),
                expected: TUBE_CAPACITY,
            })?;
        Tube::new(name, fixed)
    }

    /// Creates a tube with every slot empty.
    pub fn empty(name: impl Into<String>) -> Self {
        Tube {
            name: name.into(),
            slots: [None; TUBE_CAPACITY],
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Slots bottom-to-top.
    pub fn slots(&self) -> &[Slot; TUBE_CAPACITY] {
        &self.slots
    }

    pub fn filled_slots(&self) -> usize {
        self.slots.iter().take_while(|slot| slot.is_some()).count()
    }

    pub fn empty_slots(&self) -> usize {
        TUBE_CAPACITY - self.filled_slots()
    }

    pub fn top_color(&self) -> Option<Color> {
        self.filled_slots()
            .checked_sub(1)
            .and_then(|top| self.slots[top])
    }

    /// Returns the color and length of the topmost contiguous same-color block.
    pub fn top_run(&self) -> Option<(Color, usize)> {
        let filled = self.filled_slots();
        let color = self.top_color()?;
        let run = self.slots[..filled]
            .iter()
            .rev()
            .take_while(|slot| **slot == Some(color))
            .count();
        Some((color, run))
    }

    pub fn is_empty(&self) -> bool {
        self.slots[0].is_none()
    }

    /// True when all slots are filled with a single color.
    pub fn is_completed(&self) -> bool {
        match self.slots[0] {
            Some(color) => self.slots.iter().all(|slot| *slot == Some(color)),
            None => false,
        }
    }

    /// True when the tube is non-empty and its whole content is one run.
    pub fn is_uniform(&self) -> bool {
        match self.top_run() {
            Some((_, run)) => run == self.filled_slots(),
            None => false,
        }
    }

    /// Removes the top run and returns it.
    fn take_top_run(&mut self) -> Option<(Color, usize)> {
        let (color, run) = self.top_run()?;
        let filled = self.filled_slots();
        for slot in &mut self.slots[filled - run..filled] {
            *slot = None;
        }
        Some((color, run))
    }

    /// Stacks `count` units of `color` starting at the first empty slot.
    fn push_run(&mut self, color: Color, count: usize) {
        let filled = self.filled_slots();
        assert!(
            filled + count <= TUBE_CAPACITY,
            "push of {count} units overflows tube {}",
            self.name
        );
        for slot in &mut self.slots[filled..filled + count] {
            *slot = Some(color);
        }
    }
}

impl fmt::Display for Tube {
    /// Renders the tube on one line, bottom slot first.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:<8}|", self.name)?;
        for slot in &self.slots {
            match slot {
                Some(color) => write!(
                    f,
                    "\x1b[1;30;{}m{:^4}\x1b[m",
                    color.to_ansi_color_code(),
                    color.code()
                )?,
                None => write!(f, "{:^4}", ".")?,
            }
        }
        write!(f, "|")
    }
}

/// A candidate transfer from one tube to another, identified by tube names.
///
/// Legality is never stored; it is recomputed against the current tubes
/// every time with [`Move::is_possible`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub from: String,
    pub to: String,
}

impl Move {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Move {
            from: from.into(),
            to: to.into(),
        }
    }

    /// Checks whether the top run of `from` may be poured onto `to`.
    ///
    /// The move is illegal when:
    /// - both tubes are the same tube,
    /// - `from` is empty,
    /// - `from` holds a single run and `to` is empty (the pour changes nothing),
    /// - the top run is longer than the free space in `to`,
    /// - `to` is non-empty and its top color differs from the run's color.
    ///
    /// # Examples
    /// ```
    /// use tube_sort_solver::engine::{Color, Move, Tube};
    /// let a = Tube::new("A", [Some(Color::Red), Some(Color::Blue), None, None]).unwrap();
    /// let b = Tube::empty("B");
    /// assert!(Move::is_possible(&a, &b));
    /// assert!(!Move::is_possible(&a, &a));
    /// ```
    pub fn is_possible(from: &Tube, to: &Tube) -> bool {
        if from.name == to.name {
            return false;
        }
        let Some((color, run)) = from.top_run() else {
            return false;
        };
        if run == from.filled_slots() && to.is_empty() {
            return false;
        }
        if run > to.empty_slots() {
            return false;
        }
        match to.top_color() {
            Some(to_color) => to_color == color,
            None => true,
        }
    }

    /// Resolves both tube names against `tubes`, returning their indices.
    fn resolve(&self, tubes: &[Tube]) -> Result<(usize, usize), MoveError> {
        let index_of = |name: &str| {
            tubes
                .iter()
                .position(|tube| tube.name == name)
                .ok_or_else(|| MoveError::UnknownTube(name.to_string()))
        };
        Ok((index_of(&self.from)?, index_of(&self.to)?))
    }

    /// Pours the top run of `tubes[from]` onto `tubes[to]`.
    ///
    /// Callers must have checked legality first.
    fn execute(tubes: &mut [Tube], from: usize, to: usize) {
        if let Some((color, run)) = tubes[from].take_top_run() {
            tubes[to].push_run(color, run);
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// Copies `tubes`, re-resolves `mv` by name against the copy and executes it.
///
/// The input slice is never modified.
///
/// # Errors
/// `MoveError::UnknownTube` if a name does not resolve, `MoveError::IllegalMove`
/// if the move is not legal against the copied tubes.
pub fn apply_move_to_tubes(tubes: &[Tube], mv: &Move) -> Result<Vec<Tube>, MoveError> {
    let mut next = tubes.to_vec();
    let (from, to) = mv.resolve(&next)?;
    if !Move::is_possible(&next[from], &next[to]) {
        return Err(MoveError::IllegalMove {
            from: mv.from.clone(),
            to: mv.to.clone(),
        });
    }
    Move::execute(&mut next, from, to);
    Ok(next)
}

/// True iff every tube is empty or completed.
pub fn is_completed(tubes: &[Tube]) -> bool {
    tubes.iter().all(|tube| tube.is_empty() || tube.is_completed())
}

/// Canonical key of a state's tube contents, in tube declaration order.
///
/// Two states with identical contents always share a fingerprint,
/// whatever moves produced them.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Fingerprint(Vec<[Slot; TUBE_CAPACITY]>);

impl Fingerprint {
    pub fn of(tubes: &[Tube]) -> Self {
        Fingerprint(tubes.iter().map(|tube| tube.slots).collect())
    }
}

/// Append-only memo of states known to have no useful move left.
#[derive(Clone, Debug, Default)]
pub struct DeadEnds {
    fingerprints: HashSet<Fingerprint>,
}

impl DeadEnds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a fingerprint. Returns `true` if it was not known before.
    pub fn insert(&mut self, fingerprint: Fingerprint) -> bool {
        self.fingerprints.insert(fingerprint)
    }

    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.fingerprints.contains(fingerprint)
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn clear(&mut self) {
        self.fingerprints.clear();
    }
}

/// One snapshot of the puzzle.
///
/// States form a singly linked history: each child owns a reference to its
/// parent and a full, independent copy of the tubes, plus every move taken
/// from the root to reach it.
///
/// # Examples
/// ```
/// use tube_sort_solver::engine::{GameState, Move};
/// use tube_sort_solver::utils::tubes_from_str_array;
///
/// let tubes = tubes_from_str_array(&["R R B B", "B B R R", ". . . ."]).unwrap();
/// let root = GameState::root(tubes);
/// let child = GameState::transition(&root, &Move::new("Tube1", "Tube3")).unwrap();
/// assert_eq!(child.moves().len(), 1);
/// assert!(child.parent().is_some());
/// assert_eq!(root.tubes()[0].filled_slots(), 4); // parent untouched
/// ```
#[derive(Debug)]
pub struct GameState {
    tubes: Vec<Tube>,
    parent: Option<Rc<GameState>>,
    moves: Vec<Move>,
}

impl GameState {
    /// Creates a state with no parent and an empty move history.
    pub fn root(tubes: Vec<Tube>) -> Rc<Self> {
        Rc::new(GameState {
            tubes,
            parent: None,
            moves: Vec::new(),
        })
    }

    /// Builds the child state reached by playing `mv` from `state`.
    ///
    /// # Errors
    /// Propagates the `MoveError` from [`apply_move_to_tubes`]; `state` is left as is.
    pub fn transition(state: &Rc<Self>, mv: &Move) -> Result<Rc<Self>, MoveError> {
        let tubes = apply_move_to_tubes(&state.tubes, mv)?;
        let mut moves = Vec::with_capacity(state.moves.len() + 1);
        moves.extend_from_slice(&state.moves);
        moves.push(mv.clone());
        Ok(Rc::new(GameState {
            tubes,
            parent: Some(Rc::clone(state)),
            moves,
        }))
    }

    pub fn tubes(&self) -> &[Tube] {
        &self.tubes
    }

    pub fn tube(&self, name: &str) -> Option<&Tube> {
        self.tubes.iter().find(|tube| tube.name == name)
    }

    pub fn parent(&self) -> Option<&Rc<GameState>> {
        self.parent.as_ref()
    }

    /// Moves taken from the root to reach this state.
    pub fn moves(&self) -> &[Move] {
        &self.moves
    }

    pub fn depth(&self) -> usize {
        self.moves.len()
    }

    pub fn is_completed(&self) -> bool {
        is_completed(&self.tubes)
    }

    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.tubes)
    }
}

impl Drop for GameState {
    // Unlink the parent chain iteratively; deep solver histories would
    // otherwise recurse once per ancestor.
    fn drop(&mut self) {
        let mut next = self.parent.take();
        while let Some(state) = next {
            match Rc::try_unwrap(state) {
                Ok(mut owned) => next = owned.parent.take(),
                Err(_) => break,
            }
        }
    }
}

impl fmt::Display for GameState {
    /// Formats every tube on its own line.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, tube) in self.tubes.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", tube)?;
        }
        Ok(())
    }
}
