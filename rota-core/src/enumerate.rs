//! Placement-phase enumeration with rotation deduplication.
//!
//! For an ordered pair of colors `(first, second)` two openings are explored:
//!
//! ```text
//! center first:  center held by `first`, then second, first, second, first, second
//!                on the ring
//! open:          first, second, first, second, first, second on any empty cell
//!                (center included)
//! ```
//!
//! Every placement produces a candidate board. Candidates are bucketed by raw
//! key; a candidate whose key is unseen is also looked up under the keys of its
//! other 15 symmetries, so each physical arrangement ends up in exactly one
//! [`EquivalenceClass`].

use std::collections::HashMap;
use std::ops::{Deref, DerefMut};

use thiserror::Error;
use tracing::{debug, error, info};
use xxhash_rust::xxh64::Xxh64;

use crate::{Board, BoardError, BoardKey, Cell, Color, MAX_PIECES, PIECES_PER_COLOR};

/// Reasons an enumeration call is rejected before it starts.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnumerationError {
    #[error("players must be two distinct piece colors, got {first:?} and {second:?}")]
    InvalidPlayers { first: Color, second: Color },

    #[error("placement sequence has an empty color at index {0}")]
    EmptyPlacement(usize),

    #[error(transparent)]
    Board(#[from] BoardError),
}

/// Ordered pair of player colors. `first` opens the game.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub struct Players {
    first: Color,
    second: Color,
}

impl Players {
    pub fn new(first: Color, second: Color) -> Result<Players, EnumerationError> {
        if !first.is_piece() || !second.is_piece() || first == second {
            return Err(EnumerationError::InvalidPlayers { first, second });
        }
        Ok(Players { first, second })
    }

    #[inline]
    pub fn first(self) -> Color {
        self.first
    }

    #[inline]
    pub fn second(self) -> Color {
        self.second
    }

    /// Same colors, other player opens.
    pub fn swapped(self) -> Players {
        Players {
            first: self.second,
            second: self.first,
        }
    }

    /// Board with the center already claimed by `first`.
    pub fn center_start(self) -> Board {
        let mut board = Board::new();
        board.set(Cell::Center, self.first);
        board
    }

    /// Ring placements following a claimed center.
    pub fn center_sequence(self) -> [Color; 5] {
        let (f, s) = (self.first, self.second);
        [s, f, s, f, s]
    }

    /// Placements from an empty board.
    pub fn open_sequence(self) -> [Color; 6] {
        let (f, s) = (self.first, self.second);
        [f, s, f, s, f, s]
    }
}

/// Two non-equivalent boards found under the same key.
///
/// The raw key is injective, so this only happens when the equivalence test
/// or the key packing is broken.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyCollision {
    /// Key of the class the candidate was filed under
    pub key: BoardKey,
    /// First member of that class
    pub existing: Board,
    /// Board that matched the key but not the class
    pub candidate: Board,
}

/// Boards that are readings of one physical arrangement.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EquivalenceClass {
    key: BoardKey,
    members: Vec<Board>,
}

impl EquivalenceClass {
    /// Raw key of the first member.
    #[inline]
    pub fn key(&self) -> BoardKey {
        self.key
    }

    /// Members in discovery order.
    #[inline]
    pub fn members(&self) -> &[Board] {
        &self.members
    }

    /// The first board discovered for this class.
    #[inline]
    pub fn representative(&self) -> &Board {
        &self.members[0]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Counters for one search depth (1 = first placement).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DepthStats {
    pub candidates: u64,
    pub new_classes: u64,
}

/// Statistics collected during enumeration.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EnumerationStats {
    /// Boards produced by a placement (start boards excluded)
    pub candidates: u64,

    /// Boards whose exact key was already filed
    pub exact_duplicates: u64,

    /// Boards matching a class under another rotation or mirror
    pub rotation_duplicates: u64,

    /// Key hits that failed the equivalence test
    pub collisions: u64,

    /// Breakdown by depth; index 0 is unused
    pub by_depth: [DepthStats; MAX_PIECES as usize + 1],
}

impl EnumerationStats {
    /// Counters for a depth, zero when out of range.
    pub fn depth(&self, depth: usize) -> DepthStats {
        self.by_depth.get(depth).copied().unwrap_or_default()
    }
}

/// Class counts by the terminal state of each representative.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Winners {
    pub a: usize,
    pub b: usize,
    pub undecided: usize,
}

/// How a recorded board was filed.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Outcome {
    NewClass,
    ExactDuplicate,
    RotationDuplicate,
    Collision,
}

/// A piece placed on a borrowed board, lifted again when dropped.
struct Placement<'a> {
    board: &'a mut Board,
    cell: Cell,
}

impl<'a> Placement<'a> {
    fn new(board: &'a mut Board, cell: Cell, color: Color) -> Placement<'a> {
        debug_assert!(board.is_empty(cell), "placing on occupied cell {}", cell);
        board.set(cell, color);
        Placement { board, cell }
    }
}

impl Deref for Placement<'_> {
    type Target = Board;

    fn deref(&self) -> &Board {
        self.board
    }
}

impl DerefMut for Placement<'_> {
    fn deref_mut(&mut self) -> &mut Board {
        self.board
    }
}

impl Drop for Placement<'_> {
    fn drop(&mut self) {
        self.board.set(self.cell, Color::Empty);
    }
}

/// Backtracking enumerator. Classes accumulate across calls until [`finish`].
///
/// [`finish`]: Enumerator::finish
#[derive(Debug, Default)]
pub struct Enumerator {
    /// Classes in discovery order
    classes: Vec<EquivalenceClass>,
    /// Raw key of each class's first member -> index into `classes`
    index: HashMap<BoardKey, usize>,
    collisions: Vec<KeyCollision>,
    stats: EnumerationStats,
}

impl Enumerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enumerate both openings for `players`.
    pub fn run(&mut self, players: Players) -> Result<(), EnumerationError> {
        info!(first = ?players.first(), second = ?players.second(), "enumerating placement phase");
        let classes_before = self.classes.len();

        self.record(Board::new(), None);
        self.explore(players.center_start(), &players.center_sequence())?;
        self.explore(Board::new(), &players.open_sequence())?;

        info!(
            classes = self.classes.len(),
            new_classes = self.classes.len() - classes_before,
            candidates = self.stats.candidates,
            collisions = self.collisions.len(),
            "enumeration finished"
        );
        Ok(())
    }

    /// Place `sequence` onto `start` in every possible way.
    ///
    /// `start` itself is recorded but not counted as a candidate. Sequences that
    /// would break placement-phase limits are rejected before anything is recorded.
    pub fn explore(&mut self, start: Board, sequence: &[Color]) -> Result<(), EnumerationError> {
        Self::check_sequence(&start, sequence)?;

        let classes_before = self.classes.len();
        let candidates_before = self.stats.candidates;
        self.record(start, None);

        let mut board = start;
        self.place(&mut board, sequence, 1);
        debug_assert_eq!(board, start, "placements leaked out of the search");

        debug!(
            start = %start,
            pieces = sequence.len(),
            candidates = self.stats.candidates - candidates_before,
            new_classes = self.classes.len() - classes_before,
            "branch explored"
        );
        Ok(())
    }

    fn check_sequence(start: &Board, sequence: &[Color]) -> Result<(), EnumerationError> {
        if let Some(idx) = sequence.iter().position(|c| !c.is_piece()) {
            return Err(EnumerationError::EmptyPlacement(idx));
        }

        let total = start.piece_count() as usize + sequence.len();
        if total > MAX_PIECES as usize {
            let count = u8::try_from(total).unwrap_or(u8::MAX);
            return Err(BoardError::TooManyPieces { count }.into());
        }

        for color in Color::PLAYERS {
            let placed = sequence.iter().filter(|&&c| c == color).count();
            let count = start.count(color) as usize + placed;
            if count > PIECES_PER_COLOR as usize {
                let count = u8::try_from(count).unwrap_or(u8::MAX);
                return Err(BoardError::TooManyOfColor { color, count }.into());
            }
        }
        Ok(())
    }

    /// Try the next color on every empty cell, recursing after each placement.
    fn place(&mut self, board: &mut Board, remaining: &[Color], depth: usize) {
        let Some((&color, rest)) = remaining.split_first() else {
            return;
        };

        for cell in Cell::all() {
            if !board.is_empty(cell) {
                continue;
            }
            let mut placed = Placement::new(board, cell, color);
            self.record(*placed, Some(depth));
            self.place(&mut placed, rest, depth + 1);
        }
    }

    /// File a board and update statistics. `depth` is None for start boards.
    fn record(&mut self, board: Board, depth: Option<usize>) {
        if let Some(depth) = depth {
            self.stats.candidates += 1;
            self.stats.by_depth[depth].candidates += 1;
        }

        match self.classify(board) {
            Outcome::NewClass => {
                if let Some(depth) = depth {
                    self.stats.by_depth[depth].new_classes += 1;
                }
            }
            Outcome::ExactDuplicate => self.stats.exact_duplicates += 1,
            Outcome::RotationDuplicate => self.stats.rotation_duplicates += 1,
            Outcome::Collision => self.stats.collisions += 1,
        }
    }

    fn classify(&mut self, candidate: Board) -> Outcome {
        let key = candidate.raw_key();
        if let Some(&idx) = self.index.get(&key) {
            return self.merge(idx, candidate, Outcome::ExactDuplicate);
        }

        for image in candidate.symmetries().iter().skip(1) {
            if let Some(&idx) = self.index.get(&image.raw_key()) {
                return self.merge(idx, candidate, Outcome::RotationDuplicate);
            }
        }

        self.index.insert(key, self.classes.len());
        self.classes.push(EquivalenceClass {
            key,
            members: vec![candidate],
        });
        Outcome::NewClass
    }

    /// Confirm a key hit with the equivalence test.
    fn merge(&mut self, idx: usize, candidate: Board, duplicate: Outcome) -> Outcome {
        let class = &mut self.classes[idx];
        if class.members.iter().any(|m| m.is_equivalent(&candidate)) {
            return duplicate;
        }

        let collision = KeyCollision {
            key: class.key,
            existing: class.members[0],
            candidate,
        };
        error!(
            key = %collision.key,
            existing = %collision.existing,
            candidate = %collision.candidate,
            "key collision between non-equivalent boards"
        );
        class.members.push(candidate);
        self.collisions.push(collision);
        Outcome::Collision
    }

    /// Statistics so far.
    pub fn stats(&self) -> &EnumerationStats {
        &self.stats
    }

    /// Hand over the accumulated classes.
    pub fn finish(self) -> Enumeration {
        Enumeration {
            classes: self.classes,
            index: self.index,
            collisions: self.collisions,
            stats: self.stats,
        }
    }
}

/// Result of an enumeration: raw key -> equivalence class.
#[derive(Clone, Debug)]
pub struct Enumeration {
    classes: Vec<EquivalenceClass>,
    index: HashMap<BoardKey, usize>,
    collisions: Vec<KeyCollision>,
    stats: EnumerationStats,
}

impl Enumeration {
    /// Number of classes.
    #[inline]
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    /// Classes in discovery order.
    pub fn classes(&self) -> &[EquivalenceClass] {
        &self.classes
    }

    pub fn iter(&self) -> impl Iterator<Item = &EquivalenceClass> + '_ {
        self.classes.iter()
    }

    /// Class filed under exactly this raw key.
    pub fn get(&self, key: BoardKey) -> Option<&EquivalenceClass> {
        self.index.get(&key).map(|&idx| &self.classes[idx])
    }

    /// Class holding any reading of `board`.
    pub fn find(&self, board: &Board) -> Option<&EquivalenceClass> {
        board
            .symmetries()
            .iter()
            .find_map(|image| self.get(image.raw_key()))
            .filter(|class| class.members.iter().any(|m| m.is_equivalent(board)))
    }

    pub fn collisions(&self) -> &[KeyCollision] {
        &self.collisions
    }

    pub fn stats(&self) -> &EnumerationStats {
        &self.stats
    }

    /// Classes holding more than one board. Zero unless something is broken.
    pub fn multi_member_classes(&self) -> usize {
        self.classes.iter().filter(|c| c.len() > 1).count()
    }

    /// Total boards across all classes.
    pub fn member_count(&self) -> usize {
        self.classes.iter().map(EquivalenceClass::len).sum()
    }

    /// Count classes by the winner of their representative.
    pub fn winners(&self) -> Winners {
        let mut winners = Winners::default();
        for class in &self.classes {
            match class.representative().terminal_state() {
                Some(Color::A) => winners.a += 1,
                Some(Color::B) => winners.b += 1,
                _ => winners.undecided += 1,
            }
        }
        winners
    }

    /// Re-check that every member is equivalent to its class's first member.
    ///
    /// Returns the number of members that are not.
    pub fn verify(&self) -> usize {
        let mut violations = 0;
        for class in &self.classes {
            let first = class.representative();
            for member in &class.members[1..] {
                if !first.is_equivalent(member) {
                    violations += 1;
                    error!(key = %class.key, first = %first, member = %member, "class member is not equivalent");
                }
            }
        }
        violations
    }

    /// Fingerprint of keys, class sizes and member order.
    pub fn digest(&self) -> u64 {
        let mut hasher = Xxh64::new(0);
        for class in &self.classes {
            hasher.update(&class.key.0.to_le_bytes());
            hasher.update(&(class.members.len() as u32).to_le_bytes());
            for member in &class.members {
                hasher.update(&member.raw_key().0.to_le_bytes());
            }
        }
        hasher.digest()
    }
}

/// Enumerate both openings for one ordered pair of colors.
pub fn enumerate(first: Color, second: Color) -> Result<Enumeration, EnumerationError> {
    let players = Players::new(first, second)?;
    let mut enumerator = Enumerator::new();
    enumerator.run(players)?;
    Ok(enumerator.finish())
}

/// Enumerate with `A` opening, then with `B` opening, into one result.
pub fn enumerate_all() -> Result<Enumeration, EnumerationError> {
    let players = Players::new(Color::A, Color::B)?;
    let mut enumerator = Enumerator::new();
    enumerator.run(players)?;
    enumerator.run(players.swapped())?;
    Ok(enumerator.finish())
}
