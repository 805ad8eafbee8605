//! ROTA board states with a bit-packed raw key and rotation equivalence.
//!
//! # Board
//!
//! Eight ring positions (1..=8) form a circle around one center cell. Ring
//! position 8 is adjacent to position 1.
//!
//! # Text Notation (9 characters)
//!
//! ```text
//!   1 2 3
//!   4 C 5        row-major reading order, not board geometry
//!   6 7 8
//!
//! 'A' / 'B' = pieces, '_' = empty ('R' is accepted as 'A' when parsing)
//! ```
//!
//! # Raw Key Encoding (18 of 32 bits)
//!
//! ```text
//! Bits 16-17: center
//! Bits 14-15: ring position 8
//! ...
//! Bits 0-1:   ring position 1
//! Bits 18-31: always zero
//!
//! Each 2-bit field: 0 = empty, 1 = A, 2 = B (3 is reserved)
//! ```
//!
//! The raw key is rotation-sensitive: two rotations of the same arrangement
//! usually have different keys. [`Board::is_equivalent`] decides rotation
//! equivalence explicitly.

pub mod enumerate;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use enumerate::{
    enumerate, enumerate_all, DepthStats, Enumeration, EnumerationError, EnumerationStats,
    Enumerator, EquivalenceClass, KeyCollision, Players, Winners,
};

/// Number of ring positions.
pub const RING_SIZE: usize = 8;

/// Pieces each side places during the placement phase.
pub const PIECES_PER_COLOR: u8 = 3;

/// Pieces on the board once the placement phase is over.
pub const MAX_PIECES: u8 = 2 * PIECES_PER_COLOR;

/// Reasons a board cannot be constructed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BoardError {
    #[error("board would hold {count} pieces, at most {max} allowed", max = MAX_PIECES)]
    TooManyPieces { count: u8 },

    #[error("{color:?} would have {count} pieces, at most {max} allowed", max = PIECES_PER_COLOR)]
    TooManyOfColor { color: Color, count: u8 },

    #[error("reserved color code {code} in key {key}")]
    ReservedCode { code: u8, key: BoardKey },

    #[error("key {0} has bits set above the center field")]
    KeyOutOfRange(BoardKey),

    #[error("board notation needs 9 cells, got {0}")]
    BadLength(usize),

    #[error("unknown board symbol {0:?}")]
    BadSymbol(char),

    #[error("cell {0} is already occupied")]
    Occupied(Cell),
}

// ============================================================================
// COLORS & RING TOPOLOGY
// ============================================================================

/// Occupant of a cell.
///
/// The discriminant is the 2-bit code used in [`BoardKey`].
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, Default)]
#[repr(u8)]
pub enum Color {
    #[default]
    Empty = 0,
    A = 1,
    B = 2,
}

impl Color {
    /// The two piece colors.
    pub const PLAYERS: [Color; 2] = [Color::A, Color::B];

    /// Get the opposing color. `Empty` maps to itself.
    #[inline]
    pub fn opponent(self) -> Color {
        match self {
            Color::A => Color::B,
            Color::B => Color::A,
            Color::Empty => Color::Empty,
        }
    }

    /// Convert from a 2-bit key field. Returns None for the reserved code.
    #[inline]
    pub fn from_bits(bits: u8) -> Option<Color> {
        match bits {
            0 => Some(Color::Empty),
            1 => Some(Color::A),
            2 => Some(Color::B),
            _ => None,
        }
    }

    /// Check if this is a piece rather than an empty cell.
    #[inline]
    pub fn is_piece(self) -> bool {
        self != Color::Empty
    }

    /// Character used in the text notation.
    pub fn symbol(self) -> char {
        match self {
            Color::Empty => '_',
            Color::A => 'A',
            Color::B => 'B',
        }
    }

    /// Parse a notation character.
    pub fn from_symbol(c: char) -> Option<Color> {
        match c {
            '_' | '.' => Some(Color::Empty),
            'A' | 'a' | 'R' | 'r' => Some(Color::A),
            'B' | 'b' => Some(Color::B),
            _ => None,
        }
    }
}

/// Walking direction around the ring.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Direction {
    Clockwise,
    CounterClockwise,
}

impl Direction {
    pub const BOTH: [Direction; 2] = [Direction::Clockwise, Direction::CounterClockwise];

    #[inline]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Clockwise => Direction::CounterClockwise,
            Direction::CounterClockwise => Direction::Clockwise,
        }
    }
}

/// Ring position (1-8). Always in range.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash, PartialOrd, Ord)]
pub struct Pos(u8);

impl Pos {
    /// Create a ring position from its number (1-8).
    #[inline]
    pub const fn new(number: u8) -> Option<Pos> {
        if number >= 1 && number as usize <= RING_SIZE {
            Some(Pos(number))
        } else {
            None
        }
    }

    /// Position for a zero-based index, wrapping around the ring.
    #[inline]
    const fn from_index(idx: usize) -> Pos {
        Pos((idx % RING_SIZE) as u8 + 1)
    }

    /// Position number (1-8).
    #[inline]
    pub const fn number(self) -> u8 {
        self.0
    }

    /// Zero-based index (0-7).
    #[inline]
    pub const fn index(self) -> usize {
        (self.0 - 1) as usize
    }

    /// The adjacent position one step in `dir`.
    #[inline]
    pub fn neighbor(self, dir: Direction) -> Pos {
        self.step(1, dir)
    }

    /// The position `n` steps away in `dir`.
    #[inline]
    pub fn step(self, n: usize, dir: Direction) -> Pos {
        let n = n % RING_SIZE;
        match dir {
            Direction::Clockwise => Pos::from_index(self.index() + n),
            Direction::CounterClockwise => Pos::from_index(self.index() + RING_SIZE - n),
        }
    }

    /// The diametrically opposite position.
    #[inline]
    pub fn opposite(self) -> Pos {
        self.step(RING_SIZE / 2, Direction::Clockwise)
    }

    /// Iterate over all 8 ring positions in order.
    pub fn all() -> impl Iterator<Item = Pos> {
        (1..=RING_SIZE as u8).map(Pos)
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Any of the 9 cells.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Cell {
    Ring(Pos),
    Center,
}

impl Cell {
    /// Iterate over all cells: ring positions 1-8, then the center.
    ///
    /// This is the fixed scan order of the enumerator.
    pub fn all() -> impl Iterator<Item = Cell> {
        Pos::all().map(Cell::Ring).chain(std::iter::once(Cell::Center))
    }

    /// Ring neighbor of this cell. The center has none.
    pub fn neighbor(self, dir: Direction) -> Option<Cell> {
        match self {
            Cell::Ring(pos) => Some(Cell::Ring(pos.neighbor(dir))),
            Cell::Center => None,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Ring(pos) => write!(f, "{}", pos),
            Cell::Center => write!(f, "C"),
        }
    }
}

// ============================================================================
// RAW KEY
// ============================================================================

/// Raw, rotation-sensitive fingerprint of a board.
///
/// See module documentation for the bit layout. Injective over valid boards.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct BoardKey(pub u32);

impl BoardKey {
    /// Bits per cell field.
    const FIELD_BITS: u32 = 2;
    /// Mask for a single field (0b11).
    const FIELD_MASK: u32 = 0b11;
    /// Bit position of the center field.
    const CENTER_SHIFT: u32 = RING_SIZE as u32 * Self::FIELD_BITS;
    /// Largest value with only the 18 used bits set.
    pub const MAX: u32 = (1 << (Self::CENTER_SHIFT + Self::FIELD_BITS)) - 1;

    #[inline]
    fn shift(cell: Cell) -> u32 {
        match cell {
            Cell::Ring(pos) => pos.index() as u32 * Self::FIELD_BITS,
            Cell::Center => Self::CENTER_SHIFT,
        }
    }

    /// Get the raw 2-bit field for a cell.
    #[inline]
    pub fn field(self, cell: Cell) -> u8 {
        ((self.0 >> Self::shift(cell)) & Self::FIELD_MASK) as u8
    }
}

impl fmt::Display for BoardKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:05x}", self.0)
    }
}

// ============================================================================
// BOARD
// ============================================================================

/// One configuration of the 9 cells.
///
/// Equality and hashing cover the exact ring order plus the center; use
/// [`Board::is_equivalent`] to compare up to rotation.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct Board {
    ring: [Color; RING_SIZE],
    center: Color,
}

impl Board {
    /// Create an empty board.
    #[inline]
    pub const fn new() -> Board {
        Board {
            ring: [Color::Empty; RING_SIZE],
            center: Color::Empty,
        }
    }

    /// Create a board from explicit colors, checking placement-phase limits.
    pub fn from_cells(ring: [Color; RING_SIZE], center: Color) -> Result<Board, BoardError> {
        let board = Board { ring, center };
        board.validate()?;
        Ok(board)
    }

    /// Decode a raw key.
    pub fn from_key(key: BoardKey) -> Result<Board, BoardError> {
        if key.0 > BoardKey::MAX {
            return Err(BoardError::KeyOutOfRange(key));
        }
        let decode = |cell: Cell| {
            let code = key.field(cell);
            Color::from_bits(code).ok_or(BoardError::ReservedCode { code, key })
        };

        let mut ring = [Color::Empty; RING_SIZE];
        for pos in Pos::all() {
            ring[pos.index()] = decode(Cell::Ring(pos))?;
        }
        Board::from_cells(ring, decode(Cell::Center)?)
    }

    fn validate(&self) -> Result<(), BoardError> {
        let count = self.piece_count();
        if count > MAX_PIECES {
            return Err(BoardError::TooManyPieces { count });
        }
        for color in Color::PLAYERS {
            let count = self.count(color);
            if count > PIECES_PER_COLOR {
                return Err(BoardError::TooManyOfColor { color, count });
            }
        }
        Ok(())
    }

    /// Return a copy with `color` placed on the empty `cell`.
    pub fn with(&self, cell: Cell, color: Color) -> Result<Board, BoardError> {
        if !self.is_empty(cell) {
            return Err(BoardError::Occupied(cell));
        }
        let mut board = *self;
        board.set(cell, color);
        board.validate()?;
        Ok(board)
    }

    /// Overwrite a cell. Does NOT validate piece counts.
    #[inline]
    pub(crate) fn set(&mut self, cell: Cell, color: Color) {
        match cell {
            Cell::Ring(pos) => self.ring[pos.index()] = color,
            Cell::Center => self.center = color,
        }
    }

    /// Get the color at a cell.
    #[inline]
    pub fn color(&self, cell: Cell) -> Color {
        match cell {
            Cell::Ring(pos) => self.ring[pos.index()],
            Cell::Center => self.center,
        }
    }

    /// Get the color at a ring position.
    #[inline]
    pub fn ring_color(&self, pos: Pos) -> Color {
        self.ring[pos.index()]
    }

    /// Get the center color.
    #[inline]
    pub fn center(&self) -> Color {
        self.center
    }

    /// Ring colors in position order (index 0 = position 1).
    #[inline]
    pub fn ring(&self) -> &[Color; RING_SIZE] {
        &self.ring
    }

    /// Check if a cell is empty.
    #[inline]
    pub fn is_empty(&self, cell: Cell) -> bool {
        self.color(cell) == Color::Empty
    }

    /// Count cells holding `color`.
    pub fn count(&self, color: Color) -> u8 {
        let ring = self.ring.iter().filter(|&&c| c == color).count() as u8;
        ring + u8::from(self.center == color)
    }

    /// Count pieces of both colors.
    #[inline]
    pub fn piece_count(&self) -> u8 {
        self.count(Color::A) + self.count(Color::B)
    }

    /// Empty cells in scan order.
    pub fn empty_cells(&self) -> impl Iterator<Item = Cell> + '_ {
        self.cells_of(Color::Empty)
    }

    /// Cells holding `color`, in scan order.
    pub fn cells_of(&self, color: Color) -> impl Iterator<Item = Cell> + '_ {
        Cell::all().filter(move |&cell| self.color(cell) == color)
    }

    // ========== Win Detection ==========

    /// Winner of this position, or None while the game continues.
    ///
    /// Three in a row around the ring is checked for every start position
    /// before any line through the center. The first match in scan order wins.
    pub fn terminal_state(&self) -> Option<Color> {
        for pos in Pos::all() {
            let color = self.ring_color(pos);
            if color.is_piece()
                && color == self.ring_color(pos.step(1, Direction::Clockwise))
                && color == self.ring_color(pos.step(2, Direction::Clockwise))
            {
                return Some(color);
            }
        }

        for pos in Pos::all() {
            let color = self.ring_color(pos);
            if color.is_piece()
                && color == self.ring_color(pos.opposite())
                && color == self.center
            {
                return Some(color);
            }
        }

        None
    }

    // ========== Raw Key ==========

    /// Pack the exact (non-rotated) contents into a [`BoardKey`].
    pub fn raw_key(&self) -> BoardKey {
        let mut key = (self.center as u32) << BoardKey::CENTER_SHIFT;
        for pos in Pos::all() {
            key |= (self.ring_color(pos) as u32) << BoardKey::shift(Cell::Ring(pos));
        }
        BoardKey(key)
    }

    // ========== Symmetry & Equivalence ==========

    /// Rotate the ring so every piece advances `k` steps clockwise.
    ///
    /// The center is unchanged and `rotate(0)` is the identity.
    pub fn rotate(&self, k: usize) -> Board {
        let mut ring = [Color::Empty; RING_SIZE];
        for pos in Pos::all() {
            ring[pos.step(k, Direction::Clockwise).index()] = self.ring_color(pos);
        }
        Board {
            ring,
            center: self.center,
        }
    }

    /// Read the ring starting at `start` and walking in `dir`.
    ///
    /// Position 1 of the result holds the color at `start`. Clockwise walks are
    /// the 8 rotations; counter-clockwise walks are their mirror images.
    pub fn traverse(&self, start: Pos, dir: Direction) -> Board {
        let mut ring = [Color::Empty; RING_SIZE];
        for (i, slot) in ring.iter_mut().enumerate() {
            *slot = self.ring_color(start.step(i, dir));
        }
        Board {
            ring,
            center: self.center,
        }
    }

    /// All 16 ring readings. Index 0 is the identity.
    ///
    /// Clockwise walks from positions 1-8 come first, then counter-clockwise.
    pub fn symmetries(&self) -> [Board; 2 * RING_SIZE] {
        let mut result = [*self; 2 * RING_SIZE];
        for (d, dir) in Direction::BOTH.into_iter().enumerate() {
            for start in Pos::all() {
                result[d * RING_SIZE + start.index()] = self.traverse(start, dir);
            }
        }
        result
    }

    /// Check if `other` is this board read from another start or direction.
    pub fn is_equivalent(&self, other: &Board) -> bool {
        if self.center != other.center {
            return false;
        }
        Direction::BOTH.into_iter().any(|dir| {
            Pos::all().any(|start| {
                (0..RING_SIZE).all(|i| self.ring_color(start.step(i, dir)) == other.ring[i])
            })
        })
    }

    /// Minimum raw key across all symmetries.
    ///
    /// Equivalent boards share it. Diagnostics only; enumeration buckets by raw key.
    pub fn canonical_key(&self) -> BoardKey {
        self.symmetries()
            .iter()
            .map(Board::raw_key)
            .min()
            .unwrap_or_else(|| self.raw_key())
    }

    // ========== Formatting ==========

    /// Row-major cell order used by the text notation.
    const NOTATION_ORDER: [Cell; 9] = [
        Cell::Ring(Pos(1)),
        Cell::Ring(Pos(2)),
        Cell::Ring(Pos(3)),
        Cell::Ring(Pos(4)),
        Cell::Center,
        Cell::Ring(Pos(5)),
        Cell::Ring(Pos(6)),
        Cell::Ring(Pos(7)),
        Cell::Ring(Pos(8)),
    ];

    /// Three-line grid for diagnostics.
    pub fn render(&self) -> String {
        Self::NOTATION_ORDER
            .chunks(3)
            .map(|row| {
                row.iter()
                    .map(|&cell| self.color(cell).symbol().to_string())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for cell in Self::NOTATION_ORDER {
            write!(f, "{}", self.color(cell).symbol())?;
        }
        Ok(())
    }
}

impl FromStr for Board {
    type Err = BoardError;

    fn from_str(s: &str) -> Result<Board, BoardError> {
        let symbols: Vec<char> = s.trim().chars().collect();
        if symbols.len() != Self::NOTATION_ORDER.len() {
            return Err(BoardError::BadLength(symbols.len()));
        }

        let mut board = Board::new();
        for (&cell, &c) in Self::NOTATION_ORDER.iter().zip(&symbols) {
            board.set(cell, Color::from_symbol(c).ok_or(BoardError::BadSymbol(c))?);
        }
        board.validate()?;
        Ok(board)
    }
}

impl From<Board> for String {
    fn from(board: Board) -> String {
        board.to_string()
    }
}

impl TryFrom<String> for Board {
    type Error = BoardError;

    fn try_from(s: String) -> Result<Board, BoardError> {
        s.parse()
    }
}

// ============================================================================
// LEGAL ACTIONS
// ============================================================================

/// Something a player can do on their turn.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum Action {
    /// Put a new piece on an empty cell.
    Place(Cell),
    /// Move an own piece to an empty adjacent cell (after placement).
    Move { from: Cell, to: Cell },
}

/// Move generation consumed by strategy search.
pub trait LegalActions {
    /// Actions available to `color` on `board`.
    fn legal_actions(&self, board: &Board, color: Color) -> Vec<Action>;
}

/// Placement-phase rules only.
///
/// Yields one placement per empty cell while `color` still has pieces to
/// place. Post-placement movement is not generated.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlacementRules;

impl LegalActions for PlacementRules {
    fn legal_actions(&self, board: &Board, color: Color) -> Vec<Action> {
        if !color.is_piece() || board.count(color) >= PIECES_PER_COLOR {
            return Vec::new();
        }
        board.empty_cells().map(Action::Place).collect()
    }
}
