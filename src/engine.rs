//! Bit-packed board for the 8x8 PopStar puzzle.
//!
//! This module defines the game's fundamental components:
//! - `Board`: eight packed column words plus the compressed `Key` of the
//!   position. Provides cell access, group flood fills, elimination with
//!   gravity and column shifting, and option enumeration.
//! - `Master`: the puzzle as originally loaded. Every `Key` is computed
//!   relative to it, so it is built once and only ever borrowed afterwards.
//! - `Key`: the compressed identity of a position, shared by every board with
//!   the same remaining cells.
//! - `Point` and `Future`: a move, and the best result reachable with it.
use crate::bit::block_pext_u32;
use crate::score::Score;
use arrayvec::ArrayVec;
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use std::fmt;

/// Number of columns on the board.
pub const MAX_X: usize = 8;
/// Number of rows on the board. Row 0 is the bottom row.
pub const MAX_Y: usize = 8;
/// Number of cells on a full board.
pub const PUZZLE_SIZE: usize = MAX_X * MAX_Y;
/// Largest colour value a cell can hold; 0 means empty.
pub const MAX_COLOUR: u32 = 7;

/// Mask of one 3-bit cell at the bottom of a column word.
pub const TRIPLET_MASK: u32 = 0b111;

/// Bit offset of each row inside a column word. The extra slot addresses the
/// bits just above the top row, which are always zero, so `at(x, MAX_Y)` reads
/// as an empty cell.
const SHIFT: [u32; MAX_Y + 1] = [0, 3, 6, 9, 12, 15, 18, 21, 24];

#[inline]
fn cell(column: u32, y: usize) -> u32 {
    (column >> SHIFT[y]) & TRIPLET_MASK
}

/// A cell coordinate used as a move. `x` counts columns from the left and `y`
/// rows from the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: u8,
    pub y: u8,
}

impl Point {
    /// Sentinel meaning "no further move". Doubles as the marker for an option
    /// that has already been explored.
    pub const NO_MOVE: Point = Point {
        x: MAX_X as u8,
        y: MAX_Y as u8,
    };

    pub const fn new(x: usize, y: usize) -> Self {
        Point {
            x: x as u8,
            y: y as u8,
        }
    }

    pub fn is_no_move(&self) -> bool {
        self.x as usize >= MAX_X || self.y as usize >= MAX_Y
    }

    pub fn coords(&self) -> (usize, usize) {
        (self.x as usize, self.y as usize)
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_no_move() {
            write!(f, "Point:[ END POINT ]")
        } else {
            write!(f, "Point:[{},{}]", self.x, self.y)
        }
    }
}

/// The best score reachable from a position and the move that starts it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Future {
    pub best_score: Score,
    pub best_move: Point,
}

impl Future {
    /// Score of a future that has not been computed yet.
    pub const PENDING_SCORE: Score = -1;

    pub const PENDING: Future = Future {
        best_score: Self::PENDING_SCORE,
        best_move: Point::NO_MOVE,
    };

    pub const fn new(best_score: Score, best_move: Point) -> Self {
        Future {
            best_score,
            best_move,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.best_score == Self::PENDING_SCORE
    }

    /// Replaces `self` with `other` if `other` scores strictly higher.
    /// Ties keep the future found first. Returns whether `self` changed.
    pub fn absorb(&mut self, other: Future) -> bool {
        if other.best_score > self.best_score {
            *self = other;
            true
        } else {
            false
        }
    }
}

impl Default for Future {
    fn default() -> Self {
        Future::PENDING
    }
}

/// Compressed identity of a board.
///
/// `keep` holds one byte per surviving column (leftmost column in the lowest
/// byte). Bit `y` of a byte is set when row `y` of the matching master column
/// is still present, so the population count of `keep` is the number of cells
/// left. `layout` has bit `m` set when master column `m` is the origin of one
/// of those bytes; without it two boards built from different master columns
/// could share the same `keep`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Key {
    pub keep: u64,
    pub layout: u8,
}

impl Key {
    pub fn cell_count(&self) -> usize {
        self.keep.count_ones() as usize
    }

    /// Per-column keep bytes, leftmost column first.
    pub fn keep_map(&self) -> [u8; MAX_X] {
        self.keep.to_le_bytes()
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016X}/{:02X}", self.keep, self.layout)
    }
}

/// The game board: eight columns of eight 3-bit cells.
///
/// Colours stack from row 0 upward and a column never has an empty cell below
/// a filled one. The cached `Key` is only meaningful after `compress` (which
/// `eliminate` and `Master::new` call for you).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Board {
    columns: [u32; MAX_X],
    key: Key,
}

impl Board {
    /// Creates a board with every cell empty.
    ///
    /// # Examples
    /// ```
    /// use popstar_exhaustive::engine::Board;
    /// let board = Board::new_empty();
    /// assert_eq!(board.at(0, 0), 0);
    /// ```
    pub fn new_empty() -> Self {
        Board::default()
    }

    /// Creates a board from raw column words. The key is left empty until the
    /// board is compressed.
    pub fn from_columns(columns: [u32; MAX_X]) -> Self {
        Board {
            columns,
            key: Key::default(),
        }
    }

    /// Creates a full board with random colours in `1..=colours`.
    ///
    /// The same seed always produces the same board. `colours` is clamped to
    /// the range a 3-bit cell can represent.
    pub fn new_random_with_seed(seed: u64, colours: u32) -> Self {
        let colours = colours.clamp(1, MAX_COLOUR);
        let mut rng = SmallRng::seed_from_u64(seed);
        let mut board = Board::new_empty();
        for x in 0..MAX_X {
            for y in 0..MAX_Y {
                board.set(x, y, rng.gen_range(1..=colours));
            }
        }
        board
    }

    /// Returns the colour at column `x`, row `y` (0 when empty).
    ///
    /// `y == MAX_Y` is allowed and always reads as empty, which keeps the
    /// adjacency test at the top edge branch-free.
    #[inline]
    pub fn at(&self, x: usize, y: usize) -> u32 {
        cell(self.columns[x], y)
    }

    /// Writes `colour` into the cell at (`x`, `y`).
    pub fn set(&mut self, x: usize, y: usize, colour: u32) {
        self.clear(x, y);
        self.columns[x] |= (colour & TRIPLET_MASK) << SHIFT[y];
    }

    #[inline]
    pub fn clear(&mut self, x: usize, y: usize) {
        self.columns[x] &= !(TRIPLET_MASK << SHIFT[y]);
    }

    /// Marks every bit of the cell, the form used by flood fill footprints.
    #[inline]
    pub fn fill(&mut self, x: usize, y: usize) {
        self.columns[x] |= TRIPLET_MASK << SHIFT[y];
    }

    pub fn column(&self, x: usize) -> u32 {
        self.columns[x]
    }

    pub fn columns(&self) -> &[u32; MAX_X] {
        &self.columns
    }

    pub fn key(&self) -> Key {
        self.key
    }

    /// Number of cells left, read from the compressed key.
    pub fn cell_count(&self) -> usize {
        self.key.cell_count()
    }

    /// True when the cell is filled and matches the cell above it or, except
    /// in the last column, the cell to its right.
    ///
    /// Every group of two or more cells has at least one linked cell, so
    /// scanning for linked cells finds every playable group.
    pub fn linked(&self, x: usize, y: usize) -> bool {
        let colour = self.at(x, y);
        if colour == 0 {
            return false;
        }
        if x == MAX_X - 1 {
            colour == self.at(x, y + 1)
        } else {
            colour == self.at(x, y + 1) || colour == self.at(x + 1, y)
        }
    }

    /// Removes the group containing (`x`, `y`) from this board and returns a
    /// footprint board with exactly those cells filled.
    ///
    /// The seed cell must not be empty.
    pub fn flood_fill(&mut self, x: usize, y: usize) -> Board {
        let mut footprint = Board::new_empty();
        self.flood(x, y, |fx, fy| footprint.fill(fx, fy));
        footprint
    }

    /// Removes the group containing (`x`, `y`) without recording it.
    pub fn fast_flood_fill(&mut self, x: usize, y: usize) {
        self.flood(x, y, |_, _| {});
    }

    // Cells are cleared as they are pushed, so no cell is visited twice and
    // the stack never holds more than PUZZLE_SIZE points.
    fn flood(&mut self, x: usize, y: usize, mut on_clear: impl FnMut(usize, usize)) {
        let colour = self.at(x, y);
        debug_assert_ne!(colour, 0, "flood fill seeded on an empty cell");

        let mut stack: ArrayVec<Point, PUZZLE_SIZE> = ArrayVec::new();
        self.clear(x, y);
        on_clear(x, y);
        stack.push(Point::new(x, y));

        while let Some(current) = stack.pop() {
            let (cx, cy) = current.coords();
            let neighbours = [
                (cx + 1, cy),
                (cx.wrapping_sub(1), cy),
                (cx, cy + 1),
                (cx, cy.wrapping_sub(1)),
            ];
            for (nx, ny) in neighbours {
                if nx < MAX_X && ny < MAX_Y && self.at(nx, ny) == colour {
                    self.clear(nx, ny);
                    on_clear(nx, ny);
                    stack.push(Point::new(nx, ny));
                }
            }
        }
    }

    /// Slides non-empty columns left over any empty ones, keeping their order.
    fn shrink_columns(&mut self) {
        let mut write_x = 0;
        for read_x in 0..MAX_X {
            let column = self.columns[read_x];
            if column != 0 {
                if read_x != write_x {
                    self.columns[write_x] = column;
                    self.columns[read_x] = 0;
                }
                write_x += 1;
            }
        }
    }

    /// Removes every cell marked in `footprint`, lets the cells above fall,
    /// closes empty columns and recompresses the key against `master`.
    pub fn eliminate(&mut self, footprint: &Board, master: &Master) {
        for (column, &removed) in self.columns.iter_mut().zip(footprint.columns.iter()) {
            if removed != 0 {
                *column = block_pext_u32(*column, removed);
            }
        }
        self.shrink_columns();
        self.compress(master);
    }

    /// Applies gravity and column shifting to a board whose cells were written
    /// directly, e.g. one parsed from text with holes in it.
    pub fn settle(&mut self) {
        for column in self.columns.iter_mut() {
            let mut holes = 0;
            for y in 0..MAX_Y {
                if cell(*column, y) == 0 {
                    holes |= TRIPLET_MASK << SHIFT[y];
                }
            }
            *column = block_pext_u32(*column, holes);
        }
        self.shrink_columns();
    }

    /// Plays `mv` on this board.
    pub fn play_in_place(&mut self, mv: Point, master: &Master) {
        let (x, y) = mv.coords();
        let footprint = self.flood_fill(x, y);
        self.eliminate(&footprint, master);
    }

    /// Returns the board that results from playing `mv`.
    pub fn play(&self, mv: Point, master: &Master) -> Board {
        let mut next = *self;
        next.play_in_place(mv, master);
        next
    }

    /// Lists one representative cell per playable group, in column-major
    /// order (left to right, bottom to top).
    pub fn options(&self) -> Vec<Point> {
        let mut options = Vec::new();
        let mut scratch = *self;
        for x in 0..MAX_X {
            for y in 0..MAX_Y {
                if scratch.linked(x, y) {
                    options.push(Point::new(x, y));
                    scratch.fast_flood_fill(x, y);
                }
            }
        }
        options
    }

    /// Recomputes the key of this board relative to `master` and returns it.
    ///
    /// Each column is matched against the master columns in order, starting
    /// after the master column the previous column matched. Within a column the
    /// remaining cells are matched greedily as a subsequence of the master
    /// column's cells.
    pub fn compress(&mut self, master: &Master) -> Key {
        let mut keep = [0u8; MAX_X];
        let mut layout = 0u8;
        let mut x = 0;
        for (master_x, &master_column) in master.board.columns.iter().enumerate() {
            if x == MAX_X {
                break;
            }
            let map = keep_map(master_column, self.columns[x]);
            if map != 0 {
                keep[x] = map;
                layout |= 1 << master_x;
                x += 1;
            }
        }
        self.key = Key {
            keep: u64::from_le_bytes(keep),
            layout,
        };
        self.key
    }

    /// Renders the board with optional highlighting of one cell.
    ///
    /// The first line shows the key and cell count, followed by the rows from
    /// the top (row 7) down to row 0, then the column numbers. Cells are drawn
    /// with ANSI background colours; the highlighted cell shows `..`.
    pub fn to_string_with_highlight(&self, pos: Option<Point>) -> String {
        let mut output = format!("Key: {}\tCell Count: {}\n", self.key, self.cell_count());

        for y in (0..MAX_Y).rev() {
            output.push_str(&format!(" {}  ", y));
            for x in 0..MAX_X {
                let colour = self.at(x, y);
                let is_highlight = pos.map_or(false, |p| p == Point::new(x, y));
                let content = if is_highlight {
                    "..".to_string()
                } else if colour == 0 {
                    "  ".to_string()
                } else {
                    format!("{} ", colour)
                };
                output.push_str(&format!("\x1b[1;{}m{}\x1b[m", 40 + colour, content));
            }
            output.push('\n');
        }

        output.push_str("    ");
        for x in 0..MAX_X {
            output.push_str(&format!("{:<2}", x));
        }
        output
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_string_with_highlight(None))
    }
}

// Keep byte for one column, or 0 if `column` cannot be explained by
// `master_column`.
fn keep_map(master_column: u32, column: u32) -> u8 {
    if column == 0 {
        return 0;
    }
    if cell(column, MAX_Y - 1) != 0 {
        // A full column can only be the untouched master column.
        return if column == master_column { u8::MAX } else { 0 };
    }

    let mut map = 0u8;
    let mut y = 0;
    for master_y in 0..MAX_Y {
        if cell(column, y) == cell(master_column, master_y) {
            map |= 1 << master_y;
            y += 1;
            if cell(column, y) == 0 {
                return map;
            }
        }
    }
    0
}

/// The puzzle as loaded, the reference layout for every `Key`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Master {
    board: Board,
}

impl Master {
    /// Wraps a settled board and compresses it against itself.
    pub fn new(board: Board) -> Self {
        let mut master = Master { board };
        let mut compressed = master.board;
        compressed.compress(&master);
        master.board = compressed;
        master
    }

    /// The initial position, with its key computed.
    pub fn board(&self) -> &Board {
        &self.board
    }
}
