//! # PopStar Exhaustive Solver Library
//!
//! This library finds the highest reachable score of an 8x8 PopStar puzzle by
//! searching every move sequence, sharing work between equivalent positions
//! through a memo table keyed by a compressed board identity.
//!
//! It is used by the `ai_solver` binary, which loads a puzzle file (or
//! generates a random board), runs the search on several threads, prints the
//! memo table's bucket distribution and replays the winning moves.
//!
//! ## Modules
//! - `score`: points for removing a group and the end-of-game bonus.
//! - `bit`: bit extraction helpers used to compact columns.
//! - `engine`: the bit-packed `Board`, the `Master` reference layout, `Key`
//!   compression, flood fills, elimination and option enumeration.
//! - `memo`: the concurrent memo table with claim-once semantics.
//! - `solver`: the memoised depth-first search, the parallel first-move
//!   fan-out and solution replay.
//! - `diagnostics`: the memo table bucket-size report.
//! - `utils`: parsing puzzle text and files into boards.

pub mod bit;
pub mod diagnostics;
pub mod engine;
pub mod memo;
pub mod score;
pub mod solver;
pub mod utils;
