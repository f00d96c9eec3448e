//! Exhaustive memoised search for the best PopStar score.
//!
//! `Solver::explore_subtree` is a single-threaded depth-first search that
//! records the best `Future` of every position it resolves in the shared
//! `MemoStore`. `Solver::explore` fans the first move out over a bounded
//! worker pool, and `Solver::replay` walks the stored futures back from the
//! initial position to rebuild the winning move sequence.
use crate::engine::{Board, Future, Master, Point};
use crate::memo::{Claim, MemoStore, HASH_SIZE};
use crate::score::{get_bonus_score, get_score, Score};
use log::{debug, info};
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;

/// Default number of first moves explored concurrently.
pub const THREAD_PERMISSION: usize = 10;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverConfig {
    /// Worker threads for the first-move fan-out.
    pub threads: usize,
    /// Bucket count of the memo store.
    pub buckets: usize,
}

impl Default for SolverConfig {
    fn default() -> Self {
        SolverConfig {
            threads: THREAD_PERMISSION,
            buckets: HASH_SIZE,
        }
    }
}

/// One move of a replayed solution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Step {
    /// Position before the move.
    pub board: Board,
    /// The move played.
    pub mv: Point,
    /// Number of playable groups on `board`.
    pub options: usize,
    /// Points earned by the move.
    pub gained: Score,
}

/// A winning move sequence rebuilt from the memo store.
#[derive(Clone, Debug)]
pub struct Solution {
    /// Total of every step's points plus the end bonus.
    pub score: Score,
    pub steps: Vec<Step>,
    /// Position after the last move, with no playable group left.
    pub final_board: Board,
    /// Bonus for the cells left on `final_board`.
    pub bonus: Score,
}

impl Solution {
    pub fn moves(&self) -> Vec<Point> {
        self.steps.iter().map(|step| step.mv).collect()
    }
}

pub struct Solver {
    master: Master,
    store: MemoStore,
    config: SolverConfig,
}

impl Solver {
    pub fn new(master: Master, config: SolverConfig) -> Self {
        info!(
            "Allocating memo store with {} buckets for {} threads",
            config.buckets, config.threads
        );
        Solver {
            master,
            store: MemoStore::new(config.buckets),
            config,
        }
    }

    pub fn master(&self) -> &Master {
        &self.master
    }

    pub fn store(&self) -> &MemoStore {
        &self.store
    }

    /// Best score reachable from `board`, computing and memoising it if no
    /// thread has done so yet.
    ///
    /// If another thread holds the claim on `board`'s key, this waits for its
    /// result. A thread only ever waits on positions with fewer cells than the
    /// ones it owns, so waits cannot form a cycle.
    pub fn explore_subtree(&self, board: &Board) -> Score {
        let key = board.key();
        let baseline = board.cell_count();

        if let Some(record) = self.store.lookup(key) {
            return record.wait().best_score;
        }
        let record = match self.store.claim(key) {
            Claim::Granted(record) => record,
            Claim::Taken(record) => return record.wait().best_score,
        };

        let options = board.options();
        let mut result = Future::PENDING;
        if options.is_empty() {
            result = Future::new(get_bonus_score(baseline), Point::NO_MOVE);
        } else {
            for mv in options {
                let next = board.play(mv, &self.master);
                let score = self.explore_subtree(&next) + get_score(baseline - next.cell_count());
                result.absorb(Future::new(score, mv));
            }
        }

        record.resolve(result);
        result.best_score
    }

    /// Explores every first move from the master position on the worker pool
    /// and returns the best future found.
    ///
    /// First moves with equal scores resolve to the one listed first by
    /// `Board::options`, so the result does not depend on thread timing.
    pub fn explore(&self) -> Result<Future, String> {
        let root = *self.master.board();
        let baseline = root.cell_count();
        let options = root.options();
        if options.is_empty() {
            return Ok(Future::new(get_bonus_score(baseline), Point::NO_MOVE));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.config.threads.max(1))
            .thread_name(|i| format!("explore-{}", i))
            .build()
            .map_err(|e| format!("Failed to start worker pool: {}", e))?;

        // (best future, index of its first move)
        let best = Mutex::new((Future::PENDING, usize::MAX));
        pool.install(|| {
            options
                .par_iter()
                .enumerate()
                .with_max_len(1)
                .for_each(|(index, &mv)| {
                    let next = root.play(mv, &self.master);
                    let score =
                        self.explore_subtree(&next) + get_score(baseline - next.cell_count());
                    debug!("First move {} scores {}", mv, score);

                    let mut guard = best.lock().unwrap_or_else(PoisonError::into_inner);
                    let (future, best_index) = &mut *guard;
                    if score > future.best_score
                        || (score == future.best_score && index < *best_index)
                    {
                        *future = Future::new(score, mv);
                        *best_index = index;
                    }
                });
        });

        let (future, _) = best.into_inner().unwrap_or_else(PoisonError::into_inner);
        Ok(future)
    }

    /// Rebuilds the move sequence behind `future`, the result of `explore`.
    ///
    /// Fails if the chain references a position missing from the store, an
    /// unplayable move, or if the replayed points do not add up to the
    /// reported score.
    pub fn replay(&self, future: &Future) -> Result<Solution, String> {
        let mut board = *self.master.board();
        let mut steps = Vec::new();
        let mut total: Score = 0;
        let mut next_move = future.best_move;

        while !next_move.is_no_move() {
            let options = board.options();
            if !options.contains(&next_move) {
                return Err(format!(
                    "Stored move {} is not playable on position {}",
                    next_move,
                    board.key()
                ));
            }
            let next = board.play(next_move, &self.master);
            let gained = get_score(board.cell_count() - next.cell_count());
            total += gained;
            steps.push(Step {
                board,
                mv: next_move,
                options: options.len(),
                gained,
            });

            board = next;
            let record = self
                .store
                .lookup(board.key())
                .ok_or_else(|| format!("Position {} missing from the memo store", board.key()))?;
            let stored = record.future();
            if stored.is_pending() {
                return Err(format!("Position {} was never resolved", board.key()));
            }
            next_move = stored.best_move;
        }

        let bonus = get_bonus_score(board.cell_count());
        let score = total + bonus;
        if score != future.best_score {
            return Err(format!(
                "Replayed score {} does not match explored score {}",
                score, future.best_score
            ));
        }
        Ok(Solution {
            score,
            steps,
            final_board: board,
            bonus,
        })
    }

    /// Runs the full search from the master position and rebuilds the solution.
    pub fn solve(&self) -> Result<Solution, String> {
        let started = Instant::now();
        info!(
            "Exploring position {} with {} cells",
            self.master.board().key(),
            self.master.board().cell_count()
        );
        let future = self.explore()?;
        info!(
            "Best score {} found in {:.2?}, {} positions memoised",
            future.best_score,
            started.elapsed(),
            self.store.len()
        );
        self.replay(&future)
    }
}
