//! Property-based tests for the board transforms, scoring and search.

use proptest::prelude::*;

use popstar_exhaustive::engine::{Board, Master, MAX_X, MAX_Y};
use popstar_exhaustive::score::{get_bonus_score, get_score, Score};
use popstar_exhaustive::solver::{Solver, SolverConfig};

/// Strategy: up to four columns of up to four cells in three colours.
fn columns_strategy() -> impl Strategy<Value = Vec<Vec<u32>>> {
    prop::collection::vec(prop::collection::vec(1..=3u32, 0..=4), 1..=4)
}

fn build_master(columns: &[Vec<u32>]) -> Master {
    let mut board = Board::new_empty();
    for (x, column) in columns.iter().enumerate() {
        for (y, &colour) in column.iter().enumerate() {
            board.set(x, y, colour);
        }
    }
    board.settle();
    Master::new(board)
}

fn count_colour(board: &Board, colour: u32) -> usize {
    (0..MAX_X)
        .flat_map(|x| (0..MAX_Y).map(move |y| (x, y)))
        .filter(|&(x, y)| board.at(x, y) == colour)
        .count()
}

fn count_cells(board: &Board) -> usize {
    (0..MAX_X)
        .flat_map(|x| (0..MAX_Y).map(move |y| (x, y)))
        .filter(|&(x, y)| board.at(x, y) != 0)
        .count()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // 1. The key's population count is the number of cells left
    #[test]
    fn key_counts_cells(columns in columns_strategy()) {
        let master = build_master(&columns);
        let expected: usize = columns.iter().map(Vec::len).sum();
        prop_assert_eq!(master.board().cell_count(), expected);
        prop_assert_eq!(count_cells(master.board()), expected);
    }

    // 2. Compress is idempotent along any line of play
    #[test]
    fn compress_idempotent(columns in columns_strategy(), picks in prop::collection::vec(0..8usize, 0..6)) {
        let master = build_master(&columns);
        let mut board = *master.board();
        for pick in picks {
            let options = board.options();
            if options.is_empty() {
                break;
            }
            board.play_in_place(options[pick % options.len()], &master);
            let key = board.key();
            prop_assert_eq!(board.compress(&master), key);
            prop_assert_eq!(key.cell_count(), count_cells(&board));
        }
    }

    // 3. Eliminating a group removes exactly that group's cells
    #[test]
    fn eliminate_removes_group(columns in columns_strategy()) {
        let master = build_master(&columns);
        let board = *master.board();
        for mv in board.options() {
            let (x, y) = mv.coords();
            let colour = board.at(x, y);
            let mut after = board;
            let footprint = after.flood_fill(x, y);
            let group = count_cells(&footprint);
            after.eliminate(&footprint, &master);

            prop_assert!(group >= 2);
            prop_assert_eq!(after.cell_count() + group, board.cell_count());
            prop_assert_eq!(count_colour(&after, colour) + group, count_colour(&board, colour));
        }
    }

    // 4. Options name each group once and cover every linked cell
    #[test]
    fn options_one_per_group(columns in columns_strategy()) {
        let master = build_master(&columns);
        let board = *master.board();
        let options = board.options();

        let mut covered = Board::new_empty();
        for (i, a) in options.iter().enumerate() {
            let (ax, ay) = a.coords();
            let mut scratch = board;
            let footprint = scratch.flood_fill(ax, ay);
            for b in options.iter().skip(i + 1) {
                let (bx, by) = b.coords();
                prop_assert_eq!(footprint.at(bx, by), 0, "{} and {} share a group", a, b);
            }
            for x in 0..MAX_X {
                for y in 0..MAX_Y {
                    if footprint.at(x, y) != 0 {
                        covered.fill(x, y);
                    }
                }
            }
        }
        for x in 0..MAX_X {
            for y in 0..MAX_Y {
                if board.linked(x, y) {
                    prop_assert_ne!(covered.at(x, y), 0, "linked cell ({}, {}) not covered", x, y);
                }
            }
        }
    }

    // 5. Group score never decreases, bonus never increases
    #[test]
    fn score_monotonic(n in 0..100usize) {
        prop_assert!(get_score(n) <= get_score(n + 1));
        prop_assert!(get_bonus_score(n) >= get_bonus_score(n + 1));
        if n >= 10 {
            prop_assert_eq!(get_bonus_score(n), 0);
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    // 6. The replayed path adds up to the explored score
    #[test]
    fn replay_adds_up(columns in columns_strategy(), threads in 1..5usize) {
        let master = build_master(&columns);
        let solver = Solver::new(master.clone(), SolverConfig { threads, buckets: 257 });
        let future = solver.explore().unwrap();
        let solution = solver.replay(&future).unwrap();

        let gained: Score = solution.steps.iter().map(|step| step.gained).sum();
        prop_assert_eq!(gained + solution.bonus, future.best_score);
        prop_assert!(solution.final_board.options().is_empty());
        prop_assert_eq!(solution.bonus, get_bonus_score(solution.final_board.cell_count()));

        let mut board = *master.board();
        for step in &solution.steps {
            prop_assert_eq!(step.board, board);
            board.play_in_place(step.mv, &master);
        }
        prop_assert_eq!(board, solution.final_board);
    }
}
