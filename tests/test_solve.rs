//! End-to-end tests: puzzle text in, best score and move sequence out.

use popstar_exhaustive::diagnostics::Distribution;
use popstar_exhaustive::engine::{Board, Master, Point};
use popstar_exhaustive::score::{get_bonus_score, get_score};
use popstar_exhaustive::solver::{Solver, SolverConfig};
use popstar_exhaustive::utils::{board_from_str_array, read_puzzle_file};
use std::fs;

fn config(threads: usize) -> SolverConfig {
    SolverConfig {
        threads,
        buckets: 4099,
    }
}

#[test]
fn test_square_group_clears_board() {
    let master = Master::new(board_from_str_array(&["11", "11"]).unwrap());
    let solver = Solver::new(master, config(2));
    let solution = solver.solve().unwrap();

    assert_eq!(solution.steps.len(), 1);
    assert_eq!(solution.steps[0].gained, get_score(4));
    assert_eq!(solution.bonus, get_bonus_score(0));
    assert_eq!(solution.score, 80 + 2000);
}

#[test]
fn test_square_group_surrounded_by_other_colour() {
    // The 2x2 block of 3s sits inside a ring of 1s.
    let rows = ["1111", "1331", "1331", "1111"];
    let master = Master::new(board_from_str_array(&rows).unwrap());
    let solver = Solver::new(master, config(4));
    let solution = solver.solve().unwrap();

    // Either group first clears the board in two moves; the ring comes first
    // in option order, so it wins the tie.
    assert_eq!(solution.score, get_score(4) + get_score(12) + get_bonus_score(0));
    assert_eq!(solution.moves(), vec![Point::new(0, 0), Point::new(0, 0)]);
}

#[test]
fn test_puzzle_file_round_trip() {
    let path = std::env::temp_dir().join(format!("popstar_e2e_{}.txt", std::process::id()));
    fs::write(&path, "0200\n1210\n1221\n").unwrap();
    let board = read_puzzle_file(&path).unwrap();
    fs::remove_file(&path).unwrap();

    let master = Master::new(board);
    assert_eq!(master.board().cell_count(), 8);

    let solver = Solver::new(master, config(3));
    let solution = solver.solve().unwrap();
    let total: i32 = solution.steps.iter().map(|s| s.gained).sum::<i32>() + solution.bonus;
    assert_eq!(total, solution.score);
    assert!(solution.final_board.options().is_empty());
}

#[test]
fn test_memo_store_diagnostics_after_search() {
    let mut board = Board::new_empty();
    let source = Board::new_random_with_seed(2024, 3);
    for x in 0..5 {
        for y in 0..3 {
            board.set(x, y, source.at(x, y));
        }
    }
    let solver = Solver::new(Master::new(board), config(4));
    solver.solve().unwrap();

    let sizes = solver.store().bucket_sizes();
    assert_eq!(sizes.len(), 4099);
    let dist = Distribution::from_sizes(&sizes, 50);
    assert_eq!(dist.total, solver.store().len());
    assert!(dist.total > 0);
}
