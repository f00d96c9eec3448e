//! Points awarded for removing a group and for the cells left at the end.

/// Score values. Wide enough for any reachable total on an 8x8 board.
pub type Score = i32;

const GROUP_SCORES: [Score; 31] = [
    0, 0, 20, 45, 80, 125, 180, 245, 320, 405, 500, 605, 720, 845, 980, 1125, 1280, 1445, 1620,
    1805, 2000, 2205, 2420, 2645, 2880, 3125, 3380, 3645, 3920, 4205, 4500,
];

const BONUS_SCORES: [Score; 10] = [2000, 1980, 1920, 1820, 1680, 1500, 1280, 1020, 720, 380];

/// Points for removing a group of `n` cells.
///
/// Follows `5 * n * n` for every group that can actually be removed (`n >= 2`);
/// a single cell is worth nothing.
///
/// # Examples
/// ```
/// use popstar_exhaustive::score::get_score;
/// assert_eq!(get_score(4), 80);
/// assert_eq!(get_score(40), 8000);
/// ```
pub fn get_score(n: usize) -> Score {
    match GROUP_SCORES.get(n) {
        Some(&score) => score,
        None => {
            let n = n as Score;
            5 * n * n
        }
    }
}

/// End-of-game bonus for `n` remaining cells. Zero once ten or more cells remain.
///
/// # Examples
/// ```
/// use popstar_exhaustive::score::get_bonus_score;
/// assert_eq!(get_bonus_score(0), 2000);
/// assert_eq!(get_bonus_score(10), 0);
/// ```
pub fn get_bonus_score(n: usize) -> Score {
    BONUS_SCORES.get(n).copied().unwrap_or(0)
}
