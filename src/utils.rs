use crate::engine::{Board, MAX_COLOUR, MAX_X, MAX_Y};
use std::fs;
use std::path::Path;

/// Parses an array of string slices into a settled `Board`.
///
/// Rows are given top to bottom, the way they appear in a puzzle file: the
/// last string is row 0, the bottom of the board. At most `MAX_Y` rows of at
/// most `MAX_X` characters are accepted. Missing rows and the tail of short
/// rows are empty.
///
/// Valid characters are the digits `'0'` to `'7'`; `'0'` is an empty cell and
/// any other digit is that cell's colour. Cells floating above an empty cell
/// fall, and empty columns are closed, so the result always satisfies gravity.
///
/// # Returns
/// * `Ok(Board)` if parsing is successful. The key is not yet computed; wrap
///   the board in a `Master` (or compress it against one) before searching.
/// * `Err(String)` if:
///     - The number of rows exceeds `MAX_Y`.
///     - Any row is longer than `MAX_X` characters.
///     - A character other than `'0'..='7'` is encountered.
///
/// # Examples
/// ```
/// use popstar_exhaustive::utils::board_from_str_array;
///
/// let board = board_from_str_array(&[
///     "1",   // row 1
///     "23",  // row 0
/// ])
/// .unwrap();
/// assert_eq!(board.at(0, 0), 2);
/// assert_eq!(board.at(0, 1), 1);
/// assert_eq!(board.at(1, 0), 3);
/// assert_eq!(board.at(1, 1), 0);
///
/// assert!(board_from_str_array(&["19"]).is_err());
/// ```
pub fn board_from_str_array(s: &[&str]) -> Result<Board, String> {
    if s.len() > MAX_Y {
        return Err(format!(
            "Invalid number of rows. Expected at most {}, found {}",
            MAX_Y,
            s.len()
        ));
    }

    let mut board = Board::new_empty();

    for (r, row_str) in s.iter().enumerate() {
        let y = s.len() - 1 - r;

        if row_str.chars().count() > MAX_X {
            return Err(format!(
                "Row {} is too long. Expected at most {} characters, found {}",
                r,
                MAX_X,
                row_str.chars().count()
            ));
        }

        for (x, char_cell) in row_str.chars().enumerate() {
            let colour = match char_cell.to_digit(10) {
                Some(colour) if colour <= MAX_COLOUR => colour,
                _ => {
                    return Err(format!(
                        "Unrecognized character '{}' in row {} col {}",
                        char_cell, r, x
                    ))
                }
            };
            board.set(x, y, colour);
        }
    }

    board.settle();
    Ok(board)
}

/// Reads a puzzle file: one row per line, top row first, blank lines ignored.
///
/// Surrounding whitespace on each line is trimmed before parsing with
/// [`board_from_str_array`].
pub fn read_puzzle_file(path: &Path) -> Result<Board, String> {
    let content = fs::read_to_string(path)
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;

    let lines: Vec<&str> = content
        .lines()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    board_from_str_array(&lines).map_err(|e| format!("Invalid puzzle {}: {}", path.display(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_board_from_str_array_valid() {
        let board_str = [
            "12345671", // row 7
            "22222222", "33333333", "44444444", "55555555", "66666666", "77777777",
            "11111111", // row 0
        ];
        let board = board_from_str_array(&board_str).unwrap();
        assert_eq!(board.at(0, 0), 1);
        assert_eq!(board.at(0, 1), 7);
        assert_eq!(board.at(0, 7), 1);
        assert_eq!(board.at(6, 7), 7);
        assert_eq!(board.at(7, 7), 1);
    }

    #[test]
    fn test_board_from_str_array_invalid_char() {
        let result = board_from_str_array(&["1234567X"]);
        assert!(result.is_err());
        assert!(result.unwrap_err().contains("Unrecognized character 'X'"));
    }

    #[test]
    fn test_board_from_str_array_colour_out_of_range() {
        let result = board_from_str_array(&["18"]);
        assert!(result.unwrap_err().contains("Unrecognized character '8'"));
    }

    #[test]
    fn test_board_from_str_array_with_spaces() {
        let result = board_from_str_array(&["1 2"]);
        assert!(result.unwrap_err().contains("Unrecognized character ' '"));
    }

    #[test]
    fn test_board_from_str_array_row_too_long() {
        let too_long_row = "1".repeat(MAX_X + 1);
        let result = board_from_str_array(&[too_long_row.as_str()]);
        assert!(result.unwrap_err().contains("Row 0 is too long"));
    }

    #[test]
    fn test_board_from_str_array_too_many_rows() {
        let rows = vec!["1"; MAX_Y + 1];
        let result = board_from_str_array(&rows);
        assert!(result.unwrap_err().contains("Invalid number of rows"));
    }

    #[test]
    fn test_board_from_str_array_empty_input() {
        let board = board_from_str_array(&[]).unwrap();
        assert_eq!(board, Board::new_empty());
    }

    #[test]
    fn test_board_from_str_array_settles_holes() {
        // Column 0 has a hole under the 3, column 1 is empty.
        let board = board_from_str_array(&["30", "00", "105"]).unwrap();
        assert_eq!(board.at(0, 0), 1);
        assert_eq!(board.at(0, 1), 3);
        assert_eq!(board.at(0, 2), 0);
        assert_eq!(board.at(1, 0), 5);
        assert_eq!(board.column(2), 0);
    }

    #[test]
    fn test_read_puzzle_file() {
        let path = std::env::temp_dir().join(format!("popstar_puzzle_{}.txt", std::process::id()));
        {
            let mut file = fs::File::create(&path).unwrap();
            writeln!(file, "12").unwrap();
            writeln!(file).unwrap();
            writeln!(file, " 21 ").unwrap();
        }
        let board = read_puzzle_file(&path).unwrap();
        fs::remove_file(&path).unwrap();
        assert_eq!(board.at(0, 0), 2);
        assert_eq!(board.at(1, 0), 1);
        assert_eq!(board.at(0, 1), 1);
        assert_eq!(board.at(1, 1), 2);
    }

    #[test]
    fn test_read_puzzle_file_missing() {
        let result = read_puzzle_file(Path::new("/definitely/not/here/puzzle.txt"));
        assert!(result.unwrap_err().contains("Failed to read"));
    }
}
