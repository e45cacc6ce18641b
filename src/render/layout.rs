/// Rows taken by the header and footer around the board
const CHROME_ROWS: u16 = 6;
/// Border of the board block on each axis
const BORDER: u16 = 2;
/// Each cell is drawn two characters wide so it looks square
pub const CELL_WIDTH: u16 = 2;

pub const MAX_GRID_SIDE: usize = 20;
pub const MIN_GRID_SIDE: usize = 5;

/// Square board size `(rows, cols)` that fits a terminal of `width` x `height`.
///
/// Capped at [`MAX_GRID_SIDE`]. Tiny terminals still get [`MIN_GRID_SIDE`],
/// the board is clipped rather than shrunk into something unplayable.
pub fn grid_size_for_area(width: u16, height: u16) -> (usize, usize) {
    let rows = height.saturating_sub(CHROME_ROWS + BORDER) as usize;
    let cols = (width.saturating_sub(BORDER) / CELL_WIDTH) as usize;
    let side = rows.min(cols).clamp(MIN_GRID_SIDE, MAX_GRID_SIDE);
    (side, side)
}
