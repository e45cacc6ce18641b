use super::action::Direction;
use rand::Rng;
use std::collections::HashSet;

/// A position on the game grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// The snake in the game
#[derive(Debug, Clone, PartialEq)]
pub struct Snake {
    /// Body segments, with head at index 0
    pub body: Vec<Position>,
    /// Current direction of movement
    pub direction: Direction,
}

impl Snake {
    /// Create a single-segment snake
    pub fn new(head: Position, direction: Direction) -> Self {
        Self {
            body: vec![head],
            direction,
        }
    }

    /// Build a snake from explicit segments, head first
    pub fn from_segments(body: Vec<Position>, direction: Direction) -> Self {
        debug_assert!(!body.is_empty(), "snake needs at least a head");
        Self { body, direction }
    }

    /// Get the head position
    pub fn head(&self) -> Position {
        self.body[0]
    }

    /// Get body segments (excluding head)
    pub fn body_segments(&self) -> &[Position] {
        &self.body[1..]
    }

    /// Get the length of the snake
    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Check if the snake is empty (should never happen in practice)
    pub fn is_empty(&self) -> bool {
        self.body.is_empty()
    }

    pub fn occupies(&self, pos: Position) -> bool {
        self.body.contains(&pos)
    }
}

/// Geometry of the board plus where the snake and the fruit are.
///
/// The grid is a torus: leaving one edge re-enters on the opposite edge.
#[derive(Debug, Clone, PartialEq)]
pub struct GridState {
    pub snake: Snake,
    pub fruit: Position,
    /// Columns
    pub width: usize,
    /// Rows
    pub height: usize,
}

impl GridState {
    pub fn new(snake: Snake, fruit: Position, width: usize, height: usize) -> Self {
        Self {
            snake,
            fruit,
            width,
            height,
        }
    }

    /// Fresh board: a one-cell snake at the centre heading right and a random fruit.
    pub fn centered<R: Rng + ?Sized>(width: usize, height: usize, rng: &mut R) -> Self {
        let head = Position::new((width / 2) as i32, (height / 2) as i32);
        let mut grid = Self::new(Snake::new(head, Direction::Right), head, width, height);
        grid.place_fruit_randomly(rng);
        grid
    }

    /// Move the fruit to a uniformly random cell not covered by the snake.
    ///
    /// Rejection sampling: only terminates while at least one cell is free,
    /// which callers check with [`GridState::has_free_cell`].
    pub fn place_fruit_randomly<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        debug_assert!(self.has_free_cell(), "no free cell left for the fruit");
        loop {
            let x = rng.gen_range(0..self.width) as i32;
            let y = rng.gen_range(0..self.height) as i32;
            let candidate = Position::new(x, y);

            if !self.snake.occupies(candidate) {
                self.fruit = candidate;
                return;
            }
        }
    }

    /// Where the head lands after one step in `heading`, wrapping on both axes.
    pub fn compute_next_head(&self, heading: Direction) -> Position {
        let (dx, dy) = heading.delta();
        let head = self.snake.head();
        Position::new(
            (head.x + dx).rem_euclid(self.width as i32),
            (head.y + dy).rem_euclid(self.height as i32),
        )
    }

    /// Checked against the pre-move body without the head, which is about to
    /// move away. The tail is included even though it would move this tick.
    pub fn would_self_collide(&self, candidate: Position) -> bool {
        self.snake.body_segments().contains(&candidate)
    }

    /// Push `new_head` on the front. Without `ate` the tail drops so the length holds.
    pub fn advance(&mut self, new_head: Position, ate: bool) {
        debug_assert!(self.is_in_bounds(new_head), "head {new_head:?} left the grid");
        self.snake.body.insert(0, new_head);

        if !ate {
            self.snake.body.pop();
        }
    }

    /// Shrink to a new size by pulling every segment inside the border.
    ///
    /// This is a clamp, not a rescale, so several segments can end up sharing
    /// a cell; see [`GridState::overlapping_cells`].
    pub fn clamp_to_bounds(&mut self, new_height: usize, new_width: usize) {
        self.width = new_width;
        self.height = new_height;

        let max_x = new_width as i32 - 1;
        let max_y = new_height as i32 - 1;
        for segment in &mut self.snake.body {
            segment.x = segment.x.min(max_x);
            segment.y = segment.y.min(max_y);
        }
    }

    /// Number of segments sitting on a cell already taken by an earlier segment
    pub fn overlapping_cells(&self) -> usize {
        self.snake.len() - self.occupied_cells()
    }

    pub fn occupied_cells(&self) -> usize {
        self.snake.body.iter().collect::<HashSet<_>>().len()
    }

    pub fn has_free_cell(&self) -> bool {
        self.width * self.height > self.occupied_cells()
    }

    /// Check if a position is within the grid bounds
    pub fn is_in_bounds(&self, pos: Position) -> bool {
        pos.x >= 0 && pos.x < self.width as i32 && pos.y >= 0 && pos.y < self.height as i32
    }
}
