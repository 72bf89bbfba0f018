//! Triangle-strip index generation over a regular grid
//!
//! The grid is covered by one continuous strip that walks down a band of two
//! rows, zig-zagging column by column, then turns at the edge and sweeps the
//! next band in the opposite direction. Each turn repeats one index, which
//! yields a zero-area triangle instead of a primitive restart.

/// Number of indices in the strip for a `height x width` grid
pub fn strip_index_count(height: u32, width: u32) -> usize {
    let (h, w) = (height as usize, width as usize);
    h * w + (h - 2) * (w - 1)
}

/// Number of triangles a strip of `index_count` indices rasterizes,
/// including the zero-area ones at each turn
pub fn strip_triangle_count(index_count: usize) -> usize {
    index_count.saturating_sub(2)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Step {
    Down,
    UpAndOver,
}

/// Iterator over the strip indices of a `height x width` grid
#[derive(Clone, Debug)]
pub struct StripWalk {
    width: i64,
    row: i64,
    col: i64,
    step: Step,
    direction: i64,
    /// Set right after a turn so the edge we turned on isn't taken as a
    /// second turn
    first_step: bool,
    remaining: usize,
}

impl StripWalk {
    pub fn new(height: u32, width: u32) -> Self {
        debug_assert!(height >= 2 && width >= 2, "strip grid must be at least 2x2");
        Self {
            width: width as i64,
            row: 0,
            col: 0,
            step: Step::Down,
            direction: 1,
            first_step: true,
            remaining: strip_index_count(height, width),
        }
    }

    fn advance(&mut self) {
        match self.step {
            Step::Down => {
                self.row += 1;
                self.step = Step::UpAndOver;
            }
            Step::UpAndOver => {
                self.row -= 1;
                self.col += self.direction;
                self.step = Step::Down;
            }
        }

        if self.col == 0 || self.col == self.width - 1 {
            if !self.first_step && self.step == Step::UpAndOver {
                // band finished: drop into the next one and sweep back
                self.step = Step::Down;
                self.direction = -self.direction;
                self.first_step = true;
            } else {
                self.first_step = false;
            }
        }
    }
}

impl Iterator for StripWalk {
    type Item = u32;

    fn next(&mut self) -> Option<u32> {
        if self.remaining == 0 {
            return None;
        }
        let index = (self.row * self.width + self.col) as u32;
        self.remaining -= 1;
        if self.remaining > 0 {
            self.advance();
        }
        Some(index)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for StripWalk {}

/// Generate the strip indices for a `height x width` grid.
///
/// Depends only on the dimensions, never on sample values.
pub fn generate_indices(height: u32, width: u32) -> Vec<u32> {
    StripWalk::new(height, width).collect()
}

/// Whether three strip indices form a zero-area triangle on the grid
pub fn is_degenerate(a: u32, b: u32, c: u32, width: u32) -> bool {
    let cell = |i: u32| ((i / width) as i64, (i % width) as i64);
    let (r0, c0) = cell(a);
    let (r1, c1) = cell(b);
    let (r2, c2) = cell(c);
    (r1 - r0) * (c2 - c0) - (c1 - c0) * (r2 - r0) == 0
}
