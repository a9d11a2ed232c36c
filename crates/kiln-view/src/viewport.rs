//! Viewport — cursor, scroll offset, and screen dimensions.
//!
//! The cursor `(cx, cy)` is a column and a logical line index. `cy` may sit
//! one past the last line (`cy == numrows`), the empty row below the
//! content. Columns are bounded by the screen width, not by the length of
//! the line under the cursor: the viewer has no per-line column model.
//!
//! `rowoff` is the first logical line shown on screen. It is not moved
//! incrementally; [`Viewport::scroll_to_cursor`] re-derives it from the
//! cursor before every frame so that
//! `rowoff <= cy <= rowoff + rows - 1` always holds when drawing.

use kiln_term::geometry::Size;

/// A single-step cursor movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// A screenful movement. Paging is vertical only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    Up,
    Down,
}

/// Cursor position: column and logical row, both 0-indexed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cursor {
    pub cx: usize,
    pub cy: usize,
}

/// Cursor plus the window onto the line store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Viewport {
    cursor: Cursor,
    rowoff: usize,
    size: Size,
}

impl Viewport {
    /// A viewport at the top-left of a screen of `size`.
    ///
    /// Zero dimensions are raised to 1 so the cursor always has a cell.
    #[must_use]
    pub fn new(size: Size) -> Self {
        Self {
            cursor: Cursor::default(),
            rowoff: 0,
            size: sanitize(size),
        }
    }

    // -- Accessors ----------------------------------------------------------

    /// Screen dimensions.
    #[inline]
    #[must_use]
    pub const fn size(&self) -> Size {
        self.size
    }

    /// Screen height in rows.
    #[inline]
    #[must_use]
    pub fn rows(&self) -> usize {
        usize::from(self.size.rows)
    }

    /// Screen width in columns.
    #[inline]
    #[must_use]
    pub fn cols(&self) -> usize {
        usize::from(self.size.cols)
    }

    /// Current cursor position.
    #[inline]
    #[must_use]
    pub const fn cursor(&self) -> Cursor {
        self.cursor
    }

    /// First visible logical line.
    #[inline]
    #[must_use]
    pub const fn rowoff(&self) -> usize {
        self.rowoff
    }

    // -- Geometry -----------------------------------------------------------

    /// Adopt a new screen size.
    ///
    /// `cx` is pulled back inside the new width. `rowoff` is left for the
    /// next [`scroll_to_cursor`](Self::scroll_to_cursor).
    pub fn resize(&mut self, size: Size) {
        self.size = sanitize(size);
        self.cursor.cx = self.cursor.cx.min(self.cols() - 1);
    }

    /// Bring the cursor's row back into the visible window.
    ///
    /// Above the window: the window starts at the cursor row. Below it: the
    /// cursor row becomes the last visible row.
    pub fn scroll_to_cursor(&mut self) {
        let cy = self.cursor.cy;
        let rows = self.rows();

        if cy < self.rowoff {
            self.rowoff = cy;
        }
        if cy >= self.rowoff + rows {
            self.rowoff = cy + 1 - rows;
        }
    }

    /// Cursor position on screen, 0-indexed `(x, y)`.
    #[must_use]
    pub fn screen_cursor(&self) -> (u16, u16) {
        let x = u16::try_from(self.cursor.cx).unwrap_or(u16::MAX);
        let y = u16::try_from(self.cursor.cy.saturating_sub(self.rowoff)).unwrap_or(u16::MAX);
        (x, y)
    }

    // -- Movement -----------------------------------------------------------

    /// Move one step. No wrapping between lines.
    ///
    /// Left/Right stay within `[0, cols - 1]`; Up/Down stay within
    /// `[0, numrows]`.
    pub fn move_cursor(&mut self, direction: Direction, numrows: usize) {
        let c = &mut self.cursor;
        match direction {
            Direction::Left => c.cx = c.cx.saturating_sub(1),
            Direction::Right => {
                if c.cx + 1 < usize::from(self.size.cols) {
                    c.cx += 1;
                }
            }
            Direction::Up => c.cy = c.cy.saturating_sub(1),
            Direction::Down => {
                if c.cy < numrows {
                    c.cy += 1;
                }
            }
        }
    }

    /// Move a screenful up or down, one row at a time.
    ///
    /// Stops early at row 0 or at `numrows`. The column is untouched.
    pub fn page(&mut self, page: Page, numrows: usize) {
        let direction = match page {
            Page::Up => Direction::Up,
            Page::Down => Direction::Down,
        };
        for _ in 0..self.rows() {
            self.move_cursor(direction, numrows);
        }
    }

    /// Cursor to column 0.
    pub const fn line_start(&mut self) {
        self.cursor.cx = 0;
    }

    /// Cursor to the last screen column.
    pub fn line_end(&mut self) {
        self.cursor.cx = self.cols() - 1;
    }
}

fn sanitize(size: Size) -> Size {
    Size::new(size.cols.max(1), size.rows.max(1))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
