//! Boundary collaborators the session controller talks to.
//!
//! The controller never touches a terminal directly. It marks cells on a
//! [`DisplaySurface`], reads and toggles an [`InputSurface`] and pushes
//! numbers into a [`MetricsSurface`]. The in-memory implementations below are
//! what the terminal front-end renders from, and what the tests inspect.

/// Visual state of one character of the target text
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum_macros::Display)]
#[strum(serialize_all = "lowercase")]
pub enum CellStatus {
    Pending,
    Current,
    Correct,
    Incorrect,
}

pub trait DisplaySurface {
    /// Lay out one cell per character of `text`, all pending.
    fn render_cells(&mut self, text: &str);
    /// Out-of-range indices are ignored.
    fn set_status(&mut self, index: usize, status: CellStatus);
    fn status(&self, index: usize) -> Option<CellStatus>;
}

pub trait InputSurface {
    /// The live typed text
    fn value(&self) -> &str;
    fn enable(&mut self);
    fn disable(&mut self);
    fn clear(&mut self);
    fn focus(&mut self);
    fn is_enabled(&self) -> bool;
    /// Cap how many characters the surface accepts. Surfaces without a cap ignore this.
    fn set_max_chars(&mut self, _max_chars: Option<usize>) {}
}

pub trait MetricsSurface {
    fn publish_wpm(&mut self, wpm: u32);
    fn publish_accuracy(&mut self, percent: u32);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub char: char,
    pub status: CellStatus,
}

/// Grid of character cells backing the prompt display
#[derive(Debug, Default, Clone)]
pub struct CellGrid {
    cells: Vec<Cell>,
}

impl CellGrid {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn statuses(&self) -> Vec<CellStatus> {
        self.cells.iter().map(|c| c.status).collect()
    }

    /// Index of the cell holding `current`, if any
    pub fn current(&self) -> Option<usize> {
        self.cells
            .iter()
            .position(|c| c.status == CellStatus::Current)
    }
}

impl DisplaySurface for CellGrid {
    fn render_cells(&mut self, text: &str) {
        self.cells = text
            .chars()
            .map(|char| Cell {
                char,
                status: CellStatus::Pending,
            })
            .collect();
    }

    fn set_status(&mut self, index: usize, status: CellStatus) {
        if let Some(cell) = self.cells.get_mut(index) {
            cell.status = status;
        }
    }

    fn status(&self, index: usize) -> Option<CellStatus> {
        self.cells.get(index).map(|c| c.status)
    }
}

/// Editable line of typed text, capped at the target length
#[derive(Debug, Clone)]
pub struct InputBuffer {
    text: String,
    enabled: bool,
    focused: bool,
    max_chars: Option<usize>,
}

impl Default for InputBuffer {
    fn default() -> Self {
        Self {
            text: String::new(),
            enabled: true,
            focused: false,
            max_chars: None,
        }
    }
}

impl InputBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    /// Append a character. Returns false when the buffer refused it.
    pub fn push(&mut self, c: char) -> bool {
        if !self.enabled {
            return false;
        }
        if let Some(max) = self.max_chars {
            if self.char_count() >= max {
                return false;
            }
        }
        self.text.push(c);
        true
    }

    /// Append as much of `s` as fits, as a paste would.
    pub fn push_str(&mut self, s: &str) -> bool {
        if !self.enabled {
            return false;
        }
        let room = self
            .max_chars
            .map_or(usize::MAX, |max| max.saturating_sub(self.char_count()));
        let before = self.text.len();
        self.text.extend(s.chars().take(room));
        self.text.len() != before
    }

    /// Remove the last character. Returns false when nothing changed.
    pub fn pop(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.text.pop().is_some()
    }
}

impl InputSurface for InputBuffer {
    fn value(&self) -> &str {
        &self.text
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn disable(&mut self) {
        self.enabled = false;
        self.focused = false;
    }

    fn clear(&mut self) {
        self.text.clear();
    }

    fn focus(&mut self) {
        if self.enabled {
            self.focused = true;
        }
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_max_chars(&mut self, max_chars: Option<usize>) {
        self.max_chars = max_chars;
    }
}

/// Last published metrics
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MetricsBoard {
    pub wpm: u32,
    pub accuracy: u32,
}

impl MetricsSurface for MetricsBoard {
    fn publish_wpm(&mut self, wpm: u32) {
        self.wpm = wpm;
    }

    fn publish_accuracy(&mut self, percent: u32) {
        self.accuracy = percent;
    }
}
