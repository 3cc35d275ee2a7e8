// src/terrain/generation_grid.rs
use std::sync::atomic::{AtomicU8, Ordering};

const NOT_GENERATED: u8 = 0;
const GENERATED: u8 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellState {
    OutOfRange,
    NotGenerated,
    Generated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// This call flipped the cell; the caller owns scheduling it.
    Marked,
    AlreadyMarked,
    OutOfRange,
}

/// One flag per chunk cell, row-major. A cell goes 0 -> 1 at most once per run.
#[derive(Debug)]
pub struct GenerationStateGrid {
    cells_per_row: u32,
    cells: Vec<AtomicU8>,
}

impl GenerationStateGrid {
    pub fn new(cells_per_row: u32) -> Self {
        let count = cells_per_row as usize * cells_per_row as usize;
        Self {
            cells_per_row,
            cells: (0..count).map(|_| AtomicU8::new(NOT_GENERATED)).collect(),
        }
    }

    pub fn cells_per_row(&self) -> u32 {
        self.cells_per_row
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    #[inline]
    pub fn index(&self, cx: i32, cz: i32) -> Option<usize> {
        let n = self.cells_per_row as i64;
        let (x, z) = (cx as i64, cz as i64);
        if x < 0 || z < 0 || x >= n || z >= n {
            return None;
        }
        Some((z * n + x) as usize)
    }

    pub fn state(&self, cx: i32, cz: i32) -> CellState {
        match self.index(cx, cz) {
            None => CellState::OutOfRange,
            Some(i) => match self.cells[i].load(Ordering::Acquire) {
                NOT_GENERATED => CellState::NotGenerated,
                _ => CellState::Generated,
            },
        }
    }

    pub fn try_mark(&self, cx: i32, cz: i32) -> MarkOutcome {
        let Some(i) = self.index(cx, cz) else {
            return MarkOutcome::OutOfRange;
        };
        match self.cells[i].compare_exchange(NOT_GENERATED, GENERATED, Ordering::AcqRel, Ordering::Acquire) {
            Ok(_) => MarkOutcome::Marked,
            Err(_) => MarkOutcome::AlreadyMarked,
        }
    }

    pub fn reset(&self) {
        for cell in &self.cells {
            cell.store(NOT_GENERATED, Ordering::Release);
        }
    }

    pub fn marked_count(&self) -> usize {
        self.cells
            .iter()
            .filter(|c| c.load(Ordering::Acquire) == GENERATED)
            .count()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|c| c.load(Ordering::Acquire) == GENERATED)
    }
}
