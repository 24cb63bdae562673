//! Windowing over the flat rows.
//!
//! A [`RowWindow`] gives a virtualized list what it needs: item count,
//! item keys and heights. Offsets are cached cumulatively for O(1) position
//! lookups and O(log n) offset-to-index queries.

use std::fmt;
use std::ops::Range;
use std::sync::Arc;

use crate::flatten::PhysicalRow;
use crate::key::RowKey;

/// Height of each row, in lines.
pub enum RowHeight<T> {
    /// Every row has the same height.
    Fixed(u16),
    /// Height computed per row (e.g. taller group headers).
    PerRow(Arc<dyn Fn(&PhysicalRow<T>) -> u16 + Send + Sync>),
}

impl<T> RowHeight<T> {
    pub fn per_row(height: impl Fn(&PhysicalRow<T>) -> u16 + Send + Sync + 'static) -> Self {
        Self::PerRow(Arc::new(height))
    }

    fn of(&self, row: &PhysicalRow<T>) -> u16 {
        match self {
            Self::Fixed(height) => *height,
            Self::PerRow(height) => height(row),
        }
    }
}

impl<T> Clone for RowHeight<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Fixed(height) => Self::Fixed(*height),
            Self::PerRow(height) => Self::PerRow(height.clone()),
        }
    }
}

impl<T> fmt::Debug for RowHeight<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(height) => f.debug_tuple("Fixed").field(height).finish(),
            Self::PerRow(_) => f.write_str("PerRow"),
        }
    }
}

impl<T> Default for RowHeight<T> {
    fn default() -> Self {
        Self::Fixed(1)
    }
}

/// Item keys and height cache for one version of the flat rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowWindow {
    keys: Vec<RowKey>,
    /// `cumulative[i]` is the offset of row `i`; the last entry is the total.
    cumulative: Vec<u32>,
}

impl RowWindow {
    pub fn new<T>(rows: &[PhysicalRow<T>], height: &RowHeight<T>) -> Self {
        let mut keys = Vec::with_capacity(rows.len());
        let mut cumulative = Vec::with_capacity(rows.len() + 1);
        cumulative.push(0u32);

        let mut total = 0u32;
        for row in rows {
            keys.push(row.key());
            total = total.saturating_add(u32::from(height.of(row)));
            cumulative.push(total);
        }

        Self { keys, cumulative }
    }

    pub fn item_count(&self) -> usize {
        self.keys.len()
    }

    /// Rendering identity of the row at `index`.
    pub fn item_key(&self, index: usize) -> Option<RowKey> {
        self.keys.get(index).copied()
    }

    /// Offset of the row at `index`. O(1).
    pub fn row_offset(&self, index: usize) -> u32 {
        self.cumulative
            .get(index)
            .copied()
            .unwrap_or_else(|| self.total_height())
    }

    /// Height of the row at `index`. O(1).
    pub fn row_height(&self, index: usize) -> u32 {
        match (self.cumulative.get(index), self.cumulative.get(index + 1)) {
            (Some(start), Some(end)) => end - start,
            _ => 0,
        }
    }

    /// Total content height. O(1).
    pub fn total_height(&self) -> u32 {
        self.cumulative.last().copied().unwrap_or(0)
    }

    /// Index of the row covering `offset`. O(log n).
    ///
    /// Offsets past the end map to the last row; `None` when there are no
    /// rows.
    pub fn row_at_offset(&self, offset: u32) -> Option<usize> {
        if self.keys.is_empty() {
            return None;
        }
        let index = self
            .cumulative
            .partition_point(|&h| h <= offset)
            .saturating_sub(1);
        Some(index.min(self.keys.len() - 1))
    }

    /// Rows at least partly visible in a viewport of `viewport` lines
    /// scrolled to `offset`.
    pub fn visible_range(&self, offset: u32, viewport: u32) -> Range<usize> {
        if viewport == 0 || offset >= self.total_height() {
            return 0..0;
        }
        let Some(first) = self.row_at_offset(offset) else {
            return 0..0;
        };
        let end_offset = offset.saturating_add(viewport);
        let end = self.cumulative.partition_point(|&h| h < end_offset);
        first..end.min(self.keys.len()).max(first + 1)
    }

    /// The scroll offset that brings row `index` fully into view, moving as
    /// little as possible.
    pub fn scroll_into_view(&self, index: usize, offset: u32, viewport: u32) -> u32 {
        if index >= self.keys.len() {
            return offset;
        }
        let top = self.row_offset(index);
        let bottom = top + self.row_height(index);
        if top < offset {
            top
        } else if bottom > offset.saturating_add(viewport) {
            bottom.saturating_sub(viewport)
        } else {
            offset
        }
    }
}
