//! Plain-text rendering of a table window.

use std::ops::Range;

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

use crate::column::{Alignment, Cell, Column, ColumnWidth, RenderContext};
use crate::flatten::PhysicalRow;
use crate::table::TreeTable;

// =============================================================================
// Text helpers
// =============================================================================

pub fn display_width(s: &str) -> usize {
    s.width()
}

/// Cut `s` to at most `max_width` columns, ending in "…" when shortened.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if display_width(s) <= max_width {
        return s.to_string();
    }
    if max_width == 0 {
        return String::new();
    }

    let target_width = max_width - 1;
    let mut result = String::new();
    let mut width = 0;
    for ch in s.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.push('…');
    result
}

/// Truncate and pad `s` to exactly `width` columns.
pub fn fit(s: &str, width: usize, align: Alignment) -> String {
    let text = truncate_to_width(s, width);
    let gap = width.saturating_sub(display_width(&text));
    match align {
        Alignment::Left => format!("{}{}", text, " ".repeat(gap)),
        Alignment::Right => format!("{}{}", " ".repeat(gap), text),
        Alignment::Center => {
            let left = gap / 2;
            format!("{}{}{}", " ".repeat(left), text, " ".repeat(gap - left))
        }
    }
}

/// Resolve column widths against `total`: fixed widths first, the rest
/// shared by flex weight.
pub fn resolve_widths<T>(columns: &[Column<T>], total: usize, separator: usize) -> Vec<usize> {
    let separators = separator * columns.len().saturating_sub(1);
    let available = total.saturating_sub(separators);

    let fixed: usize = columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fixed(w) => usize::from(w),
            ColumnWidth::Flex(_) => 0,
        })
        .sum();
    let weights: usize = columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Flex(w) => usize::from(w),
            ColumnWidth::Fixed(_) => 0,
        })
        .sum();
    let remaining = available.saturating_sub(fixed);

    let mut widths: Vec<usize> = columns
        .iter()
        .map(|c| match c.width {
            ColumnWidth::Fixed(w) => usize::from(w),
            ColumnWidth::Flex(w) if weights > 0 => remaining * usize::from(w) / weights,
            ColumnWidth::Flex(_) => 0,
        })
        .collect();

    // Hand out rounding leftovers to flex columns from the left.
    let mut leftover = remaining.saturating_sub(
        widths
            .iter()
            .zip(columns)
            .filter(|(_, c)| matches!(c.width, ColumnWidth::Flex(w) if w > 0))
            .map(|(w, _)| *w)
            .sum(),
    );
    for (width, column) in widths.iter_mut().zip(columns) {
        if leftover == 0 {
            break;
        }
        if matches!(column.width, ColumnWidth::Flex(w) if w > 0) {
            *width += 1;
            leftover -= 1;
        }
    }
    widths
}

// =============================================================================
// TextRenderer
// =============================================================================

/// Renders a range of table rows to text lines.
///
/// # Example
///
/// ```ignore
/// let lines = TextRenderer::new(80).render(&table, 0..table.len());
/// ```
#[derive(Debug, Clone)]
pub struct TextRenderer {
    width: usize,
    indent: usize,
    expanded_icon: String,
    collapsed_icon: String,
    leaf_icon: String,
    separator: String,
    placeholder: String,
    show_header: bool,
    show_footer: bool,
}

impl Default for TextRenderer {
    fn default() -> Self {
        Self::new(80)
    }
}

impl TextRenderer {
    pub fn new(width: u16) -> Self {
        Self {
            width: usize::from(width),
            indent: 2,
            expanded_icon: "▼".to_string(),
            collapsed_icon: "▶".to_string(),
            leaf_icon: " ".to_string(),
            separator: " ".to_string(),
            placeholder: "—".to_string(),
            show_header: true,
            show_footer: true,
        }
    }

    /// Columns of indentation per tree level.
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn icons(
        mut self,
        expanded: impl Into<String>,
        collapsed: impl Into<String>,
        leaf: impl Into<String>,
    ) -> Self {
        self.expanded_icon = expanded.into();
        self.collapsed_icon = collapsed.into();
        self.leaf_icon = leaf.into();
        self
    }

    pub fn separator(mut self, separator: impl Into<String>) -> Self {
        self.separator = separator.into();
        self
    }

    /// Text shown for missing numbers.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    pub fn show_header(mut self, show: bool) -> Self {
        self.show_header = show;
        self
    }

    pub fn show_footer(mut self, show: bool) -> Self {
        self.show_footer = show;
        self
    }

    /// Header, the rows in `range` and the footer.
    pub fn render<T>(&self, table: &TreeTable<T>, range: Range<usize>) -> Vec<String>
    where
        T: Clone + Send + Sync + 'static,
    {
        let ctx = table.render_context();
        let mut lines = Vec::new();

        if self.show_header {
            lines.push(self.header(table.columns()));
            lines.push("─".repeat(self.width));
        }

        let end = range.end.min(table.len());
        for index in range.start.min(end)..end {
            if let Some(row) = table.row(index) {
                lines.push(self.row(row, table.columns_for(index), &ctx));
            }
        }

        if self.show_footer && table.columns().iter().any(|c| c.has_foot()) {
            lines.push("─".repeat(self.width));
            lines.push(self.footer(table.columns(), &ctx));
        }

        lines
    }

    pub fn header<T>(&self, columns: &[Column<T>]) -> String {
        let texts: Vec<(String, Alignment)> = columns
            .iter()
            .map(|c| (c.head.clone(), c.align))
            .collect();
        self.line(columns, texts)
    }

    pub fn footer<T>(&self, columns: &[Column<T>], ctx: &RenderContext<'_, T>) -> String {
        let texts: Vec<(String, Alignment)> = columns
            .iter()
            .map(|c| {
                let text = c
                    .render_foot(ctx)
                    .map(|cell| self.format(&cell))
                    .unwrap_or_default();
                (text, c.align)
            })
            .collect();
        self.line(columns, texts)
    }

    /// One physical row laid out against `columns`.
    pub fn row<T>(
        &self,
        row: &PhysicalRow<T>,
        columns: &[Column<T>],
        ctx: &RenderContext<'_, T>,
    ) -> String {
        let icon = match (row.expandable, row.expanded) {
            (false, _) => &self.leaf_icon,
            (true, true) => &self.expanded_icon,
            (true, false) => &self.collapsed_icon,
        };
        let prefix = format!("{}{} ", " ".repeat(self.indent * row.level), icon);

        let texts: Vec<(String, Alignment)> = columns
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let text = self.format(&c.render(&row.row, ctx));
                if i == 0 {
                    (format!("{}{}", prefix, text), Alignment::Left)
                } else {
                    (text, c.align)
                }
            })
            .collect();
        self.line(columns, texts)
    }

    /// Display text of a cell.
    pub fn format(&self, cell: &Cell) -> String {
        match cell {
            Cell::Empty => String::new(),
            Cell::Text(text) => text.clone(),
            Cell::Amount(value) if !value.is_finite() => self.placeholder.clone(),
            Cell::Amount(value) => format!("{:.2}", value),
            Cell::Percent(value) if !value.is_finite() => self.placeholder.clone(),
            Cell::Percent(value) => format!("{:.1}%", value * 100.0),
        }
    }

    fn line<T>(&self, columns: &[Column<T>], texts: Vec<(String, Alignment)>) -> String {
        let widths = resolve_widths(columns, self.width, display_width(&self.separator));
        let cells: Vec<String> = texts
            .iter()
            .zip(widths)
            .map(|((text, align), width)| fit(text, width, *align))
            .collect();
        cells.join(&self.separator).trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("Checking", 8), "Checking");
        assert_eq!(truncate_to_width("Checking", 5), "Chec…");
        assert_eq!(truncate_to_width("Checking", 0), "");
    }

    #[test]
    fn test_fit_aligns() {
        assert_eq!(fit("ab", 4, Alignment::Left), "ab  ");
        assert_eq!(fit("ab", 4, Alignment::Right), "  ab");
        assert_eq!(fit("ab", 5, Alignment::Center), " ab  ");
    }

    #[test]
    fn test_resolve_widths_splits_flex_by_weight() {
        let columns: Vec<Column<()>> = vec![
            Column::text("a", "A", |_| String::new()).flex(2),
            Column::text("b", "B", |_| String::new()).fixed(10),
            Column::text("c", "C", |_| String::new()).flex(1),
        ];
        // 42 - 2 separators - 10 fixed = 30 for flex.
        assert_eq!(resolve_widths(&columns, 42, 1), vec![20, 10, 10]);
    }

    #[test]
    fn test_format_nan_uses_placeholder() {
        let renderer = TextRenderer::new(40);
        assert_eq!(renderer.format(&Cell::Amount(f64::NAN)), "—");
        assert_eq!(renderer.format(&Cell::Amount(1234.5)), "1234.50");
        assert_eq!(renderer.format(&Cell::Percent(0.256)), "25.6%");
    }
}
