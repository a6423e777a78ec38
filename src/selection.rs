// Logical selection model: cell references, the selection rectangle, and
// resolution of pointer coordinates and cell content against the host grid.

use crate::geometry::{PointPx, RectPx};
use crate::host::HostGrid;

/// One grid cell identified by position. `rect` is the cell's rendered
/// bounds at resolution time, kept for geometry only — cell data is always
/// re-read from the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CellRef {
    pub row_index: usize,
    pub col_index: usize,
    pub rect: RectPx,
}

/// The resolved content of a cell: its display value, the data-field key of
/// its column, and the column header label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CellContent {
    pub value: String,
    pub field: String,
    pub title: String,
}

/// One entry of a finalized selection. `data` and `rect` are `None` when the
/// cell could not be resolved (e.g. the dataset shrank between drag start
/// and finalize); such cells are absent, not errors.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedCell {
    pub row_index: usize,
    pub col_index: usize,
    pub rect: Option<RectPx>,
    pub data: Option<CellContent>,
}

/// The inclusive row/column index range spanned by the selection anchor and
/// focus. Always well-formed: `rows.0 <= rows.1` and `cols.0 <= cols.1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionRect {
    pub rows: (usize, usize),
    pub cols: (usize, usize),
}

impl SelectionRect {
    /// Build the rectangle from two corner cells, in either drag direction.
    pub fn from_corners(a: &CellRef, b: &CellRef) -> Self {
        Self {
            rows: (
                a.row_index.min(b.row_index),
                a.row_index.max(b.row_index),
            ),
            cols: (
                a.col_index.min(b.col_index),
                a.col_index.max(b.col_index),
            ),
        }
    }

    pub fn contains(&self, row: usize, col: usize) -> bool {
        row >= self.rows.0 && row <= self.rows.1 && col >= self.cols.0 && col <= self.cols.1
    }

    pub fn row_span(&self) -> usize {
        self.rows.1 - self.rows.0 + 1
    }

    pub fn col_span(&self) -> usize {
        self.cols.1 - self.cols.0 + 1
    }

    pub fn cell_count(&self) -> usize {
        self.row_span() * self.col_span()
    }
}

/// Resolve a screen point to the body cell under it.
///
/// Fails when the point is outside the scrollable data-body region (header,
/// footer, margins) or lands on no rendered cell. Row and column indices are
/// found by linear scan of the live rendered structure; nothing is cached,
/// so indices always reflect the current layout.
pub fn resolve_cell(host: &dyn HostGrid, point: PointPx) -> Option<CellRef> {
    let body = host.body_viewport()?;
    if !body.contains(point) {
        return None;
    }

    let row_index = (0..host.body_row_count())
        .find(|&row| host.row_rect(row).is_some_and(|r| r.contains_y(point.y)))?;

    let col_index = (0..host.row_cell_count(row_index)).find(|&col| {
        host.cell_rect(row_index, col)
            .is_some_and(|r| r.contains_x(point.x))
    })?;

    let rect = host.cell_rect(row_index, col_index)?;
    Some(CellRef {
        row_index,
        col_index,
        rect,
    })
}

/// Resolve the content of a cell by index.
///
/// Prefers the rendered text (captures in-cell formatting applied by the
/// grid); falls back to the raw dataset value for the column's field,
/// defaulting to an empty string. Returns `None` when the indices are out of
/// bounds of the current dataset or column descriptors.
pub fn resolve_content(host: &dyn HostGrid, row: usize, col: usize) -> Option<CellContent> {
    if row >= host.data_row_count() || col >= host.column_count() {
        return None;
    }

    let column = host.column(col).unwrap_or_default();

    let rendered = host
        .cell_text(row, col)
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty());

    let value = match rendered {
        Some(text) => text,
        None => host.data_value(row, &column.field).unwrap_or_default(),
    };

    Some(CellContent {
        value,
        field: column.field,
        title: column.title,
    })
}

/// Walk every (row, col) pair of the rectangle in row-major order and
/// resolve each cell's rendered bounds and content from the live host
/// structure. This runs wholesale at finalize time, so the result always
/// matches the final rectangle even when intermediate drag samples were
/// skipped by the debounce.
pub fn collect_cells(host: &dyn HostGrid, rect: &SelectionRect) -> Vec<SelectedCell> {
    let mut cells = Vec::with_capacity(rect.cell_count());
    for row in rect.rows.0..=rect.rows.1 {
        for col in rect.cols.0..=rect.cols.1 {
            cells.push(SelectedCell {
                row_index: row,
                col_index: col,
                rect: host.cell_rect(row, col),
                data: resolve_content(host, row, col),
            });
        }
    }
    cells
}
