// Host grid interface: the rendered-grid collaborator the engine attaches to.

use crate::geometry::RectPx;

/// A column descriptor from the host grid: the data-field key a column reads
/// from the row dataset, and its display header label.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ColumnSpec {
    pub field: String,
    pub title: String,
}

/// The rendered grid the selection engine is attached to.
///
/// The engine never renders or owns grid content; it reads live geometry,
/// rendered text, the row dataset, and column descriptors through this
/// trait, and writes back only the selection overlay and the native
/// text-selection toggle. Geometry is queried fresh on every use — the
/// engine caches nothing across events, so indices and rects always reflect
/// the live layout.
pub trait HostGrid {
    /// Bounds of the rendered grid root, or `None` if the grid is not mounted.
    fn grid_root(&self) -> Option<RectPx>;

    /// Bounds of the scrollable data-body region. Header cells, summary rows
    /// and margins lie outside it and are never selectable.
    fn body_viewport(&self) -> Option<RectPx>;

    /// Current scroll offset of the body, (horizontal, vertical).
    fn scroll_offset(&self) -> (f32, f32);

    /// Nudge the body scroll offset by the given deltas.
    fn scroll_by(&mut self, dx: f32, dy: f32);

    /// Number of rendered body rows.
    fn body_row_count(&self) -> usize;

    /// Screen-space bounds of a rendered body row.
    fn row_rect(&self, row: usize) -> Option<RectPx>;

    /// Number of rendered cells in a body row.
    fn row_cell_count(&self, row: usize) -> usize;

    /// Screen-space bounds of a rendered body cell.
    fn cell_rect(&self, row: usize, col: usize) -> Option<RectPx>;

    /// Rendered text content of a body cell, as displayed (after any in-cell
    /// formatting the grid applies).
    fn cell_text(&self, row: usize, col: usize) -> Option<String>;

    /// Number of rows in the underlying dataset.
    fn data_row_count(&self) -> usize;

    /// Raw dataset value for a row, addressed by column field key.
    fn data_value(&self, row: usize, field: &str) -> Option<String>;

    /// Number of column descriptors.
    fn column_count(&self) -> usize;

    /// Column descriptor at a position.
    fn column(&self, col: usize) -> Option<ColumnSpec>;

    /// Show, move, or remove the selection overlay. The rect is in body
    /// content coordinates (scroll-compensated).
    fn set_overlay(&mut self, rect: Option<RectPx>);

    /// Enable or disable native text selection inside the grid root.
    fn set_native_text_selection(&mut self, enabled: bool);
}
