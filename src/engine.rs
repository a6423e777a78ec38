// The selection engine: pointer/keyboard event interpretation, drag
// threshold gating, auto-scroll, overlay synchronization, and finalize.

use std::time::Instant;

use winit::keyboard::{Key, ModifiersState};

use crate::clipboard::{self, CopySink};
use crate::config::EngineConfig;
use crate::geometry::{PointPx, RectPx};
use crate::host::HostGrid;
use crate::overlay;
use crate::selection::{collect_cells, resolve_cell, CellRef, SelectedCell, SelectionRect};

/// Errors surfaced by engine lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("host grid root not found")]
    RootNotFound,
}

/// Drag state machine phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DragPhase {
    /// No pointer button held.
    Idle,
    /// Pointer pressed on a cell but not yet moved beyond the threshold —
    /// still an ordinary click, no overlay.
    Pending,
    /// Pointer moved beyond the threshold — drag selection in progress.
    Active,
}

/// Transient per-drag state. Exists only between pointer-down and
/// pointer-up/cancel.
#[derive(Debug, Clone, Copy)]
struct DragSession {
    /// Screen position of the pointer-down.
    origin_px: PointPx,
    /// When the pointer-down happened.
    #[allow(dead_code)]
    started_at: Instant,
    /// Whether the pointer has traveled beyond the drag threshold.
    crossed_threshold: bool,
    /// Body bounds snapshot taken at threshold crossing, for auto-scroll
    /// edge math.
    body_rect: Option<RectPx>,
    /// Last time the cell under the pointer was re-resolved.
    last_cell_update: Option<Instant>,
}

/// Snapshot of the engine's selection state, for the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionState {
    pub is_selecting: bool,
    pub has_crossed_threshold: bool,
    pub anchor: Option<CellRef>,
    pub focus: Option<CellRef>,
    pub selected_count: usize,
}

/// Rectangular multi-cell selection controller for a rendered host grid.
///
/// The engine owns all selection state and the overlay; the host feeds it
/// pointer and keyboard events and answers geometry/data queries through
/// the [`HostGrid`] trait. All methods are synchronous; the debounce on
/// cell re-resolution is a timestamp comparison, not deferral.
pub struct SelectionEngine {
    config: EngineConfig,
    installed: bool,
    session: Option<DragSession>,
    anchor: Option<CellRef>,
    focus: Option<CellRef>,
    selected_cells: Vec<SelectedCell>,
    sink: CopySink,
}

impl SelectionEngine {
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self {
            config,
            installed: false,
            session: None,
            anchor: None,
            focus: None,
            selected_cells: Vec::new(),
            sink: CopySink::new(),
        }
    }

    // ── Lifecycle ───────────────────────────────────────────────────

    /// Attach the engine to the host grid. Fails (with a logged warning)
    /// when the grid root cannot be located, which indicates an integration
    /// misconfiguration rather than a user action.
    pub fn install(&mut self, host: &mut dyn HostGrid) -> Result<(), EngineError> {
        if self.installed {
            return Ok(());
        }
        if host.grid_root().is_none() {
            log::warn!("grid root not found; selection engine not installed");
            return Err(EngineError::RootNotFound);
        }
        host.set_native_text_selection(false);
        self.installed = true;
        Ok(())
    }

    /// Detach the engine: remove the overlay, restore native text selection,
    /// and drop all state. Idempotent and safe without a prior `install`.
    pub fn uninstall(&mut self, host: &mut dyn HostGrid) {
        if self.installed {
            host.set_native_text_selection(true);
        }
        host.set_overlay(None);
        self.session = None;
        self.anchor = None;
        self.focus = None;
        self.selected_cells.clear();
        self.installed = false;
    }

    pub fn is_installed(&self) -> bool {
        self.installed
    }

    // ── Pointer events ──────────────────────────────────────────────

    /// Pointer button pressed at a screen position.
    pub fn on_pointer_down(&mut self, host: &mut dyn HostGrid, point: PointPx) {
        self.on_pointer_down_at(host, point, Instant::now());
    }

    fn on_pointer_down_at(&mut self, host: &mut dyn HostGrid, point: PointPx, at: Instant) {
        if !self.installed {
            return;
        }

        let Some(cell) = resolve_cell(host, point) else {
            // A press outside the grid entirely drops any held selection;
            // a press inside the grid but off the body (header, margin)
            // changes nothing.
            if let Some(root) = host.grid_root() {
                if !root.contains(point) {
                    self.clear_selection(host);
                }
            }
            return;
        };

        // Clear-then-begin; selection is never additive.
        self.clear_selection(host);

        self.anchor = Some(cell);
        self.focus = Some(cell);
        self.selected_cells = vec![SelectedCell {
            row_index: cell.row_index,
            col_index: cell.col_index,
            rect: Some(cell.rect),
            data: None,
        }];
        self.session = Some(DragSession {
            origin_px: point,
            started_at: at,
            crossed_threshold: false,
            body_rect: None,
            last_cell_update: None,
        });
    }

    /// Pointer moved to a screen position (button still held or not; moves
    /// without an active session are ignored).
    pub fn on_pointer_move(&mut self, host: &mut dyn HostGrid, point: PointPx) {
        self.on_pointer_move_at(host, point, Instant::now());
    }

    fn on_pointer_move_at(&mut self, host: &mut dyn HostGrid, point: PointPx, at: Instant) {
        if !self.installed {
            return;
        }
        let Some(mut session) = self.session else {
            return;
        };

        if !session.crossed_threshold {
            if session.origin_px.distance_to(point) <= self.config.drag_threshold_px {
                // Still an ordinary click; no overlay, no drag machinery.
                self.session = Some(session);
                return;
            }
            session.crossed_threshold = true;
            session.body_rect = host.body_viewport();
        }

        // Auto-scroll runs every move event, independent of the debounce:
        // the viewport must keep creeping while the pointer sits in the
        // edge margin.
        if let Some(body) = session.body_rect {
            self.auto_scroll(host, point, body);
        }

        // The overlay tracks live cell geometry every event; only the cell
        // re-resolution below is rate-limited.
        self.update_overlay(host);

        let due = session
            .last_cell_update
            .is_none_or(|last| at.duration_since(last).as_millis() as u64
                >= self.config.cell_update_debounce_ms);
        if due {
            if let Some(cell) = resolve_cell(host, point) {
                let focus_moved = self
                    .focus
                    .map(|f| (f.row_index, f.col_index))
                    != Some((cell.row_index, cell.col_index));
                self.focus = Some(cell);
                if focus_moved {
                    self.update_overlay(host);
                }
            }
            session.last_cell_update = Some(at);
        }

        self.session = Some(session);
    }

    /// Pointer button released. Finalizes the selection: the selected-cell
    /// list is recomputed wholesale from the final rectangle against the
    /// live host structure, never patched incrementally.
    pub fn on_pointer_up(&mut self, host: &mut dyn HostGrid) {
        if !self.installed {
            return;
        }
        if self.session.take().is_none() {
            return;
        }

        if let (Some(anchor), Some(focus)) = (self.anchor, self.focus) {
            let rect = SelectionRect::from_corners(&anchor, &focus);
            self.selected_cells = collect_cells(host, &rect);
        }
    }

    // ── Keyboard ────────────────────────────────────────────────────

    /// Key pressed. Active only while a non-empty selection exists.
    /// Returns whether the key was consumed (so the host can suppress
    /// default handling).
    pub fn on_key_down(
        &mut self,
        host: &mut dyn HostGrid,
        key: &Key,
        modifiers: ModifiersState,
    ) -> bool {
        if !self.installed || self.selected_cells.is_empty() {
            return false;
        }
        if clipboard::is_copy_keybinding(key, modifiers) {
            self.copy_selected_cells();
            return true;
        }
        if clipboard::is_clear_keybinding(key) {
            self.clear_selection(host);
            return true;
        }
        false
    }

    // ── External notifications ──────────────────────────────────────

    /// The grid viewport was resized. Cached geometry is invalid, so the
    /// whole selection resets; no attempt is made to re-project onto the
    /// new layout. A resize mid-drag cancels the drag immediately.
    pub fn on_viewport_resized(&mut self, host: &mut dyn HostGrid) {
        if !self.installed {
            return;
        }
        self.clear_selection(host);
    }

    /// The underlying row dataset was replaced or reordered. Selection
    /// indices no longer identify the same data, so this is an implicit
    /// clear — hosts must call it on any dataset identity change.
    pub fn on_data_changed(&mut self, host: &mut dyn HostGrid) {
        if !self.installed {
            return;
        }
        self.clear_selection(host);
    }

    // ── Selection access ────────────────────────────────────────────

    /// Reset anchor, focus, selected cells, and any drag session together,
    /// and remove the overlay. Resets are honored immediately, even while a
    /// drag is in progress. Idempotent.
    pub fn clear_selection(&mut self, host: &mut dyn HostGrid) {
        self.session = None;
        self.anchor = None;
        self.focus = None;
        self.selected_cells.clear();
        host.set_overlay(None);
    }

    /// The finalized selection, in row-major order.
    pub fn selected_cells(&self) -> &[SelectedCell] {
        &self.selected_cells
    }

    /// The current selection rectangle, or `None` when no selection exists.
    pub fn selection_rect(&self) -> Option<SelectionRect> {
        match (self.anchor, self.focus) {
            (Some(a), Some(f)) => Some(SelectionRect::from_corners(&a, &f)),
            _ => None,
        }
    }

    pub fn selection_state(&self) -> SelectionState {
        SelectionState {
            is_selecting: self.session.is_some(),
            has_crossed_threshold: self
                .session
                .map(|s| s.crossed_threshold)
                .unwrap_or(false),
            anchor: self.anchor,
            focus: self.focus,
            selected_count: self.selected_cells.len(),
        }
    }

    pub fn drag_phase(&self) -> DragPhase {
        match self.session {
            None => DragPhase::Idle,
            Some(s) if s.crossed_threshold => DragPhase::Active,
            Some(_) => DragPhase::Pending,
        }
    }

    /// Serialize the selection and write it to the clipboard. Returns
    /// whether the write succeeded; an empty selection is a no-op.
    pub fn copy_selected_cells(&mut self) -> bool {
        if self.selected_cells.is_empty() {
            return false;
        }
        let payload = clipboard::serialize_cells(&self.selected_cells);
        self.sink.copy(&payload)
    }

    // ── Internals ───────────────────────────────────────────────────

    fn auto_scroll(&self, host: &mut dyn HostGrid, point: PointPx, body: RectPx) {
        let margin = self.config.scroll_margin_px;
        let step = self.config.scroll_step_px;

        let mut dx = 0.0;
        if point.x < body.left() + margin {
            dx = -step;
        } else if point.x > body.right() - margin {
            dx = step;
        }

        let mut dy = 0.0;
        if point.y < body.top() + margin {
            dy = -step;
        } else if point.y > body.bottom() - margin {
            dy = step;
        }

        if dx != 0.0 || dy != 0.0 {
            host.scroll_by(dx, dy);
        }
    }

    /// Re-position the overlay over the live anchor/focus cell rects.
    fn update_overlay(&self, host: &mut dyn HostGrid) {
        let (Some(anchor), Some(focus)) = (self.anchor, self.focus) else {
            return;
        };
        let Some(container) = host.body_viewport() else {
            return;
        };
        let (Some(anchor_rect), Some(focus_rect)) = (
            host.cell_rect(anchor.row_index, anchor.col_index),
            host.cell_rect(focus.row_index, focus.col_index),
        ) else {
            return;
        };
        let rect = overlay::selection_box(anchor_rect, focus_rect, container, host.scroll_offset());
        host.set_overlay(Some(rect));
    }
}

impl Default for SelectionEngine {
    fn default() -> Self {
        Self::new()
    }
}
