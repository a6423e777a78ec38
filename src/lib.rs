//! Rectangular cell selection and clipboard export for rendered tabular
//! grids.
//!
//! `gridgrab` attaches to an existing grid component as an add-on
//! controller: the host keeps rendering, data, and columns, and feeds the
//! engine raw pointer/keyboard events; the engine turns those into a
//! logical rectangular selection, keeps a selection overlay in sync during
//! the drag (auto-scrolling the viewport near the edges), and copies the
//! selected region as tab/newline-delimited text.
//!
//! The host side of the contract is the [`HostGrid`] trait; the controller
//! is [`SelectionEngine`].

pub mod clipboard;
pub mod config;
pub mod engine;
pub mod geometry;
pub mod host;
pub mod overlay;
pub mod selection;

pub use config::{ConfigError, EngineConfig};
pub use engine::{DragPhase, EngineError, SelectionEngine, SelectionState};
pub use geometry::{PointPx, RectPx};
pub use host::{ColumnSpec, HostGrid};
pub use selection::{CellContent, CellRef, SelectedCell, SelectionRect};
