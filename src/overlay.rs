// Overlay geometry: mapping the anchor/focus cell bounds to the selection
// box rect the host positions inside its scrollable body.

use crate::geometry::RectPx;

/// Compute the selection box covering the anchor and focus cells.
///
/// Inputs are live screen-space rects; the result is in body content
/// coordinates (relative to the container origin, compensated for the
/// current scroll offset) so the box stays glued to the cells while the
/// body scrolls under the pointer.
pub fn selection_box(
    anchor: RectPx,
    focus: RectPx,
    container: RectPx,
    scroll: (f32, f32),
) -> RectPx {
    let bounds = anchor.union(focus);
    RectPx::new(
        bounds.x - container.x + scroll.0,
        bounds.y - container.y + scroll.1,
        bounds.width,
        bounds.height,
    )
}
