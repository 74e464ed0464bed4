//! Two-pass follow-the-leader IK over a [`Chain`], plus the per-tick driver
//! that fades the surface, solves, and draws.

use crate::chain::{Chain, Point};
use crate::config::TRAIL;
use crate::render::Surface;

/// Root anchor: bottom edge, horizontally centered.
pub(crate) fn base_point(width: f32, height: f32) -> Point {
    Point::new(width / 2.0, height)
}

/// Tip → root. The tip chases `target`, every later segment chases the one
/// before it. Leaves the root wherever the pull dragged it.
pub(crate) fn forward_pass(chain: &mut Chain, target: Point) {
    let segments = chain.segments_mut();
    segments[0].follow(target);
    for i in 1..segments.len() {
        let lead = segments[i - 1].position;
        segments[i].follow(lead);
    }
}

/// Pin the root back onto the anchor. Direct assignment, not a follow.
pub(crate) fn reanchor(chain: &mut Chain, base: Point) {
    chain.root_mut().position = base;
}

/// Root → tip, root excluded. Restores every link length broken by
/// [`reanchor`]; afterwards segment `i` is exactly `length(i)` from `i + 1`.
pub(crate) fn backward_pass(chain: &mut Chain) {
    let segments = chain.segments_mut();
    for i in (0..segments.len().saturating_sub(1)).rev() {
        let anchor = segments[i + 1].position;
        segments[i].follow(anchor);
    }
}

/// Draw order is root first; each link strokes to its successor toward the root.
pub(crate) fn render<S: Surface>(chain: &Chain, surface: &mut S) {
    let segments = chain.segments();
    for i in (0..segments.len().saturating_sub(1)).rev() {
        segments[i].draw(&segments[i + 1], surface);
    }
}

/// One animation frame. Returns the base point used for the re-anchor.
pub(crate) fn tick<S: Surface>(chain: &mut Chain, pointer: Point, surface: &mut S) -> Point {
    let (w, h) = surface.size();

    surface.fill_rect(0.0, 0.0, w, h, TRAIL);

    forward_pass(chain, pointer);

    let base = base_point(w, h);
    reanchor(chain, base);

    backward_pass(chain);

    render(chain, surface);

    base
}
