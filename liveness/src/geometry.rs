//! The center capture region.

use idgate_types::{BoundingBox, Viewport};

/// Square region sized to the smaller viewport dimension and centered on
/// the screen, mirroring the overlay the subject sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CenterBox {
    pub left: f64,
    pub top: f64,
    pub size: f64,
}

impl CenterBox {
    pub fn for_viewport(viewport: Viewport) -> Self {
        let size = viewport.min_side();
        CenterBox {
            left: (viewport.width - size) / 2.0,
            top: (viewport.height - size) / 2.0,
            size,
        }
    }

    /// True when `point` lies inside the box shrunk by `margin` of its
    /// size on every edge.
    pub fn contains_with_margin(&self, point: (f64, f64), margin: f64) -> bool {
        let inset = self.size * margin;
        let (x, y) = point;
        x >= self.left + inset
            && x <= self.left + self.size - inset
            && y >= self.top + inset
            && y <= self.top + self.size - inset
    }
}

/// Whether a face's center point sits within the middle region of the box.
pub fn face_centered(bounds: &BoundingBox, viewport: Viewport, margin: f64) -> bool {
    CenterBox::for_viewport(viewport).contains_with_margin(bounds.center(), margin)
}
