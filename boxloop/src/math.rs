use glam::{IVec2, Mat4, UVec2, Vec3};

/// Axis-aligned rectangle in logical pixels.
///
/// `origin` is the top-left corner; the rectangle covers
/// `[x, x + w) × [y, y + h)` with y pointing down.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub origin: IVec2,
    pub size: UVec2,
}

impl Rect {
    pub fn new(origin: IVec2, size: UVec2) -> Self {
        Self { origin, size }
    }

    /// Returns true if the rectangle has no visible area.
    pub fn is_empty(&self) -> bool {
        self.size.x == 0 || self.size.y == 0
    }

    /// Model matrix mapping the unit quad `[0, 1]²` onto this rectangle.
    pub fn to_matrix(&self) -> Mat4 {
        let translation = Mat4::from_translation(Vec3::new(
            self.origin.x as f32,
            self.origin.y as f32,
            0.0,
        ));
        let scale = Mat4::from_scale(Vec3::new(self.size.x as f32, self.size.y as f32, 1.0));

        translation * scale
    }
}

/// The drawable window surface, in logical pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Returns true if any part of `rect` overlaps the viewport.
    pub fn intersects(&self, rect: &Rect) -> bool {
        if rect.is_empty() {
            return false;
        }
        let left = rect.origin.x as i64;
        let top = rect.origin.y as i64;
        let right = left + rect.size.x as i64;
        let bottom = top + rect.size.y as i64;

        right > 0 && bottom > 0 && left < self.width as i64 && top < self.height as i64
    }

    /// Orthographic projection with the origin in the top-left corner and y down.
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh_gl(
            0.0,
            self.width.max(1) as f32,
            self.height.max(1) as f32,
            0.0,
            -1.0,
            1.0,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec4;

    #[test]
    fn test_projection_maps_corners_to_clip_space() {
        let viewport = Viewport::new(800, 600);
        let proj = viewport.projection();

        let top_left = proj * Vec4::new(0.0, 0.0, 0.0, 1.0);
        assert!((top_left.x + 1.0).abs() < 1e-6);
        assert!((top_left.y - 1.0).abs() < 1e-6);

        let bottom_right = proj * Vec4::new(800.0, 600.0, 0.0, 1.0);
        assert!((bottom_right.x - 1.0).abs() < 1e-6);
        assert!((bottom_right.y + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_rect_matrix_covers_rect() {
        let rect = Rect::new(IVec2::new(100, 120), UVec2::new(50, 50));
        let m = rect.to_matrix();

        let near = m * Vec4::new(0.0, 0.0, 0.0, 1.0);
        let far = m * Vec4::new(1.0, 1.0, 0.0, 1.0);
        assert_eq!((near.x, near.y), (100.0, 120.0));
        assert_eq!((far.x, far.y), (150.0, 170.0));
    }


    #[test]
    fn test_intersects_handles_partially_and_fully_offscreen() {
        let viewport = Viewport::new(800, 600);
        let size = UVec2::new(50, 50);

        assert!(viewport.intersects(&Rect::new(IVec2::new(-49, 0), size)));
        assert!(!viewport.intersects(&Rect::new(IVec2::new(-50, 0), size)));
        assert!(viewport.intersects(&Rect::new(IVec2::new(799, 599), size)));
        assert!(!viewport.intersects(&Rect::new(IVec2::new(800, 0), size)));
        assert!(!viewport.intersects(&Rect::new(IVec2::new(10, 10), UVec2::new(0, 5))));
    }
}
