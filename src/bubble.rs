use crate::graphics::blend::Argb;

/// One packed circle.
///
/// `base_*` geometry is fixed when the packer accepts the bubble. The
/// `current_*` fields are what gets drawn and are moved around by the
/// animation engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Bubble {
    base_x: i32,
    base_y: i32,
    base_radius: i32,

    pub current_x: f32,
    pub current_y: f32,
    pub current_radius: f32,

    pub fill: Argb,
    pub outline: Argb,
}

impl Bubble {
    pub fn new(base_x: i32, base_y: i32, base_radius: i32, fill: Argb, outline: Argb) -> Self {
        Self {
            base_x,
            base_y,
            base_radius,

            current_x: base_x as f32,
            current_y: base_y as f32,
            current_radius: base_radius as f32,

            fill,
            outline,
        }
    }

    pub fn base_x(&self) -> i32 {
        self.base_x
    }

    pub fn base_y(&self) -> i32 {
        self.base_y
    }

    pub fn base_radius(&self) -> i32 {
        self.base_radius
    }

    /// Strictly inside the base circle.
    pub fn contains(&self, x: i32, y: i32) -> bool {
        let dx = (x - self.base_x) as f64;
        let dy = (y - self.base_y) as f64;
        let r = self.base_radius as f64;

        dx * dx + dy * dy < r * r
    }

    /// Base-geometry distance test used while packing.
    pub fn overlaps(&self, x: i32, y: i32, radius: i32, padding: i32) -> bool {
        let dx = (x - self.base_x) as f64;
        let dy = (y - self.base_y) as f64;
        let distance = (dx * dx + dy * dy).sqrt();

        distance < (radius + self.base_radius + padding) as f64
    }

    /// Pulls the drawn center toward the surface center by `factor` of its
    /// offset. A factor of 0 puts the bubble back on its base center.
    pub fn adjust_coordinates(&mut self, half_width: i32, half_height: i32, factor: f32) {
        let offset_x = (self.base_x - half_width) as f32;
        let offset_y = (self.base_y - half_height) as f32;

        self.current_x = self.base_x as f32 - offset_x * factor;
        self.current_y = self.base_y as f32 - offset_y * factor;
    }

    pub fn set_radius_factor(&mut self, factor: f32) {
        self.current_radius = self.base_radius as f32 * factor;
    }

    pub fn shadow_x(&self) -> f32 {
        self.current_x + self.current_radius / 5.0
    }

    pub fn shadow_y(&self) -> f32 {
        self.current_y + self.current_radius / 5.0
    }

    pub fn shadow_radius(&self) -> f32 {
        self.current_radius * 0.9
    }
}

/// First bubble, in set order, whose base circle holds the point.
pub fn bubble_at(bubbles: &[Bubble], x: i32, y: i32) -> Option<usize> {
    bubbles.iter().position(|b| b.contains(x, y))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bubble(x: i32, y: i32, r: i32) -> Bubble {
        Bubble::new(x, y, r, 0xFF_FF_00_00, 0xFF_00_00_00)
    }

    #[test]
    fn current_geometry_starts_at_base() {
        let b = bubble(30, 40, 12);
        assert_eq!(b.current_x, 30.0);
        assert_eq!(b.current_y, 40.0);
        assert_eq!(b.current_radius, 12.0);
    }

    #[test]
    fn center_hits_and_edge_misses() {
        let b = bubble(100, 100, 20);
        assert!(b.contains(100, 100));
        assert!(b.contains(119, 100));
        assert!(!b.contains(120, 100));
        assert!(!b.contains(121, 100));
    }

    #[test]
    fn hit_test_returns_first_in_set_order() {
        let bubbles = vec![bubble(50, 50, 30), bubble(60, 50, 30), bubble(300, 300, 10)];

        assert_eq!(bubble_at(&bubbles, 55, 50), Some(0));
        assert_eq!(bubble_at(&bubbles, 85, 50), Some(1));
        assert_eq!(bubble_at(&bubbles, 300, 300), Some(2));
        assert_eq!(bubble_at(&bubbles, 200, 200), None);
    }

    #[test]
    fn overlap_is_strict() {
        let b = bubble(0, 0, 10);
        // 10 + 10 + 5 = 25 apart exactly: tangent with padding, accepted.
        assert!(!b.overlaps(25, 0, 10, 5));
        assert!(b.overlaps(24, 0, 10, 5));
    }

    #[test]
    fn adjust_zero_restores_base() {
        let mut b = bubble(100, 700, 12);
        b.adjust_coordinates(200, 400, 0.35);
        assert!(b.current_x != 100.0);

        b.adjust_coordinates(200, 400, 0.0);
        assert_eq!(b.current_x, 100.0);
        assert_eq!(b.current_y, 700.0);
    }

    #[test]
    fn adjust_pulls_toward_center() {
        let mut b = bubble(100, 700, 12);
        b.adjust_coordinates(200, 400, 0.5);
        assert_eq!(b.current_x, 150.0);
        assert_eq!(b.current_y, 550.0);

        b.adjust_coordinates(200, 400, 1.0);
        assert_eq!(b.current_x, 200.0);
        assert_eq!(b.current_y, 400.0);
    }

    #[test]
    fn shadow_sits_down_and_right() {
        let b = bubble(100, 100, 50);
        assert_eq!(b.shadow_x(), 110.0);
        assert_eq!(b.shadow_y(), 110.0);
        assert_eq!(b.shadow_radius(), 45.0);
    }
}
