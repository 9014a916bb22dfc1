use super::blend::{Argb, Pixel};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TileMode {
    /// Hold the end colors outside the gradient span.
    Clamp,
    /// Restart the gradient every span.
    Repeat,
}

impl TileMode {
    fn apply(self, t: f32) -> f32 {
        match self {
            TileMode::Clamp => t.clamp(0.0, 1.0),
            TileMode::Repeat => t.rem_euclid(1.0),
        }
    }
}

/// Vertical two-stop gradient from `y_start` to `y_end`.
#[derive(Debug, Clone, Copy)]
pub struct LinearGradient {
    pub y_start: f32,
    pub y_end: f32,
    pub color_start: Argb,
    pub color_end: Argb,
}

impl LinearGradient {
    pub fn color_at(&self, y: f32) -> Argb {
        let span = self.y_end - self.y_start;
        if span == 0.0 {
            return if y >= self.y_start {
                self.color_start
            } else {
                self.color_end
            };
        }

        let t = TileMode::Clamp.apply((y - self.y_start) / span);
        self.color_start.lerp(self.color_end, t)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct RadialGradient {
    pub cx: f32,
    pub cy: f32,
    pub radius: f32,
    pub color_center: Argb,
    pub color_edge: Argb,
    pub tile: TileMode,
}

impl RadialGradient {
    pub fn color_at(&self, x: f32, y: f32) -> Argb {
        if self.radius <= 0.0 {
            return self.color_edge;
        }

        let d = ((x - self.cx).powi(2) + (y - self.cy).powi(2)).sqrt();
        let t = self.tile.apply(d / self.radius);
        self.color_center.lerp(self.color_edge, t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_clamps_outside_span() {
        let g = LinearGradient {
            y_start: 100.0,
            y_end: 0.0,
            color_start: 0xFF_00_00_00,
            color_end: 0xFF_FF_FF_FF,
        };

        assert_eq!(g.color_at(150.0), 0xFF_00_00_00);
        assert_eq!(g.color_at(-20.0), 0xFF_FF_FF_FF);
        assert_eq!(g.color_at(50.0), 0xFF_80_80_80);
    }

    #[test]
    fn radial_repeat_wraps() {
        let g = RadialGradient {
            cx: 0.0,
            cy: 0.0,
            radius: 10.0,
            color_center: 0xFF_00_00_00,
            color_edge: 0xFF_FF_FF_FF,
            tile: TileMode::Repeat,
        };

        assert_eq!(g.color_at(0.0, 0.0), 0xFF_00_00_00);
        assert_eq!(g.color_at(15.0, 0.0), g.color_at(5.0, 0.0));
    }

    #[test]
    fn radial_clamp_holds_edge() {
        let g = RadialGradient {
            cx: 0.0,
            cy: 0.0,
            radius: 10.0,
            color_center: 0xFF_00_00_00,
            color_edge: 0x00_00_00_00,
            tile: TileMode::Clamp,
        };

        assert_eq!(g.color_at(30.0, 0.0), 0x00_00_00_00);
    }
}
