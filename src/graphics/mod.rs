pub mod blend;
pub mod gradient;

use blend::{Argb, Pixel};
use gradient::{LinearGradient, RadialGradient};

/// Software ARGB frame the engine paints into. Hosts copy it out on present.
pub struct Canvas {
    buffer: Vec<Argb>,
    width: usize,
    height: usize,
}

impl Canvas {
    pub fn new(w: usize, h: usize) -> Self {
        Self {
            buffer: vec![Argb::trans(); w * h],
            width: w,
            height: h,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn sizeu(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn as_slice(&self) -> &[Argb] {
        &self.buffer
    }

    pub fn resize(&mut self, w: usize, h: usize) {
        self.buffer.resize(w * h, Argb::trans());
        self.width = w;
        self.height = h;
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Argb> {
        if x >= self.width {
            return None;
        }
        self.buffer.get(y * self.width + x).copied()
    }

    pub fn fill(&mut self, c: Argb) {
        self.buffer.fill(c);
    }

    /// Blends a vertical gradient over every pixel of the canvas.
    pub fn draw_linear_gradient(&mut self, gradient: &LinearGradient) {
        if self.width == 0 {
            return;
        }

        for (y, row) in self.buffer.chunks_exact_mut(self.width).enumerate() {
            let c = gradient.color_at(y as f32 + 0.5);
            if c.alpha() == 0 {
                continue;
            }
            row.iter_mut().for_each(|p| *p = p.mix(c));
        }
    }

    /// Fills a circle, asking `shade` for the color of every covered pixel.
    /// The outermost pixel ring is blended by coverage.
    pub fn fill_circle_with<F>(&mut self, cx: f32, cy: f32, radius: f32, shade: F)
    where
        F: Fn(f32, f32) -> Argb,
    {
        if radius <= 0.0 || self.width == 0 || self.height == 0 {
            return;
        }

        let ys = (cy - radius).floor().max(0.0) as usize;
        let ye = ((cy + radius).ceil().max(0.0) as usize).min(self.height);
        let xs = (cx - radius).floor().max(0.0) as usize;
        let xe = ((cx + radius).ceil().max(0.0) as usize).min(self.width);

        for y in ys..ye {
            let py = y as f32 + 0.5;
            let row = &mut self.buffer[y * self.width..(y + 1) * self.width];

            for (x, p) in row.iter_mut().enumerate().take(xe).skip(xs) {
                let px = x as f32 + 0.5;
                let d = ((px - cx).powi(2) + (py - cy).powi(2)).sqrt();

                let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
                if coverage == 0.0 {
                    continue;
                }

                let mut c = shade(px, py);
                if coverage < 1.0 {
                    c = c.fade((coverage * 255.0) as u8);
                }

                *p = p.mix(c);
            }
        }
    }

    pub fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Argb) {
        self.fill_circle_with(cx, cy, radius, |_, _| color);
    }

    pub fn fill_circle_radial(&mut self, cx: f32, cy: f32, radius: f32, gradient: &RadialGradient) {
        self.fill_circle_with(cx, cy, radius, |x, y| gradient.color_at(x, y));
    }

    /// Strokes a ring of `stroke` width centered on `radius`.
    pub fn stroke_circle(&mut self, cx: f32, cy: f32, radius: f32, stroke: f32, color: Argb) {
        let outer = radius + stroke / 2.0;
        let inner = radius - stroke / 2.0;

        self.fill_circle_with(cx, cy, outer, |x, y| {
            let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            let coverage = (d - inner + 0.5).clamp(0.0, 1.0);
            color.fade((coverage * 255.0) as u8)
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gradient::TileMode;

    #[test]
    fn fill_and_read_back() {
        let mut canvas = Canvas::new(4, 3);
        canvas.fill(0xFF_11_22_33);
        assert_eq!(canvas.pixel(3, 2), Some(0xFF_11_22_33));
        assert_eq!(canvas.pixel(4, 0), None);
        assert_eq!(canvas.pixel(0, 3), None);
    }

    #[test]
    fn resize_reports_new_dimensions() {
        let mut canvas = Canvas::new(4, 4);
        canvas.resize(10, 2);
        assert_eq!(canvas.sizeu(), (10, 2));
        assert_eq!(canvas.as_slice().len(), 20);
    }

    #[test]
    fn circle_covers_center_not_corners() {
        let mut canvas = Canvas::new(21, 21);
        canvas.fill(Argb::black());
        canvas.fill_circle(10.5, 10.5, 6.0, Argb::white());

        assert_eq!(canvas.pixel(10, 10), Some(Argb::white()));
        assert_eq!(canvas.pixel(0, 0), Some(Argb::black()));
        assert_eq!(canvas.pixel(20, 20), Some(Argb::black()));
    }

    #[test]
    fn circle_clipped_at_edges_does_not_panic() {
        let mut canvas = Canvas::new(8, 8);
        canvas.fill_circle(-3.0, 9.0, 6.0, Argb::white());
        canvas.fill_circle(100.0, 100.0, 6.0, Argb::white());
        assert_eq!(canvas.pixel(0, 7), Some(Argb::white()));
    }

    #[test]
    fn ring_leaves_center_untouched() {
        let mut canvas = Canvas::new(41, 41);
        canvas.fill(Argb::black());
        canvas.stroke_circle(20.5, 20.5, 15.0, 4.0, Argb::white());

        assert_eq!(canvas.pixel(20, 20), Some(Argb::black()));
        assert_eq!(canvas.pixel(35, 20), Some(Argb::white()));
    }

    #[test]
    fn gradient_spans_rows() {
        let mut canvas = Canvas::new(2, 10);
        canvas.fill(Argb::black());
        canvas.draw_linear_gradient(&LinearGradient {
            y_start: 10.0,
            y_end: 0.0,
            color_start: 0xFF_00_00_00,
            color_end: 0xFF_FF_FF_FF,
        });

        let top = canvas.pixel(0, 0).unwrap_or_default();
        let bottom = canvas.pixel(0, 9).unwrap_or_default();
        assert!(top.decompose()[1] > 200);
        assert!(bottom.decompose()[1] < 30);
    }

    #[test]
    fn radial_fill_uses_gradient() {
        let mut canvas = Canvas::new(20, 20);
        canvas.fill(Argb::black());
        let gradient = RadialGradient {
            cx: 10.0,
            cy: 10.0,
            radius: 10.0,
            color_center: 0xFF_FF_00_00,
            color_edge: 0xFF_00_00_FF,
            tile: TileMode::Clamp,
        };
        canvas.fill_circle_radial(10.0, 10.0, 8.0, &gradient);

        let [_, r, _, b] = canvas.pixel(10, 10).unwrap_or_default().decompose();
        assert!(r > b);
    }
}
