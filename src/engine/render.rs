use crate::{
    bubble::Bubble,
    graphics::{
        blend::{Argb, Pixel},
        gradient::{LinearGradient, RadialGradient, TileMode},
        Canvas,
    },
};

const SHADOW_COLOR: Argb = 0xFF_00_00_00;
const OUTLINE_SIZE: f32 = 30.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum BubbleStyle {
    /// Accent-colored bubbles with a radial shade.
    Themed,
    /// Solid palette fills with an outline ring.
    Palette,
}

/// Grayscale base plus the accent gradient rising from the bottom edge.
pub(crate) fn draw_background(
    canvas: &mut Canvas,
    brightness: f32,
    factor: f32,
    night: bool,
    accent: Argb,
) {
    canvas.fill(Argb::gray(brightness));

    let height = canvas.height() as f32;

    let dark = accent.scale_alpha(if night { 0.1 } else { 0.6 });
    let bright = accent.scale_alpha(0.3);

    canvas.draw_linear_gradient(&LinearGradient {
        y_start: height,
        y_end: height - height * (factor * 0.75),
        color_start: dark,
        color_end: bright,
    });
}

pub(crate) fn draw_bubbles(canvas: &mut Canvas, bubbles: &[Bubble], style: BubbleStyle, night: bool) {
    for bubble in bubbles {
        draw_shadow(canvas, bubble);

        match style {
            BubbleStyle::Themed => draw_shaded_fill(canvas, bubble, night),
            BubbleStyle::Palette => draw_outlined_fill(canvas, bubble),
        }
    }
}

fn draw_shadow(canvas: &mut Canvas, bubble: &Bubble) {
    let (x, y, r) = (bubble.shadow_x(), bubble.shadow_y(), bubble.shadow_radius());

    let falloff = RadialGradient {
        cx: x,
        cy: y,
        radius: r,
        color_center: SHADOW_COLOR,
        color_edge: SHADOW_COLOR.set_alpha(0),
        tile: TileMode::Clamp,
    };

    canvas.fill_circle_radial(x, y, r, &falloff);
}

fn draw_shaded_fill(canvas: &mut Canvas, bubble: &Bubble, night: bool) {
    let r = bubble.current_radius;
    let offset = r * 0.5;

    // Brighter edge in day mode keeps contrast low.
    let edge = bubble.fill.scale_rgb(if night { 0.5 } else { 0.75 });

    let shade = RadialGradient {
        cx: bubble.current_x - offset,
        cy: bubble.current_y - offset,
        radius: r * 2.0,
        color_center: bubble.fill,
        color_edge: edge,
        tile: TileMode::Repeat,
    };

    canvas.fill_circle_radial(bubble.current_x, bubble.current_y, r, &shade);
}

fn draw_outlined_fill(canvas: &mut Canvas, bubble: &Bubble) {
    let r = bubble.current_radius;

    canvas.fill_circle(bubble.current_x, bubble.current_y, r, bubble.fill);

    let stroke = OUTLINE_SIZE.min(r);
    if stroke > 0.0 {
        canvas.stroke_circle(
            bubble.current_x,
            bubble.current_y,
            r - stroke / 2.0,
            stroke,
            bubble.outline,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ACCENT: Argb = 0xFF_1E_88_E5;

    #[test]
    fn background_is_gray_under_tint() {
        let mut canvas = Canvas::new(10, 100);
        draw_background(&mut canvas, 0.0, 0.0, true, 0x00_00_00_00);
        assert_eq!(canvas.pixel(5, 50), Some(Argb::black()));

        draw_background(&mut canvas, 1.0, 0.0, false, 0x00_00_00_00);
        assert_eq!(canvas.pixel(5, 50), Some(Argb::white()));
    }

    #[test]
    fn gradient_climbs_with_factor() {
        let mut low = Canvas::new(4, 200);
        let mut high = Canvas::new(4, 200);
        draw_background(&mut low, 0.0, 0.0, false, ACCENT);
        draw_background(&mut high, 0.0, 1.0, false, ACCENT);

        // The dark end reaches further up the screen at a higher factor.
        let blue = |c: &Canvas| c.pixel(0, 120).unwrap_or_default().decompose()[3];
        assert!(blue(&high) > blue(&low));
    }

    #[test]
    fn themed_bubble_is_drawn_in_accent_family() {
        let mut canvas = Canvas::new(200, 200);
        canvas.fill(Argb::white());
        let bubbles = [Bubble::new(100, 100, 40, ACCENT, ACCENT)];
        draw_bubbles(&mut canvas, &bubbles, BubbleStyle::Themed, false);

        let [_, r, _, b] = canvas.pixel(80, 80).unwrap_or_default().decompose();
        assert!(b > r);
        assert_eq!(canvas.pixel(5, 5), Some(Argb::white()));
    }

    #[test]
    fn palette_bubble_has_outline_and_fill() {
        let mut canvas = Canvas::new(300, 300);
        canvas.fill(Argb::white());
        let fill = 0xFF_00_FF_00;
        let outline = 0xFF_FF_00_00;
        let bubbles = [Bubble::new(150, 150, 100, fill, outline)];
        draw_bubbles(&mut canvas, &bubbles, BubbleStyle::Palette, false);

        assert_eq!(canvas.pixel(150, 150), Some(fill));
        assert_eq!(canvas.pixel(150, 65), Some(outline));
    }

    #[test]
    fn zero_radius_bubble_draws_nothing() {
        let mut canvas = Canvas::new(50, 50);
        canvas.fill(Argb::white());
        let mut bubble = Bubble::new(25, 25, 10, ACCENT, ACCENT);
        bubble.current_radius = 0.0;
        draw_bubbles(&mut canvas, &[bubble], BubbleStyle::Palette, true);

        assert!(canvas.as_slice().iter().all(|&p| p == Argb::white()));
    }
}
