pub type Argb = u32;

pub fn u8_mul(a: u8, b: u8) -> u8 {
    ((a as u16 * b as u16 + 127) / 255) as u8
}

/// Source-over compositing of `c2` on top of `c1`, straight (non-premultiplied) alpha.
pub fn composite_u32(c1: Argb, c2: Argb) -> Argb {
    let [a1, r1, g1, b1] = c1.decompose();
    let [a2, r2, g2, b2] = c2.decompose();

    if a2 == 255 {
        return c2;
    }

    if a2 == 0 {
        return c1;
    }

    let (a, a3) = {
        let a1 = a1 as u32;
        let a2 = a2 as u32;

        let a3 = (a1 * (255 - a2) + 127) / 255;

        (a2 + a3, a3)
    };

    if a == 0 {
        return Argb::trans();
    }

    let composite_channel = |c1: u8, c2: u8| -> u8 {
        let c1 = c1 as u32;
        let c2 = c2 as u32;
        let a2 = a2 as u32;

        ((c2 * a2 + c1 * a3 + a / 2) / a) as u8
    };

    Argb::compose([
        a as u8,
        composite_channel(r1, r2),
        composite_channel(g1, g2),
        composite_channel(b1, b2),
    ])
}

fn lerp_channel(a: u8, b: u8, t: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * t).round().clamp(0.0, 255.0) as u8
}

pub trait Pixel: Copy + Sized + std::fmt::Debug {
    fn black() -> Self;
    fn white() -> Self;
    fn trans() -> Self;

    /// Opaque gray at `brightness` in `0..=1`.
    fn gray(brightness: f32) -> Self;

    fn mix(self, other: Self) -> Self;
    fn lerp(self, other: Self, t: f32) -> Self;

    fn set_alpha(self, alpha: u8) -> Self;
    fn alpha(self) -> u8;

    fn fade(self, alpha: u8) -> Self;
    fn scale_alpha(self, factor: f32) -> Self;
    fn scale_rgb(self, factor: f32) -> Self;

    fn decompose(self) -> [u8; 4];
    fn compose(array: [u8; 4]) -> Self;
}

impl Pixel for Argb {
    fn black() -> Argb {
        0xFF_00_00_00
    }

    fn white() -> Argb {
        0xFF_FF_FF_FF
    }

    fn trans() -> Argb {
        0x0
    }

    fn gray(brightness: f32) -> Argb {
        let v = (255.0 * brightness.clamp(0.0, 1.0)).round() as u8;
        Argb::compose([0xFF, v, v, v])
    }

    fn mix(self, other: Argb) -> Argb {
        composite_u32(self, other)
    }

    fn lerp(self, other: Argb, t: f32) -> Argb {
        let t = t.clamp(0.0, 1.0);
        let [a1, r1, g1, b1] = self.decompose();
        let [a2, r2, g2, b2] = other.decompose();
        Argb::compose([
            lerp_channel(a1, a2, t),
            lerp_channel(r1, r2, t),
            lerp_channel(g1, g2, t),
            lerp_channel(b1, b2, t),
        ])
    }

    fn set_alpha(self, alpha: u8) -> Argb {
        (self & 0x00_FF_FF_FF) | (alpha as Argb) << 24
    }

    fn alpha(self) -> u8 {
        (self >> 24) as u8
    }

    fn fade(self, alpha: u8) -> Argb {
        self.set_alpha(u8_mul(self.alpha(), alpha))
    }

    /// Alpha times `factor`, rounded.
    fn scale_alpha(self, factor: f32) -> Argb {
        let a = (self.alpha() as f32 * factor).round().clamp(0.0, 255.0) as u8;
        self.set_alpha(a)
    }

    /// Color channels times `factor`, truncated. Alpha is kept.
    fn scale_rgb(self, factor: f32) -> Argb {
        let [a, r, g, b] = self.decompose();
        let scale = |c: u8| (c as f32 * factor).clamp(0.0, 255.0) as u8;
        Argb::compose([a, scale(r), scale(g), scale(b)])
    }

    fn decompose(self) -> [u8; 4] {
        self.to_be_bytes()
    }

    fn compose(array: [u8; 4]) -> Argb {
        Argb::from_be_bytes(array)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opaque_source_replaces_destination() {
        assert_eq!(composite_u32(0xFF_10_20_30, 0xFF_AA_BB_CC), 0xFF_AA_BB_CC);
    }

    #[test]
    fn transparent_source_keeps_destination() {
        assert_eq!(composite_u32(0xFF_10_20_30, 0x00_AA_BB_CC), 0xFF_10_20_30);
    }

    #[test]
    fn half_black_over_white_is_mid_gray() {
        let [a, r, g, b] = composite_u32(Argb::white(), 0x80_00_00_00).decompose();
        assert_eq!(a, 0xFF);
        assert!((126..=128).contains(&r));
        assert_eq!(r, g);
        assert_eq!(g, b);
    }

    #[test]
    fn alpha_scaling_rounds() {
        assert_eq!(0xFF_12_34_56u32.scale_alpha(0.6), 0x99_12_34_56);
        assert_eq!(0xFF_12_34_56u32.scale_alpha(0.3), 0x4D_12_34_56);
    }

    #[test]
    fn brightness_scaling_truncates_and_keeps_alpha() {
        assert_eq!(0xFF_FF_80_03u32.scale_rgb(0.5), 0xFF_7F_40_01);
    }

    #[test]
    fn gray_levels() {
        assert_eq!(Argb::gray(0.0), Argb::black());
        assert_eq!(Argb::gray(1.0), Argb::white());
        assert_eq!(Argb::gray(0.5), 0xFF_80_80_80);
    }
}
