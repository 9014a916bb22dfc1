//! Rejection-sampling circle packer.
//!
//! Bubbles are added one at a time. Each new bubble gets `max_retries`
//! random placements; the first one that keeps `padding` clear of every
//! accepted bubble wins. When a bubble runs out of placements the surface is
//! considered full and packing stops.

use rand::{rngs::StdRng, Rng, SeedableRng};
use tracing::debug;

use crate::{
    bubble::Bubble,
    config,
    error::ConfigError,
    graphics::blend::Argb,
};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackParams {
    min_radius: i32,
    max_radius: i32,
    padding: i32,
    max_retries: u32,
}

impl Default for PackParams {
    fn default() -> Self {
        Self {
            min_radius: config::DEFAULT_MIN_RADIUS,
            max_radius: config::DEFAULT_MAX_RADIUS,
            padding: config::DEFAULT_PADDING,
            max_retries: config::DEFAULT_RETRIES,
        }
    }
}

impl PackParams {
    /// Radii are drawn from `min_radius..max_radius`, or exactly
    /// `min_radius` when the two are equal.
    pub fn new(
        min_radius: i32,
        max_radius: i32,
        padding: i32,
        max_retries: u32,
    ) -> Result<Self, ConfigError> {
        if min_radius <= 0 {
            return Err(ConfigError::NonPositiveRadius(min_radius));
        }

        if min_radius > max_radius {
            return Err(ConfigError::InvertedRadii {
                min: min_radius,
                max: max_radius,
            });
        }

        if padding <= 0 {
            return Err(ConfigError::NonPositivePadding(padding));
        }

        Ok(Self {
            min_radius,
            max_radius,
            padding,
            max_retries,
        })
    }

    pub fn min_radius(&self) -> i32 {
        self.min_radius
    }

    pub fn max_radius(&self) -> i32 {
        self.max_radius
    }

    pub fn padding(&self) -> i32 {
        self.padding
    }

    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }
}

/// Where a new bubble gets its colors from.
#[derive(Debug, Clone, Copy)]
pub enum ColorSource<'a> {
    /// Every bubble shares one color.
    Uniform(Argb),
    /// Each bubble draws an `(outline, fill)` pair.
    Palette(&'a [(Argb, Argb)]),
}

pub struct Packer {
    params: PackParams,
    rng: StdRng,
}

impl Packer {
    pub fn new(params: PackParams, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Self { params, rng }
    }

    pub fn params(&self) -> &PackParams {
        &self.params
    }

    pub fn pack(&mut self, width: u32, height: u32, colors: ColorSource) -> Vec<Bubble> {
        let width = i32::try_from(width).unwrap_or(i32::MAX);
        let height = i32::try_from(height).unwrap_or(i32::MAX);

        let mut bubbles = Vec::new();

        while let Some((x, y, radius)) = self.place(&bubbles, width, height) {
            let (outline, fill) = match colors {
                ColorSource::Uniform(c) => (c, c),
                ColorSource::Palette(pairs) if !pairs.is_empty() => {
                    pairs[self.rng.gen_range(0..pairs.len())]
                }
                ColorSource::Palette(_) => (0, 0),
            };

            bubbles.push(Bubble::new(x, y, radius, fill, outline));
        }

        debug!(
            count = bubbles.len(),
            width, height, "packed bubble set"
        );

        bubbles
    }

    fn place(&mut self, bubbles: &[Bubble], width: i32, height: i32) -> Option<(i32, i32, i32)> {
        let PackParams {
            min_radius,
            max_radius,
            padding,
            max_retries,
        } = self.params;

        for _ in 0..max_retries {
            let radius = if min_radius < max_radius {
                self.rng.gen_range(min_radius..max_radius)
            } else {
                min_radius
            };

            let low = radius.saturating_add(padding);
            let high_x = width.saturating_sub(low);
            let high_y = height.saturating_sub(low);

            // Surface too small for this radius.
            if low >= high_x || low >= high_y {
                continue;
            }

            let x = self.rng.gen_range(low..high_x);
            let y = self.rng.gen_range(low..high_y);

            if !bubbles.iter().any(|b| b.overlaps(x, y, radius, padding)) {
                return Some((x, y, radius));
            }
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLOR: Argb = 0xFF_33_99_CC;

    fn packer(min: i32, max: i32, padding: i32, retries: u32, seed: u64) -> Packer {
        Packer::new(PackParams::new(min, max, padding, retries).unwrap(), Some(seed))
    }

    fn assert_no_overlap(bubbles: &[Bubble], padding: i32) {
        for (i, a) in bubbles.iter().enumerate() {
            for b in &bubbles[i + 1..] {
                let dx = (a.base_x() - b.base_x()) as f64;
                let dy = (a.base_y() - b.base_y()) as f64;
                let distance = (dx * dx + dy * dy).sqrt();
                assert!(
                    distance >= (a.base_radius() + b.base_radius() + padding) as f64,
                    "{a:?} overlaps {b:?}"
                );
            }
        }
    }

    #[test]
    fn rejects_bad_params() {
        assert_eq!(
            PackParams::new(0, 10, 5, 10),
            Err(ConfigError::NonPositiveRadius(0))
        );
        assert_eq!(
            PackParams::new(30, 10, 5, 10),
            Err(ConfigError::InvertedRadii { min: 30, max: 10 })
        );
        assert_eq!(
            PackParams::new(10, 30, 0, 10),
            Err(ConfigError::NonPositivePadding(0))
        );
        assert!(PackParams::new(10, 10, 1, 0).is_ok());
    }

    #[test]
    fn default_scenario_fills_the_surface() {
        for seed in 0..20 {
            let bubbles = packer(20, 250, 50, 50, seed).pack(1000, 1000, ColorSource::Uniform(COLOR));

            assert!(!bubbles.is_empty());
            assert_no_overlap(&bubbles, 50);

            for b in &bubbles {
                let low = b.base_radius() + 50;
                let high = 1000 - b.base_radius() - 50;
                assert!((low..=high).contains(&b.base_x()));
                assert!((low..=high).contains(&b.base_y()));
                assert!((20..250).contains(&b.base_radius()));
                assert_eq!(b.fill, COLOR);
            }
        }
    }

    #[test]
    fn dense_requests_stay_non_overlapping() {
        let bubbles = packer(5, 15, 2, 500, 7).pack(400, 300, ColorSource::Uniform(COLOR));
        assert!(bubbles.len() > 20);
        assert_no_overlap(&bubbles, 2);
    }

    #[test]
    fn degenerate_surface_is_empty() {
        let bubbles = packer(20, 250, 50, 50, 1).pack(100, 100, ColorSource::Uniform(COLOR));
        assert!(bubbles.is_empty());

        let bubbles = packer(20, 250, 50, 50, 1).pack(0, 0, ColorSource::Uniform(COLOR));
        assert!(bubbles.is_empty());
    }

    #[test]
    fn huge_radii_terminate() {
        let bubbles = packer(200, 600, 10, 50, 3).pack(640, 480, ColorSource::Uniform(COLOR));
        assert!(bubbles.len() <= 1);
    }

    #[test]
    fn zero_retries_packs_nothing() {
        for seed in 0..5 {
            let bubbles = packer(20, 250, 50, 0, seed).pack(1000, 1000, ColorSource::Uniform(COLOR));
            assert!(bubbles.is_empty());
        }
    }

    #[test]
    fn equal_radii_are_fixed() {
        let bubbles = packer(30, 30, 5, 50, 11).pack(800, 800, ColorSource::Uniform(COLOR));
        assert!(!bubbles.is_empty());
        assert!(bubbles.iter().all(|b| b.base_radius() == 30));
    }

    #[test]
    fn same_seed_same_layout() {
        let a = packer(20, 250, 50, 50, 42).pack(1080, 1920, ColorSource::Uniform(COLOR));
        let b = packer(20, 250, 50, 50, 42).pack(1080, 1920, ColorSource::Uniform(COLOR));
        assert_eq!(a, b);
    }

    #[test]
    fn palette_pairs_split_into_outline_and_fill() {
        let pairs = [(0xFF_00_00_01, 0xFF_00_00_02), (0xFF_00_00_03, 0xFF_00_00_04)];
        let bubbles = packer(20, 80, 10, 50, 5).pack(600, 600, ColorSource::Palette(&pairs));

        assert!(!bubbles.is_empty());
        for b in &bubbles {
            assert!(pairs.contains(&(b.outline, b.fill)));
        }
    }
}
