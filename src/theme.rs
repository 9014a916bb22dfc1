//! Theme and color collaborators.
//!
//! The engine never looks colors up itself. It asks an [`Appearance`] for
//! the night flag, the accent color and the bubble palette whenever an event
//! says those may have changed.

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

use crate::graphics::blend::Argb;

/// Accent colors selectable from the theme picker.
pub const THEME_COLORS: [Argb; 4] = [0xFF_1E_88_E5, 0xFF_00_89_7B, 0xFF_F4_51_1E, 0xFF_8E_24_AA];

/// `(outline, fill)` pairs for the palette style.
pub const BUBBLE_PALETTE: [(Argb, Argb); 6] = [
    (0xFF_D3_2F_2F, 0xFF_EF_53_50),
    (0xFF_C2_18_5B, 0xFF_EC_40_7A),
    (0xFF_30_3F_9F, 0xFF_5C_6B_C0),
    (0xFF_00_79_6B, 0xFF_26_A6_9A),
    (0xFF_F5_7C_00, 0xFF_FF_A7_26),
    (0xFF_68_9F_38, 0xFF_9C_CC_65),
];

pub trait Appearance {
    fn is_night_mode(&self) -> bool;
    fn accent_color(&self) -> Argb;
    fn palette(&self) -> &[(Argb, Argb)];
}

/// Currently selected theme index.
///
/// Cloned into whoever needs it. The settings side calls [`SharedTheme::set`],
/// the appearance side reads with [`SharedTheme::get`].
#[derive(Debug, Clone, Default)]
pub struct SharedTheme(Arc<AtomicUsize>);

impl SharedTheme {
    pub fn new(index: usize) -> Self {
        Self(Arc::new(AtomicUsize::new(index)))
    }

    pub fn get(&self) -> usize {
        self.0.load(Ordering::Acquire)
    }

    pub fn set(&self, index: usize) {
        self.0.store(index, Ordering::Release);
    }

    /// Moves to the next of `count` themes and returns the new index.
    pub fn cycle(&self, count: usize) -> usize {
        let next = (self.get() + 1) % count.max(1);
        self.set(next);
        next
    }
}

/// Stock [`Appearance`]: accent from [`THEME_COLORS`] at the shared index.
pub struct ThemeAppearance {
    theme: SharedTheme,
    night: bool,
    colors: Vec<Argb>,
}

impl ThemeAppearance {
    pub fn new(theme: SharedTheme, night: bool) -> Self {
        Self {
            theme,
            night,
            colors: THEME_COLORS.to_vec(),
        }
    }

    pub fn set_night_mode(&mut self, night: bool) {
        self.night = night;
    }

    pub fn theme_count(&self) -> usize {
        self.colors.len()
    }
}

impl Appearance for ThemeAppearance {
    fn is_night_mode(&self) -> bool {
        self.night
    }

    fn accent_color(&self) -> Argb {
        let index = self.theme.get() % self.colors.len().max(1);
        self.colors.get(index).copied().unwrap_or(THEME_COLORS[0])
    }

    fn palette(&self) -> &[(Argb, Argb)] {
        &BUBBLE_PALETTE
    }
}

/// Colors the host reports for wallpaper color extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WallpaperColors {
    pub primary: Argb,
    pub secondary: Argb,
    pub tertiary: Argb,
}

impl WallpaperColors {
    pub fn from_accent(accent: Argb) -> Self {
        Self {
            primary: accent,
            secondary: accent,
            tertiary: accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_changes_are_seen_by_reader() {
        let settings = SharedTheme::new(0);
        let appearance = ThemeAppearance::new(settings.clone(), false);
        assert_eq!(appearance.accent_color(), THEME_COLORS[0]);

        settings.set(2);
        assert_eq!(appearance.accent_color(), THEME_COLORS[2]);
    }

    #[test]
    fn cycling_wraps() {
        let theme = SharedTheme::new(3);
        assert_eq!(theme.cycle(4), 0);
        assert_eq!(theme.cycle(4), 1);
    }

    #[test]
    fn out_of_range_index_wraps_to_table() {
        let appearance = ThemeAppearance::new(SharedTheme::new(9), true);
        assert_eq!(appearance.accent_color(), THEME_COLORS[1]);
        assert!(appearance.is_night_mode());
    }
}
