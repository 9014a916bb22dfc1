//! Animated bubble wallpaper.
//!
//! [`packer`] scatters non-overlapping circles over a surface, the
//! [`engine`] animates them frame by frame in response to [`event::Event`]s,
//! and [`modes`] adapt a window or a terminal to the engine's [`surface::Surface`].

pub mod bubble;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod graphics;
pub mod modes;
pub mod packer;
pub mod surface;
pub mod theme;
