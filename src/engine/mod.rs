//! Bubble animation engine.
//!
//! One [`Engine`] lives per surface. Hosts feed it [`Event`]s one at a time;
//! each event runs its transition to completion, presenting every frame
//! synchronously before [`Engine::handle`] returns. There is no internal
//! locking: the host must not call into the engine from two places at once.

pub mod render;


use std::time::Instant;

use tracing::{debug, trace, warn};

use crate::{
    bubble::{self, Bubble},
    error::{ConfigError, EngineError, SurfaceError},
    event::Event,
    graphics::blend::Argb,
    packer::{ColorSource, PackParams, Packer},
    surface::Surface,
    theme::{Appearance, WallpaperColors},
};

pub use render::BubbleStyle;

/// Frames per touch press or release.
pub const TOUCH_FRAMES: u32 = 5;
/// Radius change per touch frame.
pub const TOUCH_STEP: f32 = 1.0;
/// Brightness sweep steps of a night/day transition (frames = steps + 1).
pub const UI_MODE_STEPS: u32 = 20;
/// Smooth transitions move `base_radius * SMOOTH_STEP` per frame at full speed.
pub const SMOOTH_STEP: f32 = 0.05;
/// Floor of the ease curve so a transition never stalls.
pub const MIN_SPEED: f32 = 0.001;
/// Bubble size while the screen is off.
pub const SCREEN_OFF_FACTOR: f32 = 1.0 / 3.0;
/// Portion of the launcher zoom that is kept.
pub const ZOOM_SCALE: f32 = 0.35;

/// A bubble held down by the pointer and how far it has been inflated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Press {
    pub index: usize,
    pub frames: u32,
}

/// Render state shared by every transition.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationState {
    /// Height factor of the background gradient as last presented.
    pub gradient_factor: f32,
    /// Base layer brightness as last presented.
    pub brightness: f32,
    pub night_mode: bool,
    pub accent: Argb,
    pub pressed: Option<Press>,
    pub last_unlock: Option<Instant>,
    pub zoom: f32,
}

impl AnimationState {
    fn new(night_mode: bool, accent: Argb) -> Self {
        Self {
            gradient_factor: 0.0,
            brightness: resting_brightness(night_mode),
            night_mode,
            accent,
            pressed: None,
            last_unlock: None,
            zoom: 0.0,
        }
    }
}

fn resting_brightness(night_mode: bool) -> f32 {
    if night_mode {
        0.0
    } else {
        1.0
    }
}

/// Ease-in/ease-out multiplier for a transition spanning `range` with
/// `to_go` left. Rises from the floor to 1 at the midpoint, then falls back.
pub fn speed_modifier(range: f32, to_go: f32) -> f32 {
    let half = range / 2.0;
    if half <= 0.0 || !half.is_finite() {
        return MIN_SPEED;
    }

    let mut modifier = to_go / half;
    if modifier > 1.0 {
        modifier = 2.0 - modifier;
    }

    modifier.max(MIN_SPEED)
}

fn sanitize_factor(factor: f32) -> Option<f32> {
    factor.is_finite().then(|| factor.clamp(0.0, 1.0))
}

pub struct Engine<S, A> {
    surface: S,
    appearance: A,
    packer: Packer,
    style: BubbleStyle,

    bubbles: Vec<Bubble>,
    state: AnimationState,

    width: u32,
    height: u32,
}

impl<S: Surface, A: Appearance> Engine<S, A> {
    /// Fails with [`ConfigError::EmptyPalette`] when the palette style is
    /// asked for and the appearance has no colors to draw from.
    pub fn new(
        surface: S,
        appearance: A,
        params: PackParams,
        style: BubbleStyle,
        seed: Option<u64>,
    ) -> Result<Self, ConfigError> {
        if style == BubbleStyle::Palette && appearance.palette().is_empty() {
            return Err(ConfigError::EmptyPalette);
        }

        let state = AnimationState::new(appearance.is_night_mode(), appearance.accent_color());
        let (width, height) = surface.size();

        Ok(Self {
            surface,
            appearance,
            packer: Packer::new(params, seed),
            style,

            bubbles: Vec::new(),
            state,

            width,
            height,
        })
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }

    pub fn appearance_mut(&mut self) -> &mut A {
        &mut self.appearance
    }

    pub fn wallpaper_colors(&self) -> WallpaperColors {
        WallpaperColors::from_accent(self.state.accent)
    }

    /// Single entry point for host events.
    pub fn handle(&mut self, event: Event) -> Result<(), EngineError> {
        trace!(?event, "handling event");

        match event {
            Event::SurfaceChanged => self.reinit(),

            Event::PointerDown { x, y } => self.press(x as i32, y as i32),

            Event::PointerUp { .. } => self.draw_bubble_touch(false),

            Event::ZoomChanged(zoom) => self.zoom(zoom),

            Event::ScreenOff => self.draw_bubbles_factor_of_max(SCREEN_OFF_FACTOR),

            Event::ScreenOn => self.draw_bubbles_current_radius(),

            Event::UserPresent => {
                self.state.last_unlock = Some(Instant::now());
                self.draw_bubbles_factor_of_max_smoothly(1.0)
            }

            Event::ConfigurationChanged => {
                let night = self.appearance.is_night_mode();

                // A sweep cut short by a failed frame is redone.
                let settled = self.state.brightness == resting_brightness(night);
                if night == self.state.night_mode && settled {
                    return Ok(());
                }

                self.draw_ui_mode_transition(night)
            }

            Event::PackageChanged => {
                let accent = self.appearance.accent_color();
                if accent == self.state.accent {
                    return Ok(());
                }

                self.draw_recolored(accent)
            }

            Event::ThemeChanged => self.draw_recolored(self.appearance.accent_color()),
        }
    }

    /// Throws the bubble set away, packs a new one for the current surface
    /// size and primes the surface with two full-size frames.
    pub fn reinit(&mut self) -> Result<(), EngineError> {
        (self.width, self.height) = self.surface.size();

        self.state.night_mode = self.appearance.is_night_mode();
        self.state.brightness = resting_brightness(self.state.night_mode);
        self.state.accent = self.appearance.accent_color();
        self.state.pressed = None;

        self.regen_all_bubbles()?;

        debug!(
            count = self.bubbles.len(),
            width = self.width,
            height = self.height,
            "regenerated bubbles"
        );

        self.draw_bubbles_factor_of_max(1.0)?;
        self.draw_bubbles_factor_of_max(1.0)
    }

    fn regen_all_bubbles(&mut self) -> Result<(), ConfigError> {
        let accent = self.state.accent;

        self.bubbles = match self.style {
            BubbleStyle::Themed => {
                self.packer
                    .pack(self.width, self.height, ColorSource::Uniform(accent))
            }
            BubbleStyle::Palette => {
                let palette = self.appearance.palette();
                if palette.is_empty() {
                    return Err(ConfigError::EmptyPalette);
                }

                self.packer
                    .pack(self.width, self.height, ColorSource::Palette(palette))
            }
        };

        Ok(())
    }

    /// Redraws once with `accent` applied. The accent, and the bubble
    /// colors of the themed style, only stick if that frame is presented.
    fn draw_recolored(&mut self, accent: Argb) -> Result<(), EngineError> {
        let style = self.style;
        let factor = self.state.gradient_factor;

        self.frame(resting_brightness(self.state.night_mode), factor, |bubbles, state| {
            state.accent = accent;

            if style == BubbleStyle::Themed {
                for bubble in bubbles.iter_mut() {
                    bubble.fill = accent;
                    bubble.outline = accent;
                }
            }
        })
    }

    /// Index of the first bubble whose base circle holds the point.
    pub fn bubble_at(&self, x: i32, y: i32) -> Option<usize> {
        bubble::bubble_at(&self.bubbles, x, y)
    }

    /// Moves every drawn center toward the surface center by `factor` of
    /// its base offset. Depends only on base geometry.
    pub fn adjust_bubble_coordinates(&mut self, factor: f32) {
        let (half_width, half_height) = self.half_size();

        for bubble in self.bubbles.iter_mut() {
            bubble.adjust_coordinates(half_width, half_height, factor);
        }
    }

    fn half_size(&self) -> (i32, i32) {
        (
            i32::try_from(self.width / 2).unwrap_or(i32::MAX),
            i32::try_from(self.height / 2).unwrap_or(i32::MAX),
        )
    }

    /// Redraws with nothing changed.
    pub fn draw_bubbles_current_radius(&mut self) -> Result<(), EngineError> {
        let factor = self.state.gradient_factor;
        self.frame(resting_brightness(self.state.night_mode), factor, |_, _| {})
    }

    /// Jumps every bubble to `factor` of its base radius in one frame.
    pub fn draw_bubbles_factor_of_max(&mut self, factor: f32) -> Result<(), EngineError> {
        let Some(factor) = sanitize_factor(factor) else {
            return Ok(());
        };

        self.frame(resting_brightness(self.state.night_mode), factor, |bubbles, _| {
            for bubble in bubbles.iter_mut() {
                bubble.set_radius_factor(factor);
            }
        })
    }

    /// Eases every bubble toward `target_factor` of its base radius.
    ///
    /// The first bubble is the reference: the loop runs until it lands on
    /// its target, however many frames that takes. The gradient follows
    /// the reference's progress but never moves against the direction of
    /// travel.
    pub fn draw_bubbles_factor_of_max_smoothly(
        &mut self,
        target_factor: f32,
    ) -> Result<(), EngineError> {
        let Some(target_factor) = sanitize_factor(target_factor) else {
            return Ok(());
        };

        if self.bubbles.is_empty() {
            return Ok(());
        }

        let targets: Vec<f32> = self
            .bubbles
            .iter()
            .map(|b| b.base_radius() as f32 * target_factor)
            .collect();
        let ranges: Vec<f32> = self
            .bubbles
            .iter()
            .zip(&targets)
            .map(|(b, target)| target - b.current_radius)
            .collect();
        let steps: Vec<f32> = self
            .bubbles
            .iter()
            .map(|b| b.base_radius() as f32 * SMOOTH_STEP)
            .collect();

        let expanding = ranges[0] > 0.0;
        let sign = if expanding { 1.0 } else { -1.0 };
        let brightness = resting_brightness(self.state.night_mode);

        let mut frames = 0u32;

        while self.bubbles[0].current_radius != targets[0] {
            let remaining = (targets[0] - self.bubbles[0].current_radius).abs();
            let progress = 1.0 - remaining / ranges[0].abs();

            let gradient_factor = if expanding {
                (target_factor * progress).max(self.state.gradient_factor)
            } else {
                (target_factor + (1.0 - target_factor) * (1.0 - progress))
                    .min(self.state.gradient_factor)
            };

            self.frame(brightness, gradient_factor, |bubbles, _| {
                for (i, bubble) in bubbles.iter_mut().enumerate() {
                    let to_go = (targets[i] - bubble.current_radius).abs();
                    let speed = speed_modifier(ranges[i].abs(), to_go);

                    bubble.current_radius += steps[i] * speed * sign;
                    bubble.current_radius = if expanding {
                        bubble.current_radius.min(targets[i])
                    } else {
                        bubble.current_radius.max(targets[i])
                    };
                }
            })?;

            frames += 1;
        }

        trace!(frames, target_factor, "smooth transition done");

        Ok(())
    }

    fn press(&mut self, x: i32, y: i32) -> Result<(), EngineError> {
        // A press whose release never arrived is settled first.
        if self.state.pressed.is_some() {
            self.draw_bubble_touch(false)?;
        }

        self.state.pressed = self.bubble_at(x, y).map(|index| Press { index, frames: 0 });

        self.draw_bubble_touch(true)
    }

    /// Inflates (press) or deflates (release) the pressed bubble by one unit
    /// per frame. A release undoes exactly the frames the press presented
    /// and then forgets the bubble.
    pub fn draw_bubble_touch(&mut self, expand: bool) -> Result<(), EngineError> {
        let Some(press) = self.state.pressed else {
            return Ok(());
        };

        let index = press.index;
        let count = if expand {
            TOUCH_FRAMES.saturating_sub(press.frames)
        } else {
            press.frames
        };
        let delta = if expand { TOUCH_STEP } else { -TOUCH_STEP };

        let brightness = resting_brightness(self.state.night_mode);
        let factor = self.state.gradient_factor;

        for _ in 0..count {
            self.frame(brightness, factor, |bubbles, _| {
                if let Some(bubble) = bubbles.get_mut(index) {
                    bubble.current_radius += delta;
                }
            })?;

            if let Some(press) = self.state.pressed.as_mut() {
                press.frames = if expand {
                    press.frames + 1
                } else {
                    press.frames.saturating_sub(1)
                };
            }
        }

        trace!(index, expand, frames = count, "touch transition done");

        if !expand {
            self.state.pressed = None;
        }

        Ok(())
    }

    /// Switches to `night` and crossfades the base layer toward its
    /// brightness in `UI_MODE_STEPS + 1` frames. The flag is committed with
    /// the first presented frame.
    pub fn draw_ui_mode_transition(&mut self, night: bool) -> Result<(), EngineError> {
        let factor = self.state.gradient_factor;

        for step in 0..=UI_MODE_STEPS {
            let x = if night { UI_MODE_STEPS - step } else { step };
            let brightness = x as f32 / UI_MODE_STEPS as f32;

            self.frame(brightness, factor, |_, state| state.night_mode = night)?;
        }

        trace!(night, frames = UI_MODE_STEPS + 1, "ui mode transition done");

        Ok(())
    }

    fn zoom(&mut self, zoom: f32) -> Result<(), EngineError> {
        let Some(zoom) = sanitize_factor(zoom) else {
            return Ok(());
        };

        let adjusted = zoom * ZOOM_SCALE;
        let factor = 1.0 - adjusted;
        let (half_width, half_height) = self.half_size();

        self.frame(resting_brightness(self.state.night_mode), factor, |bubbles, _| {
            for bubble in bubbles.iter_mut() {
                bubble.adjust_coordinates(half_width, half_height, adjusted);
                bubble.set_radius_factor(factor);
            }
        })?;

        self.state.zoom = zoom;

        Ok(())
    }

    /// Applies `update`, then draws and presents one frame. If the surface
    /// fails, the bubbles and the render state go back to what the last
    /// presented frame showed.
    fn frame<F>(&mut self, brightness: f32, gradient_factor: f32, update: F) -> Result<(), EngineError>
    where
        F: FnOnce(&mut [Bubble], &mut AnimationState),
    {
        let bubbles = self.bubbles.clone();
        let state = self.state.clone();

        update(&mut self.bubbles, &mut self.state);
        self.state.gradient_factor = gradient_factor;
        self.state.brightness = brightness;

        if let Err(err) = self.present() {
            warn!(%err, "frame dropped, transition aborted");

            self.bubbles = bubbles;
            self.state = state;

            return Err(err.into());
        }

        Ok(())
    }

    fn present(&mut self) -> Result<(), SurfaceError> {
        let canvas = self.surface.begin_frame()?;

        render::draw_background(
            canvas,
            self.state.brightness,
            self.state.gradient_factor,
            self.state.night_mode,
            self.state.accent,
        );
        render::draw_bubbles(canvas, &self.bubbles, self.style, self.state.night_mode);

        self.surface.end_frame()
    }
}
