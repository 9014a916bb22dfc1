use softbuffer::Context;

use tracing::{info, warn};

use winit::{
    application::ApplicationHandler,
    dpi::{PhysicalPosition, PhysicalSize},
    event::{ElementState, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    keyboard::{Key, NamedKey},
    platform::modifier_supplement::KeyEventExtModifierSupplement,
    window::{Theme, Window, WindowId},
};

use fps_clock::FpsClock;

use std::num::NonZeroU32;

use crate::{
    config::Settings,
    engine::Engine,
    error::{HostError, SurfaceError},
    event::Event,
    graphics::Canvas,
    surface::Surface,
    theme::{SharedTheme, ThemeAppearance},
};

/// Zoom change per wheel notch.
const ZOOM_PER_LINE: f32 = 0.1;
/// Pixels of touchpad scroll per wheel notch.
const PIXELS_PER_LINE: f64 = 50.0;

type SoftSurface = softbuffer::Surface<&'static Window, &'static Window>;

/// softbuffer-backed [`Surface`]. Frames are drawn into a [`Canvas`] and
/// copied out on present, paced by an [`FpsClock`].
pub struct WindowSurface {
    window: &'static Window,
    surface: SoftSurface,
    canvas: Canvas,
    clock: FpsClock,
}

impl WindowSurface {
    fn new(window: &'static Window, fps: u32) -> Result<Self, HostError> {
        let context = Context::new(window).map_err(|e| HostError::Window(e.to_string()))?;
        let surface =
            SoftSurface::new(&context, window).map_err(|e| HostError::Window(e.to_string()))?;

        let mut out = Self {
            window,
            surface,
            canvas: Canvas::new(0, 0),
            clock: FpsClock::new(fps),
        };

        // Some compositors report zero until the first configure; the
        // following resize event fills the buffers in.
        let PhysicalSize { width, height } = window.inner_size();
        if let Err(err) = out.resize(width, height) {
            warn!(%err, width, height, "surface not sized yet");
        }

        Ok(out)
    }

    /// Resizes both buffers. A zero-sized window (minimized on some
    /// platforms) is refused and the old size kept.
    fn resize(&mut self, width: u32, height: u32) -> Result<(), SurfaceError> {
        let (Some(w), Some(h)) = (NonZeroU32::new(width), NonZeroU32::new(height)) else {
            return Err(SurfaceError::ZeroSized);
        };

        self.surface
            .resize(w, h)
            .map_err(|e| SurfaceError::Acquire(e.to_string()))?;

        self.canvas.resize(width as usize, height as usize);

        Ok(())
    }
}

impl Surface for WindowSurface {
    fn size(&self) -> (u32, u32) {
        let (w, h) = self.canvas.sizeu();
        (w as u32, h as u32)
    }

    fn begin_frame(&mut self) -> Result<&mut Canvas, SurfaceError> {
        if self.canvas.width() == 0 || self.canvas.height() == 0 {
            return Err(SurfaceError::ZeroSized);
        }

        Ok(&mut self.canvas)
    }

    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        let mut buffer = self
            .surface
            .buffer_mut()
            .map_err(|e| SurfaceError::Acquire(e.to_string()))?;

        // softbuffer wants 0RGB.
        for (out, &pixel) in buffer.iter_mut().zip(self.canvas.as_slice()) {
            *out = pixel & 0x00_FF_FF_FF;
        }

        self.window.pre_present_notify();
        buffer
            .present()
            .map_err(|e| SurfaceError::Present(e.to_string()))?;

        self.clock.tick();

        Ok(())
    }
}

type WindowEngine = Engine<WindowSurface, ThemeAppearance>;

struct WindowState {
    settings: Settings,
    theme: SharedTheme,
    engine: Option<WindowEngine>,
    cursor: PhysicalPosition<f64>,
    zoom: f32,
    night: bool,
    failure: Option<HostError>,
}

impl WindowState {
    fn new(settings: Settings) -> Self {
        Self {
            theme: SharedTheme::new(settings.theme),
            night: settings.night,
            settings,
            engine: None,
            cursor: PhysicalPosition::new(0.0, 0.0),
            zoom: 0.0,
            failure: None,
        }
    }

    fn create_engine(&mut self, event_loop: &ActiveEventLoop) -> Result<WindowEngine, HostError> {
        let window_attributes = Window::default_attributes()
            .with_title("bubblewall")
            .with_inner_size(PhysicalSize::new(self.settings.width, self.settings.height))
            .with_resizable(true)
            .with_transparent(false);

        let window = event_loop
            .create_window(window_attributes)
            .map_err(|e| HostError::Window(e.to_string()))?;

        // The surface borrows the window for as long as the program runs.
        let window: &'static Window = Box::leak(Box::new(window));

        if let Some(hz) = window
            .current_monitor()
            .and_then(|m| m.refresh_rate_millihertz())
        {
            info!(
                monitor_hz = hz as f32 / 1000.0,
                fps = self.settings.fps,
                "window created"
            );
        } else {
            info!(fps = self.settings.fps, "window created");
        }

        let surface = WindowSurface::new(window, self.settings.fps)?;
        let appearance = ThemeAppearance::new(self.theme.clone(), self.night);

        let engine = Engine::new(
            surface,
            appearance,
            self.settings.params,
            self.settings.style,
            self.settings.seed,
        )?;

        Ok(engine)
    }

    /// Hands an event to the engine. A dropped frame only aborts the
    /// transition in flight; the next event starts from what is on screen.
    fn dispatch(&mut self, event: Event) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        if let Err(err) = engine.handle(event) {
            warn!(%err, ?event, "event not fully drawn");
        }
    }

    fn set_night(&mut self, night: bool) {
        self.night = night;

        if let Some(engine) = self.engine.as_mut() {
            engine.appearance_mut().set_night_mode(night);
        }

        self.dispatch(Event::ConfigurationChanged);
    }

    fn cycle_theme(&mut self) {
        let Some(engine) = self.engine.as_mut() else {
            return;
        };

        let count = engine.appearance_mut().theme_count();
        let index = self.theme.cycle(count);
        info!(index, "theme switched");

        self.dispatch(Event::ThemeChanged);
    }

    fn scroll(&mut self, delta: MouseScrollDelta) {
        let lines = match delta {
            MouseScrollDelta::LineDelta(_, y) => y,
            MouseScrollDelta::PixelDelta(p) => (p.y / PIXELS_PER_LINE) as f32,
        };

        self.zoom = (self.zoom + lines * ZOOM_PER_LINE).clamp(0.0, 1.0);
        self.dispatch(Event::ZoomChanged(self.zoom));
    }

    fn pointer(&self) -> (f32, f32) {
        (self.cursor.x as f32, self.cursor.y as f32)
    }
}

impl ApplicationHandler for WindowState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        // The window is leaked, so only ever make one.
        if self.engine.is_some() {
            return;
        }

        match self.create_engine(event_loop) {
            Ok(engine) => {
                self.engine = Some(engine);
                self.dispatch(Event::SurfaceChanged);
            }

            Err(err) => {
                self.failure = Some(err);
                event_loop.exit();
            }
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _: WindowId, event: WindowEvent) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }

            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = position;
            }

            WindowEvent::MouseInput {
                button: MouseButton::Left,
                state,
                ..
            } => {
                let (x, y) = self.pointer();
                self.dispatch(match state {
                    ElementState::Pressed => Event::PointerDown { x, y },
                    ElementState::Released => Event::PointerUp { x, y },
                });
            }

            WindowEvent::MouseWheel { delta, .. } => self.scroll(delta),

            WindowEvent::Focused(true) => self.dispatch(Event::UserPresent),
            WindowEvent::Focused(false) => self.dispatch(Event::ScreenOff),

            WindowEvent::Occluded(true) => self.dispatch(Event::ScreenOff),
            WindowEvent::Occluded(false) => self.dispatch(Event::ScreenOn),

            WindowEvent::ThemeChanged(theme) => self.set_night(theme == Theme::Dark),

            WindowEvent::Resized(PhysicalSize { width, height }) => {
                let Some(engine) = self.engine.as_mut() else {
                    return;
                };

                if engine.surface().size() == (width, height) {
                    return;
                }

                let resized = engine.surface_mut().resize(width, height);
                match resized {
                    Ok(()) => self.dispatch(Event::SurfaceChanged),
                    Err(err) => warn!(%err, width, height, "keeping previous surface size"),
                }
            }

            WindowEvent::KeyboardInput { event, .. }
                if event.state == ElementState::Pressed && !event.repeat =>
            {
                match event.key_without_modifiers().as_ref() {
                    Key::Named(NamedKey::Escape) | Key::Character("q") => event_loop.exit(),

                    Key::Character("t") => self.cycle_theme(),

                    Key::Character("n") => self.set_night(!self.night),

                    Key::Character("r") => self.dispatch(Event::SurfaceChanged),

                    Key::Character("s") => self.dispatch(Event::ScreenOff),
                    Key::Character("u") => self.dispatch(Event::UserPresent),

                    _ => {}
                }
            }

            WindowEvent::RedrawRequested => self.dispatch(Event::ScreenOn),

            _ => {}
        }
    }
}

pub fn winit_main(settings: Settings) -> Result<(), HostError> {
    let event_loop = EventLoop::new().map_err(|e| HostError::Window(e.to_string()))?;

    let mut state = WindowState::new(settings);

    event_loop.set_control_flow(ControlFlow::Wait);
    event_loop
        .run_app(&mut state)
        .map_err(|e| HostError::Window(e.to_string()))?;

    match state.failure.take() {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
