/// Everything a host can tell the engine. Delivered one at a time through
/// [`crate::engine::Engine::handle`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Event {
    /// Surface was created or resized; the engine re-reads its size.
    SurfaceChanged,

    PointerDown { x: f32, y: f32 },
    PointerUp { x: f32, y: f32 },

    /// Launcher zoom in `0..=1`.
    ZoomChanged(f32),

    ScreenOff,
    ScreenOn,

    /// Device unlocked.
    UserPresent,

    /// Night/day mode may have flipped.
    ConfigurationChanged,

    /// System accent color may have changed.
    PackageChanged,

    /// User picked another theme.
    ThemeChanged,
}
