use crate::{error::SurfaceError, graphics::Canvas};

/// Drawable the host hands to the engine.
///
/// Every successful [`Surface::begin_frame`] is followed by exactly one
/// [`Surface::end_frame`], which presents what was drawn. A failed
/// `begin_frame` acquires nothing and is not paired.
pub trait Surface {
    /// Current drawable size in pixels.
    fn size(&self) -> (u32, u32);

    fn begin_frame(&mut self) -> Result<&mut Canvas, SurfaceError>;

    fn end_frame(&mut self) -> Result<(), SurfaceError>;
}

/// Memory-only surface. Keeps the last presented frame around.
pub struct OffscreenSurface {
    canvas: Canvas,
    presented: usize,
}

impl OffscreenSurface {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            canvas: Canvas::new(width as usize, height as usize),
            presented: 0,
        }
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas.resize(width as usize, height as usize);
    }

    pub fn frames_presented(&self) -> usize {
        self.presented
    }

    pub fn canvas(&self) -> &Canvas {
        &self.canvas
    }
}

impl Surface for OffscreenSurface {
    fn size(&self) -> (u32, u32) {
        let (w, h) = self.canvas.sizeu();
        (w as u32, h as u32)
    }

    fn begin_frame(&mut self) -> Result<&mut Canvas, SurfaceError> {
        Ok(&mut self.canvas)
    }

    fn end_frame(&mut self) -> Result<(), SurfaceError> {
        self.presented += 1;
        Ok(())
    }
}
