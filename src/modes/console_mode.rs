use crossterm::{
    cursor::{Hide, MoveTo, Show},
    event::{
        self, DisableFocusChange, DisableMouseCapture, EnableFocusChange, EnableMouseCapture,
        Event as TermEvent, KeyCode, KeyEventKind, MouseButton, MouseEventKind,
    },
    queue,
    style::{Color, Print, ResetColor, Stylize},
    terminal::{
        self, disable_raw_mode, enable_raw_mode, Clear, ClearType, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};

use fps_clock::FpsClock;

use smallvec::SmallVec;

use tracing::{info, warn};

use std::{
    io::{self, stdout, Stdout, Write},
    time::Duration,
};

use crate::{
    config::Settings,
    engine::Engine,
    error::{HostError, SurfaceError},
    event::Event,
    graphics::{
        blend::{Argb, Pixel},
        Canvas,
    },
    surface::Surface,
    theme::{SharedTheme, ThemeAppearance},
};

/// Per-channel difference under which neighbouring cells share a color.
const ERROR: u8 = 6;
const MAX_SEGMENTS: usize = 48;
const SEGMENT_LEN: usize = 64;
const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Each cell shows two pixels: the top one as foreground, the bottom as background.
const HALF_BLOCK: char = '▀';

/// Run of cells printed with one color pair.
struct Segment {
    text: SmallVec<[char; SEGMENT_LEN]>,
    fg: Argb,
    bg: Argb,
}

fn close(a: Argb, b: Argb) -> bool {
    let [_, r, g, b_] = a.decompose();
    let [_, nr, ng, nb] = b.decompose();

    r.abs_diff(nr) <= ERROR && g.abs_diff(ng) <= ERROR && b_.abs_diff(nb) <= ERROR
}

fn rgb(c: Argb) -> Color {
    let [_, r, g, b] = c.decompose();
    Color::Rgb { r, g, b }
}

/// One terminal row, compressed into as few color changes as possible.
#[derive(Default)]
struct Line(SmallVec<[Segment; MAX_SEGMENTS]>);

impl Line {
    fn push_cell(&mut self, fg: Argb, bg: Argb) {
        if let Some(last) = self.0.last_mut() {
            if close(last.fg, fg) && close(last.bg, bg) {
                last.text.push(HALF_BLOCK);
                return;
            }
        }

        let mut text = SmallVec::new();
        text.push(HALF_BLOCK);
        self.0.push(Segment { text, fg, bg });
    }

    fn queue_print(&self, out: &mut impl Write) -> io::Result<()> {
        for Segment { text, fg, bg } in &self.0 {
            queue!(
                out,
                Print(text.iter().collect::<String>().with(rgb(*fg)).on(rgb(*bg)))
            )?;
        }

        Ok(())
    }

    fn clear(&mut self) {
        self.0.clear();
    }
}

/// Terminal [`Surface`]: two canvas rows per text row.
pub struct ConsoleSurface {
    canvas: Canvas,
    stdout: Stdout,
    clock: FpsClock,
}

impl ConsoleSurface {
    fn new(columns: u16, rows: u16, fps: u32) -> Self {
        Self {
            canvas: Canvas::new(columns as usize, rows as usize * 2),
            stdout: stdout(),
            clock: FpsClock::new(fps),
        }
    }

    fn resize(&mut self, columns: u16, rows: u16) -> io::Result<()> {
        self.canvas.resize(columns as usize, rows as usize * 2);
        queue!(self.stdout, Clear(ClearType::All))
    }

    fn print(&mut self) -> io::Result<()> {
        let (width, height) = self.canvas.sizeu();
        let mut line = Line::default();

        for row in 0..height / 2 {
            queue!(self.stdout, MoveTo(0, row as u16))?;

            for x in 0..width {
                let top = self.canvas.pixel(x, row * 2).unwrap_or_default();
                let bottom = self.canvas.pixel(x, row * 2 + 1).unwrap_or_default();
                line.push_cell(top, bottom);
            }

            line.queue_print(&mut self.stdout)?;
            line.clear();
        }

        queue!(self.stdout, ResetColor)?;
        self.stdout.flush()
    }
}

impl Surface for ConsoleSurface {
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
        self.print()
            .map_err(|e| SurfaceError::Present(e.to_string()))?;

        self.clock.tick();

        Ok(())
    }
}

type ConsoleEngine = Engine<ConsoleSurface, ThemeAppearance>;

fn dispatch(engine: &mut ConsoleEngine, event: Event) {
    if let Err(err) = engine.handle(event) {
        warn!(%err, ?event, "event not fully drawn");
    }
}

/// Reads one terminal event if any arrives within [`POLL_INTERVAL`].
/// Returns `false` once the user asked to quit.
fn control_events(
    engine: &mut ConsoleEngine,
    theme: &SharedTheme,
    zoom: &mut f32,
) -> Result<bool, HostError> {
    if !event::poll(POLL_INTERVAL)? {
        return Ok(true);
    }

    match event::read()? {
        TermEvent::Key(key) if key.kind == KeyEventKind::Press => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => return Ok(false),

            KeyCode::Char('t') => {
                let count = engine.appearance_mut().theme_count();
                let index = theme.cycle(count);
                info!(index, "theme switched");
                dispatch(engine, Event::ThemeChanged);
            }

            KeyCode::Char('n') => {
                let night = !engine.state().night_mode;
                engine.appearance_mut().set_night_mode(night);
                dispatch(engine, Event::ConfigurationChanged);
            }

            KeyCode::Char('r') => dispatch(engine, Event::SurfaceChanged),

            KeyCode::Char('s') => dispatch(engine, Event::ScreenOff),
            KeyCode::Char('u') => dispatch(engine, Event::UserPresent),

            _ => {}
        },

        TermEvent::Mouse(mouse) => {
            let (x, y) = (mouse.column as f32, mouse.row as f32 * 2.0);

            match mouse.kind {
                MouseEventKind::Down(MouseButton::Left) => {
                    dispatch(engine, Event::PointerDown { x, y })
                }
                MouseEventKind::Up(MouseButton::Left) => dispatch(engine, Event::PointerUp { x, y }),

                MouseEventKind::ScrollUp => {
                    *zoom = (*zoom + 0.1).min(1.0);
                    dispatch(engine, Event::ZoomChanged(*zoom));
                }
                MouseEventKind::ScrollDown => {
                    *zoom = (*zoom - 0.1).max(0.0);
                    dispatch(engine, Event::ZoomChanged(*zoom));
                }

                _ => {}
            }
        }

        TermEvent::FocusGained => dispatch(engine, Event::UserPresent),
        TermEvent::FocusLost => dispatch(engine, Event::ScreenOff),

        TermEvent::Resize(w, h) => {
            engine.surface_mut().resize(w, h)?;
            dispatch(engine, Event::SurfaceChanged);
        }

        _ => {}
    }

    Ok(true)
}

fn run(settings: &Settings) -> Result<(), HostError> {
    let (columns, rows) = terminal::size()?;
    info!(columns, rows, "console surface");

    let theme = SharedTheme::new(settings.theme);
    let appearance = ThemeAppearance::new(theme.clone(), settings.night);
    let surface = ConsoleSurface::new(columns, rows, settings.fps);

    let mut engine = Engine::new(
        surface,
        appearance,
        settings.params,
        settings.style,
        settings.seed,
    )?;
    let mut zoom = 0.0;

    dispatch(&mut engine, Event::SurfaceChanged);

    while control_events(&mut engine, &theme, &mut zoom)? {}

    Ok(())
}

pub fn con_main(settings: Settings) -> Result<(), HostError> {
    enable_raw_mode()?;
    let result = in_alternate_screen(&mut stdout(), || run(&settings));
    disable_raw_mode()?;

    result
}

/// Runs `body` inside the alternate screen with mouse and focus reporting on.
/// The terminal is handed back even when entering fails part way.
fn in_alternate_screen<W, T>(
    out: &mut W,
    body: impl FnOnce() -> Result<T, HostError>,
) -> Result<T, HostError>
where
    W: Write,
{
    let entered = queue!(
        out,
        EnterAlternateScreen,
        EnableMouseCapture,
        EnableFocusChange,
        Hide
    )
    .and_then(|()| out.flush());

    let result = match entered {
        Ok(()) => body(),
        Err(err) => Err(err.into()),
    };

    let left = queue!(
        out,
        DisableFocusChange,
        DisableMouseCapture,
        LeaveAlternateScreen,
        Show
    )
    .and_then(|()| out.flush());

    let value = result?;
    left?;

    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn similar_cells_share_a_segment() {
        let mut line = Line::default();
        line.push_cell(0xFF_10_10_10, 0xFF_00_00_00);
        line.push_cell(0xFF_12_10_10, 0xFF_00_00_03);
        line.push_cell(0xFF_FF_10_10, 0xFF_00_00_00);

        assert_eq!(line.0.len(), 2);
        assert_eq!(line.0[0].text.len(), 2);
    }

    #[test]
    fn printed_row_holds_every_cell() {
        let mut line = Line::default();
        for x in 0..10u32 {
            line.push_cell(Argb::gray(x as f32 / 10.0), Argb::black());
        }

        let mut out = Vec::new();
        line.queue_print(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.matches(HALF_BLOCK).count(), 10);
    }

    /// Records what was written and fails the first flush.
    #[derive(Default)]
    struct BrokenTerminal {
        written: Vec<u8>,
        flushes: usize,
    }

    impl Write for BrokenTerminal {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            self.flushes += 1;
            if self.flushes == 1 {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "terminal gone"));
            }
            Ok(())
        }
    }

    #[test]
    fn failed_setup_still_restores_the_terminal() {
        let mut out = BrokenTerminal::default();
        let mut ran = false;

        let result = in_alternate_screen(&mut out, || {
            ran = true;
            Ok(())
        });

        assert!(matches!(result, Err(HostError::Io(_))));
        assert!(!ran);

        let text = String::from_utf8_lossy(&out.written);
        assert!(text.contains("\x1b[?1049l"), "alternate screen left");
        assert!(text.contains("\x1b[?25h"), "cursor shown");
    }

    #[test]
    fn body_error_wins_over_teardown() {
        let mut out = Vec::new();

        let result: Result<(), HostError> =
            in_alternate_screen(&mut out, || Err(HostError::Window("closed".into())));

        assert!(matches!(result, Err(HostError::Window(_))));
        assert!(String::from_utf8_lossy(&out).contains("\x1b[?1049l"));
    }
}
