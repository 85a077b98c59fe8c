//! Player: terminal preview of a timeline.
//!
//! Shows frame bitmaps as half-block characters (two pixel rows per terminal
//! row) and drives playback from the timeline's own scheduler. The event
//! loop is the single owner of the timeline: it waits on terminal input for
//! exactly as long as the next tick allows, then applies due ticks itself.

use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use crossterm::{cursor, event, execute, queue, style, terminal};
use image::Rgba;

use crate::config::{KeyBindings, matches_binding};
use crate::renderer::{Bitmap, Rasterizer};
use crate::timeline::Timeline;

/// Rows reserved above the canvas for the key hints.
const CANVAS_OFFSET: u16 = 1;
/// Upper bound on how long the loop sleeps while paused.
const IDLE_POLL: Duration = Duration::from_millis(250);

pub struct Player<R> {
    timeline: Timeline<R>,
    /// One immutable bitmap per frame, taken when the player opens.
    bitmaps: Vec<Bitmap>,
    bindings: KeyBindings,
    /// Index drawn last, to skip redundant redraws.
    shown: Option<usize>,
}

impl<R: Rasterizer> Player<R> {
    pub fn new(timeline: Timeline<R>, bindings: KeyBindings) -> Result<Self> {
        let bitmaps = timeline.export_bitmaps()?;
        Ok(Self {
            timeline,
            bitmaps,
            bindings,
            shown: None,
        })
    }

    /// Play the timeline in the terminal.
    ///
    /// Sets up the terminal, enters the event loop, and restores the terminal
    /// on exit (even on error).
    pub fn play(&mut self) -> Result<()> {
        let (term_w, term_h) = terminal::size()?;
        if term_w < 8 || term_h < 4 {
            bail!("Terminal too small: need at least 8x4, have {term_w}x{term_h}");
        }

        let mut stdout = io::stdout();
        terminal::enable_raw_mode()?;
        execute!(
            stdout,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            terminal::Clear(terminal::ClearType::All),
        )?;

        let result = self.run_loop(&mut stdout);

        // Always restore terminal state.
        let _ = execute!(stdout, cursor::Show, terminal::LeaveAlternateScreen);
        let _ = terminal::disable_raw_mode();

        self.timeline.stop_playback();
        result
    }

    // -----------------------------------------------------------------------
    // Event loop
    // -----------------------------------------------------------------------

    fn run_loop(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        self.timeline.start_playback(Instant::now())?;
        self.render_hints(stdout)?;

        loop {
            let now = Instant::now();
            self.timeline.advance(now);
            self.render_current(stdout)?;

            let wait = self.timeline.next_tick_in(now).unwrap_or(IDLE_POLL);
            if !event::poll(wait)? {
                continue;
            }
            match event::read()? {
                event::Event::Key(key) => {
                    let b = &self.bindings;
                    if matches_binding(&b.quit, &key) || key.code == event::KeyCode::Esc {
                        break;
                    } else if matches_binding(&b.play_pause, &key) {
                        if self.timeline.is_playing() {
                            self.timeline.stop_playback();
                        } else {
                            self.timeline.start_playback(Instant::now())?;
                        }
                    } else if matches_binding(&b.faster, &key) {
                        let rate = self.timeline.frame_rate().saturating_add(1);
                        self.timeline.set_frame_rate(rate, Instant::now())?;
                    } else if matches_binding(&b.slower, &key) {
                        let rate = self.timeline.frame_rate().saturating_sub(1).max(1);
                        self.timeline.set_frame_rate(rate, Instant::now())?;
                    } else if matches_binding(&b.next_frame, &key) {
                        self.step_paused(1)?;
                    } else if matches_binding(&b.prev_frame, &key) {
                        self.step_paused(-1)?;
                    }
                    self.render_status(stdout)?;
                }
                event::Event::Resize(_, _) => {
                    execute!(stdout, terminal::Clear(terminal::ClearType::All))?;
                    self.shown = None;
                    self.render_hints(stdout)?;
                }
                _ => {}
            }
        }

        Ok(())
    }

    /// Move the selection while paused; ignored during playback.
    fn step_paused(&mut self, delta: isize) -> Result<()> {
        if self.timeline.is_playing() {
            return Ok(());
        }
        let count = self.timeline.frame_count() as isize;
        let next = (self.timeline.active_index() as isize + delta).rem_euclid(count);
        self.timeline.select_frame(next as usize)?;
        Ok(())
    }

    fn displayed_index(&self) -> usize {
        if self.timeline.is_playing() {
            self.timeline.playback_index()
        } else {
            self.timeline.active_index()
        }
    }

    // -----------------------------------------------------------------------
    // Terminal output
    // -----------------------------------------------------------------------

    fn render_hints(&self, stdout: &mut io::Stdout) -> Result<()> {
        let items: &[&str] = &[
            "[Space] play/pause",
            "[+][-] speed",
            "[←][→] step",
            "[q][Esc] quit",
        ];

        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::Print(" "),
        )?;
        for (i, item) in items.iter().enumerate() {
            if i > 0 {
                queue!(stdout, style::Print("  "))?;
            }
            print_key_hint(stdout, item)?;
        }
        stdout.flush()?;
        Ok(())
    }

    fn render_current(&mut self, stdout: &mut io::Stdout) -> Result<()> {
        let index = self.displayed_index();
        if self.shown == Some(index) {
            return Ok(());
        }
        let Some(bitmap) = self.bitmaps.get(index) else {
            return Ok(());
        };

        let (term_w, term_h) = terminal::size()?;
        let rows = term_h.saturating_sub(CANVAS_OFFSET + 1);
        draw_half_blocks(stdout, bitmap, term_w, rows)?;
        self.shown = Some(index);
        self.render_status(stdout)
    }

    fn render_status(&self, stdout: &mut io::Stdout) -> Result<()> {
        let (_, term_h) = terminal::size()?;
        let status = format!(
            " {} | {} fps | {} ",
            self.timeline.frame_label(),
            self.timeline.frame_rate(),
            if self.timeline.is_playing() { "playing" } else { "paused" },
        );

        let mut cs = style::ContentStyle::default();
        cs.attributes.set(style::Attribute::Dim);

        queue!(
            stdout,
            cursor::MoveTo(0, term_h.saturating_sub(1)),
            terminal::Clear(terminal::ClearType::CurrentLine),
            style::PrintStyledContent(style::StyledContent::new(cs, status)),
        )?;
        stdout.flush()?;
        Ok(())
    }
}

/// Print a hint like "[q] quit": the bracketed key bold, the label dim.
fn print_key_hint(out: &mut impl Write, item: &str) -> Result<()> {
    let (keys, label) = match item.rfind(']') {
        Some(close) => item.split_at(close + 1),
        None => ("", item),
    };
    queue!(
        out,
        style::SetAttribute(style::Attribute::Bold),
        style::Print(keys),
        style::SetAttribute(style::Attribute::Reset),
        style::SetAttribute(style::Attribute::Dim),
        style::Print(label),
        style::SetAttribute(style::Attribute::Reset),
    )?;
    Ok(())
}

/// Nearest-neighbour downsample into `cols` x `rows` cells, two pixels per cell.
fn draw_half_blocks(out: &mut impl Write, bitmap: &Bitmap, cols: u16, rows: u16) -> Result<()> {
    let (w, h) = bitmap.dimensions();
    if w == 0 || h == 0 || cols == 0 || rows == 0 {
        return Ok(());
    }
    let scale = (w as f32 / cols as f32).max(h as f32 / (rows as f32 * 2.0)).max(1.0);
    let out_cols = ((w as f32 / scale) as u16).min(cols);
    let out_rows = ((h as f32 / scale / 2.0) as u16).min(rows);

    let sample = |cx: u16, py: u32| -> style::Color {
        let x = ((cx as f32 * scale) as u32).min(w - 1);
        let y = ((py as f32 * scale) as u32).min(h - 1);
        over_white(*bitmap.get_pixel(x, y))
    };

    for row in 0..out_rows {
        queue!(out, cursor::MoveTo(0, row + CANVAS_OFFSET))?;
        for col in 0..out_cols {
            let top = sample(col, row as u32 * 2);
            let bottom = sample(col, row as u32 * 2 + 1);
            queue!(
                out,
                style::SetForegroundColor(top),
                style::SetBackgroundColor(bottom),
                style::Print('▀'),
            )?;
        }
        queue!(out, style::ResetColor)?;
    }
    out.flush()?;
    Ok(())
}

/// Composite a straight-alpha pixel over a white page.
fn over_white(Rgba([r, g, b, a]): Rgba<u8>) -> style::Color {
    let blend = |c: u8| -> u8 {
        let c = c as u32 * a as u32 + 255 * (255 - a as u32);
        (c / 255) as u8
    };
    style::Color::Rgb {
        r: blend(r),
        g: blend(g),
        b: blend(b),
    }
}
