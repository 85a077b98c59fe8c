//! Timeline: the ordered sequence of frames and the playback state machine.
//!
//! The timeline always holds at least one frame. Exactly one frame is active
//! for editing; while playing, a separate playback index walks the frames in
//! a loop driven by the [`Scheduler`].
//!
//! Frame-level operations (new, copy, generate, remove) act on whole frames
//! and never enter any frame's undo history.
//!
//! All mutation happens on the owner's thread. Time is passed in explicitly
//! as an `Instant` so playback can be driven from an event loop or a test.

pub mod generate;
pub mod scheduler;

use std::time::{Duration, Instant};

use crate::document::{CommitOutcome, Frame};
use crate::figures::Figure;
use crate::renderer::{Bitmap, Rasterizer, RenderError, Renderer};
use crate::types::{CanvasSize, Point, StrokeSettings};

use generate::{Rng32, Strategy};
pub use scheduler::Scheduler;

pub const DEFAULT_FRAME_RATE: u32 = 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// The active frame accepts strokes.
    Editing,
    /// A batch of frames is being built; input is blocked.
    GeneratingFrames,
    /// Frames are cycling; editing is suppressed.
    Playing,
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TimelineError {
    #[error("frame {index} does not exist (timeline has {count} frames)")]
    FrameOutOfRange { index: usize, count: usize },
    #[error("frame rate must be at least 1 frame per second")]
    InvalidFrameRate,
    #[error(transparent)]
    Render(#[from] RenderError),
}

pub struct Timeline<R = Renderer> {
    frames: Vec<Frame>,
    active: usize,
    playback: usize,
    /// Frame to return to when playback stops.
    resume: usize,
    frame_rate: u32,
    mode: Mode,
    canvas: CanvasSize,
    rasterizer: R,
    scheduler: Option<Scheduler>,
    rng: Rng32,
}

impl Timeline<Renderer> {
    pub fn new(canvas: CanvasSize) -> Self {
        Self::with_rasterizer(canvas, Renderer)
    }
}

impl<R: Rasterizer> Timeline<R> {
    pub fn with_rasterizer(canvas: CanvasSize, rasterizer: R) -> Self {
        Timeline {
            frames: vec![Frame::new()],
            active: 0,
            playback: 0,
            resume: 0,
            frame_rate: DEFAULT_FRAME_RATE,
            mode: Mode::Editing,
            canvas,
            rasterizer,
            scheduler: None,
            rng: Rng32::from_clock(),
        }
    }

    /// Use a fixed seed for frame generation.
    pub fn seeded(mut self, seed: u32) -> Self {
        self.rng = Rng32::from_seed(seed);
        self
    }

    // -----------------------------------------------------------------------
    // Read-only state
    // -----------------------------------------------------------------------

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn is_playing(&self) -> bool {
        self.mode == Mode::Playing
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn playback_index(&self) -> usize {
        self.playback
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn frame_rate(&self) -> u32 {
        self.frame_rate
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    pub fn active_frame(&self) -> &Frame {
        &self.frames[self.active]
    }

    /// What the canvas should show for the active frame right now.
    pub fn render_list(&self) -> Vec<Figure> {
        self.active_frame().render_list()
    }

    pub fn can_undo(&self) -> bool {
        self.mode == Mode::Editing && self.active_frame().can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.mode == Mode::Editing && self.active_frame().can_redo()
    }

    /// `"Frame i/n"`, 1-based, following playback while playing.
    pub fn frame_label(&self) -> String {
        let index = if self.is_playing() {
            self.playback
        } else {
            self.active
        };
        format!("Frame {}/{}", index + 1, self.frames.len())
    }

    /// Onion-skin image: the snapshot of the frame before the active one.
    pub fn previous_frame_snapshot(&self) -> Option<&Bitmap> {
        let index = self.active.checked_sub(1)?;
        self.frames[index].snapshot()
    }

    /// The bitmap a display should show behind or instead of the live canvas.
    ///
    /// While playing this is always the playback frame, since every frame is
    /// rendered when playback starts and edits are blocked until it stops.
    pub fn display_snapshot(&self) -> Option<&Bitmap> {
        match self.mode {
            Mode::Playing => self.frames[self.playback].snapshot(),
            Mode::Editing | Mode::GeneratingFrames => self.previous_frame_snapshot(),
        }
    }

    /// One bitmap per frame, in order, for export.
    ///
    /// Frames without a cached snapshot are rendered from a copy of their
    /// render list; the timeline itself is not modified.
    pub fn export_bitmaps(&self) -> Result<Vec<Bitmap>, RenderError> {
        self.frames
            .iter()
            .map(|frame| match frame.snapshot() {
                Some(bitmap) => Ok(bitmap.clone()),
                None => self.rasterizer.render(&frame.render_list(), self.canvas),
            })
            .collect()
    }

    /// Time until the next playback tick, if playing.
    pub fn next_tick_in(&self, now: Instant) -> Option<Duration> {
        self.scheduler.as_ref().map(|s| s.time_until_next(now))
    }

    // -----------------------------------------------------------------------
    // Stroke input (active frame)
    // -----------------------------------------------------------------------

    fn editing(&self, what: &str) -> bool {
        if self.mode == Mode::Editing {
            true
        } else {
            log::debug!("ignoring {what} while {:?}", self.mode);
            false
        }
    }

    /// Returns `false` if input is currently blocked.
    pub fn begin_or_extend_stroke(&mut self, point: Point, settings: StrokeSettings) -> bool {
        if !self.editing("stroke input") {
            return false;
        }
        self.frames[self.active].begin_or_extend_stroke(point, settings);
        true
    }

    pub fn commit_stroke(&mut self) -> CommitOutcome {
        if !self.editing("stroke commit") {
            return CommitOutcome::Empty;
        }
        self.frames[self.active].commit_stroke()
    }

    pub fn undo(&mut self) -> bool {
        self.editing("undo") && self.frames[self.active].undo()
    }

    pub fn redo(&mut self) -> bool {
        self.editing("redo") && self.frames[self.active].redo()
    }

    // -----------------------------------------------------------------------
    // Frame management
    // -----------------------------------------------------------------------

    pub fn select_frame(&mut self, index: usize) -> Result<(), TimelineError> {
        if index >= self.frames.len() {
            return Err(TimelineError::FrameOutOfRange {
                index,
                count: self.frames.len(),
            });
        }
        if self.editing("frame selection") {
            self.active = index;
        }
        Ok(())
    }

    /// Snapshot the active frame, then append an empty frame and make it active.
    pub fn new_frame(&mut self) -> Result<(), TimelineError> {
        if !self.editing("new frame") {
            return Ok(());
        }
        let snapshot = self
            .rasterizer
            .render(&self.frames[self.active].render_list(), self.canvas)?;
        self.frames[self.active].set_snapshot(snapshot);
        self.frames.push(Frame::new());
        self.make_last_active();
        Ok(())
    }

    /// New frame holding a copy of the active frame's figures.
    ///
    /// The copies are inserted directly, so the new frame starts with an
    /// empty history.
    pub fn copy_active_frame(&mut self) -> Result<(), TimelineError> {
        if !self.editing("frame copy") {
            return Ok(());
        }
        let figures = self.active_frame().figures().to_vec();
        self.new_frame()?;
        let copy = &mut self.frames[self.active];
        for figure in figures {
            copy.add_figure_direct(figure);
        }
        Ok(())
    }

    /// Append `n` generated frames, each pre-rendered, and activate the last.
    ///
    /// The whole batch is built before anything is appended, so a render
    /// failure leaves the timeline as it was.
    pub fn generate_frames(&mut self, n: usize, strategy: Strategy) -> Result<usize, TimelineError> {
        if !self.editing("frame generation") {
            return Ok(0);
        }
        self.mode = Mode::GeneratingFrames;
        let batch = self.build_batch(n, strategy);
        self.mode = Mode::Editing;

        let batch = batch?;
        let added = batch.len();
        self.frames.extend(batch);
        self.make_last_active();
        log::info!("generated {added} frames ({strategy:?}), {} total", self.frames.len());
        Ok(added)
    }

    fn build_batch(&mut self, n: usize, strategy: Strategy) -> Result<Vec<Frame>, RenderError> {
        generate::rectangles(strategy, n, self.canvas, &mut self.rng)
            .into_iter()
            .map(|rect| {
                let mut frame = Frame::new();
                frame.add_figure_direct(Figure::Rectangle(rect));
                let snapshot = self.rasterizer.render(frame.figures(), self.canvas)?;
                frame.set_snapshot(snapshot);
                Ok(frame)
            })
            .collect()
    }

    /// Remove the last frame. An emptied timeline gets a fresh frame.
    pub fn remove_active_frame(&mut self) {
        if !self.editing("frame removal") {
            return;
        }
        self.frames.pop();
        if self.frames.is_empty() {
            self.frames.push(Frame::new());
        }
        self.make_last_active();
    }

    pub fn remove_all_frames(&mut self) {
        if !self.editing("frame removal") {
            return;
        }
        self.frames = vec![Frame::new()];
        self.make_last_active();
    }

    fn make_last_active(&mut self) {
        self.active = self.frames.len() - 1;
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Start cycling from frame 0.
    ///
    /// Every frame without a current snapshot is rendered first; a render
    /// failure leaves the timeline in its previous mode.
    pub fn start_playback(&mut self, now: Instant) -> Result<(), TimelineError> {
        self.refresh_snapshots()?;
        if self.mode == Mode::Editing {
            self.resume = self.active;
        }
        self.mode = Mode::Playing;
        self.playback = 0;
        self.scheduler = Some(Scheduler::start(
            Scheduler::period_for_rate(self.frame_rate),
            now,
        ));
        log::info!("playing {} frames at {} fps", self.frames.len(), self.frame_rate);
        Ok(())
    }

    fn refresh_snapshots(&mut self) -> Result<(), RenderError> {
        let rendered = self
            .frames
            .iter()
            .enumerate()
            .filter(|(_, frame)| frame.snapshot().is_none())
            .map(|(i, frame)| Ok((i, self.rasterizer.render(&frame.render_list(), self.canvas)?)))
            .collect::<Result<Vec<_>, RenderError>>()?;
        for (i, bitmap) in rendered {
            self.frames[i].set_snapshot(bitmap);
        }
        Ok(())
    }

    /// Stop playing. Once this returns, `advance` never moves the index again.
    pub fn stop_playback(&mut self) {
        self.scheduler = None;
        if self.mode == Mode::Playing {
            self.mode = Mode::Editing;
            self.active = self.resume.min(self.frames.len() - 1);
            log::info!("stopped at frame {}", self.playback + 1);
        }
    }

    /// Change the playback rate; a running scheduler is swapped in place.
    pub fn set_frame_rate(&mut self, rate: u32, now: Instant) -> Result<(), TimelineError> {
        if rate == 0 {
            return Err(TimelineError::InvalidFrameRate);
        }
        // Settle ticks owed at the old rate before swapping.
        self.advance(now);
        self.frame_rate = rate;
        if let Some(running) = &self.scheduler {
            self.scheduler = Some(running.retimed(Scheduler::period_for_rate(rate), now));
        }
        Ok(())
    }

    /// Apply every tick due at `now`. Returns how many were applied.
    pub fn advance(&mut self, now: Instant) -> u64 {
        let Some(scheduler) = &mut self.scheduler else {
            return 0;
        };
        let ticks = scheduler.due_ticks(now);
        let len = self.frames.len() as u64;
        self.playback = ((self.playback as u64 + ticks % len) % len) as usize;
        ticks
    }
}
