//! Frame: one independently editable drawing.
//!
//! A frame owns its committed figures, the stroke currently being drawn, and
//! its own undo history. Only committing a stroke produces an undoable edit;
//! figures inserted directly (frame generation, copy) are permanent for the
//! life of the frame.
//!
//! The cached snapshot describes the render list at the time it was taken;
//! any change to that list drops it.

use crate::figures::{Figure, Line};
use crate::history::{ActionConsumer, DoUndo, History};
use crate::renderer::Bitmap;
use crate::types::{DrawingMode, Point, StrokeSettings};

/// A reversible edit, interpreted against the frame whose history holds it.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    AddFigure(Figure),
}

/// What `commit_stroke` did with the pending stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    /// A new figure was added and recorded in the history.
    Committed,
    /// An erase stroke with nothing beneath it to erase; dropped unrecorded.
    SkippedErase,
    /// There was no stroke in progress.
    Empty,
}

/// Ordered figure collection; index order is paint order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figures(Vec<Figure>);

impl Figures {
    pub fn as_slice(&self) -> &[Figure] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn push(&mut self, figure: Figure) {
        self.0.push(figure);
    }

    /// Remove the most recent figure. Only ever used to reverse `AddFigure`.
    fn remove_last(&mut self) -> Option<Figure> {
        self.0.pop()
    }

    /// Nothing visible for an eraser to act on.
    fn only_erasures(&self) -> bool {
        self.0.iter().all(Figure::is_erase)
    }
}

impl ActionConsumer<Action> for Figures {
    fn apply(&mut self, action: DoUndo<'_, Action>) {
        match action {
            DoUndo::Do(Action::AddFigure(figure)) => self.push(figure.clone()),
            DoUndo::Undo(Action::AddFigure(figure)) => {
                let removed = self.remove_last();
                debug_assert_eq!(removed.as_ref(), Some(figure));
            }
        }
    }
}

#[derive(Debug, Default)]
pub struct Frame {
    figures: Figures,
    pending: Option<Line>,
    history: History<Action>,
    snapshot: Option<Bitmap>,
}

impl Frame {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a stroke at `point`, or extend the one in progress.
    ///
    /// `settings` is only consulted when a new stroke starts.
    pub fn begin_or_extend_stroke(&mut self, point: Point, settings: StrokeSettings) {
        self.snapshot = None;
        match &mut self.pending {
            Some(line) if !line.is_empty() => line.points.push(point),
            _ => {
                let mut line = Line::with_settings(settings);
                line.points.push(point);
                self.pending = Some(line);
            }
        }
    }

    /// Turn the pending stroke into a committed, undoable figure.
    pub fn commit_stroke(&mut self) -> CommitOutcome {
        let Some(line) = self.pending.take().filter(|l| !l.is_empty()) else {
            return CommitOutcome::Empty;
        };

        if line.mode == DrawingMode::Erase && self.figures.only_erasures() {
            return CommitOutcome::SkippedErase;
        }

        let figure = Figure::Line(line);
        self.figures.push(figure.clone());
        self.history.append(Action::AddFigure(figure));
        self.snapshot = None;
        CommitOutcome::Committed
    }

    /// Append without recording history. Used for generated and copied frames.
    pub fn add_figure_direct(&mut self, figure: Figure) {
        self.figures.push(figure);
        self.snapshot = None;
    }

    pub fn undo(&mut self) -> bool {
        let changed = self.history.undo(&mut self.figures);
        self.invalidate_if(changed)
    }

    pub fn redo(&mut self) -> bool {
        let changed = self.history.redo(&mut self.figures);
        self.invalidate_if(changed)
    }

    fn invalidate_if(&mut self, changed: bool) -> bool {
        if changed {
            self.snapshot = None;
        }
        changed
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo_depth(&self) -> usize {
        self.history.undo_depth()
    }

    pub fn redo_depth(&self) -> usize {
        self.history.redo_depth()
    }

    pub fn figures(&self) -> &[Figure] {
        self.figures.as_slice()
    }

    pub fn figure_count(&self) -> usize {
        self.figures.len()
    }

    pub fn pending_stroke(&self) -> Option<&Line> {
        self.pending.as_ref().filter(|l| !l.is_empty())
    }

    /// Committed figures followed by the stroke in progress, if it has points.
    pub fn render_list(&self) -> Vec<Figure> {
        let mut list = self.figures.as_slice().to_vec();
        if let Some(line) = self.pending_stroke() {
            list.push(Figure::Line(line.clone()));
        }
        list
    }

    /// Last bitmap rendered for this frame, if any.
    pub fn snapshot(&self) -> Option<&Bitmap> {
        self.snapshot.as_ref()
    }

    pub fn set_snapshot(&mut self, bitmap: Bitmap) {
        self.snapshot = Some(bitmap);
    }
}
