//! Edit scripts: a JSON list of editing operations replayed onto a timeline.
//!
//! This is how the command-line front end feeds strokes and frame
//! operations into the core without an interactive canvas.
//!
//! ```json
//! { "ops": [
//!     { "op": "stroke", "points": [{ "x": 10, "y": 10 }, { "x": 60, "y": 40 }] },
//!     { "op": "copy_frame" },
//!     { "op": "stroke", "settings": { "mode": "erase", "width": 12 },
//!       "points": [{ "x": 30, "y": 20 }] },
//!     { "op": "generate", "strategy": "moving_square", "count": 12 }
//! ] }
//! ```

use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::document::CommitOutcome;
use crate::renderer::Rasterizer;
use crate::timeline::generate::Strategy;
use crate::timeline::{Timeline, TimelineError};
use crate::types::{Point, StrokeSettings};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Script {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<u32>,
    pub ops: Vec<Op>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Stroke {
        /// Falls back to the caller's default settings.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        settings: Option<StrokeSettings>,
        points: Vec<Point>,
    },
    Undo,
    Redo,
    NewFrame,
    CopyFrame,
    RemoveFrame,
    RemoveAll,
    Select { index: usize },
    Generate { strategy: Strategy, count: usize },
}

#[derive(thiserror::Error, Debug)]
pub enum ScriptError {
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse script")]
    Parse(#[from] serde_json::Error),
    #[error("step {step} failed")]
    Step {
        step: usize,
        #[source]
        source: TimelineError,
    },
}

/// Tally of what a replay did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Replay {
    pub committed: usize,
    pub skipped_erasures: usize,
    pub undone: usize,
    pub redone: usize,
    pub generated: usize,
}

impl Script {
    pub fn from_json(json: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: &Path) -> Result<Self, ScriptError> {
        let json = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Replay every operation in order, stopping at the first failure.
    pub fn apply<R: Rasterizer>(
        &self,
        timeline: &mut Timeline<R>,
        defaults: StrokeSettings,
    ) -> Result<Replay, ScriptError> {
        if let Some(rate) = self.frame_rate {
            timeline
                .set_frame_rate(rate, Instant::now())
                .map_err(|source| ScriptError::Step { step: 0, source })?;
        }

        let mut replay = Replay::default();
        for (step, op) in self.ops.iter().enumerate() {
            apply_op(op, timeline, defaults, &mut replay)
                .map_err(|source| ScriptError::Step { step, source })?;
        }
        Ok(replay)
    }
}

fn apply_op<R: Rasterizer>(
    op: &Op,
    timeline: &mut Timeline<R>,
    defaults: StrokeSettings,
    replay: &mut Replay,
) -> Result<(), TimelineError> {
    match op {
        Op::Stroke { settings, points } => {
            let settings = settings.unwrap_or(defaults);
            for &point in points {
                timeline.begin_or_extend_stroke(point, settings);
            }
            match timeline.commit_stroke() {
                CommitOutcome::Committed => replay.committed += 1,
                CommitOutcome::SkippedErase => replay.skipped_erasures += 1,
                CommitOutcome::Empty => {}
            }
        }
        Op::Undo => replay.undone += usize::from(timeline.undo()),
        Op::Redo => replay.redone += usize::from(timeline.redo()),
        Op::NewFrame => timeline.new_frame()?,
        Op::CopyFrame => timeline.copy_active_frame()?,
        Op::RemoveFrame => timeline.remove_active_frame(),
        Op::RemoveAll => timeline.remove_all_frames(),
        Op::Select { index } => timeline.select_frame(*index)?,
        Op::Generate { strategy, count } => {
            replay.generated += timeline.generate_frames(*count, *strategy)?;
        }
    }
    Ok(())
}
