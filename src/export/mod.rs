//! Export: turn frame bitmaps into a looping animated GIF.
//!
//! Exporters only ever see an owned copy of the bitmaps, never the live
//! timeline, so an export can run on a worker thread while editing goes on.
//! A failed export leaves nothing behind in the document; the caller may
//! simply try again.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crossbeam::channel::{self, Receiver, TryRecvError};
use image::codecs::gif::{GifEncoder, Repeat};
use image::{Delay, Frame};

use crate::renderer::Bitmap;

pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

#[derive(thiserror::Error, Debug)]
pub enum ExportError {
    #[error("nothing to export: the sequence has no frames")]
    NoFrames,
    #[error("failed to create {path}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode animation")]
    Encode(#[from] image::ImageError),
    #[error("export worker stopped without reporting a result")]
    Disconnected,
}

/// Writes an ordered bitmap sequence somewhere and says where.
pub trait SequenceExporter {
    fn export(&self, bitmaps: &[Bitmap]) -> Result<PathBuf, ExportError>;
}

/// Infinitely looping GIF with a fixed per-frame delay.
#[derive(Debug, Clone)]
pub struct GifExporter {
    pub output: PathBuf,
    pub frame_delay: Duration,
}

impl GifExporter {
    pub fn new(output: impl Into<PathBuf>) -> Self {
        GifExporter {
            output: output.into(),
            frame_delay: DEFAULT_FRAME_DELAY,
        }
    }

    pub fn with_delay(mut self, frame_delay: Duration) -> Self {
        self.frame_delay = frame_delay;
        self
    }
}

impl SequenceExporter for GifExporter {
    fn export(&self, bitmaps: &[Bitmap]) -> Result<PathBuf, ExportError> {
        write_gif(&self.output, bitmaps, self.frame_delay)?;
        log::info!("exported {} frames to {}", bitmaps.len(), self.output.display());
        Ok(self.output.clone())
    }
}

fn write_gif(path: &Path, bitmaps: &[Bitmap], frame_delay: Duration) -> Result<(), ExportError> {
    if bitmaps.is_empty() {
        return Err(ExportError::NoFrames);
    }

    // The trailer is only written when the encoder drops, so encode in memory
    // and let every I/O error surface on the single write below.
    let mut bytes = Vec::new();
    {
        let mut encoder = GifEncoder::new(&mut bytes);
        encoder.set_repeat(Repeat::Infinite)?;
        let delay = Delay::from_saturating_duration(frame_delay);
        encoder.encode_frames(
            bitmaps
                .iter()
                .map(|bitmap| Frame::from_parts(bitmap.clone(), 0, 0, delay)),
        )?;
    }

    let mut file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(&bytes)
        .and_then(|()| file.flush())
        .map_err(|source| ExportError::Write {
            path: path.to_path_buf(),
            source,
        })
}

// ---------------------------------------------------------------------------
// Background export
// ---------------------------------------------------------------------------

/// An export running on a worker thread.
pub struct ExportJob {
    result: Receiver<Result<PathBuf, ExportError>>,
}

impl ExportJob {
    /// Non-blocking check; `None` while the worker is still busy.
    pub fn try_result(&self) -> Option<Result<PathBuf, ExportError>> {
        match self.result.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(ExportError::Disconnected)),
        }
    }

    /// Block until the worker reports back.
    pub fn wait(self) -> Result<PathBuf, ExportError> {
        self.result.recv().unwrap_or(Err(ExportError::Disconnected))
    }
}

/// Run `exporter` over `bitmaps` on a new thread.
pub fn spawn_export<E>(exporter: E, bitmaps: Vec<Bitmap>) -> ExportJob
where
    E: SequenceExporter + Send + 'static,
{
    let (tx, rx) = channel::bounded(1);
    thread::spawn(move || {
        let result = exporter.export(&bitmaps);
        if let Err(e) = &result {
            log::warn!("export failed: {e}");
        }
        // The job may have been dropped; nobody is left to tell.
        let _ = tx.send(result);
    });
    ExportJob { result: rx }
}
