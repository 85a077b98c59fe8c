//! flipbook: a frame-by-frame vector sketch and animation core.
//!
//! Strokes are drawn into frames, each with its own undo history; frames are
//! organised on a timeline that can generate frames procedurally, play them
//! back on a schedule, and export them as a looping GIF.

pub mod config;
pub mod document;
pub mod export;
pub mod figures;
pub mod history;
pub mod player;
pub mod renderer;
pub mod script;
pub mod timeline;
pub mod types;
