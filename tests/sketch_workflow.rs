//! End-to-end editing sessions driven through the public API.

use std::time::{Duration, Instant};

use flipbook::document::CommitOutcome;
use flipbook::export::{GifExporter, SequenceExporter, spawn_export};
use flipbook::figures::Figure;
use flipbook::script::Script;
use flipbook::timeline::Timeline;
use flipbook::timeline::generate::Strategy;
use flipbook::types::{CanvasSize, Color, DrawingMode, Point, StrokeSettings};

const CANVAS: CanvasSize = CanvasSize::new(120, 90);

#[test]
fn draw_undo_redo_round_trip() {
    let mut timeline = Timeline::new(CANVAS);
    assert_eq!(timeline.frame_count(), 1);
    assert_eq!(timeline.active_frame().figure_count(), 0);

    let black = StrokeSettings {
        color: Color::BLACK,
        width: 3.0,
        mode: DrawingMode::Draw,
    };
    for (x, y) in [(10.0, 10.0), (20.0, 15.0), (30.0, 10.0)] {
        assert!(timeline.begin_or_extend_stroke(Point::new(x, y), black));
    }
    assert_eq!(timeline.commit_stroke(), CommitOutcome::Committed);
    assert_eq!(timeline.active_frame().figure_count(), 1);
    assert!(timeline.can_undo());
    assert!(!timeline.can_redo());
    let original = timeline.active_frame().figures()[0].clone();

    assert!(timeline.undo());
    assert_eq!(timeline.active_frame().figure_count(), 0);
    assert!(!timeline.can_undo());
    assert!(timeline.can_redo());

    assert!(timeline.redo());
    assert_eq!(timeline.active_frame().figures(), &[original][..]);
}

#[test]
fn undo_histories_are_per_frame() {
    let mut timeline = Timeline::new(CANVAS);
    timeline.begin_or_extend_stroke(Point::new(5.0, 5.0), StrokeSettings::default());
    timeline.commit_stroke();
    timeline.new_frame().unwrap();

    assert!(!timeline.can_undo());
    assert!(!timeline.undo());

    timeline.select_frame(0).unwrap();
    assert!(timeline.undo());
    assert_eq!(timeline.active_frame().figure_count(), 0);
}

#[test]
fn snapshot_shows_drawn_pixels_and_erasure() {
    let mut timeline = Timeline::new(CANVAS);
    let thick = StrokeSettings {
        width: 10.0,
        ..Default::default()
    };
    timeline.begin_or_extend_stroke(Point::new(10.0, 45.0), thick);
    timeline.begin_or_extend_stroke(Point::new(110.0, 45.0), thick);
    timeline.commit_stroke();
    timeline.begin_or_extend_stroke(Point::new(60.0, 20.0), StrokeSettings::eraser(30.0));
    timeline.begin_or_extend_stroke(Point::new(60.0, 70.0), StrokeSettings::eraser(30.0));
    timeline.commit_stroke();
    timeline.new_frame().unwrap();

    let onion = timeline.previous_frame_snapshot().expect("frame 0 was snapshotted");
    assert_eq!(onion.dimensions(), (120, 90));
    assert_eq!(onion.get_pixel(20, 45).0[3], 255);
    assert_eq!(onion.get_pixel(60, 45).0[3], 0);
    assert_eq!(onion.get_pixel(20, 10).0[3], 0);
}

#[test]
fn generated_animation_plays_and_exports() {
    let mut timeline = Timeline::new(CANVAS).seeded(42);
    timeline.generate_frames(6, Strategy::MovingSquare).unwrap();
    assert_eq!(timeline.frame_count(), 7);
    assert!(
        timeline.frames()[1..]
            .iter()
            .all(|f| matches!(f.figures(), [Figure::Rectangle(_)]))
    );

    let t0 = Instant::now();
    timeline.start_playback(t0).unwrap();
    timeline.advance(t0 + Duration::from_secs(1));
    assert_eq!(timeline.playback_index(), 24 % 7);
    timeline.stop_playback();

    let dir = tempfile::tempdir().unwrap();
    let out = dir.path().join("square.gif");
    let bitmaps = timeline.export_bitmaps().unwrap();
    let job = spawn_export(GifExporter::new(&out), bitmaps);
    assert_eq!(job.wait().unwrap(), out);
    assert!(out.metadata().unwrap().len() > 0);
}

#[test]
fn replayed_script_exports_one_gif_frame_per_frame() -> anyhow::Result<()> {
    let script = Script::from_json(
        r#"{ "frame_rate": 12, "ops": [
            { "op": "stroke", "points": [{ "x": 5, "y": 5 }, { "x": 50, "y": 50 }] },
            { "op": "copy_frame" },
            { "op": "stroke", "settings": { "mode": "erase", "width": 8 },
              "points": [{ "x": 20, "y": 20 }] },
            { "op": "new_frame" }
        ] }"#,
    )?;
    let mut timeline = Timeline::new(CANVAS);
    script.apply(&mut timeline, StrokeSettings::default())?;
    assert_eq!(timeline.frame_count(), 3);
    assert_eq!(timeline.frame_rate(), 12);

    let dir = tempfile::tempdir()?;
    let out = dir.path().join("replay.gif");
    let bitmaps = timeline.export_bitmaps()?;
    GifExporter::new(&out).export(&bitmaps)?;
    assert!(out.exists());
    Ok(())
}
