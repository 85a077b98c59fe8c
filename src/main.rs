use std::path::Path;
use std::process;

use anyhow::{Context, Result, bail};

use flipbook::{
    config::AppConfig,
    export::{GifExporter, SequenceExporter},
    player::Player,
    renderer::Renderer,
    script::Script,
    timeline::{
        Timeline,
        generate::{Strategy, validate_frame_count},
    },
};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

const GENERATE_USAGE: &str = "flipbook generate <random|moving> [count] <output.gif>";
const REPLAY_USAGE: &str = "flipbook replay <script.json> [output.gif]";
const PLAY_USAGE: &str = "flipbook play <random|moving|script.json> [count]";

fn run() -> Result<()> {
    let config = AppConfig::load();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let args: Vec<&str> = args.iter().map(String::as_str).collect();

    match args.as_slice() {
        ["generate", strategy, count, output] => {
            let timeline = generated(&config, strategy, Some(count))?;
            export(&config, &timeline, Path::new(output))
        }
        ["generate", strategy, output] => {
            let timeline = generated(&config, strategy, None)?;
            export(&config, &timeline, Path::new(output))
        }
        ["generate", ..] => bail!("Usage: {GENERATE_USAGE}"),
        ["replay", script] => {
            let timeline = replayed(&config, script)?;
            export(&config, &timeline, &config.export.output)
        }
        ["replay", script, output] => {
            let timeline = replayed(&config, script)?;
            export(&config, &timeline, Path::new(output))
        }
        ["replay", ..] => bail!("Usage: {REPLAY_USAGE}"),
        ["play", source, rest @ ..] if rest.len() <= 1 => {
            let timeline = if source.ends_with(".json") {
                replayed(&config, source)?
            } else {
                generated(&config, source, rest.first())?
            };
            let mut player = Player::new(timeline, config.key_bindings.clone())?;
            player.play()
        }
        ["play", ..] => bail!("Usage: {PLAY_USAGE}"),
        _ => bail!(
            "flipbook: frame-by-frame sketch animation\n\nUsage:\n  {GENERATE_USAGE}\n  {REPLAY_USAGE}\n  {PLAY_USAGE}"
        ),
    }
}

fn new_timeline(config: &AppConfig) -> Result<Timeline<Renderer>> {
    let mut timeline = Timeline::new(config.canvas);
    timeline.set_frame_rate(config.frame_rate, std::time::Instant::now())?;
    Ok(timeline)
}

fn generated(config: &AppConfig, strategy: &str, count: Option<&&str>) -> Result<Timeline<Renderer>> {
    let strategy: Strategy = strategy.parse()?;
    let count = match count {
        Some(input) => validate_frame_count(input)?,
        None => config.generate.count,
    };

    let mut timeline = new_timeline(config)?;
    timeline.generate_frames(count, strategy)?;
    Ok(timeline)
}

fn replayed(config: &AppConfig, path: &str) -> Result<Timeline<Renderer>> {
    let script = Script::load(Path::new(path))?;
    let mut timeline = new_timeline(config)?;
    let replay = script
        .apply(&mut timeline, config.stroke)
        .with_context(|| format!("Failed to replay {path}"))?;
    log::info!(
        "replayed {path}: {} strokes, {} skipped erasures, {} frames",
        replay.committed,
        replay.skipped_erasures,
        timeline.frame_count(),
    );
    Ok(timeline)
}

fn export(config: &AppConfig, timeline: &Timeline<Renderer>, output: &Path) -> Result<()> {
    let bitmaps = timeline.export_bitmaps()?;
    let path = GifExporter::new(output)
        .with_delay(config.export.frame_delay())
        .export(&bitmaps)
        .with_context(|| format!("Failed to export {}", output.display()))?;

    eprintln!("Exported {} frames -> {}", bitmaps.len(), path.display());
    Ok(())
}
