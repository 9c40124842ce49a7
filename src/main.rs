//! Sonir headless demo
//!
//! Bakes synthetic metronome tracks for one analysis mode and plays them at
//! a fixed frame rate with autoplay, then prints a JSON summary. `sonir
//! watch` runs the visual stage alone.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;

use sonir::consts::{FPS, HEIGHT, WIDTH};
use sonir::session::{FrameInput, Session, SessionConfig, SessionPhase, SessionSummary};
use sonir::source::{AnalysisMode, OnsetTable, TrackSource};
use sonir::stage::Stage;
use sonir::track::TrackSpec;
use sonir::{QualityPreset, Settings, Tuning};

/// Extra time rendered past the last onset
const TAIL: f64 = 1.0;

/// Length of each synthetic track in seconds
const LENGTH: f64 = 12.0;

/// Sonir - onset-driven bounce visualizer and rhythm game
#[derive(Parser, Debug)]
#[command(name = "sonir")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Headless onset-driven bounce playback", long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Seed for baking and effects
    #[arg(long, default_value_t = 42, global = true)]
    seed: u64,

    /// Analysis mode whose roster names the tracks
    #[arg(long, default_value = "stem", value_parser = parse_mode, global = true)]
    mode: AnalysisMode,

    /// Quality preset for effects
    #[arg(long, value_parser = parse_preset, global = true)]
    quality: Option<QualityPreset>,

    /// JSON file with tuning overrides
    #[arg(long, value_name = "FILE", global = true)]
    tuning: Option<PathBuf>,

    /// JSON file with effect settings
    #[arg(long, value_name = "FILE", global = true)]
    settings: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Commands {
    /// Play a session with autoplay (the default)
    Play,
    /// Visual playback only, no judging
    Watch,
}

fn parse_mode(s: &str) -> Result<AnalysisMode, String> {
    AnalysisMode::parse(s).ok_or_else(|| {
        let known: Vec<_> = AnalysisMode::ALL.iter().map(|m| m.as_str()).collect();
        format!("unknown mode '{s}', expected one of {}", known.join(", "))
    })
}

fn parse_preset(s: &str) -> Result<QualityPreset, String> {
    QualityPreset::parse(s).ok_or_else(|| format!("unknown quality preset '{s}'"))
}

#[derive(Serialize)]
struct Report {
    mode: &'static str,
    analysis: &'static str,
    seed: u64,
    tracks: usize,
    frames: u64,
    duration: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    session: Option<SessionSummary>,
    flash_frames: usize,
}

/// Metronome onsets at `bpm`, starting at `start`, for `length` seconds
fn metronome(bpm: f64, start: f64, length: f64) -> Vec<f64> {
    let beat = 60.0 / bpm;
    (0..)
        .map(|i| start + i as f64 * beat)
        .take_while(|t| *t < length)
        .collect()
}

/// One metronome per roster entry, each at its own tempo and phase
fn synthetic_tracks(mode: AnalysisMode) -> Result<Vec<TrackSpec>, sonir::SourceError> {
    const TEMPOS: [f64; 5] = [120.0, 60.0, 90.0, 40.0, 80.0];
    mode.roster()
        .iter()
        .enumerate()
        .fold(OnsetTable::new(mode), |table, (i, entry)| {
            let bpm = TEMPOS[i % TEMPOS.len()];
            let start = 0.5 + 0.13 * i as f64;
            table.with_track(entry.name, metronome(bpm, start, LENGTH))
        })
        .produce_tracks()
}

fn load_tuning(path: Option<&Path>) -> Result<Tuning, Box<dyn std::error::Error>> {
    match path {
        Some(path) => Ok(Tuning::from_json(&fs::read_to_string(path)?)?),
        None => Ok(Tuning::default()),
    }
}

fn load_settings(args: &Args) -> Result<Settings, Box<dyn std::error::Error>> {
    let mut settings = match &args.settings {
        Some(path) => Settings::from_json(&fs::read_to_string(path)?)?,
        None => Settings::default(),
    };
    if let Some(preset) = args.quality {
        settings.apply_preset(preset);
    }
    Ok(settings)
}

fn count_flashes(frame: &sonir::stage::Frame) -> usize {
    frame
        .tracks
        .iter()
        .filter(|t| t.view.walls.iter().any(|w| w.flash))
        .count()
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let args = Args::parse();
    let seed = args.seed;
    let command = args.command.unwrap_or(Commands::Play);

    log::info!(
        "Sonir (headless) starting: {:?}, mode {}, seed {}",
        command,
        args.mode.as_str(),
        seed
    );

    let specs = synthetic_tracks(args.mode)?;
    let tracks = specs.len();
    let tuning = load_tuning(args.tuning.as_deref())?;
    let settings = load_settings(&args)?;
    let dt = 1.0 / FPS as f32;

    let report = match command {
        Commands::Watch => {
            let mut stage = Stage::new(specs, settings, &tuning, seed, Some(seed), WIDTH, HEIGHT)?;
            let duration = stage.duration() + TAIL;
            let total = (duration * FPS as f64).ceil() as u64;
            let mut flash_frames = 0;
            for frame in 0..total {
                let time = frame as f64 / FPS as f64;
                flash_frames += count_flashes(&stage.render(time, dt));
                if frame % 100 == 0 {
                    log::info!("frame {frame}/{total} t={time:.2}s");
                }
            }
            Report {
                mode: "watch",
                analysis: args.mode.as_str(),
                seed,
                tracks,
                frames: total,
                duration,
                session: None,
                flash_frames,
            }
        }
        Commands::Play => {
            let config = SessionConfig {
                autoplay: true,
                seed,
                effect_seed: Some(seed),
                ..Default::default()
            };
            let mut session = Session::new(specs, settings, &tuning, config)?;
            let duration = session.stage().duration() + TAIL;

            // Countdown holds playback at zero
            let mut frames = 0u64;
            let mut time = 0.0;
            let mut flash_frames = 0;
            while time <= duration {
                let before = session.phase();
                let out = session.tick(&FrameInput::new(time, dt));
                if before == SessionPhase::Playing {
                    time += dt as f64;
                }
                flash_frames += count_flashes(&out);
                if frames % 100 == 0 {
                    log::info!(
                        "frame {frames} t={time:.2}s score={} combo={}",
                        session.board().score,
                        session.board().combo
                    );
                }
                frames += 1;
                if session.phase() == SessionPhase::GameOver {
                    log::warn!("game over at {time:.2}s");
                    break;
                }
            }
            Report {
                mode: "session",
                analysis: args.mode.as_str(),
                seed,
                tracks,
                frames,
                duration,
                session: Some(session.summary()),
                flash_frames,
            }
        }
    };

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("sonir").chain(args.iter().copied()))
    }

    #[test]
    fn test_cli_definition() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_play_with_seed_42() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.command, None);
        assert_eq!(args.seed, 42);
        assert_eq!(args.mode, AnalysisMode::Stem);
    }

    #[test]
    fn test_seed_flag_and_watch() {
        let args = parse(&["--seed=7"]).unwrap();
        assert_eq!(args.seed, 7);
        let args = parse(&["watch", "--seed", "9", "--mode", "cinematic"]).unwrap();
        assert_eq!(args.command, Some(Commands::Watch));
        assert_eq!(args.seed, 9);
        assert_eq!(args.mode, AnalysisMode::Cinematic);
    }

    #[test]
    fn test_rejects_typos() {
        assert!(parse(&["wach"]).is_err());
        assert!(parse(&["7"]).is_err());
        assert!(parse(&["--seed", "seven"]).is_err());
        assert!(parse(&["--mode", "gd"]).is_err());
    }

    #[test]
    fn test_synthetic_tracks_follow_roster() {
        for mode in AnalysisMode::ALL {
            let specs = synthetic_tracks(mode).unwrap();
            assert_eq!(specs.len(), mode.roster().len());
            assert!(specs.iter().all(|s| !s.onsets.is_empty()));
        }
    }
}
