//! Rhythm game session
//!
//! Composes a `Stage` (visuals) with a `RhythmJudge` (scoring). Both read
//! the same baked tracks and own disjoint state. The caller owns the audio
//! clock and input polling; each frame it hands over the playback time, the
//! frame delta and the input events that arrived.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::consts::{COLOR_BG, HEIGHT, WIDTH};
use crate::error::SessionError;
use crate::input::{InputEvent, SlotMap};
use crate::judge::{
    Feedback, JudgmentState, ModifierState, Modifiers, Outcome, RhythmJudge, Scoreboard, Tally,
};
use crate::layout::{Rect, slot_rects};
use crate::stage::{Frame, Stage, track_seed};
use crate::track::TrackSpec;
use crate::tuning::SessionTuning;
use crate::{Rgb, Settings, Tuning};

const COLOR_SHUFFLE: Rgb = [255, 0, 255];
const COLOR_SWITCH: Rgb = [255, 255, 0];

/// Session lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Lead-in; input is ignored and playback should hold
    Countdown,
    /// Active gameplay
    Playing,
    /// Health ran out; only reset or quit
    GameOver,
    /// Terminal
    Quit,
}

/// Session options fixed at construction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub modifiers: Modifiers,
    /// Hit every onset automatically within the PERFECT window
    pub autoplay: bool,
    /// Seed for trajectories and modifier randomness
    pub seed: u64,
    /// Seed for visual effects; unpredictable when None
    pub effect_seed: Option<u64>,
    pub width: u32,
    pub height: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            modifiers: Modifiers::default(),
            autoplay: false,
            seed: 0,
            effect_seed: None,
            width: WIDTH,
            height: HEIGHT,
        }
    }
}

/// Everything the caller supplies for one frame
#[derive(Debug, Clone, Default)]
pub struct FrameInput {
    /// Current playback time in seconds
    pub audio_time: f64,
    /// Real time since the previous frame
    pub dt: f32,
    pub events: Vec<InputEvent>,
}

impl FrameInput {
    pub fn new(audio_time: f64, dt: f32) -> Self {
        Self {
            audio_time,
            dt,
            events: Vec::new(),
        }
    }

    pub fn with_event(mut self, event: InputEvent) -> Self {
        self.events.push(event);
        self
    }
}

/// A feedback label and how long it has been visible
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackView {
    pub label: &'static str,
    pub color: Rgb,
    pub age: f64,
}

/// The focused track's rect
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FocusView {
    pub rect: Rect,
    pub remaining: f64,
}

/// Key hint drawn at the bottom of a lane
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LaneHint {
    pub rect: Rect,
    /// e.g. `[D/LEFT]`
    pub keys: String,
    pub track: String,
}

/// Judgment overlay data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Overlay {
    pub phase: SessionPhase,
    pub score: u64,
    pub combo: u32,
    pub max_combo: u32,
    /// Health as a fraction of the maximum
    pub health: f32,
    pub health_color: Rgb,
    /// Whole seconds left in the countdown
    pub countdown: Option<u32>,
    pub feedback: Option<FeedbackView>,
    pub sudden_death: bool,
    /// Whole seconds until the next shuffle, shown shortly before it happens
    pub shuffle_in: Option<u32>,
    pub focus: Option<FocusView>,
    pub hints: Vec<LaneHint>,
}

/// End-of-run numbers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSummary {
    pub phase: SessionPhase,
    pub score: u64,
    pub max_combo: u32,
    pub health: f32,
    pub tally: Tally,
}

pub struct Session {
    stage: Stage,
    judge: RhythmJudge,
    states: Vec<JudgmentState>,
    board: Scoreboard,
    tally: Tally,
    slots: SlotMap,
    modifiers: ModifierState,
    timers: SessionTuning,
    config: SessionConfig,
    show_ui: bool,
    rng: Pcg32,
    phase: SessionPhase,
    countdown_left: f64,
    /// Seconds of play since the countdown ended
    clock: f64,
    feedback: Option<Feedback>,
}

impl Session {
    pub fn new(
        specs: Vec<TrackSpec>,
        settings: Settings,
        tuning: &Tuning,
        config: SessionConfig,
    ) -> Result<Self, SessionError> {
        let stage = Stage::new(
            specs,
            settings,
            tuning,
            config.seed,
            config.effect_seed,
            config.width,
            config.height,
        )?;
        let count = stage.tracks().len();
        let judge = RhythmJudge::from_tuning(tuning, config.modifiers.sudden_death);
        let states = stage
            .tracks()
            .iter()
            .map(|t| judge.new_state(t.onsets()))
            .collect();

        // Stream after the last track's bake seed
        let mut rng = Pcg32::seed_from_u64(track_seed(config.seed, count));
        let modifiers = ModifierState::new(config.modifiers, tuning.modifiers, count, &mut rng);

        log::info!(
            "session start: {} tracks, modifiers {:?}, autoplay {}",
            count,
            config.modifiers,
            config.autoplay
        );

        Ok(Self {
            stage,
            board: Scoreboard::new(tuning.scoring.max_health),
            judge,
            states,
            tally: Tally::default(),
            slots: SlotMap::identity(count),
            modifiers,
            timers: tuning.session,
            config,
            show_ui: settings.ui,
            rng,
            phase: SessionPhase::Countdown,
            countdown_left: tuning.session.countdown,
            clock: 0.0,
            feedback: None,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn board(&self) -> &Scoreboard {
        &self.board
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn stage(&self) -> &Stage {
        &self.stage
    }

    pub fn slots(&self) -> &SlotMap {
        &self.slots
    }

    pub fn modifiers(&self) -> &ModifierState {
        &self.modifiers
    }

    pub fn track_state(&self, track: usize) -> Option<&JudgmentState> {
        self.states.get(track)
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            phase: self.phase,
            score: self.board.score,
            max_combo: self.board.max_combo,
            health: self.board.health,
            tally: self.tally,
        }
    }

    /// Advance one frame and produce what to draw
    pub fn tick(&mut self, input: &FrameInput) -> Frame {
        let dt = input.dt.max(0.0);
        match self.phase {
            SessionPhase::Countdown => {
                self.countdown_left -= dt as f64;
                if self.countdown_left <= 0.0 {
                    self.countdown_left = 0.0;
                    self.phase = SessionPhase::Playing;
                    log::info!("countdown over, playing");
                }
            }
            SessionPhase::Playing => self.play(input, dt),
            SessionPhase::GameOver | SessionPhase::Quit => {}
        }
        self.frame(input.audio_time, dt)
    }

    fn play(&mut self, input: &FrameInput, dt: f32) {
        let time = input.audio_time;
        self.clock += dt as f64;
        self.board.drain(self.timers.health_drain * dt);

        let mut outcomes = Vec::new();

        // Misses first so an onset is never both missed and hit this frame
        for (track, state) in self.stage.tracks().iter().zip(self.states.iter_mut()) {
            outcomes.extend(self.judge.sweep_misses(state, track.onsets(), time));
        }
        self.apply_all(&outcomes);
        outcomes.clear();

        let events = self.modifiers.update(self.clock, &mut self.rng);
        if events.shuffle {
            self.slots = self.slots.reshuffled(&mut self.rng);
            self.feedback = Some(Feedback::new("SHUFFLE!", COLOR_SHUFFLE, self.clock));
            log::info!("lanes shuffled: {:?}", self.slots.assignment());
        }
        if events.focus_switched {
            self.feedback = Some(Feedback::new("SWITCH!", COLOR_SWITCH, self.clock));
            log::info!("focus switched to track {:?}", self.modifiers.focus());
        }

        if self.config.autoplay {
            for (track, state) in self.stage.tracks().iter().zip(self.states.iter_mut()) {
                if self.judge.autoplay_target(state, track.onsets(), time).is_some() {
                    outcomes.push(self.judge.judge_hit(state, track.onsets(), time));
                }
            }
        }

        for event in &input.events {
            for index in self.slots.tracks_for_key(event.key) {
                if !self.modifiers.accepts(index) {
                    continue;
                }
                let (Some(track), Some(state)) =
                    (self.stage.tracks().get(index), self.states.get_mut(index))
                else {
                    continue;
                };
                outcomes.push(self.judge.judge_hit(state, track.onsets(), event.time));
            }
        }
        self.apply_all(&outcomes);

        if self.board.is_depleted() {
            self.phase = SessionPhase::GameOver;
            log::info!("game over: score {}, max combo {}", self.board.score, self.board.max_combo);
        }
    }

    fn apply_all(&mut self, outcomes: &[Outcome]) {
        for outcome in outcomes {
            self.board
                .apply(outcome, self.judge.scoring(), self.judge.sudden_death());
            self.tally.record(outcome);
            if let Some(feedback) = Feedback::from_outcome(outcome, self.clock) {
                self.feedback = Some(feedback);
            }
        }
    }

    /// On-screen rect of each track under the current assignment
    pub fn track_rects(&self) -> Vec<Rect> {
        let slots = slot_rects(self.config.width, self.config.height, self.slots.len());
        (0..self.slots.len())
            .map(|track| {
                self.slots
                    .slot_of(track)
                    .and_then(|slot| slots.get(slot).copied())
                    .unwrap_or_default()
            })
            .collect()
    }

    fn frame(&mut self, time: f64, dt: f32) -> Frame {
        let rects = self.track_rects();
        let tracks = self.stage.advance(time, dt, &rects);
        let overlay = self.show_ui.then(|| self.overlay(&rects));
        Frame {
            background: COLOR_BG,
            tracks,
            overlay,
        }
    }

    /// Overlay for the current state
    pub fn overlay(&self, rects: &[Rect]) -> Overlay {
        let playing = self.phase == SessionPhase::Playing;

        let countdown = (self.phase == SessionPhase::Countdown)
            .then(|| self.countdown_left.ceil().max(1.0) as u32);

        let feedback = self.feedback.as_ref().and_then(|fb| {
            let age = self.clock - fb.at;
            (playing && age < self.timers.feedback_duration).then(|| FeedbackView {
                label: fb.label,
                color: fb.color,
                age,
            })
        });

        let shuffle_in = self
            .modifiers
            .shuffle_in(self.clock)
            .filter(|left| playing && *left < self.timers.shuffle_warning)
            .map(|left| left.ceil().max(1.0) as u32);

        let focus = self.modifiers.focus().and_then(|track| {
            Some(FocusView {
                rect: *rects.get(track)?,
                remaining: self.modifiers.focus_remaining(self.clock).unwrap_or(0.0),
            })
        });

        let hints = self
            .stage
            .tracks()
            .iter()
            .enumerate()
            .filter_map(|(i, track)| {
                let keys = self.slots.keys_for_track(i);
                if keys.is_empty() {
                    return None;
                }
                let labels: Vec<String> = keys.iter().map(|k| k.label()).collect();
                Some(LaneHint {
                    rect: rects.get(i).copied().unwrap_or_default(),
                    keys: format!("[{}]", labels.join("/")),
                    track: track.name.to_uppercase(),
                })
            })
            .collect();

        Overlay {
            phase: self.phase,
            score: self.board.score,
            combo: self.board.combo,
            max_combo: self.board.max_combo,
            health: self.board.health_fraction(),
            health_color: self.board.health_color(),
            countdown,
            feedback,
            sudden_death: self.config.modifiers.sudden_death,
            shuffle_in,
            focus,
            hints,
        }
    }

    /// Reinitialize judgment, score, modifiers and effects; back to the countdown
    ///
    /// Timelines are kept. The caller rewinds playback to zero.
    pub fn reset(&mut self) {
        if self.phase == SessionPhase::Quit {
            return;
        }
        self.states = self
            .stage
            .tracks()
            .iter()
            .map(|t| self.judge.new_state(t.onsets()))
            .collect();
        self.board = Scoreboard::new(self.judge.scoring().max_health);
        self.tally = Tally::default();
        self.slots = SlotMap::identity(self.states.len());
        self.modifiers.restart(&mut self.rng);
        self.stage.reset_effects();
        self.phase = SessionPhase::Countdown;
        self.countdown_left = self.timers.countdown;
        self.clock = 0.0;
        self.feedback = None;
        log::info!("session reset");
    }

    pub fn quit(&mut self) {
        self.phase = SessionPhase::Quit;
    }
}
