//! Session wiring: collaborator seams and effect dispatch
//!
//! The board knows nothing about the page. A [`Session`] owns the board
//! plus a [`Stage`] of collaborator handles injected at construction, and
//! routes every core effect to exactly one collaborator call. The wasm
//! shell plugs DOM and Web Audio implementations in; tests and the native
//! binary plug in recording or logging ones.

use crate::consts::DEFAULT_ASSET_BASE;
use crate::game::tile::{CharacterId, ImageRef};
use crate::game::{Board, Countdown, CountdownStep, Effect, SoundCue};
use crate::levels::LevelPolicy;

/// Renders tile faces and the occluding grid
pub trait GridSink {
    fn set_face(&mut self, tile: usize, image: &ImageRef);
    fn show_overlay(&mut self);
    fn hide_overlay(&mut self);
}

/// Progress readouts: the found counter and per-character indicators
pub trait StatusSink {
    fn set_progress(&mut self, found: u32, total: u32);
    fn reveal_character(&mut self, character: CharacterId);
}

/// Plays named cues. Playing a cue that is already sounding starts it
/// over from the beginning.
pub trait AudioSink {
    fn play(&mut self, cue: SoundCue);
}

/// The pre-game countdown and the level-complete panel
pub trait PanelSink {
    fn show_countdown(&mut self, step: CountdownStep);
    fn show_completion(&mut self, next_level: u32);
    fn fade_in_completion(&mut self);
}

/// Everything the session talks to, bundled and injected at construction
pub struct Stage {
    pub grid: Box<dyn GridSink>,
    pub status: Box<dyn StatusSink>,
    pub audio: Box<dyn AudioSink>,
    pub panel: Box<dyn PanelSink>,
}

/// Parameters resolved by the bootstrap before play begins
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub level: u32,
    pub seed: u64,
    pub policy: LevelPolicy,
    pub asset_base: String,
}

impl SessionConfig {
    pub fn new(level: u32, seed: u64) -> Self {
        Self {
            level,
            seed,
            policy: LevelPolicy::default(),
            asset_base: DEFAULT_ASSET_BASE.to_string(),
        }
    }
}

/// One play-through of a level
pub struct Session {
    board: Board,
    countdown: Option<Countdown>,
    stage: Stage,
}

impl Session {
    /// Build the board and paint every tile's starting face
    pub fn new(config: SessionConfig, stage: Stage) -> Self {
        let plan = config.policy.plan(config.level);
        log::info!(
            "level {}: {}x{} grid, {} characters, seed {}",
            config.level,
            plan.size,
            plan.size,
            plan.characters,
            config.seed
        );

        let board = Board::new(config.level, plan, config.seed, &config.asset_base);
        let mut session = Self {
            board,
            countdown: None,
            stage,
        };
        let effects = session.board.initialize();
        session.dispatch(effects);
        session
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Kick off the pre-game countdown
    pub fn start(&mut self, now: f64) {
        self.countdown = Some(Countdown::start(now));
        self.stage.audio.play(SoundCue::Countdown);
    }

    /// A tile was clicked
    pub fn handle_activation(&mut self, tile: usize, now: f64) {
        let effects = self.board.activate_tile(tile, now);
        self.dispatch(effects);
    }

    /// Pump timed steps; call once per animation frame
    pub fn tick(&mut self, now: f64) {
        if let Some(countdown) = &mut self.countdown {
            for step in countdown.tick(now) {
                self.stage.panel.show_countdown(step);
            }
            if countdown.is_done() {
                self.countdown = None;
            }
        }

        let effects = self.board.tick(now);
        self.dispatch(effects);
    }

    fn dispatch(&mut self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SetFace { tile, image } => self.stage.grid.set_face(tile, &image),
                Effect::PlaySound(cue) => self.stage.audio.play(cue),
                Effect::ShowOverlay => self.stage.grid.show_overlay(),
                Effect::HideOverlay => self.stage.grid.hide_overlay(),
                Effect::RevealCharacter(character) => {
                    self.stage.status.reveal_character(character)
                }
                Effect::Progress { found, total } => self.stage.status.set_progress(found, total),
                Effect::ShowCompletion { next_level } => {
                    self.stage.panel.show_completion(next_level)
                }
                Effect::FadeCompletion => self.stage.panel.fade_in_completion(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levels::GridPlan;
    use std::cell::RefCell;
    use std::rc::Rc;

    /// Shared call log; each sink records into the same list so the
    /// overall dispatch order is visible
    type CallLog = Rc<RefCell<Vec<String>>>;

    struct RecordingSink {
        log: CallLog,
    }

    impl GridSink for RecordingSink {
        fn set_face(&mut self, tile: usize, image: &ImageRef) {
            self.log.borrow_mut().push(format!("face {tile} {image}"));
        }
        fn show_overlay(&mut self) {
            self.log.borrow_mut().push("overlay on".into());
        }
        fn hide_overlay(&mut self) {
            self.log.borrow_mut().push("overlay off".into());
        }
    }

    impl StatusSink for RecordingSink {
        fn set_progress(&mut self, found: u32, total: u32) {
            self.log.borrow_mut().push(format!("progress {found}/{total}"));
        }
        fn reveal_character(&mut self, character: CharacterId) {
            self.log.borrow_mut().push(format!("reveal {character}"));
        }
    }

    impl AudioSink for RecordingSink {
        fn play(&mut self, cue: SoundCue) {
            self.log.borrow_mut().push(format!("sound {cue:?}"));
        }
    }

    impl PanelSink for RecordingSink {
        fn show_countdown(&mut self, step: CountdownStep) {
            self.log.borrow_mut().push(format!("countdown {step:?}"));
        }
        fn show_completion(&mut self, next_level: u32) {
            self.log.borrow_mut().push(format!("complete -> {next_level}"));
        }
        fn fade_in_completion(&mut self) {
            self.log.borrow_mut().push("fade".into());
        }
    }

    fn recording_stage() -> (Stage, CallLog) {
        let log: CallLog = Rc::new(RefCell::new(Vec::new()));
        let sink = |log: &CallLog| RecordingSink { log: log.clone() };
        let stage = Stage {
            grid: Box::new(sink(&log)),
            status: Box::new(sink(&log)),
            audio: Box::new(sink(&log)),
            panel: Box::new(sink(&log)),
        };
        (stage, log)
    }

    fn single_tile_config() -> SessionConfig {
        let mut config = SessionConfig::new(1, 5);
        config.policy = LevelPolicy::Table {
            plans: vec![],
            fallback: GridPlan { size: 1, characters: 1 },
        };
        config.asset_base = "x/".to_string();
        config
    }

    #[test]
    fn test_new_session_paints_every_tile() {
        let (stage, log) = recording_stage();
        let session = Session::new(SessionConfig::new(1, 7), stage);

        assert_eq!(session.board().tile_count(), 4);
        let log = log.borrow();
        assert_eq!(log.len(), 4);
        for (index, entry) in log.iter().enumerate() {
            assert!(entry.starts_with(&format!("face {index} ")), "{entry}");
        }
    }

    #[test]
    fn test_countdown_is_played_and_displayed() {
        let (stage, log) = recording_stage();
        let mut session = Session::new(SessionConfig::new(1, 7), stage);
        log.borrow_mut().clear();

        session.start(1_000.0);
        assert_eq!(log.borrow().last().unwrap(), "sound Countdown");

        session.tick(2_000.0);
        session.tick(3_000.0);
        session.tick(4_000.0);
        session.tick(5_000.0);
        session.tick(6_000.0);

        let entries: Vec<String> = log
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with("countdown"))
            .cloned()
            .collect();
        assert_eq!(
            entries,
            vec![
                "countdown Count(2)",
                "countdown Count(1)",
                "countdown Go",
                "countdown Done",
            ]
        );
    }

    #[test]
    fn test_activation_is_routed_to_grid_and_audio() {
        let (stage, log) = recording_stage();
        let mut session = Session::new(SessionConfig::new(1, 7), stage);
        log.borrow_mut().clear();

        session.handle_activation(2, 100.0);

        let log = log.borrow();
        assert!(log[0].starts_with("face 2 "));
        assert_eq!(log[1], "sound Click");
    }

    #[test]
    fn test_full_playthrough_on_a_single_tile() {
        let (stage, log) = recording_stage();
        let mut session = Session::new(single_tile_config(), stage);
        log.borrow_mut().clear();

        // one character on one tile: the first activation completes the level
        session.handle_activation(0, 0.0);
        session.tick(500.0);
        session.tick(1_500.0);
        session.tick(2_500.0);

        assert!(session.board().is_complete());
        let log = log.borrow();
        let tail: Vec<&str> = log.iter().map(String::as_str).collect();
        assert_eq!(
            tail,
            vec![
                "face 0 x/1.png",
                "sound Click",
                "overlay off",
                "sound Success",
                "reveal 1",
                "progress 1/1",
                "complete -> 2",
                "overlay on",
                "fade",
            ]
        );
    }

    #[test]
    fn test_out_of_range_activation_is_harmless() {
        let (stage, log) = recording_stage();
        let mut session = Session::new(SessionConfig::new(1, 7), stage);
        log.borrow_mut().clear();

        session.handle_activation(99, 0.0);
        assert!(log.borrow().is_empty());
    }
}
