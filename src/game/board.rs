//! Grid assembly, match detection and the reveal sequence

use std::collections::BTreeSet;
use std::rc::Rc;

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{
    COMPLETION_FADE_MS, COMPLETION_PANEL_MS, MAX_GRID_SIZE, OVERLAY_RESTORE_MS, REVEAL_DELAY_MS,
};
use crate::game::events::{Effect, SoundCue};
use crate::game::flow::{Scheduler, Step};
use crate::game::shuffle::shuffle;
use crate::game::tile::{CharacterId, ImagePart, ImageRef, Tile};
use crate::levels::GridPlan;

/// Where the board is in the mask/reveal cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardPhase {
    /// Overlay up, tiles cycling
    Masked,
    /// Full match registered, reveal pending
    Resolving,
    /// Overlay down, composite picture visible
    Revealed,
    /// Every character found
    Complete,
}

/// The playing field: a square grid of tiles, each cycling through its own
/// shuffled ordering of the same character set.
///
/// All mutation is driven through [`Board::activate_tile`] and
/// [`Board::tick`]; both return effects for the shell to apply. Time is an
/// absolute millisecond clock supplied by the caller.
#[derive(Debug)]
pub struct Board {
    level: u32,
    size: u32,
    characters: u32,
    tiles: Vec<Tile>,
    found: BTreeSet<CharacterId>,
    phase: BoardPhase,
    scheduler: Scheduler,
    initialized: bool,
}

impl Board {
    /// Lay out a board for `level` with the given plan. The same seed
    /// always produces the same per-tile part orderings. Plan dimensions
    /// are bounded to [`MAX_GRID_SIZE`].
    pub fn new(level: u32, plan: GridPlan, seed: u64, asset_base: &str) -> Self {
        let size = plan.size.clamp(1, MAX_GRID_SIZE);
        let characters = plan.characters.max(1);
        let mut rng = Pcg32::seed_from_u64(seed);

        // One shared image handle per character; tiles only clone the Rc
        let images: Vec<ImageRef> = (1..=characters)
            .map(|character| Rc::from(format!("{asset_base}{character}.png")))
            .collect();

        let tile_count = (size * size) as usize;
        let mut tiles = Vec::with_capacity(tile_count);
        for _ in 0..tile_count {
            let mut parts = Vec::with_capacity(characters as usize);
            for (index, image) in images.iter().enumerate() {
                parts.push(ImagePart {
                    image: image.clone(),
                    character: index as CharacterId + 1,
                });
            }
            shuffle(&mut parts, &mut rng);
            tiles.push(Tile::new(parts));
        }

        Self {
            level,
            size,
            characters,
            tiles,
            found: BTreeSet::new(),
            phase: BoardPhase::Masked,
            scheduler: Scheduler::new(),
            initialized: false,
        }
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn size(&self) -> u32 {
        self.size
    }

    pub fn characters(&self) -> u32 {
        self.characters
    }

    pub fn tile_count(&self) -> usize {
        self.tiles.len()
    }

    pub fn phase(&self) -> BoardPhase {
        self.phase
    }

    pub fn found_count(&self) -> u32 {
        self.found.len() as u32
    }

    pub fn is_complete(&self) -> bool {
        self.found.len() as u32 == self.characters
    }

    /// Character currently showing on a tile
    pub fn tile_character(&self, index: usize) -> Option<CharacterId> {
        self.tiles
            .get(index)
            .and_then(|tile| tile.current().map(|part| part.character))
    }

    /// Give every tile its starting face. Runs once, silently: no click
    /// cue and no match check.
    pub fn initialize(&mut self) -> Vec<Effect> {
        if self.initialized {
            return Vec::new();
        }
        self.initialized = true;

        let mut effects = Vec::with_capacity(self.tiles.len());
        for (index, tile) in self.tiles.iter_mut().enumerate() {
            let image = tile.advance().image.clone();
            effects.push(Effect::SetFace { tile: index, image });
        }
        effects
    }

    /// A tile was clicked: advance it, then check the whole grid
    pub fn activate_tile(&mut self, index: usize, now: f64) -> Vec<Effect> {
        if !self.initialized {
            log::debug!("activation before initialization ignored (tile {index})");
            return Vec::new();
        }
        let Some(tile) = self.tiles.get_mut(index) else {
            log::debug!("activation out of range ignored (tile {index})");
            return Vec::new();
        };

        let image = tile.advance().image.clone();
        let mut effects = vec![
            Effect::SetFace { tile: index, image },
            Effect::PlaySound(SoundCue::Click),
        ];
        effects.extend(self.check_state(now));
        effects
    }

    /// Drain timed steps that have come due
    pub fn tick(&mut self, now: f64) -> Vec<Effect> {
        let mut effects = Vec::new();
        for step in self.scheduler.due(now) {
            match step {
                Step::Reveal { character, found } => {
                    self.phase = BoardPhase::Revealed;
                    effects.push(Effect::HideOverlay);
                    effects.push(Effect::PlaySound(SoundCue::Success));
                    effects.push(Effect::RevealCharacter(character));
                    effects.push(Effect::Progress {
                        found,
                        total: self.characters,
                    });
                }
                Step::RestoreOverlay => {
                    if self.phase == BoardPhase::Revealed {
                        self.phase = BoardPhase::Masked;
                    }
                    effects.push(Effect::ShowOverlay);
                }
                Step::ShowCompletion => {
                    self.phase = BoardPhase::Complete;
                    log::info!("level {} complete", self.level);
                    effects.push(Effect::ShowCompletion {
                        next_level: self.level.saturating_add(1),
                    });
                }
                Step::FadeCompletion => effects.push(Effect::FadeCompletion),
            }
        }
        effects
    }

    /// Compare every tile against the first. A full match of a new
    /// character records it immediately and schedules the reveal sequence;
    /// any disagreement just puts the overlay back up.
    fn check_state(&mut self, now: f64) -> Vec<Effect> {
        let Some(reference) = self.tiles.first().and_then(Tile::current) else {
            return Vec::new();
        };
        let character = reference.character;

        for tile in &self.tiles {
            match tile.current() {
                Some(part) if part.character == character => {}
                _ => {
                    self.phase = BoardPhase::Masked;
                    return vec![Effect::ShowOverlay];
                }
            }
        }

        // Re-matching an already found character is free
        if self.found.contains(&character) {
            return Vec::new();
        }

        self.found.insert(character);
        let found = self.found.len() as u32;
        log::info!("character {character} matched ({found}/{})", self.characters);

        self.phase = BoardPhase::Resolving;
        self.scheduler
            .schedule(now + REVEAL_DELAY_MS, Step::Reveal { character, found });
        if found == self.characters {
            let panel_at = now + REVEAL_DELAY_MS + COMPLETION_PANEL_MS;
            self.scheduler.schedule(panel_at, Step::ShowCompletion);
            self.scheduler
                .schedule(panel_at + COMPLETION_FADE_MS, Step::FadeCompletion);
        }
        self.scheduler
            .schedule(now + REVEAL_DELAY_MS + OVERLAY_RESTORE_MS, Step::RestoreOverlay);

        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(size: u32, characters: u32) -> GridPlan {
        GridPlan { size, characters }
    }

    fn board() -> Board {
        Board::new(1, plan(2, 2), 7, "assets/testcharacters/")
    }

    /// Align every tile to `character`, with the final alignment going
    /// through the public activation path so the match check observes it.
    fn force_match(board: &mut Board, character: CharacterId, now: f64) -> Vec<Effect> {
        let last = board.tile_count() - 1;
        for index in 0..last {
            while board.tile_character(index) != Some(character) {
                board.tiles[index].advance();
            }
        }
        loop {
            let effects = board.activate_tile(last, now);
            if board.tile_character(last) == Some(character) {
                return effects;
            }
        }
    }

    fn sounds(effects: &[Effect]) -> Vec<SoundCue> {
        effects
            .iter()
            .filter_map(|effect| match effect {
                Effect::PlaySound(cue) => Some(*cue),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_board_shape() {
        let board = board();
        assert_eq!(board.tile_count(), 4);
        assert_eq!(board.size(), 2);
        assert_eq!(board.characters(), 2);
        assert_eq!(board.phase(), BoardPhase::Masked);
        for tile in &board.tiles {
            assert_eq!(tile.parts().len(), 2);
        }
    }

    #[test]
    fn test_oversized_plan_is_cut_down() {
        let board = Board::new(66_000, plan(66_001, 2), 1, "x/");
        assert_eq!(board.size(), MAX_GRID_SIZE);
        assert_eq!(board.tile_count(), (MAX_GRID_SIZE * MAX_GRID_SIZE) as usize);
    }

    #[test]
    fn test_image_handles_are_shared() {
        let board = board();
        for character in 1..=2u32 {
            let mut handles = board.tiles.iter().map(|tile| {
                tile.parts()
                    .iter()
                    .find(|part| part.character == character)
                    .unwrap()
                    .image
                    .clone()
            });
            let first: ImageRef = handles.next().unwrap();
            assert_eq!(&*first, &*format!("assets/testcharacters/{character}.png"));
            for handle in handles {
                assert!(Rc::ptr_eq(&first, &handle));
            }
        }
    }

    #[test]
    fn test_same_seed_same_layout() {
        let a = Board::new(1, plan(3, 2), 42, "x/");
        let b = Board::new(1, plan(3, 2), 42, "x/");
        for (ta, tb) in a.tiles.iter().zip(&b.tiles) {
            let order_a: Vec<CharacterId> = ta.parts().iter().map(|p| p.character).collect();
            let order_b: Vec<CharacterId> = tb.parts().iter().map(|p| p.character).collect();
            assert_eq!(order_a, order_b);
        }
    }

    #[test]
    fn test_initialize_is_silent_and_runs_once() {
        let mut board = board();
        let effects = board.initialize();

        assert_eq!(effects.len(), 4);
        for (index, effect) in effects.iter().enumerate() {
            assert!(matches!(effect, Effect::SetFace { tile, .. } if *tile == index));
        }
        assert!(sounds(&effects).is_empty());
        assert!(board.scheduler.is_empty());

        assert!(board.initialize().is_empty());
    }

    #[test]
    fn test_activation_before_initialize_is_ignored() {
        let mut board = board();
        assert!(board.activate_tile(0, 0.0).is_empty());
        assert!(board.tile_character(0).is_none());
    }

    #[test]
    fn test_activation_out_of_range_is_ignored() {
        let mut board = board();
        board.initialize();
        assert!(board.activate_tile(99, 0.0).is_empty());
    }

    #[test]
    fn test_activation_cycles_and_clicks() {
        let mut board = board();
        board.initialize();

        let start = board.tile_character(0).unwrap();
        let effects = board.activate_tile(0, 0.0);
        assert!(matches!(effects[0], Effect::SetFace { tile: 0, .. }));
        assert_eq!(sounds(&effects), vec![SoundCue::Click]);
        assert_ne!(board.tile_character(0), Some(start));

        // two characters per tile, so the second activation wraps around
        board.activate_tile(0, 0.0);
        assert_eq!(board.tile_character(0), Some(start));
    }

    #[test]
    fn test_mismatch_shows_overlay_and_keeps_found() {
        let mut board = board();
        board.initialize();

        // line everything up silently, then one activation breaks it
        for index in 0..board.tile_count() {
            while board.tile_character(index) != Some(1) {
                board.tiles[index].advance();
            }
        }
        let effects = board.activate_tile(0, 0.0);
        assert!(effects.contains(&Effect::ShowOverlay));
        assert_eq!(board.found_count(), 0);
        assert_eq!(board.phase(), BoardPhase::Masked);
        assert!(board.scheduler.is_empty());
    }

    #[test]
    fn test_match_records_and_schedules_reveal() {
        let mut board = board();
        board.initialize();

        let effects = force_match(&mut board, 1, 1_000.0);

        // found is recorded at match time, the rest is deferred
        assert_eq!(board.found_count(), 1);
        assert_eq!(board.phase(), BoardPhase::Resolving);
        assert!(!effects.contains(&Effect::ShowOverlay));
        assert!(!effects.contains(&Effect::HideOverlay));

        assert!(board.tick(1_499.0).is_empty());

        let reveal = board.tick(1_500.0);
        assert_eq!(
            reveal,
            vec![
                Effect::HideOverlay,
                Effect::PlaySound(SoundCue::Success),
                Effect::RevealCharacter(1),
                Effect::Progress { found: 1, total: 2 },
            ]
        );
        assert_eq!(board.phase(), BoardPhase::Revealed);

        assert_eq!(board.tick(2_500.0), vec![Effect::ShowOverlay]);
        assert_eq!(board.phase(), BoardPhase::Masked);
        assert!(board.scheduler.is_empty());
    }

    #[test]
    fn test_refound_character_is_free() {
        let mut board = board();
        board.initialize();

        force_match(&mut board, 1, 0.0);
        board.tick(500.0);
        board.tick(1_500.0);
        assert_eq!(board.found_count(), 1);

        // matching the same character again schedules nothing
        force_match(&mut board, 1, 2_000.0);
        assert_eq!(board.found_count(), 1);
        assert!(board.scheduler.is_empty());
        assert!(!board.is_complete());
    }

    #[test]
    fn test_completion_sequence_fires_once() {
        let mut board = board();
        board.initialize();

        force_match(&mut board, 1, 0.0);
        board.tick(500.0);
        board.tick(1_500.0);

        force_match(&mut board, 2, 10_000.0);
        assert!(board.is_complete());

        let reveal = board.tick(10_500.0);
        assert!(reveal.contains(&Effect::Progress { found: 2, total: 2 }));

        // panel first, then the overlay restore from the same deadline
        let at_panel = board.tick(11_500.0);
        assert_eq!(
            at_panel,
            vec![Effect::ShowCompletion { next_level: 2 }, Effect::ShowOverlay]
        );
        assert_eq!(board.phase(), BoardPhase::Complete);

        assert_eq!(board.tick(12_500.0), vec![Effect::FadeCompletion]);
        assert!(board.scheduler.is_empty());

        // nothing re-arms afterwards
        force_match(&mut board, 2, 20_000.0);
        assert!(board.scheduler.is_empty());
        assert_eq!(board.phase(), BoardPhase::Complete);
    }

    #[test]
    fn test_matches_found_in_either_order() {
        let mut a = Board::new(3, plan(2, 2), 11, "x/");
        a.initialize();
        force_match(&mut a, 2, 0.0);
        force_match(&mut a, 1, 5_000.0);
        assert!(a.is_complete());

        let due = a.tick(10_000.0);
        assert!(due.contains(&Effect::ShowCompletion { next_level: 4 }));
    }

    #[test]
    fn test_degenerate_single_tile_board() {
        let mut board = Board::new(1, plan(1, 1), 3, "x/");
        board.initialize();
        assert_eq!(board.tile_count(), 1);

        // any activation is a full match of the only character
        board.activate_tile(0, 0.0);
        assert!(board.is_complete());
    }

    #[test]
    fn test_next_level_saturates_at_max_level() {
        let mut board = Board::new(u32::MAX, plan(1, 1), 3, "x/");
        board.initialize();
        board.activate_tile(0, 0.0);

        let due = board.tick(2_000.0);
        assert!(due.contains(&Effect::ShowCompletion { next_level: u32::MAX }));
    }
}
