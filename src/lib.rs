//! Tile Heist - a tile-matching heist puzzle for the browser
//!
//! Core modules:
//! - `game`: Deterministic puzzle core (tiles, match detection, timed reveal steps)
//! - `levels`: Level number to grid-plan mapping
//! - `session`: Collaborator seams and effect dispatch
//! - `settings`: Player preferences in LocalStorage
//! - `audio` / `dom` (wasm only): Web Audio and DOM stages

pub mod game;
pub mod levels;
pub mod session;
pub mod settings;

#[cfg(target_arch = "wasm32")]
pub mod audio;
#[cfg(target_arch = "wasm32")]
pub mod dom;

pub use session::{Session, SessionConfig, Stage};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    /// Delay between a full match and the reveal step (ms)
    pub const REVEAL_DELAY_MS: f64 = 500.0;
    /// Delay between the reveal and the overlay coming back (ms)
    pub const OVERLAY_RESTORE_MS: f64 = 1000.0;
    /// Delay between the final reveal and the level-complete panel (ms)
    pub const COMPLETION_PANEL_MS: f64 = 1000.0;
    /// Delay between the panel appearing and the QR fade-in (ms)
    pub const COMPLETION_FADE_MS: f64 = 1000.0;

    /// Length of one countdown beat (ms)
    pub const COUNTDOWN_STEP_MS: f64 = 1000.0;
    /// First number the countdown shows
    pub const COUNTDOWN_FROM: u32 = 2;

    /// Characters hidden in every grid
    pub const CHARACTERS_PER_LEVEL: u32 = 2;
    /// Most rows or columns a grid will lay out, whatever the level says
    pub const MAX_GRID_SIZE: u32 = 64;
    /// Where the character art lives, relative to the page
    pub const DEFAULT_ASSET_BASE: &str = "assets/testcharacters/";
}

/// Level taken from a location query string (`?level=3`). Missing,
/// malformed or zero values fall back to level 1.
#[inline]
pub fn level_from_query(search: &str) -> u32 {
    search
        .trim_start_matches('?')
        .split('&')
        .find_map(|pair| {
            let (key, value) = pair.split_once('=')?;
            (key == "level").then_some(value)
        })
        .and_then(|value| value.trim().parse::<u32>().ok())
        .map(|level| level.max(1))
        .unwrap_or(1)
}

/// Query URL for the level after this one
#[inline]
pub fn next_level_url(origin: &str, pathname: &str, next_level: u32) -> String {
    format!("{origin}{pathname}?level={next_level}")
}
