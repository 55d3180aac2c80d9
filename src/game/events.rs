//! Effects emitted by the core for the shell to interpret
//!
//! The board never touches the page; it describes what should happen and
//! the session routes each effect to exactly one collaborator.

use crate::game::tile::{CharacterId, ImageRef};

/// Named sound cues
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundCue {
    /// A tile advanced
    Click,
    /// A character was matched
    Success,
    /// The pre-game countdown started
    Countdown,
}

/// One beat of the pre-game countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownStep {
    /// A number to display
    Count(u32),
    /// "GO!"
    Go,
    /// Countdown over; the start screen goes away
    Done,
}

/// A single side effect of advancing the game
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show this image fragment on a tile
    SetFace { tile: usize, image: ImageRef },
    PlaySound(SoundCue),
    /// Put the occluding grid back up
    ShowOverlay,
    /// Drop the occluding grid so the composite shows through
    HideOverlay,
    /// Light up a found-character indicator
    RevealCharacter(CharacterId),
    /// Update the found counter readout
    Progress { found: u32, total: u32 },
    /// Present the level-complete panel linking to the next level
    ShowCompletion { next_level: u32 },
    /// Fade the completion panel contents in
    FadeCompletion,
}
