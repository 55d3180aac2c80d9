//! Deterministic puzzle core
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Seeded RNG only (per-tile part orderings)
//! - Timed steps carry millisecond deadlines; callers pass the clock in
//! - No rendering or platform dependencies

pub mod board;
pub mod events;
pub mod flow;
pub mod shuffle;
pub mod tile;

pub use board::{Board, BoardPhase};
pub use events::{CountdownStep, Effect, SoundCue};
pub use flow::{Countdown, Scheduler, Step};
pub use shuffle::shuffle;
pub use tile::{CharacterId, ImagePart, ImageRef, Tile, face_offset};
