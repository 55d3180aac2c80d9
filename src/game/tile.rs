//! Tile state and compositing math

use std::rc::Rc;

/// Identifier for a hidden character (1-based, matches the art filenames)
pub type CharacterId = u32;

/// Shared handle to one character's composite image. Every tile holding a
/// fragment of the same character points at the same underlying resource.
pub type ImageRef = Rc<str>;

/// One fragment of a character image, assigned to a tile
#[derive(Debug, Clone, PartialEq)]
pub struct ImagePart {
    pub image: ImageRef,
    pub character: CharacterId,
}

/// A clickable grid cell cycling through its own shuffled part order.
///
/// Freshly built tiles show nothing; the board's initialization pass runs
/// the first advance silently, and every advance after that wraps around
/// the part list.
#[derive(Debug, Clone)]
pub struct Tile {
    parts: Vec<ImagePart>,
    current: Option<usize>,
}

impl Tile {
    /// `parts` must be non-empty
    pub fn new(parts: Vec<ImagePart>) -> Self {
        debug_assert!(!parts.is_empty());
        Self {
            parts,
            current: None,
        }
    }

    /// Step to the next part and return it. The first advance lands on the
    /// start of the shuffled order.
    pub fn advance(&mut self) -> &ImagePart {
        let next = match self.current {
            None => 0,
            Some(index) => (index + 1) % self.parts.len(),
        };
        self.current = Some(next);
        &self.parts[next]
    }

    /// Part currently showing, if the tile has been initialized
    pub fn current(&self) -> Option<&ImagePart> {
        self.current.map(|index| &self.parts[index])
    }

    pub fn is_initialized(&self) -> bool {
        self.current.is_some()
    }

    pub fn parts(&self) -> &[ImagePart] {
        &self.parts
    }
}

/// Background crop offset for the tile at `index` of a `size` x `size`
/// grid, as (x%, y%). Together with a background scaled to `size * 100%`
/// this makes aligned tiles assemble the full picture.
#[inline]
pub fn face_offset(size: u32, index: usize) -> (f32, f32) {
    if size <= 1 {
        return (0.0, 0.0);
    }
    let col = (index as u32 % size) as f32;
    let row = (index as u32 / size) as f32;
    let span = (size - 1) as f32;
    (col / span * 100.0, row / span * 100.0)
}
