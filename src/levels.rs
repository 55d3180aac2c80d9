//! Level number to grid-plan mapping

use serde::{Deserialize, Serialize};

use crate::consts::{CHARACTERS_PER_LEVEL, MAX_GRID_SIZE};

/// Grid dimensions and character count for one level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridPlan {
    /// Rows and columns
    pub size: u32,
    /// Characters hidden in the grid
    pub characters: u32,
}

/// How the grid grows with the level number
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum LevelPolicy {
    /// One more row and column each level, two characters throughout
    #[default]
    Linear,
    /// Explicit per-level plans with a fallback for everything else
    Table {
        plans: Vec<(u32, GridPlan)>,
        fallback: GridPlan,
    },
}

impl LevelPolicy {
    /// Resolve the plan for a level. Levels below 1 are treated as 1, and
    /// the resolved grid never exceeds [`MAX_GRID_SIZE`] rows and columns.
    pub fn plan(&self, level: u32) -> GridPlan {
        let level = level.max(1);
        let plan = match self {
            LevelPolicy::Linear => GridPlan {
                size: level.saturating_add(1),
                characters: CHARACTERS_PER_LEVEL,
            },
            LevelPolicy::Table { plans, fallback } => plans
                .iter()
                .find(|(at, _)| *at == level)
                .map(|(_, plan)| *plan)
                .unwrap_or(*fallback),
        };
        GridPlan {
            size: plan.size.clamp(1, MAX_GRID_SIZE),
            characters: plan.characters.max(1),
        }
    }

    /// Fixed plans for the first three levels: a denser opening grid, then
    /// growing boards with one character fewer.
    pub fn legacy_table() -> Self {
        LevelPolicy::Table {
            plans: vec![
                (1, GridPlan { size: 2, characters: 4 }),
                (2, GridPlan { size: 3, characters: 3 }),
                (3, GridPlan { size: 4, characters: 3 }),
            ],
            fallback: GridPlan { size: 2, characters: 3 },
        }
    }
}
