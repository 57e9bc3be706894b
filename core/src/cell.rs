use serde::{Deserialize, Serialize};

/// Authoritative per-cell state owned by a [`Board`](crate::Board).
///
/// Flagged and revealed are mutually exclusive. `neighbor_mines` is only meaningful for safe cells.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cell {
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub neighbor_mines: u8,
}

impl Cell {
    pub const fn is_safe(self) -> bool {
        !self.is_mine
    }

    /// Neither revealed nor flagged.
    pub const fn is_hidden(self) -> bool {
        !self.is_revealed && !self.is_flagged
    }

    /// Number shown on a revealed safe cell.
    pub const fn display_count(self) -> Option<u8> {
        if self.is_revealed && !self.is_mine {
            Some(self.neighbor_mines)
        } else {
            None
        }
    }
}

/// End-of-game styling hint, derived from final cell state rather than tracked.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum CellMark {
    /// The mine whose reveal lost the game.
    Detonated,
    /// A mine the player never flagged.
    MissedMine,
    /// A flag placed on a safe cell.
    IncorrectFlag,
}
