use serde::{Deserialize, Serialize};

use crate::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellSnapshot {
    pub x: Coord,
    pub z: Coord,
    pub is_mine: bool,
    pub is_revealed: bool,
    pub is_flagged: bool,
    pub neighbor_mines: u8,
    /// Only set once the game is lost.
    pub mark: Option<CellMark>,
}

/// Read-only copy of a board for presentation, in row-major cell order.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub size: Coord2,
    pub mine_count: CellCount,
    pub flagged_count: CellCount,
    pub remaining_mines: isize,
    pub status: GameStatus,
    pub start_cell: Coord2,
    pub detonated_mine: Option<Coord2>,
    pub cells: Vec<CellSnapshot>,
}

impl BoardSnapshot {
    pub fn from_board(board: &Board) -> Self {
        let cells = board
            .iter_cells()
            .map(|((x, z), cell)| CellSnapshot {
                x,
                z,
                is_mine: cell.is_mine,
                is_revealed: cell.is_revealed,
                is_flagged: cell.is_flagged,
                neighbor_mines: cell.neighbor_mines,
                mark: board.mark_at((x, z)),
            })
            .collect();

        Self {
            size: board.size(),
            mine_count: board.mine_count(),
            flagged_count: board.flagged_count(),
            remaining_mines: board.remaining_mines(),
            status: board.status(),
            start_cell: board.start_cell(),
            detonated_mine: board.detonated_mine(),
            cells,
        }
    }

    pub fn cell(&self, (x, z): Coord2) -> Option<&CellSnapshot> {
        if x >= self.size.0 || z >= self.size.1 {
            return None;
        }
        self.cells
            .get(usize::from(z) * usize::from(self.size.0) + usize::from(x))
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

impl Board {
    pub fn snapshot(&self) -> BoardSnapshot {
        BoardSnapshot::from_board(self)
    }
}
