use std::collections::VecDeque;
use std::ops::Index;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::*;

/// `Playing` is initial, `Won` and `Lost` are terminal.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    Playing,
    Won,
    Lost,
}

impl GameStatus {
    pub const fn is_playing(self) -> bool {
        matches!(self, Self::Playing)
    }

    pub const fn is_finished(self) -> bool {
        matches!(self, Self::Won | Self::Lost)
    }
}

impl Default for GameStatus {
    fn default() -> Self {
        Self::Playing
    }
}

/// Single source of truth for one game.
///
/// Created by a [`BoardGenerator`] (or [`Board::from_mines`]) and then mutated in place by [`Command`]s.
/// Every command either fully applies or leaves the board untouched.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "BoardRepr")]
pub struct Board {
    cells: Array2<Cell>,
    mine_count: CellCount,
    status: GameStatus,
    start_cell: Coord2,
    detonated_mine: Option<Coord2>,
    revealed_count: CellCount,
    flagged_count: CellCount,
}

/// Serialized form of a [`Board`]. Cached counters are ignored and recomputed from the cells.
#[derive(Deserialize)]
struct BoardRepr {
    cells: Array2<Cell>,
    mine_count: CellCount,
    status: GameStatus,
    start_cell: Coord2,
    detonated_mine: Option<Coord2>,
}

impl TryFrom<BoardRepr> for Board {
    type Error = GameError;

    fn try_from(repr: BoardRepr) -> Result<Self> {
        let BoardRepr {
            cells,
            mine_count,
            status,
            start_cell,
            detonated_mine,
        } = repr;

        let (size_x, size_z) = cells.dim();
        let max = usize::from(Coord::MAX);
        if size_x == 0 || size_z == 0 || size_x > max || size_z > max {
            return Err(GameError::InvalidSize);
        }
        let mine_mask = cells.map(|cell| cell.is_mine);
        let mut board = Self::from_mine_mask(&mine_mask);
        if board.mine_count != mine_count {
            return Err(GameError::InvalidBoardState);
        }
        if board.mine_count >= board.total_cells() {
            return Err(GameError::NoSafeCell);
        }
        board.start_cell = board.validate_coords(start_cell)?;

        for (expected, cell) in board.cells.iter_mut().zip(cells.iter()) {
            let miscounted = cell.is_safe() && cell.neighbor_mines != expected.neighbor_mines;
            if miscounted || (cell.is_revealed && cell.is_flagged) {
                return Err(GameError::InvalidBoardState);
            }
            *expected = *cell;
        }

        if let Some(coords) = detonated_mine {
            let cell = board.cell(coords).ok_or(GameError::InvalidCoords)?;
            if !(cell.is_mine && cell.is_revealed) {
                return Err(GameError::InvalidBoardState);
            }
        }
        board.detonated_mine = detonated_mine;

        board.flagged_count = board
            .cells
            .iter()
            .filter(|cell| cell.is_flagged)
            .count() as CellCount;
        board.revealed_count = board
            .cells
            .iter()
            .filter(|cell| cell.is_safe() && cell.is_revealed)
            .count() as CellCount;
        board.status = status;
        Ok(board)
    }
}

impl Board {
    /// Builds a board from an explicit mine layout with `start` as its designated opening cell.
    ///
    /// Unlike generated boards nothing is pre-revealed and connectivity is not checked.
    pub fn from_mines(size: Coord2, mines: &[Coord2], start: Coord2) -> Result<Self> {
        if size.0 == 0 || size.1 == 0 {
            return Err(GameError::InvalidSize);
        }

        let mut mine_mask: Array2<bool> = Array2::default(size.to_nd_index());
        for &coords in mines {
            if coords.0 >= size.0 || coords.1 >= size.1 {
                return Err(GameError::InvalidCoords);
            }
            mine_mask[coords.to_nd_index()] = true;
        }

        let mut board = Self::from_mine_mask(&mine_mask);
        if board.mine_count >= board.total_cells() {
            return Err(GameError::NoSafeCell);
        }
        let start = board.validate_coords(start)?;
        if board[start].is_mine {
            return Err(GameError::InvalidCoords);
        }
        board.start_cell = start;
        Ok(board)
    }

    /// Computes neighbor counts for a mine layout. The start cell is left at the origin.
    pub(crate) fn from_mine_mask(mine_mask: &Array2<bool>) -> Self {
        let (size_x, size_z) = mine_mask.dim();
        let bounds = (size_x as Coord, size_z as Coord);
        let cells = Array2::from_shape_fn((size_x, size_z), |(x, z)| {
            let coords = (x as Coord, z as Coord);
            let is_mine = mine_mask[coords.to_nd_index()];
            let neighbor_mines = if is_mine {
                0
            } else {
                NeighborIter::moore(coords, bounds)
                    .filter(|&pos| mine_mask[pos.to_nd_index()])
                    .count() as u8
            };
            Cell {
                is_mine,
                neighbor_mines,
                ..Default::default()
            }
        });
        let mine_count = mine_mask.iter().filter(|&&is_mine| is_mine).count() as CellCount;

        Self {
            cells,
            mine_count,
            status: GameStatus::Playing,
            start_cell: (0, 0),
            detonated_mine: None,
            revealed_count: 0,
            flagged_count: 0,
        }
    }

    pub(crate) fn set_start_cell(&mut self, start: Coord2) {
        self.start_cell = start;
    }

    pub fn validate_coords(&self, coords: Coord2) -> Result<Coord2> {
        let size = self.size();
        if coords.0 < size.0 && coords.1 < size.1 {
            Ok(coords)
        } else {
            Err(GameError::InvalidCoords)
        }
    }

    pub fn size(&self) -> Coord2 {
        let dim = self.cells.dim();
        (dim.0 as Coord, dim.1 as Coord)
    }

    pub fn width(&self) -> Coord {
        self.size().0
    }

    pub fn height(&self) -> Coord {
        self.size().1
    }

    pub fn config(&self) -> GameConfig {
        GameConfig::new_unchecked(self.size(), self.mine_count)
    }

    pub fn total_cells(&self) -> CellCount {
        self.cells.len() as CellCount
    }

    pub fn mine_count(&self) -> CellCount {
        self.mine_count
    }

    pub fn safe_cell_count(&self) -> CellCount {
        self.total_cells() - self.mine_count
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_finished()
    }

    /// Cell revealed when the board was generated, also where a walking player is placed.
    pub fn start_cell(&self) -> Coord2 {
        self.start_cell
    }

    pub fn detonated_mine(&self) -> Option<Coord2> {
        self.detonated_mine
    }

    /// Number of flagged cells, kept in step with the cells themselves.
    pub fn flagged_count(&self) -> CellCount {
        self.flagged_count
    }

    /// Mines minus flags. Negative when the player over-flags.
    pub fn remaining_mines(&self) -> isize {
        (self.mine_count as isize) - (self.flagged_count as isize)
    }

    pub fn cell(&self, coords: Coord2) -> Option<Cell> {
        self.cells.get(coords.to_nd_index()).copied()
    }

    /// All cells in row-major order (`z` outer, `x` inner).
    pub fn iter_cells(&self) -> impl Iterator<Item = (Coord2, Cell)> + '_ {
        let (size_x, size_z) = self.size();
        (0..size_z).flat_map(move |z| (0..size_x).map(move |x| ((x, z), self[(x, z)])))
    }

    pub fn neighbors(&self, coords: Coord2) -> NeighborIter {
        NeighborIter::moore(coords, self.size())
    }

    /// Recounts the mines around `coords` from the layout.
    pub fn adjacent_mine_count(&self, coords: Coord2) -> u8 {
        self.neighbors(coords).filter(|&pos| self[pos].is_mine).count() as u8
    }

    /// Safe cells still to be revealed, recomputed from the cells.
    pub fn unrevealed_safe_count(&self) -> CellCount {
        self.cells
            .iter()
            .filter(|cell| cell.is_safe() && !cell.is_revealed)
            .count() as CellCount
    }

    /// Counts safe cells reachable from `from` by orthogonal steps over safe cells, `from` included.
    ///
    /// This models walking across the floor, so diagonal moves do not count. A mine at `from` reaches nothing.
    pub fn walkable_count(&self, from: Coord2) -> CellCount {
        if self.cell(from).is_none_or(|cell| cell.is_mine) {
            return 0;
        }

        let size = self.size();
        let mut visited: Array2<bool> = Array2::default(size.to_nd_index());
        let mut queue = VecDeque::from([from]);
        visited[from.to_nd_index()] = true;
        let mut reachable: CellCount = 0;

        while let Some(coords) = queue.pop_front() {
            reachable += 1;
            for next in NeighborIter::orthogonal(coords, size) {
                if !visited[next.to_nd_index()] && !self[next].is_mine {
                    visited[next.to_nd_index()] = true;
                    queue.push_back(next);
                }
            }
        }

        reachable
    }

    /// Whether every safe cell can be walked to from the start cell.
    pub fn is_fully_connected(&self) -> bool {
        self.walkable_count(self.start_cell) == self.safe_cell_count()
    }

    /// Mines left unflagged, excluding the detonated one.
    pub fn missed_mines(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_cells()
            .filter(|&(coords, cell)| {
                cell.is_mine && !cell.is_flagged && Some(coords) != self.detonated_mine
            })
            .map(|(coords, _)| coords)
    }

    /// Flags placed on safe cells.
    pub fn incorrect_flags(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.iter_cells()
            .filter(|&(_, cell)| cell.is_flagged && cell.is_safe())
            .map(|(coords, _)| coords)
    }

    /// Styling hint for a cell once the game is lost, `None` while playing or after a win.
    pub fn mark_at(&self, coords: Coord2) -> Option<CellMark> {
        if self.status != GameStatus::Lost {
            return None;
        }
        let cell = self.cell(coords)?;
        if self.detonated_mine == Some(coords) {
            Some(CellMark::Detonated)
        } else if cell.is_mine && !cell.is_flagged {
            Some(CellMark::MissedMine)
        } else if cell.is_flagged && cell.is_safe() {
            Some(CellMark::IncorrectFlag)
        } else {
            None
        }
    }

    pub(crate) fn cell_mut(&mut self, coords: Coord2) -> &mut Cell {
        &mut self.cells[coords.to_nd_index()]
    }

    pub(crate) fn revealed_count(&self) -> CellCount {
        self.revealed_count
    }

    pub(crate) fn record_revealed(&mut self) {
        self.revealed_count += 1;
    }

    pub(crate) fn record_flag(&mut self, flagged: bool) {
        if flagged {
            self.flagged_count += 1;
        } else {
            self.flagged_count -= 1;
        }
    }

    pub(crate) fn detonate(&mut self, coords: Coord2) {
        self.detonated_mine = Some(coords);
        self.set_status(GameStatus::Lost);
    }

    pub(crate) fn set_status(&mut self, status: GameStatus) {
        if self.status != status {
            log::debug!("board status {:?} -> {:?}", self.status, status);
            self.status = status;
        }
    }
}

impl Index<Coord2> for Board {
    type Output = Cell;

    fn index(&self, coords: Coord2) -> &Self::Output {
        &self.cells[coords.to_nd_index()]
    }
}
