use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::*;

/// Player input accepted by a [`Board`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    Reveal(Coord2),
    ToggleFlag(Coord2),
    Chord(Coord2),
}

impl Command {
    pub const fn coords(self) -> Coord2 {
        match self {
            Self::Reveal(coords) | Self::ToggleFlag(coords) | Self::Chord(coords) => coords,
        }
    }
}

/// Cells revealed by one command, grouped by breadth-first distance from the cell that triggered them.
///
/// The board is already fully updated when a cascade is returned; callers may use the layers to pace
/// animations or ignore them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cascade {
    layers: Vec<Vec<Coord2>>,
}

impl Cascade {
    pub fn layers(&self) -> &[Vec<Coord2>] {
        &self.layers
    }

    pub fn cells(&self) -> impl Iterator<Item = Coord2> + '_ {
        self.layers.iter().flatten().copied()
    }

    pub fn len(&self) -> usize {
        self.layers.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }

    fn single(coords: Coord2) -> Self {
        Self {
            layers: vec![vec![coords]],
        }
    }

    fn push(&mut self, depth: usize, coords: Coord2) {
        if self.layers.len() <= depth {
            self.layers.resize_with(depth + 1, Vec::new);
        }
        self.layers[depth].push(coords);
    }

    /// Overlays `other` layer by layer.
    fn merge(&mut self, other: Cascade) {
        for (depth, layer) in other.layers.into_iter().enumerate() {
            for coords in layer {
                self.push(depth, coords);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevealReport {
    pub outcome: RevealOutcome,
    pub cascade: Cascade,
}

impl RevealReport {
    const fn no_change() -> Self {
        Self {
            outcome: RevealOutcome::NoChange,
            cascade: Cascade { layers: Vec::new() },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommandOutcome {
    Reveal(RevealReport),
    Mark(MarkOutcome),
}

impl CommandOutcome {
    pub fn has_update(&self) -> bool {
        match self {
            Self::Reveal(report) => report.outcome.has_update(),
            Self::Mark(outcome) => outcome.has_update(),
        }
    }
}

impl Board {
    /// Applies one command to completion.
    ///
    /// Out-of-bounds targets are rejected before anything changes. Commands that are not legal for the
    /// current status or cell state succeed without effect.
    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome> {
        Ok(match command {
            Command::Reveal(coords) => CommandOutcome::Reveal(self.reveal(coords)?),
            Command::ToggleFlag(coords) => CommandOutcome::Mark(self.toggle_flag(coords)?),
            Command::Chord(coords) => CommandOutcome::Reveal(self.chord(coords)?),
        })
    }

    /// Reveals a hidden cell, flood filling from it when it has no adjacent mines.
    ///
    /// Flagged and already revealed cells are left alone.
    pub fn reveal(&mut self, coords: Coord2) -> Result<RevealReport> {
        let coords = self.validate_coords(coords)?;
        Ok(self.reveal_cell(coords))
    }

    pub fn toggle_flag(&mut self, coords: Coord2) -> Result<MarkOutcome> {
        let coords = self.validate_coords(coords)?;

        if !self.status().is_playing() || self[coords].is_revealed {
            return Ok(MarkOutcome::NoChange);
        }

        let cell = self.cell_mut(coords);
        cell.is_flagged = !cell.is_flagged;
        let flagged = cell.is_flagged;
        self.record_flag(flagged);

        Ok(MarkOutcome::Changed)
    }

    /// Reveals every hidden neighbor of a revealed cell whose flagged neighbors match its number.
    ///
    /// A misplaced flag can make this hit a mine.
    pub fn chord(&mut self, coords: Coord2) -> Result<RevealReport> {
        let coords = self.validate_coords(coords)?;

        if !self.can_chord(coords) {
            return Ok(RevealReport::no_change());
        }

        let mut report = RevealReport::no_change();
        for neighbor in self.neighbors(coords) {
            let RevealReport { outcome, cascade } = self.reveal_cell(neighbor);
            report.outcome = report.outcome | outcome;
            report.cascade.merge(cascade);
        }
        Ok(report)
    }

    pub fn can_chord(&self, coords: Coord2) -> bool {
        if !self.status().is_playing() {
            return false;
        }

        match self.cell(coords) {
            Some(cell) if cell.is_revealed && cell.is_safe() => {
                cell.neighbor_mines == self.count_flagged_neighbors(coords)
            }
            _ => false,
        }
    }

    pub(crate) fn reveal_cell(&mut self, coords: Coord2) -> RevealReport {
        if !self.status().is_playing() {
            return RevealReport::no_change();
        }

        let cell = self[coords];
        if cell.is_revealed || cell.is_flagged {
            return RevealReport::no_change();
        }

        if cell.is_mine {
            log::debug!("Mine hit at {:?}", coords);
            self.cell_mut(coords).is_revealed = true;
            self.detonate(coords);
            return RevealReport {
                outcome: RevealOutcome::HitMine,
                cascade: Cascade::single(coords),
            };
        }

        let cascade = self.flood_fill(coords);
        debug_assert_eq!(
            self.safe_cell_count() - self.revealed_count(),
            self.unrevealed_safe_count()
        );

        let outcome = if self.revealed_count() == self.safe_cell_count() {
            self.set_status(GameStatus::Won);
            RevealOutcome::Won
        } else {
            RevealOutcome::Revealed
        };
        RevealReport { outcome, cascade }
    }

    /// Breadth-first reveal over the Moore neighborhood, expanding only through zero cells.
    ///
    /// Cells are marked revealed when discovered, so each one is queued at most once.
    fn flood_fill(&mut self, origin: Coord2) -> Cascade {
        let mut cascade = Cascade::single(origin);
        self.cell_mut(origin).is_revealed = true;
        self.record_revealed();

        let mut to_visit = VecDeque::from([(origin, 0usize)]);
        while let Some((coords, depth)) = to_visit.pop_front() {
            if self[coords].neighbor_mines != 0 {
                continue;
            }

            for neighbor in self.neighbors(coords) {
                let cell = self[neighbor];
                if !cell.is_hidden() || cell.is_mine {
                    continue;
                }

                self.cell_mut(neighbor).is_revealed = true;
                self.record_revealed();
                log::trace!("Flood revealed {:?} at depth {}", neighbor, depth + 1);
                cascade.push(depth + 1, neighbor);
                to_visit.push_back((neighbor, depth + 1));
            }
        }

        log::debug!("Revealed {} cells from {:?}", cascade.len(), origin);
        cascade
    }

    fn count_flagged_neighbors(&self, coords: Coord2) -> u8 {
        self.neighbors(coords)
            .filter(|&pos| self[pos].is_flagged)
            .count() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board(size: Coord2, mines: &[Coord2], start: Coord2) -> Board {
        Board::from_mines(size, mines, start).unwrap()
    }

    fn revealed(board: &Board) -> Vec<Coord2> {
        board
            .iter_cells()
            .filter(|(_, cell)| cell.is_revealed)
            .map(|(coords, _)| coords)
            .collect()
    }

    #[test]
    fn reveal_mine_loses_without_touching_other_cells() {
        let mut board = board((5, 5), &[(4, 4)], (0, 0));
        let before = board.clone();

        let report = board.reveal((4, 4)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::HitMine);
        assert_eq!(board.status(), GameStatus::Lost);
        assert_eq!(board.detonated_mine(), Some((4, 4)));
        assert_eq!(revealed(&board), vec![(4, 4)]);
        for (coords, cell) in before.iter_cells().filter(|&(coords, _)| coords != (4, 4)) {
            assert_eq!(board[coords], cell);
        }
    }

    #[test]
    fn zero_cell_floods_up_to_numbered_frontier() {
        let mut board = board((5, 5), &[(4, 4)], (0, 0));

        let report = board.reveal((0, 0)).unwrap();

        // Every safe cell is either zero or borders the lone mine, so the fill reaches them all.
        assert_eq!(report.outcome, RevealOutcome::Won);
        assert_eq!(report.cascade.len(), 24);
        assert_eq!(board.status(), GameStatus::Won);
        assert!(!board[(4, 4)].is_revealed);
    }

    #[test]
    fn flood_stops_at_numbered_cells() {
        // Column of mines at x = 3 shields the right edge.
        let mines = [(3, 0), (3, 1), (3, 2), (3, 3)];
        let mut board = board((5, 4), &mines, (0, 0));

        let report = board.reveal((0, 0)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::Revealed);
        for z in 0..4 {
            assert!(board[(0, z)].is_revealed);
            assert!(board[(1, z)].is_revealed);
            assert!(board[(2, z)].is_revealed);
            assert!(!board[(4, z)].is_revealed);
        }
        assert_eq!(board[(2, 0)].neighbor_mines, 2);
        assert_eq!(board.unrevealed_safe_count(), 4);
    }

    #[test]
    fn cascade_layers_follow_bfs_distance() {
        let mut board = board((5, 1), &[(4, 0)], (0, 0));

        let report = board.reveal((0, 0)).unwrap();

        let layers: Vec<_> = report.cascade.layers().to_vec();
        assert_eq!(
            layers,
            vec![vec![(0, 0)], vec![(1, 0)], vec![(2, 0)], vec![(3, 0)]]
        );
        assert_eq!(report.outcome, RevealOutcome::Won);
    }

    #[test]
    fn numbered_cell_reveals_alone() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));

        let report = board.reveal((1, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::Revealed);
        assert_eq!(revealed(&board), vec![(1, 1)]);
    }

    #[test]
    fn flood_skips_flagged_cells() {
        let mut board = board((4, 1), &[], (0, 0));
        board.toggle_flag((2, 0)).unwrap();

        let report = board.reveal((0, 0)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::Revealed);
        assert!(board[(1, 0)].is_revealed);
        assert!(!board[(2, 0)].is_revealed);
        assert!(!board[(3, 0)].is_revealed);
        assert!(board[(2, 0)].is_flagged);
    }

    #[test]
    fn reveal_ignores_flagged_and_revealed_cells() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));
        board.toggle_flag((0, 0)).unwrap();

        assert_eq!(
            board.reveal((0, 0)).unwrap().outcome,
            RevealOutcome::NoChange
        );
        assert_eq!(board.status(), GameStatus::Playing);

        board.reveal((1, 1)).unwrap();
        assert_eq!(
            board.reveal((1, 1)).unwrap().outcome,
            RevealOutcome::NoChange
        );
    }

    #[test]
    fn win_is_not_declared_early() {
        let mut board = board((3, 1), &[(1, 0)], (0, 0));

        assert_eq!(
            board.reveal((0, 0)).unwrap().outcome,
            RevealOutcome::Revealed
        );
        assert_eq!(board.status(), GameStatus::Playing);
        assert_eq!(board.reveal((2, 0)).unwrap().outcome, RevealOutcome::Won);
        assert_eq!(board.status(), GameStatus::Won);
    }

    #[test]
    fn single_safe_cell_wins_immediately() {
        let mines = [(0, 0), (1, 0), (2, 0), (0, 1), (2, 1), (0, 2), (1, 2), (2, 2)];
        let mut board = board((3, 3), &mines, (1, 1));

        assert_eq!(board.reveal((1, 1)).unwrap().outcome, RevealOutcome::Won);
        assert_eq!(board.status(), GameStatus::Won);
    }

    #[test]
    fn out_of_bounds_is_rejected_without_mutation() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));
        let before = board.clone();

        assert_eq!(board.reveal((3, 0)), Err(GameError::InvalidCoords));
        assert_eq!(board.toggle_flag((0, 3)), Err(GameError::InvalidCoords));
        assert_eq!(board.chord((9, 9)), Err(GameError::InvalidCoords));
        assert_eq!(board, before);
    }

    #[test]
    fn finished_board_ignores_commands() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));
        board.reveal((0, 0)).unwrap();
        let lost = board.clone();

        for command in [
            Command::Reveal((2, 2)),
            Command::ToggleFlag((1, 1)),
            Command::Chord((0, 0)),
        ] {
            assert!(!board.apply(command).unwrap().has_update());
        }
        assert_eq!(board, lost);
    }

    #[test]
    fn toggle_flag_twice_restores_state() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));

        assert_eq!(board.toggle_flag((1, 0)).unwrap(), MarkOutcome::Changed);
        assert!(board[(1, 0)].is_flagged);
        assert_eq!(board.flagged_count(), 1);
        assert_eq!(board.remaining_mines(), 0);

        assert_eq!(board.toggle_flag((1, 0)).unwrap(), MarkOutcome::Changed);
        assert!(!board[(1, 0)].is_flagged);
        assert_eq!(board.flagged_count(), 0);
        assert_eq!(board.remaining_mines(), 1);
    }

    #[test]
    fn flag_count_tracks_flagged_cells() {
        let mut board = board((4, 4), &[(0, 0)], (3, 3));
        for coords in [(1, 0), (2, 0), (3, 0), (1, 0)] {
            board.toggle_flag(coords).unwrap();
        }

        let flagged = board.iter_cells().filter(|(_, cell)| cell.is_flagged).count();
        assert_eq!(usize::from(board.flagged_count()), flagged);
        assert_eq!(board.remaining_mines(), -1);
    }

    #[test]
    fn revealed_cell_cannot_be_flagged() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));
        board.reveal((1, 1)).unwrap();

        assert_eq!(board.toggle_flag((1, 1)).unwrap(), MarkOutcome::NoChange);
        assert!(!board[(1, 1)].is_flagged);
        assert_eq!(board.flagged_count(), 0);
    }

    #[test]
    fn chord_floods_through_zero_neighbor() {
        let mut board = board((5, 3), &[(0, 1)], (4, 0));
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 1)).unwrap();

        let report = board.chord((1, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::Won);
        let layers = report.cascade.layers();
        // Direct neighbors first, then the fill spreading out of (2, 0).
        assert_eq!(layers[0], vec![(0, 0), (1, 0), (2, 0), (0, 2)]);
        assert_eq!(layers[1], vec![(3, 0), (2, 1), (3, 1)]);
        assert_eq!(layers[2].len(), 6);
        assert_eq!(layers.len(), 3);
        assert_eq!(report.cascade.len(), 13);
        assert!(board[(0, 1)].is_flagged);
        assert!(!board[(0, 1)].is_revealed);
    }

    #[test]
    fn chord_with_mismatched_flags_changes_nothing() {
        let mines = [(0, 1), (2, 1)];
        let mut board = board((3, 3), &mines, (1, 0));
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((0, 1)).unwrap();
        let before = board.clone();

        assert!(!board.can_chord((1, 1)));
        assert_eq!(
            board.chord((1, 1)).unwrap().outcome,
            RevealOutcome::NoChange
        );
        assert_eq!(board, before);
    }

    #[test]
    fn chord_on_hidden_cell_changes_nothing() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));
        let before = board.clone();

        assert_eq!(
            board.chord((2, 2)).unwrap().outcome,
            RevealOutcome::NoChange
        );
        assert_eq!(board, before);
    }

    #[test]
    fn chord_with_misplaced_flag_detonates() {
        let mut board = board((3, 3), &[(0, 0)], (2, 2));
        board.reveal((1, 1)).unwrap();
        board.toggle_flag((2, 0)).unwrap();

        let report = board.chord((1, 1)).unwrap();

        assert_eq!(report.outcome, RevealOutcome::HitMine);
        assert_eq!(board.status(), GameStatus::Lost);
        assert_eq!(board.detonated_mine(), Some((0, 0)));
        assert!(board[(2, 0)].is_flagged);
        assert!(!board[(2, 0)].is_revealed);
        assert_eq!(board.mark_at((0, 0)), Some(CellMark::Detonated));
        assert_eq!(board.mark_at((2, 0)), Some(CellMark::IncorrectFlag));
        assert_eq!(board.incorrect_flags().collect::<Vec<_>>(), vec![(2, 0)]);
        assert_eq!(board.missed_mines().count(), 0);
    }

    #[test]
    fn loss_reports_missed_mines() {
        let mut board = board((4, 1), &[(0, 0), (3, 0)], (1, 0));
        board.reveal((3, 0)).unwrap();

        assert_eq!(board.missed_mines().collect::<Vec<_>>(), vec![(0, 0)]);
        assert_eq!(board.mark_at((0, 0)), Some(CellMark::MissedMine));
        assert_eq!(board.mark_at((1, 0)), None);
    }
}
