use ndarray::Array2;
use rand::prelude::*;

use super::*;

/// Retry cap used unless configured otherwise.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;

/// Generation strategy that places mines uniformly at random and only accepts layouts where every safe cell
/// can be walked to, orthogonally, from the opening cell.
#[derive(Clone, Debug)]
pub struct ConnectedBoardGenerator {
    seed: u64,
    rng: SmallRng,
    max_attempts: u32,
    start_cell: StartCell,
}

impl ConnectedBoardGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            rng: SmallRng::seed_from_u64(seed),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            start_cell: StartCell::default(),
        }
    }

    pub fn from_entropy() -> Self {
        Self::new(rand::random())
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn with_start_cell(mut self, start_cell: StartCell) -> Self {
        self.start_cell = start_cell;
        self
    }

    /// Seed the generator was created with.
    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Picks distinct cells by rejection until `config.mines` are placed.
    fn place_mines(&mut self, config: GameConfig) -> Array2<bool> {
        let (size_x, size_z) = config.size;
        let total = usize::from(config.total_cells());
        let mut mines: Array2<bool> = Array2::default(config.size.to_nd_index());

        let mut placed: CellCount = 0;
        while placed < config.mines {
            let index = self.rng.random_range(0..total);
            let coords = (
                (index % usize::from(size_x)) as Coord,
                (index / usize::from(size_x)) as Coord,
            );
            debug_assert!(coords.1 < size_z);
            let cell = &mut mines[coords.to_nd_index()];
            if !*cell {
                *cell = true;
                placed += 1;
            }
        }

        mines
    }

    fn select_start(&mut self, board: &Board) -> Option<Coord2> {
        match self.start_cell {
            StartCell::RandomZero => {
                let zeros: Vec<_> = board
                    .iter_cells()
                    .filter(|(_, cell)| cell.is_safe() && cell.neighbor_mines == 0)
                    .map(|(coords, _)| coords)
                    .collect();
                let candidates = if zeros.is_empty() {
                    board
                        .iter_cells()
                        .filter(|(_, cell)| cell.is_safe())
                        .map(|(coords, _)| coords)
                        .collect()
                } else {
                    zeros
                };

                if candidates.is_empty() {
                    None
                } else {
                    Some(candidates[self.rng.random_range(0..candidates.len())])
                }
            }
            StartCell::FirstMatch => {
                let first_with = |count: u8| {
                    board
                        .iter_cells()
                        .find(|(_, cell)| cell.is_safe() && cell.neighbor_mines == count)
                        .map(|(coords, _)| coords)
                };
                first_with(0).or_else(|| first_with(1)).or_else(|| {
                    board
                        .iter_cells()
                        .find(|(_, cell)| cell.is_safe())
                        .map(|(coords, _)| coords)
                })
            }
        }
    }
}

impl BoardGenerator for ConnectedBoardGenerator {
    fn generate(&mut self, config: GameConfig) -> Result<Board> {
        config.validate()?;

        for attempt in 1..=self.max_attempts {
            let mines = self.place_mines(config);
            let mut board = Board::from_mine_mask(&mines);

            let start = self.select_start(&board).ok_or(GameError::NoSafeCell)?;
            board.set_start_cell(start);

            let reachable = board.walkable_count(start);
            if reachable < board.safe_cell_count() {
                log::debug!(
                    "Attempt {}: only {} of {} safe cells reachable from {:?}, retrying",
                    attempt,
                    reachable,
                    board.safe_cell_count(),
                    start
                );
                continue;
            }

            let opening = board.reveal_cell(start);
            log::debug!(
                "Generated {:?} after {} attempt(s), start {:?}, opened {} cells",
                config,
                attempt,
                start,
                opening.cascade.len()
            );
            return Ok(board);
        }

        log::warn!(
            "Failed to generate connected board for {:?} within {} attempts",
            config,
            self.max_attempts
        );
        Err(GameError::GenerationExhausted {
            attempts: self.max_attempts,
        })
    }
}
