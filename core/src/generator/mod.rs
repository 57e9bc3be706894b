use crate::*;
pub use connected::*;

mod connected;

pub trait BoardGenerator {
    /// Produces a board for `config` with its opening region already revealed.
    fn generate(&mut self, config: GameConfig) -> Result<Board>;
}

/// How the opening cell is picked among the safe cells of a candidate layout.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum StartCell {
    /// Uniformly among cells with no adjacent mines, else uniformly among all safe cells.
    #[default]
    RandomZero,
    /// First cell in row-major order with no adjacent mines, else with one, else any safe cell.
    FirstMatch,
}
