use std::time::Duration;

use web_time::Instant;

use crate::*;

/// Requests that replace the board instead of playing on it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SessionRequest {
    NewGame(GameConfig),
    Restart,
}

/// Preferences carried with a session. None of them affect the board.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct SessionSettings {
    pub invert_look: bool,
}

/// One game session: the current board, the configuration it was generated from and its timing.
#[derive(Clone, Debug)]
pub struct GameSession<G = ConnectedBoardGenerator> {
    config: GameConfig,
    generator: G,
    board: Board,
    settings: SessionSettings,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl GameSession {
    /// Starts a session with a randomly seeded generator.
    pub fn new(config: GameConfig) -> Result<Self> {
        Self::with_generator(config, ConnectedBoardGenerator::from_entropy())
    }

    pub fn with_seed(config: GameConfig, seed: u64) -> Result<Self> {
        Self::with_generator(config, ConnectedBoardGenerator::new(seed))
    }

    /// Seed of the underlying generator, enough to replay the session's boards.
    pub fn seed(&self) -> u64 {
        self.generator.seed()
    }
}

impl<G: BoardGenerator> GameSession<G> {
    pub fn with_generator(config: GameConfig, mut generator: G) -> Result<Self> {
        let board = generate_checked(&mut generator, config)?;
        let now = Instant::now();
        log::debug!("Session started with {:?}", config);
        Ok(Self {
            config,
            generator,
            finished_at: board.is_finished().then_some(now),
            board,
            settings: SessionSettings::default(),
            started_at: now,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn config(&self) -> GameConfig {
        self.config
    }

    pub fn status(&self) -> GameStatus {
        self.board.status()
    }

    pub fn snapshot(&self) -> BoardSnapshot {
        self.board.snapshot()
    }

    pub fn apply(&mut self, command: Command) -> Result<CommandOutcome> {
        let outcome = self.board.apply(command)?;
        if self.finished_at.is_none() && self.board.is_finished() {
            let now = Instant::now();
            self.finished_at = Some(now);
            log::debug!(
                "Game {:?} after {:?}",
                self.board.status(),
                now - self.started_at
            );
        }
        Ok(outcome)
    }

    pub fn handle(&mut self, request: SessionRequest) -> Result<()> {
        match request {
            SessionRequest::NewGame(config) => self.new_game(config),
            SessionRequest::Restart => self.restart(),
        }
    }

    /// Generates a fresh board with the current configuration.
    pub fn restart(&mut self) -> Result<()> {
        self.new_game(self.config)
    }

    /// Generates a board for `config`. On failure the current board is kept.
    pub fn new_game(&mut self, config: GameConfig) -> Result<()> {
        let board = generate_checked(&mut self.generator, config)?;
        log::debug!("New game with {:?}", config);
        let now = Instant::now();
        self.config = config;
        self.finished_at = board.is_finished().then_some(now);
        self.board = board;
        self.started_at = now;
        Ok(())
    }

    /// When the current board was installed.
    pub fn started_at(&self) -> Instant {
        self.started_at
    }

    /// When the current board was won or lost.
    pub fn finished_at(&self) -> Option<Instant> {
        self.finished_at
    }

    /// Time played on the current board, frozen once it is finished.
    pub fn elapsed(&self) -> Duration {
        self.finished_at.unwrap_or_else(Instant::now) - self.started_at
    }

    pub fn settings(&self) -> SessionSettings {
        self.settings
    }

    pub fn toggle_invert_look(&mut self) -> bool {
        self.settings.invert_look = !self.settings.invert_look;
        self.settings.invert_look
    }
}

/// Generates a board and makes sure it is the one that was asked for.
fn generate_checked<G: BoardGenerator>(generator: &mut G, config: GameConfig) -> Result<Board> {
    let board = generator.generate(config)?;
    if board.config() != config {
        log::warn!(
            "Generator returned {:?} when asked for {:?}",
            board.config(),
            config
        );
        return Err(GameError::ConfigMismatch);
    }
    Ok(board)
}
