//! Game state machine and turn resolution.
//!
//! A game moves through three phases:
//!
//! - **Lobby**: players join, none of them hold dice yet
//! - **Active**: turns rotate through a frozen roster
//! - **Over**: exactly one player has chips left; terminal but still queryable
//!
//! Chips are conserved: the sum of every player's chips plus the pot is always
//! three times the roster size.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{
    constants::{MIN_PLAYERS, STARTING_CHIPS},
    dice::{Dice, DiceRoller, Face, ThreadRoller},
    entities::{ChipMove, GameId, LobbyCode, Player, PlayerId, Pot},
};

/// Errors raised by the engine
#[derive(Debug, Deserialize, Eq, Error, PartialEq, Serialize)]
pub enum GameError {
    #[error("a game needs at least one player")]
    EmptyRoster,
    #[error("need {required}+ players to start, have {actual}")]
    InsufficientPlayers { required: usize, actual: usize },
    #[error("game is over")]
    GameOver,
    #[error("game already started")]
    AlreadyStarted,
    #[error("players can't join once the game has started")]
    RosterFrozen,
    #[error("invalid game state: player {0} has no chips to move")]
    NoChipsToMove(PlayerId),
    #[error("game did not finish within {0} turns")]
    TurnLimitExceeded(usize),
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum GamePhase {
    Lobby,
    Active,
    Over,
}

/// What happened during one turn.
#[derive(Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
pub struct TurnSummary {
    pub player: Option<PlayerId>,
    pub rolls: Vec<Face>,
    pub passed_left: u32,
    pub passed_right: u32,
    pub into_pot: u32,
}

impl TurnSummary {
    fn record(&mut self, chip_move: ChipMove) {
        match chip_move {
            ChipMove::Left => self.passed_left += 1,
            ChipMove::Center => self.into_pot += 1,
            ChipMove::Right => self.passed_right += 1,
            ChipMove::Keep => {}
        }
    }
}

/// A Left-Center-Right game: roster, dice, pot and turn pointer.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Game {
    /// Assigned by the store on first insert.
    pub id: Option<GameId>,
    /// Assigned by the lobby layer.
    pub lobby_code: Option<LobbyCode>,
    phase: GamePhase,
    /// Turn order. Append-only in the lobby, frozen afterwards.
    players: Vec<Player>,
    creator: PlayerId,
    dice: Dice,
    pot: Pot,
    turn_index: usize,
    /// Turns played since the game started.
    #[serde(default)]
    turns_played: usize,
    winner: Option<PlayerId>,
    game_over: bool,
    last_turn: Option<TurnSummary>,
}

impl Game {
    /// Create a game in the lobby phase. The first player becomes the creator
    /// and every player is seeded with three chips.
    ///
    /// # Errors
    ///
    /// `GameError::EmptyRoster` if `players` is empty.
    pub fn new(mut players: Vec<Player>) -> Result<Self, GameError> {
        let creator = players.first().map(|p| p.id).ok_or(GameError::EmptyRoster)?;
        for player in &mut players {
            player.chips = STARTING_CHIPS;
        }

        Ok(Self {
            id: None,
            lobby_code: None,
            phase: GamePhase::Lobby,
            players,
            creator,
            dice: Dice::new(),
            pot: Pot::default(),
            turn_index: 0,
            turns_played: 0,
            winner: None,
            game_over: false,
            last_turn: None,
        })
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    /// First player with this name.
    pub fn player_by_name(&self, name: &str) -> Option<&Player> {
        self.players.iter().find(|p| p.name() == name)
    }

    pub fn creator(&self) -> Option<&Player> {
        self.player(self.creator)
    }

    pub fn dice(&self) -> &Dice {
        &self.dice
    }

    pub fn pot(&self) -> u32 {
        self.pot.chips()
    }

    pub fn turn_index(&self) -> usize {
        self.turn_index
    }

    /// Player whose turn is next; `None` only for a roster-less snapshot.
    pub fn current_player(&self) -> Option<&Player> {
        self.players.get(self.turn_index)
    }

    pub fn turns_played(&self) -> usize {
        self.turns_played
    }

    pub fn winner(&self) -> Option<&Player> {
        self.winner.and_then(|id| self.player(id))
    }

    pub fn is_over(&self) -> bool {
        self.game_over
    }

    pub fn last_turn(&self) -> Option<&TurnSummary> {
        self.last_turn.as_ref()
    }

    /// Chips held by players plus the pot.
    pub fn total_chips(&self) -> u32 {
        self.players.iter().map(|p| p.chips).sum::<u32>() + self.pot.chips()
    }

    /// Append a player to the roster with a fresh stack.
    ///
    /// # Errors
    ///
    /// `GameError::RosterFrozen` once the game has left the lobby.
    pub fn add_player(&mut self, mut player: Player) -> Result<&Player, GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::RosterFrozen);
        }
        player.chips = STARTING_CHIPS;
        self.players.push(player);
        Ok(&self.players[self.players.len() - 1])
    }

    /// Mark the first player called `name` as ready.
    pub fn set_ready(&mut self, name: &str) -> Option<&Player> {
        let player = self.players.iter_mut().find(|p| p.name() == name)?;
        player.lobby_ready = true;
        Some(player)
    }

    /// Mark every player as ready.
    pub fn set_all_ready(&mut self) {
        for player in &mut self.players {
            player.lobby_ready = true;
        }
    }

    /// Freeze the roster and begin play from a clean slate: three chips each,
    /// empty pot, first player to act, fresh dice.
    ///
    /// # Errors
    ///
    /// - `GameError::AlreadyStarted` unless the game is in the lobby
    /// - `GameError::InsufficientPlayers` with fewer than three players
    pub fn start(&mut self) -> Result<(), GameError> {
        if self.phase != GamePhase::Lobby {
            return Err(GameError::AlreadyStarted);
        }
        self.ensure_enough_players()?;

        for player in &mut self.players {
            player.chips = STARTING_CHIPS;
        }
        self.pot = Pot::default();
        self.turn_index = 0;
        self.turns_played = 0;
        self.dice = Dice::new();
        self.winner = None;
        self.last_turn = None;
        self.phase = GamePhase::Active;

        log::info!(
            "Game {} started with {} players",
            self.label(),
            self.players.len()
        );
        Ok(())
    }

    /// Play one turn with the process-wide random source.
    ///
    /// # Errors
    ///
    /// See [`Game::play_turn_with`].
    pub fn play_turn(&mut self) -> Result<&TurnSummary, GameError> {
        self.play_turn_with(&mut ThreadRoller)
    }

    /// Resolve the current player's turn, advance the turn pointer and check
    /// for a winner.
    ///
    /// A lobby game with enough players is activated by its first turn; its
    /// roster is frozen from then on.
    ///
    /// # Errors
    ///
    /// - `GameError::GameOver` if the game has ended; nothing changes
    /// - `GameError::InsufficientPlayers` for a lobby game under three players
    /// - `GameError::EmptyRoster` for a snapshot without players
    pub fn play_turn_with(
        &mut self,
        roller: &mut dyn DiceRoller,
    ) -> Result<&TurnSummary, GameError> {
        match self.phase {
            GamePhase::Over => return Err(GameError::GameOver),
            GamePhase::Lobby => {
                self.ensure_enough_players()?;
                self.phase = GamePhase::Active;
            }
            GamePhase::Active => {}
        }

        let n = self.players.len();
        if n == 0 {
            log::error!("Game {}: snapshot has no players", self.label());
            return Err(GameError::EmptyRoster);
        }
        let seat = self.turn_index % n;
        let summary = self.resolve_turn(seat, roller);
        self.dice.record_turn(&summary.rolls);
        self.turn_index = (seat + 1) % n;
        self.turns_played += 1;

        log::debug!(
            "Game {}: {} rolled {:?}, pot now {}",
            self.label(),
            self.players[seat].name(),
            summary.rolls,
            self.pot.chips()
        );

        self.check_for_winner();
        Ok(&*self.last_turn.insert(summary))
    }

    /// Play turns until somebody wins. Returns the number of turns played.
    ///
    /// # Errors
    ///
    /// - `GameError::TurnLimitExceeded` if the game is still running after
    ///   `max_turns` turns
    /// - any error from [`Game::play_turn_with`]
    pub fn auto_play(
        &mut self,
        max_turns: usize,
        roller: &mut dyn DiceRoller,
    ) -> Result<usize, GameError> {
        let mut turns = 0;
        while !self.game_over {
            if turns == max_turns {
                return Err(GameError::TurnLimitExceeded(max_turns));
            }
            self.play_turn_with(roller)?;
            turns += 1;
        }
        Ok(turns)
    }

    fn ensure_enough_players(&self) -> Result<(), GameError> {
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers {
                required: MIN_PLAYERS,
                actual: self.players.len(),
            });
        }
        Ok(())
    }

    /// Roll for the player at `seat` and apply every face in roll order.
    fn resolve_turn(&mut self, seat: usize, roller: &mut dyn DiceRoller) -> TurnSummary {
        let n = self.players.len();
        let left = (seat + n - 1) % n;
        let right = (seat + 1) % n;

        let count = self.players[seat].dice_to_roll();
        let rolls = self.dice.roll(count, roller);
        let mut summary = TurnSummary {
            player: Some(self.players[seat].id),
            rolls: rolls.clone(),
            ..TurnSummary::default()
        };

        for face in rolls {
            let chip_move = ChipMove::from_face(face);
            let result = match chip_move {
                ChipMove::Keep => Ok(()),
                ChipMove::Left => self.pass_chip(seat, left),
                ChipMove::Center => self.players[seat].put_in_pot(&mut self.pot),
                ChipMove::Right => self.pass_chip(seat, right),
            };
            match result {
                Ok(()) => summary.record(chip_move),
                Err(e) => log::error!("Game {}: skipped face {face}: {e}", self.label()),
            }
        }

        summary
    }

    fn pass_chip(&mut self, from: usize, to: usize) -> Result<(), GameError> {
        if from == to {
            return Ok(());
        }
        let (giver, receiver) = if from < to {
            let (head, tail) = self.players.split_at_mut(to);
            (&mut head[from], &mut tail[0])
        } else {
            let (head, tail) = self.players.split_at_mut(from);
            (&mut tail[0], &mut head[to])
        };
        giver.give_chip(receiver)
    }

    fn check_for_winner(&mut self) {
        let mut holders = self.players.iter().filter(|p| p.has_chips());
        match (holders.next(), holders.next()) {
            (Some(winner), None) => {
                let (id, name) = (winner.id, winner.name().to_string());
                self.winner = Some(id);
                self.game_over = true;
                self.phase = GamePhase::Over;
                log::info!(
                    "Game {} over: {} wins, pot {}",
                    self.label(),
                    name,
                    self.pot.chips()
                );
            }
            (None, _) => {
                log::error!(
                    "invalid game state: no player in game {} holds chips (pot {}); leaving it open",
                    self.label(),
                    self.pot.chips()
                );
            }
            _ => {}
        }
    }

    fn label(&self) -> &str {
        self.id.as_ref().map_or("<unsaved>", GameId::as_str)
    }
}
