use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use uuid::Uuid;

use super::{
    constants::{MAX_DICE_PER_TURN, STARTING_CHIPS},
    dice::Face,
    engine::GameError,
};

/// Opaque persistence key of a game, assigned by the store.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct GameId(String);

impl GameId {
    /// Fresh random key.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for GameId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Short human-shareable code identifying one joinable game.
///
/// Codes are upper case; anything typed by a user is normalized.
#[derive(Clone, Debug, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct LobbyCode(String);

impl LobbyCode {
    pub fn new(s: &str) -> Self {
        Self(s.trim().to_ascii_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LobbyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl<'de> Deserialize<'de> for LobbyCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(Self::new(&s))
    }
}

impl From<String> for LobbyCode {
    fn from(value: String) -> Self {
        Self::new(&value)
    }
}

/// Stable player identifier, independent of seat position.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct PlayerId(Uuid);

impl PlayerId {
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Identity of an authenticated user, as issued by the auth provider.
#[derive(Clone, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for OwnerId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for OwnerId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Who decides a player's turns. Bots roll through the same engine as
/// humans; the tag only records that nobody owns them.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(tag = "kind", content = "owner")]
pub enum Controller {
    Human(OwnerId),
    Bot,
}

impl Controller {
    pub fn is_bot(&self) -> bool {
        matches!(self, Self::Bot)
    }

    pub fn owner(&self) -> Option<&OwnerId> {
        match self {
            Self::Human(owner) => Some(owner),
            Self::Bot => None,
        }
    }
}

/// Shared chip reservoir. Chips placed here never come back into play.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Pot(u32);

impl Pot {
    pub fn chips(&self) -> u32 {
        self.0
    }

    pub(crate) fn add_chip(&mut self) {
        self.0 += 1;
    }
}

/// What a single die face does to the roller's chips.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum ChipMove {
    /// Pass one chip to the previous player in turn order.
    Left,
    /// Put one chip in the pot.
    Center,
    /// Pass one chip to the next player in turn order.
    Right,
    Keep,
}

impl ChipMove {
    pub fn from_face(face: Face) -> Self {
        match face {
            4 => Self::Left,
            5 => Self::Center,
            6 => Self::Right,
            _ => Self::Keep,
        }
    }
}

/// One participant and their chip ledger.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Player {
    pub id: PlayerId,
    name: String,
    pub chips: u32,
    pub lobby_ready: bool,
    pub controller: Controller,
}

impl Player {
    pub fn new(name: impl Into<String>, controller: Controller) -> Self {
        Self {
            id: PlayerId::new(),
            name: name.into(),
            chips: STARTING_CHIPS,
            lobby_ready: false,
            controller,
        }
    }

    pub fn human(name: impl Into<String>, owner: OwnerId) -> Self {
        Self::new(name, Controller::Human(owner))
    }

    pub fn bot(name: impl Into<String>) -> Self {
        Self::new(name, Controller::Bot)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn has_chips(&self) -> bool {
        self.chips > 0
    }

    /// Dice rolled on this player's turn: one per chip, at most three.
    pub fn dice_to_roll(&self) -> usize {
        self.chips.min(MAX_DICE_PER_TURN) as usize
    }

    /// Move one chip from this player to `other`.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoChipsToMove` if this player holds no chips; the
    /// ledger is left untouched.
    pub fn give_chip(&mut self, other: &mut Player) -> Result<(), GameError> {
        self.take_chip()?;
        other.chips += 1;
        Ok(())
    }

    /// Move one chip from this player into the pot.
    ///
    /// # Errors
    ///
    /// Returns `GameError::NoChipsToMove` if this player holds no chips.
    pub fn put_in_pot(&mut self, pot: &mut Pot) -> Result<(), GameError> {
        self.take_chip()?;
        pot.add_chip();
        Ok(())
    }

    fn take_chip(&mut self) -> Result<(), GameError> {
        let remaining = self
            .chips
            .checked_sub(1)
            .ok_or(GameError::NoChipsToMove(self.id))?;
        self.chips = remaining;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_player_starts_with_three_chips_not_ready() {
        let player = Player::human("alice", OwnerId::new("uid-1"));
        assert_eq!(player.chips, 3);
        assert!(!player.lobby_ready);
        assert_eq!(player.controller.owner(), Some(&OwnerId::new("uid-1")));
        assert!(!player.controller.is_bot());
    }

    #[test]
    fn test_dice_to_roll_caps_at_three() {
        let mut player = Player::bot("Bot 3");
        for (chips, dice) in [(0, 0), (1, 1), (2, 2), (3, 3), (7, 3)] {
            player.chips = chips;
            assert_eq!(player.dice_to_roll(), dice);
        }
    }

    #[test]
    fn test_give_chip_moves_one_chip() {
        let mut a = Player::bot("a");
        let mut b = Player::bot("b");
        a.give_chip(&mut b).unwrap();
        assert_eq!((a.chips, b.chips), (2, 4));
    }

    #[test]
    fn test_put_in_pot_moves_one_chip() {
        let mut a = Player::bot("a");
        let mut pot = Pot::default();
        a.put_in_pot(&mut pot).unwrap();
        assert_eq!(a.chips, 2);
        assert_eq!(pot.chips(), 1);
    }

    #[test]
    fn test_empty_player_cannot_give() {
        let mut a = Player::bot("a");
        let mut b = Player::bot("b");
        a.chips = 0;

        assert_eq!(a.give_chip(&mut b), Err(GameError::NoChipsToMove(a.id)));
        assert_eq!((a.chips, b.chips), (0, 3));
    }

    #[test]
    fn test_face_mapping() {
        assert_eq!(ChipMove::from_face(1), ChipMove::Keep);
        assert_eq!(ChipMove::from_face(2), ChipMove::Keep);
        assert_eq!(ChipMove::from_face(3), ChipMove::Keep);
        assert_eq!(ChipMove::from_face(4), ChipMove::Left);
        assert_eq!(ChipMove::from_face(5), ChipMove::Center);
        assert_eq!(ChipMove::from_face(6), ChipMove::Right);
    }

    #[test]
    fn test_lobby_code_is_normalized() {
        assert_eq!(LobbyCode::new(" ab1cd ").as_str(), "AB1CD");
        let parsed: LobbyCode = serde_json::from_str("\"x9y8z\"").unwrap();
        assert_eq!(parsed, LobbyCode::new("X9Y8Z"));
    }

    #[test]
    fn test_controller_serialization() {
        let human = serde_json::to_value(Controller::Human(OwnerId::new("u1"))).unwrap();
        assert_eq!(human, serde_json::json!({"kind": "Human", "owner": "u1"}));
        let bot = serde_json::to_value(Controller::Bot).unwrap();
        assert_eq!(bot, serde_json::json!({"kind": "Bot"}));
    }
}
