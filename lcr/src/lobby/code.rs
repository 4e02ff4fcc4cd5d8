//! Lobby code generation.

use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::game::LobbyCode;

/// Symbols a lobby code is drawn from.
pub const LOBBY_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

pub const LOBBY_CODE_LEN: usize = 5;

/// Codes tried before giving up on finding one no open game holds.
pub const MAX_CODE_ATTEMPTS: usize = 16;

/// Random 5-symbol code from `A-Z0-9`. Each call seeds its own generator
/// from the OS.
pub fn generate_lobby_code() -> LobbyCode {
    let mut rng = StdRng::from_os_rng();
    let code: String = (0..LOBBY_CODE_LEN)
        .map(|_| char::from(LOBBY_CODE_ALPHABET[rng.random_range(0..LOBBY_CODE_ALPHABET.len())]))
        .collect();
    LobbyCode::new(&code)
}
