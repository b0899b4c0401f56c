//! Session token minting.

use quizcast_protocol::SessionToken;
use rand::Rng;

/// Mints a fresh session token: 32 hex characters (128 bits of entropy).
///
/// The token is the sole reconnection credential — whoever presents it
/// *is* the participant it was issued to. 128 bits means guessing a live
/// token is computationally infeasible, which is the only authentication
/// this system does.
pub fn mint_token() -> SessionToken {
    let mut rng = rand::rng();
    // 16 random bytes, each formatted as two lowercase hex characters.
    let bytes: [u8; 16] = rng.random();
    SessionToken(bytes.iter().map(|b| format!("{b:02x}")).collect())
}
