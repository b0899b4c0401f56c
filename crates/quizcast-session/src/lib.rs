//! Session machinery for Quizcast.
//!
//! This crate handles participant identity across connections:
//!
//! 1. **Token minting** — generating the opaque credential a client holds
//!    for reconnection ([`mint_token`])
//! 2. **Identity indices** — knowing which connection is which participant,
//!    and which token resumes which session ([`SessionRegistry`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Router (above)    ← consults the registry before touching any room
//!     ↕
//! Session (this crate)  ← non-owning lookup indices, kept in sync
//!     ↕
//! Protocol (below)  ← provides PlayerId, RoomCode, SessionToken
//! ```
//!
//! The registry never *authorizes* anything on its own: its entries are
//! always a subset of what the rooms consider valid, and the room is the
//! final word on whether a participant still exists.

mod error;
mod registry;
mod token;

pub use error::SessionError;
pub use registry::{ConnBinding, SessionRegistry};
pub use token::mint_token;
