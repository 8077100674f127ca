//! Ownership of a running game: the session and its tick timer.

pub mod game_session;
pub mod ticker;

pub use game_session::GameSession;
pub use ticker::Ticker;
