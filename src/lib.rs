//! Grid Snake - the classic Snake game on a fixed square board
//!
//! This library provides:
//! - Core simulation (game module): state, tick rule, food placement
//! - Session ownership of the tick timer (session module)
//! - Terminal shell: input mapping, rendering, metrics and the play loop

pub mod game;
pub mod input;
pub mod logging;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod session;
