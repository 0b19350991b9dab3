//! Engine-agnostic building blocks shared by the game crate: keyboard state,
//! fixed-step timing and level-scoped delayed tasks.

pub mod input;
pub mod schedule;
pub mod time;
