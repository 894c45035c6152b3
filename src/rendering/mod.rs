//! # Rendering Module
//!
//! Plain-text presentation of a game state, for logs, tests and headless
//! runs. Graphical front ends read the same [`crate::StateSnapshot`].

pub mod display;

pub use display::*;
