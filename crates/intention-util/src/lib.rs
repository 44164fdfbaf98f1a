//! Intention Utilities
//!
//! Small helpers shared by Intention modules.
//!
//! Features:
//! - Keyed interval timers
//! - Randomness (ranges, shuffle, dice)
//! - Fuzzy search and text helpers
//! - Angle helpers
//! - A shared key-value board

pub mod board;
pub mod geometry;
pub mod random;
pub mod text;
pub mod timer;

pub use board::Board;
pub use geometry::{angle_between, deg_to_rad, rad_to_deg, Point};
pub use random::{dice, random, random_below, shuffle};
pub use text::{capitalize, fuzzy, is_json};
pub use timer::{Timer, TimerRegistry};
