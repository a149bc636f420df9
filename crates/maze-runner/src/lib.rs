//! Random maze generation and exit finding.
//!
//! A maze is a tree of rooms: each room leads in up to five directions to
//! either another room or a dead end, and at most one dead end is the exit.
//! The [`Generator`] grows such trees concurrently under width and height
//! limits; [`solve`] walks one depth-first and returns the directions from
//! the root to the exit.

pub mod deadline;
pub mod error;
pub mod generator;
pub mod logging;
pub mod maze;
pub mod solver;

// Re-export main types
pub use deadline::Deadline;
pub use error::{Error, Result};
pub use generator::{
    ExitLatch, ExitRoll, GenerationConfig, Generator, PercentRoll, RandomRooms, RoomSupplier,
};
pub use maze::{Child, Direction, Leaf, Node, Path, EXIT, ROOMS};
pub use solver::{find_exit, solve, solve_json, solve_reader};
