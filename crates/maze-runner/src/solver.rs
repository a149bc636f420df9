//! Depth-first search for the path to a maze's exit.
//!
//! The search stops at the first exit it reaches. Children are visited in
//! [`Direction`] order, so on hand-built input with several exits the
//! result is the first one in that order.

use std::io::Read;
use std::time::Instant;

use smallvec::SmallVec;
use tracing::{debug, instrument};

use crate::deadline::Deadline;
use crate::error::Result;
use crate::maze::{Child, Direction, Leaf, Node, Path};

/// Directions collected while unwinding from the exit
pub type Trail = SmallVec<[Direction; 16]>;

/// Find the path from `maze`'s root to its exit.
///
/// Returns `Ok(None)` when the maze has no exit.
#[instrument(skip_all)]
pub fn solve(deadline: &Deadline, maze: &Node) -> Result<Option<Path>> {
    let start = Instant::now();
    let path = find_exit(deadline, maze, 0)?.map(|trail| Path::new(trail.into_vec()));

    debug!(
        found = path.is_some(),
        depth = path.as_ref().map_or(0, Path::len),
        elapsed_us = start.elapsed().as_micros() as u64,
        "Searched maze"
    );
    Ok(path)
}

/// Decode a maze from JSON and solve it
pub fn solve_json(deadline: &Deadline, json: &str) -> Result<Option<Path>> {
    let maze = Node::from_json(json)?;
    solve(deadline, &maze)
}

/// Decode a maze from a JSON stream and solve it
pub fn solve_reader<R: Read>(deadline: &Deadline, reader: R) -> Result<Option<Path>> {
    let maze = Node::from_reader(reader)?;
    solve(deadline, &maze)
}

/// Search `node`, which sits `depth` edges below the root.
///
/// A found trail has length equal to the exit's depth; each level writes
/// its own direction at index `depth` on the way back up.
pub fn find_exit(deadline: &Deadline, node: &Node, depth: usize) -> Result<Option<Trail>> {
    for (direction, child) in node.iter() {
        deadline.check()?;

        match child {
            Child::Interior(inner) => {
                if let Some(mut trail) = find_exit(deadline, inner, depth + 1)? {
                    trail[depth] = direction;
                    return Ok(Some(trail));
                }
            }
            Child::Leaf(Leaf::Exit) => {
                return Ok(Some(SmallVec::from_elem(direction, depth + 1)));
            }
            Child::Leaf(Leaf::Room(_)) => {}
        }
    }

    Ok(None)
}
