//! Maze representation types.
//!
//! A maze is a strict tree: every [`Node`] maps direction labels to either a
//! nested node or a leaf. On the wire the tree is nested JSON objects whose
//! leaves are strings, the reserved literal `"exit"` marking the way out.

use std::collections::BTreeMap;
use std::fmt;
use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Leaf literal that marks the exit
pub const EXIT: &str = "exit";

/// Room names used by the default room supplier
pub const ROOMS: [&str; 5] = ["dragon", "troll", "dark knight", "ninja", "zombie"];

/// Direction taken from a room to reach one of its children.
///
/// The declaration order is the traversal order of [`Node`]. Keys outside
/// this set (e.g. `"north"`) make decoding fail with [`crate::Error::Malformed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Left,
    Right,
    Forward,
    Upstairs,
    Downstairs,
}

impl Direction {
    /// Every direction, in declaration order
    pub const ALL: [Direction; 5] = [
        Direction::Left,
        Direction::Right,
        Direction::Forward,
        Direction::Upstairs,
        Direction::Downstairs,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Forward => "forward",
            Direction::Upstairs => "upstairs",
            Direction::Downstairs => "downstairs",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A dead end: either an ordinary room or the exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Leaf {
    Exit,
    Room(String),
}

impl Leaf {
    pub fn is_exit(&self) -> bool {
        matches!(self, Leaf::Exit)
    }
}

impl From<String> for Leaf {
    fn from(value: String) -> Self {
        if value == EXIT {
            Leaf::Exit
        } else {
            Leaf::Room(value)
        }
    }
}

impl From<Leaf> for String {
    fn from(leaf: Leaf) -> Self {
        match leaf {
            Leaf::Exit => EXIT.to_string(),
            Leaf::Room(name) => name,
        }
    }
}

/// What lies behind a direction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged, expecting = "a nested room map or a leaf string")]
pub enum Child {
    Leaf(Leaf),
    Interior(Node),
}

impl Child {
    pub fn room(name: impl Into<String>) -> Self {
        Child::Leaf(Leaf::Room(name.into()))
    }

    pub fn exit() -> Self {
        Child::Leaf(Leaf::Exit)
    }

    pub fn is_exit(&self) -> bool {
        matches!(self, Child::Leaf(Leaf::Exit))
    }

    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Child::Interior(node) => Some(node),
            Child::Leaf(_) => None,
        }
    }
}

impl From<Node> for Child {
    fn from(node: Node) -> Self {
        Child::Interior(node)
    }
}

impl From<Leaf> for Child {
    fn from(leaf: Leaf) -> Self {
        Child::Leaf(leaf)
    }
}

/// A room with its outgoing directions.
///
/// Children are kept sorted by [`Direction`], so iteration order is stable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Node {
    children: BTreeMap<Direction, Child>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a maze from its JSON form.
    ///
    /// Nesting depth is unbounded: a deep tree is still a valid maze.
    pub fn from_json(json: &str) -> Result<Self> {
        Self::decode(serde_json::Deserializer::from_str(json))
    }

    /// Decode a maze from a JSON stream
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::decode(serde_json::Deserializer::from_reader(reader))
    }

    fn decode<'de, R: serde_json::de::Read<'de>>(
        mut deserializer: serde_json::Deserializer<R>,
    ) -> Result<Self> {
        deserializer.disable_recursion_limit();
        let node = Self::deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(node)
    }

    pub fn len(&self) -> usize {
        self.children.len()
    }

    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    pub fn get(&self, direction: Direction) -> Option<&Child> {
        self.children.get(&direction)
    }

    /// Set the child behind `direction`, returning the one it replaced
    pub fn insert(&mut self, direction: Direction, child: impl Into<Child>) -> Option<Child> {
        self.children.insert(direction, child.into())
    }

    pub fn iter(&self) -> impl Iterator<Item = (Direction, &Child)> {
        self.children.iter().map(|(direction, child)| (*direction, child))
    }

    /// Number of edges on the longest route from this room to a leaf
    pub fn depth(&self) -> usize {
        self.children
            .values()
            .map(|child| match child {
                Child::Leaf(_) => 1,
                Child::Interior(node) => 1 + node.depth(),
            })
            .max()
            .unwrap_or(0)
    }

    /// Largest number of children of any room in the tree
    pub fn max_width(&self) -> usize {
        self.children
            .values()
            .filter_map(Child::as_node)
            .map(Node::max_width)
            .fold(self.len(), usize::max)
    }

    /// Count exit leaves anywhere below this room
    pub fn exit_count(&self) -> usize {
        self.children
            .values()
            .map(|child| match child {
                Child::Leaf(leaf) => usize::from(leaf.is_exit()),
                Child::Interior(node) => node.exit_count(),
            })
            .sum()
    }

    /// Walk `path` from this room and return where it ends
    pub fn follow(&self, path: &Path) -> Option<&Child> {
        let (first, rest) = path.directions().split_first()?;
        let mut current = self.get(*first)?;
        for direction in rest {
            current = current.as_node()?.get(*direction)?;
        }
        Some(current)
    }
}

impl From<BTreeMap<Direction, Child>> for Node {
    fn from(children: BTreeMap<Direction, Child>) -> Self {
        Self { children }
    }
}

/// Directions from the root to the exit, index 0 taken at the root
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Path {
    directions: Vec<Direction>,
}

impl Path {
    pub fn new(directions: Vec<Direction>) -> Self {
        Self { directions }
    }

    pub fn directions(&self) -> &[Direction] {
        &self.directions
    }

    /// Depth of the exit the path leads to
    pub fn len(&self) -> usize {
        self.directions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.directions.is_empty()
    }
}

impl From<Vec<Direction>> for Path {
    fn from(directions: Vec<Direction>) -> Self {
        Self { directions }
    }
}
