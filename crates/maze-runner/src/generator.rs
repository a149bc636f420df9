//! Concurrent random maze generation.
//!
//! Each room picks a random number of distinct directions and grows one
//! subtree per direction on the rayon pool, joining all of them before it
//! completes. Rooms at the height limit become leaves; exactly one leaf
//! slot in the whole run may become the exit, guarded by an [`ExitLatch`].

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use smallvec::SmallVec;
use tracing::{debug, info, instrument, trace};

use crate::deadline::Deadline;
use crate::error::{Error, Result};
use crate::maze::{Child, Direction, Node, ROOMS};

/// Supplies names for ordinary rooms.
///
/// Called concurrently from many branches. Names must not be the reserved
/// exit literal.
pub trait RoomSupplier: Send + Sync {
    fn next_room(&self) -> String;
}

impl<F> RoomSupplier for F
where
    F: Fn() -> String + Send + Sync,
{
    fn next_room(&self) -> String {
        self()
    }
}

/// Decides whether a leaf slot wants to become the exit.
///
/// Approval alone does not place the exit; the run's [`ExitLatch`] must
/// also be claimed.
pub trait ExitRoll: Send + Sync {
    fn roll(&self) -> bool;
}

impl<F> ExitRoll for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn roll(&self) -> bool {
        self()
    }
}

/// Random source for the default supplier and roll
enum Entropy {
    Thread,
    Seeded(Mutex<StdRng>),
}

impl Entropy {
    fn from_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Entropy::Seeded(Mutex::new(StdRng::seed_from_u64(seed))),
            None => Entropy::Thread,
        }
    }

    fn below(&self, bound: usize) -> usize {
        match self {
            Entropy::Thread => rand::rng().random_range(0..bound),
            Entropy::Seeded(rng) => rng.lock().random_range(0..bound),
        }
    }
}

/// Picks room names uniformly from a fixed pool
pub struct RandomRooms {
    names: Vec<String>,
    entropy: Entropy,
}

impl RandomRooms {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            names: ROOMS.iter().map(|name| name.to_string()).collect(),
            entropy: Entropy::from_seed(seed),
        }
    }

    /// Use a custom pool of names. An empty pool is rejected.
    pub fn with_names(names: Vec<String>, seed: Option<u64>) -> Result<Self> {
        if names.is_empty() {
            return Err(Error::Configuration("room name pool is empty".to_string()));
        }
        Ok(Self {
            names,
            entropy: Entropy::from_seed(seed),
        })
    }
}

impl Default for RandomRooms {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RoomSupplier for RandomRooms {
    fn next_room(&self) -> String {
        self.names[self.entropy.below(self.names.len())].clone()
    }
}

/// Approves a leaf slot with a fixed percentage chance
pub struct PercentRoll {
    percent: u8,
    entropy: Entropy,
}

impl PercentRoll {
    /// `percent` must be in 0..=100; 0 never approves, 100 always does.
    pub fn new(percent: u8, seed: Option<u64>) -> Result<Self> {
        if percent > 100 {
            return Err(Error::Configuration(format!(
                "exit percentage {} exceeds 100",
                percent
            )));
        }
        Ok(Self {
            percent,
            entropy: Entropy::from_seed(seed),
        })
    }
}

impl ExitRoll for PercentRoll {
    fn roll(&self) -> bool {
        self.entropy.below(100) < usize::from(self.percent)
    }
}

/// One-shot claim on the single exit of a generation run
#[derive(Debug, Default)]
pub struct ExitLatch {
    claimed: AtomicBool,
}

impl ExitLatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_claimed(&self) -> bool {
        self.claimed.load(Ordering::Acquire)
    }

    /// Returns true for exactly one caller over the latch's lifetime
    pub fn try_claim(&self) -> bool {
        self.claimed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}

/// Parameters of a generation run
pub struct GenerationConfig {
    width: usize,
    height: usize,
    rooms: Box<dyn RoomSupplier>,
    exit: Box<dyn ExitRoll>,
}

impl GenerationConfig {
    /// Default exit chance per leaf slot, in percent
    pub const DEFAULT_EXIT_PERCENT: u8 = 10;

    /// Validate width and height and use the default room supplier and roll.
    ///
    /// Width may not exceed the number of directions.
    pub fn new(width: usize, height: usize) -> Result<Self> {
        if width > Direction::ALL.len() {
            return Err(Error::Configuration(format!(
                "width cannot exceed {}, got {}",
                Direction::ALL.len(),
                width
            )));
        }
        Ok(Self {
            width,
            height,
            rooms: Box::new(RandomRooms::default()),
            exit: Box::new(PercentRoll::new(Self::DEFAULT_EXIT_PERCENT, None)?),
        })
    }

    pub fn with_rooms(mut self, rooms: impl RoomSupplier + 'static) -> Self {
        self.rooms = Box::new(rooms);
        self
    }

    pub fn with_exit_roll(mut self, exit: impl ExitRoll + 'static) -> Self {
        self.exit = Box::new(exit);
        self
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }
}

impl fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

/// Builds random mazes from a [`GenerationConfig`]
#[derive(Debug)]
pub struct Generator {
    config: GenerationConfig,
}

impl Generator {
    pub fn new(config: GenerationConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    /// Generate one maze.
    ///
    /// Every call uses a fresh [`ExitLatch`], so each maze has at most one
    /// exit. Fails with [`Error::Cancelled`] if `deadline` passes before the
    /// whole tree is built; no partial tree is returned.
    #[instrument(skip(self, deadline), fields(width = self.config.width, height = self.config.height))]
    pub fn generate(&self, deadline: &Deadline) -> Result<Node> {
        let start = Instant::now();
        let latch = ExitLatch::new();

        let maze = self.grow(deadline, &latch, self.config.height)?;

        // A leaf that overran the deadline still fails the whole run
        deadline.check()?;

        info!(
            directions = maze.len(),
            depth = maze.depth(),
            exit_placed = latch.is_claimed(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Generated maze"
        );
        Ok(maze)
    }

    fn grow(&self, deadline: &Deadline, latch: &ExitLatch, remaining: usize) -> Result<Node> {
        deadline.check()?;

        if remaining == 0 {
            return Ok(Node::new());
        }

        let directions = self.pick_directions();
        let child_depth = remaining - 1;

        // Height limit: every chosen direction is a leaf
        if child_depth == 0 {
            let mut node = Node::new();
            for direction in directions {
                deadline.check()?;
                node.insert(direction, self.leaf(latch));
            }
            return Ok(node);
        }

        let children = Mutex::new(BTreeMap::new());
        let failure: Mutex<Option<Error>> = Mutex::new(None);

        rayon::scope(|scope| {
            for &direction in &directions {
                let children = &children;
                let failure = &failure;
                scope.spawn(move |_| {
                    if failure.lock().is_some() {
                        return;
                    }
                    match self.grow(deadline, latch, child_depth) {
                        Ok(node) => {
                            let child = if node.is_empty() {
                                Child::room(self.config.rooms.next_room())
                            } else {
                                Child::Interior(node)
                            };
                            children.lock().insert(direction, child);
                        }
                        Err(err) => {
                            let mut slot = failure.lock();
                            if slot.is_none() {
                                *slot = Some(err);
                            }
                        }
                    }
                });
            }
        });

        if let Some(err) = failure.into_inner() {
            trace!(remaining, "Abandoning branch: {}", err);
            return Err(err);
        }

        Ok(Node::from(children.into_inner()))
    }

    /// Shuffle all directions and keep a random-length prefix
    fn pick_directions(&self) -> SmallVec<[Direction; 5]> {
        let mut rng = rand::rng();
        let count = rng.random_range(0..=self.config.width);
        let mut directions = Direction::ALL;
        directions.shuffle(&mut rng);
        directions[..count].iter().copied().collect()
    }

    fn leaf(&self, latch: &ExitLatch) -> Child {
        if !latch.is_claimed() && self.config.exit.roll() && latch.try_claim() {
            debug!("Placed exit");
            Child::exit()
        } else {
            Child::room(self.config.rooms.next_room())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rayon::prelude::*;
    use std::sync::atomic::AtomicUsize;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    fn leaves(node: &Node, depth: usize, out: &mut Vec<(usize, Child)>) {
        for (_, child) in node.iter() {
            match child {
                Child::Interior(inner) => leaves(inner, depth + 1, out),
                leaf => out.push((depth + 1, leaf.clone())),
            }
        }
    }

    fn generator(width: usize, height: usize, exit: impl ExitRoll + 'static) -> Generator {
        let config = GenerationConfig::new(width, height)
            .unwrap()
            .with_rooms(|| "test_room".to_string())
            .with_exit_roll(exit);
        Generator::new(config)
    }

    #[test]
    fn test_width_beyond_directions_rejected() {
        let err = GenerationConfig::new(6, 3).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(GenerationConfig::new(5, 3).is_ok());
    }

    #[test]
    fn test_exit_percent_out_of_range() {
        assert!(matches!(PercentRoll::new(101, None), Err(Error::Configuration(_))));
        assert!(PercentRoll::new(100, None).is_ok());
    }

    #[test]
    fn test_percent_roll_bounds() {
        let never = PercentRoll::new(0, Some(1)).unwrap();
        let always = PercentRoll::new(100, Some(1)).unwrap();
        for _ in 0..200 {
            assert!(!never.roll());
            assert!(always.roll());
        }
    }

    #[test]
    fn test_seeded_rooms_repeat() {
        let a = RandomRooms::new(Some(42));
        let b = RandomRooms::new(Some(42));
        let first: Vec<String> = (0..20).map(|_| a.next_room()).collect();
        let second: Vec<String> = (0..20).map(|_| b.next_room()).collect();
        assert_eq!(first, second);
        assert!(first.iter().all(|name| ROOMS.contains(&name.as_str())));
    }

    #[test]
    fn test_empty_room_pool_rejected() {
        assert!(RandomRooms::with_names(Vec::new(), None).is_err());
    }

    #[test]
    fn test_latch_claims_once() {
        let latch = ExitLatch::new();
        let winners = (0..256).into_par_iter().filter(|_| latch.try_claim()).count();
        assert_eq!(winners, 1);
        assert!(latch.is_claimed());
    }

    #[test]
    fn test_zero_height_or_width_is_empty() {
        let deadline = Deadline::none();
        assert!(generator(3, 0, || true).generate(&deadline).unwrap().is_empty());
        assert!(generator(0, 5, || true).generate(&deadline).unwrap().is_empty());
    }

    #[test]
    fn test_generated_shape() {
        let deadline = Deadline::none();
        let gen = generator(4, 5, || true);
        for _ in 0..20 {
            let maze = gen.generate(&deadline).unwrap();
            assert!(maze.depth() <= 5);
            assert!(maze.max_width() <= 4);

            let mut found = Vec::new();
            leaves(&maze, 0, &mut found);
            for (depth, leaf) in &found {
                assert!(*depth <= 5);
                if leaf.is_exit() {
                    assert_eq!(*depth, 5);
                } else {
                    assert_eq!(leaf, &Child::room("test_room"));
                }
            }

            // Only leaves at the height limit can hold the exit, and the first claims it
            assert_eq!(maze.exit_count(), usize::from(maze.depth() == 5));
        }
    }

    #[test]
    fn test_never_roll_places_no_exit() {
        let deadline = Deadline::none();
        let gen = generator(5, 4, || false);
        for _ in 0..10 {
            assert_eq!(gen.generate(&deadline).unwrap().exit_count(), 0);
        }
    }

    #[test]
    fn test_no_vacuous_interior_rooms() {
        fn check(node: &Node) {
            for (_, child) in node.iter() {
                if let Child::Interior(inner) = child {
                    assert!(!inner.is_empty());
                    check(inner);
                }
            }
        }
        let gen = generator(3, 6, || false);
        for _ in 0..10 {
            check(&gen.generate(&Deadline::none()).unwrap());
        }
    }

    #[test]
    fn test_deadline_passing_mid_run_cancels() {
        let rooms_built = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&rooms_built);
        let config = GenerationConfig::new(5, 4)
            .unwrap()
            .with_exit_roll(|| false)
            .with_rooms(move || {
                counter.fetch_add(1, Ordering::SeqCst);
                thread::sleep(Duration::from_millis(5));
                "slow_room".to_string()
            });
        let gen = Generator::new(config);

        let mut cancelled = 0;
        for _ in 0..20 {
            let deadline = Deadline::after(Duration::from_millis(2));
            rooms_built.store(0, Ordering::SeqCst);
            match gen.generate(&deadline) {
                Err(Error::Cancelled) => cancelled += 1,
                // Only a root that rolled no directions finishes in time
                Ok(maze) => {
                    assert!(maze.is_empty());
                    assert_eq!(rooms_built.load(Ordering::SeqCst), 0);
                }
                Err(err) => panic!("unexpected error: {}", err),
            }
        }
        assert!(cancelled > 0);
    }

    #[test]
    fn test_expired_deadline_cancels() {
        let gen = generator(5, 8, || true);
        let deadline = Deadline::at(Instant::now());
        assert!(matches!(gen.generate(&deadline), Err(Error::Cancelled)));
    }
}
