#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Grid Chase engine.
//!
//! This crate defines the vocabulary that connects the authoritative session
//! state, the pure pursuit and spawning systems, and adapters: grid geometry,
//! the deterministic random source, difficulty configuration, and the outcome
//! types reported back to callers. Everything here is a plain value; mutation
//! lives exclusively in the world crate.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Side length of the square arena measured in cells.
pub const GRID_SIZE: u32 = 10;

/// Number of obstacle cells placed when an arena is built.
pub const WALL_COUNT: usize = 10;

/// Number of pursuing agents placed when a session starts.
pub const INITIAL_AGENT_COUNT: usize = 2;

/// Cell occupied by the player at the start of every session.
pub const PLAYER_START: GridPos = GridPos::new(5, 5);

/// Turn on which the scheduler first considers spawning a new agent.
pub const FIRST_SPAWN_TURN: u32 = 10;

/// Location of a single arena cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: u32,
    y: u32,
}

impl GridPos {
    /// Creates a new cell coordinate.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Computes the Manhattan distance between two cells.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Reports whether the cell lies on the arena boundary.
    #[must_use]
    pub const fn is_edge(&self) -> bool {
        self.x == 0 || self.x == GRID_SIZE - 1 || self.y == 0 || self.y == GRID_SIZE - 1
    }

    /// In-bounds cardinal neighbors in north, south, west, east order.
    ///
    /// The enumeration order is observable through scoring tie-breaks and is
    /// part of the replay contract; it must not change.
    #[must_use]
    pub fn neighbors(self) -> NeighborIter {
        let mut neighbors = NeighborIter::default();
        if self.y > 0 {
            neighbors.push(GridPos::new(self.x, self.y - 1));
        }
        if self.y + 1 < GRID_SIZE {
            neighbors.push(GridPos::new(self.x, self.y + 1));
        }
        if self.x > 0 {
            neighbors.push(GridPos::new(self.x - 1, self.y));
        }
        if self.x + 1 < GRID_SIZE {
            neighbors.push(GridPos::new(self.x + 1, self.y));
        }
        neighbors
    }

    /// Returns the cell one step in the given direction, if it stays on the
    /// grid.
    #[must_use]
    pub fn offset(self, direction: Direction) -> Option<GridPos> {
        match direction {
            Direction::North => (self.y > 0).then(|| GridPos::new(self.x, self.y - 1)),
            Direction::South => {
                (self.y + 1 < GRID_SIZE).then(|| GridPos::new(self.x, self.y + 1))
            }
            Direction::West => (self.x > 0).then(|| GridPos::new(self.x - 1, self.y)),
            Direction::East => {
                (self.x + 1 < GRID_SIZE).then(|| GridPos::new(self.x + 1, self.y))
            }
        }
    }
}

/// Fixed-capacity iterator over the cardinal neighbors of a cell.
#[derive(Clone, Debug, Default)]
pub struct NeighborIter {
    buffer: [Option<GridPos>; 4],
    len: usize,
    cursor: usize,
}

impl NeighborIter {
    fn push(&mut self, cell: GridPos) {
        if self.len < self.buffer.len() {
            self.buffer[self.len] = Some(cell);
            self.len += 1;
        }
    }
}

impl Iterator for NeighborIter {
    type Item = GridPos;

    fn next(&mut self) -> Option<Self::Item> {
        if self.cursor >= self.len {
            return None;
        }

        let value = self.buffer[self.cursor];
        self.cursor += 1;
        value
    }
}

/// Cardinal movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Movement toward decreasing row indices.
    North,
    /// Movement toward increasing row indices.
    South,
    /// Movement toward decreasing column indices.
    West,
    /// Movement toward increasing column indices.
    East,
}

impl Direction {
    /// Maps one of the four legal `(dx, dy)` deltas onto a direction.
    #[must_use]
    pub const fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        match (dx, dy) {
            (0, -1) => Some(Self::North),
            (0, 1) => Some(Self::South),
            (-1, 0) => Some(Self::West),
            (1, 0) => Some(Self::East),
            _ => None,
        }
    }
}

/// Stable spawn-order index of a pursuing agent.
///
/// Agents are only ever appended to the roster, so the identifier doubles as
/// the agent's position in the roster and serves as the deterministic
/// tie-break axis during conflict arbitration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AgentId(u32);

impl AgentId {
    /// Creates a new agent identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index of the agent within the roster.
    #[must_use]
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

/// Immutable difficulty configuration in effect for a session.
///
/// Only the weights and the spawn floor affect simulation outcomes; the
/// remaining fields are presentation toggles carried for adapters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    escape_weight: f64,
    gap_fill_weight: f64,
    spawn_floor: u32,
    turn_delay_ms: u32,
    show_intent_flash: bool,
    show_forecast: bool,
    danger_feedback: bool,
}

impl DifficultyProfile {
    /// Creates a profile with explicit values. Configuration layers validate
    /// `spawn_floor >= 1` and finite weights before calling in.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub const fn new(
        escape_weight: f64,
        gap_fill_weight: f64,
        spawn_floor: u32,
        turn_delay_ms: u32,
        show_intent_flash: bool,
        show_forecast: bool,
        danger_feedback: bool,
    ) -> Self {
        Self {
            escape_weight,
            gap_fill_weight,
            spawn_floor,
            turn_delay_ms,
            show_intent_flash,
            show_forecast,
            danger_feedback,
        }
    }

    /// Baseline tuning.
    #[must_use]
    pub const fn standard() -> Self {
        Self::new(1.5, 3.0, 3, 130, true, true, true)
    }

    /// Standard weights without the forecast overlay.
    #[must_use]
    pub const fn hard() -> Self {
        Self::new(1.5, 3.0, 3, 130, true, false, true)
    }

    /// Fastest spawn cadence and no advance feedback of any kind.
    #[must_use]
    pub const fn hardcore() -> Self {
        Self::new(1.5, 3.0, 2, 130, false, false, false)
    }

    /// Weight applied to the player's remaining escape options when scoring.
    #[must_use]
    pub const fn escape_weight(&self) -> f64 {
        self.escape_weight
    }

    /// Bonus granted for stepping into a vacant cell beside the player.
    #[must_use]
    pub const fn gap_fill_weight(&self) -> f64 {
        self.gap_fill_weight
    }

    /// Lower bound on the decaying spawn interval, in turns.
    #[must_use]
    pub const fn spawn_floor(&self) -> u32 {
        self.spawn_floor
    }

    /// Presentation delay between accepting a move and revealing intents.
    #[must_use]
    pub const fn turn_delay_ms(&self) -> u32 {
        self.turn_delay_ms
    }

    /// Whether adapters should flash the planner's intended moves.
    #[must_use]
    pub const fn show_intent_flash(&self) -> bool {
        self.show_intent_flash
    }

    /// Whether adapters may show the forecast overlay.
    #[must_use]
    pub const fn show_forecast(&self) -> bool {
        self.show_forecast
    }

    /// Whether adapters should surface the escape-option count.
    #[must_use]
    pub const fn danger_feedback(&self) -> bool {
        self.danger_feedback
    }
}

/// Result of submitting a player move to a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    /// The move was refused and the session is unchanged.
    Rejected(MoveRejection),
    /// The player stepped onto an agent; the session has ended.
    Intercepted,
    /// The move was accepted; the caller resolves the tick next.
    Continuing,
}

/// Result of resolving one scheduler tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickOutcome {
    /// The turn advanced and the session remains open.
    Continuing,
    /// An agent reached the player's cell.
    Intercepted,
    /// The player has no free neighbor cell left.
    NoEscape,
}

/// Cause recorded when a session reaches its terminal state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TerminalCause {
    /// An agent and the player ended a transition on the same cell.
    Intercepted,
    /// Every neighbor of the player was blocked after the agents moved.
    NoEscape,
}

impl std::fmt::Display for TerminalCause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intercepted => f.write_str("Intercepted"),
            Self::NoEscape => f.write_str("No escape"),
        }
    }
}

/// Reasons a player move is refused without touching the session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum MoveRejection {
    /// The destination lies outside the arena.
    #[error("destination is outside the arena")]
    OutOfBounds,
    /// The destination is an obstacle cell.
    #[error("destination is an obstacle cell")]
    Obstacle,
    /// A previously accepted move has not been resolved yet.
    #[error("a tick is still resolving")]
    TickInProgress,
    /// The session already reached a terminal state.
    #[error("the session has ended")]
    SessionOver,
}

/// Errors raised when the tick API is driven out of order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Error)]
pub enum TickError {
    /// `resolve_tick` was called without an accepted player move.
    #[error("no player move is pending resolution")]
    NoMovePending,
}

/// Set of obstacle cells fixed for a session's lifetime.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ObstacleSet {
    cells: HashSet<GridPos>,
}

impl ObstacleSet {
    /// Wraps an already validated collection of obstacle cells.
    #[must_use]
    pub fn from_cells(cells: HashSet<GridPos>) -> Self {
        Self { cells }
    }

    /// Reports whether the cell is an obstacle.
    #[must_use]
    pub fn contains(&self, cell: GridPos) -> bool {
        self.cells.contains(&cell)
    }

    /// Number of obstacle cells in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the set holds no obstacles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterator over the obstacle cells in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = GridPos> + '_ {
        self.cells.iter().copied()
    }

    /// Obstacle cells in ascending coordinate order, for presentation and
    /// golden comparisons.
    #[must_use]
    pub fn sorted(&self) -> Vec<GridPos> {
        let mut cells: Vec<GridPos> = self.cells.iter().copied().collect();
        cells.sort();
        cells
    }
}

/// Read-only view of one session's board handed to the pure systems.
#[derive(Clone, Copy, Debug)]
pub struct BoardView<'a> {
    obstacles: &'a ObstacleSet,
    agents: &'a [GridPos],
    player: GridPos,
}

impl<'a> BoardView<'a> {
    /// Captures a view over the provided board state.
    #[must_use]
    pub const fn new(obstacles: &'a ObstacleSet, agents: &'a [GridPos], player: GridPos) -> Self {
        Self {
            obstacles,
            agents,
            player,
        }
    }

    /// Obstacle cells of the arena.
    #[must_use]
    pub const fn obstacles(&self) -> &'a ObstacleSet {
        self.obstacles
    }

    /// Agent cells in roster order.
    #[must_use]
    pub const fn agents(&self) -> &'a [GridPos] {
        self.agents
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub const fn player(&self) -> GridPos {
        self.player
    }

    /// Counts the player's escape options: in-bounds neighbor cells that are
    /// neither obstacles nor occupied by an agent.
    #[must_use]
    pub fn player_escape_options(&self) -> u32 {
        let mut count = 0;
        for neighbor in self.player.neighbors() {
            if self.obstacles.contains(neighbor) {
                continue;
            }
            if self.agents.contains(&neighbor) {
                continue;
            }
            count += 1;
        }
        count
    }
}

/// Deterministic random source backing arena and spawn placement.
///
/// The algorithm is mulberry32 and its output stream is an external
/// contract: seeds shared between implementations reproduce identical arenas
/// only because these exact bit operations are preserved. Tests pin literal
/// output vectors.
#[derive(Clone, Debug)]
pub struct Mulberry32 {
    state: u32,
}

impl Mulberry32 {
    /// Creates a source seeded with the provided 32-bit value.
    #[must_use]
    pub const fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    /// Produces the next value in `[0, 1)`.
    pub fn next_unit(&mut self) -> f64 {
        self.state = self.state.wrapping_add(0x6d2b_79f5);
        let mut t = self.state;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        f64::from(t ^ (t >> 14)) / 4_294_967_296.0
    }

    /// Produces a uniform integer in `[0, bound)` as `floor(unit * bound)`.
    pub fn next_index(&mut self, bound: u32) -> u32 {
        (self.next_unit() * f64::from(bound)).floor() as u32
    }
}
