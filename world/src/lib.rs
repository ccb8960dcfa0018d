#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative session state for Grid Chase.
//!
//! A [`Session`] owns everything mutable about one run: the arena, the agent
//! roster, the player, the turn and spawn counters, and the session's random
//! source. Exactly one transition is driven from outside — accept a player
//! move, then resolve one scheduler tick. Planning is delegated to the pure
//! pursuit system and placement to the spawning system; this crate sequences
//! them and enforces the turn cycle.

pub mod arena;

use grid_chase_core::{
    BoardView, DifficultyProfile, Direction, GridPos, MoveOutcome, MoveRejection, Mulberry32,
    ObstacleSet, TerminalCause, TickError, TickOutcome, INITIAL_AGENT_COUNT, PLAYER_START,
};
use grid_chase_system_pursuit::{self as pursuit, MovePlan};
use grid_chase_system_spawning::{self as spawning, SpawnSchedule};

/// Phase of a session's turn cycle.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the player's next move.
    AwaitingMove,
    /// A move was accepted; input stays locked until the tick resolves.
    PlanningMoves,
    /// The session reached a terminal state; only a new session leaves it.
    Terminated,
}

/// Result of resolving one tick, carrying the intent set for presentation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickResolution {
    outcome: TickOutcome,
    desired: Vec<GridPos>,
}

impl TickResolution {
    /// Outcome of the scheduler transition.
    #[must_use]
    pub const fn outcome(&self) -> TickOutcome {
        self.outcome
    }

    /// Pre-arbitration desired moves, one per agent in roster order.
    #[must_use]
    pub fn desired(&self) -> &[GridPos] {
        &self.desired
    }
}

/// Authoritative state of one pursuit run.
///
/// Sessions are plain values: several may coexist, and a restart or replay
/// simply constructs a fresh one from a fresh or repeated seed.
#[derive(Clone, Debug)]
pub struct Session {
    seed: u32,
    profile: DifficultyProfile,
    obstacles: ObstacleSet,
    agents: Vec<GridPos>,
    player: GridPos,
    turn: u32,
    schedule: SpawnSchedule,
    escape_options: u32,
    phase: Phase,
    terminal_cause: Option<TerminalCause>,
    rng: Mulberry32,
}

impl Session {
    /// Builds the arena, places the initial agents, and returns a session
    /// ready for the first player move.
    #[must_use]
    pub fn new(seed: u32, profile: DifficultyProfile) -> Self {
        let mut rng = Mulberry32::new(seed);
        let obstacles = arena::build_obstacles(&mut rng);
        let player = PLAYER_START;

        let mut agents: Vec<GridPos> = Vec::with_capacity(INITIAL_AGENT_COUNT);
        for _ in 0..INITIAL_AGENT_COUNT {
            let tile = {
                let board = BoardView::new(&obstacles, &agents, player);
                spawning::find_spawn_tile(&board, &mut rng)
            };
            if let Some(tile) = tile {
                agents.push(tile);
            }
        }

        let escape_options = BoardView::new(&obstacles, &agents, player).player_escape_options();

        Self {
            seed,
            profile,
            obstacles,
            agents,
            player,
            turn: 0,
            schedule: SpawnSchedule::new(),
            escape_options,
            phase: Phase::AwaitingMove,
            terminal_cause: None,
            rng,
        }
    }

    /// Submits one player move.
    ///
    /// Rejections leave the session untouched. Stepping onto an agent ends
    /// the session immediately; the pursuit planner is not consulted. An
    /// accepted move locks input until [`Session::resolve_tick`] (or the
    /// plan/commit pair) completes the tick.
    pub fn apply_player_move(&mut self, direction: Direction) -> MoveOutcome {
        match self.phase {
            Phase::Terminated => return MoveOutcome::Rejected(MoveRejection::SessionOver),
            Phase::PlanningMoves => {
                return MoveOutcome::Rejected(MoveRejection::TickInProgress)
            }
            Phase::AwaitingMove => {}
        }

        let Some(target) = self.player.offset(direction) else {
            return MoveOutcome::Rejected(MoveRejection::OutOfBounds);
        };
        if self.obstacles.contains(target) {
            return MoveOutcome::Rejected(MoveRejection::Obstacle);
        }

        self.player = target;
        if self.agents.contains(&target) {
            self.phase = Phase::Terminated;
            self.terminal_cause = Some(TerminalCause::Intercepted);
            return MoveOutcome::Intercepted;
        }

        self.phase = Phase::PlanningMoves;
        MoveOutcome::Continuing
    }

    /// Plans the pending tick without mutating the session.
    ///
    /// Split from [`Session::commit_tick`] so a presentation layer can insert
    /// its own timing between revealing the intent set and applying the
    /// arbitrated moves; the simulation itself is oblivious to time.
    pub fn plan_tick(&self) -> Result<MovePlan, TickError> {
        if self.phase != Phase::PlanningMoves {
            return Err(TickError::NoMovePending);
        }
        Ok(self.peek_forecast())
    }

    /// Applies a plan produced by [`Session::plan_tick`] for the current
    /// board and runs the scheduler transition.
    pub fn commit_tick(&mut self, plan: &MovePlan) -> Result<TickOutcome, TickError> {
        if self.phase != Phase::PlanningMoves {
            return Err(TickError::NoMovePending);
        }

        self.agents = plan.resolved().to_vec();

        if self.agents.contains(&self.player) {
            self.phase = Phase::Terminated;
            self.terminal_cause = Some(TerminalCause::Intercepted);
            return Ok(TickOutcome::Intercepted);
        }

        self.escape_options =
            BoardView::new(&self.obstacles, &self.agents, self.player).player_escape_options();
        if self.escape_options == 0 {
            self.phase = Phase::Terminated;
            self.terminal_cause = Some(TerminalCause::NoEscape);
            return Ok(TickOutcome::NoEscape);
        }

        self.turn += 1;
        if self.schedule.due(self.turn) {
            let tile = {
                let board = BoardView::new(&self.obstacles, &self.agents, self.player);
                spawning::find_spawn_tile(&board, &mut self.rng)
            };
            // A skipped spawn still advances the threshold so the next
            // attempt is not immediate.
            if let Some(tile) = tile {
                self.agents.push(tile);
            }
            self.schedule.advance(self.turn, self.profile.spawn_floor());
        }

        self.phase = Phase::AwaitingMove;
        Ok(TickOutcome::Continuing)
    }

    /// Resolves the pending tick in one step, yielding the outcome plus the
    /// desired-move set for presentation.
    pub fn resolve_tick(&mut self) -> Result<TickResolution, TickError> {
        let plan = self.plan_tick()?;
        let outcome = self.commit_tick(&plan)?;
        let (desired, _) = plan.into_parts();
        Ok(TickResolution { outcome, desired })
    }

    /// Previews what the pursuit planner would choose on the current board.
    ///
    /// Read-only: consumes no randomness and never mutates the session, so
    /// repeated calls return identical plans and leave every subsequent tick
    /// unchanged.
    #[must_use]
    pub fn peek_forecast(&self) -> MovePlan {
        let board = BoardView::new(&self.obstacles, &self.agents, self.player);
        pursuit::plan(&board, &self.profile)
    }
}

/// Query functions that provide read-only access to session state.
pub mod query {
    use grid_chase_core::{AgentId, DifficultyProfile, GridPos, ObstacleSet, TerminalCause};

    use super::{Phase, Session};

    /// Seed the session was created from.
    #[must_use]
    pub fn seed(session: &Session) -> u32 {
        session.seed
    }

    /// Difficulty configuration in effect for the session.
    #[must_use]
    pub fn profile(session: &Session) -> &DifficultyProfile {
        &session.profile
    }

    /// Cell currently occupied by the player.
    #[must_use]
    pub fn player(session: &Session) -> GridPos {
        session.player
    }

    /// Obstacle cells of the arena.
    #[must_use]
    pub fn obstacles(session: &Session) -> &ObstacleSet {
        &session.obstacles
    }

    /// Captures a read-only view of the agent roster.
    #[must_use]
    pub fn agent_view(session: &Session) -> AgentView {
        let snapshots = session
            .agents
            .iter()
            .enumerate()
            .map(|(index, cell)| AgentSnapshot {
                id: AgentId::new(index as u32),
                cell: *cell,
            })
            .collect();
        AgentView { snapshots }
    }

    /// Number of completed turns.
    #[must_use]
    pub fn turn(session: &Session) -> u32 {
        session.turn
    }

    /// Turn on which the scheduler next attempts a spawn.
    #[must_use]
    pub fn next_spawn_turn(session: &Session) -> u32 {
        session.schedule.next_spawn_turn()
    }

    /// Player escape options as of the last completed transition.
    #[must_use]
    pub fn escape_options(session: &Session) -> u32 {
        session.escape_options
    }

    /// Current phase of the turn cycle.
    #[must_use]
    pub fn phase(session: &Session) -> Phase {
        session.phase
    }

    /// Cause recorded when the session terminated, if it has.
    #[must_use]
    pub fn terminal_cause(session: &Session) -> Option<TerminalCause> {
        session.terminal_cause
    }

    /// Read-only snapshot of all agents in roster order.
    #[derive(Clone, Debug, PartialEq, Eq)]
    pub struct AgentView {
        snapshots: Vec<AgentSnapshot>,
    }

    impl AgentView {
        /// Iterator over the captured snapshots in roster order.
        pub fn iter(&self) -> impl Iterator<Item = &AgentSnapshot> {
            self.snapshots.iter()
        }

        /// Consumes the view, yielding the underlying snapshots.
        #[must_use]
        pub fn into_vec(self) -> Vec<AgentSnapshot> {
            self.snapshots
        }

        /// Agent cells in roster order.
        #[must_use]
        pub fn cells(&self) -> Vec<GridPos> {
            self.snapshots.iter().map(|snapshot| snapshot.cell).collect()
        }
    }

    /// Immutable representation of a single agent used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct AgentSnapshot {
        /// Stable spawn-order identifier of the agent.
        pub id: AgentId,
        /// Cell currently occupied by the agent.
        pub cell: GridPos,
    }
}
