#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic pursuit planning system.
//!
//! For each agent, independently and in roster order, the planner scores the
//! four cardinal neighbors against the player's position, then turns the
//! per-agent desired moves into a legal simultaneous move set: a single-pass
//! vacancy correction, direct swap legalization, and destination-conflict
//! arbitration. The planner is pure — it consumes an immutable board view,
//! draws no randomness, and mutates nothing.

use grid_chase_core::{AgentId, BoardView, DifficultyProfile, GridPos, GRID_SIZE};

/// Outcome of one planning pass over the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MovePlan {
    desired: Vec<GridPos>,
    resolved: Vec<GridPos>,
}

impl MovePlan {
    /// Per-agent intended destinations before conflict arbitration, exposed
    /// for presentation.
    #[must_use]
    pub fn desired(&self) -> &[GridPos] {
        &self.desired
    }

    /// Per-agent final destinations after arbitration, applied atomically by
    /// the session.
    #[must_use]
    pub fn resolved(&self) -> &[GridPos] {
        &self.resolved
    }

    /// Consumes the plan, yielding the desired and resolved sets.
    #[must_use]
    pub fn into_parts(self) -> (Vec<GridPos>, Vec<GridPos>) {
        (self.desired, self.resolved)
    }
}

/// Plans one simultaneous move set for every agent on the board.
#[must_use]
pub fn plan(board: &BoardView<'_>, profile: &DifficultyProfile) -> MovePlan {
    let current = board.agents();
    let occupancy = OccupancyIndex::from_agents(current);

    let mut desired: Vec<GridPos> = Vec::with_capacity(current.len());
    for (index, agent) in current.iter().enumerate() {
        desired.push(select_desired(board, profile, &occupancy, index, *agent));
    }

    apply_vacancy_correction(current, &occupancy, &mut desired);

    let mut resolved: Vec<GridPos> = current.to_vec();
    let finalized = legalize_swaps(current, &desired, &mut resolved);
    arbitrate_collisions(board.player(), current, &desired, &finalized, &mut resolved);

    MovePlan { desired, resolved }
}

/// Dense cell-to-agent index rebuilt once per planning pass.
///
/// All occupancy decisions within a pass read this single index so the
/// scoring, vacancy, swap, and collision stages agree on who stands where.
#[derive(Clone, Debug)]
struct OccupancyIndex {
    cells: Vec<Option<AgentId>>,
}

impl OccupancyIndex {
    fn from_agents(agents: &[GridPos]) -> Self {
        let mut cells = vec![None; (GRID_SIZE * GRID_SIZE) as usize];
        for (index, cell) in agents.iter().enumerate() {
            cells[Self::index_of(*cell)] = Some(AgentId::new(index as u32));
        }
        Self { cells }
    }

    fn occupant(&self, cell: GridPos) -> Option<AgentId> {
        self.cells.get(Self::index_of(cell)).copied().flatten()
    }

    fn index_of(cell: GridPos) -> usize {
        (cell.y() * GRID_SIZE + cell.x()) as usize
    }
}

#[derive(Clone, Copy, Debug)]
struct Candidate {
    cell: GridPos,
    score: f64,
    distance: u32,
}

impl Candidate {
    fn is_better_than(&self, other: &Candidate) -> bool {
        // Scores compare with exact equality; epsilon tolerance would change
        // tie-break outcomes between replays.
        self.score > other.score
            || (self.score == other.score && self.distance < other.distance)
    }
}

fn select_desired(
    board: &BoardView<'_>,
    profile: &DifficultyProfile,
    occupancy: &OccupancyIndex,
    index: usize,
    agent: GridPos,
) -> GridPos {
    let mut best: Option<Candidate> = None;

    // Cells occupied by other agents stay legal candidates here; occupancy
    // conflicts are resolved by the later passes, which is what allows two
    // agents to exchange cells.
    for target in agent.neighbors() {
        if board.obstacles().contains(target) {
            continue;
        }

        let candidate = Candidate {
            cell: target,
            score: score_move(board, profile, occupancy, index, target),
            distance: target.manhattan_distance(board.player()),
        };
        best = Some(match best {
            None => candidate,
            Some(existing) => {
                if candidate.is_better_than(&existing) {
                    candidate
                } else {
                    existing
                }
            }
        });
    }

    best.map_or(agent, |candidate| candidate.cell)
}

fn score_move(
    board: &BoardView<'_>,
    profile: &DifficultyProfile,
    occupancy: &OccupancyIndex,
    index: usize,
    target: GridPos,
) -> f64 {
    let player = board.player();
    let distance_term = -f64::from(target.manhattan_distance(player));

    // Hypothetical occupancy: this agent stands on `target`, everyone else on
    // their current cell.
    let mut escape_options = 0u32;
    for neighbor in player.neighbors() {
        if board.obstacles().contains(neighbor) {
            continue;
        }
        let occupied = neighbor == target
            || matches!(occupancy.occupant(neighbor), Some(id) if id.index() != index);
        if !occupied {
            escape_options += 1;
        }
    }
    let escape_penalty = profile.escape_weight() * f64::from(escape_options);

    let adjacent_to_player = target.manhattan_distance(player) == 1;
    let vacant = !board.obstacles().contains(target)
        && target != player
        && !matches!(occupancy.occupant(target), Some(id) if id.index() != index);
    let gap_bonus = if adjacent_to_player && vacant {
        profile.gap_fill_weight()
    } else {
        0.0
    };

    distance_term - escape_penalty + gap_bonus
}

/// Reverts any move into a cell whose occupant is not vacating it.
///
/// Runs exactly once against a snapshot of the desired set; chains of three
/// or more mutually blocking agents are not re-resolved.
fn apply_vacancy_correction(
    current: &[GridPos],
    occupancy: &OccupancyIndex,
    desired: &mut [GridPos],
) {
    let snapshot = desired.to_vec();
    for index in 0..current.len() {
        let target = snapshot[index];
        let Some(occupant) = occupancy.occupant(target) else {
            continue;
        };
        let other = occupant.index();
        if other == index {
            continue;
        }
        if snapshot[other] == current[other] {
            desired[index] = current[index];
        }
    }
}

/// Approves direct pairwise exchanges and marks both participants final.
///
/// A swap stands only when each agent's desired cell is exactly the other's
/// current cell and no third agent desires either of the two cells.
fn legalize_swaps(current: &[GridPos], desired: &[GridPos], resolved: &mut [GridPos]) -> Vec<bool> {
    let count = current.len();
    let mut finalized = vec![false; count];

    for first in 0..count {
        for second in (first + 1)..count {
            if finalized[first] || finalized[second] {
                continue;
            }
            if desired[first] != current[second] || desired[second] != current[first] {
                continue;
            }
            let contested = (0..count).any(|third| {
                third != first
                    && third != second
                    && (desired[third] == current[first] || desired[third] == current[second])
            });
            if contested {
                continue;
            }
            resolved[first] = desired[first];
            resolved[second] = desired[second];
            finalized[first] = true;
            finalized[second] = true;
        }
    }

    finalized
}

/// Grants each contested destination to the claimant closest to the player,
/// ties to the smallest roster index; losers forfeit the move this tick.
fn arbitrate_collisions(
    player: GridPos,
    current: &[GridPos],
    desired: &[GridPos],
    finalized: &[bool],
    resolved: &mut [GridPos],
) {
    let mut claims: Vec<(GridPos, Vec<usize>)> = Vec::new();
    for index in 0..current.len() {
        if finalized[index] {
            continue;
        }
        match claims.iter_mut().find(|(cell, _)| *cell == desired[index]) {
            Some((_, claimants)) => claimants.push(index),
            None => claims.push((desired[index], vec![index])),
        }
    }

    for (_, claimants) in &claims {
        let winner = match claimants.as_slice() {
            [only] => *only,
            _ => {
                let mut winner = claimants[0];
                let mut best_distance = current[winner].manhattan_distance(player);
                for &claimant in &claimants[1..] {
                    let distance = current[claimant].manhattan_distance(player);
                    if distance < best_distance {
                        winner = claimant;
                        best_distance = distance;
                    }
                }
                winner
            }
        };
        resolved[winner] = desired[winner];
    }
}
