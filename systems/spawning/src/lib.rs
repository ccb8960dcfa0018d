#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic spawn placement and scheduling system.
//!
//! New agents enter the arena on boundary tiles. Placement filters the edge
//! down to a safe set, prefers the edges opposite the player, and draws
//! uniformly from the session's random source. The schedule half tracks the
//! decaying interval between spawns.

use grid_chase_core::{BoardView, GridPos, Mulberry32, FIRST_SPAWN_TURN, GRID_SIZE};

/// Selects an entry cell for a new agent, or `None` when no safe tile
/// exists.
///
/// Callers treat `None` as a skipped spawn, not an error. The safe-set scan
/// runs row-major (y outer, x inner); the enumeration order feeds the
/// uniform index draw and is part of the replay contract. No randomness is
/// consumed when the safe set is empty.
#[must_use]
pub fn find_spawn_tile(board: &BoardView<'_>, rng: &mut Mulberry32) -> Option<GridPos> {
    let safe = safe_tiles(board);
    if safe.is_empty() {
        return None;
    }

    let player = board.player();
    let preferred: Vec<GridPos> = safe
        .iter()
        .copied()
        .filter(|tile| is_preferred(*tile, player))
        .collect();
    let pool = if preferred.is_empty() { &safe } else { &preferred };
    let index = rng.next_index(pool.len() as u32) as usize;
    Some(pool[index])
}

/// Edge tiles that are free and keep a buffer of at least one cell to the
/// player and to every agent.
fn safe_tiles(board: &BoardView<'_>) -> Vec<GridPos> {
    let player = board.player();
    let mut tiles = Vec::new();
    for y in 0..GRID_SIZE {
        for x in 0..GRID_SIZE {
            let cell = GridPos::new(x, y);
            if !cell.is_edge() {
                continue;
            }
            if board.obstacles().contains(cell) {
                continue;
            }
            if board.agents().contains(&cell) {
                continue;
            }
            if cell == player {
                continue;
            }
            if cell.manhattan_distance(player) <= 1 {
                continue;
            }
            if board
                .agents()
                .iter()
                .any(|agent| cell.manhattan_distance(*agent) <= 1)
            {
                continue;
            }
            tiles.push(cell);
        }
    }
    tiles
}

/// Edges opposite the player, chosen independently per axis.
fn is_preferred(cell: GridPos, player: GridPos) -> bool {
    const MIDLINE: u32 = GRID_SIZE / 2;
    (player.x() < MIDLINE && cell.x() == GRID_SIZE - 1)
        || (player.x() >= MIDLINE && cell.x() == 0)
        || (player.y() < MIDLINE && cell.y() == GRID_SIZE - 1)
        || (player.y() >= MIDLINE && cell.y() == 0)
}

/// Interval until the next spawn after a spawn attempt on `turn`.
///
/// The decay is `floor(10 - turn / 15)` clamped below by the spawn floor;
/// the integer form stays exact past turn 150.
#[must_use]
pub fn spawn_interval(turn: u32, spawn_floor: u32) -> u32 {
    let decayed = (150 - i64::from(turn)).div_euclid(15);
    decayed.max(i64::from(spawn_floor)) as u32
}

/// Tracks the turn on which the scheduler next attempts a spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnSchedule {
    next_spawn_turn: u32,
}

impl SpawnSchedule {
    /// Creates a schedule with the first attempt on the standard turn.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            next_spawn_turn: FIRST_SPAWN_TURN,
        }
    }

    /// Turn of the next spawn attempt.
    #[must_use]
    pub const fn next_spawn_turn(&self) -> u32 {
        self.next_spawn_turn
    }

    /// Reports whether a spawn attempt is due on the provided turn.
    #[must_use]
    pub const fn due(&self, turn: u32) -> bool {
        turn >= self.next_spawn_turn
    }

    /// Advances the threshold after an attempt on `turn`, whether or not a
    /// tile was found, so a failed attempt is not retried immediately.
    pub fn advance(&mut self, turn: u32, spawn_floor: u32) {
        self.next_spawn_turn += spawn_interval(turn, spawn_floor);
    }
}

impl Default for SpawnSchedule {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use grid_chase_core::ObstacleSet;

    fn board_parts(
        walls: &[(u32, u32)],
        agents: &[(u32, u32)],
    ) -> (ObstacleSet, Vec<GridPos>) {
        let obstacles =
            ObstacleSet::from_cells(walls.iter().map(|&(x, y)| GridPos::new(x, y)).collect());
        let agents = agents.iter().map(|&(x, y)| GridPos::new(x, y)).collect();
        (obstacles, agents)
    }

    #[test]
    fn interval_decays_and_respects_the_floor() {
        assert_eq!(spawn_interval(0, 3), 10);
        assert_eq!(spawn_interval(15, 3), 9);
        assert_eq!(spawn_interval(30, 3), 8);
        assert_eq!(spawn_interval(150, 3), 3);
        assert_eq!(spawn_interval(16, 1), 8);
        assert_eq!(spawn_interval(149, 1), 1);
        assert_eq!(spawn_interval(300, 1), 1);
    }

    #[test]
    fn schedule_advances_by_the_decaying_interval() {
        let mut schedule = SpawnSchedule::new();
        assert!(!schedule.due(9));
        assert!(schedule.due(10));

        schedule.advance(10, 3);
        assert_eq!(schedule.next_spawn_turn(), 19);
        schedule.advance(19, 3);
        assert_eq!(schedule.next_spawn_turn(), 27);
    }

    #[test]
    fn safe_set_spans_the_free_edge_for_a_center_player() {
        let (obstacles, agents) = board_parts(&[], &[]);
        let board = BoardView::new(&obstacles, &agents, GridPos::new(5, 5));
        assert_eq!(safe_tiles(&board).len(), 36);
    }

    #[test]
    fn safe_set_excludes_cells_near_player_and_agents() {
        let (obstacles, agents) = board_parts(&[(9, 0)], &[(0, 2)]);
        let board = BoardView::new(&obstacles, &agents, GridPos::new(0, 5));
        let safe = safe_tiles(&board);
        // Obstacle corner, the agent plus its two edge neighbors, and the
        // player plus its two edge neighbors are all carved out of the 36.
        assert_eq!(safe.len(), 36 - 1 - 3 - 3);
        assert!(!safe.contains(&GridPos::new(9, 0)));
        assert!(!safe.contains(&GridPos::new(0, 1)));
        assert!(!safe.contains(&GridPos::new(0, 2)));
        assert!(!safe.contains(&GridPos::new(0, 3)));
        assert!(!safe.contains(&GridPos::new(0, 4)));
        assert!(!safe.contains(&GridPos::new(0, 5)));
        assert!(!safe.contains(&GridPos::new(0, 6)));
    }

    #[test]
    fn safe_scan_runs_row_major() {
        let (obstacles, agents) = board_parts(&[], &[]);
        let board = BoardView::new(&obstacles, &agents, GridPos::new(5, 5));
        let safe = safe_tiles(&board);
        assert_eq!(safe[0], GridPos::new(0, 0));
        assert_eq!(safe[1], GridPos::new(1, 0));
        let mut sorted = safe.clone();
        sorted.sort_by_key(|cell| (cell.y(), cell.x()));
        assert_eq!(safe, sorted);
    }

    #[test]
    fn draws_land_on_the_opposite_edges() {
        let (obstacles, agents) = board_parts(&[], &[]);
        // Player in the upper-left quadrant: the far column and bottom row
        // are preferred.
        let board = BoardView::new(&obstacles, &agents, GridPos::new(2, 2));
        for seed in 0..32u32 {
            let mut rng = Mulberry32::new(seed);
            let tile = find_spawn_tile(&board, &mut rng).expect("spawn tile");
            assert!(
                tile.x() == GRID_SIZE - 1 || tile.y() == GRID_SIZE - 1,
                "tile {tile:?} is not on a preferred edge",
            );
        }
    }

    #[test]
    fn falls_back_to_the_full_safe_set_when_preference_is_blocked() {
        // Player in the center biases toward the x = 0 column and y = 0 row;
        // wall both off entirely.
        let mut walls: Vec<(u32, u32)> = (0..GRID_SIZE).map(|y| (0, y)).collect();
        walls.extend((1..GRID_SIZE).map(|x| (x, 0)));
        let (obstacles, agents) = board_parts(&walls, &[]);
        let board = BoardView::new(&obstacles, &agents, GridPos::new(5, 5));
        let mut rng = Mulberry32::new(7);
        let tile = find_spawn_tile(&board, &mut rng).expect("spawn tile");
        assert!(tile.x() == GRID_SIZE - 1 || tile.y() == GRID_SIZE - 1);
    }

    #[test]
    fn empty_safe_set_skips_the_spawn_without_consuming_randomness() {
        let walls: Vec<(u32, u32)> = (0..GRID_SIZE)
            .flat_map(|i| [(0, i), (GRID_SIZE - 1, i), (i, 0), (i, GRID_SIZE - 1)])
            .collect();
        let (obstacles, agents) = board_parts(&walls, &[]);
        let board = BoardView::new(&obstacles, &agents, GridPos::new(5, 5));

        let mut rng = Mulberry32::new(99);
        let mut untouched = rng.clone();
        assert_eq!(find_spawn_tile(&board, &mut rng), None);
        assert_eq!(rng.next_unit(), untouched.next_unit());
    }
}
