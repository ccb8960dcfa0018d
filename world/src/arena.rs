//! Obstacle placement for a fresh arena.

use std::collections::HashSet;

use grid_chase_core::{GridPos, Mulberry32, ObstacleSet, GRID_SIZE, PLAYER_START, WALL_COUNT};

/// Draws obstacle cells until the arena holds its full complement.
///
/// Each attempt draws `x` then `y`. Draws landing on the player's start cell
/// or on an already placed obstacle are rejected but still consume the
/// random stream; the rejection order therefore shifts everything drawn
/// afterward and is part of the replay contract.
#[must_use]
pub fn build_obstacles(rng: &mut Mulberry32) -> ObstacleSet {
    let mut cells: HashSet<GridPos> = HashSet::with_capacity(WALL_COUNT);
    while cells.len() < WALL_COUNT {
        let x = rng.next_index(GRID_SIZE);
        let y = rng.next_index(GRID_SIZE);
        let cell = GridPos::new(x, y);
        if cell == PLAYER_START {
            continue;
        }
        let _ = cells.insert(cell);
    }
    ObstacleSet::from_cells(cells)
}

#[cfg(test)]
mod tests {
    use super::build_obstacles;
    use grid_chase_core::{GridPos, Mulberry32, PLAYER_START, WALL_COUNT};

    #[test]
    fn seed_12345_builds_the_reference_arena() {
        let mut rng = Mulberry32::new(12345);
        let obstacles = build_obstacles(&mut rng);
        assert_eq!(
            obstacles.sorted(),
            vec![
                GridPos::new(0, 7),
                GridPos::new(4, 3),
                GridPos::new(4, 8),
                GridPos::new(4, 9),
                GridPos::new(5, 3),
                GridPos::new(6, 2),
                GridPos::new(7, 8),
                GridPos::new(8, 9),
                GridPos::new(9, 3),
                GridPos::new(9, 8),
            ]
        );
    }

    #[test]
    fn arena_never_covers_the_player_start() {
        for seed in 0..64u32 {
            let mut rng = Mulberry32::new(seed);
            let obstacles = build_obstacles(&mut rng);
            assert_eq!(obstacles.len(), WALL_COUNT);
            assert!(!obstacles.contains(PLAYER_START), "seed {seed}");
        }
    }

    #[test]
    fn equal_seeds_build_equal_arenas() {
        let mut first = Mulberry32::new(777);
        let mut second = Mulberry32::new(777);
        assert_eq!(build_obstacles(&mut first), build_obstacles(&mut second));
    }
}
