use grid_chase_core::{
    DifficultyProfile, Direction, GridPos, MoveOutcome, TickOutcome, GRID_SIZE,
};
use grid_chase_world::{query, Session};

const SEED: u32 = 12345;
const SCRIPT: &str = "SSSSENSEWNSNSNSNSNSN";

/// Expected state after each resolved turn of the scripted traversal:
/// agent cells in roster order, player cell, turn counter.
const EXPECTED: [(&[(u32, u32)], (u32, u32), u32); 20] = [
    (&[(0, 3), (0, 6)], (5, 6), 1),
    (&[(0, 4), (1, 6)], (5, 7), 2),
    (&[(0, 5), (1, 7)], (5, 8), 3),
    (&[(0, 6), (1, 8)], (5, 9), 4),
    (&[(1, 6), (1, 9)], (6, 9), 5),
    (&[(1, 7), (1, 8)], (6, 8), 6),
    (&[(1, 8), (1, 9)], (6, 9), 7),
    (&[(1, 9), (2, 9)], (7, 9), 8),
    (&[(2, 9), (3, 9)], (6, 9), 9),
    (&[(2, 8), (3, 8), (0, 5)], (6, 8), 10),
    (&[(2, 9), (3, 9), (0, 6)], (6, 9), 11),
    (&[(2, 8), (3, 8), (1, 6)], (6, 8), 12),
    (&[(2, 9), (3, 9), (1, 7)], (6, 9), 13),
    (&[(2, 8), (3, 8), (1, 8)], (6, 8), 14),
    (&[(2, 9), (3, 9), (1, 9)], (6, 9), 15),
    (&[(2, 8), (3, 8), (1, 8)], (6, 8), 16),
    (&[(2, 9), (3, 9), (1, 9)], (6, 9), 17),
    (&[(2, 8), (3, 8), (1, 8)], (6, 8), 18),
    (&[(2, 9), (3, 9), (1, 9), (0, 2)], (6, 9), 19),
    (&[(2, 8), (3, 8), (1, 8), (0, 3)], (6, 8), 20),
];

fn directions() -> Vec<Direction> {
    SCRIPT
        .chars()
        .map(|c| match c {
            'N' => Direction::North,
            'S' => Direction::South,
            'W' => Direction::West,
            'E' => Direction::East,
            other => panic!("unexpected script character {other}"),
        })
        .collect()
}

fn cells(pairs: &[(u32, u32)]) -> Vec<GridPos> {
    pairs.iter().map(|&(x, y)| GridPos::new(x, y)).collect()
}

fn assert_occupancy_invariants(session: &Session) {
    for (index, snapshot) in query::agent_view(session).iter().enumerate() {
        assert_eq!(snapshot.id.index(), index, "roster order drifted");
    }
    let agents = query::agent_view(session).cells();
    for (index, agent) in agents.iter().enumerate() {
        assert!(agent.x() < GRID_SIZE && agent.y() < GRID_SIZE, "out of bounds");
        assert!(
            !query::obstacles(session).contains(*agent),
            "agent {index} on an obstacle"
        );
        assert!(
            !agents[index + 1..].contains(agent),
            "two agents share {agent:?}"
        );
        assert_ne!(*agent, query::player(session), "agent on the player");
    }
}

#[test]
fn scripted_traversal_matches_the_pinned_trajectory() {
    let mut session = Session::new(SEED, DifficultyProfile::standard());

    for (direction, (agents, player, turn)) in directions().into_iter().zip(EXPECTED) {
        let roster_before = query::agent_view(&session).cells().len();
        assert_eq!(session.apply_player_move(direction), MoveOutcome::Continuing);
        let resolution = session.resolve_tick().expect("tick resolves");
        assert_eq!(resolution.outcome(), TickOutcome::Continuing);
        assert_eq!(resolution.desired().len(), roster_before);

        assert_eq!(query::agent_view(&session).cells(), cells(agents), "turn {turn}");
        assert_eq!(query::player(&session), GridPos::new(player.0, player.1));
        assert_eq!(query::turn(&session), turn);
        assert_occupancy_invariants(&session);
    }

    assert_eq!(query::terminal_cause(&session), None);
    assert_eq!(query::next_spawn_turn(&session), 27);
}

#[test]
fn replays_of_the_same_seed_are_identical() {
    let trace_a = replay_trace();
    let trace_b = replay_trace();
    assert_eq!(trace_a, trace_b, "replay diverged between runs");
}

fn replay_trace() -> Vec<(Vec<GridPos>, Vec<GridPos>, GridPos, u32)> {
    let mut session = Session::new(SEED, DifficultyProfile::standard());
    let mut trace = Vec::new();
    for direction in directions() {
        assert_eq!(session.apply_player_move(direction), MoveOutcome::Continuing);
        let resolution = session.resolve_tick().expect("tick resolves");
        trace.push((
            resolution.desired().to_vec(),
            query::agent_view(&session).cells(),
            query::player(&session),
            query::turn(&session),
        ));
    }
    trace
}

#[test]
fn agent_count_never_decreases() {
    let mut session = Session::new(SEED, DifficultyProfile::standard());
    let mut previous = query::agent_view(&session).cells().len();
    for direction in directions() {
        assert_eq!(session.apply_player_move(direction), MoveOutcome::Continuing);
        let _ = session.resolve_tick().expect("tick resolves");
        let count = query::agent_view(&session).cells().len();
        assert!(count >= previous);
        previous = count;
    }
    // Spawns landed on turns 10 and 19 for this seed and script.
    assert_eq!(previous, 4);
}

#[test]
fn coexisting_sessions_do_not_interfere() {
    let mut solo = Session::new(SEED, DifficultyProfile::standard());
    let mut paired_a = Session::new(SEED, DifficultyProfile::standard());
    let mut paired_b = Session::new(SEED, DifficultyProfile::hardcore());

    for direction in directions() {
        assert_eq!(solo.apply_player_move(direction), MoveOutcome::Continuing);
        let _ = solo.resolve_tick().expect("tick resolves");
    }

    // Interleave a second session between every step of the first.
    for direction in directions() {
        assert_eq!(paired_a.apply_player_move(direction), MoveOutcome::Continuing);
        let _ = paired_a.resolve_tick().expect("tick resolves");
        if paired_b.apply_player_move(direction) == MoveOutcome::Continuing {
            let _ = paired_b.resolve_tick().expect("tick resolves");
        }
    }

    assert_eq!(
        query::agent_view(&solo).into_vec(),
        query::agent_view(&paired_a).into_vec()
    );
    assert_eq!(query::player(&solo), query::player(&paired_a));
    assert_eq!(query::turn(&solo), query::turn(&paired_a));
}
