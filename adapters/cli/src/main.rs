#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that drives Grid Chase sessions.

use std::io::{self, BufRead};

use anyhow::{bail, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand, ValueEnum};
use sha2::{Digest, Sha256};

use grid_chase_core::{DifficultyProfile, Direction, GridPos, MoveOutcome, TickOutcome, GRID_SIZE};
use grid_chase_system_pursuit::MovePlan;
use grid_chase_system_spawning::{spawn_interval, SpawnSchedule};
use grid_chase_world::{query, Session};

#[derive(Parser)]
#[command(name = "grid-chase", about = "Turn-based pursuit survival on a fixed grid")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Play one session with a scripted or interactive move sequence.
    Play(PlayArgs),
    /// Print the decaying spawn schedule for each difficulty.
    Schedule(ScheduleArgs),
}

#[derive(Args)]
struct PlayArgs {
    /// Explicit seed, for sharing or replaying a run.
    #[arg(long, conflicts_with = "daily")]
    seed: Option<u32>,
    /// Derive the seed from today's date; everyone playing today shares it.
    #[arg(long)]
    daily: bool,
    /// Difficulty preset.
    #[arg(long, value_enum, default_value = "standard")]
    difficulty: Difficulty,
    /// Scripted moves, one of N/S/W/E per character. Reads stdin when omitted.
    #[arg(long)]
    moves: Option<String>,
}

#[derive(Args)]
struct ScheduleArgs {
    /// Last turn included in the table.
    #[arg(long, default_value_t = 200)]
    horizon: u32,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Difficulty {
    Standard,
    Hard,
    Hardcore,
}

impl Difficulty {
    fn profile(self) -> DifficultyProfile {
        match self {
            Self::Standard => DifficultyProfile::standard(),
            Self::Hard => DifficultyProfile::hard(),
            Self::Hardcore => DifficultyProfile::hardcore(),
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Standard => "standard",
            Self::Hard => "hard",
            Self::Hardcore => "hardcore",
        }
    }
}

/// Entry point for the Grid Chase command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Play(args) => play(&args),
        Command::Schedule(args) => {
            schedule(&args);
            Ok(())
        }
    }
}

fn play(args: &PlayArgs) -> Result<()> {
    let seed = resolve_seed(args);
    let mut session = Session::new(seed, args.difficulty.profile());

    println!("seed {seed} ({})", args.difficulty.label());
    print_board(&session, None);

    match &args.moves {
        Some(script) => run_script(&mut session, script)?,
        None => run_interactive(&mut session)?,
    }

    match query::terminal_cause(&session) {
        Some(cause) => println!("{cause} after {} turns", query::turn(&session)),
        None => println!("session open after {} turns", query::turn(&session)),
    }
    println!("replay with --seed {seed}");
    Ok(())
}

fn resolve_seed(args: &PlayArgs) -> u32 {
    if let Some(seed) = args.seed {
        return seed;
    }
    if args.daily {
        return daily_seed();
    }
    Utc::now().timestamp_millis() as u32
}

/// Seed shared by every run started on the same calendar date.
fn daily_seed() -> u32 {
    let date = Utc::now().date_naive().to_string();
    let mut hasher = Sha256::new();
    hasher.update(date.as_bytes());
    let digest = hasher.finalize();
    let bytes: [u8; 4] = digest[0..4].try_into().expect("sha256 digest slice length");
    u32::from_le_bytes(bytes)
}

fn run_script(session: &mut Session, script: &str) -> Result<()> {
    for c in script.chars() {
        let direction = parse_direction(c)?;
        if step(session, direction)? {
            break;
        }
    }
    Ok(())
}

fn run_interactive(session: &mut Session) -> Result<()> {
    println!("moves: n/s/w/e, q to quit");
    let stdin = io::stdin();
    for line in stdin.lock().lines() {
        let line = line?;
        for c in line.trim().chars() {
            if c.eq_ignore_ascii_case(&'q') {
                return Ok(());
            }
            match parse_direction(c) {
                Ok(direction) => {
                    if step(session, direction)? {
                        return Ok(());
                    }
                }
                Err(error) => println!("{error}"),
            }
        }
    }
    Ok(())
}

/// Advances one turn; returns `true` once the session is over.
fn step(session: &mut Session, direction: Direction) -> Result<bool> {
    match session.apply_player_move(direction) {
        MoveOutcome::Rejected(reason) => {
            println!("move refused: {reason}");
            Ok(false)
        }
        MoveOutcome::Intercepted => Ok(true),
        MoveOutcome::Continuing => {
            let resolution = session.resolve_tick()?;
            print_turn(session, resolution.desired());
            Ok(matches!(
                resolution.outcome(),
                TickOutcome::Intercepted | TickOutcome::NoEscape
            ))
        }
    }
}

fn print_turn(session: &Session, intents: &[GridPos]) {
    println!("turn {}", query::turn(session));
    let profile = query::profile(session);
    if profile.show_intent_flash() {
        let rendered: Vec<String> = intents
            .iter()
            .map(|cell| format!("({},{})", cell.x(), cell.y()))
            .collect();
        println!("intents: {}", rendered.join(" "));
    }
    let forecast = profile.show_forecast().then(|| session.peek_forecast());
    print_board(session, forecast.as_ref());
    if profile.danger_feedback() {
        println!("escape options: {}", query::escape_options(session));
    }
}

fn print_board(session: &Session, forecast: Option<&MovePlan>) {
    let obstacles = query::obstacles(session);
    let agents = query::agent_view(session).cells();
    let marked: Vec<GridPos> = forecast.map_or_else(Vec::new, |plan| plan.desired().to_vec());

    for y in 0..GRID_SIZE {
        let mut row = String::with_capacity(GRID_SIZE as usize);
        for x in 0..GRID_SIZE {
            let cell = GridPos::new(x, y);
            let glyph = if cell == query::player(session) {
                '@'
            } else if agents.contains(&cell) {
                'a'
            } else if obstacles.contains(cell) {
                '#'
            } else if marked.contains(&cell) {
                '+'
            } else {
                '.'
            };
            row.push(glyph);
        }
        println!("{row}");
    }
}

fn parse_direction(c: char) -> Result<Direction> {
    match c.to_ascii_uppercase() {
        'N' => Ok(Direction::North),
        'S' => Ok(Direction::South),
        'W' => Ok(Direction::West),
        'E' => Ok(Direction::East),
        other => bail!("unknown move {other:?} (expected one of N, S, W, E)"),
    }
}

fn schedule(args: &ScheduleArgs) {
    for difficulty in [Difficulty::Standard, Difficulty::Hard, Difficulty::Hardcore] {
        let floor = difficulty.profile().spawn_floor();
        let mut schedule = SpawnSchedule::new();
        let mut rows = Vec::new();
        for turn in 0..=args.horizon {
            if schedule.due(turn) {
                rows.push(format!("{turn} (+{})", spawn_interval(turn, floor)));
                schedule.advance(turn, floor);
            }
        }
        println!(
            "{}: floor {floor}, spawns on turns {}",
            difficulty.label(),
            rows.join(", ")
        );
    }
}
