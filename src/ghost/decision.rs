use crate::constants::PROBE_RANGE;
use crate::maze::Maze;
use crate::rng::Rng;
use crate::spatial::wall_ahead;
use crate::types::{Direction, GhostMode, Vec2};

use super::Ghost;

const WALL_FOLLOW_ORDER: [Direction; 4] = [
    Direction::Right,
    Direction::Down,
    Direction::Left,
    Direction::Up,
];

/// Picks the ghost's next heading by its strategy and records it as the
/// previous direction for the next decision.
///
/// Only called when the ghost is blocked ahead or standing on an
/// intersection. Flee, pursue and random keep the current heading (and so
/// stall) when nothing but a reversal is open; the wall-follower alone may
/// reverse out of a dead end.
pub fn choose_direction(ghost: &mut Ghost, maze: &Maze, player: Vec2, rng: &mut Rng) -> Direction {
    let origin = ghost.position;
    let candidates = candidates(maze, origin, ghost.previous_direction);
    let chosen = match ghost.mode {
        GhostMode::Flee => farthest_from(origin, player, &candidates).unwrap_or(ghost.direction),
        GhostMode::Pursue => closest_to(origin, player, &candidates).unwrap_or(ghost.direction),
        GhostMode::Random => rng.pick(&candidates).copied().unwrap_or(ghost.direction),
        GhostMode::WallFollower => follow_wall(ghost, maze, &candidates),
    };
    ghost.direction = chosen;
    ghost.previous_direction = chosen;
    chosen
}

/// Open headings from `origin`, in enumeration order, excluding the reverse
/// of `previous`.
fn candidates(maze: &Maze, origin: Vec2, previous: Direction) -> Vec<Direction> {
    let reverse = previous.opposite();
    Direction::ALL
        .into_iter()
        .filter(|dir| reverse.is_none() || *dir != reverse)
        .filter(|dir| !wall_ahead(maze, origin, *dir, PROBE_RANGE))
        .collect()
}

fn farthest_from(origin: Vec2, target: Vec2, candidates: &[Direction]) -> Option<Direction> {
    let mut best: Option<(Direction, f32)> = None;
    for dir in candidates {
        let distance = (origin + dir.vector()).distance(target);
        match best {
            Some((_, best_distance)) if distance <= best_distance => {}
            _ => best = Some((*dir, distance)),
        }
    }
    best.map(|(dir, _)| dir)
}

fn closest_to(origin: Vec2, target: Vec2, candidates: &[Direction]) -> Option<Direction> {
    let mut best: Option<(Direction, f32)> = None;
    for dir in candidates {
        let distance = (origin + dir.vector()).distance(target);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((*dir, distance)),
        }
    }
    best.map(|(dir, _)| dir)
}

fn follow_wall(ghost: &Ghost, maze: &Maze, candidates: &[Direction]) -> Direction {
    if let Some(dir) = WALL_FOLLOW_ORDER
        .into_iter()
        .find(|dir| candidates.contains(dir))
    {
        return dir;
    }
    // Dead end: the reverse is the only heading the filter removed.
    let reverse = ghost.previous_direction.opposite();
    if !reverse.is_none() && !wall_ahead(maze, ghost.position, reverse, PROBE_RANGE) {
        return reverse;
    }
    ghost.direction
}

/// Heading for a freshly spawned or respawned ghost: any open direction.
pub fn random_open_direction(ghost: &mut Ghost, maze: &Maze, rng: &mut Rng) -> Direction {
    let open = candidates(maze, ghost.position, Direction::None);
    let chosen = rng.pick(&open).copied().unwrap_or(Direction::None);
    ghost.direction = chosen;
    ghost.previous_direction = chosen;
    chosen
}
