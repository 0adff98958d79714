//! Wall probes against static maze geometry.
//!
//! Walls are unit squares centred on their cell coordinates, so a probe from
//! a cell centre meets the neighbouring wall face half a cell away.

use crate::constants::{PROBE_RANGE, PROBE_STEP};
use crate::maze::Maze;
use crate::types::{Direction, Vec2};

/// Whether a probe of length `range` cast from `origin` along `dir` touches
/// a wall. `Direction::None` casts nothing and is never blocked.
pub fn wall_ahead(maze: &Maze, origin: Vec2, dir: Direction, range: f32) -> bool {
    if dir.is_none() || range <= 0.0 {
        return false;
    }
    let step = dir.vector();
    let samples = (range / PROBE_STEP).ceil() as u32;
    (1..=samples).any(|i| {
        let t = (i as f32 * PROBE_STEP).min(range);
        maze.is_wall((origin + step * t).nearest_cell())
    })
}

pub fn open_directions(maze: &Maze, origin: Vec2) -> Vec<Direction> {
    Direction::ALL
        .into_iter()
        .filter(|dir| !wall_ahead(maze, origin, *dir, PROBE_RANGE))
        .collect()
}

pub fn open_direction_count(maze: &Maze, origin: Vec2) -> usize {
    Direction::ALL
        .into_iter()
        .filter(|dir| !wall_ahead(maze, origin, *dir, PROBE_RANGE))
        .count()
}

/// More than a straight corridor or a corner.
pub fn is_intersection(maze: &Maze, origin: Vec2) -> bool {
    open_direction_count(maze, origin) > 2
}
