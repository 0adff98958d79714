use crate::constants::PROBE_RANGE;
use crate::maze::{Maze, Tile};
use crate::rng::Rng;
use crate::spatial::{is_intersection, wall_ahead};
use crate::types::{Cell, Direction, GhostMode, GhostState, GhostView, Vec2};

pub mod decision;
mod state;

pub use self::decision::{choose_direction, random_open_direction};
pub use self::state::StateChange;

/// Arrival tolerance when accumulating fractional cell progress.
const ARRIVAL_EPSILON: f32 = 1e-4;

#[derive(Clone, Debug)]
pub struct Ghost {
    pub(crate) id: usize,
    pub(crate) mode: GhostMode,
    pub(crate) state: GhostState,
    pub(crate) direction: Direction,
    pub(crate) previous_direction: Direction,
    pub(crate) position: Vec2,
    pub(crate) home: Cell,
    from: Cell,
    to: Cell,
    progress: f32,
    respawn_in_ms: Option<u64>,
}

impl Ghost {
    pub fn new(id: usize, mode: GhostMode, home: Cell) -> Self {
        Self {
            id,
            mode,
            state: GhostState::Walking,
            direction: Direction::None,
            previous_direction: Direction::None,
            position: home.center(),
            home,
            from: home,
            to: home,
            progress: 0.0,
            respawn_in_ms: None,
        }
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn mode(&self) -> GhostMode {
        self.mode
    }

    pub fn state(&self) -> GhostState {
        self.state
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn previous_direction(&self) -> Direction {
        self.previous_direction
    }

    pub fn position(&self) -> Vec2 {
        self.position
    }

    pub fn home(&self) -> Cell {
        self.home
    }

    pub fn is_respawning(&self) -> bool {
        self.respawn_in_ms.is_some()
    }

    /// Puts the ghost on a cell centre, between moves.
    pub(crate) fn place_at(&mut self, cell: Cell) {
        self.from = cell;
        self.to = cell;
        self.progress = 0.0;
        self.position = cell.center();
    }

    /// Advances one tick. Returns a state change when a dead ghost finishes
    /// its respawn delay.
    pub(crate) fn advance(
        &mut self,
        maze: &Maze,
        player: Vec2,
        rng: &mut Rng,
        dt_ms: u64,
    ) -> Option<StateChange> {
        if self.state == GhostState::Dead {
            return self.update_dead(maze, rng, dt_ms);
        }

        let mut budget = self.state.speed() * dt_ms as f32 / 1000.0;
        let mut safety = 0;
        while budget > 0.0 {
            safety += 1;
            if safety > 8 {
                break;
            }
            if self.from == self.to {
                self.position = self.from.center();
                if self.needs_decision(maze) {
                    choose_direction(self, maze, player, rng);
                }
                if self.direction.is_none()
                    || wall_ahead(maze, self.position, self.direction, PROBE_RANGE)
                {
                    break;
                }
                self.to = self.from.step(self.direction);
                self.progress = 0.0;
            }

            let remaining = 1.0 - self.progress;
            if budget + ARRIVAL_EPSILON < remaining {
                self.progress += budget;
                budget = 0.0;
            } else {
                budget = (budget - remaining).max(0.0);
                self.from = self.to;
                self.progress = 0.0;
                if maze.tile(self.from) == Tile::Teleporter {
                    if let Some(partner) = maze.teleport_partner(self.from) {
                        self.place_at(partner);
                    }
                }
            }
        }
        self.position = self.from.center().lerp(self.to.center(), self.progress);
        None
    }

    fn needs_decision(&self, maze: &Maze) -> bool {
        self.direction.is_none()
            || wall_ahead(maze, self.position, self.direction, PROBE_RANGE)
            || is_intersection(maze, self.position)
    }

    pub fn view(&self, player: Vec2) -> GhostView {
        GhostView {
            id: self.id,
            mode: self.mode,
            state: self.state,
            x: self.position.x,
            y: self.position.y,
            dir: self.direction,
            facing: facing_toward(self.position, player),
        }
    }
}

/// Dominant-axis heading from `from` toward `target`.
pub fn facing_toward(from: Vec2, target: Vec2) -> Direction {
    let delta = target - from;
    if delta.x == 0.0 && delta.y == 0.0 {
        return Direction::None;
    }
    if delta.x.abs() > delta.y.abs() {
        if delta.x > 0.0 {
            Direction::Right
        } else {
            Direction::Left
        }
    } else if delta.y > 0.0 {
        Direction::Down
    } else {
        Direction::Up
    }
}
