use std::ops::{Add, Mul, Sub};

use serde::Serialize;

use crate::constants::{
    GHOST_DEAD_SPEED, GHOST_RECOVERING_SPEED, GHOST_SCARED_SPEED, GHOST_WALKING_SPEED,
};
use crate::events::GameEvent;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    None,
}

impl Direction {
    /// Enumeration order used by every scan over the four headings.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    pub fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
            Self::None => Self::None,
        }
    }

    /// Unit step in grid space. Rows grow downward, so `Up` is `-y`.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Self::Up => (0, -1),
            Self::Down => (0, 1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
            Self::None => (0, 0),
        }
    }

    pub fn vector(self) -> Vec2 {
        let (dx, dy) = self.delta();
        Vec2::new(dx as f32, dy as f32)
    }

    pub fn is_none(self) -> bool {
        self == Self::None
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y).sqrt()
    }

    pub fn distance(self, other: Vec2) -> f32 {
        (self - other).length()
    }

    pub fn lerp(self, target: Vec2, t: f32) -> Vec2 {
        let t = t.clamp(0.0, 1.0);
        self + (target - self) * t
    }

    /// Grid cell whose centre is nearest to this point.
    pub fn nearest_cell(self) -> Cell {
        Cell::new(self.x.round() as i32, self.y.round() as i32)
    }
}

impl Add for Vec2 {
    type Output = Vec2;

    fn add(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;

    fn sub(self, other: Vec2) -> Vec2 {
        Vec2::new(self.x - other.x, self.y - other.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;

    fn mul(self, factor: f32) -> Vec2 {
        Vec2::new(self.x * factor, self.y * factor)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn step(self, dir: Direction) -> Cell {
        let (dx, dy) = dir.delta();
        Cell::new(self.x + dx, self.y + dy)
    }

    pub fn center(self) -> Vec2 {
        Vec2::new(self.x as f32, self.y as f32)
    }
}

/// Movement strategy of a ghost, fixed at spawn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostMode {
    Flee,
    Pursue,
    Random,
    WallFollower,
}

impl GhostMode {
    pub fn from_layout_char(value: char) -> Option<Self> {
        match value {
            '1' => Some(Self::Flee),
            '2' => Some(Self::Pursue),
            '3' => Some(Self::Random),
            '4' => Some(Self::WallFollower),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GhostState {
    Walking,
    Scared,
    Recovering,
    Dead,
}

impl GhostState {
    /// Cells per second.
    pub fn speed(self) -> f32 {
        match self {
            Self::Walking => GHOST_WALKING_SPEED,
            Self::Scared => GHOST_SCARED_SPEED,
            Self::Recovering => GHOST_RECOVERING_SPEED,
            Self::Dead => GHOST_DEAD_SPEED,
        }
    }

    pub fn is_vulnerable(self) -> bool {
        matches!(self, Self::Scared | Self::Recovering)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackKind {
    Pellet,
    PowerPellet,
    Banana,
    WallCollision,
    Death,
    GhostMusicNormal,
    GhostMusicScared,
    GhostMusicDead,
    GhostMusicStop,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CollectibleKind {
    Pellet,
    PowerPellet,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RoundPhase {
    Ready,
    Playing,
    Over,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GameOverReason {
    Cleared,
    OutOfLives,
}

#[derive(Clone, Debug, Serialize)]
pub struct GameConfig {
    #[serde(rename = "tickRate")]
    pub tick_rate: u32,
    #[serde(rename = "initialLives")]
    pub initial_lives: u32,
    #[serde(rename = "powerDurationMs")]
    pub power_duration_ms: u64,
    #[serde(rename = "recoveringWindowMs")]
    pub recovering_window_ms: u64,
    #[serde(rename = "ghostRespawnDelayMs")]
    pub ghost_respawn_delay_ms: u64,
    #[serde(rename = "playerRespawnDelayMs")]
    pub player_respawn_delay_ms: u64,
    #[serde(rename = "teleportCooldownMs")]
    pub teleport_cooldown_ms: u64,
    #[serde(rename = "bonusSpawnIntervalMs")]
    pub bonus_spawn_interval_ms: u64,
    #[serde(rename = "playerSpeed")]
    pub player_speed: f32,
}

/// Score, lives and collection progress for the running round.
#[derive(Clone, Debug, Serialize)]
pub struct RoundState {
    pub score: u32,
    pub lives: u32,
    pub collected: u32,
    #[serde(rename = "totalCollectibles")]
    pub total_collectibles: u32,
    #[serde(rename = "elapsedMs")]
    pub elapsed_ms: u64,
    pub phase: RoundPhase,
    #[serde(rename = "endReason")]
    pub end_reason: Option<GameOverReason>,
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub requested: Direction,
    #[serde(rename = "inTransit")]
    pub in_transit: bool,
    pub respawning: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct GhostView {
    pub id: usize,
    pub mode: GhostMode,
    pub state: GhostState,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    /// Direction the ghost's eyes face: the dominant axis toward the player.
    pub facing: Direction,
}

#[derive(Clone, Debug, Serialize)]
pub struct BonusView {
    pub id: u64,
    pub x: f32,
    pub y: f32,
}

#[derive(Clone, Debug, Serialize)]
pub struct CollectibleView {
    pub x: i32,
    pub y: i32,
    pub kind: CollectibleKind,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub round: RoundState,
    #[serde(rename = "highScore")]
    pub high_score: u32,
    #[serde(rename = "ghostTimerSeconds")]
    pub ghost_timer_seconds: f32,
    pub player: PlayerView,
    pub ghosts: Vec<GhostView>,
    pub bonuses: Vec<BonusView>,
    pub collectibles: Vec<CollectibleView>,
    pub events: Vec<GameEvent>,
}
