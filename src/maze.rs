use std::collections::BTreeMap;

use thiserror::Error;
use tracing::warn;

use crate::types::{Cell, CollectibleKind, GhostMode};

/// Built-in layout. `#` wall, `.` pellet, `o` power pellet, space empty floor,
/// `T` teleporter, `P` player spawn, `1`-`4` ghost homes (flee, pursue,
/// random, wall-follower).
pub const DEFAULT_LAYOUT: &str = "\
#####################
#o........#........o#
#.###.###.#.###.###.#
#...................#
#.###.#.#####.#.###.#
#.....#...#...#.....#
#####.###.#.###.#####
T    .#  1 2  #.    T
#####.# ##### #.#####
#.........3 4.......#
#.###.###.#.###.###.#
#o........P........o#
#.###.#########.###.#
#...................#
#####################";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MazeError {
    #[error("layout is empty")]
    Empty,
    #[error("row {row} has width {found}, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
    #[error("unknown tile {tile:?} at ({x}, {y})")]
    UnknownTile { tile: char, x: usize, y: usize },
    #[error("layout has no player spawn")]
    MissingPlayerSpawn,
    #[error("layout has more than one player spawn (second at ({x}, {y}))")]
    DuplicatePlayerSpawn { x: usize, y: usize },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tile {
    Wall,
    Floor,
    Teleporter,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GhostHome {
    pub mode: GhostMode,
    pub cell: Cell,
}

/// Static maze geometry plus the starting placement of collectibles and
/// actors. Never mutated once parsed.
#[derive(Clone, Debug, PartialEq)]
pub struct Maze {
    width: i32,
    height: i32,
    tiles: Vec<Tile>,
    collectibles: BTreeMap<Cell, CollectibleKind>,
    teleporters: Vec<Cell>,
    player_spawn: Cell,
    ghost_homes: Vec<GhostHome>,
}

impl Maze {
    pub fn parse(layout: &str) -> Result<Self, MazeError> {
        let rows: Vec<&str> = layout
            .lines()
            .map(|line| line.trim_end_matches('\r'))
            .filter(|line| !line.is_empty())
            .collect();
        let Some(first) = rows.first() else {
            return Err(MazeError::Empty);
        };
        let width = first.chars().count();

        let mut tiles = Vec::with_capacity(width * rows.len());
        let mut collectibles = BTreeMap::new();
        let mut teleporters = Vec::new();
        let mut player_spawn = None;
        let mut ghost_homes = Vec::new();

        for (y, row) in rows.iter().enumerate() {
            let found = row.chars().count();
            if found != width {
                return Err(MazeError::RaggedRow {
                    row: y,
                    expected: width,
                    found,
                });
            }
            for (x, tile) in row.chars().enumerate() {
                let cell = Cell::new(x as i32, y as i32);
                let kind = match tile {
                    '#' => Tile::Wall,
                    ' ' => Tile::Floor,
                    '.' => {
                        collectibles.insert(cell, CollectibleKind::Pellet);
                        Tile::Floor
                    }
                    'o' => {
                        collectibles.insert(cell, CollectibleKind::PowerPellet);
                        Tile::Floor
                    }
                    'T' => {
                        teleporters.push(cell);
                        Tile::Teleporter
                    }
                    'P' => {
                        if player_spawn.is_some() {
                            return Err(MazeError::DuplicatePlayerSpawn { x, y });
                        }
                        player_spawn = Some(cell);
                        Tile::Floor
                    }
                    other => match GhostMode::from_layout_char(other) {
                        Some(mode) => {
                            ghost_homes.push(GhostHome { mode, cell });
                            Tile::Floor
                        }
                        None => return Err(MazeError::UnknownTile { tile: other, x, y }),
                    },
                };
                tiles.push(kind);
            }
        }

        let player_spawn = player_spawn.ok_or(MazeError::MissingPlayerSpawn)?;
        if teleporters.len() % 2 == 1 {
            if let Some(last) = teleporters.last() {
                warn!(x = last.x, y = last.y, "teleporter has no partner and will stay inert");
            }
        }

        Ok(Self {
            width: width as i32,
            height: rows.len() as i32,
            tiles,
            collectibles,
            teleporters,
            player_spawn,
            ghost_homes,
        })
    }

    pub fn width(&self) -> i32 {
        self.width
    }

    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn tile(&self, cell: Cell) -> Tile {
        if cell.x < 0 || cell.y < 0 || cell.x >= self.width || cell.y >= self.height {
            return Tile::Wall;
        }
        self.tiles
            .get((cell.y * self.width + cell.x) as usize)
            .copied()
            .unwrap_or(Tile::Wall)
    }

    /// Cells outside the layout count as walls.
    pub fn is_wall(&self, cell: Cell) -> bool {
        self.tile(cell) == Tile::Wall
    }

    pub fn is_walkable(&self, cell: Cell) -> bool {
        !self.is_wall(cell)
    }

    pub fn collectibles(&self) -> &BTreeMap<Cell, CollectibleKind> {
        &self.collectibles
    }

    pub fn player_spawn(&self) -> Cell {
        self.player_spawn
    }

    pub fn ghost_homes(&self) -> &[GhostHome] {
        &self.ghost_homes
    }

    pub fn teleporters(&self) -> &[Cell] {
        &self.teleporters
    }

    /// Teleporters pair in reading order: first with second, third with
    /// fourth. An unpaired teleporter has no partner.
    pub fn teleport_partner(&self, cell: Cell) -> Option<Cell> {
        let idx = self.teleporters.iter().position(|t| *t == cell)?;
        let partner = idx ^ 1;
        self.teleporters.get(partner).copied()
    }

    pub fn centre(&self) -> (f32, f32) {
        (
            (self.width - 1) as f32 / 2.0,
            (self.height - 1) as f32 / 2.0,
        )
    }
}
