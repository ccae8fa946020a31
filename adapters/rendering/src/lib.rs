#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared presentation contracts for tile crawl adapters.
//!
//! Nothing in this crate feeds back into the navigation core. The scene only
//! mirrors what the core announced through [`Event`]s, and the animator
//! decides when an adapter should send [`tile_crawl_core::Command::Arrive`].

use std::{collections::BTreeMap, error::Error, fmt};

use anyhow::Result as AnyResult;
use glam::Vec2;
use tile_crawl_core::{Connectivity, Coordinate, Direction, EncounterSpec, Event};

/// Distance under which the animator snaps onto its target.
pub const ARRIVAL_THRESHOLD: f32 = 0.01;

/// Converts a tile coordinate into a world-space position.
#[must_use]
pub fn world_position(coordinate: Coordinate) -> Vec2 {
    Vec2::new(coordinate.x() as f32, coordinate.y() as f32)
}

/// Horizontal orientation of the agent sprite.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Facing {
    /// Sprite mirrored to look left.
    Left,
    /// Sprite in its authored orientation.
    #[default]
    Right,
}

/// Moves the agent's rendered position toward the tile the core committed to.
#[derive(Clone, Debug, PartialEq)]
pub struct Animator {
    move_speed: f32,
    position: Vec2,
    target: Option<Vec2>,
    facing: Facing,
}

impl Animator {
    /// Default speed in world units per second.
    pub const DEFAULT_MOVE_SPEED: f32 = 2.0;

    /// Creates an animator resting on `start`.
    pub fn new(start: Coordinate, move_speed: f32) -> Result<Self, RenderingError> {
        if !move_speed.is_finite() || move_speed <= 0.0 {
            return Err(RenderingError::InvalidMoveSpeed { move_speed });
        }

        Ok(Self {
            move_speed,
            position: world_position(start),
            target: None,
            facing: Facing::default(),
        })
    }

    /// Starts animating toward `target`, entered by moving in `direction`.
    pub fn begin(&mut self, target: Coordinate, direction: Direction) {
        self.target = Some(world_position(target));
        match direction {
            Direction::Left => self.facing = Facing::Left,
            Direction::Right => self.facing = Facing::Right,
            Direction::Up | Direction::Down => {}
        }
    }

    /// Advances the animation by `delta_seconds`.
    ///
    /// Returns `true` exactly once per move, on the tick the agent reaches its
    /// target.
    pub fn tick(&mut self, delta_seconds: f32) -> bool {
        let Some(target) = self.target else {
            return false;
        };

        let step = self.move_speed * delta_seconds.max(0.0);
        let remaining = target - self.position;
        let distance = remaining.length();
        if distance <= step {
            self.position = target;
        } else {
            self.position += remaining / distance * step;
        }

        if self.position.distance(target) < ARRIVAL_THRESHOLD {
            self.position = target;
            self.target = None;
            return true;
        }

        false
    }

    /// Reports whether a move is still being animated.
    #[must_use]
    pub fn is_moving(&self) -> bool {
        self.target.is_some()
    }

    /// Current rendered position of the agent.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Current sprite orientation.
    #[must_use]
    pub fn facing(&self) -> Facing {
        self.facing
    }
}

/// Camera that trails the agent with exponential smoothing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FollowCamera {
    position: Vec2,
    offset: Vec2,
    smoothing: f32,
}

impl FollowCamera {
    /// Fraction of the remaining distance covered per update by default.
    pub const DEFAULT_SMOOTHING: f32 = 0.125;

    /// Creates a camera already settled on `target + offset`.
    #[must_use]
    pub fn new(target: Vec2, offset: Vec2) -> Self {
        Self {
            position: target + offset,
            offset,
            smoothing: Self::DEFAULT_SMOOTHING,
        }
    }

    /// Replaces the smoothing factor, clamped to `0.0..=1.0`.
    #[must_use]
    pub fn with_smoothing(mut self, smoothing: f32) -> Self {
        self.smoothing = smoothing.clamp(0.0, 1.0);
        self
    }

    /// Moves the camera toward `target + offset` and returns its new position.
    pub fn update(&mut self, target: Vec2) -> Vec2 {
        self.position = self.position.lerp(target + self.offset, self.smoothing);
        self.position
    }

    /// Current camera position.
    #[must_use]
    pub fn position(&self) -> Vec2 {
        self.position
    }
}

/// Transient presentation of a generated tile.
#[derive(Clone, Debug, PartialEq)]
pub struct TileInstance {
    /// Coordinate of the tile the instance mirrors.
    pub coordinate: Coordinate,
    /// Passages drawn on the instance.
    pub connectivity: Connectivity,
    /// Encounter markers drawn on the instance.
    pub encounters: Vec<EncounterSpec>,
}

/// Presentation-side mirror of the tiles the agent has seen.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    tile_size: u32,
    instances: BTreeMap<Coordinate, TileInstance>,
}

impl Scene {
    /// Creates an empty scene for tiles spaced `tile_size` world units apart.
    #[must_use]
    pub fn new(tile_size: u32) -> Self {
        Self {
            tile_size: tile_size.max(1),
            instances: BTreeMap::new(),
        }
    }

    /// Instantiates every tile announced by the provided events.
    ///
    /// Instances are keyed by coordinate, so re-entering a tile never spawns a
    /// second copy.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            if let Event::TileEntered {
                coordinate,
                connectivity,
                encounters,
                ..
            } = event
            {
                let _ = self
                    .instances
                    .entry(*coordinate)
                    .or_insert_with(|| TileInstance {
                        coordinate: *coordinate,
                        connectivity: *connectivity,
                        encounters: encounters.clone(),
                    });
            }
        }
    }

    /// Inserts an instance directly, replacing any previous one.
    pub fn insert(&mut self, instance: TileInstance) {
        let _ = self.instances.insert(instance.coordinate, instance);
    }

    /// Destroys every instance more than `radius_tiles` tiles away from
    /// `center` along either axis. Returns how many were removed.
    pub fn retain_within(&mut self, center: Coordinate, radius_tiles: u32) -> usize {
        let reach = i64::from(radius_tiles) * i64::from(self.tile_size);
        let before = self.instances.len();
        self.instances.retain(|coordinate, _| {
            let dx = (i64::from(coordinate.x()) - i64::from(center.x())).abs();
            let dy = (i64::from(coordinate.y()) - i64::from(center.y())).abs();
            dx <= reach && dy <= reach
        });
        before - self.instances.len()
    }

    /// Looks up the instance mirroring `coordinate`.
    #[must_use]
    pub fn get(&self, coordinate: Coordinate) -> Option<&TileInstance> {
        self.instances.get(&coordinate)
    }

    /// Iterates over instances ordered by coordinate.
    pub fn iter(&self) -> impl Iterator<Item = &TileInstance> {
        self.instances.values()
    }

    /// Number of live instances.
    #[must_use]
    pub fn len(&self) -> usize {
        self.instances.len()
    }

    /// Reports whether the scene holds no instances.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// Distance between neighbouring tiles in world units.
    #[must_use]
    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }
}

/// Everything a backend needs to draw one frame.
#[derive(Clone, Copy, Debug)]
pub struct Frame<'a> {
    /// Tiles currently instantiated.
    pub scene: &'a Scene,
    /// Tile the core considers the agent to occupy.
    pub agent: Coordinate,
    /// Animated agent position in world units.
    pub agent_position: Vec2,
    /// Agent sprite orientation.
    pub facing: Facing,
    /// Camera position in world units.
    pub camera: Vec2,
}

/// Trait implemented by presentation backends.
pub trait RenderingBackend {
    /// Draws a single frame.
    fn present(&mut self, frame: &Frame<'_>) -> AnyResult<()>;
}

/// Renders the scene as a character grid, north at the top.
///
/// Tiles occupy even columns and rows; the cells between them show open
/// passages. The agent's tile is drawn as `@`, tiles with encounters as `!`
/// and every other tile as `o`.
#[must_use]
pub fn ascii_map(scene: &Scene, agent: Coordinate) -> String {
    let tile_size = i64::from(scene.tile_size());
    let index = |coordinate: Coordinate| {
        (
            i64::from(coordinate.x()).div_euclid(tile_size),
            i64::from(coordinate.y()).div_euclid(tile_size),
        )
    };

    let Some((min_column, max_column, min_row, max_row)) =
        scene.iter().fold(None, |bounds, instance| {
            let (column, row) = index(instance.coordinate);
            Some(match bounds {
                None => (column, column, row, row),
                Some((left, right, bottom, top)) => (
                    column.min(left),
                    column.max(right),
                    row.min(bottom),
                    row.max(top),
                ),
            })
        })
    else {
        return String::new();
    };

    let width = usize::try_from((max_column - min_column) * 2 + 3).unwrap_or(0);
    let height = usize::try_from((max_row - min_row) * 2 + 3).unwrap_or(0);
    let mut grid = vec![vec![' '; width]; height];

    for instance in scene.iter() {
        let (column, row) = index(instance.coordinate);
        let x = usize::try_from((column - min_column) * 2 + 1).unwrap_or(0);
        let y = usize::try_from((max_row - row) * 2 + 1).unwrap_or(0);

        grid[y][x] = if instance.coordinate == agent {
            '@'
        } else if instance.encounters.is_empty() {
            'o'
        } else {
            '!'
        };

        for direction in instance.connectivity.open_directions() {
            match direction {
                Direction::Up => grid[y - 1][x] = '|',
                Direction::Down => grid[y + 1][x] = '|',
                Direction::Left => grid[y][x - 1] = '-',
                Direction::Right => grid[y][x + 1] = '-',
            }
        }
    }

    grid.into_iter()
        .map(|row| row.into_iter().collect::<String>().trim_end().to_owned())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Errors that can occur while configuring presentation helpers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum RenderingError {
    /// Move speed must be a positive finite number.
    InvalidMoveSpeed {
        /// Speed supplied by the caller.
        move_speed: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidMoveSpeed { move_speed } => {
                write!(
                    f,
                    "move speed must be positive and finite (received {move_speed})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
