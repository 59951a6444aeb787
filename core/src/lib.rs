#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Theseus engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Level data lives here as well so that every
//! crate agrees on the grid, wall and position vocabulary.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Theseus and the Minotaur.";

/// Distance, in cells, under which an animated position counts as converged.
pub const MOVE_PRECISION: f32 = 0.001;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Loads the level stored at the provided catalog index.
    LoadLevel {
        /// Catalog index of the level to load.
        index: LevelIndex,
    },
    /// Restarts the current level from its spawn positions.
    Reload,
    /// Requests that Theseus moves by the provided delta, starting a round.
    MovePlayer {
        /// Requested displacement measured in whole cells.
        delta: StepDelta,
    },
    /// Skips Theseus' move while still letting the Minotaur respond.
    Wait,
    /// Rewinds both characters by one round.
    Undo,
    /// Suspends round logic and opens the level selection.
    Pause,
    /// Leaves the paused state and resumes play.
    Resume,
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that a level was (re)loaded and characters were placed at spawn.
    LevelLoaded {
        /// Catalog index of the loaded level.
        index: LevelIndex,
        /// Display name of the loaded level.
        name: String,
        /// Free-form description shown alongside the level.
        description: String,
        /// Dimensions of the loaded grid.
        size: GridSize,
    },
    /// Reports the current round number.
    RoundChanged {
        /// Round counter after the change.
        round: u32,
    },
    /// Announces a transition of the game state machine.
    GameStateChanged {
        /// State that became active.
        state: GameState,
    },
    /// Reports whether the undo action may currently be used.
    UndoAvailabilityChanged {
        /// Whether undo is available.
        available: bool,
    },
    /// Reports whether the world accepts new round requests.
    InputAvailabilityChanged {
        /// Whether moves, waits and reloads are currently accepted.
        available: bool,
    },
    /// Confirms that a character started animating a single-cell step.
    StepStarted {
        /// Character performing the step.
        character: Character,
        /// Cell occupied before the step.
        from: GridPosition,
        /// Cell occupied once the step completes.
        to: GridPosition,
    },
    /// Reports that a character's step sequence ended for the current round.
    MoveFinished {
        /// Character whose sequence ended.
        character: Character,
        /// Number of unit steps consumed by the sequence.
        steps: u32,
        /// Cell the character occupies at rest.
        position: GridPosition,
    },
    /// Confirms that a character is rewinding to a previously recorded cell.
    UndoStarted {
        /// Character being rewound.
        character: Character,
        /// Cell the character returns to.
        to: GridPosition,
    },
    /// Reports that a move or wait request was not accepted.
    MoveRejected {
        /// Specific reason the request was refused.
        reason: Rejection,
    },
    /// Reports that an undo request was not accepted.
    UndoRejected {
        /// Specific reason the request was refused.
        reason: Rejection,
    },
    /// Reports that a reload or level change was not accepted.
    ReloadRejected {
        /// Specific reason the request was refused.
        reason: Rejection,
    },
}

/// Reasons a request may be refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Rejection {
    /// The game is not in the [`GameState::Playing`] state.
    NotPlaying,
    /// A round is still being resolved.
    RoundInProgress,
    /// The character is still animating a previous step.
    MoverBusy,
    /// Undo is currently unavailable.
    UndoUnavailable,
    /// No level has been loaded yet.
    NoLevel,
}

/// States of the game flow.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum GameState {
    /// The player may move, wait and undo.
    #[default]
    Playing,
    /// Play is suspended while the level menu is open.
    Paused,
    /// Theseus reached the exit.
    Escaped,
    /// The Minotaur caught Theseus.
    Captured,
}

impl GameState {
    /// Reports whether the state ends the level attempt.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Escaped | Self::Captured)
    }
}

/// Characters that take part in a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Character {
    /// The player-controlled character.
    Theseus,
    /// The enemy that pursues Theseus.
    Minotaur,
}

/// Cardinal movement directions on the grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Movement toward increasing row indices.
    Up,
    /// Movement toward decreasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// Every direction in a stable order.
    pub const ALL: [Direction; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit displacement produced by a step in this direction.
    #[must_use]
    pub const fn delta(self) -> StepDelta {
        match self {
            Self::Up => StepDelta::new(0, 1),
            Self::Down => StepDelta::new(0, -1),
            Self::Left => StepDelta::new(-1, 0),
            Self::Right => StepDelta::new(1, 0),
        }
    }

    /// Direction that undoes a step in this direction.
    #[must_use]
    pub const fn opposite(self) -> Self {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }
}

/// Location of a single grid cell. Columns and rows start at one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    column: i32,
    row: i32,
}

impl GridPosition {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(column: i32, row: i32) -> Self {
        Self { column, row }
    }

    /// One-based column index of the cell.
    #[must_use]
    pub const fn column(&self) -> i32 {
        self.column
    }

    /// One-based row index of the cell.
    #[must_use]
    pub const fn row(&self) -> i32 {
        self.row
    }

    /// Cell adjacent to this one in the provided direction.
    #[must_use]
    pub const fn neighbor(self, direction: Direction) -> Self {
        self.offset(direction.delta())
    }

    /// Cell displaced from this one by the provided delta.
    #[must_use]
    pub const fn offset(self, delta: StepDelta) -> Self {
        Self {
            column: self.column.saturating_add(delta.columns()),
            row: self.row.saturating_add(delta.rows()),
        }
    }

    /// Computes the Manhattan distance between two positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPosition) -> u32 {
        self.column.abs_diff(other.column) + self.row.abs_diff(other.row)
    }
}

/// Displacement between two grid positions measured in whole cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct StepDelta {
    columns: i32,
    rows: i32,
}

impl StepDelta {
    /// Displacement that does not move.
    pub const ZERO: StepDelta = StepDelta::new(0, 0);

    /// Creates a new displacement.
    #[must_use]
    pub const fn new(columns: i32, rows: i32) -> Self {
        Self { columns, rows }
    }

    /// Displacement that leads from `from` to `to`.
    #[must_use]
    pub const fn between(from: GridPosition, to: GridPosition) -> Self {
        Self {
            columns: to.column().saturating_sub(from.column()),
            rows: to.row().saturating_sub(from.row()),
        }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn columns(&self) -> i32 {
        self.columns
    }

    /// Vertical component.
    #[must_use]
    pub const fn rows(&self) -> i32 {
        self.rows
    }

    /// Reports whether the displacement is empty.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.columns == 0 && self.rows == 0
    }

    /// Remaining displacement after taking one step in `direction`.
    #[must_use]
    pub const fn consume(self, direction: Direction) -> Self {
        let step = direction.delta();
        Self {
            columns: self.columns.saturating_sub(step.columns),
            rows: self.rows.saturating_sub(step.rows),
        }
    }
}

/// Dimensions of a level grid measured in cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    column: u32,
    row: u32,
}

impl GridSize {
    /// Creates a new grid size.
    #[must_use]
    pub const fn new(column: u32, row: u32) -> Self {
        Self { column, row }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.column
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.row
    }

    /// Reports whether the position lies inside `[1, size]` on both axes.
    #[must_use]
    pub fn contains(&self, position: GridPosition) -> bool {
        let column_ok = u32::try_from(position.column())
            .map_or(false, |column| column >= 1 && column <= self.column);
        let row_ok =
            u32::try_from(position.row()).map_or(false, |row| row >= 1 && row <= self.row);
        column_ok && row_ok
    }
}

/// Orientation of an interior wall segment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WallOrientation {
    /// Separates a cell from the cell directly above it.
    Horizontal,
    /// Separates a cell from the cell directly to its right.
    Vertical,
}

/// Barrier blocking the edge between two adjacent cells.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Wall {
    orientation: WallOrientation,
    position: GridPosition,
}

impl Wall {
    /// Creates a wall anchored at the provided cell.
    #[must_use]
    pub const fn new(orientation: WallOrientation, position: GridPosition) -> Self {
        Self {
            orientation,
            position,
        }
    }

    /// Orientation of the wall.
    #[must_use]
    pub const fn orientation(&self) -> WallOrientation {
        self.orientation
    }

    /// Cell the wall is anchored to.
    #[must_use]
    pub const fn position(&self) -> GridPosition {
        self.position
    }

    /// Reports whether the wall blocks a step from `from` in `direction`.
    ///
    /// A horizontal wall at `(c, r)` sits on the edge between `(c, r)` and
    /// `(c, r + 1)`; a vertical wall sits between `(c, r)` and `(c + 1, r)`.
    /// Both traversal directions across that edge are blocked.
    #[must_use]
    pub fn blocks(&self, from: GridPosition, direction: Direction) -> bool {
        let (near, far) = match self.orientation {
            WallOrientation::Horizontal => (Direction::Up, Direction::Down),
            WallOrientation::Vertical => (Direction::Right, Direction::Left),
        };
        (from == self.position && direction == near)
            || (from == self.position.neighbor(near) && direction == far)
    }
}

/// Static description of one level. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Level {
    name: String,
    #[serde(default)]
    description: String,
    size: GridSize,
    player: GridPosition,
    enemy: GridPosition,
    exit: GridPosition,
    #[serde(default)]
    walls: Vec<Wall>,
}

impl Level {
    /// Creates a level without interior walls or description.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        size: GridSize,
        player: GridPosition,
        enemy: GridPosition,
        exit: GridPosition,
    ) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            size,
            player,
            enemy,
            exit,
            walls: Vec::new(),
        }
    }

    /// Replaces the interior walls of the level.
    #[must_use]
    pub fn with_walls(mut self, walls: Vec<Wall>) -> Self {
        self.walls = walls;
        self
    }

    /// Replaces the description shown alongside the level.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Display name of the level.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Free-form description text.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Grid dimensions.
    #[must_use]
    pub const fn size(&self) -> GridSize {
        self.size
    }

    /// Spawn cell of Theseus.
    #[must_use]
    pub const fn player_start(&self) -> GridPosition {
        self.player
    }

    /// Spawn cell of the Minotaur.
    #[must_use]
    pub const fn enemy_start(&self) -> GridPosition {
        self.enemy
    }

    /// Cell Theseus must reach to escape.
    #[must_use]
    pub const fn exit(&self) -> GridPosition {
        self.exit
    }

    /// Interior walls in declaration order.
    #[must_use]
    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    /// Spawn cell of the provided character.
    #[must_use]
    pub const fn start_of(&self, character: Character) -> GridPosition {
        match character {
            Character::Theseus => self.player,
            Character::Minotaur => self.enemy,
        }
    }

    /// Checks that the level describes a playable grid.
    pub fn validate(&self) -> Result<(), LevelError> {
        if self.size.columns() == 0 || self.size.rows() == 0 {
            return Err(LevelError::EmptyGrid {
                name: self.name.clone(),
            });
        }

        let anchors = [
            ("player start", self.player),
            ("enemy start", self.enemy),
            ("exit", self.exit),
        ];
        for (role, position) in anchors {
            if !self.size.contains(position) {
                return Err(LevelError::OutOfBounds {
                    name: self.name.clone(),
                    role,
                    position,
                });
            }
        }

        for wall in &self.walls {
            if !self.size.contains(wall.position()) {
                return Err(LevelError::OutOfBounds {
                    name: self.name.clone(),
                    role: "wall",
                    position: wall.position(),
                });
            }
        }

        Ok(())
    }
}

/// Position of a level within a [`LevelCatalog`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct LevelIndex(u32);

impl LevelIndex {
    /// Creates a new level index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Ordered collection of levels supplied by the level data provider.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelCatalog {
    levels: Vec<Level>,
}

impl LevelCatalog {
    /// Creates a catalog, validating every level.
    pub fn new(levels: Vec<Level>) -> Result<Self, LevelError> {
        let catalog = Self { levels };
        catalog.validate()?;
        Ok(catalog)
    }

    /// Validates every level in the catalog.
    pub fn validate(&self) -> Result<(), LevelError> {
        self.levels.iter().try_for_each(Level::validate)
    }

    /// Retrieves the level stored at `index`.
    pub fn level(&self, index: LevelIndex) -> Result<&Level, LevelError> {
        usize::try_from(index.get())
            .ok()
            .and_then(|position| self.levels.get(position))
            .ok_or(LevelError::IndexOutOfRange {
                index: index.get(),
                count: self.levels.len(),
            })
    }

    /// Number of levels in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the catalog contains no levels.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Iterator over the levels in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &Level> {
        self.levels.iter()
    }
}

/// Configuration errors raised by level data.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LevelError {
    /// A level index does not exist in the catalog.
    #[error("level index {index} is out of range (catalog holds {count} levels)")]
    IndexOutOfRange {
        /// Requested index.
        index: u32,
        /// Number of levels available.
        count: usize,
    },
    /// A level declares a zero-sized grid.
    #[error("level '{name}' has an empty grid")]
    EmptyGrid {
        /// Name of the offending level.
        name: String,
    },
    /// A level places an anchor outside its grid.
    #[error("level '{name}' places its {role} at {position:?}, outside the grid")]
    OutOfBounds {
        /// Name of the offending level.
        name: String,
        /// Which anchor is misplaced.
        role: &'static str,
        /// Offending cell.
        position: GridPosition,
    },
}

/// Rule used to turn a requested delta into single-cell steps.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepPolicy {
    /// Step along the axis with the larger remaining delta, horizontal on ties.
    /// A blocked step ends the sequence.
    #[default]
    DominantAxis,
    /// Try the horizontal axis first and fall back to the vertical axis when
    /// the horizontal step is absent or blocked.
    HorizontalFirst,
}

/// Movement tuning for a single character.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MoverConfig {
    /// Animation speed measured in cells per second.
    pub speed: f32,
    /// Pause inserted after every completed step, in milliseconds.
    pub step_delay_ms: u64,
    /// Maximum number of unit steps consumed per round.
    pub moves_per_round: u32,
    /// Axis selection rule for each step.
    pub step_policy: StepPolicy,
}

impl MoverConfig {
    /// Pause inserted after every completed step.
    #[must_use]
    pub const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}

impl Default for MoverConfig {
    fn default() -> Self {
        Self {
            speed: 2.0,
            step_delay_ms: 250,
            moves_per_round: 1,
            step_policy: StepPolicy::DominantAxis,
        }
    }
}

/// Movement tuning for both characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CastConfig {
    /// Tuning applied to Theseus.
    pub theseus: MoverConfig,
    /// Tuning applied to the Minotaur.
    pub minotaur: MoverConfig,
}

impl CastConfig {
    /// Tuning applied to the provided character.
    #[must_use]
    pub const fn mover(&self, character: Character) -> MoverConfig {
        match character {
            Character::Theseus => self.theseus,
            Character::Minotaur => self.minotaur,
        }
    }
}
