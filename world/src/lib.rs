#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Theseus.
//!
//! The world owns the level catalog, both characters and the round
//! coordinator. Adapters drive it exclusively through [`apply`] and observe it
//! through the [`query`] module and the emitted events.

mod mover;
mod turn;

use std::time::Duration;

use log::{debug, info};
use theseus_core::{
    CastConfig, Character, Command, Event, GameState, GridPosition, LevelCatalog, LevelError,
    LevelIndex, Rejection, StepDelta, WELCOME_BANNER,
};
use theseus_system_movement::WallIndex;
use thiserror::Error;

use mover::Mover;
use turn::TurnCoordinator;

/// Fatal errors raised while applying commands.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum WorldError {
    /// The requested level could not be resolved from the catalog.
    #[error(transparent)]
    Level(#[from] LevelError),
}

/// Represents the authoritative Theseus world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    catalog: LevelCatalog,
    active: Option<ActiveLevel>,
    theseus: Mover,
    minotaur: Mover,
    coordinator: TurnCoordinator,
    tick_index: u64,
}

#[derive(Debug)]
struct ActiveLevel {
    index: LevelIndex,
    exit: GridPosition,
    walls: WallIndex,
}

impl World {
    /// Creates a world over the provided level catalog. No level is active
    /// until a [`Command::LoadLevel`] is applied.
    #[must_use]
    pub fn new(catalog: LevelCatalog, cast: CastConfig) -> Self {
        let origin = GridPosition::new(1, 1);
        Self {
            banner: WELCOME_BANNER,
            catalog,
            active: None,
            theseus: Mover::new(Character::Theseus, cast.mover(Character::Theseus), origin),
            minotaur: Mover::new(Character::Minotaur, cast.mover(Character::Minotaur), origin),
            coordinator: TurnCoordinator::new(),
            tick_index: 0,
        }
    }

    fn mover(&self, character: Character) -> &Mover {
        match character {
            Character::Theseus => &self.theseus,
            Character::Minotaur => &self.minotaur,
        }
    }

    fn load(&mut self, index: LevelIndex, out_events: &mut Vec<Event>) -> Result<(), WorldError> {
        if self.coordinator.is_busy() {
            out_events.push(Event::ReloadRejected {
                reason: Rejection::RoundInProgress,
            });
            return Ok(());
        }

        let level = self.catalog.level(index)?;
        info!("loading level {} ({})", index.get(), level.name());

        self.theseus.reset(level.start_of(Character::Theseus));
        self.minotaur.reset(level.start_of(Character::Minotaur));
        self.active = Some(ActiveLevel {
            index,
            exit: level.exit(),
            walls: WallIndex::build(level),
        });
        out_events.push(Event::LevelLoaded {
            index,
            name: level.name().to_owned(),
            description: level.description().to_owned(),
            size: level.size(),
        });
        self.coordinator.reset(out_events);
        Ok(())
    }

    fn begin_round(&mut self, delta: StepDelta, out_events: &mut Vec<Event>) {
        let Some(active) = self.active.as_ref() else {
            out_events.push(Event::MoveRejected {
                reason: Rejection::NoLevel,
            });
            return;
        };

        self.coordinator.begin_round(
            delta,
            &mut self.theseus,
            &mut self.minotaur,
            &active.walls,
            active.exit,
            out_events,
        );
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        let Some(active) = self.active.as_ref() else {
            return;
        };
        if self.coordinator.state() == GameState::Paused {
            return;
        }

        self.theseus.tick(dt, &active.walls, out_events);
        self.minotaur.tick(dt, &active.walls, out_events);
        self.coordinator.poll(
            &self.theseus,
            &mut self.minotaur,
            &active.walls,
            active.exit,
            out_events,
        );
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Refused requests are reported through rejection events. The only error is a
/// level that cannot be resolved from the catalog, which indicates corrupt
/// configuration.
pub fn apply(
    world: &mut World,
    command: Command,
    out_events: &mut Vec<Event>,
) -> Result<(), WorldError> {
    match command {
        Command::LoadLevel { index } => world.load(index, out_events)?,
        Command::Reload => {
            let current = world.active.as_ref().map(|active| active.index);
            match current {
                Some(index) => world.load(index, out_events)?,
                None => out_events.push(Event::ReloadRejected {
                    reason: Rejection::NoLevel,
                }),
            }
        }
        Command::MovePlayer { delta } => world.begin_round(delta, out_events),
        Command::Wait => world.begin_round(StepDelta::ZERO, out_events),
        Command::Undo => {
            if world.active.is_none() {
                out_events.push(Event::UndoRejected {
                    reason: Rejection::NoLevel,
                });
            } else {
                world
                    .coordinator
                    .undo(&mut world.theseus, &mut world.minotaur, out_events);
            }
        }
        Command::Pause => {
            if !world.coordinator.pause(out_events) {
                debug!("pause ignored in {:?}", world.coordinator.state());
            }
        }
        Command::Resume => {
            if !world.coordinator.resume(out_events) {
                debug!("resume ignored in {:?}", world.coordinator.state());
            }
        }
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            out_events.push(Event::TimeAdvanced { dt });
            world.advance(dt, out_events);
        }
    }
    Ok(())
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use theseus_core::{Character, GameState, GridPosition, Level, LevelCatalog, LevelIndex};

    use super::{mover::MoverPhase, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Provides read-only access to the level catalog.
    #[must_use]
    pub fn catalog(world: &World) -> &LevelCatalog {
        &world.catalog
    }

    /// Index of the active level, if any.
    #[must_use]
    pub fn level_index(world: &World) -> Option<LevelIndex> {
        world.active.as_ref().map(|active| active.index)
    }

    /// Data of the active level, if any.
    #[must_use]
    pub fn level(world: &World) -> Option<&Level> {
        let index = level_index(world)?;
        world.catalog.level(index).ok()
    }

    /// Current state of the game flow.
    #[must_use]
    pub fn game_state(world: &World) -> GameState {
        world.coordinator.state()
    }

    /// Rounds played since the level was loaded, net of undos.
    #[must_use]
    pub fn round(world: &World) -> u32 {
        world.coordinator.round()
    }

    /// Number of ticks applied since the world was created.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Reports whether an undo request would currently be accepted.
    #[must_use]
    pub fn undo_available(world: &World) -> bool {
        world.coordinator.undo_available()
    }

    /// Reports whether a move or wait request would currently start a round.
    #[must_use]
    pub fn input_available(world: &World) -> bool {
        world.active.is_some()
            && world.coordinator.state() == GameState::Playing
            && !world.coordinator.is_busy()
            && world.theseus.is_available()
    }

    /// Reports whether no round is in flight and both characters are at rest.
    #[must_use]
    pub fn is_settled(world: &World) -> bool {
        !world.coordinator.is_busy() && world.theseus.is_available() && world.minotaur.is_available()
    }

    /// Logical cell occupied by the character.
    #[must_use]
    pub fn position(world: &World, character: Character) -> GridPosition {
        world.mover(character).position()
    }

    /// Cell the character is currently heading to.
    #[must_use]
    pub fn target(world: &World, character: Character) -> GridPosition {
        world.mover(character).target()
    }

    /// Interpolated position of the character expressed in grid units.
    #[must_use]
    pub fn render_position(world: &World, character: Character) -> Vec2 {
        world.mover(character).render_position()
    }

    /// Reports whether the character is animating a step or its delay.
    #[must_use]
    pub fn is_animating(world: &World, character: Character) -> bool {
        world.mover(character).phase() != MoverPhase::Idle
    }

    /// Number of rounds recorded in the character's undo history.
    #[must_use]
    pub fn history_depth(world: &World, character: Character) -> usize {
        world.mover(character).history_depth()
    }
}
