#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system translating polled adapter snapshots into world commands.

use glam::Vec2;
use theseus_core::{Command, Event, GameState, LevelIndex, StepDelta, MOVE_PRECISION};

/// Input snapshot distilled from adapter-provided frame input data.
///
/// Only the latest snapshot matters; the controller keeps no input queue.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct InputSnapshot {
    /// Requested movement in grid units, positive `y` pointing up.
    pub movement: Vec2,
    /// Whether the player pressed undo on this frame.
    pub undo: bool,
    /// Whether the player pressed reload on this frame.
    pub reload: bool,
    /// Whether the player pressed wait on this frame.
    pub wait: bool,
    /// Whether the player asked to open the level menu.
    pub pause: bool,
    /// Whether the player asked to close the level menu.
    pub resume: bool,
    /// Level picked from the menu on this frame, if any.
    pub select_level: Option<LevelIndex>,
}

/// Controller system that gates input on the availability announced by the world.
#[derive(Debug, Clone)]
pub struct Controller {
    state: GameState,
    input_available: bool,
    undo_available: bool,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    /// Creates a controller that accepts nothing until a level is loaded.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            state: GameState::Playing,
            input_available: false,
            undo_available: false,
        }
    }

    /// Consumes world events and the frame's input to emit commands.
    pub fn handle(&mut self, events: &[Event], input: InputSnapshot, out: &mut Vec<Command>) {
        for event in events {
            match event {
                Event::GameStateChanged { state } => self.state = *state,
                Event::InputAvailabilityChanged { available } => {
                    self.input_available = *available;
                }
                Event::UndoAvailabilityChanged { available } => {
                    self.undo_available = *available;
                }
                _ => {}
            }
        }

        if self.state != GameState::Playing {
            if let Some(index) = input.select_level {
                out.push(Command::LoadLevel { index });
            } else if input.resume && !self.state.is_terminal() {
                out.push(Command::Resume);
            }
            return;
        }

        if input.pause {
            if self.input_available {
                out.push(Command::Pause);
            }
            return;
        }

        if input.undo {
            if self.undo_available {
                out.push(Command::Undo);
            }
            return;
        }
        if !self.input_available {
            return;
        }
        if input.reload {
            out.push(Command::Reload);
        } else if input.wait {
            out.push(Command::Wait);
        } else if let Some(delta) = movement_delta(input.movement) {
            out.push(Command::MovePlayer { delta });
        }
    }
}

/// Rounds an analog movement vector to a grid delta.
///
/// Returns `None` when the vector is too small to count as a request or rounds
/// to zero on both axes.
#[must_use]
pub fn movement_delta(movement: Vec2) -> Option<StepDelta> {
    if movement.length_squared() <= MOVE_PRECISION {
        return None;
    }
    let rounded = movement.round();
    let delta = StepDelta::new(rounded.x as i32, rounded.y as i32);
    (!delta.is_zero()).then_some(delta)
}
