//! Per-character movement, animation and undo history.

use std::{collections::VecDeque, time::Duration};

use glam::Vec2;
use log::debug;
use theseus_core::{Character, Event, GridPosition, MoverConfig, StepDelta, MOVE_PRECISION};
use theseus_system_movement::{resolve_step, StepOutcome, WallIndex};

/// Animation phase of a mover.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MoverPhase {
    /// At rest on its logical cell.
    Idle,
    /// Animating toward the target cell.
    Stepping,
    /// Arrived; waiting out the inter-step delay.
    Settling {
        /// Delay left before the mover is at rest.
        remaining: Duration,
    },
}

#[derive(Clone, Copy, Debug)]
struct MoveSequence {
    remaining: StepDelta,
    steps_left: u32,
    steps_taken: u32,
}

/// Moves one character across the grid a single cell at a time.
#[derive(Clone, Debug)]
pub(crate) struct Mover {
    character: Character,
    config: MoverConfig,
    position: GridPosition,
    target: GridPosition,
    render: Vec2,
    phase: MoverPhase,
    sequence: Option<MoveSequence>,
    history: Vec<GridPosition>,
    pending_undo: VecDeque<GridPosition>,
}

impl Mover {
    pub(crate) fn new(character: Character, config: MoverConfig, spawn: GridPosition) -> Self {
        Self {
            character,
            config,
            position: spawn,
            target: spawn,
            render: to_render(spawn),
            phase: MoverPhase::Idle,
            sequence: None,
            history: Vec::new(),
            pending_undo: VecDeque::new(),
        }
    }

    /// Places the mover on `spawn` and forgets every recorded round.
    pub(crate) fn reset(&mut self, spawn: GridPosition) {
        self.position = spawn;
        self.target = spawn;
        self.render = to_render(spawn);
        self.phase = MoverPhase::Idle;
        self.sequence = None;
        self.history.clear();
        self.pending_undo.clear();
    }

    pub(crate) fn position(&self) -> GridPosition {
        self.position
    }

    pub(crate) fn target(&self) -> GridPosition {
        self.target
    }

    pub(crate) fn render_position(&self) -> Vec2 {
        self.render
    }

    pub(crate) fn phase(&self) -> MoverPhase {
        self.phase
    }

    pub(crate) fn history_depth(&self) -> usize {
        self.history.len()
    }

    /// Reports whether the mover can accept a new move.
    pub(crate) fn is_available(&self) -> bool {
        self.phase == MoverPhase::Idle && self.sequence.is_none() && self.pending_undo.is_empty()
    }

    /// Starts a move sequence toward `delta`.
    ///
    /// Returns `false` without touching any state when the mover is busy.
    /// An accepted request records the current cell for undo even when no
    /// step ends up being taken.
    pub(crate) fn request_move(
        &mut self,
        delta: StepDelta,
        walls: &WallIndex,
        out_events: &mut Vec<Event>,
    ) -> bool {
        if !self.is_available() {
            return false;
        }

        debug!("{:?} requested move by {:?}", self.character, delta);
        self.history.push(self.position);
        self.sequence = Some(MoveSequence {
            remaining: delta,
            steps_left: self.config.moves_per_round,
            steps_taken: 0,
        });
        self.advance_sequence(walls, out_events);
        true
    }

    /// Rewinds the mover by one recorded round.
    ///
    /// The rewind starts immediately when the mover is at rest and is queued
    /// otherwise. Returns whether further undos remain.
    pub(crate) fn undo(&mut self, out_events: &mut Vec<Event>) -> bool {
        if let Some(previous) = self.history.pop() {
            debug!("undo on {:?} to {:?}", self.character, previous);
            if self.is_available() {
                self.begin_rewind(previous, out_events);
            } else {
                self.pending_undo.push_back(previous);
            }
        }
        !self.history.is_empty()
    }

    /// Advances the animation by `dt`.
    pub(crate) fn tick(&mut self, dt: Duration, walls: &WallIndex, out_events: &mut Vec<Event>) {
        match self.phase {
            MoverPhase::Idle => {}
            MoverPhase::Stepping => {
                let destination = to_render(self.target);
                let max_delta = if self.config.speed > 0.0 {
                    self.config.speed * dt.as_secs_f32()
                } else {
                    f32::INFINITY
                };
                self.render = move_towards(self.render, destination, max_delta);

                if self.render.distance(destination) <= MOVE_PRECISION {
                    self.render = destination;
                    self.position = self.target;
                    let delay = self.config.step_delay();
                    if delay.is_zero() {
                        self.come_to_rest(walls, out_events);
                    } else {
                        self.phase = MoverPhase::Settling { remaining: delay };
                    }
                }
            }
            MoverPhase::Settling { remaining } => {
                let remaining = remaining.saturating_sub(dt);
                if remaining.is_zero() {
                    self.come_to_rest(walls, out_events);
                } else {
                    self.phase = MoverPhase::Settling { remaining };
                }
            }
        }
    }

    fn come_to_rest(&mut self, walls: &WallIndex, out_events: &mut Vec<Event>) {
        self.phase = MoverPhase::Idle;
        if self.sequence.is_some() {
            self.advance_sequence(walls, out_events);
        }
        if self.phase == MoverPhase::Idle {
            if let Some(previous) = self.pending_undo.pop_front() {
                self.begin_rewind(previous, out_events);
            }
        }
    }

    fn advance_sequence(&mut self, walls: &WallIndex, out_events: &mut Vec<Event>) {
        let Some(mut sequence) = self.sequence else {
            return;
        };

        let outcome = if sequence.steps_left == 0 {
            StepOutcome::Exhausted
        } else {
            let from = self.position;
            resolve_step(sequence.remaining, self.config.step_policy, |direction| {
                walls.can_step(from, direction)
            })
        };

        match outcome {
            StepOutcome::Step(direction) => {
                sequence.remaining = sequence.remaining.consume(direction);
                sequence.steps_left -= 1;
                sequence.steps_taken += 1;
                self.sequence = Some(sequence);
                self.target = self.position.neighbor(direction);
                self.phase = MoverPhase::Stepping;
                out_events.push(Event::StepStarted {
                    character: self.character,
                    from: self.position,
                    to: self.target,
                });
            }
            StepOutcome::Blocked | StepOutcome::Exhausted => {
                if outcome == StepOutcome::Blocked {
                    debug!(
                        "{:?} blocked at {:?}, forfeiting {:?}",
                        self.character, self.position, sequence.remaining
                    );
                }
                self.sequence = None;
                out_events.push(Event::MoveFinished {
                    character: self.character,
                    steps: sequence.steps_taken,
                    position: self.position,
                });
            }
        }
    }

    fn begin_rewind(&mut self, previous: GridPosition, out_events: &mut Vec<Event>) {
        self.target = previous;
        self.phase = MoverPhase::Stepping;
        out_events.push(Event::UndoStarted {
            character: self.character,
            to: previous,
        });
    }
}

/// Continuous position of a cell centre in grid units.
pub(crate) fn to_render(position: GridPosition) -> Vec2 {
    Vec2::new(position.column() as f32, position.row() as f32)
}

fn move_towards(current: Vec2, target: Vec2, max_delta: f32) -> Vec2 {
    let offset = target - current;
    let distance = offset.length();
    if distance <= max_delta || distance <= f32::EPSILON {
        target
    } else {
        current + offset / distance * max_delta
    }
}
