//! Round orchestration and the game state machine.

use log::{debug, info};
use theseus_core::{Event, GameState, GridPosition, Rejection, StepDelta};
use theseus_system_movement::{pursuit_delta, WallIndex};

use crate::mover::Mover;

/// Suspension point the current round is waiting on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RoundPhase {
    /// No round in flight; input is accepted.
    Idle,
    /// Waiting for Theseus to finish his move.
    AwaitPlayer,
    /// Waiting for the Minotaur to finish his pursuit.
    AwaitEnemy,
}

/// Drives rounds, tracks the round counter and owns the game state.
#[derive(Clone, Debug)]
pub(crate) struct TurnCoordinator {
    phase: RoundPhase,
    round: u32,
    state: GameState,
    undo_available: bool,
    undo_before_pause: bool,
}

impl TurnCoordinator {
    pub(crate) fn new() -> Self {
        Self {
            phase: RoundPhase::Idle,
            round: 0,
            state: GameState::Playing,
            undo_available: false,
            undo_before_pause: false,
        }
    }

    pub(crate) fn round(&self) -> u32 {
        self.round
    }

    pub(crate) fn state(&self) -> GameState {
        self.state
    }

    pub(crate) fn undo_available(&self) -> bool {
        self.undo_available
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.phase != RoundPhase::Idle
    }

    /// Returns to the start of a level attempt.
    pub(crate) fn reset(&mut self, out_events: &mut Vec<Event>) {
        self.phase = RoundPhase::Idle;
        self.round = 0;
        self.undo_before_pause = false;
        out_events.push(Event::RoundChanged { round: 0 });
        self.set_undo_available(false, out_events);
        out_events.push(Event::InputAvailabilityChanged { available: true });
        self.change_state(GameState::Playing, out_events);
    }

    /// Starts a round by forwarding `delta` to Theseus.
    ///
    /// A zero delta is a wait: Theseus records the round without stepping and
    /// the Minotaur still pursues.
    pub(crate) fn begin_round(
        &mut self,
        delta: StepDelta,
        theseus: &mut Mover,
        minotaur: &mut Mover,
        walls: &WallIndex,
        exit: GridPosition,
        out_events: &mut Vec<Event>,
    ) {
        if self.state != GameState::Playing {
            out_events.push(Event::MoveRejected {
                reason: Rejection::NotPlaying,
            });
            return;
        }
        if self.is_busy() {
            out_events.push(Event::MoveRejected {
                reason: Rejection::RoundInProgress,
            });
            return;
        }
        if !theseus.request_move(delta, walls, out_events) {
            out_events.push(Event::MoveRejected {
                reason: Rejection::MoverBusy,
            });
            return;
        }

        self.round = self.round.saturating_add(1);
        debug!("round {} started with {:?}", self.round, delta);
        out_events.push(Event::RoundChanged { round: self.round });
        self.set_undo_available(false, out_events);
        out_events.push(Event::InputAvailabilityChanged { available: false });
        self.phase = RoundPhase::AwaitPlayer;

        self.poll(theseus, minotaur, walls, exit, out_events);
    }

    /// Re-evaluates the current suspension point. Called once per tick.
    pub(crate) fn poll(
        &mut self,
        theseus: &Mover,
        minotaur: &mut Mover,
        walls: &WallIndex,
        exit: GridPosition,
        out_events: &mut Vec<Event>,
    ) {
        loop {
            match self.phase {
                RoundPhase::Idle => return,
                RoundPhase::AwaitPlayer => {
                    // The Minotaur may still be finishing an undo rewind.
                    if !theseus.is_available() || !minotaur.is_available() {
                        return;
                    }
                    let delta = pursuit_delta(minotaur.position(), theseus.position());
                    debug!("Minotaur pursues by {:?}", delta);
                    let accepted = minotaur.request_move(delta, walls, out_events);
                    debug_assert!(accepted, "pursuit requested while the Minotaur was busy");
                    if !accepted {
                        debug!("Minotaur busy, pursuit skipped");
                    }
                    self.phase = RoundPhase::AwaitEnemy;
                }
                RoundPhase::AwaitEnemy => {
                    if !minotaur.is_available() {
                        return;
                    }
                    self.finish_round(theseus.position(), minotaur.position(), exit, out_events);
                    return;
                }
            }
        }
    }

    fn finish_round(
        &mut self,
        theseus: GridPosition,
        minotaur: GridPosition,
        exit: GridPosition,
        out_events: &mut Vec<Event>,
    ) {
        // Capture takes precedence over escape.
        if minotaur == theseus {
            self.change_state(GameState::Captured, out_events);
        } else if theseus == exit {
            self.change_state(GameState::Escaped, out_events);
        }

        self.phase = RoundPhase::Idle;
        self.set_undo_available(self.state == GameState::Playing, out_events);
        out_events.push(Event::InputAvailabilityChanged { available: true });
    }

    /// Rewinds both characters by one round.
    pub(crate) fn undo(
        &mut self,
        theseus: &mut Mover,
        minotaur: &mut Mover,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = if self.state != GameState::Playing {
            Some(Rejection::NotPlaying)
        } else if self.is_busy() {
            Some(Rejection::RoundInProgress)
        } else if !self.undo_available {
            Some(Rejection::UndoUnavailable)
        } else {
            None
        };
        if let Some(reason) = rejection {
            out_events.push(Event::UndoRejected { reason });
            return;
        }

        self.round = self.round.saturating_sub(1);
        out_events.push(Event::RoundChanged { round: self.round });

        // Both movers rewind even when the first one runs out of history.
        let theseus_has_more = theseus.undo(out_events);
        let minotaur_has_more = minotaur.undo(out_events);
        if !theseus_has_more || !minotaur_has_more {
            self.set_undo_available(false, out_events);
        }
    }

    /// Suspends play between rounds. Returns whether the state changed.
    pub(crate) fn pause(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.state != GameState::Playing || self.is_busy() {
            return false;
        }
        self.undo_before_pause = self.undo_available;
        self.set_undo_available(false, out_events);
        self.change_state(GameState::Paused, out_events);
        true
    }

    pub(crate) fn resume(&mut self, out_events: &mut Vec<Event>) -> bool {
        if self.state != GameState::Paused {
            return false;
        }
        self.change_state(GameState::Playing, out_events);
        self.set_undo_available(self.undo_before_pause, out_events);
        true
    }

    fn change_state(&mut self, state: GameState, out_events: &mut Vec<Event>) {
        if state != self.state {
            info!("state changed to {:?}", state);
            self.state = state;
            out_events.push(Event::GameStateChanged { state });
        }
    }

    fn set_undo_available(&mut self, available: bool, out_events: &mut Vec<Event>) {
        self.undo_available = available;
        out_events.push(Event::UndoAvailabilityChanged { available });
    }
}
