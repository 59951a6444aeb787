#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure presentation system that folds world events into a HUD model.
//!
//! Adapters render [`HudState`] however they like; the system never talks back
//! to the world.

use theseus_core::{Event, GameState};

/// Panel currently shown to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Panel {
    /// In-level controls: round label, description and action buttons.
    #[default]
    Gameplay,
    /// Level menu shown while paused and after the level ends.
    Menu,
}

/// Interactivity of the action buttons.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct Buttons {
    /// Whether the undo button accepts presses.
    pub undo: bool,
    /// Whether the reload button accepts presses.
    pub reload: bool,
    /// Whether the wait button accepts presses.
    pub wait: bool,
}

/// Snapshot of everything the presentation layer displays.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct HudState {
    /// Label combining the level name and round number.
    pub round_label: String,
    /// Description of the active level.
    pub description: String,
    /// Interactivity of the action buttons.
    pub buttons: Buttons,
    /// Panel that should be visible.
    pub panel: Panel,
    /// Title shown on the menu panel, if it is visible.
    pub menu_title: Option<String>,
    /// Whether the menu offers a close button to resume play.
    pub menu_closable: bool,
}

/// Presentation system tracking the HUD across events.
#[derive(Debug, Default)]
pub struct Hud {
    level_name: String,
    round: u32,
    state: HudState,
}

impl Hud {
    /// Creates a HUD with nothing loaded.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current HUD snapshot.
    #[must_use]
    pub fn state(&self) -> &HudState {
        &self.state
    }

    /// Folds a batch of world events into the HUD.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::LevelLoaded {
                    name, description, ..
                } => {
                    self.level_name.clone_from(name);
                    self.state.description.clone_from(description);
                    self.show(GameState::Playing);
                }
                Event::RoundChanged { round } => {
                    self.round = *round;
                    self.state.round_label = round_label(&self.level_name, self.round);
                }
                Event::GameStateChanged { state } => self.show(*state),
                Event::UndoAvailabilityChanged { available } => {
                    self.state.buttons.undo = *available;
                }
                Event::InputAvailabilityChanged { available } => {
                    self.state.buttons.reload = *available;
                    self.state.buttons.wait = *available;
                }
                _ => {}
            }
        }
    }

    fn show(&mut self, state: GameState) {
        self.state.panel = if state == GameState::Playing {
            Panel::Gameplay
        } else {
            Panel::Menu
        };
        self.state.menu_closable = state == GameState::Paused;
        self.state.menu_title = match state {
            GameState::Playing => None,
            GameState::Paused => Some("Change Level".to_owned()),
            GameState::Escaped => Some(format!("You Escaped -- {}", self.state.round_label)),
            GameState::Captured => Some(format!("Game Over -- {}", self.state.round_label)),
        };
    }
}

/// Formats the round label shown during play.
#[must_use]
pub fn round_label(level_name: &str, round: u32) -> String {
    format!("{level_name} – Round {round}")
}
