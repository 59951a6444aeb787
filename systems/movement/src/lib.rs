#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic movement rules that validate steps and plan pursuit.
//!
//! Everything in this crate is a pure function of level data and positions.
//! The world crate consults these rules while animating characters, so the
//! same answers are produced regardless of frame timing.

use std::collections::HashSet;

use theseus_core::{Direction, GridPosition, GridSize, Level, StepDelta, StepPolicy};

/// Reports whether a single step from `from` in `direction` is allowed.
///
/// A step is blocked when a wall sits on the edge between `from` and its
/// neighbour, or when the neighbour lies outside the level grid. Runs in time
/// proportional to the number of walls; see [`WallIndex`] for constant-time
/// lookups.
#[must_use]
pub fn can_step(level: &Level, from: GridPosition, direction: Direction) -> bool {
    if !level.size().contains(from.neighbor(direction)) {
        return false;
    }

    !level
        .walls()
        .iter()
        .any(|wall| wall.blocks(from, direction))
}

/// Precomputed edge set answering [`can_step`] queries in constant time.
#[derive(Clone, Debug)]
pub struct WallIndex {
    size: GridSize,
    blocked: HashSet<(GridPosition, Direction)>,
}

impl WallIndex {
    /// Builds the edge set for the provided level.
    #[must_use]
    pub fn build(level: &Level) -> Self {
        let mut blocked = HashSet::with_capacity(level.walls().len() * 2);
        for wall in level.walls() {
            for direction in Direction::ALL {
                let anchor = wall.position();
                if wall.blocks(anchor, direction) {
                    let _ = blocked.insert((anchor, direction));
                    let _ = blocked.insert((anchor.neighbor(direction), direction.opposite()));
                }
            }
        }

        Self {
            size: level.size(),
            blocked,
        }
    }

    /// Reports whether a single step from `from` in `direction` is allowed.
    #[must_use]
    pub fn can_step(&self, from: GridPosition, direction: Direction) -> bool {
        self.size.contains(from.neighbor(direction)) && !self.blocked.contains(&(from, direction))
    }

    /// Number of blocked directed edges recorded in the index.
    #[must_use]
    pub fn blocked_edge_count(&self) -> usize {
        self.blocked.len()
    }
}

/// Result of resolving the next unit step of a requested move.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StepOutcome {
    /// Take one step in the provided direction.
    Step(Direction),
    /// The chosen step is blocked; the remaining delta is forfeited.
    Blocked,
    /// Nothing remains of the requested delta.
    Exhausted,
}

/// Resolves the next unit step for a remaining delta.
///
/// `is_open` answers whether a step in a direction is allowed from the
/// character's current cell.
pub fn resolve_step<F>(remaining: StepDelta, policy: StepPolicy, mut is_open: F) -> StepOutcome
where
    F: FnMut(Direction) -> bool,
{
    if remaining.is_zero() {
        return StepOutcome::Exhausted;
    }

    let horizontal = horizontal_direction(remaining);
    let vertical = vertical_direction(remaining);

    match policy {
        StepPolicy::DominantAxis => {
            // Horizontal wins ties.
            let chosen = if remaining.columns().unsigned_abs() >= remaining.rows().unsigned_abs() {
                horizontal
            } else {
                vertical
            };
            match chosen {
                Some(direction) if is_open(direction) => StepOutcome::Step(direction),
                _ => StepOutcome::Blocked,
            }
        }
        StepPolicy::HorizontalFirst => {
            if let Some(direction) = horizontal {
                if is_open(direction) {
                    return StepOutcome::Step(direction);
                }
            }
            if let Some(direction) = vertical {
                if is_open(direction) {
                    return StepOutcome::Step(direction);
                }
            }
            StepOutcome::Blocked
        }
    }
}

/// Displacement the enemy should attempt in order to reach the player.
#[must_use]
pub fn pursuit_delta(enemy: GridPosition, player: GridPosition) -> StepDelta {
    StepDelta::between(enemy, player)
}

fn horizontal_direction(delta: StepDelta) -> Option<Direction> {
    match delta.columns().signum() {
        1 => Some(Direction::Right),
        -1 => Some(Direction::Left),
        _ => None,
    }
}

fn vertical_direction(delta: StepDelta) -> Option<Direction> {
    match delta.rows().signum() {
        1 => Some(Direction::Up),
        -1 => Some(Direction::Down),
        _ => None,
    }
}
