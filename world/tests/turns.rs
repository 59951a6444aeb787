use std::time::Duration;

use theseus_core::{
    CastConfig, Character, Command, Event, GameState, GridPosition, GridSize, Level, LevelCatalog,
    LevelIndex, MoverConfig, Rejection, StepDelta, StepPolicy, Wall, WallOrientation,
};
use theseus_world::{self as world, query, World};

const FRAME: Duration = Duration::from_millis(50);

fn world_with(level: Level, cast: CastConfig) -> World {
    let catalog = LevelCatalog::new(vec![level]).expect("valid catalog");
    let mut world = World::new(catalog, cast);
    let _ = apply(
        &mut world,
        Command::LoadLevel {
            index: LevelIndex::new(0),
        },
    );
    world
}

fn apply(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events).expect("command applies");
    events
}

fn settle(world: &mut World) -> Vec<Event> {
    let mut events = Vec::new();
    let mut frames = 0;
    while !query::is_settled(world) {
        world::apply(world, Command::Tick { dt: FRAME }, &mut events).expect("tick applies");
        frames += 1;
        assert!(frames < 10_000, "world never settled");
    }
    events
}

fn play(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = apply(world, command);
    events.extend(settle(world));
    events
}

fn step(columns: i32, rows: i32) -> Command {
    Command::MovePlayer {
        delta: StepDelta::new(columns, rows),
    }
}

fn open_level(player: GridPosition, enemy: GridPosition, exit: GridPosition) -> Level {
    Level::new("open", GridSize::new(5, 5), player, enemy, exit)
}

#[test]
fn theseus_escapes_on_the_round_he_reaches_the_exit() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 1),
            GridPosition::new(1, 5),
        ),
        CastConfig::default(),
    );

    let mut previous_distance = GridPosition::new(1, 1).manhattan_distance(GridPosition::new(5, 1));
    for round in 1..=4 {
        let events = play(&mut world, step(0, 1));
        let theseus = query::position(&world, Character::Theseus);
        let minotaur = query::position(&world, Character::Minotaur);

        assert_eq!(theseus, GridPosition::new(1, 1 + round));
        assert_ne!(theseus, minotaur, "no capture expected on round {round}");
        assert_eq!(query::round(&world), round as u32);

        let distance = theseus.manhattan_distance(minotaur);
        assert!(distance <= previous_distance, "minotaur fell behind");
        previous_distance = distance;

        let escaped = events.contains(&Event::GameStateChanged {
            state: GameState::Escaped,
        });
        assert_eq!(escaped, round == 4, "escape reported on round {round}");
    }

    assert_eq!(query::game_state(&world), GameState::Escaped);
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(3, 3));
    assert!(!query::undo_available(&world));

    let events = apply(&mut world, step(0, -1));
    assert_eq!(
        events,
        vec![Event::MoveRejected {
            reason: Rejection::NotPlaying,
        }]
    );
}

#[test]
fn corner_minotaur_catches_theseus_at_the_exit_on_round_four() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(1, 5),
        ),
        CastConfig::default(),
    );

    for round in 1..=3 {
        let events = play(&mut world, step(0, 1));
        assert_eq!(query::game_state(&world), GameState::Playing, "round {round}");
        assert!(!events.iter().any(|event| matches!(event, Event::GameStateChanged { .. })));
    }
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 4));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(2, 5));

    let events = play(&mut world, step(0, 1));

    assert_eq!(query::round(&world), 4);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 5));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(1, 5));
    assert_eq!(query::game_state(&world), GameState::Captured);
    assert!(!events.contains(&Event::GameStateChanged {
        state: GameState::Escaped,
    }));
}

#[test]
fn waiting_between_moves_lets_the_minotaur_cut_theseus_off() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(1, 5),
        ),
        CastConfig::default(),
    );

    let script = [
        (step(0, 1), GridPosition::new(1, 2), GridPosition::new(4, 5)),
        (Command::Wait, GridPosition::new(1, 2), GridPosition::new(3, 5)),
        (step(0, 1), GridPosition::new(1, 3), GridPosition::new(2, 5)),
        (Command::Wait, GridPosition::new(1, 3), GridPosition::new(2, 4)),
    ];
    for (command, theseus, minotaur) in script {
        let _ = play(&mut world, command);
        assert_eq!(query::game_state(&world), GameState::Playing);
        assert_eq!(query::position(&world, Character::Theseus), theseus);
        assert_eq!(query::position(&world, Character::Minotaur), minotaur);
    }

    let _ = play(&mut world, step(0, 1));

    assert_eq!(query::round(&world), 5);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 4));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(1, 4));
    assert_eq!(query::game_state(&world), GameState::Captured);
}

#[test]
fn minotaur_reaching_theseus_is_a_capture() {
    let mut world = world_with(
        Level::new(
            "hall",
            GridSize::new(3, 3),
            GridPosition::new(1, 1),
            GridPosition::new(3, 1),
            GridPosition::new(3, 3),
        ),
        CastConfig::default(),
    );

    let _ = play(&mut world, Command::Wait);
    assert_eq!(query::game_state(&world), GameState::Playing);
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(2, 1));

    let events = play(&mut world, Command::Wait);
    assert!(events.contains(&Event::GameStateChanged {
        state: GameState::Captured,
    }));
    assert_eq!(query::game_state(&world), GameState::Captured);

    for command in [step(0, 1), Command::Wait] {
        assert_eq!(
            apply(&mut world, command),
            vec![Event::MoveRejected {
                reason: Rejection::NotPlaying,
            }]
        );
    }
    assert_eq!(
        apply(&mut world, Command::Undo),
        vec![Event::UndoRejected {
            reason: Rejection::NotPlaying,
        }]
    );

    let _ = apply(&mut world, Command::Reload);
    assert_eq!(query::game_state(&world), GameState::Playing);
    assert_eq!(query::round(&world), 0);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 1));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(3, 1));
    assert_eq!(query::history_depth(&world, Character::Theseus), 0);
    assert_eq!(query::history_depth(&world, Character::Minotaur), 0);
}

#[test]
fn walking_into_the_minotaur_is_a_capture() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(2, 1),
            GridPosition::new(5, 5),
        ),
        CastConfig::default(),
    );

    let _ = play(&mut world, step(1, 0));
    assert_eq!(query::game_state(&world), GameState::Captured);
}

#[test]
fn capture_takes_precedence_over_escape() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(3, 1),
            GridPosition::new(2, 1),
        ),
        CastConfig::default(),
    );

    let _ = play(&mut world, step(1, 0));
    assert_eq!(query::game_state(&world), GameState::Captured);
}

#[test]
fn wall_blocked_move_still_spends_the_round() {
    let level = open_level(
        GridPosition::new(2, 1),
        GridPosition::new(5, 5),
        GridPosition::new(5, 1),
    )
    .with_walls(vec![Wall::new(
        WallOrientation::Horizontal,
        GridPosition::new(2, 1),
    )]);
    let mut world = world_with(level, CastConfig::default());

    let events = play(&mut world, step(0, 1));

    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(2, 1));
    assert!(events.contains(&Event::MoveFinished {
        character: Character::Theseus,
        steps: 0,
        position: GridPosition::new(2, 1),
    }));
    assert_eq!(query::round(&world), 1);
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(5, 4));
}

#[test]
fn minotaur_moves_only_after_theseus_rests() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let events = play(&mut world, step(0, 1));
    let theseus_done = events
        .iter()
        .position(|event| {
            matches!(
                event,
                Event::MoveFinished {
                    character: Character::Theseus,
                    ..
                }
            )
        })
        .expect("theseus finished");
    let minotaur_started = events
        .iter()
        .position(|event| {
            matches!(
                event,
                Event::StepStarted {
                    character: Character::Minotaur,
                    ..
                }
            )
        })
        .expect("minotaur stepped");
    let released = events
        .iter()
        .rposition(|event| *event == Event::InputAvailabilityChanged { available: true })
        .expect("input released");
    let minotaur_done = events
        .iter()
        .position(|event| {
            matches!(
                event,
                Event::MoveFinished {
                    character: Character::Minotaur,
                    ..
                }
            )
        })
        .expect("minotaur finished");

    assert!(theseus_done < minotaur_started);
    assert!(minotaur_done < released);
}

#[test]
fn overlapping_requests_are_rejected_while_a_round_is_in_flight() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let _ = apply(&mut world, step(1, 0));
    assert!(!query::input_available(&world));

    assert_eq!(
        apply(&mut world, step(0, 1)),
        vec![Event::MoveRejected {
            reason: Rejection::RoundInProgress,
        }]
    );
    assert_eq!(
        apply(&mut world, Command::Reload),
        vec![Event::ReloadRejected {
            reason: Rejection::RoundInProgress,
        }]
    );
    assert_eq!(
        apply(&mut world, Command::Undo),
        vec![Event::UndoRejected {
            reason: Rejection::RoundInProgress,
        }]
    );

    let _ = settle(&mut world);
    assert_eq!(query::round(&world), 1);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(2, 1));
    assert!(query::input_available(&world));
}

#[test]
fn undo_rewinds_both_characters_and_the_round_counter() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    assert!(!query::undo_available(&world));
    let _ = play(&mut world, step(0, 1));
    let _ = play(&mut world, step(0, 1));
    assert_eq!(query::round(&world), 2);
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(3, 5));
    assert!(query::undo_available(&world));

    let _ = play(&mut world, Command::Undo);
    assert_eq!(query::round(&world), 1);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 2));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(4, 5));
    assert!(query::undo_available(&world));

    let events = play(&mut world, Command::Undo);
    assert_eq!(query::round(&world), 0);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 1));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(5, 5));
    assert!(events.contains(&Event::UndoAvailabilityChanged { available: false }));
    assert!(!query::undo_available(&world));

    assert_eq!(
        apply(&mut world, Command::Undo),
        vec![Event::UndoRejected {
            reason: Rejection::UndoUnavailable,
        }]
    );
}

#[test]
fn moves_wait_for_an_undo_rewind_to_finish() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let _ = play(&mut world, step(0, 1));
    let _ = apply(&mut world, Command::Undo);

    assert_eq!(
        apply(&mut world, step(1, 0)),
        vec![Event::MoveRejected {
            reason: Rejection::MoverBusy,
        }]
    );
    assert_eq!(query::round(&world), 0);
}

#[test]
fn wait_keeps_theseus_in_place_and_records_the_round() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let events = play(&mut world, Command::Wait);

    assert_eq!(query::round(&world), 1);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(1, 1));
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(4, 5));
    assert_eq!(query::history_depth(&world, Character::Theseus), 1);
    assert_eq!(query::history_depth(&world, Character::Minotaur), 1);
    assert!(!events.iter().any(|event| matches!(
        event,
        Event::StepStarted {
            character: Character::Theseus,
            ..
        }
    )));
}

#[test]
fn history_depth_tracks_rounds_played() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let script = [step(0, 1), Command::Wait, step(1, 0), step(-1, 0), Command::Wait];
    for (played, command) in script.into_iter().enumerate() {
        let _ = play(&mut world, command);
        let rounds = played + 1;
        assert_eq!(query::round(&world) as usize, rounds);
        assert_eq!(query::history_depth(&world, Character::Theseus), rounds);
        assert_eq!(query::history_depth(&world, Character::Minotaur), rounds);
    }
}

#[test]
fn pause_freezes_rounds_until_resumed() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let _ = play(&mut world, step(0, 1));
    let events = apply(&mut world, Command::Pause);
    assert!(events.contains(&Event::GameStateChanged {
        state: GameState::Paused,
    }));
    assert!(!query::undo_available(&world));
    assert_eq!(
        apply(&mut world, step(0, 1)),
        vec![Event::MoveRejected {
            reason: Rejection::NotPlaying,
        }]
    );

    let _ = apply(&mut world, Command::Resume);
    assert_eq!(query::game_state(&world), GameState::Playing);
    assert!(query::undo_available(&world));
    let _ = play(&mut world, step(0, 1));
    assert_eq!(query::round(&world), 2);
}

#[test]
fn paused_world_can_switch_levels() {
    let first = open_level(
        GridPosition::new(1, 1),
        GridPosition::new(5, 5),
        GridPosition::new(5, 1),
    );
    let second = Level::new(
        "second",
        GridSize::new(2, 2),
        GridPosition::new(2, 2),
        GridPosition::new(1, 1),
        GridPosition::new(1, 2),
    );
    let catalog = LevelCatalog::new(vec![first, second]).expect("valid catalog");
    let mut world = World::new(catalog, CastConfig::default());
    let _ = apply(
        &mut world,
        Command::LoadLevel {
            index: LevelIndex::new(0),
        },
    );
    let _ = play(&mut world, step(0, 1));
    let _ = apply(&mut world, Command::Pause);

    let events = apply(
        &mut world,
        Command::LoadLevel {
            index: LevelIndex::new(1),
        },
    );

    assert!(events.contains(&Event::GameStateChanged {
        state: GameState::Playing,
    }));
    assert_eq!(query::level_index(&world), Some(LevelIndex::new(1)));
    assert_eq!(query::round(&world), 0);
    assert_eq!(query::position(&world, Character::Theseus), GridPosition::new(2, 2));
}

#[test]
fn horizontal_first_minotaur_slides_around_walls() {
    let level = open_level(
        GridPosition::new(1, 1),
        GridPosition::new(3, 3),
        GridPosition::new(5, 5),
    )
    .with_walls(vec![
        Wall::new(WallOrientation::Vertical, GridPosition::new(2, 3)),
        Wall::new(WallOrientation::Vertical, GridPosition::new(2, 2)),
    ]);
    let cast = CastConfig {
        minotaur: MoverConfig {
            moves_per_round: 2,
            step_policy: StepPolicy::HorizontalFirst,
            ..MoverConfig::default()
        },
        ..CastConfig::default()
    };
    let mut world = world_with(level, cast);

    let _ = play(&mut world, Command::Wait);

    // Left is walled off, so both steps fall back to moving down.
    assert_eq!(query::position(&world, Character::Minotaur), GridPosition::new(3, 1));
}

#[test]
fn render_position_converges_on_the_logical_cell() {
    let mut world = world_with(
        open_level(
            GridPosition::new(1, 1),
            GridPosition::new(5, 5),
            GridPosition::new(5, 1),
        ),
        CastConfig::default(),
    );

    let _ = apply(&mut world, step(1, 0));
    let _ = apply(&mut world, Command::Tick { dt: FRAME });
    let halfway = query::render_position(&world, Character::Theseus);
    assert!(halfway.x > 1.0 && halfway.x < 2.0);
    assert!(query::is_animating(&world, Character::Theseus));
    assert_eq!(query::target(&world, Character::Theseus), GridPosition::new(2, 1));

    let _ = settle(&mut world);
    let rest = query::render_position(&world, Character::Theseus);
    assert_eq!((rest.x, rest.y), (2.0, 1.0));
    assert!(!query::is_animating(&world, Character::Theseus));
}
