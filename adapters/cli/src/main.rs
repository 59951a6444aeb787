#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that plays Theseus and the Minotaur in a terminal.

mod board;
mod level_pack;
mod settings;

use std::{
    io::{self, BufRead, Write},
    path::PathBuf,
    time::Duration,
};

use anyhow::{ensure, Context, Result};
use clap::{Parser, Subcommand};
use glam::Vec2;
use log::debug;
use theseus_core::{Character, Command, Event, LevelCatalog, LevelIndex, Rejection};
use theseus_system_controller::{Controller, InputSnapshot};
use theseus_system_hud::{Hud, Panel};
use theseus_world::{apply, query, World};

use settings::Settings;

/// Upper bound on ticks simulated while waiting for a round to settle.
const MAX_SETTLE_TICKS: u32 = 100_000;

const HELP: &str = "\
commands: up|down|left|right [steps], wait, undo, reload, pause, resume,
          level <n> (from the menu), help, quit";

/// Theseus and the Minotaur, played in the terminal.
#[derive(Parser, Debug)]
#[command(name = "theseus", version, about, long_about = None)]
struct Cli {
    /// Settings file (TOML)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Level pack (TOML); the built-in pack is used when omitted
    #[arg(long, global = true)]
    levels: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug)]
enum Commands {
    /// Play interactively, reading one command per line from stdin
    Play {
        /// Zero-based level index; overrides the settings file
        #[arg(short, long)]
        level: Option<u32>,
    },

    /// List the levels contained in the pack
    Levels,
}

/// Entry point for the Theseus command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = Settings::load(cli.settings.as_deref())?;
    init_logging(&settings);
    let catalog = level_pack::load(cli.levels.as_deref())?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    match cli.command.unwrap_or(Commands::Play { level: None }) {
        Commands::Levels => list_levels(&catalog, &mut out),
        Commands::Play { level } => {
            let start = LevelIndex::new(level.unwrap_or(settings.starting_level));
            play(catalog, &settings, start, io::stdin().lock(), &mut out)
        }
    }
}

fn init_logging(settings: &Settings) {
    let default_filter = if settings.debug_log { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn list_levels(catalog: &LevelCatalog, out: &mut impl Write) -> Result<()> {
    for (index, level) in catalog.iter().enumerate() {
        writeln!(
            out,
            "{index}: {} ({}x{}) {}",
            level.name(),
            level.size().columns(),
            level.size().rows(),
            level.description()
        )?;
    }
    Ok(())
}

fn play(
    catalog: LevelCatalog,
    settings: &Settings,
    start: LevelIndex,
    input: impl BufRead,
    out: &mut impl Write,
) -> Result<()> {
    let mut session = Session::new(World::new(catalog, settings.cast), settings.frame());
    writeln!(out, "{}", query::welcome_banner(&session.world))?;
    session
        .submit(Command::LoadLevel { index: start })
        .with_context(|| format!("failed to open level {}", start.get()))?;
    session.report(out)?;
    writeln!(out, "{HELP}")?;

    for line in input.lines() {
        let line = line.context("failed to read command")?;
        match parse_input(&line) {
            Input::Blank => {}
            Input::Quit => break,
            Input::Help => writeln!(out, "{HELP}")?,
            Input::Unknown => writeln!(out, "unknown command: {}", line.trim())?,
            Input::Snapshot(snapshot) => session.step(snapshot, out)?,
        }
    }
    Ok(())
}

/// Terminal play session wiring the world to the HUD and controller systems.
struct Session {
    world: World,
    hud: Hud,
    controller: Controller,
    pending: Vec<Event>,
    notices: Vec<String>,
    frame: Duration,
}

impl Session {
    fn new(world: World, frame: Duration) -> Self {
        Self {
            world,
            hud: Hud::new(),
            controller: Controller::new(),
            pending: Vec::new(),
            notices: Vec::new(),
            frame,
        }
    }

    fn step(&mut self, input: InputSnapshot, out: &mut impl Write) -> Result<()> {
        let mut commands = Vec::new();
        self.controller.handle(&self.pending, input, &mut commands);
        self.pending.clear();

        if commands.is_empty() {
            writeln!(out, "nothing to do right now")?;
            return Ok(());
        }
        for command in commands {
            self.submit(command)?;
        }
        self.settle()?;
        self.report(out)
    }

    fn submit(&mut self, command: Command) -> Result<()> {
        let mut events = Vec::new();
        apply(&mut self.world, command, &mut events)?;
        self.hud.handle(&events);
        self.notices.extend(events.iter().filter_map(notice));
        self.pending.extend(
            events
                .into_iter()
                .filter(|event| !matches!(event, Event::TimeAdvanced { .. })),
        );
        Ok(())
    }

    fn settle(&mut self) -> Result<()> {
        let mut ticks = 0;
        while !query::is_settled(&self.world) {
            ensure!(
                ticks < MAX_SETTLE_TICKS,
                "round did not settle after {MAX_SETTLE_TICKS} ticks"
            );
            self.submit(Command::Tick { dt: self.frame })?;
            ticks += 1;
        }
        debug!("settled after {ticks} ticks");
        Ok(())
    }

    fn report(&mut self, out: &mut impl Write) -> Result<()> {
        for notice in self.notices.drain(..) {
            writeln!(out, "{notice}")?;
        }
        if let Some(level) = query::level(&self.world) {
            write!(
                out,
                "{}",
                board::render(
                    level,
                    query::position(&self.world, Character::Theseus),
                    query::position(&self.world, Character::Minotaur),
                )
            )?;
        }

        let hud = self.hud.state();
        match hud.panel {
            Panel::Gameplay => {
                writeln!(out, "{}", hud.round_label)?;
                writeln!(out, "{}", hud.description)?;
                writeln!(
                    out,
                    "{} {} {}",
                    button("undo", hud.buttons.undo),
                    button("reload", hud.buttons.reload),
                    button("wait", hud.buttons.wait)
                )?;
            }
            Panel::Menu => {
                if let Some(title) = &hud.menu_title {
                    writeln!(out, "== {title} ==")?;
                }
                for (index, level) in query::catalog(&self.world).iter().enumerate() {
                    writeln!(out, "  level {index}: {}", level.name())?;
                }
                if hud.menu_closable {
                    writeln!(out, "  resume")?;
                }
            }
        }
        Ok(())
    }
}

fn button(label: &str, enabled: bool) -> String {
    if enabled {
        format!("[{label}]")
    } else {
        format!("({label})")
    }
}

fn notice(event: &Event) -> Option<String> {
    let (action, reason) = match event {
        Event::MoveRejected { reason } => ("move", *reason),
        Event::UndoRejected { reason } => ("undo", *reason),
        Event::ReloadRejected { reason } => ("reload", *reason),
        _ => return None,
    };
    let why = match reason {
        Rejection::NotPlaying => "the level is not being played",
        Rejection::RoundInProgress => "a round is in progress",
        Rejection::MoverBusy => "Theseus is still moving",
        Rejection::UndoUnavailable => "there is nothing to undo",
        Rejection::NoLevel => "no level is loaded",
    };
    Some(format!("{action} refused: {why}"))
}

/// One line of terminal input.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Input {
    Blank,
    Help,
    Quit,
    Unknown,
    Snapshot(InputSnapshot),
}

fn parse_input(line: &str) -> Input {
    let mut words = line.split_whitespace();
    let Some(word) = words.next() else {
        return Input::Blank;
    };
    let argument = words.next();
    if words.next().is_some() {
        return Input::Unknown;
    }

    let direction = match word.to_ascii_lowercase().as_str() {
        "up" | "w" => Vec2::Y,
        "down" | "s" => Vec2::NEG_Y,
        "left" | "a" => Vec2::NEG_X,
        "right" | "d" => Vec2::X,
        "level" => {
            return match argument.map(str::parse::<u32>) {
                Some(Ok(index)) => Input::Snapshot(InputSnapshot {
                    select_level: Some(LevelIndex::new(index)),
                    ..InputSnapshot::default()
                }),
                _ => Input::Unknown,
            };
        }
        other => {
            if argument.is_some() {
                return Input::Unknown;
            }
            let mut snapshot = InputSnapshot::default();
            match other {
                "wait" | "." => snapshot.wait = true,
                "undo" | "u" => snapshot.undo = true,
                "reload" | "r" => snapshot.reload = true,
                "pause" | "menu" => snapshot.pause = true,
                "resume" => snapshot.resume = true,
                "help" | "?" => return Input::Help,
                "quit" | "q" | "exit" => return Input::Quit,
                _ => return Input::Unknown,
            }
            return Input::Snapshot(snapshot);
        }
    };

    let steps = match argument.map(str::parse::<u8>) {
        None => 1,
        Some(Ok(steps)) if steps > 0 => steps,
        Some(_) => return Input::Unknown,
    };
    Input::Snapshot(InputSnapshot {
        movement: direction * f32::from(steps),
        ..InputSnapshot::default()
    })
}
