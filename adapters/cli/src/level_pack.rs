use std::{fs, path::Path};

use anyhow::{ensure, Context, Result};
use theseus_core::LevelCatalog;

/// Level pack compiled into the binary.
const BUILT_IN: &str = include_str!("../levels/default.toml");

/// Loads the level pack at `path`, or the built-in pack when no path is given.
pub(crate) fn load(path: Option<&Path>) -> Result<LevelCatalog> {
    let Some(path) = path else {
        return parse(BUILT_IN).context("built-in level pack is invalid");
    };
    let contents = fs::read_to_string(path)
        .with_context(|| format!("failed to read level pack at {}", path.display()))?;
    parse(&contents).with_context(|| format!("invalid level pack in {}", path.display()))
}

/// Parses and validates a TOML level pack.
pub(crate) fn parse(contents: &str) -> Result<LevelCatalog> {
    let catalog: LevelCatalog =
        toml::from_str(contents).context("failed to parse level pack toml contents")?;
    ensure!(!catalog.is_empty(), "level pack contains no levels");
    catalog.validate()?;
    Ok(catalog)
}
