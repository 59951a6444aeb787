use theseus_core::{Direction, GridPosition, Level};
use theseus_system_movement::can_step;

/// Draws the level as an ASCII maze with the top row printed first.
///
/// `T` marks Theseus, `M` the Minotaur, `E` the exit and `@` a capture.
pub(crate) fn render(level: &Level, theseus: GridPosition, minotaur: GridPosition) -> String {
    let columns = i32::try_from(level.size().columns()).unwrap_or(i32::MAX);
    let rows = i32::try_from(level.size().rows()).unwrap_or(i32::MAX);

    let mut out = String::new();
    push_edge(&mut out, columns, |_| false);
    for row in (1..=rows).rev() {
        out.push('|');
        for column in 1..=columns {
            let cell = GridPosition::new(column, row);
            out.push(' ');
            out.push(glyph(level, cell, theseus, minotaur));
            out.push(' ');
            out.push(if can_step(level, cell, Direction::Right) {
                ' '
            } else {
                '|'
            });
        }
        out.push('\n');
        push_edge(&mut out, columns, |column| {
            can_step(level, GridPosition::new(column, row), Direction::Down)
        });
    }
    out
}

fn push_edge(out: &mut String, columns: i32, mut is_open: impl FnMut(i32) -> bool) {
    out.push('+');
    for column in 1..=columns {
        out.push_str(if is_open(column) { "   " } else { "---" });
        out.push('+');
    }
    out.push('\n');
}

fn glyph(level: &Level, cell: GridPosition, theseus: GridPosition, minotaur: GridPosition) -> char {
    match (cell == theseus, cell == minotaur) {
        (true, true) => '@',
        (true, false) => 'T',
        (false, true) => 'M',
        (false, false) if cell == level.exit() => 'E',
        (false, false) => '.',
    }
}
