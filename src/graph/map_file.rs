//! MovingAI benchmark map format.
//!
//! ```text
//! type octile
//! height 32
//! width 32
//! map
//! ..@@T...
//! ```
//!
//! `@` and `T` are obstacles; every other character is open ground.

use super::{GraphError, Result, cell_count};

/// A decoded map, ready to become a [`Grid`](super::Grid).
pub(super) struct MapFile {
    pub width: u32,
    pub height: u32,
    pub passable: Vec<bool>,
}

pub(super) fn parse(text: &str) -> Result<MapFile> {
    let mut lines = text.lines().map(|l| l.strip_suffix('\r').unwrap_or(l));

    let mut width = None;
    let mut height = None;

    // ── Header ──

    for line in lines.by_ref() {
        let line = line.trim();
        if line == "map" {
            break;
        }
        if let Some(value) = line.strip_prefix("width ") {
            width = Some(parse_dimension("width", value)?);
        } else if let Some(value) = line.strip_prefix("height ") {
            height = Some(parse_dimension("height", value)?);
        }
    }

    let width = width.ok_or(GraphError::MissingHeader("width"))?;
    let height = height.ok_or(GraphError::MissingHeader("height"))?;

    // ── Body ──

    let mut passable = vec![false; cell_count(width, height)?];
    let mut y = 0;
    for line in lines {
        if y == height as usize {
            break;
        }
        // Rows of the wrong width are skipped rather than rejected.
        if line.len() != width as usize {
            continue;
        }
        let row = &mut passable[y * width as usize..(y + 1) * width as usize];
        for (cell, c) in row.iter_mut().zip(line.bytes()) {
            *cell = !matches!(c, b'@' | b'T');
        }
        y += 1;
    }

    Ok(MapFile {
        width,
        height,
        passable,
    })
}

fn parse_dimension(field: &'static str, value: &str) -> Result<u32> {
    value
        .trim()
        .parse()
        .map_err(|_| GraphError::InvalidHeader {
            field,
            value: value.to_string(),
        })
}
