// src/core/coords.rs
//! Text patterns that carry grid coordinates.
//!
//! Three sources write cells differently:
//! - claim descriptions ("Cell: 12, -5"), read at scrape time,
//! - thumbnail captions, read back through OCR and therefore noisy,
//! - claim titles, where authors use labeled or bracketed pairs.

use std::sync::LazyLock;

use regex::Regex;

use crate::grid::Cell;

/// Description pair: number, comma or single space, optional spaces, number.
static DESCRIPTION_CELL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(-?\d+)(?:,|\s)\s*(-?\d+)").expect("static regex"));

/// What may not follow a description pair: an optional comma, optional
/// space, then more digits or "and" (a list of numbers, not a cell).
static DESCRIPTION_CONTINUES: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^,?\s?(?:\d|and)").expect("static regex"));

/// OCR caption pair. Separators are comma/point runs or whitespace; OCR
/// sometimes drops the separator entirely, leaving "12-5".
static CAPTION_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(-?\d+)(?:(?:[,.]+|\s)\s?(-?\d+)|(-\d+))").expect("static regex")
});

/// `x=12 y=-5`, `X: 12, Y: -5`, `x 12 / y -5`.
static LABELED_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bx\s*[:=]?\s*(-?\d+)\s*[,;/]?\s*\by\s*[:=]?\s*(-?\d+)").expect("static regex")
});

/// `[12,-5]`, `(12, -5)`, `[12 -5]`, `(12; -5)`.
static BRACKETED_CELL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"[\[(]\s*(-?\d+)\s*(?:[,;]\s*|\s+)(-?\d+)\s*[\])]").expect("static regex")
});

/// First cell written in a claim description.
///
/// Candidates followed by further numbers ("1, 2, 3") or "and" are skipped
/// and the search resumes one character later.
pub fn description_cell(text: &str) -> Option<Cell> {
    let mut from = 0usize;
    while from <= text.len() {
        let caps = DESCRIPTION_CELL.captures_at(text, from)?;
        let whole = caps.get(0)?;
        if !DESCRIPTION_CONTINUES.is_match(&text[whole.end()..]) {
            if let Some(cell) = Cell::parse_pair(&caps[1], &caps[2]) {
                return Some(cell);
            }
        }
        from = next_char_boundary(text, whole.start());
    }
    None
}

/// First cell in OCR output, tolerant of the separators OCR produces.
pub fn caption_cell(text: &str) -> Option<Cell> {
    let caps = CAPTION_CELL.captures(text)?;
    let y = caps.get(2).or_else(|| caps.get(3))?;
    Cell::parse_pair(&caps[1], y.as_str())
}

/// Explicitly labeled `x`/`y` pair.
pub fn labeled_cell(text: &str) -> Option<Cell> {
    LABELED_CELL
        .captures_iter(text)
        .find_map(|c| Cell::parse_pair(&c[1], &c[2]))
}

/// Pair of integers in square brackets or parentheses.
pub fn bracketed_cell(text: &str) -> Option<Cell> {
    BRACKETED_CELL
        .captures_iter(text)
        .find_map(|c| Cell::parse_pair(&c[1], &c[2]))
}

fn next_char_boundary(s: &str, at: usize) -> usize {
    let mut i = at + 1;
    while i < s.len() && !s.is_char_boundary(i) {
        i += 1;
    }
    i
}
