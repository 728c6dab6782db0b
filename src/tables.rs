// src/tables.rs
//! Hand-maintained lookup tables under the data directory.
//!
//! All three files map a key to `[x, y]`. They are read once at startup and
//! never change during a run.

use std::{
    collections::{BTreeMap, HashMap},
    fs,
    path::Path,
};

use serde::{de::DeserializeOwned, Deserialize};
use tracing::info;

use crate::claim::ClaimRecord;
use crate::core::sanitize::normalize_url;
use crate::error::ConfigError;
use crate::grid::Cell;

type RawHints = BTreeMap<String, (i32, i32)>;

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, ConfigError> {
    let text = fs::read_to_string(path).map_err(|source| ConfigError::TableIo { path: path.to_path_buf(), source })?;
    serde_json::from_str(&text).map_err(|source| ConfigError::TableFormat { path: path.to_path_buf(), source })
}

/// Title markers, matched case-insensitively; longer markers sort first so
/// "Old Ebonheart Docks" beats "Old Ebonheart".
fn markers_longest_first(raw: impl IntoIterator<Item = (String, (i32, i32))>) -> Vec<(String, Cell)> {
    let mut v: Vec<(String, Cell)> = raw
        .into_iter()
        .map(|(k, xy)| (k.trim().to_lowercase(), Cell::from(xy)))
        .filter(|(k, _)| !k.is_empty())
        .collect();
    v.sort_by(|a, b| b.0.len().cmp(&a.0.len()).then_with(|| a.0.cmp(&b.0)));
    v
}

fn longest_marker(markers: &[(String, Cell)], title: &str) -> Option<Cell> {
    let lc = title.to_lowercase();
    markers.iter().find(|(m, _)| lc.contains(m.as_str())).map(|(_, c)| *c)
}

/// Known claim URLs → cell.
#[derive(Clone, Debug, Default)]
pub struct UrlHints {
    by_url: HashMap<String, Cell>,
}

impl UrlHints {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: RawHints = read_json(path)?;
        let t = Self::from_pairs(raw);
        info!(path = %path.display(), entries = t.len(), "Loaded URL hints");
        Ok(t)
    }

    pub fn from_pairs<K: AsRef<str>>(pairs: impl IntoIterator<Item = (K, (i32, i32))>) -> Self {
        let by_url = pairs
            .into_iter()
            .map(|(k, xy)| (normalize_url(k.as_ref()), Cell::from(xy)))
            .collect();
        Self { by_url }
    }

    pub fn get(&self, url: &str) -> Option<Cell> {
        self.by_url.get(&normalize_url(url)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_url.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_url.is_empty()
    }
}

/// Place names that pin a claim by its title ("Firewatch", "Old Ebonheart").
#[derive(Clone, Debug, Default)]
pub struct NameHints {
    markers: Vec<(String, Cell)>,
}

impl NameHints {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: RawHints = read_json(path)?;
        let t = Self::from_pairs(raw);
        info!(path = %path.display(), entries = t.len(), "Loaded name hints");
        Ok(t)
    }

    pub fn from_pairs<K: Into<String>>(pairs: impl IntoIterator<Item = (K, (i32, i32))>) -> Self {
        Self { markers: markers_longest_first(pairs.into_iter().map(|(k, xy)| (k.into(), xy))) }
    }

    /// Cell of the longest marker contained in `title`.
    pub fn find_in(&self, title: &str) -> Option<Cell> {
        longest_marker(&self.markers, title)
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }
}

/// Moves claims whose title carries a marker and whose cell lies past a
/// threshold. The one shipped rule undoes the +100 x offset some
/// Embers of Empire ("[ITO]") claims were entered with.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct ShiftRule {
    pub title_contains: String,
    #[serde(default)]
    pub min_x: Option<i32>,
    #[serde(default)]
    pub min_y: Option<i32>,
    pub offset: (i32, i32),
}

impl ShiftRule {
    pub fn applies(&self, title: &str, cell: Cell) -> bool {
        title.to_lowercase().contains(&self.title_contains.to_lowercase())
            && self.min_x.is_none_or(|m| cell.x >= m)
            && self.min_y.is_none_or(|m| cell.y >= m)
    }

    pub fn apply(&self, cell: Cell) -> Cell {
        cell.offset(self.offset.0, self.offset.1)
    }
}

#[derive(Debug, Default, Deserialize)]
struct CorrectionsFile {
    #[serde(default)]
    entries: RawHints,
    #[serde(default)]
    shifts: Vec<ShiftRule>,
}

/// Known-bad site data and its fix.
///
/// Entry keys are matched against the claim id/URL first (exact, after URL
/// normalization), then as title substrings. Shift rules only fire when no
/// entry matched.
#[derive(Clone, Debug, Default)]
pub struct Corrections {
    by_link: HashMap<String, Cell>,
    by_title: Vec<(String, Cell)>,
    shifts: Vec<ShiftRule>,
}

impl Corrections {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw: CorrectionsFile = read_json(path)?;
        let t = Self::new(raw.entries, raw.shifts);
        info!(
            path = %path.display(),
            entries = t.by_link.len(),
            shifts = t.shifts.len(),
            "Loaded corrections"
        );
        Ok(t)
    }

    pub fn new<K: Into<String>>(entries: impl IntoIterator<Item = (K, (i32, i32))>, shifts: Vec<ShiftRule>) -> Self {
        let entries: Vec<(String, (i32, i32))> = entries.into_iter().map(|(k, xy)| (k.into(), xy)).collect();
        let by_link = entries.iter().map(|(k, xy)| (normalize_url(k), Cell::from(*xy))).collect();
        let by_title = markers_longest_first(entries);
        Self { by_link, by_title, shifts }
    }

    /// Corrected cell for a claim, or `None` when the table says nothing.
    pub fn lookup(&self, claim: &ClaimRecord) -> Option<Cell> {
        let exact = [Some(claim.id.as_str()), claim.detail_url.as_deref()]
            .into_iter()
            .flatten()
            .find_map(|k| self.by_link.get(&normalize_url(k)).copied());
        if exact.is_some() {
            return exact;
        }

        if let Some(cell) = longest_marker(&self.by_title, &claim.title) {
            return Some(cell);
        }

        let cell = claim.coord?;
        self.shifts
            .iter()
            .find(|r| r.applies(&claim.title, cell))
            .map(|r| r.apply(cell))
    }

    pub fn is_empty(&self) -> bool {
        self.by_link.is_empty() && self.by_title.is_empty() && self.shifts.is_empty()
    }
}
