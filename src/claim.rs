// src/claim.rs
//! Claim records as they flow from the scraper, through resolution, to the map.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::grid::Cell;

/// Claim stage as shown on the claims browser.
///
/// Known stages are ordered by how far along a claim is. Anything the site
/// adds later is carried verbatim in [`Stage::Other`] so caches round-trip.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Stage {
    Design,
    Unclaimed,
    ClaimPending,
    InDevelopment,
    PendingReview,
    UnderReview,
    ReadyToMerge,
    Merged,
    Other(String),
}

impl Stage {
    /// All known stages in site order.
    pub const ORDERED: [Stage; 8] = [
        Stage::Design,
        Stage::Unclaimed,
        Stage::ClaimPending,
        Stage::InDevelopment,
        Stage::PendingReview,
        Stage::UnderReview,
        Stage::ReadyToMerge,
        Stage::Merged,
    ];

    pub fn parse(text: &str) -> Self {
        let norm = crate::core::sanitize::normalize_ws(text).to_ascii_lowercase();
        match norm.as_str() {
            "design" => Stage::Design,
            "unclaimed" => Stage::Unclaimed,
            "claim pending" => Stage::ClaimPending,
            "in development" => Stage::InDevelopment,
            "pending review" => Stage::PendingReview,
            "under review" => Stage::UnderReview,
            "ready to merge" => Stage::ReadyToMerge,
            "merged" => Stage::Merged,
            _ => Stage::Other(text.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Stage::Design => "Design",
            Stage::Unclaimed => "Unclaimed",
            Stage::ClaimPending => "Claim Pending",
            Stage::InDevelopment => "In Development",
            Stage::PendingReview => "Pending Review",
            Stage::UnderReview => "Under Review",
            Stage::ReadyToMerge => "Ready to Merge",
            Stage::Merged => "Merged",
            Stage::Other(s) => s.as_str(),
        }
    }

    /// Position in [`Stage::ORDERED`]; `None` for stages the site invented later.
    pub fn rank(&self) -> Option<usize> {
        Stage::ORDERED.iter().position(|s| s == self)
    }
}

impl Default for Stage {
    fn default() -> Self {
        Stage::Other(s!())
    }
}

impl From<String> for Stage {
    fn from(s: String) -> Self {
        Stage::parse(&s)
    }
}

impl From<Stage> for String {
    fn from(s: Stage) -> Self {
        match s {
            Stage::Other(raw) => raw,
            known => s!(known.label()),
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Other(s) if s.is_empty() => f.write_str("Unknown"),
            _ => f.write_str(self.label()),
        }
    }
}

/// Which step supplied a claim's coordinate.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordSource {
    /// Read from the claim description at scrape time.
    Scraped,
    Ocr,
    Title,
    Url,
    Correction,
    #[default]
    #[serde(other)]
    Unresolved,
}

impl CoordSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            CoordSource::Scraped => "scraped",
            CoordSource::Ocr => "ocr",
            CoordSource::Title => "title",
            CoordSource::Url => "url",
            CoordSource::Correction => "correction",
            CoordSource::Unresolved => "unresolved",
        }
    }
}

impl fmt::Display for CoordSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimRecord {
    /// Detail-page URL; unique.
    pub id: String,
    pub title: String,
    pub status: Stage,
    pub claimant: Option<String>,
    pub reviewer: Option<String>,
    pub image_ref: Option<String>,
    pub detail_url: Option<String>,
    pub description: Option<String>,
    pub last_update: Option<String>,
    /// Cell written in the description at scrape time; resolution never touches it.
    pub scraped_coord: Option<Cell>,
    pub coord: Option<Cell>,
    pub coord_source: CoordSource,
}

impl ClaimRecord {
    pub fn new(id: impl Into<String>, title: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), ..Default::default() }
    }

    pub fn is_located(&self) -> bool {
        self.coord.is_some()
    }

    pub fn locate(&mut self, cell: Cell, source: CoordSource) {
        self.coord = Some(cell);
        self.coord_source = source;
    }

    pub fn mark_unresolved(&mut self) {
        self.coord = None;
        self.coord_source = CoordSource::Unresolved;
    }

    /// Record the cell found in the description; it also becomes the current coordinate.
    pub fn set_scraped(&mut self, cell: Cell) {
        self.scraped_coord = Some(cell);
        self.locate(cell, CoordSource::Scraped);
    }

    /// Drop whatever a previous resolution pass inferred and fall back to
    /// the scraped cell, if any.
    pub fn clear_inferred(&mut self) {
        match self.scraped_coord {
            Some(cell) => self.locate(cell, CoordSource::Scraped),
            None => self.mark_unresolved(),
        }
    }

    /// URL used for display and hint lookups: the detail page when known, else the id.
    pub fn link(&self) -> &str {
        self.detail_url.as_deref().unwrap_or(&self.id)
    }
}
