// src/summary.rs
//! Per-cell aggregation of located claims, shared by the PNG renderer and the GUI.

use std::collections::BTreeMap;

use crate::claim::{ClaimRecord, Stage};
use crate::grid::Cell;

/// Everything drawn for one map marker.
#[derive(Clone, Debug, PartialEq)]
pub struct CellSummary {
    pub cell: Cell,
    pub count: usize,
    /// Representative stage; `None` when no claim has a known stage.
    pub stage_mean: Option<Stage>,
    /// Stages present and how often, in site order.
    pub stage_counts: Vec<(Stage, usize)>,
    /// One line per claim, least advanced first.
    pub details: Vec<String>,
}

impl CellSummary {
    /// Marker weight: grows with the log of the claim count.
    pub fn map_size(&self) -> f32 {
        ((self.count + 1) as f32).ln() * 30.0
    }

    pub fn details_text(&self) -> String {
        self.details.join("\n")
    }
}

/// "Title: Stage, claimant: X, reviewers: Y"
pub fn details_line(claim: &ClaimRecord) -> String {
    let mut txt = format!("{}: {}", claim.title, claim.status);
    if let Some(c) = claim.claimant.as_deref().filter(|c| !c.is_empty()) {
        txt.push_str(&format!(", claimant: {c}"));
    }
    if let Some(r) = claim.reviewer.as_deref().filter(|r| !r.is_empty()) {
        txt.push_str(&format!(", reviewers: {r}"));
    }
    txt
}

/// Stage that best represents a group.
///
/// Takes the mean of the stage ranks, rounded half to even, and returns the
/// present stage closest to it (first one on ties). A group of Design claims
/// mixed with anything further along ignores the Design ones, so work in
/// progress is not hidden under a Design marker. Unknown stages are ignored.
pub fn stage_mean(stages: &[Stage]) -> Option<Stage> {
    let ranks: Vec<usize> = stages.iter().filter_map(Stage::rank).collect();
    mean_rank(&ranks).map(|r| Stage::ORDERED[r].clone())
}

fn mean_rank(ranks: &[usize]) -> Option<usize> {
    if ranks.is_empty() {
        return None;
    }
    let mean = ranks.iter().sum::<usize>() as f64 / ranks.len() as f64;
    let target = mean.round_ties_even();
    let closest = ranks
        .iter()
        .copied()
        .min_by(|a, b| (*a as f64 - target).abs().total_cmp(&(*b as f64 - target).abs()))?;

    if closest == 0 && ranks.iter().any(|&r| r > 0) {
        let advanced: Vec<usize> = ranks.iter().copied().filter(|&r| r > 0).collect();
        return mean_rank(&advanced);
    }
    Some(closest)
}

/// Stage histogram: known stages in site order, then the rest by name.
pub fn stage_counts(stages: &[Stage]) -> Vec<(Stage, usize)> {
    let mut counts: Vec<(Stage, usize)> = Vec::new();
    for s in stages {
        match counts.iter_mut().find(|(k, _)| k == s) {
            Some((_, n)) => *n += 1,
            None => counts.push((s.clone(), 1)),
        }
    }
    counts.sort_by(|(a, _), (b, _)| match (a.rank(), b.rank()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.label().cmp(b.label()),
    });
    counts
}

/// Group located claims by cell. Unlocated claims are skipped.
pub fn summarize(claims: &[ClaimRecord]) -> Vec<CellSummary> {
    let mut by_cell: BTreeMap<Cell, Vec<&ClaimRecord>> = BTreeMap::new();
    for c in claims {
        if let Some(cell) = c.coord {
            by_cell.entry(cell).or_default().push(c);
        }
    }

    by_cell
        .into_iter()
        .map(|(cell, mut group)| {
            group.sort_by_key(|c| c.status.rank().unwrap_or(usize::MAX));
            let stages: Vec<Stage> = group.iter().map(|c| c.status.clone()).collect();
            CellSummary {
                cell,
                count: group.len(),
                stage_mean: stage_mean(&stages),
                stage_counts: stage_counts(&stages),
                details: group.iter().map(|c| details_line(c)).collect(),
            }
        })
        .collect()
}

/// Stages that some marker represents, in site order.
pub fn present_stages(summaries: &[CellSummary]) -> Vec<Stage> {
    Stage::ORDERED
        .iter()
        .filter(|s| summaries.iter().any(|c| c.stage_mean.as_ref() == Some(*s)))
        .cloned()
        .collect()
}
