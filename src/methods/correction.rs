// src/methods/correction.rs
use std::sync::Arc;

use super::{Method, MethodTag};
use crate::claim::ClaimRecord;
use crate::error::MethodFailure;
use crate::grid::Cell;
use crate::tables::Corrections;

/// Patches known-bad site data. Sees the claim's current coordinate, so the
/// orchestrator runs it after every other method.
pub struct CorrectionMethod {
    table: Arc<Corrections>,
}

impl CorrectionMethod {
    pub fn new(table: Arc<Corrections>) -> Self {
        Self { table }
    }
}

impl Method for CorrectionMethod {
    fn tag(&self) -> MethodTag {
        MethodTag::Correction
    }

    fn locate(&self, claim: &ClaimRecord) -> Result<Option<Cell>, MethodFailure> {
        Ok(self.table.lookup(claim))
    }
}
