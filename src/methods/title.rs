// src/methods/title.rs
use std::sync::Arc;

use super::{Method, MethodTag};
use crate::claim::ClaimRecord;
use crate::core::coords::{bracketed_cell, labeled_cell};
use crate::error::MethodFailure;
use crate::grid::Cell;
use crate::tables::NameHints;

/// Coordinates written into the claim title, or a known place name in it.
///
/// Tried in order: `x=.. y=..` labels, a bracketed pair, then name hints.
pub struct TitleMethod {
    names: Arc<NameHints>,
}

impl TitleMethod {
    pub fn new(names: Arc<NameHints>) -> Self {
        Self { names }
    }
}

impl Method for TitleMethod {
    fn tag(&self) -> MethodTag {
        MethodTag::Title
    }

    fn locate(&self, claim: &ClaimRecord) -> Result<Option<Cell>, MethodFailure> {
        let title = claim.title.as_str();
        Ok(labeled_cell(title)
            .or_else(|| bracketed_cell(title))
            .or_else(|| self.names.find_in(title)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn method() -> TitleMethod {
        TitleMethod::new(Arc::new(NameHints::from_pairs([("Firewatch", (18, 7))])))
    }

    #[test]
    fn reads_pairs_before_names() {
        let m = method();
        let c = ClaimRecord::new("u", "Firewatch Shack [12,-5]");
        assert_eq!(m.locate(&c).unwrap(), Some(Cell::new(12, -5)));
        let c = ClaimRecord::new("u", "firewatch guild hall");
        assert_eq!(m.locate(&c).unwrap(), Some(Cell::new(18, 7)));
        let c = ClaimRecord::new("u", "Random claim name");
        assert_eq!(m.locate(&c).unwrap(), None);
    }
}
