// src/methods/url.rs
use std::sync::Arc;

use super::{Method, MethodTag};
use crate::claim::ClaimRecord;
use crate::error::MethodFailure;
use crate::grid::Cell;
use crate::tables::UrlHints;

/// Hand-collected claim URL → cell table.
pub struct UrlMethod {
    hints: Arc<UrlHints>,
}

impl UrlMethod {
    pub fn new(hints: Arc<UrlHints>) -> Self {
        Self { hints }
    }
}

impl Method for UrlMethod {
    fn tag(&self) -> MethodTag {
        MethodTag::Url
    }

    fn locate(&self, claim: &ClaimRecord) -> Result<Option<Cell>, MethodFailure> {
        let by_detail = claim.detail_url.as_deref().and_then(|u| self.hints.get(u));
        Ok(by_detail.or_else(|| self.hints.get(&claim.id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detail_url_then_id() {
        let m = UrlMethod::new(Arc::new(UrlHints::from_pairs([
            ("tamriel-rebuilt.org/claims/a", (1, 2)),
            ("tamriel-rebuilt.org/claims/b", (3, 4)),
        ])));

        let mut c = ClaimRecord::new("https://www.tamriel-rebuilt.org/claims/b", "x");
        assert_eq!(m.locate(&c).unwrap(), Some(Cell::new(3, 4)));

        c.detail_url = Some(s!("https://tamriel-rebuilt.org/claims/a"));
        assert_eq!(m.locate(&c).unwrap(), Some(Cell::new(1, 2)));

        let c = ClaimRecord::new("https://tamriel-rebuilt.org/claims/zzz", "x");
        assert_eq!(m.locate(&c).unwrap(), None);
    }
}
