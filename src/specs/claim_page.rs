// src/specs/claim_page.rs
//! Claim detail page (`/claims/<slug>`).
//!
//! Fields:
//! - title: `h1#page-title`
//! - description: `div.claim-description`, paragraphs joined by spaces
//! - stage: first `li` of `section.claim-stage`
//! - claimant: first anchor of `section.field-claimant` (members only)
//! - reviewers: every anchor of `section.field-reviewers`, joined with ", "
//! - image: first `a.colorbox` inside `div.claims-images`, its `href`

use crate::core::html::{attr, elements, find_by_class, find_by_id, open_tag_at, text_of};
use crate::core::sanitize::non_empty;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ClaimPage {
    pub title: Option<String>,
    pub description: Option<String>,
    pub stage: Option<String>,
    pub claimant: Option<String>,
    pub reviewers: Option<String>,
    /// Full-size image link (may be relative).
    pub image: Option<String>,
}

pub fn parse(doc: &str) -> ClaimPage {
    let block = |tag: &str, class: &str| find_by_class(doc, tag, class, 0).map(|(s, e)| &doc[s..e]);

    let title = find_by_id(doc, "h1", "page-title").and_then(|(s, e)| non_empty(text_of(&doc[s..e])));

    let description = block("div", "claim-description").and_then(|div| non_empty(text_of(div)));

    let stage = block("section", "claim-stage")
        .and_then(|sec| elements(sec, "li").into_iter().map(text_of).find(|t| !t.is_empty()));

    let claimant = block("section", "field-claimant")
        .and_then(|sec| elements(sec, "a").into_iter().map(text_of).find(|t| !t.is_empty()));

    let reviewers = block("section", "field-reviewers").and_then(|sec| {
        let names: Vec<String> = elements(sec, "a").into_iter().map(text_of).filter(|t| !t.is_empty()).collect();
        non_empty(names.join(", "))
    });

    let image = block("div", "claims-images").and_then(|div| {
        let (s, _) = find_by_class(div, "a", "colorbox", 0)?;
        attr(open_tag_at(div, s)?, "href").filter(|h| !h.trim().is_empty())
    });

    ClaimPage { title, description, stage, claimant, reviewers, image }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
<h1 class="title" id="page-title">Old Ebonheart, Tailor</h1>
<article class="node node-claim">
  <section class="field claim-stage"><h2>Stage</h2>
    <section class="claim-stage"><ul><li class="active">In Development</li></ul></section>
  </section>
  <section class="field field-claimant"><section class="field-claimant"><a href="/user/7">Vivec</a></section></section>
  <section class="field field-reviewers"><section class="field-reviewers">
    <a href="/user/8">Almalexia</a> <a href="/user/9">Sotha Sil</a>
  </section></section>
  <div class="field claim-description"><p>Exterior cell: 5, -3.</p><p>Small &amp; cosy.</p></div>
  <div class="claims-images">
    <a class="colorbox init" href="https://www.tamriel-rebuilt.org/sites/default/files/claims/tailor.jpg"><img src="thumb.jpg"></a>
  </div>
</article>
"#;

    #[test]
    fn reads_all_fields() {
        let p = parse(PAGE);
        assert_eq!(p.title.as_deref(), Some("Old Ebonheart, Tailor"));
        assert_eq!(p.stage.as_deref(), Some("In Development"));
        assert_eq!(p.claimant.as_deref(), Some("Vivec"));
        assert_eq!(p.reviewers.as_deref(), Some("Almalexia, Sotha Sil"));
        assert_eq!(p.description.as_deref(), Some("Exterior cell: 5, -3. Small & cosy."));
        assert_eq!(
            p.image.as_deref(),
            Some("https://www.tamriel-rebuilt.org/sites/default/files/claims/tailor.jpg")
        );
    }

    #[test]
    fn anonymous_page_has_no_people() {
        let p = parse(r#"<h1 id="page-title">Shack</h1><div class="claim-description">Nothing.</div>"#);
        assert_eq!(p.title.as_deref(), Some("Shack"));
        assert_eq!(p.description.as_deref(), Some("Nothing."));
        assert_eq!(p.claimant, None);
        assert_eq!(p.reviewers, None);
        assert_eq!(p.image, None);
    }
}
