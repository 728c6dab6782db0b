// src/specs/claims_list.rs
//! Claims browser listing (`/claims/interiors?page=N`).
//!
//! One table row per claim: the claim link is the first anchor whose href
//! mentions `claims`, and `td.last-updated` carries the update date. The
//! pager's `li.pager-next > a` links the next page.

use crate::core::html::{attr, elements, find_by_class, open_tag_at, text_of};
use crate::core::sanitize::non_empty;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingRow {
    /// Link to the claim page as written in the listing (may be relative).
    pub href: String,
    pub title: String,
    pub last_update: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ListingPage {
    pub rows: Vec<ListingRow>,
    pub next: Option<String>,
}

pub fn parse(doc: &str) -> ListingPage {
    let mut rows = Vec::new();

    for body in elements(doc, "tbody") {
        for tr in elements(body, "tr") {
            if let Some(row) = parse_row(tr) {
                rows.push(row);
            }
        }
    }

    ListingPage { rows, next: next_page(doc) }
}

fn parse_row(tr: &str) -> Option<ListingRow> {
    let (href, title) = elements(tr, "td")
        .into_iter()
        .flat_map(|td| elements(td, "a"))
        .find_map(|a| {
            let href = attr(open_tag_at(a, 0)?, "href")?;
            href.contains("claims").then(|| (href, text_of(a)))
        })?;

    let last_update = find_by_class(tr, "td", "last-updated", 0).and_then(|(s, e)| non_empty(text_of(&tr[s..e])));

    Some(ListingRow { href, title, last_update })
}

fn next_page(doc: &str) -> Option<String> {
    let (s, e) = find_by_class(doc, "li", "pager-next", 0)?;
    let a = elements(&doc[s..e], "a").into_iter().next()?;
    attr(open_tag_at(a, 0)?, "href").filter(|h| !h.trim().is_empty())
}
