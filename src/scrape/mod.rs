// src/scrape/mod.rs
//! Claims browser crawl: listing pages first, then every claim page.
//!
//! Listing pages are walked sequentially (each names the next). Claim pages
//! are fetched by a small worker pool and re-assembled in listing order.

use std::{
    collections::HashSet,
    sync::{
        atomic::{AtomicUsize, Ordering},
        mpsc, Arc,
    },
    thread,
    time::Duration,
};

use tracing::{info, warn};

use crate::claim::{ClaimRecord, Stage};
use crate::config::consts::{JITTER_MS, MAX_LISTING_PAGES, REQUEST_PAUSE_MS, WORKERS};
use crate::config::options::ScrapeOptions;
use crate::core::coords::description_cell;
use crate::core::net::Session;
use crate::error::ScrapeError;
use crate::progress::Progress;
use crate::specs::{claim_page, claims_list};

/// One listed claim, link made absolute.
#[derive(Clone, Debug)]
struct Listed {
    url: String,
    title: String,
    last_update: Option<String>,
}

/// Walk the listing from `start`, following "next" links.
fn list_claims(session: &Session, start: &str, progress: &mut Option<&mut (dyn Progress + '_)>) -> Result<Vec<Listed>, ScrapeError> {
    let mut out = Vec::new();
    let mut seen_pages = HashSet::new();
    let mut seen_claims = HashSet::new();
    let mut next = Some(session.absolute(start)?);

    while let Some(url) = next.take() {
        if !seen_pages.insert(url.clone()) {
            warn!(%url, "Listing links back to a page already read; stopping");
            break;
        }
        if seen_pages.len() > MAX_LISTING_PAGES {
            warn!(limit = MAX_LISTING_PAGES, "Too many listing pages; stopping");
            break;
        }

        let page = claims_list::parse(&session.get_text(&url)?);
        if seen_pages.len() == 1 && page.rows.is_empty() {
            return Err(ScrapeError::Layout { url, what: "claims table (tbody/tr with a claims link)" });
        }
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Listing page {} ({} claims)", seen_pages.len(), page.rows.len()));
        }

        for row in page.rows {
            let abs = session.absolute(&row.href)?;
            if seen_claims.insert(abs.clone()) {
                out.push(Listed { url: abs, title: row.title, last_update: row.last_update });
            }
        }
        next = page.next.map(|h| session.absolute(&h)).transpose()?;
    }

    info!(pages = seen_pages.len(), claims = out.len(), "Listing read");
    Ok(out)
}

fn fetch_claim(session: &Session, listed: &Listed) -> Result<ClaimRecord, ScrapeError> {
    let page = claim_page::parse(&session.get_text(&listed.url)?);

    let title = page.title.unwrap_or_else(|| listed.title.clone());
    let mut claim = ClaimRecord::new(listed.url.clone(), title);
    claim.status = page.stage.as_deref().map(Stage::parse).unwrap_or_default();
    claim.claimant = page.claimant;
    claim.reviewer = page.reviewers;
    claim.detail_url = Some(listed.url.clone());
    claim.last_update = listed.last_update.clone();
    claim.image_ref = page.image.map(|h| session.absolute(&h)).transpose()?;

    if let Some(cell) = page.description.as_deref().and_then(description_cell) {
        claim.set_scraped(cell);
    }
    claim.description = page.description;
    Ok(claim)
}

/// Scrape every claim reachable from `opts.url`, logging in first when
/// credentials are given. Claim pages that fail are logged and left out.
pub fn collect_claims(
    session: &Session,
    opts: &ScrapeOptions,
    mut progress: Option<&mut (dyn Progress + '_)>,
) -> Result<Vec<ClaimRecord>, ScrapeError> {
    if let Some(c) = &opts.credentials {
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("Logging in as {}…", c.name));
        }
        session.login(&c.name, &c.password)?;
    }

    let listed = Arc::new(list_claims(session, &opts.url, &mut progress)?);
    if let Some(p) = progress.as_deref_mut() {
        p.begin("Fetching claims", listed.len());
    }

    type FetchOk = (usize, ClaimRecord);
    type FetchErr = (usize, String);

    let counter = Arc::new(AtomicUsize::new(0));
    let (res_tx, res_rx) = mpsc::channel::<Result<FetchOk, FetchErr>>();
    let workers = WORKERS.min(listed.len()).max(1);

    for _ in 0..workers {
        let listed = Arc::clone(&listed);
        let idx = Arc::clone(&counter);
        let tx = res_tx.clone();
        let session = session.clone();

        thread::spawn(move || loop {
            let i = idx.fetch_add(1, Ordering::Relaxed);
            if i >= listed.len() {
                break;
            }
            let result = match fetch_claim(&session, &listed[i]) {
                Ok(claim) => Ok((i, claim)),
                Err(e) => Err((i, e.to_string())),
            };
            if tx.send(result).is_err() {
                break;
            }
            let jitter = (i as u64 * 7) % JITTER_MS;
            thread::sleep(Duration::from_millis(REQUEST_PAUSE_MS + jitter)); // be polite
        });
    }
    drop(res_tx);

    let mut fetched: Vec<FetchOk> = Vec::with_capacity(listed.len());
    let mut failed = 0usize;
    for done in 1..=listed.len() {
        match res_rx.recv() {
            Ok(Ok(item)) => fetched.push(item),
            Ok(Err((i, msg))) => {
                failed += 1;
                warn!(url = %listed[i].url, error = %msg, "Skipping claim page");
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(&listed[i].title);
                }
            }
            Err(_) => break,
        }
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(done);
        }
    }

    fetched.sort_by_key(|(i, _)| *i);
    let claims: Vec<ClaimRecord> = fetched.into_iter().map(|(_, c)| c).collect();
    info!(claims = claims.len(), failed, "Scrape finished");
    Ok(claims)
}
