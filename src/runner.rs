// src/runner.rs
//! End-to-end pipeline shared by the CLI and the GUI:
//! tables → claims (scrape or cache) → resolve → save → map.

use std::{cell::OnceCell, collections::HashSet, path::PathBuf};

use tracing::{info, warn};

use crate::{
    claim::{ClaimRecord, Stage},
    config::options::{AppOptions, ScrapeMode},
    core::net::Session,
    error::Result,
    methods::MethodTag,
    progress::Progress,
    render,
    resolve::{ResolutionReport, Resolver},
    scrape, store,
    summary::{self, CellSummary},
};

/// What a run produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub claims: Vec<ClaimRecord>,
    pub report: ResolutionReport,
    pub cells: Vec<CellSummary>,
    /// Claims came from the website rather than the cache.
    pub scraped: bool,
    pub map_written: Option<PathBuf>,
}

impl RunSummary {
    pub fn unresolved(&self) -> impl Iterator<Item = &ClaimRecord> {
        self.claims.iter().filter(|c| !c.is_located())
    }
}

/// Stages left off the static map unless asked for.
pub fn default_hidden_stages() -> HashSet<Stage> {
    HashSet::from([Stage::Design])
}

/// HTTP session built on first use, so cache-only runs never touch the
/// claims URL.
struct LazySession<'a> {
    url: &'a str,
    cell: OnceCell<Session>,
}

impl<'a> LazySession<'a> {
    fn new(url: &'a str) -> Self {
        Self { url, cell: OnceCell::new() }
    }

    fn get(&self) -> Result<&Session> {
        if let Some(s) = self.cell.get() {
            return Ok(s);
        }
        let s = Session::new(self.url)?;
        Ok(self.cell.get_or_init(|| s))
    }
}

/// Run the whole pipeline. Configuration problems (bad tables, bad
/// sequence) surface before any network or cache access.
pub fn run(opts: &AppOptions, mut progress: Option<&mut dyn Progress>) -> Result<RunSummary> {
    let web = LazySession::new(&opts.scrape.url);
    // Remote thumbnails need the session even when claims come from the cache.
    let images = if opts.resolve.methods.contains(MethodTag::Image) { Some(web.get()?) } else { None };
    let resolver = Resolver::from_options(&opts.resolve, &opts.store, images)?;

    let (mut claims, scraped) = obtain_claims(opts, &web, progress.as_deref_mut())?;

    if !opts.resolve.keep_resolved {
        claims.iter_mut().for_each(ClaimRecord::clear_inferred);
    }

    let report = resolver.resolve_all(&mut claims, progress.as_deref_mut());
    store::save(&opts.store.cache, &claims)?;

    if let Some(ocr) = resolver.ocr() {
        let path = opts.store.ocr_cache();
        if let Err(e) = ocr.save_memo(&path) {
            warn!(path = %path.display(), error = %e, "Could not save OCR cache");
        }
    }

    let cells = summary::summarize(&claims);
    let map_written = match &opts.map.out {
        Some(path) => {
            if let Some(p) = progress.as_deref_mut() {
                p.log("Drawing map…");
            }
            let img = render::render_map(&cells, &opts.map, &default_hidden_stages())?;
            render::save_png(&img, path)?;
            Some(path.clone())
        }
        None => None,
    };

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    Ok(RunSummary { claims, report, cells, scraped, map_written })
}

/// Claims from the website or the cache, per the scrape mode. `Never`
/// treats any cache problem as fatal; `IfMissing` scrapes instead.
fn obtain_claims(
    opts: &AppOptions,
    web: &LazySession<'_>,
    progress: Option<&mut (dyn Progress + '_)>,
) -> Result<(Vec<ClaimRecord>, bool)> {
    let cache = &opts.store.cache;
    match opts.scrape.mode {
        ScrapeMode::Always => Ok((scrape::collect_claims(web.get()?, &opts.scrape, progress)?, true)),
        ScrapeMode::Never => Ok((store::load(cache)?, false)),
        ScrapeMode::IfMissing => match store::load(cache) {
            Ok(claims) => Ok((claims, false)),
            Err(e) => {
                warn!(error = %e, "Cache unusable; scraping instead");
                info!(url = %opts.scrape.url, "Scraping claims");
                Ok((scrape::collect_claims(web.get()?, &opts.scrape, progress)?, true))
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::options::{MapOptions, ResolveOptions, ScrapeOptions, StoreOptions};
    use crate::error::{CacheError, ConfigError, Error, ScrapeError};
    use crate::claim::CoordSource;
    use crate::grid::Cell;
    use std::fs;

    fn options(dir: &std::path::Path, methods: &str) -> AppOptions {
        AppOptions {
            // Unparsable on purpose: any attempt to go online fails fast.
            scrape: ScrapeOptions { mode: ScrapeMode::Never, url: s!("not a url"), ..ScrapeOptions::default() },
            store: StoreOptions { cache: dir.join("claims.json"), dir: dir.join(".store") },
            resolve: ResolveOptions { methods: methods.parse().unwrap(), data_dir: dir.to_path_buf(), ..ResolveOptions::default() },
            map: MapOptions::default(),
        }
    }

    #[test]
    fn missing_table_stops_before_cache_is_touched() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&options(dir.path(), "t"), None).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::TableIo { .. })));
    }

    #[test]
    fn cached_claims_are_resolved_and_saved() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("name_hints.json"), r#"{"Firewatch": [18, 7]}"#).unwrap();
        fs::write(
            dir.path().join("claims.json"),
            r#"[{"url": "https://x.org/claims/a", "title": "Firewatch Shack", "stage": "Merged"},
                {"url": "https://x.org/claims/b", "title": "Lost Cave", "stage": "Design"}]"#,
        )
        .unwrap();

        let summary = run(&options(dir.path(), "t"), None).unwrap();
        assert!(!summary.scraped);
        assert_eq!(summary.claims[0].coord, Some(Cell::new(18, 7)));
        assert_eq!(summary.report.unresolved, vec![s!("https://x.org/claims/b")]);
        assert_eq!(summary.cells.len(), 1);

        let reloaded = store::load(&dir.path().join("claims.json")).unwrap();
        assert_eq!(reloaded, summary.claims);
    }

    fn with_mode(dir: &std::path::Path, mode: ScrapeMode) -> AppOptions {
        let mut opts = options(dir, "u");
        opts.scrape.mode = mode;
        fs::write(dir.join("url_hints.json"), "{}").unwrap();
        opts
    }

    #[test]
    fn cache_only_run_fails_on_missing_cache() {
        let dir = tempfile::tempdir().unwrap();
        let err = run(&with_mode(dir.path(), ScrapeMode::Never), None).unwrap_err();
        assert!(matches!(err, Error::Cache(CacheError::Missing(_))), "{err}");
    }

    #[test]
    fn cache_only_run_fails_on_corrupt_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("claims.json"), "[{\"url\": ").unwrap();
        let err = run(&with_mode(dir.path(), ScrapeMode::Never), None).unwrap_err();
        assert!(matches!(err, Error::Cache(CacheError::Corrupt { .. })), "{err}");
    }

    #[test]
    fn cache_only_run_never_builds_a_session() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("claims.json"), "[]").unwrap();
        let summary = run(&with_mode(dir.path(), ScrapeMode::Never), None).unwrap();
        assert!(!summary.scraped);
        assert!(summary.claims.is_empty());
    }

    #[test]
    fn if_missing_prefers_a_readable_cache() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("claims.json"), r#"[{"url": "https://x.org/claims/a", "title": "Ald Iuval"}]"#)
            .unwrap();
        let summary = run(&with_mode(dir.path(), ScrapeMode::IfMissing), None).unwrap();
        assert!(!summary.scraped);
        assert_eq!(summary.claims.len(), 1);
    }

    #[test]
    fn if_missing_scrapes_when_cache_is_absent_or_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let opts = with_mode(dir.path(), ScrapeMode::IfMissing);

        let err = run(&opts, None).unwrap_err();
        assert!(matches!(err, Error::Scrape(ScrapeError::Url(_))), "{err}");

        fs::write(dir.path().join("claims.json"), "not json").unwrap();
        let err = run(&opts, None).unwrap_err();
        assert!(matches!(err, Error::Scrape(ScrapeError::Url(_))), "{err}");
    }

    #[test]
    fn image_method_needs_a_valid_url_even_without_scraping() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("claims.json"), "[]").unwrap();
        let opts = options(dir.path(), "i");
        let err = run(&opts, None).unwrap_err();
        assert!(matches!(err, Error::Scrape(ScrapeError::Url(_))), "{err}");
    }

    #[test]
    fn kept_claims_report_their_recorded_source() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("claims.json"),
            r#"[{"url": "https://x.org/claims/a", "title": "Tel Ouada", "cell_x": 9, "cell_y": -3, "coord_source": "ocr"}]"#,
        )
        .unwrap();
        let mut opts = with_mode(dir.path(), ScrapeMode::Never);
        opts.resolve.keep_resolved = true;

        let summary = run(&opts, None).unwrap();
        assert_eq!(summary.claims[0].coord, Some(Cell::new(9, -3)));
        assert_eq!(summary.report.count(CoordSource::Ocr), 1);

        opts.resolve.keep_resolved = false;
        let summary = run(&opts, None).unwrap();
        assert_eq!(summary.claims[0].coord, None);
        assert_eq!(summary.report.count(CoordSource::Ocr), 0);
    }
}
