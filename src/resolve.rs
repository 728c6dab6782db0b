// src/resolve.rs
//! Runs the selected methods over the claims and merges their answers.
//!
//! Fill methods (`i`, `t`, `u`) are tried in the order given until one
//! answers. The correction method always runs last, whatever its position
//! in the sequence, because it may need the coordinate the others found.

use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use tracing::{debug, info, warn};

use crate::claim::{ClaimRecord, CoordSource};
use crate::config::options::{ResolveOptions, StoreOptions};
use crate::core::net::Session;
use crate::error::ConfigError;
use crate::methods::{
    CorrectionMethod, ImageMethod, ImageSource, LocalFiles, Method, MethodSequence, MethodTag, TesseractCli, TitleMethod,
    UrlMethod,
};
use crate::progress::Progress;
use crate::tables::{Corrections, NameHints, UrlHints};

/// What the correction method may do to a claim that already has a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CorrectionPolicy {
    /// Table wins over everything, scraped cells included.
    #[default]
    Override,
    /// Only claims nothing else located.
    FillOnly,
}

impl FromStr for CorrectionPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "override" => Ok(CorrectionPolicy::Override),
            "fill-only" | "fill_only" | "fill" => Ok(CorrectionPolicy::FillOnly),
            other => Err(ConfigError::Invalid {
                field: "correction-policy",
                message: format!("{other:?} (expected override or fill-only)"),
            }),
        }
    }
}

impl fmt::Display for CorrectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CorrectionPolicy::Override => "override",
            CorrectionPolicy::FillOnly => "fill-only",
        })
    }
}

/// Outcome of one resolution pass.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolutionReport {
    pub total: usize,
    /// Final source of every claim, unresolved included.
    pub by_source: BTreeMap<CoordSource, usize>,
    /// Claims the correction table changed.
    pub corrected: usize,
    /// Method failures downgraded to "no result".
    pub failures: usize,
    pub unresolved: Vec<String>,
}

impl ResolutionReport {
    pub fn count(&self, source: CoordSource) -> usize {
        self.by_source.get(&source).copied().unwrap_or(0)
    }

    pub fn located(&self) -> usize {
        self.total - self.unresolved.len()
    }
}

impl fmt::Display for ResolutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} claims, {} located", self.total, self.located())?;
        for (src, n) in &self.by_source {
            write!(f, ", {src}: {n}")?;
        }
        if self.corrected > 0 {
            write!(f, " ({} corrected)", self.corrected)?;
        }
        Ok(())
    }
}

/// Ordered method chain.
pub struct Resolver {
    fill: Vec<Box<dyn Method>>,
    correction: Option<Box<dyn Method>>,
    policy: CorrectionPolicy,
    ocr: Option<Arc<ImageMethod>>,
}

impl Resolver {
    /// Build from ready-made methods, in precedence order. Any correction
    /// method is pulled out and run last.
    pub fn new(methods: Vec<Box<dyn Method>>, policy: CorrectionPolicy) -> Self {
        let mut fill = Vec::with_capacity(methods.len());
        let mut correction = None;
        for m in methods {
            if m.tag() == MethodTag::Correction {
                correction.get_or_insert(m);
            } else {
                fill.push(m);
            }
        }
        Self { fill, correction, policy, ocr: None }
    }

    /// Load the tables the enabled methods need and wire up the chain.
    /// Tables for disabled methods are never read.
    /// Without a `session`, thumbnails are read from disk only.
    pub fn from_options(
        opts: &ResolveOptions,
        store: &StoreOptions,
        session: Option<&Session>,
    ) -> Result<Self, ConfigError> {
        let mut methods: Vec<Box<dyn Method>> = Vec::new();
        let mut ocr = None;

        for tag in opts.methods.iter() {
            match tag {
                MethodTag::Image => {
                    let source: Box<dyn ImageSource> = match session {
                        Some(s) => Box::new(s.clone()),
                        None => Box::new(LocalFiles),
                    };
                    let m = Arc::new(
                        ImageMethod::new(source, Box::new(TesseractCli::new(&opts.tesseract)))
                            .with_memo_file(&store.ocr_cache()),
                    );
                    ocr = Some(m.clone());
                    methods.push(Box::new(m));
                }
                MethodTag::Title => {
                    let names = NameHints::load(&opts.name_hints_path())?;
                    if names.is_empty() {
                        warn!(path = %opts.name_hints_path().display(), "Name hint table is empty; 't' will not answer");
                    }
                    methods.push(Box::new(TitleMethod::new(Arc::new(names))));
                }
                MethodTag::Url => {
                    let hints = UrlHints::load(&opts.url_hints_path())?;
                    if hints.is_empty() {
                        warn!(path = %opts.url_hints_path().display(), "URL hint table is empty; 'u' will not answer");
                    }
                    methods.push(Box::new(UrlMethod::new(Arc::new(hints))));
                }
                MethodTag::Correction => {
                    let table = Corrections::load(&opts.corrections_path())?;
                    if table.is_empty() {
                        warn!(path = %opts.corrections_path().display(), "Correction table is empty; 'e' will not answer");
                    }
                    methods.push(Box::new(CorrectionMethod::new(Arc::new(table))));
                }
            }
        }

        let mut r = Self::new(methods, opts.policy);
        r.ocr = ocr;
        Ok(r)
    }

    /// Handle on the image method, when enabled.
    pub fn ocr(&self) -> Option<&ImageMethod> {
        self.ocr.as_deref()
    }

    /// Sequence actually applied, correction last.
    pub fn sequence(&self) -> MethodSequence {
        MethodSequence::new(self.fill.iter().chain(self.correction.iter()).map(|m| m.tag()))
    }

    /// Resolve one claim in place. Returns `(corrected, failures)`.
    pub fn resolve_claim(&self, claim: &mut ClaimRecord) -> (bool, usize) {
        let mut failures = 0;

        if claim.coord.is_none() {
            for m in &self.fill {
                match m.locate(claim) {
                    Ok(Some(cell)) => {
                        claim.locate(cell, m.tag().source());
                        break;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(claim = %claim.id, method = m.tag().name(), error = %e, "Method failed");
                        failures += 1;
                    }
                }
            }
        }

        let mut corrected = false;
        if let Some(m) = &self.correction {
            let allowed = match self.policy {
                CorrectionPolicy::Override => true,
                CorrectionPolicy::FillOnly => claim.coord.is_none(),
            };
            if allowed {
                match m.locate(claim) {
                    Ok(Some(cell)) => {
                        debug!(claim = %claim.id, from = ?claim.coord, to = %cell, "Corrected");
                        claim.locate(cell, CoordSource::Correction);
                        corrected = true;
                    }
                    Ok(None) => {}
                    Err(e) => {
                        debug!(claim = %claim.id, method = m.tag().name(), error = %e, "Method failed");
                        failures += 1;
                    }
                }
            }
        }

        if claim.coord.is_none() {
            claim.mark_unresolved();
        }
        (corrected, failures)
    }

    pub fn resolve_all(&self, claims: &mut [ClaimRecord], mut progress: Option<&mut (dyn Progress + '_)>) -> ResolutionReport {
        let mut report = ResolutionReport { total: claims.len(), ..Default::default() };
        if let Some(p) = progress.as_deref_mut() {
            p.begin("Resolving", claims.len());
        }

        for (i, claim) in claims.iter_mut().enumerate() {
            let (corrected, failures) = self.resolve_claim(claim);
            report.corrected += usize::from(corrected);
            report.failures += failures;
            *report.by_source.entry(claim.coord_source).or_default() += 1;
            if claim.coord.is_none() {
                report.unresolved.push(claim.id.clone());
            }
            if let Some(p) = progress.as_deref_mut() {
                p.item_done(i + 1);
            }
        }

        info!(
            methods = %self.sequence(),
            policy = %self.policy,
            located = report.located(),
            unresolved = report.unresolved.len(),
            corrected = report.corrected,
            failures = report.failures,
            "Resolution finished"
        );
        if let Some(p) = progress.as_deref_mut() {
            p.log(&report.to_string());
        }
        report
    }
}
