// src/config/options.rs
use std::{fmt, path::PathBuf, str::FromStr};

use super::consts::*;
use crate::error::ConfigError;
use crate::grid::Calibration;
use crate::methods::MethodSequence;
use crate::render::Palette;
use crate::resolve::CorrectionPolicy;

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct AppOptions {
    pub scrape: ScrapeOptions,
    pub store: StoreOptions,
    pub resolve: ResolveOptions,
    pub map: MapOptions,
}

/// When to hit the website instead of the local cache.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum ScrapeMode {
    Always,
    Never,
    /// Use the cache; scrape only if it is missing or unreadable.
    #[default]
    IfMissing,
}

impl FromStr for ScrapeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" | "true" | "t" | "yes" | "y" | "1" => Ok(ScrapeMode::Always),
            "never" | "false" | "f" | "no" | "n" | "0" => Ok(ScrapeMode::Never),
            "if-missing" | "auto" => Ok(ScrapeMode::IfMissing),
            other => Err(ConfigError::Invalid {
                field: "scrape",
                message: format!("{other:?} (expected always, never or if-missing)"),
            }),
        }
    }
}

#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub name: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("name", &self.name)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeOptions {
    pub mode: ScrapeMode,
    /// Claims browser listing (first page); filters live in its query string.
    pub url: String,
    pub credentials: Option<Credentials>,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            mode: ScrapeMode::default(),
            url: s!(DEFAULT_CLAIMS_URL),
            credentials: None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreOptions {
    /// Scrape cache (JSON).
    pub cache: PathBuf,
    /// Working directory for the debug log and OCR memo.
    pub dir: PathBuf,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            cache: PathBuf::from(DEFAULT_CACHE_FILE),
            dir: PathBuf::from(STORE_DIR),
        }
    }
}

impl StoreOptions {
    pub fn ocr_cache(&self) -> PathBuf {
        self.dir.join(OCR_CACHE_FILE)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolveOptions {
    pub methods: MethodSequence,
    pub policy: CorrectionPolicy,
    /// Directory holding the hint and correction tables.
    pub data_dir: PathBuf,
    /// Keep coordinates inferred by an earlier run instead of re-resolving them.
    pub keep_resolved: bool,
    pub tesseract: PathBuf,
}

impl Default for ResolveOptions {
    fn default() -> Self {
        Self {
            methods: MethodSequence::default(),
            policy: CorrectionPolicy::default(),
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            keep_resolved: false,
            tesseract: PathBuf::from(TESSERACT_BIN),
        }
    }
}

impl ResolveOptions {
    pub fn url_hints_path(&self) -> PathBuf { self.data_dir.join(URL_HINTS_FILE) }
    pub fn name_hints_path(&self) -> PathBuf { self.data_dir.join(NAME_HINTS_FILE) }
    pub fn corrections_path(&self) -> PathBuf { self.data_dir.join(CORRECTIONS_FILE) }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MapOptions {
    pub background: PathBuf,
    pub corners: Calibration,
    pub width: u32,
    pub palette: Palette,
    /// Where to write the PNG; `None` skips rendering.
    pub out: Option<PathBuf>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            background: PathBuf::from(DEFAULT_MAP_FILE),
            corners: Calibration::TAMRIEL_REBUILT,
            width: DEFAULT_MAP_WIDTH,
            palette: Palette::default(),
            out: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scrape_mode_accepts_switch_spellings() {
        assert_eq!("True".parse::<ScrapeMode>().unwrap(), ScrapeMode::Always);
        assert_eq!(" no ".parse::<ScrapeMode>().unwrap(), ScrapeMode::Never);
        assert_eq!("if-missing".parse::<ScrapeMode>().unwrap(), ScrapeMode::IfMissing);
        assert!("sometimes".parse::<ScrapeMode>().is_err());
    }

    #[test]
    fn credentials_debug_hides_password() {
        let c = Credentials { name: s!("vivec"), password: s!("hunter2") };
        let dbg = format!("{c:?}");
        assert!(dbg.contains("vivec"));
        assert!(!dbg.contains("hunter2"));
    }

    #[test]
    fn default_tables_live_in_data_dir() {
        let r = ResolveOptions::default();
        assert_eq!(r.corrections_path(), PathBuf::from("data").join("corrections.json"));
        assert_eq!(StoreOptions::default().ocr_cache(), PathBuf::from(".store").join("ocr_cache.json"));
    }

    #[test]
    fn default_listing_filters_by_stage() {
        let url = ScrapeOptions::default().url;
        assert!(url.starts_with("https://www.tamriel-rebuilt.org/claims/interiors?"));
        for tid in ["19", "20", "21", "22", "23", "24", "139"] {
            assert!(url.contains(&format!("field_claim_stage_tid%5B%5D={tid}&")), "missing stage {tid}");
        }
    }
}
