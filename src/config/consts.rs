// src/config/consts.rs

// Net config
pub const SITE_ROOT: &str = "https://www.tamriel-rebuilt.org";
pub const LOGIN_PATH: &str = "/user/login";
/// Interiors listing filtered to the stages the map shows (tids 19-24 and 139).
pub const DEFAULT_CLAIMS_URL: &str = concat!(
    "https://www.tamriel-rebuilt.org/claims/interiors",
    "?field_claim_priority_tid=All&field_claim_stage_tid_op=or",
    "&field_claim_stage_tid%5B%5D=19&field_claim_stage_tid%5B%5D=20&field_claim_stage_tid%5B%5D=139",
    "&field_claim_stage_tid%5B%5D=21&field_claim_stage_tid%5B%5D=22&field_claim_stage_tid%5B%5D=23",
    "&field_claim_stage_tid%5B%5D=24&title_op=contains&title=",
    "&field_claimant_target_id_entityreference_filter_op=in&field_claimant_target_id_entityreference_filter=All",
    "&field_child_claim_target_id_entityreference_filter_op=in&field_parent_claim_target_id_entityreference_filter_op=in",
);
pub const HTTP_TIMEOUT_SECS: u64 = 15;
/// Stop following "next page" links after this many listing pages.
pub const MAX_LISTING_PAGES: usize = 200;

// Local cache
pub const STORE_DIR: &str = ".store";
pub const DEFAULT_CACHE_FILE: &str = "interiors.json";
pub const OCR_CACHE_FILE: &str = "ocr_cache.json";
pub const LOG_FILE: &str = "debug.log";

// Static tables
pub const DEFAULT_DATA_DIR: &str = "data";
pub const URL_HINTS_FILE: &str = "url_hints.json";
pub const NAME_HINTS_FILE: &str = "name_hints.json";
pub const CORRECTIONS_FILE: &str = "corrections.json";

// Resolution
pub const DEFAULT_METHODS: &str = "itue";

// OCR: the cell caption sits in the top-left strip of claim thumbnails.
pub const OCR_CROP: (u32, u32, u32, u32) = (0, 0, 300, 35);
pub const OCR_UPSCALE: u32 = 2;
/// Mean word confidence (0-100, as reported by tesseract) below which a read is discarded.
pub const OCR_MIN_CONFIDENCE: f32 = 20.0;
/// Readings with larger coordinates are misreads, not cells.
pub const OCR_MAX_ABS_COORD: i32 = 500;
pub const TESSERACT_BIN: &str = "tesseract";

// Map
pub const DEFAULT_MAP_FILE: &str = "data/Tamriel_Rebuilt_Claims_Map.png";
pub const DEFAULT_MAP_CORNERS: &str = "-42 61 -64 38";
pub const DEFAULT_MAP_WIDTH: u32 = 900;
pub const MAP_BACKGROUND_OPACITY: f32 = 0.5;
pub const MARKER_MIN_RADIUS: f32 = 3.0;
pub const MARKER_MAX_RADIUS: f32 = 20.0;

// Concurrency
pub const WORKERS: usize = 4;
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const JITTER_MS: u64 = 50; // extra 0..50 ms
