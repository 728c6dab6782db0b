// src/error.rs
use std::path::PathBuf;

use thiserror::Error;

use crate::grid::CalibrationError;

pub type Result<T> = std::result::Result<T, Error>;

/// Anything that should stop a run.
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Scrape(#[from] ScrapeError),

    #[error("Map render failed: {0}")]
    Render(#[from] image::ImageError),

    #[error("I/O error on {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },
}

/// Bad configuration; detected before any resolution starts.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Unknown resolution method {found:?} in {sequence:?} (expected any of \"itue\")")]
    UnknownMethod { found: char, sequence: String },

    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    #[error("Cannot read table {path}: {source}")]
    TableIo { path: PathBuf, source: std::io::Error },

    #[error("Malformed table {path}: {source}")]
    TableFormat { path: PathBuf, source: serde_json::Error },

    #[error("Invalid value for {field}: {message}")]
    Invalid { field: &'static str, message: String },
}

/// Scrape cache could not be used.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Cache file {0} does not exist (scraping disabled)")]
    Missing(PathBuf),

    #[error("Cannot access cache {path}: {source}")]
    Io { path: PathBuf, source: std::io::Error },

    #[error("Cache {path} is not valid JSON: {source}")]
    Corrupt { path: PathBuf, source: serde_json::Error },
}

#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("HTTP {status} for {url}")]
    Http { status: u16, url: String },

    #[error("Invalid URL {0:?}")]
    Url(String),

    #[error("Login as {0:?} was rejected")]
    Login(String),

    #[error("Unexpected page layout at {url}: {what}")]
    Layout { url: String, what: &'static str },
}

/// One method failing on one claim. Never escapes the orchestrator.
#[derive(Debug, Error)]
pub enum MethodFailure {
    #[error("Could not fetch {reference}: {reason}")]
    Fetch { reference: String, reason: String },

    #[error("Could not decode image {reference}: {source}")]
    Decode { reference: String, source: image::ImageError },

    #[error("OCR engine failed: {0}")]
    Ocr(String),
}
