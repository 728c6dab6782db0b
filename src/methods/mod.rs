// src/methods/mod.rs
//! Coordinate heuristics.
//!
//! Each method looks at one claim and either names a cell or gives up. They
//! know nothing about each other; ordering and merging live in
//! [`crate::resolve`].

pub mod correction;
pub mod image;
pub mod title;
pub mod url;

use std::{fmt, str::FromStr};

use crate::claim::{ClaimRecord, CoordSource};
use crate::config::consts::DEFAULT_METHODS;
use crate::error::{ConfigError, MethodFailure};
use crate::grid::Cell;

pub use correction::CorrectionMethod;
pub use image::{ImageMethod, ImageSource, LocalFiles, OcrEngine, TesseractCli};
pub use title::TitleMethod;
pub use url::UrlMethod;

/// One resolution heuristic.
///
/// `Ok(None)` is the normal "nothing here" answer. `Err` is a failure the
/// caller logs and then treats like `Ok(None)`.
pub trait Method: Send + Sync {
    fn tag(&self) -> MethodTag;
    fn locate(&self, claim: &ClaimRecord) -> Result<Option<Cell>, MethodFailure>;
}

impl<M: Method + ?Sized> Method for std::sync::Arc<M> {
    fn tag(&self) -> MethodTag {
        (**self).tag()
    }
    fn locate(&self, claim: &ClaimRecord) -> Result<Option<Cell>, MethodFailure> {
        (**self).locate(claim)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MethodTag {
    /// OCR on the thumbnail caption.
    Image,
    Title,
    Url,
    Correction,
}

impl MethodTag {
    pub const ALL: [MethodTag; 4] = [MethodTag::Image, MethodTag::Title, MethodTag::Url, MethodTag::Correction];

    /// Letter used in method sequences.
    pub fn code(self) -> char {
        match self {
            MethodTag::Image => 'i',
            MethodTag::Title => 't',
            MethodTag::Url => 'u',
            MethodTag::Correction => 'e',
        }
    }

    pub fn from_code(c: char) -> Option<Self> {
        MethodTag::ALL.into_iter().find(|t| t.code() == c)
    }

    /// Source recorded on a claim this method located.
    pub fn source(self) -> CoordSource {
        match self {
            MethodTag::Image => CoordSource::Ocr,
            MethodTag::Title => CoordSource::Title,
            MethodTag::Url => CoordSource::Url,
            MethodTag::Correction => CoordSource::Correction,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MethodTag::Image => "image OCR",
            MethodTag::Title => "title",
            MethodTag::Url => "URL hints",
            MethodTag::Correction => "corrections",
        }
    }
}

/// Ordered, duplicate-free selection of methods, e.g. `"itue"`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MethodSequence(Vec<MethodTag>);

impl MethodSequence {
    pub fn new(tags: impl IntoIterator<Item = MethodTag>) -> Self {
        let mut out: Vec<MethodTag> = Vec::new();
        for t in tags {
            if !out.contains(&t) {
                out.push(t);
            }
        }
        Self(out)
    }

    pub fn contains(&self, tag: MethodTag) -> bool {
        self.0.contains(&tag)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn tags(&self) -> &[MethodTag] {
        &self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = MethodTag> + '_ {
        self.0.iter().copied()
    }
}

impl Default for MethodSequence {
    fn default() -> Self {
        DEFAULT_METHODS.parse().unwrap_or_else(|_| Self::new(MethodTag::ALL))
    }
}

impl FromStr for MethodSequence {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let tags = trimmed
            .chars()
            .map(|c| {
                MethodTag::from_code(c.to_ascii_lowercase()).ok_or_else(|| ConfigError::UnknownMethod {
                    found: c,
                    sequence: trimmed.to_string(),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(tags))
    }
}

impl fmt::Display for MethodSequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.iter().try_for_each(|t| write!(f, "{}", t.code()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_in_order_and_drops_repeats() {
        let seq: MethodSequence = " tuit ".parse().unwrap();
        assert_eq!(seq.tags(), &[MethodTag::Title, MethodTag::Url, MethodTag::Image]);
        assert_eq!(seq.to_string(), "tui");
        assert!(!seq.contains(MethodTag::Correction));
    }

    #[test]
    fn rejects_unknown_letters() {
        match "itx".parse::<MethodSequence>() {
            Err(ConfigError::UnknownMethod { found, sequence }) => {
                assert_eq!(found, 'x');
                assert_eq!(sequence, "itx");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn letters_are_case_insensitive() {
        let seq: MethodSequence = "TuE".parse().unwrap();
        assert_eq!(seq.tags(), &[MethodTag::Title, MethodTag::Url, MethodTag::Correction]);
        assert_eq!(seq.to_string(), "tue");
        assert!(matches!("tX".parse::<MethodSequence>(), Err(ConfigError::UnknownMethod { found: 'X', .. })));
    }

    #[test]
    fn empty_sequence_is_allowed() {
        let seq: MethodSequence = "".parse().unwrap();
        assert!(seq.is_empty());
        assert_eq!(MethodSequence::default().to_string(), "itue");
    }
}
