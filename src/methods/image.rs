// src/methods/image.rs
//! OCR on the caption strip of claim thumbnails.
//!
//! Claim screenshots are usually taken in-game with the cell name and
//! coordinates showing in the top-left corner. We crop that strip, scale it
//! up, run it through an OCR engine and look for a coordinate pair.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    process::Command,
    sync::Mutex,
};

use image::{imageops::FilterType, DynamicImage, ImageFormat};
use tracing::{debug, info, warn};

use super::{Method, MethodTag};
use crate::claim::ClaimRecord;
use crate::config::consts::{OCR_CROP, OCR_MAX_ABS_COORD, OCR_MIN_CONFIDENCE, OCR_UPSCALE};
use crate::core::coords::caption_cell;
use crate::core::net::Session;
use crate::error::MethodFailure;
use crate::grid::Cell;

/// Where thumbnail bytes come from.
pub trait ImageSource: Send + Sync {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, MethodFailure>;
}

/// Remote references go through the HTTP session; anything else is read
/// as a local path.
impl ImageSource for Session {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, MethodFailure> {
        if is_remote(reference) {
            self.get_bytes(reference)
                .map_err(|e| MethodFailure::Fetch { reference: s!(reference), reason: e.to_string() })
        } else {
            LocalFiles.fetch(reference)
        }
    }
}

/// Thumbnails already on disk.
pub struct LocalFiles;

impl ImageSource for LocalFiles {
    fn fetch(&self, reference: &str) -> Result<Vec<u8>, MethodFailure> {
        fs::read(reference).map_err(|e| MethodFailure::Fetch { reference: s!(reference), reason: e.to_string() })
    }
}

fn is_remote(reference: &str) -> bool {
    let lc = reference.trim_start().to_ascii_lowercase();
    lc.starts_with("http://") || lc.starts_with("https://")
}

/// Text read back from an image, with the engine's confidence (0-100).
#[derive(Clone, Debug, PartialEq)]
pub struct OcrText {
    pub text: String,
    pub confidence: f32,
}

pub trait OcrEngine: Send + Sync {
    fn recognize(&self, img: &DynamicImage) -> Result<OcrText, MethodFailure>;
}

/// Runs the `tesseract` executable in TSV mode for per-word confidences.
pub struct TesseractCli {
    bin: PathBuf,
}

impl TesseractCli {
    pub fn new(bin: impl Into<PathBuf>) -> Self {
        Self { bin: bin.into() }
    }
}

impl OcrEngine for TesseractCli {
    fn recognize(&self, img: &DynamicImage) -> Result<OcrText, MethodFailure> {
        let dir = tempfile::tempdir().map_err(|e| MethodFailure::Ocr(format!("temp dir: {e}")))?;
        let input = dir.path().join("caption.png");
        img.save_with_format(&input, ImageFormat::Png)
            .map_err(|e| MethodFailure::Ocr(format!("write {}: {e}", input.display())))?;

        // psm 7: the crop is a single line of text.
        let output = Command::new(&self.bin)
            .arg(&input)
            .arg("stdout")
            .args(["--psm", "7", "tsv"])
            .output()
            .map_err(|e| MethodFailure::Ocr(format!("cannot run {}: {e}", self.bin.display())))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(MethodFailure::Ocr(format!("{} exited with {}: {}", self.bin.display(), output.status, stderr.trim())));
        }
        Ok(parse_tsv(&String::from_utf8_lossy(&output.stdout)))
    }
}

/// Join the recognized words of a tesseract TSV report.
///
/// Words are grouped by line; the confidence is the mean over words
/// (rows with `conf == -1` are layout rows and carry no text).
pub fn parse_tsv(tsv: &str) -> OcrText {
    let mut lines = Vec::<(String, Vec<&str>)>::new();
    let mut confs = Vec::<f32>::new();

    let mut rows = tsv.lines();
    let header: Vec<&str> = rows.next().map(|h| h.split('\t').collect()).unwrap_or_default();
    let col = |name: &str| header.iter().position(|h| *h == name);
    let (Some(i_conf), Some(i_text)) = (col("conf"), col("text")) else {
        return OcrText { text: s!(), confidence: 0.0 };
    };
    let line_key = [col("block_num"), col("par_num"), col("line_num")];

    for row in rows {
        let f: Vec<&str> = row.split('\t').collect();
        let Some(conf) = f.get(i_conf).and_then(|c| c.trim().parse::<f32>().ok()) else { continue };
        let word = f.get(i_text).map(|t| t.trim()).unwrap_or("");
        if conf < 0.0 || word.is_empty() {
            continue;
        }
        let key: String = line_key
            .iter()
            .map(|i| i.and_then(|i| f.get(i)).copied().unwrap_or("0"))
            .collect::<Vec<_>>()
            .join(".");
        match lines.last_mut() {
            Some((k, words)) if *k == key => words.push(word),
            _ => lines.push((key, vec![word])),
        }
        confs.push(conf);
    }

    let text = lines.iter().map(|(_, w)| w.join(" ")).collect::<Vec<_>>().join("\n");
    let confidence = if confs.is_empty() { 0.0 } else { confs.iter().sum::<f32>() / confs.len() as f32 };
    OcrText { text, confidence }
}

/// Caption strip, clamped to the image, scaled up for the OCR engine.
pub fn caption_strip(img: &DynamicImage) -> DynamicImage {
    let (x, y, w, h) = OCR_CROP;
    let x = x.min(img.width());
    let y = y.min(img.height());
    let w = w.min(img.width() - x).max(1);
    let h = h.min(img.height() - y).max(1);
    let strip = img.crop_imm(x, y, w, h);
    strip.resize_exact(w * OCR_UPSCALE, h * OCR_UPSCALE, FilterType::CatmullRom)
}

/// Cell from recognized caption text, if plausible.
pub fn cell_from_ocr(read: &OcrText) -> Option<Cell> {
    if read.confidence < OCR_MIN_CONFIDENCE {
        return None;
    }
    caption_cell(&read.text).filter(|c| c.x.abs() <= OCR_MAX_ABS_COORD && c.y.abs() <= OCR_MAX_ABS_COORD)
}

/// The `i` method. Each distinct image reference is recognized once; the
/// outcome (hit or miss) is remembered and can be persisted between runs.
pub struct ImageMethod {
    source: Box<dyn ImageSource>,
    engine: Box<dyn OcrEngine>,
    memo: Mutex<HashMap<String, Option<Cell>>>,
}

impl ImageMethod {
    pub fn new(source: Box<dyn ImageSource>, engine: Box<dyn OcrEngine>) -> Self {
        Self { source, engine, memo: Mutex::new(HashMap::new()) }
    }

    /// Seed the memo from an earlier run. A missing file is an empty memo;
    /// an unreadable one is logged and ignored.
    pub fn with_memo_file(self, path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(text) => match serde_json::from_str::<HashMap<String, Option<Cell>>>(&text) {
                Ok(seen) => {
                    info!(path = %path.display(), entries = seen.len(), "Loaded OCR cache");
                    if let Ok(mut memo) = self.memo.lock() {
                        memo.extend(seen);
                    }
                }
                Err(e) => warn!(path = %path.display(), error = %e, "Ignoring unreadable OCR cache"),
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "Cannot read OCR cache"),
        }
        self
    }

    pub fn save_memo(&self, path: &Path) -> std::io::Result<()> {
        let memo = match self.memo.lock() {
            Ok(m) => m.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        let json = serde_json::to_string_pretty(&memo).map_err(std::io::Error::other)?;
        crate::store::write_atomic(path, json.as_bytes())
    }

    pub fn memo_len(&self) -> usize {
        self.memo.lock().map(|m| m.len()).unwrap_or(0)
    }

    fn read_image(&self, reference: &str) -> Result<Option<Cell>, MethodFailure> {
        let bytes = self.source.fetch(reference)?;
        let img = image::load_from_memory(&bytes)
            .map_err(|source| MethodFailure::Decode { reference: s!(reference), source })?;
        let read = self.engine.recognize(&caption_strip(&img))?;
        let cell = cell_from_ocr(&read);
        debug!(reference, text = %read.text, confidence = read.confidence, ?cell, "OCR");
        Ok(cell)
    }
}

impl Method for ImageMethod {
    fn tag(&self) -> MethodTag {
        MethodTag::Image
    }

    fn locate(&self, claim: &ClaimRecord) -> Result<Option<Cell>, MethodFailure> {
        let Some(reference) = claim.image_ref.as_deref().map(str::trim).filter(|r| !r.is_empty()) else {
            return Ok(None);
        };

        if let Some(hit) = self.memo.lock().ok().and_then(|m| m.get(reference).copied()) {
            return Ok(hit);
        }

        // Failures are not memoized; only answers are.
        let cell = self.read_image(reference)?;
        if let Ok(mut memo) = self.memo.lock() {
            memo.insert(s!(reference), cell);
        }
        Ok(cell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TSV: &str = "level\tpage_num\tblock_num\tpar_num\tline_num\tword_num\tleft\ttop\twidth\theight\tconf\ttext
1\t1\t0\t0\t0\t0\t0\t0\t600\t70\t-1\t
5\t1\t1\t1\t1\t1\t10\t5\t120\t30\t91.5\tOld
5\t1\t1\t1\t1\t2\t140\t5\t160\t30\t88.5\tEbonheart
5\t1\t1\t1\t1\t3\t310\t5\t80\t30\t80\t12,-5
";

    #[test]
    fn tsv_words_join_by_line() {
        let read = parse_tsv(TSV);
        assert_eq!(read.text, "Old Ebonheart 12,-5");
        assert!((read.confidence - 86.666).abs() < 0.01);
        assert_eq!(cell_from_ocr(&read), Some(Cell::new(12, -5)));
    }

    #[test]
    fn low_confidence_and_huge_numbers_are_rejected() {
        assert_eq!(cell_from_ocr(&OcrText { text: s!("12, -5"), confidence: 5.0 }), None);
        assert_eq!(cell_from_ocr(&OcrText { text: s!("1200, -5"), confidence: 90.0 }), None);
        assert_eq!(parse_tsv("garbage").text, "");
    }

    #[test]
    fn strip_is_clamped_and_scaled() {
        let small = DynamicImage::ImageRgb8(RgbImage::from_pixel(120, 20, Rgb([0, 0, 0])));
        let strip = caption_strip(&small);
        assert_eq!((strip.width(), strip.height()), (240, 40));
    }

    struct OnePng(Vec<u8>);
    impl ImageSource for OnePng {
        fn fetch(&self, _: &str) -> Result<Vec<u8>, MethodFailure> {
            Ok(self.0.clone())
        }
    }

    struct Counting(Arc<AtomicUsize>);
    impl OcrEngine for Counting {
        fn recognize(&self, _: &DynamicImage) -> Result<OcrText, MethodFailure> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(OcrText { text: s!("Cell -3, 7"), confidence: 95.0 })
        }
    }

    fn png() -> Vec<u8> {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(400, 300, Rgb([200, 200, 200])));
        let mut out = std::io::Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[test]
    fn each_image_is_read_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let m = ImageMethod::new(Box::new(OnePng(png())), Box::new(Counting(calls.clone())));
        let mut c = ClaimRecord::new("u", "t");
        c.image_ref = Some(s!("https://x.org/a.png"));

        assert_eq!(m.locate(&c).unwrap(), Some(Cell::new(-3, 7)));
        assert_eq!(m.locate(&c).unwrap(), Some(Cell::new(-3, 7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let none = ClaimRecord::new("v", "t");
        assert_eq!(m.locate(&none).unwrap(), None);
    }

    #[test]
    fn memo_persists_between_runs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ocr_cache.json");
        let calls = Arc::new(AtomicUsize::new(0));

        let first = ImageMethod::new(Box::new(OnePng(png())), Box::new(Counting(calls.clone())));
        let mut c = ClaimRecord::new("u", "t");
        c.image_ref = Some(s!("a.png"));
        first.locate(&c).unwrap();
        first.save_memo(&path).unwrap();

        let second = ImageMethod::new(Box::new(OnePng(png())), Box::new(Counting(calls.clone())))
            .with_memo_file(&path);
        assert_eq!(second.memo_len(), 1);
        assert_eq!(second.locate(&c).unwrap(), Some(Cell::new(-3, 7)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn undecodable_image_is_a_failure() {
        let m = ImageMethod::new(Box::new(OnePng(b"not an image".to_vec())), Box::new(Counting(Arc::default())));
        let mut c = ClaimRecord::new("u", "t");
        c.image_ref = Some(s!("bad.png"));
        assert!(matches!(m.locate(&c), Err(MethodFailure::Decode { .. })));
    }
}
