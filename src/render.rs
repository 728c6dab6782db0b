// src/render.rs
//! Static PNG progress map: one disc per cell over the calibrated background.

use std::{collections::HashSet, fmt, path::Path, str::FromStr};

use image::{imageops::FilterType, Rgba, RgbaImage};
use tracing::{info, warn};

use crate::claim::Stage;
use crate::config::consts::{MAP_BACKGROUND_OPACITY, MARKER_MAX_RADIUS, MARKER_MIN_RADIUS};
use crate::config::options::MapOptions;
use crate::error::{ConfigError, Error, Result};
use crate::summary::{present_stages, CellSummary};

pub type Rgb = [u8; 3];

pub const OUTLINE: Rgb = [47, 79, 79]; // dark slate grey
const UNKNOWN_STAGE: Rgb = [128, 128, 128];
const PAPER: Rgb = [255, 255, 255];

const PLASMA: [Rgb; 10] = [
    [13, 8, 135],
    [70, 3, 159],
    [114, 1, 168],
    [156, 23, 158],
    [189, 55, 134],
    [216, 87, 107],
    [237, 121, 83],
    [251, 159, 58],
    [253, 202, 38],
    [240, 249, 33],
];

const VIRIDIS: [Rgb; 10] = [
    [68, 1, 84],
    [72, 40, 120],
    [62, 73, 137],
    [49, 104, 142],
    [38, 130, 142],
    [31, 158, 137],
    [53, 183, 121],
    [110, 206, 88],
    [181, 222, 43],
    [253, 231, 37],
];

/// Continuous colour scale used for stages.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Palette {
    #[default]
    Plasma,
    Viridis,
}

impl Palette {
    fn stops(self) -> &'static [Rgb] {
        match self {
            Palette::Plasma => &PLASMA,
            Palette::Viridis => &VIRIDIS,
        }
    }

    /// Colour at `t` in `0.0..=1.0`, linearly interpolated between stops.
    pub fn sample(self, t: f32) -> Rgb {
        let stops = self.stops();
        let pos = t.clamp(0.0, 1.0) * (stops.len() - 1) as f32;
        let i = (pos.floor() as usize).min(stops.len() - 2);
        let f = pos - i as f32;
        let (a, b) = (stops[i], stops[i + 1]);
        [0, 1, 2].map(|k| (a[k] as f32 + (b[k] as f32 - a[k] as f32) * f).round() as u8)
    }

    /// `n` evenly spaced colours from one end of the scale to the other.
    pub fn spread(self, n: usize) -> Vec<Rgb> {
        match n {
            0 => Vec::new(),
            1 => vec![self.sample(0.0)],
            _ => (0..n).map(|i| self.sample(i as f32 / (n - 1) as f32)).collect(),
        }
    }
}

impl FromStr for Palette {
    type Err = ConfigError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "plasma" => Ok(Palette::Plasma),
            "viridis" => Ok(Palette::Viridis),
            other => Err(ConfigError::Invalid { field: "cmap", message: format!("{other:?} (expected plasma or viridis)") }),
        }
    }
}

impl fmt::Display for Palette {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Palette::Plasma => "plasma",
            Palette::Viridis => "viridis",
        })
    }
}

/// Colour per stage that some marker represents; spread over the palette in site order.
pub fn stage_colors(palette: Palette, summaries: &[CellSummary]) -> Vec<(Stage, Rgb)> {
    let present = present_stages(summaries);
    let colors = palette.spread(present.len());
    present.into_iter().zip(colors).collect()
}

pub fn color_of(colors: &[(Stage, Rgb)], stage: Option<&Stage>) -> Rgb {
    stage
        .and_then(|s| colors.iter().find(|(k, _)| k == s))
        .map(|(_, c)| *c)
        .unwrap_or(UNKNOWN_STAGE)
}

/// Disc radius in pixels; area follows the marker weight.
pub fn marker_radius(summary: &CellSummary, max_size: f32) -> f32 {
    if max_size <= 0.0 {
        return MARKER_MIN_RADIUS;
    }
    (MARKER_MAX_RADIUS * (summary.map_size() / max_size).sqrt()).clamp(MARKER_MIN_RADIUS, MARKER_MAX_RADIUS)
}

/// Output height for the configured width, keeping the grid aspect.
pub fn output_size(opts: &MapOptions) -> (u32, u32) {
    let w = opts.width.max(1);
    let h = (w as f32 / opts.corners.aspect()).round().max(1.0) as u32;
    (w, h)
}

fn blend(px: &mut Rgba<u8>, color: Rgb, alpha: f32) {
    for k in 0..3 {
        px[k] = (px[k] as f32 * (1.0 - alpha) + color[k] as f32 * alpha).round() as u8;
    }
    px[3] = 255;
}

/// Background faded towards white; plain paper when the file is missing.
fn background(opts: &MapOptions, w: u32, h: u32) -> Result<RgbaImage> {
    let mut canvas = RgbaImage::from_pixel(w, h, Rgba([PAPER[0], PAPER[1], PAPER[2], 255]));
    if !opts.background.exists() {
        warn!(path = %opts.background.display(), "Map background not found; drawing markers on a blank map");
        return Ok(canvas);
    }

    let bg = image::open(&opts.background)?.resize_exact(w, h, FilterType::Triangle).to_rgba8();
    for (dst, src) in canvas.pixels_mut().zip(bg.pixels()) {
        let a = MAP_BACKGROUND_OPACITY * src[3] as f32 / 255.0;
        blend(dst, [src[0], src[1], src[2]], a);
    }
    Ok(canvas)
}

fn fill_disc(img: &mut RgbaImage, cx: f32, cy: f32, r: f32, fill: Rgb) {
    let (w, h) = (img.width() as i64, img.height() as i64);
    let x0 = ((cx - r - 1.0).floor() as i64).max(0);
    let x1 = ((cx + r + 1.0).ceil() as i64).min(w - 1);
    let y0 = ((cy - r - 1.0).floor() as i64).max(0);
    let y1 = ((cy + r + 1.0).ceil() as i64).min(h - 1);

    for y in y0..=y1 {
        for x in x0..=x1 {
            let d = ((x as f32 + 0.5 - cx).powi(2) + (y as f32 + 0.5 - cy).powi(2)).sqrt();
            if d > r + 0.5 {
                continue;
            }
            let px = img.get_pixel_mut(x as u32, y as u32);
            // 1px outline ring, anti-aliased at the outer edge
            let color = if d > r - 1.0 { OUTLINE } else { fill };
            let alpha = (r + 0.5 - d).clamp(0.0, 1.0);
            blend(px, color, alpha);
        }
    }
}

/// Draw every visible marker over the background.
pub fn render_map(summaries: &[CellSummary], opts: &MapOptions, hidden: &HashSet<Stage>) -> Result<RgbaImage> {
    let (w, h) = output_size(opts);
    let mut img = background(opts, w, h)?;
    let colors = stage_colors(opts.palette, summaries);
    let max_size = summaries.iter().map(CellSummary::map_size).fold(0.0, f32::max);

    // Big markers first so small ones stay visible on top.
    let mut visible: Vec<&CellSummary> = summaries
        .iter()
        .filter(|s| opts.corners.contains(s.cell))
        .filter(|s| s.stage_mean.as_ref().is_none_or(|st| !hidden.contains(st)))
        .collect();
    visible.sort_by(|a, b| b.count.cmp(&a.count));

    for s in &visible {
        let (px, py) = opts.corners.cell_to_pixel(s.cell, w as f32, h as f32);
        let fill = color_of(&colors, s.stage_mean.as_ref());
        fill_disc(&mut img, px, py, marker_radius(s, max_size), fill);
    }

    info!(markers = visible.len(), width = w, height = h, "Rendered map");
    Ok(img)
}

pub fn save_png(img: &RgbaImage, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).map_err(|source| Error::Io { path: dir.to_path_buf(), source })?;
    }
    img.save_with_format(path, image::ImageFormat::Png)?;
    info!(path = %path.display(), "Saved map");
    Ok(())
}
