// src/gui/components/mod.rs
pub mod action_bar;
pub mod claims_table;
pub mod legend;
pub mod map_view;

use eframe::egui::Color32;

use crate::render::Rgb;

#[inline]
pub(crate) fn color32(c: Rgb) -> Color32 {
    Color32::from_rgb(c[0], c[1], c[2])
}
