// src/gui/components/map_view.rs
//
// Interactive version of the PNG map: same markers, plus hover details
// and click-to-select.

use eframe::egui::{self, pos2, Color32, Rect, Sense, Stroke};

use super::color32;
use crate::{
    gui::app::App,
    render::{self, OUTLINE},
    summary::CellSummary,
};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let opts = &app.state.options.map;
    let corners = opts.corners;

    // Fit the calibrated box into the panel, keeping its aspect.
    let avail = ui.available_size();
    let aspect = corners.aspect();
    let mut w = avail.x.max(50.0);
    let mut h = w / aspect;
    if h > avail.y {
        h = avail.y.max(50.0);
        w = h * aspect;
    }
    let (rect, response) = ui.allocate_exact_size(egui::vec2(w, h), Sense::click());
    let painter = ui.painter_at(rect);

    painter.rect_filled(rect, 0.0, Color32::WHITE);
    if let Some(tex) = &app.background {
        let uv = Rect::from_min_max(pos2(0.0, 0.0), pos2(1.0, 1.0));
        painter.image(tex.id(), rect, uv, Color32::from_white_alpha(128));
    }

    // Same sizing rule as the PNG, scaled to the on-screen width.
    let scale = w / opts.width.max(1) as f32;
    let max_size = app.cells.iter().map(CellSummary::map_size).fold(0.0, f32::max);

    let mut visible: Vec<&CellSummary> = app
        .cells
        .iter()
        .filter(|s| corners.contains(s.cell))
        .filter(|s| s.stage_mean.as_ref().is_none_or(|st| !app.state.gui.hidden_stages.contains(st)))
        .collect();
    visible.sort_by(|a, b| b.count.cmp(&a.count));

    let mut placed: Vec<(egui::Pos2, f32, &CellSummary)> = Vec::with_capacity(visible.len());
    for s in visible {
        let (px, py) = corners.cell_to_pixel(s.cell, w, h);
        let centre = rect.min + egui::vec2(px, py);
        let r = (render::marker_radius(s, max_size) * scale).max(2.0);
        let fill = color32(render::color_of(&app.colors, s.stage_mean.as_ref()));
        painter.circle(centre, r, fill, Stroke::new(1.0, color32(OUTLINE)));
        if app.state.gui.selected_cell == Some(s.cell) {
            painter.circle_stroke(centre, r + 3.0, Stroke::new(2.0, Color32::YELLOW));
        }
        placed.push((centre, r, s));
    }

    // Smaller markers sit on top, so search from the end.
    let hit_at = |p: egui::Pos2| {
        placed
            .iter()
            .rev()
            .find(|(c, r, _)| c.distance(p) <= *r)
            .map(|(_, _, s)| *s)
    };

    let hovered = response.hover_pos().and_then(hit_at).map(|s| {
        format!("[{}] {} claim(s)\n{}", s.cell, s.count, s.details_text())
    });

    let clicked_cell = if response.clicked() {
        response.interact_pointer_pos().map(|p| match hit_at(p) {
            Some(s) => s.cell,
            None => corners.pixel_to_cell(p.x - rect.min.x, p.y - rect.min.y, w, h),
        })
    } else {
        None
    };

    if let Some(text) = hovered {
        response.on_hover_text_at_pointer(text);
    }
    if let Some(cell) = clicked_cell {
        app.state.gui.selected_cell = Some(cell);
        app.show_unresolved = false;
    }
}
