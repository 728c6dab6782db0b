// src/gui/components/legend.rs
//
// Stage legend. Clicking an entry hides or shows that stage's markers.

use eframe::egui::{self, Color32, Sense};

use super::color32;
use crate::gui::app::App;

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    ui.heading("Stages");
    ui.add_space(4.0);

    if app.colors.is_empty() {
        ui.label("No located claims");
        return;
    }

    for (stage, rgb) in app.colors.clone() {
        let hidden = app.state.gui.hidden_stages.contains(&stage);
        let markers = app.cells.iter().filter(|c| c.stage_mean.as_ref() == Some(&stage)).count();

        ui.horizontal(|ui| {
            let (dot, _) = ui.allocate_exact_size(egui::vec2(14.0, 14.0), Sense::hover());
            let fill = if hidden { Color32::GRAY } else { color32(rgb) };
            ui.painter().circle_filled(dot.center(), 6.0, fill);

            if ui.selectable_label(!hidden, format!("{stage} ({markers})")).clicked() {
                if hidden {
                    app.state.gui.hidden_stages.remove(&stage);
                } else {
                    app.state.gui.hidden_stages.insert(stage.clone());
                }
            }
        });
    }

    ui.add_space(8.0);
    let located: usize = app.cells.iter().map(|c| c.count).sum();
    ui.label(format!("{located} claims in {} cells", app.cells.len()));
    if let Some(r) = &app.report {
        ui.label(format!("Last run: {} corrected, {} method failure(s)", r.corrected, r.failures));
    }
}
