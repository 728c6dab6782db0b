// src/gui/components/action_bar.rs

use eframe::egui::{self, widgets::Spinner};
use tracing::info;

use crate::{
    config::options::ScrapeMode,
    gui::{actions, app::App},
    render::Palette,
    resolve::CorrectionPolicy,
};

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let ctx = ui.ctx().clone();

    // --- Resolution settings ---
    ui.horizontal(|ui| {
        ui.label("Methods:");
        ui.add(
            egui::TextEdit::singleline(&mut app.state.gui.methods_text)
                .desired_width(60.0)
                .font(egui::TextStyle::Monospace),
        )
        .on_hover_text("i = thumbnail OCR, t = title, u = URL hints, e = corrections (always last)");

        let policy = &mut app.state.options.resolve.policy;
        let before = *policy;
        ui.label("Corrections:");
        ui.selectable_value(policy, CorrectionPolicy::Override, "override");
        ui.selectable_value(policy, CorrectionPolicy::FillOnly, "fill only");
        if *policy != before {
            info!(policy = %policy, "UI: correction policy changed");
        }

        ui.checkbox(&mut app.state.options.resolve.keep_resolved, "Keep earlier results")
            .on_hover_text("Claims keep their recorded source, even for methods not selected now");
    });

    // --- Actions ---
    ui.horizontal(|ui| {
        ui.add_enabled_ui(!app.running, |ui| {
            if ui.button("Run").on_hover_text("Resolve the cached claims; scrape if there is no cache").clicked() {
                actions::run(app, &ctx, ScrapeMode::IfMissing);
            }
            if ui.button("Rescrape").on_hover_text("Fetch every claim from the website again").clicked() {
                actions::run(app, &ctx, ScrapeMode::Always);
            }
        });
        if app.running {
            ui.add(Spinner::new());
        }

        ui.separator();

        let palette = &mut app.state.options.map.palette;
        let before = *palette;
        ui.selectable_value(palette, Palette::Plasma, "plasma");
        ui.selectable_value(palette, Palette::Viridis, "viridis");
        if *palette != before {
            app.recolor();
        }

        ui.separator();

        ui.label("PNG:");
        ui.add(egui::TextEdit::singleline(&mut app.out_path_text).font(egui::TextStyle::Monospace));
        if ui.button("Save map").clicked() {
            actions::save_map(app);
        }
    });

    ui.horizontal(|ui| {
        let n = app.unresolved_count();
        ui.checkbox(&mut app.show_unresolved, format!("List unresolved ({n})"));
        ui.separator();
        ui.label(app.status_text());
    });
}
