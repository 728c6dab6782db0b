// src/gui/components/claims_table.rs
//
// Claims of the selected cell, or the unresolved ones when that list is on.

use eframe::egui::{self, RichText};
use egui_extras::{Column, TableBuilder};

use crate::{claim::ClaimRecord, gui::app::App};

const HEADERS: [&str; 6] = ["Title", "Stage", "Claimant", "Reviewers", "Source", "Cell"];

pub fn draw(ui: &mut egui::Ui, app: &mut App) {
    let (caption, rows): (String, Vec<&ClaimRecord>) = if app.show_unresolved {
        let rows: Vec<_> = app.claims.iter().filter(|c| c.coord.is_none()).collect();
        (format!("Unresolved claims ({})", rows.len()), rows)
    } else if let Some(cell) = app.state.gui.selected_cell {
        let mut rows: Vec<_> = app.claims.iter().filter(|c| c.coord == Some(cell)).collect();
        rows.sort_by_key(|c| c.status.rank().unwrap_or(usize::MAX));
        (format!("Cell [{cell}]: {} claim(s)", rows.len()), rows)
    } else {
        (s!("Click a marker to list its claims"), Vec::new())
    };

    ui.label(RichText::new(caption).strong());
    if rows.is_empty() {
        return;
    }

    TableBuilder::new(ui)
        .striped(true)
        .resizable(true)
        .min_scrolled_height(0.0)
        .column(Column::initial(280.0).at_least(120.0).clip(true))
        .column(Column::initial(120.0).clip(true))
        .column(Column::initial(120.0).clip(true))
        .column(Column::initial(160.0).clip(true))
        .column(Column::initial(80.0))
        .column(Column::remainder())
        .header(20.0, |mut header| {
            for h in HEADERS {
                header.col(|ui| {
                    ui.strong(h);
                });
            }
        })
        .body(|body| {
            body.rows(18.0, rows.len(), |mut row| {
                let c = rows[row.index()];
                row.col(|ui| {
                    let link = c.link();
                    if link.starts_with("http") {
                        ui.hyperlink_to(&c.title, link);
                    } else {
                        ui.label(&c.title);
                    }
                });
                row.col(|ui| {
                    ui.label(c.status.label());
                });
                row.col(|ui| {
                    ui.label(c.claimant.as_deref().unwrap_or(""));
                });
                row.col(|ui| {
                    ui.label(c.reviewer.as_deref().unwrap_or(""));
                });
                row.col(|ui| {
                    ui.label(c.coord_source.as_str());
                });
                row.col(|ui| {
                    ui.label(c.coord.map(|cell| cell.to_string()).unwrap_or_default());
                });
            });
        });
}
