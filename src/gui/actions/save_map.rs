// src/gui/actions/save_map.rs
use std::path::PathBuf;

use tracing::{error, info};

use crate::{gui::app::App, render};

/// Render the PNG with the legend's current visibility and write it to the output field's path.
pub fn save_map(app: &mut App) {
    let path = PathBuf::from(app.out_path_text.trim());
    if path.as_os_str().is_empty() {
        app.status("Nothing to save: output path is empty");
        return;
    }
    if app.cells.is_empty() {
        app.status("Nothing to save: no located claims");
        return;
    }

    let res = render::render_map(&app.cells, &app.state.options.map, &app.state.gui.hidden_stages)
        .and_then(|img| render::save_png(&img, &path));

    match res {
        Ok(()) => {
            info!(path = %path.display(), "GUI: map saved");
            app.status(format!("Saved map to {}", path.display()));
        }
        Err(e) => {
            error!(error = %e, "GUI: map save failed");
            app.status(format!("Save error: {e}"));
        }
    }
}
