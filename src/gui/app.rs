// src/gui/app.rs
use std::{
    error::Error,
    path::Path,
    sync::{mpsc::Receiver, Arc, Mutex},
    time::Duration,
};

use eframe::egui;
use tracing::{debug, info, warn};

use crate::{
    claim::{ClaimRecord, Stage},
    config::{options::AppOptions, state::AppState},
    log,
    render::{self, Rgb},
    resolve::ResolutionReport,
    runner::RunSummary,
    store,
    summary::{self, CellSummary},
};

use super::{actions, components};

pub fn run(options: eframe::NativeOptions) -> Result<(), Box<dyn Error>> {
    let state = AppState::new(AppOptions::default());
    log::init(&state.options.store.dir, "ptr_claim=info", false);

    eframe::run_native(
        "PTR Claim Map",
        options,
        Box::new(|cc| Ok(Box::new(App::new(&cc.egui_ctx, state)))),
    )?;
    Ok(())
}

pub struct App {
    // single source of truth (UI thread only)
    pub state: AppState,

    // current claims and what the map draws from them
    pub claims: Vec<ClaimRecord>,
    pub cells: Vec<CellSummary>,
    pub colors: Vec<(Stage, Rgb)>,
    pub report: Option<ResolutionReport>,

    pub background: Option<egui::TextureHandle>,

    // PNG output field
    pub out_path_text: String,
    pub show_unresolved: bool,

    // status/progress (workers write here)
    pub status: Arc<Mutex<String>>,
    pub running: bool,
    pub pending: Option<Receiver<Result<RunSummary, String>>>,
}

impl App {
    pub fn new(ctx: &egui::Context, state: AppState) -> Self {
        let background = load_background(ctx, &state.options.map.background);

        let mut app = Self {
            state,
            claims: Vec::new(),
            cells: Vec::new(),
            colors: Vec::new(),
            report: None,
            background,
            out_path_text: s!("claims_map.png"),
            show_unresolved: false,
            status: Arc::new(Mutex::new(s!("Idle"))),
            running: false,
            pending: None,
        };

        // Show whatever the last run left behind; resolving waits for the user.
        let cache = app.state.options.store.cache.clone();
        match store::load(&cache) {
            Ok(claims) => {
                info!(claims = claims.len(), path = %cache.display(), "Loaded cached claims");
                app.status(format!("Loaded {} claims from {}", claims.len(), cache.display()));
                app.set_claims(claims);
            }
            Err(e) => {
                debug!(error = %e, "No usable cache at startup");
                app.status("No cached claims yet. Press Run to scrape.");
            }
        }
        app
    }

    #[inline]
    pub fn status<T: Into<String>>(&self, msg: T) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
    }

    pub fn status_text(&self) -> String {
        self.status.lock().map(|s| s.clone()).unwrap_or_default()
    }

    /// Replace the claim set and rebuild the map data.
    pub fn set_claims(&mut self, claims: Vec<ClaimRecord>) {
        self.claims = claims;
        self.cells = summary::summarize(&self.claims);
        self.recolor();

        let sel = self.state.gui.selected_cell;
        if sel.is_some_and(|cell| !self.cells.iter().any(|c| c.cell == cell)) {
            self.state.gui.selected_cell = None;
        }
    }

    pub fn recolor(&mut self) {
        self.colors = render::stage_colors(self.state.options.map.palette, &self.cells);
    }

    pub fn apply_summary(&mut self, summary: RunSummary) {
        self.report = Some(summary.report);
        self.set_claims(summary.claims);
    }

    pub fn unresolved_count(&self) -> usize {
        self.claims.iter().filter(|c| !c.is_located()).count()
    }
}

fn load_background(ctx: &egui::Context, path: &Path) -> Option<egui::TextureHandle> {
    let img = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Map background unavailable");
            return None;
        }
    };
    let size = [img.width() as usize, img.height() as usize];
    let color = egui::ColorImage::from_rgba_unmultiplied(size, img.as_raw());
    Some(ctx.load_texture("map-background", color, egui::TextureOptions::LINEAR))
}

impl eframe::App for App {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        actions::poll(self);
        if self.running {
            ctx.request_repaint_after(Duration::from_millis(250));
        }

        egui::TopBottomPanel::top("actions").show(ctx, |ui| {
            components::action_bar::draw(ui, self);
        });

        egui::SidePanel::right("legend")
            .resizable(false)
            .show(ctx, |ui| {
                components::legend::draw(ui, self);
            });

        egui::TopBottomPanel::bottom("claims")
            .resizable(true)
            .default_height(240.0)
            .show(ctx, |ui| {
                components::claims_table::draw(ui, self);
            });

        egui::CentralPanel::default().show(ctx, |ui| {
            components::map_view::draw(ui, self);
        });
    }
}
