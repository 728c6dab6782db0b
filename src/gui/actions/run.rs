// src/gui/actions/run.rs
use std::{
    sync::mpsc::{self, TryRecvError},
    thread,
};

use eframe::egui;
use tracing::{error, info};

use crate::{
    config::options::ScrapeMode,
    gui::{app::App, progress::GuiProgress},
    methods::MethodSequence,
    runner,
};

/// Start the pipeline on a worker thread. The map keeps showing the old
/// claims until the new ones arrive.
pub fn run(app: &mut App, ctx: &egui::Context, mode: ScrapeMode) {
    if app.running {
        return;
    }

    let methods: MethodSequence = match app.state.gui.methods_text.parse() {
        Ok(m) => m,
        Err(e) => {
            app.status(format!("Error: {e}"));
            return;
        }
    };
    app.state.options.resolve.methods = methods;

    let mut opts = app.state.options.clone();
    opts.scrape.mode = mode;
    opts.map.out = None; // the PNG is written on demand from the UI

    info!(?mode, methods = %opts.resolve.methods, "GUI: run started");
    app.status(match mode {
        ScrapeMode::Always => "Scraping…",
        _ => "Resolving…",
    });

    let (tx, rx) = mpsc::channel();
    let status = app.status.clone();
    let ctx2 = ctx.clone();
    thread::spawn(move || {
        let mut progress = GuiProgress::new(status, ctx2.clone());
        let res = runner::run(&opts, Some(&mut progress)).map_err(|e| e.to_string());
        // receiver gone means the window closed; nothing left to tell
        let _ = tx.send(res);
        ctx2.request_repaint();
    });

    app.pending = Some(rx);
    app.running = true;
}

/// Pick up a finished run, if any. Called once per frame.
pub fn poll(app: &mut App) {
    let Some(rx) = &app.pending else { return };

    match rx.try_recv() {
        Ok(Ok(summary)) => {
            let msg = format!(
                "{}{}",
                summary.report,
                if summary.scraped { " (freshly scraped)" } else { "" }
            );
            app.apply_summary(summary);
            app.status(msg);
        }
        Ok(Err(e)) => {
            error!(error = %e, "GUI: run failed");
            app.status(format!("Error: {e}"));
        }
        Err(TryRecvError::Empty) => return,
        Err(TryRecvError::Disconnected) => {
            error!("GUI: worker thread ended without a result");
            app.status("Error: run aborted");
        }
    }
    app.pending = None;
    app.running = false;
}
