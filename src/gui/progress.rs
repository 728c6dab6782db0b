// src/gui/progress.rs
use std::sync::{Arc, Mutex};

use eframe::egui;

use crate::progress::Progress;

/// Writes run progress into the status line shared with the UI thread.
pub struct GuiProgress {
    status: Arc<Mutex<String>>,
    ctx: egui::Context,
    phase: String,
    done: usize,
    total: usize,
    failed: usize,
}

impl GuiProgress {
    pub fn new(status: Arc<Mutex<String>>, ctx: egui::Context) -> Self {
        Self { status, ctx, phase: s!(), done: 0, total: 0, failed: 0 }
    }

    fn set_status(&self, msg: impl Into<String>) {
        if let Ok(mut s) = self.status.lock() {
            *s = msg.into();
        }
        self.ctx.request_repaint();
    }
}

impl Progress for GuiProgress {
    fn begin(&mut self, phase: &str, total: usize) {
        self.phase = s!(phase);
        self.total = total;
        self.done = 0;
        self.set_status(format!("{phase}… (0/{total})"));
    }

    fn log(&mut self, msg: &str) {
        self.set_status(msg);
    }

    fn item_done(&mut self, done: usize) {
        self.done = done;
        self.set_status(format!("{}… ({}/{})", self.phase, self.done, self.total));
    }

    fn item_failed(&mut self, _what: &str) {
        self.failed += 1;
    }

    fn finish(&mut self) {
        if self.failed > 0 {
            self.set_status(format!("Done, {} claim page(s) skipped", self.failed));
        }
    }
}
