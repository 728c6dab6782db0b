// src/progress.rs
/// Lightweight progress reporting used by long-running operations (scrape/resolve).
/// Frontends (GUI/CLI) implement this to surface status to users.
pub trait Progress {
    /// Called at the start of a phase with the total number of items (if known).
    fn begin(&mut self, _phase: &str, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called when one logical unit completes (a claim page fetched, a claim resolved).
    fn item_done(&mut self, _done: usize) {}

    /// Called when one unit is skipped because it failed.
    fn item_failed(&mut self, _what: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}
