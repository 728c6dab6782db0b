// src/gui/actions/mod.rs
//
// Folder module facade: re-export public entrypoints.
// Submodules stay private; consumers only see actions::{run, poll, save_map}.

mod run;      // src/gui/actions/run.rs
mod save_map; // src/gui/actions/save_map.rs

pub use run::{poll, run};
pub use save_map::save_map;
