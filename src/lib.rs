// src/lib.rs

#[macro_use]
pub mod macros;

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod grid;
pub mod log;
pub mod specs;

pub mod claim;
pub mod gui;
pub mod methods;
pub mod progress;
pub mod render;
pub mod resolve;
pub mod runner;
pub mod scrape;
pub mod store;
pub mod summary;
pub mod tables;
