// src/core/mod.rs

pub mod coords;
pub mod html;
pub mod net;
pub mod sanitize;
