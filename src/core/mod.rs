//! Core module - shared model, paths, rendering, and utilities

pub mod model;
pub mod paths;
pub mod render;
pub mod util;
