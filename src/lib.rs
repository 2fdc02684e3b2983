// Calendar grid library
// Exports all modules for testing and reuse

pub mod models;
pub mod services;
pub mod ui_egui; // egui host for the grid
pub mod utils;
