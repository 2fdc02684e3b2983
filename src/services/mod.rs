// Service module exports

pub mod calendar_view;
pub mod layout;
pub mod loader;
pub mod render;
pub mod selection;
pub mod settings;
pub mod text;
pub mod viewport;
