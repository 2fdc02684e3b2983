// Settings service module
// Loads and stores the grid settings as a TOML file.

mod service;

pub use service::SettingsService;
