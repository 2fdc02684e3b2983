mod app;
pub mod input;
pub mod painter;

pub use app::CalendarGridApp;
