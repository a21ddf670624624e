mod app;
mod cli;
mod logging;
mod ui;

pub use app::run_app;
