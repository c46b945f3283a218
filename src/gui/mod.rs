//! egui front end for the window chrome

mod app;
mod components;
mod constants;

pub use app::run_gui;
