pub mod settings_panel;
pub mod title_bar;
