//! Settings persistence
//!
//! - **settings**: the JSON document and its load-time validation
//! - **store**: file location, debounced saves and atomic writes

pub mod settings;
pub mod store;

pub use settings::PersistedSettings;
pub use store::SettingsStore;
