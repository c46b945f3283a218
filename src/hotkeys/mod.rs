//! Keyboard shortcuts: chords, the action table, and interactive capture

pub mod bindings;
pub mod chord;
pub mod recorder;

pub use bindings::ShortcutBindings;
pub use chord::{KeyChord, KeyPress};
pub use recorder::{RecordOutcome, ShortcutRecorder};
