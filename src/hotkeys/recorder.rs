//! Interactive shortcut capture for the settings panel
//!
//! `Idle -> Listening(action) -> Idle`. While listening, the next key press
//! that carries a primary key is taken as the new chord for the action.

use tracing::{debug, info, warn};

use crate::error::ChromeError;
use crate::hotkeys::{KeyChord, KeyPress, ShortcutBindings};

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum RecorderState {
    #[default]
    Idle,
    Listening { action: String },
}

#[derive(Debug)]
pub enum RecordOutcome {
    /// Not listening; the press should be dispatched normally
    Ignored,
    /// Modifier-only press, still waiting for a key
    StillListening,
    /// New chord stored. The caller requests a save.
    Bound { action: String, chord: KeyChord },
    /// Chord refused; bindings are unchanged
    Rejected { action: String, error: ChromeError },
}

#[derive(Debug, Default)]
pub struct ShortcutRecorder {
    state: RecorderState,
}

impl ShortcutRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &RecorderState {
        &self.state
    }

    pub fn is_listening(&self) -> bool {
        matches!(self.state, RecorderState::Listening { .. })
    }

    /// Action currently waiting for a chord
    pub fn listening_for(&self) -> Option<&str> {
        match &self.state {
            RecorderState::Listening { action } => Some(action),
            RecorderState::Idle => None,
        }
    }

    pub fn start(&mut self, action: &str) {
        info!(action = %action, "Listening for new shortcut");
        self.state = RecorderState::Listening {
            action: action.to_string(),
        };
    }

    /// Explicit cancel or focus loss
    pub fn cancel(&mut self) {
        if let RecorderState::Listening { action } = &self.state {
            debug!(action = %action, "Shortcut capture cancelled");
        }
        self.state = RecorderState::Idle;
    }

    pub fn handle_key(
        &mut self,
        press: &KeyPress,
        bindings: &mut ShortcutBindings,
    ) -> RecordOutcome {
        let RecorderState::Listening { action } = &self.state else {
            return RecordOutcome::Ignored;
        };
        let Some(chord) = press.to_chord() else {
            return RecordOutcome::StillListening;
        };

        let action = action.clone();
        self.state = RecorderState::Idle;

        match bindings.bind(&action, chord.clone()) {
            Ok(()) => RecordOutcome::Bound { action, chord },
            Err(error) => {
                warn!(action = %action, chord = %chord, error = %error, "Shortcut rejected");
                RecordOutcome::Rejected { action, error }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::actions;

    fn ctrl(key: &str) -> KeyPress {
        KeyPress::new(key).with_modifiers(true, false, false, false)
    }

    #[test]
    fn test_idle_ignores_keys() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutBindings::default();
        assert!(matches!(recorder.handle_key(&ctrl("S"), &mut bindings), RecordOutcome::Ignored));
    }

    #[test]
    fn test_modifier_only_keeps_listening() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutBindings::default();
        recorder.start(actions::SAVE);
        let press = KeyPress::new("Control").with_modifiers(true, false, false, false);
        let outcome = recorder.handle_key(&press, &mut bindings);
        assert!(matches!(outcome, RecordOutcome::StillListening));
        assert_eq!(recorder.listening_for(), Some(actions::SAVE));
    }

    #[test]
    fn test_binding_collision_with_save() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutBindings::default();
        recorder.start(actions::QUIT);
        let outcome = recorder.handle_key(&ctrl("s"), &mut bindings);
        match outcome {
            RecordOutcome::Rejected {
                action,
                error: ChromeError::ShortcutConflict { existing, .. },
            } => {
                assert_eq!(action, actions::QUIT);
                assert_eq!(existing, actions::SAVE);
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(*recorder.state(), RecorderState::Idle);
        assert_eq!(bindings.chord_for(actions::SAVE), Some(&KeyChord::new("S").ctrl()));
        assert_eq!(bindings.chord_for(actions::QUIT), Some(&KeyChord::new("Q").ctrl()));
    }

    #[test]
    fn test_reserved_chord_rejected() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutBindings::default();
        recorder.start(actions::CLEAR);
        let press = KeyPress::new("Tab").with_modifiers(false, true, false, false);
        assert!(matches!(
            recorder.handle_key(&press, &mut bindings),
            RecordOutcome::Rejected { error: ChromeError::ShortcutReserved(_), .. }
        ));
        assert!(!recorder.is_listening());
    }

    #[test]
    fn test_successful_capture() {
        let mut recorder = ShortcutRecorder::new();
        let mut bindings = ShortcutBindings::default();
        recorder.start(actions::SAVE);
        let press = KeyPress::new("s").with_modifiers(true, false, true, false);
        match recorder.handle_key(&press, &mut bindings) {
            RecordOutcome::Bound { action, chord } => {
                assert_eq!(action, actions::SAVE);
                assert_eq!(chord.to_string(), "Ctrl+Shift+S");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(bindings.action_for(&KeyChord::new("S").ctrl().shift()), Some(actions::SAVE));
        assert_eq!(bindings.action_for(&KeyChord::new("S").ctrl()), None);
    }

    #[test]
    fn test_cancel() {
        let mut recorder = ShortcutRecorder::new();
        recorder.start(actions::MINIMIZE);
        recorder.cancel();
        assert_eq!(recorder.listening_for(), None);
    }
}
