//! Action id -> chord table
//!
//! Invariant: no two actions share a chord. Every mutation goes through
//! [`ShortcutBindings::bind`] or [`ShortcutBindings::reset`], both of which
//! reject collisions and leave the table untouched on error.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::{info, warn};

use crate::constants::actions;
use crate::error::ChromeError;
use crate::hotkeys::KeyChord;

/// Built-in shortcut set, used for first run and per-action reset
pub fn default_chord(action: &str) -> Option<KeyChord> {
    let chord = match action {
        actions::SAVE => KeyChord::new("S").ctrl(),
        actions::QUIT => KeyChord::new("Q").ctrl(),
        actions::COPY_REPORT => KeyChord::new("C").ctrl(),
        actions::CLEAR => KeyChord::new("R").ctrl(),
        actions::MINIMIZE => KeyChord::new("Escape"),
        actions::TOGGLE_TRANSPARENCY => KeyChord::new("T").ctrl().shift(),
        actions::TOGGLE_ALWAYS_ON_TOP => KeyChord::new("A").ctrl().shift(),
        _ => return None,
    };
    Some(chord)
}

pub const DEFAULT_ACTIONS: [&str; 7] = [
    actions::SAVE,
    actions::QUIT,
    actions::COPY_REPORT,
    actions::CLEAR,
    actions::MINIMIZE,
    actions::TOGGLE_TRANSPARENCY,
    actions::TOGGLE_ALWAYS_ON_TOP,
];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShortcutBindings {
    bindings: BTreeMap<String, KeyChord>,
}

impl Default for ShortcutBindings {
    fn default() -> Self {
        let bindings = DEFAULT_ACTIONS
            .iter()
            .filter_map(|action| default_chord(action).map(|chord| (action.to_string(), chord)))
            .collect();
        Self { bindings }
    }
}

impl ShortcutBindings {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &KeyChord)> {
        self.bindings.iter().map(|(action, chord)| (action.as_str(), chord))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn chord_for(&self, action: &str) -> Option<&KeyChord> {
        self.bindings.get(action)
    }

    /// Action bound to `chord`, used to dispatch key presses
    pub fn action_for(&self, chord: &KeyChord) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| *bound == chord)
            .map(|(action, _)| action.as_str())
    }

    fn knows(&self, action: &str) -> bool {
        self.bindings.contains_key(action) || default_chord(action).is_some()
    }

    /// Check `chord` against reserved chords and every other action
    pub fn check(&self, action: &str, chord: &KeyChord) -> Result<(), ChromeError> {
        if chord.is_reserved() {
            return Err(ChromeError::ShortcutReserved(chord.clone()));
        }
        match self.action_for(chord) {
            Some(existing) if existing != action => Err(ChromeError::ShortcutConflict {
                chord: chord.clone(),
                existing: existing.to_string(),
            }),
            _ => Ok(()),
        }
    }

    /// Bind `chord` to `action`, replacing its previous chord
    pub fn bind(&mut self, action: &str, chord: KeyChord) -> Result<(), ChromeError> {
        if !self.knows(action) {
            return Err(ChromeError::UnknownAction(action.to_string()));
        }
        self.check(action, &chord)?;
        info!(action = %action, chord = %chord, "Shortcut bound");
        self.bindings.insert(action.to_string(), chord);
        Ok(())
    }

    /// Restore the built-in chord for `action`
    pub fn reset(&mut self, action: &str) -> Result<KeyChord, ChromeError> {
        let chord =
            default_chord(action).ok_or_else(|| ChromeError::UnknownAction(action.to_string()))?;
        self.bind(action, chord.clone())?;
        Ok(chord)
    }

    /// Repair a table read from disk: drop chords that are reserved or
    /// shared with an earlier action, then add defaults for missing actions
    /// whose chord is still free. Returns the actions that were dropped.
    pub fn repair(&mut self) -> Vec<String> {
        let mut seen: HashMap<KeyChord, String> = HashMap::new();
        let mut dropped = Vec::new();

        for (action, chord) in &self.bindings {
            if chord.is_reserved() || chord.key.is_empty() {
                warn!(action = %action, chord = %chord, "Dropping unusable shortcut");
                dropped.push(action.clone());
            } else if let Some(first) = seen.get(chord) {
                warn!(
                    action = %action,
                    chord = %chord,
                    kept = %first,
                    "Dropping duplicate shortcut"
                );
                dropped.push(action.clone());
            } else {
                seen.insert(chord.clone(), action.clone());
            }
        }
        for action in &dropped {
            self.bindings.remove(action);
        }

        for action in DEFAULT_ACTIONS {
            if self.bindings.contains_key(action) || dropped.iter().any(|d| d == action) {
                continue;
            }
            if let Some(chord) = default_chord(action)
                && self.action_for(&chord).is_none()
            {
                info!(action = %action, chord = %chord, "Adding missing default shortcut");
                self.bindings.insert(action.to_string(), chord);
            }
        }

        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let bindings = ShortcutBindings::default();
        assert_eq!(bindings.len(), DEFAULT_ACTIONS.len());
        assert_eq!(bindings.chord_for(actions::SAVE), Some(&KeyChord::new("S").ctrl()));
        assert_eq!(bindings.chord_for(actions::QUIT), Some(&KeyChord::new("Q").ctrl()));
        assert_eq!(
            bindings.action_for(&KeyChord::new("t").ctrl().shift()),
            Some(actions::TOGGLE_TRANSPARENCY)
        );
    }

    #[test]
    fn test_conflict_leaves_table_unchanged() {
        let mut bindings = ShortcutBindings::default();
        let before = bindings.clone();
        let err = bindings.bind(actions::QUIT, KeyChord::new("S").ctrl()).unwrap_err();
        match err {
            ChromeError::ShortcutConflict { existing, .. } => assert_eq!(existing, actions::SAVE),
            other => panic!("unexpected error: {other}"),
        }
        assert_eq!(bindings, before);
    }

    #[test]
    fn test_rebinding_same_chord_is_not_a_conflict() {
        let mut bindings = ShortcutBindings::default();
        assert!(bindings.bind(actions::SAVE, KeyChord::new("S").ctrl()).is_ok());
    }

    #[test]
    fn test_reserved_rejected() {
        let mut bindings = ShortcutBindings::default();
        let err = bindings.bind(actions::QUIT, KeyChord::new("F4").alt()).unwrap_err();
        assert!(matches!(err, ChromeError::ShortcutReserved(_)));
        assert_eq!(bindings.chord_for(actions::QUIT), Some(&KeyChord::new("Q").ctrl()));
    }

    #[test]
    fn test_unknown_action() {
        let mut bindings = ShortcutBindings::default();
        assert!(matches!(
            bindings.bind("launch_rockets", KeyChord::new("X").ctrl()),
            Err(ChromeError::UnknownAction(_))
        ));
        assert!(matches!(bindings.reset("launch_rockets"), Err(ChromeError::UnknownAction(_))));
    }

    #[test]
    fn test_reset_restores_default() {
        let mut bindings = ShortcutBindings::default();
        bindings.bind(actions::SAVE, KeyChord::new("S").ctrl().shift()).unwrap();
        assert_eq!(bindings.reset(actions::SAVE).unwrap(), KeyChord::new("S").ctrl());
        assert_eq!(bindings.action_for(&KeyChord::new("S").ctrl()), Some(actions::SAVE));
    }

    #[test]
    fn test_reset_rejected_when_default_is_taken() {
        let mut bindings = ShortcutBindings::default();
        bindings.bind(actions::SAVE, KeyChord::new("F2")).unwrap();
        bindings.bind(actions::CLEAR, KeyChord::new("S").ctrl()).unwrap();
        assert!(matches!(
            bindings.reset(actions::SAVE),
            Err(ChromeError::ShortcutConflict { .. })
        ));
    }

    #[test]
    fn test_repair_drops_duplicates_and_fills_defaults() {
        let json = r#"{
            "clear": {"ctrl": true, "key": "S"},
            "save": {"ctrl": true, "key": "S"},
            "quit": {"alt": true, "key": "F4"}
        }"#;
        let mut bindings: ShortcutBindings = serde_json::from_str(json).unwrap();
        let dropped = bindings.repair();
        assert_eq!(dropped, vec!["quit".to_string(), "save".to_string()]);
        // clear keeps Ctrl+S, so save cannot get its default back
        assert_eq!(bindings.action_for(&KeyChord::new("S").ctrl()), Some(actions::CLEAR));
        assert_eq!(bindings.chord_for(actions::SAVE), None);
        assert_eq!(bindings.chord_for(actions::QUIT), None);
        assert_eq!(bindings.chord_for(actions::MINIMIZE), Some(&KeyChord::new("Escape")));
    }
}
