//! Key chords: one primary key plus held modifiers

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Key names that are modifiers on their own and never form a chord
const MODIFIER_KEYS: &[&str] = &[
    "Ctrl", "Control", "Shift", "Alt", "Option", "Super", "Meta", "Cmd", "Command", "Win",
];

/// A keyboard shortcut.
///
/// The key name is normalized on construction and on load so that `"s"` and
/// `"S"` (or `"escape"` and `"Escape"`) compare and hash the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct KeyChord {
    #[serde(default)]
    pub ctrl: bool,
    #[serde(default)]
    pub alt: bool,
    #[serde(default)]
    pub shift: bool,
    #[serde(default, rename = "super")]
    pub super_key: bool,
    #[serde(deserialize_with = "deserialize_key")]
    pub key: String,
}

fn deserialize_key<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    Ok(normalize_key(&raw))
}

/// `"s"` -> `"S"`, `"escape"`/`"ESCAPE"` -> `"Escape"`, `"PageUp"` unchanged
pub fn normalize_key(raw: &str) -> String {
    let raw = raw.trim();
    let mut chars = raw.chars();
    let Some(first) = chars.next() else {
        return String::new();
    };
    if chars.as_str().is_empty() {
        return first.to_uppercase().collect();
    }
    let rest = chars.as_str();
    let uniform = rest == rest.to_lowercase() || raw == raw.to_uppercase();
    if uniform {
        first.to_uppercase().chain(rest.to_lowercase().chars()).collect()
    } else {
        first.to_uppercase().chain(rest.chars()).collect()
    }
}

impl KeyChord {
    pub fn new(key: &str) -> Self {
        Self {
            ctrl: false,
            alt: false,
            shift: false,
            super_key: false,
            key: normalize_key(key),
        }
    }

    pub fn ctrl(mut self) -> Self {
        self.ctrl = true;
        self
    }

    pub fn alt(mut self) -> Self {
        self.alt = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.shift = true;
        self
    }

    pub fn super_key(mut self) -> Self {
        self.super_key = true;
        self
    }

    /// True if the chord is owned by the operating system
    pub fn is_reserved(&self) -> bool {
        reserved_chords().contains(self)
    }
}

impl fmt::Display for KeyChord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ctrl {
            write!(f, "Ctrl+")?;
        }
        if self.alt {
            write!(f, "Alt+")?;
        }
        if self.shift {
            write!(f, "Shift+")?;
        }
        if self.super_key {
            write!(f, "Super+")?;
        }
        write!(f, "{}", self.key)
    }
}

/// Chords the window manager or OS intercept before they reach us
pub fn reserved_chords() -> [KeyChord; 4] {
    [
        KeyChord::new("F4").alt(),
        KeyChord::new("Tab").alt(),
        KeyChord::new("Delete").ctrl().alt(),
        KeyChord::new("L").super_key(),
    ]
}

/// A raw key press as delivered by the render layer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPress {
    pub key: String,
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub super_key: bool,
}

impl KeyPress {
    pub fn new(key: &str) -> Self {
        Self {
            key: key.to_string(),
            ctrl: false,
            alt: false,
            shift: false,
            super_key: false,
        }
    }

    pub fn with_modifiers(mut self, ctrl: bool, alt: bool, shift: bool, super_key: bool) -> Self {
        self.ctrl = ctrl;
        self.alt = alt;
        self.shift = shift;
        self.super_key = super_key;
        self
    }

    /// Empty key or a bare modifier
    pub fn is_modifier_only(&self) -> bool {
        let key = self.key.trim();
        key.is_empty()
            || MODIFIER_KEYS
                .iter()
                .any(|m| m.eq_ignore_ascii_case(key))
    }

    /// The chord this press forms, or `None` for modifier-only presses
    pub fn to_chord(&self) -> Option<KeyChord> {
        if self.is_modifier_only() {
            return None;
        }
        Some(KeyChord {
            ctrl: self.ctrl,
            alt: self.alt,
            shift: self.shift,
            super_key: self.super_key,
            key: normalize_key(&self.key),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_key() {
        assert_eq!(normalize_key("s"), "S");
        assert_eq!(normalize_key("escape"), "Escape");
        assert_eq!(normalize_key("ESCAPE"), "Escape");
        assert_eq!(normalize_key("PageUp"), "PageUp");
        assert_eq!(normalize_key("f4"), "F4");
        assert_eq!(normalize_key("  "), "");
    }

    #[test]
    fn test_display() {
        assert_eq!(KeyChord::new("t").ctrl().shift().to_string(), "Ctrl+Shift+T");
        assert_eq!(KeyChord::new("Escape").to_string(), "Escape");
        assert_eq!(KeyChord::new("delete").ctrl().alt().to_string(), "Ctrl+Alt+Delete");
    }

    #[test]
    fn test_deserialize_without_super_field() {
        let chord: KeyChord =
            serde_json::from_str(r#"{"ctrl": true, "shift": false, "alt": false, "key": "s"}"#)
                .unwrap();
        assert_eq!(chord, KeyChord::new("S").ctrl());
    }

    #[test]
    fn test_serialize_uses_super_name() {
        let json = serde_json::to_value(KeyChord::new("L").super_key()).unwrap();
        assert_eq!(json["super"], true);
        assert_eq!(json["key"], "L");
    }

    #[test]
    fn test_reserved() {
        assert!(KeyChord::new("f4").alt().is_reserved());
        assert!(KeyChord::new("l").super_key().is_reserved());
        assert!(!KeyChord::new("F4").is_reserved());
        assert!(!KeyChord::new("S").ctrl().is_reserved());
    }

    #[test]
    fn test_modifier_only_press_has_no_chord() {
        let shift_only = KeyPress::new("Shift").with_modifiers(false, false, true, false);
        assert_eq!(shift_only.to_chord(), None);
        assert_eq!(KeyPress::new("").to_chord(), None);
        assert_eq!(
            KeyPress::new("q").with_modifiers(true, false, false, false).to_chord(),
            Some(KeyChord::new("Q").ctrl())
        );
    }
}
