//! On-disk settings document
//!
//! The window chrome owns geometry, aspect lock, opacity, snapping, shortcuts
//! and always-on-top. Any other top-level keys (rates, fees, ...) belong to
//! the calculator and are carried through untouched, in their original order.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::value::RawValue;
use tracing::{info, warn};

use crate::constants::{geometry as limits, snapping};
use crate::geometry::{AspectLock, Opacity, WindowGeometry, clamp_aspect_ratio};
use crate::hotkeys::ShortcutBindings;
use crate::snapping::SnapConfig;

/// Calculator fields written into a fresh settings file
const DEFAULT_EXTERNAL: [(&str, &str); 4] = [
    ("rate_merits_seconds", "1.0"),
    ("rate_merits_auec", "0.618"),
    ("discount_percent", "0.0"),
    ("fee_percent", "0.5"),
];

fn default_external() -> ExternalFields {
    DEFAULT_EXTERNAL
        .iter()
        .filter_map(|(key, value)| {
            let raw = RawValue::from_string((*value).to_string()).ok()?;
            Some(((*key).to_string(), raw))
        })
        .collect()
}

/// Top-level keys owned by other parts of the application, in file order.
/// Values keep the exact JSON text they were read with.
#[derive(Debug, Clone, Default)]
pub struct ExternalFields(Vec<(String, Box<RawValue>)>);

impl ExternalFields {
    pub fn get(&self, key: &str) -> Option<&RawValue> {
        self.0.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_ref())
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Replace the value of `key`, or append it
    pub fn insert(&mut self, key: String, value: Box<RawValue>) {
        match self.0.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.0.push((key, value)),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl PartialEq for ExternalFields {
    fn eq(&self, other: &Self) -> bool {
        self.0.len() == other.0.len()
            && self
                .iter()
                .zip(other.iter())
                .all(|((ka, va), (kb, vb))| ka == kb && va.get() == vb.get())
    }
}

impl FromIterator<(String, Box<RawValue>)> for ExternalFields {
    fn from_iter<I: IntoIterator<Item = (String, Box<RawValue>)>>(iter: I) -> Self {
        let mut fields = Self::default();
        for (key, value) in iter {
            fields.insert(key, value);
        }
        fields
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PersistedSettings {
    pub geometry: WindowGeometry,
    pub aspect_lock: AspectLock,
    pub opacity: Opacity,
    pub snap: SnapConfig,
    pub shortcuts: ShortcutBindings,
    pub always_on_top: bool,

    /// Keys owned by other parts of the application
    pub external: ExternalFields,
}

impl Default for PersistedSettings {
    fn default() -> Self {
        Self {
            external: default_external(),
            ..Self::core_defaults()
        }
    }
}

mod keys {
    pub const GEOMETRY: &str = "geometry";
    pub const ASPECT_LOCK: &str = "aspectLock";
    pub const OPACITY: &str = "opacity";
    pub const SNAP: &str = "snap";
    pub const SHORTCUTS: &str = "shortcuts";
    pub const ALWAYS_ON_TOP: &str = "alwaysOnTop";
}

impl Serialize for PersistedSettings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(6 + self.external.len()))?;
        map.serialize_entry(keys::GEOMETRY, &self.geometry)?;
        map.serialize_entry(keys::ASPECT_LOCK, &self.aspect_lock)?;
        map.serialize_entry(keys::OPACITY, &self.opacity)?;
        map.serialize_entry(keys::SNAP, &self.snap)?;
        map.serialize_entry(keys::SHORTCUTS, &self.shortcuts)?;
        map.serialize_entry(keys::ALWAYS_ON_TOP, &self.always_on_top)?;
        for (key, value) in self.external.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PersistedSettings {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(SettingsVisitor)
    }
}

/// Typed fields for the chrome's own keys, raw text for everything else
struct SettingsVisitor;

impl<'de> Visitor<'de> for SettingsVisitor {
    type Value = PersistedSettings;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("a settings object")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut settings = PersistedSettings::core_defaults();
        while let Some(key) = map.next_key::<String>()? {
            match key.as_str() {
                keys::GEOMETRY => settings.geometry = map.next_value()?,
                keys::ASPECT_LOCK => settings.aspect_lock = map.next_value()?,
                keys::OPACITY => settings.opacity = map.next_value()?,
                keys::SNAP => settings.snap = map.next_value()?,
                keys::SHORTCUTS => settings.shortcuts = map.next_value()?,
                keys::ALWAYS_ON_TOP => settings.always_on_top = map.next_value()?,
                _ => {
                    let value: Box<RawValue> = map.next_value()?;
                    settings.external.insert(key, value);
                }
            }
        }
        Ok(settings)
    }
}

impl PersistedSettings {
    /// Chrome defaults with no calculator fields
    fn core_defaults() -> Self {
        Self {
            geometry: WindowGeometry::default(),
            aspect_lock: AspectLock::default(),
            opacity: Opacity::default(),
            snap: SnapConfig::default(),
            shortcuts: ShortcutBindings::default(),
            always_on_top: false,
            external: ExternalFields::default(),
        }
    }

    /// Validate and clamp values read from disk to usable ranges
    pub fn validate_and_clamp(&mut self) {
        let geometry = &mut self.geometry;
        if geometry.width < limits::MIN_WIDTH {
            warn!(
                width = geometry.width,
                min = limits::MIN_WIDTH,
                "width below minimum, clamping"
            );
            geometry.width = limits::MIN_WIDTH;
        }
        if geometry.height < limits::MIN_HEIGHT {
            warn!(
                height = geometry.height,
                min = limits::MIN_HEIGHT,
                "height below minimum, clamping"
            );
            geometry.height = limits::MIN_HEIGHT;
        }
        if !geometry.dpi_scale.is_finite() || geometry.dpi_scale <= 0.0 {
            warn!(
                dpi_scale = geometry.dpi_scale,
                using = limits::DEFAULT_DPI_SCALE,
                "invalid dpi_scale, using default"
            );
            geometry.dpi_scale = limits::DEFAULT_DPI_SCALE;
        }

        if let Some(ratio) = self.aspect_lock.ratio {
            let clamped = clamp_aspect_ratio(ratio);
            match clamped {
                None => warn!(ratio, "invalid aspect ratio, discarding"),
                Some(using) if using != ratio => {
                    warn!(ratio, using, "aspect ratio out of range, clamping");
                }
                Some(_) => {}
            }
            self.aspect_lock.ratio = clamped;
        }

        if self.snap.threshold_px < 0 {
            warn!(threshold_px = self.snap.threshold_px, "snap threshold negative, using 0");
            self.snap.threshold_px = 0;
        } else if self.snap.threshold_px > snapping::MAX_THRESHOLD {
            warn!(
                threshold_px = self.snap.threshold_px,
                max = snapping::MAX_THRESHOLD,
                "snap threshold exceeds maximum, clamping"
            );
            self.snap.threshold_px = snapping::MAX_THRESHOLD;
        }

        let dropped = self.shortcuts.repair();
        if !dropped.is_empty() {
            info!(count = dropped.len(), "Removed conflicting shortcuts");
        }

        let mut added = Vec::new();
        for (key, value) in default_external().0 {
            if !self.external.contains_key(&key) {
                added.push(key.clone());
                self.external.insert(key, value);
            }
        }
        if !added.is_empty() {
            info!(fields = ?added, "Added missing calculator defaults");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hotkeys::KeyChord;
    use serde_json::{Value, json};

    fn raw<'a>(settings: &'a PersistedSettings, key: &str) -> Option<&'a str> {
        settings.external.get(key).map(RawValue::get)
    }

    #[test]
    fn test_defaults_match_first_run() {
        let settings = PersistedSettings::default();
        assert_eq!(settings.geometry, WindowGeometry::new(100, 100, 500, 720));
        assert!((settings.opacity.value() - 0.9).abs() < f32::EPSILON);
        assert!(!settings.always_on_top);
        assert_eq!(raw(&settings, "fee_percent"), Some("0.5"));
    }

    #[test]
    fn test_serialized_layout() {
        let value = serde_json::to_value(PersistedSettings::default()).unwrap();
        assert_eq!(value["geometry"]["dpiScale"], json!(1.0));
        assert_eq!(value["aspectLock"]["ratio"], Value::Null);
        assert_eq!(value["snap"]["thresholdPx"], json!(12));
        assert_eq!(value["shortcuts"]["save"]["key"], json!("S"));
        assert_eq!(value["alwaysOnTop"], json!(false));
        assert_eq!(value["rate_merits_auec"], json!(0.618));
    }

    #[test]
    fn test_validate_and_clamp() {
        let json = r#"{
            "geometry": {"x": 5, "y": 5, "width": 10, "height": 20},
            "aspectLock": {"enabled": true, "ratio": 1e-9},
            "opacity": 0.0,
            "snap": {"thresholdPx": 9000},
            "rate_merits_seconds": 3.5
        }"#;
        let mut settings: PersistedSettings = serde_json::from_str(json).unwrap();
        settings.validate_and_clamp();
        assert_eq!((settings.geometry.width, settings.geometry.height), (400, 500));
        assert_eq!(settings.aspect_lock.ratio, Some(limits::MIN_ASPECT_RATIO));
        assert!((settings.opacity.value() - 0.1).abs() < f32::EPSILON);
        assert_eq!(settings.snap.threshold_px, snapping::MAX_THRESHOLD);
        assert_eq!(raw(&settings, "rate_merits_seconds"), Some("3.5"));
        assert_eq!(raw(&settings, "discount_percent"), Some("0.0"));
        assert_eq!(settings.shortcuts.chord_for("save"), Some(&KeyChord::new("S").ctrl()));
    }

    #[test]
    fn test_external_keys_keep_order() {
        let json = r#"{"zeta": 1, "opacity": 0.5, "alpha": 2, "mid": {"nested": true}}"#;
        let settings: PersistedSettings = serde_json::from_str(json).unwrap();
        let keys: Vec<&str> = settings.external.iter().map(|(key, _)| key).collect();
        assert_eq!(keys, ["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_invalid_aspect_ratio_is_discarded() {
        let json = r#"{"aspectLock": {"enabled": true, "ratio": -2.0}}"#;
        let mut settings: PersistedSettings = serde_json::from_str(json).unwrap();
        settings.validate_and_clamp();
        assert_eq!(settings.aspect_lock.ratio, None);
    }

    #[test]
    fn test_external_values_keep_their_text() {
        let json = r#"{"rate_merits_auec": 0.6180, "big": 123456789012345678901234567890}"#;
        let settings: PersistedSettings = serde_json::from_str(json).unwrap();
        assert_eq!(raw(&settings, "rate_merits_auec"), Some("0.6180"));
        assert_eq!(raw(&settings, "big"), Some("123456789012345678901234567890"));

        let written = serde_json::to_string(&settings).unwrap();
        assert!(written.contains(r#""rate_merits_auec":0.6180"#), "{written}");
        assert!(written.contains(r#""big":123456789012345678901234567890"#), "{written}");
    }
}
