//! Named bundles of augmentation parameters.
//!
//! Built-in presets are fixed. User presets are owned by an outside store and
//! handed in by value; this module keeps them in memory only.

mod builtin;

pub use builtin::builtin_presets;

use std::collections::HashMap;

use image::RgbaImage;
use parking_lot::Mutex;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::augment::{apply_effects, Effect, EffectId};

/// `{id, name, settings}` as exchanged with the preset owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Preset {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Effect ID -> raw value. Keys that name no effect are ignored.
    #[serde(default)]
    pub settings: HashMap<String, f64>,
}

impl Preset {
    pub fn new(id: impl Into<String>, name: impl Into<String>, settings: HashMap<String, f64>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            settings,
        }
    }

    fn builtin(id: &str, name: &str, description: &str, settings: &[(&str, f64)]) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            description: Some(description.to_string()),
            settings: settings
                .iter()
                .map(|(k, v)| ((*k).to_string(), *v))
                .collect(),
        }
    }

    /// Non-identity effects in fixed application order, values clamped.
    pub fn effects(&self) -> Vec<Effect> {
        for key in self.settings.keys() {
            if EffectId::from_str_id(key).is_none() {
                tracing::warn!("Preset '{}' has unknown setting '{key}', skipping", self.id);
            }
        }
        EffectId::ALL
            .into_iter()
            .filter_map(|id| self.settings.get(id.as_str()).map(|v| Effect::scalar(id, *v)))
            .filter(|effect| !effect.is_identity())
            .collect()
    }

    /// Apply every non-identity setting to a decoded image.
    pub fn apply<R: Rng + ?Sized>(&self, image: RgbaImage, rng: &mut R) -> RgbaImage {
        apply_effects(image, &self.effects(), rng)
    }
}

/// Built-in presets plus user presets registered by their owner.
pub struct PresetStore {
    builtins: Vec<Preset>,
    user: Mutex<Vec<Preset>>,
}

impl Default for PresetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl PresetStore {
    pub fn new() -> Self {
        Self {
            builtins: builtin_presets(),
            user: Mutex::new(Vec::new()),
        }
    }

    pub fn builtins(&self) -> &[Preset] {
        &self.builtins
    }

    pub fn user_presets(&self) -> Vec<Preset> {
        self.user.lock().clone()
    }

    /// Built-ins first, then user presets in insertion order.
    pub fn all(&self) -> Vec<Preset> {
        let mut all = self.builtins.clone();
        all.extend(self.user.lock().iter().cloned());
        all
    }

    /// Look up by ID; built-ins shadow user presets with the same ID.
    pub fn find(&self, id: &str) -> Option<Preset> {
        self.builtins
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .or_else(|| self.user.lock().iter().find(|p| p.id == id).cloned())
    }

    /// Register or replace a user preset.
    pub fn upsert_user(&self, preset: Preset) {
        let mut user = self.user.lock();
        match user.iter_mut().find(|p| p.id == preset.id) {
            Some(existing) => *existing = preset,
            None => user.push(preset),
        }
    }

    /// Drop a user preset. Built-ins cannot be removed.
    pub fn remove_user(&self, id: &str) -> Option<Preset> {
        let mut user = self.user.lock();
        let idx = user.iter().position(|p| p.id == id)?;
        Some(user.remove(idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn make_preset(settings: &[(&str, f64)]) -> Preset {
        Preset::new(
            "custom",
            "Custom",
            settings.iter().map(|(k, v)| ((*k).to_string(), *v)).collect(),
        )
    }

    #[test]
    fn identity_entries_are_skipped() {
        let preset = make_preset(&[("brightness", 1.2), ("contrast", 0.0), ("saturation", 1.0)]);
        assert_eq!(preset.effects(), vec![Effect::Brightness(1.2)]);
    }

    #[test]
    fn effects_follow_fixed_key_order() {
        let preset = make_preset(&[("sharpen", 0.3), ("hue", 10.0), ("brightness", 0.9), ("blur", 2.0)]);
        let ids: Vec<_> = preset.effects().iter().filter_map(Effect::id).collect();
        assert_eq!(
            ids,
            vec![EffectId::Brightness, EffectId::Blur, EffectId::Hue, EffectId::Sharpen]
        );
    }

    #[test]
    fn unknown_keys_are_ignored() {
        let preset = make_preset(&[("vignette", 0.7), ("noise", 0.1)]);
        assert_eq!(preset.effects(), vec![Effect::Noise(0.1)]);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let preset = make_preset(&[("contrast", 300.0)]);
        assert_eq!(preset.effects(), vec![Effect::Contrast(258.0)]);
    }

    #[test]
    fn apply_with_only_brightness_matches_single_pass() {
        let image = RgbaImage::from_fn(8, 8, |x, y| Rgba([(x * 20) as u8, (y * 20) as u8, 100, 255]));
        let preset = make_preset(&[("brightness", 1.2), ("contrast", 0.0), ("saturation", 1.0)]);
        let mut rng = StdRng::seed_from_u64(0);
        let out = preset.apply(image.clone(), &mut rng);
        assert_eq!(out, crate::augment::photometric::adjust_brightness(&image, 1.2));
    }

    #[test]
    fn deserialises_external_preset_objects() {
        let json = r#"{"id":"u1","name":"Mine","settings":{"brightness":1.3,"hue":-20}}"#;
        let preset: Preset = serde_json::from_str(json).unwrap();
        assert_eq!(preset.description, None);
        assert_eq!(preset.settings["hue"], -20.0);
    }

    #[test]
    fn store_lists_builtins_then_user() {
        let store = PresetStore::new();
        store.upsert_user(make_preset(&[("noise", 0.3)]));
        let all = store.all();
        assert_eq!(all.len(), 11);
        assert_eq!(all.last().unwrap().id, "custom");
    }

    #[test]
    fn upsert_replaces_existing_user_preset() {
        let store = PresetStore::new();
        store.upsert_user(make_preset(&[("noise", 0.3)]));
        store.upsert_user(make_preset(&[("noise", 0.4)]));
        let user = store.user_presets();
        assert_eq!(user.len(), 1);
        assert_eq!(user[0].settings["noise"], 0.4);
    }

    #[test]
    fn find_and_remove() {
        let store = PresetStore::new();
        assert!(store.find("low_light").is_some());
        store.upsert_user(make_preset(&[]));
        assert!(store.find("custom").is_some());
        assert!(store.remove_user("custom").is_some());
        assert!(store.find("custom").is_none());
        assert!(store.remove_user("low_light").is_none());
    }
}
