//! Per-view shared state read by the preview loop and the capture controller.
//!
//! Each field sits behind its own lock so a read-modify-write from an input
//! handler is atomic with respect to a concurrent render tick or capture.

use parking_lot::Mutex;

use crate::augment::{AugmentationParams, Effect, EffectId, FlipDirection};
use crate::config::PipelineConfig;
use crate::preset::Preset;
use crate::roi::{Point, Roi, RoiEngine, Size};

/// Effects switched on in the preview plus their current parameters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ActiveAugmentations {
    /// Enabled effects in the order they were switched on.
    pub enabled: Vec<EffectId>,
    pub params: AugmentationParams,
    pub flip_horizontal: bool,
    pub flip_vertical: bool,
    /// Accumulated preview rotation in degrees, kept in `[0, 360)`.
    pub rotation: f64,
}

impl ActiveAugmentations {
    pub fn is_enabled(&self, id: EffectId) -> bool {
        self.enabled.contains(&id)
    }

    /// Enabled scalar effects that would change pixels, in toggle order.
    pub fn pixel_effects(&self) -> Vec<Effect> {
        self.enabled
            .iter()
            .map(|id| self.params.effect(*id))
            .filter(|effect| !effect.is_identity())
            .collect()
    }

    /// Flip and rotation, in the order the preview applies them.
    pub fn transforms(&self) -> Vec<Effect> {
        let mut out = Vec::new();
        if self.flip_horizontal {
            out.push(Effect::Flip(FlipDirection::Horizontal));
        }
        if self.flip_vertical {
            out.push(Effect::Flip(FlipDirection::Vertical));
        }
        if self.rotation != 0.0 {
            out.push(Effect::Rotate(self.rotation));
        }
        out
    }

    /// Whether a preview tick has any work to do.
    pub fn is_active(&self) -> bool {
        !self.pixel_effects().is_empty() || !self.transforms().is_empty()
    }

    fn enable(&mut self, id: EffectId) {
        if !self.is_enabled(id) {
            self.enabled.push(id);
        }
    }
}

/// Explicit context object scoped to one capture view.
pub struct Session {
    roi: Mutex<RoiEngine>,
    augmentations: Mutex<ActiveAugmentations>,
    preset: Mutex<Option<Preset>>,
    class_name: Mutex<String>,
}

impl Session {
    pub fn new(config: &PipelineConfig, viewport: Size) -> Self {
        Self {
            roi: Mutex::new(RoiEngine::new(&config.roi, viewport)),
            augmentations: Mutex::new(ActiveAugmentations::default()),
            preset: Mutex::new(None),
            class_name: Mutex::new(String::new()),
        }
    }

    // --- ROI ---

    /// Run `f` against the ROI engine while holding its lock.
    pub fn with_roi<T>(&self, f: impl FnOnce(&mut RoiEngine) -> T) -> T {
        f(&mut self.roi.lock())
    }

    pub fn roi(&self) -> Option<Roi> {
        self.roi.lock().roi()
    }

    pub fn viewport(&self) -> Size {
        self.roi.lock().container()
    }

    pub fn set_viewport(&self, viewport: Size) {
        self.roi.lock().set_container(viewport);
    }

    pub fn pointer_down(&self, p: Point) {
        self.roi.lock().pointer_down(p);
    }

    pub fn pointer_move(&self, p: Point) -> Option<Roi> {
        self.roi.lock().pointer_move(p)
    }

    pub fn pointer_up(&self) -> Option<Roi> {
        self.roi.lock().pointer_up()
    }

    // --- Augmentations ---

    /// Snapshot of the active set.
    pub fn augmentations(&self) -> ActiveAugmentations {
        self.augmentations.lock().clone()
    }

    /// Flip an effect on or off. Returns whether it is now enabled.
    pub fn toggle_effect(&self, id: EffectId) -> bool {
        let mut active = self.augmentations.lock();
        if let Some(idx) = active.enabled.iter().position(|e| *e == id) {
            active.enabled.remove(idx);
            false
        } else {
            active.enabled.push(id);
            true
        }
    }

    pub fn set_param(&self, id: EffectId, value: f64) {
        self.augmentations.lock().params.set(id, value);
    }

    /// Toggle a preview flip. Returns the new state.
    pub fn toggle_flip(&self, direction: FlipDirection) -> bool {
        let mut active = self.augmentations.lock();
        let flag = match direction {
            FlipDirection::Horizontal => &mut active.flip_horizontal,
            FlipDirection::Vertical => &mut active.flip_vertical,
        };
        *flag = !*flag;
        *flag
    }

    /// Add `degrees` to the preview rotation.
    pub fn rotate_by(&self, degrees: f64) -> f64 {
        let mut active = self.augmentations.lock();
        active.rotation = (active.rotation + degrees).rem_euclid(360.0);
        active.rotation
    }

    /// Clear flips and rotation, keeping pixel effects.
    pub fn reset_transforms(&self) {
        let mut active = self.augmentations.lock();
        active.flip_horizontal = false;
        active.flip_vertical = false;
        active.rotation = 0.0;
    }

    // --- Presets ---

    /// Make `preset` active and push its non-identity values into the
    /// active set. The preset itself is never modified.
    pub fn activate_preset(&self, preset: Preset) {
        {
            let mut active = self.augmentations.lock();
            for effect in preset.effects() {
                let Some(id) = effect.id() else { continue };
                if let Some(value) = preset.settings.get(id.as_str()) {
                    active.params.set(id, *value);
                    active.enable(id);
                }
            }
        }
        tracing::debug!("Activated preset '{}'", preset.id);
        *self.preset.lock() = Some(preset);
    }

    pub fn clear_preset(&self) {
        *self.preset.lock() = None;
    }

    pub fn active_preset(&self) -> Option<Preset> {
        self.preset.lock().clone()
    }

    // --- Labelling ---

    pub fn set_class_name(&self, name: impl Into<String>) {
        *self.class_name.lock() = name.into();
    }

    pub fn class_name(&self) -> String {
        self.class_name.lock().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;

    fn make_session() -> Session {
        Session::new(&PipelineConfig::default(), Size::new(640.0, 480.0))
    }

    #[test]
    fn toggle_keeps_enable_order() {
        let session = make_session();
        assert!(session.toggle_effect(EffectId::Sharpen));
        assert!(session.toggle_effect(EffectId::Brightness));
        assert_eq!(
            session.augmentations().enabled,
            vec![EffectId::Sharpen, EffectId::Brightness]
        );
        assert!(!session.toggle_effect(EffectId::Sharpen));
        assert_eq!(session.augmentations().enabled, vec![EffectId::Brightness]);
    }

    #[test]
    fn identity_params_make_the_set_inactive() {
        let session = make_session();
        session.toggle_effect(EffectId::Brightness);
        assert!(!session.augmentations().is_active());
        session.set_param(EffectId::Brightness, 1.5);
        assert!(session.augmentations().is_active());
    }

    #[test]
    fn transforms_alone_make_the_set_active() {
        let session = make_session();
        session.toggle_flip(FlipDirection::Vertical);
        let active = session.augmentations();
        assert!(active.is_active());
        assert_eq!(active.transforms(), vec![Effect::Flip(FlipDirection::Vertical)]);
    }

    #[test]
    fn rotation_wraps() {
        let session = make_session();
        session.rotate_by(270.0);
        assert_eq!(session.rotate_by(180.0), 90.0);
        assert_eq!(session.rotate_by(-90.0), 0.0);
        assert!(!session.augmentations().is_active());
    }

    #[test]
    fn activating_preset_seeds_non_identity_effects() {
        let session = make_session();
        let settings: HashMap<String, f64> = [("brightness", 1.2), ("contrast", 0.0), ("hue", 12.0)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect();
        session.activate_preset(Preset::new("p", "P", settings));

        let active = session.augmentations();
        assert_eq!(active.enabled, vec![EffectId::Brightness, EffectId::Hue]);
        assert_eq!(active.params.brightness, 1.2);
        assert_eq!(active.params.hue, 12.0);
        assert_eq!(session.active_preset().unwrap().id, "p");
    }

    #[test]
    fn clearing_preset_keeps_seeded_effects() {
        let session = make_session();
        session.activate_preset(crate::preset::builtin_presets().remove(0));
        session.clear_preset();
        assert!(session.active_preset().is_none());
        assert!(!session.augmentations().enabled.is_empty());
    }

    #[test]
    fn pointer_events_reach_the_roi_engine() {
        let session = make_session();
        session.pointer_down(Point::new(50.0, 50.0));
        session.pointer_move(Point::new(150.0, 120.0));
        assert_eq!(session.pointer_up(), Some(Roi::new(50.0, 50.0, 100.0, 70.0)));
        assert_eq!(session.roi(), Some(Roi::new(50.0, 50.0, 100.0, 70.0)));
    }

    #[test]
    fn concurrent_toggles_are_not_lost() {
        let session = Arc::new(make_session());
        let handles: Vec<_> = EffectId::ALL
            .into_iter()
            .map(|id| {
                let session = Arc::clone(&session);
                std::thread::spawn(move || {
                    session.toggle_effect(id);
                })
            })
            .collect();
        for h in handles {
            h.join().unwrap();
        }
        assert_eq!(session.augmentations().enabled.len(), EffectId::ALL.len());
    }
}
