use super::Preset;

/// Fixed presets shipped with the pipeline.
pub fn builtin_presets() -> Vec<Preset> {
    vec![
        Preset::builtin(
            "data_augmentation",
            "Data Augmentation",
            "Standard ML data augmentation for training",
            &[("brightness", 1.1), ("contrast", 15.0), ("saturation", 1.2), ("noise", 0.05), ("blur", 0.5)],
        ),
        Preset::builtin(
            "robustness",
            "Robustness Training",
            "Enhance model robustness to lighting variations",
            &[("brightness", 0.8), ("contrast", 25.0), ("saturation", 0.9), ("noise", 0.1), ("blur", 1.0)],
        ),
        Preset::builtin(
            "low_light",
            "Low Light Adaptation",
            "Simulate low light conditions",
            &[("brightness", 0.6), ("contrast", 30.0), ("saturation", 0.8), ("noise", 0.15), ("blur", 1.5)],
        ),
        Preset::builtin(
            "bright_light",
            "Bright Light Adaptation",
            "Simulate bright/overexposed conditions",
            &[("brightness", 1.4), ("contrast", 20.0), ("saturation", 1.3), ("noise", 0.08), ("blur", 0.8)],
        ),
        Preset::builtin(
            "noise_tolerance",
            "Noise Tolerance",
            "Train model to handle noisy images",
            &[("brightness", 1.0), ("contrast", 10.0), ("saturation", 1.0), ("noise", 0.2), ("blur", 0.3)],
        ),
        Preset::builtin(
            "blur_tolerance",
            "Blur Tolerance",
            "Train model to handle motion blur",
            &[("brightness", 1.0), ("contrast", 5.0), ("saturation", 1.0), ("noise", 0.05), ("blur", 2.5)],
        ),
        Preset::builtin(
            "color_variation",
            "Color Variation",
            "Handle color temperature variations",
            &[("brightness", 1.1), ("contrast", 15.0), ("saturation", 1.4), ("hue", 15.0), ("noise", 0.05)],
        ),
        Preset::builtin(
            "contrast_variation",
            "Contrast Variation",
            "Handle extreme contrast conditions",
            &[("brightness", 1.0), ("contrast", 40.0), ("saturation", 0.9), ("noise", 0.1), ("blur", 0.5)],
        ),
        Preset::builtin(
            "saturation_variation",
            "Saturation Variation",
            "Handle different color saturation levels",
            &[("brightness", 1.0), ("contrast", 10.0), ("saturation", 1.5), ("noise", 0.05), ("blur", 0.3)],
        ),
        Preset::builtin(
            "mixed_augmentation",
            "Mixed Augmentation",
            "Combination of multiple augmentations",
            &[
                ("brightness", 1.2),
                ("contrast", 20.0),
                ("saturation", 1.1),
                ("noise", 0.1),
                ("blur", 1.0),
                ("hue", 10.0),
            ],
        ),
    ]
}
