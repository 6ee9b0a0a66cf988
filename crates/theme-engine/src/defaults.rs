//! Built-in default theme and color presets
//!
//! The default theme is what the runtime context creates and activates
//! when the store holds no themes at all, so the storefront never renders
//! unthemed. Presets seed the admin theme editor.

use std::collections::BTreeMap;

use crate::model::{Gradient, ThemeDraft, TypeSet, Typography};

/// Name given to the bootstrap theme
pub const DEFAULT_THEME_NAME: &str = "Default Theme";

/// Build the hard-coded default theme draft
pub fn default_theme() -> ThemeDraft {
    ThemeDraft {
        name: DEFAULT_THEME_NAME.to_string(),
        description: Some("Built-in storefront theme".to_string()),
        version: Some(1),
        is_active: None,
        base_colors: BTreeMap::from(
            [
                ("primary", "#3B82F6"),
                ("secondary", "#10B981"),
                ("accent", "#8B5CF6"),
                ("background", "#FFFFFF"),
                ("text", "#1F2937"),
                ("primary-light", "#60A5FA"),
                ("primary-dark", "#2563EB"),
                ("secondary-light", "#34D399"),
                ("secondary-dark", "#059669"),
                ("accent-light", "#A78BFA"),
                ("accent-dark", "#7C3AED"),
                ("background-alt", "#F3F4F6"),
                ("text-light", "#6B7280"),
                ("text-dark", "#111827"),
                ("success", "#10B981"),
                ("warning", "#F59E0B"),
                ("error", "#EF4444"),
                ("info", "#3B82F6"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        ),
        gradients: vec![
            Gradient::new(
                "primary",
                "Primary Gradient",
                vec![("#3B82F6", 0.0), ("#2563EB", 100.0)],
            ),
            Gradient::new(
                "secondary",
                "Secondary Gradient",
                vec![("#10B981", 0.0), ("#059669", 100.0)],
            ),
        ],
        typography: Some(Typography {
            headings: TypeSet {
                font_family: "Inter, system-ui, sans-serif".to_string(),
                weights: vec![500, 600, 700],
                sizes: BTreeMap::from(
                    [
                        ("h1", "2.5rem"),
                        ("h2", "2rem"),
                        ("h3", "1.75rem"),
                        ("h4", "1.5rem"),
                        ("h5", "1.25rem"),
                        ("h6", "1rem"),
                    ]
                    .map(|(k, v)| (k.to_string(), v.to_string())),
                ),
            },
            body: TypeSet {
                font_family: "Inter, system-ui, sans-serif".to_string(),
                weights: vec![400, 500],
                sizes: BTreeMap::from(
                    [("base", "1rem"), ("sm", "0.875rem"), ("lg", "1.125rem")]
                        .map(|(k, v)| (k.to_string(), v.to_string())),
                ),
            },
        }),
        shadows: Some(BTreeMap::from(
            [
                ("sm", "0 1px 2px 0 rgb(0 0 0 / 0.05)"),
                ("md", "0 4px 6px -1px rgb(0 0 0 / 0.1)"),
                ("lg", "0 10px 15px -3px rgb(0 0 0 / 0.1)"),
                ("xl", "0 20px 25px -5px rgb(0 0 0 / 0.1)"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        )),
        breakpoints: Some(BTreeMap::from(
            [
                ("sm", "640px"),
                ("md", "768px"),
                ("lg", "1024px"),
                ("xl", "1280px"),
                ("2xl", "1536px"),
            ]
            .map(|(k, v)| (k.to_string(), v.to_string())),
        )),
        dark_mode_values: None,
    }
}

/// A three-color seed for the theme editor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorPreset {
    /// Preset name shown in the editor
    pub name: &'static str,
    /// Primary color
    pub primary: &'static str,
    /// Secondary color
    pub secondary: &'static str,
    /// Accent color
    pub accent: &'static str,
}

/// Color presets offered by the theme editor
pub const COLOR_PRESETS: [ColorPreset; 3] = [
    ColorPreset {
        name: "blue",
        primary: "#3B82F6",
        secondary: "#10B981",
        accent: "#8B5CF6",
    },
    ColorPreset {
        name: "green",
        primary: "#10B981",
        secondary: "#3B82F6",
        accent: "#F59E0B",
    },
    ColorPreset {
        name: "purple",
        primary: "#8B5CF6",
        secondary: "#EC4899",
        accent: "#3B82F6",
    },
];

/// Look up a preset by name
pub fn preset(name: &str) -> Option<&'static ColorPreset> {
    COLOR_PRESETS.iter().find(|p| p.name == name)
}
