//! Theme record types
//!
//! [`ColorTheme`] is the root entity of the theme system: a named,
//! versioned bundle of colors, gradients, and optional style metadata.
//! Drafts (no id yet) and patches (partial merge updates) are separate
//! types so the persistence boundary stays strict.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Base color keys every theme must define
pub const REQUIRED_BASE_COLORS: [&str; 5] =
    ["primary", "secondary", "accent", "background", "text"];

fn default_version() -> u32 {
    1
}

/// A stop within a gradient
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientStop {
    /// Stop color as a hex string
    pub color: String,
    /// Position along the gradient, 0-100 inclusive
    pub position: f64,
}

/// A named gradient with at least two stops
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Gradient {
    /// Gradient identifier (unique within the theme)
    pub id: String,
    /// Display name
    pub name: String,
    /// Ordered stops, minimum length 2
    pub stops: Vec<GradientStop>,
}

impl Gradient {
    /// Create a gradient from `(color, position)` pairs
    pub fn new(id: impl Into<String>, name: impl Into<String>, stops: Vec<(&str, f64)>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            stops: stops
                .into_iter()
                .map(|(color, position)| GradientStop {
                    color: color.to_string(),
                    position,
                })
                .collect(),
        }
    }
}

/// Font settings for one text role (headings or body)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeSet {
    /// CSS font-family stack
    pub font_family: String,
    /// Available font weights
    #[serde(default)]
    pub weights: Vec<u16>,
    /// Named sizes (e.g. `h1`, `base`, `sm`) to CSS lengths
    #[serde(default)]
    pub sizes: BTreeMap<String, String>,
}

/// Typography metadata, opaque to the color logic
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Typography {
    /// Heading font settings
    pub headings: TypeSet,
    /// Body font settings
    pub body: TypeSet,
}

/// A persisted color theme
///
/// Invariant (enforced by the activation service, not this type): across
/// all stored themes, at most one has `is_active = true`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorTheme {
    /// Store-assigned identifier
    pub id: String,
    /// Display name, non-empty
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema version, defaults to 1
    #[serde(default = "default_version")]
    pub version: u32,
    /// Whether this theme is the active one
    #[serde(default)]
    pub is_active: bool,
    /// Semantic color key to hex value; required keys in
    /// [`REQUIRED_BASE_COLORS`], arbitrary derived keys allowed
    pub base_colors: BTreeMap<String, String>,
    /// Gradient definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gradients: Vec<Gradient>,
    /// Typography metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    /// Named shadow definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<BTreeMap<String, String>>,
    /// Named responsive breakpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<BTreeMap<String, String>>,
    /// Color overrides applied under a dark-mode media condition
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode_values: Option<BTreeMap<String, String>>,
    /// Creation timestamp, used for newest-first ordering
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl ColorTheme {
    /// Look up a base color by semantic key
    pub fn color(&self, key: &str) -> Option<&str> {
        self.base_colors.get(key).map(String::as_str)
    }
}

/// A theme being created, without the store-assigned fields
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemeDraft {
    /// Display name, non-empty
    pub name: String,
    /// Optional description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Schema version; normalized to 1 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Whether the theme should be created active; normalized to false
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    /// Semantic color key to hex value
    pub base_colors: BTreeMap<String, String>,
    /// Gradient definitions
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub gradients: Vec<Gradient>,
    /// Typography metadata
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    /// Named shadow definitions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<BTreeMap<String, String>>,
    /// Named responsive breakpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<BTreeMap<String, String>>,
    /// Dark-mode color overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode_values: Option<BTreeMap<String, String>>,
}

impl ThemeDraft {
    /// Create an empty draft with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set a base color, returning the draft for chaining
    pub fn with_color(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.base_colors.insert(key.into(), value.into());
        self
    }
}

/// A partial update; provided fields overwrite, absent fields are kept
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThemePatch {
    /// New display name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// New description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// New version
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    /// Replacement base color map
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_colors: Option<BTreeMap<String, String>>,
    /// Replacement gradient list
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gradients: Option<Vec<Gradient>>,
    /// Replacement typography
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub typography: Option<Typography>,
    /// Replacement shadows
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shadows: Option<BTreeMap<String, String>>,
    /// Replacement breakpoints
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub breakpoints: Option<BTreeMap<String, String>>,
    /// Replacement dark-mode overrides
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode_values: Option<BTreeMap<String, String>>,
}

impl ThemePatch {
    /// Merge this patch over an existing theme, yielding the updated record
    pub fn apply_to(&self, theme: &ColorTheme) -> ColorTheme {
        ColorTheme {
            id: theme.id.clone(),
            name: self.name.clone().unwrap_or_else(|| theme.name.clone()),
            description: self.description.clone().or_else(|| theme.description.clone()),
            version: self.version.unwrap_or(theme.version),
            is_active: theme.is_active,
            base_colors: self
                .base_colors
                .clone()
                .unwrap_or_else(|| theme.base_colors.clone()),
            gradients: self.gradients.clone().unwrap_or_else(|| theme.gradients.clone()),
            typography: self.typography.clone().or_else(|| theme.typography.clone()),
            shadows: self.shadows.clone().or_else(|| theme.shadows.clone()),
            breakpoints: self.breakpoints.clone().or_else(|| theme.breakpoints.clone()),
            dark_mode_values: self
                .dark_mode_values
                .clone()
                .or_else(|| theme.dark_mode_values.clone()),
            created_at: theme.created_at,
        }
    }

    /// True when the patch carries no changes
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}
