//! Admin theme editor form
//!
//! Builds a [`ThemeDraft`] interactively: starts from the editor's
//! default colors, applies presets, accumulates gradients, and
//! pre-validates before submission so the editor can show errors inline
//! instead of round-tripping to the repository.

use uuid::Uuid;

use theme_engine::color::{is_accessible, AccessibilityLevel};
use theme_engine::css;
use theme_engine::defaults::ColorPreset;
use theme_engine::model::{ColorTheme, Gradient, ThemeDraft};
use theme_engine::validate::{validate_draft, ValidationError};

/// Editor state for creating or editing a theme
#[derive(Debug, Clone)]
pub struct ThemeForm {
    draft: ThemeDraft,
}

impl Default for ThemeForm {
    fn default() -> Self {
        Self::new()
    }
}

impl ThemeForm {
    /// Start a fresh form with the editor's default colors
    pub fn new() -> Self {
        let draft = ThemeDraft::named("")
            .with_color("primary", "#3B82F6")
            .with_color("secondary", "#10B981")
            .with_color("accent", "#8B5CF6")
            .with_color("background", "#FFFFFF")
            .with_color("text", "#1F2937");

        ThemeForm { draft }
    }

    /// Start a form pre-filled from an existing theme
    pub fn from_theme(theme: &ColorTheme) -> Self {
        ThemeForm {
            draft: ThemeDraft {
                name: theme.name.clone(),
                description: theme.description.clone(),
                version: Some(theme.version),
                is_active: None,
                base_colors: theme.base_colors.clone(),
                gradients: theme.gradients.clone(),
                typography: theme.typography.clone(),
                shadows: theme.shadows.clone(),
                breakpoints: theme.breakpoints.clone(),
                dark_mode_values: theme.dark_mode_values.clone(),
            },
        }
    }

    /// Set the theme name
    pub fn set_name(&mut self, name: impl Into<String>) -> &mut Self {
        self.draft.name = name.into();
        self
    }

    /// Set one base color
    pub fn set_color(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.draft.base_colors.insert(key.into(), value.into());
        self
    }

    /// Apply a three-color preset over the current colors
    pub fn apply_preset(&mut self, preset: &ColorPreset) -> &mut Self {
        self.set_color("primary", preset.primary);
        self.set_color("secondary", preset.secondary);
        self.set_color("accent", preset.accent);
        self
    }

    /// Add a gradient from `(color, position)` stops, assigning an id
    pub fn add_gradient(&mut self, name: impl Into<String>, stops: Vec<(&str, f64)>) -> &mut Self {
        let gradient = Gradient::new(Uuid::new_v4().to_string(), name, stops);
        self.draft.gradients.push(gradient);
        self
    }

    /// Current draft as edited so far
    pub fn draft(&self) -> &ThemeDraft {
        &self.draft
    }

    /// Validate and return the normalized draft for submission
    pub fn submit(&self) -> Result<ThemeDraft, ValidationError> {
        validate_draft(&self.draft)
    }

    /// Generated stylesheet for the live preview pane
    ///
    /// Returns `None` while the draft is still invalid.
    pub fn preview_css(&self) -> Option<String> {
        let normalized = validate_draft(&self.draft).ok()?;

        let preview = ColorTheme {
            id: "preview".to_string(),
            name: normalized.name,
            description: normalized.description,
            version: normalized.version.unwrap_or(1),
            is_active: false,
            base_colors: normalized.base_colors,
            gradients: normalized.gradients,
            typography: normalized.typography,
            shadows: normalized.shadows,
            breakpoints: normalized.breakpoints,
            dark_mode_values: normalized.dark_mode_values,
            created_at: None,
        };

        Some(css::generate(&preview))
    }

    /// Contrast problems worth flagging in the editor
    ///
    /// Checks body text on the background and inverted text on the
    /// primary/secondary action colors against WCAG AA.
    pub fn contrast_warnings(&self) -> Vec<String> {
        let colors = &self.draft.base_colors;
        let pairs = [
            ("text", "background", "body text on background"),
            ("background", "primary", "label text on primary buttons"),
            ("background", "secondary", "label text on secondary buttons"),
        ];

        let mut warnings = Vec::new();
        for (fg_key, bg_key, what) in pairs {
            let (Some(fg), Some(bg)) = (colors.get(fg_key), colors.get(bg_key)) else {
                continue;
            };
            if !is_accessible(fg, bg, AccessibilityLevel::Normal) {
                warnings.push(format!("Low contrast for {what} ({fg} on {bg})"));
            }
        }
        warnings
    }
}
