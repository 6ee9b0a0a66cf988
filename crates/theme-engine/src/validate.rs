//! Theme validation
//!
//! Pure, synchronous schema enforcement for theme records. Validation
//! never touches the repository; it is applied both to editor drafts and
//! to every record crossing the persistence boundary, so nothing
//! duck-typed ever reaches the rest of the engine.

use regex::Regex;
use std::sync::OnceLock;
use thiserror::Error;

use crate::model::{ColorTheme, ThemeDraft, REQUIRED_BASE_COLORS};

/// Errors produced by theme validation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// Theme name is empty
    #[error("Theme name is required")]
    EmptyName,

    /// A required base color is missing
    #[error("Missing required base color: {0}")]
    MissingBaseColor(String),

    /// A color value is not a valid hex string
    #[error("Invalid hex color for {field}: {value}")]
    InvalidColor {
        /// Which field carried the bad value
        field: String,
        /// The offending value
        value: String,
    },

    /// A gradient has fewer than two stops
    #[error("Gradient {0} must have at least 2 stops")]
    TooFewStops(String),

    /// A gradient stop position is outside [0, 100]
    #[error("Gradient {gradient} stop position {position} is outside 0-100")]
    StopOutOfRange {
        /// Which gradient
        gradient: String,
        /// The offending position
        position: f64,
    },

    /// A record from the store could not be deserialized at all
    #[error("Malformed theme record: {0}")]
    Malformed(String),
}

/// Result type for validation
pub type Result<T> = std::result::Result<T, ValidationError>;

/// Check a string against the hex color pattern `#RGB` / `#RRGGBB`
pub fn is_valid_hex(value: &str) -> bool {
    static HEX_COLOR: OnceLock<Regex> = OnceLock::new();

    HEX_COLOR
        .get_or_init(|| Regex::new(r"^#([0-9A-Fa-f]{3}|[0-9A-Fa-f]{6})$").unwrap())
        .is_match(value)
}

fn check_gradients(gradients: &[crate::model::Gradient]) -> Result<()> {
    for gradient in gradients {
        if gradient.stops.len() < 2 {
            return Err(ValidationError::TooFewStops(gradient.name.clone()));
        }
        for stop in &gradient.stops {
            if !(0.0..=100.0).contains(&stop.position) {
                return Err(ValidationError::StopOutOfRange {
                    gradient: gradient.name.clone(),
                    position: stop.position,
                });
            }
            if !is_valid_hex(&stop.color) {
                return Err(ValidationError::InvalidColor {
                    field: format!("gradient {}", gradient.name),
                    value: stop.color.clone(),
                });
            }
        }
    }
    Ok(())
}

fn check_base_colors(base_colors: &std::collections::BTreeMap<String, String>) -> Result<()> {
    for key in REQUIRED_BASE_COLORS {
        match base_colors.get(key) {
            None => return Err(ValidationError::MissingBaseColor(key.to_string())),
            Some(value) if !is_valid_hex(value) => {
                return Err(ValidationError::InvalidColor {
                    field: key.to_string(),
                    value: value.clone(),
                })
            }
            Some(_) => {}
        }
    }
    Ok(())
}

/// Validate a draft and return it normalized
///
/// Normalization applies defaults: `version` becomes 1 and `is_active`
/// becomes false when absent.
pub fn validate_draft(draft: &ThemeDraft) -> Result<ThemeDraft> {
    if draft.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    check_base_colors(&draft.base_colors)?;
    check_gradients(&draft.gradients)?;

    let mut normalized = draft.clone();
    normalized.version = Some(draft.version.unwrap_or(1));
    normalized.is_active = Some(draft.is_active.unwrap_or(false));

    Ok(normalized)
}

/// Validate an already-persisted theme record
///
/// Used after merge-updates and on every row returned by the store.
pub fn validate_theme(theme: &ColorTheme) -> Result<()> {
    if theme.name.trim().is_empty() {
        return Err(ValidationError::EmptyName);
    }

    check_base_colors(&theme.base_colors)?;
    check_gradients(&theme.gradients)
}

/// Parse-and-validate boundary for records crossing from the store
///
/// Every row coming back from the persistence layer goes through here,
/// producing a typed theme or a [`ValidationError`], never a
/// half-trusted blob.
pub fn parse_theme(value: serde_json::Value) -> Result<ColorTheme> {
    let theme: ColorTheme =
        serde_json::from_value(value).map_err(|e| ValidationError::Malformed(e.to_string()))?;

    validate_theme(&theme)?;
    Ok(theme)
}
