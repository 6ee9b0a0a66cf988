//! Color math utilities
//!
//! Pure conversions and derivations over hex color strings: sRGB↔HSL,
//! WCAG relative luminance and contrast ratios, tonal palette derivation,
//! and hue-rotation harmony generation. Everything here is deterministic:
//! identical inputs produce bit-identical outputs.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// WCAG minimum contrast ratio for normal body text (AA)
pub const NORMAL_TEXT_MIN_RATIO: f64 = 4.5;

/// WCAG minimum contrast ratio for large text (AA)
pub const LARGE_TEXT_MIN_RATIO: f64 = 3.0;

/// WCAG minimum contrast ratio for AAA conformance
pub const AAA_MIN_RATIO: f64 = 7.0;

/// Errors from parsing or deriving colors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input is not a 3- or 6-digit hex color
    #[error("Invalid hex color: {0}")]
    InvalidHex(String),
}

/// Result type for color operations
pub type Result<T> = std::result::Result<T, ColorError>;

// =============================================================================
// Value Types
// =============================================================================

/// An sRGB color with 8-bit channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rgb {
    /// Red channel (0-255)
    pub r: u8,
    /// Green channel (0-255)
    pub g: u8,
    /// Blue channel (0-255)
    pub b: u8,
}

/// A color in HSL space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Hsl {
    /// Hue in degrees [0, 360)
    pub h: f64,
    /// Saturation [0, 1]
    pub s: f64,
    /// Lightness [0, 1]
    pub l: f64,
}

// =============================================================================
// Hex Parsing
// =============================================================================

/// Parse a hex color string to RGB channels
///
/// Accepts 3- or 6-digit forms, case-insensitive, with or without a
/// leading `#`.
pub fn parse_hex(hex: &str) -> Result<Rgb> {
    let digits = hex.trim().trim_start_matches('#');

    let expanded;
    let digits = match digits.len() {
        6 => digits,
        3 => {
            let mut s = String::with_capacity(6);
            for c in digits.chars() {
                s.push(c);
                s.push(c);
            }
            expanded = s;
            &expanded
        }
        _ => return Err(ColorError::InvalidHex(hex.to_string())),
    };

    let channel = |range: std::ops::Range<usize>| {
        u8::from_str_radix(&digits[range], 16).map_err(|_| ColorError::InvalidHex(hex.to_string()))
    };

    Ok(Rgb {
        r: channel(0..2)?,
        g: channel(2..4)?,
        b: channel(4..6)?,
    })
}

/// Convert RGB channels to an uppercase `#RRGGBB` string
pub fn to_hex(rgb: Rgb) -> String {
    format!("#{:02X}{:02X}{:02X}", rgb.r, rgb.g, rgb.b)
}

// =============================================================================
// RGB <-> HSL
// =============================================================================

/// Convert a hex color to HSL
pub fn to_hsl(hex: &str) -> Result<Hsl> {
    Ok(rgb_to_hsl(parse_hex(hex)?))
}

/// Convert RGB to HSL
pub fn rgb_to_hsl(rgb: Rgb) -> Hsl {
    let r = rgb.r as f64 / 255.0;
    let g = rgb.g as f64 / 255.0;
    let b = rgb.b as f64 / 255.0;

    let max = r.max(g).max(b);
    let min = r.min(g).min(b);
    let l = (max + min) / 2.0;

    if max == min {
        // Achromatic
        return Hsl { h: 0.0, s: 0.0, l };
    }

    let d = max - min;
    let s = if l > 0.5 {
        d / (2.0 - max - min)
    } else {
        d / (max + min)
    };

    let h = if max == r {
        (g - b) / d + if g < b { 6.0 } else { 0.0 }
    } else if max == g {
        (b - r) / d + 2.0
    } else {
        (r - g) / d + 4.0
    };

    Hsl { h: h * 60.0, s, l }
}

/// Convert HSL to RGB
pub fn hsl_to_rgb(hsl: Hsl) -> Rgb {
    let h = hsl.h.rem_euclid(360.0) / 360.0;
    let s = hsl.s.clamp(0.0, 1.0);
    let l = hsl.l.clamp(0.0, 1.0);

    if s == 0.0 {
        let v = (l * 255.0).round() as u8;
        return Rgb { r: v, g: v, b: v };
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;

    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        let v = if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 1.0 / 2.0 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        };
        (v * 255.0).round() as u8
    };

    Rgb {
        r: channel(h + 1.0 / 3.0),
        g: channel(h),
        b: channel(h - 1.0 / 3.0),
    }
}

/// Convert HSL back to an uppercase hex string
pub fn hsl_to_hex(hsl: Hsl) -> String {
    to_hex(hsl_to_rgb(hsl))
}

// =============================================================================
// Palette Derivation
// =============================================================================

/// Tonal variants derived from a single base color
///
/// Light/dark variants shift lightness by fixed deltas; alpha variants
/// keep the RGB channels and encode opacity as an `rgba(...)` string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Palette {
    /// The base color, normalized to `#RRGGBB`
    pub base: String,
    /// Lightness +15%
    pub light: String,
    /// Lightness +30%
    pub lighter: String,
    /// Lightness -15%
    pub dark: String,
    /// Lightness -30%
    pub darker: String,
    /// 10% opacity
    pub alpha10: String,
    /// 20% opacity
    pub alpha20: String,
    /// 50% opacity
    pub alpha50: String,
    /// 80% opacity
    pub alpha80: String,
}

/// Lightness delta used for the `light`/`dark` variants
const LIGHTNESS_STEP: f64 = 0.15;

fn shift_lightness(hsl: Hsl, delta: f64) -> String {
    hsl_to_hex(Hsl {
        l: (hsl.l + delta).clamp(0.0, 1.0),
        ..hsl
    })
}

fn alpha_string(rgb: Rgb, alpha: &str) -> String {
    format!("rgba({}, {}, {}, {})", rgb.r, rgb.g, rgb.b, alpha)
}

/// Derive the tonal palette for a base hex color
pub fn derive_palette(base: &str) -> Result<Palette> {
    let rgb = parse_hex(base)?;
    let hsl = rgb_to_hsl(rgb);

    Ok(Palette {
        base: to_hex(rgb),
        light: shift_lightness(hsl, LIGHTNESS_STEP),
        lighter: shift_lightness(hsl, LIGHTNESS_STEP * 2.0),
        dark: shift_lightness(hsl, -LIGHTNESS_STEP),
        darker: shift_lightness(hsl, -LIGHTNESS_STEP * 2.0),
        alpha10: alpha_string(rgb, "0.1"),
        alpha20: alpha_string(rgb, "0.2"),
        alpha50: alpha_string(rgb, "0.5"),
        alpha80: alpha_string(rgb, "0.8"),
    })
}

// =============================================================================
// Luminance & Contrast
// =============================================================================

/// WCAG relative luminance of a hex color, in [0, 1]
pub fn relative_luminance(hex: &str) -> Result<f64> {
    let rgb = parse_hex(hex)?;

    let linearize = |channel: u8| {
        let c = channel as f64 / 255.0;
        if c <= 0.03928 {
            c / 12.92
        } else {
            ((c + 0.055) / 1.055).powf(2.4)
        }
    };

    Ok(0.2126 * linearize(rgb.r) + 0.7152 * linearize(rgb.g) + 0.0722 * linearize(rgb.b))
}

/// WCAG contrast ratio between two colors, always >= 1
pub fn contrast_ratio(a: &str, b: &str) -> Result<f64> {
    let la = relative_luminance(a)?;
    let lb = relative_luminance(b)?;

    Ok((la.max(lb) + 0.05) / (la.min(lb) + 0.05))
}

/// WCAG conformance level for text contrast
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessibilityLevel {
    /// Normal body text, AA (ratio >= 4.5)
    Normal,
    /// Large text, AA (ratio >= 3)
    Large,
    /// AAA conformance (ratio >= 7)
    Aaa,
}

impl AccessibilityLevel {
    /// Minimum contrast ratio required at this level
    pub fn min_ratio(&self) -> f64 {
        match self {
            AccessibilityLevel::Normal => NORMAL_TEXT_MIN_RATIO,
            AccessibilityLevel::Large => LARGE_TEXT_MIN_RATIO,
            AccessibilityLevel::Aaa => AAA_MIN_RATIO,
        }
    }
}

/// Check whether a foreground/background pair meets the given level
///
/// Fails closed: unparseable input yields `false` rather than an error,
/// so this is safe to call from rendering paths. Callers that need the
/// parse failure should use [`contrast_report`] instead.
pub fn is_accessible(foreground: &str, background: &str, level: AccessibilityLevel) -> bool {
    contrast_ratio(foreground, background)
        .map(|ratio| ratio >= level.min_ratio())
        .unwrap_or(false)
}

/// Full contrast report for a foreground/background pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContrastReport {
    /// The computed contrast ratio
    pub ratio: f64,
    /// Passes AA for normal text
    pub normal_text: bool,
    /// Passes AA for large text
    pub large_text: bool,
    /// Passes AAA
    pub aaa: bool,
}

/// Compute a contrast report, surfacing parse failures as [`ColorError`]
pub fn contrast_report(foreground: &str, background: &str) -> Result<ContrastReport> {
    let ratio = contrast_ratio(foreground, background)?;

    Ok(ContrastReport {
        ratio,
        normal_text: ratio >= NORMAL_TEXT_MIN_RATIO,
        large_text: ratio >= LARGE_TEXT_MIN_RATIO,
        aaa: ratio >= AAA_MIN_RATIO,
    })
}

// =============================================================================
// Harmony Generation
// =============================================================================

/// Hue-rotation color harmonies derived from a base color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Harmony {
    /// Hue rotated 180 degrees
    pub complement: String,
    /// Base plus rotations of +/-120 degrees
    pub triadic: Vec<String>,
    /// Four points 90 degrees apart, starting at the base
    pub tetrad: Vec<String>,
    /// Base plus rotations of +/-30 degrees
    pub analogous: Vec<String>,
    /// Rotations of +150 and +210 degrees
    pub split_complement: Vec<String>,
}

fn spin(hsl: Hsl, degrees: f64) -> String {
    hsl_to_hex(Hsl {
        h: (hsl.h + degrees).rem_euclid(360.0),
        ..hsl
    })
}

/// Generate the standard harmonies for a base color
pub fn complementary_colors(base: &str) -> Result<Harmony> {
    let hsl = to_hsl(base)?;
    let base_hex = hsl_to_hex(hsl);

    Ok(Harmony {
        complement: spin(hsl, 180.0),
        triadic: vec![base_hex.clone(), spin(hsl, 120.0), spin(hsl, 240.0)],
        tetrad: vec![
            base_hex.clone(),
            spin(hsl, 90.0),
            spin(hsl, 180.0),
            spin(hsl, 270.0),
        ],
        analogous: vec![spin(hsl, -30.0), base_hex, spin(hsl, 30.0)],
        split_complement: vec![spin(hsl, 150.0), spin(hsl, 210.0)],
    })
}
