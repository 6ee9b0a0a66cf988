//! CSS custom-property generation
//!
//! Serializes a validated [`ColorTheme`] into a stylesheet of CSS
//! variables. Generation is deterministic and idempotent: the same theme
//! always yields a byte-identical string, so callers can diff outputs for
//! cheap change detection before re-injecting into the document.

use crate::color::{derive_palette, parse_hex};
use crate::model::ColorTheme;

/// Generate the `--color-*` variable group for one base color entry
///
/// Derived variants come from the palette utility, never from storage.
/// Values that fail to parse (possible for non-required extra keys) emit
/// only the verbatim base variable.
fn push_color_group(css: &mut String, indent: &str, key: &str, value: &str) {
    css.push_str(&format!("{indent}--color-{key}: {value};\n"));

    if let (Ok(rgb), Ok(palette)) = (parse_hex(value), derive_palette(value)) {
        css.push_str(&format!("{indent}--color-{key}-light: {};\n", palette.light));
        css.push_str(&format!("{indent}--color-{key}-dark: {};\n", palette.dark));
        css.push_str(&format!(
            "{indent}--color-{key}-rgb: {}, {}, {};\n",
            rgb.r, rgb.g, rgb.b
        ));
    }
}

/// Generate the stylesheet for a validated theme
pub fn generate(theme: &ColorTheme) -> String {
    let mut css = String::from(":root {\n");

    // Base colors with derived variants
    for (key, value) in &theme.base_colors {
        push_color_group(&mut css, "  ", key, value);
    }

    // Typography
    if let Some(typography) = &theme.typography {
        css.push_str(&format!(
            "  --font-family-headings: {};\n",
            typography.headings.font_family
        ));
        css.push_str(&format!(
            "  --font-family-body: {};\n",
            typography.body.font_family
        ));

        for (key, value) in &typography.headings.sizes {
            css.push_str(&format!("  --font-size-{key}: {value};\n"));
        }
        for (key, value) in &typography.body.sizes {
            css.push_str(&format!("  --font-size-{key}: {value};\n"));
        }
    }

    // Shadows
    if let Some(shadows) = &theme.shadows {
        for (key, value) in shadows {
            css.push_str(&format!("  --shadow-{key}: {value};\n"));
        }
    }

    css.push_str("}\n");

    // Dark mode overrides
    if let Some(dark_values) = &theme.dark_mode_values {
        css.push_str("@media (prefers-color-scheme: dark) {\n  :root {\n");
        for (key, value) in dark_values {
            css.push_str(&format!("    --color-{key}: {value};\n"));
            if let Ok(rgb) = parse_hex(value) {
                css.push_str(&format!(
                    "    --color-{key}-rgb: {}, {}, {};\n",
                    rgb.r, rgb.g, rgb.b
                ));
            }
        }
        css.push_str("  }\n}\n");
    }

    css
}
