//! Static design tokens
//!
//! Fixed values the UI uses when no theme is active, plus layout
//! primitives the theme system does not control.

/// Fallback colors for the degraded no-active-theme state
///
/// These match the built-in default theme, so the storefront looks the
/// same before the first theme loads and after a failed fetch.
pub mod fallback {
    /// Primary actions and links
    pub const PRIMARY: &str = app_core::branding::colors::PRIMARY;
    /// Secondary actions
    pub const SECONDARY: &str = app_core::branding::colors::SECONDARY;
    /// Highlights and badges
    pub const ACCENT: &str = app_core::branding::colors::ACCENT;
    /// Page background
    pub const BACKGROUND: &str = app_core::branding::colors::BACKGROUND;
    /// Body text
    pub const TEXT: &str = app_core::branding::colors::TEXT;
    /// Errors and destructive actions
    pub const ERROR: &str = app_core::branding::colors::ERROR;
}

/// Responsive breakpoints in pixels
pub mod breakpoints {
    /// Small screens (phones, landscape)
    pub const SM: u32 = 640;
    /// Medium screens (tablets)
    pub const MD: u32 = 768;
    /// Large screens (small laptops)
    pub const LG: u32 = 1024;
    /// Extra large screens
    pub const XL: u32 = 1280;
    /// Very wide screens
    pub const XXL: u32 = 1536;

    /// Whether the admin sidebar is shown expanded at this width
    pub fn sidebar_expanded(width: u32) -> bool {
        width >= LG
    }

    /// Product grid column count for a viewport width
    pub fn grid_columns(width: u32) -> u32 {
        if width >= XL {
            4
        } else if width >= MD {
            3
        } else if width >= SM {
            2
        } else {
            1
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallbacks_match_default_theme() {
        let draft = theme_engine::defaults::default_theme();
        assert_eq!(draft.base_colors.get("primary").unwrap(), fallback::PRIMARY);
        assert_eq!(
            draft.base_colors.get("background").unwrap(),
            fallback::BACKGROUND
        );
        assert_eq!(draft.base_colors.get("text").unwrap(), fallback::TEXT);
    }

    #[test]
    fn test_breakpoint_ordering() {
        assert!(breakpoints::SM < breakpoints::MD);
        assert!(breakpoints::MD < breakpoints::LG);
        assert!(breakpoints::LG < breakpoints::XL);
        assert!(breakpoints::XL < breakpoints::XXL);
    }

    #[test]
    fn test_grid_columns() {
        assert_eq!(breakpoints::grid_columns(375), 1);
        assert_eq!(breakpoints::grid_columns(700), 2);
        assert_eq!(breakpoints::grid_columns(900), 3);
        assert_eq!(breakpoints::grid_columns(1400), 4);
    }
}
