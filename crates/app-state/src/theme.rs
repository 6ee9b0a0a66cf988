//! Theme runtime context
//!
//! Session-lifetime state for the active theme: which theme is current,
//! the full theme list for the admin console, and the single style
//! injection point the generated CSS is written to. The context is
//! created at session start, initialized once, and torn down with the
//! session. Consumers receive it by reference.
//!
//! Lifecycle: `Uninitialized -> Loading -> Ready`, then `Ready -> Ready`
//! on every mutating call. There is no terminal state.

use std::sync::Arc;
use tokio::sync::RwLock;

use app_core::themes::{ThemeService, ThemeServiceError};
use theme_engine::css;
use theme_engine::defaults::default_theme;
use theme_engine::model::{ColorTheme, ThemeDraft, ThemePatch};
use theme_engine::validate::ValidationError;

/// Errors surfaced to theme context consumers
#[derive(Debug, thiserror::Error)]
pub enum ThemeContextError {
    /// The submitted theme failed validation; nothing was persisted
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// Activation failed; the previously active theme is unchanged
    #[error("Activation failed: {0}")]
    Activation(String),

    /// Listing themes failed; prior state is retained
    #[error("Fetch failed: {0}")]
    Fetch(String),
}

impl ThemeContextError {
    fn fetch(e: ThemeServiceError) -> Self {
        match e {
            ThemeServiceError::Validation(v) => ThemeContextError::Validation(v),
            other => ThemeContextError::Fetch(other.to_string()),
        }
    }

    fn activation(e: ThemeServiceError) -> Self {
        match e {
            ThemeServiceError::Validation(v) => ThemeContextError::Validation(v),
            other => ThemeContextError::Activation(other.to_string()),
        }
    }
}

/// Result type for theme context operations
pub type Result<T> = std::result::Result<T, ThemeContextError>;

/// Lifecycle phase of the context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextPhase {
    /// Created but not yet initialized
    Uninitialized,
    /// Initial fetch in flight
    Loading,
    /// Serving a theme list (possibly stale after a failed refresh)
    Ready,
}

/// The session's single style injection point
///
/// Exactly one target exists per session. `apply` replaces any prior
/// injection (create-if-absent, else replace-content semantics).
pub trait StyleTarget: Send + Sync {
    /// Replace the injected stylesheet with `css`
    fn apply(&self, css: &str);
}

#[derive(Debug)]
struct ContextState {
    phase: ContextPhase,
    loading: bool,
    themes: Vec<ColorTheme>,
    current: Option<ColorTheme>,
    injected_css: Option<String>,
}

impl ContextState {
    fn new() -> Self {
        Self {
            phase: ContextPhase::Uninitialized,
            loading: false,
            themes: Vec::new(),
            current: None,
            injected_css: None,
        }
    }
}

/// Session-scoped theme state and style injection driver
pub struct ThemeContext {
    service: ThemeService,
    target: Arc<dyn StyleTarget>,
    state: RwLock<ContextState>,
}

impl ThemeContext {
    /// Create a context over a theme service and the session's injection
    /// point. Call [`ThemeContext::initialize`] before reading state.
    pub fn new(service: ThemeService, target: Arc<dyn StyleTarget>) -> Self {
        ThemeContext {
            service,
            target,
            state: RwLock::new(ContextState::new()),
        }
    }

    /// Load the theme list and select the active theme
    ///
    /// An empty store is seeded with the built-in default theme (created
    /// and auto-activated) so the UI never renders unthemed. A list with
    /// no active entry is an accepted degraded state: `current_theme`
    /// stays `None` and consumers fall back to static colors.
    pub async fn initialize(&self) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.phase = ContextPhase::Loading;
            state.loading = true;
        }

        let themes = match self.service.list().await {
            Ok(themes) => themes,
            Err(e) => {
                self.state.write().await.loading = false;
                return Err(ThemeContextError::fetch(e));
            }
        };

        let themes = if themes.is_empty() {
            self.service
                .create(&default_theme())
                .await
                .map_err(ThemeContextError::fetch)?;
            self.service.list().await.map_err(ThemeContextError::fetch)?
        } else {
            themes
        };

        let current = themes.iter().find(|t| t.is_active).cloned();
        if current.is_none() {
            tracing::warn!("No active theme found; storefront falls back to static defaults");
        }

        self.commit(themes, current).await;
        Ok(())
    }

    /// Activate a theme and refresh the context
    ///
    /// Consumers observe the new list and new current theme together:
    /// the state is committed once, after both the activation and the
    /// re-fetch have completed.
    pub async fn set_theme(&self, id: &str) -> Result<ColorTheme> {
        let activated = self
            .service
            .activate(id)
            .await
            .map_err(ThemeContextError::activation)?;

        let themes = self.service.list().await.map_err(ThemeContextError::fetch)?;
        let current = themes
            .iter()
            .find(|t| t.is_active)
            .cloned()
            .or_else(|| Some(activated.clone()));

        self.commit(themes, current).await;
        Ok(activated)
    }

    /// Create a theme and refresh the context
    pub async fn create_theme(&self, draft: &ThemeDraft) -> Result<ColorTheme> {
        let created = self
            .service
            .create(draft)
            .await
            .map_err(ThemeContextError::fetch)?;

        self.refresh().await?;
        Ok(created)
    }

    /// Update a theme and refresh the context
    ///
    /// If the updated theme is the active one, the stylesheet is
    /// regenerated and re-injected.
    pub async fn update_theme(&self, id: &str, patch: &ThemePatch) -> Result<ColorTheme> {
        let updated = self
            .service
            .update(id, patch)
            .await
            .map_err(ThemeContextError::fetch)?;

        self.refresh().await?;
        Ok(updated)
    }

    /// Re-fetch the theme list and re-select the active theme
    pub async fn refresh(&self) -> Result<()> {
        let themes = self.service.list().await.map_err(ThemeContextError::fetch)?;
        let current = themes.iter().find(|t| t.is_active).cloned();
        self.commit(themes, current).await;
        Ok(())
    }

    /// Commit a new snapshot and re-inject CSS when it changed
    ///
    /// Generation is idempotent, so a byte-compare against the last
    /// injected stylesheet suffices as change detection.
    async fn commit(&self, themes: Vec<ColorTheme>, current: Option<ColorTheme>) {
        let to_inject = {
            let mut state = self.state.write().await;
            state.themes = themes;
            state.current = current;
            state.phase = ContextPhase::Ready;
            state.loading = false;

            match &state.current {
                Some(theme) => {
                    let generated = css::generate(theme);
                    if state.injected_css.as_deref() == Some(generated.as_str()) {
                        None
                    } else {
                        state.injected_css = Some(generated.clone());
                        Some(generated)
                    }
                }
                None => None,
            }
        };

        if let Some(stylesheet) = to_inject {
            self.target.apply(&stylesheet);
        }
    }

    /// The currently active theme, if any
    pub async fn current_theme(&self) -> Option<ColorTheme> {
        self.state.read().await.current.clone()
    }

    /// All known themes, newest first
    pub async fn themes(&self) -> Vec<ColorTheme> {
        self.state.read().await.themes.clone()
    }

    /// Whether an initial fetch is in flight
    pub async fn loading(&self) -> bool {
        self.state.read().await.loading
    }

    /// Current lifecycle phase
    pub async fn phase(&self) -> ContextPhase {
        self.state.read().await.phase
    }
}
