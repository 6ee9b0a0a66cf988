//! Theme repository and activation service
//!
//! Persistence operations for [`ColorTheme`] records with the activation
//! exclusivity invariant: across all stored themes, at most one is active
//! at a time. Activation is a two-phase operation; because the record
//! store exposes no multi-statement transaction, phase-two failures are
//! compensated by re-activating the previously active theme.

use serde_json::{json, Value};
use std::sync::Arc;

use store_client::{Filter, InsertRequest, RecordStore, SelectRequest, UpdateRequest};
use theme_engine::model::{ColorTheme, ThemeDraft, ThemePatch};
use theme_engine::validate::{parse_theme, validate_draft, validate_theme, ValidationError};

/// Collection holding theme records
pub const THEME_COLLECTION: &str = "color_themes";

/// Errors from theme persistence operations
#[derive(Debug, thiserror::Error)]
pub enum ThemeServiceError {
    /// The draft or merged record failed validation; nothing was persisted
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// No theme with the given id
    #[error("Theme not found: {0}")]
    NotFound(String),

    /// The two-phase activation failed; the previous active theme is unchanged
    #[error("Activation failed: {0}")]
    Activation(String),

    /// The record store rejected the operation
    #[error("Store error: {0}")]
    Store(#[from] store_client::StoreError),

    /// A record could not be serialized for the store
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for theme service operations
pub type Result<T> = std::result::Result<T, ThemeServiceError>;

/// Theme repository over the hosted record store
pub struct ThemeService {
    store: Arc<dyn RecordStore>,
}

impl ThemeService {
    /// Create a new theme service
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        ThemeService { store }
    }

    /// List all themes, newest first
    ///
    /// Every row crosses the parse-and-validate boundary; rows that fail
    /// it are skipped with a warning rather than failing the listing.
    pub async fn list(&self) -> Result<Vec<ColorTheme>> {
        let rows = self
            .store
            .select(SelectRequest::from(THEME_COLLECTION).order_desc("created_at"))
            .await?;

        let mut themes = Vec::with_capacity(rows.len());
        for row in rows {
            match parse_theme(row) {
                Ok(theme) => themes.push(theme),
                Err(e) => tracing::warn!(error = %e, "Skipping malformed theme record"),
            }
        }

        Ok(themes)
    }

    /// Fetch a single theme by id
    pub async fn get(&self, id: &str) -> Result<ColorTheme> {
        let rows = self
            .store
            .select(
                SelectRequest::from(THEME_COLLECTION)
                    .filter(Filter::eq("id", id))
                    .limit(1),
            )
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ThemeServiceError::NotFound(id.to_string()))?;

        Ok(parse_theme(row)?)
    }

    /// Currently active theme, if any
    pub async fn active(&self) -> Result<Option<ColorTheme>> {
        let rows = self
            .store
            .select(
                SelectRequest::from(THEME_COLLECTION)
                    .filter(Filter::eq("is_active", true))
                    .limit(1),
            )
            .await?;

        match rows.into_iter().next() {
            Some(row) => Ok(Some(parse_theme(row)?)),
            None => Ok(None),
        }
    }

    /// Validate and persist a new theme
    ///
    /// The first theme ever created is activated automatically so the
    /// storefront never runs without an active theme. Later themes are
    /// created inactive unless the draft explicitly asks otherwise, in
    /// which case they go through the regular activation path.
    pub async fn create(&self, draft: &ThemeDraft) -> Result<ColorTheme> {
        let normalized = validate_draft(draft)?;

        let is_first = self
            .store
            .select(SelectRequest::from(THEME_COLLECTION).limit(1))
            .await?
            .is_empty();

        let explicitly_active = normalized.is_active == Some(true);

        let mut record = serde_json::to_value(&normalized)?;
        record["is_active"] = Value::Bool(is_first);

        let row = self
            .store
            .insert(InsertRequest::new(THEME_COLLECTION, record))
            .await?;
        let theme = parse_theme(row)?;

        tracing::info!(theme_id = %theme.id, name = %theme.name, "Theme created");

        if explicitly_active && !is_first {
            return self.activate(&theme.id).await;
        }

        Ok(theme)
    }

    /// Merge a partial update into an existing theme
    ///
    /// Provided keys overwrite, absent keys are retained. The merged
    /// record is validated before anything is written.
    pub async fn update(&self, id: &str, patch: &ThemePatch) -> Result<ColorTheme> {
        let current = self.get(id).await?;
        let merged = patch.apply_to(&current);
        validate_theme(&merged)?;

        let changes = serde_json::to_value(patch)?;
        let rows = self
            .store
            .update(UpdateRequest::new(THEME_COLLECTION, changes).filter(Filter::eq("id", id)))
            .await?;

        let row = rows
            .into_iter()
            .next()
            .ok_or_else(|| ThemeServiceError::NotFound(id.to_string()))?;
        let theme = parse_theme(row)?;

        tracing::info!(theme_id = %theme.id, "Theme updated");
        Ok(theme)
    }

    /// Make the given theme the single active one
    ///
    /// Two-phase: first deactivate every other theme, then activate the
    /// target. A phase-one failure aborts with the previous active theme
    /// untouched. A phase-two failure rolls the previous active theme
    /// back before surfacing the error, so readers never observe a state
    /// without exactly one active theme for longer than the failed call.
    pub async fn activate(&self, id: &str) -> Result<ColorTheme> {
        let previous_id = match self.active().await? {
            Some(theme) if theme.id == id => return Ok(theme),
            Some(theme) => Some(theme.id),
            None => None,
        };

        // Phase 1: deactivate all other themes
        self.store
            .update(
                UpdateRequest::new(THEME_COLLECTION, json!({ "is_active": false }))
                    .filter(Filter::neq("id", id)),
            )
            .await
            .map_err(|e| ThemeServiceError::Activation(format!("deactivation failed: {e}")))?;

        // Phase 2: activate the target
        let rows = match self
            .store
            .update(
                UpdateRequest::new(THEME_COLLECTION, json!({ "is_active": true }))
                    .filter(Filter::eq("id", id)),
            )
            .await
        {
            Ok(rows) => rows,
            Err(e) => {
                self.restore_active(previous_id.as_deref()).await;
                return Err(ThemeServiceError::Activation(format!(
                    "activation failed: {e}"
                )));
            }
        };

        let Some(row) = rows.into_iter().next() else {
            // Target id does not exist; put the previous theme back
            self.restore_active(previous_id.as_deref()).await;
            return Err(ThemeServiceError::NotFound(id.to_string()));
        };

        let theme = parse_theme(row)?;
        tracing::info!(theme_id = %theme.id, name = %theme.name, "Theme activated");
        Ok(theme)
    }

    /// Compensating rollback for a failed phase-two activation
    async fn restore_active(&self, previous_id: Option<&str>) {
        let Some(previous_id) = previous_id else {
            return;
        };

        match self
            .store
            .update(
                UpdateRequest::new(THEME_COLLECTION, json!({ "is_active": true }))
                    .filter(Filter::eq("id", previous_id)),
            )
            .await
        {
            Ok(_) => {
                tracing::warn!(theme_id = previous_id, "Restored previous active theme after failed activation")
            }
            Err(e) => {
                tracing::error!(theme_id = previous_id, error = %e, "Failed to restore previous active theme")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;
    use store_client::test_utils::Op;
    use store_client::{MemoryStore, StoreError};

    fn draft(name: &str) -> ThemeDraft {
        ThemeDraft {
            name: name.to_string(),
            base_colors: BTreeMap::from(
                [
                    ("primary", "#3B82F6"),
                    ("secondary", "#10B981"),
                    ("accent", "#8B5CF6"),
                    ("background", "#FFFFFF"),
                    ("text", "#1F2937"),
                ]
                .map(|(k, v)| (k.to_string(), v.to_string())),
            ),
            ..Default::default()
        }
    }

    fn service() -> (Arc<MemoryStore>, ThemeService) {
        let store = Arc::new(MemoryStore::new());
        let service = ThemeService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_first_theme_auto_activates() {
        let (_store, service) = service();

        let theme = service.create(&draft("First")).await.unwrap();
        assert!(theme.is_active);
        assert_eq!(theme.version, 1);
    }

    #[tokio::test]
    async fn test_later_themes_created_inactive() {
        let (_store, service) = service();

        service.create(&draft("First")).await.unwrap();
        let second = service.create(&draft("Second")).await.unwrap();

        assert!(!second.is_active);
    }

    #[tokio::test]
    async fn test_create_explicitly_active_keeps_exclusivity() {
        let (_store, service) = service();

        let first = service.create(&draft("First")).await.unwrap();

        let mut wants_active = draft("Second");
        wants_active.is_active = Some(true);
        let second = service.create(&wants_active).await.unwrap();

        assert!(second.is_active);
        let refreshed = service.get(&first.id).await.unwrap();
        assert!(!refreshed.is_active);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_draft() {
        let (store, service) = service();

        let mut bad = draft("Broken");
        bad.base_colors.remove("background");

        let err = service.create(&bad).await.unwrap_err();
        assert!(matches!(err, ThemeServiceError::Validation(_)));
        // Nothing persisted on validation failure
        assert_eq!(store.count(THEME_COLLECTION), 0);
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let (_store, service) = service();

        service.create(&draft("First")).await.unwrap();
        service.create(&draft("Second")).await.unwrap();
        service.create(&draft("Third")).await.unwrap();

        let themes = service.list().await.unwrap();
        assert_eq!(themes.len(), 3);
        assert_eq!(themes[0].name, "Third");
        assert_eq!(themes[2].name, "First");
    }

    #[tokio::test]
    async fn test_list_skips_malformed_rows() {
        let (store, service) = service();

        service.create(&draft("Good")).await.unwrap();
        store.seed(THEME_COLLECTION, vec![json!({ "id": "junk" })]);

        let themes = service.list().await.unwrap();
        assert_eq!(themes.len(), 1);
        assert_eq!(themes[0].name, "Good");
    }

    #[tokio::test]
    async fn test_update_merges_partial_changes() {
        let (_store, service) = service();

        let theme = service.create(&draft("Original")).await.unwrap();

        let patch = ThemePatch {
            name: Some("Renamed".to_string()),
            ..Default::default()
        };
        let updated = service.update(&theme.id, &patch).await.unwrap();

        assert_eq!(updated.name, "Renamed");
        assert_eq!(updated.base_colors, theme.base_colors);
    }

    #[tokio::test]
    async fn test_update_validates_merged_record() {
        let (_store, service) = service();

        let theme = service.create(&draft("Original")).await.unwrap();

        let mut colors = theme.base_colors.clone();
        colors.insert("primary".to_string(), "not-a-color".to_string());
        let patch = ThemePatch {
            base_colors: Some(colors),
            ..Default::default()
        };

        let err = service.update(&theme.id, &patch).await.unwrap_err();
        assert!(matches!(err, ThemeServiceError::Validation(_)));

        // Original record unchanged
        let refreshed = service.get(&theme.id).await.unwrap();
        assert_eq!(refreshed.color("primary"), Some("#3B82F6"));
    }

    #[tokio::test]
    async fn test_activate_switches_single_active_flag() {
        let (_store, service) = service();

        let a = service.create(&draft("A")).await.unwrap();
        let b = service.create(&draft("B")).await.unwrap();
        assert!(a.is_active);
        assert!(!b.is_active);

        let activated = service.activate(&b.id).await.unwrap();
        assert!(activated.is_active);

        let themes = service.list().await.unwrap();
        let active: Vec<_> = themes.iter().filter(|t| t.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, b.id);
    }

    #[tokio::test]
    async fn test_activate_is_idempotent_for_active_theme() {
        let (_store, service) = service();

        let a = service.create(&draft("A")).await.unwrap();
        let again = service.activate(&a.id).await.unwrap();

        assert!(again.is_active);
        let themes = service.list().await.unwrap();
        assert_eq!(themes.iter().filter(|t| t.is_active).count(), 1);
    }

    #[tokio::test]
    async fn test_activate_unknown_id_restores_previous() {
        let (_store, service) = service();

        let a = service.create(&draft("A")).await.unwrap();

        let err = service.activate("999").await.unwrap_err();
        assert!(matches!(err, ThemeServiceError::NotFound(_)));

        // Previous active theme restored after the aborted activation
        let refreshed = service.get(&a.id).await.unwrap();
        assert!(refreshed.is_active);
    }

    #[tokio::test]
    async fn test_phase_one_failure_aborts_activation() {
        let (store, service) = service();

        let a = service.create(&draft("A")).await.unwrap();
        let b = service.create(&draft("B")).await.unwrap();

        // First update in activate() is phase 1
        store.fail_next(Op::Update, StoreError::new(503, "unavailable", "down"));

        let err = service.activate(&b.id).await.unwrap_err();
        assert!(matches!(err, ThemeServiceError::Activation(_)));

        let refreshed_a = service.get(&a.id).await.unwrap();
        let refreshed_b = service.get(&b.id).await.unwrap();
        assert!(refreshed_a.is_active);
        assert!(!refreshed_b.is_active);
    }

    #[tokio::test]
    async fn test_phase_two_failure_rolls_back_previous_active() {
        let (store, service) = service();

        let a = service.create(&draft("A")).await.unwrap();
        let b = service.create(&draft("B")).await.unwrap();

        // Phase 1 succeeds, phase 2 fails
        store.fail_nth(Op::Update, 1, StoreError::new(503, "unavailable", "down"));

        let err = service.activate(&b.id).await.unwrap_err();
        assert!(matches!(err, ThemeServiceError::Activation(_)));

        // Compensating rollback restored A as the single active theme
        let themes = service.list().await.unwrap();
        let active: Vec<_> = themes.iter().filter(|t| t.is_active).collect();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, a.id);
        assert!(!themes.iter().any(|t| t.id == b.id && t.is_active));
    }

    #[tokio::test]
    async fn test_active_lookup() {
        let (_store, service) = service();

        assert!(service.active().await.unwrap().is_none());

        let a = service.create(&draft("A")).await.unwrap();
        let active = service.active().await.unwrap().unwrap();
        assert_eq!(active.id, a.id);
    }
}
