//! Stylesheet injection point
//!
//! The document analogue of a `<style id="theme-styles">` element:
//! created on first apply, replaced in full on every later apply.
//! Exactly one instance exists per session; the theme runtime context
//! owns the only reference that writes to it.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use app_state::theme::StyleTarget;

/// The session's single injected stylesheet
#[derive(Debug, Default)]
pub struct InjectedStylesheet {
    content: Mutex<Option<String>>,
    replacements: AtomicU64,
}

impl InjectedStylesheet {
    /// Create an empty injection point
    pub fn new() -> Self {
        Self::default()
    }

    /// Current stylesheet content, if any has been injected
    pub fn content(&self) -> Option<String> {
        self.content.lock().ok().and_then(|guard| guard.clone())
    }

    /// How many times the content has been replaced
    pub fn replacement_count(&self) -> u64 {
        self.replacements.load(Ordering::SeqCst)
    }

    /// Whether anything has been injected yet
    pub fn is_populated(&self) -> bool {
        self.replacement_count() > 0
    }
}

impl StyleTarget for InjectedStylesheet {
    fn apply(&self, css: &str) {
        if let Ok(mut guard) = self.content.lock() {
            *guard = Some(css.to_string());
            self.replacements.fetch_add(1, Ordering::SeqCst);
        }
    }
}
