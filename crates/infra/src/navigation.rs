//! Navigation side effects requested by the ban monitor.
//!
//! In-app redirects never pass through here: the gate returns them as
//! `Decision::Redirect` for the routing layer to follow.

use std::sync::Mutex;

/// A full page load. Every piece of page state is re-initialised; used for
/// ban and unban transitions only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    pub target: String,
}

impl Navigation {
    pub fn full_reload(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

/// Routing-layer collaborator.
pub trait Navigator: Send + Sync {
    fn reload_to(&self, target: &str);
}

/// Navigator that records requests instead of performing them.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    history: Mutex<Vec<Navigation>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn history(&self) -> Vec<Navigation> {
        self.lock().clone()
    }

    pub fn last(&self) -> Option<Navigation> {
        self.lock().last().cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<Navigation>> {
        self.history.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl Navigator for RecordingNavigator {
    fn reload_to(&self, target: &str) {
        self.lock().push(Navigation::full_reload(target));
    }
}
