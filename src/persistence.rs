use crate::errors::AppResult;
use crate::models::{empty_layouts, Layouts, WidgetConfig};
use std::sync::Arc;

/// Scope bucket used when no user identity is available. Shared across all
/// anonymous visitors of the same dashboard; see DESIGN.md before changing.
pub const ANONYMOUS_USER_ID: &str = "anon";

/// Durable string store. Both operations may fail (quota, locked file,
/// disabled storage) and every caller in this crate must guard for it.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> AppResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// Storage namespace for one dashboard as seen by one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardScope {
    dashboard_key: String,
    user_id: Option<String>,
}

impl DashboardScope {
    pub fn new(dashboard_key: impl Into<String>, user_id: Option<String>) -> Self {
        Self {
            dashboard_key: dashboard_key.into(),
            user_id,
        }
    }

    pub fn anonymous(dashboard_key: impl Into<String>) -> Self {
        Self::new(dashboard_key, None)
    }

    pub fn storage_prefix(&self) -> String {
        let user = self.user_id.as_deref().unwrap_or(ANONYMOUS_USER_ID);
        format!("{}:u:{}", self.dashboard_key, user)
    }

    pub fn widgets_key(&self) -> String {
        format!("{}:widgets", self.storage_prefix())
    }

    pub fn layouts_key(&self) -> String {
        format!("{}:layouts", self.storage_prefix())
    }
}

/// Reads and writes the (widgets, layouts) pair under a scope's two keys.
///
/// Loading fails soft: a missing key, a store error, or corrupt JSON falls
/// back to the caller's defaults. Saving is best effort: each key is written
/// independently and failures are swallowed so the dashboard stays usable
/// when storage is unavailable. A partial write is accepted; the defaults
/// are robust to either key being absent.
#[derive(Clone)]
pub struct PersistenceAdapter {
    store: Arc<dyn KeyValueStore>,
}

impl PersistenceAdapter {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    pub fn load(
        &self,
        scope: &DashboardScope,
        default_widgets: &[WidgetConfig],
    ) -> (Vec<WidgetConfig>, Layouts) {
        let widgets = self
            .read_json::<Vec<WidgetConfig>>(&scope.widgets_key())
            .unwrap_or_else(|| default_widgets.to_vec());
        let layouts = self
            .read_json::<Layouts>(&scope.layouts_key())
            .unwrap_or_else(empty_layouts);
        (widgets, layouts)
    }

    pub fn save(&self, scope: &DashboardScope, widgets: &[WidgetConfig], layouts: &Layouts) {
        self.write_json(&scope.widgets_key(), widgets);
        self.write_json(&scope.layouts_key(), layouts);
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, key: &str) -> Option<T> {
        let raw = match self.store.get(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(error) => {
                tracing::warn!(key, %error, "dashboard state read failed, using defaults");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Some(value),
            Err(error) => {
                tracing::warn!(key, %error, "persisted dashboard state is corrupt, using defaults");
                None
            }
        }
    }

    fn write_json<T: serde::Serialize + ?Sized>(&self, key: &str, value: &T) {
        let raw = match serde_json::to_string(value) {
            Ok(raw) => raw,
            Err(error) => {
                tracing::warn!(key, %error, "dashboard state serialization failed");
                return;
            }
        };
        if let Err(error) = self.store.set(key, &raw) {
            tracing::warn!(key, %error, "dashboard state write failed");
        }
    }
}
