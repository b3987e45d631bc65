//! Live-reloadable gateway configuration.

use crate::core::FilterKind;
use parking_lot::RwLock;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// One snapshot of the gateway knobs.
///
/// Deserializes with per-field defaults so a partial document is enough.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewaySettings {
    /// Whether the background filter poller runs its fetch cycle.
    #[serde(default = "default_poller_enabled")]
    pub poller_enabled: bool,

    /// Interval between poll cycles, in milliseconds.
    #[serde(default = "default_poller_interval_ms")]
    pub poller_interval_ms: u64,

    /// Whether fully-rolled-out filters are fetched.
    #[serde(default = "default_active_enabled")]
    pub active_enabled: bool,

    /// Whether canary filters are fetched on top of the active set.
    #[serde(default)]
    pub canary_enabled: bool,

    /// Destination directory for pre filters.
    #[serde(default = "default_pre_path")]
    pub pre_path: PathBuf,

    /// Destination directory for route filters.
    #[serde(default = "default_route_path")]
    pub route_path: PathBuf,

    /// Destination directory for post filters.
    #[serde(default = "default_post_path")]
    pub post_path: PathBuf,

    /// Destination directory for error filters.
    #[serde(default = "default_error_path")]
    pub error_path: PathBuf,

    /// Optional destination directory for custom filters.
    #[serde(default)]
    pub custom_path: Option<PathBuf>,

    /// File extension given to persisted filter scripts.
    #[serde(default = "default_script_extension")]
    pub script_extension: String,
}

fn default_poller_enabled() -> bool {
    true
}

fn default_poller_interval_ms() -> u64 {
    30_000
}

fn default_active_enabled() -> bool {
    true
}

fn default_pre_path() -> PathBuf {
    PathBuf::from("filters/pre")
}

fn default_route_path() -> PathBuf {
    PathBuf::from("filters/route")
}

fn default_post_path() -> PathBuf {
    PathBuf::from("filters/post")
}

fn default_error_path() -> PathBuf {
    PathBuf::from("filters/error")
}

fn default_script_extension() -> String {
    "groovy".to_string()
}

impl Default for GatewaySettings {
    fn default() -> Self {
        Self {
            poller_enabled: default_poller_enabled(),
            poller_interval_ms: default_poller_interval_ms(),
            active_enabled: default_active_enabled(),
            canary_enabled: false,
            pre_path: default_pre_path(),
            route_path: default_route_path(),
            post_path: default_post_path(),
            error_path: default_error_path(),
            custom_path: None,
            script_extension: default_script_extension(),
        }
    }
}

impl GatewaySettings {
    /// Resolves the destination directory for a filter kind.
    ///
    /// Custom filters fall back to the pre path when no custom directory is
    /// configured.
    #[must_use]
    pub fn path_for(&self, kind: FilterKind) -> PathBuf {
        match kind {
            FilterKind::Pre => self.pre_path.clone(),
            FilterKind::Route => self.route_path.clone(),
            FilterKind::Post => self.post_path.clone(),
            FilterKind::Error => self.error_path.clone(),
            FilterKind::Custom => self
                .custom_path
                .clone()
                .unwrap_or_else(|| self.pre_path.clone()),
        }
    }
}

/// A shared handle over [`GatewaySettings`] that re-reads on every access.
///
/// The sync engine and the pipeline never cache knob values; an external
/// config collaborator may call [`DynamicConfig::replace`] or
/// [`DynamicConfig::update`] at any time and the next access observes it.
#[derive(Debug, Default)]
pub struct DynamicConfig {
    inner: RwLock<GatewaySettings>,
}

impl DynamicConfig {
    /// Creates a handle over the given initial settings.
    #[must_use]
    pub fn new(settings: GatewaySettings) -> Self {
        Self {
            inner: RwLock::new(settings),
        }
    }

    /// Returns whether the poller fetch cycle is enabled.
    #[must_use]
    pub fn poller_enabled(&self) -> bool {
        self.inner.read().poller_enabled
    }

    /// Returns the current poll interval.
    #[must_use]
    pub fn poller_interval(&self) -> Duration {
        Duration::from_millis(self.inner.read().poller_interval_ms)
    }

    /// Returns whether active filters are fetched.
    #[must_use]
    pub fn active_enabled(&self) -> bool {
        self.inner.read().active_enabled
    }

    /// Returns whether canary filters are fetched.
    #[must_use]
    pub fn canary_enabled(&self) -> bool {
        self.inner.read().canary_enabled
    }

    /// Returns the script extension for persisted filters.
    #[must_use]
    pub fn script_extension(&self) -> String {
        self.inner.read().script_extension.clone()
    }

    /// Resolves the destination directory for a filter kind.
    #[must_use]
    pub fn path_for(&self, kind: FilterKind) -> PathBuf {
        self.inner.read().path_for(kind)
    }

    /// Returns a copy of the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> GatewaySettings {
        self.inner.read().clone()
    }

    /// Swaps in a whole new snapshot.
    pub fn replace(&self, settings: GatewaySettings) {
        *self.inner.write() = settings;
    }

    /// Applies an in-place mutation to the current snapshot.
    pub fn update(&self, mutate: impl FnOnce(&mut GatewaySettings)) {
        mutate(&mut self.inner.write());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = GatewaySettings::default();

        assert!(settings.poller_enabled);
        assert_eq!(settings.poller_interval_ms, 30_000);
        assert!(settings.active_enabled);
        assert!(!settings.canary_enabled);
        assert_eq!(settings.script_extension, "groovy");
    }

    #[test]
    fn test_partial_document_deserializes() {
        let settings: GatewaySettings =
            serde_json::from_str(r#"{"canary_enabled": true, "poller_interval_ms": 500}"#).unwrap();

        assert!(settings.canary_enabled);
        assert_eq!(settings.poller_interval_ms, 500);
        assert!(settings.poller_enabled);
    }

    #[test]
    fn test_path_for_custom_falls_back_to_pre() {
        let mut settings = GatewaySettings::default();
        assert_eq!(settings.path_for(FilterKind::Custom), settings.pre_path);

        settings.custom_path = Some(PathBuf::from("filters/custom"));
        assert_eq!(
            settings.path_for(FilterKind::Custom),
            PathBuf::from("filters/custom")
        );
    }

    #[test]
    fn test_dynamic_config_is_reread_per_use() {
        let config = DynamicConfig::default();
        assert!(config.poller_enabled());

        config.update(|s| s.poller_enabled = false);
        assert!(!config.poller_enabled());

        config.replace(GatewaySettings::default());
        assert!(config.poller_enabled());
    }
}
