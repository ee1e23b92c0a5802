//! Configuration for the administrative service.

use quantification::QuantificationSettings;
use serde::{Deserialize, Serialize};

/// Configuration for a [`QuantificationService`](crate::QuantificationService).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdminConfig {
    /// Service ID, recorded as the actor of automated actions
    pub service_id: String,
    /// Engine settings
    pub quantification: QuantificationSettings,
    /// Audit trail settings
    pub audit: AuditConfig,
    /// Log level hint for the embedding binary
    pub log_level: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            service_id: uuid::Uuid::new_v4().to_string(),
            quantification: QuantificationSettings::default(),
            audit: AuditConfig::default(),
            log_level: "info".to_string(),
        }
    }
}

impl AdminConfig {
    /// Create a new config with service ID.
    pub fn new(service_id: impl Into<String>) -> Self {
        Self {
            service_id: service_id.into(),
            ..Default::default()
        }
    }

    /// Replace the engine settings.
    pub fn with_settings(mut self, settings: QuantificationSettings) -> Self {
        self.quantification = settings;
        self
    }

    /// Load config from YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }

    /// Serialize to YAML.
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }
}

/// Audit trail configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Record administrative actions
    pub enabled: bool,
    /// Maximum entries retained before the oldest are pruned
    pub max_entries: usize,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: 10_000,
        }
    }
}
