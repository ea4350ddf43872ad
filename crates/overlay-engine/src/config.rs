//! Engine configuration.

use serde::{Deserialize, Serialize};

use overlay_common::{OverlayError, Result};
use overlay_layout::LayoutTuning;

use crate::options::CloseTrigger;

/// Engine-wide settings, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Offset added to every relative z-index so popups sit above page
    /// content.
    pub z_index_base: i32,
    /// Content names that may be opened several times for the same owner.
    pub duplicate_whitelist: Vec<String>,
    /// Close triggers added to every popup.
    pub default_close_triggers: Vec<String>,
    /// Header drag handle.
    pub header_handle_selector: String,
    /// Header drag handle on compact screens.
    pub compact_handle_selector: String,
    pub layout: LayoutTuning,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            z_index_base: 10,
            duplicate_whitelist: vec!["cardDetails".to_string()],
            default_close_triggers: vec![
                "click .js-close-detached-popup".to_string(),
                "click .js-close".to_string(),
            ],
            header_handle_selector: ".header-title".to_string(),
            compact_handle_selector: ".js-popup-drag-handle".to_string(),
            layout: LayoutTuning::default(),
        }
    }
}

impl EngineConfig {
    /// Parse and validate a JSON configuration. Missing fields take their
    /// defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| OverlayError::config_with_source("invalid engine configuration", e))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.layout
            .validate()
            .map_err(|e| OverlayError::config_with_source("invalid layout tuning", e))?;

        for trigger in &self.default_close_triggers {
            CloseTrigger::parse(trigger)
                .map_err(|e| OverlayError::config_with_source("invalid default close trigger", e))?;
        }

        if self.header_handle_selector.trim().is_empty()
            || self.compact_handle_selector.trim().is_empty()
        {
            return Err(OverlayError::config("handle selectors must not be empty"));
        }
        Ok(())
    }

    pub fn allows_duplicates(&self, name: &str) -> bool {
        self.duplicate_whitelist.iter().any(|n| n == name)
    }

    /// Default close triggers, parsed.
    pub fn close_triggers(&self) -> Vec<CloseTrigger> {
        self.default_close_triggers
            .iter()
            .filter_map(|t| CloseTrigger::parse(t).ok())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = EngineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.z_index_base, 10);
        assert!(config.allows_duplicates("cardDetails"));
        assert!(!config.allows_duplicates("labels"));
        assert_eq!(config.close_triggers().len(), 2);
    }

    #[test]
    fn test_from_json_partial() {
        let config = EngineConfig::from_json(
            r#"{"z_index_base": 100, "layout": {"max_retries": 1}}"#,
        )
        .unwrap();
        assert_eq!(config.z_index_base, 100);
        assert_eq!(config.layout.max_retries, 1);
        assert_eq!(config.header_handle_selector, ".header-title");
    }

    #[test]
    fn test_from_json_rejects_malformed() {
        let err = EngineConfig::from_json("{not json").unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_from_json_rejects_bad_tuning() {
        let err = EngineConfig::from_json(r#"{"layout": {"handle_min_visible": 2.0}}"#).unwrap_err();
        assert_eq!(err.category(), "config");
    }

    #[test]
    fn test_bad_default_trigger_rejected() {
        let config = EngineConfig {
            default_close_triggers: vec!["click".to_string()],
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
