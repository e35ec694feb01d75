//! @acp:module "Selection Config"
//! @acp:summary "Process-wide selection settings, validated once at start-up"
//! @acp:domain selection
//! @acp:layer config

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::error::ConfigError;
use super::types::Bucket;

/// Target share of each bucket in an adaptive test, as integer percentages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BucketRatios {
    pub new: u32,
    pub wrong: u32,
    pub correct: u32,
}

impl Default for BucketRatios {
    fn default() -> Self {
        Self {
            new: 60,
            wrong: 30,
            correct: 10,
        }
    }
}

impl BucketRatios {
    pub fn get(&self, bucket: Bucket) -> u32 {
        match bucket {
            Bucket::New => self.new,
            Bucket::WrongOrUnanswered => self.wrong,
            Bucket::Correct => self.correct,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sum = self.new + self.wrong + self.correct;
        if sum != 100 {
            return Err(ConfigError::RatioMisconfiguration {
                new: self.new,
                wrong: self.wrong,
                correct: self.correct,
                sum,
            });
        }
        Ok(())
    }
}

/// Handlebars templates for user-facing text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplates {
    #[serde(default = "default_insufficient_template")]
    pub insufficient: String,
    #[serde(default = "default_summary_template")]
    pub summary: String,
}

fn default_insufficient_template() -> String {
    "Only {{available}} questions are available for this selection, but {{requested}} were requested. \
     You can start the test with the {{available}} available questions or reduce the question count."
        .to_string()
}

fn default_summary_template() -> String {
    "Selected {{count}} questions from a pool of {{pool_size}}\
     {{#if composition}} ({{composition.new}} new, {{composition.wrong}} to revisit, {{composition.correct}} mastered){{/if}}\
     {{#if relaxed}}; some recently seen questions were included{{/if}}."
        .to_string()
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            insufficient: default_insufficient_template(),
            summary: default_summary_template(),
        }
    }
}

/// Selection settings read at process start
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionConfig {
    /// Number of recent sessions whose questions are avoided
    #[serde(default = "default_exclusion_window")]
    pub recent_exclusion_window: usize,
    #[serde(default)]
    pub adaptive_ratios: BucketRatios,
    /// Global switch; when off, requests are never adaptive
    #[serde(default = "default_true")]
    pub adaptive_selection_enabled: bool,
    #[serde(default)]
    pub messages: MessageTemplates,
}

fn default_exclusion_window() -> usize {
    3
}

fn default_true() -> bool {
    true
}

impl Default for SelectionConfig {
    fn default() -> Self {
        Self {
            recent_exclusion_window: default_exclusion_window(),
            adaptive_ratios: BucketRatios::default(),
            adaptive_selection_enabled: true,
            messages: MessageTemplates::default(),
        }
    }
}

impl SelectionConfig {
    /// Parse and validate a JSON config document
    pub fn from_json(content: &str, origin: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(content).map_err(|source| ConfigError::Parse {
            path: origin.to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from disk, falling back to defaults when the file is absent
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            info!("No config found at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.display().to_string(),
                source,
            })?;

        Self::from_json(&content, &path.display().to_string())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.adaptive_ratios.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SelectionConfig::default();
        assert_eq!(config.recent_exclusion_window, 3);
        assert_eq!(config.adaptive_ratios, BucketRatios { new: 60, wrong: 30, correct: 10 });
        assert!(config.adaptive_selection_enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = SelectionConfig::from_json(r#"{"recent_exclusion_window": 5}"#, "inline").unwrap();
        assert_eq!(config.recent_exclusion_window, 5);
        assert_eq!(config.adaptive_ratios, BucketRatios::default());
        assert_eq!(config.messages, MessageTemplates::default());
    }

    #[test]
    fn test_ratio_misconfiguration_is_rejected() {
        let result = SelectionConfig::from_json(
            r#"{"adaptive_ratios": {"new": 50, "wrong": 30, "correct": 10}}"#,
            "inline",
        );

        match result {
            Err(ConfigError::RatioMisconfiguration { sum, .. }) => assert_eq!(sum, 90),
            other => panic!("expected ratio misconfiguration, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let result = SelectionConfig::from_json("{not json", "inline");
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[tokio::test]
    async fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = SelectionConfig::load(&dir.path().join("selection.config.json"))
            .await
            .unwrap();
        assert_eq!(config, SelectionConfig::default());
    }

    #[tokio::test]
    async fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.config.json");
        std::fs::write(
            &path,
            r#"{"adaptive_ratios": {"new": 50, "wrong": 40, "correct": 10}, "adaptive_selection_enabled": false}"#,
        )
        .unwrap();

        let config = SelectionConfig::load(&path).await.unwrap();
        assert_eq!(config.adaptive_ratios.wrong, 40);
        assert!(!config.adaptive_selection_enabled);
    }
}
