//! Configuration for content extraction.
//!
//! The `Config` struct controls the thresholds of the extraction and cleanup
//! pipeline. It can be built in code or loaded from persisted settings JSON.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Configuration for content extraction.
///
/// All fields are public for easy configuration. Use `Default::default()`
/// for standard settings.
///
/// # Example
///
/// ```rust
/// use page_harvest::Config;
///
/// // Use defaults
/// let config = Config::default();
///
/// // Customize specific fields
/// let config = Config {
///     min_word_count: 8,
///     enable_text_node_fallback: false,
///     ..Config::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Config {
    /// Minimum characters for a chunk to survive extraction and cleanup.
    ///
    /// Default: `12`
    pub min_text_length: usize,

    /// Character bound used when splitting oversized chunks.
    ///
    /// Paragraphs, then sentences, are packed greedily into pieces no longer
    /// than this.
    ///
    /// Default: `2000`
    pub max_chunk_size: usize,

    /// Minimum words per chunk.
    ///
    /// Default: `5`
    pub min_word_count: usize,

    /// Word count above which a chunk is split.
    ///
    /// Default: `400`
    pub max_word_count: usize,

    /// How many viewport heights below the fold still count as visible.
    ///
    /// Default: `5.0`
    pub viewport_multiplier: f64,

    /// Text/markup ratio floor for elements that are neither paragraphs
    /// nor headings.
    ///
    /// Default: `0.3`
    pub content_density_threshold: f64,

    /// Run the text-node fallback when the primary extractor under-yields.
    ///
    /// Default: `true`
    pub enable_text_node_fallback: bool,

    /// Primary-extraction word total below which the fallback engages.
    ///
    /// Default: `150`
    pub fallback_word_threshold: usize,

    /// Maximum chunks the text-node fallback may produce.
    ///
    /// Default: `100`
    pub fallback_max_chunks: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            min_text_length: 12,
            max_chunk_size: 2000,
            min_word_count: 5,
            max_word_count: 400,
            viewport_multiplier: 5.0,
            content_density_threshold: 0.3,
            enable_text_node_fallback: true,
            fallback_word_threshold: 150,
            fallback_max_chunks: 100,
        }
    }
}

impl Config {
    /// Check that thresholds are mutually consistent.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidConfig` naming the first offending field.
    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::InvalidConfig("maxChunkSize must be positive".into()));
        }
        if self.max_word_count == 0 {
            return Err(Error::InvalidConfig("maxWordCount must be positive".into()));
        }
        if self.min_word_count > self.max_word_count {
            return Err(Error::InvalidConfig(format!(
                "minWordCount ({}) exceeds maxWordCount ({})",
                self.min_word_count, self.max_word_count
            )));
        }
        if !(self.viewport_multiplier.is_finite() && self.viewport_multiplier > 0.0) {
            return Err(Error::InvalidConfig("viewportMultiplier must be a positive number".into()));
        }
        if !(0.0..=1.0).contains(&self.content_density_threshold) {
            return Err(Error::InvalidConfig("contentDensityThreshold must lie in [0, 1]".into()));
        }
        Ok(())
    }

    /// Load a configuration from JSON, filling omitted fields with defaults.
    ///
    /// # Errors
    ///
    /// Returns an error when the JSON is malformed or the values fail
    /// [`Config::validate`].
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_thresholds() {
        let config = Config::default();

        assert_eq!(config.min_text_length, 12);
        assert_eq!(config.max_chunk_size, 2000);
        assert_eq!(config.min_word_count, 5);
        assert_eq!(config.max_word_count, 400);
        assert!((config.viewport_multiplier - 5.0).abs() < f64::EPSILON);
        assert!((config.content_density_threshold - 0.3).abs() < f64::EPSILON);
        assert!(config.enable_text_node_fallback);
        assert_eq!(config.fallback_word_threshold, 150);
        assert_eq!(config.fallback_max_chunks, 100);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_min_words_above_max_rejected() {
        let config = Config {
            min_word_count: 50,
            max_word_count: 10,
            ..Config::default()
        };
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn test_density_out_of_range_rejected() {
        let config = Config {
            content_density_threshold: 1.5,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_multiplier_rejected() {
        let config = Config {
            viewport_multiplier: 0.0,
            ..Config::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_from_json_fills_defaults() {
        let config = Config::from_json(r#"{"minWordCount": 8, "enableTextNodeFallback": false}"#)
            .unwrap();
        assert_eq!(config.min_word_count, 8);
        assert!(!config.enable_text_node_fallback);
        assert_eq!(config.max_chunk_size, 2000);
    }

    #[test]
    fn test_from_json_validates() {
        assert!(Config::from_json(r#"{"maxChunkSize": 0}"#).is_err());
        assert!(Config::from_json("not json").is_err());
    }
}
