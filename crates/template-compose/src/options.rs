use crate::constants::{
    A4_HEIGHT_PT, A4_WIDTH_PT, DEFAULT_FONT_WAIT_MS, DEFAULT_MAX_CONCURRENCY,
    SEPARATOR_LINE_WIDTH,
};
use crate::types::*;
use std::time::Duration;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Page geometry settings shared by every category
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct LayoutOptions {
    /// Uniform margin around the usable page area (points)
    pub page_margin_pt: f32,
    /// Width of the cut guides between cells (points, 0 disables them)
    pub separator_width_pt: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            page_margin_pt: 0.0,
            separator_width_pt: SEPARATOR_LINE_WIDTH,
        }
    }
}

/// Export configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize), serde(default))]
pub struct ExportOptions {
    /// How long to wait for a font family before using the default face
    pub font_wait_ms: u64,
    /// Instances fetched and composed at the same time
    pub max_concurrency: usize,
    pub layout: LayoutOptions,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            font_wait_ms: DEFAULT_FONT_WAIT_MS,
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            layout: LayoutOptions::default(),
        }
    }
}

impl ExportOptions {
    pub fn font_wait(&self) -> Duration {
        Duration::from_millis(self.font_wait_ms)
    }

    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| ComposeError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        if self.max_concurrency == 0 {
            return Err(ComposeError::Config(
                "max_concurrency must be at least 1".to_string(),
            ));
        }

        let margin = self.layout.page_margin_pt;
        if !margin.is_finite() || margin < 0.0 {
            return Err(ComposeError::Config(format!(
                "Page margin must be a non-negative number, got {}",
                margin
            )));
        }
        if margin * 2.0 >= A4_WIDTH_PT.min(A4_HEIGHT_PT) {
            return Err(ComposeError::Config(format!(
                "Page margin {}pt leaves no usable area on the page",
                margin
            )));
        }

        let separator = self.layout.separator_width_pt;
        if !separator.is_finite() || separator < 0.0 {
            return Err(ComposeError::Config(format!(
                "Separator width must be a non-negative number, got {}",
                separator
            )));
        }

        Ok(())
    }
}
