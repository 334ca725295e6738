//! Batch export jobs read from JSON

use crate::fields::FieldCustomization;
use crate::options::ExportOptions;
use crate::selection::Session;
use crate::types::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// One template to add, with its field overrides
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobTemplate {
    pub asset: TemplateAsset,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldCustomization>,
}

/// A selection plus export settings, as saved by the editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportJob {
    #[serde(default)]
    pub options: ExportOptions,
    pub templates: Vec<JobTemplate>,
}

impl ExportJob {
    /// Load a job from a JSON file
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        Self::from_json(&bytes)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(bytes)
            .map_err(|e| ComposeError::Config(format!("Failed to parse job: {}", e)))
    }

    /// Save the job to a JSON file
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| ComposeError::Config(format!("Failed to serialize job: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    /// Build an editing session holding every template of the job.
    ///
    /// Field names are checked against each category's definitions, so a
    /// job with a typo is rejected rather than silently ignored.
    pub fn into_session(self) -> Result<(Session, ExportOptions)> {
        self.options.validate()?;

        let mut session = Session::new();
        for template in self.templates {
            let id = session.add_template(template.asset);
            for (field, customization) in template.fields {
                session.customize(id, &field, customization)?;
            }
        }
        Ok((session, self.options))
    }
}
