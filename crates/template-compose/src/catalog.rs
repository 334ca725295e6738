//! Template catalog lookup

use crate::types::{Category, ComposeError, Result, TemplateAsset};
use std::path::Path;

/// Collaborator listing the templates available for a category
pub trait TemplateCatalog {
    /// Templates of `category`; `NoTemplates` when there are none
    fn templates(&self, category: Category) -> Result<Vec<TemplateAsset>>;
}

/// Catalog read from a CSV file with `id,name,url,category` columns
#[derive(Debug, Clone, Default)]
pub struct CsvCatalog {
    assets: Vec<TemplateAsset>,
}

impl CsvCatalog {
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = tokio::fs::read_to_string(path.as_ref()).await?;
        tokio::task::spawn_blocking(move || Self::parse(&contents)).await?
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .flexible(true)
            .from_reader(contents.as_bytes());
        let mut assets = Vec::new();

        for (line, result) in reader.records().enumerate() {
            let record = result?;
            if record.len() < 4 {
                log::warn!("Skipping catalog row {}: expected 4 columns", line + 1);
                continue;
            }
            let id = record[0].parse::<u64>().map_err(|_| {
                ComposeError::Config(format!("Catalog row {}: bad id '{}'", line + 1, &record[0]))
            })?;
            assets.push(TemplateAsset {
                id,
                name: record[1].to_string(),
                url: record[2].to_string(),
                category: record[3].parse()?,
            });
        }

        Ok(Self { assets })
    }

    pub fn assets(&self) -> &[TemplateAsset] {
        &self.assets
    }
}

impl TemplateCatalog for CsvCatalog {
    fn templates(&self, category: Category) -> Result<Vec<TemplateAsset>> {
        let found: Vec<_> = self
            .assets
            .iter()
            .filter(|asset| asset.category == category)
            .cloned()
            .collect();
        if found.is_empty() {
            return Err(ComposeError::NoTemplates(category));
        }
        Ok(found)
    }
}
