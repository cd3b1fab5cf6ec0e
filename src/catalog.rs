use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

use crate::models::{LabelConfig, ProductPageConfig};
use crate::utils::error::Result;

/// Read access to saved label and product page configurations.
///
/// Both lists are returned in ascending id order.
#[async_trait]
pub trait ConfigLookup: Send + Sync {
    async fn labels(&self) -> Result<Vec<LabelConfig>>;

    async fn product_pages(&self) -> Result<Vec<ProductPageConfig>>;

    async fn label_by_id(&self, id: i64) -> Result<Option<LabelConfig>> {
        Ok(self.labels().await?.into_iter().find(|l| l.id == Some(id)))
    }

    async fn product_page_by_id(&self, id: i64) -> Result<Option<ProductPageConfig>> {
        Ok(self
            .product_pages()
            .await?
            .into_iter()
            .find(|p| p.id == Some(id)))
    }
}

/// In-memory catalog, usually loaded from a JSON export.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StaticCatalog {
    #[serde(default)]
    labels: Vec<LabelConfig>,
    #[serde(default)]
    product_pages: Vec<ProductPageConfig>,
}

impl StaticCatalog {
    pub fn new(mut labels: Vec<LabelConfig>, mut product_pages: Vec<ProductPageConfig>) -> Self {
        labels.sort_by_key(|l| (l.id.is_none(), l.id));
        product_pages.sort_by_key(|p| (p.id.is_none(), p.id));
        Self {
            labels,
            product_pages,
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: StaticCatalog = serde_json::from_str(json)?;
        Ok(Self::new(raw.labels, raw.product_pages))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await?;
        let catalog = Self::from_json_str(&json)?;
        info!(
            path = %path.display(),
            labels = catalog.labels.len(),
            product_pages = catalog.product_pages.len(),
            "Loaded catalog"
        );
        Ok(catalog)
    }
}

#[async_trait]
impl ConfigLookup for StaticCatalog {
    async fn labels(&self) -> Result<Vec<LabelConfig>> {
        Ok(self.labels.clone())
    }

    async fn product_pages(&self) -> Result<Vec<ProductPageConfig>> {
        Ok(self.product_pages.clone())
    }
}
