//! Product catalog backed by a single JSON file.
//!
//! The catalog is reloaded from disk on every call — no cache. The
//! file is small and rarely changes, and same-process read-after-write
//! visibility matters more here than lookup speed. There is no
//! cross-process file locking; an external sync process is assumed to
//! replace the file atomically.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::debug;

use stockscan_core::Product;

/// Shape of `products.json`: `{ "products": [...] }`.
#[derive(Debug, Default, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    products: Vec<Product>,
}

pub struct ProductStore {
    data_path: PathBuf,
}

impl ProductStore {
    pub fn new(data_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
        }
    }

    /// Load every product, in catalog file order. A missing catalog
    /// file is an empty catalog, not an error.
    pub async fn get_all(&self) -> Result<Vec<Product>> {
        if !self.data_path.exists() {
            debug!(path = %self.data_path.display(), "Catalog file missing; empty catalog");
            return Ok(Vec::new());
        }

        let raw = tokio::fs::read_to_string(&self.data_path)
            .await
            .with_context(|| format!("Failed to read catalog: {}", self.data_path.display()))?;

        let catalog: CatalogFile = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse catalog: {}", self.data_path.display()))?;

        Ok(catalog.products)
    }

    /// Exact-match scan by product code.
    pub async fn get_by_code(&self, code: &str) -> Result<Option<Product>> {
        let products = self.get_all().await?;
        Ok(products.into_iter().find(|p| p.code == code))
    }

    /// Case-insensitive substring search over code, name and
    /// description. Result order is catalog file order.
    pub async fn search(&self, query: &str) -> Result<Vec<Product>> {
        let query = query.to_lowercase();
        let products = self.get_all().await?;

        Ok(products
            .into_iter()
            .filter(|p| {
                p.code.to_lowercase().contains(&query)
                    || p.name.to_lowercase().contains(&query)
                    || p.description.to_lowercase().contains(&query)
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;

    const CATALOG: &str = r#"{
        "products": [
            {
                "code": "12345",
                "name": "Tornillo M8x20",
                "description": "Tornillo hexagonal acero inoxidable",
                "price": 0.50,
                "stock": 150,
                "locations": ["Estantería A-3"],
                "supplier": "Ferretería Industrial SA",
                "category": "Tornillería"
            },
            {
                "code": "ABC-99",
                "name": "Arandela plana",
                "description": "Arandela DIN 125",
                "price": 0.05,
                "stock": 2000,
                "locations": ["Estantería B-1", "Estantería B-2"],
                "supplier": "Ferretería Industrial SA",
                "category": "Tornillería"
            }
        ]
    }"#;

    fn write_catalog(dir: &Path) -> PathBuf {
        let path = dir.join("products.json");
        std::fs::write(&path, CATALOG).unwrap();
        path
    }

    #[tokio::test]
    async fn test_get_by_code_exact_match() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductStore::new(write_catalog(dir.path()));

        let product = store.get_by_code("12345").await.unwrap().unwrap();
        assert_eq!(product.name, "Tornillo M8x20");
        assert_eq!(product.price, 0.50);
        assert_eq!(product.stock, 150);
        assert_eq!(product.locations, vec!["Estantería A-3"]);

        assert!(store.get_by_code("NOPE").await.unwrap().is_none());
        // Exact match only; no prefix matching.
        assert!(store.get_by_code("1234").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive_over_all_fields() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductStore::new(write_catalog(dir.path()));

        let by_name = store.search("tornillo").await.unwrap();
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].code, "12345");

        let by_code = store.search("abc").await.unwrap();
        assert_eq!(by_code.len(), 1);
        assert_eq!(by_code[0].code, "ABC-99");

        let by_description = store.search("din 125").await.unwrap();
        assert_eq!(by_description.len(), 1);

        // Catalog file order is preserved.
        let both = store.search("tornillería").await.unwrap();
        assert!(both.is_empty(), "category is not searched");
        let both = store.search("ferretería").await.unwrap();
        assert!(both.is_empty(), "supplier is not searched");
        let all = store.search("a").await.unwrap();
        assert_eq!(all[0].code, "12345");
        assert_eq!(all[1].code, "ABC-99");
    }

    #[tokio::test]
    async fn test_missing_catalog_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = ProductStore::new(dir.path().join("absent.json"));
        assert!(store.get_all().await.unwrap().is_empty());
        assert!(store.get_by_code("12345").await.unwrap().is_none());
    }

    // Every call reloads from disk, so a rewrite of the file is
    // visible on the very next lookup. This is the intended
    // read-after-write behavior of the uncached store.
    #[tokio::test]
    async fn test_reload_per_call_sees_external_writes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_catalog(dir.path());
        let store = ProductStore::new(&path);

        assert!(store.get_by_code("NEW-1").await.unwrap().is_none());

        std::fs::write(
            &path,
            r#"{"products":[{"code":"NEW-1","name":"Nuevo","price":1.0,"stock":1}]}"#,
        )
        .unwrap();

        assert!(store.get_by_code("NEW-1").await.unwrap().is_some());
    }
}
