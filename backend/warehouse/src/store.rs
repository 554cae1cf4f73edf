//! Flat-file intake store.
//!
//! `entries.json` holds the ledger, `manufacturers.json` the known
//! manufacturer names, and images land under
//! `<storage>/<manufacturer>/<reference>/`. Both JSON files are read
//! wholesale and rewritten per operation; there is no cross-process
//! locking, so two concurrent writers can clobber each other.

use std::path::PathBuf;

use anyhow::Context;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{info, warn};

/// Limits carried over from the original intake rules.
const MAX_IMAGES_PER_ENTRY: usize = 10;
const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

static UNSAFE_PATH_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9_\-]").unwrap());

#[derive(Debug, Error)]
pub enum WarehouseError {
    /// Bad request data; maps to HTTP 400 at the gateway.
    #[error("{0}")]
    Invalid(String),

    /// Filesystem or serialization failure; maps to HTTP 500.
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<anyhow::Error> for WarehouseError {
    fn from(e: anyhow::Error) -> Self {
        Self::Storage(e.to_string())
    }
}

/// Incoming intake event. Image entries are base64, with or without a
/// `data:image/...;base64,` prefix.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEntry {
    pub referencia: String,
    pub fabricante: String,
    pub cantidad: i64,
    pub operario: String,
    #[serde(default)]
    pub observaciones: String,
    #[serde(default, rename = "referenciaScanned")]
    pub referencia_scanned: String,
    pub imagenes: Vec<String>,
}

/// Persisted ledger record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntryRecord {
    pub id: String,
    pub referencia: String,
    pub fabricante: String,
    pub cantidad: i64,
    pub operario: String,
    #[serde(default)]
    pub observaciones: String,
    #[serde(default, rename = "referenciaScanned")]
    pub referencia_scanned: String,
    pub timestamp: String,
    pub imagenes: Vec<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct EntriesFile {
    #[serde(default)]
    entries: Vec<EntryRecord>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct ManufacturersFile {
    #[serde(default)]
    manufacturers: Vec<String>,
}

/// Result of a successful intake.
#[derive(Debug, Serialize)]
pub struct CreatedEntry {
    pub entry_id: String,
    pub images_saved: usize,
    pub storage_path: String,
    pub timestamp: String,
}

/// Summary row for the paginated listing.
#[derive(Debug, Serialize)]
pub struct EntrySummary {
    pub id: String,
    pub referencia: String,
    pub fabricante: String,
    pub cantidad: i64,
    pub operario: String,
    pub timestamp: String,
    pub image_count: usize,
}

#[derive(Debug, Serialize)]
pub struct EntriesPage {
    pub total: usize,
    pub limit: usize,
    pub offset: usize,
    pub entries: Vec<EntrySummary>,
}

/// Aggregate view of previous intakes for one reference.
#[derive(Debug, Serialize)]
pub struct ReferenceCheck {
    pub exists: bool,
    pub count: usize,
    pub total_quantity: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_entry: Option<LastEntry>,
}

#[derive(Debug, Serialize)]
pub struct LastEntry {
    pub fabricante: String,
    pub cantidad: i64,
    pub timestamp: String,
    pub operario: String,
    pub observaciones: String,
}

pub struct WarehouseStore {
    data_path: PathBuf,
    storage_path: PathBuf,
}

impl WarehouseStore {
    pub fn new(data_path: impl Into<PathBuf>, storage_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            storage_path: storage_path.into(),
        }
    }

    fn entries_file(&self) -> PathBuf {
        self.data_path.join("entries.json")
    }

    fn manufacturers_file(&self) -> PathBuf {
        self.data_path.join("manufacturers.json")
    }

    async fn load_entries(&self) -> anyhow::Result<EntriesFile> {
        let path = self.entries_file();
        if !path.exists() {
            return Ok(EntriesFile::default());
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    async fn save_entries(&self, data: &EntriesFile) -> anyhow::Result<()> {
        tokio::fs::create_dir_all(&self.data_path).await?;
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(self.entries_file(), json)
            .await
            .context("Failed to write entries.json")
    }

    async fn load_manufacturers(&self) -> anyhow::Result<ManufacturersFile> {
        let path = self.manufacturers_file();
        if !path.exists() {
            return Ok(ManufacturersFile::default());
        }
        let raw = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read {}", path.display()))?;
        serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Validate, save the photos, and append the ledger record.
    pub async fn create_entry(&self, entry: NewEntry) -> Result<CreatedEntry, WarehouseError> {
        let referencia = entry.referencia.trim().to_string();
        let fabricante = entry.fabricante.trim().to_string();
        let operario = entry.operario.trim().to_string();

        if referencia.is_empty() || fabricante.is_empty() || operario.is_empty() {
            return Err(WarehouseError::Invalid(
                "La referencia, fabricante y operario son requeridos".into(),
            ));
        }
        if entry.cantidad <= 0 {
            return Err(WarehouseError::Invalid(
                "La cantidad debe ser mayor a 0".into(),
            ));
        }
        if entry.imagenes.is_empty() {
            return Err(WarehouseError::Invalid(
                "Se requiere al menos una imagen".into(),
            ));
        }
        if entry.imagenes.len() > MAX_IMAGES_PER_ENTRY {
            return Err(WarehouseError::Invalid(format!(
                "Máximo {MAX_IMAGES_PER_ENTRY} imágenes permitidas"
            )));
        }

        let entry_id = format!(
            "entry_{}_{:08x}",
            Utc::now().timestamp(),
            rand::random::<u32>()
        );
        let timestamp = Utc::now().to_rfc3339();

        let fabricante_dir = UNSAFE_PATH_CHARS.replace_all(&fabricante, "_").to_string();
        let referencia_dir = UNSAFE_PATH_CHARS.replace_all(&referencia, "_").to_string();
        let target_dir = self.storage_path.join(&fabricante_dir).join(&referencia_dir);
        tokio::fs::create_dir_all(&target_dir)
            .await
            .map_err(|e| WarehouseError::Storage(format!("failed to create image dir: {e}")))?;

        let mut image_paths = Vec::new();
        for (index, image) in entry.imagenes.iter().enumerate() {
            // Accept both bare base64 and data URLs.
            let b64 = image
                .split_once("base64,")
                .map(|(_, rest)| rest)
                .unwrap_or(image);

            let Ok(bytes) = BASE64.decode(b64.trim()) else {
                warn!(index, "Skipping image with invalid base64");
                continue;
            };
            if bytes.len() > MAX_IMAGE_BYTES {
                warn!(index, size = bytes.len(), "Skipping oversized image");
                continue;
            }

            let file_name = format!("{}_{}.jpg", Utc::now().timestamp(), index + 1);
            let path = target_dir.join(&file_name);
            if tokio::fs::write(&path, &bytes).await.is_ok() {
                image_paths.push(format!("{fabricante_dir}/{referencia_dir}/{file_name}"));
            }
        }

        if image_paths.is_empty() {
            return Err(WarehouseError::Storage(
                "Error al guardar las imágenes".into(),
            ));
        }

        let record = EntryRecord {
            id: entry_id.clone(),
            referencia,
            fabricante: fabricante.clone(),
            cantidad: entry.cantidad,
            operario,
            observaciones: entry.observaciones.trim().to_string(),
            referencia_scanned: entry.referencia_scanned.trim().to_string(),
            timestamp: timestamp.clone(),
            imagenes: image_paths.clone(),
        };

        let mut entries = self.load_entries().await?;
        entries.entries.push(record);
        self.save_entries(&entries).await?;

        self.record_manufacturer(&fabricante).await?;

        info!(entry_id, images = image_paths.len(), "Intake entry recorded");
        Ok(CreatedEntry {
            entry_id,
            images_saved: image_paths.len(),
            storage_path: format!("{fabricante_dir}/{referencia_dir}"),
            timestamp,
        })
    }

    /// Add a manufacturer to the known list if new, keeping it sorted.
    async fn record_manufacturer(&self, fabricante: &str) -> anyhow::Result<()> {
        let mut data = self.load_manufacturers().await?;
        if !data.manufacturers.iter().any(|m| m == fabricante) {
            data.manufacturers.push(fabricante.to_string());
            data.manufacturers.sort();
            let json = serde_json::to_string_pretty(&data)?;
            tokio::fs::create_dir_all(&self.data_path).await?;
            tokio::fs::write(self.manufacturers_file(), json)
                .await
                .context("Failed to write manufacturers.json")?;
        }
        Ok(())
    }

    /// Paginated listing, newest first.
    pub async fn list_entries(
        &self,
        limit: usize,
        offset: usize,
    ) -> Result<EntriesPage, WarehouseError> {
        let limit = if (1..=500).contains(&limit) { limit } else { 50 };

        let mut all = self.load_entries().await?.entries;
        all.reverse();
        let total = all.len();

        let entries = all
            .into_iter()
            .skip(offset)
            .take(limit)
            .map(|e| EntrySummary {
                id: e.id,
                referencia: e.referencia,
                fabricante: e.fabricante,
                cantidad: e.cantidad,
                operario: e.operario,
                timestamp: e.timestamp,
                image_count: e.imagenes.len(),
            })
            .collect();

        Ok(EntriesPage {
            total,
            limit,
            offset,
            entries,
        })
    }

    /// Whether a reference was received before, with totals and the
    /// most recent entry.
    pub async fn check_reference(&self, referencia: &str) -> Result<ReferenceCheck, WarehouseError> {
        if referencia.is_empty() {
            return Err(WarehouseError::Invalid("Referencia requerida".into()));
        }

        let entries = self.load_entries().await?.entries;
        let matches: Vec<&EntryRecord> = entries
            .iter()
            .filter(|e| e.referencia == referencia)
            .collect();

        let Some(last) = matches.last() else {
            return Ok(ReferenceCheck {
                exists: false,
                count: 0,
                total_quantity: 0,
                last_entry: None,
            });
        };

        Ok(ReferenceCheck {
            exists: true,
            count: matches.len(),
            total_quantity: matches.iter().map(|e| e.cantidad).sum(),
            last_entry: Some(LastEntry {
                fabricante: last.fabricante.clone(),
                cantidad: last.cantidad,
                timestamp: last.timestamp.clone(),
                operario: last.operario.clone(),
                observaciones: last.observaciones.clone(),
            }),
        })
    }

    /// Known manufacturer names, sorted.
    pub async fn manufacturers(&self) -> Result<Vec<String>, WarehouseError> {
        Ok(self.load_manufacturers().await?.manufacturers)
    }

    /// Entry and manufacturer counts for health reporting.
    pub async fn stats(&self) -> Result<(usize, usize), WarehouseError> {
        let entries = self.load_entries().await?.entries.len();
        let manufacturers = self.load_manufacturers().await?.manufacturers.len();
        Ok((entries, manufacturers))
    }
}
