//! Encrypted per-user API key store.
//!
//! Keys live in `api_keys.json` under the data directory:
//! `{ "user_keys": [ { id, created_at, updated_at, last_used,
//! openai_key_encrypted?, anthropic_key_encrypted? } ] }`. Values are
//! encrypted with [`crate::crypto`]; the file is chmod 600 on unix.
//! The file is reloaded on every operation, same as the other flat
//! stores.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::{debug, warn};

use crate::crypto;

static OPENAI_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-[\w\-]+$").unwrap());
static ANTHROPIC_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^sk-ant-[\w\-]+$").unwrap());

/// Basic shape check for OpenAI keys (`sk-...` / `sk-proj-...`).
pub fn is_valid_openai_key(key: &str) -> bool {
    OPENAI_KEY_RE.is_match(key)
}

/// Basic shape check for Anthropic keys (`sk-ant-...`).
pub fn is_valid_anthropic_key(key: &str) -> bool {
    ANTHROPIC_KEY_RE.is_match(key)
}

/// Decrypted keys handed to the orchestration layer. Never persisted.
#[derive(Debug, Clone, Default)]
pub struct UserKeys {
    pub openai_key: Option<String>,
    pub anthropic_key: Option<String>,
}

/// Which keys a user has configured, without exposing them.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct KeyStatus {
    pub openai: bool,
    pub anthropic: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserKeyEntry {
    id: String,
    created_at: String,
    updated_at: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_used: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    openai_key_encrypted: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    anthropic_key_encrypted: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct KeyFile {
    #[serde(default)]
    user_keys: Vec<UserKeyEntry>,
}

pub struct ApiKeyStore {
    path: PathBuf,
    encryption_key: String,
}

impl ApiKeyStore {
    pub fn new(path: impl Into<PathBuf>, encryption_key: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            encryption_key: encryption_key.into(),
        }
    }

    async fn load(&self) -> Result<KeyFile> {
        if !self.path.exists() {
            return Ok(KeyFile::default());
        }
        let raw = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read key store: {}", self.path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse key store: {}", self.path.display()))
    }

    async fn save(&self, data: &KeyFile) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create data dir: {}", parent.display()))?;
        }
        let json = serde_json::to_string_pretty(data)?;
        tokio::fs::write(&self.path, json)
            .await
            .with_context(|| format!("Failed to write key store: {}", self.path.display()))?;

        // Key material on disk stays owner-readable only.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&self.path, perms).await.ok();
        }
        Ok(())
    }

    /// Encrypt and store the provided keys for a user. Keys not
    /// provided in this call are kept from the existing entry.
    pub async fn save_user_keys(&self, user_id: &str, keys: &UserKeys) -> Result<()> {
        let mut data = self.load().await?;
        let now = Utc::now().to_rfc3339();

        let existing = data.user_keys.iter().position(|e| e.id == user_id);
        let previous = existing.map(|i| data.user_keys[i].clone());

        let openai_key_encrypted = match &keys.openai_key {
            Some(key) => Some(crypto::encrypt(key, &self.encryption_key)?),
            None => previous.as_ref().and_then(|e| e.openai_key_encrypted.clone()),
        };
        let anthropic_key_encrypted = match &keys.anthropic_key {
            Some(key) => Some(crypto::encrypt(key, &self.encryption_key)?),
            None => previous
                .as_ref()
                .and_then(|e| e.anthropic_key_encrypted.clone()),
        };

        let entry = UserKeyEntry {
            id: user_id.to_string(),
            created_at: previous
                .as_ref()
                .map(|e| e.created_at.clone())
                .unwrap_or_else(|| now.clone()),
            updated_at: now,
            last_used: previous.as_ref().and_then(|e| e.last_used.clone()),
            openai_key_encrypted,
            anthropic_key_encrypted,
        };

        match existing {
            Some(i) => data.user_keys[i] = entry,
            None => data.user_keys.push(entry),
        }

        debug!(user_id, "Saved encrypted API keys");
        self.save(&data).await
    }

    /// Decrypt and return a user's keys, updating `last_used`.
    /// Returns `None` when the user has no stored entry.
    pub async fn get_user_keys(&self, user_id: &str) -> Result<Option<UserKeys>> {
        let mut data = self.load().await?;

        let Some(entry) = data.user_keys.iter_mut().find(|e| e.id == user_id) else {
            return Ok(None);
        };

        let mut keys = UserKeys::default();
        if let Some(encrypted) = &entry.openai_key_encrypted {
            match crypto::decrypt(encrypted, &self.encryption_key) {
                Ok(key) => keys.openai_key = Some(key),
                Err(e) => warn!(user_id, error = %e, "Failed to decrypt OpenAI key"),
            }
        }
        if let Some(encrypted) = &entry.anthropic_key_encrypted {
            match crypto::decrypt(encrypted, &self.encryption_key) {
                Ok(key) => keys.anthropic_key = Some(key),
                Err(e) => warn!(user_id, error = %e, "Failed to decrypt Anthropic key"),
            }
        }

        entry.last_used = Some(Utc::now().to_rfc3339());
        self.save(&data).await?;

        Ok(Some(keys))
    }

    /// Which keys the user has configured, without decrypting them.
    pub async fn key_status(&self, user_id: &str) -> Result<KeyStatus> {
        let data = self.load().await?;
        Ok(data
            .user_keys
            .iter()
            .find(|e| e.id == user_id)
            .map(|e| KeyStatus {
                openai: e.openai_key_encrypted.is_some(),
                anthropic: e.anthropic_key_encrypted.is_some(),
            })
            .unwrap_or_default())
    }

    /// Remove a user's entry. Returns false when none existed.
    pub async fn delete_user_keys(&self, user_id: &str) -> Result<bool> {
        let mut data = self.load().await?;
        let before = data.user_keys.len();
        data.user_keys.retain(|e| e.id != user_id);
        if data.user_keys.len() == before {
            return Ok(false);
        }
        self.save(&data).await?;
        Ok(true)
    }
}
