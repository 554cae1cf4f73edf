//! StockScan runtime configuration schema.

use serde::{Deserialize, Serialize};

/// Root configuration, deserialized from `config.yaml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StockScanConfig {
    pub gateway: GatewayConfig,
    pub storage: StorageConfig,
    pub engines: EnginesConfig,
    pub security: SecurityConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".into(),
            port: 8080,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StorageConfig {
    /// Directory holding products.json, api_keys.json, entries.json,
    /// manufacturers.json.
    pub data_dir: String,
    /// Root of the intake image folder tree.
    pub image_dir: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: "data".into(),
            image_dir: "storage/almacen_imagenes".into(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EnginesConfig {
    pub tesseract: TesseractConfig,
    pub easyocr: EasyOcrConfig,
    pub openai_vision: RemoteEngineConfig,
    pub claude_vision: RemoteEngineConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TesseractConfig {
    pub enabled: bool,
    pub binary: String,
    /// Tesseract language spec passed to `-l`.
    pub languages: String,
}

impl Default for TesseractConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            binary: "tesseract".into(),
            languages: "spa+eng".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EasyOcrConfig {
    pub enabled: bool,
    pub python_bin: String,
    pub script: String,
}

impl Default for EasyOcrConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            python_bin: "python3".into(),
            script: "scripts/easyocr_process.py".into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RemoteEngineConfig {
    pub enabled: bool,
    /// Model identifier; empty means the adapter's default.
    pub model: String,
}

impl Default for RemoteEngineConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            model: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecurityConfig {
    /// 64-hex-char AES key; typically `${STOCKSCAN_ENCRYPTION_KEY}`.
    pub encryption_key: String,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            encryption_key: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingConfig {
    pub level: String,
    pub dir: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".into(),
            dir: "logs".into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_sections() {
        let config: StockScanConfig = serde_yaml::from_str("gateway:\n  port: 9000\n").unwrap();
        assert_eq!(config.gateway.port, 9000);
        assert_eq!(config.gateway.host, "0.0.0.0");
        assert_eq!(config.engines.tesseract.binary, "tesseract");
        assert_eq!(config.engines.easyocr.python_bin, "python3");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_camel_case_field_names() {
        let yaml = "storage:\n  dataDir: /var/lib/stockscan\nengines:\n  easyocr:\n    pythonBin: /opt/venv/bin/python\n";
        let config: StockScanConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.storage.data_dir, "/var/lib/stockscan");
        assert_eq!(config.engines.easyocr.python_bin, "/opt/venv/bin/python");
    }
}
