//! CLI Doctor Command
//!
//! Probes the local OCR toolchain and storage layout so a misconfigured
//! deployment fails here instead of on the first scan.

use std::path::Path;

use anyhow::Result;

use stockscan_config::StockScanConfig;
use stockscan_engines::{EasyOcrEngine, TesseractEngine};

/// Executes the full doctor diagnosis.
pub async fn run(config: &StockScanConfig) -> Result<()> {
    println!("\n🔍 Running StockScan Doctor...\n");

    let mut is_ok = check_engines(config).await;
    is_ok &= check_storage(config);
    is_ok &= check_security(config);

    println!();
    if is_ok {
        println!("✅ All checks passed! StockScan is healthy.");
    } else {
        println!("❌ Some checks failed! Please fix the errors above.");
    }

    Ok(())
}

async fn check_engines(config: &StockScanConfig) -> bool {
    println!("Checking OCR Engines:");

    let mut all_good = true;

    if config.engines.tesseract.enabled {
        let engine = TesseractEngine::new(
            &config.engines.tesseract.binary,
            &config.engines.tesseract.languages,
        );
        match engine.check_available().await {
            Ok(()) => println!("  🟢 tesseract binary found ({})", config.engines.tesseract.binary),
            Err(e) => {
                println!("  🔴 tesseract unavailable: {e}");
                all_good = false;
            }
        }
    } else {
        println!("  🟡 tesseract disabled in config");
    }

    if config.engines.easyocr.enabled {
        let engine = EasyOcrEngine::new(
            &config.engines.easyocr.python_bin,
            &config.engines.easyocr.script,
        );
        match engine.check_available().await {
            Ok(()) => println!("  🟢 easyocr script found ({})", config.engines.easyocr.script),
            Err(e) => {
                println!("  🔴 easyocr unavailable: {e}");
                all_good = false;
            }
        }
    } else {
        println!("  🟡 easyocr disabled in config");
    }

    // Remote engines only need a per-user key, nothing to probe locally.
    for (name, remote) in [
        ("openai-vision", &config.engines.openai_vision),
        ("claude-vision", &config.engines.claude_vision),
    ] {
        if remote.enabled {
            println!("  🟢 {name} enabled (keys are checked per request)");
        } else {
            println!("  🟡 {name} disabled in config");
        }
    }

    all_good
}

fn check_storage(config: &StockScanConfig) -> bool {
    println!("Checking Storage:");

    let mut all_good = true;

    let data_dir = Path::new(&config.storage.data_dir);
    if data_dir.is_dir() {
        println!("  🟢 data directory exists ({})", config.storage.data_dir);
    } else {
        // Created on first write, so only a warning.
        println!("  🟡 data directory missing ({})", config.storage.data_dir);
    }

    let image_dir = Path::new(&config.storage.image_dir);
    if image_dir.is_dir() {
        println!("  🟢 image directory exists ({})", config.storage.image_dir);
    } else {
        println!("  🟡 image directory missing ({})", config.storage.image_dir);
    }

    if data_dir.join("products.json").is_file() {
        println!("  🟢 product catalog found");
    } else {
        println!("  🔴 product catalog missing (data/products.json)");
        all_good = false;
    }

    all_good
}

fn check_security(config: &StockScanConfig) -> bool {
    println!("Checking Security:");

    if config.security.encryption_key.is_empty() {
        println!("  🟡 no encryption key configured; stored API keys will not survive restarts");
        true
    } else if stockscan_security::parse_key(&config.security.encryption_key).is_ok() {
        println!("  🟢 encryption key is a valid 256-bit hex key");
        true
    } else {
        println!("  🔴 encryption key is not 64 hex characters");
        false
    }
}
