use std::collections::HashMap;
use std::sync::Arc;

use stockscan_core::OcrEngine;

/// Registry of recognition engines, looked up by wire name.
///
/// Built once at startup from the config; dispatch by engine name goes
/// through here rather than string branching at call sites.
pub struct EngineRegistry {
    engines: HashMap<String, Arc<dyn OcrEngine>>,
}

impl EngineRegistry {
    pub fn new() -> Self {
        Self {
            engines: HashMap::new(),
        }
    }

    /// Register an engine under its own wire name.
    pub fn register(&mut self, engine: Arc<dyn OcrEngine>) {
        self.engines.insert(engine.name().to_string(), engine);
    }

    /// Look up an engine by wire name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn OcrEngine>> {
        self.engines.get(name).cloned()
    }

    /// All registered engine names.
    pub fn list(&self) -> Vec<String> {
        self.engines.keys().cloned().collect()
    }
}

impl Default for EngineRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockEngine;

    #[test]
    fn test_registry_lookup_by_name() {
        let mut registry = EngineRegistry::new();
        registry.register(Arc::new(MockEngine::succeeding("tesseract", "A1")));
        registry.register(Arc::new(MockEngine::failing("easyocr", "down")));

        assert!(registry.get("tesseract").is_some());
        assert!(registry.get("easyocr").is_some());
        assert!(registry.get("gocr").is_none());

        let mut names = registry.list();
        names.sort();
        assert_eq!(names, vec!["easyocr", "tesseract"]);
    }
}
