use std::collections::HashMap;

use anyhow::{anyhow, Result};

use super::backend::DetectionSource;

/// Named detection sources with a default.
///
/// The session takes ownership of one source, so sources are handed out by
/// value with `take`.
pub struct SourceRegistry {
    sources: HashMap<String, Box<dyn DetectionSource>>,
    default_name: Option<String>,
}

impl SourceRegistry {
    pub fn new() -> Self {
        Self {
            sources: HashMap::new(),
            default_name: None,
        }
    }

    /// Register a source. The first registered source becomes the default.
    pub fn register<S: DetectionSource + 'static>(&mut self, source: S) {
        let name = source.name().to_string();
        if self.default_name.is_none() {
            self.default_name = Some(name.clone());
        }
        self.sources.insert(name, Box::new(source));
    }

    /// Set default source by name.
    pub fn set_default(&mut self, name: &str) -> Result<()> {
        if !self.sources.contains_key(name) {
            return Err(anyhow!("detection source '{}' not registered", name));
        }
        self.default_name = Some(name.to_string());
        Ok(())
    }

    pub fn default_name(&self) -> Option<&str> {
        self.default_name.as_deref()
    }

    /// List registered sources, sorted by name.
    pub fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sources.keys().cloned().collect();
        names.sort();
        names
    }

    /// Remove and return a source by name.
    pub fn take(&mut self, name: &str) -> Result<Box<dyn DetectionSource>> {
        let source = self
            .sources
            .remove(name)
            .ok_or_else(|| anyhow!("detection source '{}' not registered", name))?;
        if self.default_name.as_deref() == Some(name) {
            self.default_name = None;
        }
        Ok(source)
    }

    /// Remove and return the default source.
    pub fn take_default(&mut self) -> Result<Box<dyn DetectionSource>> {
        let name = self
            .default_name
            .clone()
            .ok_or_else(|| anyhow!("no default detection source"))?;
        self.take(&name)
    }
}

impl Default for SourceRegistry {
    fn default() -> Self {
        Self::new()
    }
}
