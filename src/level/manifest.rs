//! Level manifest (`assets/levels/manifest.json`)

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{Level, LevelError, LevelSet, Palette};

/// One level entry in the manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub name: String,
    /// Path of the level text file, relative to the manifest
    pub file: String,
    /// Per-tile colour overrides (`"7": "#cc8800"`)
    #[serde(default)]
    pub palette: BTreeMap<String, String>,
}

/// Ordered list of levels
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LevelManifest {
    pub levels: Vec<ManifestEntry>,
}

impl LevelManifest {
    pub fn from_json(json: &str) -> Result<Self, LevelError> {
        let manifest: Self = serde_json::from_str(json)?;
        if manifest.levels.is_empty() {
            return Err(LevelError::EmptyManifest);
        }
        Ok(manifest)
    }

    /// Path of a level file relative to the manifest's directory
    pub fn resolve(base_dir: &str, file: &str) -> String {
        let base = base_dir.trim_end_matches('/');
        if base.is_empty() {
            file.to_string()
        } else {
            format!("{}/{}", base, file)
        }
    }

    /// Load every level with a synchronous reader (native builds and tests)
    pub fn load_with<F>(&self, base_dir: &str, mut read: F) -> Result<LevelSet, LevelError>
    where
        F: FnMut(&str) -> Result<String, LevelError>,
    {
        let mut levels = Vec::with_capacity(self.levels.len());
        for entry in &self.levels {
            let text = read(&Self::resolve(base_dir, &entry.file))?;
            levels.push(entry.parse(&text)?);
        }
        LevelSet::new(levels)
    }
}

impl ManifestEntry {
    /// Build the level from its already-loaded text
    pub fn parse(&self, text: &str) -> Result<Level, LevelError> {
        let palette = Palette::with_overrides(&self.palette)?;
        Level::parse(&self.name, text, palette)
    }
}
