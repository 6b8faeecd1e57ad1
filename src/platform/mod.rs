//! Platform abstraction layer
//!
//! Asset loading differs between the browser (HTTP fetch, async) and native
//! builds (filesystem, sync). Both end in the same `LevelSet` and `Config`.

use crate::config::Config;
use crate::level::{LevelError, LevelManifest, LevelSet};

/// Level manifest, relative to the asset root
pub const MANIFEST_PATH: &str = "levels/manifest.json";
/// Optional tuning file, relative to the asset root
pub const CONFIG_PATH: &str = "config.json";

/// Directory part of a path ("" for a bare file name)
pub fn parent_dir(path: &str) -> &str {
    path.rfind('/').map_or("", |i| &path[..i])
}

/// Look up one key in a `?a=b&c=d` query string
pub fn query_param<'a>(search: &'a str, key: &str) -> Option<&'a str> {
    search
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == key)
        .map(|(_, v)| v)
}

/// Parse the config file text; a missing file means defaults
fn config_from(text: Option<String>) -> Config {
    match text {
        Some(text) => Config::from_json_or_default(&text),
        None => {
            log::info!("No {}, using default tuning", CONFIG_PATH);
            Config::default()
        }
    }
}

#[cfg(target_arch = "wasm32")]
mod web {
    use wasm_bindgen::JsCast;
    use wasm_bindgen_futures::JsFuture;
    use web_sys::{Request, RequestInit, RequestMode, Response};

    use super::*;

    fn fetch_error(path: &str, reason: impl std::fmt::Debug) -> LevelError {
        LevelError::Fetch {
            path: path.to_string(),
            reason: format!("{:?}", reason),
        }
    }

    /// GET a text resource relative to the page
    pub async fn fetch_text(path: &str) -> Result<String, LevelError> {
        let opts = RequestInit::new();
        opts.set_method("GET");
        opts.set_mode(RequestMode::SameOrigin);

        let request =
            Request::new_with_str_and_init(path, &opts).map_err(|e| fetch_error(path, e))?;
        let window = web_sys::window().ok_or_else(|| fetch_error(path, "no window"))?;
        let resp_value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| fetch_error(path, e))?;
        let resp: Response = resp_value.dyn_into().map_err(|e| fetch_error(path, e))?;
        if !resp.ok() {
            return Err(fetch_error(path, resp.status()));
        }
        let text_promise = resp.text().map_err(|e| fetch_error(path, e))?;
        JsFuture::from(text_promise)
            .await
            .map_err(|e| fetch_error(path, e))?
            .as_string()
            .ok_or_else(|| fetch_error(path, "body is not text"))
    }

    /// Fetch the manifest, then every level it lists, in order
    pub async fn load_levels(root: &str) -> Result<LevelSet, LevelError> {
        let manifest_path = LevelManifest::resolve(root, MANIFEST_PATH);
        let manifest = LevelManifest::from_json(&fetch_text(&manifest_path).await?)?;
        let base = parent_dir(&manifest_path);

        let mut levels = Vec::with_capacity(manifest.levels.len());
        for entry in &manifest.levels {
            let text = fetch_text(&LevelManifest::resolve(base, &entry.file)).await?;
            levels.push(entry.parse(&text)?);
        }
        log::info!("Loaded {} levels from {}", levels.len(), manifest_path);
        LevelSet::new(levels)
    }

    /// Fetch the tuning file; missing or broken files fall back to defaults
    pub async fn load_config(root: &str) -> Config {
        let path = LevelManifest::resolve(root, CONFIG_PATH);
        config_from(fetch_text(&path).await.ok())
    }

    /// The page's `location.search`
    pub fn location_search() -> String {
        web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default()
    }
}

#[cfg(target_arch = "wasm32")]
pub use web::{fetch_text, load_config, load_levels, location_search};

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::path::Path;

    use super::*;

    /// Read a text file from disk
    pub fn read_text(path: &str) -> Result<String, LevelError> {
        std::fs::read_to_string(Path::new(path)).map_err(|source| LevelError::Io {
            path: path.to_string(),
            source,
        })
    }

    /// Read the manifest under `root` and every level it lists
    pub fn load_levels(root: &str) -> Result<LevelSet, LevelError> {
        let manifest_path = LevelManifest::resolve(root, MANIFEST_PATH);
        let manifest = LevelManifest::from_json(&read_text(&manifest_path)?)?;
        let levels = manifest.load_with(parent_dir(&manifest_path), read_text)?;
        log::info!("Loaded {} levels from {}", levels.len(), manifest_path);
        Ok(levels)
    }

    /// Read the tuning file under `root`; missing files mean defaults
    pub fn load_config(root: &str) -> Config {
        let path = LevelManifest::resolve(root, CONFIG_PATH);
        config_from(read_text(&path).ok())
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub use native::{load_config, load_levels, read_text};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parent_dir() {
        assert_eq!(parent_dir("assets/levels/manifest.json"), "assets/levels");
        assert_eq!(parent_dir("manifest.json"), "");
    }

    #[test]
    fn test_query_param() {
        assert_eq!(query_param("?quality=low&x=1", "quality"), Some("low"));
        assert_eq!(query_param("x=1&quality=high", "quality"), Some("high"));
        assert_eq!(query_param("", "quality"), None);
        assert_eq!(query_param("?qualitylow", "quality"), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_load_from_disk() {
        let root = std::env::temp_dir().join(format!("sky-racer-assets-{}", std::process::id()));
        let levels_dir = root.join("levels");
        std::fs::create_dir_all(&levels_dir).unwrap();
        std::fs::write(
            levels_dir.join("manifest.json"),
            r#"{ "levels": [ { "name": "Disk", "file": "disk.txt" } ] }"#,
        )
        .unwrap();
        std::fs::write(levels_dir.join("disk.txt"), "1111111\n2222222\n").unwrap();

        let root_str = root.to_str().unwrap();
        let levels = load_levels(root_str).unwrap();
        assert_eq!(levels.len(), 1);
        assert_eq!(levels.get(0).name, "Disk");
        assert_eq!(levels.get(0).len(), 2);

        // No config.json in this root
        let config = load_config(root_str);
        assert_eq!(config.physics, Config::default().physics);

        assert!(matches!(
            read_text(&format!("{}/missing.txt", root_str)),
            Err(LevelError::Io { .. })
        ));

        std::fs::remove_dir_all(&root).unwrap();
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_bundled_assets_load() {
        let root = concat!(env!("CARGO_MANIFEST_DIR"), "/assets");
        let levels = load_levels(root).unwrap();
        assert_eq!(levels.len(), 3);
        for i in 0..levels.len() {
            assert!(!levels.get(i).is_empty());
        }
        assert_eq!(load_config(root).physics, Config::default().physics);
    }
}
