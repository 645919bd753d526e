use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    timelines: HashMap<String, TimelineEntry>,
}

/// A manifest entry: either the document path alone, or the document plus a
/// recorded outputs table.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum TimelineEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        expected: Option<String>,
    },
}

impl TimelineEntry {
    fn named(name: &str) -> Result<&'static TimelineEntry> {
        MANIFEST
            .timelines
            .get(name)
            .ok_or_else(|| anyhow!("no timeline fixture named '{name}' in manifest"))
    }

    fn document(&self) -> PathBuf {
        let rel = match self {
            TimelineEntry::Path(path) | TimelineEntry::Detailed { path, .. } => path,
        };
        in_fixtures_dir(rel)
    }

    fn expected(&self) -> Option<PathBuf> {
        match self {
            TimelineEntry::Path(_) => None,
            TimelineEntry::Detailed { expected, .. } => expected.as_deref().map(in_fixtures_dir),
        }
    }
}

fn in_fixtures_dir(rel: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("../../../fixtures")
        .join(rel)
}

fn read_text(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    serde_json::from_str(&read_text(path)?)
        .with_context(|| format!("decoding {} as JSON", path.display()))
}

/// Timeline documents and, where recorded, their expected compiled outputs.
pub mod timelines {
    use super::*;

    /// Manifest names in sorted order.
    pub fn keys() -> Vec<String> {
        let mut keys: Vec<String> = MANIFEST.timelines.keys().cloned().collect();
        keys.sort();
        keys
    }

    pub fn json(name: &str) -> Result<String> {
        read_text(&TimelineEntry::named(name)?.document())
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        read_json(&TimelineEntry::named(name)?.document())
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        Ok(TimelineEntry::named(name)?.document())
    }

    /// Expected outputs document (property -> committed values), if recorded.
    pub fn expected<T: DeserializeOwned>(name: &str) -> Result<Option<T>> {
        TimelineEntry::named(name)?
            .expected()
            .map(|path| read_json(&path))
            .transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::timelines;

    #[test]
    fn manifest_entries_resolve() {
        let keys = timelines::keys();
        assert!(keys.contains(&"card-flip".to_string()));
        for name in &keys {
            assert!(timelines::path(name).unwrap().is_file(), "{name}");
        }
        assert!(timelines::expected::<serde_json::Value>("card-flip")
            .unwrap()
            .is_none());
        assert!(timelines::expected::<serde_json::Value>("fade-then-slide")
            .unwrap()
            .is_some());
        assert!(timelines::json("missing").is_err());
    }
}
