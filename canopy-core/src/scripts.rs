use crate::constants::SCRIPTS_FILE_NAME;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::{collections::BTreeMap, fs, io, path::Path};

/// Named shell commands from `<repo>/canopy.json`:
/// ```json
/// { "scripts": { "test": "cargo test", "dev": "npm run dev" } }
/// ```
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct ScriptMap {
    #[serde(default)]
    scripts: BTreeMap<String, String>,
}

impl ScriptMap {
    /// A missing file is an empty map; unreadable or malformed files are errors.
    pub fn load(repo_path: &Path) -> Result<Self> {
        let path = repo_path.join(SCRIPTS_FILE_NAME);
        let data = match fs::read_to_string(&path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", path.display()));
            }
        };
        serde_json::from_str(&data).with_context(|| format!("Invalid {SCRIPTS_FILE_NAME}"))
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.scripts.get(name).map(String::as_str)
    }

    /// Script names in sorted order.
    pub fn names(&self) -> Vec<String> {
        self.scripts.keys().cloned().collect()
    }

    pub fn is_empty(&self) -> bool {
        self.scripts.is_empty()
    }
}
