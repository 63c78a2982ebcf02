use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::error::{ManimalError, ManimalResult};
use crate::publish::{is_clip, sorted_entries, topic_dirs};

/// File name of the manifest at the root of the publish directory.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Snapshot of what the publish directory holds, consumed by the web front end.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    pub generated_at: String,
    /// Topic -> clip file names, both sorted.
    pub assets: BTreeMap<String, Vec<String>>,
}

/// What the manifest step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ManifestOutcome {
    /// The publish directory does not exist.
    Skipped { missing: PathBuf },
    Written { path: PathBuf, manifest: Manifest },
}

impl Manifest {
    /// Scan `publish_dir` and stamp the result with the current local time.
    pub fn scan(publish_dir: &Path) -> ManimalResult<Self> {
        Self::scan_at(publish_dir, chrono::Local::now().to_rfc3339())
    }

    /// Scan `publish_dir` with an explicit timestamp.
    pub fn scan_at(publish_dir: &Path, generated_at: String) -> ManimalResult<Self> {
        let mut assets = BTreeMap::new();
        for topic in topic_dirs(publish_dir)? {
            let dir = topic.path();
            let mut names = Vec::new();
            for clip in sorted_entries(&dir)? {
                if is_clip(&clip.path()) {
                    names.push(clip.file_name().to_string_lossy().into_owned());
                }
            }
            assets.insert(topic.file_name().to_string_lossy().into_owned(), names);
        }
        Ok(Self {
            generated_at,
            assets,
        })
    }

    pub fn to_json(&self) -> ManimalResult<String> {
        let mut s = serde_json::to_string_pretty(self)
            .map_err(|e| ManimalError::serde(format!("encode manifest JSON: {e}")))?;
        s.push('\n');
        Ok(s)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ManimalResult<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            ManimalError::filesystem(format!("read manifest '{}': {e}", path.display()))
        })?;
        serde_json::from_slice(&bytes)
            .map_err(|e| ManimalError::serde(format!("parse manifest JSON: {e}")))
    }

    /// Replace whatever is at `path` with this manifest.
    pub fn write(&self, path: &Path) -> ManimalResult<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|e| {
            ManimalError::filesystem(format!("write manifest '{}': {e}", path.display()))
        })
    }
}

/// Rescan `publish_dir` and rewrite `<publish_dir>/manifest.json`.
pub fn write_manifest(publish_dir: &Path) -> ManimalResult<ManifestOutcome> {
    if !publish_dir.is_dir() {
        return Ok(ManifestOutcome::Skipped {
            missing: publish_dir.to_path_buf(),
        });
    }

    let manifest = Manifest::scan(publish_dir)?;
    let path = publish_dir.join(MANIFEST_FILE);
    manifest.write(&path)?;
    tracing::info!(
        path = %path.display(),
        topics = manifest.assets.len(),
        "manifest written"
    );
    Ok(ManifestOutcome::Written { path, manifest })
}

#[cfg(test)]
#[path = "../tests/unit/manifest.rs"]
mod tests;
