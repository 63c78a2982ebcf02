use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{ManimalError, ManimalResult};
use crate::render::{RENDERER_MEDIA_DIR, VIDEO_EXT};

/// A clip (or topic directory) that could not be published.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CopyFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// What the publish step did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PublishOutcome {
    /// The destination's parent does not exist; nothing was copied.
    Skipped { missing: PathBuf },
    /// Clips copied, as destination paths, plus the ones that failed.
    Copied {
        files: Vec<PathBuf>,
        failures: Vec<CopyFailure>,
    },
}

/// Directory entries of `dir` sorted by file name. A missing `dir` yields nothing.
pub(crate) fn sorted_entries(dir: &Path) -> ManimalResult<Vec<fs::DirEntry>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut entries = fs::read_dir(dir)
        .with_context(|| format!("read dir '{}'", dir.display()))?
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("read dir '{}'", dir.display()))?;
    entries.sort_by_key(|e| e.file_name());
    Ok(entries)
}

pub(crate) fn is_clip(path: &Path) -> bool {
    path.is_file() && path.extension().is_some_and(|ext| ext == VIDEO_EXT)
}

/// Topic subdirectories of `dir`, leaving out the renderer's own output tree.
pub(crate) fn topic_dirs(dir: &Path) -> ManimalResult<Vec<fs::DirEntry>> {
    Ok(sorted_entries(dir)?
        .into_iter()
        .filter(|e| e.path().is_dir() && e.file_name() != RENDERER_MEDIA_DIR)
        .collect())
}

/// The parent the publish directory hangs off; an empty parent means the working directory.
pub fn publish_parent(publish_dir: &Path) -> PathBuf {
    match publish_dir.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Copy every clip under `output_dir/<topic>/` to `publish_dir/<topic>/`, overwriting by name.
///
/// When the publish directory's parent does not exist this is treated as a deployment without
/// a consumer and nothing is touched. A clip that fails to copy is recorded and the rest still go.
pub fn sync_publish(output_dir: &Path, publish_dir: &Path) -> ManimalResult<PublishOutcome> {
    let parent = publish_parent(publish_dir);
    if !parent.is_dir() {
        return Ok(PublishOutcome::Skipped { missing: parent });
    }

    fs::create_dir_all(publish_dir)
        .with_context(|| format!("create publish dir '{}'", publish_dir.display()))?;

    let mut files = Vec::new();
    let mut failures = Vec::new();
    for topic in topic_dirs(output_dir)? {
        let topic_src = topic.path();
        let topic_dst = publish_dir.join(topic.file_name());
        let clips = fs::create_dir_all(&topic_dst)
            .map_err(|e| {
                ManimalError::filesystem(format!(
                    "create publish dir '{}': {e}",
                    topic_dst.display()
                ))
            })
            .and_then(|()| sorted_entries(&topic_src));
        let clips = match clips {
            Ok(clips) => clips,
            Err(e) => {
                tracing::warn!(path = %topic_dst.display(), error = %e, "topic not published");
                failures.push(CopyFailure {
                    path: topic_dst,
                    reason: e.to_string(),
                });
                continue;
            }
        };

        for clip in clips {
            let src = clip.path();
            if !is_clip(&src) {
                continue;
            }
            let dst = topic_dst.join(clip.file_name());
            match fs::copy(&src, &dst) {
                Ok(_) => {
                    tracing::debug!(path = %dst.display(), "published");
                    files.push(dst);
                }
                Err(e) => {
                    let err = ManimalError::filesystem(format!(
                        "copy '{}' -> '{}': {e}",
                        src.display(),
                        dst.display()
                    ));
                    tracing::warn!(error = %err, "clip not published");
                    failures.push(CopyFailure {
                        path: dst,
                        reason: err.to_string(),
                    });
                }
            }
        }
    }

    Ok(PublishOutcome::Copied { files, failures })
}

#[cfg(test)]
#[path = "../tests/unit/publish.rs"]
mod tests;
