use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::catalog::EntryRef;
use crate::foundation::error::{ManimalError, ManimalResult};
use crate::render::{RenderRequest, Renderer, clip_file_name};

/// Where scene sources live and where rendered clips are collected.
#[derive(Clone, Debug)]
pub struct OutputLayout {
    /// Root of the scene sources, one subdirectory per topic.
    pub scenes_dir: PathBuf,
    /// Working output area, one subdirectory per topic.
    pub output_dir: PathBuf,
}

impl OutputLayout {
    pub fn source_path(&self, topic: &str, file: &str) -> PathBuf {
        self.scenes_dir.join(topic).join(file)
    }

    pub fn topic_dir(&self, topic: &str) -> PathBuf {
        self.output_dir.join(topic)
    }

    pub fn clip_path(&self, topic: &str, entry: &str) -> PathBuf {
        self.topic_dir(topic).join(clip_file_name(entry))
    }

    /// The renderer runs in the output area, so its `media/` tree sits next to the topic dirs.
    pub fn render_root(&self) -> PathBuf {
        self.output_dir.clone()
    }

    /// Create the output area and one directory per topic. Existing content is left alone.
    pub fn setup_output_dirs<'a>(
        &self,
        topics: impl IntoIterator<Item = &'a str>,
    ) -> ManimalResult<()> {
        for topic in topics {
            let dir = self.topic_dir(topic);
            fs::create_dir_all(&dir)
                .with_context(|| format!("create output dir '{}'", dir.display()))?;
        }
        Ok(())
    }
}

/// A single entry that could not be produced.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntryFailure {
    pub topic: String,
    pub file: String,
    pub entry: String,
    pub reason: String,
}

impl std::fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}/{} {}: {}",
            self.topic, self.file, self.entry, self.reason
        )
    }
}

/// Render one entry and move the clip to `<output_dir>/<topic>/<entry>.mp4`.
///
/// One attempt only. Returns the final clip path.
#[tracing::instrument(skip_all, fields(topic = at.topic, file = at.file, entry = at.entry))]
pub fn generate_entry(
    layout: &OutputLayout,
    renderer: &mut dyn Renderer,
    at: EntryRef<'_>,
) -> ManimalResult<PathBuf> {
    let source = layout.source_path(at.topic, at.file);
    if !source.is_file() {
        return Err(ManimalError::config(format!(
            "scene file not found: '{}'",
            source.display()
        )));
    }
    let source = std::path::absolute(&source)
        .with_context(|| format!("resolve scene path '{}'", source.display()))?;

    let work_dir = layout.render_root();
    fs::create_dir_all(&work_dir)
        .with_context(|| format!("create render dir '{}'", work_dir.display()))?;

    let req = RenderRequest {
        topic: at.topic.to_string(),
        file: at.file.to_string(),
        entry: at.entry.to_string(),
        source,
        work_dir,
    };

    tracing::info!("rendering");
    renderer.render(&req)?;

    let produced = renderer.expected_output(&req);
    if !produced.is_file() {
        return Err(ManimalError::render(format!(
            "renderer reported success but '{}' does not exist",
            produced.display()
        )));
    }

    let target = layout.clip_path(at.topic, at.entry);
    relocate(&produced, &target)?;
    tracing::info!(path = %target.display(), "generated");
    Ok(target)
}

/// Move `from` to `to`, replacing `to`. Falls back to copy + delete across filesystems.
pub(crate) fn relocate(from: &Path, to: &Path) -> ManimalResult<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }

    if fs::rename(from, to).is_ok() {
        return Ok(());
    }

    fs::copy(from, to).map_err(|e| {
        ManimalError::filesystem(format!(
            "move '{}' -> '{}': {e}",
            from.display(),
            to.display()
        ))
    })?;
    fs::remove_file(from).map_err(|e| {
        ManimalError::filesystem(format!(
            "remove moved clip '{}': {e}",
            from.display()
        ))
    })?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/generate.rs"]
mod tests;
