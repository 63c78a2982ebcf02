//! Batch driver: select, render each entry, publish, write the manifest.
//!
//! Execution is strictly sequential. Every per-entry problem is recorded in the [`RunReport`]
//! and the batch moves on; the only early exit is a selection that resolves to nothing.

use std::path::PathBuf;

use crate::catalog::Catalog;
use crate::generate::{EntryFailure, OutputLayout, generate_entry};
use crate::manifest::{ManifestOutcome, write_manifest};
use crate::publish::{PublishOutcome, sync_publish};
use crate::render::Renderer;
use crate::select::{SelectionCriteria, Unresolved};

/// Filesystem locations used by a run.
#[derive(Clone, Debug)]
pub struct DriverConfig {
    pub scenes_dir: PathBuf,
    pub output_dir: PathBuf,
    /// Delivery folder read by the web app.
    pub publish_dir: PathBuf,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self {
            scenes_dir: PathBuf::from("scenes"),
            output_dir: PathBuf::from("generated"),
            publish_dir: PathBuf::from("../apps/org/public/visuals"),
        }
    }
}

impl DriverConfig {
    pub fn layout(&self) -> OutputLayout {
        OutputLayout {
            scenes_dir: self.scenes_dir.clone(),
            output_dir: self.output_dir.clone(),
        }
    }

    /// Catalog source files that do not exist under `scenes_dir`.
    pub fn missing_sources(&self, catalog: &Catalog) -> Vec<PathBuf> {
        let layout = self.layout();
        let mut missing = Vec::new();
        for (topic, files) in catalog.topics() {
            for file in files.keys() {
                let p = layout.source_path(topic, file);
                if !p.is_file() {
                    missing.push(p);
                }
            }
        }
        missing
    }
}

/// Everything a completed batch did.
#[derive(Clone, Debug, Default)]
pub struct RunReport {
    pub attempted: usize,
    /// Final clip paths in the working output area.
    pub generated: Vec<PathBuf>,
    pub failures: Vec<EntryFailure>,
    pub unresolved: Vec<Unresolved>,
    /// `None` when the publish step itself errored (already logged).
    pub publish: Option<PublishOutcome>,
    /// `None` when publishing was skipped or the manifest step errored.
    pub manifest: Option<ManifestOutcome>,
}

impl RunReport {
    pub fn summary(&self) -> String {
        format!(
            "generated {}/{} entries",
            self.generated.len(),
            self.attempted
        )
    }
}

#[derive(Clone, Debug)]
pub enum RunOutcome {
    /// Selectors were given and matched nothing; no filesystem changes were made.
    NothingSelected { unresolved: Vec<Unresolved> },
    Completed(RunReport),
}

/// Run one batch over `catalog` narrowed by `criteria`.
pub fn run(
    cfg: &DriverConfig,
    catalog: &Catalog,
    criteria: &SelectionCriteria,
    renderer: &mut dyn Renderer,
) -> RunOutcome {
    let selection = criteria.apply(catalog);
    for u in selection.unresolved() {
        tracing::warn!("{u}");
    }
    if selection.catalog().is_empty() {
        return RunOutcome::NothingSelected {
            unresolved: selection.unresolved().to_vec(),
        };
    }

    let unresolved = selection.unresolved().to_vec();
    let selected = selection.into_catalog();
    let layout = cfg.layout();

    if let Err(e) = layout.setup_output_dirs(selected.topic_names()) {
        tracing::warn!(error = %e, "could not prepare output directories");
    }

    let mut report = RunReport {
        unresolved,
        ..RunReport::default()
    };

    tracing::info!(entries = selected.entry_count(), "starting generation");
    for at in selected.entries() {
        report.attempted += 1;
        match generate_entry(&layout, renderer, at) {
            Ok(path) => report.generated.push(path),
            Err(e) => {
                tracing::error!(
                    topic = at.topic,
                    file = at.file,
                    entry = at.entry,
                    error = %e,
                    "generation failed"
                );
                report.failures.push(EntryFailure {
                    topic: at.topic.to_string(),
                    file: at.file.to_string(),
                    entry: at.entry.to_string(),
                    reason: e.to_string(),
                });
            }
        }
    }

    report.publish = match sync_publish(&cfg.output_dir, &cfg.publish_dir) {
        Ok(outcome) => {
            match &outcome {
                PublishOutcome::Skipped { missing } => tracing::warn!(
                    missing = %missing.display(),
                    "publish destination not present, skipping copy"
                ),
                PublishOutcome::Copied { files, failures } => tracing::info!(
                    files = files.len(),
                    failed = failures.len(),
                    dir = %cfg.publish_dir.display(),
                    "published clips"
                ),
            }
            Some(outcome)
        }
        Err(e) => {
            tracing::error!(error = %e, "publish failed");
            None
        }
    };

    report.manifest = match &report.publish {
        Some(PublishOutcome::Skipped { .. }) => None,
        _ => match write_manifest(&cfg.publish_dir) {
            Ok(outcome) => Some(outcome),
            Err(e) => {
                tracing::error!(error = %e, "manifest write failed");
                None
            }
        },
    };

    RunOutcome::Completed(report)
}

#[cfg(test)]
#[path = "../tests/unit/driver.rs"]
mod tests;
