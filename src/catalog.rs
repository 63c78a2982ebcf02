use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::foundation::error::{ManimalError, ManimalResult};

/// Ordered mapping from source-file name to the entries (scene class names) it defines.
pub type FileEntries = IndexMap<String, Vec<String>>;

/// Operator-defined table of renderable entries: topic -> source file -> entries.
///
/// Insertion order is preserved so listing and generation follow the order the catalog was
/// written in. The catalog is read once per invocation and never mutated afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    topics: IndexMap<String, FileEntries>,
}

/// One renderable unit addressed by its full catalog coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EntryRef<'a> {
    /// Topic the entry belongs to.
    pub topic: &'a str,
    /// Source file (relative to the topic's scene directory).
    pub file: &'a str,
    /// Entry name, also the output file stem.
    pub entry: &'a str,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The lesson table shipped with the platform.
    pub fn builtin() -> Self {
        let mut c = Self::new();
        c.insert(
            "linear_regression",
            "gradient_descent.py",
            ["GradientDescentIntro", "LinearRegressionVisualization"],
        );
        c.insert(
            "linear_regression",
            "quick_explanation.py",
            ["LinearRegression30Second", "LinearRegressionStory"],
        );
        c.insert(
            "classification",
            "svm_visualization.py",
            ["SVMIntroduction", "KernelTrick"],
        );
        c.insert(
            "neural_network",
            "backpropagation.py",
            ["BackpropagationViz", "NeuralNetworkTraining"],
        );
        c.insert(
            "neural_network",
            "text_encoder.py",
            ["TextEncoderExplained"],
        );
        c.insert(
            "neural_network",
            "network_architecture.py",
            ["NetworkArchitectureIntro"],
        );
        c.insert(
            "neural_network",
            "training_process.py",
            ["TrainingProcessDetail"],
        );
        c
    }

    /// Parse a catalog from JSON shaped as `{ topic: { file: [entry, ...] } }`.
    pub fn from_reader<R: std::io::Read>(r: R) -> ManimalResult<Self> {
        let catalog: Catalog = serde_json::from_reader(r)
            .map_err(|e| ManimalError::serde(format!("parse catalog JSON: {e}")))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_path(path: impl AsRef<Path>) -> ManimalResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            ManimalError::config(format!("open catalog JSON '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Append entries under `topic`/`file`, creating either level if needed.
    pub fn insert<I, S>(&mut self, topic: &str, file: &str, entries: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .entry(file.to_string())
            .or_default()
            .extend(entries.into_iter().map(Into::into));
    }

    /// Reject names that cannot map onto paths and duplicate entries within one file.
    pub fn validate(&self) -> ManimalResult<()> {
        for (topic, files) in &self.topics {
            check_name("topic", topic)?;
            for (file, entries) in files {
                check_name("file", file)?;
                for (i, entry) in entries.iter().enumerate() {
                    check_name("entry", entry)?;
                    if entries[..i].contains(entry) {
                        return Err(ManimalError::config(format!(
                            "duplicate entry '{entry}' in {topic}/{file}"
                        )));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    pub fn topic(&self, name: &str) -> Option<&FileEntries> {
        self.topics.get(name)
    }

    pub fn topics(&self) -> impl Iterator<Item = (&str, &FileEntries)> {
        self.topics.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn topic_names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// Every entry in catalog order.
    pub fn entries(&self) -> impl Iterator<Item = EntryRef<'_>> {
        self.topics.iter().flat_map(|(topic, files)| {
            files.iter().flat_map(move |(file, entries)| {
                entries.iter().map(move |entry| EntryRef {
                    topic,
                    file,
                    entry,
                })
            })
        })
    }

    pub fn entry_count(&self) -> usize {
        self.topics
            .values()
            .flat_map(|files| files.values())
            .map(Vec::len)
            .sum()
    }

    /// Indented topic / file / entry listing, one name per line.
    pub fn tree(&self) -> String {
        let mut out = String::new();
        for (topic, files) in &self.topics {
            out.push_str(topic);
            out.push('\n');
            for (file, entries) in files {
                out.push_str("  ");
                out.push_str(file);
                out.push('\n');
                for entry in entries {
                    out.push_str("    ");
                    out.push_str(entry);
                    out.push('\n');
                }
            }
        }
        out
    }

    pub(crate) fn insert_files(&mut self, topic: &str, files: FileEntries) {
        self.topics.insert(topic.to_string(), files);
    }
}

fn check_name(kind: &str, name: &str) -> ManimalResult<()> {
    if name.trim().is_empty() {
        return Err(ManimalError::config(format!("{kind} name must be non-empty")));
    }
    if name.contains(['/', '\\']) || name == "." || name == ".." {
        return Err(ManimalError::config(format!(
            "{kind} name '{name}' must be a single path component"
        )));
    }
    Ok(())
}

#[cfg(test)]
#[path = "../tests/unit/catalog.rs"]
mod tests;
