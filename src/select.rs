use std::fmt;

use crate::catalog::{Catalog, FileEntries};

/// Optional narrowing of the catalog supplied by the caller.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SelectionCriteria {
    pub topic: Option<String>,
    pub file: Option<String>,
    pub entry: Option<String>,
}

/// A selector that matched nothing in its scope.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Unresolved {
    Topic {
        topic: String,
    },
    File {
        topic: Option<String>,
        file: String,
    },
    Entry {
        topic: Option<String>,
        file: Option<String>,
        entry: String,
    },
}

impl fmt::Display for Unresolved {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Unresolved::Topic { topic } => write!(f, "unknown topic '{topic}'"),
            Unresolved::File { topic, file } => match topic {
                Some(t) => write!(f, "file '{file}' not found in topic '{t}'"),
                None => write!(f, "file '{file}' not found in any topic"),
            },
            Unresolved::Entry { topic, file, entry } => match (topic, file) {
                (Some(t), Some(fl)) => write!(f, "entry '{entry}' not found in {t}/{fl}"),
                (Some(t), None) => write!(f, "entry '{entry}' not found in topic '{t}'"),
                (None, Some(fl)) => write!(f, "entry '{entry}' not found in file '{fl}'"),
                (None, None) => write!(f, "entry '{entry}' not found in any file"),
            },
        }
    }
}

/// Outcome of applying [`SelectionCriteria`] to a catalog.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Selection {
    /// No selector was supplied: the whole catalog.
    All(Catalog),
    /// At least one selector was supplied.
    Filtered {
        catalog: Catalog,
        unresolved: Vec<Unresolved>,
    },
}

impl Selection {
    pub fn catalog(&self) -> &Catalog {
        match self {
            Selection::All(c) => c,
            Selection::Filtered { catalog, .. } => catalog,
        }
    }

    pub fn into_catalog(self) -> Catalog {
        match self {
            Selection::All(c) => c,
            Selection::Filtered { catalog, .. } => catalog,
        }
    }

    pub fn unresolved(&self) -> &[Unresolved] {
        match self {
            Selection::All(_) => &[],
            Selection::Filtered { unresolved, .. } => unresolved,
        }
    }

    /// True when selectors were given and nothing survived them.
    pub fn is_filtered_to_nothing(&self) -> bool {
        matches!(self, Selection::Filtered { catalog, .. } if catalog.is_empty())
    }
}

impl SelectionCriteria {
    pub fn is_empty(&self) -> bool {
        self.topic.is_none() && self.file.is_none() && self.entry.is_none()
    }

    /// Narrow `catalog` to the entries matching every supplied selector.
    ///
    /// A selector that matches nothing is recorded in the result instead of failing; each filter
    /// level is reported at most once, and not at all when a coarser level already missed.
    pub fn apply(&self, catalog: &Catalog) -> Selection {
        if self.is_empty() {
            return Selection::All(catalog.clone());
        }

        let mut out = Catalog::new();
        let mut unresolved = Vec::new();

        let topics: Vec<(&str, &FileEntries)> = match self.topic.as_deref() {
            Some(t) => match catalog.topic(t) {
                Some(files) => vec![(t, files)],
                None => {
                    unresolved.push(Unresolved::Topic {
                        topic: t.to_string(),
                    });
                    vec![]
                }
            },
            None => catalog.topics().collect(),
        };
        if topics.is_empty() {
            return Selection::Filtered {
                catalog: out,
                unresolved,
            };
        }

        let mut file_matched = false;
        for (topic, files) in topics {
            let mut kept = FileEntries::new();
            for (file, entries) in files {
                if self.file.as_ref().is_some_and(|want| want != file) {
                    continue;
                }
                file_matched = true;

                match self.entry.as_ref() {
                    Some(want) => {
                        if entries.contains(want) {
                            kept.insert(file.clone(), vec![want.clone()]);
                        }
                    }
                    None => {
                        kept.insert(file.clone(), entries.clone());
                    }
                }
            }
            if !kept.is_empty() {
                out.insert_files(topic, kept);
            }
        }

        if let Some(file) = &self.file
            && !file_matched
        {
            unresolved.push(Unresolved::File {
                topic: self.topic.clone(),
                file: file.clone(),
            });
        } else if let Some(entry) = &self.entry
            && out.is_empty()
        {
            unresolved.push(Unresolved::Entry {
                topic: self.topic.clone(),
                file: self.file.clone(),
                entry: entry.clone(),
            });
        }

        Selection::Filtered {
            catalog: out,
            unresolved,
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/select.rs"]
mod tests;
