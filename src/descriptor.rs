//! Typed library descriptors.
//!
//! A [`LibraryDescriptor`] is the declarative input to the build core: one
//! named library, its source files, the extra files gating recompilation of
//! each source, and the flags that shape compilation and linking. Descriptors
//! are produced by the configuration layer (see [`crate::config`]) and are
//! read-only to the rest of the crate.

use crate::error::{BuildError, Result};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// A preprocessor macro definition, `NAME` or `NAME=VALUE`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Macro {
    pub name: String,
    pub value: Option<String>,
}

impl Macro {
    /// Parses `"NAME"` or `"NAME=VALUE"` (first `=` splits).
    pub fn parse(raw: &str) -> Self {
        match raw.split_once('=') {
            Some((name, value)) => Macro {
                name: name.to_string(),
                value: Some(value.to_string()),
            },
            None => Macro {
                name: raw.to_string(),
                value: None,
            },
        }
    }
}

/// Declarative specification of one native library.
///
/// `dependency_overrides` maps a source path to extra files whose timestamps
/// gate that source's recompilation; the empty-string key contributes
/// dependencies applied to every source in the library. All fields except
/// `name` and `sources` default to empty/false.
#[derive(Debug, Clone, Default)]
pub struct LibraryDescriptor {
    pub name: String,
    pub sources: Vec<PathBuf>,
    pub dependency_overrides: BTreeMap<String, Vec<PathBuf>>,
    pub include_dirs: Vec<PathBuf>,
    pub macros: Vec<Macro>,
    pub compiler_preargs: Vec<String>,
    pub compiler_postargs: Vec<String>,
    pub linker_preargs: Vec<String>,
    pub linker_postargs: Vec<String>,
    pub link_libraries: Vec<String>,
    pub library_dirs: Vec<PathBuf>,
    pub is_shared: bool,
}

impl LibraryDescriptor {
    pub fn new(name: impl Into<String>, sources: Vec<PathBuf>) -> Self {
        LibraryDescriptor {
            name: name.into(),
            sources,
            ..Default::default()
        }
    }

    /// Checks the descriptor invariants before any build work starts.
    ///
    /// An empty `name` or empty `sources` list is a configuration error; the
    /// typed fields already rule out the shape violations a raw manifest
    /// could carry (those are caught in [`crate::config`] before
    /// deserialization).
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(BuildError::Configuration(
                "library name must not be empty".to_string(),
            ));
        }
        if self.sources.is_empty() {
            return Err(BuildError::Configuration(format!(
                "in library '{}', 'sources' must be present and be a non-empty list of source filenames",
                self.name
            )));
        }
        Ok(())
    }

    /// Builds one dependency group per source, order-aligned with `sources`.
    ///
    /// Each group is `[source] ++ overrides[""] ++ overrides[source]`: the
    /// source itself always gates its own object, the global key applies to
    /// every source, and per-source extras come last.
    pub fn dependency_groups(&self) -> Vec<Vec<PathBuf>> {
        let global = self
            .dependency_overrides
            .get("")
            .map(Vec::as_slice)
            .unwrap_or(&[]);

        self.sources
            .iter()
            .map(|source| {
                let mut group = vec![source.clone()];
                group.extend(global.iter().cloned());
                if let Some(extra) = self.dependency_overrides.get(&source.display().to_string()) {
                    group.extend(extra.iter().cloned());
                }
                group
            })
            .collect()
    }
}
