//! Manifest parsing (`kiln.toml`).
//!
//! The build core consumes plain [`LibraryDescriptor`] data; this module
//! produces it. A manifest declares output directories and one `[[library]]`
//! table per library, optionally restricted to specific host platforms.
//!
//! Shape violations (a `sources` value that is not an array, a
//! `dependency_overrides` value that is not a table of lists) are caught in
//! a raw pre-pass before typed deserialization, so a malformed manifest
//! fails with a configuration error before any build work starts.

use crate::descriptor::{LibraryDescriptor, Macro};
use crate::error::{BuildError, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Host platform family, selected once at startup and passed as plain data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Windows,
    Darwin,
    Linux,
}

impl Platform {
    /// The platform this process is running on. Anything that is neither
    /// Windows nor macOS is treated as Linux for descriptor selection.
    pub fn host() -> Self {
        if cfg!(target_os = "windows") {
            Platform::Windows
        } else if cfg!(target_os = "macos") {
            Platform::Darwin
        } else {
            Platform::Linux
        }
    }
}

#[derive(Deserialize, Debug, Default)]
pub struct Manifest {
    #[serde(default)]
    pub package: PackageConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default, rename = "library")]
    pub libraries: Vec<LibraryConfig>,
}

#[derive(Deserialize, Debug, Default)]
pub struct PackageConfig {
    #[serde(default)]
    pub name: String,
}

/// Output locations, all manifest-relative unless absolute.
#[derive(Deserialize, Debug)]
pub struct OutputConfig {
    /// Intermediate object directory; reused across runs for incremental
    /// builds. Default `build/obj`.
    #[serde(default = "default_obj_dir")]
    pub obj_dir: PathBuf,
    /// Finished archives and shared objects. Default `build/lib`.
    #[serde(default = "default_lib_dir")]
    pub lib_dir: PathBuf,
    /// Where shared artifacts are mirrored after a successful build, if set.
    pub publish_dir: Option<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        OutputConfig {
            obj_dir: default_obj_dir(),
            lib_dir: default_lib_dir(),
            publish_dir: None,
        }
    }
}

fn default_obj_dir() -> PathBuf {
    PathBuf::from("build").join("obj")
}

fn default_lib_dir() -> PathBuf {
    PathBuf::from("build").join("lib")
}

/// One `[[library]]` table. Maps one-to-one onto [`LibraryDescriptor`],
/// plus `source_dir` scanning and a `platforms` filter.
#[derive(Deserialize, Debug, Default)]
pub struct LibraryConfig {
    pub name: String,
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Directory scanned for `.c`/`.cc`/`.cpp`/`.cxx` files, appended to
    /// `sources` in sorted order.
    pub source_dir: Option<PathBuf>,
    #[serde(default)]
    pub dependency_overrides: BTreeMap<String, Vec<PathBuf>>,
    #[serde(default)]
    pub include_dirs: Vec<PathBuf>,
    /// `NAME` or `NAME=VALUE` strings.
    #[serde(default)]
    pub macros: Vec<String>,
    #[serde(default)]
    pub compiler_preargs: Vec<String>,
    #[serde(default)]
    pub compiler_postargs: Vec<String>,
    #[serde(default)]
    pub linker_preargs: Vec<String>,
    #[serde(default)]
    pub linker_postargs: Vec<String>,
    #[serde(default)]
    pub link_libraries: Vec<String>,
    #[serde(default)]
    pub library_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub shared: bool,
    /// When present, the library only builds on the listed platforms.
    pub platforms: Option<Vec<Platform>>,
}

impl Manifest {
    /// Reads and parses a manifest file. Performs no filesystem writes.
    pub fn load(path: &Path) -> Result<Manifest> {
        let text = fs::read_to_string(path).map_err(|e| {
            BuildError::Configuration(format!("could not read {}: {}", path.display(), e))
        })?;
        Manifest::parse(&text)
    }

    /// Parses manifest text: raw shape validation first, typed
    /// deserialization second.
    pub fn parse(text: &str) -> Result<Manifest> {
        let raw: toml::Value = toml::from_str(text)
            .map_err(|e| BuildError::Configuration(format!("manifest is not valid TOML: {}", e)))?;
        validate_shape(&raw)?;

        toml::from_str(text).map_err(|e| BuildError::Configuration(e.to_string()))
    }

    /// Produces the descriptor list for one host platform, with every path
    /// resolved under `root` (the manifest's directory). Descriptors are
    /// validated here, before any build work.
    pub fn descriptors(&self, platform: Platform, root: &Path) -> Result<Vec<LibraryDescriptor>> {
        let mut descriptors = Vec::new();
        for lib in &self.libraries {
            if let Some(platforms) = &lib.platforms {
                if !platforms.contains(&platform) {
                    continue;
                }
            }
            let desc = lib.to_descriptor(root)?;
            desc.validate()?;
            descriptors.push(desc);
        }
        Ok(descriptors)
    }
}

impl LibraryConfig {
    fn to_descriptor(&self, root: &Path) -> Result<LibraryDescriptor> {
        let mut sources: Vec<PathBuf> = self
            .sources
            .iter()
            .map(|s| resolve_under(root, s))
            .collect();
        if let Some(dir) = &self.source_dir {
            sources.extend(scan_sources(&resolve_under(root, dir)));
        }

        // Override keys name sources; they must resolve the same way the
        // source list does so group lookup matches.
        let mut overrides = BTreeMap::new();
        for (key, deps) in &self.dependency_overrides {
            let resolved_key = if key.is_empty() {
                String::new()
            } else {
                resolve_under(root, Path::new(key)).display().to_string()
            };
            let resolved_deps = deps.iter().map(|d| resolve_under(root, d)).collect();
            overrides.insert(resolved_key, resolved_deps);
        }

        Ok(LibraryDescriptor {
            name: self.name.clone(),
            sources,
            dependency_overrides: overrides,
            include_dirs: self
                .include_dirs
                .iter()
                .map(|d| resolve_under(root, d))
                .collect(),
            macros: self.macros.iter().map(|m| Macro::parse(m)).collect(),
            compiler_preargs: self.compiler_preargs.clone(),
            compiler_postargs: self.compiler_postargs.clone(),
            linker_preargs: self.linker_preargs.clone(),
            linker_postargs: self.linker_postargs.clone(),
            link_libraries: self.link_libraries.clone(),
            library_dirs: self
                .library_dirs
                .iter()
                .map(|d| resolve_under(root, d))
                .collect(),
            is_shared: self.shared,
        })
    }
}

fn resolve_under(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}

/// Collects C/C++ sources under `dir`, sorted for a deterministic build
/// order.
fn scan_sources(dir: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_map(|e| e.ok()) {
        let path = entry.path();
        if let Some(ext) = path.extension() {
            let s = ext.to_string_lossy();
            if ["c", "cc", "cpp", "cxx"].contains(&s.as_ref()) {
                found.push(path.to_owned());
            }
        }
    }
    found.sort();
    found
}

/// Checks the raw shape of every `[[library]]` table before typed
/// deserialization, so the error names the field the way the manifest
/// author wrote it.
fn validate_shape(raw: &toml::Value) -> Result<()> {
    let Some(libraries) = raw.get("library") else {
        return Ok(());
    };
    let toml::Value::Array(entries) = libraries else {
        return Err(BuildError::Configuration(
            "'library' must be an array of tables ([[library]])".to_string(),
        ));
    };

    for entry in entries {
        let toml::Value::Table(table) = entry else {
            return Err(BuildError::Configuration(
                "each [[library]] entry must be a table".to_string(),
            ));
        };
        let name = table
            .get("name")
            .and_then(|v| v.as_str())
            .unwrap_or("<unnamed>");

        let has_source_dir = matches!(table.get("source_dir"), Some(toml::Value::String(_)));
        match table.get("sources") {
            Some(toml::Value::Array(items)) => {
                if !items.iter().all(|i| i.is_str()) {
                    return Err(sources_shape_error(name));
                }
                if items.is_empty() && !has_source_dir {
                    return Err(sources_shape_error(name));
                }
            }
            Some(_) => return Err(sources_shape_error(name)),
            None if has_source_dir => {}
            None => return Err(sources_shape_error(name)),
        }

        match table.get("dependency_overrides") {
            None => {}
            Some(toml::Value::Table(overrides)) => {
                for value in overrides.values() {
                    if !value.is_array() {
                        return Err(overrides_shape_error(name));
                    }
                }
            }
            Some(_) => return Err(overrides_shape_error(name)),
        }
    }
    Ok(())
}

fn sources_shape_error(name: &str) -> BuildError {
    BuildError::Configuration(format!(
        "in library '{}', 'sources' must be present and be a list of source filenames",
        name
    ))
}

fn overrides_shape_error(name: &str) -> BuildError {
    BuildError::Configuration(format!(
        "in library '{}', 'dependency_overrides' must be a table of type 'source: list'",
        name
    ))
}
