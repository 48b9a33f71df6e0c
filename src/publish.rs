//! Shared artifact publishing.
//!
//! After a fully successful build, shared libraries are mirrored into a
//! publish directory for downstream packaging. Static archives stay in the
//! build directory; they only exist to be consumed by later link steps in
//! the same session.

use crate::descriptor::LibraryDescriptor;
use crate::error::{BuildError, Result};
use crate::toolchain::{ArtifactKind, Toolchain};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};

/// Copies every shared library artifact from `build_dir` into `out_dir`.
///
/// `out_dir` is created recursively if absent (no error when it already
/// exists) and existing files of the same name are overwritten, so the
/// operation is idempotent. Returns the published paths.
pub fn publish_shared(
    descriptors: &[LibraryDescriptor],
    toolchain: &dyn Toolchain,
    build_dir: &Path,
    out_dir: &Path,
) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(out_dir).map_err(|e| {
        BuildError::Publish(format!(
            "could not create publish directory {}: {}",
            out_dir.display(),
            e
        ))
    })?;

    let mut published = Vec::new();
    for desc in descriptors {
        if !desc.is_shared {
            continue;
        }

        let file_name = toolchain.library_file_name(&desc.name, ArtifactKind::Shared);
        let from = build_dir.join(&file_name);
        let to = out_dir.join(&file_name);

        fs::copy(&from, &to).map_err(|e| {
            BuildError::Publish(format!(
                "could not copy {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })?;

        println!("   {} Published {}", "📤".green(), to.display());
        published.push(to);
    }
    Ok(published)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::Macro;
    use crate::toolchain::ToolchainFamily;

    struct NamingOnly;

    impl Toolchain for NamingOnly {
        fn family(&self) -> ToolchainFamily {
            ToolchainFamily::Gnu
        }

        fn object_file_names(&self, _sources: &[PathBuf], _out_dir: &Path) -> Vec<PathBuf> {
            unimplemented!("publishing never compiles")
        }

        fn compile(
            &self,
            _sources: &[PathBuf],
            _out_dir: &Path,
            _macros: &[Macro],
            _include_dirs: &[PathBuf],
            _preargs: &[String],
            _postargs: &[String],
            _debug: bool,
        ) -> Result<Vec<PathBuf>> {
            unimplemented!("publishing never compiles")
        }

        fn create_static_archive(
            &self,
            _objects: &[PathBuf],
            _name: &str,
            _out_dir: &Path,
            _debug: bool,
        ) -> Result<PathBuf> {
            unimplemented!("publishing never links")
        }

        fn link_shared_library(
            &self,
            _objects: &[PathBuf],
            _name: &str,
            _out_dir: &Path,
            _debug: bool,
            _preargs: &[String],
            _postargs: &[String],
            _libraries: &[String],
            _library_dirs: &[PathBuf],
        ) -> Result<PathBuf> {
            unimplemented!("publishing never links")
        }

        fn library_file_name(&self, name: &str, kind: ArtifactKind) -> String {
            match kind {
                ArtifactKind::Static => format!("lib{}.a", name),
                ArtifactKind::Shared => format!("lib{}.so", name),
            }
        }
    }

    fn shared_descriptor(name: &str) -> LibraryDescriptor {
        let mut desc = LibraryDescriptor::new(name, vec![PathBuf::from("x.c")]);
        desc.is_shared = true;
        desc
    }

    #[test]
    fn test_publishes_shared_and_skips_static() {
        let tmp = tempfile::tempdir().unwrap();
        let build_dir = tmp.path().join("lib");
        let out_dir = tmp.path().join("publish");
        fs::create_dir_all(&build_dir).unwrap();
        fs::write(build_dir.join("libshared.so"), b"shared bytes").unwrap();
        fs::write(build_dir.join("libarchive.a"), b"archive bytes").unwrap();

        let static_desc = LibraryDescriptor::new("archive", vec![PathBuf::from("x.c")]);
        let published = publish_shared(
            &[shared_descriptor("shared"), static_desc],
            &NamingOnly,
            &build_dir,
            &out_dir,
        )
        .unwrap();

        assert_eq!(published, vec![out_dir.join("libshared.so")]);
        assert_eq!(
            fs::read(out_dir.join("libshared.so")).unwrap(),
            b"shared bytes"
        );
        assert!(!out_dir.join("libarchive.a").exists());
    }

    #[test]
    fn test_overwrites_existing_artifact() {
        let tmp = tempfile::tempdir().unwrap();
        let build_dir = tmp.path().join("lib");
        let out_dir = tmp.path().join("publish");
        fs::create_dir_all(&build_dir).unwrap();
        fs::create_dir_all(&out_dir).unwrap();
        fs::write(build_dir.join("libshared.so"), b"new").unwrap();
        fs::write(out_dir.join("libshared.so"), b"old").unwrap();

        publish_shared(&[shared_descriptor("shared")], &NamingOnly, &build_dir, &out_dir).unwrap();
        assert_eq!(fs::read(out_dir.join("libshared.so")).unwrap(), b"new");
    }

    #[test]
    fn test_missing_artifact_is_a_publish_error() {
        let tmp = tempfile::tempdir().unwrap();
        let build_dir = tmp.path().join("lib");
        let out_dir = tmp.path().join("publish");
        fs::create_dir_all(&build_dir).unwrap();

        let err = publish_shared(&[shared_descriptor("ghost")], &NamingOnly, &build_dir, &out_dir)
            .unwrap_err();
        assert!(matches!(err, BuildError::Publish(_)));
    }

    #[test]
    fn test_create_out_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let build_dir = tmp.path().join("lib");
        let out_dir = tmp.path().join("publish");
        fs::create_dir_all(&build_dir).unwrap();
        fs::create_dir_all(&out_dir).unwrap();

        assert!(publish_shared(&[], &NamingOnly, &build_dir, &out_dir).is_ok());
    }
}
