//! Toolchain abstraction and discovery.
//!
//! The build core never shells out to a compiler directly; it talks to a
//! [`Toolchain`] implementation. [`SystemToolchain`] drives the host's real
//! C/C++ toolchain, and tests substitute a recording fake.

pub mod system;

pub use system::SystemToolchain;

use crate::descriptor::Macro;
use crate::error::Result;
use std::path::{Path, PathBuf};

/// Flag dialect / artifact convention family of a toolchain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolchainFamily {
    /// GCC, Clang, and anything else accepting `-c`/`-o`/`-shared`.
    Gnu,
    /// MSVC-compatible (`cl.exe`, `lib.exe`, `link.exe`).
    Msvc,
}

/// The two kinds of library artifact this crate produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Archive of object files; undefined symbols are resolved by a later
    /// consumer's link step.
    Static,
    /// Dynamically loaded library (`.so`, `.dylib`, `.dll`).
    Shared,
}

/// External toolchain collaborator consumed by the build core.
///
/// Implementations are black boxes that succeed or fail; the core does not
/// interpret compiler output beyond that. All operations are one-shot and
/// never retried.
pub trait Toolchain {
    /// Which flag dialect this toolchain speaks. Drives the linker
    /// selector's choice between `/DLL` and `-shared`.
    fn family(&self) -> ToolchainFamily;

    /// Maps each source file to the object path `compile` would produce for
    /// it, one-to-one and order-preserving.
    fn object_file_names(&self, sources: &[PathBuf], out_dir: &Path) -> Vec<PathBuf>;

    /// Compiles every listed source into `out_dir`. Returns the produced
    /// object paths (identical to `object_file_names`).
    #[allow(clippy::too_many_arguments)]
    fn compile(
        &self,
        sources: &[PathBuf],
        out_dir: &Path,
        macros: &[Macro],
        include_dirs: &[PathBuf],
        preargs: &[String],
        postargs: &[String],
        debug: bool,
    ) -> Result<Vec<PathBuf>>;

    /// Collects objects into a static archive named after `name`, in
    /// `out_dir`. No symbol resolution happens here.
    fn create_static_archive(
        &self,
        objects: &[PathBuf],
        name: &str,
        out_dir: &Path,
        debug: bool,
    ) -> Result<PathBuf>;

    /// Links objects into a shared library named after `name`, in `out_dir`.
    /// The caller supplies the fully assembled pre/post arguments, including
    /// the platform's "build a shared library" instruction.
    #[allow(clippy::too_many_arguments)]
    fn link_shared_library(
        &self,
        objects: &[PathBuf],
        name: &str,
        out_dir: &Path,
        debug: bool,
        preargs: &[String],
        postargs: &[String],
        libraries: &[String],
        library_dirs: &[PathBuf],
    ) -> Result<PathBuf>;

    /// Platform-native file name for a library artifact, e.g. `libz.a`,
    /// `libz.so`, `z.lib`, `z.dll`.
    fn library_file_name(&self, name: &str, kind: ArtifactKind) -> String;
}
