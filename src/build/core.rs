//! Build orchestration.
//!
//! Drives the staleness resolver, compiler, and linker selector for an
//! ordered sequence of library descriptors. Libraries build strictly in
//! declaration order, one at a time; the first failure halts the sequence.
//! Side effects already performed (objects written, earlier libraries
//! linked) are not rolled back.

use crate::descriptor::LibraryDescriptor;
use crate::error::{BuildError, LinkStage, Result};
use crate::stale;
use crate::toolchain::{ArtifactKind, Toolchain, ToolchainFamily};
use colored::*;
use std::path::PathBuf;

/// Everything one build invocation needs, passed explicitly.
///
/// `obj_dir` holds intermediate objects and may be reused across runs for
/// incremental behavior; `lib_dir` receives the finished archives and shared
/// objects and doubles as a library search path so later libraries can link
/// against earlier ones in the same session.
pub struct BuildContext<'a> {
    pub toolchain: &'a dyn Toolchain,
    pub obj_dir: PathBuf,
    pub lib_dir: PathBuf,
    pub debug: bool,
}

/// One successfully linked library.
#[derive(Debug, Clone)]
pub struct BuiltLibrary {
    pub name: String,
    pub artifact: PathBuf,
    pub kind: ArtifactKind,
}

/// Builds every descriptor in order.
///
/// All descriptors are validated up front: a malformed descriptor anywhere
/// in the list aborts the whole build before any compilation occurs. After
/// that, each library runs staleness check → compile (if stale) → link, and
/// the first compile or link failure propagates immediately; remaining
/// libraries are not attempted.
pub fn build_libraries(
    ctx: &BuildContext,
    descriptors: &[LibraryDescriptor],
) -> Result<Vec<BuiltLibrary>> {
    for desc in descriptors {
        desc.validate()?;
    }

    let mut built = Vec::with_capacity(descriptors.len());
    for desc in descriptors {
        built.push(build_one(ctx, desc)?);
    }
    Ok(built)
}

fn build_one(ctx: &BuildContext, desc: &LibraryDescriptor) -> Result<BuiltLibrary> {
    println!("{} Building library '{}'", "🔨".blue(), desc.name.bold());

    let groups = desc.dependency_groups();
    let expected_objects = ctx.toolchain.object_file_names(&desc.sources, &ctx.obj_dir);

    if stale::needs_rebuild(&groups, &expected_objects) {
        // The whole library recompiles as one unit; partial-object
        // staleness is not exploited.
        ctx.toolchain
            .compile(
                &desc.sources,
                &ctx.obj_dir,
                &desc.macros,
                &desc.include_dirs,
                &desc.compiler_preargs,
                &desc.compiler_postargs,
                ctx.debug,
            )
            .map_err(|e| BuildError::Compile {
                library: desc.name.clone(),
                message: flatten(e),
            })?;
    } else {
        println!("   {} Objects up to date", "⚡".green());
    }

    // Linking is not staleness-gated: a deleted artifact with surviving
    // objects still gets relinked.
    link_library(ctx, desc, &expected_objects)
}

/// Links one library's objects into the artifact kind its descriptor asks
/// for.
///
/// Static libraries are plain archives; no symbol resolution happens and
/// undefined symbols are permitted. Shared libraries get the platform's
/// "build a shared library" instruction prepended ahead of any
/// caller-supplied linker pre-arguments, and the session's `lib_dir` is
/// appended to the library search path so earlier artifacts can satisfy
/// `link_libraries` entries.
pub fn link_library(
    ctx: &BuildContext,
    desc: &LibraryDescriptor,
    objects: &[PathBuf],
) -> Result<BuiltLibrary> {
    if desc.is_shared {
        let shared_flag = match ctx.toolchain.family() {
            ToolchainFamily::Msvc => "/DLL",
            ToolchainFamily::Gnu => "-shared",
        };
        let mut preargs = vec![shared_flag.to_string()];
        preargs.extend(desc.linker_preargs.iter().cloned());

        let mut library_dirs = desc.library_dirs.clone();
        library_dirs.push(ctx.lib_dir.clone());

        let artifact = ctx
            .toolchain
            .link_shared_library(
                objects,
                &desc.name,
                &ctx.lib_dir,
                ctx.debug,
                &preargs,
                &desc.linker_postargs,
                &desc.link_libraries,
                &library_dirs,
            )
            .map_err(|e| BuildError::Link {
                library: desc.name.clone(),
                stage: LinkStage::Shared,
                message: flatten(e),
            })?;

        println!("   {} Linked {}", "🔗".cyan(), artifact.display());
        Ok(BuiltLibrary {
            name: desc.name.clone(),
            artifact,
            kind: ArtifactKind::Shared,
        })
    } else {
        let artifact = ctx
            .toolchain
            .create_static_archive(objects, &desc.name, &ctx.lib_dir, ctx.debug)
            .map_err(|e| BuildError::Link {
                library: desc.name.clone(),
                stage: LinkStage::Static,
                message: flatten(e),
            })?;

        println!("   {} Archived {}", "📦".cyan(), artifact.display());
        Ok(BuiltLibrary {
            name: desc.name.clone(),
            artifact,
            kind: ArtifactKind::Static,
        })
    }
}

/// Unwraps a raw toolchain message so it does not get double-prefixed when
/// retagged with the library name and stage.
fn flatten(e: BuildError) -> String {
    match e {
        BuildError::Toolchain(msg) => msg,
        other => other.to_string(),
    }
}
