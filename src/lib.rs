//! # libkiln - Incremental Native Library Builder
//!
//! libkiln builds C/C++ libraries described declaratively in a `kiln.toml`
//! manifest: it recompiles only when a source or one of its declared
//! dependencies is newer than the corresponding object file, links each
//! library as a static archive or a shared object, and mirrors shared
//! artifacts to a publish directory for downstream packaging.
//!
//! ## Model
//!
//! - Libraries build strictly in declaration order, one at a time.
//! - Staleness is all-or-nothing per library: one outdated object means the
//!   whole library recompiles, matching how the toolchain treats a library's
//!   sources as one unit.
//! - The session's library directory is always on the link search path, so a
//!   shared library can link against a static one built earlier in the same
//!   run.
//!
//! ## Module Organization
//!
//! - [`config`] - Manifest parsing (`kiln.toml`) and platform selection
//! - [`descriptor`] - Typed library descriptors and dependency groups
//! - [`stale`] - Timestamp-based staleness resolution
//! - [`toolchain`] - Compiler/archiver/linker abstraction and discovery
//! - [`build`] - The build orchestrator and linker selector
//! - [`publish`] - Shared artifact publishing

/// Build orchestration: staleness check, compile, link.
pub mod build;

/// Manifest parsing (`kiln.toml`).
pub mod config;

/// Typed library descriptors.
pub mod descriptor;

/// Error taxonomy for the build core.
pub mod error;

/// Shared artifact publishing.
pub mod publish;

/// Timestamp-based staleness resolution.
pub mod stale;

/// Toolchain abstraction and discovery.
pub mod toolchain;
