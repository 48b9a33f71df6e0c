//! Host toolchain implementation.
//!
//! Wraps the platform's real C/C++ compiler, archiver, and linker behind the
//! [`Toolchain`] trait. Discovery honors `CC`, then probes PATH.

use super::{ArtifactKind, Toolchain, ToolchainFamily};
use crate::descriptor::Macro;
use crate::error::{BuildError, Result};
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use std::fs;
use std::path::{Component, Path, PathBuf};
use std::process::Command;

/// A discovered host toolchain: compiler driver, archiver, and (for MSVC)
/// a separate linker executable.
#[derive(Debug, Clone)]
pub struct SystemToolchain {
    cc: PathBuf,
    archiver: PathBuf,
    linker: PathBuf,
    family: ToolchainFamily,
}

impl SystemToolchain {
    /// Builds a toolchain from explicit executable paths. `linker` is only
    /// consulted for shared links in the MSVC family; the GNU family links
    /// through the compiler driver.
    pub fn new(cc: PathBuf, archiver: PathBuf, linker: PathBuf, family: ToolchainFamily) -> Self {
        SystemToolchain {
            cc,
            archiver,
            linker,
            family,
        }
    }

    /// Finds a usable toolchain on this host.
    ///
    /// Order: the `CC` environment variable if set, then `clang`, then `gcc`,
    /// then (on Windows) `cl`. Each candidate is verified by running it.
    pub fn detect() -> Result<Self> {
        if let Ok(env_cc) = std::env::var("CC") {
            let family = classify(&env_cc);
            return Ok(Self::from_family(PathBuf::from(env_cc), family));
        }

        let mut candidates = vec!["clang", "gcc"];
        if cfg!(target_os = "windows") {
            candidates.push("cl");
        }
        for cmd in candidates {
            if is_command_available(cmd) {
                return Ok(Self::from_family(PathBuf::from(cmd), classify(cmd)));
            }
        }

        Err(BuildError::Toolchain(
            "no C compiler found; install clang or gcc, or set CC".to_string(),
        ))
    }

    fn from_family(cc: PathBuf, family: ToolchainFamily) -> Self {
        let (archiver, linker) = match family {
            ToolchainFamily::Gnu => (PathBuf::from("ar"), cc.clone()),
            ToolchainFamily::Msvc => (PathBuf::from("lib"), PathBuf::from("link")),
        };
        SystemToolchain::new(cc, archiver, linker, family)
    }

    fn macro_flags(&self, macros: &[Macro]) -> Vec<String> {
        let prefix = match self.family {
            ToolchainFamily::Gnu => "-D",
            ToolchainFamily::Msvc => "/D",
        };
        macros
            .iter()
            .map(|m| match &m.value {
                Some(v) => format!("{}{}={}", prefix, m.name, v),
                None => format!("{}{}", prefix, m.name),
            })
            .collect()
    }

    fn include_flags(&self, include_dirs: &[PathBuf]) -> Vec<String> {
        let prefix = match self.family {
            ToolchainFamily::Gnu => "-I",
            ToolchainFamily::Msvc => "/I",
        };
        include_dirs
            .iter()
            .map(|dir| format!("{}{}", prefix, dir.display()))
            .collect()
    }

    fn run(&self, program: &Path, args: &[String], what: &str) -> Result<()> {
        let output = Command::new(program).args(args).output().map_err(|_| {
            BuildError::Toolchain(format!("{} '{}' not found", what, program.display()))
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let stdout = String::from_utf8_lossy(&output.stdout);
            return Err(BuildError::Toolchain(format!(
                "'{}' exited with {}:\n{}{}",
                program.display(),
                output.status,
                stdout,
                stderr
            )));
        }
        Ok(())
    }
}

impl Toolchain for SystemToolchain {
    fn family(&self) -> ToolchainFamily {
        self.family
    }

    fn object_file_names(&self, sources: &[PathBuf], out_dir: &Path) -> Vec<PathBuf> {
        let ext = match self.family {
            ToolchainFamily::Gnu => "o",
            ToolchainFamily::Msvc => "obj",
        };
        sources
            .iter()
            .map(|src| {
                // Mirror the source's directory layout under out_dir so two
                // sources with the same stem cannot collide.
                let rel: PathBuf = src
                    .components()
                    .filter(|c| matches!(c, Component::Normal(_)))
                    .collect();
                out_dir.join(rel).with_extension(ext)
            })
            .collect()
    }

    fn compile(
        &self,
        sources: &[PathBuf],
        out_dir: &Path,
        macros: &[Macro],
        include_dirs: &[PathBuf],
        preargs: &[String],
        postargs: &[String],
        debug: bool,
    ) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(out_dir)?;
        let objects = self.object_file_names(sources, out_dir);

        let common: Vec<String> = self
            .macro_flags(macros)
            .into_iter()
            .chain(self.include_flags(include_dirs))
            .collect();
        let current_dir = std::env::current_dir()?.to_string_lossy().to_string();

        let style = ProgressStyle::default_spinner()
            .template("{spinner:.green} {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-");
        let pb = ProgressBar::new(sources.len() as u64);
        pb.set_style(style);
        pb.set_message("Compiling...");

        let mut json_entries = Vec::new();

        for (src, obj) in sources.iter().zip(&objects) {
            if let Some(parent) = obj.parent() {
                fs::create_dir_all(parent)?;
            }
            pb.set_message(format!("Compiling {}", src.display()));

            let mut args: Vec<String> = preargs.to_vec();
            args.extend(common.iter().cloned());
            match self.family {
                ToolchainFamily::Gnu => {
                    args.push("-c".to_string());
                    args.push(src.display().to_string());
                    args.push("-o".to_string());
                    args.push(obj.display().to_string());
                    if debug {
                        args.push("-g".to_string());
                    }
                }
                ToolchainFamily::Msvc => {
                    args.push("/nologo".to_string());
                    args.push("/c".to_string());
                    args.push(src.display().to_string());
                    args.push(format!("/Fo{}", obj.display()));
                    if debug {
                        args.push("/Z7".to_string());
                    }
                }
            }
            args.extend(postargs.iter().cloned());

            json_entries.push(json!({
                "directory": current_dir,
                "command": format!("{} {}", self.cc.display(), args.join(" ")),
                "file": src.display().to_string(),
            }));

            self.run(&self.cc, &args, "compiler")?;
            pb.inc(1);
        }
        pb.finish_and_clear();

        // Keep a compilation database next to the objects for IDE tooling.
        let json_str = serde_json::to_string_pretty(&json_entries)
            .map_err(|e| BuildError::Toolchain(e.to_string()))?;
        fs::write(out_dir.join("compile_commands.json"), json_str)?;

        Ok(objects)
    }

    fn create_static_archive(
        &self,
        objects: &[PathBuf],
        name: &str,
        out_dir: &Path,
        _debug: bool,
    ) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let artifact = out_dir.join(self.library_file_name(name, ArtifactKind::Static));

        // `ar` appends to an existing archive; start clean so removed
        // objects do not linger as stale members.
        if artifact.exists() {
            fs::remove_file(&artifact)?;
        }

        let mut args: Vec<String> = Vec::new();
        match self.family {
            ToolchainFamily::Gnu => {
                args.push("rcs".to_string());
                args.push(artifact.display().to_string());
            }
            ToolchainFamily::Msvc => {
                args.push("/nologo".to_string());
                args.push(format!("/OUT:{}", artifact.display()));
            }
        }
        args.extend(objects.iter().map(|o| o.display().to_string()));

        self.run(&self.archiver, &args, "archiver")?;
        Ok(artifact)
    }

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
    ) -> Result<PathBuf> {
        fs::create_dir_all(out_dir)?;
        let artifact = out_dir.join(self.library_file_name(name, ArtifactKind::Shared));

        let mut args: Vec<String> = preargs.to_vec();
        match self.family {
            ToolchainFamily::Gnu => {
                args.extend(objects.iter().map(|o| o.display().to_string()));
                args.push("-o".to_string());
                args.push(artifact.display().to_string());
                if debug {
                    args.push("-g".to_string());
                }
                for dir in library_dirs {
                    args.push(format!("-L{}", dir.display()));
                }
                for lib in libraries {
                    args.push(format!("-l{}", lib));
                }
            }
            ToolchainFamily::Msvc => {
                args.insert(0, "/nologo".to_string());
                args.extend(objects.iter().map(|o| o.display().to_string()));
                args.push(format!("/OUT:{}", artifact.display()));
                if debug {
                    args.push("/DEBUG".to_string());
                }
                for dir in library_dirs {
                    args.push(format!("/LIBPATH:{}", dir.display()));
                }
                for lib in libraries {
                    args.push(format!("{}.lib", lib));
                }
            }
        }
        args.extend(postargs.iter().cloned());

        self.run(&self.linker, &args, "linker")?;
        Ok(artifact)
    }

    fn library_file_name(&self, name: &str, kind: ArtifactKind) -> String {
        match (self.family, kind) {
            (ToolchainFamily::Gnu, ArtifactKind::Static) => format!("lib{}.a", name),
            (ToolchainFamily::Gnu, ArtifactKind::Shared) => {
                if cfg!(target_os = "macos") {
                    format!("lib{}.dylib", name)
                } else {
                    format!("lib{}.so", name)
                }
            }
            (ToolchainFamily::Msvc, ArtifactKind::Static) => format!("{}.lib", name),
            (ToolchainFamily::Msvc, ArtifactKind::Shared) => format!("{}.dll", name),
        }
    }
}

fn classify(cc: &str) -> ToolchainFamily {
    let base = Path::new(cc)
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if base == "cl" || base == "clang-cl" {
        ToolchainFamily::Msvc
    } else {
        ToolchainFamily::Gnu
    }
}

fn is_command_available(cmd: &str) -> bool {
    let mut command = Command::new(cmd);
    if cmd == "cl" || cmd == "cl.exe" {
        return command.arg("/?").output().is_ok();
    }
    command.arg("--version").output().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gnu() -> SystemToolchain {
        SystemToolchain::new(
            PathBuf::from("cc"),
            PathBuf::from("ar"),
            PathBuf::from("cc"),
            ToolchainFamily::Gnu,
        )
    }

    fn msvc() -> SystemToolchain {
        SystemToolchain::new(
            PathBuf::from("cl"),
            PathBuf::from("lib"),
            PathBuf::from("link"),
            ToolchainFamily::Msvc,
        )
    }

    #[test]
    fn test_library_file_name_gnu() {
        let tc = gnu();
        assert_eq!(tc.library_file_name("z", ArtifactKind::Static), "libz.a");
        let shared = tc.library_file_name("z", ArtifactKind::Shared);
        assert!(shared == "libz.so" || shared == "libz.dylib");
    }

    #[test]
    fn test_library_file_name_msvc() {
        let tc = msvc();
        assert_eq!(tc.library_file_name("z", ArtifactKind::Static), "z.lib");
        assert_eq!(tc.library_file_name("z", ArtifactKind::Shared), "z.dll");
    }

    #[test]
    fn test_object_file_names_mirror_layout() {
        let tc = gnu();
        let sources = vec![PathBuf::from("vendor/zlib/inflate.c")];
        let objs = tc.object_file_names(&sources, Path::new("build/obj"));
        assert_eq!(objs, vec![PathBuf::from("build/obj/vendor/zlib/inflate.o")]);
    }

    #[test]
    fn test_object_file_names_are_order_aligned() {
        let tc = gnu();
        let sources = vec![PathBuf::from("b.c"), PathBuf::from("a.c")];
        let objs = tc.object_file_names(&sources, Path::new("obj"));
        assert_eq!(objs[0], PathBuf::from("obj/b.o"));
        assert_eq!(objs[1], PathBuf::from("obj/a.o"));
    }

    #[test]
    fn test_macro_flags_gnu() {
        let tc = gnu();
        let flags = tc.macro_flags(&[Macro::parse("NDEBUG"), Macro::parse("FOO=1")]);
        assert_eq!(flags, vec!["-DNDEBUG".to_string(), "-DFOO=1".to_string()]);
    }

    #[test]
    fn test_macro_flags_msvc() {
        let tc = msvc();
        let flags = tc.macro_flags(&[Macro::parse("FOO=1")]);
        assert_eq!(flags, vec!["/DFOO=1".to_string()]);
    }

    #[test]
    fn test_classify_compilers() {
        assert_eq!(classify("clang"), ToolchainFamily::Gnu);
        assert_eq!(classify("gcc"), ToolchainFamily::Gnu);
        assert_eq!(classify("cl"), ToolchainFamily::Msvc);
        assert_eq!(classify("cl.exe"), ToolchainFamily::Msvc);
        assert_eq!(classify("clang-cl"), ToolchainFamily::Msvc);
    }
}
