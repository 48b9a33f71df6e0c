//! # kiln CLI Entry Point
//!
//! Parses CLI arguments with clap and routes to the build core:
//! `kiln build` compiles and links every library the manifest selects for
//! this platform, `kiln clean` removes the build directories.

use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::*;
use std::path::PathBuf;

use libkiln::build::{self, BuildContext};
use libkiln::config::{Manifest, Platform};
use libkiln::publish;
use libkiln::toolchain::{ArtifactKind, SystemToolchain};

#[derive(Parser)]
#[command(name = "kiln")]
#[command(about = "Incremental builder for native C/C++ libraries", version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    /// Path to the manifest file
    #[arg(long, global = true, default_value = "kiln.toml")]
    manifest: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile and link every library selected for this platform
    Build {
        /// Compile with debug information
        #[arg(long)]
        debug: bool,
        /// Copy shared artifacts here after linking (overrides the
        /// manifest's publish_dir)
        #[arg(long)]
        publish: Option<PathBuf>,
    },
    /// Remove the object and library directories
    Clean,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        println!("{} Error: {:#}", "x".red(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let manifest = Manifest::load(&cli.manifest)?;
    let root = cli
        .manifest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    let obj_dir = root.join(&manifest.output.obj_dir);
    let lib_dir = root.join(&manifest.output.lib_dir);

    match cli.command {
        Commands::Build { debug, publish } => {
            let platform = Platform::host();
            let descriptors = manifest.descriptors(platform, &root)?;
            if descriptors.is_empty() {
                println!("{} No libraries selected for this platform.", "!".yellow());
                return Ok(());
            }

            let toolchain = SystemToolchain::detect()?;
            let ctx = BuildContext {
                toolchain: &toolchain,
                obj_dir,
                lib_dir,
                debug,
            };

            let built = build::build_libraries(&ctx, &descriptors)?;
            for lib in &built {
                let kind = match lib.kind {
                    ArtifactKind::Static => "static",
                    ArtifactKind::Shared => "shared",
                };
                println!(
                    "{} {} ({}) -> {}",
                    "✓".green(),
                    lib.name.bold(),
                    kind,
                    lib.artifact.display()
                );
            }

            let publish_dir = publish.or_else(|| {
                manifest
                    .output
                    .publish_dir
                    .as_ref()
                    .map(|d| root.join(d))
            });
            if let Some(out_dir) = publish_dir {
                publish::publish_shared(&descriptors, &toolchain, &ctx.lib_dir, &out_dir)?;
            }
            Ok(())
        }
        Commands::Clean => build::clean(&obj_dir, &lib_dir),
    }
}
