//! Build artifact cleanup.

use anyhow::{Context, Result};
use colored::*;
use std::fs;
use std::path::Path;

/// Removes the object and library directories. The publish directory is left
/// alone; downstream packaging owns whatever was mirrored there.
pub fn clean(obj_dir: &Path, lib_dir: &Path) -> Result<()> {
    let mut cleaned = false;

    for dir in [obj_dir, lib_dir] {
        if dir.exists() {
            fs::remove_dir_all(dir)
                .with_context(|| format!("Failed to remove {}", dir.display()))?;
            cleaned = true;
        }
    }

    if cleaned {
        println!("{} Clean complete.", "✓".green());
    } else {
        println!("{} Nothing to clean", "!".yellow());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_removes_both_directories() {
        let tmp = tempfile::tempdir().unwrap();
        let obj = tmp.path().join("obj");
        let lib = tmp.path().join("lib");
        fs::create_dir_all(obj.join("nested")).unwrap();
        fs::create_dir_all(&lib).unwrap();

        clean(&obj, &lib).unwrap();
        assert!(!obj.exists());
        assert!(!lib.exists());
    }

    #[test]
    fn test_clean_is_a_noop_when_nothing_exists() {
        let tmp = tempfile::tempdir().unwrap();
        let obj = tmp.path().join("obj");
        let lib = tmp.path().join("lib");
        assert!(clean(&obj, &lib).is_ok());
    }
}
