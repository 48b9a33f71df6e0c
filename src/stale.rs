//! Timestamp-based staleness resolution.
//!
//! Decides whether a library's compile step must run at all. The comparison
//! is many-to-many: each source file carries a dependency group (the source
//! plus any extra files gating it), paired positionally with the object file
//! the compiler would produce for it.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Returns the modification time of `path`, or `None` if the file is missing
/// or unreadable. A missing dependency is not an error here; its absence
/// simply forces a rebuild.
fn mtime(path: &Path) -> Option<SystemTime> {
    fs::metadata(path).and_then(|m| m.modified()).ok()
}

/// Reports whether any `(dependency group, expected object)` pair is stale.
///
/// A pair is stale when the object is missing, or when any file in its group
/// is newer than the object, or when a file in the group is missing (its
/// timestamp cannot prove the object current). The answer covers the whole
/// library: the underlying toolchain compiles a library's sources as one
/// unit, so one stale pair means every source is recompiled.
///
/// `groups` and `expected_objects` must be the same length and order-aligned;
/// the orchestrator derives both from the same source list.
pub fn needs_rebuild(groups: &[Vec<PathBuf>], expected_objects: &[PathBuf]) -> bool {
    debug_assert_eq!(groups.len(), expected_objects.len());

    for (group, object) in groups.iter().zip(expected_objects) {
        let Some(object_time) = mtime(object) else {
            return true; // missing object is infinitely stale
        };
        for dep in group {
            match mtime(dep) {
                Some(dep_time) if dep_time > object_time => return true,
                Some(_) => {}
                None => return true,
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::time::Duration;

    fn touch(path: &Path, when: SystemTime) {
        File::create(path).unwrap().set_modified(when).unwrap();
    }

    fn base_time() -> SystemTime {
        SystemTime::now() - Duration::from_secs(3600)
    }

    #[test]
    fn test_missing_object_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        touch(&src, base_time());

        let groups = vec![vec![src]];
        let objects = vec![dir.path().join("a.o")];
        assert!(needs_rebuild(&groups, &objects));
    }

    #[test]
    fn test_up_to_date_object_is_not_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let obj = dir.path().join("a.o");
        touch(&src, base_time());
        touch(&obj, base_time() + Duration::from_secs(10));

        assert!(!needs_rebuild(&[vec![src]], &[obj]));
    }

    #[test]
    fn test_newer_source_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let obj = dir.path().join("a.o");
        touch(&obj, base_time());
        touch(&src, base_time() + Duration::from_secs(10));

        assert!(needs_rebuild(&[vec![src]], &[obj]));
    }

    #[test]
    fn test_newer_header_dependency_is_stale() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let hdr = dir.path().join("a.h");
        let obj = dir.path().join("a.o");
        touch(&src, base_time());
        touch(&obj, base_time() + Duration::from_secs(10));
        touch(&hdr, base_time() + Duration::from_secs(20));

        assert!(needs_rebuild(&[vec![src, hdr]], &[obj]));
    }

    #[test]
    fn test_missing_dependency_forces_rebuild() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("a.c");
        let obj = dir.path().join("a.o");
        touch(&src, base_time());
        touch(&obj, base_time() + Duration::from_secs(10));

        let groups = vec![vec![src, dir.path().join("gone.h")]];
        assert!(needs_rebuild(&groups, &[obj]));
    }

    #[test]
    fn test_one_stale_pair_marks_whole_group() {
        let dir = tempfile::tempdir().unwrap();
        let src_a = dir.path().join("a.c");
        let src_b = dir.path().join("b.c");
        let obj_a = dir.path().join("a.o");
        let obj_b = dir.path().join("b.o");
        touch(&src_a, base_time());
        touch(&obj_a, base_time() + Duration::from_secs(10));
        touch(&obj_b, base_time());
        touch(&src_b, base_time() + Duration::from_secs(10)); // b.c newer than b.o

        let groups = vec![vec![src_a], vec![src_b]];
        assert!(needs_rebuild(&groups, &[obj_a, obj_b]));
    }

    #[test]
    fn test_empty_input_is_up_to_date() {
        assert!(!needs_rebuild(&[], &[]));
    }
}
