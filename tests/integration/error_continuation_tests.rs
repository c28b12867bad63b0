//! Files that cannot be opened are warned about and left out of grouping;
//! the rest of their bucket is still compared. A directory that cannot be
//! listed stops the scan.
//!
//! Mode bits do not bind a privileged user, so each test checks whether the
//! lock took effect and asserts the matching outcome.

#[cfg(unix)]
mod unix {
    use dups::duplicates::{DuplicateFinder, FinderConfig, FinderError, ReadErrorPolicy};
    use dups::scanner::{HashError, ScanError};
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;
    use tempfile::TempDir;

    /// Remove all permissions; returns whether the path is now unreadable.
    fn lock(path: &Path) -> bool {
        fs::set_permissions(path, fs::Permissions::from_mode(0o000)).unwrap();
        if path.is_dir() {
            fs::read_dir(path).is_err()
        } else {
            fs::File::open(path).is_err()
        }
    }

    fn unlock(path: &Path) {
        let mode = if path.is_dir() { 0o755 } else { 0o644 };
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    #[test]
    fn test_unreadable_member_is_skipped_with_warning() {
        let dir = TempDir::new().unwrap();
        for name in ["one", "two", "three"] {
            fs::write(dir.path().join(name), "identical").unwrap();
        }
        let locked = dir.path().join("three");
        let effective = lock(&locked);

        let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
        unlock(&locked);
        let (sets, summary) = result.unwrap();

        assert_eq!(sets.len(), 1);
        if effective {
            assert_eq!(sets[0].len(), 2);
            assert!(!sets[0].files.contains(&locked));
            assert_eq!(summary.warnings.len(), 1);
            assert!(matches!(&summary.warnings[0], HashError::Open { .. }));
            assert_eq!(summary.warnings[0].path(), locked.as_path());
        } else {
            assert_eq!(sets[0].len(), 3);
            assert!(summary.warnings.is_empty());
        }
    }

    #[test]
    fn test_open_failure_is_a_warning_under_both_policies() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), "same").unwrap();
        fs::write(dir.path().join("b"), "same").unwrap();
        let locked = dir.path().join("b");
        let effective = lock(&locked);

        for policy in [ReadErrorPolicy::Abort, ReadErrorPolicy::Skip] {
            let finder = DuplicateFinder::new(FinderConfig::default().with_read_errors(policy));
            let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();
            if effective {
                assert!(sets.is_empty(), "policy {policy}");
                assert_eq!(summary.warnings.len(), 1, "policy {policy}");
            } else {
                assert_eq!(sets.len(), 1, "policy {policy}");
            }
        }

        unlock(&locked);
    }

    #[test]
    fn test_unreadable_directory_aborts_the_walk() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("a"), "same").unwrap();
        fs::write(dir.path().join("b"), "same").unwrap();
        let sealed = dir.path().join("sealed");
        fs::create_dir(&sealed).unwrap();
        fs::write(sealed.join("inner"), "x").unwrap();
        let effective = lock(&sealed);

        let result = DuplicateFinder::with_defaults().find_duplicates(dir.path());
        unlock(&sealed);

        if effective {
            let err = result.unwrap_err();
            assert!(
                matches!(err, FinderError::Scan(ScanError::PermissionDenied(ref p)) if *p == sealed),
                "unexpected error: {err}"
            );
        } else {
            let (sets, summary) = result.unwrap();
            assert_eq!(sets.len(), 1);
            assert_eq!(summary.total_files, 3);
        }
    }
}
