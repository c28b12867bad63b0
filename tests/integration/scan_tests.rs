use dups::actions::plan_retention;
use dups::duplicates::{DuplicateFinder, FinderConfig, FinderError};
use dups::scanner::{hash_to_hex, Hasher};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn hello_world_tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();
    dir
}

#[test]
fn test_scan_finds_single_set() {
    let dir = hello_world_tree();
    let finder = DuplicateFinder::with_defaults();

    let (sets, summary) = finder.find_duplicates(dir.path()).unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(summary.total_files, 3);
    assert_eq!(summary.duplicate_sets, 1);
    assert_eq!(summary.duplicate_files, 1);
    assert_eq!(summary.reclaimable_space, 5);
    assert!(summary.warnings.is_empty());

    let set = &sets[0];
    assert_eq!(set.size, 5);
    // SHA-1("hello")
    assert_eq!(
        hash_to_hex(&set.digest),
        "aaf4c61ddcc5e8a2dabede0f3b482cd9aea9434d"
    );
    let mut members = set.files.clone();
    members.sort();
    assert_eq!(
        members,
        vec![dir.path().join("a.txt"), dir.path().join("b/b.txt")]
    );
}

#[test]
fn test_retention_keeps_shortest_path() {
    let dir = hello_world_tree();
    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let plan = plan_retention(sets.into_iter().next().unwrap());
    assert_eq!(plan.keep(), dir.path().join("a.txt"));
    assert_eq!(plan.remove(), &[dir.path().join("b/b.txt")]);
}

#[test]
fn test_same_size_different_content_is_not_a_set() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("one"), "aaaa").unwrap();
    fs::write(dir.path().join("two"), "bbbb").unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.size_buckets_hashed, 1);
    assert_eq!(summary.files_hashed, 2);
}

#[test]
fn test_unique_sizes_are_never_hashed() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("1"), "a").unwrap();
    fs::write(dir.path().join("2"), "bb").unwrap();
    fs::write(dir.path().join("3"), "ccc").unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.eliminated_by_size, 3);
    assert_eq!(summary.files_hashed, 0);
}

#[test]
fn test_empty_files_form_a_set() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("e1"), "").unwrap();
    fs::write(dir.path().join("e2"), "").unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 0);
    assert_eq!(summary.reclaimable_space, 0);
}

#[test]
fn test_multiple_sets_across_nested_dirs() {
    let dir = TempDir::new().unwrap();
    let deep = dir.path().join("x/y/z");
    fs::create_dir_all(&deep).unwrap();
    for base in [dir.path().to_path_buf(), dir.path().join("x"), deep.clone()] {
        fs::write(base.join("small"), "abc").unwrap();
        fs::write(base.join("large"), vec![7u8; 200_000]).unwrap();
    }

    let (sets, summary) = DuplicateFinder::new(FinderConfig::default().with_workers(3))
        .find_duplicates(dir.path())
        .unwrap();

    assert_eq!(sets.len(), 2);
    assert!(sets.iter().all(|s| s.len() == 3));
    // ascending size order
    assert_eq!(sets[0].size, 3);
    assert_eq!(sets[1].size, 200_000);
    assert_eq!(summary.duplicate_files, 4);
    assert_eq!(summary.reclaimable_space, 2 * 3 + 2 * 200_000);
}

#[test]
fn test_worker_count_does_not_change_results() {
    let dir = TempDir::new().unwrap();
    for i in 0..24 {
        fs::write(dir.path().join(format!("f{i:02}")), format!("{}", i % 3)).unwrap();
    }

    let normalize = |workers: usize| {
        let (sets, _) = DuplicateFinder::new(FinderConfig::default().with_workers(workers))
            .find_duplicates(dir.path())
            .unwrap();
        let mut out: Vec<(String, Vec<PathBuf>)> = sets
            .into_iter()
            .map(|s| {
                let mut files = s.files.clone();
                files.sort();
                (s.digest_hex(), files)
            })
            .collect();
        out.sort();
        out
    };

    let single = normalize(1);
    assert_eq!(single.len(), 3);
    assert_eq!(single, normalize(8));
}

#[test]
fn test_digest_matches_direct_hash() {
    let dir = hello_world_tree();
    let (sets, _) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    let direct = Hasher::new().full_hash(&dir.path().join("a.txt")).unwrap();
    assert_eq!(sets[0].digest, direct);
}

#[test]
fn test_missing_root_is_an_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope");

    let err = DuplicateFinder::with_defaults()
        .find_duplicates(&missing)
        .unwrap_err();
    assert!(matches!(err, FinderError::PathNotFound(_)));
}

#[test]
fn test_file_root_is_a_tree_of_one() {
    let dir = TempDir::new().unwrap();
    let file = dir.path().join("file");
    fs::write(&file, "x").unwrap();
    fs::write(dir.path().join("sibling"), "x").unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(&file)
        .unwrap();

    // siblings of the root are outside the tree
    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
    assert_eq!(summary.size_buckets_hashed, 0);
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("real"), "content").unwrap();
    std::os::unix::fs::symlink(dir.path().join("real"), dir.path().join("link")).unwrap();

    let (sets, summary) = DuplicateFinder::with_defaults()
        .find_duplicates(dir.path())
        .unwrap();

    assert!(sets.is_empty());
    assert_eq!(summary.total_files, 1);
}
