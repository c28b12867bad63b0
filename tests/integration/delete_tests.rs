use dups::actions::{apply_plan, plan_retention, BatchDeleteResult, DeleteConfig};
use dups::duplicates::DuplicateFinder;
use dups::output::TextOutput;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Scan `root` and apply every plan with `config`, returning the combined
/// result and the text report.
fn scan_and_apply(root: &Path, config: &DeleteConfig) -> (BatchDeleteResult, String) {
    let (sets, _) = DuplicateFinder::with_defaults().find_duplicates(root).unwrap();

    let mut report = TextOutput::new(Vec::new());
    let mut totals = BatchDeleteResult::default();
    for set in sets {
        let plan = plan_retention(set);
        report.write_set(&plan).unwrap();
        totals.merge(apply_plan(&plan, config, Some(&mut report)).unwrap());
    }
    report.finish().unwrap();

    (totals, String::from_utf8(report.into_inner()).unwrap())
}

#[test]
fn test_delete_removes_longer_copy() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/b.txt"), "hello").unwrap();
    fs::write(dir.path().join("c.txt"), "world").unwrap();

    let (result, report) = scan_and_apply(dir.path(), &DeleteConfig::permanent());

    assert_eq!(result.deleted_count(), 1);
    assert_eq!(result.bytes_freed, 5);
    assert!(dir.path().join("a.txt").exists());
    assert!(!dir.path().join("b/b.txt").exists());
    assert!(dir.path().join("c.txt").exists());
    // no --emptydir: the emptied directory stays
    assert!(dir.path().join("b").is_dir());

    let deleted = dir.path().join("b/b.txt");
    assert!(report.contains(&format!("Deleting dup {}", deleted.display())));
}

#[test]
fn test_dry_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a.txt"), "hello").unwrap();
    fs::create_dir(dir.path().join("b")).unwrap();
    fs::write(dir.path().join("b/b.txt"), "hello").unwrap();

    let config = DeleteConfig::dry_run().with_prune_empty_dirs(true);
    let (result, report) = scan_and_apply(dir.path(), &config);

    assert_eq!(result.deleted_count(), 0);
    assert_eq!(result.candidates, 1);
    assert!(result.pruned_dirs.is_empty());
    assert!(dir.path().join("a.txt").exists());
    assert!(dir.path().join("b/b.txt").exists());
    // the candidate is still announced
    assert!(report.contains("Deleting dup "));
}

#[test]
fn test_emptydir_prunes_only_emptied_parents() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), "same").unwrap();
    fs::create_dir(dir.path().join("lonely")).unwrap();
    fs::write(dir.path().join("lonely/copy"), "same").unwrap();
    fs::create_dir(dir.path().join("crowded")).unwrap();
    fs::write(dir.path().join("crowded/copy"), "same").unwrap();
    fs::write(dir.path().join("crowded/other.bin"), "something else").unwrap();

    let config = DeleteConfig::permanent().with_prune_empty_dirs(true);
    let (result, _) = scan_and_apply(dir.path(), &config);

    assert_eq!(result.deleted_count(), 2);
    assert!(dir.path().join("a").exists());
    assert!(!dir.path().join("lonely").exists());
    assert!(dir.path().join("crowded").is_dir());
    assert!(dir.path().join("crowded/other.bin").exists());
    assert_eq!(result.pruned_dirs, vec![dir.path().join("lonely")]);
}

#[test]
fn test_delete_is_idempotent_on_second_run() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("x"), "dup").unwrap();
    fs::write(dir.path().join("xx"), "dup").unwrap();
    fs::write(dir.path().join("xxx"), "dup").unwrap();

    let (first, _) = scan_and_apply(dir.path(), &DeleteConfig::permanent());
    assert_eq!(first.deleted_count(), 2);
    assert!(dir.path().join("x").exists());

    let (second, report) = scan_and_apply(dir.path(), &DeleteConfig::permanent());
    assert_eq!(second.deleted_count(), 0);
    assert!(report.is_empty());
}
