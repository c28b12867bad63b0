use proptest::prelude::*;
use dups::actions::plan_retention;
use dups::duplicates::{group_by_size, DigestIndex, DigestPool, DuplicateSet};
use dups::scanner::{FileEntry, Hasher};
use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

fn path_strategy() -> impl Strategy<Value = PathBuf> {
    "[a-z]{1,3}(/[a-z]{1,4}){0,3}".prop_map(PathBuf::from)
}

proptest! {
    #[test]
    fn test_hash_determinism(content in "\\PC*") {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, content.as_bytes()).unwrap();

        let hasher = Hasher::new();
        let hash1 = hasher.full_hash(&path).unwrap();
        let hash2 = hasher.full_hash(&path).unwrap();

        prop_assert_eq!(hash1, hash2);
    }

    #[test]
    fn test_hash_independent_of_buffer_size(
        content in prop::collection::vec(any::<u8>(), 0..4096),
        buffer in 1usize..512,
    ) {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("test.bin");
        fs::write(&path, &content).unwrap();

        let default = Hasher::new().full_hash(&path).unwrap();
        let small = Hasher::new().with_buffer_size(buffer).full_hash(&path).unwrap();

        prop_assert_eq!(default, small);
    }

    #[test]
    fn test_group_by_size_invariants(sizes in prop::collection::vec(0u64..1000, 0..50)) {
        let entries: Vec<FileEntry> = sizes.iter().enumerate().map(|(i, &size)| {
            FileEntry::new(PathBuf::from(format!("/fake/path/{}", i)), size)
        }).collect();

        let (index, stats) = group_by_size(entries.clone());

        prop_assert_eq!(stats.total_files, entries.len());
        prop_assert_eq!(stats.total_size, sizes.iter().sum::<u64>());

        // Invariant: every candidate bucket holds 2+ files of its size
        let mut seen = 0;
        let mut last_size = None;
        for (size, paths) in index.candidates() {
            prop_assert!(paths.len() >= 2);
            for path in paths {
                let i: usize = path.file_name().unwrap().to_str().unwrap().parse().unwrap();
                prop_assert_eq!(sizes[i], size);
            }
            // ascending size order
            prop_assert!(last_size.map_or(true, |last| last < size));
            last_size = Some(size);
            seen += paths.len();
        }
        prop_assert_eq!(seen, stats.potential_duplicates);
        prop_assert_eq!(stats.potential_duplicates + stats.eliminated_unique, stats.total_files);
    }

    #[test]
    fn test_digest_index_sets_are_disjoint(digests in prop::collection::vec(0u8..6, 0..40)) {
        let mut index = DigestIndex::new(42);
        for (i, d) in digests.iter().enumerate() {
            index.insert(i, PathBuf::from(format!("f{i}")), [*d; 20]);
        }

        let sets = index.into_duplicate_sets();
        let mut seen = HashSet::new();
        for set in &sets {
            prop_assert!(set.len() >= 2);
            prop_assert_eq!(set.size, 42);
            for path in &set.files {
                // no path in two sets
                prop_assert!(seen.insert(path.clone()));
                let i: usize = path.to_str().unwrap()[1..].parse().unwrap();
                prop_assert_eq!([digests[i]; 20], set.digest);
            }
        }

        let expected: usize = (0u8..6)
            .map(|d| digests.iter().filter(|&&x| x == d).count())
            .filter(|&n| n >= 2)
            .sum();
        prop_assert_eq!(seen.len(), expected);
    }

    #[test]
    fn test_retention_keeps_a_shortest_path(paths in prop::collection::vec(path_strategy(), 2..12)) {
        let set = DuplicateSet::new([0; 20], 1, paths.clone());
        let plan = plan_retention(set.clone());

        let shortest = paths.iter().map(|p| p.as_os_str().len()).min().unwrap();
        prop_assert_eq!(plan.keep().as_os_str().len(), shortest);
        prop_assert_eq!(plan.remove().len(), paths.len() - 1);

        // members ordered by non-increasing length
        let lengths: Vec<usize> = plan.members().iter().map(|p| p.as_os_str().len()).collect();
        prop_assert!(lengths.windows(2).all(|w| w[0] >= w[1]));

        // deterministic
        prop_assert_eq!(plan, plan_retention(set));
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn test_pool_returns_one_result_per_job(
        workers in 1usize..8,
        contents in prop::collection::vec(0u8..4, 0..20),
    ) {
        let dir = TempDir::new().unwrap();
        let paths: Vec<PathBuf> = contents.iter().enumerate().map(|(i, c)| {
            let path = dir.path().join(format!("f{i}"));
            fs::write(&path, [*c; 16]).unwrap();
            path
        }).collect();

        let pool = DigestPool::new(workers, Hasher::new()).unwrap();
        // two buckets through the same pool
        for _ in 0..2 {
            let mut results = pool.hash_bucket(&paths).unwrap();
            prop_assert_eq!(results.len(), paths.len());

            results.sort_by_key(|r| r.index);
            for (i, result) in results.iter().enumerate() {
                prop_assert_eq!(result.index, i);
                prop_assert_eq!(&result.path, &paths[i]);
                prop_assert!(result.outcome.is_ok());
            }
        }
    }
}
