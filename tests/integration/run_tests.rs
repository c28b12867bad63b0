use clap::Parser;
use dups::cli::Cli;
use dups::error::ExitCode;
use dups::run_app;
use std::fs;
use tempfile::TempDir;

fn cli(args: &[&str]) -> Cli {
    let mut argv = vec!["dups", "--quiet"];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_run_app_dry_run_succeeds() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("a"), "dup").unwrap();
    fs::write(dir.path().join("bb"), "dup").unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&["--root", root, "--output", "json"])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("a").exists());
    assert!(dir.path().join("bb").exists());
}

#[test]
fn test_run_app_deletes_and_prunes() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("keep.txt"), "payload").unwrap();
    fs::create_dir(dir.path().join("nested")).unwrap();
    fs::write(dir.path().join("nested/copy.txt"), "payload").unwrap();
    let root = dir.path().to_str().unwrap();

    let code = run_app(cli(&[
        "--root",
        root,
        "--delete",
        "--emptydir",
        "--ncpu",
        "2",
        "--output",
        "json",
    ]))
    .unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(dir.path().join("keep.txt").exists());
    assert!(!dir.path().join("nested").exists());
}

#[test]
fn test_run_app_missing_root_is_general_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("absent");

    let err = run_app(cli(&["--root", missing.to_str().unwrap()])).unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
    assert!(format!("{err:#}").contains("Path not found"));
}

#[test]
fn test_run_app_missing_config_file_is_error() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("missing.toml");

    let err = run_app(cli(&[
        "--root",
        dir.path().to_str().unwrap(),
        "--config",
        config.to_str().unwrap(),
    ]))
    .unwrap_err();

    assert_eq!(ExitCode::for_error(&err), ExitCode::GeneralError);
}

#[test]
fn test_run_app_reads_config_file() {
    let dir = TempDir::new().unwrap();
    let tree = dir.path().join("tree");
    fs::create_dir(&tree).unwrap();
    fs::write(tree.join("x"), "same").unwrap();
    fs::write(tree.join("xy"), "same").unwrap();

    let config = dir.path().join("dups.toml");
    fs::write(
        &config,
        format!(
            "root = {:?}\ndelete = true\noutput = \"json\"\n",
            tree.to_str().unwrap()
        ),
    )
    .unwrap();

    let code = run_app(cli(&["--config", config.to_str().unwrap()])).unwrap();

    assert_eq!(code, ExitCode::Success);
    assert!(tree.join("x").exists());
    assert!(!tree.join("xy").exists());
}
