use clap::Parser;
use dups::cli::{Cli, OutputFormat};
use dups::config::Config;
use dups::duplicates::ReadErrorPolicy;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use std::fs;
use std::path::PathBuf;
use tempfile::tempdir;

#[test]
fn test_config_load_defaults() {
    // Use figment directly without Env to avoid interference from other tests
    let figment = Figment::from(Serialized::defaults(Config::default()));
    let config: Config = figment.extract().unwrap();
    assert_eq!(config.root, PathBuf::from("test"));
    assert!(!config.delete);
    assert_eq!(config.ncpu, None);
    assert_eq!(config.output, OutputFormat::Text);
}

#[test]
fn test_config_load_from_env() {
    // only keys that cannot make another test delete anything
    std::env::set_var("DUPS_NCPU", "16");
    std::env::set_var("DUPS_READ_ERRORS", "skip");

    let figment = Figment::from(Serialized::defaults(Config::default()))
        .merge(Env::prefixed("DUPS_").only(&["ncpu", "read_errors"]));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.ncpu, Some(16));
    assert_eq!(config.read_errors, ReadErrorPolicy::Skip);

    std::env::remove_var("DUPS_NCPU");
    std::env::remove_var("DUPS_READ_ERRORS");
}

#[test]
fn test_config_load_from_toml() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");

    let toml_content = r#"
root = "/data/photos"
delete = true
emptydir = true
ncpu = 4
read_errors = "skip"
output = "json"
"#;
    fs::write(&config_path, toml_content).unwrap();

    let figment =
        Figment::from(Serialized::defaults(Config::default())).merge(Toml::file(&config_path));
    let config: Config = figment.extract().unwrap();

    assert_eq!(config.root, PathBuf::from("/data/photos"));
    assert!(config.delete);
    assert!(config.emptydir);
    assert_eq!(config.ncpu, Some(4));
    assert_eq!(config.read_errors, ReadErrorPolicy::Skip);
    assert_eq!(config.output, OutputFormat::Json);
}

#[test]
fn test_partial_toml_keeps_defaults() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "ncpu = 2\n").unwrap();

    let config: Config = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract()
        .unwrap();

    assert_eq!(config.ncpu, Some(2));
    assert_eq!(config.root, PathBuf::from("test"));
    assert!(!config.delete);
}

#[test]
fn test_invalid_toml_value_is_rejected() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "read_errors = \"ignore\"\n").unwrap();

    let result: Result<Config, _> = Figment::from(Serialized::defaults(Config::default()))
        .merge(Toml::file(&config_path))
        .extract();
    assert!(result.is_err());
}

#[test]
fn test_cli_overrides_file() {
    let temp_dir = tempdir().unwrap();
    let config_path = temp_dir.path().join("config.toml");
    fs::write(&config_path, "root = \"/from/file\"\nemptydir = true\n").unwrap();

    let cli = Cli::try_parse_from([
        "dups",
        "--config",
        config_path.to_str().unwrap(),
        "--root",
        "/from/cli",
    ])
    .unwrap();
    let config = Config::load(&cli).unwrap();

    assert_eq!(config.root, PathBuf::from("/from/cli"));
    assert!(config.emptydir);
}
