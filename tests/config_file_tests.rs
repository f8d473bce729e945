//! Integration tests for loading configuration files from disk.
//!
//! Covers the FileSource + ConfigStore path end to end:
//! - parsing and environment resolution of a realistic file
//! - change detection and reload behavior
//! - error reporting for missing and malformed files

use envconf::config::{Config, ConfigStore, FileSource, SharedConfigStore, Value};
use envconf::error::{ConfigError, ErrorCode, ErrorReport, ParseError, SourceError};
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const SETTINGS: &str = r#"[common]
basic_size_limit = 26214400
student_size_limit = 52428800
paid_users_size_limit = 2147483648
path = /srv/var/tmp/
path<itscript> = /srv/tmp/

[ftp]
name = "hello there, ftp uploading"
path = /tmp/
path<production> = /srv/var/tmp/
path<staging> = /srv/uploads/
path<ubuntu> = /etc/var/uploads
enabled = no

; This is a comment
[http]
name = "http uploading"
path = /tmp/
path<production> = /srv/var/tmp/
path<staging> = /srv/uploads/; This is another comment
params = array,of,values
"#;

const OTHER: &str = "\
[ftp]
path = /ftp/path
path<production> = /ftp/path/production
";

/// Write `content` into a fresh temp dir and return both.
fn write_config(name: &str, content: &str) -> (TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");
    let path = temp.path().join(name);
    fs::write(&path, content).expect("Failed to write config");
    (temp, path)
}

fn str_of<'a>(config: &'a Config, group: &str, param: &str) -> Option<&'a str> {
    config.get(group, param).and_then(Value::as_str)
}

#[test]
fn test_loads_valid_file_without_environments() {
    let (_temp, path) = write_config("settings.conf", SETTINGS);
    let mut store = ConfigStore::new(FileSource::new(&path));

    let config = store.load(Vec::<String>::new(), false).unwrap();
    assert_eq!(str_of(config, "ftp", "path"), Some("/tmp/"));
    assert_eq!(
        str_of(config, "ftp", "name"),
        Some("hello there, ftp uploading")
    );
    assert_eq!(config.get("ftp", "enabled"), Some(&Value::Boolean(false)));
    assert_eq!(
        config.get("common", "paid_users_size_limit"),
        Some(&Value::Integer(2_147_483_648))
    );
    assert_eq!(
        config.get("http", "params").and_then(Value::as_list),
        Some(&["array".to_string(), "of".to_string(), "values".to_string()][..])
    );
    assert_eq!(store.cached_text(), Some(SETTINGS));
}

#[test]
fn test_environment_overrides_from_file() {
    let (_temp, path) = write_config("settings.conf", SETTINGS);
    let mut store = ConfigStore::new(FileSource::new(&path));

    let config = store.load(["ubuntu", "production"], false).unwrap();
    assert_eq!(str_of(config, "ftp", "path"), Some("/etc/var/uploads"));
    assert_eq!(str_of(config, "http", "path"), Some("/srv/var/tmp/"));
    assert_eq!(str_of(config, "common", "path"), Some("/srv/var/tmp/"));
    assert!(config.is_override("ftp", "path", "ubuntu"));
    assert!(config.is_override("ftp", "path", "production"));
    assert!(!config.is_override("ftp", "path", "staging"));
    assert!(!config.is_override("ftp", "name", "ubuntu"));

    let config = store.load(["staging"], false).unwrap();
    assert_eq!(str_of(config, "http", "path"), Some("/srv/uploads/"));
    assert_eq!(store.parse_count(), 1);
}

#[test]
fn test_groups_in_declaration_order() {
    let (_temp, path) = write_config("settings.conf", SETTINGS);
    let mut store = ConfigStore::new(FileSource::new(&path));

    let config = store.load(["production"], false).unwrap();
    let groups: Vec<&str> = config.groups().collect();
    assert_eq!(groups, vec!["common", "ftp", "http"]);
    assert!(config.get("missing", "path").is_none());
    assert!(config.get("ftp", "missing").is_none());
}

#[test]
fn test_repeated_loads_parse_once() {
    let (_temp, path) = write_config("settings.conf", SETTINGS);
    let mut store = ConfigStore::new(FileSource::new(&path));

    for _ in 0..10_000 {
        let config = store.load(["ubuntu", "production"], false).unwrap();
        assert_eq!(str_of(config, "ftp", "path"), Some("/etc/var/uploads"));
    }
    assert_eq!(store.parse_count(), 1);
    assert!(!store.is_newly_loaded());
}

#[test]
fn test_file_change_is_picked_up() {
    let (_temp, path) = write_config("settings.conf", SETTINGS);
    let mut store = ConfigStore::new(FileSource::new(&path));
    store.load(["production"], false).unwrap();

    // Different length, so the fingerprint changes regardless of mtime resolution.
    fs::write(&path, OTHER).unwrap();
    let config = store.load(["production"], false).unwrap();
    assert_eq!(str_of(config, "ftp", "path"), Some("/ftp/path/production"));
    assert!(config.get("ftp", "name").is_none());
    assert!(store.is_newly_loaded());
    assert_eq!(store.parse_count(), 2);
}

#[test]
fn test_two_files_load_independently() {
    let (_temp_a, first) = write_config("settings.conf", SETTINGS);
    let (_temp_b, second) = write_config("other.conf", OTHER);

    let mut store = ConfigStore::new(FileSource::new(&first));
    let config = store.load(["ubuntu", "production"], false).unwrap();
    assert_eq!(str_of(config, "ftp", "path"), Some("/etc/var/uploads"));

    let mut other = ConfigStore::new(FileSource::new(&second));
    let config = other.load(["ubuntu", "production"], false).unwrap();
    assert_eq!(str_of(config, "ftp", "path"), Some("/ftp/path/production"));
    assert!(config.get("ftp", "name").is_none());
}

#[test]
fn test_missing_file_reports_not_found() {
    let temp = TempDir::new().unwrap();
    let mut store = ConfigStore::new(FileSource::new(temp.path().join("absent.conf")));

    let err = store.load(["production"], false).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Source(SourceError::NotFound { .. })
    ));
    assert_eq!(err.code(), ErrorCode::SourceNotFound);
    assert!(store.current().is_none());
}

#[test]
fn test_orphan_parameter_reports_line() {
    let (_temp, path) = write_config("broken.conf", "; header\n\nname = value\n[ftp]\n");
    let mut store = ConfigStore::new(FileSource::new(&path));

    let err = store.load(Vec::<String>::new(), false).unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Parse(ParseError::OrphanParameter { line: 3, .. })
    ));

    let report = ErrorReport::from(&err);
    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["code"], "ORPHAN_PARAMETER");
    assert_eq!(json["line"], 3);
}

#[test]
fn test_shared_store_over_file() {
    let (_temp, path) = write_config("settings.conf", SETTINGS);
    let shared = SharedConfigStore::new(FileSource::new(&path));

    let first = shared.load(["production"], false).unwrap();
    let second = shared.load(["production"], false).unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));

    fs::write(&path, OTHER).unwrap();
    let third = shared.load(["production"], false).unwrap();
    assert_eq!(str_of(&third, "ftp", "path"), Some("/ftp/path/production"));
    assert_eq!(str_of(&first, "ftp", "path"), Some("/srv/var/tmp/"));
    assert_eq!(shared.parse_count(), 2);
}
