//! Fleet file parsing.

use stager_core::fleet::load_fleet_file;
use tempfile::TempDir;

#[test]
fn loads_targets_in_file_order() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fleet.toml");
    std::fs::write(
        &path,
        r#"targets = ["fi-a.example.net", "fi-b.example.net"]"#,
    )
    .unwrap();

    let targets = load_fleet_file(&path).unwrap();
    assert_eq!(targets, vec!["fi-a.example.net", "fi-b.example.net"]);
}

#[test]
fn missing_targets_key_means_empty_fleet() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fleet.toml");
    std::fs::write(&path, "# nothing staged yet\n").unwrap();

    let targets = load_fleet_file(&path).unwrap();
    assert!(targets.is_empty());
}

#[test]
fn missing_file_error_names_the_path() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("absent.toml");

    let err = load_fleet_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("absent.toml"));
}

#[test]
fn malformed_toml_is_a_parse_error() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("fleet.toml");
    std::fs::write(&path, "targets = \"not-a-list\"").unwrap();

    let err = load_fleet_file(&path).unwrap_err();
    assert!(format!("{err:#}").contains("failed to parse fleet file"));
}
