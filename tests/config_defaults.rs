use junitfmt::JunitOptions;
use junitfmt::config::Config;

#[test]
fn test_default_config_values() {
    let config = Config::default();

    assert_eq!(config.report.suite_name, "");
    assert_eq!(config.report.default_cause_type, "Exception");
    assert_eq!(config.report.indent, 2);
    assert!(config.output.path.is_none());
}

#[test]
fn test_default_config_matches_formatter_defaults() {
    assert_eq!(Config::default().junit_options(), JunitOptions::default());
}

#[test]
fn test_load_from_file() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    let path = temp_dir.path().join(".junitfmtrc.toml");
    std::fs::write(&path, "[report]\nsuite_name = \"nightly\"\nindent = 0\n")
        .expect("Failed to write config");

    let config = Config::load_from_file(&path).expect("Failed to load config");
    let options = config.junit_options();

    assert_eq!(options.fallback_suite_name, "nightly");
    assert_eq!(options.indent, 0);
    assert_eq!(options.default_cause_type, "Exception");
}

#[test]
fn test_load_from_missing_file() {
    let temp_dir = tempfile::TempDir::new().expect("Failed to create temp dir");
    assert!(Config::load_from_file(&temp_dir.path().join("missing.toml")).is_none());
}
