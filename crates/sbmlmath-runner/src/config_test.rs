use super::{known_package, load_runner_config, validate_runner_config, LogLevel, RunnerConfig, RunnerConfigError};
use sbmlmath::MathPackage;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[test]
fn load_runner_config_parses_yaml_and_builds_options() {
    let path = write_temp_file(
        "config-ok",
        "yaml",
        r#"
schema: sbmlmath-runner/0.0.1
max_depth: 40
indent: 0
xml_declaration: true
canonicalize: true
packages: [distrib]
log_level: info
"#,
    );

    let config = load_runner_config(path.as_path()).expect("config must load");
    assert_eq!(config.log_level, Some(LogLevel::Info));
    assert!(config.canonicalize);
    let options = config.conversion_options();
    assert_eq!(options.max_depth, 40);
    assert_eq!(options.indent, 0);
    assert!(options.xml_declaration);
    let registry = config.build_registry().expect("registry must build");
    assert_eq!(registry.packages(), &["distrib"]);
}

#[test]
fn load_runner_config_accepts_json_with_defaults() {
    let path = write_temp_file("config-json", "json", r#"{"schema":"sbmlmath-runner/0.0.1"}"#);
    let config = load_runner_config(path.as_path()).expect("config must load");
    assert_eq!(config, RunnerConfig::default());
    assert!(config.build_registry().expect("empty registry").is_empty());
}

#[test]
fn load_runner_config_rejects_unknown_package_and_zero_depth() {
    let path = write_temp_file(
        "config-invalid",
        "yml",
        r#"
schema: sbmlmath-runner/0.0.1
max_depth: 0
packages: [distrib, comp]
"#,
    );

    let error = load_runner_config(path.as_path()).expect_err("must reject");
    match error {
        RunnerConfigError::Validation(diagnostics) => {
            let codes = diagnostics
                .iter()
                .map(|diagnostic| diagnostic.code.as_str())
                .collect::<Vec<_>>();
            assert_eq!(codes, vec!["runner.config.max_depth", "runner.config.package.unknown"]);
            assert_eq!(diagnostics[1].path.to_string(), "/packages[1]");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn validate_runner_config_reports_schema_and_duplicates() {
    let config = RunnerConfig {
        schema: "sbmlmath-runner/9".to_string(),
        packages: vec!["distrib".to_string(), "distrib".to_string()],
        ..RunnerConfig::default()
    };
    let diagnostics = validate_runner_config(&config);
    assert_eq!(diagnostics.len(), 2);
    assert_eq!(diagnostics[0].code, "runner.config.schema");
    assert_eq!(diagnostics[0].path.to_string(), "/schema");
    assert_eq!(diagnostics[1].code, "runner.config.package.duplicate");

    let registry_errors = config.build_registry().expect_err("duplicate registration");
    assert_eq!(registry_errors.len(), 1);
    assert_eq!(registry_errors[0].code, "runner.config.package.duplicate");
}

#[test]
fn load_runner_config_reports_unreadable_and_malformed_files() {
    let missing = std::env::temp_dir().join("sbmlmath-runner-does-not-exist.yaml");
    assert!(matches!(
        load_runner_config(missing.as_path()),
        Err(RunnerConfigError::ReadFile { .. })
    ));

    let path = write_temp_file("config-malformed", "json", "{ not json");
    assert!(matches!(
        load_runner_config(path.as_path()),
        Err(RunnerConfigError::Parse(_))
    ));
}

#[test]
fn known_packages_are_resolved_by_name() {
    assert_eq!(known_package("distrib").map(|package| package.name()), Some("distrib"));
    assert!(known_package("arrays").is_none());
}

fn write_temp_file(prefix: &str, extension: &str, content: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time must be monotonic")
        .as_nanos();
    path.push(format!(
        "sbmlmath-runner-{prefix}-{}-{nanos}.{extension}",
        std::process::id()
    ));
    fs::write(&path, content).expect("must write temp file");
    path
}
