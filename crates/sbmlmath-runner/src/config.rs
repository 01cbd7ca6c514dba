use sbmlmath::{ConversionOptions, ExtensionRegistry, MathPackage};
use sbmlmath_core::{Diagnostic, NodePath};
use sbmlmath_distrib::DistribPackage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const RUNNER_SCHEMA: &str = "sbmlmath-runner/0.0.1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    #[serde(default = "default_runner_schema")]
    pub schema: String,
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,
    #[serde(default = "default_indent")]
    pub indent: usize,
    #[serde(default)]
    pub xml_declaration: bool,
    /// Run the canonicaliser between reading and writing.
    #[serde(default)]
    pub canonicalize: bool,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub log_level: Option<LogLevel>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            schema: default_runner_schema(),
            max_depth: default_max_depth(),
            indent: default_indent(),
            xml_declaration: false,
            canonicalize: false,
            packages: Vec::new(),
            log_level: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for tracing::Level {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RunnerConfigError {
    #[error("read runner config failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("runner config parse failed: {0}")]
    Parse(String),
    #[error("runner config validation failed: {0:?}")]
    Validation(Vec<Diagnostic>),
}

impl RunnerConfig {
    pub fn conversion_options(&self) -> ConversionOptions {
        ConversionOptions::default()
            .with_max_depth(self.max_depth)
            .with_indent(self.indent)
            .with_xml_declaration(self.xml_declaration)
    }

    /// Registers every configured package; unknown or clashing packages are
    /// reported together.
    pub fn build_registry(&self) -> Result<ExtensionRegistry, Vec<Diagnostic>> {
        let mut registry = ExtensionRegistry::new();
        let mut diagnostics = Vec::new();
        for (index, name) in self.packages.iter().enumerate() {
            let Some(package) = known_package(name) else {
                diagnostics.push(unknown_package(index, name));
                continue;
            };
            if let Err(error) = registry.register_package(package) {
                diagnostics.push(config_diagnostic(
                    "runner.config.package.duplicate",
                    package_path(index),
                    error.to_string(),
                ));
            }
        }
        if diagnostics.is_empty() {
            Ok(registry)
        } else {
            Diagnostic::sort_stable(&mut diagnostics);
            Err(diagnostics)
        }
    }
}

/// Vocabulary packages the runner can load by name.
pub fn known_package(name: &str) -> Option<&'static dyn MathPackage> {
    match name {
        sbmlmath_distrib::PACKAGE => Some(&DistribPackage),
        _ => None,
    }
}

pub fn load_runner_config(path: &Path) -> Result<RunnerConfig, RunnerConfigError> {
    let raw = fs::read_to_string(path).map_err(|source| RunnerConfigError::ReadFile {
        path: path.display().to_string(),
        source,
    })?;
    let config: RunnerConfig = match path.extension().and_then(|ext| ext.to_str()) {
        Some("json") => serde_json::from_str(raw.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("json decode error: {error}")))?,
        Some("yaml") | Some("yml") => serde_yaml::from_str(raw.as_str())
            .map_err(|error| RunnerConfigError::Parse(format!("yaml decode error: {error}")))?,
        _ => serde_yaml::from_str(raw.as_str())
            .or_else(|_| serde_json::from_str(raw.as_str()))
            .map_err(|error| RunnerConfigError::Parse(error.to_string()))?,
    };

    let mut diagnostics = validate_runner_config(&config);
    Diagnostic::sort_stable(&mut diagnostics);
    if !diagnostics.is_empty() {
        return Err(RunnerConfigError::Validation(diagnostics));
    }
    tracing::debug!(path = %path.display(), "loaded runner config");
    Ok(config)
}

pub fn validate_runner_config(config: &RunnerConfig) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    if config.schema != RUNNER_SCHEMA {
        diagnostics.push(config_diagnostic(
            "runner.config.schema",
            field_path("schema"),
            format!(
                "unsupported runner config schema `{}` (expected `{RUNNER_SCHEMA}`)",
                config.schema
            ),
        ));
    }
    if config.max_depth == 0 {
        diagnostics.push(config_diagnostic(
            "runner.config.max_depth",
            field_path("max_depth"),
            "max_depth must be > 0".to_string(),
        ));
    }
    for (index, name) in config.packages.iter().enumerate() {
        if known_package(name).is_none() {
            diagnostics.push(unknown_package(index, name));
        }
        if config.packages[..index].contains(name) {
            diagnostics.push(config_diagnostic(
                "runner.config.package.duplicate",
                package_path(index),
                format!("package `{name}` is listed more than once"),
            ));
        }
    }
    diagnostics
}

fn unknown_package(index: usize, name: &str) -> Diagnostic {
    config_diagnostic(
        "runner.config.package.unknown",
        package_path(index),
        format!("unknown math package `{name}`"),
    )
}

fn field_path(field: &str) -> NodePath {
    let mut path = NodePath::root();
    path.push_element(field);
    path
}

fn package_path(index: usize) -> NodePath {
    let mut path = field_path("packages");
    path.push_index(index);
    path
}

fn config_diagnostic(code: &str, path: NodePath, message: String) -> Diagnostic {
    Diagnostic::error(code, message).with_path(path)
}

fn default_runner_schema() -> String {
    RUNNER_SCHEMA.to_string()
}

fn default_max_depth() -> usize {
    ConversionOptions::DEFAULT_MAX_DEPTH
}

fn default_indent() -> usize {
    ConversionOptions::default().indent
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
