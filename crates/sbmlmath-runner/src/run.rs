use crate::cli::{Commands, ConvertArgs, OutputFormat};
use crate::config::{load_runner_config, LogLevel, RunnerConfig, RunnerConfigError};
use sbmlmath::{
    canonicalize_with_extensions, format_formula_with_options, parse_formula_with_options,
    read_mathml_with, write_mathml_with, AstNode, ConversionOptions, ExtensionRegistry,
    FormatError, MathmlReadError, MathmlWriteError, ParseError,
};
use sbmlmath_core::Diagnostic;
use serde_json::{json, Value};
use std::fs;

const OUTPUT_SCHEMA: &str = "sbmlmath-runner-output/0.0.1";

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error("read file failed `{path}`: {source}")]
    ReadFile {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no formula given: pass `--formula <text>` or `--input <file>`")]
    MissingInput,
    #[error("runner config load failed: {0}")]
    ConfigLoad(#[from] RunnerConfigError),
    #[error("runner config packages invalid: {0:?}")]
    Packages(Vec<Diagnostic>),
    #[error("infix parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("infix format failed: {0}")]
    Format(#[from] FormatError),
    #[error("MathML read failed: {0}")]
    ReadMathml(#[from] MathmlReadError),
    #[error("MathML write failed: {0}")]
    WriteMathml(#[from] MathmlWriteError),
    #[error("json encode failed: {0}")]
    JsonEncode(#[from] serde_json::Error),
}

/// Everything one invocation needs: the loaded configuration, the
/// vocabulary it selects and the formula text.
#[derive(Debug)]
pub struct Session {
    pub config: RunnerConfig,
    pub registry: ExtensionRegistry,
    pub source: String,
    pub format: OutputFormat,
}

impl Session {
    pub fn open(args: &ConvertArgs) -> Result<Self, RunnerError> {
        let config = match &args.config {
            Some(path) => load_runner_config(path)?,
            None => RunnerConfig::default(),
        };
        let registry = config.build_registry().map_err(RunnerError::Packages)?;
        let source = match (&args.formula, &args.input) {
            (Some(formula), _) => formula.clone(),
            (None, Some(path)) => fs::read_to_string(path).map_err(|source| RunnerError::ReadFile {
                path: path.display().to_string(),
                source,
            })?,
            (None, None) => return Err(RunnerError::MissingInput),
        };
        Ok(Self {
            config,
            registry,
            source,
            format: args.format.clone(),
        })
    }

    /// `--verbose` wins over the configured level; warnings otherwise.
    pub fn log_level(&self, verbose: bool) -> LogLevel {
        if verbose {
            LogLevel::Debug
        } else {
            self.config.log_level.unwrap_or(LogLevel::Warn)
        }
    }

    fn options(&self) -> ConversionOptions {
        self.config.conversion_options()
    }

    fn formula(&self) -> &str {
        self.source.trim()
    }

    fn is_mathml(&self) -> bool {
        self.formula().starts_with('<')
    }
}

/// Outcome of one conversion before it is rendered.
struct Conversion {
    output: String,
    rewrites: Option<usize>,
    diagnostics: Vec<Diagnostic>,
}

pub fn execute(command: &Commands, session: &Session) -> Result<String, RunnerError> {
    let conversion = match command {
        Commands::ToMathml(_) => to_mathml(session)?,
        Commands::ToInfix(_) => to_infix(session)?,
        Commands::Canonicalize(_) => canonicalize(session)?,
    };
    render_output(command.name(), session, conversion)
}

pub fn execute_to_mathml(args: &ConvertArgs) -> Result<String, RunnerError> {
    execute(&Commands::ToMathml(args.clone()), &Session::open(args)?)
}

pub fn execute_to_infix(args: &ConvertArgs) -> Result<String, RunnerError> {
    execute(&Commands::ToInfix(args.clone()), &Session::open(args)?)
}

pub fn execute_canonicalize(args: &ConvertArgs) -> Result<String, RunnerError> {
    execute(&Commands::Canonicalize(args.clone()), &Session::open(args)?)
}

fn to_mathml(session: &Session) -> Result<Conversion, RunnerError> {
    let options = session.options();
    let mut tree = parse_formula_with_options(session.formula(), &options)?;
    let rewrites = maybe_canonicalize(session, &mut tree);
    let output = write_mathml_with(&tree, &session.registry, &options)?;
    Ok(Conversion {
        output,
        rewrites,
        diagnostics: Vec::new(),
    })
}

fn to_infix(session: &Session) -> Result<Conversion, RunnerError> {
    let options = session.options();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut tree = read_mathml_with(session.formula(), &session.registry, &options, &mut diagnostics)?;
    let rewrites = maybe_canonicalize(session, &mut tree);
    let output = format_formula_with_options(&tree, &options)?;
    Ok(Conversion {
        output,
        rewrites,
        diagnostics,
    })
}

fn canonicalize(session: &Session) -> Result<Conversion, RunnerError> {
    let options = session.options();
    let mut diagnostics: Vec<Diagnostic> = Vec::new();
    let mut tree = if session.is_mathml() {
        read_mathml_with(session.formula(), &session.registry, &options, &mut diagnostics)?
    } else {
        parse_formula_with_options(session.formula(), &options)?
    };
    let rewrites = canonicalize_with_extensions(&mut tree, &session.registry);
    let output = write_mathml_with(&tree, &session.registry, &options)?;
    Ok(Conversion {
        output,
        rewrites: Some(rewrites),
        diagnostics,
    })
}

fn maybe_canonicalize(session: &Session, tree: &mut AstNode) -> Option<usize> {
    session
        .config
        .canonicalize
        .then(|| canonicalize_with_extensions(tree, &session.registry))
}

fn render_output(
    command: &str,
    session: &Session,
    mut conversion: Conversion,
) -> Result<String, RunnerError> {
    Diagnostic::sort_stable(&mut conversion.diagnostics);
    let output = match session.format {
        OutputFormat::Json => serde_json::to_string_pretty(&json!({
            "schema": OUTPUT_SCHEMA,
            "command": command,
            "output": conversion.output,
            "rewrites": conversion.rewrites.map_or(Value::Null, Value::from),
            "diagnostics": conversion.diagnostics,
        }))?,
        // diagnostics already went to the log on stderr
        OutputFormat::Text => conversion.output,
    };
    Ok(output)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
