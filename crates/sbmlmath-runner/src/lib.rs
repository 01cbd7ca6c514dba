mod cli;
mod config;
mod logger;
mod run;

pub use cli::{Cli, Commands, ConvertArgs, OutputFormat};
pub use config::{
    known_package, load_runner_config, validate_runner_config, LogLevel, RunnerConfig,
    RunnerConfigError,
};
pub use logger::init_logging;
pub use run::{
    execute, execute_canonicalize, execute_to_infix, execute_to_mathml, RunnerError, Session,
};
