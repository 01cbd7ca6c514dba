use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "sbmlmath")]
#[command(about = "Convert SBML formulas between infix text and MathML")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Commands {
    /// Parse an infix formula and write it as MathML.
    ToMathml(ConvertArgs),
    /// Read a MathML document and write it as an infix formula.
    ToInfix(ConvertArgs),
    /// Resolve generic names and calls to their dedicated kinds and write
    /// the result as MathML. Input starting with `<` is read as MathML,
    /// anything else as infix.
    Canonicalize(ConvertArgs),
}

impl Commands {
    pub fn args(&self) -> &ConvertArgs {
        match self {
            Commands::ToMathml(args) | Commands::ToInfix(args) | Commands::Canonicalize(args) => args,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Commands::ToMathml(_) => "to-mathml",
            Commands::ToInfix(_) => "to-infix",
            Commands::Canonicalize(_) => "canonicalize",
        }
    }
}

#[derive(Debug, Clone, ValueEnum, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ConvertArgs {
    /// Formula text given inline.
    #[arg(long, conflicts_with = "input")]
    pub formula: Option<String>,
    /// File holding the formula text.
    #[arg(long)]
    pub input: Option<PathBuf>,
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
    #[arg(long, default_value_t = false)]
    pub verbose: bool,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
