//! Content MathML codec.

pub mod reader;
pub mod writer;

pub use reader::{read_mathml, read_mathml_with, MathmlReadError};
pub use writer::{write_mathml, write_mathml_with, MathmlWriteError};

pub const MATHML_NS: &str = "http://www.w3.org/1998/Math/MathML";
/// Namespace of the SBML csymbols (`time`, `avogadro`, `delay`, `rateOf`).
pub const SBML_SYMBOLS_NS: &str = "http://www.sbml.org/sbml/symbols/";

/// Diagnostic codes raised while reading.
pub const UNKNOWN_CSYMBOL: &str = "mathml.csymbol.unknown";
pub const UNKNOWN_ELEMENT: &str = "mathml.element.unknown";
