//! The SBML `distrib` package: probability distributions drawn inside a
//! formula, spelled as csymbols under [`DISTRIB_NS`]. Each takes its
//! distribution parameters, optionally followed by truncation bounds.

use sbmlmath::{Arity, ExtensionDef, ExtensionKind, MathPackage};

pub const PACKAGE: &str = "distrib";
pub const DISTRIB_NS: &str = "http://www.sbml.org/sbml/symbols/distrib/";

const fn distribution(name: &'static str, arity: Arity) -> ExtensionKind {
    ExtensionKind {
        package: PACKAGE,
        name,
        arity,
    }
}

pub const NORMAL: ExtensionKind = distribution("normal", Arity::Exactly(&[2, 4]));
pub const UNIFORM: ExtensionKind = distribution("uniform", Arity::BINARY);
pub const BERNOULLI: ExtensionKind = distribution("bernoulli", Arity::UNARY);
pub const BINOMIAL: ExtensionKind = distribution("binomial", Arity::Exactly(&[2, 4]));
pub const CAUCHY: ExtensionKind = distribution("cauchy", Arity::Exactly(&[2, 4]));
pub const CHISQUARE: ExtensionKind = distribution("chisquare", Arity::Exactly(&[1, 3]));
pub const EXPONENTIAL: ExtensionKind = distribution("exponential", Arity::Exactly(&[1, 3]));
pub const GAMMA: ExtensionKind = distribution("gamma", Arity::Exactly(&[2, 4]));
pub const LAPLACE: ExtensionKind = distribution("laplace", Arity::Exactly(&[2, 4]));
pub const LOGNORMAL: ExtensionKind = distribution("lognormal", Arity::Exactly(&[2, 4]));
pub const POISSON: ExtensionKind = distribution("poisson", Arity::Exactly(&[1, 3]));
pub const RAYLEIGH: ExtensionKind = distribution("rayleigh", Arity::Exactly(&[1, 3]));

pub const DISTRIBUTIONS: &[ExtensionKind] = &[
    NORMAL, UNIFORM, BERNOULLI, BINOMIAL, CAUCHY, CHISQUARE, EXPONENTIAL, GAMMA, LAPLACE,
    LOGNORMAL, POISSON, RAYLEIGH,
];

#[derive(Debug, Clone, Copy, Default)]
pub struct DistribPackage;

impl MathPackage for DistribPackage {
    fn name(&self) -> &'static str {
        PACKAGE
    }

    fn definitions(&self) -> Vec<ExtensionDef> {
        DISTRIBUTIONS
            .iter()
            .map(|kind| ExtensionDef::csymbol(*kind, DISTRIB_NS))
            .collect()
    }
}

#[cfg(test)]
#[path = "lib_test.rs"]
mod tests;
