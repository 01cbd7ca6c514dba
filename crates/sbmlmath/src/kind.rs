use crate::extension::ExtensionKind;
use std::fmt::{Display, Formatter};

/// Allowed child counts for a kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Arity {
    /// One of a fixed set of counts, ascending.
    Exactly(&'static [usize]),
    AtLeast(usize),
    Any,
}

impl Arity {
    pub const NONE: Arity = Arity::Exactly(&[0]);
    pub const UNARY: Arity = Arity::Exactly(&[1]);
    pub const BINARY: Arity = Arity::Exactly(&[2]);
    pub const UNARY_OR_BINARY: Arity = Arity::Exactly(&[1, 2]);

    pub fn allows(self, count: usize) -> bool {
        match self {
            Arity::Exactly(counts) => counts.contains(&count),
            Arity::AtLeast(min) => count >= min,
            Arity::Any => true,
        }
    }

    pub fn min(self) -> usize {
        match self {
            Arity::Exactly(counts) => counts.first().copied().unwrap_or(0),
            Arity::AtLeast(min) => min,
            Arity::Any => 0,
        }
    }

    pub fn max(self) -> Option<usize> {
        match self {
            Arity::Exactly(counts) => Some(counts.last().copied().unwrap_or(0)),
            Arity::AtLeast(_) | Arity::Any => None,
        }
    }
}

impl Display for Arity {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Arity::Exactly(counts) => {
                let rendered = counts.iter().map(usize::to_string).collect::<Vec<_>>();
                write!(f, "exactly {}", rendered.join(" or "))
            }
            Arity::AtLeast(min) => write!(f, "at least {min}"),
            Arity::Any => write!(f, "any number of"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KindGroup {
    Arithmetic,
    Number,
    Name,
    Constant,
    Lambda,
    Function,
    Logical,
    Relational,
    LinearAlgebra,
    Quantifier,
    Statistics,
    Series,
    Algebra,
    Relation,
    Calculus,
    SetTheory,
    ContentConstant,
    BasicContent,
    Extension,
    Unknown,
}

/// How a kind is spelled in content MathML.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathmlForm {
    /// Empty element heading an `<apply>`.
    Operator(&'static str),
    /// Element wrapping its operands directly.
    Container(&'static str),
    /// Empty element standing for a value.
    Constant(&'static str),
    /// `<csymbol>` under the SBML symbol namespace.
    SbmlSymbol(&'static str),
    Number,
    Identifier,
    UserFunction,
    Extension,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AstKind {
    Plus,
    Minus,
    Times,
    Divide,
    Power,

    Integer,
    Real,
    RealE,
    Rational,

    Name,
    Avogadro,
    Time,

    ExponentialE,
    False,
    Pi,
    True,

    Lambda,

    Function,
    Abs,
    Arccos,
    Arccosh,
    Arccot,
    Arccoth,
    Arccsc,
    Arccsch,
    Arcsec,
    Arcsech,
    Arcsin,
    Arcsinh,
    Arctan,
    Arctanh,
    Ceiling,
    Cos,
    Cosh,
    Cot,
    Coth,
    Csc,
    Csch,
    Delay,
    Exp,
    Factorial,
    Floor,
    Ln,
    Log,
    Piecewise,
    Pow,
    Root,
    Sec,
    Sech,
    Sin,
    Sinh,
    Tan,
    Tanh,

    And,
    Not,
    Or,
    Xor,

    Eq,
    Geq,
    Gt,
    Leq,
    Lt,
    Neq,

    Max,
    Min,
    Quotient,
    RateOf,
    Rem,
    Implies,

    Vector,
    Selector,
    Matrix,
    MatrixRow,
    Determinant,
    Transpose,
    VectorProduct,
    ScalarProduct,
    OuterProduct,

    Exists,
    Forall,

    Mean,
    Median,
    Mode,
    Moment,
    Sdev,
    Variance,
    MomentAbout,

    Product,
    Sum,
    Limit,
    TendsTo,

    Gcd,
    Conjugate,
    Arg,
    RealPart,
    ImaginaryPart,
    Lcm,

    Equivalent,
    Approx,
    FactorOf,

    Int,
    Diff,
    PartialDiff,
    LowLimit,
    UpLimit,
    Divergence,
    Grad,
    Curl,
    Laplacian,

    Set,
    List,
    Union,
    Intersect,
    In,
    NotIn,
    Subset,
    PrSubset,
    NotSubset,
    NotPrSubset,
    SetDiff,
    Card,
    CartesianProduct,

    ImaginaryI,
    Integers,
    Reals,
    Rationals,
    NaturalNumbers,
    Complexes,
    Primes,
    EmptySet,
    EulerGamma,

    Interval,
    Inverse,
    Condition,
    Declare,
    Compose,
    Ident,
    Domain,
    Codomain,
    Image,
    DomainOfApplication,
    BoundVariable,
    Degree,

    Extension(ExtensionKind),
    Unknown,
}

/// Payload a node of a given kind carries besides its children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadClass {
    None,
    Integer,
    Real,
    RealE,
    Rational,
    Name,
    Raw,
}

use AstKind::*;

impl AstKind {
    /// Every kind the engine owns; extension kinds are supplied by packages.
    pub const BUILTIN: &'static [AstKind] = &[
        Plus, Minus, Times, Divide, Power, Integer, Real, RealE, Rational, Name, Avogadro, Time,
        ExponentialE, False, Pi, True, Lambda, Function, Abs, Arccos, Arccosh, Arccot, Arccoth,
        Arccsc, Arccsch, Arcsec, Arcsech, Arcsin, Arcsinh, Arctan, Arctanh, Ceiling, Cos, Cosh,
        Cot, Coth, Csc, Csch, Delay, Exp, Factorial, Floor, Ln, Log, Piecewise, Pow, Root, Sec,
        Sech, Sin, Sinh, Tan, Tanh, And, Not, Or, Xor, Eq, Geq, Gt, Leq, Lt, Neq, Max, Min,
        Quotient, RateOf, Rem, Implies, Vector, Selector, Matrix, MatrixRow, Determinant,
        Transpose, VectorProduct, ScalarProduct, OuterProduct, Exists, Forall, Mean, Median,
        Mode, Moment, Sdev, Variance, MomentAbout, Product, Sum, Limit, TendsTo, Gcd, Conjugate,
        Arg, RealPart, ImaginaryPart, Lcm, Equivalent, Approx, FactorOf, Int, Diff, PartialDiff,
        LowLimit, UpLimit, Divergence, Grad, Curl, Laplacian, Set, List, Union, Intersect, In,
        NotIn, Subset, PrSubset, NotSubset, NotPrSubset, SetDiff, Card, CartesianProduct,
        ImaginaryI, Integers, Reals, Rationals, NaturalNumbers, Complexes, Primes, EmptySet,
        EulerGamma, Interval, Inverse, Condition, Declare, Compose, Ident, Domain, Codomain,
        Image, DomainOfApplication, BoundVariable, Degree, Unknown,
    ];

    pub fn group(self) -> KindGroup {
        match self {
            Plus | Minus | Times | Divide | Power => KindGroup::Arithmetic,
            Integer | Real | RealE | Rational => KindGroup::Number,
            Name | Avogadro | Time => KindGroup::Name,
            ExponentialE | False | Pi | True => KindGroup::Constant,
            Lambda => KindGroup::Lambda,
            Function | Abs | Arccos | Arccosh | Arccot | Arccoth | Arccsc | Arccsch | Arcsec
            | Arcsech | Arcsin | Arcsinh | Arctan | Arctanh | Ceiling | Cos | Cosh | Cot | Coth
            | Csc | Csch | Delay | Exp | Factorial | Floor | Ln | Log | Piecewise | Pow | Root
            | Sec | Sech | Sin | Sinh | Tan | Tanh | Max | Min | Quotient | RateOf | Rem => {
                KindGroup::Function
            }
            And | Not | Or | Xor | Implies => KindGroup::Logical,
            Eq | Geq | Gt | Leq | Lt | Neq => KindGroup::Relational,
            Vector | Selector | Matrix | MatrixRow | Determinant | Transpose | VectorProduct
            | ScalarProduct | OuterProduct => KindGroup::LinearAlgebra,
            Exists | Forall => KindGroup::Quantifier,
            Mean | Median | Mode | Moment | Sdev | Variance | MomentAbout => KindGroup::Statistics,
            Product | Sum | Limit | TendsTo => KindGroup::Series,
            Gcd | Conjugate | Arg | RealPart | ImaginaryPart | Lcm => KindGroup::Algebra,
            Equivalent | Approx | FactorOf => KindGroup::Relation,
            Int | Diff | PartialDiff | LowLimit | UpLimit | Divergence | Grad | Curl | Laplacian => {
                KindGroup::Calculus
            }
            Set | List | Union | Intersect | In | NotIn | Subset | PrSubset | NotSubset
            | NotPrSubset | SetDiff | Card | CartesianProduct => KindGroup::SetTheory,
            ImaginaryI | Integers | Reals | Rationals | NaturalNumbers | Complexes | Primes
            | EmptySet | EulerGamma => KindGroup::ContentConstant,
            Interval | Inverse | Condition | Declare | Compose | Ident | Domain | Codomain
            | Image | DomainOfApplication | BoundVariable | Degree => KindGroup::BasicContent,
            Extension(_) => KindGroup::Extension,
            Unknown => KindGroup::Unknown,
        }
    }

    pub fn arity(self) -> Arity {
        match self {
            Plus | Times | Function | Piecewise | And | Or | Xor => Arity::Any,
            Minus | Log | Root => Arity::UNARY_OR_BINARY,
            Divide | Power | Pow | Delay | Neq | Quotient | Rem | Implies => Arity::BINARY,
            Lambda => Arity::AtLeast(2),
            Eq | Geq | Gt | Leq | Lt | Max | Min => Arity::AtLeast(1),
            Abs | Arccos | Arccosh | Arccot | Arccoth | Arccsc | Arccsch | Arcsec | Arcsech
            | Arcsin | Arcsinh | Arctan | Arctanh | Ceiling | Cos | Cosh | Cot | Coth | Csc
            | Csch | Exp | Factorial | Floor | Ln | Sec | Sech | Sin | Sinh | Tan | Tanh | Not
            | RateOf => Arity::UNARY,
            LowLimit | UpLimit | Condition | Degree | MomentAbout | DomainOfApplication
            | BoundVariable => Arity::UNARY,
            Extension(extension) => extension.arity,
            Unknown => Arity::NONE,
            _ => match self.group() {
                KindGroup::Number
                | KindGroup::Name
                | KindGroup::Constant
                | KindGroup::ContentConstant => Arity::NONE,
                _ => Arity::Any,
            },
        }
    }

    pub fn payload_class(self) -> PayloadClass {
        match self {
            Integer => PayloadClass::Integer,
            Real => PayloadClass::Real,
            RealE => PayloadClass::RealE,
            Rational => PayloadClass::Rational,
            Name | Avogadro | Time | Function | Delay | RateOf => PayloadClass::Name,
            Unknown => PayloadClass::Raw,
            _ => PayloadClass::None,
        }
    }

    pub fn is_number(self) -> bool {
        self.group() == KindGroup::Number
    }

    pub fn is_extension(self) -> bool {
        matches!(self, Extension(_))
    }

    /// Kinds the infix notation can spell.
    pub fn is_infix_expressible(self) -> bool {
        matches!(
            self.group(),
            KindGroup::Arithmetic
                | KindGroup::Number
                | KindGroup::Name
                | KindGroup::Constant
                | KindGroup::Lambda
                | KindGroup::Function
                | KindGroup::Logical
                | KindGroup::Relational
        )
    }

    pub fn mathml_form(self) -> MathmlForm {
        match self {
            Integer | Real | RealE | Rational => MathmlForm::Number,
            Name => MathmlForm::Identifier,
            Function => MathmlForm::UserFunction,
            Time => MathmlForm::SbmlSymbol("time"),
            Avogadro => MathmlForm::SbmlSymbol("avogadro"),
            Delay => MathmlForm::SbmlSymbol("delay"),
            RateOf => MathmlForm::SbmlSymbol("rateOf"),
            Extension(_) => MathmlForm::Extension,
            Unknown => MathmlForm::Unknown,
            ExponentialE => MathmlForm::Constant("exponentiale"),
            False => MathmlForm::Constant("false"),
            Pi => MathmlForm::Constant("pi"),
            True => MathmlForm::Constant("true"),
            ImaginaryI => MathmlForm::Constant("imaginaryi"),
            Integers => MathmlForm::Constant("integers"),
            Reals => MathmlForm::Constant("reals"),
            Rationals => MathmlForm::Constant("rationals"),
            NaturalNumbers => MathmlForm::Constant("naturalnumbers"),
            Complexes => MathmlForm::Constant("complexes"),
            Primes => MathmlForm::Constant("primes"),
            EmptySet => MathmlForm::Constant("emptyset"),
            EulerGamma => MathmlForm::Constant("eulergamma"),
            Lambda => MathmlForm::Container("lambda"),
            Piecewise => MathmlForm::Container("piecewise"),
            Vector => MathmlForm::Container("vector"),
            Matrix => MathmlForm::Container("matrix"),
            MatrixRow => MathmlForm::Container("matrixrow"),
            MomentAbout => MathmlForm::Container("momentabout"),
            LowLimit => MathmlForm::Container("lowlimit"),
            UpLimit => MathmlForm::Container("uplimit"),
            Set => MathmlForm::Container("set"),
            List => MathmlForm::Container("list"),
            Interval => MathmlForm::Container("interval"),
            Condition => MathmlForm::Container("condition"),
            Declare => MathmlForm::Container("declare"),
            DomainOfApplication => MathmlForm::Container("domainofapplication"),
            BoundVariable => MathmlForm::Container("bvar"),
            Degree => MathmlForm::Container("degree"),
            other => MathmlForm::Operator(other.operator_element()),
        }
    }

    fn operator_element(self) -> &'static str {
        match self {
            Plus => "plus",
            Minus => "minus",
            Times => "times",
            Divide => "divide",
            Power | Pow => "power",
            Abs => "abs",
            Arccos => "arccos",
            Arccosh => "arccosh",
            Arccot => "arccot",
            Arccoth => "arccoth",
            Arccsc => "arccsc",
            Arccsch => "arccsch",
            Arcsec => "arcsec",
            Arcsech => "arcsech",
            Arcsin => "arcsin",
            Arcsinh => "arcsinh",
            Arctan => "arctan",
            Arctanh => "arctanh",
            Ceiling => "ceiling",
            Cos => "cos",
            Cosh => "cosh",
            Cot => "cot",
            Coth => "coth",
            Csc => "csc",
            Csch => "csch",
            Exp => "exp",
            Factorial => "factorial",
            Floor => "floor",
            Ln => "ln",
            Log => "log",
            Root => "root",
            Sec => "sec",
            Sech => "sech",
            Sin => "sin",
            Sinh => "sinh",
            Tan => "tan",
            Tanh => "tanh",
            And => "and",
            Not => "not",
            Or => "or",
            Xor => "xor",
            Eq => "eq",
            Geq => "geq",
            Gt => "gt",
            Leq => "leq",
            Lt => "lt",
            Neq => "neq",
            Max => "max",
            Min => "min",
            Quotient => "quotient",
            Rem => "rem",
            Implies => "implies",
            Selector => "selector",
            Determinant => "determinant",
            Transpose => "transpose",
            VectorProduct => "vectorproduct",
            ScalarProduct => "scalarproduct",
            OuterProduct => "outerproduct",
            Exists => "exists",
            Forall => "forall",
            Mean => "mean",
            Median => "median",
            Mode => "mode",
            Moment => "moment",
            Sdev => "sdev",
            Variance => "variance",
            Product => "product",
            Sum => "sum",
            Limit => "limit",
            TendsTo => "tendsto",
            Gcd => "gcd",
            Conjugate => "conjugate",
            Arg => "arg",
            RealPart => "real",
            ImaginaryPart => "imaginary",
            Lcm => "lcm",
            Equivalent => "equivalent",
            Approx => "approx",
            FactorOf => "factorof",
            Int => "int",
            Diff => "diff",
            PartialDiff => "partialdiff",
            Divergence => "divergence",
            Grad => "grad",
            Curl => "curl",
            Laplacian => "laplacian",
            Union => "union",
            Intersect => "intersect",
            In => "in",
            NotIn => "notin",
            Subset => "subset",
            PrSubset => "prsubset",
            NotSubset => "notsubset",
            NotPrSubset => "notprsubset",
            SetDiff => "setdiff",
            Card => "card",
            CartesianProduct => "cartesianproduct",
            Inverse => "inverse",
            Compose => "compose",
            Ident => "ident",
            Domain => "domain",
            Codomain => "codomain",
            Image => "image",
            _ => "unknown",
        }
    }

    /// Kind of an operator element heading an `<apply>`; `<power/>` reads as [`AstKind::Power`].
    pub fn from_operator_element(name: &str) -> Option<AstKind> {
        Self::BUILTIN
            .iter()
            .copied()
            .find(|kind| matches!(kind.mathml_form(), MathmlForm::Operator(element) if element == name))
    }

    pub fn from_container_element(name: &str) -> Option<AstKind> {
        Self::BUILTIN
            .iter()
            .copied()
            .find(|kind| matches!(kind.mathml_form(), MathmlForm::Container(element) if element == name))
    }

    pub fn from_constant_element(name: &str) -> Option<AstKind> {
        Self::BUILTIN
            .iter()
            .copied()
            .find(|kind| matches!(kind.mathml_form(), MathmlForm::Constant(element) if element == name))
    }

    pub fn from_sbml_symbol(name: &str) -> Option<AstKind> {
        Self::BUILTIN
            .iter()
            .copied()
            .find(|kind| matches!(kind.mathml_form(), MathmlForm::SbmlSymbol(element) if element == name))
    }

    /// Keyword the infix notation uses for this kind, either as a call
    /// name or as a bare reserved word.
    pub fn infix_keyword(self) -> Option<&'static str> {
        if !self.is_infix_expressible() {
            return None;
        }
        match self {
            Integer | Real | RealE | Rational | Name | Function => None,
            Time => Some("time"),
            Avogadro => Some("avogadro"),
            Pow => Some("pow"),
            Delay => Some("delay"),
            RateOf => Some("rateOf"),
            Lambda => Some("lambda"),
            Piecewise => Some("piecewise"),
            other => match other.mathml_form() {
                MathmlForm::Operator(element) | MathmlForm::Constant(element) => Some(element),
                _ => None,
            },
        }
    }

    /// Whether the infix notation spells this kind as `keyword(args)`.
    pub fn is_callable(self) -> bool {
        self.is_infix_expressible()
            && !matches!(
                self.group(),
                KindGroup::Number | KindGroup::Name | KindGroup::Constant
            )
    }

    /// Built-in kind a call name stands for (SBML Level 3 Version 2 keywords).
    pub fn from_function_name(name: &str) -> Option<AstKind> {
        let aliased = match name {
            "sqrt" => Some(Root),
            "log10" => Some(Log),
            "ceil" => Some(Ceiling),
            "acos" => Some(Arccos),
            "acosh" => Some(Arccosh),
            "acot" => Some(Arccot),
            "acoth" => Some(Arccoth),
            "acsc" => Some(Arccsc),
            "acsch" => Some(Arccsch),
            "asec" => Some(Arcsec),
            "asech" => Some(Arcsech),
            "asin" => Some(Arcsin),
            "asinh" => Some(Arcsinh),
            "atan" => Some(Arctan),
            "atanh" => Some(Arctanh),
            _ => None,
        };
        if aliased.is_some() {
            return aliased;
        }
        Self::BUILTIN
            .iter()
            .copied()
            .filter(|kind| kind.is_callable())
            .find(|kind| kind.infix_keyword() == Some(name))
    }

    /// Constant or symbol kind a bare reserved identifier stands for.
    pub fn from_reserved_name(name: &str) -> Option<AstKind> {
        match name {
            "time" => Some(Time),
            "avogadro" => Some(Avogadro),
            "pi" => Some(Pi),
            "exponentiale" => Some(ExponentialE),
            "true" => Some(True),
            "false" => Some(False),
            _ => None,
        }
    }
}

impl Display for AstKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Integer => write!(f, "integer"),
            Real => write!(f, "real"),
            RealE => write!(f, "e-notation"),
            Rational => write!(f, "rational"),
            Name => write!(f, "name"),
            Function => write!(f, "function"),
            Unknown => write!(f, "unknown"),
            Extension(extension) => write!(f, "{}:{}", extension.package, extension.name),
            other => match (other.infix_keyword(), other.mathml_form()) {
                (Some(keyword), _) => write!(f, "{keyword}"),
                (None, MathmlForm::Operator(name) | MathmlForm::Container(name) | MathmlForm::Constant(name)) => {
                    write!(f, "{name}")
                }
                _ => write!(f, "{other:?}"),
            },
        }
    }
}

#[cfg(test)]
#[path = "kind_test.rs"]
mod tests;
