use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VarName(pub String);

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CtorName(pub String);

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for CtorName {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// Every operator is integer-valued, including the comparisons (zero is false).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Eq,
    Lt,
    Lte,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Pattern {
    Unit,
    IntConst(i64),
    Any,
    Var(VarName),
    Ctor(CtorName, Box<Pattern>),
    Tuple(Vec<Pattern>),

    Span(usize, usize, Box<Pattern>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    Unit,
    IntLit(i64),
    Var(VarName),
    // The pattern's bindings are in scope in both the right-hand side and the body, which is how
    // a definition refers to itself.
    Let(Pattern, Box<Expr>, Box<Expr>),
    Fun(Pattern, Box<Expr>),
    If(Box<Expr>, Box<Expr>, Box<Expr>),
    Tuple(Vec<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    // Must have at least one case.
    Match(Box<Expr>, Vec<(Pattern, Expr)>),
    App(Box<Expr>, Box<Expr>),
    Ctor(CtorName, Box<Expr>),

    Span(usize, usize, Box<Expr>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Def {
    pub name: VarName,
    pub body: Expr,
}

/// A parsed program: a sequence of top-level definitions, each visible to the ones after it.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Program {
    /// The source file that the spans in this program point into, if it is available.
    #[serde(default)]
    pub source: Option<PathBuf>,
    pub defs: Vec<Def>,
}
