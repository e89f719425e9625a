use kernel::adt::Constructor;
use num_bigint::BigUint;
use serde::{Serialize, Serializer};

pub mod errors;
pub mod lower;
pub mod pretty;
pub mod types;

#[cfg(test)]
mod snapshots;

pub use errors::EraseError;
pub use lower::{compile, compile_all, dependency_sort, CompiledDef, Erasure, Program};

/// What an `Eliminate` or `Instantiate` node converts from or to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// A primitive type with a native representation
    Prim(String),
    /// A Self-encoded datatype
    Adt(Vec<Constructor>),
}

/// Untyped runtime term. Types, erased arguments and erased binders are gone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "ctor")]
pub enum Erased {
    Var {
        name: String,
    },
    Ref {
        name: String,
    },
    /// The runtime value of anything type-valued
    Unit,
    Lam {
        name: String,
        body: Box<Erased>,
    },
    App {
        func: Box<Erased>,
        argm: Box<Erased>,
    },
    Let {
        name: String,
        expr: Box<Erased>,
        body: Box<Erased>,
    },
    /// Turn a value of `tag` into its Scott-encoded eliminator
    Eliminate {
        tag: Tag,
        expr: Box<Erased>,
    },
    /// Turn a Scott-encoded value into the native representation of `tag`
    Instantiate {
        tag: Tag,
        expr: Box<Erased>,
    },
    Nat {
        #[serde(serialize_with = "as_decimal")]
        value: BigUint,
    },
    Chr {
        value: char,
    },
    Str {
        value: String,
    },
}

fn as_decimal<S: Serializer>(n: &BigUint, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(n)
}

impl Erased {
    pub fn var(name: impl Into<String>) -> Self {
        Erased::Var { name: name.into() }
    }

    pub fn reference(name: impl Into<String>) -> Self {
        Erased::Ref { name: name.into() }
    }

    pub fn lam(name: impl Into<String>, body: Erased) -> Self {
        Erased::Lam {
            name: name.into(),
            body: Box::new(body),
        }
    }

    pub fn app(func: Erased, argm: Erased) -> Self {
        Erased::App {
            func: Box::new(func),
            argm: Box::new(argm),
        }
    }

    pub fn let_in(name: impl Into<String>, expr: Erased, body: Erased) -> Self {
        Erased::Let {
            name: name.into(),
            expr: Box::new(expr),
            body: Box::new(body),
        }
    }

    pub fn eliminate(tag: Tag, expr: Erased) -> Self {
        Erased::Eliminate {
            tag,
            expr: Box::new(expr),
        }
    }

    pub fn instantiate(tag: Tag, expr: Erased) -> Self {
        Erased::Instantiate {
            tag,
            expr: Box::new(expr),
        }
    }

    /// Number of leading lambdas.
    pub fn arity(&self) -> usize {
        let mut arity = 0;
        let mut term = self;
        while let Erased::Lam { body, .. } = term {
            arity += 1;
            term = body;
        }
        arity
    }
}
