//! Recognition of Self-encoded inductive types.
//!
//! A datatype is written as a `Pi` whose self binder ends in `.Self`, over a
//! motive `P`, followed by one `Pi` per constructor:
//!
//! ```text
//! Bool : * = %Bool.Self(P:@(x:Bool)*) @(true:(P Bool.true)) @(false:(P Bool.false)) (P Bool.Self);
//! ```
//!
//! Each constructor case is a chain of `Pi`s (its fields, erased ones dropped)
//! ending in `P` applied to the constructor.

use crate::ast::Term;
use crate::checker::Env;
use crate::reduce::reduce;
use serde::Serialize;
use std::rc::Rc;

/// Suffix of the self binder that marks a type-level self reference.
pub const SELF_SUFFIX: &str = ".Self";

/// Name given to the motive placeholder.
pub const MOTIVE: &str = "P";

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Constructor {
    pub name: String,
    pub fields: Vec<String>,
}

/// Recover the constructors of a Self-encoded type, in declaration order.
///
/// `depth` is the size of the context `ty` lives in. Returns `None` when the
/// type does not have the expected shape.
pub fn as_adt(env: &Env, ty: &Rc<Term>, depth: usize) -> Option<Vec<Constructor>> {
    let ty = reduce(ty, env);
    let Term::All { self_name, body, .. } = ty.as_ref() else {
        return None;
    };
    if !self_name.ends_with(SELF_SUFFIX) {
        return None;
    }
    let motive = depth + 1;
    let mut term = body.open(&[Term::var("self", depth), Term::var(MOTIVE, motive)]);
    let mut next = depth + 2;
    let mut ctors = Vec::new();
    loop {
        let (ctor, rest) = match term.as_ref() {
            Term::All { self_name, name, bind, body, .. } => {
                let ctor = constructor(bind, motive, next + 2)?;
                let rest = body.open(&[Term::var(self_name, next), Term::var(name, next + 1)]);
                (ctor, rest)
            }
            _ => break,
        };
        ctors.push(ctor);
        term = rest;
        next += 2;
    }
    Some(ctors)
}

fn head(mut term: &Rc<Term>) -> &Rc<Term> {
    while let Term::App(func, _) = term.as_ref() {
        term = func;
    }
    term
}

fn constructor(case: &Rc<Term>, motive: usize, mut next: usize) -> Option<Constructor> {
    let mut fields = Vec::new();
    let mut term = case.clone();
    loop {
        let rest = match term.as_ref() {
            Term::All { eras, name, body, .. } => {
                if !eras {
                    fields.push(name.clone());
                }
                body.open(&[Term::var("", next), Term::var(name, next + 1)])
            }
            Term::App(func, argm) => {
                return match (head(func).as_ref(), head(argm).as_ref()) {
                    (Term::Var(p, level), Term::Ref(name)) if p == MOTIVE && *level == motive => {
                        Some(Constructor { name: name.clone(), fields })
                    }
                    _ => None,
                };
            }
            _ => return None,
        };
        term = rest;
        next += 2;
    }
}
