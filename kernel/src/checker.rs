use crate::ast::Term;
use crate::defeq::equal;
use crate::reduce::{normalize, reduce};
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use thiserror::Error;
use tracing::{debug, instrument, trace};

#[derive(Error, Debug, Clone)]
pub enum TypeErrorKind {
    #[error("Unbound reference: '{0}'.")]
    UnboundReference(String),
    #[error("Unbound variable: '{0}'.")]
    UnboundVariable(String),
    #[error("Non-function application.")]
    NonFunctionApplication,
    #[error("Lambda has a non-function type.")]
    LambdaNotFunction,
    #[error("Found type: {found}\nInstead of: {expected}")]
    TypeMismatch { expected: Rc<Term>, found: Rc<Term> },
    #[error("Can't infer.")]
    CannotInfer,
}

/// A checker failure: what went wrong, on which term, under which hypotheses.
#[derive(Error, Debug, Clone)]
#[error("{kind}")]
pub struct TypeError {
    pub kind: TypeErrorKind,
    pub term: Rc<Term>,
    pub context: Context,
}

impl TypeError {
    pub fn new(kind: TypeErrorKind, term: &Rc<Term>, context: &Context) -> Self {
        TypeError {
            kind,
            term: term.clone(),
            context: context.clone(),
        }
    }
}

// =============================================================================
// Context
// =============================================================================

struct Entry {
    name: String,
    ty: Rc<Term>,
    tail: Option<Rc<Entry>>,
}

/// Typing hypotheses, newest first. Pushing shares the tail, so contexts are
/// cheap to capture in errors.
#[derive(Clone, Default)]
pub struct Context {
    head: Option<Rc<Entry>>,
    size: usize,
}

impl Context {
    pub fn new() -> Self {
        Context::default()
    }

    /// Number of entries; also the level of the next variable.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    pub fn push(&self, name: impl Into<String>, ty: Rc<Term>) -> Self {
        Context {
            head: Some(Rc::new(Entry {
                name: name.into(),
                ty,
                tail: self.head.clone(),
            })),
            size: self.size + 1,
        }
    }

    /// The entry introduced at `level`.
    pub fn lookup(&self, level: usize) -> Option<(&str, &Rc<Term>)> {
        if level >= self.size {
            return None;
        }
        let mut entry = self.head.as_deref()?;
        for _ in 0..(self.size - 1 - level) {
            entry = entry.tail.as_deref()?;
        }
        Some((entry.name.as_str(), &entry.ty))
    }

    /// Entries oldest first.
    pub fn entries(&self) -> Vec<(&str, &Rc<Term>)> {
        let mut out = Vec::with_capacity(self.size);
        let mut cur = self.head.as_deref();
        while let Some(entry) = cur {
            out.push((entry.name.as_str(), &entry.ty));
            cur = entry.tail.as_deref();
        }
        out.reverse();
        out
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries().into_iter().map(|(name, ty)| format!("{}: {}", name, ty)))
            .finish()
    }
}

// =============================================================================
// Global environment
// =============================================================================

#[derive(Debug, Clone)]
pub struct Definition {
    pub ty: Rc<Term>,
    pub term: Rc<Term>,
}

/// The global definition table. Iteration follows first-declaration order.
#[derive(Debug, Clone, Default)]
pub struct Env {
    defs: HashMap<String, Definition>,
    order: Vec<String>,
}

impl Env {
    pub fn new() -> Self {
        Env::default()
    }

    /// Register a global definition, replacing an earlier one of the same name
    pub fn add_def(&mut self, name: impl Into<String>, ty: Rc<Term>, term: Rc<Term>) {
        let name = name.into();
        if !self.defs.contains_key(&name) {
            self.order.push(name.clone());
        }
        self.defs.insert(name, Definition { ty, term });
    }

    pub fn get_def(&self, name: &str) -> Option<&Definition> {
        self.defs.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defs.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Definition)> + '_ {
        self.order
            .iter()
            .filter_map(move |name| self.defs.get(name).map(|def| (name.as_str(), def)))
    }
}

// =============================================================================
// Inference and checking
// =============================================================================

/// Infer the type of `term`.
#[instrument(level = "trace", skip_all, fields(term = %term, depth = ctx.size()))]
pub fn infer(env: &Env, ctx: &Context, term: &Rc<Term>) -> Result<Rc<Term>, TypeError> {
    match term.as_ref() {
        Term::Var(name, level) => ctx
            .lookup(*level)
            .map(|(_, ty)| ty.clone())
            .ok_or_else(|| TypeError::new(TypeErrorKind::UnboundVariable(name.clone()), term, ctx)),
        Term::Ref(name) => env
            .get_def(name)
            .map(|def| def.ty.clone())
            .ok_or_else(|| {
                TypeError::new(TypeErrorKind::UnboundReference(name.clone()), term, ctx)
            }),
        Term::Typ => Ok(Term::typ()),
        Term::App(func, argm) => {
            let func_ty = reduce(&infer(env, ctx, func)?, env);
            match func_ty.as_ref() {
                Term::All { bind, body, .. } => {
                    check(env, ctx, argm, bind)?;
                    let self_var = Term::ann(true, func.clone(), func_ty.clone());
                    let name_var = Term::ann(true, argm.clone(), bind.clone());
                    Ok(body.open(&[self_var, name_var]))
                }
                _ => Err(TypeError::new(TypeErrorKind::NonFunctionApplication, term, ctx)),
            }
        }
        Term::Let { name, expr, body } => {
            let expr_ty = infer(env, ctx, expr)?;
            let expr_var = Term::ann(true, Term::var(name, ctx.size()), expr_ty.clone());
            let body_ctx = ctx.push(name, expr_ty);
            infer(env, &body_ctx, &body.open(&[expr_var]))
        }
        Term::Def { expr, body, .. } => infer(env, ctx, &body.open(&[expr.clone()])),
        Term::All { self_name, name, bind, body, .. } => {
            let self_var = Term::ann(true, Term::var(self_name, ctx.size()), term.clone());
            let name_var = Term::ann(true, Term::var(name, ctx.size() + 1), bind.clone());
            let body_ctx = ctx.push(self_name, term.clone()).push(name, bind.clone());
            check(env, ctx, bind, &Term::typ())?;
            check(env, &body_ctx, &body.open(&[self_var, name_var]), &Term::typ())?;
            Ok(Term::typ())
        }
        Term::Ann { done, expr, ty } => {
            if !done {
                check(env, ctx, expr, ty)?;
            }
            Ok(ty.clone())
        }
        Term::Nat(_) => Ok(Term::reference("Nat")),
        Term::Chr(_) => Ok(Term::reference("Char")),
        Term::Str(_) => Ok(Term::reference("String")),
        Term::Lam { .. } | Term::Bound(_) => {
            Err(TypeError::new(TypeErrorKind::CannotInfer, term, ctx))
        }
    }
}

/// Check `term` against `ty`.
#[instrument(level = "trace", skip_all, fields(term = %term, ty = %ty, depth = ctx.size()))]
pub fn check(env: &Env, ctx: &Context, term: &Rc<Term>, ty: &Rc<Term>) -> Result<(), TypeError> {
    let typv = reduce(ty, env);
    match term.as_ref() {
        Term::Lam { name, body } => match typv.as_ref() {
            Term::All { bind, body: ty_body, .. } => {
                let self_var = Term::ann(true, term.clone(), ty.clone());
                let name_var = Term::ann(true, Term::var(name, ctx.size()), bind.clone());
                let body_ty = ty_body.open(&[self_var, name_var.clone()]);
                let body_ctx = ctx.push(name, bind.clone());
                check(env, &body_ctx, &body.open(&[name_var]), &body_ty)
            }
            _ => Err(TypeError::new(TypeErrorKind::LambdaNotFunction, term, ctx)),
        },
        Term::Let { name, expr, body } => {
            let expr_ty = infer(env, ctx, expr)?;
            let expr_var = Term::ann(true, Term::var(name, ctx.size()), expr_ty.clone());
            let body_ctx = ctx.push(name, expr_ty);
            check(env, &body_ctx, &body.open(&[expr_var]), ty)
        }
        _ => {
            let inferred = infer(env, ctx, term)?;
            if equal(ty, &inferred, env, ctx.size()) {
                Ok(())
            } else {
                trace!(expected = %ty, found = %inferred, "type mismatch");
                // Shown against an empty table: self-encoded types never finish unfolding.
                let empty = Env::new();
                Err(TypeError::new(
                    TypeErrorKind::TypeMismatch {
                        expected: normalize(ty, &empty),
                        found: normalize(&inferred, &empty),
                    },
                    term,
                    ctx,
                ))
            }
        }
    }
}

/// Check a definition's type against `*`, then its term against its type.
pub fn check_definition(env: &Env, name: &str) -> Result<(), TypeError> {
    let ctx = Context::new();
    let def = env.get_def(name).ok_or_else(|| {
        TypeError::new(
            TypeErrorKind::UnboundReference(name.to_string()),
            &Term::reference(name),
            &ctx,
        )
    })?;
    check(env, &ctx, &def.ty, &Term::typ())?;
    check(env, &ctx, &def.term, &def.ty)
}

/// Check every definition, collecting failures instead of stopping at the first.
pub fn check_all(env: &Env) -> Vec<(String, TypeError)> {
    let mut failures = Vec::new();
    for (name, _) in env.iter() {
        match check_definition(env, name) {
            Ok(()) => debug!(definition = name, "checked"),
            Err(err) => {
                debug!(definition = name, error = %err, "failed");
                failures.push((name.to_string(), err));
            }
        }
    }
    failures
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn context_levels_follow_insertion_order() {
        let ctx = Context::new()
            .push("A", Term::typ())
            .push("x", Term::var("A", 0));
        assert_eq!(ctx.size(), 2);
        assert_eq!(ctx.lookup(0).map(|(n, _)| n), Some("A"));
        assert_eq!(ctx.lookup(1).map(|(n, _)| n), Some("x"));
        assert!(ctx.lookup(2).is_none());
        let names: Vec<_> = ctx.entries().into_iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["A", "x"]);
    }

    #[test]
    fn pushing_does_not_disturb_the_parent() {
        let base = Context::new().push("A", Term::typ());
        let left = base.push("l", Term::typ());
        let right = base.push("r", Term::typ());
        assert_eq!(base.size(), 1);
        assert_eq!(left.lookup(1).map(|(n, _)| n), Some("l"));
        assert_eq!(right.lookup(1).map(|(n, _)| n), Some("r"));
    }

    #[test]
    fn env_keeps_first_declaration_order() {
        let mut env = Env::new();
        env.add_def("b", Term::typ(), Term::typ());
        env.add_def("a", Term::typ(), Term::typ());
        env.add_def("b", Term::typ(), Term::reference("a"));
        let names: Vec<_> = env.iter().map(|(n, _)| n).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(env.get_def("b").map(|d| d.term.clone()), Some(Term::reference("a")));
    }

    #[test]
    fn infer_var_reads_the_context() {
        let ctx = Context::new().push("A", Term::typ());
        let ty = infer(&Env::new(), &ctx, &Term::var("A", 0)).expect("bound variable");
        assert_eq!(ty, Term::typ());

        let err = infer(&Env::new(), &Context::new(), &Term::var("A", 0)).unwrap_err();
        assert!(matches!(err.kind, TypeErrorKind::UnboundVariable(ref n) if n == "A"));
    }

    #[test]
    fn bare_lambda_cannot_be_inferred() {
        let t = Term::lam("x", 0, Term::var("x", 0));
        let err = infer(&Env::new(), &Context::new(), &t).unwrap_err();
        assert!(matches!(err.kind, TypeErrorKind::CannotInfer));
    }

    #[test]
    fn literals_have_their_builtin_types() {
        let env = Env::new();
        let ctx = Context::new();
        assert_eq!(infer(&env, &ctx, &Term::nat(3u32)).ok(), Some(Term::reference("Nat")));
        assert_eq!(infer(&env, &ctx, &Term::chr('x')).ok(), Some(Term::reference("Char")));
        assert_eq!(infer(&env, &ctx, &Term::str("hi")).ok(), Some(Term::reference("String")));
    }
}
