//! Type-directed erasure of checked definitions into [`Erased`] terms.
//!
//! The walk mirrors the kernel's `infer`/`check`, but instead of validating it
//! rebuilds each term without its types and erased arguments. Bound variables
//! are renamed `_{name}${level}`, which keeps them distinct from any variable
//! they could shadow.

use crate::errors::EraseError;
use crate::types::{prim_of, PrimFunc, PrimType, PRIM_FUNCS, PRIM_TYPES};
use crate::{Erased, Tag};
use kernel::adt::as_adt;
use kernel::ast::Term;
use kernel::checker::{Context, Env};
use kernel::reduce::reduce;
use serde::Serialize;
use std::collections::HashSet;
use std::rc::Rc;
use tracing::{debug, instrument};

fn erased_name(name: &str, level: usize) -> String {
    format!("_{}${}", name, level)
}

/// One erased top-level definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompiledDef {
    pub name: String,
    /// Number of leading lambdas of `term`.
    pub arity: usize,
    pub term: Erased,
}

/// Everything a renderer needs: the erased definitions in dependency order
/// and the primitives the program defines.
#[derive(Debug, Clone, Serialize)]
pub struct Program {
    pub main: Option<String>,
    pub defs: Vec<CompiledDef>,
    pub prim_types: Vec<PrimType>,
    pub prim_funcs: Vec<PrimFunc>,
}

impl Program {
    pub fn get(&self, name: &str) -> Option<&CompiledDef> {
        self.defs.iter().find(|d| d.name == name)
    }
}

/// An erasure run over one definition table.
pub struct Erasure<'a> {
    env: &'a Env,
}

impl<'a> Erasure<'a> {
    pub fn new(env: &'a Env) -> Self {
        Erasure { env }
    }

    /// Erase one definition. Definitions whose type is `*` have no runtime
    /// content and yield `None`.
    pub fn compile_def(&self, name: &str) -> Result<Option<CompiledDef>, EraseError> {
        let def = self
            .env
            .get_def(name)
            .ok_or_else(|| EraseError::UnboundReference(name.to_string()))?;
        if matches!(reduce(&def.ty, self.env).as_ref(), Term::Typ) {
            debug!(definition = name, "skipped type definition");
            return Ok(None);
        }
        let term = self
            .check(&Context::new(), &def.term, &def.ty)
            .map_err(|e| e.in_definition(name))?;
        let arity = term.arity();
        debug!(definition = name, arity, "erased");
        Ok(Some(CompiledDef {
            name: name.to_string(),
            arity,
            term,
        }))
    }

    /// Eliminator/instantiator tag for `ty`. Primitives win over datatypes.
    fn tag_of(&self, ty: &Rc<Term>, depth: usize) -> Option<Tag> {
        if let Some(prim) = prim_of(self.env, ty, depth) {
            return Some(Tag::Prim(prim.name.to_string()));
        }
        as_adt(self.env, ty, depth).map(Tag::Adt)
    }

    #[instrument(level = "trace", skip_all, fields(term = %term, depth = ctx.size()))]
    fn infer(&self, ctx: &Context, term: &Rc<Term>) -> Result<(Erased, Rc<Term>), EraseError> {
        match term.as_ref() {
            Term::Var(name, level) => {
                let (_, ty) = ctx
                    .lookup(*level)
                    .ok_or_else(|| EraseError::UnboundVariable(name.clone()))?;
                Ok((Erased::var(erased_name(name, *level)), ty.clone()))
            }
            Term::Ref(name) => {
                let def = self
                    .env
                    .get_def(name)
                    .ok_or_else(|| EraseError::UnboundReference(name.clone()))?;
                Ok((Erased::reference(name), def.ty.clone()))
            }
            Term::Typ | Term::All { .. } => Ok((Erased::Unit, Term::typ())),
            Term::App(func, argm) => {
                let (func_comp, func_ty) = self.infer(ctx, func)?;
                let func_ty = reduce(&func_ty, self.env);
                let Term::All { eras, bind, body, .. } = func_ty.as_ref() else {
                    return Err(EraseError::NonFunctionApplication(term.to_string()));
                };
                let argm_comp = self.check(ctx, argm, bind)?;
                let self_var = Term::ann(true, func.clone(), func_ty.clone());
                let name_var = Term::ann(true, argm.clone(), bind.clone());
                let mut comp = func_comp;
                if let Some(tag) = self.tag_of(&func_ty, ctx.size()) {
                    comp = Erased::eliminate(tag, comp);
                }
                if !eras {
                    comp = Erased::app(comp, argm_comp);
                }
                Ok((comp, body.open(&[self_var, name_var])))
            }
            Term::Let { name, expr, body } => {
                let (expr_comp, expr_ty) = self.infer(ctx, expr)?;
                let level = ctx.size();
                let expr_var = Term::ann(true, Term::var(name, level), expr_ty.clone());
                let body_ctx = ctx.push(name, expr_ty);
                let (body_comp, body_ty) = self.infer(&body_ctx, &body.open(&[expr_var]))?;
                Ok((Erased::let_in(erased_name(name, level), expr_comp, body_comp), body_ty))
            }
            Term::Def { expr, body, .. } => self.infer(ctx, &body.open(&[expr.clone()])),
            Term::Ann { expr, ty, .. } => Ok((self.check(ctx, expr, ty)?, ty.clone())),
            Term::Nat(n) => Ok((Erased::Nat { value: n.clone() }, Term::reference("Nat"))),
            Term::Chr(c) => Ok((Erased::Chr { value: *c }, Term::reference("Char"))),
            Term::Str(s) => Ok((Erased::Str { value: s.clone() }, Term::reference("String"))),
            Term::Lam { .. } | Term::Bound(_) => Err(EraseError::CannotInfer(term.to_string())),
        }
    }

    #[instrument(level = "trace", skip_all, fields(term = %term, ty = %ty, depth = ctx.size()))]
    fn check(&self, ctx: &Context, term: &Rc<Term>, ty: &Rc<Term>) -> Result<Erased, EraseError> {
        let typv = reduce(ty, self.env);
        if matches!(typv.as_ref(), Term::Typ) {
            return Ok(Erased::Unit);
        }
        match term.as_ref() {
            Term::Lam { name, body } => {
                let Term::All { eras, bind, body: ty_body, .. } = typv.as_ref() else {
                    return Err(EraseError::LambdaNotFunction(term.to_string()));
                };
                let level = ctx.size();
                let self_var = Term::ann(true, term.clone(), ty.clone());
                let name_var = Term::ann(true, Term::var(name, level), bind.clone());
                let body_ty = ty_body.open(&[self_var, name_var.clone()]);
                let body_ctx = ctx.push(name, bind.clone());
                let body_comp = self.check(&body_ctx, &body.open(&[name_var]), &body_ty)?;
                let mut comp = if *eras {
                    body_comp
                } else {
                    Erased::lam(erased_name(name, level), body_comp)
                };
                if let Some(tag) = self.tag_of(ty, ctx.size()) {
                    comp = Erased::instantiate(tag, comp);
                }
                Ok(comp)
            }
            Term::Let { name, expr, body } => {
                let (expr_comp, expr_ty) = self.infer(ctx, expr)?;
                let level = ctx.size();
                let expr_var = Term::ann(true, Term::var(name, level), expr_ty.clone());
                let body_ctx = ctx.push(name, expr_ty);
                let body_comp = self.check(&body_ctx, &body.open(&[expr_var]), ty)?;
                Ok(Erased::let_in(erased_name(name, level), expr_comp, body_comp))
            }
            _ => Ok(self.infer(ctx, term)?.0),
        }
    }
}

// =============================================================================
// Dependency order
// =============================================================================

struct Sorter<'a> {
    env: &'a Env,
    seen: HashSet<String>,
    order: Vec<String>,
}

impl Sorter<'_> {
    /// Emit `name` after everything its term mentions.
    fn visit_name(&mut self, name: &str) -> Result<(), EraseError> {
        if !self.seen.insert(name.to_string()) {
            return Ok(());
        }
        let def = self
            .env
            .get_def(name)
            .ok_or_else(|| EraseError::UnboundReference(name.to_string()))?;
        self.visit(&def.term)?;
        self.order.push(name.to_string());
        Ok(())
    }

    // Types are not visited: they leave no runtime trace.
    fn visit(&mut self, term: &Rc<Term>) -> Result<(), EraseError> {
        match term.as_ref() {
            Term::Ref(name) => self.visit_name(name),
            Term::Lam { body, .. } => self.visit(body.raw_body()),
            Term::App(func, argm) => {
                self.visit(func)?;
                self.visit(argm)
            }
            Term::Let { expr, body, .. } | Term::Def { expr, body, .. } => {
                self.visit(expr)?;
                self.visit(body.raw_body())
            }
            Term::Ann { expr, .. } => self.visit(expr),
            Term::Var(..)
            | Term::Bound(_)
            | Term::Typ
            | Term::All { .. }
            | Term::Nat(_)
            | Term::Chr(_)
            | Term::Str(_) => Ok(()),
        }
    }
}

/// Definitions reachable from `main`'s term, each after its dependencies,
/// with `main` last.
pub fn dependency_sort(env: &Env, main: &str) -> Result<Vec<String>, EraseError> {
    let def = env
        .get_def(main)
        .ok_or_else(|| EraseError::UnknownMain(main.to_string()))?;
    let mut sorter = Sorter {
        env,
        seen: HashSet::new(),
        order: Vec::new(),
    };
    sorter.visit(&def.term)?;
    if !sorter.order.iter().any(|n| n == main) {
        sorter.order.push(main.to_string());
    }
    Ok(sorter.order)
}

fn build(env: &Env, main: Option<String>, names: Vec<String>) -> Result<Program, EraseError> {
    let erasure = Erasure::new(env);
    let mut defs = Vec::with_capacity(names.len());
    for name in &names {
        if let Some(def) = erasure.compile_def(name)? {
            defs.push(def);
        }
    }
    Ok(Program {
        main,
        defs,
        prim_types: PRIM_TYPES.iter().filter(|p| env.contains(p.name)).copied().collect(),
        prim_funcs: PRIM_FUNCS.iter().filter(|f| env.contains(f.name)).copied().collect(),
    })
}

/// Erase `main` and everything it depends on. Any failure aborts the run.
pub fn compile(env: &Env, main: &str) -> Result<Program, EraseError> {
    let names = dependency_sort(env, main)?;
    debug!(main, definitions = names.len(), "compiling");
    build(env, Some(main.to_string()), names)
}

/// Erase every definition of the table, dependencies first.
pub fn compile_all(env: &Env) -> Result<Program, EraseError> {
    let mut sorter = Sorter {
        env,
        seen: HashSet::new(),
        order: Vec::new(),
    };
    for (name, _) in env.iter() {
        sorter.visit_name(name)?;
    }
    debug!(definitions = sorter.order.len(), "compiling all");
    build(env, None, sorter.order)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::test_support::{bool_env, id_def, nat_env};

    #[test]
    fn test_dependency_sort_is_post_order() {
        let mut env = bool_env();
        env.add_def(
            "not",
            Term::typ(),
            Term::app(Term::reference("Bool.false"), Term::reference("Bool.true")),
        );
        env.add_def(
            "main",
            Term::typ(),
            Term::app(Term::reference("not"), Term::reference("Bool.true")),
        );
        let order = dependency_sort(&env, "main").expect("sorts");
        assert_eq!(order, vec!["Bool.false", "Bool.true", "not", "main"]);
    }

    #[test]
    fn test_dependency_sort_reports_missing_names() {
        let mut env = Env::new();
        env.add_def("main", Term::typ(), Term::reference("ghost"));
        assert_eq!(
            dependency_sort(&env, "main"),
            Err(EraseError::UnboundReference("ghost".into()))
        );
        assert_eq!(
            dependency_sort(&env, "nope"),
            Err(EraseError::UnknownMain("nope".into()))
        );
    }

    #[test]
    fn test_identity_keeps_both_arguments() {
        let (ty, term) = id_def(false);
        let mut env = Env::new();
        env.add_def("id", ty, term);
        let def = Erasure::new(&env).compile_def("id").expect("erases").expect("id is a value");
        assert_eq!(def.arity, 2);
        assert_eq!(def.term, Erased::lam("_A$0", Erased::lam("_a$1", Erased::var("_a$1"))));
    }

    #[test]
    fn test_erased_type_argument_disappears() {
        let (ty, term) = id_def(true);
        let mut env = Env::new();
        env.add_def("id", ty, term);
        let def = Erasure::new(&env).compile_def("id").expect("erases").expect("id is a value");
        assert_eq!(def.arity, 1);
        assert_eq!(def.term, Erased::lam("_a$1", Erased::var("_a$1")));
    }

    #[test]
    fn test_type_definitions_are_skipped() {
        let env = nat_env();
        let erasure = Erasure::new(&env);
        assert_eq!(erasure.compile_def("Nat"), Ok(None));
        assert!(erasure.compile_def("Nat.zero").expect("erases").is_some());
    }

    #[test]
    fn test_constructor_is_instantiated() {
        let env = bool_env();
        let def = Erasure::new(&env)
            .compile_def("Bool.true")
            .expect("erases")
            .expect("Bool.true is a value");
        assert_eq!(
            def.term,
            Erased::instantiate(
                Tag::Prim("Bool".into()),
                Erased::lam("_t$1", Erased::lam("_f$2", Erased::var("_t$1")))
            )
        );
        assert_eq!(def.arity, 0);
    }
}
