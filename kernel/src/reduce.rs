//! Weak-head reduction and full normalization.

use crate::ast::{Scope, Term};
use crate::checker::Env;
use std::collections::HashSet;
use std::rc::Rc;

/// Reduce `term` to weak-head normal form.
///
/// References are unfolded, applications of lambdas are contracted, `Let`,
/// `Def` and annotations are inlined, and literals are unrolled. A reference
/// that unfolds back into itself without an intervening beta step is left
/// stuck, so `loop : * = loop;` has a head normal form.
pub fn reduce(term: &Rc<Term>, env: &Env) -> Rc<Term> {
    let mut unfolded = HashSet::new();
    whnf(term.clone(), env, &mut unfolded)
}

fn whnf(mut term: Rc<Term>, env: &Env, unfolded: &mut HashSet<String>) -> Rc<Term> {
    loop {
        let next = match term.as_ref() {
            Term::Ref(name) => match env.get_def(name) {
                Some(def) if unfolded.insert(name.clone()) => def.term.clone(),
                _ => return term,
            },
            Term::App(func, argm) => {
                let head = whnf(func.clone(), env, unfolded);
                match head.as_ref() {
                    Term::Lam { body, .. } => {
                        unfolded.clear();
                        body.open(&[argm.clone()])
                    }
                    _ if Rc::ptr_eq(&head, func) => return term,
                    _ => return Term::app(head, argm.clone()),
                }
            }
            Term::Let { expr, body, .. } | Term::Def { expr, body, .. } => {
                body.open(&[expr.clone()])
            }
            Term::Ann { expr, .. } => expr.clone(),
            Term::Nat(_) | Term::Chr(_) | Term::Str(_) => match term.unroll() {
                Some(unrolled) => unrolled,
                None => return term,
            },
            Term::Var(..) | Term::Bound(_) | Term::Typ | Term::All { .. } | Term::Lam { .. } => {
                return term
            }
        };
        term = next;
    }
}

/// Normalize `term` everywhere, not only at the head.
///
/// Binders are opened with placeholders above every free level of `term` and
/// closed again afterwards. Does not terminate on terms whose unfolding is
/// infinite, e.g. self-encoded types under a table that defines them.
pub fn normalize(term: &Rc<Term>, env: &Env) -> Rc<Term> {
    normalize_at(term, env, term.next_level())
}

fn normalize_at(term: &Rc<Term>, env: &Env, depth: usize) -> Rc<Term> {
    let norm = reduce(term, env);
    match norm.as_ref() {
        Term::All { eras, self_name, name, bind, body } => {
            let opened = body.open(&[Term::var(self_name, depth), Term::var(name, depth + 1)]);
            let body = normalize_at(&opened, env, depth + 2);
            Rc::new(Term::All {
                eras: *eras,
                self_name: self_name.clone(),
                name: name.clone(),
                bind: normalize_at(bind, env, depth),
                body: Scope::bind(&[depth, depth + 1], &body),
            })
        }
        Term::Lam { name, body } => {
            let body = normalize_at(&body.open(&[Term::var(name, depth)]), env, depth + 1);
            Rc::new(Term::Lam {
                name: name.clone(),
                body: Scope::bind(&[depth], &body),
            })
        }
        Term::App(func, argm) => Term::app(
            normalize_at(func, env, depth),
            normalize_at(argm, env, depth),
        ),
        _ => norm,
    }
}
