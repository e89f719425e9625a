//! Definitional equality.
//!
//! Both sides are reduced to weak-head form and compared by [`Shape`], a
//! structural key that ignores binder names and annotations. Pairs that are
//! already being compared count as equal, which is what makes the check
//! terminate on self-referential types that unfold forever.

use crate::ast::Term;
use crate::checker::Env;
use crate::reduce::reduce;
use std::collections::HashSet;
use std::hash::{Hash, Hasher};
use std::rc::Rc;
use tracing::trace;

/// A weak-head normal term compared up to binder names and annotations.
///
/// Variables bound inside the term are de Bruijn indices, so they compare
/// relative to the binder depth; free variables compare by level.
#[derive(Debug, Clone)]
pub struct Shape(Rc<Term>);

impl Shape {
    pub fn new(term: Rc<Term>) -> Self {
        Shape(term)
    }
}

impl PartialEq for Shape {
    fn eq(&self, other: &Self) -> bool {
        same_shape(&self.0, &other.0)
    }
}

impl Eq for Shape {}

impl Hash for Shape {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_shape(&self.0, state);
    }
}

fn strip_ann(mut term: &Term) -> &Term {
    while let Term::Ann { expr, .. } = term {
        term = expr.as_ref();
    }
    term
}

fn same_shape(a: &Term, b: &Term) -> bool {
    match (strip_ann(a), strip_ann(b)) {
        (Term::Var(_, x), Term::Var(_, y)) => x == y,
        (Term::Bound(x), Term::Bound(y)) => x == y,
        (Term::Ref(x), Term::Ref(y)) => x == y,
        (Term::Typ, Term::Typ) => true,
        (
            Term::All { eras: ae, self_name: aself, bind: abind, body: abody, .. },
            Term::All { eras: be, self_name: bself, bind: bbind, body: bbody, .. },
        ) => {
            ae == be
                && aself == bself
                && same_shape(abind, bbind)
                && same_shape(abody.raw_body(), bbody.raw_body())
        }
        (Term::Lam { body: x, .. }, Term::Lam { body: y, .. }) => {
            same_shape(x.raw_body(), y.raw_body())
        }
        (Term::App(af, aa), Term::App(bf, ba)) => same_shape(af, bf) && same_shape(aa, ba),
        (Term::Let { expr: ae, body: ab, .. }, Term::Let { expr: be, body: bb, .. })
        | (Term::Def { expr: ae, body: ab, .. }, Term::Def { expr: be, body: bb, .. }) => {
            same_shape(ae, be) && same_shape(ab.raw_body(), bb.raw_body())
        }
        (Term::Nat(x), Term::Nat(y)) => x == y,
        (Term::Chr(x), Term::Chr(y)) => x == y,
        (Term::Str(x), Term::Str(y)) => x == y,
        _ => false,
    }
}

fn hash_shape<H: Hasher>(term: &Term, state: &mut H) {
    let term = strip_ann(term);
    std::mem::discriminant(term).hash(state);
    match term {
        Term::Var(_, level) => level.hash(state),
        Term::Bound(idx) => idx.hash(state),
        Term::Ref(name) => name.hash(state),
        Term::Typ => {}
        Term::All { eras, self_name, bind, body, .. } => {
            eras.hash(state);
            self_name.hash(state);
            hash_shape(bind, state);
            hash_shape(body.raw_body(), state);
        }
        Term::Lam { body, .. } => hash_shape(body.raw_body(), state),
        Term::App(func, argm) => {
            hash_shape(func, state);
            hash_shape(argm, state);
        }
        Term::Let { expr, body, .. } | Term::Def { expr, body, .. } => {
            hash_shape(expr, state);
            hash_shape(body.raw_body(), state);
        }
        Term::Ann { .. } => {}
        Term::Nat(n) => n.hash(state),
        Term::Chr(c) => c.hash(state),
        Term::Str(s) => s.hash(state),
    }
}

/// Are `a` and `b` definitionally equal?
///
/// `depth` is the size of the context both terms live in; binders opened
/// during the comparison get levels from there on.
pub fn equal(a: &Rc<Term>, b: &Rc<Term>, env: &Env, depth: usize) -> bool {
    let mut seen = HashSet::new();
    equal_with(a, b, env, depth, &mut seen)
}

fn equal_with(
    a: &Rc<Term>,
    b: &Rc<Term>,
    env: &Env,
    dep: usize,
    seen: &mut HashSet<(Shape, Shape)>,
) -> bool {
    let a1 = reduce(a, env);
    let b1 = reduce(b, env);
    let ak = Shape::new(a1.clone());
    let bk = Shape::new(b1.clone());
    if ak == bk {
        return true;
    }
    let pair = (ak, bk);
    let flipped = (pair.1.clone(), pair.0.clone());
    if seen.contains(&pair) || seen.contains(&flipped) {
        trace!(lhs = %a1, rhs = %b1, "assumed equal while pending");
        return true;
    }
    seen.insert(pair);

    match (a1.as_ref(), b1.as_ref()) {
        (
            Term::All { eras: ae, self_name: aself, name: aname, bind: abind, body: abody },
            Term::All { eras: be, self_name: bself, bind: bbind, body: bbody, .. },
        ) => {
            let vars = [Term::var(aself, dep), Term::var(aname, dep + 1)];
            ae == be
                && aself == bself
                && equal_with(abind, bbind, env, dep, seen)
                && equal_with(&abody.open(&vars), &bbody.open(&vars), env, dep + 2, seen)
        }
        (Term::Lam { name, body: abody }, Term::Lam { body: bbody, .. }) => {
            let vars = [Term::var(name, dep)];
            equal_with(&abody.open(&vars), &bbody.open(&vars), env, dep + 1, seen)
        }
        (Term::App(af, aa), Term::App(bf, ba)) => {
            equal_with(af, bf, env, dep, seen) && equal_with(aa, ba, env, dep, seen)
        }
        (Term::Let { name, expr: ae, body: abody }, Term::Let { expr: be, body: bbody, .. }) => {
            let vars = [Term::var(name, dep)];
            equal_with(ae, be, env, dep, seen)
                && equal_with(&abody.open(&vars), &bbody.open(&vars), env, dep + 1, seen)
        }
        (Term::Ann { expr: ae, .. }, Term::Ann { expr: be, .. }) => {
            equal_with(ae, be, env, dep, seen)
        }
        _ => false,
    }
}
