use num_bigint::BigUint;
use std::fmt;
use std::rc::Rc;

// =============================================================================
// Binders
// =============================================================================

/// The body of a binder.
///
/// Variables bound by the scope are stored as [`Term::Bound`] indices and can
/// only be reached by [`Scope::open`]ing it with placeholder terms. A `Pi` scope
/// binds two variables (index 1 = self, index 0 = argument); `Lam`, `Let` and
/// `Def` scopes bind one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope {
    arity: usize,
    body: Rc<Term>,
}

impl Scope {
    /// Abstract the free variables living at `levels` out of `body`.
    ///
    /// `levels[0]` becomes the outermost bound variable (the self variable of a
    /// `Pi`), the last entry the innermost.
    pub fn bind(levels: &[usize], body: &Rc<Term>) -> Scope {
        let arity = levels.len();
        let body = traverse(body, 0, &|term: &Term, offset: usize| match term {
            Term::Var(_, level) => levels
                .iter()
                .position(|l| l == level)
                .map(|pos| Rc::new(Term::Bound(offset + arity - 1 - pos))),
            _ => None,
        });
        Scope { arity, body }
    }

    /// Instantiate the bound variables with `args`, outermost first.
    ///
    /// The arguments are locally closed, so no index shifting is needed.
    pub fn open(&self, args: &[Rc<Term>]) -> Rc<Term> {
        debug_assert_eq!(args.len(), self.arity, "scope opened with wrong arity");
        let arity = self.arity;
        traverse(&self.body, 0, &|term: &Term, offset: usize| match term {
            Term::Bound(idx) if *idx >= offset && *idx < offset + arity => {
                Some(args[arity - 1 - (*idx - offset)].clone())
            }
            Term::Bound(idx) if *idx >= offset + arity => Some(Rc::new(Term::Bound(idx - arity))),
            _ => None,
        })
    }

    pub fn arity(&self) -> usize {
        self.arity
    }

    /// The raw body, with bound variables still as indices.
    pub fn raw_body(&self) -> &Rc<Term> {
        &self.body
    }

    fn traverse(&self, offset: usize, leaf: &dyn Fn(&Term, usize) -> Option<Rc<Term>>) -> Scope {
        Scope {
            arity: self.arity,
            body: traverse(&self.body, offset + self.arity, leaf),
        }
    }
}

/// Rebuild `term`, replacing every node for which `leaf` returns a value.
/// `offset` counts the bound variables introduced since the traversal started.
fn traverse(
    term: &Rc<Term>,
    offset: usize,
    leaf: &dyn Fn(&Term, usize) -> Option<Rc<Term>>,
) -> Rc<Term> {
    if let Some(replaced) = leaf(term, offset) {
        return replaced;
    }
    match term.as_ref() {
        Term::All { eras, self_name, name, bind, body } => Rc::new(Term::All {
            eras: *eras,
            self_name: self_name.clone(),
            name: name.clone(),
            bind: traverse(bind, offset, leaf),
            body: body.traverse(offset, leaf),
        }),
        Term::Lam { name, body } => Rc::new(Term::Lam {
            name: name.clone(),
            body: body.traverse(offset, leaf),
        }),
        Term::App(func, argm) => Rc::new(Term::App(
            traverse(func, offset, leaf),
            traverse(argm, offset, leaf),
        )),
        Term::Let { name, expr, body } => Rc::new(Term::Let {
            name: name.clone(),
            expr: traverse(expr, offset, leaf),
            body: body.traverse(offset, leaf),
        }),
        Term::Def { name, expr, body } => Rc::new(Term::Def {
            name: name.clone(),
            expr: traverse(expr, offset, leaf),
            body: body.traverse(offset, leaf),
        }),
        Term::Ann { done, expr, ty } => Rc::new(Term::Ann {
            done: *done,
            expr: traverse(expr, offset, leaf),
            ty: traverse(ty, offset, leaf),
        }),
        Term::Var(..)
        | Term::Bound(_)
        | Term::Ref(_)
        | Term::Typ
        | Term::Nat(_)
        | Term::Chr(_)
        | Term::Str(_) => term.clone(),
    }
}

// =============================================================================
// Terms
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    /// Free variable: a placeholder supplied when a binder is opened.
    /// Identity is the `(name, level)` pair; the name is for diagnostics.
    Var(String, usize),
    /// Bound variable (de Bruijn index). Only occurs underneath a [`Scope`].
    Bound(usize),
    /// Reference to a global definition
    Ref(String),
    /// The single sort `*`
    Typ,
    /// Self-dependent function type: `@self(name:bind) body`, or `%...` when erased
    All {
        eras: bool,
        self_name: String,
        name: String,
        bind: Rc<Term>,
        body: Scope,
    },
    Lam {
        name: String,
        body: Scope,
    },
    App(Rc<Term>, Rc<Term>),
    /// Opaque local binding: the body sees a variable of the expression's type
    Let {
        name: String,
        expr: Rc<Term>,
        body: Scope,
    },
    /// Transparent local binding: the expression is inlined into the body
    Def {
        name: String,
        expr: Rc<Term>,
        body: Scope,
    },
    /// Annotation. `done` marks annotations whose expression was already checked.
    Ann {
        done: bool,
        expr: Rc<Term>,
        ty: Rc<Term>,
    },
    Nat(BigUint),
    Chr(char),
    Str(String),
}

impl Term {
    pub fn var(name: impl Into<String>, level: usize) -> Rc<Self> {
        Rc::new(Term::Var(name.into(), level))
    }

    pub fn reference(name: impl Into<String>) -> Rc<Self> {
        Rc::new(Term::Ref(name.into()))
    }

    pub fn typ() -> Rc<Self> {
        Rc::new(Term::Typ)
    }

    /// Build a `Pi` whose `body` mentions `Var(self_name, at)` and `Var(name, at + 1)`.
    pub fn all(
        eras: bool,
        self_name: impl Into<String>,
        name: impl Into<String>,
        bind: Rc<Term>,
        at: usize,
        body: Rc<Term>,
    ) -> Rc<Self> {
        Rc::new(Term::All {
            eras,
            self_name: self_name.into(),
            name: name.into(),
            bind,
            body: Scope::bind(&[at, at + 1], &body),
        })
    }

    /// Build a lambda whose `body` mentions `Var(name, at)`.
    pub fn lam(name: impl Into<String>, at: usize, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Lam {
            name: name.into(),
            body: Scope::bind(&[at], &body),
        })
    }

    pub fn app(f: Rc<Term>, a: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::App(f, a))
    }

    pub fn apps(f: Rc<Term>, args: impl IntoIterator<Item = Rc<Term>>) -> Rc<Self> {
        args.into_iter().fold(f, Term::app)
    }

    pub fn let_in(name: impl Into<String>, expr: Rc<Term>, at: usize, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Let {
            name: name.into(),
            expr,
            body: Scope::bind(&[at], &body),
        })
    }

    pub fn def_in(name: impl Into<String>, expr: Rc<Term>, at: usize, body: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Def {
            name: name.into(),
            expr,
            body: Scope::bind(&[at], &body),
        })
    }

    pub fn ann(done: bool, expr: Rc<Term>, ty: Rc<Term>) -> Rc<Self> {
        Rc::new(Term::Ann { done, expr, ty })
    }

    pub fn nat(n: impl Into<BigUint>) -> Rc<Self> {
        Rc::new(Term::Nat(n.into()))
    }

    pub fn chr(c: char) -> Rc<Self> {
        Rc::new(Term::Chr(c))
    }

    pub fn str(s: impl Into<String>) -> Rc<Self> {
        Rc::new(Term::Str(s.into()))
    }

    /// One more than the highest level of any free variable in the term.
    /// Placeholders allocated from here on cannot capture anything.
    pub fn next_level(&self) -> usize {
        match self {
            Term::Var(_, level) => level + 1,
            Term::All { bind, body, .. } => bind.next_level().max(body.body.next_level()),
            Term::Lam { body, .. } => body.body.next_level(),
            Term::App(func, argm) => func.next_level().max(argm.next_level()),
            Term::Let { expr, body, .. } | Term::Def { expr, body, .. } => {
                expr.next_level().max(body.body.next_level())
            }
            Term::Ann { expr, ty, .. } => expr.next_level().max(ty.next_level()),
            Term::Bound(_)
            | Term::Ref(_)
            | Term::Typ
            | Term::Nat(_)
            | Term::Chr(_)
            | Term::Str(_) => 0,
        }
    }

    /// Desugar one layer of a literal into its canonical constructor chain.
    pub fn unroll(&self) -> Option<Rc<Term>> {
        match self {
            Term::Nat(n) => Some(unroll_nat(n)),
            Term::Chr(c) => Some(unroll_chr(*c)),
            Term::Str(s) => Some(unroll_str(s)),
            _ => None,
        }
    }
}

fn unroll_nat(n: &BigUint) -> Rc<Term> {
    if *n == BigUint::ZERO {
        Term::reference("Nat.zero")
    } else {
        Term::app(
            Term::reference("Nat.succ"),
            Rc::new(Term::Nat(n - BigUint::from(1u32))),
        )
    }
}

/// A character literal is its first UTF-16 code unit.
fn unroll_chr(c: char) -> Rc<Term> {
    let mut units = [0u16; 2];
    unroll_code_unit(c.encode_utf16(&mut units)[0])
}

/// `Char.new` applied to the bits of `code`, most significant first.
fn unroll_code_unit(code: u16) -> Rc<Term> {
    (0..16).fold(Term::reference("Char.new"), |done, i| {
        let bit = if (code >> (15 - i)) & 1 == 1 { "Bit.1" } else { "Bit.0" };
        Term::app(done, Term::reference(bit))
    })
}

/// Strings are lists of UTF-16 code units: a character outside the BMP
/// contributes both halves of its surrogate pair.
fn unroll_str(s: &str) -> Rc<Term> {
    let mut chars = s.chars();
    match chars.next() {
        None => Term::reference("String.nil"),
        Some(head) => {
            let mut units = [0u16; 2];
            let units = head.encode_utf16(&mut units);
            units.iter().rev().fold(Term::str(chars.as_str()), |tail, unit| {
                Term::app(Term::app(Term::reference("String.cons"), unroll_code_unit(*unit)), tail)
            })
        }
    }
}

// =============================================================================
// Display
// =============================================================================

/// Escape a character or string literal body.
pub fn escape_literal(s: &str) -> String {
    let mut out = String::new();
    for c in s.chars() {
        match c {
            '\\' | '"' | '\'' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            _ => out.push_str(&format!("\\u{{{:x}}}", c as u32)),
        }
    }
    out
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        show(self, self.next_level(), f)
    }
}

fn show(term: &Term, depth: usize, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match term {
        Term::Var(name, _) => write!(f, "{}", name),
        Term::Bound(idx) => write!(f, "^{}", idx),
        Term::Ref(name) => write!(f, "{}", name),
        Term::Typ => write!(f, "*"),
        Term::All { eras, self_name, name, bind, body } => {
            write!(f, "{}{}({}:", if *eras { '%' } else { '@' }, self_name, name)?;
            show(bind, depth, f)?;
            write!(f, ") ")?;
            let body = body.open(&[Term::var(self_name, depth), Term::var(name, depth + 1)]);
            show(&body, depth + 2, f)
        }
        Term::Lam { name, body } => {
            write!(f, "#{} ", name)?;
            show(&body.open(&[Term::var(name, depth)]), depth + 1, f)
        }
        Term::App(func, argm) => {
            write!(f, "(")?;
            show(func, depth, f)?;
            write!(f, " ")?;
            show(argm, depth, f)?;
            write!(f, ")")
        }
        Term::Let { name, expr, body } | Term::Def { name, expr, body } => {
            let sigil = if matches!(term, Term::Let { .. }) { '!' } else { '$' };
            write!(f, "{}{}=", sigil, name)?;
            show(expr, depth, f)?;
            write!(f, ";")?;
            show(&body.open(&[Term::var(name, depth)]), depth + 1, f)
        }
        Term::Ann { expr, .. } => show(expr, depth, f),
        Term::Nat(n) => write!(f, "+{}", n),
        Term::Chr(c) => write!(f, "'{}'", escape_literal(&c.to_string())),
        Term::Str(s) => write!(f, "\"{}\"", escape_literal(s)),
    }
}
