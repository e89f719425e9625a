use kernel::ast::Term;
use kernel::checker::Env;
use std::collections::HashSet;
use std::ops::Range;
use std::rc::Rc;

/// Source location info
#[derive(Debug, Clone, PartialEq, Eq, Copy)]
pub struct Span {
    pub start: usize,
    pub end: usize,
    pub line: usize,
    pub col: usize,
}

impl Span {
    pub fn new(start: usize, end: usize, line: usize, col: usize) -> Self {
        Span { start, end, line, col }
    }

    /// Extend this span up to the end of `other`.
    pub fn to(self, other: Span) -> Span {
        Span { end: other.end, ..self }
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }
}

/// One top-level `name : Type = Term ;` entry.
#[derive(Debug, Clone)]
pub struct Decl {
    pub name: String,
    pub ty: Rc<Term>,
    pub term: Rc<Term>,
    pub span: Span,
}

/// A parsed source file, declarations in source order.
#[derive(Debug, Clone, Default)]
pub struct Program {
    pub decls: Vec<Decl>,
}

impl Program {
    /// Where `name` was (last) declared.
    pub fn span_of(&self, name: &str) -> Option<Span> {
        self.decls.iter().rev().find(|d| d.name == name).map(|d| d.span)
    }

    /// Declarations whose name was already declared earlier in the file.
    pub fn redeclarations(&self) -> impl Iterator<Item = &Decl> + '_ {
        let mut seen = HashSet::new();
        self.decls.iter().filter(move |d| !seen.insert(d.name.as_str()))
    }

    pub fn to_env(&self) -> Env {
        let mut env = Env::new();
        for decl in &self.decls {
            env.add_def(decl.name.clone(), decl.ty.clone(), decl.term.clone());
        }
        env
    }

    pub fn into_env(self) -> Env {
        let mut env = Env::new();
        for decl in self.decls {
            env.add_def(decl.name, decl.ty, decl.term);
        }
        env
    }
}
