//! Stable pretty-printer for erased programs, used for golden snapshot tests
//! and the `pretty` output format of the CLI.
//!
//! ```text
//! λx.b        lambda          (f a)       application
//! $x=e;b      let             ()          erased value
//! -<T>e       eliminate       +<T>e       instantiate
//! ```

use crate::lower::Program;
use crate::{Erased, Tag};
use kernel::ast::escape_literal;

fn pretty_tag(tag: &Tag) -> String {
    match tag {
        Tag::Prim(name) => name.clone(),
        Tag::Adt(ctors) => ctors
            .iter()
            .map(|c| {
                let mut out = c.name.clone();
                for field in &c.fields {
                    out.push(' ');
                    out.push_str(field);
                }
                out
            })
            .collect::<Vec<_>>()
            .join("|"),
    }
}

fn write_term(term: &Erased, out: &mut String) {
    match term {
        Erased::Var { name } | Erased::Ref { name } => out.push_str(name),
        Erased::Unit => out.push_str("()"),
        Erased::Lam { name, body } => {
            out.push('λ');
            out.push_str(name);
            out.push('.');
            write_term(body, out);
        }
        Erased::App { func, argm } => {
            out.push('(');
            write_term(func, out);
            out.push(' ');
            write_term(argm, out);
            out.push(')');
        }
        Erased::Let { name, expr, body } => {
            out.push('$');
            out.push_str(name);
            out.push('=');
            write_term(expr, out);
            out.push(';');
            write_term(body, out);
        }
        Erased::Eliminate { tag, expr } | Erased::Instantiate { tag, expr } => {
            let sign = if matches!(term, Erased::Eliminate { .. }) { '-' } else { '+' };
            out.push(sign);
            out.push('<');
            out.push_str(&pretty_tag(tag));
            out.push('>');
            write_term(expr, out);
        }
        Erased::Nat { value } => out.push_str(&value.to_string()),
        Erased::Chr { value } => {
            out.push('\'');
            out.push_str(&escape_literal(&value.to_string()));
            out.push('\'');
        }
        Erased::Str { value } => {
            out.push('"');
            out.push_str(&escape_literal(value));
            out.push('"');
        }
    }
}

/// Pretty-print one erased term.
pub fn pretty_term(term: &Erased) -> String {
    let mut out = String::new();
    write_term(term, &mut out);
    out
}

/// One `name/arity = term` line per definition, preceded by the primitives
/// the program defines.
pub fn pretty_program(program: &Program) -> String {
    let mut out = String::new();
    if !program.prim_types.is_empty() {
        let names: Vec<_> = program.prim_types.iter().map(|p| p.name).collect();
        out.push_str(&format!("// prim types: {}\n", names.join(", ")));
    }
    if !program.prim_funcs.is_empty() {
        let names: Vec<_> = program
            .prim_funcs
            .iter()
            .map(|f| format!("{}/{}", f.name, f.arity))
            .collect();
        out.push_str(&format!("// prim funcs: {}\n", names.join(", ")));
    }
    for def in &program.defs {
        out.push_str(&format!("{}/{} = {}\n", def.name, def.arity, pretty_term(&def.term)));
    }
    out
}
