//! Small definition tables shared by the kernel tests.

use crate::ast::Term;
use crate::checker::Env;
use std::rc::Rc;

/// `Bool : * = %Bool.Self(P:@(x:Bool)*) @(true:(P Bool.true)) @(false:(P Bool.false)) (P Bool.Self);`
pub fn bool_type() -> Rc<Term> {
    let p = || Term::var("P", 1);
    let motive = Term::all(false, "", "x", Term::reference("Bool"), 2, Term::typ());
    let cases = Term::all(
        false,
        "",
        "true",
        Term::app(p(), Term::reference("Bool.true")),
        2,
        Term::all(
            false,
            "",
            "false",
            Term::app(p(), Term::reference("Bool.false")),
            4,
            Term::app(p(), Term::var("Bool.Self", 0)),
        ),
    );
    Term::all(true, "Bool.Self", "P", motive, 0, cases)
}

/// `Bool`, `Bool.true = #P #t #f t` and `Bool.false = #P #t #f f`.
pub fn bool_env() -> Env {
    let mut env = Env::new();
    env.add_def("Bool", Term::typ(), bool_type());
    let select = |pick: usize| {
        let name = if pick == 1 { "t" } else { "f" };
        Term::lam("P", 0, Term::lam("t", 1, Term::lam("f", 2, Term::var(name, pick))))
    };
    env.add_def("Bool.true", Term::reference("Bool"), select(1));
    env.add_def("Bool.false", Term::reference("Bool"), select(2));
    env
}

/// `Nat : * = %Nat.Self(P:@(x:Nat)*) @(zero:(P Nat.zero)) @(succ:@(pred:Nat) (P (Nat.succ pred))) (P Nat.Self);`
pub fn nat_type() -> Rc<Term> {
    let p = || Term::var("P", 1);
    let motive = Term::all(false, "", "x", Term::reference("Nat"), 2, Term::typ());
    let succ_case = Term::all(
        false,
        "",
        "pred",
        Term::reference("Nat"),
        6,
        Term::app(p(), Term::app(Term::reference("Nat.succ"), Term::var("pred", 7))),
    );
    let cases = Term::all(
        false,
        "",
        "zero",
        Term::app(p(), Term::reference("Nat.zero")),
        2,
        Term::all(false, "", "succ", succ_case, 4, Term::app(p(), Term::var("Nat.Self", 0))),
    );
    Term::all(true, "Nat.Self", "P", motive, 0, cases)
}

/// `Nat`, `Nat.zero = #P #z #s z` and `Nat.succ = #n #P #z #s (s n)`.
pub fn nat_env() -> Env {
    let mut env = Env::new();
    env.add_def("Nat", Term::typ(), nat_type());
    env.add_def(
        "Nat.zero",
        Term::reference("Nat"),
        Term::lam("P", 0, Term::lam("z", 1, Term::lam("s", 2, Term::var("z", 1)))),
    );
    env.add_def(
        "Nat.succ",
        Term::all(false, "", "n", Term::reference("Nat"), 0, Term::reference("Nat")),
        Term::lam(
            "n",
            0,
            Term::lam(
                "P",
                1,
                Term::lam(
                    "z",
                    2,
                    Term::lam("s", 3, Term::app(Term::var("s", 3), Term::var("n", 0))),
                ),
            ),
        ),
    );
    env
}

/// `id : @(A:*) @(a:A) A = #A #a a;`, with the type argument erased when `erased`.
pub fn id_def(erased: bool) -> (Rc<Term>, Rc<Term>) {
    let ty = Term::all(
        erased,
        "",
        "A",
        Term::typ(),
        0,
        Term::all(false, "", "a", Term::var("A", 1), 2, Term::var("A", 1)),
    );
    let term = Term::lam("A", 0, Term::lam("a", 1, Term::var("a", 1)));
    (ty, term)
}
