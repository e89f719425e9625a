//! Negative tests: every failure kind is reported with its term and context.

use kernel::ast::Term;
use kernel::checker::{check, check_all, check_definition, infer, Context, Env, TypeErrorKind};
use kernel::test_support::{bool_env, nat_env};

#[test]
fn unbound_reference_is_reported_for_the_definition() {
    let mut env = Env::new();
    env.add_def("x", Term::reference("Missing"), Term::typ());
    let err = check_definition(&env, "x").unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::UnboundReference(ref n) if n == "Missing"));
    assert_eq!(err.term, Term::reference("Missing"));
}

#[test]
fn missing_definition_is_an_unbound_reference() {
    let err = check_definition(&Env::new(), "ghost").unwrap_err();
    assert_eq!(err.to_string(), "Unbound reference: 'ghost'.");
}

#[test]
fn mismatch_carries_the_context() {
    // f : @(A:*) @(a:A) * = #A #a a;   (a : A is not a type)
    let ty = Term::all(
        false,
        "",
        "A",
        Term::typ(),
        0,
        Term::all(false, "", "a", Term::var("A", 1), 2, Term::typ()),
    );
    let term = Term::lam("A", 0, Term::lam("a", 1, Term::var("a", 1)));
    let mut env = Env::new();
    env.add_def("f", ty, term);

    let err = check_definition(&env, "f").unwrap_err();
    let TypeErrorKind::TypeMismatch { expected, found } = &err.kind else {
        panic!("expected a mismatch, got {}", err);
    };
    assert_eq!(expected.to_string(), "*");
    assert_eq!(found.to_string(), "A");
    assert_eq!(err.term.to_string(), "a");

    let names: Vec<_> = err.context.entries().into_iter().map(|(n, _)| n).collect();
    assert_eq!(names, vec!["A", "a"]);
    assert_eq!(err.to_string(), "Found type: A\nInstead of: *");
}

#[test]
fn applying_a_constructor_to_too_many_arguments() {
    let env = bool_env();
    // (Bool.true Bool.true) : Bool.true's type Bool is a Pi over the motive,
    // so the argument must be a motive, not a boolean.
    let app = Term::app(Term::reference("Bool.true"), Term::reference("Bool.true"));
    let err = infer(&env, &Context::new(), &app).unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::TypeMismatch { .. }));
}

#[test]
fn applying_a_type_is_a_non_function_application() {
    let env = nat_env();
    let app = Term::app(Term::typ(), Term::reference("Nat.zero"));
    let err = infer(&env, &Context::new(), &app).unwrap_err();
    assert!(matches!(err.kind, TypeErrorKind::NonFunctionApplication));
    assert!(err.context.is_empty());
}

#[test]
fn lambda_against_a_non_function_type() {
    let env = nat_env();
    let lam = Term::lam("x", 0, Term::var("x", 0));
    let err = check(&env, &Context::new(), &lam, &Term::reference("Nat.zero")).unwrap_err();
    assert_eq!(err.to_string(), "Lambda has a non-function type.");
}

#[test]
fn failures_do_not_stop_the_remaining_definitions() {
    let mut env = nat_env();
    env.add_def("bad1", Term::reference("Nat"), Term::typ());
    env.add_def("good", Term::reference("Nat"), Term::reference("Nat.zero"));
    env.add_def("bad2", Term::reference("Nope"), Term::typ());

    let failures = check_all(&env);
    let names: Vec<_> = failures.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(names, vec!["bad1", "bad2"]);
}
