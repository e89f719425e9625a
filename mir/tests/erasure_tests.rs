//! Erasure tests: programs written in surface syntax are erased into the
//! runtime IR with binders, eliminators and primitives where renderers expect
//! them.

use frontend::parse_program;
use kernel::checker::{check_all, Env};
use mir::pretty::{pretty_program, pretty_term};
use mir::{compile, compile_all, dependency_sort, EraseError, Erased, Erasure};

const BOOL: &str = r#"
Bool : * = %Bool.Self(P:@(x:Bool) *) @(true:(P Bool.true)) @(false:(P Bool.false)) (P Bool.Self);
Bool.true : Bool = #P #t #f t;
Bool.false : Bool = #P #t #f f;
Bool.not : @(b:Bool) Bool = #b (((b #x Bool) Bool.false) Bool.true);
"#;

fn env_of(src: &str) -> Env {
    parse_program(src).expect("program parses").into_env()
}

fn erase(env: &Env, name: &str) -> Erased {
    Erasure::new(env)
        .compile_def(name)
        .unwrap_or_else(|e| panic!("{} failed to erase: {}", name, e))
        .unwrap_or_else(|| panic!("{} has no runtime content", name))
        .term
}

// =============================================================================
// Binders and arity
// =============================================================================

#[test]
fn identity_keeps_both_arguments() {
    let env = env_of("id : @s(A:*) @x(a:A) A = #A #a a;");
    assert!(check_all(&env).is_empty());
    let id = erase(&env, "id");
    assert_eq!(id.arity(), 2);
    assert_eq!(pretty_term(&id), "λ_A$0.λ_a$1._a$1");
}

#[test]
fn erased_binders_vanish_at_definition_and_call_site() {
    let src = r#"
        id : %(A:*) @(a:A) A = #A #a a;
        T : * = @(x:*) *;
        use : @(t:T) T = #t ((id T) t);
    "#;
    let env = env_of(src);
    assert!(check_all(&env).is_empty());

    assert_eq!(pretty_term(&erase(&env, "id")), "λ_a$1._a$1");
    assert_eq!(pretty_term(&erase(&env, "use")), "λ_t$0.(id _t$0)");
}

#[test]
fn arity_counts_non_erased_arguments() {
    let src = r#"
        T : * = @(x:*) *;
        k : %(A:*) %(B:*) @(a:A) @(b:B) @(c:T) A = #A #B #a #b #c a;
    "#;
    let env = env_of(src);
    assert!(check_all(&env).is_empty());
    let program = compile(&env, "k").expect("k erases");
    let k = program.get("k").expect("k is emitted");
    assert_eq!(k.arity, 3);
    assert_eq!(pretty_term(&k.term), "λ_a$2.λ_b$3.λ_c$4._a$2");
}

#[test]
fn type_valued_arguments_become_unit() {
    let src = r#"
        Box : * = @(A:*) *;
        pick : @(A:*) @(B:*) * = #A #B A;
        main : * = ((pick *) *);
        user : @(f:@(A:*) Box) Box = #f (f *);
    "#;
    let env = env_of(src);
    assert!(check_all(&env).is_empty());
    assert_eq!(pretty_term(&erase(&env, "user")), "λ_f$0.(_f$0 ())");
}

// =============================================================================
// Eliminators and primitives
// =============================================================================

#[test]
fn matching_on_a_primitive_eliminates_it() {
    let env = env_of(BOOL);
    assert!(check_all(&env).is_empty());
    assert_eq!(
        pretty_term(&erase(&env, "Bool.not")),
        "λ_b$0.((-<Bool>_b$0 Bool.false) Bool.true)"
    );
}

#[test]
fn non_primitive_datatypes_use_their_shape() {
    let src = r#"
        Pair : * = %Pair.Self(P:@(x:Pair) *) @(new:%(T:*) @(fst:T) @(snd:T) (P (((Pair.new T) fst) snd))) (P Pair.Self);
        Pair.new : %(T:*) @(fst:T) @(snd:T) Pair = #T #fst #snd #P #new (((new T) fst) snd);
        swap : @(p:Pair) Pair = #p ((p #x Pair) #T #a #b (((Pair.new T) b) a));
    "#;
    let env = env_of(src);
    assert!(check_all(&env).is_empty());
    assert_eq!(
        pretty_term(&erase(&env, "Pair.new")),
        "λ_fst$1.λ_snd$2.+<Pair.new fst snd>λ_new$4.((_new$4 _fst$1) _snd$2)"
    );
    assert_eq!(
        pretty_term(&erase(&env, "swap")),
        "λ_p$0.(-<Pair.new fst snd>_p$0 λ_a$2.λ_b$3.((Pair.new _b$3) _a$2))"
    );
}

#[test]
fn referenced_primitives_are_listed() {
    let env = env_of(BOOL);
    let program = compile(&env, "Bool.not").expect("Bool.not erases");
    let types: Vec<_> = program.prim_types.iter().map(|p| (p.name, p.ctor_arities.to_vec())).collect();
    assert_eq!(types, vec![("Bool", vec![0, 0])]);
    let funcs: Vec<_> = program.prim_funcs.iter().map(|f| (f.name, f.arity)).collect();
    assert_eq!(funcs, vec![("Bool.not", 1)]);
}

#[test]
fn local_bindings_and_literals() {
    let src = r#"
        Nat : * = @(x:*) *;
        String : * = @(x:*) *;
        Bool : * = %Bool.Self(P:@(x:Bool) *) @(true:(P Bool.true)) @(false:(P Bool.false)) (P Bool.Self);
        Bool.true : Bool = #P #t #f t;
        a : Bool = !x = Bool.true; x;
        b : Bool = $x = Bool.true; x;
        c : Nat = +12;
        d : String = "hi";
    "#;
    let env = env_of(src);
    assert_eq!(pretty_term(&erase(&env, "a")), "$_x$0=Bool.true;_x$0");
    assert_eq!(pretty_term(&erase(&env, "b")), "Bool.true");
    assert_eq!(pretty_term(&erase(&env, "c")), "12");
    assert_eq!(pretty_term(&erase(&env, "d")), "\"hi\"");
}

// =============================================================================
// Whole programs
// =============================================================================

#[test]
fn compile_emits_dependencies_first_and_skips_types() {
    let src = format!("{}\nmain : Bool = (Bool.not Bool.true);", BOOL);
    let env = env_of(&src);
    assert_eq!(
        dependency_sort(&env, "main").expect("sorts"),
        vec!["Bool", "Bool.false", "Bool.true", "Bool.not", "main"]
    );

    let program = compile(&env, "main").expect("main erases");
    let names: Vec<_> = program.defs.iter().map(|d| d.name.as_str()).collect();
    assert_eq!(names, vec!["Bool.false", "Bool.true", "Bool.not", "main"]);
    assert_eq!(program.main.as_deref(), Some("main"));

    let all = compile_all(&env).expect("table erases");
    assert!(all.get("Bool").is_none());
    assert_eq!(all.defs.len(), 4);
}

#[test]
fn program_serializes_to_json() {
    let env = env_of(BOOL);
    let program = compile(&env, "Bool.true").expect("erases");
    let json = serde_json::to_value(&program).expect("serializes");

    assert_eq!(json["main"], "Bool.true");
    assert_eq!(json["prim_types"][0]["name"], "Bool");
    assert_eq!(json["prim_types"][0]["ctor_arities"], serde_json::json!([0, 0]));
    let def = &json["defs"][0];
    assert_eq!(def["name"], "Bool.true");
    assert_eq!(def["arity"], 0);
    assert_eq!(def["term"]["ctor"], "Instantiate");
    assert_eq!(def["term"]["tag"]["prim"], "Bool");
    assert_eq!(def["term"]["expr"]["ctor"], "Lam");
    assert_eq!(def["term"]["expr"]["name"], "_t$1");
}

#[test]
fn pretty_output_is_stable() {
    let src = format!("{}\nmain : Bool = (Bool.not Bool.true);", BOOL);
    let program = compile(&env_of(&src), "main").expect("main erases");
    insta::assert_snapshot!(pretty_program(&program), @r"
    // prim types: Bool
    // prim funcs: Bool.not/1
    Bool.false/0 = +<Bool>λ_t$1.λ_f$2._f$2
    Bool.true/0 = +<Bool>λ_t$1.λ_f$2._t$1
    Bool.not/1 = λ_b$0.((-<Bool>_b$0 Bool.false) Bool.true)
    main/0 = (Bool.not Bool.true)
    ");
}

// =============================================================================
// Failures
// =============================================================================

#[test]
fn failures_abort_the_whole_run() {
    let src = format!("{}\nbad : Bool = (* *);", BOOL);
    let env = env_of(&src);
    let err = compile_all(&env).unwrap_err();
    assert_eq!(err.to_string(), "In definition 'bad': Non-function application: (* *)");
    assert_eq!(err.root(), &EraseError::NonFunctionApplication("(* *)".into()));
}

#[test]
fn unknown_main_and_dangling_references() {
    let env = env_of(BOOL);
    assert_eq!(compile(&env, "main").unwrap_err(), EraseError::UnknownMain("main".into()));

    let env = env_of("main : * = missing;");
    assert_eq!(
        compile(&env, "main").unwrap_err(),
        EraseError::UnboundReference("missing".into())
    );
}
