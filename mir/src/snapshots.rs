//! Golden snapshot tests for the erased-term printer.
//!
//! These tests verify that printed output remains stable across changes.

#[cfg(test)]
mod tests {
    use crate::pretty::{pretty_program, pretty_term};
    use crate::*;
    use insta::assert_snapshot;
    use kernel::adt::Constructor;
    use kernel::checker::Env;
    use kernel::test_support::{bool_env, nat_env};

    fn nat_tag() -> Tag {
        Tag::Adt(vec![
            Constructor { name: "Nat.zero".into(), fields: vec![] },
            Constructor { name: "Nat.succ".into(), fields: vec!["pred".into()] },
        ])
    }

    /// Snapshot: every node kind
    #[test]
    fn snapshot_all_forms() {
        let term = Erased::let_in(
            "_x$0",
            Erased::Nat { value: 42u32.into() },
            Erased::app(
                Erased::eliminate(nat_tag(), Erased::var("_x$0")),
                Erased::lam(
                    "_c$1",
                    Erased::app(
                        Erased::reference("String.concat"),
                        Erased::Str { value: "a\"λ".into() },
                    ),
                ),
            ),
        );
        assert_snapshot!(pretty_term(&term), @r#"$_x$0=42;(-<Nat.zero|Nat.succ pred>_x$0 λ_c$1.(String.concat "a\"\u{3bb}"))"#);

        let unit = Erased::instantiate(
            Tag::Prim("Unit".into()),
            Erased::app(Erased::Unit, Erased::Chr { value: '\'' }),
        );
        assert_snapshot!(pretty_term(&unit), @r"+<Unit>(() '\'')");
    }

    /// Snapshot: a whole table, with the primitive header
    #[test]
    fn snapshot_bool_program() {
        let program = compile_all(&bool_env()).expect("Bool erases");
        assert_snapshot!(pretty_program(&program), @r"
        // prim types: Bool
        Bool.true/0 = +<Bool>λ_t$1.λ_f$2._t$1
        Bool.false/0 = +<Bool>λ_t$1.λ_f$2._f$2
        ");
    }

    /// Snapshot: a constructor with a field
    #[test]
    fn snapshot_nat_succ() {
        let program = compile(&nat_env(), "Nat.succ").expect("Nat.succ erases");
        assert_snapshot!(pretty_program(&program), @r"
        // prim types: Nat
        Nat.succ/1 = λ_n$0.+<Nat>λ_z$2.λ_s$3.(_s$3 _n$0)
        ");
    }

    #[test]
    fn snapshot_empty_program() {
        let program = compile_all(&Env::new()).expect("nothing to erase");
        assert_eq!(pretty_program(&program), "");
    }
}
