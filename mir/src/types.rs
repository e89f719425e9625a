//! Primitive types and functions known to renderers.
//!
//! A definition whose type is one of [`PRIM_TYPES`] gets a native runtime
//! representation; values of it are built with `Instantiate` and taken apart
//! with `Eliminate`. [`PRIM_FUNCS`] lists the definitions a renderer may replace
//! by a native operation of the given arity.

use kernel::ast::Term;
use kernel::checker::Env;
use kernel::defeq::equal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimType {
    pub name: &'static str,
    /// Field count of each constructor, in declaration order.
    pub ctor_arities: &'static [usize],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PrimFunc {
    pub name: &'static str,
    pub arity: usize,
}

const fn prim(name: &'static str, ctor_arities: &'static [usize]) -> PrimType {
    PrimType { name, ctor_arities }
}

const fn func(name: &'static str, arity: usize) -> PrimFunc {
    PrimFunc { name, arity }
}

/// Primitive types, in the order they are tried.
pub const PRIM_TYPES: &[PrimType] = &[
    prim("Unit", &[0]),
    prim("Bool", &[0, 0]),
    prim("Nat", &[0, 1]),
    prim("Bits", &[0, 1, 1]),
    prim("U8", &[1]),
    prim("U16", &[1]),
    prim("U32", &[1]),
    prim("U64", &[1]),
    prim("U256", &[1]),
    prim("F64", &[1]),
    prim("String", &[0, 2]),
    prim("Buffer32", &[2]),
];

pub const PRIM_FUNCS: &[PrimFunc] = &[
    func("Bool.not", 1),
    func("Bool.and", 2),
    func("Bool.if", 3),
    func("Bool.or", 2),
    func("Bits.o", 1),
    func("Bits.i", 1),
    func("Bits.concat", 2),
    func("Bits.eql", 2),
    func("Debug.log", 2),
    func("Nat.add", 2),
    func("Nat.sub", 2),
    func("Nat.mul", 2),
    func("Nat.div", 2),
    func("Nat.div_mod", 2),
    func("Nat.pow", 2),
    func("Nat.ltn", 2),
    func("Nat.lte", 2),
    func("Nat.eql", 2),
    func("Nat.gte", 2),
    func("Nat.gtn", 2),
    func("Nat.to_u8", 1),
    func("Nat.to_u16", 1),
    func("Nat.to_u32", 1),
    func("Nat.to_u64", 1),
    func("Nat.to_u256", 1),
    func("Nat.to_f64", 3),
    func("Nat.to_bits", 1),
    func("U8.add", 2),
    func("U8.sub", 2),
    func("U8.mul", 2),
    func("U8.div", 2),
    func("U8.mod", 2),
    func("U8.pow", 2),
    func("U8.ltn", 2),
    func("U8.lte", 2),
    func("U8.eql", 2),
    func("U8.gte", 2),
    func("U8.gtn", 2),
    func("U8.shr", 2),
    func("U8.shl", 2),
    func("U8.and", 2),
    func("U8.or", 2),
    func("U8.xor", 2),
    func("U16.add", 2),
    func("U16.sub", 2),
    func("U16.mul", 2),
    func("U16.div", 2),
    func("U16.mod", 2),
    func("U16.pow", 2),
    func("U16.ltn", 2),
    func("U16.lte", 2),
    func("U16.eql", 2),
    func("U16.gte", 2),
    func("U16.gtn", 2),
    func("U16.shr", 2),
    func("U16.shl", 2),
    func("U16.and", 2),
    func("U16.or", 2),
    func("U16.xor", 2),
    func("U16.to_bits", 1),
    func("U32.add", 2),
    func("U32.sub", 2),
    func("U32.mul", 2),
    func("U32.div", 2),
    func("U32.mod", 2),
    func("U32.pow", 2),
    func("U32.ltn", 2),
    func("U32.lte", 2),
    func("U32.eql", 2),
    func("U32.gte", 2),
    func("U32.gtn", 2),
    func("U32.shr", 2),
    func("U32.shl", 2),
    func("U32.and", 2),
    func("U32.or", 2),
    func("U32.xor", 2),
    func("U32.slice", 3),
    func("U32.read_base", 2),
    func("U32.length", 1),
    func("U32.for", 4),
    func("U32.to_f64", 1),
    func("U64.add", 2),
    func("U64.sub", 2),
    func("U64.mul", 2),
    func("U64.div", 2),
    func("U64.mod", 2),
    func("U64.pow", 2),
    func("U64.ltn", 2),
    func("U64.lte", 2),
    func("U64.eql", 2),
    func("U64.gte", 2),
    func("U64.gtn", 2),
    func("U64.shr", 2),
    func("U64.shl", 2),
    func("U64.and", 2),
    func("U64.or", 2),
    func("U64.xor", 2),
    func("U256.add", 2),
    func("U256.sub", 2),
    func("U256.mul", 2),
    func("U256.div", 2),
    func("U256.mod", 2),
    func("F64.add", 2),
    func("F64.sub", 2),
    func("F64.mul", 2),
    func("F64.div", 2),
    func("F64.mod", 2),
    func("F64.pow", 2),
    func("F64.log", 1),
    func("F64.cos", 1),
    func("F64.sin", 1),
    func("F64.tan", 1),
    func("F64.acos", 1),
    func("F64.asin", 1),
    func("F64.atan", 1),
    func("F64.to_u32", 1),
    func("Buffer32.set", 3),
    func("Buffer32.get", 2),
    func("Buffer32.alloc", 1),
    func("Image3D.set_col", 3),
    func("Image3D.set_pos", 3),
    func("Image3D.set", 4),
    func("Image3D.push", 3),
    func("Image3D.get_pos", 2),
    func("Image3D.get_col", 2),
    func("String.eql", 2),
    func("String.concat", 2),
    func("Equal.cast", 1),
    func("Pos32.new", 3),
    func("Pos32.get_x", 1),
    func("Pos32.get_y", 1),
    func("Pos32.get_z", 1),
    func("Col32.get_a", 1),
    func("Col32.get_b", 1),
    func("Col32.get_g", 1),
    func("Col32.get_r", 1),
    func("Col32.new", 4),
    func("Fm.Name.to_bits", 1),
    func("List.for", 3),
    func("List.length", 1),
    func("Set.mut.new", 1),
    func("Set.mut.set", 2),
    func("Set.mut.has", 2),
    func("Set.mut.del", 2),
];

pub fn prim_type(name: &str) -> Option<&'static PrimType> {
    PRIM_TYPES.iter().find(|p| p.name == name)
}

pub fn prim_func(name: &str) -> Option<&'static PrimFunc> {
    PRIM_FUNCS.iter().find(|f| f.name == name)
}

/// The first primitive type `ty` is definitionally equal to.
pub fn prim_of(env: &Env, ty: &std::rc::Rc<Term>, depth: usize) -> Option<&'static PrimType> {
    PRIM_TYPES
        .iter()
        .find(|p| equal(ty, &Term::reference(p.name), env, depth))
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::test_support::{bool_env, bool_type};

    #[test]
    fn lookup_by_name() {
        assert_eq!(prim_type("Nat").map(|p| p.ctor_arities), Some(&[0usize, 1][..]));
        assert_eq!(prim_func("U32.for").map(|f| f.arity), Some(4));
        assert!(prim_type("Char").is_none());
        assert!(prim_func("Nat.succ").is_none());
    }

    #[test]
    fn prim_of_sees_through_definitions() {
        let env = bool_env();
        assert_eq!(prim_of(&env, &Term::reference("Bool"), 0).map(|p| p.name), Some("Bool"));
        assert_eq!(prim_of(&env, &bool_type(), 0).map(|p| p.name), Some("Bool"));
        assert_eq!(prim_of(&env, &Term::typ(), 0), None);
    }

    #[test]
    fn names_are_unique() {
        let mut names: Vec<_> = PRIM_FUNCS.iter().map(|f| f.name).collect();
        names.sort_unstable();
        let before = names.len();
        names.dedup();
        assert_eq!(before, names.len());
    }
}
