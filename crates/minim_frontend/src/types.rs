use id_collections::{id_type, Id};
use std::collections::BTreeSet;
use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::data::ast::CtorName;
use crate::report_type::TypeRenderer;

#[id_type]
pub struct TypeVar(u32);

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "'t{}", self.to_index())
    }
}

// Shared by every inference call in the process.  Ids are only ever handed out once, so two
// substitutions that are live at the same time can never disagree about what a variable means.
static NEXT_VAR: AtomicU32 = AtomicU32::new(0);

pub fn next_var() -> TypeVar {
    TypeVar::from_index(NEXT_VAR.fetch_add(1, Ordering::Relaxed))
}

pub fn fresh() -> Type {
    Type::Var(next_var())
}

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Type {
    Unit,
    Int,
    Var(TypeVar),
    Func(Box<Type>, Box<Type>),
    // Never empty; the empty tuple is `Unit`.
    Tuple(Vec<Type>),
    Sum(CtorName, Box<Type>),
}

impl Type {
    pub fn func(arg: Type, ret: Type) -> Self {
        Type::Func(Box::new(arg), Box::new(ret))
    }

    pub fn tuple(items: Vec<Type>) -> Self {
        if items.is_empty() {
            Type::Unit
        } else {
            Type::Tuple(items)
        }
    }

    pub fn sum(label: CtorName, payload: Type) -> Self {
        Type::Sum(label, Box::new(payload))
    }

    pub fn occurs(&self, var: TypeVar) -> bool {
        match self {
            Type::Unit | Type::Int => false,
            Type::Var(other) => *other == var,
            Type::Func(arg, ret) => arg.occurs(var) || ret.occurs(var),
            Type::Tuple(items) => items.iter().any(|item| item.occurs(var)),
            Type::Sum(_, payload) => payload.occurs(var),
        }
    }

    pub fn free_vars(&self) -> BTreeSet<TypeVar> {
        fn collect(type_: &Type, dest: &mut BTreeSet<TypeVar>) {
            match type_ {
                Type::Unit | Type::Int => {}
                Type::Var(var) => {
                    dest.insert(*var);
                }
                Type::Func(arg, ret) => {
                    collect(arg, dest);
                    collect(ret, dest);
                }
                Type::Tuple(items) => {
                    for item in items {
                        collect(item, dest);
                    }
                }
                Type::Sum(_, payload) => collect(payload, dest),
            }
        }

        let mut vars = BTreeSet::new();
        collect(self, &mut vars);
        vars
    }

    pub fn is_ground(&self) -> bool {
        self.free_vars().is_empty()
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&TypeRenderer::raw().render(self))
    }
}
