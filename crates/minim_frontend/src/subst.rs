use std::collections::BTreeMap;

use crate::data::ast::CtorName;
use crate::types::{Type, TypeVar};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum UnifyError {
    #[error("type mismatch: {0} is not {1}")]
    Mismatch(Type, Type),
    #[error("tuple arity mismatch: {0} elements against {1}")]
    ArityMismatch(usize, usize),
    #[error("constructor mismatch: {0} is not {1}")]
    LabelMismatch(CtorName, CtorName),
    #[error("occurs check: {0} occurs in {1}")]
    OccursCheck(TypeVar, Type),
}

/// The solution to every equality constraint seen so far in one top-level inference call.
///
/// Bindings are only added, never changed, and a variable is never bound to a type mentioning
/// itself, directly or through other bindings.  Together these guarantee that `apply` terminates.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Substitution {
    bindings: BTreeMap<TypeVar, Type>,
}

impl Substitution {
    pub fn empty() -> Self {
        Substitution {
            bindings: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn lookup(&self, var: TypeVar) -> Option<&Type> {
        self.bindings.get(&var)
    }

    /// Resolves every bound variable in `type_`, transitively.  Unbound variables are left as
    /// they are.
    pub fn apply(&self, type_: &Type) -> Type {
        match type_ {
            Type::Unit => Type::Unit,
            Type::Int => Type::Int,
            &Type::Var(var) => match self.bindings.get(&var) {
                Some(bound) => self.apply(bound),
                None => Type::Var(var),
            },
            Type::Func(arg, ret) => Type::func(self.apply(arg), self.apply(ret)),
            Type::Tuple(items) => Type::Tuple(items.iter().map(|item| self.apply(item)).collect()),
            Type::Sum(label, payload) => Type::sum(label.clone(), self.apply(payload)),
        }
    }

    /// Solves the constraints left to right, so each pair sees the bindings made by the ones
    /// before it.  On failure the bindings made before the failing pair are kept.
    pub fn unify(
        &mut self,
        constraints: impl IntoIterator<Item = (Type, Type)>,
    ) -> Result<(), UnifyError> {
        for (lhs, rhs) in constraints {
            self.unify_rec(&lhs, &rhs)?;
        }
        Ok(())
    }

    fn unify_rec(&mut self, lhs: &Type, rhs: &Type) -> Result<(), UnifyError> {
        let lhs = self.apply(lhs);
        let rhs = self.apply(rhs);

        match (&lhs, &rhs) {
            (Type::Var(var1), Type::Var(var2)) if var1 == var2 => Ok(()),

            (&Type::Var(var), other) | (other, &Type::Var(var)) => self.bind(var, other),

            (Type::Unit, Type::Unit) | (Type::Int, Type::Int) => Ok(()),

            (Type::Func(arg1, ret1), Type::Func(arg2, ret2)) => {
                self.unify_rec(arg1, arg2)?;
                self.unify_rec(ret1, ret2)
            }

            (Type::Tuple(items1), Type::Tuple(items2)) => {
                if items1.len() != items2.len() {
                    return Err(UnifyError::ArityMismatch(items1.len(), items2.len()));
                }

                for (item1, item2) in items1.iter().zip(items2) {
                    self.unify_rec(item1, item2)?;
                }
                Ok(())
            }

            (Type::Sum(label1, payload1), Type::Sum(label2, payload2)) => {
                if label1 != label2 {
                    return Err(UnifyError::LabelMismatch(label1.clone(), label2.clone()));
                }

                self.unify_rec(payload1, payload2)
            }

            _ => Err(UnifyError::Mismatch(lhs.clone(), rhs.clone())),
        }
    }

    // `type_` must already be resolved, so checking it directly is enough to rule out cycles.
    fn bind(&mut self, var: TypeVar, type_: &Type) -> Result<(), UnifyError> {
        if type_.occurs(var) {
            return Err(UnifyError::OccursCheck(var, type_.clone()));
        }

        let prev = self.bindings.insert(var, type_.clone());
        debug_assert!(prev.is_none(), "{:?} was bound twice", var);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::types::{fresh, next_var};

    fn label(name: &str) -> CtorName {
        CtorName(name.to_owned())
    }

    #[test]
    fn test_empty_substitution() {
        let subst = Substitution::empty();
        let var = fresh();
        assert!(subst.is_empty());
        assert_eq!(subst.apply(&var), var);
        assert_eq!(subst.apply(&Type::Int), Type::Int);
    }

    #[test]
    fn test_apply_is_transitive() {
        let a = next_var();
        let b = next_var();
        let mut subst = Substitution::empty();
        subst
            .unify([
                (Type::Var(a), Type::func(Type::Var(b), Type::Var(b))),
                (Type::Var(b), Type::tuple(vec![Type::Int, Type::Unit])),
            ])
            .expect("constraints are consistent");

        let pair = Type::tuple(vec![Type::Int, Type::Unit]);
        assert_eq!(subst.apply(&Type::Var(a)), Type::func(pair.clone(), pair));
    }

    #[test]
    fn test_apply_is_idempotent() {
        let a = next_var();
        let b = next_var();
        let c = next_var();
        let mut subst = Substitution::empty();
        subst
            .unify([
                (Type::Var(a), Type::func(Type::Var(b), Type::Var(c))),
                (Type::Var(c), Type::sum(label("Just"), Type::Var(b))),
                (Type::Var(b), Type::Int),
            ])
            .expect("constraints are consistent");

        let ty = Type::tuple(vec![Type::Var(a), Type::Var(c), fresh()]);
        let once = subst.apply(&ty);
        assert_eq!(subst.apply(&once), once);
    }

    #[test]
    fn test_unify_same_var_binds_nothing() {
        let a = fresh();
        let mut subst = Substitution::empty();
        subst.unify([(a.clone(), a)]).expect("a var unifies with itself");
        assert!(subst.is_empty());
    }

    #[test]
    fn test_unify_var_on_either_side() {
        let a = next_var();
        let b = next_var();
        let mut subst = Substitution::empty();
        subst
            .unify([(Type::Var(a), Type::Int), (Type::Unit, Type::Var(b))])
            .expect("constraints are consistent");
        assert_eq!(subst.lookup(a), Some(&Type::Int));
        assert_eq!(subst.lookup(b), Some(&Type::Unit));
    }

    #[test]
    fn test_unify_functions() {
        let a = next_var();
        let b = next_var();
        let mut subst = Substitution::empty();
        subst
            .unify([(
                Type::func(Type::Var(a), Type::Int),
                Type::func(Type::Unit, Type::Var(b)),
            )])
            .expect("function types unify");
        assert_eq!(subst.apply(&Type::Var(a)), Type::Unit);
        assert_eq!(subst.apply(&Type::Var(b)), Type::Int);
    }

    #[test]
    fn test_unify_mismatch() {
        let mut subst = Substitution::empty();
        let err = subst
            .unify([(Type::Int, Type::func(Type::Int, Type::Int))])
            .unwrap_err();
        assert_eq!(
            err,
            UnifyError::Mismatch(Type::Int, Type::func(Type::Int, Type::Int))
        );

        let err = subst
            .unify([(Type::Unit, Type::tuple(vec![Type::Int]))])
            .unwrap_err();
        assert!(matches!(err, UnifyError::Mismatch(Type::Unit, Type::Tuple(_))));
    }

    #[test]
    fn test_unify_arity_mismatch() {
        let mut subst = Substitution::empty();
        let err = subst
            .unify([(
                Type::tuple(vec![Type::Int, Type::Int]),
                Type::tuple(vec![Type::Int, Type::Int, fresh()]),
            )])
            .unwrap_err();
        assert_eq!(err, UnifyError::ArityMismatch(2, 3));
    }

    #[test]
    fn test_unify_label_mismatch() {
        let mut subst = Substitution::empty();
        let err = subst
            .unify([(
                Type::sum(label("A"), Type::Int),
                Type::sum(label("B"), Type::Int),
            )])
            .unwrap_err();
        assert_eq!(err, UnifyError::LabelMismatch(label("A"), label("B")));
    }

    #[test]
    fn test_unify_same_label_unifies_payloads() {
        let a = next_var();
        let mut subst = Substitution::empty();
        subst
            .unify([(
                Type::sum(label("A"), Type::Var(a)),
                Type::sum(label("A"), Type::Int),
            )])
            .expect("payloads unify");
        assert_eq!(subst.apply(&Type::Var(a)), Type::Int);
    }

    #[test]
    fn test_occurs_check() {
        let a = next_var();
        let mut subst = Substitution::empty();
        let recursive = Type::func(Type::Var(a), Type::Int);
        let err = subst
            .unify([(Type::Var(a), recursive.clone())])
            .unwrap_err();
        assert_eq!(err, UnifyError::OccursCheck(a, recursive));
        assert!(subst.is_empty());
    }

    #[test]
    fn test_occurs_check_through_bindings() {
        let a = next_var();
        let b = next_var();
        let mut subst = Substitution::empty();
        subst
            .unify([(Type::Var(a), Type::tuple(vec![Type::Var(b), Type::Int]))])
            .expect("no cycle yet");

        let err = subst.unify([(Type::Var(b), Type::Var(a))]).unwrap_err();
        assert!(matches!(err, UnifyError::OccursCheck(var, _) if var == b));
    }

    #[test]
    fn test_earlier_bindings_survive_failure() {
        let a = next_var();
        let mut subst = Substitution::empty();
        let err = subst
            .unify([(Type::Var(a), Type::Int), (Type::Unit, Type::Int)])
            .unwrap_err();
        assert_eq!(err, UnifyError::Mismatch(Type::Unit, Type::Int));
        assert_eq!(subst.lookup(a), Some(&Type::Int));
    }

    #[test]
    fn test_independent_constraints_commute() {
        let a = next_var();
        let b = next_var();
        let first = (Type::Var(a), Type::func(Type::Int, Type::Unit));
        let second = (Type::Var(b), Type::tuple(vec![Type::Int, Type::Int]));

        let mut forward = Substitution::empty();
        forward.unify([first.clone()]).expect("consistent");
        forward.unify([second.clone()]).expect("consistent");

        let mut backward = Substitution::empty();
        backward.unify([second]).expect("consistent");
        backward.unify([first]).expect("consistent");

        assert_eq!(forward, backward);
    }

    #[test]
    fn test_shared_var_constraints_commute_when_consistent() {
        let a = next_var();
        let b = next_var();
        let probe = Type::tuple(vec![Type::Var(a), Type::Var(b)]);

        let mut forward = Substitution::empty();
        forward
            .unify([(Type::Var(a), Type::Var(b)), (Type::Var(a), Type::Int)])
            .expect("consistent");

        let mut backward = Substitution::empty();
        backward
            .unify([(Type::Var(a), Type::Int), (Type::Var(a), Type::Var(b))])
            .expect("consistent");

        let expected = Type::tuple(vec![Type::Int, Type::Int]);
        assert_eq!(forward.apply(&probe), expected);
        assert_eq!(backward.apply(&probe), expected);
        // The bindings themselves depend on the order.
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_shared_var_constraints_report_in_order() {
        let a = next_var();

        let mut forward = Substitution::empty();
        let err = forward
            .unify([(Type::Var(a), Type::Int), (Type::Var(a), Type::Unit)])
            .unwrap_err();
        assert_eq!(err, UnifyError::Mismatch(Type::Int, Type::Unit));

        let mut backward = Substitution::empty();
        let err = backward
            .unify([(Type::Var(a), Type::Unit), (Type::Var(a), Type::Int)])
            .unwrap_err();
        assert_eq!(err, UnifyError::Mismatch(Type::Unit, Type::Int));
    }
}
