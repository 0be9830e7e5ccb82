use im_rc::Vector;

use crate::data::ast::VarName;
use crate::types::Type;

/// Names in scope, newest first.  Extending an environment produces a new one and leaves the
/// original untouched, so a binding is visible exactly in the subexpressions handed the extension.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeEnv {
    bindings: Vector<(VarName, Type)>,
}

impl TypeEnv {
    pub fn new() -> Self {
        TypeEnv {
            bindings: Vector::new(),
        }
    }

    /// Builds an environment whose first binding is the first to be found by `lookup`.
    pub fn from_bindings(bindings: impl IntoIterator<Item = (VarName, Type)>) -> Self {
        TypeEnv {
            bindings: bindings.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    pub fn lookup(&self, name: &VarName) -> Option<&Type> {
        self.bindings
            .iter()
            .find(|(bound, _)| bound == name)
            .map(|(_, type_)| type_)
    }

    pub fn bind(&self, name: VarName, type_: Type) -> Self {
        let mut bindings = self.bindings.clone();
        bindings.push_front((name, type_));
        TypeEnv { bindings }
    }

    /// `inner ++ self`: the bindings of `inner` shadow those of `self`.
    pub fn extend(&self, inner: &TypeEnv) -> Self {
        let mut bindings = inner.bindings.clone();
        bindings.append(self.bindings.clone());
        TypeEnv { bindings }
    }

    pub fn iter(&self) -> impl Iterator<Item = &(VarName, Type)> {
        self.bindings.iter()
    }
}
