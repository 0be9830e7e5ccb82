use std::collections::BTreeMap;

use crate::types::{Type, TypeVar};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum VarNaming {
    // 't<id>, stable across renderers
    Raw,
    // 'a, 'b, ... in order of first appearance within one renderer
    Normalized,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum Precedence {
    Root,
    FuncRet,
    FuncArg,
}

/// Renders types for users.
///
/// A normalizing renderer remembers the names it has handed out, so rendering several types
/// with the same renderer (for instance both sides of a mismatch) names each variable
/// consistently.
#[derive(Clone, Debug)]
pub struct TypeRenderer {
    naming: VarNaming,
    names: BTreeMap<TypeVar, String>,
}

fn normalized_name(idx: usize) -> String {
    let letter = (b'a' + (idx % 26) as u8) as char;
    match idx / 26 {
        0 => format!("'{}", letter),
        round => format!("'{}{}", letter, round),
    }
}

impl TypeRenderer {
    pub fn new() -> Self {
        TypeRenderer {
            naming: VarNaming::Normalized,
            names: BTreeMap::new(),
        }
    }

    pub fn raw() -> Self {
        TypeRenderer {
            naming: VarNaming::Raw,
            names: BTreeMap::new(),
        }
    }

    fn var_name(&mut self, var: TypeVar) -> String {
        match self.naming {
            VarNaming::Raw => var.to_string(),
            VarNaming::Normalized => {
                let next = self.names.len();
                self.names
                    .entry(var)
                    .or_insert_with(|| normalized_name(next))
                    .clone()
            }
        }
    }

    fn render_to(&mut self, type_: &Type, dest: &mut String, prec: Precedence) {
        match type_ {
            Type::Unit => dest.push_str("()"),

            Type::Int => dest.push_str("Int"),

            &Type::Var(var) => {
                let name = self.var_name(var);
                dest.push_str(&name);
            }

            Type::Func(arg, ret) => {
                let parenthesize = prec >= Precedence::FuncArg;

                if parenthesize {
                    dest.push('(');
                }

                self.render_to(arg, dest, Precedence::FuncArg);
                dest.push_str(" -> ");
                self.render_to(ret, dest, Precedence::FuncRet);

                if parenthesize {
                    dest.push(')');
                }
            }

            Type::Tuple(items) => {
                dest.push('(');
                for (i, item) in items.iter().enumerate() {
                    self.render_to(item, dest, Precedence::Root);
                    if i + 1 != items.len() {
                        dest.push_str(", ");
                    }
                }
                if items.len() == 1 {
                    dest.push(',');
                }
                dest.push(')');
            }

            Type::Sum(label, payload) => {
                dest.push_str(&label.0);
                dest.push('(');
                self.render_to(payload, dest, Precedence::Root);
                dest.push(')');
            }
        }
    }

    pub fn render(&mut self, type_: &Type) -> String {
        let mut result = String::new();
        self.render_to(type_, &mut result, Precedence::Root);
        result
    }
}

impl Default for TypeRenderer {
    fn default() -> Self {
        TypeRenderer::new()
    }
}
