use std::collections::BTreeSet;
use std::io;
use std::path::Path;

use crate::data::ast::{Expr, Pattern, Program, VarName};
use crate::env::TypeEnv;
use crate::report_type::TypeRenderer;
use crate::subst::{Substitution, UnifyError};
use crate::types::{fresh, Type};
use minim_common::file_cache::FileCache;
use minim_common::lines;
use minim_common::report_error::{locate_path, locate_span, Locate, Reportable};
use minim_common::util::progress_logger::{ProgressLogger, ProgressSession};

// Inference recurses once per AST node, so deeply nested programs can exhaust the default stack.
const STACK_RED_ZONE_BYTES: usize = 256 * 1024;
const STACK_GROW_BYTES: usize = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    UnboundVariable(VarName),
    DuplicateBinding(VarName),
    Unify(UnifyError),
}

type RawError = Locate<ErrorKind>;

#[derive(Clone, Debug)]
pub struct Error(RawError);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0.error
    }

    pub fn span(&self) -> Option<(usize, usize)> {
        self.0.span
    }

    pub fn path(&self) -> Option<&Path> {
        self.0.path.as_deref()
    }
}

fn describe(kind: &ErrorKind) -> (&'static str, String) {
    match kind {
        ErrorKind::UnboundVariable(name) => (
            "Unbound Variable",
            format!("I can't find a variable named '{}' in scope here.", name),
        ),

        ErrorKind::DuplicateBinding(name) => (
            "Duplicate Binding",
            format!(
                lines![
                    "The variable '{name}' is bound more than once in this pattern.",
                    "",
                    "Each name may appear only once in a single pattern.  Give the other \
                     occurrences different names, or use '_' if you don't need them.",
                ],
                name = name,
            ),
        ),

        ErrorKind::Unify(UnifyError::Mismatch(lhs, rhs)) => {
            let mut renderer = TypeRenderer::new();
            let lhs = renderer.render(lhs);
            let rhs = renderer.render(rhs);
            (
                "Type Mismatch",
                format!(
                    lines![
                        "I need these two types to be the same:",
                        "",
                        "    {lhs}",
                        "",
                        "    {rhs}",
                        "",
                        "but they have different shapes.",
                    ],
                    lhs = lhs,
                    rhs = rhs,
                ),
            )
        }

        ErrorKind::Unify(UnifyError::ArityMismatch(lhs, rhs)) => (
            "Tuple Size Mismatch",
            format!(
                "A tuple with {} elements is used where a tuple with {} elements is expected.",
                lhs, rhs,
            ),
        ),

        ErrorKind::Unify(UnifyError::LabelMismatch(lhs, rhs)) => (
            "Constructor Mismatch",
            format!(
                lines![
                    "A value built with '{lhs}' is used where one built with '{rhs}' is expected.",
                    "",
                    "Every case of a match must use the same constructor.",
                ],
                lhs = lhs,
                rhs = rhs,
            ),
        ),

        ErrorKind::Unify(UnifyError::OccursCheck(var, type_)) => {
            let mut renderer = TypeRenderer::new();
            let var = renderer.render(&Type::Var(*var));
            let type_ = renderer.render(type_);
            (
                "Cyclic Type",
                format!(
                    lines![
                        "I couldn't infer a type for this expression.",
                        "",
                        "Its type {var} would have to equal {type_}, which mentions {var} \
                         itself, so the type would be infinitely big.",
                    ],
                    var = var,
                    type_ = type_,
                ),
            )
        }
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write, files: &FileCache) -> io::Result<()> {
        self.0.report_with(dest, files, describe)
    }

    fn exit_status(&self) -> i32 {
        1
    }
}

fn unify(
    subst: &mut Substitution,
    constraints: impl IntoIterator<Item = (Type, Type)>,
) -> Result<(), RawError> {
    subst
        .unify(constraints)
        .map_err(|err| RawError::from(ErrorKind::Unify(err)))
}

fn infer_pat(
    seen: &mut BTreeSet<VarName>,
    bindings: &mut Vec<(VarName, Type)>,
    pat: &Pattern,
) -> Result<Type, RawError> {
    match pat {
        Pattern::Unit => Ok(Type::Unit),

        Pattern::IntConst(_) => Ok(Type::Int),

        Pattern::Any => Ok(fresh()),

        Pattern::Var(name) => {
            if !seen.insert(name.clone()) {
                return Err(ErrorKind::DuplicateBinding(name.clone()).into());
            }

            let var_type = fresh();
            bindings.push((name.clone(), var_type.clone()));
            Ok(var_type)
        }

        Pattern::Ctor(label, content) => {
            let content_type = infer_pat(seen, bindings, content)?;
            Ok(Type::sum(label.clone(), content_type))
        }

        Pattern::Tuple(items) => {
            let item_types = items
                .iter()
                .map(|item| infer_pat(seen, bindings, item))
                .collect::<Result<_, _>>()?;
            Ok(Type::tuple(item_types))
        }

        Pattern::Span(lo, hi, content) => {
            infer_pat(seen, bindings, content).map_err(locate_span(*lo, *hi))
        }
    }
}

fn infer_pat_env(pat: &Pattern) -> Result<(Type, TypeEnv), RawError> {
    let mut seen = BTreeSet::new();
    let mut bindings = Vec::new();
    let pat_type = infer_pat(&mut seen, &mut bindings, pat)?;
    Ok((pat_type, TypeEnv::from_bindings(bindings)))
}

/// Computes the type of a pattern together with the variables it binds, in the order they occur.
///
/// The result may mention fresh, unconstrained variables; it is up to the caller to relate them
/// to the value being matched.
pub fn infer_pattern(pat: &Pattern) -> Result<(Type, TypeEnv), Error> {
    infer_pat_env(pat).map_err(Error)
}

fn infer_expr(env: &TypeEnv, subst: &mut Substitution, expr: &Expr) -> Result<Type, RawError> {
    stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROW_BYTES, move || match expr {
        Expr::Unit => Ok(Type::Unit),

        Expr::IntLit(_) => Ok(Type::Int),

        Expr::Var(name) => match env.lookup(name) {
            Some(bound) => Ok(subst.apply(bound)),
            None => Err(ErrorKind::UnboundVariable(name.clone()).into()),
        },

        Expr::Let(lhs, rhs, body) => {
            let (lhs_type, lhs_env) = infer_pat_env(lhs)?;
            let scope = env.extend(&lhs_env);

            let rhs_type = infer_expr(&scope, subst, rhs)?;
            unify(subst, [(lhs_type, rhs_type)])?;

            let body_type = infer_expr(&scope, subst, body)?;
            Ok(subst.apply(&body_type))
        }

        Expr::Fun(param, body) => {
            let (param_type, param_env) = infer_pat_env(param)?;
            let body_type = infer_expr(&env.extend(&param_env), subst, body)?;
            Ok(subst.apply(&Type::func(param_type, body_type)))
        }

        Expr::If(cond, then_case, else_case) => {
            let cond_type = infer_expr(env, subst, cond)?;
            let then_type = infer_expr(env, subst, then_case)?;
            let else_type = infer_expr(env, subst, else_case)?;
            unify(
                subst,
                [(cond_type, Type::Int), (then_type.clone(), else_type)],
            )?;
            Ok(subst.apply(&then_type))
        }

        Expr::Tuple(items) => {
            let item_types = items
                .iter()
                .map(|item| infer_expr(env, subst, item))
                .collect::<Result<_, _>>()?;
            Ok(subst.apply(&Type::tuple(item_types)))
        }

        Expr::BinOp(_op, lhs, rhs) => {
            let lhs_type = infer_expr(env, subst, lhs)?;
            let rhs_type = infer_expr(env, subst, rhs)?;
            unify(subst, [(lhs_type, Type::Int), (rhs_type, Type::Int)])?;
            Ok(Type::Int)
        }

        Expr::Match(discrim, cases) => {
            let discrim_type = infer_expr(env, subst, discrim)?;

            let case_types = cases
                .iter()
                .map(|(pat, body)| {
                    let (pat_type, pat_env) = infer_pat_env(pat)?;
                    let body_type = infer_expr(&env.extend(&pat_env), subst, body)?;
                    Ok((pat_type, body_type))
                })
                .collect::<Result<Vec<_>, RawError>>()?;

            let ((first_pat, first_body), rest) = match case_types.split_first() {
                Some(split) => split,
                None => unreachable!("match expression with no cases"),
            };

            unify(
                subst,
                rest.iter().flat_map(|(pat_type, body_type)| {
                    [
                        (pat_type.clone(), first_pat.clone()),
                        (body_type.clone(), first_body.clone()),
                    ]
                }),
            )?;
            unify(subst, [(first_pat.clone(), discrim_type)])?;

            Ok(subst.apply(first_body))
        }

        Expr::App(func, arg) => {
            let arg_type = infer_expr(env, subst, arg)?;
            let func_type = infer_expr(env, subst, func)?;
            let ret_type = fresh();
            unify(subst, [(Type::func(arg_type, ret_type.clone()), func_type)])?;
            Ok(subst.apply(&ret_type))
        }

        Expr::Ctor(label, content) => {
            let content_type = infer_expr(env, subst, content)?;
            Ok(subst.apply(&Type::sum(label.clone(), content_type)))
        }

        Expr::Span(lo, hi, body) => infer_expr(env, subst, body).map_err(locate_span(*lo, *hi)),
    })
}

/// Infers the type of `expr` with the variables of `env` in scope.
///
/// Each call solves its constraints in a substitution of its own, so types taken from `env` are
/// used as they are: a variable in them stands for one unknown type, not for any type.
pub fn infer(env: &TypeEnv, expr: &Expr) -> Result<Type, Error> {
    let mut subst = Substitution::empty();
    infer_expr(env, &mut subst, expr).map_err(Error)
}

/// Checks the definitions of `program` in order, each one seeing the definitions before it.
///
/// The whole program shares one substitution, exactly as if each definition were a `let` around
/// the ones after it.  A later use of a definition can therefore refine its type, and the
/// returned types reflect every definition.
pub fn check_program(
    program: &Program,
    progress: impl ProgressLogger,
) -> Result<Vec<(VarName, Type)>, Error> {
    let mut progress = progress.start_session(Some(program.defs.len()));

    let mut env = TypeEnv::new();
    let mut subst = Substitution::empty();
    let mut def_types = Vec::with_capacity(program.defs.len());

    for def in &program.defs {
        let def_type = infer_expr(&env, &mut subst, &def.body)
            .map_err(|err| match &program.source {
                Some(source) => locate_path(source)(err),
                None => err,
            })
            .map_err(Error)?;

        env = env.bind(def.name.clone(), def_type.clone());
        def_types.push((def.name.clone(), def_type));
        progress.update(1);
    }

    progress.finish();

    Ok(def_types
        .into_iter()
        .map(|(name, def_type)| (name, subst.apply(&def_type)))
        .collect())
}
