use std::io;
use std::path::{Path, PathBuf};

use minim_common::file_cache::FileCache;
use minim_common::lines;
use minim_common::report_error::{locate_path, Locate, Reportable};
use minim_frontend::data::ast::{Expr, Pattern, Program, VarName};
use serde::Deserialize;

#[derive(Debug)]
pub enum ErrorKind {
    ReadFailed(PathBuf, io::Error),
    ParseJsonFailed(serde_json::Error),
    EmptyMatch(VarName),
    InvalidSpan(usize, usize),
}

type RawError = Locate<ErrorKind>;

#[derive(Debug)]
pub struct Error(RawError);

impl Error {
    pub fn kind(&self) -> &ErrorKind {
        &self.0.error
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write, files: &FileCache) -> io::Result<()> {
        use ErrorKind::*;

        if let ReadFailed(path, err) = &self.0.error {
            if err.kind() != io::ErrorKind::NotFound {
                writeln!(dest, "Could not read {}: {}", path.display(), err)?;
                return Ok(());
            }
        }

        self.0.report_with(dest, files, |kind| match kind {
            ReadFailed(path, _) => (
                "File Not Found",
                format!(
                    lines!["I couldn't find a file at this path:", "", "    {path}"],
                    path = path.display(),
                ),
            ),

            ParseJsonFailed(err) => (
                "Malformed Program",
                format!(
                    lines![
                        "I couldn't read a syntax tree from this file.  The problem is at line \
                         {line}, column {column}:",
                        "",
                        "    {err}",
                    ],
                    line = err.line(),
                    column = err.column(),
                    err = err,
                ),
            ),

            EmptyMatch(name) => (
                "Empty Match",
                format!(
                    lines![
                        "The definition '{name}' contains a match expression with no cases.",
                        "",
                        "A match needs at least one case, so that its value has a type.",
                    ],
                    name = name,
                ),
            ),

            InvalidSpan(lo, hi) => (
                "Invalid Span",
                format!(
                    "The span from byte {} to byte {} is not a range within the program's source.",
                    lo, hi
                ),
            ),
        })
    }

    fn exit_status(&self) -> i32 {
        1
    }
}

const STACK_RED_ZONE_BYTES: usize = 256 * 1024;
const STACK_GROW_BYTES: usize = 1024 * 1024;

// With no source text, only the ordering of the offsets can be checked.
fn check_span(lo: usize, hi: usize, source_len: Option<usize>) -> Result<(), ErrorKind> {
    let in_bounds = match source_len {
        Some(len) => hi <= len,
        None => true,
    };
    if lo > hi || !in_bounds {
        return Err(ErrorKind::InvalidSpan(lo, hi));
    }
    Ok(())
}

fn validate_pat(pat: &Pattern, source_len: Option<usize>) -> Result<(), ErrorKind> {
    stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROW_BYTES, || match pat {
        Pattern::Unit | Pattern::IntConst(_) | Pattern::Any | Pattern::Var(_) => Ok(()),
        Pattern::Ctor(_, content) => validate_pat(content, source_len),
        Pattern::Tuple(items) => items
            .iter()
            .try_for_each(|item| validate_pat(item, source_len)),
        &Pattern::Span(lo, hi, ref content) => {
            check_span(lo, hi, source_len)?;
            validate_pat(content, source_len)
        }
    })
}

fn validate_expr(def: &VarName, expr: &Expr, source_len: Option<usize>) -> Result<(), ErrorKind> {
    stacker::maybe_grow(STACK_RED_ZONE_BYTES, STACK_GROW_BYTES, || match expr {
        Expr::Unit | Expr::IntLit(_) | Expr::Var(_) => Ok(()),

        Expr::Let(lhs, rhs, body) => {
            validate_pat(lhs, source_len)?;
            validate_expr(def, rhs, source_len)?;
            validate_expr(def, body, source_len)
        }

        Expr::Fun(param, body) => {
            validate_pat(param, source_len)?;
            validate_expr(def, body, source_len)
        }

        Expr::If(cond, then_case, else_case) => {
            validate_expr(def, cond, source_len)?;
            validate_expr(def, then_case, source_len)?;
            validate_expr(def, else_case, source_len)
        }

        Expr::Tuple(items) => items
            .iter()
            .try_for_each(|item| validate_expr(def, item, source_len)),

        Expr::BinOp(_, lhs, rhs) | Expr::App(lhs, rhs) => {
            validate_expr(def, lhs, source_len)?;
            validate_expr(def, rhs, source_len)
        }

        Expr::Match(discrim, cases) => {
            if cases.is_empty() {
                return Err(ErrorKind::EmptyMatch(def.clone()));
            }
            validate_expr(def, discrim, source_len)?;
            cases.iter().try_for_each(|(pat, body)| {
                validate_pat(pat, source_len)?;
                validate_expr(def, body, source_len)
            })
        }

        Expr::Ctor(_, content) => validate_expr(def, content, source_len),

        &Expr::Span(lo, hi, ref content) => {
            check_span(lo, hi, source_len)?;
            validate_expr(def, content, source_len)
        }
    })
}

/// Checks the invariants the type checker relies on but the JSON encoding cannot express.
///
/// `source_len` is the length in bytes of the program's source text, when it is available; every
/// span must then lie within it.
pub fn validate(program: &Program, source_len: Option<usize>) -> Result<(), ErrorKind> {
    program
        .defs
        .iter()
        .try_for_each(|def| validate_expr(&def.name, &def.body, source_len))
}

/// Parses a JSON-encoded program.  Nesting depth is limited only by memory.
pub fn parse_program(content: &str) -> Result<Program, serde_json::Error> {
    let mut json = serde_json::Deserializer::from_str(content);
    json.disable_recursion_limit();
    let program = Program::deserialize(serde_stacker::Deserializer::new(&mut json))?;
    json.end()?;
    Ok(program)
}

/// Reads a JSON-encoded program, and the source text it refers to, if any.
///
/// A relative `source` path is taken relative to the directory containing the JSON file, and is
/// replaced by the resolved path in the returned program.
pub fn load_program(path: &Path, files: &mut FileCache) -> Result<Program, Error> {
    load_program_raw(path, files)
        .map_err(locate_path(path))
        .map_err(Error)
}

fn load_program_raw(path: &Path, files: &mut FileCache) -> Result<Program, RawError> {
    let content = files
        .read(path)
        .map_err(|err| ErrorKind::ReadFailed(path.to_owned(), err))?;

    let mut program = parse_program(content).map_err(ErrorKind::ParseJsonFailed)?;

    let mut source_len = None;
    if let Some(source) = &program.source {
        let resolved = match path.parent() {
            Some(dir) => dir.join(source),
            None => source.clone(),
        };
        let text = files
            .read(&resolved)
            .map_err(|err| ErrorKind::ReadFailed(resolved.clone(), err))?;
        source_len = Some(text.len());
        program.source = Some(resolved);
    }

    validate(&program, source_len)?;

    Ok(program)
}
