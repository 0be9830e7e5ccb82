#[cfg(test)]
mod test;

pub mod cli;
pub mod load;

use minim_common::file_cache::FileCache;
use minim_common::progress_ui;
use minim_common::report_error::Reportable;
use minim_frontend::check_program;
use minim_frontend::report_type::TypeRenderer;
use std::io;

#[derive(Debug)]
enum ErrorKind {
    LoadFailed(load::Error),
    CheckFailed(minim_frontend::Error),
    WriteFailed(io::Error),
}

// This type is separate from 'ErrorKind' so that the error types of the other crates don't become
// part of this crate's public interface.
#[derive(Debug)]
pub struct Error {
    kind: ErrorKind,
}

impl From<ErrorKind> for Error {
    fn from(kind: ErrorKind) -> Self {
        Error { kind }
    }
}

impl Error {
    pub fn type_error(&self) -> Option<&minim_frontend::Error> {
        match &self.kind {
            ErrorKind::CheckFailed(err) => Some(err),
            _ => None,
        }
    }

    pub fn load_error(&self) -> Option<&load::Error> {
        match &self.kind {
            ErrorKind::LoadFailed(err) => Some(err),
            _ => None,
        }
    }
}

impl Reportable for Error {
    fn report(&self, dest: &mut impl io::Write, files: &FileCache) -> io::Result<()> {
        match &self.kind {
            ErrorKind::LoadFailed(err) => err.report(dest, files),
            ErrorKind::CheckFailed(err) => err.report(dest, files),
            ErrorKind::WriteFailed(err) => writeln!(dest, "Could not write output: {}", err),
        }
    }

    fn exit_status(&self) -> i32 {
        match &self.kind {
            ErrorKind::LoadFailed(err) => err.exit_status(),
            ErrorKind::CheckFailed(err) => err.exit_status(),
            ErrorKind::WriteFailed(_) => 1,
        }
    }
}

pub fn handle_config(config: cli::Config, files: &mut FileCache) -> Result<(), Error> {
    match config {
        cli::Config::CheckConfig(check_config) => {
            check(check_config, files, &mut io::stdout().lock())
        }
    }
}

/// Checks a program and writes one `name : type` line per definition to `dest`.
pub fn check(
    config: cli::CheckConfig,
    files: &mut FileCache,
    dest: &mut impl io::Write,
) -> Result<(), Error> {
    let program = load::load_program(&config.src_path, files).map_err(ErrorKind::LoadFailed)?;

    let def_types = check_program(&program, progress_ui::bar(config.progress, "Checking types"))
        .map_err(ErrorKind::CheckFailed)?;

    if config.quiet {
        return Ok(());
    }

    // One renderer for the whole program: a definition's unresolved variables may reappear in
    // the types of later definitions that use it.
    let mut renderer = TypeRenderer::new();
    for (name, def_type) in &def_types {
        let rendered = renderer.render(def_type);
        writeln!(dest, "{} : {}", name, rendered).map_err(ErrorKind::WriteFailed)?;
    }

    Ok(())
}
