use ansi_term::{Color, Style};
use std::io;
use std::path::{Path, PathBuf};
use textwrap::{Options, WordSplitter};

use crate::file_cache::FileCache;

/// Line-start index over a source text.  Byte offsets are assumed to fall on char boundaries.
#[derive(Clone, Debug)]
struct SourceLines<'a> {
    content: &'a str,
    starts: Vec<usize>,
}

impl<'a> SourceLines<'a> {
    fn new(content: &'a str) -> Self {
        let mut starts = vec![0];
        starts.extend(
            content
                .char_indices()
                .filter(|&(_, c)| c == '\n')
                .map(|(idx, _)| idx + 1),
        );
        SourceLines { content, starts }
    }

    fn num_lines(&self) -> usize {
        self.starts.len()
    }

    /// Zero-based line containing `byte`.
    fn line_of(&self, byte: usize) -> usize {
        match self.starts.binary_search(&byte) {
            Ok(line) => line,
            Err(next) => next.saturating_sub(1),
        }
    }

    /// Zero-based line containing the last byte of the half-open range ending at `end`.
    fn last_line_of(&self, end: usize) -> usize {
        self.line_of(end.saturating_sub(1))
    }

    /// Restricts a span to the text, keeping `lo <= hi`.
    fn clamp(&self, lo: usize, hi: usize) -> (usize, usize) {
        let lo = lo.min(self.content.len());
        (lo, hi.min(self.content.len()).max(lo))
    }

    fn col_of(&self, line: usize, byte: usize) -> usize {
        byte - self.starts[line]
    }

    fn line(&self, line: usize) -> &'a str {
        let start = self.starts[line];
        let end = match self.starts.get(line + 1) {
            Some(next) => next - 1,
            None => self.content.len(),
        };
        self.content[start..end].trim_end_matches('\r')
    }
}

fn gutter_width(src: &SourceLines) -> usize {
    src.num_lines().to_string().len()
}

fn write_gutter(
    dest: &mut impl io::Write,
    style: Style,
    width: usize,
    line: Option<usize>,
) -> io::Result<()> {
    let label = line.map(|line| (line + 1).to_string()).unwrap_or_default();
    write!(dest, "{}", style.paint(format!(" {label:>width$} |")))
}

fn format_snippet(
    dest: &mut impl io::Write,
    src: &SourceLines,
    lo: usize,
    hi: usize,
) -> io::Result<()> {
    let gutter_style = Color::Blue.bold();
    let indicator_style = Color::Red.bold();
    let width = gutter_width(src);
    let (lo, hi) = src.clamp(lo, hi);

    let lo_line = src.line_of(lo);
    let hi_line = src.last_line_of(hi.max(lo + 1));

    if lo_line == hi_line {
        write_gutter(dest, gutter_style, width, None)?;
        writeln!(dest)?;
        write_gutter(dest, gutter_style, width, Some(lo_line))?;
        writeln!(dest, " {}", src.line(lo_line))?;
        write_gutter(dest, gutter_style, width, None)?;
        writeln!(
            dest,
            " {pad}{indicator}",
            pad = " ".repeat(src.col_of(lo_line, lo)),
            indicator = indicator_style.paint("^".repeat((hi - lo).max(1))),
        )?;
        return Ok(());
    }

    let start_col = src.col_of(lo_line, lo);
    let widest = (lo_line..=hi_line)
        .map(|line| src.line(line).len())
        .max()
        .unwrap_or(start_col);

    write_gutter(dest, gutter_style, width, None)?;
    writeln!(
        dest,
        " {pad}{indicator}",
        pad = " ".repeat(start_col),
        indicator = indicator_style.paint(format!("*{}", "~".repeat(widest.saturating_sub(start_col)))),
    )?;
    for line in lo_line..=hi_line {
        write_gutter(dest, gutter_style, width, Some(line))?;
        writeln!(dest, " {}", src.line(line))?;
    }
    write_gutter(dest, gutter_style, width, None)?;
    writeln!(
        dest,
        "{}",
        indicator_style.paint(format!("{}*", "~".repeat(src.col_of(hi_line, hi) + 1))),
    )?;

    Ok(())
}

#[derive(Clone, Copy, Debug)]
pub struct Report<'a> {
    pub path: Option<&'a Path>,
    pub span: Option<(usize, usize)>,
    pub title: &'a str,
    pub message: Option<&'a str>,
}

const TITLE_LEADING_DASHES: usize = 10;
const TITLE_TOTAL_COLS: usize = 60;
const MESSAGE_WIDTH: usize = 60;

fn write_message(dest: &mut impl io::Write, message: &str) -> io::Result<()> {
    for line in message.lines() {
        let indentation = line.len() - line.trim_start_matches(' ').len();
        let (indent, body) = line.split_at(indentation);

        let options = Options::new(MESSAGE_WIDTH)
            .word_splitter(WordSplitter::NoHyphenation)
            .initial_indent(indent)
            .subsequent_indent(indent);
        let wrapped = textwrap::wrap(body, options);

        if wrapped.is_empty() {
            writeln!(dest)?;
        }
        for wrapped_line in wrapped {
            writeln!(dest, "{}", wrapped_line)?;
        }
    }
    Ok(())
}

pub fn report_error(
    dest: &mut impl io::Write,
    files: &FileCache,
    report: Report,
) -> io::Result<()> {
    let title_style = Color::Blue.bold();
    let path_style = Color::Yellow.normal();

    writeln!(
        dest,
        "\n{}",
        title_style.paint(format!(
            "{leading} {title} {trailing}",
            leading = "-".repeat(TITLE_LEADING_DASHES),
            title = report.title,
            trailing = "-".repeat(
                TITLE_TOTAL_COLS.saturating_sub(2 + report.title.len() + TITLE_LEADING_DASHES)
            ),
        ))
    )?;

    match (report.path, report.span) {
        (Some(path), Some((lo, hi))) => match files.read_cached(path) {
            Ok(content) => {
                let src = SourceLines::new(content);
                let (start, _) = src.clamp(lo, hi);
                let line = src.line_of(start);
                writeln!(
                    dest,
                    "{}",
                    path_style.paint(format!(
                        "{}:{}:{}",
                        path.display(),
                        line + 1,
                        src.col_of(line, start) + 1
                    ))
                )?;
                writeln!(dest)?;
                format_snippet(dest, &src, lo, hi)?;
            }
            // The source text is optional for AST inputs; fall back to the raw byte range.
            Err(_) => {
                writeln!(
                    dest,
                    "{}",
                    path_style.paint(format!("{} (bytes {}..{})", path.display(), lo, hi))
                )?;
            }
        },

        (Some(path), None) => {
            writeln!(dest, "{}", path_style.paint(path.display().to_string()))?;
        }

        (None, Some((lo, hi))) => {
            writeln!(dest, "{}", path_style.paint(format!("bytes {}..{}", lo, hi)))?;
        }

        (None, None) => {}
    }

    if let Some(message) = report.message {
        writeln!(dest)?;
        write_message(dest, message)?;
    }

    writeln!(dest)?;

    Ok(())
}

/// An error payload together with where it happened, filled in as it propagates outwards.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Locate<E> {
    pub path: Option<PathBuf>,
    pub span: Option<(usize, usize)>,
    pub error: E,
}

impl<E> From<E> for Locate<E> {
    fn from(error: E) -> Self {
        Locate {
            path: None,
            span: None,
            error,
        }
    }
}

// These functions are curried for convenient usage with 'map_err'.  A location that is already
// present is never overwritten, so the innermost one wins.

pub fn locate_path<'a, E>(
    path: &'a (impl AsRef<Path> + ?Sized),
) -> impl FnOnce(Locate<E>) -> Locate<E> + 'a {
    move |err| Locate {
        path: Some(err.path.unwrap_or_else(|| path.as_ref().to_owned())),
        ..err
    }
}

pub fn locate_span<E>(lo: usize, hi: usize) -> impl FnOnce(Locate<E>) -> Locate<E> {
    move |err| Locate {
        span: Some(err.span.unwrap_or((lo, hi))),
        ..err
    }
}

impl<E> Locate<E> {
    pub fn map<F>(self, f: impl FnOnce(E) -> F) -> Locate<F> {
        Locate {
            path: self.path,
            span: self.span,
            error: f(self.error),
        }
    }

    pub fn report_with<Title, Msg>(
        &self,
        dest: &mut impl io::Write,
        files: &FileCache,
        reporter: impl FnOnce(&E) -> (Title, Msg),
    ) -> io::Result<()>
    where
        Title: AsRef<str>,
        Msg: AsRef<str>,
    {
        let (title, message) = reporter(&self.error);

        report_error(
            dest,
            files,
            Report {
                path: self.path.as_deref(),
                span: self.span,
                title: title.as_ref(),
                message: Some(message.as_ref()),
            },
        )
    }
}

pub trait Reportable {
    fn report(&self, dest: &mut impl io::Write, files: &FileCache) -> io::Result<()>;

    fn exit_status(&self) -> i32;
}
