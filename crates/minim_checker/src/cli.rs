use clap::builder::styling;
use clap::{value_parser, Arg, ArgAction, Command};
use std::path::PathBuf;

use minim_common::progress_ui::ProgressMode;

#[derive(Clone, Debug)]
pub struct CheckConfig {
    pub src_path: PathBuf,
    pub progress: ProgressMode,

    // Only the exit status is produced when this is set.  Errors are still reported.
    pub quiet: bool,
}

#[derive(Clone, Debug)]
pub enum Config {
    CheckConfig(CheckConfig),
}

impl Config {
    pub fn from_args() -> Self {
        let styles = styling::Styles::styled()
            .header(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
            .usage(styling::AnsiColor::Green.on_default() | styling::Effects::BOLD)
            .literal(styling::AnsiColor::Cyan.on_default() | styling::Effects::BOLD)
            .placeholder(styling::AnsiColor::Cyan.on_default());

        let matches = Command::new("minim")
            .version(std::env!("CARGO_PKG_VERSION"))
            .about(std::env!("CARGO_PKG_DESCRIPTION"))
            .styles(styles)
            .next_line_help(true)
            .subcommand_required(true)
            .arg_required_else_help(true)
            .subcommand(
                Command::new("check")
                    .about("Infers and prints the type of every definition in a program")
                    .arg(
                        Arg::new("src-path")
                            .help(
                                "Specify the program to check, as a JSON-encoded syntax tree. \
                                 If the program names a 'source' file, diagnostics quote it.",
                            )
                            .value_parser(value_parser!(PathBuf))
                            .required(true)
                            .index(1),
                    )
                    .arg(
                        Arg::new("progress")
                            .long("progress")
                            .action(ArgAction::SetTrue)
                            .help("Set whether or not to show progress"),
                    )
                    .arg(
                        Arg::new("quiet")
                            .long("quiet")
                            .short('q')
                            .action(ArgAction::SetTrue)
                            .help("Do not print inferred types; only report errors."),
                    ),
            )
            .get_matches();

        match matches.subcommand() {
            Some(("check", matches)) => {
                let src_path = match matches.get_one::<PathBuf>("src-path") {
                    Some(path) => path.clone(),
                    None => unreachable!("'src-path' is a required argument"),
                };

                let progress = if matches.get_flag("progress") {
                    ProgressMode::Visible
                } else {
                    ProgressMode::Hidden
                };

                Config::CheckConfig(CheckConfig {
                    src_path,
                    progress,
                    quiet: matches.get_flag("quiet"),
                })
            }

            _ => unreachable!("a subcommand is required"),
        }
    }
}
