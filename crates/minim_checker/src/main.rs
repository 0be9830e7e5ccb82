use minim_checker::cli::Config;
use minim_checker::handle_config;
use minim_common::file_cache::FileCache;
use minim_common::report_error::Reportable;

use std::io;

fn main() {
    better_panic::install();

    let config = Config::from_args();
    let mut files = FileCache::new();
    let result = handle_config(config, &mut files);
    if let Err(err) = result {
        let _ = err.report(&mut io::stderr().lock(), &files);
        std::process::exit(err.exit_status());
    }
}
