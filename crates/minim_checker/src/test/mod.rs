#[macro_use]
mod run_sample;


use crate::cli::CheckConfig;
use minim_common::file_cache::FileCache;
use minim_common::progress_ui::ProgressMode;

#[test]
fn test_quiet_prints_nothing() {
    let config = CheckConfig {
        src_path: "samples/arith.json".into(),
        progress: ProgressMode::Hidden,
        quiet: true,
    };
    let mut out = Vec::new();
    assert!(crate::check(config, &mut FileCache::new(), &mut out).is_ok());
    assert!(out.is_empty());
}
