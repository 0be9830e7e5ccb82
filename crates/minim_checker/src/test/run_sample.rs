use crate::cli::CheckConfig;
use minim_common::file_cache::FileCache;
use minim_common::progress_ui::ProgressMode;
use minim_common::report_error::Reportable;
use std::path::Path;

fn check_sample(path: &Path) -> (Result<String, crate::Error>, FileCache) {
    let config = CheckConfig {
        src_path: path.to_owned(),
        progress: ProgressMode::Hidden,
        quiet: false,
    };

    let mut files = FileCache::new();
    let mut out = Vec::new();
    let result = crate::check(config, &mut files, &mut out).map(|()| {
        String::from_utf8(out).expect("Checker output should be UTF-8")
    });
    (result, files)
}

fn render_report(err: &crate::Error, files: &FileCache) -> String {
    let mut report = Vec::new();
    err.report(&mut report, files)
        .expect("Writing a report to memory failed");
    String::from_utf8(report).expect("Error report should be UTF-8")
}

pub fn run_sample<SrcPath: AsRef<Path>, Out: AsRef<str>>(path: SrcPath, expected_out: Out) {
    let (result, files) = check_sample(path.as_ref());

    let output = match result {
        Ok(output) => output,
        Err(err) => panic!(
            "Type checking {} failed:\n{}",
            path.as_ref().display(),
            render_report(&err, &files)
        ),
    };

    assert!(
        output == expected_out.as_ref(),
        r#"Checker output did not match expectations:
            output:
{actual_out}
            expected output:
{expected_out}"#,
        actual_out = output,
        expected_out = expected_out.as_ref(),
    );
}

/// Checks a sample that is expected to be rejected, returning the error and its rendered report.
pub fn run_failing_sample<SrcPath: AsRef<Path>>(path: SrcPath) -> (crate::Error, String) {
    let (result, files) = check_sample(path.as_ref());

    match result {
        Ok(output) => panic!(
            "Type checking {} should have failed, but produced:\n{}",
            path.as_ref().display(),
            output
        ),
        Err(err) => {
            let report = render_report(&err, &files);
            (err, report)
        }
    }
}

macro_rules! sample {
    (
        $name:ident $path:expr ;
        stdout = $stdout:expr ;
    ) => {
        #[test]
        fn $name() {
            crate::test::run_sample::run_sample($path, $stdout);
        }
    };

    (
        $name:ident $path:expr ;
        type_error = { $kind:pat } ;
        $( report = $report:expr ; )*
    ) => {
        #[test]
        fn $name() {
            let (err, _report) = crate::test::run_sample::run_failing_sample($path);
            match err.type_error().map(|err| err.kind()) {
                Some($kind) => {}
                other => panic!("Unexpected error kind: {:?}\n{}", other, _report),
            }
            $(
                assert!(
                    _report.contains($report),
                    "Error report does not mention {:?}:\n{}",
                    $report,
                    _report
                );
            )*
        }
    };

    (
        $name:ident $path:expr ;
        load_error = { $kind:pat } ;
        $( report = $report:expr ; )*
    ) => {
        #[test]
        fn $name() {
            let (err, _report) = crate::test::run_sample::run_failing_sample($path);
            match err.load_error().map(|err| err.kind()) {
                Some($kind) => {}
                other => panic!("Unexpected error kind: {:?}\n{}", other, _report),
            }
            $(
                assert!(
                    _report.contains($report),
                    "Error report does not mention {:?}:\n{}",
                    $report,
                    _report
                );
            )*
        }
    };
}
