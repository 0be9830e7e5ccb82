#[macro_use]
pub mod util;

pub mod file_cache;
pub mod progress_ui;
pub mod report_error;
