pub mod data;
pub mod env;
pub mod report_type;
pub mod subst;
pub mod type_infer;
pub mod types;

pub use type_infer::{check_program, infer, infer_pattern, Error, ErrorKind};
