mod bam_utils;
mod util;

pub use bam_utils::{probe_bam, resolve_sample_name};
pub use util::{handle_error_and_exit, Result};
