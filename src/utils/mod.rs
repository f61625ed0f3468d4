mod bam_utils;
mod dna;
mod io_utils;
mod util;

pub use bam_utils::{get_sample_name, open_bam_reader, stream_reads};
pub use dna::{complement, is_unknown_base, reverse_complement};
pub use io_utils::create_writer;
pub use util::{handle_error_and_exit, percentage, Result};
