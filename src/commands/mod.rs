pub mod cigarmd;
pub mod snps;
pub mod variants;

use crate::stats::{process_read, ReadStatistics};
use crate::utils::{stream_reads, Result};
use rust_htslib::bam;

/// Feeds every read of `reader` into `stats` and finalizes the totals.
fn accumulate<S: ReadStatistics>(
    stats: &mut S,
    reader: &mut bam::Reader,
    primary_only: bool,
    max_reads: Option<usize>,
) -> Result<usize> {
    let n_reads = stream_reads(reader, primary_only, max_reads, |read| {
        process_read(stats, &read);
        Ok(())
    })?;
    stats.finalize_totals();
    Ok(n_reads)
}
