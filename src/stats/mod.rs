//! Statistics accumulated over the edit scripts of a stream of reads.

mod positions;
mod snp_frequencies;
mod substitutions;
mod variant_calls;

pub use positions::PositionCounts;
pub use snp_frequencies::SnpFrequencies;
pub use substitutions::{BaseCounts, SubstitutionTable};
pub use variant_calls::{MateCounts, VariantCallDetection};

use crate::cigarmd::{build_edit_script, AlignedRead, BuildError, EditScript, MateSegment};

/// Read-level bookkeeping shared by all accumulators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReadCounts {
    pub total: u64,
    pub skipped: u64,
    pub unmapped: u64,
    pub missing_annotation: u64,
    pub missing_operator_string: u64,
    pub inconsistent: u64,
    pub unsupported: u64,
}

impl ReadCounts {
    pub fn record_success(&mut self) {
        self.total += 1;
    }

    pub fn record_failure(&mut self, error: &BuildError) {
        self.total += 1;
        self.skipped += 1;
        let counter = match error {
            BuildError::Unmapped => &mut self.unmapped,
            BuildError::MissingAnnotation => &mut self.missing_annotation,
            BuildError::MissingOperatorString => &mut self.missing_operator_string,
            BuildError::InconsistentEncoding(_) => &mut self.inconsistent,
            BuildError::UnsupportedOperator(_) => &mut self.unsupported,
        };
        *counter += 1;
    }

    pub fn processed(&self) -> u64 {
        self.total - self.skipped
    }
}

/// A consumer of edit scripts.
pub trait ReadStatistics {
    /// Accumulates the script of one successfully processed read.
    fn observe(&mut self, script: &EditScript, segment: MateSegment, read_len: usize);

    /// Counts a read that was skipped because no script could be built for it.
    fn record_failure(&mut self, error: &BuildError);

    /// Derives the totals. Getters are only meaningful afterwards.
    fn finalize_totals(&mut self);
}

/// Builds the edit script of `read` and feeds the outcome to `stats`.
pub fn process_read<S: ReadStatistics>(stats: &mut S, read: &AlignedRead) {
    match build_edit_script(read) {
        Ok(script) => stats.observe(&script, read.segment(), read.len()),
        Err(err) => stats.record_failure(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failures_are_counted_per_kind() {
        let mut counts = ReadCounts::default();
        counts.record_success();
        counts.record_failure(&BuildError::Unmapped);
        counts.record_failure(&BuildError::UnsupportedOperator('X'));
        counts.record_failure(&BuildError::UnsupportedOperator('='));
        assert_eq!(counts.total, 4);
        assert_eq!(counts.skipped, 3);
        assert_eq!(counts.unmapped, 1);
        assert_eq!(counts.unsupported, 2);
        assert_eq!(counts.inconsistent, 0);
        assert_eq!(counts.processed(), 1);
    }
}
