//! Overall substitution and indel frequencies, without mate or position breakdown.

use super::{BaseCounts, ReadCounts, ReadStatistics, SubstitutionTable};
use crate::cigarmd::{BuildError, EditOperator, EditScript, MateSegment};
use crate::utils::is_unknown_base;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SnpFrequencies {
    substitutions: SubstitutionTable,
    inserted_bases: BaseCounts,
    deleted_bases: BaseCounts,
    total_matches: u64,
    total_mutations: u64,
    total_insertions: u64,
    total_deletions: u64,
    total: u64,
    skipped_region: u64,
    unknown_reference_bases: u64,
    unknown_read_bases: u64,
    reads: ReadCounts,
}

impl SnpFrequencies {
    pub fn new() -> SnpFrequencies {
        SnpFrequencies::default()
    }

    pub fn reset(&mut self) {
        *self = SnpFrequencies::default();
    }

    /// Nothing worth reporting was seen.
    pub fn is_empty(&self) -> bool {
        self.total == 0
    }

    fn compute_totals(&mut self) {
        self.total_mutations = self.substitutions.total();
        self.total_insertions = self.inserted_bases.known_total();
        self.total_deletions = self.deleted_bases.known_total();
        self.total = self.total_mutations + self.total_insertions + self.total_deletions;
    }

    pub fn substitutions(&self) -> &SubstitutionTable {
        &self.substitutions
    }

    pub fn inserted_bases(&self) -> &BaseCounts {
        &self.inserted_bases
    }

    pub fn deleted_bases(&self) -> &BaseCounts {
        &self.deleted_bases
    }

    pub fn total_matches(&self) -> u64 {
        self.total_matches
    }

    pub fn total_mutations(&self) -> u64 {
        self.total_mutations
    }

    pub fn total_insertions(&self) -> u64 {
        self.total_insertions
    }

    pub fn total_deletions(&self) -> u64 {
        self.total_deletions
    }

    /// Substitutions, insertions and deletions. Matches are not included.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn skipped_region(&self) -> u64 {
        self.skipped_region
    }

    pub fn unknown_reference_bases(&self) -> u64 {
        self.unknown_reference_bases
    }

    pub fn unknown_read_bases(&self) -> u64 {
        self.unknown_read_bases
    }

    pub fn read_counts(&self) -> &ReadCounts {
        &self.reads
    }
}

impl ReadStatistics for SnpFrequencies {
    fn observe(&mut self, script: &EditScript, _segment: MateSegment, _read_len: usize) {
        for element in script {
            match element.operator() {
                EditOperator::Match => self.total_matches += element.len() as u64,
                EditOperator::Mismatch => {
                    for (reference, read) in element.base_pairs() {
                        if is_unknown_base(reference) {
                            self.unknown_reference_bases += 1;
                        } else if is_unknown_base(read) {
                            self.unknown_read_bases += 1;
                        } else {
                            self.substitutions.record(reference, read);
                        }
                    }
                }
                EditOperator::Insertion => {
                    for &base in element.bases() {
                        self.inserted_bases.record(base);
                    }
                }
                EditOperator::Deletion => {
                    for &base in element.bases() {
                        self.deleted_bases.record(base);
                    }
                }
                EditOperator::SkippedRegion => self.skipped_region += element.len() as u64,
                _ => {}
            }
        }
        self.reads.record_success();
        self.compute_totals();
    }

    fn record_failure(&mut self, error: &BuildError) {
        self.reads.record_failure(error);
    }

    fn finalize_totals(&mut self) {
        self.compute_totals();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn observe(stats: &mut SnpFrequencies, text: &str) {
        let script: EditScript = text.parse().unwrap();
        stats.observe(&script, MateSegment::First, script.read_len());
    }

    #[test]
    fn totals_are_kept_current() {
        let mut stats = SnpFrequencies::new();
        observe(&mut stats, "2m1uAC3m1iG2dTA4m");
        assert_eq!(stats.total_mutations(), 1);
        assert_eq!(stats.total(), 4);
        observe(&mut stats, "1uGT1iN1m");
        assert_eq!(stats.substitutions().get(b'A', b'C'), 1);
        assert_eq!(stats.substitutions().get(b'G', b'T'), 1);
        assert_eq!(stats.inserted_bases().unknown(), 1);
        assert_eq!(stats.total_insertions(), 1);
        assert_eq!(stats.total_matches(), 10);
        assert_eq!(stats.total(), 5);
    }

    #[test]
    fn mates_share_one_table() {
        let mut stats = SnpFrequencies::new();
        let script: EditScript = "1uCT".parse().unwrap();
        stats.observe(&script, MateSegment::First, 1);
        stats.observe(&script, MateSegment::Second, 1);
        assert_eq!(stats.substitutions().get(b'C', b'T'), 2);
    }

    #[test]
    fn unknown_bases_are_not_substitutions() {
        let mut stats = SnpFrequencies::new();
        observe(&mut stats, "2uNAAN");
        assert_eq!(stats.unknown_reference_bases(), 1);
        assert_eq!(stats.unknown_read_bases(), 1);
        assert!(stats.is_empty());
    }

    #[test]
    fn skipped_reads() {
        let mut stats = SnpFrequencies::new();
        stats.record_failure(&BuildError::MissingAnnotation);
        observe(&mut stats, "4m");
        stats.finalize_totals();
        assert_eq!(stats.read_counts().missing_annotation, 1);
        assert_eq!(stats.read_counts().total, 2);
        assert!(stats.is_empty());
        stats.reset();
        assert_eq!(stats.read_counts().total, 0);
    }
}
