//! Substitution, insertion and deletion statistics split by mate and by read position.
//!
//! Positions are 0-based along the read in sequencing direction. Deletions advance the
//! position by their length, so a read with deletions can reach positions beyond its length.
//! Clipped bases do not advance the position.

use super::{BaseCounts, PositionCounts, ReadCounts, ReadStatistics, SubstitutionTable};
use crate::cigarmd::{BuildError, EditElement, EditOperator, EditScript, MateSegment};
use crate::utils::is_unknown_base;
use std::collections::BTreeMap;

/// Counts kept separately for first and second mates.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MateCounts {
    pub substitutions: SubstitutionTable,
    pub snp_pos: PositionCounts,
    pub insertion_pos: PositionCounts,
    pub deletion_pos: PositionCounts,
}

impl MateCounts {
    fn with_len(len: usize) -> MateCounts {
        MateCounts {
            substitutions: SubstitutionTable::default(),
            snp_pos: PositionCounts::with_len(len),
            insertion_pos: PositionCounts::with_len(len),
            deletion_pos: PositionCounts::with_len(len),
        }
    }

    fn any_nonzero(&self) -> bool {
        self.snp_pos.any_nonzero()
            || self.insertion_pos.any_nonzero()
            || self.deletion_pos.any_nonzero()
    }

    fn position_arrays_mut(&mut self) -> [&mut PositionCounts; 3] {
        [
            &mut self.snp_pos,
            &mut self.insertion_pos,
            &mut self.deletion_pos,
        ]
    }
}

#[derive(Debug, Clone)]
pub struct VariantCallDetection {
    initial_positions: usize,
    mates: [MateCounts; 2],
    match_pos: PositionCounts,
    total_pos: PositionCounts,
    /// Observed read length to number of reads of that length.
    contributing_reads_per_pos: BTreeMap<usize, u64>,
    inserted_bases: BaseCounts,
    deleted_bases: BaseCounts,
    total_matches: u64,
    total_mutations: u64,
    total_insertions: u64,
    total_deletions: u64,
    total: u64,
    soft_clipped: u64,
    hard_clipped: u64,
    padding: u64,
    skipped_region: u64,
    unknown_reference_bases: u64,
    unknown_read_bases: u64,
    reads: ReadCounts,
    exist_paired_reads: bool,
    max_read_len: usize,
    finalized: bool,
}

impl VariantCallDetection {
    /// Creates an accumulator whose positional arrays start with `initial_positions` slots.
    pub fn new(initial_positions: usize) -> VariantCallDetection {
        VariantCallDetection {
            initial_positions,
            mates: [
                MateCounts::with_len(initial_positions),
                MateCounts::with_len(initial_positions),
            ],
            match_pos: PositionCounts::with_len(initial_positions),
            total_pos: PositionCounts::with_len(initial_positions),
            contributing_reads_per_pos: BTreeMap::new(),
            inserted_bases: BaseCounts::default(),
            deleted_bases: BaseCounts::default(),
            total_matches: 0,
            total_mutations: 0,
            total_insertions: 0,
            total_deletions: 0,
            total: 0,
            soft_clipped: 0,
            hard_clipped: 0,
            padding: 0,
            skipped_region: 0,
            unknown_reference_bases: 0,
            unknown_read_bases: 0,
            reads: ReadCounts::default(),
            exist_paired_reads: false,
            max_read_len: 0,
            finalized: false,
        }
    }

    /// Returns the accumulator to the state it was created in.
    pub fn reset(&mut self) {
        *self = VariantCallDetection::new(self.initial_positions);
    }

    /// True until a read has contributed to the statistics.
    pub fn is_empty(&self) -> bool {
        self.contributing_reads_per_pos.is_empty()
    }

    fn observe_element(&mut self, element: &EditElement, mate: usize, cursor: &mut usize) {
        match element.operator() {
            EditOperator::Match => {
                self.total_matches += element.len() as u64;
                self.match_pos.ensure_len(*cursor + element.len());
                for pos in *cursor..*cursor + element.len() {
                    self.match_pos.increment(pos);
                }
                *cursor += element.len();
            }
            EditOperator::Mismatch => {
                for (reference, read) in element.base_pairs() {
                    if is_unknown_base(reference) {
                        self.unknown_reference_bases += 1;
                    } else if is_unknown_base(read) {
                        self.unknown_read_bases += 1;
                    } else if self.mates[mate].substitutions.record(reference, read) {
                        self.mates[mate].snp_pos.increment(*cursor);
                    }
                    *cursor += 1;
                }
            }
            EditOperator::Insertion => {
                for &base in element.bases() {
                    if self.inserted_bases.record(base) {
                        self.mates[mate].insertion_pos.increment(*cursor);
                    }
                    *cursor += 1;
                }
            }
            EditOperator::Deletion => {
                if element.bases().is_empty() {
                    // Deleted bases unknown, every position counts.
                    for pos in *cursor..*cursor + element.len() {
                        self.mates[mate].deletion_pos.increment(pos);
                    }
                } else {
                    for (offset, &base) in element.bases().iter().enumerate() {
                        if self.deleted_bases.record(base) {
                            self.mates[mate].deletion_pos.increment(*cursor + offset);
                        }
                    }
                }
                *cursor += element.len();
            }
            EditOperator::SkippedRegion => self.skipped_region += element.len() as u64,
            EditOperator::SoftClip => self.soft_clipped += element.len() as u64,
            EditOperator::HardClip => self.hard_clipped += element.len() as u64,
            EditOperator::Padding => self.padding += element.len() as u64,
            EditOperator::Unsupported => {}
        }
    }

    fn all_position_arrays_mut(&mut self) -> Vec<&mut PositionCounts> {
        let [first, second] = &mut self.mates;
        let mut arrays = vec![&mut self.match_pos, &mut self.total_pos];
        arrays.extend(first.position_arrays_mut());
        arrays.extend(second.position_arrays_mut());
        arrays
    }

    pub fn mate(&self, segment: MateSegment) -> &MateCounts {
        &self.mates[segment.index()]
    }

    pub fn substitutions(&self, segment: MateSegment) -> &SubstitutionTable {
        &self.mate(segment).substitutions
    }

    pub fn match_positions(&self) -> &PositionCounts {
        &self.match_pos
    }

    pub fn total_positions(&self) -> &PositionCounts {
        &self.total_pos
    }

    pub fn contributing_reads_per_pos(&self) -> &BTreeMap<usize, u64> {
        &self.contributing_reads_per_pos
    }

    /// Number of observed reads long enough to cover `pos`.
    pub fn reads_covering_position(&self, pos: usize) -> u64 {
        self.contributing_reads_per_pos
            .range(pos + 1..)
            .map(|(_, count)| count)
            .sum()
    }

    /// Number of positions worth reporting: the longest read, or further if deletions
    /// pushed data beyond it.
    pub fn reported_len(&self) -> usize {
        let last_with_data = self
            .total_pos
            .as_slice()
            .iter()
            .rposition(|&count| count != 0)
            .map_or(0, |pos| pos + 1);
        self.max_read_len.max(last_with_data)
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

    /// Matches, substitutions, insertions, deletions and soft clipped bases.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn soft_clipped(&self) -> u64 {
        self.soft_clipped
    }

    pub fn hard_clipped(&self) -> u64 {
        self.hard_clipped
    }

    pub fn padding(&self) -> u64 {
        self.padding
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

    pub fn exist_paired_reads(&self) -> bool {
        self.exist_paired_reads
    }

    pub fn max_read_len(&self) -> usize {
        self.max_read_len
    }
}

impl Default for VariantCallDetection {
    fn default() -> Self {
        VariantCallDetection::new(0)
    }
}

impl ReadStatistics for VariantCallDetection {
    fn observe(&mut self, script: &EditScript, segment: MateSegment, read_len: usize) {
        let mate = segment.index();
        let mut cursor = 0;
        for element in script {
            self.observe_element(element, mate, &mut cursor);
        }
        *self.contributing_reads_per_pos.entry(read_len).or_insert(0) += 1;
        self.max_read_len = self.max_read_len.max(read_len);
        self.reads.record_success();
        self.finalized = false;
    }

    fn record_failure(&mut self, error: &BuildError) {
        self.reads.record_failure(error);
    }

    fn finalize_totals(&mut self) {
        if self.finalized {
            return;
        }
        let max_read_len = self.max_read_len;
        let mut arrays = self.all_position_arrays_mut();
        let longest = arrays.iter().map(|array| array.len()).max().unwrap_or(0);
        let required = longest.max(max_read_len);
        for array in arrays.iter_mut() {
            array.ensure_len(required);
        }

        let [first, second] = &self.mates;
        let (mut mutations, mut insertions, mut deletions) = (0, 0, 0);
        let mut total_pos = PositionCounts::with_len(self.total_pos.len());
        for pos in 0..total_pos.len() {
            let snps = first.snp_pos.get(pos) + second.snp_pos.get(pos);
            let inserted = first.insertion_pos.get(pos) + second.insertion_pos.get(pos);
            let deleted = first.deletion_pos.get(pos) + second.deletion_pos.get(pos);
            mutations += snps;
            insertions += inserted;
            deletions += deleted;
            total_pos.add(pos, snps + inserted + deleted + self.match_pos.get(pos));
        }
        self.total_pos = total_pos;
        self.total_mutations = mutations;
        self.total_insertions = insertions;
        self.total_deletions = deletions;
        self.total =
            self.total_matches + mutations + insertions + deletions + self.soft_clipped;
        self.exist_paired_reads = second.any_nonzero();
        self.finalized = true;

        log::debug!(
            "Finalized statistics of {} reads over {} positions",
            self.reads.processed(),
            self.total_pos.len()
        );
    }
}
