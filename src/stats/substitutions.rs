const BASES: [u8; 4] = [b'A', b'C', b'G', b'T'];

fn base_index(base: u8) -> Option<usize> {
    BASES.iter().position(|&b| b == base)
}

/// Counts of the 12 ordered substitutions between known bases.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubstitutionTable {
    counts: [u64; 12],
}

impl SubstitutionTable {
    fn slot(reference: u8, read: u8) -> Option<usize> {
        let (from, to) = (base_index(reference)?, base_index(read)?);
        if from == to {
            return None;
        }
        // Three targets per source base, skipping the source itself.
        let offset = if to > from { to - 1 } else { to };
        Some(from * 3 + offset)
    }

    /// Records one substitution. Pairs involving an unknown base, and pairs of equal bases,
    /// are not substitutions and are ignored.
    pub fn record(&mut self, reference: u8, read: u8) -> bool {
        match Self::slot(reference, read) {
            Some(slot) => {
                self.counts[slot] += 1;
                true
            }
            None => false,
        }
    }

    pub fn get(&self, reference: u8, read: u8) -> u64 {
        Self::slot(reference, read).map_or(0, |slot| self.counts[slot])
    }

    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    /// All 12 substitutions as `(reference, read, count)`, ordered A→C, A→G, ..., T→G.
    pub fn iter(&self) -> impl Iterator<Item = (u8, u8, u64)> + '_ {
        BASES.iter().flat_map(move |&reference| {
            BASES
                .iter()
                .filter(move |&&read| read != reference)
                .map(move |&read| (reference, read, self.get(reference, read)))
        })
    }

    /// Sum of two tables, used for reporting both mates together.
    pub fn merged(&self, other: &SubstitutionTable) -> SubstitutionTable {
        let mut counts = self.counts;
        for (count, extra) in counts.iter_mut().zip(other.counts.iter()) {
            *count += extra;
        }
        SubstitutionTable { counts }
    }
}

/// Per-base counts of inserted or deleted bases. `N` and other unknown bases share one slot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BaseCounts {
    known: [u64; 4],
    unknown: u64,
}

impl BaseCounts {
    /// Returns whether the base was a known one.
    pub fn record(&mut self, base: u8) -> bool {
        match base_index(base) {
            Some(index) => {
                self.known[index] += 1;
                true
            }
            None => {
                self.unknown += 1;
                false
            }
        }
    }

    pub fn get(&self, base: u8) -> u64 {
        base_index(base).map_or(self.unknown, |index| self.known[index])
    }

    pub fn known_total(&self) -> u64 {
        self.known.iter().sum()
    }

    pub fn unknown(&self) -> u64 {
        self.unknown
    }

    pub fn iter(&self) -> impl Iterator<Item = (u8, u64)> + '_ {
        BASES
            .iter()
            .map(move |&base| (base, self.get(base)))
            .chain(std::iter::once((b'N', self.unknown)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn substitution_slots_are_distinct() {
        let mut table = SubstitutionTable::default();
        for (reference, read, _) in SubstitutionTable::default().iter() {
            assert!(table.record(reference, read));
        }
        assert_eq!(table.total(), 12);
        assert!(table.iter().all(|(_, _, count)| count == 1));
    }

    #[test]
    fn substitution_order() {
        let pairs: Vec<(char, char)> = SubstitutionTable::default()
            .iter()
            .map(|(r, a, _)| (r as char, a as char))
            .collect();
        assert_eq!(pairs[0], ('A', 'C'));
        assert_eq!(pairs[2], ('A', 'T'));
        assert_eq!(pairs[3], ('C', 'A'));
        assert_eq!(pairs[11], ('T', 'G'));
    }

    #[test]
    fn non_substitutions_are_ignored() {
        let mut table = SubstitutionTable::default();
        assert!(!table.record(b'A', b'A'));
        assert!(!table.record(b'N', b'A'));
        assert!(!table.record(b'A', b'R'));
        assert_eq!(table.total(), 0);
    }

    #[test]
    fn merged_tables() {
        let mut first = SubstitutionTable::default();
        let mut second = SubstitutionTable::default();
        first.record(b'G', b'T');
        second.record(b'G', b'T');
        second.record(b'T', b'C');
        let merged = first.merged(&second);
        assert_eq!(merged.get(b'G', b'T'), 2);
        assert_eq!(merged.get(b'T', b'C'), 1);
        assert_eq!(merged.total(), 3);
    }

    #[test]
    fn base_counts() {
        let mut counts = BaseCounts::default();
        assert!(counts.record(b'G'));
        assert!(counts.record(b'G'));
        assert!(!counts.record(b'N'));
        assert!(!counts.record(b'Y'));
        assert_eq!(counts.get(b'G'), 2);
        assert_eq!(counts.known_total(), 2);
        assert_eq!(counts.unknown(), 2);
        assert_eq!(counts.get(b'N'), 2);
    }
}
