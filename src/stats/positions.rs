/// Counts indexed by 0-based position along the strand-corrected read.
///
/// The array grows on demand and never shrinks. When a write lands beyond the current length
/// it grows to twice its length, or to the required length if that is larger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionCounts(Vec<u64>);

impl PositionCounts {
    pub fn with_len(len: usize) -> PositionCounts {
        PositionCounts(vec![0; len])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Makes positions `0..required` addressable.
    pub fn ensure_len(&mut self, required: usize) {
        if required > self.0.len() {
            let new_len = required.max(2 * self.0.len());
            self.0.resize(new_len, 0);
        }
    }

    pub fn increment(&mut self, pos: usize) {
        self.add(pos, 1);
    }

    pub fn add(&mut self, pos: usize, count: u64) {
        self.ensure_len(pos + 1);
        self.0[pos] += count;
    }

    /// Count at `pos`; positions never written are 0.
    pub fn get(&self, pos: usize) -> u64 {
        self.0.get(pos).copied().unwrap_or(0)
    }

    pub fn as_slice(&self) -> &[u64] {
        &self.0
    }

    pub fn sum(&self) -> u64 {
        self.0.iter().sum()
    }

    pub fn any_nonzero(&self) -> bool {
        self.0.iter().any(|&count| count != 0)
    }

    pub fn clear(&mut self, len: usize) {
        self.0.clear();
        self.0.resize(len, 0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grows_to_double_length() {
        let mut counts = PositionCounts::with_len(10);
        counts.increment(10);
        assert_eq!(counts.len(), 20);
        assert_eq!(counts.get(10), 1);
    }

    #[test]
    fn grows_to_required_length_when_larger() {
        let mut counts = PositionCounts::with_len(10);
        counts.increment(99);
        assert_eq!(counts.len(), 100);
        let mut empty = PositionCounts::default();
        empty.increment(0);
        assert_eq!(empty.len(), 1);
    }

    #[test]
    fn growth_keeps_values() {
        let mut counts = PositionCounts::with_len(2);
        counts.increment(0);
        counts.add(1, 4);
        counts.increment(7);
        assert_eq!(counts.as_slice(), &[1, 4, 0, 0, 0, 0, 0, 1]);
        assert_eq!(counts.sum(), 6);
    }

    #[test]
    fn never_shrinks() {
        let mut counts = PositionCounts::with_len(50);
        counts.ensure_len(5);
        assert_eq!(counts.len(), 50);
        assert_eq!(counts.get(500), 0);
        assert!(!counts.any_nonzero());
    }
}
