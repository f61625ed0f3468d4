/// Complements a nucleotide; anything other than A, C, G and T passes through unchanged.
#[inline]
pub fn complement(base: u8) -> u8 {
    match base {
        b'A' => b'T',
        b'C' => b'G',
        b'G' => b'C',
        b'T' => b'A',
        other => other,
    }
}

pub fn reverse_complement(bases: &[u8]) -> Vec<u8> {
    bases.iter().rev().map(|&b| complement(b)).collect()
}

/// Any base outside ACGT (N and IUPAC ambiguity codes) is unknown.
#[inline]
pub fn is_unknown_base(base: u8) -> bool {
    !matches!(base, b'A' | b'C' | b'G' | b'T')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complement_swaps_pairs() {
        assert_eq!(complement(b'A'), b'T');
        assert_eq!(complement(b'T'), b'A');
        assert_eq!(complement(b'C'), b'G');
        assert_eq!(complement(b'G'), b'C');
    }

    #[test]
    fn complement_keeps_unknown_bases() {
        assert_eq!(complement(b'N'), b'N');
        assert_eq!(complement(b'R'), b'R');
    }

    #[test]
    fn reverse_complement_of_sequence() {
        assert_eq!(reverse_complement(b"AACGN"), b"NCGTT".to_vec());
        assert_eq!(reverse_complement(b""), Vec::<u8>::new());
    }

    #[test]
    fn unknown_bases() {
        assert!(is_unknown_base(b'N'));
        assert!(is_unknown_base(b'Y'));
        assert!(!is_unknown_base(b'G'));
    }
}
