//! Typed representation of a merged CIGAR + MD alignment ("CigarMD").
//!
//! The text form concatenates `<length><operator><bases>` for each element, e.g.
//! `7m1uGT24m2dAA5m1iG2m1uCA49m` for CIGAR `32M2D5M1I52M` and MD `7G24^AA7C49`.

use super::cigar::CigarOp;
use crate::utils::{complement, reverse_complement};
use std::{fmt, str::FromStr};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditOperator {
    Match,
    Mismatch,
    Insertion,
    Deletion,
    SkippedRegion,
    SoftClip,
    HardClip,
    Padding,
    Unsupported,
}

impl EditOperator {
    /// Symbol used in the text form.
    pub fn symbol(self) -> char {
        match self {
            EditOperator::Match => 'm',
            EditOperator::Mismatch => 'u',
            EditOperator::Insertion => 'i',
            EditOperator::Deletion => 'd',
            EditOperator::SkippedRegion => 'n',
            EditOperator::SoftClip => 's',
            EditOperator::HardClip => 'h',
            EditOperator::Padding => 'p',
            EditOperator::Unsupported => '?',
        }
    }

    pub fn from_symbol(symbol: char) -> Option<EditOperator> {
        match symbol {
            'm' => Some(EditOperator::Match),
            'u' => Some(EditOperator::Mismatch),
            'i' => Some(EditOperator::Insertion),
            'd' => Some(EditOperator::Deletion),
            'n' => Some(EditOperator::SkippedRegion),
            's' => Some(EditOperator::SoftClip),
            'h' => Some(EditOperator::HardClip),
            'p' => Some(EditOperator::Padding),
            _ => None,
        }
    }

    /// Whether elements of this kind consume read bases.
    pub fn consumes_read(self) -> bool {
        matches!(
            self,
            EditOperator::Match
                | EditOperator::Mismatch
                | EditOperator::Insertion
                | EditOperator::SoftClip
        )
    }

    /// Number of base characters an element of this kind and length carries.
    fn bases_len(self, len: usize) -> usize {
        match self {
            EditOperator::Mismatch => 2 * len,
            EditOperator::Insertion | EditOperator::Deletion => len,
            _ => 0,
        }
    }
}

/// `M` cannot tell matches from mismatches on its own, it maps to `Match` and the MD tag
/// resolves it. The extended `=` and `X` operators are not handled.
impl From<&CigarOp> for EditOperator {
    fn from(op: &CigarOp) -> Self {
        match op {
            CigarOp::Match(_) => EditOperator::Match,
            CigarOp::Ins(_) => EditOperator::Insertion,
            CigarOp::Del(_) => EditOperator::Deletion,
            CigarOp::RefSkip(_) => EditOperator::SkippedRegion,
            CigarOp::SoftClip(_) => EditOperator::SoftClip,
            CigarOp::HardClip(_) => EditOperator::HardClip,
            CigarOp::Pad(_) => EditOperator::Padding,
            CigarOp::Equal(_) | CigarOp::Diff(_) => EditOperator::Unsupported,
        }
    }
}

/// One operation of an edit script.
///
/// `bases` holds the (reference, read) pairs of a mismatch, the inserted read bases of an
/// insertion and the deleted reference bases of a deletion. It is empty otherwise.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditElement {
    operator: EditOperator,
    len: usize,
    bases: Vec<u8>,
}

impl EditElement {
    pub fn matched(len: usize) -> EditElement {
        Self::without_bases(EditOperator::Match, len)
    }

    pub fn mismatch(reference: u8, read: u8) -> EditElement {
        EditElement {
            operator: EditOperator::Mismatch,
            len: 1,
            bases: vec![reference, read],
        }
    }

    pub fn insertion(bases: &[u8]) -> EditElement {
        EditElement {
            operator: EditOperator::Insertion,
            len: bases.len(),
            bases: bases.to_vec(),
        }
    }

    pub fn deletion(bases: &[u8]) -> EditElement {
        EditElement {
            operator: EditOperator::Deletion,
            len: bases.len(),
            bases: bases.to_vec(),
        }
    }

    /// A deletion whose reference bases are unknown.
    pub fn deletion_without_bases(len: usize) -> EditElement {
        Self::without_bases(EditOperator::Deletion, len)
    }

    pub fn skipped_region(len: usize) -> EditElement {
        Self::without_bases(EditOperator::SkippedRegion, len)
    }

    pub fn soft_clip(len: usize) -> EditElement {
        Self::without_bases(EditOperator::SoftClip, len)
    }

    pub fn hard_clip(len: usize) -> EditElement {
        Self::without_bases(EditOperator::HardClip, len)
    }

    pub fn padding(len: usize) -> EditElement {
        Self::without_bases(EditOperator::Padding, len)
    }

    fn without_bases(operator: EditOperator, len: usize) -> EditElement {
        EditElement {
            operator,
            len,
            bases: Vec::new(),
        }
    }

    pub fn operator(&self) -> EditOperator {
        self.operator
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn bases(&self) -> &[u8] {
        &self.bases
    }

    /// (reference, read) pairs of a mismatch element; empty for every other operator.
    pub fn base_pairs(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        let pairs: &[u8] = match self.operator {
            EditOperator::Mismatch => &self.bases,
            _ => &[],
        };
        pairs.chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    fn push_mismatch(&mut self, reference: u8, read: u8) {
        self.len += 1;
        self.bases.push(reference);
        self.bases.push(read);
    }

    pub fn reverse_complement(&self) -> EditElement {
        let bases = match self.operator {
            EditOperator::Mismatch => self
                .bases
                .chunks_exact(2)
                .rev()
                .flat_map(|pair| [complement(pair[0]), complement(pair[1])])
                .collect(),
            EditOperator::Insertion | EditOperator::Deletion => reverse_complement(&self.bases),
            _ => self.bases.clone(),
        };
        EditElement {
            operator: self.operator,
            len: self.len,
            bases,
        }
    }
}

impl fmt::Display for EditElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}{}",
            self.len,
            self.operator.symbol(),
            String::from_utf8_lossy(&self.bases)
        )
    }
}

/// Ordered merge of an operator string and an MD tag for one read.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditScript {
    elements: Vec<EditElement>,
}

impl EditScript {
    pub fn new() -> EditScript {
        EditScript::default()
    }

    pub fn push(&mut self, element: EditElement) {
        self.elements.push(element);
    }

    /// Appends a mismatch, extending the last element when it is a mismatch too.
    pub fn push_mismatch(&mut self, reference: u8, read: u8) {
        match self.elements.last_mut() {
            Some(last) if last.operator == EditOperator::Mismatch => {
                last.push_mismatch(reference, read)
            }
            _ => self.elements.push(EditElement::mismatch(reference, read)),
        }
    }

    pub fn elements(&self) -> &[EditElement] {
        &self.elements
    }

    pub fn iter(&self) -> std::slice::Iter<'_, EditElement> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Number of read bases the script accounts for.
    pub fn read_len(&self) -> usize {
        self.elements
            .iter()
            .filter(|e| e.operator.consumes_read())
            .map(|e| e.len)
            .sum()
    }

    /// Reverses the element order and complements all recorded bases.
    pub fn reverse_complement(&self) -> EditScript {
        EditScript {
            elements: self
                .elements
                .iter()
                .rev()
                .map(EditElement::reverse_complement)
                .collect(),
        }
    }
}

impl<'a> IntoIterator for &'a EditScript {
    type Item = &'a EditElement;
    type IntoIter = std::slice::Iter<'a, EditElement>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}

impl fmt::Display for EditScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            write!(f, "{}", element)?;
        }
        Ok(())
    }
}

impl FromStr for EditScript {
    type Err = String;

    fn from_str(encoding: &str) -> Result<Self, Self::Err> {
        let error_msg = |reason: &str| format!("Invalid CigarMD {}: {}", encoding, reason);
        let bytes = encoding.as_bytes();
        let mut script = EditScript::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let digits_end = bytes[pos..]
                .iter()
                .position(|b| !b.is_ascii_digit())
                .map_or(bytes.len(), |offset| pos + offset);
            if digits_end == pos {
                return Err(error_msg("expected a length"));
            }
            let len: usize = encoding[pos..digits_end]
                .parse()
                .map_err(|_| error_msg("invalid length"))?;
            if len == 0 {
                return Err(error_msg("zero-length element"));
            }
            let symbol = *bytes
                .get(digits_end)
                .ok_or_else(|| error_msg("missing operator"))?;
            let operator = EditOperator::from_symbol(symbol as char)
                .ok_or_else(|| error_msg(&format!("unknown operator {}", symbol as char)))?;
            let bases_start = digits_end + 1;
            let bases_end = bases_start + operator.bases_len(len);
            let bases = bytes
                .get(bases_start..bases_end)
                .filter(|bases| bases.iter().all(u8::is_ascii_uppercase))
                .ok_or_else(|| error_msg("bases do not match the element length"))?;
            script.push(EditElement {
                operator,
                len,
                bases: bases.to_vec(),
            });
            pos = bases_end;
        }
        Ok(script)
    }
}
