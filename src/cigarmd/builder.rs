//! Merges the operator string and the MD tag of a read into an `EditScript`.
//!
//! The MD tag interleaves run lengths of matched bases with the reference bases of
//! mismatches (`A`, `C`, `G`, `T`, `N`) and of deletions (`^` followed by the deleted bases).
//! It says nothing about insertions and clips, so a matched run in the MD tag may span, or be
//! split by, several operators. Zeros separate adjacent mismatches and deletions.

use super::cigar::{query_len, CigarOp};
use super::element::{EditElement, EditOperator, EditScript};
use super::read::AlignedRead;
use std::fmt;

/// Outcome of building the edit script of one read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Ok,
    Unmapped,
    MissingAnnotation,
    MissingOperatorString,
    InconsistentEncoding,
    UnsupportedOperator,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Status::Ok => "OK",
            Status::Unmapped => "UNMAPPED",
            Status::MissingAnnotation => "MISSING_ANNOTATION",
            Status::MissingOperatorString => "MISSING_OPERATOR_STRING",
            Status::InconsistentEncoding => "INCONSISTENT_ENCODING",
            Status::UnsupportedOperator => "UNSUPPORTED_OPERATOR",
        };
        write!(f, "{}", name)
    }
}

/// Why no edit script could be built for a read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildError {
    Unmapped,
    MissingAnnotation,
    MissingOperatorString,
    /// Operator string and MD tag disagree.
    InconsistentEncoding(Inconsistency),
    /// An extended operator (`=` or `X`).
    UnsupportedOperator(char),
}

impl BuildError {
    pub fn status(&self) -> Status {
        match self {
            BuildError::Unmapped => Status::Unmapped,
            BuildError::MissingAnnotation => Status::MissingAnnotation,
            BuildError::MissingOperatorString => Status::MissingOperatorString,
            BuildError::InconsistentEncoding(_) => Status::InconsistentEncoding,
            BuildError::UnsupportedOperator(_) => Status::UnsupportedOperator,
        }
    }
}

impl fmt::Display for BuildError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BuildError::Unmapped => write!(f, "Read is unmapped"),
            BuildError::MissingAnnotation => write!(f, "Read has no MD tag"),
            BuildError::MissingOperatorString => write!(f, "Mapped read has no CIGAR"),
            BuildError::InconsistentEncoding(inconsistency) => write!(f, "{}", inconsistency),
            BuildError::UnsupportedOperator(op) => {
                write!(f, "Extended CIGAR operator {} is unsupported", op)
            }
        }
    }
}

/// Diagnostic context of a CIGAR/MD disagreement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inconsistency {
    pub reason: String,
    pub cigar: String,
    pub md: String,
    /// The operator being merged when the disagreement surfaced, if any.
    pub element: Option<String>,
}

impl fmt::Display for Inconsistency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}. CIGAR: {}, MD: {}, current element: {}",
            self.reason,
            self.cigar,
            self.md,
            self.element.as_deref().unwrap_or("none")
        )
    }
}

/// Builds the edit script of `read`, oriented in sequencing direction.
///
/// Reads whose CIGAR and MD tag disagree, and mapped reads without a CIGAR, are logged with
/// enough context to find them again.
pub fn build_edit_script(read: &AlignedRead) -> Result<EditScript, BuildError> {
    let result = merge(read);
    match &result {
        Ok(script) => log::debug!("{}: {}", read.id, script),
        Err(err) => match err.status() {
            Status::InconsistentEncoding | Status::MissingOperatorString => {
                log::warn!("{}: {}", read.id, err)
            }
            _ => log::debug!("{}: {}", read.id, err),
        },
    }
    result
}

fn merge(read: &AlignedRead) -> Result<EditScript, BuildError> {
    // No assumptions can be made about the CIGAR or the MD tag of an unmapped read.
    if read.flags.is_unmapped {
        return Err(BuildError::Unmapped);
    }
    let md = match read.md.as_deref() {
        Some(md) if !md.is_empty() => md,
        _ => return Err(BuildError::MissingAnnotation),
    };
    if read.cigar.is_empty() {
        return Err(BuildError::MissingOperatorString);
    }

    let mut state = MergeState::new(read, md);
    for op in read.cigar.iter() {
        state.merge_op(op)?;
    }
    let script = state.finish()?;

    let orientation = read.orientation();
    if orientation.is_anomalous {
        log::warn!(
            "{}: paired read is flagged as {} first and second segment, treating it as first",
            read.id,
            if read.flags.is_first { "both" } else { "neither" }
        );
    }
    if orientation.flip {
        Ok(script.reverse_complement())
    } else {
        Ok(script)
    }
}

/// Cursors of one merge. Created fresh for every read.
struct MergeState<'a> {
    read: &'a AlignedRead,
    md: &'a [u8],
    md_str: &'a str,
    /// Next unread MD character.
    md_pos: usize,
    /// Next read base.
    read_pos: usize,
    /// Matched bases announced by the MD tag and not yet assigned to an operator.
    pending_matches: usize,
    script: EditScript,
}

impl<'a> MergeState<'a> {
    fn new(read: &'a AlignedRead, md: &'a str) -> Self {
        MergeState {
            read,
            md: md.as_bytes(),
            md_str: md,
            md_pos: 0,
            read_pos: 0,
            pending_matches: 0,
            script: EditScript::new(),
        }
    }

    fn merge_op(&mut self, op: &CigarOp) -> Result<(), BuildError> {
        let len = op.len() as usize;
        if len == 0 {
            return Ok(());
        }
        match EditOperator::from(op) {
            EditOperator::Match => self.merge_match(op, len),
            EditOperator::Insertion => self.merge_insertion(op, len),
            EditOperator::Deletion => self.merge_deletion(op, len),
            EditOperator::SkippedRegion => {
                self.script.push(EditElement::skipped_region(len));
                Ok(())
            }
            EditOperator::SoftClip => {
                // Soft clipped bases are present in the read, only not aligned.
                self.read_pos += len;
                self.script.push(EditElement::soft_clip(len));
                Ok(())
            }
            EditOperator::HardClip => {
                self.script.push(EditElement::hard_clip(len));
                Ok(())
            }
            EditOperator::Padding => {
                self.script.push(EditElement::padding(len));
                Ok(())
            }
            // A CIGAR alone never resolves a mismatch.
            EditOperator::Mismatch | EditOperator::Unsupported => {
                Err(BuildError::UnsupportedOperator(op.char()))
            }
        }
    }

    fn merge_match(&mut self, op: &CigarOp, len: usize) -> Result<(), BuildError> {
        let mut remaining = len;
        while remaining > 0 {
            if self.pending_matches > 0 {
                let matched = self.pending_matches.min(remaining);
                self.script.push(EditElement::matched(matched));
                self.read_pos += matched;
                self.pending_matches -= matched;
                remaining -= matched;
                continue;
            }

            let token = match self.md.get(self.md_pos) {
                Some(token) => *token,
                None => {
                    return Err(self.inconsistent(Some(op), "MD tag is shorter than expected"))
                }
            };
            match token {
                b'0' => self.md_pos += 1,
                b'1'..=b'9' => self.pending_matches = self.parse_match_run(op)?,
                b'A' | b'C' | b'G' | b'T' | b'N' => {
                    let read_base = match self.read.bases.get(self.read_pos) {
                        Some(base) => *base,
                        None => {
                            return Err(self.inconsistent(
                                Some(op),
                                "Mismatch lies beyond the end of the read",
                            ))
                        }
                    };
                    self.script.push_mismatch(token, read_base);
                    self.md_pos += 1;
                    self.read_pos += 1;
                    remaining -= 1;
                }
                other => {
                    return Err(self.inconsistent(
                        Some(op),
                        &format!("Unexpected character {} in MD tag", other as char),
                    ))
                }
            }
        }
        Ok(())
    }

    /// Consumes a run of digits starting at the MD cursor.
    fn parse_match_run(&mut self, op: &CigarOp) -> Result<usize, BuildError> {
        let start = self.md_pos;
        let end = self.md[start..]
            .iter()
            .position(|c| !c.is_ascii_digit())
            .map_or(self.md.len(), |offset| start + offset);
        self.md_pos = end;
        self.md_str[start..end]
            .parse()
            .map_err(|_| self.inconsistent(Some(op), "Match run in MD tag is too long"))
    }

    fn merge_insertion(&mut self, op: &CigarOp, len: usize) -> Result<(), BuildError> {
        // The MD tag does not encode insertions.
        let end = self.read_pos + len;
        let inserted = match self.read.bases.get(self.read_pos..end) {
            Some(inserted) => inserted,
            None => {
                return Err(self.inconsistent(Some(op), "Insertion lies beyond the end of the read"))
            }
        };
        self.script.push(EditElement::insertion(inserted));
        self.read_pos = end;
        Ok(())
    }

    fn merge_deletion(&mut self, op: &CigarOp, len: usize) -> Result<(), BuildError> {
        if self.pending_matches != 0 {
            return Err(self.inconsistent(
                Some(op),
                "Previous MD element not processed completely before a deletion",
            ));
        }
        while self.md.get(self.md_pos) == Some(&b'0') {
            self.md_pos += 1;
        }
        if self.md.get(self.md_pos) != Some(&b'^') {
            return Err(self.inconsistent(Some(op), "^ not found in the MD tag for a deletion"));
        }
        let start = self.md_pos + 1;
        let deleted = match self.md.get(start..start + len) {
            Some(deleted) if deleted.iter().all(u8::is_ascii_alphabetic) => deleted,
            _ => {
                return Err(self.inconsistent(
                    Some(op),
                    "MD tag is shorter than the deletion it describes",
                ))
            }
        };
        self.script.push(EditElement::deletion(deleted));
        self.md_pos = start + len;
        Ok(())
    }

    fn finish(self) -> Result<EditScript, BuildError> {
        if self.pending_matches > 0 {
            return Err(self.inconsistent(
                None,
                &format!(
                    "MD tag describes {} matched bases more than the CIGAR",
                    self.pending_matches
                ),
            ));
        }
        if self.md[self.md_pos..].iter().any(|&c| c != b'0') {
            return Err(self.inconsistent(None, "MD tag is longer than expected"));
        }
        if self.read_pos != self.read.len() {
            return Err(self.inconsistent(
                None,
                &format!(
                    "CIGAR describes {} read bases but the read has {}",
                    query_len(&self.read.cigar),
                    self.read.len()
                ),
            ));
        }
        Ok(self.script)
    }

    fn inconsistent(&self, op: Option<&CigarOp>, reason: &str) -> BuildError {
        BuildError::InconsistentEncoding(Inconsistency {
            reason: reason.to_string(),
            cigar: self.read.cigar_string(),
            md: self.md_str.to_string(),
            element: op.map(|op| format!("{}{}", op.len(), op.char())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cigarmd::read::ReadFlags;

    fn build(cigar: &str, md: Option<&str>, bases: &str, flags: u16) -> Result<EditScript, BuildError> {
        let read =
            AlignedRead::from_strings("read", cigar, md, bases, ReadFlags::from_sam_flags(flags))
                .unwrap();
        build_edit_script(&read)
    }

    fn build_ok(cigar: &str, md: &str, bases: &str) -> String {
        build(cigar, Some(md), bases, 0).unwrap().to_string()
    }

    fn status(cigar: &str, md: Option<&str>, bases: &str, flags: u16) -> Status {
        match build(cigar, md, bases, flags) {
            Ok(_) => Status::Ok,
            Err(err) => err.status(),
        }
    }

    #[test]
    fn perfect_match() {
        let script = build("5M", Some("5"), "ACGTA", 0).unwrap();
        assert_eq!(script.elements(), &[EditElement::matched(5)]);
        assert!(script.elements()[0].bases().is_empty());
    }

    #[test]
    fn insertion_splits_match_run() {
        let script = build("3M1I3M", Some("6"), "AAAGCCC", 0).unwrap();
        assert_eq!(
            script.elements(),
            &[
                EditElement::matched(3),
                EditElement::insertion(b"G"),
                EditElement::matched(3)
            ]
        );
    }

    #[test]
    fn single_mismatch() {
        let script = build("5M", Some("2A2"), "AACGT", 0).unwrap();
        assert_eq!(
            script.elements(),
            &[
                EditElement::matched(2),
                EditElement::mismatch(b'A', b'C'),
                EditElement::matched(2)
            ]
        );
    }

    #[test]
    fn combined_example() {
        let bases = format!(
            "{}T{}{}G{}A{}",
            "A".repeat(7),
            "C".repeat(24),
            "G".repeat(5),
            "T".repeat(2),
            "C".repeat(49)
        );
        assert_eq!(
            build_ok("32M2D5M1I52M", "7G24^AA7C49", &bases),
            "7m1uGT24m2dAA5m1iG2m1uCA49m"
        );
    }

    #[test]
    fn adjacent_mismatches_are_one_element() {
        assert_eq!(build_ok("6M", "1A0C3", "ATGCCC"), "1m2uATCG3m");
        assert_eq!(build_ok("4M", "0A0C2", "TGAA"), "2uATCG2m");
    }

    #[test]
    fn mismatch_right_after_deletion() {
        assert_eq!(build_ok("2M1D3M", "2^G0T2", "ACAGG"), "2m1dG1uTA2m");
    }

    #[test]
    fn clips_and_skips() {
        assert_eq!(build_ok("2S3M4N2M1H", "5", "TTACGAC"), "2s3m4n2m1h");
        assert_eq!(build_ok("2M1P2M", "4", "ACGT"), "2m1p2m");
    }

    #[test]
    fn zero_length_operators_are_ignored() {
        assert_eq!(build_ok("2M0I2M", "4", "ACGT"), "2m2m");
    }

    #[test]
    fn reverse_strand_is_flipped() {
        let script = build("5M", Some("2A2"), "AACGT", 0x10).unwrap();
        assert_eq!(script.to_string(), "2m1uTG2m");
    }

    #[test]
    fn second_segment_forward_is_flipped() {
        let script = build("3M1I1M", Some("4"), "AAACG", 0x1 | 0x80).unwrap();
        assert_eq!(script.to_string(), "1m1iG3m");
        let script = build("3M1I1M", Some("4"), "AAACG", 0x1 | 0x80 | 0x10).unwrap();
        assert_eq!(script.to_string(), "3m1iC1m");
    }

    #[test]
    fn unmapped_read() {
        assert_eq!(status("5M", Some("5"), "ACGTA", 0x4), Status::Unmapped);
        assert_eq!(status("*", None, "ACGTA", 0x4), Status::Unmapped);
    }

    #[test]
    fn missing_annotation() {
        assert_eq!(status("5M", None, "ACGTA", 0), Status::MissingAnnotation);
        assert_eq!(status("5M", Some(""), "ACGTA", 0), Status::MissingAnnotation);
    }

    #[test]
    fn missing_operator_string() {
        assert_eq!(status("*", Some("5"), "ACGTA", 0), Status::MissingOperatorString);
    }

    #[test]
    fn unsupported_operators() {
        assert_eq!(status("5=", Some("5"), "ACGTA", 0), Status::UnsupportedOperator);
        assert_eq!(
            build("4M1X", Some("4A"), "ACGTC", 0),
            Err(BuildError::UnsupportedOperator('X'))
        );
    }

    #[test]
    fn deletion_without_marker() {
        let err = build("2M1D3M", Some("2C3"), "ACGTA", 0).unwrap_err();
        assert_eq!(err.status(), Status::InconsistentEncoding);
        match err {
            BuildError::InconsistentEncoding(inconsistency) => {
                assert_eq!(inconsistency.cigar, "2M1D3M");
                assert_eq!(inconsistency.md, "2C3");
                assert_eq!(inconsistency.element.as_deref(), Some("1D"));
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[test]
    fn deletion_longer_than_md() {
        assert_eq!(
            status("2M3D1M", Some("2^AC"), "ACG", 0),
            Status::InconsistentEncoding
        );
    }

    #[test]
    fn deletion_inside_match_run() {
        assert_eq!(
            status("2M1D2M", Some("4"), "ACGT", 0),
            Status::InconsistentEncoding
        );
    }

    #[test]
    fn md_shorter_than_cigar() {
        assert_eq!(status("6M", Some("4"), "ACGTAC", 0), Status::InconsistentEncoding);
    }

    #[test]
    fn md_longer_than_cigar() {
        assert_eq!(status("4M", Some("6"), "ACGT", 0), Status::InconsistentEncoding);
        assert_eq!(status("4M", Some("4A"), "ACGT", 0), Status::InconsistentEncoding);
        assert_eq!(status("4M", Some("40"), "ACGT", 0), Status::InconsistentEncoding);
        assert_eq!(status("4M", Some("4^"), "ACGT", 0), Status::InconsistentEncoding);
    }

    #[test]
    fn unexpected_md_character() {
        assert_eq!(status("4M", Some("2^A1"), "ACGT", 0), Status::InconsistentEncoding);
        assert_eq!(status("4M", Some("2R1"), "ACGT", 0), Status::InconsistentEncoding);
    }

    #[test]
    fn read_shorter_than_cigar() {
        assert_eq!(status("4M2I", Some("4"), "ACGT", 0), Status::InconsistentEncoding);
        assert_eq!(status("3M", Some("2A"), "AC", 0), Status::InconsistentEncoding);
        assert_eq!(status("3M", Some("3"), "AC", 0), Status::InconsistentEncoding);
    }

    #[test]
    fn status_names() {
        assert_eq!(Status::Ok.to_string(), "OK");
        assert_eq!(
            Status::InconsistentEncoding.to_string(),
            "INCONSISTENT_ENCODING"
        );
    }
}
