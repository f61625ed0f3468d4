//! Module for representing the parts of an alignment record the edit script is built from.
//!

use super::cigar::{self, CigarOp};
use crate::utils::Result;
use rust_htslib::bam::{self, record::Aux};

const FLAG_PAIRED: u16 = 0x1;
const FLAG_UNMAPPED: u16 = 0x4;
const FLAG_REVERSE: u16 = 0x10;
const FLAG_FIRST: u16 = 0x40;
const FLAG_SECOND: u16 = 0x80;

/// Flag bits that decide whether, and how, an edit script is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadFlags {
    pub is_unmapped: bool,
    pub is_paired: bool,
    pub is_first: bool,
    pub is_second: bool,
    pub is_reverse: bool,
}

impl ReadFlags {
    /// Decodes the bits of a SAM FLAG field.
    pub fn from_sam_flags(flags: u16) -> ReadFlags {
        ReadFlags {
            is_unmapped: flags & FLAG_UNMAPPED != 0,
            is_paired: flags & FLAG_PAIRED != 0,
            is_first: flags & FLAG_FIRST != 0,
            is_second: flags & FLAG_SECOND != 0,
            is_reverse: flags & FLAG_REVERSE != 0,
        }
    }
}

/// Which read of a pair a record belongs to. Unpaired reads count as first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MateSegment {
    First,
    Second,
}

impl MateSegment {
    pub fn index(self) -> usize {
        match self {
            MateSegment::First => 0,
            MateSegment::Second => 1,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            MateSegment::First => "first",
            MateSegment::Second => "second",
        }
    }
}

/// How a read has to be oriented to be read in sequencing direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Orientation {
    pub segment: MateSegment,
    pub flip: bool,
    /// Paired read flagged as both or neither of first/second.
    pub is_anomalous: bool,
}

/// A single aligned read, reduced to what the edit script needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRead {
    /// Read name, only used in diagnostics.
    pub id: String,
    /// Operator string; empty when the record carries `*`.
    pub cigar: Vec<CigarOp>,
    /// MD tag, if present.
    pub md: Option<String>,
    /// Read bases as stored in the record.
    pub bases: Vec<u8>,
    pub flags: ReadFlags,
}

impl AlignedRead {
    /// Creates an `AlignedRead` from an HTSlib record.
    pub fn from_hts_rec(rec: &bam::Record) -> AlignedRead {
        let id = String::from_utf8_lossy(rec.qname()).to_string();
        let cigar = rec.cigar().take().to_vec();
        let md = get_md_tag(rec);
        let bases = rec.seq().as_bytes();
        let flags = ReadFlags {
            is_unmapped: rec.is_unmapped(),
            is_paired: rec.is_paired(),
            is_first: rec.is_first_in_template(),
            is_second: rec.is_last_in_template(),
            is_reverse: rec.is_reverse(),
        };

        AlignedRead {
            id,
            cigar,
            md,
            bases,
            flags,
        }
    }

    /// Creates an `AlignedRead` from its textual SAM fields.
    pub fn from_strings(
        id: &str,
        cigar_string: &str,
        md: Option<&str>,
        bases: &str,
        flags: ReadFlags,
    ) -> Result<AlignedRead> {
        Ok(AlignedRead {
            id: id.to_string(),
            cigar: cigar::parse_cigar(cigar_string)?,
            md: md.map(str::to_string),
            bases: bases.as_bytes().to_ascii_uppercase(),
            flags,
        })
    }

    pub fn len(&self) -> usize {
        self.bases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bases.is_empty()
    }

    pub fn cigar_string(&self) -> String {
        cigar::cigar_to_string(&self.cigar)
    }

    /// Mate segment of the read and whether its edit script must be reverse complemented.
    ///
    /// First segments (and unpaired reads) are flipped when on the reverse strand, second
    /// segments when on the forward strand. Paired reads flagged as both or neither segment are
    /// treated as first.
    pub fn orientation(&self) -> Orientation {
        let flags = &self.flags;
        if !flags.is_paired {
            return Orientation {
                segment: MateSegment::First,
                flip: flags.is_reverse,
                is_anomalous: false,
            };
        }
        match (flags.is_first, flags.is_second) {
            (true, false) => Orientation {
                segment: MateSegment::First,
                flip: flags.is_reverse,
                is_anomalous: false,
            },
            (false, true) => Orientation {
                segment: MateSegment::Second,
                flip: !flags.is_reverse,
                is_anomalous: false,
            },
            _ => Orientation {
                segment: MateSegment::First,
                flip: flags.is_reverse,
                is_anomalous: true,
            },
        }
    }

    pub fn segment(&self) -> MateSegment {
        self.orientation().segment
    }
}

/// Retrieves the MD tag from a BAM record.
fn get_md_tag(rec: &bam::Record) -> Option<String> {
    match rec.aux(b"MD") {
        Ok(Aux::String(value)) => Some(value.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_with_flags(flags: u16) -> AlignedRead {
        AlignedRead::from_strings("r", "4M", Some("4"), "ACGT", ReadFlags::from_sam_flags(flags))
            .unwrap()
    }

    #[test]
    fn decode_sam_flags() {
        let flags = ReadFlags::from_sam_flags(0x1 | 0x10 | 0x80);
        assert!(flags.is_paired);
        assert!(flags.is_reverse);
        assert!(flags.is_second);
        assert!(!flags.is_first);
        assert!(!flags.is_unmapped);
        assert!(ReadFlags::from_sam_flags(0x4).is_unmapped);
    }

    #[test]
    fn unpaired_orientation() {
        let forward = read_with_flags(0).orientation();
        assert_eq!(forward.segment, MateSegment::First);
        assert!(!forward.flip);
        assert!(read_with_flags(0x10).orientation().flip);
    }

    #[test]
    fn first_segment_orientation() {
        let forward = read_with_flags(0x1 | 0x40).orientation();
        assert_eq!(forward.segment, MateSegment::First);
        assert!(!forward.flip);
        assert!(read_with_flags(0x1 | 0x40 | 0x10).orientation().flip);
    }

    #[test]
    fn second_segment_flips_on_forward_strand() {
        let forward = read_with_flags(0x1 | 0x80).orientation();
        assert_eq!(forward.segment, MateSegment::Second);
        assert!(forward.flip);
        let reverse = read_with_flags(0x1 | 0x80 | 0x10).orientation();
        assert_eq!(reverse.segment, MateSegment::Second);
        assert!(!reverse.flip);
    }

    #[test]
    fn ambiguous_segment_is_first() {
        for flags in [0x1, 0x1 | 0x40 | 0x80] {
            let orientation = read_with_flags(flags).orientation();
            assert_eq!(orientation.segment, MateSegment::First);
            assert!(orientation.is_anomalous);
            assert!(!orientation.flip);
        }
        assert!(read_with_flags(0x1 | 0x10).orientation().flip);
    }

    #[test]
    fn from_strings_uppercases_bases() {
        let read =
            AlignedRead::from_strings("r", "3M", None, "acg", ReadFlags::default()).unwrap();
        assert_eq!(read.bases, b"ACG".to_vec());
        assert_eq!(read.md, None);
        assert_eq!(read.cigar_string(), "3M");
        assert_eq!(read.len(), 3);
    }
}
