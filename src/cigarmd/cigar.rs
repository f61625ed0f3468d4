//! The run-length operator string (CIGAR) and helpers around it.

use crate::utils::Result;
use itertools::Itertools;

pub type CigarOp = rust_htslib::bam::record::Cigar;

pub trait CigarOpExt {
    fn get_query_len(&self) -> i64;
}

impl CigarOpExt for CigarOp {
    fn get_query_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len)
            | CigarOp::Ins(len)
            | CigarOp::SoftClip(len) => *len as i64,
            CigarOp::RefSkip(_) | CigarOp::Del(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }
}

/// Number of read bases described by the operators.
pub fn query_len(ops: &[CigarOp]) -> usize {
    ops.iter().map(|op| op.get_query_len() as usize).sum()
}

pub fn cigar_to_string(ops: &[CigarOp]) -> String {
    if ops.is_empty() {
        return "*".to_string();
    }
    ops.iter()
        .map(|op| format!("{}{}", op.len(), op.char()))
        .join("")
}

/// Parses a textual operator string such as `3M1I3M`. `*` and the empty string denote a
/// missing operator string and yield no operators.
pub fn parse_cigar(cigar_string: &str) -> Result<Vec<CigarOp>> {
    if cigar_string == "*" {
        return Ok(Vec::new());
    }
    let mut ops = Vec::new();
    let mut num_str = String::new();
    for c in cigar_string.chars() {
        if c.is_ascii_digit() {
            num_str.push(c);
            continue;
        }
        if num_str.is_empty() {
            return Err(format!(
                "Operator {} without length in CIGAR {}",
                c, cigar_string
            ));
        }
        let num: u32 = num_str
            .parse()
            .map_err(|_| format!("Invalid operator length in CIGAR {}", cigar_string))?;
        num_str.clear();
        let op = match c {
            'M' => CigarOp::Match(num),
            'I' => CigarOp::Ins(num),
            'D' => CigarOp::Del(num),
            'N' => CigarOp::RefSkip(num),
            'S' => CigarOp::SoftClip(num),
            'H' => CigarOp::HardClip(num),
            'P' => CigarOp::Pad(num),
            '=' => CigarOp::Equal(num),
            'X' => CigarOp::Diff(num),
            _ => return Err(format!("Invalid cigar operation {} in {}", c, cigar_string)),
        };
        ops.push(op);
    }
    if !num_str.is_empty() {
        return Err(format!("Trailing length in CIGAR {}", cigar_string));
    }
    Ok(ops)
}
