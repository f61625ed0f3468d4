//! Edit scripts of aligned reads: CIGAR and MD tag merged into one description of how a
//! read differs from the reference.

mod builder;
mod cigar;
mod element;
mod read;

pub use builder::{build_edit_script, BuildError, Inconsistency, Status};
pub use cigar::{cigar_to_string, parse_cigar, query_len, CigarOp, CigarOpExt};
pub use element::{EditElement, EditOperator, EditScript};
pub use read::{AlignedRead, MateSegment, Orientation, ReadFlags};
