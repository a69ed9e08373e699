mod cigar;
mod read;

pub use cigar::{Cigar, CigarOp, CigarOpExt, NOT_COVERED};
pub use read::AlignedRead;
