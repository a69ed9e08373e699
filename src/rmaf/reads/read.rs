//! Value object for a single aligned read fetched from a BAM region query.

use super::cigar::Cigar;
use rust_htslib::bam::{self, ext::BamRecordExtensions};
use std::str;

/// The slice of an alignment record the counting core needs: position,
/// alignment operations, bases, per-base qualities, and the duplicate flag.
/// Never mutated after construction.
#[derive(Debug, PartialEq, Clone)]
pub struct AlignedRead {
    /// Read name, used only for logging.
    pub id: String,
    /// Alignment of the read against the reference; `None` for unmapped
    /// records, which cannot be located and are skipped.
    pub cigar: Option<Cigar>,
    /// Read bases.
    pub bases: Vec<u8>,
    /// Per-base qualities; `None` when the record carries no quality array.
    pub quals: Option<Vec<u8>>,
    /// PCR/optical duplicate flag.
    pub is_duplicate: bool,
}

// htslib fills absent quality strings with 0xff.
const MISSING_QUAL: u8 = 0xff;

impl AlignedRead {
    pub fn from_hts_rec(rec: &bam::Record) -> AlignedRead {
        let id = str::from_utf8(rec.qname()).unwrap_or("<non-utf8>").to_string();
        let bases = rec.seq().as_bytes();

        let quals = rec.qual();
        let quals = if quals.is_empty() || quals.iter().all(|&q| q == MISSING_QUAL) {
            None
        } else {
            Some(quals.to_vec())
        };

        let cigar = if !rec.is_unmapped() {
            Some(Cigar {
                ref_pos: rec.reference_start(),
                ops: rec.cigar().take().to_vec(),
            })
        } else {
            None
        };

        AlignedRead {
            id,
            cigar,
            bases,
            quals,
            is_duplicate: rec.is_duplicate(),
        }
    }
}
