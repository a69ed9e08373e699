pub type CigarOp = rust_htslib::bam::record::Cigar;

/// Returned by [`Cigar::locate`] when the alignment is exhausted without any
/// operation containing the target position.
pub const NOT_COVERED: i64 = -1;

pub trait CigarOpExt {
    fn get_ref_len(&self) -> i64;
    fn get_query_len(&self) -> i64;
}

impl CigarOpExt for CigarOp {
    fn get_ref_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::RefSkip(len)
            | CigarOp::Del(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len) => *len as i64,
            CigarOp::Ins(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

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

#[derive(Debug, PartialEq, Clone)]
pub struct Cigar {
    pub ref_pos: i64,
    pub ops: Vec<CigarOp>,
}

impl Cigar {
    pub fn query_len(&self) -> usize {
        self.ops.iter().map(|op| op.get_query_len() as usize).sum()
    }

    /// Maps a 1-based reference position to a 0-based offset into the read
    /// sequence, or [`NOT_COVERED`] when no operation contains it.
    ///
    /// Walks the operations left to right with a reference cursor and a
    /// sequence cursor. Match, deletion, and reference-skip blocks are
    /// tested for containment over the inclusive interval
    /// `[ref_pos + ref_cursor, ref_pos + ref_cursor + n]`; a hit maps to
    /// `target - (ref_pos + ref_cursor) + seq_cursor - 1`. A position inside
    /// a deletion or skip therefore still yields an offset, and the caller
    /// decides what a deleted base means for the variant in question.
    ///
    /// Insertions are tested with the interval of the *unshifted* reference
    /// cursor even though they consume no reference, so a target just past
    /// an insertion breakpoint resolves into the inserted bases. This
    /// asymmetry is intentional and pinned by tests; do not normalize it.
    pub fn locate(&self, target_pos: i64) -> i64 {
        let mut ref_cursor: i64 = 0;
        let mut seq_cursor: i64 = 0;

        for op in &self.ops {
            let n = i64::from(op.len());
            let block_start = self.ref_pos + ref_cursor;
            let is_candidate = matches!(
                op,
                CigarOp::Match(_)
                    | CigarOp::Equal(_)
                    | CigarOp::Diff(_)
                    | CigarOp::Ins(_)
                    | CigarOp::Del(_)
                    | CigarOp::RefSkip(_)
            );
            if is_candidate && block_start <= target_pos && target_pos <= block_start + n {
                return target_pos - block_start + seq_cursor - 1;
            }
            ref_cursor += op.get_ref_len();
            seq_cursor += op.get_query_len();
        }

        NOT_COVERED
    }
}
