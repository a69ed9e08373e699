//! Per-site evaluation: read filtering, coordinate mapping, and the fold
//! of allele calls into a support tally.

use super::counting::{classify, SiteSupport, SupportCounts};
use super::mutation::Mutation;
use super::reads::{AlignedRead, NOT_COVERED};
use rust_htslib::bam::{self, HeaderView, Read, Record};

/// Fixed base-quality cutoff: a mapped read whose quality at `offset - 1`
/// is at or below this value contributes to no bucket.
const LOW_BASEQ_CUTOFF: u8 = 1;

#[derive(Debug, Default, Clone)]
pub struct Params {
    /// Duplicate-flagged reads are logged and counted by default; setting
    /// this drops them instead.
    pub exclude_duplicates: bool,
}

/// Tallies read support for one mutation against one alignment source.
///
/// The chromosome name is resolved against the BAM header as given and,
/// failing that, once more with a `chr` prefix. Any failure to query the
/// source — unknown chromosome, failed fetch, or a record-level read
/// error mid-region — degrades the whole site to
/// [`SiteSupport::Unavailable`] rather than a partial tally. Pure with
/// respect to the reader: rerunning with unchanged inputs yields an
/// identical result.
pub fn evaluate_mutation(
    bam: &mut bam::IndexedReader,
    mutation: &Mutation,
    params: &Params,
) -> SiteSupport {
    let tid = match resolve_tid(bam.header(), &mutation.chrom) {
        Some(tid) => tid,
        None => {
            log::warn!("{} is not a valid chromosome", mutation.chrom);
            return SiteSupport::Unavailable;
        }
    };

    let (start, end) = (mutation.pos - 1, mutation.pos + mutation.span());
    if let Err(e) = bam.fetch((tid as i32, start, end)) {
        log::warn!(
            "Fetch failed for {}:{}: {}",
            mutation.chrom,
            mutation.pos,
            e
        );
        return SiteSupport::Unavailable;
    }

    let mut counts = SupportCounts::default();
    let mut record = Record::new();
    while let Some(result) = bam.read(&mut record) {
        if let Err(e) = result {
            log::warn!(
                "Failed reading {}:{}: {}",
                mutation.chrom,
                mutation.pos,
                e
            );
            return SiteSupport::Unavailable;
        }

        let read = AlignedRead::from_hts_rec(&record);
        let offset = match locate_in_read(&read, mutation.pos, params) {
            Some(offset) => offset,
            None => continue,
        };
        if offset >= read.bases.len() {
            log::debug!("{}: offset {} is past the read end", read.id, offset);
            continue;
        }

        counts.record(classify(&read.bases, offset, mutation));
    }

    SiteSupport::Counted(counts)
}

fn resolve_tid(header: &HeaderView, chrom: &str) -> Option<u32> {
    header
        .tid(chrom.as_bytes())
        .or_else(|| header.tid(format!("chr{}", chrom).as_bytes()))
}

/// Maps a mutation position into one read, applying the read-level gates.
///
/// Duplicates are logged, not excluded, unless [`Params::exclude_duplicates`]
/// is set. The base-quality gate runs strictly after coordinate mapping
/// because its cutoff is interpreted against the read-local offset: the
/// quality inspected is the one at `offset - 1`, for offsets within
/// `1..=quals.len()`.
pub fn locate_in_read(read: &AlignedRead, pos: i64, params: &Params) -> Option<usize> {
    if read.is_duplicate {
        log::debug!("{}: duplicated read", read.id);
        if params.exclude_duplicates {
            return None;
        }
    }

    let cigar = read.cigar.as_ref()?;
    let offset = cigar.locate(pos);
    if offset <= NOT_COVERED {
        return None;
    }
    let offset = offset as usize;

    if let Some(quals) = &read.quals {
        if (1..=quals.len()).contains(&offset) && quals[offset - 1] <= LOW_BASEQ_CUTOFF {
            log::debug!("{}: low base quality before offset {}", read.id, offset);
            return None;
        }
    }

    Some(offset)
}
