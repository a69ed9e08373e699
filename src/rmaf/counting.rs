//! Allele classification and per-site support tallies.

use super::mutation::{Mutation, MutationKind};

/// Which bucket a single read falls into at a mutation site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlleleCall {
    Ref,
    Alt,
    Noise,
}

/// Decides which allele a read supports at `offset`, the read-local offset
/// the coordinate mapper produced for the mutation position.
///
/// The observed slice is always `ref_allele.len()` bases long (clamped at
/// the read end), including for insertion comparisons where the alternate
/// allele is longer. Deletions and insertions classify two ways only: a
/// read at a deletion site is evidence either of the deleted or of the
/// non-deleted state, and a third bucket is deliberately not modeled.
///
/// Callers must ensure `offset < bases.len()`; reads whose offset falls at
/// or past the read end are skipped upstream and never classified.
pub fn classify(bases: &[u8], offset: usize, mutation: &Mutation) -> AlleleCall {
    let end = (offset + mutation.ref_allele.len()).min(bases.len());
    let observed = &bases[offset..end];
    let matches_ref = observed == mutation.ref_allele.as_bytes();
    let matches_alt = observed == mutation.alt_allele.as_bytes();

    match mutation.kind {
        MutationKind::Deletion => {
            if matches_ref {
                AlleleCall::Ref
            } else {
                AlleleCall::Alt
            }
        }
        MutationKind::Insertion => {
            if matches_alt {
                AlleleCall::Alt
            } else {
                AlleleCall::Ref
            }
        }
        MutationKind::Substitution => {
            if matches_ref {
                AlleleCall::Ref
            } else if matches_alt {
                AlleleCall::Alt
            } else {
                AlleleCall::Noise
            }
        }
    }
}

/// Read-support counts for one mutation site in one sample.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SupportCounts {
    pub ref_count: u32,
    pub alt_count: u32,
    pub noise_count: u32,
}

impl SupportCounts {
    pub fn record(&mut self, call: AlleleCall) {
        match call {
            AlleleCall::Ref => self.ref_count += 1,
            AlleleCall::Alt => self.alt_count += 1,
            AlleleCall::Noise => self.noise_count += 1,
        }
    }
}

/// Outcome of evaluating one mutation against one sample.
///
/// `Unavailable` means the alignment source could not be queried at all
/// (unknown chromosome after the `chr` retry, unreadable file, failed
/// fetch); it is distinct from a legitimate all-zero tally so that callers
/// cannot conflate "no supporting reads" with "could not look".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SiteSupport {
    Counted(SupportCounts),
    Unavailable,
}

impl SiteSupport {
    /// The three output-table fields, `NA` for an unavailable site.
    pub fn fields(&self) -> [String; 3] {
        match self {
            SiteSupport::Counted(counts) => [
                counts.ref_count.to_string(),
                counts.alt_count.to_string(),
                counts.noise_count.to_string(),
            ],
            SiteSupport::Unavailable => ["NA".into(), "NA".into(), "NA".into()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rmaf::mutation::MutationKind;

    fn mutation(ref_allele: &str, alt_allele: &str, kind: MutationKind) -> Mutation {
        Mutation {
            chrom: "1".to_string(),
            pos: 100,
            ref_allele: ref_allele.to_string(),
            alt_allele: alt_allele.to_string(),
            kind,
        }
    }

    #[test]
    fn substitution_is_three_way() {
        let m = mutation("A", "G", MutationKind::Substitution);
        assert_eq!(classify(b"CCACC", 2, &m), AlleleCall::Ref);
        assert_eq!(classify(b"CCGCC", 2, &m), AlleleCall::Alt);
        assert_eq!(classify(b"CCTCC", 2, &m), AlleleCall::Noise);
    }

    #[test]
    fn deletion_is_binary() {
        // ref "AT" present -> reference state; anything else -> deleted.
        let m = mutation("AT", "A", MutationKind::Deletion);
        assert_eq!(classify(b"CATC", 1, &m), AlleleCall::Ref);
        assert_eq!(classify(b"CACC", 1, &m), AlleleCall::Alt);
        assert_eq!(classify(b"CGGC", 1, &m), AlleleCall::Alt);
    }

    #[test]
    fn insertion_is_binary_and_slices_by_ref_length() {
        // The observed slice is one base long (the ref allele length), so it
        // can never equal the two-base alt allele; everything counts as REF.
        let m = mutation("A", "AT", MutationKind::Insertion);
        assert_eq!(classify(b"CATC", 1, &m), AlleleCall::Ref);
        assert_eq!(classify(b"CGGC", 1, &m), AlleleCall::Ref);
        // A same-length alt is reachable.
        let m = mutation("AT", "GC", MutationKind::Insertion);
        assert_eq!(classify(b"CGCC", 1, &m), AlleleCall::Alt);
    }

    #[test]
    fn observed_slice_is_clamped_at_read_end() {
        let m = mutation("ATT", "A", MutationKind::Substitution);
        // Only two of the three ref bases fit; the truncated slice matches
        // neither allele.
        assert_eq!(classify(b"CCAT", 2, &m), AlleleCall::Noise);
    }

    #[test]
    fn tally_accumulates_by_bucket() {
        let mut counts = SupportCounts::default();
        counts.record(AlleleCall::Ref);
        counts.record(AlleleCall::Ref);
        counts.record(AlleleCall::Alt);
        counts.record(AlleleCall::Noise);
        assert_eq!(
            counts,
            SupportCounts {
                ref_count: 2,
                alt_count: 1,
                noise_count: 1
            }
        );
    }

    #[test]
    fn unavailable_renders_as_na() {
        assert_eq!(SiteSupport::Unavailable.fields(), ["NA", "NA", "NA"]);
        let counted = SiteSupport::Counted(SupportCounts {
            ref_count: 3,
            alt_count: 0,
            noise_count: 1,
        });
        assert_eq!(counted.fields(), ["3", "0", "1"]);
    }
}
