/// The kind of a candidate mutation, decoded from the table's type tag.
///
/// Tags other than `DEL` and `INS` (including unknown ones) are treated as
/// substitutions, which classify with the full three-way rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Substitution,
    Insertion,
    Deletion,
}

impl MutationKind {
    pub fn from_tag(tag: &str) -> MutationKind {
        match tag {
            "DEL" => MutationKind::Deletion,
            "INS" => MutationKind::Insertion,
            _ => MutationKind::Substitution,
        }
    }
}

/// A candidate mutation site: chromosome, 1-based position, alleles, kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mutation {
    pub chrom: String,
    pub pos: i64,
    pub ref_allele: String,
    pub alt_allele: String,
    pub kind: MutationKind,
}

impl Mutation {
    /// Number of reference bases to pad the fetch window with, so that
    /// indel-length alleles stay inside the queried region.
    pub fn span(&self) -> i64 {
        std::cmp::max(self.ref_allele.len(), self.alt_allele.len()) as i64
    }
}
