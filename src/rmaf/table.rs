//! Parsing of the tabular mutation list.
//!
//! The table is CSV with a header row; the required columns may sit in any
//! order and any extra columns ride along untouched into the output.

use super::mutation::{Mutation, MutationKind};
use crate::utils::Result;
use csv::StringRecord;
use std::{fs::File, io, path::Path};

/// Columns appended to the output table, in order.
pub const EXTRA_COLUMNS: [&str; 3] = ["ref_alleles", "alt_alleles", "other_alleles"];

const REQUIRED_COLUMNS: [&str; 6] = ["chr", "pos", "ref", "alt", "var", "sample_id"];

#[derive(Debug, Clone, Copy)]
struct Columns {
    chrom: usize,
    pos: usize,
    ref_allele: usize,
    alt_allele: usize,
    kind: usize,
    sample: usize,
}

impl Columns {
    fn from_header(header: &StringRecord) -> Result<Columns> {
        let index_of = |name: &str| {
            header
                .iter()
                .position(|field| field == name)
                .ok_or_else(|| format!("Mutation table is missing required column '{}'", name))
        };
        Ok(Columns {
            chrom: index_of(REQUIRED_COLUMNS[0])?,
            pos: index_of(REQUIRED_COLUMNS[1])?,
            ref_allele: index_of(REQUIRED_COLUMNS[2])?,
            alt_allele: index_of(REQUIRED_COLUMNS[3])?,
            kind: index_of(REQUIRED_COLUMNS[4])?,
            sample: index_of(REQUIRED_COLUMNS[5])?,
        })
    }
}

#[derive(Debug)]
pub struct MutationTable {
    pub header: StringRecord,
    columns: Columns,
    pub rows: Vec<StringRecord>,
}

impl MutationTable {
    pub fn open(path: &Path) -> Result<MutationTable> {
        let file =
            File::open(path).map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
        Self::read_from(file)
    }

    pub fn read_from(reader: impl io::Read) -> Result<MutationTable> {
        let mut table_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        let header = table_reader
            .headers()
            .map_err(|e| format!("Failed to read the mutation table header: {}", e))?
            .clone();
        let columns = Columns::from_header(&header)?;

        let mut rows = Vec::new();
        for (index, row) in table_reader.records().enumerate() {
            let row =
                row.map_err(|e| format!("Error at mutation table line {}: {}", index + 2, e))?;
            rows.push(row);
        }

        Ok(MutationTable {
            header,
            columns,
            rows,
        })
    }

    /// Decodes row `index` into a [`Mutation`]; an unparseable position is
    /// a fatal, line-numbered error.
    pub fn mutation(&self, index: usize) -> Result<Mutation> {
        let row = &self.rows[index];
        let field = |column: usize| row.get(column).unwrap_or("").to_string();

        let pos_field = field(self.columns.pos);
        let pos: i64 = pos_field.parse().map_err(|_| {
            format!(
                "Error at mutation table line {}: invalid position '{}'",
                index + 2,
                pos_field
            )
        })?;

        Ok(Mutation {
            chrom: field(self.columns.chrom),
            pos,
            ref_allele: field(self.columns.ref_allele),
            alt_allele: field(self.columns.alt_allele),
            kind: MutationKind::from_tag(&field(self.columns.kind)),
        })
    }

    pub fn sample(&self, index: usize) -> &str {
        self.rows[index].get(self.columns.sample).unwrap_or("")
    }

    pub fn sample_column(&self) -> usize {
        self.columns.sample
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TABLE: &str = "\
sample_id,chr,pos,ref,alt,var,gene
s1,1,1000,A,G,SNP,TP53
s2,chr2,500,AT,A,DEL,BRCA1
";

    #[test]
    fn parses_rows_with_reordered_and_extra_columns() {
        let table = MutationTable::read_from(TABLE.as_bytes()).unwrap();
        assert_eq!(table.rows.len(), 2);
        assert_eq!(table.sample(0), "s1");
        assert_eq!(table.sample(1), "s2");

        let first = table.mutation(0).unwrap();
        assert_eq!(first.chrom, "1");
        assert_eq!(first.pos, 1000);
        assert_eq!(first.ref_allele, "A");
        assert_eq!(first.alt_allele, "G");
        assert_eq!(first.kind, MutationKind::Substitution);

        let second = table.mutation(1).unwrap();
        assert_eq!(second.kind, MutationKind::Deletion);
    }

    #[test]
    fn missing_required_column_is_an_error() {
        let err = MutationTable::read_from("chr,pos,ref,alt,var\n".as_bytes()).unwrap_err();
        assert!(err.contains("sample_id"));
    }

    #[test]
    fn invalid_position_reports_line_number() {
        let table =
            MutationTable::read_from("chr,pos,ref,alt,var,sample_id\n1,abc,A,G,SNP,s1\n".as_bytes())
                .unwrap();
        let err = table.mutation(0).unwrap_err();
        assert!(err.contains("line 2"));
        assert!(err.contains("abc"));
    }
}
