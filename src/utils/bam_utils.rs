use crate::utils::Result;
use rust_htslib::bam::{self, Read};
use std::{collections::HashSet, path::Path};

/// Checks that a BAM is openable, indexed, and carries @SQ lines.
///
/// Returns its header on success so callers can reuse it.
pub fn probe_bam(bam_path: &Path) -> Result<bam::Header> {
    let bam = bam::IndexedReader::from_path(bam_path)
        .map_err(|e| format!("Failed to create bam reader: {}", e))?;
    let header = bam::Header::from_template(bam.header());

    let text = String::from_utf8(header.to_bytes())
        .map_err(|e| format!("Malformed header in {}: {}", bam_path.display(), e))?;
    if !text.lines().any(|line| line.starts_with("@SQ")) {
        return Err(format!(
            "BAM {} has no @SQ lines and cannot be queried by region",
            bam_path.display()
        ));
    }

    Ok(header)
}

/// Resolves a sample name for a BAM: the @RG SM field when there is exactly
/// one, otherwise the file stem.
pub fn resolve_sample_name(bam_path: &Path, bam_header: &bam::Header) -> Result<String> {
    let header_hashmap = bam_header.to_hashmap();
    let mut sample_names = HashSet::new();

    if let Some(rg_fields) = header_hashmap.get("RG") {
        for rg_field in rg_fields {
            if let Some(sample_name) = rg_field.get("SM") {
                sample_names.insert(sample_name.to_owned());
            }
        }
    }

    match sample_names.len() {
        1 => return Ok(sample_names.into_iter().next().unwrap()),
        0 => log::warn!("No sample names found in {}", bam_path.display()),
        _ => log::warn!("Multiple sample names found in {}", bam_path.display()),
    };

    let sample = bam_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("Invalid reads file name")?
        .to_string();

    Ok(sample)
}
