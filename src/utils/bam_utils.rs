use crate::cigarmd::AlignedRead;
use crate::utils::Result;
use rust_htslib::bam::{self, Read, Record};
use std::{collections::HashSet, path::Path};

/// Opens a SAM, BAM or CRAM file for a sequential scan.
pub fn open_bam_reader(reads_path: &Path, reference_path: Option<&Path>) -> Result<bam::Reader> {
    let mut reader = bam::Reader::from_path(reads_path)
        .map_err(|e| format!("Failed to create bam reader: {}", e))?;
    if let Some(reference_path) = reference_path {
        reader.set_reference(reference_path).map_err(|e| {
            format!(
                "Failed to set reference {}: {}",
                reference_path.display(),
                e
            )
        })?;
    }
    if !is_bam_mapped(&bam::Header::from_template(reader.header())) {
        log::warn!(
            "{} has no @SQ lines, every read is expected to be unmapped",
            reads_path.display()
        );
    }
    Ok(reader)
}

fn is_bam_mapped(bam_header: &bam::Header) -> bool {
    String::from_utf8_lossy(&bam_header.to_bytes())
        .lines()
        .any(|line| line.starts_with("@SQ"))
}

pub fn get_sample_name(reads_path: &Path, reader: &bam::Reader) -> Result<String> {
    let header_hashmap = bam::Header::from_template(reader.header()).to_hashmap();
    let mut sample_names = HashSet::new();

    if let Some(rg_fields) = header_hashmap.get("RG") {
        for rg_field in rg_fields {
            if let Some(sample_name) = rg_field.get("SM") {
                sample_names.insert(sample_name.to_owned());
            }
        }
    }

    if sample_names.len() == 1 {
        if let Some(sample_name) = sample_names.into_iter().next() {
            return Ok(sample_name);
        }
    } else if sample_names.is_empty() {
        log::debug!("No sample names found, falling back to the file name");
    } else {
        log::warn!("Multiple sample names found, falling back to the file name");
    }

    let sample = reads_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("Invalid reads file name")?
        .to_string();

    Ok(sample)
}

/// Converts the records of `reader` into `AlignedRead`s and hands them to `f` in file order.
///
/// Secondary and supplementary alignments are passed over when `primary_only` is set. Reading
/// stops after `max_reads` reads when a limit is given. Returns the number of reads handed over.
pub fn stream_reads<F>(
    reader: &mut bam::Reader,
    primary_only: bool,
    max_reads: Option<usize>,
    mut f: F,
) -> Result<usize>
where
    F: FnMut(AlignedRead) -> Result<()>,
{
    let mut n_reads = 0;
    let mut n_filt = 0;
    let mut record = Record::new();
    while max_reads.map_or(true, |max_reads| n_reads < max_reads) {
        match reader.read(&mut record) {
            Some(Ok(_)) => {
                if primary_only && (record.is_secondary() || record.is_supplementary()) {
                    n_filt += 1;
                    continue;
                }
                f(AlignedRead::from_hts_rec(&record))?;
                n_reads += 1;
            }
            Some(Err(err)) => Err(format!("Failed to read record: {}", err))?,
            None => break,
        }
    }
    if n_filt > 0 {
        log::info!("Passed over {} secondary/supplementary alignments", n_filt);
    }
    Ok(n_reads)
}
