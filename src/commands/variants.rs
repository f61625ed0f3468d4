use crate::cli::VariantsArgs;
use crate::commands::accumulate;
use crate::stats::VariantCallDetection;
use crate::utils::{get_sample_name, open_bam_reader, Result};
use crate::writers::ReportWriter;
use std::time;

pub fn variants(args: VariantsArgs) -> Result<()> {
    let start_timer = time::Instant::now();

    let mut reader = open_bam_reader(&args.reads_path, args.reference_path.as_deref())?;
    let sample_name = match args.sample_name {
        Some(sample_name) => sample_name,
        None => get_sample_name(&args.reads_path, &reader)?,
    };
    let mut report = ReportWriter::new(Some(&args.output_prefix), "variants.tsv", &sample_name)?;

    let mut stats = VariantCallDetection::new(args.initial_positions);
    let n_reads = accumulate(&mut stats, &mut reader, args.primary_only, args.max_reads)?;

    let reads = stats.read_counts();
    log::info!(
        "{}: processed {} of {} reads ({} skipped)",
        sample_name,
        reads.processed(),
        n_reads,
        reads.skipped
    );
    if reads.inconsistent > 0 {
        log::warn!(
            "{} reads with inconsistent CIGAR and MD tag were skipped",
            reads.inconsistent
        );
    }
    if stats.is_empty() {
        log::warn!("No read contributed to the statistics");
    }

    report.write_variant_calls(&stats)?;
    report.into_inner()?;

    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}
