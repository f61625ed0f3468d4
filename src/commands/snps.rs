use crate::cli::SnpsArgs;
use crate::commands::accumulate;
use crate::stats::SnpFrequencies;
use crate::utils::{get_sample_name, open_bam_reader, Result};
use crate::writers::ReportWriter;
use std::time;

pub fn snps(args: SnpsArgs) -> Result<()> {
    let start_timer = time::Instant::now();

    let mut reader = open_bam_reader(&args.reads_path, args.reference_path.as_deref())?;
    let sample_name = match args.sample_name {
        Some(sample_name) => sample_name,
        None => get_sample_name(&args.reads_path, &reader)?,
    };
    let mut report = ReportWriter::new(Some(&args.output_prefix), "snps.tsv", &sample_name)?;

    let mut stats = SnpFrequencies::new();
    let n_reads = accumulate(&mut stats, &mut reader, args.primary_only, args.max_reads)?;
    log::info!(
        "{}: {} variant bases in {} reads",
        sample_name,
        stats.total(),
        n_reads
    );

    report.write_snp_frequencies(&stats)?;
    report.into_inner()?;

    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}
