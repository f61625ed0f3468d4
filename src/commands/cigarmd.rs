use crate::cigarmd::build_edit_script;
use crate::cli::CigarmdArgs;
use crate::utils::{open_bam_reader, stream_reads, Result};
use crate::writers::CigarMdWriter;
use std::time;

pub fn cigarmd(args: CigarmdArgs) -> Result<()> {
    let start_timer = time::Instant::now();

    let mut reader = open_bam_reader(&args.reads_path, args.reference_path.as_deref())?;
    let mut writer = CigarMdWriter::new(args.output_prefix.as_deref())?;

    let mut n_failed = 0;
    let n_reads = stream_reads(&mut reader, args.primary_only, args.max_reads, |read| {
        let outcome = build_edit_script(&read);
        if outcome.is_err() {
            n_failed += 1;
        }
        writer.write(&read, &outcome)
    })?;
    writer.into_inner()?;

    log::info!("Wrote {} edit scripts, {} reads failed", n_reads, n_failed);
    log::info!("Total execution time: {:.2?}", start_timer.elapsed());
    Ok(())
}
