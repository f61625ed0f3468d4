//! Defines the `ReportWriter` struct for writing accumulated statistics as sectioned TSV.
//!
//! A report starts with `##` metadata lines. Each section is introduced by a `#<name>` line
//! followed by a column header and tab-separated rows.

use crate::cigarmd::MateSegment;
use crate::stats::{BaseCounts, ReadCounts, SnpFrequencies, SubstitutionTable, VariantCallDetection};
use crate::utils::{create_writer, percentage, Result};
use itertools::Itertools;
use std::{env, fmt::Display, io::Write};

pub struct ReportWriter<W: Write> {
    writer: W,
}

impl ReportWriter<Box<dyn Write>> {
    /// Constructs a `ReportWriter` for `<output_prefix>.<output_suffix>`, or stdout when no
    /// prefix is given.
    pub fn new(
        output_prefix: Option<&str>,
        output_suffix: &str,
        sample_name: &str,
    ) -> Result<ReportWriter<Box<dyn Write>>> {
        let writer = create_writer(output_prefix, output_suffix)?;
        ReportWriter::from_writer(writer, sample_name)
    }
}

impl<W: Write> ReportWriter<W> {
    /// Wraps `writer` and writes the metadata lines.
    pub fn from_writer(writer: W, sample_name: &str) -> Result<ReportWriter<W>> {
        let mut report = ReportWriter { writer };
        report.write_line(&format!(
            "##{}Version={}",
            env!("CARGO_PKG_NAME"),
            *crate::cli::FULL_VERSION
        ))?;
        let command_line = env::args().join(" ");
        report.write_line(&format!("##{}Command={}", env!("CARGO_PKG_NAME"), command_line))?;
        report.write_line(&format!("##sample={}", sample_name))?;
        Ok(report)
    }

    /// Writes the full report of the mate and position resolved statistics.
    ///
    /// Totals must have been finalized.
    pub fn write_variant_calls(&mut self, stats: &VariantCallDetection) -> Result<()> {
        self.write_section("summary", &["key", "value"])?;
        self.write_read_counts(stats.read_counts())?;
        let total = stats.total();
        let summary: [(&str, String); 15] = [
            ("total_bases", total.to_string()),
            ("matches", stats.total_matches().to_string()),
            ("substitutions", stats.total_mutations().to_string()),
            ("insertions", stats.total_insertions().to_string()),
            ("deletions", stats.total_deletions().to_string()),
            ("soft_clipped", stats.soft_clipped().to_string()),
            ("hard_clipped", stats.hard_clipped().to_string()),
            ("padding", stats.padding().to_string()),
            ("skipped_region", stats.skipped_region().to_string()),
            ("unknown_reference_bases", stats.unknown_reference_bases().to_string()),
            ("unknown_read_bases", stats.unknown_read_bases().to_string()),
            (
                "substitution_pct",
                format!("{:.4}", percentage(stats.total_mutations(), total)),
            ),
            (
                "insertion_pct",
                format!("{:.4}", percentage(stats.total_insertions(), total)),
            ),
            (
                "deletion_pct",
                format!("{:.4}", percentage(stats.total_deletions(), total)),
            ),
            ("paired_reads", stats.exist_paired_reads().to_string()),
        ];
        for (key, value) in summary.iter() {
            self.write_row([*key, value.as_str()])?;
        }

        self.write_section("substitutions", &["mate", "ref", "alt", "count", "pct"])?;
        let first = stats.substitutions(MateSegment::First);
        self.write_substitutions(MateSegment::First.name(), first)?;
        if stats.exist_paired_reads() {
            let second = stats.substitutions(MateSegment::Second);
            self.write_substitutions(MateSegment::Second.name(), second)?;
            self.write_substitutions("both", &first.merged(second))?;
        }

        self.write_indel_bases(stats.inserted_bases(), stats.deleted_bases())?;

        self.write_section(
            "positions",
            &[
                "position",
                "matches",
                "first_snp",
                "first_ins",
                "first_del",
                "second_snp",
                "second_ins",
                "second_del",
                "total",
                "reads_covering",
            ],
        )?;
        let first = stats.mate(MateSegment::First);
        let second = stats.mate(MateSegment::Second);
        for pos in 0..stats.reported_len() {
            self.write_row([
                pos as u64,
                stats.match_positions().get(pos),
                first.snp_pos.get(pos),
                first.insertion_pos.get(pos),
                first.deletion_pos.get(pos),
                second.snp_pos.get(pos),
                second.insertion_pos.get(pos),
                second.deletion_pos.get(pos),
                stats.total_positions().get(pos),
                stats.reads_covering_position(pos),
            ])?;
        }
        Ok(())
    }

    /// Writes the report of the overall frequencies.
    pub fn write_snp_frequencies(&mut self, stats: &SnpFrequencies) -> Result<()> {
        self.write_section("summary", &["key", "value"])?;
        self.write_read_counts(stats.read_counts())?;
        let summary = [
            ("total_variants", stats.total()),
            ("matches", stats.total_matches()),
            ("substitutions", stats.total_mutations()),
            ("insertions", stats.total_insertions()),
            ("deletions", stats.total_deletions()),
            ("skipped_region", stats.skipped_region()),
            ("unknown_reference_bases", stats.unknown_reference_bases()),
            ("unknown_read_bases", stats.unknown_read_bases()),
        ];
        for (key, value) in summary.iter() {
            self.write_row([key.to_string(), value.to_string()])?;
        }

        self.write_section("substitutions", &["mate", "ref", "alt", "count", "pct"])?;
        self.write_substitutions("all", stats.substitutions())?;
        self.write_indel_bases(stats.inserted_bases(), stats.deleted_bases())
    }

    /// Flushes and hands back the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush report: {}", e))?;
        Ok(self.writer)
    }

    fn write_read_counts(&mut self, reads: &ReadCounts) -> Result<()> {
        let counts = [
            ("total_reads", reads.total),
            ("processed_reads", reads.processed()),
            ("skipped_reads", reads.skipped),
            ("unmapped", reads.unmapped),
            ("missing_annotation", reads.missing_annotation),
            ("missing_operator_string", reads.missing_operator_string),
            ("inconsistent_encoding", reads.inconsistent),
            ("unsupported_operator", reads.unsupported),
        ];
        for (key, value) in counts.iter() {
            self.write_row([key.to_string(), value.to_string()])?;
        }
        Ok(())
    }

    fn write_substitutions(&mut self, mate: &str, table: &SubstitutionTable) -> Result<()> {
        let total = table.total();
        for (reference, read, count) in table.iter() {
            self.write_row([
                mate.to_string(),
                (reference as char).to_string(),
                (read as char).to_string(),
                count.to_string(),
                format!("{:.4}", percentage(count, total)),
            ])?;
        }
        Ok(())
    }

    fn write_indel_bases(&mut self, inserted: &BaseCounts, deleted: &BaseCounts) -> Result<()> {
        self.write_section("indel_bases", &["base", "insertions", "deletions"])?;
        for ((base, n_ins), (_, n_del)) in inserted.iter().zip(deleted.iter()) {
            self.write_row([(base as char).to_string(), n_ins.to_string(), n_del.to_string()])?;
        }
        Ok(())
    }

    fn write_section(&mut self, name: &str, columns: &[&str]) -> Result<()> {
        self.write_line(&format!("#{}", name))?;
        self.write_row(columns)
    }

    fn write_row<I>(&mut self, fields: I) -> Result<()>
    where
        I: IntoIterator,
        I::Item: Display,
    {
        let line = fields.into_iter().join("\t");
        self.write_line(&line)
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer, "{}", line).map_err(|e| format!("Failed to write report: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cigarmd::EditScript;
    use crate::stats::ReadStatistics;

    fn section<'a>(report: &'a str, name: &str) -> Vec<&'a str> {
        let header = format!("#{}", name);
        report
            .lines()
            .skip_while(|line| *line != header)
            .skip(2)
            .take_while(|line| !line.starts_with('#'))
            .collect()
    }

    #[test]
    fn variant_report_sections() {
        let mut stats = VariantCallDetection::new(2);
        let script: EditScript = "1m1uAC1m".parse().unwrap();
        stats.observe(&script, MateSegment::First, 3);
        stats.finalize_totals();

        let mut report = ReportWriter::from_writer(Vec::new(), "sample1").unwrap();
        report.write_variant_calls(&stats).unwrap();
        let bytes = report.into_inner().unwrap();
        let text = String::from_utf8(bytes).unwrap();

        assert!(text.starts_with("##bamvarVersion="));
        assert!(text.contains("##sample=sample1\n"));
        let summary = section(&text, "summary");
        assert!(summary.contains(&"total_reads\t1"));
        assert!(summary.contains(&"substitutions\t1"));
        assert!(summary.contains(&"paired_reads\tfalse"));

        let substitutions = section(&text, "substitutions");
        assert_eq!(substitutions.len(), 12);
        assert_eq!(substitutions[0], "first\tA\tC\t1\t100.0000");

        let positions = section(&text, "positions");
        assert_eq!(
            positions,
            vec![
                "0\t1\t0\t0\t0\t0\t0\t0\t1\t1",
                "1\t0\t1\t0\t0\t0\t0\t0\t1\t1",
                "2\t1\t0\t0\t0\t0\t0\t0\t1\t1",
            ]
        );
    }

    #[test]
    fn paired_substitutions() {
        let mut stats = VariantCallDetection::new(2);
        let script: EditScript = "1uTA".parse().unwrap();
        stats.observe(&script, MateSegment::First, 1);
        stats.observe(&script, MateSegment::Second, 1);
        stats.finalize_totals();

        let mut report = ReportWriter::from_writer(Vec::new(), "paired").unwrap();
        report.write_variant_calls(&stats).unwrap();
        let text = String::from_utf8(report.into_inner().unwrap()).unwrap();
        let substitutions = section(&text, "substitutions");
        assert_eq!(substitutions.len(), 36);
        assert!(substitutions.contains(&"second\tT\tA\t1\t100.0000"));
        assert!(substitutions.contains(&"both\tT\tA\t2\t100.0000"));
    }

    #[test]
    fn snp_report_sections() {
        let mut stats = SnpFrequencies::new();
        let script: EditScript = "2m1iT".parse().unwrap();
        stats.observe(&script, MateSegment::Second, 3);

        let mut report = ReportWriter::from_writer(Vec::new(), "s").unwrap();
        report.write_snp_frequencies(&stats).unwrap();
        let text = String::from_utf8(report.into_inner().unwrap()).unwrap();

        assert!(section(&text, "summary").contains(&"insertions\t1"));
        assert!(section(&text, "substitutions")
            .iter()
            .all(|row| row.starts_with("all\t") && row.ends_with("\t0\t0.0000")));
        assert_eq!(
            section(&text, "indel_bases"),
            vec!["A\t0\t0", "C\t0\t0", "G\t0\t0", "T\t1\t0", "N\t0\t0"]
        );
    }
}
