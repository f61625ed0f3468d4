//! Defines the `CigarMdWriter` struct for writing the edit script of every read.

use crate::cigarmd::{AlignedRead, BuildError, EditScript, Status};
use crate::utils::{create_writer, Result};
use std::io::Write;

const HEADER: &str = "#read\tcigar\tmd\tstatus\tedit_script";

pub struct CigarMdWriter<W: Write> {
    writer: W,
}

impl CigarMdWriter<Box<dyn Write>> {
    pub fn new(output_prefix: Option<&str>) -> Result<CigarMdWriter<Box<dyn Write>>> {
        CigarMdWriter::from_writer(create_writer(output_prefix, "cigarmd.tsv")?)
    }
}

impl<W: Write> CigarMdWriter<W> {
    pub fn from_writer(mut writer: W) -> Result<CigarMdWriter<W>> {
        writeln!(writer, "{}", HEADER).map_err(|e| format!("Failed to write header: {}", e))?;
        Ok(CigarMdWriter { writer })
    }

    /// Writes one row; reads without a script get `*` in its place.
    pub fn write(
        &mut self,
        read: &AlignedRead,
        outcome: &std::result::Result<EditScript, BuildError>,
    ) -> Result<()> {
        let (status, script) = match outcome {
            Ok(script) => (Status::Ok, script.to_string()),
            Err(err) => (err.status(), "*".to_string()),
        };
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}",
            read.id,
            read.cigar_string(),
            read.md.as_deref().unwrap_or("*"),
            status,
            script
        )
        .map_err(|e| format!("Failed to write edit script of {}: {}", read.id, e))
    }

    pub fn into_inner(mut self) -> Result<W> {
        self.writer
            .flush()
            .map_err(|e| format!("Failed to flush edit scripts: {}", e))?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cigarmd::{build_edit_script, ReadFlags};

    #[test]
    fn rows_per_read() {
        let mut writer = CigarMdWriter::from_writer(Vec::new()).unwrap();
        let reads = [
            AlignedRead::from_strings("ok", "5M", Some("2A2"), "AACGT", ReadFlags::default()),
            AlignedRead::from_strings("no_md", "5M", None, "AACGT", ReadFlags::default()),
        ];
        for read in reads.iter() {
            let read = read.as_ref().unwrap();
            writer.write(read, &build_edit_script(read)).unwrap();
        }
        let text = String::from_utf8(writer.into_inner().unwrap()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], HEADER);
        assert_eq!(lines[1], "ok\t5M\t2A2\tOK\t2m1uAC2m");
        assert_eq!(lines[2], "no_md\t5M\t*\tMISSING_ANNOTATION\t*");
    }
}
