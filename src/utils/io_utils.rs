use crate::utils::Result;
use std::{
    fs::File,
    io::{self, BufWriter, Write},
};

/// Opens `<output_prefix>.<output_suffix>` for writing, or stdout when no prefix is given.
pub fn create_writer(output_prefix: Option<&str>, output_suffix: &str) -> Result<Box<dyn Write>> {
    match output_prefix {
        Some(prefix) => {
            let output_path = format!("{}.{}", prefix, output_suffix);
            let file = File::create(&output_path)
                .map_err(|e| format!("Failed to create {}: {}", output_path, e))?;
            log::debug!("Writing to {}", output_path);
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout()))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writer_is_created_from_prefix_and_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let prefix = dir.path().join("sample");
        let prefix = prefix.to_str().unwrap();
        {
            let mut writer = create_writer(Some(prefix), "report.tsv").unwrap();
            writeln!(writer, "hello").unwrap();
        }
        let written = std::fs::read_to_string(format!("{}.report.tsv", prefix)).unwrap();
        assert_eq!(written, "hello\n");
    }

    #[test]
    fn missing_directory_is_reported() {
        let result = create_writer(Some("/nonexistent/dir/sample"), "tsv");
        assert!(result.is_err());
    }
}
