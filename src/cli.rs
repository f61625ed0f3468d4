use crate::utils::Result;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="bamvar",
          author="Egor Dolzhenko <edolzhenko@pacificbiosciences.com>\nGuilherme De Sena Brandine <gbrandine@pacificbiosciences.com>\nTom Mokveld <tmokveld@pacificbiosciences.com>",
          version=&**FULL_VERSION,
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2004-{}     Pacific Biosciences of California, Inc.
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{author}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Substitution and indel statistics per mate and read position")]
    Variants(VariantsArgs),
    #[clap(about = "Overall substitution and indel frequencies")]
    Snps(SnpsArgs),
    #[clap(about = "Edit script of every read")]
    Cigarmd(CigarmdArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("variants")))]
#[command(arg_required_else_help(true))]
pub struct VariantsArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "SAM, BAM or CRAM file with aligned reads carrying MD tags")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 'g')]
    #[clap(long = "reference")]
    #[clap(help = "Reference genome FASTA, required to decode CRAM")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub reference_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "sample-name")]
    #[clap(value_name = "SAMPLE_NAME")]
    #[clap(help = "Sample name")]
    #[clap(default_value = None)]
    #[arg(value_parser = check_sample_name_nonempty)]
    pub sample_name: Option<String>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "initial-positions")]
    #[clap(value_name = "POSITIONS")]
    #[clap(help = "Initial number of read positions tracked, grown as longer reads are seen")]
    #[clap(default_value = "150")]
    #[arg(value_parser = positive_count)]
    pub initial_positions: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "primary-only")]
    #[clap(help = "Skip secondary and supplementary alignments")]
    pub primary_only: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-reads")]
    #[clap(value_name = "MAX_READS")]
    #[clap(help = "Stop after this many reads")]
    #[arg(value_parser = positive_count)]
    pub max_reads: Option<usize>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("snps")))]
#[command(arg_required_else_help(true))]
pub struct SnpsArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "SAM, BAM or CRAM file with aligned reads carrying MD tags")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 'g')]
    #[clap(long = "reference")]
    #[clap(help = "Reference genome FASTA, required to decode CRAM")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub reference_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "sample-name")]
    #[clap(value_name = "SAMPLE_NAME")]
    #[clap(help = "Sample name")]
    #[clap(default_value = None)]
    #[arg(value_parser = check_sample_name_nonempty)]
    pub sample_name: Option<String>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "primary-only")]
    #[clap(help = "Skip secondary and supplementary alignments")]
    pub primary_only: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-reads")]
    #[clap(value_name = "MAX_READS")]
    #[clap(help = "Stop after this many reads")]
    #[arg(value_parser = positive_count)]
    pub max_reads: Option<usize>,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("cigarmd")))]
#[command(arg_required_else_help(true))]
pub struct CigarmdArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "SAM, BAM or CRAM file with aligned reads carrying MD tags")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for the output file, stdout if omitted")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: Option<String>,

    #[clap(short = 'g')]
    #[clap(long = "reference")]
    #[clap(help = "Reference genome FASTA, required to decode CRAM")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub reference_path: Option<PathBuf>,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "primary-only")]
    #[clap(help = "Skip secondary and supplementary alignments")]
    pub primary_only: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "max-reads")]
    #[clap(value_name = "MAX_READS")]
    #[clap(help = "Stop after this many reads")]
    #[arg(value_parser = positive_count)]
    pub max_reads: Option<usize>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn positive_count(s: &str) -> Result<usize> {
    let count: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid count", s))?;
    if count >= 1 {
        Ok(count)
    } else {
        Err("Value must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn check_sample_name_nonempty(s: &str) -> Result<String> {
    if s.trim().is_empty() {
        Err("Sample name cannot be an empty string".to_string())
    } else {
        Ok(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_counts() {
        assert_eq!(positive_count("150"), Ok(150));
        assert!(positive_count("0").is_err());
        assert!(positive_count("-3").is_err());
        assert!(positive_count("many").is_err());
    }

    #[test]
    fn prefix_in_missing_directory() {
        assert!(check_prefix_path("sample").is_ok());
        assert!(check_prefix_path("/nonexistent/dir/sample").is_err());
    }

    #[test]
    fn variants_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let reads = dir.path().join("reads.sam");
        std::fs::write(&reads, "").unwrap();
        let cli = Cli::try_parse_from([
            "bamvar",
            "-vv",
            "variants",
            "--reads",
            reads.to_str().unwrap(),
            "--output-prefix",
            "out",
        ])
        .unwrap();
        assert_eq!(cli.verbosity, 2);
        match cli.command {
            Command::Variants(args) => {
                assert_eq!(args.initial_positions, 150);
                assert!(!args.primary_only);
                assert_eq!(args.max_reads, None);
                assert_eq!(args.reference_path, None);
            }
            _ => panic!("expected the variants subcommand"),
        }
    }
}
