mod write_cigarmd;
mod write_report;

pub use write_cigarmd::CigarMdWriter;
pub use write_report::ReportWriter;
