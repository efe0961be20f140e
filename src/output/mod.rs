pub mod json;
pub mod pretty;

use std::io::Write;

use crate::cli::OutputFormat;
use crate::error::DiffError;
use crate::eval::RunReport;

/// Write the run report in the specified format.
pub fn write_report(
    report: &RunReport,
    format: OutputFormat,
    writer: &mut impl Write,
) -> Result<(), DiffError> {
    match format {
        OutputFormat::Pretty => pretty::write_pretty(report, writer),
        OutputFormat::Json => json::write_json(report, writer),
    }
}
