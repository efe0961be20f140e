use std::io::Write;

use crate::error::DiffError;
use crate::eval::RunReport;

/// Write the run report as pretty-printed JSON.
pub fn write_json(report: &RunReport, writer: &mut impl Write) -> Result<(), DiffError> {
    serde_json::to_writer_pretty(&mut *writer, report)
        .map_err(|e| DiffError::Report(std::io::Error::other(e.to_string())))?;
    writeln!(writer).map_err(DiffError::Report)
}
