//! Residual history in Tecplot ASCII format.

use crate::ResultsResult;
use crate::sci::Sci;
use cf_solver::IterationReport;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const HEADER: &str = "TITLE = \"Cavity Iterative Residual History\"\n\
variables=\"Iteration\"\"Time(s)\"\"Res1\"\"Res2\"\"Res3\"\n";

/// Appends one `iteration time res1 res2 res3` line per report.
pub struct HistoryWriter<W: Write> {
    out: W,
}

impl HistoryWriter<BufWriter<File>> {
    /// Truncate `path` and write the header.
    pub fn create(path: &Path) -> ResultsResult<Self> {
        Self::new(BufWriter::new(File::create(path)?))
    }
}

impl<W: Write> HistoryWriter<W> {
    pub fn new(mut out: W) -> ResultsResult<Self> {
        out.write_all(HEADER.as_bytes())?;
        Ok(Self { out })
    }

    pub fn record(&mut self, report: &IterationReport) -> ResultsResult<()> {
        let [r1, r2, r3] = report.residuals.0;
        writeln!(
            self.out,
            "{} {} {} {} {}",
            report.iteration,
            Sci(report.time),
            Sci(r1),
            Sci(r2),
            Sci(r3)
        )?;
        // Keep the file readable while the run is still going
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_solver::Residuals;

    #[test]
    fn writes_header_then_one_line_per_report() {
        let mut writer = HistoryWriter::new(Vec::new()).unwrap();
        for n in [1, 10] {
            writer
                .record(&IterationReport {
                    iteration: n,
                    time: 0.5 * n as f64,
                    dt_min: 0.5,
                    residuals: Residuals([1.0, 2.0e-3, 3.0e-5]),
                    ratio: 1.0,
                    pressure_shift: 0.0,
                    stop: false,
                })
                .unwrap();
        }
        let text = String::from_utf8(writer.into_inner()).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("TITLE"));
        assert_eq!(lines[2], "1 5.000000e-01 1.000000e+00 2.000000e-03 3.000000e-05");
        assert!(lines[3].starts_with("10 5.000000e+00 "));
    }
}
