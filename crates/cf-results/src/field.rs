//! Tecplot POINT-zone field snapshots (`cavity.dat`).

use crate::ResultsResult;
use crate::sci::Sci;
use cf_solver::Snapshot;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

const TITLE: &str = "TITLE = \"Cavity Field Data\"";
const PRIMITIVE_VARS: &str = "variables=\"x(m)\"\"y(m)\"\"p(N/m^2)\"\"u(m/s)\"\"v(m/s)\"";
const MMS_VARS: &str = "\"p-exact\"\"u-exact\"\"v-exact\"\"DE-p\"\"DE-u\"\"DE-v\"";

/// Writes one zone per snapshot.
///
/// The variable list is fixed by the first zone: manufactured runs carry the
/// exact solution and the discretization error next to the primitive variables.
pub struct FieldWriter<W: Write> {
    out: W,
    header_written: bool,
}

impl FieldWriter<BufWriter<File>> {
    pub fn create(path: &Path) -> ResultsResult<Self> {
        Ok(Self::new(BufWriter::new(File::create(path)?)))
    }
}

impl<W: Write> FieldWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            header_written: false,
        }
    }

    pub fn write_zone(&mut self, snapshot: &Snapshot<'_>) -> ResultsResult<()> {
        let grid = snapshot.grid;
        if !self.header_written {
            writeln!(self.out, "{TITLE}")?;
            match snapshot.exact {
                Some(_) => writeln!(self.out, "{PRIMITIVE_VARS}{MMS_VARS}")?,
                None => writeln!(self.out, "{PRIMITIVE_VARS}")?,
            }
            self.header_written = true;
        }

        writeln!(self.out, "zone T=\"n={}\"", snapshot.iteration)?;
        writeln!(self.out, "I= {} J= {}", grid.imax, grid.jmax)?;
        writeln!(self.out, "DATAPACKING=POINT")?;

        // Node order matches the checkpoint: i outer, j inner
        for i in 0..grid.imax {
            let x = grid.x(i);
            for j in 0..grid.jmax {
                let y = grid.y(j);
                let [p, u, v] = snapshot.field[(i, j)];
                write!(
                    self.out,
                    "{} {} {} {} {}",
                    Sci(x),
                    Sci(y),
                    Sci(p),
                    Sci(u),
                    Sci(v)
                )?;
                if let Some(exact) = snapshot.exact {
                    let [pe, ue, ve] = exact.exact_node(x, y);
                    write!(
                        self.out,
                        " {} {} {} {} {} {}",
                        Sci(pe),
                        Sci(ue),
                        Sci(ve),
                        Sci(p - pe),
                        Sci(u - ue),
                        Sci(v - ve)
                    )?;
                }
                writeln!(self.out)?;
            }
        }
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
    use cf_core::{Field3, GridGeometry};
    use cf_solver::{AnalyticSolution, SnapshotKind};

    fn grid() -> GridGeometry {
        GridGeometry::new(3, 4, (0.0, 1.0), (0.0, 1.5)).unwrap()
    }

    #[test]
    fn cavity_zone_has_five_columns_per_node() {
        let grid = grid();
        let field = Field3::from_fn(3, 4, |i, j| [1.0, i as f64, j as f64]);
        let mut writer = FieldWriter::new(Vec::new());
        for (kind, n) in [(SnapshotKind::Initial, 0), (SnapshotKind::Final, 7)] {
            writer
                .write_zone(&Snapshot {
                    kind,
                    iteration: n,
                    time: 0.0,
                    initial_residuals: [1.0; 3],
                    grid: &grid,
                    field: &field,
                    exact: None,
                })
                .unwrap();
        }
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text.matches("TITLE").count(), 1);
        assert!(text.contains("zone T=\"n=0\""));
        assert!(text.contains("zone T=\"n=7\""));
        assert!(text.contains("I= 3 J= 4"));

        let data: Vec<&str> = text
            .lines()
            .filter(|l| l.starts_with(|c: char| c.is_ascii_digit() || c == '-'))
            .collect();
        assert_eq!(data.len(), 2 * 12);
        assert!(data.iter().all(|l| l.split_whitespace().count() == 5));
        // Second node is (i=0, j=1)
        assert_eq!(
            data[1],
            "0.000000e+00 5.000000e-01 1.000000e+00 0.000000e+00 1.000000e+00"
        );
    }

    struct Constant;

    impl AnalyticSolution for Constant {
        fn exact(&self, _x: f64, _y: f64, channel: cf_core::Channel) -> f64 {
            channel.index() as f64
        }

        fn source(&self, _x: f64, _y: f64) -> [f64; 3] {
            [0.0; 3]
        }
    }

    #[test]
    fn manufactured_zone_adds_exact_and_error_columns() {
        let grid = grid();
        let field = Field3::filled(3, 4, [0.5, 1.0, 4.0]);
        let mut writer = FieldWriter::new(Vec::new());
        writer
            .write_zone(&Snapshot {
                kind: SnapshotKind::Final,
                iteration: 3,
                time: 0.0,
                initial_residuals: [1.0; 3],
                grid: &grid,
                field: &field,
                exact: Some(&Constant),
            })
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert!(text.contains("\"DE-v\""));
        let last = text.lines().last().unwrap();
        let cols: Vec<f64> = last
            .split_whitespace()
            .map(|c| c.parse().unwrap())
            .collect();
        assert_eq!(cols.len(), 11);
        assert_eq!(&cols[5..8], &[0.0, 1.0, 2.0]);
        assert_eq!(&cols[8..], &[0.5, 0.0, 2.0]);
    }
}
