//! Restart checkpoint (`restart.out`).
//!
//! Layout: `iteration time`, then the three initial residuals, then one
//! `x y p u v` line per node with `i` outer and `j` inner. Values are written
//! with the shortest representation that parses back to the same `f64`, so a
//! restarted run sees exactly the field the previous run stopped with.

use crate::{ResultsError, ResultsResult};
use cf_core::{Field3, GridGeometry, NEQ, Real};
use cf_solver::{RestartState, Snapshot};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Overwrite `path` with the snapshot's state.
///
/// The text is written to a sibling temporary file first and renamed over
/// the target, so an interrupted write never leaves a truncated checkpoint.
pub fn write_checkpoint(path: &Path, snapshot: &Snapshot<'_>) -> ResultsResult<()> {
    let grid = snapshot.grid;
    let mut text = String::with_capacity(64 * grid.node_count());
    let [r1, r2, r3] = snapshot.initial_residuals;
    // Writing into a String cannot fail
    let _ = writeln!(text, "{} {:e}", snapshot.iteration, snapshot.time);
    let _ = writeln!(text, "{r1:e} {r2:e} {r3:e}");
    for i in 0..grid.imax {
        for j in 0..grid.jmax {
            let [p, u, v] = snapshot.field[(i, j)];
            let _ = writeln!(text, "{:e} {:e} {p:e} {u:e} {v:e}", grid.x(i), grid.y(j));
        }
    }

    let tmp = path.with_extension("tmp");
    fs::write(&tmp, text)?;
    fs::rename(&tmp, path)?;
    debug!(iteration = snapshot.iteration, path = %path.display(), "checkpoint written");
    Ok(())
}

/// Read a checkpoint written for `grid`.
pub fn read_checkpoint(path: &Path, grid: &GridGeometry) -> ResultsResult<RestartState> {
    let text = fs::read_to_string(path)?;
    parse_checkpoint(&text, grid)
}

/// Parse checkpoint text. The node count must match `grid` exactly.
pub fn parse_checkpoint(text: &str, grid: &GridGeometry) -> ResultsResult<RestartState> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(k, l)| (k + 1, l.trim()))
        .filter(|(_, l)| !l.is_empty());

    let (line, header) = next_line(&mut lines, 1, "missing iteration and time")?;
    let [iteration, time]: [&str; 2] = columns(line, header)?;
    let iteration = number::<usize>(line, iteration)?;
    let time = number::<Real>(line, time)?;

    let (line, residuals) = next_line(&mut lines, line + 1, "missing initial residuals")?;
    let initial_residuals: [&str; NEQ] = columns(line, residuals)?;
    let mut parsed = [0.0; NEQ];
    for (slot, token) in parsed.iter_mut().zip(initial_residuals) {
        *slot = number::<Real>(line, token)?;
    }

    let mut field = Field3::for_grid(grid);
    let mut last = line;
    for i in 0..grid.imax {
        for j in 0..grid.jmax {
            let (line, node) = next_line(&mut lines, last + 1, "fewer nodes than the grid")?;
            let cols: [&str; 5] = columns(line, node)?;
            // Coordinates are informational; the grid defines the geometry
            for (k, token) in cols[2..].iter().enumerate() {
                field[(i, j)][k] = number::<Real>(line, token)?;
            }
            last = line;
        }
    }
    if let Some((line, _)) = lines.next() {
        return Err(malformed(line, "more nodes than the grid"));
    }

    Ok(RestartState {
        iteration,
        time,
        initial_residuals: parsed,
        field,
    })
}

fn malformed(line: usize, reason: impl Into<String>) -> ResultsError {
    ResultsError::MalformedCheckpoint {
        line,
        reason: reason.into(),
    }
}

fn next_line<'a>(
    lines: &mut impl Iterator<Item = (usize, &'a str)>,
    expected_at: usize,
    reason: &str,
) -> ResultsResult<(usize, &'a str)> {
    lines.next().ok_or_else(|| malformed(expected_at, reason))
}

fn columns<const N: usize>(line: usize, text: &str) -> ResultsResult<[&str; N]> {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let found = tokens.len();
    tokens
        .try_into()
        .map_err(|_| malformed(line, format!("expected {N} values, found {found}")))
}

fn number<T: FromStr>(line: usize, token: &str) -> ResultsResult<T> {
    token
        .parse()
        .map_err(|_| malformed(line, format!("not a number: {token:?}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cf_solver::SnapshotKind;

    fn grid() -> GridGeometry {
        GridGeometry::new(4, 3, (0.0, 0.05), (0.0, 0.05)).unwrap()
    }

    fn snapshot_text(tag: &str, grid: &GridGeometry, field: &Field3) -> String {
        let path = std::env::temp_dir().join(format!(
            "cf_results_checkpoint_{}_{tag}.out",
            std::process::id()
        ));
        write_checkpoint(
            &path,
            &Snapshot {
                kind: SnapshotKind::Periodic,
                iteration: 250,
                time: 1.0 / 3.0,
                initial_residuals: [0.1, 2.5e-7, f64::MIN_POSITIVE],
                grid,
                field,
                exact: None,
            },
        )
        .unwrap();
        let text = fs::read_to_string(&path).unwrap();
        let _ = fs::remove_file(&path);
        text
    }

    #[test]
    fn values_survive_a_write_read_cycle_bit_for_bit() {
        let grid = grid();
        let field = Field3::from_fn(4, 3, |i, j| {
            let s = (i * 3 + j) as f64;
            [0.801333844662 + s / 7.0, (s * 0.1).sin(), -1.0e-300 * s]
        });
        let text = snapshot_text("cycle", &grid, &field);
        let restored = parse_checkpoint(&text, &grid).unwrap();

        assert_eq!(restored.iteration, 250);
        assert_eq!(restored.time.to_bits(), (1.0f64 / 3.0).to_bits());
        assert_eq!(restored.initial_residuals, [0.1, 2.5e-7, f64::MIN_POSITIVE]);
        assert_eq!(restored.field, field);
    }

    #[test]
    fn node_order_is_i_outer_j_inner() {
        let grid = grid();
        let field = Field3::from_fn(4, 3, |i, j| [i as f64, j as f64, 0.0]);
        let text = snapshot_text("order", &grid, &field);
        let nodes: Vec<&str> = text.lines().skip(2).collect();
        assert_eq!(nodes.len(), 12);
        assert!(nodes[1].ends_with("0e0 1e0 0e0"));
        assert!(nodes[3].ends_with("1e0 0e0 0e0"));
    }

    #[test]
    fn rejects_wrong_node_count() {
        let grid = grid();
        let text = snapshot_text("count", &grid, &Field3::for_grid(&grid));

        let bigger = GridGeometry::new(5, 3, (0.0, 0.05), (0.0, 0.05)).unwrap();
        let err = parse_checkpoint(&text, &bigger).unwrap_err();
        assert!(err.to_string().contains("fewer nodes"));

        let smaller = GridGeometry::new(3, 3, (0.0, 0.05), (0.0, 0.05)).unwrap();
        let err = parse_checkpoint(&text, &smaller).unwrap_err();
        assert!(err.to_string().contains("more nodes"));
    }

    #[test]
    fn reports_the_offending_line() {
        let grid = GridGeometry::new(3, 3, (0.0, 1.0), (0.0, 1.0)).unwrap();
        let mut text = String::from("5 1e-3\n1 1 1\n");
        for k in 0..9 {
            if k == 4 {
                text.push_str("0 0 1 oops 0\n");
            } else {
                text.push_str("0 0 1 0 0\n");
            }
        }
        match parse_checkpoint(&text, &grid) {
            Err(ResultsError::MalformedCheckpoint { line, reason }) => {
                assert_eq!(line, 7);
                assert!(reason.contains("oops"));
            }
            other => panic!("expected malformed checkpoint, got {other:?}"),
        }

        assert!(matches!(
            parse_checkpoint("5\n", &grid),
            Err(ResultsError::MalformedCheckpoint { line: 1, .. })
        ));
    }
}
