//! System files: a JSON document with the matrices (row-major) and the
//! H-representations of every constraint set.
//!
//! Writes go to a sibling temp file that is renamed into place, so a reader
//! never sees a half-written system.

use anyhow::{Context, Result};
use invset::{Polytope, System};
use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HRep {
    pub a: Vec<Vec<f64>>,
    pub b: Vec<f64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DisturbanceRecord {
    pub bw: Vec<Vec<f64>>,
    pub w: HRep,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SystemRecord {
    pub a: Vec<Vec<f64>>,
    pub bu: Vec<Vec<f64>>,
    pub x: HRep,
    pub u: HRep,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disturbance: Option<DisturbanceRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_error: Option<HRep>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terminal: Option<HRep>,
}

fn rows_of(m: &DMatrix<f64>) -> Vec<Vec<f64>> {
    m.row_iter().map(|r| r.iter().copied().collect()).collect()
}

/// `cols` is only consulted for zero-row matrices.
fn matrix_of(rows: &[Vec<f64>], cols: usize, what: &str) -> Result<DMatrix<f64>> {
    let ncols = rows.first().map_or(cols, Vec::len);
    if let Some(bad) = rows.iter().position(|r| r.len() != ncols) {
        anyhow::bail!("{what}: row {bad} has {} entries, expected {ncols}", rows[bad].len());
    }
    Ok(DMatrix::from_fn(rows.len(), ncols, |i, j| rows[i][j]))
}

impl HRep {
    pub fn from_polytope(p: &Polytope) -> Self {
        Self {
            a: rows_of(p.a()),
            b: p.b().iter().copied().collect(),
        }
    }

    /// `dim` fixes the column count when the record has no rows.
    pub fn to_polytope(&self, dim: usize, what: &str) -> Result<Polytope> {
        let a = matrix_of(&self.a, dim, what)?;
        let b = DVector::from_column_slice(&self.b);
        Polytope::from_halfspaces(a, b).with_context(|| format!("invalid {what}"))
    }
}

impl SystemRecord {
    pub fn from_system(sys: &System) -> Self {
        Self {
            a: rows_of(sys.a()),
            bu: rows_of(sys.bu()),
            x: HRep::from_polytope(sys.x()),
            u: HRep::from_polytope(sys.u()),
            disturbance: sys.disturbance().map(|d| DisturbanceRecord {
                bw: rows_of(&d.bw),
                w: HRep::from_polytope(&d.w),
            }),
            input_error: sys.input_error().map(HRep::from_polytope),
            terminal: sys.terminal().map(HRep::from_polytope),
        }
    }

    pub fn to_system(&self) -> Result<System> {
        let a = matrix_of(&self.a, 0, "A")?;
        let n = a.nrows();
        let bu = matrix_of(&self.bu, 0, "Bu")?;
        let p = bu.ncols();
        let mut sys = System::new(a, bu, self.x.to_polytope(n, "X")?, self.u.to_polytope(p, "U")?)
            .context("invalid system")?;
        if let Some(d) = &self.disturbance {
            let bw = matrix_of(&d.bw, 0, "Bw")?;
            let q = bw.ncols();
            sys = sys
                .with_disturbance(bw, d.w.to_polytope(q, "W")?)
                .context("invalid disturbance")?;
        }
        if let Some(e) = &self.input_error {
            sys = sys
                .with_input_error(e.to_polytope(p, "E")?)
                .context("invalid input error")?;
        }
        if let Some(xf) = &self.terminal {
            sys = sys
                .with_terminal(xf.to_polytope(n, "Xf")?)
                .context("invalid terminal set")?;
        }
        Ok(sys)
    }
}

/// Write `sys` to `path` as pretty JSON (temp file + rename).
pub fn dump_system<P: AsRef<Path>>(sys: &System, path: P) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    let doc = serde_json::to_vec_pretty(&SystemRecord::from_system(sys))?;
    let mut tmp_name = path.file_name().map(|s| s.to_os_string()).unwrap_or_default();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);
    fs::write(&tmp, doc).with_context(|| format!("writing {}", tmp.display()))?;
    fs::rename(&tmp, path)
        .with_context(|| format!("renaming {} to {}", tmp.display(), path.display()))?;
    tracing::debug!(path = %path.display(), "system written");
    Ok(())
}

/// Read a system written by `dump_system`.
pub fn load_system<P: AsRef<Path>>(path: P) -> Result<System> {
    let path = path.as_ref();
    let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let record: SystemRecord = serde_json::from_slice(&bytes)
        .with_context(|| format!("parsing {}", path.display()))?;
    record
        .to_system()
        .with_context(|| format!("loading {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::dmatrix;
    use tempfile::tempdir;

    fn disturbed() -> System {
        System::new(
            dmatrix![1.0, 1.0; 0.0, 1.0],
            dmatrix![0.0; 1.0],
            Polytope::from_box(&[-5.0, -5.0], &[5.0, 5.0]).unwrap(),
            Polytope::from_range(-1.0, 1.0),
        )
        .unwrap()
        .with_disturbance(
            DMatrix::identity(2, 2),
            Polytope::from_box(&[-0.1, -0.1], &[0.1, 0.1]).unwrap(),
        )
        .unwrap()
        .with_input_error(Polytope::from_range(-0.05, 0.05))
        .unwrap()
    }

    #[test]
    fn dump_then_load_reconstructs_system() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("sys.json");
        let sys = disturbed();
        dump_system(&sys, &path).unwrap();
        assert!(!dir.path().join("nested").join("sys.json.tmp").exists());

        let back = load_system(&path).unwrap();
        assert_eq!(back.a(), sys.a());
        assert_eq!(back.bu(), sys.bu());
        assert_eq!(back.x().a(), sys.x().a());
        assert_eq!(back.x().b(), sys.x().b());
        assert_eq!(back.u().b(), sys.u().b());
        let (d0, d1) = (sys.disturbance().unwrap(), back.disturbance().unwrap());
        assert_eq!(d0.bw, d1.bw);
        assert_eq!(d0.w.b(), d1.w.b());
        assert_eq!(back.input_error().unwrap().b(), sys.input_error().unwrap().b());
        assert!(back.terminal().is_none());
        assert_eq!(SystemRecord::from_system(&back), SystemRecord::from_system(&sys));
    }

    #[test]
    fn optional_parts_are_omitted_from_json() {
        let sys = System::new(
            dmatrix![0.5],
            dmatrix![1.0],
            Polytope::from_range(-1.0, 1.0),
            Polytope::from_range(-1.0, 1.0),
        )
        .unwrap();
        let text = serde_json::to_string(&SystemRecord::from_system(&sys)).unwrap();
        assert!(!text.contains("disturbance"));
        assert!(!text.contains("terminal"));
    }

    #[test]
    fn ragged_and_mismatched_records_are_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.json");
        let mut rec = SystemRecord::from_system(&disturbed());
        rec.a[1].pop();
        fs::write(&path, serde_json::to_vec(&rec).unwrap()).unwrap();
        let err = load_system(&path).unwrap_err();
        assert!(format!("{err:#}").contains("row 1"));

        let mut rec = SystemRecord::from_system(&disturbed());
        rec.bu.push(vec![1.0]);
        fs::write(&path, serde_json::to_vec(&rec).unwrap()).unwrap();
        let err = load_system(&path).unwrap_err();
        assert!(format!("{err:#}").contains("invalid system"));
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = load_system("/nonexistent/sys.json").unwrap_err();
        assert!(format!("{err:#}").contains("/nonexistent/sys.json"));
    }
}
