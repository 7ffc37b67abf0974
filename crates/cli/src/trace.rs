//! Per-iteration vertex snapshots of the candidate set, written with polars.
//!
//! One row per (iteration, vertex) with the planar coordinates the solver
//! hands to its observer. 1-D candidates get `y = 0`. Output format follows
//! the file extension: `.parquet` or anything else as CSV.

use anyhow::{Context, Result};
use invset::invariant::IterationObserver;
use invset::Polytope;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::Path;

#[derive(Debug, Default)]
pub struct SnapshotTable {
    iteration: Vec<u32>,
    vertex: Vec<u32>,
    halfspaces: Vec<u32>,
    x: Vec<f64>,
    y: Vec<f64>,
}

impl SnapshotTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.iteration.len()
    }

    pub fn is_empty(&self) -> bool {
        self.iteration.is_empty()
    }

    pub fn to_frame(&self) -> Result<DataFrame> {
        let df = df!(
            "iteration" => &self.iteration,
            "vertex" => &self.vertex,
            "halfspaces" => &self.halfspaces,
            "x" => &self.x,
            "y" => &self.y,
        )?;
        Ok(df)
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("creating {}", parent.display()))?;
            }
        }
        let mut df = self.to_frame()?;
        let mut file =
            File::create(path).with_context(|| format!("creating {}", path.display()))?;
        if path.extension().is_some_and(|e| e == "parquet") {
            ParquetWriter::new(&mut file)
                .finish(&mut df)
                .with_context(|| format!("writing {}", path.display()))?;
        } else {
            CsvWriter::new(&mut file)
                .include_header(true)
                .finish(&mut df)
                .with_context(|| format!("writing {}", path.display()))?;
        }
        tracing::info!(path = %path.display(), rows = df.height(), "snapshots written");
        Ok(())
    }
}

impl IterationObserver for SnapshotTable {
    fn on_iteration(&mut self, iteration: usize, set: &Polytope) {
        let verts = match set.vertices() {
            Ok(v) => v,
            Err(err) => {
                tracing::warn!(iteration, %err, "snapshot without vertices");
                return;
            }
        };
        for (k, v) in verts.iter().enumerate() {
            self.iteration.push(iteration as u32);
            self.vertex.push(k as u32);
            self.halfspaces.push(set.n_halfspaces() as u32);
            self.x.push(v[0]);
            self.y.push(if v.len() > 1 { v[1] } else { 0.0 });
        }
    }
}
