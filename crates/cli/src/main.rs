use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use invset::prelude::*;
use nalgebra::dmatrix;
use serde_json::json;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::SubscriberBuilder;
use tracing_subscriber::EnvFilter;

mod io;
mod provenance;
mod trace;

use io::{dump_system, load_system, HRep};
use provenance::Payload;
use trace::SnapshotTable;

#[derive(Parser)]
#[command(name = "invset")]
#[command(about = "Robust control-invariant sets for linear systems")]
struct Cmd {
    /// Log filter (e.g. `info`, `debug`, `invset=debug`)
    #[arg(long, default_value = "info")]
    log: String,

    #[command(subcommand)]
    action: Action,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    Vertex,
    Fm,
}

impl From<Method> for ProjectionMethod {
    fn from(m: Method) -> Self {
        match m {
            Method::Vertex => ProjectionMethod::VertexEnumeration,
            Method::Fm => ProjectionMethod::FourierMotzkin,
        }
    }
}

#[derive(Subcommand)]
enum Action {
    /// Compute the invariant set of a system file
    Solve {
        #[arg(long)]
        system: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Per-iteration vertex snapshots (.csv or .parquet)
        #[arg(long)]
        trace: Option<PathBuf>,
        #[arg(long, default_value_t = 1e-3)]
        tol: f64,
        #[arg(long, default_value_t = 100)]
        max_iterations: usize,
        #[arg(long, value_enum, default_value_t = Method::Vertex)]
        method: Method,
        /// Skip redundancy removal between iterations
        #[arg(long)]
        no_reduce: bool,
    },
    /// One robust predecessor step of the state set `X` (or `--target`)
    Pre {
        #[arg(long)]
        system: PathBuf,
        /// Target set as a system-file H-rep (`{"a": .., "b": ..}`); defaults to `X`
        #[arg(long)]
        target: Option<PathBuf>,
        #[arg(long)]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = Method::Vertex)]
        method: Method,
    },
    /// Write the double-integrator system file
    Demo {
        #[arg(long)]
        out: PathBuf,
        /// Box bound on an additive state disturbance; 0 disables it
        #[arg(long, default_value_t = 0.0)]
        disturbance: f64,
    },
    /// Print a small provenance JSON block
    Report,
}

fn main() -> Result<()> {
    let cmd = Cmd::parse();
    SubscriberBuilder::default()
        .with_target(false)
        .with_env_filter(EnvFilter::try_new(&cmd.log).context("parsing --log")?)
        .init();
    match cmd.action {
        Action::Solve {
            system,
            out,
            trace,
            tol,
            max_iterations,
            method,
            no_reduce,
        } => {
            let cfg = SolverCfg {
                tol,
                max_iterations,
                projection: method.into(),
                reduce: !no_reduce,
                ..SolverCfg::default()
            };
            solve(&system, &out, trace.as_deref(), cfg)
        }
        Action::Pre {
            system,
            target,
            out,
            method,
        } => pre_step(&system, target.as_deref(), &out, method.into()),
        Action::Demo { out, disturbance } => demo(&out, disturbance),
        Action::Report => report(),
    }
}

fn set_json(p: &Polytope) -> Result<serde_json::Value> {
    let vertices: Vec<Vec<f64>> = if p.is_empty()? {
        Vec::new()
    } else {
        p.vertices()?.iter().map(|v| v.iter().copied().collect()).collect()
    };
    Ok(json!({ "hrep": HRep::from_polytope(p), "vertices": vertices }))
}

fn write_json(path: &Path, value: &serde_json::Value) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).with_context(|| format!("creating {}", parent.display()))?;
        }
    }
    fs::write(path, serde_json::to_vec_pretty(value)?)
        .with_context(|| format!("writing {}", path.display()))
}

fn solve(system: &Path, out: &Path, trace: Option<&Path>, cfg: SolverCfg) -> Result<()> {
    let sys = load_system(system)?;
    tracing::info!(nx = sys.nx(), nu = sys.nu(), ?cfg, "solve");
    let mut table = SnapshotTable::new();
    let result = invariant_set_from(&sys, sys.x(), cfg, Some(&mut table))
        .context("invariant-set iteration failed")?;
    tracing::info!(status = %result.status, iterations = result.iterations, "solve finished");

    let doc = json!({
        "status": result.status.to_string(),
        "iterations": result.iterations,
        "set": set_json(&result.set)?,
    });
    write_json(out, &doc)?;
    if let Some(path) = trace {
        table.write(path)?;
    }
    let params = json!({
        "tol": cfg.tol,
        "max_iterations": cfg.max_iterations,
        "projection": format!("{:?}", cfg.projection),
        "reduce": cfg.reduce,
        "collapse": cfg.collapse,
    });
    provenance::write_sidecar(out, Payload::new(params).with_input(system))?;
    Ok(())
}

fn pre_step(system: &Path, target: Option<&Path>, out: &Path, method: ProjectionMethod) -> Result<()> {
    let sys = load_system(system)?;
    let target_set = match target {
        Some(path) => {
            let bytes = fs::read(path).with_context(|| format!("reading {}", path.display()))?;
            let rep: HRep = serde_json::from_slice(&bytes)
                .with_context(|| format!("parsing {}", path.display()))?;
            rep.to_polytope(sys.nx(), "target")?
        }
        None => sys.x().clone(),
    };
    let p = pre_with(&sys, &target_set, method).context("Pre failed")?;
    tracing::info!(halfspaces = p.n_halfspaces(), "pre");
    write_json(out, &set_json(&p)?)?;
    let mut payload = Payload::new(json!({ "projection": format!("{method:?}") })).with_input(system);
    if let Some(path) = target {
        payload = payload.with_input(path);
    }
    provenance::write_sidecar(out, payload)?;
    Ok(())
}

fn demo(out: &Path, disturbance: f64) -> Result<()> {
    let mut sys = System::new(
        dmatrix![1.0, 1.0; 0.0, 1.0],
        dmatrix![0.0; 1.0],
        Polytope::from_box(&[-5.0, -5.0], &[5.0, 5.0])?,
        Polytope::from_range(-1.0, 1.0),
    )?;
    if disturbance > 0.0 {
        let w = disturbance;
        sys = sys.with_disturbance(
            DMatrix::identity(2, 2),
            Polytope::from_box(&[-w, -w], &[w, w])?,
        )?;
    }
    dump_system(&sys, out)?;
    tracing::info!(out = %out.display(), disturbance, "demo system written");
    Ok(())
}

fn report() -> Result<()> {
    let doc = provenance::document(&Payload::new(json!({
        "defaults": {
            "tol": SolverCfg::default().tol,
            "max_iterations": SolverCfg::default().max_iterations,
        }
    })));
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
