//! Reproducible random polytopes and systems for tests and benches.
//!
//! Purpose
//! - Feed property tests and benches with bounded, full-dimensional
//!   polytopes that contain the origin, without storing fixtures.
//!
//! Model
//! - Draw `count` directions uniformly in the unit ball (rejection from the
//!   cube), scale each by `radius * (1 + u)` with `u` in `[-jitter, jitter]`,
//!   take the hull, then recenter on the vertex mean.
//! - Determinism uses a replay token `(seed, index)` mixed into one `StdRng`.

use nalgebra::{DMatrix, DVector};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{PolyError, Result};
use crate::polytope::Polytope;
use crate::system::System;

/// Replay token to make draws reproducible and indexable.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ReplayToken {
    pub seed: u64,
    pub index: u64,
}

impl ReplayToken {
    pub fn new(seed: u64, index: u64) -> Self {
        Self { seed, index }
    }

    /// Token for the next draw in the same stream.
    pub fn next(self) -> Self {
        Self {
            seed: self.seed,
            index: self.index.wrapping_add(1),
        }
    }

    fn to_std_rng(self) -> StdRng {
        // SplitMix64 finalizer.
        fn mix(mut x: u64) -> u64 {
            x ^= x >> 30;
            x = x.wrapping_mul(0xbf58476d1ce4e5b9);
            x ^= x >> 27;
            x = x.wrapping_mul(0x94d049bb133111eb);
            x ^ (x >> 31)
        }
        StdRng::seed_from_u64(mix(self.seed ^ mix(self.index.wrapping_add(0x9e3779b97f4a7c15))))
    }
}

/// Point-cloud sampler configuration.
#[derive(Clone, Copy, Debug)]
pub struct CloudCfg {
    pub dim: usize,
    /// Number of sampled points; raised to `dim + 1` if smaller.
    pub count: usize,
    pub radius: f64,
    /// Relative radial jitter, clamped to `[0, 0.9]`.
    pub jitter: f64,
}

impl Default for CloudCfg {
    fn default() -> Self {
        Self {
            dim: 2,
            count: 10,
            radius: 1.0,
            jitter: 0.3,
        }
    }
}

fn unit_ball_point<R: Rng>(rng: &mut R, dim: usize) -> DVector<f64> {
    loop {
        let p = DVector::from_fn(dim, |_, _| rng.gen_range(-1.0..=1.0));
        let r = p.norm();
        if r > 1e-3 && r <= 1.0 {
            return p / r;
        }
    }
}

/// Random bounded polytope containing the origin in its interior.
pub fn draw_polytope(cfg: CloudCfg, tok: ReplayToken) -> Result<Polytope> {
    if cfg.dim == 0 || !(cfg.radius > 0.0) {
        return Err(PolyError::DegenerateInput {
            context: "random polytope",
            detail: format!("dim={} radius={}", cfg.dim, cfg.radius),
        });
    }
    let mut rng = tok.to_std_rng();
    let jitter = cfg.jitter.clamp(0.0, 0.9);
    let count = cfg.count.max(cfg.dim + 1);
    let points: Vec<DVector<f64>> = (0..count)
        .map(|_| {
            let u = rng.gen_range(-1.0..=1.0) * jitter;
            unit_ball_point(&mut rng, cfg.dim) * (cfg.radius * (1.0 + u))
        })
        .collect();
    let hull = Polytope::from_vertices(&points)?;
    let verts = hull.vertices()?;
    let mean = verts.iter().fold(DVector::zeros(cfg.dim), |acc, v| acc + v) / verts.len() as f64;
    let centered: Vec<DVector<f64>> = verts.iter().map(|v| v - &mean).collect();
    Polytope::from_vertices(&centered)
}

/// Random axis-aligned box `[-h_i, h_i]` with half-widths in `[lo, hi]`.
pub fn draw_box(dim: usize, lo: f64, hi: f64, tok: ReplayToken) -> Result<Polytope> {
    let mut rng = tok.to_std_rng();
    let (lo, hi) = (lo.min(hi), lo.max(hi));
    let half: Vec<f64> = (0..dim).map(|_| rng.gen_range(lo..=hi)).collect();
    let lower: Vec<f64> = half.iter().map(|h| -h).collect();
    Polytope::from_box(&lower, &half)
}

/// Random single-input system `x+ = A x + B u` with a box state set and
/// `|u| <= u_max`. `A` has entries in `[-1, 1]` plus the identity.
pub fn draw_system(dim: usize, u_max: f64, tok: ReplayToken) -> Result<System> {
    let mut rng = tok.to_std_rng();
    let a = DMatrix::identity(dim, dim) + DMatrix::from_fn(dim, dim, |_, _| 0.5 * rng.gen_range(-1.0..=1.0));
    let bu = DMatrix::from_fn(dim, 1, |_, _| rng.gen_range(-1.0..=1.0));
    let x = draw_box(dim, 1.0, 5.0, tok.next())?;
    System::new(a, bu, x, Polytope::from_range(-u_max, u_max))
}
