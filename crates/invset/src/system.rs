//! Linear discrete-time system `x+ = A x + Bu (u + e) + Bw w` with polytopic
//! constraint sets.
//!
//! A `System` is validated once at construction and never mutated afterwards;
//! the solver only reads it. Optional parts are explicit `Option`s, so `Pre`
//! knows statically whether a robustness tightening applies.

use nalgebra::DMatrix;

use crate::error::{check_dim, PolyError, Result};
use crate::polytope::Polytope;

/// Additive disturbance `Bw w` with `w ∈ W ⊂ R^q`.
#[derive(Clone, Debug)]
pub struct Disturbance {
    pub bw: DMatrix<f64>,
    pub w: Polytope,
}

#[derive(Clone, Debug)]
pub struct System {
    a: DMatrix<f64>,
    bu: DMatrix<f64>,
    x: Polytope,
    u: Polytope,
    disturbance: Option<Disturbance>,
    input_error: Option<Polytope>,
    terminal: Option<Polytope>,
}

impl System {
    /// Nominal system: `A` (n×n), `Bu` (n×p), state set `X ⊂ R^n`, input set `U ⊂ R^p`.
    pub fn new(a: DMatrix<f64>, bu: DMatrix<f64>, x: Polytope, u: Polytope) -> Result<Self> {
        let n = a.nrows();
        if n == 0 {
            return Err(PolyError::Dimension {
                context: "state matrix A (rows)",
                expected: 1,
                found: 0,
            });
        }
        check_dim("state matrix A (columns)", n, a.ncols())?;
        check_dim("input matrix Bu (rows)", n, bu.nrows())?;
        check_dim("state constraint X", n, x.dim())?;
        check_dim("input constraint U", bu.ncols(), u.dim())?;
        Ok(Self {
            a,
            bu,
            x,
            u,
            disturbance: None,
            input_error: None,
            terminal: None,
        })
    }

    /// Attach `Bw` (n×q) and the disturbance set `W ⊂ R^q`.
    pub fn with_disturbance(mut self, bw: DMatrix<f64>, w: Polytope) -> Result<Self> {
        check_dim("disturbance matrix Bw (rows)", self.nx(), bw.nrows())?;
        check_dim("disturbance set W", bw.ncols(), w.dim())?;
        self.disturbance = Some(Disturbance { bw, w });
        Ok(self)
    }

    /// Attach the input-implementation error set `E ⊂ R^p`.
    pub fn with_input_error(mut self, e: Polytope) -> Result<Self> {
        check_dim("input error set E", self.nu(), e.dim())?;
        self.input_error = Some(e);
        Ok(self)
    }

    /// Attach the terminal constraint set `Xf ⊂ R^n`.
    pub fn with_terminal(mut self, xf: Polytope) -> Result<Self> {
        check_dim("terminal set Xf", self.nx(), xf.dim())?;
        self.terminal = Some(xf);
        Ok(self)
    }

    /// State dimension `n`.
    #[inline]
    pub fn nx(&self) -> usize {
        self.a.nrows()
    }

    /// Input dimension `p`.
    #[inline]
    pub fn nu(&self) -> usize {
        self.bu.ncols()
    }

    #[inline]
    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    #[inline]
    pub fn bu(&self) -> &DMatrix<f64> {
        &self.bu
    }

    #[inline]
    pub fn x(&self) -> &Polytope {
        &self.x
    }

    #[inline]
    pub fn u(&self) -> &Polytope {
        &self.u
    }

    #[inline]
    pub fn disturbance(&self) -> Option<&Disturbance> {
        self.disturbance.as_ref()
    }

    #[inline]
    pub fn input_error(&self) -> Option<&Polytope> {
        self.input_error.as_ref()
    }

    #[inline]
    pub fn terminal(&self) -> Option<&Polytope> {
        self.terminal.as_ref()
    }
}
