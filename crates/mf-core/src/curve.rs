//! Monotone 1-D lookup tables.
//!
//! Curves map a load ratio in [0, 1] to efficiency, BSFC (g/kWh) or an
//! emission rate (g/kWh). Lookup is piecewise-linear with clamping to the
//! nearest endpoint outside the tabulated range.

use crate::error::{CoreError, CoreResult};
use serde::{Deserialize, Serialize};

/// Lower bound for any reported efficiency.
pub const EFFICIENCY_FLOOR: f64 = 0.01;

/// Upper bound for any reported efficiency.
pub const EFFICIENCY_CEILING: f64 = 1.0;

/// Piecewise-linear lookup table with strictly increasing x values.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Curve {
    xs: Vec<f64>,
    ys: Vec<f64>,
}

impl Curve {
    /// Build a curve from unordered points. Points are sorted by x; the
    /// sorted x values must be strictly increasing and all values finite.
    pub fn from_points(points: &[(f64, f64)]) -> CoreResult<Self> {
        if points.is_empty() {
            return Err(CoreError::CurveDomain {
                what: "curve has no points",
            });
        }
        let mut sorted: Vec<(f64, f64)> = points.to_vec();
        for &(x, y) in &sorted {
            crate::numeric::ensure_finite(x, "curve x")?;
            crate::numeric::ensure_finite(y, "curve y")?;
        }
        sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("finite x values"));
        for pair in sorted.windows(2) {
            if pair[1].0 <= pair[0].0 {
                return Err(CoreError::CurveDomain {
                    what: "curve x values are not strictly increasing",
                });
            }
        }
        Ok(Self {
            xs: sorted.iter().map(|p| p.0).collect(),
            ys: sorted.iter().map(|p| p.1).collect(),
        })
    }

    /// Single-valued curve, constant over the whole domain.
    pub fn constant(y: f64) -> CoreResult<Self> {
        crate::numeric::ensure_finite(y, "curve y")?;
        Ok(Self {
            xs: vec![0.0],
            ys: vec![y],
        })
    }

    pub fn len(&self) -> usize {
        self.xs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.xs.is_empty()
    }

    /// Tabulated points in ascending x order.
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.xs.iter().copied().zip(self.ys.iter().copied())
    }

    /// Linear interpolation at `x`, clamped to the endpoints outside the
    /// tabulated range. A non-finite input or output is a domain error.
    pub fn value_at(&self, x: f64) -> CoreResult<f64> {
        if !x.is_finite() {
            return Err(CoreError::CurveDomain {
                what: "curve lookup with non-finite input",
            });
        }
        let n = self.xs.len();
        if n == 1 {
            return Ok(self.ys[0]);
        }
        if x <= self.xs[0] {
            return Ok(self.ys[0]);
        }
        if x >= self.xs[n - 1] {
            return Ok(self.ys[n - 1]);
        }
        // First index with xs[i] > x; the segment is [i-1, i].
        let i = self.xs.partition_point(|&v| v <= x);
        let (x0, x1) = (self.xs[i - 1], self.xs[i]);
        let (y0, y1) = (self.ys[i - 1], self.ys[i]);
        let y = y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        if !y.is_finite() {
            return Err(CoreError::CurveDomain {
                what: "curve lookup produced a non-finite value",
            });
        }
        Ok(y)
    }
}

/// Efficiency curve with the [`EFFICIENCY_FLOOR`] and [`EFFICIENCY_CEILING`]
/// applied on every lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EfficiencyCurve {
    curve: Curve,
}

impl EfficiencyCurve {
    pub fn from_points(points: &[(f64, f64)]) -> CoreResult<Self> {
        Ok(Self {
            curve: Curve::from_points(points)?,
        })
    }

    pub fn constant(eta: f64) -> CoreResult<Self> {
        Ok(Self {
            curve: Curve::constant(eta)?,
        })
    }

    pub fn inner(&self) -> &Curve {
        &self.curve
    }

    /// Efficiency at the given load ratio, clamped into [0.01, 1.0].
    pub fn at(&self, load_ratio: f64) -> CoreResult<f64> {
        let eta = self.curve.value_at(load_ratio)?;
        Ok(crate::numeric::clamp(eta, EFFICIENCY_FLOOR, EFFICIENCY_CEILING))
    }
}
