//! Tank-to-wake GHG factors and the GWP100 combinator.

use crate::error::{FuelError, FuelResult};
use crate::species::ConsumerClass;
use serde::{Deserialize, Serialize};

/// 100-year global warming potential of methane.
pub const GWP100_CH4: f64 = 29.8;

/// 100-year global warming potential of nitrous oxide.
pub const GWP100_N2O: f64 = 273.0;

/// A factor or mass that is either one number or one number per timestep.
///
/// Per-timestep series arise when engine emission curves override the CH4
/// or N2O factors at each operating point, and for fuel mass flow rates.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ScalarOrSeries {
    Scalar(f64),
    Series(Vec<f64>),
}

impl ScalarOrSeries {
    pub fn zero() -> Self {
        ScalarOrSeries::Scalar(0.0)
    }

    pub fn is_scalar(&self) -> bool {
        matches!(self, ScalarOrSeries::Scalar(_))
    }

    /// Value at timestep `i`. Scalars broadcast to every timestep. `i` must
    /// be within the series length.
    pub fn at(&self, i: usize) -> f64 {
        match self {
            ScalarOrSeries::Scalar(v) => *v,
            ScalarOrSeries::Series(s) => s[i],
        }
    }

    /// Series length, or `None` for a scalar.
    pub fn len(&self) -> Option<usize> {
        match self {
            ScalarOrSeries::Scalar(_) => None,
            ScalarOrSeries::Series(s) => Some(s.len()),
        }
    }

    pub fn scale(&self, k: f64) -> Self {
        match self {
            ScalarOrSeries::Scalar(v) => ScalarOrSeries::Scalar(v * k),
            ScalarOrSeries::Series(s) => {
                ScalarOrSeries::Series(s.iter().map(|v| v * k).collect())
            }
        }
    }

    /// Element-wise sum. Scalars broadcast; two series must agree in length.
    pub fn add(&self, other: &Self) -> FuelResult<Self> {
        match (self, other) {
            (ScalarOrSeries::Scalar(a), ScalarOrSeries::Scalar(b)) => {
                Ok(ScalarOrSeries::Scalar(a + b))
            }
            (ScalarOrSeries::Scalar(a), ScalarOrSeries::Series(b)) => {
                Ok(ScalarOrSeries::Series(b.iter().map(|v| v + a).collect()))
            }
            (ScalarOrSeries::Series(a), ScalarOrSeries::Scalar(b)) => {
                Ok(ScalarOrSeries::Series(a.iter().map(|v| v + b).collect()))
            }
            (ScalarOrSeries::Series(a), ScalarOrSeries::Series(b)) => {
                if a.len() != b.len() {
                    return Err(FuelError::ShapeMismatch {
                        left: a.len(),
                        right: b.len(),
                    });
                }
                Ok(ScalarOrSeries::Series(
                    a.iter().zip(b.iter()).map(|(x, y)| x + y).collect(),
                ))
            }
        }
    }

    /// Scalar view of an aggregated value. Series sum over time.
    pub fn total(&self) -> f64 {
        match self {
            ScalarOrSeries::Scalar(v) => *v,
            ScalarOrSeries::Series(s) => s.iter().sum(),
        }
    }
}

impl From<f64> for ScalarOrSeries {
    fn from(v: f64) -> Self {
        ScalarOrSeries::Scalar(v)
    }
}

impl From<Vec<f64>> for ScalarOrSeries {
    fn from(v: Vec<f64>) -> Self {
        ScalarOrSeries::Series(v)
    }
}

/// Tank-to-wake GHG emission factors for one fuel / consumer-class row.
///
/// All factors are grams of the species per gram of fuel burned. The
/// methane slip percentage covers unburned fuel exhausted by gas engines;
/// it must be zeroed whenever a CH4 emission curve already accounts for
/// total methane, otherwise the slip would be counted twice.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GhgFactorTankToWake {
    pub consumer_class: Option<ConsumerClass>,
    pub co2_gco2_per_gfuel: f64,
    pub ch4_gch4_per_gfuel: ScalarOrSeries,
    pub n2o_gn2o_per_gfuel: ScalarOrSeries,
    pub c_slip_percent: f64,
}

impl GhgFactorTankToWake {
    pub fn new(
        consumer_class: Option<ConsumerClass>,
        co2: f64,
        ch4: f64,
        n2o: f64,
        c_slip_percent: f64,
    ) -> Self {
        Self {
            consumer_class,
            co2_gco2_per_gfuel: co2,
            ch4_gch4_per_gfuel: ScalarOrSeries::Scalar(ch4),
            n2o_gn2o_per_gfuel: ScalarOrSeries::Scalar(n2o),
            c_slip_percent,
        }
    }

    /// gCO2eq per gram of fuel at timestep `i`, including the slip term:
    ///
    /// ```text
    /// (1 - c/100) * (co2 + 29.8*ch4 + 273*n2o) + (c/100) * 29.8
    /// ```
    pub fn co2eq_gco2eq_per_gfuel_at(&self, i: usize) -> f64 {
        let burned = self.co2eq_without_slip_at(i);
        let slip = self.c_slip_percent / 100.0;
        (1.0 - slip) * burned + slip * GWP100_CH4
    }

    /// gCO2eq per gram of fuel at timestep `i` ignoring methane slip.
    pub fn co2eq_without_slip_at(&self, i: usize) -> f64 {
        self.co2_gco2_per_gfuel
            + self.ch4_gch4_per_gfuel.at(i) * GWP100_CH4
            + self.n2o_gn2o_per_gfuel.at(i) * GWP100_N2O
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_broadcasts() {
        let v = ScalarOrSeries::Scalar(2.0);
        assert_eq!(v.at(0), 2.0);
        assert_eq!(v.at(99), 2.0);
    }

    #[test]
    fn add_series_and_scalar() {
        let a = ScalarOrSeries::Series(vec![1.0, 2.0]);
        let b = ScalarOrSeries::Scalar(1.0);
        assert_eq!(
            a.add(&b).unwrap(),
            ScalarOrSeries::Series(vec![2.0, 3.0])
        );
    }

    #[test]
    fn add_rejects_length_mismatch() {
        let a = ScalarOrSeries::Series(vec![1.0, 2.0]);
        let b = ScalarOrSeries::Series(vec![1.0]);
        assert!(a.add(&b).is_err());
    }

    #[test]
    fn co2eq_without_slip_is_plain_gwp_sum() {
        let row = GhgFactorTankToWake::new(None, 2.75, 0.01, 0.0001, 0.0);
        let expected = 2.75 + 0.01 * GWP100_CH4 + 0.0001 * GWP100_N2O;
        assert!((row.co2eq_gco2eq_per_gfuel_at(0) - expected).abs() < 1e-12);
        assert!((row.co2eq_without_slip_at(0) - expected).abs() < 1e-12);
    }

    #[test]
    fn slip_term_adds_methane() {
        let row = GhgFactorTankToWake::new(None, 2.75, 0.0, 0.0, 3.1);
        let slip = 3.1 / 100.0;
        let expected = (1.0 - slip) * 2.75 + slip * GWP100_CH4;
        assert!((row.co2eq_gco2eq_per_gfuel_at(0) - expected).abs() < 1e-12);
    }

    #[test]
    fn series_factor_is_per_timestep() {
        let row = GhgFactorTankToWake {
            consumer_class: None,
            co2_gco2_per_gfuel: 2.75,
            ch4_gch4_per_gfuel: ScalarOrSeries::Series(vec![0.0, 0.04]),
            n2o_gn2o_per_gfuel: ScalarOrSeries::Scalar(0.0),
            c_slip_percent: 0.0,
        };
        assert!((row.co2eq_gco2eq_per_gfuel_at(0) - 2.75).abs() < 1e-12);
        assert!(
            (row.co2eq_gco2eq_per_gfuel_at(1) - (2.75 + 0.04 * GWP100_CH4)).abs() < 1e-12
        );
    }
}
