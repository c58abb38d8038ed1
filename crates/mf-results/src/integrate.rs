//! Fixed-rule integration of per-timestep series.

use crate::error::{ResultsError, ResultsResult};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntegrationRule {
    Trapezoid,
    Simpson,
    /// Samples are already interval values: the integral is the dot product
    /// with the interval lengths.
    #[default]
    SumWithInterval,
}

/// Time axis of the staged series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TimeSteps {
    /// One fixed interval in seconds.
    Uniform(f64),
    /// Per-sample intervals in seconds; required length equals the series.
    PerStep(Vec<f64>),
}

impl TimeSteps {
    pub fn validate(&self, rule: IntegrationRule, len: usize) -> ResultsResult<()> {
        match self {
            TimeSteps::Uniform(dt) => {
                if !(dt.is_finite() && *dt > 0.0) {
                    return Err(ResultsError::Integration {
                        what: "timestep must be positive and finite",
                    });
                }
            }
            TimeSteps::PerStep(steps) => {
                if rule != IntegrationRule::SumWithInterval {
                    return Err(ResultsError::Integration {
                        what: "per-step intervals require the sum-with-interval rule",
                    });
                }
                if steps.len() != len {
                    return Err(ResultsError::Integration {
                        what: "interval array length does not match the series",
                    });
                }
            }
        }
        Ok(())
    }
}

/// Total covered duration for a series of `len` samples.
pub fn duration_s(steps: &TimeSteps, len: usize) -> f64 {
    match steps {
        TimeSteps::Uniform(dt) => dt * len as f64,
        TimeSteps::PerStep(intervals) => intervals.iter().sum(),
    }
}

/// Integrate a series under the given rule.
///
/// Trapezoid and Simpson treat the samples as instantaneous values on a
/// uniform grid. Composite Simpson consumes interval pairs and falls back
/// to a trapezoid on an odd remainder. A single sample integrates as one
/// interval regardless of the rule.
pub fn integrate(data: &[f64], steps: &TimeSteps, rule: IntegrationRule) -> ResultsResult<f64> {
    if data.is_empty() {
        return Ok(0.0);
    }
    steps.validate(rule, data.len())?;
    if data.len() == 1 {
        return Ok(data[0] * duration_s(steps, 1));
    }
    match rule {
        IntegrationRule::Trapezoid => {
            let dt = uniform_dt(steps)?;
            Ok(trapezoid(data) * dt)
        }
        IntegrationRule::Simpson => {
            let dt = uniform_dt(steps)?;
            Ok(simpson(data) * dt)
        }
        IntegrationRule::SumWithInterval => match steps {
            TimeSteps::Uniform(dt) => Ok(data.iter().sum::<f64>() * dt),
            TimeSteps::PerStep(intervals) => Ok(data
                .iter()
                .zip(intervals.iter())
                .map(|(d, dt)| d * dt)
                .sum()),
        },
    }
}

/// Cumulative integral series under the sum-with-interval rule, with a
/// leading zero: element `t` is the integral up to the start of step `t`.
pub fn cumulative_sum_with_interval(
    data: &[f64],
    steps: &TimeSteps,
) -> ResultsResult<Vec<f64>> {
    steps.validate(IntegrationRule::SumWithInterval, data.len())?;
    let mut out = Vec::with_capacity(data.len() + 1);
    let mut acc = 0.0;
    out.push(acc);
    for (i, d) in data.iter().enumerate() {
        let dt = match steps {
            TimeSteps::Uniform(dt) => *dt,
            TimeSteps::PerStep(intervals) => intervals[i],
        };
        acc += d * dt;
        out.push(acc);
    }
    Ok(out)
}

/// Running hours for a source: the time its status is on, in hours.
pub fn running_hours(status: &[bool], steps: &TimeSteps) -> f64 {
    let mut seconds = 0.0;
    for (i, on) in status.iter().enumerate() {
        if *on {
            seconds += match steps {
                TimeSteps::Uniform(dt) => *dt,
                TimeSteps::PerStep(intervals) => intervals[i],
            };
        }
    }
    seconds / 3600.0
}

fn uniform_dt(steps: &TimeSteps) -> ResultsResult<f64> {
    match steps {
        TimeSteps::Uniform(dt) => Ok(*dt),
        TimeSteps::PerStep(_) => Err(ResultsError::Integration {
            what: "this rule requires a uniform timestep",
        }),
    }
}

fn trapezoid(data: &[f64]) -> f64 {
    data.windows(2).map(|w| (w[0] + w[1]) / 2.0).sum()
}

fn simpson(data: &[f64]) -> f64 {
    let n = data.len();
    let intervals = n - 1;
    let even_intervals = intervals - intervals % 2;
    let mut total = 0.0;
    let mut i = 0;
    while i < even_intervals {
        total += (data[i] + 4.0 * data[i + 1] + data[i + 2]) / 3.0;
        i += 2;
    }
    if intervals % 2 == 1 {
        total += (data[n - 2] + data[n - 1]) / 2.0;
    }
    total
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trapezoid_constant_series() {
        // 5 samples, 4 intervals of 2 s at value 3.0
        let v = integrate(
            &[3.0; 5],
            &TimeSteps::Uniform(2.0),
            IntegrationRule::Trapezoid,
        )
        .unwrap();
        assert!((v - 24.0).abs() < 1e-12);
    }

    #[test]
    fn simpson_matches_trapezoid_on_linear_data() {
        let data: Vec<f64> = (0..7).map(|i| i as f64).collect();
        let t = integrate(&data, &TimeSteps::Uniform(1.0), IntegrationRule::Trapezoid).unwrap();
        let s = integrate(&data, &TimeSteps::Uniform(1.0), IntegrationRule::Simpson).unwrap();
        assert!((t - s).abs() < 1e-9);
    }

    #[test]
    fn simpson_is_exact_for_parabola() {
        // y = x^2 over [0, 4] with dt = 1: exact integral 64/3
        let data: Vec<f64> = (0..=4).map(|i| (i as f64).powi(2)).collect();
        let s = integrate(&data, &TimeSteps::Uniform(1.0), IntegrationRule::Simpson).unwrap();
        assert!((s - 64.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn simpson_falls_back_on_odd_tail() {
        // 4 samples, 3 intervals: one Simpson pair plus one trapezoid
        let data = [1.0, 1.0, 1.0, 1.0];
        let s = integrate(&data, &TimeSteps::Uniform(1.0), IntegrationRule::Simpson).unwrap();
        assert!((s - 3.0).abs() < 1e-12);
    }

    #[test]
    fn sum_with_interval_per_step() {
        let v = integrate(
            &[2.0, 3.0],
            &TimeSteps::PerStep(vec![10.0, 20.0]),
            IntegrationRule::SumWithInterval,
        )
        .unwrap();
        assert!((v - 80.0).abs() < 1e-12);
    }

    #[test]
    fn per_step_intervals_reject_other_rules() {
        let err = integrate(
            &[2.0, 3.0],
            &TimeSteps::PerStep(vec![10.0, 20.0]),
            IntegrationRule::Trapezoid,
        );
        assert!(err.is_err());
    }

    #[test]
    fn single_sample_integrates_as_one_interval() {
        let v = integrate(&[5.0], &TimeSteps::Uniform(60.0), IntegrationRule::Simpson).unwrap();
        assert!((v - 300.0).abs() < 1e-12);
    }

    #[test]
    fn cumulative_has_leading_zero() {
        let v = cumulative_sum_with_interval(&[1.0, 2.0], &TimeSteps::Uniform(2.0)).unwrap();
        assert_eq!(v, vec![0.0, 2.0, 6.0]);
    }

    #[test]
    fn running_hours_counts_on_steps() {
        let hours = running_hours(&[true, false, true], &TimeSteps::Uniform(1800.0));
        assert!((hours - 1.0).abs() < 1e-12);
    }

    #[test]
    fn duration_covers_all_samples() {
        assert!((duration_s(&TimeSteps::Uniform(60.0), 60) - 3600.0).abs() < 1e-12);
        assert!(
            (duration_s(&TimeSteps::PerStep(vec![10.0, 30.0]), 2) - 40.0).abs() < 1e-12
        );
    }
}
