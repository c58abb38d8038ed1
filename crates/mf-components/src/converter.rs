//! Efficiency-curve power converter.
//!
//! The base model for transformers, rectifiers, inverters, frequency
//! converters, gearboxes and similar two-port devices.
//!
//! ## Sign conventions
//!
//! Forward operation carries power from the input port to the output port
//! and both are positive; reverse operation carries power the other way
//! and both are negative. The efficiency curve is looked up at the load
//! ratio of the port whose power is given, and the supplying side always
//! carries the larger magnitude.

use crate::error::ComponentResult;
use crate::meta::ComponentMeta;
use mf_core::curve::EfficiencyCurve;

#[derive(Clone, Debug)]
pub struct PowerConverter {
    pub meta: ComponentMeta,
    efficiency: EfficiencyCurve,
}

impl PowerConverter {
    pub fn new(meta: ComponentMeta, efficiency: EfficiencyCurve) -> Self {
        Self { meta, efficiency }
    }

    /// Efficiency at a load ratio, clamped into [0.01, 1.0].
    pub fn efficiency_at(&self, load_ratio: f64) -> ComponentResult<f64> {
        Ok(self.efficiency.at(load_ratio)?)
    }

    pub fn efficiency_curve(&self) -> &EfficiencyCurve {
        &self.efficiency
    }

    /// Power drawn at the input port to carry `power_output_kw` at the
    /// output port. Returns `(power_input_kw, load_ratio)`.
    pub fn power_input_from_output(&self, power_output_kw: f64) -> ComponentResult<(f64, f64)> {
        let load = self.meta.load_ratio(power_output_kw);
        let eta = self.efficiency_at(load)?;
        let power_input_kw = if power_output_kw >= 0.0 {
            power_output_kw / eta
        } else {
            power_output_kw * eta
        };
        Ok((power_input_kw, load))
    }

    /// Power delivered at the output port for `power_input_kw` at the
    /// input port. Returns `(power_output_kw, load_ratio)`.
    pub fn power_output_from_input(&self, power_input_kw: f64) -> ComponentResult<(f64, f64)> {
        let load = self.meta.load_ratio(power_input_kw);
        let eta = self.efficiency_at(load)?;
        let power_output_kw = if power_input_kw >= 0.0 {
            power_input_kw * eta
        } else {
            power_input_kw / eta
        };
        Ok((power_output_kw, load))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ComponentKind, PowerRole};

    fn converter(eta: f64) -> PowerConverter {
        PowerConverter::new(
            ComponentMeta::new("conv", ComponentKind::Transformer, PowerRole::Transmission, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(eta).unwrap(),
        )
    }

    #[test]
    fn forward_input_exceeds_output() {
        let c = converter(0.95);
        let (p_in, load) = c.power_input_from_output(475.0).unwrap();
        assert!((p_in - 500.0).abs() < 1e-9);
        assert!((load - 0.475).abs() < 1e-12);
    }

    #[test]
    fn reverse_flow_shrinks_towards_the_input_port() {
        let c = converter(0.9);
        // Power arriving from the output side loses 10% before the bus.
        let (p_in, _) = c.power_input_from_output(-100.0).unwrap();
        assert!((p_in + 90.0).abs() < 1e-9);
    }

    #[test]
    fn forward_and_reverse_compose_to_identity_for_flat_curve() {
        let c = converter(0.97);
        let (p_out, _) = c.power_output_from_input(200.0).unwrap();
        let (p_in, _) = c.power_input_from_output(p_out).unwrap();
        assert!((p_in - 200.0).abs() < 1e-9);
    }

    #[test]
    fn negative_input_needs_larger_output_side_supply() {
        let c = converter(0.9);
        // Delivering 90 kW into the bus requires 100 kW from the far side.
        let (p_out, _) = c.power_output_from_input(-90.0).unwrap();
        assert!((p_out + 100.0).abs() < 1e-9);
    }
}
