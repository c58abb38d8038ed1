//! Electric machine (generator / motor).

use crate::converter::PowerConverter;
use crate::error::ComponentResult;
use crate::meta::ComponentMeta;

/// Rotating electric machine. The electric terminal is the converter
/// output port and the shaft is the input port, which matches generator
/// operation; motor operation runs the same model in the opposite
/// direction.
#[derive(Clone, Debug)]
pub struct ElectricMachine {
    converter: PowerConverter,
}

impl ElectricMachine {
    pub fn new(converter: PowerConverter) -> Self {
        Self { converter }
    }

    pub fn meta(&self) -> &ComponentMeta {
        &self.converter.meta
    }

    pub fn converter(&self) -> &PowerConverter {
        &self.converter
    }

    /// Shaft power required to deliver `power_electric_kw` at the
    /// terminal (generator direction). Returns `(shaft_kw, load_ratio)`.
    pub fn shaft_power_from_electric(
        &self,
        power_electric_kw: f64,
    ) -> ComponentResult<(f64, f64)> {
        self.converter.power_input_from_output(power_electric_kw)
    }

    /// Electric power delivered for `power_shaft_kw` applied at the shaft
    /// (motor direction reversed). Returns `(electric_kw, load_ratio)`.
    pub fn electric_power_from_shaft(&self, power_shaft_kw: f64) -> ComponentResult<(f64, f64)> {
        self.converter.power_output_from_input(power_shaft_kw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meta::{ComponentKind, PowerRole};
    use mf_core::curve::EfficiencyCurve;

    fn generator(eta: f64) -> ElectricMachine {
        ElectricMachine::new(PowerConverter::new(
            ComponentMeta::new("gen", ComponentKind::Generator, PowerRole::Source, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(eta).unwrap(),
        ))
    }

    #[test]
    fn generator_shaft_exceeds_electric() {
        let gen = generator(0.95);
        let (shaft, load) = gen.shaft_power_from_electric(475.0).unwrap();
        assert!((shaft - 500.0).abs() < 1e-9);
        assert!((load - 0.475).abs() < 1e-12);
    }

    #[test]
    fn round_trip_is_identity_for_flat_curve() {
        let gen = generator(0.96);
        let (shaft, _) = gen.shaft_power_from_electric(480.0).unwrap();
        let (electric, _) = gen.electric_power_from_shaft(shaft).unwrap();
        assert!((electric - 480.0).abs() < 1e-9);
    }
}
