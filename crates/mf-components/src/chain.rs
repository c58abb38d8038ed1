//! Ordered serial composition of converters.

use crate::converter::PowerConverter;
use crate::error::{ComponentError, ComponentResult};
use crate::meta::{ComponentKind, ComponentMeta, PowerRole};

/// Result of propagating power through a chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainFlow {
    /// Power at the far end of the propagation, kW.
    pub power_kw: f64,
    /// Chain load ratio, referenced to the terminal component rating.
    pub load_ratio: f64,
    /// Product of the stage efficiencies at their local loads.
    pub efficiency: f64,
}

/// Serial chain of converters, listed from the bus (input side) to the
/// terminal (output side). The chain exposes the same bidirectional
/// contract as a single converter; its efficiency is the product of the
/// stage efficiencies and its load ratio is referenced to the terminal
/// component.
#[derive(Clone, Debug)]
pub struct SerialChain {
    pub meta: ComponentMeta,
    components: Vec<PowerConverter>,
}

impl SerialChain {
    pub fn new(
        name: &str,
        kind: ComponentKind,
        role: PowerRole,
        components: Vec<PowerConverter>,
    ) -> ComponentResult<Self> {
        if components.is_empty() {
            return Err(ComponentError::Configuration {
                what: format!("serial chain '{name}' has no components"),
            });
        }
        let terminal = components.last().expect("chain is non-empty");
        let meta = ComponentMeta::new(name, kind, role, terminal.meta.rated_kw())?
            .with_rated_speed_rpm(terminal.meta.rated_rpm());
        Ok(Self { meta, components })
    }

    pub fn components(&self) -> &[PowerConverter] {
        &self.components
    }

    /// Power drawn at the bus to carry `power_output_kw` at the terminal.
    /// Walks the chain terminal-to-bus, dividing out each stage.
    pub fn power_input_from_output(&self, power_output_kw: f64) -> ComponentResult<ChainFlow> {
        let mut power = power_output_kw;
        let mut efficiency = 1.0;
        for converter in self.components.iter().rev() {
            let load = converter.meta.load_ratio(power);
            let eta = converter.efficiency_at(load)?;
            if eta <= 0.0 {
                return Err(ComponentError::ChainInfeasible {
                    component: self.meta.name.clone(),
                });
            }
            efficiency *= eta;
            power = if power >= 0.0 { power / eta } else { power * eta };
        }
        Ok(ChainFlow {
            power_kw: power,
            load_ratio: self.meta.load_ratio(power_output_kw),
            efficiency,
        })
    }

    /// Power delivered at the terminal for `power_input_kw` at the bus.
    pub fn power_output_from_input(&self, power_input_kw: f64) -> ComponentResult<ChainFlow> {
        let mut power = power_input_kw;
        let mut efficiency = 1.0;
        for converter in self.components.iter() {
            let load = converter.meta.load_ratio(power);
            let eta = converter.efficiency_at(load)?;
            if eta <= 0.0 {
                return Err(ComponentError::ChainInfeasible {
                    component: self.meta.name.clone(),
                });
            }
            efficiency *= eta;
            power = if power >= 0.0 { power * eta } else { power / eta };
        }
        Ok(ChainFlow {
            power_kw: power,
            load_ratio: self.meta.load_ratio(power),
            efficiency,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::curve::EfficiencyCurve;

    fn stage(name: &str, eta: f64, rated_kw: f64) -> PowerConverter {
        PowerConverter::new(
            ComponentMeta::new(name, ComponentKind::PowerConverter, PowerRole::Transmission, rated_kw)
                .unwrap(),
            EfficiencyCurve::constant(eta).unwrap(),
        )
    }

    fn drive(etas: &[f64]) -> SerialChain {
        let components = etas
            .iter()
            .enumerate()
            .map(|(i, eta)| stage(&format!("stage {i}"), *eta, 1200.0))
            .collect();
        SerialChain::new(
            "propulsion drive",
            ComponentKind::PropulsionDrive,
            PowerRole::Consumer,
            components,
        )
        .unwrap()
    }

    #[test]
    fn three_stage_drive_demand() {
        // 0.98 * 0.97 * 0.95 at the shaft end asks ~1107.6 kW from the bus.
        let chain = drive(&[0.98, 0.97, 0.95]);
        let flow = chain.power_input_from_output(1000.0).unwrap();
        let expected = 1000.0 / (0.98 * 0.97 * 0.95);
        assert!((flow.power_kw - expected).abs() < 1e-6);
        assert!((flow.efficiency - 0.98 * 0.97 * 0.95).abs() < 1e-12);
        assert!((flow.power_kw - 1107.6).abs() < 0.1);
    }

    #[test]
    fn unity_chain_is_transparent() {
        let chain = drive(&[1.0, 1.0]);
        let flow = chain.power_input_from_output(800.0).unwrap();
        assert!((flow.power_kw - 800.0).abs() < 1e-12);
        assert!((flow.efficiency - 1.0).abs() < 1e-12);
    }

    #[test]
    fn two_unity_stages_match_single_stage() {
        let single = drive(&[0.9]);
        let padded = drive(&[1.0, 0.9]);
        let a = single.power_input_from_output(500.0).unwrap();
        let b = padded.power_input_from_output(500.0).unwrap();
        assert!((a.power_kw - b.power_kw).abs() < 1e-12);
    }

    #[test]
    fn reverse_direction_uses_negative_sign() {
        // Charging through the chain: negative power shrinks towards the bus.
        let chain = drive(&[0.9]);
        let flow = chain.power_input_from_output(-100.0).unwrap();
        assert!((flow.power_kw + 90.0).abs() < 1e-9);
    }

    #[test]
    fn empty_chain_is_rejected() {
        assert!(SerialChain::new(
            "empty",
            ComponentKind::PropulsionDrive,
            PowerRole::Consumer,
            vec![],
        )
        .is_err());
    }

    #[test]
    fn chain_load_is_referenced_to_the_terminal() {
        let components = vec![stage("bus side", 0.95, 2000.0), stage("terminal", 0.95, 1000.0)];
        let chain = SerialChain::new(
            "drive",
            ComponentKind::PropulsionDrive,
            PowerRole::Consumer,
            components,
        )
        .unwrap();
        let flow = chain.power_input_from_output(500.0).unwrap();
        assert!((flow.load_ratio - 0.5).abs() < 1e-12);
    }
}
