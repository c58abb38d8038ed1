//! Shore power connection.

use crate::converter::PowerConverter;
use crate::error::ComponentResult;
use crate::meta::{ComponentKind, ComponentMeta, PowerRole};

/// Grid connection used in harbour. Supplies the bus with priority over
/// the gensets; burns no fuel.
#[derive(Clone, Debug)]
pub struct ShorePower {
    pub meta: ComponentMeta,
    pub converter: Option<PowerConverter>,
}

impl ShorePower {
    pub fn new(name: &str, rated_power_kw: f64) -> ComponentResult<Self> {
        Ok(Self {
            meta: ComponentMeta::new(
                name,
                ComponentKind::ShorePower,
                PowerRole::Source,
                rated_power_kw,
            )?,
            converter: None,
        })
    }

    pub fn with_converter(mut self, converter: PowerConverter) -> Self {
        self.converter = Some(converter);
        self
    }

    /// Power drawn from the grid to serve `power_output_kw` at the bus.
    pub fn grid_power_from_bus(&self, power_output_kw: f64) -> ComponentResult<f64> {
        match &self.converter {
            Some(conv) => Ok(conv.power_input_from_output(power_output_kw)?.0),
            None => Ok(power_output_kw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mf_core::curve::EfficiencyCurve;

    #[test]
    fn grid_power_equals_bus_power_without_converter() {
        let shore = ShorePower::new("shore 1", 1000.0).unwrap();
        assert!((shore.grid_power_from_bus(500.0).unwrap() - 500.0).abs() < 1e-12);
    }

    #[test]
    fn converter_losses_increase_grid_draw() {
        let converter = PowerConverter::new(
            ComponentMeta::new("sp conv", ComponentKind::Transformer, PowerRole::Transmission, 1000.0)
                .unwrap(),
            EfficiencyCurve::constant(0.98).unwrap(),
        );
        let shore = ShorePower::new("shore 1", 1000.0).unwrap().with_converter(converter);
        assert!((shore.grid_power_from_bus(490.0).unwrap() - 500.0).abs() < 1e-9);
    }
}
